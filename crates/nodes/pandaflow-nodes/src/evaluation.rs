//! Evaluation and output nodes.
//!
//! `predict` and `score_model` take a fitted model as their input and use
//! the canonical `X_test` / `y_test` names emitted by `train_test_split`.

use std::fmt::Write as _;

use pandaflow_graph_core::{
    py, CompileContext, GenerateError, NodeDefinition, NodeInstance, PropertyKind, PropertySpec,
};
use serde_json::json;

use crate::support::{bool_value, require_str, str_value};

pub fn definitions() -> Vec<NodeDefinition> {
    vec![
        NodeDefinition {
            type_id: "predict",
            name: "Predict",
            category: "Evaluation",
            icon: "wand",
            color: "#B3433E",
            description: "Predict on the held-out test set.",
            properties: vec![],
            generate: gen_predict,
        },
        NodeDefinition {
            type_id: "score_model",
            name: "Score Model",
            category: "Evaluation",
            icon: "gauge",
            color: "#B3433E",
            description: "Print a metric for the model on the test set.",
            properties: vec![PropertySpec {
                options: &["accuracy", "f1", "r2"],
                default: Some(json!("accuracy")),
                help: "Metric to report.",
                ..PropertySpec::new("metric", "Metric", PropertyKind::Select)
            }],
            generate: gen_score_model,
        },
        NodeDefinition {
            type_id: "export_csv",
            name: "Export CSV",
            category: "Evaluation",
            icon: "download",
            color: "#B3433E",
            description: "Write the DataFrame to a CSV file.",
            properties: vec![
                PropertySpec {
                    required: true,
                    help: "Destination file path.",
                    ..PropertySpec::new("path", "File path", PropertyKind::Text)
                },
                PropertySpec {
                    default: Some(json!(false)),
                    help: "Write the row index column.",
                    ..PropertySpec::new("index", "Keep index", PropertyKind::Flag)
                },
            ],
            generate: gen_export_csv,
        },
    ]
}

fn gen_predict(node: &NodeInstance, ctx: &mut CompileContext) -> Result<String, GenerateError> {
    let input = ctx.input_var(node);
    let out = ctx.unique_var("y_pred");
    ctx.bind_output(&node.id, out.clone())?;

    let mut code = String::new();
    let _ = writeln!(code, "{out} = {input}.predict(X_test)");
    Ok(code)
}

fn gen_score_model(
    node: &NodeInstance,
    ctx: &mut CompileContext,
) -> Result<String, GenerateError> {
    let metric = str_value(node, "metric").unwrap_or("accuracy");
    let (import, call) = match metric {
        "f1" => (
            "from sklearn.metrics import f1_score",
            "f1_score(y_test, {pred}, average='weighted')",
        ),
        "r2" => ("from sklearn.metrics import r2_score", "r2_score(y_test, {pred})"),
        _ => (
            "from sklearn.metrics import accuracy_score",
            "accuracy_score(y_test, {pred})",
        ),
    };
    let input = ctx.input_var(node);
    let out = ctx.unique_var("y_pred");
    ctx.bind_output(&node.id, out.clone())?;

    let mut code = format!("{import}\n");
    let _ = writeln!(code, "{out} = {input}.predict(X_test)");
    let _ = writeln!(
        code,
        "print({}, {})",
        py::str_lit(&format!("{metric}:")),
        call.replace("{pred}", &out)
    );
    Ok(code)
}

fn gen_export_csv(node: &NodeInstance, ctx: &mut CompileContext) -> Result<String, GenerateError> {
    let path = require_str(node, "path")?;
    let index = bool_value(node, "index").unwrap_or(false);
    let input = ctx.input_var(node);
    // Pass-through: downstream nodes keep seeing the same DataFrame.
    ctx.bind_output(&node.id, input.clone())?;

    let mut code = String::new();
    let _ = writeln!(
        code,
        "{input}.to_csv({}, index={})",
        py::str_lit(path),
        py::bool_lit(index)
    );
    Ok(code)
}
