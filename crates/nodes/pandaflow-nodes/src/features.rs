//! Feature engineering nodes: scaling, encoding, and the train/test split.
//!
//! `train_test_split` establishes the canonical split variables
//! (`X_train`, `X_test`, `y_train`, `y_test`) that the model and
//! evaluation packs build on. Helper names assigned inside a fragment
//! (`scale_cols` and friends) are used immediately after assignment, so
//! reuse across fragments is harmless.

use std::fmt::Write as _;

use pandaflow_graph_core::{
    py, CompileContext, GenerateError, NodeDefinition, NodeInstance, PropertyKind, PropertySpec,
};
use serde_json::json;

use crate::support::{columns_value, f64_value, require_str};

pub fn definitions() -> Vec<NodeDefinition> {
    vec![
        NodeDefinition {
            type_id: "standard_scaler",
            name: "Standard Scaler",
            category: "Features",
            icon: "scale",
            color: "#3E7CB1",
            description: "Standardize columns to zero mean and unit variance.",
            properties: vec![PropertySpec {
                help: "Columns to scale; empty means every numeric column.",
                ..PropertySpec::new("columns", "Columns", PropertyKind::Columns)
            }],
            generate: gen_standard_scaler,
        },
        NodeDefinition {
            type_id: "min_max_scaler",
            name: "Min-Max Scaler",
            category: "Features",
            icon: "scale",
            color: "#3E7CB1",
            description: "Rescale columns into a fixed range.",
            properties: vec![
                PropertySpec {
                    help: "Columns to scale; empty means every numeric column.",
                    ..PropertySpec::new("columns", "Columns", PropertyKind::Columns)
                },
                PropertySpec {
                    default: Some(json!(0)),
                    ..PropertySpec::new("feature_min", "Range min", PropertyKind::Number)
                },
                PropertySpec {
                    default: Some(json!(1)),
                    ..PropertySpec::new("feature_max", "Range max", PropertyKind::Number)
                },
            ],
            generate: gen_min_max_scaler,
        },
        NodeDefinition {
            type_id: "one_hot_encode",
            name: "One-Hot Encode",
            category: "Features",
            icon: "binary",
            color: "#3E7CB1",
            description: "One-hot encode categorical columns.",
            properties: vec![PropertySpec {
                help: "Columns to encode; empty lets pandas pick object columns.",
                ..PropertySpec::new("columns", "Columns", PropertyKind::Columns)
            }],
            generate: gen_one_hot_encode,
        },
        NodeDefinition {
            type_id: "label_encode",
            name: "Label Encode",
            category: "Features",
            icon: "tag",
            color: "#3E7CB1",
            description: "Encode one column's categories as integers.",
            properties: vec![PropertySpec {
                required: true,
                help: "Column to encode.",
                ..PropertySpec::new("column", "Column", PropertyKind::Text)
            }],
            generate: gen_label_encode,
        },
        NodeDefinition {
            type_id: "train_test_split",
            name: "Train/Test Split",
            category: "Features",
            icon: "split",
            color: "#3E7CB1",
            description: "Split the DataFrame into train and test sets.",
            properties: vec![
                PropertySpec {
                    required: true,
                    help: "Column holding the prediction target.",
                    ..PropertySpec::new("target", "Target column", PropertyKind::Text)
                },
                PropertySpec {
                    default: Some(json!(0.25)),
                    min: Some(0.01),
                    max: Some(0.99),
                    help: "Fraction of rows held out for testing.",
                    ..PropertySpec::new("test_size", "Test size", PropertyKind::Number)
                },
                PropertySpec {
                    default: Some(json!(42)),
                    ..PropertySpec::new("random_state", "Random state", PropertyKind::Number)
                },
            ],
            generate: gen_train_test_split,
        },
    ]
}

fn write_scale_columns(code: &mut String, node: &NodeInstance, out: &str) {
    match columns_value(node, "columns") {
        Some(columns) if !columns.is_empty() => {
            let _ = writeln!(code, "scale_cols = {}", py::str_list(&columns));
        }
        _ => {
            let _ = writeln!(
                code,
                "scale_cols = {out}.select_dtypes(include='number').columns"
            );
        }
    }
}

fn gen_standard_scaler(
    node: &NodeInstance,
    ctx: &mut CompileContext,
) -> Result<String, GenerateError> {
    let input = ctx.input_var(node);
    let out = ctx.unique_var(&format!("{input}_scaled"));
    ctx.bind_output(&node.id, out.clone())?;

    let mut code = String::from("from sklearn.preprocessing import StandardScaler\n");
    let _ = writeln!(code, "{out} = {input}.copy()");
    write_scale_columns(&mut code, node, &out);
    let _ = writeln!(
        code,
        "{out}[scale_cols] = StandardScaler().fit_transform({out}[scale_cols])"
    );
    Ok(code)
}

fn gen_min_max_scaler(
    node: &NodeInstance,
    ctx: &mut CompileContext,
) -> Result<String, GenerateError> {
    let lo = f64_value(node, "feature_min").unwrap_or(0.0);
    let hi = f64_value(node, "feature_max").unwrap_or(1.0);
    if lo >= hi {
        return Err(GenerateError::Generator(format!(
            "feature range is empty: [{lo}, {hi}]"
        )));
    }
    let input = ctx.input_var(node);
    let out = ctx.unique_var(&format!("{input}_scaled"));
    ctx.bind_output(&node.id, out.clone())?;

    let mut code = String::from("from sklearn.preprocessing import MinMaxScaler\n");
    let _ = writeln!(code, "{out} = {input}.copy()");
    write_scale_columns(&mut code, node, &out);
    let _ = writeln!(
        code,
        "{out}[scale_cols] = MinMaxScaler(feature_range=({}, {})).fit_transform({out}[scale_cols])",
        py::float_lit(lo),
        py::float_lit(hi)
    );
    Ok(code)
}

fn gen_one_hot_encode(
    node: &NodeInstance,
    ctx: &mut CompileContext,
) -> Result<String, GenerateError> {
    let input = ctx.input_var(node);
    let out = ctx.unique_var(&format!("{input}_encoded"));
    ctx.bind_output(&node.id, out.clone())?;

    let mut code = String::new();
    match columns_value(node, "columns") {
        Some(columns) if !columns.is_empty() => {
            let _ = writeln!(
                code,
                "{out} = pd.get_dummies({input}, columns={})",
                py::str_list(&columns)
            );
        }
        _ => {
            let _ = writeln!(code, "{out} = pd.get_dummies({input})");
        }
    }
    Ok(code)
}

fn gen_label_encode(
    node: &NodeInstance,
    ctx: &mut CompileContext,
) -> Result<String, GenerateError> {
    let column = require_str(node, "column")?;
    let input = ctx.input_var(node);
    let out = ctx.unique_var(&format!("{input}_encoded"));
    ctx.bind_output(&node.id, out.clone())?;

    let column = py::str_lit(column);
    let mut code = String::from("from sklearn.preprocessing import LabelEncoder\n");
    let _ = writeln!(code, "{out} = {input}.copy()");
    let _ = writeln!(
        code,
        "{out}[{column}] = LabelEncoder().fit_transform({out}[{column}])"
    );
    Ok(code)
}

fn gen_train_test_split(
    node: &NodeInstance,
    ctx: &mut CompileContext,
) -> Result<String, GenerateError> {
    let target = require_str(node, "target")?;
    let test_size = f64_value(node, "test_size").unwrap_or(0.25);
    let random_state = f64_value(node, "random_state").unwrap_or(42.0);
    let input = ctx.input_var(node);
    let out = ctx.unique_var("X_train");
    ctx.bind_output(&node.id, out.clone())?;

    let target = py::str_lit(target);
    let mut code = String::from("from sklearn.model_selection import train_test_split\n");
    let _ = writeln!(code, "features = {input}.drop(columns=[{target}])");
    let _ = writeln!(code, "labels = {input}[{target}]");
    let _ = writeln!(
        code,
        "{out}, X_test, y_train, y_test = train_test_split(features, labels, test_size={}, random_state={})",
        py::float_lit(test_size),
        py::int_lit(random_state)
    );
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pandaflow_graph_core::{compile, Edge, GraphSpec, Registry};
    use serde_json::json;

    fn registry() -> Registry {
        let mut registry = Registry::new();
        assert!(registry.register_all(definitions()).is_empty());
        registry
    }

    fn compile_single(type_id: &str, data: &[(&str, serde_json::Value)]) -> String {
        let registry = registry();
        let mut node = NodeInstance::new("n1", type_id);
        for (key, value) in data {
            node.data.insert(key.to_string(), value.clone());
        }
        let graph = GraphSpec {
            nodes: vec![node],
            edges: vec![],
        };
        let result = compile(&registry, &graph).unwrap();
        assert!(result.is_clean(), "errors: {:?}", result.errors);
        result.script
    }

    #[test]
    fn standard_scaler_defaults_to_numeric_columns() {
        let script = compile_single("standard_scaler", &[]);
        assert!(script.contains("df_scaled = df.copy()"));
        assert!(script.contains("scale_cols = df_scaled.select_dtypes(include='number').columns"));
        assert!(script
            .contains("df_scaled[scale_cols] = StandardScaler().fit_transform(df_scaled[scale_cols])"));
    }

    #[test]
    fn min_max_scaler_renders_the_range() {
        let script = compile_single(
            "min_max_scaler",
            &[("feature_min", json!(-1)), ("feature_max", json!(1))],
        );
        assert!(script.contains("MinMaxScaler(feature_range=(-1.0, 1.0))"));
    }

    #[test]
    fn min_max_scaler_rejects_an_empty_range() {
        let registry = registry();
        let mut node = NodeInstance::new("n1", "min_max_scaler");
        node.data.insert("feature_min".to_string(), json!(2));
        let graph = GraphSpec {
            nodes: vec![node],
            edges: vec![],
        };
        let result = compile(&registry, &graph).unwrap();
        assert_eq!(result.errors.len(), 1);
        assert!(matches!(
            result.errors[0].error,
            GenerateError::Generator(_)
        ));
    }

    #[test]
    fn label_encode_quotes_the_column() {
        let script = compile_single("label_encode", &[("column", json!("species"))]);
        assert!(script.contains("df_encoded['species'] = LabelEncoder().fit_transform(df_encoded['species'])"));
    }

    #[test]
    fn train_test_split_emits_the_canonical_names() {
        let script = compile_single("train_test_split", &[("target", json!("label"))]);
        assert!(script.contains("features = df.drop(columns=['label'])"));
        assert!(script.contains("labels = df['label']"));
        assert!(script.contains(
            "X_train, X_test, y_train, y_test = train_test_split(features, labels, test_size=0.25, random_state=42)"
        ));
    }

    #[test]
    fn sibling_scalers_get_distinct_output_names() {
        let registry = registry();
        let graph = GraphSpec {
            nodes: vec![
                NodeInstance::new("s1", "standard_scaler"),
                NodeInstance::new("s2", "standard_scaler"),
            ],
            edges: vec![],
        };
        let result = compile(&registry, &graph).unwrap();
        assert!(result.is_clean());
        assert!(result.script.contains("df_scaled = df.copy()"));
        assert!(result.script.contains("df_scaled_2 = df.copy()"));
    }

    #[test]
    fn scaler_reads_the_upstream_variable() {
        let registry = registry();
        let mut split = NodeInstance::new("split", "train_test_split");
        split.data.insert("target".to_string(), json!("y"));
        let graph = GraphSpec {
            nodes: vec![NodeInstance::new("scale", "standard_scaler"), split],
            edges: vec![Edge::new("scale", "split")],
        };
        let result = compile(&registry, &graph).unwrap();
        assert!(result.is_clean());
        assert!(result.script.contains("features = df_scaled.drop(columns=['y'])"));
    }
}
