//! Dataset nodes: getting data into the pipeline and subsetting it.

use std::fmt::Write as _;

use pandaflow_graph_core::{
    py, CompileContext, GenerateError, NodeDefinition, NodeInstance, PropertyKind, PropertySpec,
};
use serde_json::json;

use crate::support::{columns_value, f64_value, require_str, str_value};

pub fn definitions() -> Vec<NodeDefinition> {
    vec![
        NodeDefinition {
            type_id: "load_csv",
            name: "Load CSV",
            category: "Dataset",
            icon: "table",
            color: "#4C9F70",
            description: "Read a CSV file into a pandas DataFrame.",
            properties: vec![
                PropertySpec {
                    required: true,
                    help: "Path of the CSV file to read.",
                    ..PropertySpec::new("path", "File path", PropertyKind::Text)
                },
                PropertySpec {
                    default: Some(json!(",")),
                    help: "Field separator.",
                    ..PropertySpec::new("sep", "Separator", PropertyKind::Text)
                },
            ],
            generate: gen_load_csv,
        },
        NodeDefinition {
            type_id: "select_columns",
            name: "Select Columns",
            category: "Dataset",
            icon: "columns",
            color: "#4C9F70",
            description: "Keep only the listed columns.",
            properties: vec![PropertySpec {
                required: true,
                help: "Columns to keep.",
                ..PropertySpec::new("columns", "Columns", PropertyKind::Columns)
            }],
            generate: gen_select_columns,
        },
        NodeDefinition {
            type_id: "drop_columns",
            name: "Drop Columns",
            category: "Dataset",
            icon: "columns",
            color: "#4C9F70",
            description: "Remove the listed columns.",
            properties: vec![PropertySpec {
                required: true,
                help: "Columns to remove.",
                ..PropertySpec::new("columns", "Columns", PropertyKind::Columns)
            }],
            generate: gen_drop_columns,
        },
        NodeDefinition {
            type_id: "sample_rows",
            name: "Sample Rows",
            category: "Dataset",
            icon: "shuffle",
            color: "#4C9F70",
            description: "Take a random sample of rows.",
            properties: vec![
                PropertySpec {
                    default: Some(json!(1000)),
                    min: Some(1.0),
                    help: "Number of rows to sample.",
                    ..PropertySpec::new("n", "Rows", PropertyKind::Number)
                },
                PropertySpec {
                    default: Some(json!(42)),
                    ..PropertySpec::new("random_state", "Random state", PropertyKind::Number)
                },
            ],
            generate: gen_sample_rows,
        },
    ]
}

fn gen_load_csv(node: &NodeInstance, ctx: &mut CompileContext) -> Result<String, GenerateError> {
    let path = require_str(node, "path")?;
    let sep = str_value(node, "sep").unwrap_or(",");
    let out = ctx.unique_var("df");
    ctx.bind_output(&node.id, out.clone())?;

    let mut code = String::new();
    if sep == "," {
        let _ = writeln!(code, "{out} = pd.read_csv({})", py::str_lit(path));
    } else {
        let _ = writeln!(
            code,
            "{out} = pd.read_csv({}, sep={})",
            py::str_lit(path),
            py::str_lit(sep)
        );
    }
    Ok(code)
}

fn gen_select_columns(
    node: &NodeInstance,
    ctx: &mut CompileContext,
) -> Result<String, GenerateError> {
    let columns = columns_value(node, "columns")
        .ok_or_else(|| GenerateError::Generator("property `columns` must name columns".into()))?;
    let input = ctx.input_var(node);
    let out = ctx.unique_var(&format!("{input}_selected"));
    ctx.bind_output(&node.id, out.clone())?;

    let mut code = String::new();
    let _ = writeln!(code, "{out} = {input}[{}]", py::str_list(&columns));
    Ok(code)
}

fn gen_drop_columns(
    node: &NodeInstance,
    ctx: &mut CompileContext,
) -> Result<String, GenerateError> {
    let columns = columns_value(node, "columns")
        .ok_or_else(|| GenerateError::Generator("property `columns` must name columns".into()))?;
    let input = ctx.input_var(node);
    let out = ctx.unique_var(&format!("{input}_dropped"));
    ctx.bind_output(&node.id, out.clone())?;

    let mut code = String::new();
    let _ = writeln!(
        code,
        "{out} = {input}.drop(columns={})",
        py::str_list(&columns)
    );
    Ok(code)
}

fn gen_sample_rows(
    node: &NodeInstance,
    ctx: &mut CompileContext,
) -> Result<String, GenerateError> {
    let n = f64_value(node, "n").unwrap_or(1000.0);
    let random_state = f64_value(node, "random_state").unwrap_or(42.0);
    let input = ctx.input_var(node);
    let out = ctx.unique_var(&format!("{input}_sample"));
    ctx.bind_output(&node.id, out.clone())?;

    let mut code = String::new();
    let _ = writeln!(
        code,
        "{out} = {input}.sample(n={}, random_state={})",
        py::int_lit(n),
        py::int_lit(random_state)
    );
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pandaflow_graph_core::{compile, GraphSpec, Registry};
    use serde_json::json;

    fn compile_single(type_id: &str, data: &[(&str, serde_json::Value)]) -> String {
        let mut registry = Registry::new();
        assert!(registry.register_all(definitions()).is_empty());
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
    fn load_csv_escapes_the_path() {
        let script = compile_single("load_csv", &[("path", json!("data/o'brien.csv"))]);
        assert!(script.contains(r"df = pd.read_csv('data/o\'brien.csv')"));
    }

    #[test]
    fn load_csv_mentions_a_custom_separator() {
        let script = compile_single(
            "load_csv",
            &[("path", json!("rows.tsv")), ("sep", json!("\t"))],
        );
        assert!(script.contains(r"pd.read_csv('rows.tsv', sep='\t')"));
    }

    #[test]
    fn select_columns_renders_a_list() {
        let script = compile_single("select_columns", &[("columns", json!(["age", "height"]))]);
        assert!(script.contains("df_selected = df[['age', 'height']]"));
    }

    #[test]
    fn sample_rows_uses_defaults() {
        let script = compile_single("sample_rows", &[]);
        assert!(script.contains("df_sample = df.sample(n=1000, random_state=42)"));
    }
}
