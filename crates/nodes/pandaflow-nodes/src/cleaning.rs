//! Cleaning nodes: nulls, duplicates, and row filtering.

use std::fmt::Write as _;

use pandaflow_graph_core::{
    py, CompileContext, GenerateError, NodeDefinition, NodeInstance, PropertyKind, PropertySpec,
};
use serde_json::json;

use crate::support::{columns_value, f64_value, require_str, str_value};

pub fn definitions() -> Vec<NodeDefinition> {
    vec![
        NodeDefinition {
            type_id: "drop_nulls",
            name: "Drop Nulls",
            category: "Cleaning",
            icon: "eraser",
            color: "#D08B2C",
            description: "Drop rows containing null values.",
            properties: vec![PropertySpec {
                help: "Only consider these columns; empty means all.",
                ..PropertySpec::new("subset", "Subset", PropertyKind::Columns)
            }],
            generate: gen_drop_nulls,
        },
        NodeDefinition {
            type_id: "fill_nulls",
            name: "Fill Nulls",
            category: "Cleaning",
            icon: "droplet",
            color: "#D08B2C",
            description: "Replace null values using a fill strategy.",
            properties: vec![
                PropertySpec {
                    options: &["mean", "median", "zero", "constant"],
                    default: Some(json!("mean")),
                    help: "How to fill numeric nulls.",
                    ..PropertySpec::new("strategy", "Strategy", PropertyKind::Select)
                },
                PropertySpec {
                    default: Some(json!(0)),
                    help: "Fill value for the constant strategy.",
                    ..PropertySpec::new("value", "Value", PropertyKind::Number)
                },
            ],
            generate: gen_fill_nulls,
        },
        NodeDefinition {
            type_id: "drop_duplicates",
            name: "Drop Duplicates",
            category: "Cleaning",
            icon: "copy",
            color: "#D08B2C",
            description: "Drop duplicated rows.",
            properties: vec![PropertySpec {
                help: "Only consider these columns; empty means all.",
                ..PropertySpec::new("subset", "Subset", PropertyKind::Columns)
            }],
            generate: gen_drop_duplicates,
        },
        NodeDefinition {
            type_id: "filter_rows",
            name: "Filter Rows",
            category: "Cleaning",
            icon: "filter",
            color: "#D08B2C",
            description: "Keep rows matching a pandas query expression.",
            properties: vec![PropertySpec {
                required: true,
                help: "Expression passed to DataFrame.query, e.g. `age > 30`.",
                ..PropertySpec::new("query", "Query", PropertyKind::Text)
            }],
            generate: gen_filter_rows,
        },
    ]
}

fn gen_drop_nulls(node: &NodeInstance, ctx: &mut CompileContext) -> Result<String, GenerateError> {
    let input = ctx.input_var(node);
    let out = ctx.unique_var(&format!("{input}_clean"));
    ctx.bind_output(&node.id, out.clone())?;

    let mut code = String::new();
    match columns_value(node, "subset") {
        Some(subset) if !subset.is_empty() => {
            let _ = writeln!(
                code,
                "{out} = {input}.dropna(subset={})",
                py::str_list(&subset)
            );
        }
        _ => {
            let _ = writeln!(code, "{out} = {input}.dropna()");
        }
    }
    Ok(code)
}

fn gen_fill_nulls(node: &NodeInstance, ctx: &mut CompileContext) -> Result<String, GenerateError> {
    let strategy = str_value(node, "strategy").unwrap_or("mean");
    let input = ctx.input_var(node);
    let out = ctx.unique_var(&format!("{input}_filled"));
    ctx.bind_output(&node.id, out.clone())?;

    let mut code = String::new();
    match strategy {
        "zero" => {
            let _ = writeln!(code, "{out} = {input}.fillna(0)");
        }
        "constant" => {
            let value = f64_value(node, "value").unwrap_or(0.0);
            let _ = writeln!(code, "{out} = {input}.fillna({})", py::float_lit(value));
        }
        // mean / median fill only makes sense for numeric columns.
        agg => {
            let _ = writeln!(code, "{out} = {input}.copy()");
            let _ = writeln!(
                code,
                "num_cols = {out}.select_dtypes(include='number').columns"
            );
            let _ = writeln!(
                code,
                "{out}[num_cols] = {out}[num_cols].fillna({out}[num_cols].{agg}())"
            );
        }
    }
    Ok(code)
}

fn gen_drop_duplicates(
    node: &NodeInstance,
    ctx: &mut CompileContext,
) -> Result<String, GenerateError> {
    let input = ctx.input_var(node);
    let out = ctx.unique_var(&format!("{input}_dedup"));
    ctx.bind_output(&node.id, out.clone())?;

    let mut code = String::new();
    match columns_value(node, "subset") {
        Some(subset) if !subset.is_empty() => {
            let _ = writeln!(
                code,
                "{out} = {input}.drop_duplicates(subset={})",
                py::str_list(&subset)
            );
        }
        _ => {
            let _ = writeln!(code, "{out} = {input}.drop_duplicates()");
        }
    }
    Ok(code)
}

fn gen_filter_rows(node: &NodeInstance, ctx: &mut CompileContext) -> Result<String, GenerateError> {
    let query = require_str(node, "query")?;
    let input = ctx.input_var(node);
    let out = ctx.unique_var(&format!("{input}_filtered"));
    ctx.bind_output(&node.id, out.clone())?;

    let mut code = String::new();
    let _ = writeln!(code, "{out} = {input}.query({})", py::str_lit(query));
    Ok(code)
}
