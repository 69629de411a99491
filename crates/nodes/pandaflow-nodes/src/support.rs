//! Shared property-access helpers for generators.
//!
//! Generators run after the compiler has merged defaults and validated the
//! instance, so lookups normally succeed; the fallible variants exist for
//! generators exercised standalone with a hand-built data bag.

use pandaflow_graph_core::{GenerateError, NodeInstance};
use serde_json::Value as JsonValue;

pub(crate) fn str_value<'a>(node: &'a NodeInstance, key: &str) -> Option<&'a str> {
    node.data.get(key).and_then(JsonValue::as_str)
}

pub(crate) fn require_str<'a>(
    node: &'a NodeInstance,
    key: &str,
) -> Result<&'a str, GenerateError> {
    str_value(node, key)
        .ok_or_else(|| GenerateError::Generator(format!("property `{key}` must be a string")))
}

pub(crate) fn f64_value(node: &NodeInstance, key: &str) -> Option<f64> {
    node.data.get(key).and_then(JsonValue::as_f64)
}

pub(crate) fn bool_value(node: &NodeInstance, key: &str) -> Option<bool> {
    node.data.get(key).and_then(JsonValue::as_bool)
}

/// Column properties accept one name or a list of names.
pub(crate) fn columns_value(node: &NodeInstance, key: &str) -> Option<Vec<String>> {
    match node.data.get(key)? {
        JsonValue::String(name) => Some(vec![name.clone()]),
        JsonValue::Array(items) => {
            let columns: Vec<String> = items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect();
            if columns.len() == items.len() {
                Some(columns)
            } else {
                None
            }
        }
        _ => None,
    }
}
