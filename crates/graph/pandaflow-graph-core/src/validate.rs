//! Defaults merging and per-instance property validation.

use hashbrown::HashMap;
use serde_json::Value as JsonValue;

use crate::error::PropertyViolation;
use crate::registry::{NodeDefinition, PropertyKind, PropertySpec};
use crate::types::NodeInstance;

/// Merge the instance's `data` over the definition's defaults; data wins.
pub fn merged_data(
    definition: &NodeDefinition,
    node: &NodeInstance,
) -> HashMap<String, JsonValue> {
    let mut merged: HashMap<String, JsonValue> = definition
        .properties
        .iter()
        .filter_map(|p| p.default.clone().map(|d| (p.name.to_string(), d)))
        .collect();
    for (key, value) in &node.data {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// Check a merged value bag against the definition's property schema.
/// Violations degrade to a per-node error; they never abort the run.
pub fn validate_instance(
    definition: &NodeDefinition,
    merged: &HashMap<String, JsonValue>,
) -> Result<(), Vec<PropertyViolation>> {
    let mut violations = Vec::new();
    for prop in &definition.properties {
        match merged.get(prop.name) {
            None | Some(JsonValue::Null) => {
                if prop.required {
                    violations.push(violation(prop, "required but missing".to_string()));
                }
            }
            Some(value) => check_value(prop, value, &mut violations),
        }
    }
    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

fn violation(prop: &PropertySpec, reason: String) -> PropertyViolation {
    PropertyViolation {
        property: prop.name.to_string(),
        reason,
    }
}

fn check_value(prop: &PropertySpec, value: &JsonValue, out: &mut Vec<PropertyViolation>) {
    match prop.kind {
        PropertyKind::Text => {
            if !value.is_string() {
                out.push(violation(prop, "expected a string".to_string()));
            }
        }
        PropertyKind::Flag => {
            if !value.is_boolean() {
                out.push(violation(prop, "expected true or false".to_string()));
            }
        }
        PropertyKind::Number => match value.as_f64() {
            None => out.push(violation(prop, "expected a number".to_string())),
            Some(n) => {
                if let Some(min) = prop.min {
                    if n < min {
                        out.push(violation(prop, format!("{n} is below the minimum {min}")));
                    }
                }
                if let Some(max) = prop.max {
                    if n > max {
                        out.push(violation(prop, format!("{n} is above the maximum {max}")));
                    }
                }
            }
        },
        PropertyKind::Select => match value.as_str() {
            Some(choice) if prop.options.contains(&choice) => {}
            Some(choice) => out.push(violation(
                prop,
                format!("`{choice}` is not one of {:?}", prop.options),
            )),
            None => out.push(violation(
                prop,
                format!("expected one of {:?}", prop.options),
            )),
        },
        PropertyKind::Columns => {
            let valid = value.is_string()
                || value
                    .as_array()
                    .is_some_and(|items| items.iter().all(JsonValue::is_string));
            if !valid {
                out.push(violation(
                    prop,
                    "expected a column name or a list of column names".to_string(),
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CompileContext;
    use crate::error::GenerateError;
    use serde_json::json;

    fn noop_generate(
        _node: &NodeInstance,
        _ctx: &mut CompileContext,
    ) -> Result<String, GenerateError> {
        Ok(String::new())
    }

    fn definition(properties: Vec<PropertySpec>) -> NodeDefinition {
        NodeDefinition {
            type_id: "probe",
            name: "Probe",
            category: "Test",
            icon: "dot",
            color: "#808080",
            description: "",
            properties,
            generate: noop_generate,
        }
    }

    #[test]
    fn data_wins_over_defaults() {
        let def = definition(vec![PropertySpec {
            default: Some(json!(5)),
            ..PropertySpec::new("n_clusters", "Clusters", PropertyKind::Number)
        }]);
        let mut node = NodeInstance::new("n", "probe");
        node.data.insert("n_clusters".to_string(), json!(8));
        let merged = merged_data(&def, &node);
        assert_eq!(merged.get("n_clusters"), Some(&json!(8)));
    }

    #[test]
    fn defaults_fill_missing_entries() {
        let def = definition(vec![PropertySpec {
            default: Some(json!(5)),
            ..PropertySpec::new("n_clusters", "Clusters", PropertyKind::Number)
        }]);
        let node = NodeInstance::new("n", "probe");
        let merged = merged_data(&def, &node);
        assert_eq!(merged.get("n_clusters"), Some(&json!(5)));
        assert!(validate_instance(&def, &merged).is_ok());
    }

    #[test]
    fn required_and_missing_is_a_violation() {
        let def = definition(vec![PropertySpec {
            required: true,
            ..PropertySpec::new("path", "Path", PropertyKind::Text)
        }]);
        let node = NodeInstance::new("n", "probe");
        let merged = merged_data(&def, &node);
        let violations = validate_instance(&def, &merged).unwrap_err();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].property, "path");
    }

    #[test]
    fn number_out_of_range_is_a_violation() {
        let def = definition(vec![PropertySpec {
            min: Some(0.0),
            max: Some(1.0),
            ..PropertySpec::new("test_size", "Test size", PropertyKind::Number)
        }]);
        let mut node = NodeInstance::new("n", "probe");
        node.data.insert("test_size".to_string(), json!(1.5));
        let merged = merged_data(&def, &node);
        let violations = validate_instance(&def, &merged).unwrap_err();
        assert!(violations[0].reason.contains("above the maximum"));
    }

    #[test]
    fn select_outside_options_is_a_violation() {
        let def = definition(vec![PropertySpec {
            options: &["mean", "median"],
            ..PropertySpec::new("strategy", "Strategy", PropertyKind::Select)
        }]);
        let mut node = NodeInstance::new("n", "probe");
        node.data.insert("strategy".to_string(), json!("mode"));
        let merged = merged_data(&def, &node);
        let violations = validate_instance(&def, &merged).unwrap_err();
        assert!(violations[0].reason.contains("`mode`"));
    }

    #[test]
    fn columns_accept_string_or_string_list() {
        let def = definition(vec![PropertySpec::new(
            "columns",
            "Columns",
            PropertyKind::Columns,
        )]);
        for value in [json!("age"), json!(["age", "height"])] {
            let mut node = NodeInstance::new("n", "probe");
            node.data.insert("columns".to_string(), value);
            let merged = merged_data(&def, &node);
            assert!(validate_instance(&def, &merged).is_ok());
        }
        let mut node = NodeInstance::new("n", "probe");
        node.data.insert("columns".to_string(), json!([1, 2]));
        let merged = merged_data(&def, &node);
        assert!(validate_instance(&def, &merged).is_err());
    }

    #[test]
    fn several_violations_are_collected() {
        let def = definition(vec![
            PropertySpec {
                required: true,
                ..PropertySpec::new("path", "Path", PropertyKind::Text)
            },
            PropertySpec {
                min: Some(1.0),
                ..PropertySpec::new("n", "N", PropertyKind::Number)
            },
        ]);
        let mut node = NodeInstance::new("n", "probe");
        node.data.insert("n".to_string(), json!(0));
        let merged = merged_data(&def, &node);
        let violations = validate_instance(&def, &merged).unwrap_err();
        assert_eq!(violations.len(), 2);
    }
}
