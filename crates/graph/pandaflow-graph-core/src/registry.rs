//! Node definitions and the catalog that resolves them.

use hashbrown::{HashMap, HashSet};
use serde_json::Value as JsonValue;

use crate::context::CompileContext;
use crate::error::{GenerateError, RegistryError};
use crate::types::NodeInstance;

/// Code generator for one node type.
///
/// The instance's `data` is already merged over the definition's defaults
/// and validated when the compiler invokes this. Generators must be pure
/// string synthesis: deterministic, idempotent, and mutating nothing except
/// the context (their own output binding).
pub type GenerateFn = fn(&NodeInstance, &mut CompileContext) -> Result<String, GenerateError>;

/// Editor widget / value class of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    /// Free-form string.
    Text,
    /// Numeric value; `min`/`max` on the property bound it.
    Number,
    /// Boolean toggle.
    Flag,
    /// One of a fixed option set; `options` on the property lists them.
    Select,
    /// A column name or list of column names.
    Columns,
}

/// One typed, validated configuration field of a node type.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: PropertyKind,
    pub help: &'static str,
    pub required: bool,
    pub default: Option<JsonValue>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub options: &'static [&'static str],
}

impl PropertySpec {
    /// Base spec: optional, no default, no bounds, no options.
    pub fn new(name: &'static str, label: &'static str, kind: PropertyKind) -> Self {
        PropertySpec {
            name,
            label,
            kind,
            help: "",
            required: false,
            default: None,
            min: None,
            max: None,
            options: &[],
        }
    }
}

/// Immutable descriptor for a node type: identity, display metadata, the
/// property schema, and the code generator. Registered once, read-only for
/// the rest of the process.
#[derive(Debug, Clone)]
pub struct NodeDefinition {
    pub type_id: &'static str,
    pub name: &'static str,
    pub category: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
    pub description: &'static str,
    pub properties: Vec<PropertySpec>,
    pub generate: GenerateFn,
}

impl NodeDefinition {
    /// Property defaults as a map, derived from the property schema.
    pub fn defaults(&self) -> HashMap<&'static str, JsonValue> {
        self.properties
            .iter()
            .filter_map(|p| p.default.clone().map(|d| (p.name, d)))
            .collect()
    }
}

/// One entry that failed batch registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterFailure {
    pub type_id: String,
    pub error: RegistryError,
}

/// Catalog mapping node type id -> definition.
///
/// An explicit instance, passed by reference to the compiler; hosts that
/// need process-wide sharing can wrap one in `Arc` after registration.
/// Reads via `&self` are safe concurrently; registration takes `&mut self`,
/// so writers are serialized by borrow rules and a definition only becomes
/// observable after it has fully passed validation.
#[derive(Debug, Default)]
pub struct Registry {
    definitions: HashMap<&'static str, NodeDefinition>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and add a definition. Fails with
    /// [`RegistryError::DefinitionInvalid`] on a malformed definition and
    /// [`RegistryError::DuplicateType`] when the type id is already taken.
    pub fn register(&mut self, definition: NodeDefinition) -> Result<(), RegistryError> {
        validate_definition(&definition)?;
        if self.definitions.contains_key(definition.type_id) {
            return Err(RegistryError::DuplicateType(definition.type_id.to_string()));
        }
        log::debug!("registered node type `{}`", definition.type_id);
        self.definitions.insert(definition.type_id, definition);
        Ok(())
    }

    /// One-pass batch ingestion for node packs. Keeps going past individual
    /// failures and returns the list of entries that did not register, so
    /// one malformed pack never blocks the others.
    pub fn register_all(&mut self, definitions: Vec<NodeDefinition>) -> Vec<RegisterFailure> {
        let mut failures = Vec::new();
        for definition in definitions {
            let type_id = definition.type_id;
            if let Err(error) = self.register(definition) {
                log::warn!("skipping node type `{type_id}`: {error}");
                failures.push(RegisterFailure {
                    type_id: type_id.to_string(),
                    error,
                });
            }
        }
        failures
    }

    pub fn resolve(&self, type_id: &str) -> Result<&NodeDefinition, RegistryError> {
        self.definitions
            .get(type_id)
            .ok_or_else(|| RegistryError::UnknownType(type_id.to_string()))
    }

    pub fn contains(&self, type_id: &str) -> bool {
        self.definitions.contains_key(type_id)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Registered type ids, sorted for stable listings.
    pub fn types(&self) -> Vec<&'static str> {
        let mut types: Vec<&'static str> = self.definitions.keys().copied().collect();
        types.sort_unstable();
        types
    }
}

/// Pure structural check of a definition, usable before [`Registry::register`]
/// to fail fast at load time. `generate` is a plain `fn` pointer, so being
/// callable is guaranteed statically; this checks the data fields.
pub fn validate_definition(definition: &NodeDefinition) -> Result<(), RegistryError> {
    let fail = |reason: String| RegistryError::DefinitionInvalid {
        type_id: definition.type_id.to_string(),
        reason,
    };

    if definition.type_id.trim().is_empty() {
        return Err(fail("empty type id".to_string()));
    }
    if definition.name.trim().is_empty() {
        return Err(fail("empty display name".to_string()));
    }

    let mut seen = HashSet::new();
    for prop in &definition.properties {
        if prop.name.trim().is_empty() {
            return Err(fail("property with empty name".to_string()));
        }
        if !seen.insert(prop.name) {
            return Err(fail(format!("duplicate property `{}`", prop.name)));
        }
        match prop.kind {
            PropertyKind::Number => {
                if let (Some(min), Some(max)) = (prop.min, prop.max) {
                    if min > max {
                        return Err(fail(format!(
                            "property `{}` has min {min} above max {max}",
                            prop.name
                        )));
                    }
                }
            }
            PropertyKind::Select => {
                if prop.options.is_empty() {
                    return Err(fail(format!(
                        "select property `{}` has no options",
                        prop.name
                    )));
                }
                let mut opts = HashSet::new();
                for opt in prop.options {
                    if !opts.insert(*opt) {
                        return Err(fail(format!(
                            "select property `{}` repeats option `{opt}`",
                            prop.name
                        )));
                    }
                }
                if let Some(default) = &prop.default {
                    match default.as_str() {
                        Some(value) if prop.options.contains(&value) => {}
                        _ => {
                            return Err(fail(format!(
                                "select property `{}` default is not one of its options",
                                prop.name
                            )))
                        }
                    }
                }
            }
            _ => {}
        }
        if !matches!(prop.kind, PropertyKind::Number) && (prop.min.is_some() || prop.max.is_some())
        {
            return Err(fail(format!(
                "property `{}` has numeric bounds but is not a number",
                prop.name
            )));
        }
        if !matches!(prop.kind, PropertyKind::Select) && !prop.options.is_empty() {
            return Err(fail(format!(
                "property `{}` has options but is not a select",
                prop.name
            )));
        }
    }
    Ok(())
}
