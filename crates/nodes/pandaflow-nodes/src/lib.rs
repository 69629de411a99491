//! Built-in node packs for the Pandaflow compiler.
//!
//! Each module is one pack: a catalog of [`NodeDefinition`]s whose
//! generators emit pandas / scikit-learn Python through the core's
//! [`py`](pandaflow_graph_core::py) helpers. Packs are plain
//! `Vec<NodeDefinition>` values; hosts ingest them with
//! [`Registry::register_all`] (or all at once via [`register_builtins`]),
//! collecting per-definition failures instead of aborting the batch.

use pandaflow_graph_core::{NodeDefinition, RegisterFailure, Registry};

pub mod cleaning;
pub mod dataset;
pub mod evaluation;
pub mod features;
pub mod models;
mod support;

/// Every built-in pack, in catalog order.
pub fn builtin_packs() -> Vec<NodeDefinition> {
    let mut definitions = Vec::new();
    definitions.extend(dataset::definitions());
    definitions.extend(cleaning::definitions());
    definitions.extend(features::definitions());
    definitions.extend(models::definitions());
    definitions.extend(evaluation::definitions());
    definitions
}

/// Register every built-in pack, returning the entries that failed.
pub fn register_builtins(registry: &mut Registry) -> Vec<RegisterFailure> {
    registry.register_all(builtin_packs())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_builtin_registers_cleanly() {
        let mut registry = Registry::new();
        let failures = register_builtins(&mut registry);
        assert!(failures.is_empty(), "failures: {failures:?}");
        assert_eq!(registry.len(), builtin_packs().len());
    }

    #[test]
    fn type_ids_are_unique_across_packs() {
        let mut seen = std::collections::HashSet::new();
        for definition in builtin_packs() {
            assert!(
                seen.insert(definition.type_id),
                "duplicate type id `{}`",
                definition.type_id
            );
        }
    }

    #[test]
    fn every_builtin_passes_definition_validation() {
        for definition in builtin_packs() {
            pandaflow_graph_core::validate_definition(&definition)
                .unwrap_or_else(|e| panic!("{}: {e}", definition.type_id));
        }
    }
}
