//! Per-run variable-binding state threaded through node generators.

use hashbrown::{HashMap, HashSet};

use crate::error::ContextError;
use crate::types::{Edge, NodeId, NodeInstance};

/// Variable name a generator sees when its node has no upstream binding.
/// The fallback lets a single node's generator be exercised standalone.
pub const DEFAULT_INPUT_VAR: &str = "df";

/// The variable-naming contract between nodes during one compilation run.
///
/// The compiler creates one context per run and discards it with the run;
/// contexts are never shared between runs. Each generator reads the variable
/// holding its upstream node's output via [`input_var`](Self::input_var),
/// emits code, then records the variable holding its own output via
/// [`bind_output`](Self::bind_output). Bindings are write-once: a node's
/// output variable never changes mid-run.
#[derive(Debug, Default)]
pub struct CompileContext {
    upstream: HashMap<NodeId, NodeId>,
    bindings: HashMap<NodeId, String>,
}

impl CompileContext {
    /// Build a context for a graph's edge set. When a target has several
    /// incoming edges, the first one in edge order is its primary input.
    pub fn new(edges: &[Edge]) -> Self {
        let mut upstream = HashMap::new();
        for edge in edges {
            upstream
                .entry(edge.target.clone())
                .or_insert_with(|| edge.source.clone());
        }
        CompileContext {
            upstream,
            bindings: HashMap::new(),
        }
    }

    /// Variable holding the upstream node's output, or [`DEFAULT_INPUT_VAR`]
    /// when the node has no upstream or the upstream is unbound.
    /// Deterministic for a fixed edge set and binding state; no side effects.
    pub fn input_var(&self, node: &NodeInstance) -> String {
        self.upstream
            .get(&node.id)
            .and_then(|source| self.bindings.get(source))
            .cloned()
            .unwrap_or_else(|| DEFAULT_INPUT_VAR.to_string())
    }

    /// Record the variable holding `node_id`'s output. Binding the same name
    /// again is a no-op; a different name is a [`ContextError::Rebind`].
    pub fn bind_output(
        &mut self,
        node_id: &str,
        var: impl Into<String>,
    ) -> Result<(), ContextError> {
        let var = var.into();
        match self.bindings.get(node_id) {
            Some(bound) if *bound == var => Ok(()),
            Some(bound) => Err(ContextError::Rebind {
                node_id: node_id.to_string(),
                bound: bound.clone(),
                attempted: var,
            }),
            None => {
                self.bindings.insert(node_id.to_string(), var);
                Ok(())
            }
        }
    }

    /// First free variant of `base` among the current bindings: `base`
    /// itself, else `base_2`, `base_3`, … Keeps sibling nodes that derive
    /// the same `<input>_<suffix>` name from clobbering each other.
    /// Deterministic because nodes are generated in a fixed order.
    pub fn unique_var(&self, base: &str) -> String {
        let taken: HashSet<&str> = self.bindings.values().map(String::as_str).collect();
        if !taken.contains(base) {
            return base.to_string();
        }
        let mut n = 2;
        loop {
            let candidate = format!("{base}_{n}");
            if !taken.contains(candidate.as_str()) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Variable bound for `node_id`, if its generator has already run.
    pub fn output_var(&self, node_id: &str) -> Option<&str> {
        self.bindings.get(node_id).map(String::as_str)
    }

    /// Like [`output_var`](Self::output_var), but an unbound node is an
    /// internal-consistency failure: the graph order guarantees upstream
    /// generators run first.
    pub fn require_output_var(&self, node_id: &str) -> Result<&str, ContextError> {
        self.output_var(node_id)
            .ok_or_else(|| ContextError::Unbound(node_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_var_falls_back_to_df() {
        let ctx = CompileContext::default();
        let node = NodeInstance::new("n1", "noop");
        assert_eq!(ctx.input_var(&node), DEFAULT_INPUT_VAR);
    }

    #[test]
    fn input_var_follows_the_upstream_edge() {
        let mut ctx = CompileContext::new(&[Edge::new("a", "b")]);
        ctx.bind_output("a", "X_scaled").unwrap();
        let b = NodeInstance::new("b", "noop");
        assert_eq!(ctx.input_var(&b), "X_scaled");
    }

    #[test]
    fn first_incoming_edge_wins() {
        let mut ctx = CompileContext::new(&[Edge::new("a", "c"), Edge::new("b", "c")]);
        ctx.bind_output("a", "left").unwrap();
        ctx.bind_output("b", "right").unwrap();
        let c = NodeInstance::new("c", "noop");
        assert_eq!(ctx.input_var(&c), "left");
    }

    #[test]
    fn rebinding_same_value_is_idempotent() {
        let mut ctx = CompileContext::default();
        ctx.bind_output("n", "a").unwrap();
        ctx.bind_output("n", "a").unwrap();
        assert_eq!(ctx.output_var("n"), Some("a"));
    }

    #[test]
    fn rebinding_different_value_fails() {
        let mut ctx = CompileContext::default();
        ctx.bind_output("n", "a").unwrap();
        let err = ctx.bind_output("n", "b").unwrap_err();
        assert!(matches!(err, ContextError::Rebind { .. }));
        assert_eq!(ctx.output_var("n"), Some("a"));
    }

    #[test]
    fn unique_var_skips_taken_names() {
        let mut ctx = CompileContext::default();
        assert_eq!(ctx.unique_var("df"), "df");
        ctx.bind_output("a", "df").unwrap();
        assert_eq!(ctx.unique_var("df"), "df_2");
        ctx.bind_output("b", "df_2").unwrap();
        assert_eq!(ctx.unique_var("df"), "df_3");
    }

    #[test]
    fn unbound_output_is_an_internal_error() {
        let ctx = CompileContext::default();
        assert_eq!(ctx.output_var("n"), None);
        assert!(matches!(
            ctx.require_output_var("n"),
            Err(ContextError::Unbound(_))
        ));
    }
}
