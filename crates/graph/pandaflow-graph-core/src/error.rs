use std::fmt;

use thiserror::Error;

use crate::types::NodeId;

/// Errors raised while registering node definitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("invalid node definition `{type_id}`: {reason}")]
    DefinitionInvalid { type_id: String, reason: String },
    #[error("node type `{0}` is already registered")]
    DuplicateType(String),
    #[error("unknown node type `{0}`")]
    UnknownType(String),
}

/// Errors raised by the per-run [`CompileContext`](crate::context::CompileContext).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    /// A generator tried to change a node's already-bound output variable.
    /// Rebinding the same name is a no-op; generators must be idempotent.
    #[error("node `{node_id}` output is bound to `{bound}`, refusing rebind to `{attempted}`")]
    Rebind {
        node_id: NodeId,
        bound: String,
        attempted: String,
    },
    /// A downstream consumer asked for a variable before the node was
    /// generated. This is an ordering bug in the compiler, not a user error.
    #[error("node `{0}` has no bound output variable yet")]
    Unbound(NodeId),
}

/// One property that failed instance validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyViolation {
    pub property: String,
    pub reason: String,
}

impl fmt::Display for PropertyViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.property, self.reason)
    }
}

/// Per-node failure during a compilation run. Every variant degrades to a
/// placeholder line in the script; none of them aborts the run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenerateError {
    #[error("unknown node type `{0}`")]
    UnknownType(String),
    #[error("invalid properties: {}", format_violations(.0))]
    Validation(Vec<PropertyViolation>),
    #[error(transparent)]
    Context(#[from] ContextError),
    #[error("generator failed: {0}")]
    Generator(String),
}

fn format_violations(violations: &[PropertyViolation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Whole-graph failures. These are the only errors that abort a compilation
/// run; everything else is isolated to its node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("graph contains a cycle through: {}", .ids.join(", "))]
    CyclicGraph { ids: Vec<NodeId> },
    #[error("duplicate node id `{0}` in graph")]
    DuplicateNodeId(NodeId),
}
