//! Graph-to-script compilation pipeline.
//!
//! [`compile`] turns a [`GraphSpec`](crate::types::GraphSpec) into one
//! sequentially executable Python script by walking the graph in
//! topological order:
//!
//! - duplicate node ids and cycles fail the whole run (`Validating`);
//! - [`topo_order`](crate::topo::topo_order) fixes a deterministic node
//!   order (`Ordering`);
//! - each node's definition is resolved, its data merged over defaults and
//!   validated, and its generator invoked with the shared
//!   [`CompileContext`](crate::context::CompileContext) (`Generating`).
//!
//! Per-node failures are isolated: the node degrades to a commented
//! placeholder line and a recorded [`NodeError`], and the rest of the graph
//! still compiles. A cycle is the only unrecoverable case.

use hashbrown::HashSet;

use crate::context::CompileContext;
use crate::error::{CompileError, GenerateError};
use crate::registry::Registry;
use crate::topo::topo_order;
use crate::types::{GraphSpec, NodeId, NodeInstance};
use crate::validate::{merged_data, validate_instance};


/// Fixed first lines of every generated script.
const PRELUDE: &str = "import pandas as pd\n";

/// Per-node failure recorded during a run.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeError {
    pub node_id: NodeId,
    pub error: GenerateError,
}

/// Outcome of a compilation run: the assembled script, per-node failures,
/// and the node order used. Compiling the same graph twice yields a
/// byte-identical script and an identical order.
#[derive(Debug, Clone, PartialEq)]
pub struct CompileResult {
    pub script: String,
    pub errors: Vec<NodeError>,
    pub order: Vec<NodeId>,
}

impl CompileResult {
    /// True when every node generated code.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Compile a graph into one Python script.
///
/// Only [`CompileError`] aborts (a cycle, or duplicate node ids); every
/// per-node problem is recorded in [`CompileResult::errors`] and replaced
/// by a placeholder line in the script.
pub fn compile(registry: &Registry, graph: &GraphSpec) -> Result<CompileResult, CompileError> {
    log::debug!(
        "validating graph: {} nodes, {} edges",
        graph.nodes.len(),
        graph.edges.len()
    );
    let mut seen = HashSet::new();
    for node in &graph.nodes {
        if !seen.insert(node.id.as_str()) {
            return Err(CompileError::DuplicateNodeId(node.id.clone()));
        }
    }

    log::debug!("ordering nodes");
    let order = topo_order(graph)?;

    log::debug!("generating fragments");
    let mut context = CompileContext::new(&graph.edges);
    let mut script = String::from(PRELUDE);
    let mut errors = Vec::new();
    for node_id in &order {
        let node = graph
            .nodes
            .iter()
            .find(|n| n.id == *node_id)
            .expect("ordered ids come from the node list");
        script.push('\n');
        script.push_str(&boundary_marker(node));
        match generate_node(registry, node, &mut context) {
            Ok(fragment) => {
                script.push_str(fragment.trim_end());
                script.push('\n');
            }
            Err(error) => {
                log::warn!("node `{}` degraded to a placeholder: {error}", node.id);
                script.push_str(&placeholder(&error));
                errors.push(NodeError {
                    node_id: node.id.clone(),
                    error,
                });
            }
        }
    }

    Ok(CompileResult {
        script,
        errors,
        order,
    })
}

fn generate_node(
    registry: &Registry,
    node: &NodeInstance,
    context: &mut CompileContext,
) -> Result<String, GenerateError> {
    let definition = registry
        .resolve(&node.type_id)
        .map_err(|_| GenerateError::UnknownType(node.type_id.clone()))?;
    let merged = merged_data(definition, node);
    validate_instance(definition, &merged).map_err(GenerateError::Validation)?;
    let resolved = NodeInstance {
        id: node.id.clone(),
        type_id: node.type_id.clone(),
        data: merged,
    };
    (definition.generate)(&resolved, context)
}

/// Comment line mapping a script region back to its node.
pub fn boundary_marker(node: &NodeInstance) -> String {
    format!("# --- node: {} ({}) ---\n", node.id, node.type_id)
}

fn placeholder(error: &GenerateError) -> String {
    format!("# skipped: {error}\n")
}
