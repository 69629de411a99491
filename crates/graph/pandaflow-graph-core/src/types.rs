use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

pub type NodeId = String;

/// One placed operation inside a graph: a reference to a registered node
/// type plus the concrete property values the user picked in the editor.
///
/// `data` holds raw JSON property values; the compiler merges them over the
/// definition's defaults and validates the result before the node's
/// generator runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeInstance {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub type_id: String,
    #[serde(default)]
    pub data: HashMap<String, serde_json::Value>,
}

impl NodeInstance {
    pub fn new(id: impl Into<NodeId>, type_id: impl Into<String>) -> Self {
        NodeInstance {
            id: id.into(),
            type_id: type_id.into(),
            data: HashMap::new(),
        }
    }
}

/// Directed connection from `source`'s output to `target`'s input.
///
/// Nodes are single-output; when a target has several incoming edges the
/// first one in edge order is its primary input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
}

impl Edge {
    pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
        Edge {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// A full editor graph. The order of `nodes` is the insertion order and is
/// used as the deterministic tie-break when topologically ordering nodes
/// with no dependency between them.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GraphSpec {
    pub nodes: Vec<NodeInstance>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}
