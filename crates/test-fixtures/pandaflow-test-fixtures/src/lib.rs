//! Shared graph fixtures for Pandaflow crates.
//!
//! Fixture graphs live under the repository's `fixtures/` directory and are
//! enumerated by `fixtures/manifest.json`; tests load them by manifest name
//! and deserialize into their own graph type.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(rename = "node-graphs")]
    node_graphs: HashMap<String, GraphEntry>,
}

#[derive(Debug, Deserialize)]
struct GraphEntry {
    spec: String,
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn read_to_string(rel: &str) -> Result<String> {
    let path = fixtures_root().join(rel);
    fs::read_to_string(&path)
        .with_context(|| format!("failed to read fixture at {}", path.display()))
}

/// Names of every graph fixture, sorted for stable iteration.
pub fn graph_names() -> Vec<String> {
    let mut names: Vec<String> = MANIFEST.node_graphs.keys().cloned().collect();
    names.sort();
    names
}

/// Load a graph fixture by manifest name into the caller's graph type.
pub fn load_graph<T: DeserializeOwned>(name: &str) -> Result<T> {
    let entry = MANIFEST
        .node_graphs
        .get(name)
        .ok_or_else(|| anyhow!("unknown graph fixture `{name}`"))?;
    let raw = read_to_string(&entry.spec)?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse graph fixture `{name}`"))
}
