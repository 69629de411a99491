//! Fixture graphs parse into the core types and order deterministically.

use pandaflow_graph_core::{topo_order, CompileError, GraphSpec};

#[test]
fn every_fixture_deserializes_into_a_graph() {
    for name in pandaflow_test_fixtures::graph_names() {
        let graph: GraphSpec =
            pandaflow_test_fixtures::load_graph(&name).expect("fixture should load");
        assert!(!graph.nodes.is_empty(), "{name} has no nodes");
    }
}

#[test]
fn cluster_pipeline_orders_upstream_first() {
    let graph: GraphSpec = pandaflow_test_fixtures::load_graph("cluster-pipeline").unwrap();
    assert_eq!(topo_order(&graph).unwrap(), vec!["load", "scale", "cluster"]);
}

#[test]
fn cyclic_fixture_is_rejected() {
    let graph: GraphSpec = pandaflow_test_fixtures::load_graph("cyclic").unwrap();
    assert!(matches!(
        topo_order(&graph),
        Err(CompileError::CyclicGraph { .. })
    ));
}
