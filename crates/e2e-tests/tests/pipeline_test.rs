//! End-to-end pipeline tests for learnpath.
//!
//! E2E-P1: Topics file -> store -> offline source -> graph JSON
//! E2E-P2: Graph JSON round-trips and plans identically after reload

use std::sync::Arc;

use pretty_assertions::assert_eq;

use e2e_tests::{ids, TestHarness};
use learnpath_graph::{
    source_from_settings, GraphBuilder, InMemoryTopicStore, PathPlanner, StaticTopicSource,
};
use learnpath_types::{KnowledgeGraph, SourceProvider, SourceSettings};

/// E2E-P1: The graph serializes with the node/link field names consumers
/// expect.
#[tokio::test]
async fn test_topics_file_to_graph_json() {
    let harness = TestHarness::new(&[("t1", "Historia"), ("t2", "Química")]);
    let store = InMemoryTopicStore::from_json_file("cli-user", &harness.topics_file)
        .expect("Failed to load topics file");
    assert_eq!(store.len("cli-user"), 2);

    let source = source_from_settings(&SourceSettings {
        provider: SourceProvider::Static,
        ..Default::default()
    })
    .expect("Failed to create static source");

    let mut settings = harness.settings.clone();
    settings.related_per_topic = 2;
    let builder = GraphBuilder::new(Arc::new(store), Arc::new(harness.fetcher(source)), &settings);
    let graph = builder.build("cli-user", &ids(&["t1", "t2"])).await;

    assert_eq!(graph.node_count(), 6);
    assert_eq!(graph.edge_count(), 4);

    let json = serde_json::to_value(&graph).expect("Failed to serialize graph");
    let nodes = json["nodes"].as_array().expect("nodes array");
    let links = json["links"].as_array().expect("links array");
    assert_eq!(nodes.len(), 6);
    assert_eq!(links.len(), 4);

    assert_eq!(nodes[0]["id"], "t1");
    assert_eq!(nodes[0]["name"], "Historia");
    assert_eq!(nodes[0]["difficulty"], "medium");

    let link = &links[0];
    assert_eq!(link["source"], "t1");
    assert!(link["target"].is_string());
    assert!(link["weight"].as_f64().is_some_and(|w| (1.0..=10.0).contains(&w)));
    let kind = link["type"].as_str().expect("link type");
    assert!(kind == "fundamental" || kind == "indirect");
}

/// E2E-P2: A graph read back from JSON plans the same way.
#[tokio::test]
async fn test_graph_json_roundtrip_plans_identically() {
    let harness = TestHarness::new(&[("t1", "Historia")]);
    let graph = harness
        .builder_for(Arc::new(StaticTopicSource::new()))
        .build(e2e_tests::USER_ID, &ids(&["t1"]))
        .await;
    assert_eq!(graph.edge_count(), harness.settings.related_per_topic);

    let json = serde_json::to_string(&graph).expect("Failed to serialize graph");
    let reloaded: KnowledgeGraph = serde_json::from_str(&json).expect("Failed to parse graph");
    assert_eq!(reloaded, graph);

    let planner = PathPlanner::new();
    let mains = ids(&["t1"]);
    assert_eq!(
        planner.ranked_path(&reloaded, &mains),
        planner.ranked_path(&graph, &mains)
    );
    assert_eq!(
        planner.shortest_path(&reloaded, "t1"),
        planner.shortest_path(&graph, "t1")
    );
    assert_eq!(planner.ranked_path(&graph, &mains).len(), graph.node_count());
}
