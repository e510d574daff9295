//! Knowledge-graph assembly.
//!
//! Main topics are resolved through the [`TopicStore`], related topics through
//! a [`RelatedTopicsLookup`]. Output order is deterministic: main topics in
//! input order, then related topics in first-discovery order.

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;
use futures::stream::{self, StreamExt};
use tracing::{debug, error, info, instrument, warn};

use learnpath_types::{Difficulty, GraphEdge, GraphNode, GraphSettings, KnowledgeGraph, Topic};

use crate::error::GraphError;
use crate::fetcher::RelatedTopicsLookup;
use crate::store::TopicStore;

/// Builds a [`KnowledgeGraph`] for a set of main topics.
pub struct GraphBuilder {
    store: Arc<dyn TopicStore>,
    lookup: Arc<dyn RelatedTopicsLookup>,
    related_per_topic: usize,
    max_concurrent_fetches: usize,
}

impl GraphBuilder {
    pub fn new(
        store: Arc<dyn TopicStore>,
        lookup: Arc<dyn RelatedTopicsLookup>,
        settings: &GraphSettings,
    ) -> Self {
        Self {
            store,
            lookup,
            related_per_topic: settings.related_per_topic,
            max_concurrent_fetches: settings.max_concurrent_fetches.max(1),
        }
    }

    /// Build the graph for `main_topic_ids` owned by `user_id`.
    ///
    /// Never fails. Unknown topics and failed lookups are logged and skipped.
    #[instrument(skip(self, main_topic_ids), fields(requested = main_topic_ids.len()))]
    pub async fn build(&self, user_id: &str, main_topic_ids: &[String]) -> KnowledgeGraph {
        let mut seen = HashSet::new();
        let ids: Vec<&str> = main_topic_ids
            .iter()
            .map(String::as_str)
            .filter(|id| seen.insert(*id))
            .collect();

        if ids.is_empty() {
            debug!("No main topics requested");
            return KnowledgeGraph::new();
        }

        let topics = self.resolve(user_id, &ids).await;

        let mut graph = KnowledgeGraph::new();
        let mut node_ids: HashSet<String> = HashSet::new();

        for topic in &topics {
            if node_ids.insert(topic.id.clone()) {
                graph.nodes.push(GraphNode::new(
                    topic.id.clone(),
                    topic.name.clone(),
                    Difficulty::Medium,
                ));
            }
        }

        let count = self.related_per_topic;
        let fetched: Vec<_> = stream::iter(topics.iter())
            .map(|topic| async move {
                let related = self.lookup.related_topics(&topic.name, count).await;
                (topic, related)
            })
            .buffered(self.max_concurrent_fetches)
            .collect()
            .await;

        for (topic, result) in fetched {
            let related = match result {
                Ok(related) => related,
                Err(e) => {
                    warn!(
                        topic_id = %topic.id,
                        topic = %topic.name,
                        error = %e,
                        "Related topics lookup failed, keeping main topic without links"
                    );
                    continue;
                }
            };

            for rel in related {
                if node_ids.insert(rel.id.clone()) {
                    graph.nodes.push(GraphNode::new(
                        rel.id.clone(),
                        rel.name.clone(),
                        rel.relation_type.node_difficulty(),
                    ));
                }
                graph.links.push(GraphEdge::new(
                    topic.id.clone(),
                    rel.id,
                    rel.weight,
                    rel.relation_type,
                ));
            }
        }

        if let Err(e) = verify(&graph) {
            error!(error = %e, "Built graph is inconsistent");
        }

        info!(
            user_id = %user_id,
            main_topics = topics.len(),
            nodes = graph.node_count(),
            links = graph.edge_count(),
            "Knowledge graph built"
        );

        graph
    }

    /// Look up main topics concurrently, keeping input order.
    async fn resolve(&self, user_id: &str, ids: &[&str]) -> Vec<Topic> {
        let lookups = ids
            .iter()
            .map(|id| self.store.get_topic_details(user_id, id));
        let results = join_all(lookups).await;

        let mut topics = Vec::with_capacity(ids.len());
        for (id, result) in ids.iter().zip(results) {
            match result.and_then(|found| require_topic(id, found)) {
                Ok(topic) => topics.push(topic),
                Err(e @ GraphError::NotFound(_)) => {
                    warn!(user_id = %user_id, error = %e, "Topic not found, skipping");
                }
                Err(e) => {
                    warn!(
                        user_id = %user_id,
                        topic_id = %id,
                        error = %e,
                        "Topic lookup failed, skipping"
                    );
                }
            }
        }
        topics
    }
}

fn require_topic(id: &str, found: Option<Topic>) -> Result<Topic, GraphError> {
    found.ok_or_else(|| GraphError::NotFound(id.to_string()))
}

/// Check that node ids are unique and every link references known nodes.
pub fn verify(graph: &KnowledgeGraph) -> Result<(), GraphError> {
    let mut ids = HashSet::with_capacity(graph.nodes.len());
    for node in &graph.nodes {
        if !ids.insert(node.id.as_str()) {
            return Err(GraphError::GraphInconsistency(format!(
                "duplicate node id {}",
                node.id
            )));
        }
    }

    for link in &graph.links {
        for end in [&link.source, &link.target] {
            if !ids.contains(end.as_str()) {
                return Err(GraphError::GraphInconsistency(format!(
                    "link {} -> {} references unknown node {}",
                    link.source, link.target, end
                )));
            }
        }
    }

    Ok(())
}
