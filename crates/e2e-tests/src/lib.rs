//! End-to-end test infrastructure for learnpath.
//!
//! Provides a shared TestHarness and helper functions for E2E tests
//! covering the topics-to-learning-path pipeline.

use std::path::PathBuf;
use std::sync::Arc;

use learnpath_graph::{
    GraphBuilder, InMemoryTopicStore, NoJitter, RecordingSleeper, RelatedTopicsFetcher,
    RelatedTopicsSource, RelationScorer, RetryPolicy,
};
use learnpath_types::{GraphSettings, Topic};

/// User owning every topic registered through the harness.
pub const USER_ID: &str = "user-e2e";

/// Shared test harness for E2E tests.
///
/// Holds the topic store, a topics file on disk and the graph settings used
/// to assemble builders.
pub struct TestHarness {
    /// Keeps temp dir alive for the lifetime of the harness
    pub _temp_dir: tempfile::TempDir,
    /// Topics registered for [`USER_ID`]
    pub store: Arc<InMemoryTopicStore>,
    /// Same topics serialized as a JSON array
    pub topics_file: PathBuf,
    pub settings: GraphSettings,
    /// Records retry delays instead of sleeping
    pub sleeper: Arc<RecordingSleeper>,
}

impl TestHarness {
    /// Create a harness with the given `(id, name)` topics.
    pub fn new(topics: &[(&str, &str)]) -> Self {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");

        let topics: Vec<Topic> = topics
            .iter()
            .map(|(id, name)| Topic::new(*id, *name))
            .collect();

        let topics_file = temp_dir.path().join("topics.json");
        let json = serde_json::to_string_pretty(&topics).expect("Failed to serialize topics");
        std::fs::write(&topics_file, json).expect("Failed to write topics file");

        let store = InMemoryTopicStore::new();
        for topic in topics {
            store.insert(USER_ID, topic);
        }

        Self {
            _temp_dir: temp_dir,
            store: Arc::new(store),
            topics_file,
            settings: GraphSettings::default(),
            sleeper: Arc::new(RecordingSleeper::new()),
        }
    }

    /// Fetcher over `source` with deterministic scoring and recorded retries.
    pub fn fetcher(&self, source: Arc<dyn RelatedTopicsSource>) -> RelatedTopicsFetcher {
        let scorer = RelationScorer::with_jitter(&self.settings.scoring, Arc::new(NoJitter));
        let retry = RetryPolicy::from_settings(&self.settings.retry).with_sleeper(self.sleeper.clone());
        RelatedTopicsFetcher::new(source, &self.settings)
            .with_scorer(scorer)
            .with_retry(retry)
    }

    /// Builder over the harness store and `fetcher`.
    pub fn builder(&self, fetcher: RelatedTopicsFetcher) -> GraphBuilder {
        GraphBuilder::new(self.store.clone(), Arc::new(fetcher), &self.settings)
    }

    /// Builder over the harness store and a fetcher for `source`.
    pub fn builder_for(&self, source: Arc<dyn RelatedTopicsSource>) -> GraphBuilder {
        self.builder(self.fetcher(source))
    }
}

/// Owned topic ids from string literals.
pub fn ids(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// A `{"relatedTopics": [{name, relevanceScore}]}` body.
pub fn scored_body(topics: &[(&str, f64)]) -> String {
    let entries: Vec<serde_json::Value> = topics
        .iter()
        .map(|(name, score)| serde_json::json!({ "name": name, "relevanceScore": score }))
        .collect();
    serde_json::json!({ "relatedTopics": entries }).to_string()
}
