//! Persistence collaborator for main topics.

use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;

use async_trait::async_trait;
use tracing::debug;

use learnpath_types::Topic;

use crate::error::GraphError;

/// Read access to a user's topics.
#[async_trait]
pub trait TopicStore: Send + Sync {
    /// Look up one topic. `Ok(None)` when the user has no such topic.
    async fn get_topic_details(
        &self,
        user_id: &str,
        topic_id: &str,
    ) -> Result<Option<Topic>, GraphError>;
}

/// Topics held in memory, keyed by user id then topic id.
#[derive(Debug, Default)]
pub struct InMemoryTopicStore {
    topics: RwLock<HashMap<String, HashMap<String, Topic>>>,
}

impl InMemoryTopicStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a JSON array of topics and register them for `user_id`.
    pub fn from_json_file(user_id: &str, path: &Path) -> Result<Self, GraphError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            GraphError::Store(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(user_id, &content)
    }

    /// Parse a JSON array of topics and register them for `user_id`.
    pub fn from_json_str(user_id: &str, content: &str) -> Result<Self, GraphError> {
        let topics: Vec<Topic> = serde_json::from_str(content)
            .map_err(|e| GraphError::Store(format!("Invalid topics file: {}", e)))?;

        let store = Self::new();
        for topic in topics {
            store.insert(user_id, topic);
        }
        debug!(user_id = %user_id, count = store.len(user_id), "Loaded topics");
        Ok(store)
    }

    /// Register or replace a topic for a user.
    pub fn insert(&self, user_id: &str, topic: Topic) {
        let mut topics = self.topics.write().unwrap_or_else(|p| p.into_inner());
        topics
            .entry(user_id.to_string())
            .or_default()
            .insert(topic.id.clone(), topic);
    }

    /// Number of topics stored for a user.
    pub fn len(&self, user_id: &str) -> usize {
        self.topics
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .get(user_id)
            .map_or(0, HashMap::len)
    }

    pub fn is_empty(&self, user_id: &str) -> bool {
        self.len(user_id) == 0
    }
}

#[async_trait]
impl TopicStore for InMemoryTopicStore {
    async fn get_topic_details(
        &self,
        user_id: &str,
        topic_id: &str,
    ) -> Result<Option<Topic>, GraphError> {
        let topics = self.topics.read().unwrap_or_else(|p| p.into_inner());
        Ok(topics
            .get(user_id)
            .and_then(|by_id| by_id.get(topic_id))
            .cloned())
    }
}
