//! Canned source for tests and offline runs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::RelatedTopicsSource;
use crate::error::GraphError;

/// Suffixes used to generate offline related topics.
const OFFLINE_TEMPLATES: &[&str] = &[
    "Fundamentos de {}",
    "Historia de {}",
    "Conceptos avanzados de {}",
    "Aplicaciones prácticas de {}",
    "Grandes figuras de {}",
    "Debates actuales en {}",
];

#[derive(Debug, Clone)]
enum Canned {
    Body(String),
    Failure(String),
}

/// Source that answers from a fixed table without touching the network.
///
/// Topics without a canned entry get a generated `{"relatedTopics": [...]}`
/// body built from fixed templates.
#[derive(Debug, Default)]
pub struct StaticTopicSource {
    responses: HashMap<String, Canned>,
    calls: AtomicUsize,
}

impl StaticTopicSource {
    /// Create a source with no canned entries.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `topic` with the given raw body.
    pub fn with_response(mut self, topic: impl Into<String>, body: impl Into<String>) -> Self {
        self.responses
            .insert(topic.into(), Canned::Body(body.into()));
        self
    }

    /// Fail every request for `topic` with an upstream error.
    pub fn with_failure(mut self, topic: impl Into<String>, message: impl Into<String>) -> Self {
        self.responses
            .insert(topic.into(), Canned::Failure(message.into()));
        self
    }

    /// Number of requests served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn generated(topic: &str, count: usize) -> String {
        let names: Vec<String> = OFFLINE_TEMPLATES
            .iter()
            .cycle()
            .take(count)
            .enumerate()
            .map(|(i, template)| {
                let name = template.replace("{}", topic);
                if i < OFFLINE_TEMPLATES.len() {
                    name
                } else {
                    format!("{} {}", name, i / OFFLINE_TEMPLATES.len() + 1)
                }
            })
            .collect();
        serde_json::json!({ "relatedTopics": names }).to_string()
    }
}

#[async_trait]
impl RelatedTopicsSource for StaticTopicSource {
    async fn request(&self, topic: &str, count: usize) -> Result<String, GraphError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.responses.get(topic) {
            Some(Canned::Body(body)) => Ok(body.clone()),
            Some(Canned::Failure(message)) => Err(GraphError::UpstreamFailure(message.clone())),
            None => Ok(Self::generated(topic, count)),
        }
    }

    fn name(&self) -> &str {
        "static"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::{parse_payload, RelatedTopicsPayload};

    #[tokio::test]
    async fn test_canned_response() {
        let source = StaticTopicSource::new().with_response("Historia", "[\"Edad Media\"]");
        assert_eq!(source.request("Historia", 5).await.unwrap(), "[\"Edad Media\"]");
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_canned_failure() {
        let source = StaticTopicSource::new().with_failure("Historia", "connection refused");
        assert!(matches!(
            source.request("Historia", 5).await,
            Err(GraphError::UpstreamFailure(_))
        ));
    }

    #[tokio::test]
    async fn test_generated_response_parses() {
        let source = StaticTopicSource::new();
        let body = source.request("Química", 8).await.unwrap();

        match parse_payload(&body).unwrap() {
            RelatedTopicsPayload::BareArray(names) => {
                assert_eq!(names.len(), 8);
                assert_eq!(names[0], "Fundamentos de Química");
                assert_eq!(names[6], "Fundamentos de Química 2");
                let unique: std::collections::HashSet<_> = names.iter().collect();
                assert_eq!(unique.len(), 8);
            }
            other => panic!("unexpected payload: {:?}", other),
        }
    }
}
