//! Related-topic fetching with deterministic fallback.
//!
//! The fetcher is total: whatever happens upstream (transport errors, non-2xx
//! statuses, timeouts, unparseable or oddly shaped bodies) the caller gets a
//! usable list of related topics. On failure that list is the two fallback
//! placeholders from [`fallback_topics`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error, instrument};

use learnpath_types::{GraphSettings, RelatedTopic, RelationType};

use crate::error::GraphError;
use crate::payload::{parse_payload, RelatedTopicsPayload};
use crate::retry::RetryPolicy;
use crate::scorer::RelationScorer;
use crate::source::RelatedTopicsSource;

/// Weight of the fundamental fallback topic.
const FALLBACK_FUNDAMENTAL_WEIGHT: f64 = 8.0;

/// Weight of the indirect fallback topic.
const FALLBACK_INDIRECT_WEIGHT: f64 = 6.0;

/// Lookup of related topics as seen by the graph builder.
#[async_trait]
pub trait RelatedTopicsLookup: Send + Sync {
    /// Return topics related to `topic_name`, ranked.
    async fn related_topics(
        &self,
        topic_name: &str,
        count: usize,
    ) -> Result<Vec<RelatedTopic>, GraphError>;
}

/// The two placeholder topics returned whenever a fetch fails.
pub fn fallback_topics(topic_name: &str) -> Vec<RelatedTopic> {
    vec![
        RelatedTopic::with_relation(
            format!("Conceptos básicos de {}", topic_name),
            0,
            RelationType::Fundamental,
            FALLBACK_FUNDAMENTAL_WEIGHT,
        ),
        RelatedTopic::with_relation(
            format!("Aplicaciones de {}", topic_name),
            1,
            RelationType::Indirect,
            FALLBACK_INDIRECT_WEIGHT,
        ),
    ]
}

/// Fetches, parses and scores related topics from a text-generation source.
pub struct RelatedTopicsFetcher {
    source: Arc<dyn RelatedTopicsSource>,
    scorer: RelationScorer,
    retry: RetryPolicy,
    timeout: Duration,
}

impl RelatedTopicsFetcher {
    /// Create a fetcher with scoring, retry and timeout taken from settings.
    pub fn new(source: Arc<dyn RelatedTopicsSource>, settings: &GraphSettings) -> Self {
        Self {
            source,
            scorer: RelationScorer::new(&settings.scoring),
            retry: RetryPolicy::from_settings(&settings.retry),
            timeout: Duration::from_secs(settings.fetch_timeout_secs),
        }
    }

    /// Replace the scorer.
    pub fn with_scorer(mut self, scorer: RelationScorer) -> Self {
        self.scorer = scorer;
        self
    }

    /// Replace the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Replace the per-attempt timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Fetch up to `count` related topics for `topic_name`.
    ///
    /// Extra entries in the response are dropped after ranking. Never fails:
    /// any error is logged and replaced by the two fallback topics.
    #[instrument(skip(self))]
    pub async fn fetch(&self, topic_name: &str, count: usize) -> Vec<RelatedTopic> {
        let raw = match self.request(topic_name, count).await {
            Ok(raw) => raw,
            Err(e) => {
                error!(
                    topic = %topic_name,
                    source = %self.source.name(),
                    error = %e,
                    "Related topics request failed, using fallback"
                );
                return fallback_topics(topic_name);
            }
        };

        match parse_payload(&raw) {
            Ok(payload) => {
                let topics = self.rank(topic_name, payload, count);
                debug!(
                    topic = %topic_name,
                    count = topics.len(),
                    "Related topics resolved"
                );
                topics
            }
            Err(e) => {
                error!(
                    topic = %topic_name,
                    raw = %raw,
                    error = %e,
                    "Could not parse related topics, using fallback"
                );
                fallback_topics(topic_name)
            }
        }
    }

    /// Issue the request under the retry policy, bounding each attempt.
    async fn request(&self, topic_name: &str, count: usize) -> Result<String, GraphError> {
        let timeout = self.timeout;
        self.retry
            .run(topic_name, |_| async move {
                match tokio::time::timeout(timeout, self.source.request(topic_name, count)).await {
                    Ok(result) => result,
                    Err(_) => Err(GraphError::Timeout),
                }
            })
            .await
    }

    /// Turn a parsed payload into ranked related topics.
    fn rank(
        &self,
        topic_name: &str,
        payload: RelatedTopicsPayload,
        count: usize,
    ) -> Vec<RelatedTopic> {
        match payload {
            RelatedTopicsPayload::ScoredArray(scored) => scored
                .into_iter()
                .take(count)
                .enumerate()
                .map(|(i, s)| RelatedTopic::from_score(s.name, i, s.relevance_score))
                .collect(),
            RelatedTopicsPayload::BareArray(names) => {
                let scores = self.scorer.score_unique(&names, topic_name);
                let mut ranked: Vec<(String, f64)> = names.into_iter().zip(scores).collect();
                ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
                ranked.truncate(count);

                for (i, (name, score)) in ranked.iter().enumerate() {
                    debug!(rank = i + 1, name = %name, score = score, "Scored related topic");
                }

                ranked
                    .into_iter()
                    .enumerate()
                    .map(|(i, (name, score))| RelatedTopic::from_score(name, i, score))
                    .collect()
            }
        }
    }
}

#[async_trait]
impl RelatedTopicsLookup for RelatedTopicsFetcher {
    async fn related_topics(
        &self,
        topic_name: &str,
        count: usize,
    ) -> Result<Vec<RelatedTopic>, GraphError> {
        Ok(self.fetch(topic_name, count).await)
    }
}
