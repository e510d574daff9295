//! Plain HTTP endpoint source.
//!
//! POSTs `{"topic": ..., "count": ...}` and returns the response body as-is.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use super::RelatedTopicsSource;
use crate::error::GraphError;

#[derive(Serialize)]
struct RelatedTopicsRequest<'a> {
    topic: &'a str,
    count: usize,
}

/// Source backed by an endpoint that already speaks the payload format.
pub struct HttpTopicSource {
    client: Client,
    endpoint: String,
}

impl HttpTopicSource {
    /// Create a source for the given URL with a client-level timeout.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, GraphError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GraphError::Config(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl RelatedTopicsSource for HttpTopicSource {
    async fn request(&self, topic: &str, count: usize) -> Result<String, GraphError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&RelatedTopicsRequest { topic, count })
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        debug!(status = %status, endpoint = %self.endpoint, "Related topics response");

        if status.as_u16() == 429 {
            return Err(GraphError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GraphError::UpstreamFailure(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        response.text().await.map_err(map_transport_error)
    }

    fn name(&self) -> &str {
        "endpoint"
    }
}

/// Map a reqwest error, keeping timeouts distinguishable.
pub(super) fn map_transport_error(e: reqwest::Error) -> GraphError {
    if e.is_timeout() {
        GraphError::Timeout
    } else {
        GraphError::UpstreamFailure(e.to_string())
    }
}
