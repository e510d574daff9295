//! Graph error types.

use thiserror::Error;

/// Errors that can occur while building or planning over a knowledge graph.
///
/// None of these escape `GraphBuilder::build` or `PathPlanner::plan`; they
/// are logged and converted into a skip, a fallback or an empty result.
#[derive(Debug, Error)]
pub enum GraphError {
    /// Referenced main topic does not exist
    #[error("Topic not found: {0}")]
    NotFound(String),

    /// Text-generation call failed (transport or HTTP status)
    #[error("Upstream request failed: {0}")]
    UpstreamFailure(String),

    /// Text-generation service asked us to slow down
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Text-generation call did not finish in time
    #[error("Timeout waiting for response")]
    Timeout,

    /// Response parsed but did not have the expected shape, or did not parse
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Requested node is absent from the graph
    #[error("Graph inconsistency: {0}")]
    GraphInconsistency(String),

    /// Persistence collaborator failed
    #[error("Store error: {0}")]
    Store(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl GraphError {
    /// Whether another attempt at the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GraphError::UpstreamFailure(_) | GraphError::RateLimited | GraphError::Timeout
        )
    }
}

impl From<serde_json::Error> for GraphError {
    fn from(e: serde_json::Error) -> Self {
        GraphError::MalformedResponse(e.to_string())
    }
}
