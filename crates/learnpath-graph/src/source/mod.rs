//! Text-generation sources for related topics.
//!
//! A source turns `(topic, count)` into the raw text of a response. Parsing,
//! scoring and fallback handling live in the fetcher, so every source only
//! has to report transport-level success or failure.

mod chat;
mod http;
mod static_source;

pub use chat::{ChatCompletionConfig, ChatCompletionSource};
pub use http::HttpTopicSource;
pub use static_source::StaticTopicSource;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use learnpath_types::{SourceProvider, SourceSettings};

use crate::error::GraphError;

/// Pluggable text-generation collaborator.
#[async_trait]
pub trait RelatedTopicsSource: Send + Sync {
    /// Ask for `count` topics related to `topic`, returning the raw body.
    ///
    /// Non-2xx statuses, transport errors and timeouts must be errors.
    async fn request(&self, topic: &str, count: usize) -> Result<String, GraphError>;

    /// Short name used in logs.
    fn name(&self) -> &str;
}

/// Build the configured source.
pub fn source_from_settings(
    settings: &SourceSettings,
) -> Result<Arc<dyn RelatedTopicsSource>, GraphError> {
    let timeout = Duration::from_secs(settings.timeout_secs);

    let source: Arc<dyn RelatedTopicsSource> = match settings.provider {
        SourceProvider::Static => Arc::new(StaticTopicSource::new()),
        SourceProvider::Endpoint => {
            let url = settings.endpoint_url.clone().ok_or_else(|| {
                GraphError::Config("endpoint provider requires source.endpoint_url".to_string())
            })?;
            Arc::new(HttpTopicSource::new(url, timeout)?)
        }
        SourceProvider::Deepseek | SourceProvider::Openai => {
            let api_key = settings.api_key.clone().ok_or_else(|| {
                GraphError::Config("chat providers require source.api_key".to_string())
            })?;
            let mut config = match settings.provider {
                SourceProvider::Openai => ChatCompletionConfig::openai(api_key, &settings.model),
                _ => ChatCompletionConfig::deepseek(api_key, &settings.model),
            };
            if let Some(base_url) = &settings.api_base_url {
                config.base_url = base_url.trim_end_matches('/').to_string();
            }
            config.timeout = timeout;
            Arc::new(ChatCompletionSource::new(config)?)
        }
    };

    Ok(source)
}
