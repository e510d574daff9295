//! # learnpath-graph
//!
//! Knowledge-graph construction and learning-path planning.
//!
//! Given a user's main topics, related topics are discovered through a
//! text-generation source, merged into a weighted directed graph and ordered
//! into a recommended study path.
//!
//! ## Features
//! - Relevance scoring with unique, tie-broken scores
//! - Tolerant response parsing (bare arrays, `relatedTopics` objects, code fences)
//! - Deterministic fallback topics whenever the source fails
//! - Order-preserving concurrent fan-out with a bounded number of fetches
//! - Shortest-path and relevance-ranked planning
//!
//! ## Usage
//!
//! ```rust,ignore
//! use learnpath_graph::{GraphBuilder, InMemoryTopicStore, PathPlanner, RelatedTopicsFetcher};
//!
//! let fetcher = RelatedTopicsFetcher::new(source, &settings.graph);
//! let builder = GraphBuilder::new(Arc::new(store), Arc::new(fetcher), &settings.graph);
//! let graph = builder.build("user-1", &["t1".to_string()]).await;
//! let path = PathPlanner::new().ranked_path(&graph, &["t1".to_string()]);
//! ```

pub mod builder;
pub mod error;
pub mod fetcher;
pub mod payload;
pub mod planner;
pub mod retry;
pub mod scorer;
pub mod source;
pub mod store;

pub use builder::{verify, GraphBuilder};
pub use error::GraphError;
pub use fetcher::{fallback_topics, RelatedTopicsFetcher, RelatedTopicsLookup};
pub use payload::{extract_json, parse_payload, RelatedTopicsPayload, ScoredName};
pub use planner::{PathPlanner, PlanRequest};
pub use retry::{RecordingSleeper, RetryPolicy, Sleeper, TokioSleeper};
pub use scorer::{FixedJitter, JitterSource, NoJitter, RandomJitter, RelationScorer};
pub use source::{
    source_from_settings, ChatCompletionConfig, ChatCompletionSource, HttpTopicSource,
    RelatedTopicsSource, StaticTopicSource,
};
pub use store::{InMemoryTopicStore, TopicStore};
