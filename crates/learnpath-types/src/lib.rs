//! # learnpath-types
//!
//! Shared domain types for the learning-path planner.
//!
//! This crate defines the core data structures used throughout the system:
//! - Topics: study targets owned by the persistence layer (read-only here)
//! - Graph: nodes, links and the knowledge graph handed to the UI
//! - Related topics: transient results of the text-generation lookup
//! - Settings: layered configuration
//!
//! ## Usage
//!
//! ```rust
//! use learnpath_types::{Difficulty, GraphNode, KnowledgeGraph};
//!
//! let mut graph = KnowledgeGraph::new();
//! graph.nodes.push(GraphNode::new("t1", "Historia", Difficulty::Medium));
//! assert!(graph.contains_node("t1"));
//! ```

pub mod config;
pub mod error;
pub mod graph;
pub mod topic;

pub use config::{
    GraphSettings, PlanStrategy, PlannerSettings, RetrySettings, ScoringMode, ScoringSettings,
    Settings, SourceProvider, SourceSettings,
};
pub use error::LearnPathError;
pub use graph::{
    clamp_weight, related_topic_id, Difficulty, GraphEdge, GraphNode, KnowledgeGraph,
    RelatedTopic, RelationType, TopicId, FUNDAMENTAL_THRESHOLD, MAX_WEIGHT, MIN_WEIGHT,
};
pub use topic::{QuizResult, Topic};
