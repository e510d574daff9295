//! Knowledge graph types.
//!
//! The graph is plain data: built once per planning request, serialized to
//! the UI as `{ "nodes": [...], "links": [...] }` and never mutated after.

use serde::{Deserialize, Serialize};

/// A unique identifier for a topic or graph node.
pub type TopicId = String;

/// Lowest edge weight / relevance score.
pub const MIN_WEIGHT: f64 = 1.0;

/// Highest edge weight / relevance score.
pub const MAX_WEIGHT: f64 = 10.0;

/// Raw scores at or above this value make a relation fundamental.
pub const FUNDAMENTAL_THRESHOLD: f64 = 7.0;

/// Difficulty shown for a node.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

/// How closely a related topic connects to its main topic.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RelationType {
    /// Prerequisite-level material (score >= 7)
    Fundamental,
    /// Adjacent material
    Indirect,
}

impl RelationType {
    /// Classify a raw relevance score.
    pub fn from_score(score: f64) -> Self {
        if score >= FUNDAMENTAL_THRESHOLD {
            RelationType::Fundamental
        } else {
            RelationType::Indirect
        }
    }

    /// Difficulty assigned to a node discovered through this relation.
    pub fn node_difficulty(&self) -> Difficulty {
        match self {
            RelationType::Fundamental => Difficulty::Easy,
            RelationType::Indirect => Difficulty::Hard,
        }
    }
}

impl std::fmt::Display for RelationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RelationType::Fundamental => write!(f, "fundamental"),
            RelationType::Indirect => write!(f, "indirect"),
        }
    }
}

/// A topic in the knowledge graph.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GraphNode {
    pub id: TopicId,
    pub name: String,
    pub difficulty: Difficulty,
}

impl GraphNode {
    /// Create a new node.
    pub fn new(id: impl Into<TopicId>, name: impl Into<String>, difficulty: Difficulty) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            difficulty,
        }
    }
}

/// A directed, weighted link from a main topic to a related topic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GraphEdge {
    pub source: TopicId,
    pub target: TopicId,
    /// Relevance weight in [1, 10]
    pub weight: f64,
    #[serde(rename = "type")]
    pub relation_type: RelationType,
}

impl GraphEdge {
    /// Create a new edge. The weight is clamped into [1, 10].
    pub fn new(
        source: impl Into<TopicId>,
        target: impl Into<TopicId>,
        weight: f64,
        relation_type: RelationType,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            weight: clamp_weight(weight),
            relation_type,
        }
    }
}

/// Node/link structure connecting main and related topics.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct KnowledgeGraph {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphEdge>,
}

impl KnowledgeGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether a node with the given id exists.
    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.iter().any(|n| n.id == id)
    }

    /// Look up a node by id.
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Edges leaving the given node, in insertion order.
    pub fn outgoing<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a GraphEdge> + 'a {
        self.links.iter().filter(move |l| l.source == id)
    }

    /// Edges entering the given node, in insertion order.
    pub fn incoming<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a GraphEdge> + 'a {
        self.links.iter().filter(move |l| l.target == id)
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of links.
    pub fn edge_count(&self) -> usize {
        self.links.len()
    }

    /// True when the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// A topic discovered as conceptually adjacent to a main topic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RelatedTopic {
    pub id: TopicId,
    pub name: String,
    pub relation_type: RelationType,
    /// Relevance weight in [1, 10]
    pub weight: f64,
}

impl RelatedTopic {
    /// Build a related topic from its name, list position and raw score.
    ///
    /// The id is derived from the name plus the position so that equal slugs
    /// within one response do not collide.
    pub fn from_score(name: impl Into<String>, index: usize, raw_score: f64) -> Self {
        let name = name.into();
        Self {
            id: related_topic_id(&name, index),
            relation_type: RelationType::from_score(raw_score),
            weight: clamp_weight(raw_score),
            name,
        }
    }

    /// Build a related topic with an explicit relation type and weight.
    pub fn with_relation(
        name: impl Into<String>,
        index: usize,
        relation_type: RelationType,
        weight: f64,
    ) -> Self {
        let name = name.into();
        Self {
            id: related_topic_id(&name, index),
            relation_type,
            weight: clamp_weight(weight),
            name,
        }
    }
}

/// Derive a node id: lower-cased name, whitespace runs replaced by `-`,
/// suffixed with the position.
pub fn related_topic_id(name: &str, index: usize) -> TopicId {
    let slug = name
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-");
    format!("{}-{}", slug, index)
}

/// Clamp a weight into [1, 10]. Non-finite input maps to the lower bound.
pub fn clamp_weight(weight: f64) -> f64 {
    if weight.is_finite() {
        weight.clamp(MIN_WEIGHT, MAX_WEIGHT)
    } else {
        MIN_WEIGHT
    }
}
