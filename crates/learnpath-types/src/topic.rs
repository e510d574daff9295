//! Topic types owned by the persistence layer.
//!
//! The planner only reads `id` and `name`; the remaining fields are carried so
//! that documents from the store round-trip without loss.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::graph::TopicId;

/// Result of one completed quiz.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub quiz_id: String,
    pub date: DateTime<Utc>,
    pub correct_answers: u32,
    pub total_questions: u32,
    /// correct_answers / total_questions
    pub score: f64,
    #[serde(default)]
    pub topics: Vec<String>,
}

/// A study topic registered by a user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    /// Document identifier
    pub id: TopicId,
    /// Display name, also used as the prompt subject for related topics
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub question_count: u32,
    /// Answer history, one entry per correct answer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answers: Option<Vec<bool>>,
    /// Answer history, one entry per answer given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_answers: Option<Vec<bool>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_played: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiz_history: Option<Vec<QuizResult>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Topic {
    /// Create a topic with only an id and a name.
    pub fn new(id: impl Into<TopicId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            question_count: 0,
            correct_answers: None,
            total_answers: None,
            last_played: None,
            last_score: None,
            quiz_history: None,
            created_at: Some(Utc::now()),
            category: None,
        }
    }

    /// Percentage of correct answers, rounded. 0 when there is no history.
    pub fn progress_percent(&self) -> u32 {
        match (&self.correct_answers, &self.total_answers) {
            (Some(correct), Some(total)) if !total.is_empty() => {
                ((correct.len() as f64 / total.len() as f64) * 100.0).round() as u32
            }
            _ => 0,
        }
    }
}
