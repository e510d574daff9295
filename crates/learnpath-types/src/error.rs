//! Error types for the learnpath system.

use thiserror::Error;

/// Unified error type for shared learnpath operations.
#[derive(Debug, Error)]
pub enum LearnPathError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
