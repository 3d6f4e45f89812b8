//! Error types for the aggregation core

use crate::models::PlayerId;
use chrono::NaiveDate;
use thiserror::Error;

/// Result type alias for aggregation operations
pub type Result<T> = std::result::Result<T, StatsError>;

/// Errors that can occur in the aggregation core
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatsError {
    /// A calendar value could not be parsed; the single event carrying it is rejected
    #[error("Invalid game date '{value}': {reason}")]
    InvalidDate { value: String, reason: String },

    /// Recomputing an entity's recent windows failed; the batch continues without it
    #[error("Recompute failed for player {entity_id}: {reason}")]
    RecomputeFailed { entity_id: PlayerId, reason: String },

    /// Two bucket maps built against different season anchors cannot be merged
    #[error("Cannot merge week buckets anchored at {left} and {right}")]
    AnchorMismatch { left: NaiveDate, right: NaiveDate },
}

impl StatsError {
    /// Create a new invalid date error
    pub fn invalid_date(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDate { value: value.into(), reason: reason.into() }
    }

    /// Create a new recompute failure for an entity
    pub fn recompute_failed(entity_id: PlayerId, reason: impl Into<String>) -> Self {
        Self::RecomputeFailed { entity_id, reason: reason.into() }
    }
}
