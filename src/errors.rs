use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

/// Failure surfaced by an external store. The core treats these as opaque
/// and propagates them unmodified.
#[derive(Debug, Error)]
#[error("Store unavailable: {0}")]
pub struct StoreError(pub String);

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Unified error type for validation and schedule maintenance operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Rule not found: {0}")]
    RuleNotFound(Uuid),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Persistence error: {0}")]
    Storage(String),
}

impl From<std::io::Error> for CoreError {
    fn from(err: std::io::Error) -> Self {
        CoreError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Storage(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;

/// Per-item outcome of a realization attempt. Never fatal to a batch.
#[derive(Debug, Error)]
pub enum RealizeError {
    #[error("Rule {rule_id} would not produce an occurrence on {scheduled_date}")]
    NotProjectable {
        rule_id: Uuid,
        scheduled_date: NaiveDate,
    },
    #[error("Occurrence {scheduled_date} of rule {rule_id} is already realized")]
    AlreadyRealized {
        rule_id: Uuid,
        scheduled_date: NaiveDate,
    },
    #[error("Rule {0} is not active")]
    RuleInactive(Uuid),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Outcome of a single match lifecycle operation.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("Match not found: {0}")]
    NotFound(Uuid),
    #[error("Invalid state: {0}")]
    InvalidState(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}
