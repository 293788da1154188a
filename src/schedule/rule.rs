use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::CoreError;

use super::frequency::Frequency;

/// Distinguishes what a rule materializes into: a single transaction on one
/// account, or a paired transfer between two accounts. Transfer-specific
/// fields live only here; the projection machinery is shared.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum RuleKind {
    Single {
        account_id: Uuid,
    },
    Transfer {
        source_account_id: Uuid,
        destination_account_id: Uuid,
    },
}

/// End condition of a recurrence. The variants are mutually exclusive by
/// construction, so a rule can never carry both a date and a count limit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum RuleEnd {
    #[default]
    Never,
    OnDate(NaiveDate),
    AfterOccurrences(u32),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum RuleStatus {
    #[default]
    Active,
    Paused,
    Archived,
}

/// A recurring obligation: how often it repeats, what it is worth, and where
/// the money moves. Immutable after creation apart from status changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurrenceRule {
    pub id: Uuid,
    pub kind: RuleKind,
    pub description: String,
    pub amount: f64,
    pub frequency: Frequency,
    pub interval: u32,
    pub anchor_date: NaiveDate,
    #[serde(default)]
    pub end: RuleEnd,
    #[serde(default)]
    pub status: RuleStatus,
    pub created_at: DateTime<Utc>,
}

impl RecurrenceRule {
    pub fn new(
        kind: RuleKind,
        description: impl Into<String>,
        amount: f64,
        frequency: Frequency,
        interval: u32,
        anchor_date: NaiveDate,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            description: description.into(),
            amount,
            frequency,
            interval,
            anchor_date,
            end: RuleEnd::Never,
            status: RuleStatus::Active,
            created_at,
        }
    }

    pub fn with_end(mut self, end: RuleEnd) -> Self {
        self.end = end;
        self
    }

    pub fn is_active(&self) -> bool {
        matches!(self.status, RuleStatus::Active)
    }

    /// Checks rule invariants. Called at save time, before any projection.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.interval < 1 {
            return Err(CoreError::Validation(
                "recurrence interval must be at least 1".into(),
            ));
        }
        match self.end {
            RuleEnd::OnDate(end_date) if end_date < self.anchor_date => {
                return Err(CoreError::Validation(
                    "recurrence end date precedes the anchor date".into(),
                ));
            }
            RuleEnd::AfterOccurrences(0) => {
                return Err(CoreError::Validation(
                    "recurrence must allow at least one occurrence".into(),
                ));
            }
            _ => {}
        }
        if let RuleKind::Transfer {
            source_account_id,
            destination_account_id,
        } = self.kind
        {
            if source_account_id == destination_account_id {
                return Err(CoreError::Validation(
                    "transfer source and destination accounts must differ".into(),
                ));
            }
        }
        Ok(())
    }

    /// Whether the rule's end condition still admits the occurrence at
    /// `occurrence_index` falling on `candidate`.
    pub fn allows_occurrence(&self, occurrence_index: u32, candidate: NaiveDate) -> bool {
        if candidate < self.anchor_date {
            return false;
        }
        match self.end {
            RuleEnd::Never => true,
            RuleEnd::OnDate(end_date) => candidate <= end_date,
            RuleEnd::AfterOccurrences(limit) => occurrence_index < limit,
        }
    }

    /// The natural date of the `index`-th occurrence (0-based).
    pub fn occurrence_date(&self, index: u32) -> NaiveDate {
        self.frequency
            .date_at(self.anchor_date, self.interval, index)
    }

    pub fn schedule_label(&self) -> String {
        self.frequency.label(self.interval)
    }
}
