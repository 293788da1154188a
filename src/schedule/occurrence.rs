use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const PENDING_WINDOW_DAYS: i64 = 7;

/// Inclusive calendar window. A window whose end precedes its start is
/// empty and projects to an empty sequence rather than an error.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Window covering exactly one calendar day.
    pub fn single_day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }
}

/// Urgency of a scheduled occurrence relative to a reference date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueStatus {
    Overdue,
    Pending,
    Future,
}

impl DueStatus {
    pub fn classify(scheduled: NaiveDate, reference: NaiveDate) -> DueStatus {
        if scheduled < reference {
            return DueStatus::Overdue;
        }
        let pending_cutoff = reference + Duration::days(PENDING_WINDOW_DAYS);
        if scheduled <= pending_cutoff {
            DueStatus::Pending
        } else {
            DueStatus::Future
        }
    }
}

/// One concrete calendar occurrence a rule projects to. Ephemeral: computed
/// on demand and never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedOccurrence {
    pub rule_id: Uuid,
    /// The date the rule would naturally produce.
    pub scheduled_date: NaiveDate,
    /// The scheduled date, or the override date when modified.
    pub effective_date: NaiveDate,
    pub amount: f64,
    pub description: String,
    pub is_modified: bool,
    /// Effective date has elapsed relative to the injected "today".
    pub is_past_due: bool,
}

impl ProjectedOccurrence {
    pub fn due_status(&self, reference: NaiveDate) -> DueStatus {
        DueStatus::classify(self.effective_date, reference)
    }
}
