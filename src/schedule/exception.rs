use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How a single scheduled date deviates from the natural schedule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ExceptionKind {
    /// The occurrence is removed entirely.
    Skipped,
    /// The occurrence is kept with one or more fields overridden.
    Modified {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        date: Option<NaiveDate>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        amount: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
}

/// A per-date override of a recurrence rule, keyed by the date the rule
/// would naturally produce.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OccurrenceException {
    pub rule_id: Uuid,
    pub scheduled_date: NaiveDate,
    pub kind: ExceptionKind,
}

impl OccurrenceException {
    pub fn skipped(rule_id: Uuid, scheduled_date: NaiveDate) -> Self {
        Self {
            rule_id,
            scheduled_date,
            kind: ExceptionKind::Skipped,
        }
    }

    pub fn modified(
        rule_id: Uuid,
        scheduled_date: NaiveDate,
        date: Option<NaiveDate>,
        amount: Option<f64>,
        description: Option<String>,
    ) -> Self {
        Self {
            rule_id,
            scheduled_date,
            kind: ExceptionKind::Modified {
                date,
                amount,
                description,
            },
        }
    }

    /// The date the occurrence lands on once this exception is applied.
    pub fn effective_date(&self) -> NaiveDate {
        match &self.kind {
            ExceptionKind::Skipped => self.scheduled_date,
            ExceptionKind::Modified { date, .. } => date.unwrap_or(self.scheduled_date),
        }
    }
}

/// One rule's exceptions, keyed by scheduled date. The map keying enforces
/// the at-most-one-exception-per-date invariant; inserting for an existing
/// date replaces the previous override.
#[derive(Debug, Clone, Default)]
pub struct ExceptionSet {
    by_date: BTreeMap<NaiveDate, OccurrenceException>,
}

impl ExceptionSet {
    pub fn new(exceptions: impl IntoIterator<Item = OccurrenceException>) -> Self {
        let mut set = Self::default();
        for exception in exceptions {
            set.insert(exception);
        }
        set
    }

    pub fn insert(&mut self, exception: OccurrenceException) -> Option<OccurrenceException> {
        self.by_date.insert(exception.scheduled_date, exception)
    }

    pub fn get(&self, scheduled_date: NaiveDate) -> Option<&OccurrenceException> {
        self.by_date.get(&scheduled_date)
    }

    pub fn is_skipped(&self, scheduled_date: NaiveDate) -> bool {
        matches!(
            self.get(scheduled_date).map(|e| &e.kind),
            Some(ExceptionKind::Skipped)
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = &OccurrenceException> {
        self.by_date.values()
    }

    pub fn len(&self) -> usize {
        self.by_date.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_date.is_empty()
    }
}
