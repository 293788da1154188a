use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies one projected occurrence of a recurrence rule.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct InstanceRef {
    pub rule_id: Uuid,
    pub scheduled_date: NaiveDate,
}

impl InstanceRef {
    pub fn new(rule_id: Uuid, scheduled_date: NaiveDate) -> Self {
        Self {
            rule_id,
            scheduled_date,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MatchKind {
    /// Produced by the candidate finder, subject to review.
    Suggested,
    /// Created directly by the user; bypasses review.
    Manual,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MatchStatus {
    Pending,
    Accepted,
    Rejected,
    /// Terminal display status: both sides returned to unmatched. A new
    /// record is created if the pair is proposed again.
    Unlinked,
}

/// A proposed or confirmed pairing between an actual transaction and a
/// projected recurring occurrence. Records are never hard-deleted; rejected
/// and unlinked matches remain as history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationMatch {
    pub id: Uuid,
    pub actual_transaction_id: Uuid,
    pub instance: InstanceRef,
    pub kind: MatchKind,
    pub status: MatchStatus,
    /// Confidence in [0, 1]; present on suggested matches only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
}

impl ReconciliationMatch {
    pub fn suggested(
        actual_transaction_id: Uuid,
        instance: InstanceRef,
        confidence: f64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            actual_transaction_id,
            instance,
            kind: MatchKind::Suggested,
            status: MatchStatus::Pending,
            confidence: Some(confidence),
            created_at,
            resolved_at: None,
        }
    }

    /// Manual matches are accepted on creation.
    pub fn manual(
        actual_transaction_id: Uuid,
        instance: InstanceRef,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            actual_transaction_id,
            instance,
            kind: MatchKind::Manual,
            status: MatchStatus::Accepted,
            confidence: None,
            created_at,
            resolved_at: Some(created_at),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.status, MatchStatus::Pending)
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self.status, MatchStatus::Accepted)
    }

    pub fn mark_accepted(&mut self, resolved_at: DateTime<Utc>) {
        self.status = MatchStatus::Accepted;
        self.resolved_at = Some(resolved_at);
    }

    pub fn mark_rejected(&mut self, resolved_at: DateTime<Utc>) {
        self.status = MatchStatus::Rejected;
        self.resolved_at = Some(resolved_at);
    }

    pub fn mark_unlinked(&mut self, resolved_at: DateTime<Utc>) {
        self.status = MatchStatus::Unlinked;
        self.resolved_at = Some(resolved_at);
    }
}
