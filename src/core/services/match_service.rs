//! Lifecycle management for reconciliation matches. This service is the
//! only writer of match state.

use tracing::debug;
use uuid::Uuid;

use crate::errors::MatchError;
use crate::matching::{InstanceRef, ReconciliationMatch, TransactionCandidates};
use crate::storage::MatchStore;
use crate::time::Clock;

/// Per-id result of a bulk accept. One conflict never blocks the rest.
#[derive(Debug)]
pub struct BulkAcceptOutcome {
    pub match_id: Uuid,
    pub result: Result<ReconciliationMatch, MatchError>,
}

pub struct MatchService;

impl MatchService {
    /// Creates one Pending suggestion per transaction from its top-scoring
    /// candidate, subject to the confidence floor. A side that is already
    /// settled, or a pair that is already pending review, is skipped
    /// rather than duplicated. Returns the records created.
    pub fn create_suggested(
        store: &mut dyn MatchStore,
        clock: &dyn Clock,
        candidates: &[TransactionCandidates],
        min_confidence: f64,
    ) -> Result<Vec<ReconciliationMatch>, MatchError> {
        let pending_pairs: Vec<(Uuid, InstanceRef)> = store
            .all()?
            .iter()
            .filter(|m| m.is_pending())
            .map(|m| (m.actual_transaction_id, m.instance))
            .collect();

        let mut created = Vec::new();
        for entry in candidates {
            let Some(top) = entry.top() else {
                continue;
            };
            if top.score < min_confidence {
                continue;
            }
            if store
                .accepted_for_transaction(entry.transaction_id)?
                .is_some()
                || store.accepted_for_instance(&top.instance)?.is_some()
            {
                continue;
            }
            if pending_pairs.contains(&(entry.transaction_id, top.instance)) {
                continue;
            }
            let record = ReconciliationMatch::suggested(
                entry.transaction_id,
                top.instance,
                top.score,
                clock.now(),
            );
            store.insert(record.clone())?;
            created.push(record);
        }
        Ok(created)
    }

    /// Creates an Accepted match directly, bypassing review. Fails with
    /// `Conflict` when either side is already settled.
    pub fn create_manual(
        store: &mut dyn MatchStore,
        clock: &dyn Clock,
        transaction_id: Uuid,
        instance: InstanceRef,
    ) -> Result<ReconciliationMatch, MatchError> {
        if store.accepted_for_transaction(transaction_id)?.is_some() {
            return Err(MatchError::Conflict(format!(
                "transaction {} already has an accepted match",
                transaction_id
            )));
        }
        if store.accepted_for_instance(&instance)?.is_some() {
            return Err(MatchError::Conflict(format!(
                "occurrence {} of rule {} already has an accepted match",
                instance.scheduled_date, instance.rule_id
            )));
        }
        let record = ReconciliationMatch::manual(transaction_id, instance, clock.now());
        store.insert(record.clone())?;
        Ok(record)
    }

    /// Accepts a Pending match. Both sides are re-validated at accept
    /// time, so a counterpart that became settled since the suggestion
    /// surfaces as `Conflict` rather than a double link.
    pub fn accept(
        store: &mut dyn MatchStore,
        clock: &dyn Clock,
        match_id: Uuid,
    ) -> Result<ReconciliationMatch, MatchError> {
        let mut record = Self::fetch_pending(store, match_id)?;
        if let Some(other) = store.accepted_for_transaction(record.actual_transaction_id)? {
            if other.id != record.id {
                return Err(MatchError::Conflict(format!(
                    "transaction {} was accepted elsewhere since this suggestion",
                    record.actual_transaction_id
                )));
            }
        }
        if let Some(other) = store.accepted_for_instance(&record.instance)? {
            if other.id != record.id {
                return Err(MatchError::Conflict(format!(
                    "occurrence {} of rule {} was accepted elsewhere since this suggestion",
                    record.instance.scheduled_date, record.instance.rule_id
                )));
            }
        }
        record.mark_accepted(clock.now());
        store.update(&record)?;
        Ok(record)
    }

    /// Rejects a Pending match.
    pub fn reject(
        store: &mut dyn MatchStore,
        clock: &dyn Clock,
        match_id: Uuid,
    ) -> Result<ReconciliationMatch, MatchError> {
        let mut record = Self::fetch_pending(store, match_id)?;
        record.mark_rejected(clock.now());
        store.update(&record)?;
        Ok(record)
    }

    /// Accepts a set of matches independently, one store operation at a
    /// time, reporting a per-id outcome.
    pub fn bulk_accept(
        store: &mut dyn MatchStore,
        clock: &dyn Clock,
        match_ids: &[Uuid],
    ) -> Vec<BulkAcceptOutcome> {
        match_ids
            .iter()
            .map(|&match_id| {
                let result = Self::accept(store, clock, match_id);
                if let Err(err) = &result {
                    debug!(%match_id, %err, "bulk accept item failed");
                }
                BulkAcceptOutcome { match_id, result }
            })
            .collect()
    }

    /// Unlinks an Accepted match, returning both sides to unmatched. The
    /// record itself stays as history; the pair becomes eligible for
    /// re-suggestion as a fresh record.
    pub fn unlink(
        store: &mut dyn MatchStore,
        clock: &dyn Clock,
        match_id: Uuid,
    ) -> Result<ReconciliationMatch, MatchError> {
        let mut record = store
            .get(match_id)?
            .ok_or(MatchError::NotFound(match_id))?;
        if !record.is_accepted() {
            return Err(MatchError::InvalidState(format!(
                "match {} is not currently linked",
                match_id
            )));
        }
        record.mark_unlinked(clock.now());
        store.update(&record)?;
        Ok(record)
    }

    fn fetch_pending(
        store: &dyn MatchStore,
        match_id: Uuid,
    ) -> Result<ReconciliationMatch, MatchError> {
        let record = store
            .get(match_id)?
            .ok_or(MatchError::NotFound(match_id))?;
        if !record.is_pending() {
            return Err(MatchError::InvalidState(format!(
                "match {} is {:?}, expected Pending",
                match_id, record.status
            )));
        }
        Ok(record)
    }
}
