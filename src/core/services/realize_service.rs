//! Conversion of projected occurrences into concrete ledger transactions.

use chrono::NaiveDate;
use tracing::debug;
use uuid::Uuid;

use crate::errors::{RealizeError, StoreError};
use crate::matching::InstanceRef;
use crate::schedule::{project, DateWindow, ExceptionSet, ProjectedOccurrence, RuleKind};
use crate::storage::{
    NewTransaction, NewTransfer, RealizationLink, RealizedRef, RuleStore, TransactionStore,
};

/// One occurrence to realize, with optional field overrides applied on top
/// of the projected values.
#[derive(Debug, Clone, PartialEq)]
pub struct RealizeRequest {
    pub rule_id: Uuid,
    pub scheduled_date: NaiveDate,
    pub override_amount: Option<f64>,
    pub override_description: Option<String>,
}

impl RealizeRequest {
    pub fn new(rule_id: Uuid, scheduled_date: NaiveDate) -> Self {
        Self {
            rule_id,
            scheduled_date,
            override_amount: None,
            override_description: None,
        }
    }
}

/// Per-item result of a batch realization. One item failing never aborts
/// its siblings.
#[derive(Debug)]
pub struct RealizeOutcome {
    pub rule_id: Uuid,
    pub scheduled_date: NaiveDate,
    pub result: Result<RealizedRef, RealizeError>,
}

/// Realizes projected occurrences by delegating transaction creation to
/// the external store and recording the realization linkage.
pub struct RealizeService;

impl RealizeService {
    /// Realizes a single occurrence. The scheduled date is re-validated by
    /// projecting the rule over a single-day window, so a date the rule
    /// would not produce (or one removed by a skip) is `NotProjectable`.
    pub fn realize(
        rules: &dyn RuleStore,
        transactions: &mut dyn TransactionStore,
        request: &RealizeRequest,
        today: NaiveDate,
    ) -> Result<RealizedRef, RealizeError> {
        let rule = rules
            .rule(request.rule_id)?
            .ok_or(RealizeError::RuleInactive(request.rule_id))?;
        if !rule.is_active() {
            return Err(RealizeError::RuleInactive(rule.id));
        }

        let instance = InstanceRef::new(rule.id, request.scheduled_date);
        if transactions.is_realized(&instance)? {
            return Err(RealizeError::AlreadyRealized {
                rule_id: rule.id,
                scheduled_date: request.scheduled_date,
            });
        }

        let exceptions = ExceptionSet::new(rules.exceptions(rule.id)?);
        let window = DateWindow::single_day(request.scheduled_date);
        let occurrence = project(&rule, &exceptions, window, today)
            .into_iter()
            .find(|occ| occ.scheduled_date == request.scheduled_date)
            .ok_or(RealizeError::NotProjectable {
                rule_id: rule.id,
                scheduled_date: request.scheduled_date,
            })?;

        let amount = request.override_amount.unwrap_or(occurrence.amount);
        let description = request
            .override_description
            .clone()
            .unwrap_or_else(|| occurrence.description.clone());

        let realized = match rule.kind {
            RuleKind::Single { account_id } => {
                let id = transactions.create_transaction(NewTransaction {
                    account_id,
                    amount,
                    date: occurrence.effective_date,
                    description,
                })?;
                RealizedRef::Transaction(id)
            }
            RuleKind::Transfer {
                source_account_id,
                destination_account_id,
            } => {
                let (source, destination) = transactions.create_transfer_pair(NewTransfer {
                    source_account_id,
                    destination_account_id,
                    amount,
                    date: occurrence.effective_date,
                    description,
                })?;
                RealizedRef::TransferPair {
                    source,
                    destination,
                }
            }
        };

        transactions.record_realization(RealizationLink { instance, realized })?;
        Ok(realized)
    }

    /// Realizes a batch of occurrences independently, reporting a per-item
    /// outcome. Partial failure is final; nothing is retried.
    pub fn realize_batch(
        rules: &dyn RuleStore,
        transactions: &mut dyn TransactionStore,
        requests: &[RealizeRequest],
        today: NaiveDate,
    ) -> Vec<RealizeOutcome> {
        requests
            .iter()
            .map(|request| {
                let result = Self::realize(rules, transactions, request, today);
                if let Err(err) = &result {
                    debug!(
                        rule_id = %request.rule_id,
                        scheduled_date = %request.scheduled_date,
                        %err,
                        "realization item failed"
                    );
                }
                RealizeOutcome {
                    rule_id: request.rule_id,
                    scheduled_date: request.scheduled_date,
                    result,
                }
            })
            .collect()
    }

    /// Lists unrealized occurrences of active rules whose effective date
    /// has elapsed relative to `today`.
    pub fn past_due(
        rules: &dyn RuleStore,
        transactions: &dyn TransactionStore,
        today: NaiveDate,
    ) -> Result<Vec<ProjectedOccurrence>, StoreError> {
        let mut due = Vec::new();
        for rule in rules.rules()? {
            if !rule.is_active() {
                continue;
            }
            let exceptions = ExceptionSet::new(rules.exceptions(rule.id)?);
            let window = DateWindow::new(rule.anchor_date, today);
            for occurrence in project(&rule, &exceptions, window, today) {
                if !occurrence.is_past_due {
                    continue;
                }
                let instance = InstanceRef::new(occurrence.rule_id, occurrence.scheduled_date);
                if !transactions.is_realized(&instance)? {
                    due.push(occurrence);
                }
            }
        }
        Ok(due)
    }

    /// Realizes every past-due occurrence in one batch sweep.
    pub fn realize_past_due(
        rules: &dyn RuleStore,
        transactions: &mut dyn TransactionStore,
        today: NaiveDate,
    ) -> Result<Vec<RealizeOutcome>, StoreError> {
        let requests: Vec<RealizeRequest> = Self::past_due(rules, transactions, today)?
            .into_iter()
            .map(|occ| RealizeRequest::new(occ.rule_id, occ.scheduled_date))
            .collect();
        Ok(Self::realize_batch(rules, transactions, &requests, today))
    }
}
