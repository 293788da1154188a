//! Maintenance helpers for recurrence rules and their exception overrides.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::errors::{CoreError, Result};
use crate::schedule::{
    validate_exception, ExceptionSet, OccurrenceException, RecurrenceRule, RuleStatus,
};
use crate::storage::RuleStore;

/// Provides validated write operations on the rule store. All rule
/// invariants are enforced here, before projection ever runs.
pub struct ScheduleService;

impl ScheduleService {
    /// Validates and saves a rule, returning its identifier.
    pub fn save_rule(store: &mut dyn RuleStore, rule: RecurrenceRule) -> Result<Uuid> {
        rule.validate()?;
        let id = rule.id;
        store.save_rule(rule)?;
        Ok(id)
    }

    pub fn pause(store: &mut dyn RuleStore, rule_id: Uuid) -> Result<()> {
        Self::set_status(store, rule_id, RuleStatus::Paused)
    }

    pub fn resume(store: &mut dyn RuleStore, rule_id: Uuid) -> Result<()> {
        Self::set_status(store, rule_id, RuleStatus::Active)
    }

    pub fn archive(store: &mut dyn RuleStore, rule_id: Uuid) -> Result<()> {
        Self::set_status(store, rule_id, RuleStatus::Archived)
    }

    fn set_status(store: &mut dyn RuleStore, rule_id: Uuid, status: RuleStatus) -> Result<()> {
        let mut rule = store
            .rule(rule_id)?
            .ok_or(CoreError::RuleNotFound(rule_id))?;
        rule.status = status;
        store.save_rule(rule)?;
        Ok(())
    }

    /// Removes one scheduled occurrence from the rule's projection.
    pub fn skip_occurrence(
        store: &mut dyn RuleStore,
        rule_id: Uuid,
        scheduled_date: NaiveDate,
    ) -> Result<()> {
        let exception = OccurrenceException::skipped(rule_id, scheduled_date);
        Self::save_validated(store, rule_id, exception)
    }

    /// Overrides the date, amount, or description of one scheduled
    /// occurrence. At least one override field must be provided.
    pub fn override_occurrence(
        store: &mut dyn RuleStore,
        rule_id: Uuid,
        scheduled_date: NaiveDate,
        date: Option<NaiveDate>,
        amount: Option<f64>,
        description: Option<String>,
    ) -> Result<()> {
        if date.is_none() && amount.is_none() && description.is_none() {
            return Err(CoreError::Validation(
                "occurrence override must change at least one field".into(),
            ));
        }
        let exception =
            OccurrenceException::modified(rule_id, scheduled_date, date, amount, description);
        Self::save_validated(store, rule_id, exception)
    }

    fn save_validated(
        store: &mut dyn RuleStore,
        rule_id: Uuid,
        exception: OccurrenceException,
    ) -> Result<()> {
        let rule = store
            .rule(rule_id)?
            .ok_or(CoreError::RuleNotFound(rule_id))?;
        let existing = ExceptionSet::new(store.exceptions(rule_id)?);
        validate_exception(&rule, &existing, &exception)?;
        store.save_exception(exception)?;
        Ok(())
    }
}
