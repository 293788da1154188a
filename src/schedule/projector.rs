use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::errors::CoreError;

use super::exception::{ExceptionKind, ExceptionSet, OccurrenceException};
use super::occurrence::{DateWindow, ProjectedOccurrence};
use super::rule::{RecurrenceRule, RuleStatus};

/// Hard cap on occurrences generated per rule, so an unbounded rule over a
/// huge window cannot spin.
pub const MAX_PROJECTED_OCCURRENCES: usize = 1024;

/// Expands a rule into its concrete occurrences whose scheduled date falls
/// inside `window`, applying per-date exceptions.
///
/// The expansion is deterministic for fixed inputs: dates are derived from
/// the anchor by occurrence index, `Skipped` dates are dropped, `Modified`
/// dates carry their overrides, and the result is ordered by non-decreasing
/// effective date. `today` only feeds the past-due flag and the cutoff for
/// paused rules; it is injected rather than read from a clock.
pub fn project(
    rule: &RecurrenceRule,
    exceptions: &ExceptionSet,
    window: DateWindow,
    today: NaiveDate,
) -> Vec<ProjectedOccurrence> {
    let mut occurrences = Vec::new();
    if window.is_empty() || matches!(rule.status, RuleStatus::Archived) {
        return occurrences;
    }

    for index in 0..MAX_PROJECTED_OCCURRENCES as u32 {
        let scheduled_date = rule.occurrence_date(index);
        if scheduled_date > window.end {
            break;
        }
        if !rule.allows_occurrence(index, scheduled_date) {
            break;
        }
        // A paused rule keeps its elapsed history projectable but produces
        // nothing beyond the reference date.
        if matches!(rule.status, RuleStatus::Paused) && scheduled_date > today {
            break;
        }
        if !window.contains(scheduled_date) {
            continue;
        }
        match exceptions.get(scheduled_date).map(|e| &e.kind) {
            Some(ExceptionKind::Skipped) => continue,
            Some(ExceptionKind::Modified {
                date,
                amount,
                description,
            }) => {
                let effective_date = date.unwrap_or(scheduled_date);
                occurrences.push(ProjectedOccurrence {
                    rule_id: rule.id,
                    scheduled_date,
                    effective_date,
                    amount: amount.unwrap_or(rule.amount),
                    description: description.clone().unwrap_or_else(|| rule.description.clone()),
                    is_modified: true,
                    is_past_due: effective_date < today,
                });
            }
            None => {
                occurrences.push(ProjectedOccurrence {
                    rule_id: rule.id,
                    scheduled_date,
                    effective_date: scheduled_date,
                    amount: rule.amount,
                    description: rule.description.clone(),
                    is_modified: false,
                    is_past_due: scheduled_date < today,
                });
            }
        }
    }

    // A date override can land an occurrence ahead of its neighbours; the
    // stable sort restores effective-date order without disturbing ties.
    occurrences.sort_by_key(|occ| occ.effective_date);
    occurrences
}

/// Projects several rules into one merged sequence, ordered by effective
/// date with ties broken by rule creation order then scheduled date.
pub fn project_all(
    rules: &[RecurrenceRule],
    exceptions_by_rule: &HashMap<Uuid, ExceptionSet>,
    window: DateWindow,
    today: NaiveDate,
) -> Vec<ProjectedOccurrence> {
    let empty = ExceptionSet::default();
    let created_at: HashMap<Uuid, DateTime<Utc>> =
        rules.iter().map(|rule| (rule.id, rule.created_at)).collect();

    let mut merged = Vec::new();
    for rule in rules {
        let exceptions = exceptions_by_rule.get(&rule.id).unwrap_or(&empty);
        merged.extend(project(rule, exceptions, window, today));
    }
    merged.sort_by_key(|occ| {
        (
            occ.effective_date,
            created_at.get(&occ.rule_id).copied(),
            occ.scheduled_date,
        )
    });
    merged
}

/// Returns the occurrence index whose natural date equals `date`, ignoring
/// exceptions and rule status.
pub fn natural_index_of(rule: &RecurrenceRule, date: NaiveDate) -> Option<u32> {
    if date < rule.anchor_date {
        return None;
    }
    for index in 0..MAX_PROJECTED_OCCURRENCES as u32 {
        let scheduled = rule.occurrence_date(index);
        if scheduled == date {
            return rule.allows_occurrence(index, scheduled).then_some(index);
        }
        if scheduled > date {
            return None;
        }
    }
    None
}

/// Validates an exception override before it is saved: the target date must
/// be one the rule naturally produces, and a moved date must not collide
/// with another occurrence's effective date for the same rule.
pub fn validate_exception(
    rule: &RecurrenceRule,
    existing: &ExceptionSet,
    candidate: &OccurrenceException,
) -> Result<(), CoreError> {
    if candidate.rule_id != rule.id {
        return Err(CoreError::Validation(
            "exception targets a different rule".into(),
        ));
    }
    if natural_index_of(rule, candidate.scheduled_date).is_none() {
        return Err(CoreError::Validation(format!(
            "rule {} has no occurrence scheduled on {}",
            rule.id, candidate.scheduled_date
        )));
    }

    let override_date = match &candidate.kind {
        ExceptionKind::Skipped => return Ok(()),
        ExceptionKind::Modified { date: None, .. } => return Ok(()),
        ExceptionKind::Modified {
            date: Some(date), ..
        } => *date,
    };

    // Project far enough past both dates to see every occurrence the moved
    // date could land on, with the candidate's own slot excluded.
    let horizon = candidate.scheduled_date.max(override_date);
    let margin = rule.frequency.date_at(horizon, rule.interval, 1);
    let window = DateWindow::new(rule.anchor_date, margin);
    let mut others = existing.clone();
    others.insert(OccurrenceException::skipped(
        rule.id,
        candidate.scheduled_date,
    ));
    let collision = project(rule, &others, window, margin)
        .iter()
        .any(|occ| occ.effective_date == override_date);
    if collision {
        return Err(CoreError::Validation(format!(
            "override date {} collides with another occurrence of rule {}",
            override_date, rule.id
        )));
    }
    Ok(())
}
