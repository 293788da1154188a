use std::cmp::Ordering;
use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schedule::ProjectedOccurrence;

use super::record::{InstanceRef, ReconciliationMatch};
use super::tolerances::MatchingTolerances;

/// The matcher's view of a recorded transaction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActualTransaction {
    pub id: Uuid,
    pub account_id: Uuid,
    pub date: NaiveDate,
    pub amount: f64,
    pub description: String,
}

/// One occurrence that survived the tolerance filter for a transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub instance: InstanceRef,
    pub effective_date: NaiveDate,
    pub amount: f64,
    pub score: f64,
    pub date_delta_days: i64,
    pub amount_delta_cents: i64,
}

/// Ranked candidate occurrences for one unmatched transaction. An empty
/// list is a valid outcome, not an error.
#[derive(Debug, Clone)]
pub struct TransactionCandidates {
    pub transaction_id: Uuid,
    pub candidates: Vec<ScoredCandidate>,
}

impl TransactionCandidates {
    pub fn top(&self) -> Option<&ScoredCandidate> {
        self.candidates.first()
    }
}

/// Computes scored candidate pairings between unmatched transactions and
/// projected occurrences under the configured tolerances. Pure function of
/// its inputs; safe to run per-transaction in parallel.
#[derive(Debug, Clone, Default)]
pub struct CandidateFinder {
    pub tolerances: MatchingTolerances,
}

impl CandidateFinder {
    pub fn new(tolerances: MatchingTolerances) -> Self {
        Self { tolerances }
    }

    /// Ranks candidate occurrences for every transaction not already
    /// settled by an Accepted match. Occurrences on the Accepted side of
    /// any match are excluded from candidacy entirely, so a settled pair
    /// can never be double-booked.
    pub fn find_candidates(
        &self,
        actuals: &[ActualTransaction],
        occurrences: &[ProjectedOccurrence],
        matches: &[ReconciliationMatch],
    ) -> Vec<TransactionCandidates> {
        let settled_transactions: HashSet<Uuid> = matches
            .iter()
            .filter(|m| m.is_accepted())
            .map(|m| m.actual_transaction_id)
            .collect();
        let settled_instances: HashSet<InstanceRef> = matches
            .iter()
            .filter(|m| m.is_accepted())
            .map(|m| m.instance)
            .collect();

        actuals
            .iter()
            .filter(|actual| !settled_transactions.contains(&actual.id))
            .map(|actual| {
                let mut candidates: Vec<ScoredCandidate> = occurrences
                    .iter()
                    .filter(|occ| {
                        !settled_instances
                            .contains(&InstanceRef::new(occ.rule_id, occ.scheduled_date))
                    })
                    .filter_map(|occ| self.score_pair(actual, occ))
                    .collect();
                candidates.sort_by(rank_candidates);
                TransactionCandidates {
                    transaction_id: actual.id,
                    candidates,
                }
            })
            .collect()
    }

    /// Returns the scored candidate if the pair clears both tolerance
    /// windows, else `None`. Amounts compare at cent precision, so a delta
    /// exactly at the tolerance is included and one cent beyond is not.
    fn score_pair(
        &self,
        actual: &ActualTransaction,
        occurrence: &ProjectedOccurrence,
    ) -> Option<ScoredCandidate> {
        let amount_delta_cents = (cents(actual.amount) - cents(occurrence.amount)).abs();
        let tolerance_cents = self.amount_tolerance_cents(occurrence.amount);
        if amount_delta_cents > tolerance_cents {
            return None;
        }

        let date_delta_days = (actual.date - occurrence.effective_date).num_days().abs();
        if date_delta_days > self.tolerances.date_tolerance_days {
            return None;
        }

        let date_score = proximity(date_delta_days, self.tolerances.date_tolerance_days);
        let amount_score = proximity(amount_delta_cents, tolerance_cents);
        Some(ScoredCandidate {
            instance: InstanceRef::new(occurrence.rule_id, occurrence.scheduled_date),
            effective_date: occurrence.effective_date,
            amount: occurrence.amount,
            score: 0.5 * date_score + 0.5 * amount_score,
            date_delta_days,
            amount_delta_cents,
        })
    }

    fn amount_tolerance_cents(&self, amount: f64) -> i64 {
        let relative = (amount.abs() * self.tolerances.amount_tolerance_percent * 100.0).round();
        cents(self.tolerances.amount_tolerance_absolute).max(relative as i64)
    }
}

fn cents(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

/// Linear falloff from 1.0 at an exact hit to 0.0 at the tolerance
/// boundary. A zero tolerance admits only exact hits, which score 1.0.
fn proximity(delta: i64, tolerance: i64) -> f64 {
    if tolerance == 0 {
        1.0
    } else {
        1.0 - delta as f64 / tolerance as f64
    }
}

/// Descending score; ties go to the smaller date delta, then the smaller
/// amount delta, then the earlier scheduled date.
fn rank_candidates(a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.date_delta_days.cmp(&b.date_delta_days))
        .then_with(|| a.amount_delta_cents.cmp(&b.amount_delta_cents))
        .then_with(|| a.instance.scheduled_date.cmp(&b.instance.scheduled_date))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn occurrence(rule_id: Uuid, day: NaiveDate, amount: f64) -> ProjectedOccurrence {
        ProjectedOccurrence {
            rule_id,
            scheduled_date: day,
            effective_date: day,
            amount,
            description: "Gym".into(),
            is_modified: false,
            is_past_due: false,
        }
    }

    fn actual(day: NaiveDate, amount: f64) -> ActualTransaction {
        ActualTransaction {
            id: Uuid::new_v4(),
            account_id: Uuid::new_v4(),
            date: day,
            amount,
            description: "GYM MEMBERSHIP".into(),
        }
    }

    #[test]
    fn exact_pair_scores_one() {
        let finder = CandidateFinder::default();
        let rule_id = Uuid::new_v4();
        let txn = actual(date(2026, 1, 5), 50.0);
        let occs = vec![occurrence(rule_id, date(2026, 1, 5), 50.0)];
        let results = finder.find_candidates(&[txn], &occs, &[]);
        assert_eq!(results.len(), 1);
        let top = results[0].top().expect("candidate");
        assert_eq!(top.score, 1.0);
        assert_eq!(top.date_delta_days, 0);
    }

    #[test]
    fn amount_delta_at_tolerance_included_one_cent_beyond_excluded() {
        let finder = CandidateFinder::new(MatchingTolerances {
            amount_tolerance_percent: 0.02,
            amount_tolerance_absolute: 0.0,
            date_tolerance_days: 3,
        });
        let rule_id = Uuid::new_v4();
        let occs = vec![occurrence(rule_id, date(2026, 1, 5), 100.0)];

        // 2% of $100.00 is exactly $2.00.
        let at_boundary = actual(date(2026, 1, 5), 102.0);
        let results = finder.find_candidates(&[at_boundary], &occs, &[]);
        assert_eq!(results[0].candidates.len(), 1);
        assert_eq!(results[0].candidates[0].amount_delta_cents, 200);

        let past_boundary = actual(date(2026, 1, 5), 102.01);
        let results = finder.find_candidates(&[past_boundary], &occs, &[]);
        assert!(results[0].candidates.is_empty());
    }

    #[test]
    fn date_outside_window_is_excluded() {
        let finder = CandidateFinder::default();
        let rule_id = Uuid::new_v4();
        let occs = vec![occurrence(rule_id, date(2026, 1, 5), 50.0)];
        let txn = actual(date(2026, 1, 9), 50.0); // 4 days out, window is 3
        let results = finder.find_candidates(&[txn], &occs, &[]);
        assert!(results[0].candidates.is_empty());
    }

    #[test]
    fn closer_date_ranks_first_on_equal_amounts() {
        let finder = CandidateFinder::default();
        let rule_id = Uuid::new_v4();
        let occs = vec![
            occurrence(rule_id, date(2026, 1, 2), 50.0),
            occurrence(rule_id, date(2026, 1, 5), 50.0),
        ];
        let txn = actual(date(2026, 1, 5), 50.0);
        let results = finder.find_candidates(&[txn], &occs, &[]);
        let ranked = &results[0].candidates;
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].instance.scheduled_date, date(2026, 1, 5));
        assert!(ranked[0].score > ranked[1].score);
    }

    #[test]
    fn tie_breaks_by_earlier_scheduled_date() {
        let finder = CandidateFinder::default();
        let rule_a = Uuid::new_v4();
        let rule_b = Uuid::new_v4();
        // Equidistant dates, identical amounts: same score either side.
        let occs = vec![
            occurrence(rule_b, date(2026, 1, 7), 50.0),
            occurrence(rule_a, date(2026, 1, 3), 50.0),
        ];
        let txn = actual(date(2026, 1, 5), 50.0);
        let results = finder.find_candidates(&[txn], &occs, &[]);
        let ranked = &results[0].candidates;
        assert_eq!(ranked[0].instance.scheduled_date, date(2026, 1, 3));
    }

    #[test]
    fn settled_sides_are_excluded() {
        let finder = CandidateFinder::default();
        let rule_id = Uuid::new_v4();
        let settled_txn = actual(date(2026, 1, 5), 50.0);
        let open_txn = actual(date(2026, 1, 5), 50.0);
        let settled_day = date(2026, 1, 5);
        let occs = vec![
            occurrence(rule_id, settled_day, 50.0),
            occurrence(rule_id, date(2026, 1, 19), 50.0),
        ];
        let accepted = {
            let mut m = ReconciliationMatch::suggested(
                settled_txn.id,
                InstanceRef::new(rule_id, settled_day),
                1.0,
                chrono::Utc::now(),
            );
            m.mark_accepted(chrono::Utc::now());
            m
        };

        let results =
            finder.find_candidates(&[settled_txn.clone(), open_txn.clone()], &occs, &[accepted]);
        // The settled transaction is not reported at all.
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].transaction_id, open_txn.id);
        // The settled occurrence is not proposed to anyone else.
        assert!(results[0]
            .candidates
            .iter()
            .all(|c| c.instance.scheduled_date != settled_day));
    }
}
