mod common;

use common::{date, recorded, rule, transfer_rule};
use finance_core::config::Config;
use finance_core::core::services::{MatchService, RealizeRequest, RealizeService, ScheduleService};
use finance_core::errors::MatchError;
use finance_core::matching::{CandidateFinder, InstanceRef, MatchKind, MatchStatus};
use finance_core::schedule::{project, DateWindow, ExceptionSet, Frequency};
use finance_core::storage::{MatchStore, MemoryStore, RealizedRef, RuleStore, TransactionStore};
use finance_core::time::{Clock, FixedClock};

#[test]
fn suggestions_come_from_top_candidates_above_the_floor() {
    let gym = rule("Gym", 50.0, Frequency::Weekly, 2, date(2026, 1, 5), 0);
    let window = DateWindow::new(date(2026, 1, 1), date(2026, 2, 28));
    let today = date(2026, 3, 1);
    let occurrences = project(&gym, &ExceptionSet::default(), window, today);

    let close = recorded(date(2026, 1, 5), 50.0, "GYM CLUB");
    let grazing = recorded(date(2026, 1, 22), 51.0, "GYM CLUB"); // boundary on both axes
    let clock = FixedClock::on(today);
    let config = Config::default();

    let finder = CandidateFinder::new(config.tolerances);
    let candidates = finder.find_candidates(&[close.clone(), grazing.clone()], &occurrences, &[]);

    let mut store = MemoryStore::new();
    let created = MatchService::create_suggested(
        &mut store,
        &clock,
        &candidates,
        config.min_suggestion_confidence,
    )
    .unwrap();

    assert_eq!(created.len(), 1, "the grazing candidate scores zero");
    assert_eq!(created[0].actual_transaction_id, close.id);
    assert_eq!(created[0].kind, MatchKind::Suggested);
    assert_eq!(created[0].status, MatchStatus::Pending);
    assert_eq!(created[0].confidence, Some(1.0));
}

#[test]
fn repeated_suggestion_runs_do_not_duplicate_pending_pairs() {
    let gym = rule("Gym", 50.0, Frequency::Weekly, 2, date(2026, 1, 5), 0);
    let window = DateWindow::new(date(2026, 1, 1), date(2026, 2, 28));
    let today = date(2026, 3, 1);
    let occurrences = project(&gym, &ExceptionSet::default(), window, today);
    let txn = recorded(date(2026, 1, 5), 50.0, "GYM CLUB");
    let clock = FixedClock::on(today);

    let finder = CandidateFinder::default();
    let candidates = finder.find_candidates(&[txn], &occurrences, &[]);

    let mut store = MemoryStore::new();
    let first = MatchService::create_suggested(&mut store, &clock, &candidates, 0.3).unwrap();
    let second = MatchService::create_suggested(&mut store, &clock, &candidates, 0.3).unwrap();
    assert_eq!(first.len(), 1);
    assert!(second.is_empty());
    assert_eq!(store.all().unwrap().len(), 1);
}

#[test]
fn accept_records_resolution_and_blocks_the_loser() {
    let today = date(2026, 3, 1);
    let clock = FixedClock::on(today);
    let mut store = MemoryStore::new();

    // Two pending suggestions compete for the same occurrence.
    let instance = InstanceRef::new(uuid::Uuid::new_v4(), date(2026, 2, 2));
    let winner = finance_core::matching::ReconciliationMatch::suggested(
        uuid::Uuid::new_v4(),
        instance,
        0.9,
        clock.now(),
    );
    let loser = finance_core::matching::ReconciliationMatch::suggested(
        uuid::Uuid::new_v4(),
        instance,
        0.8,
        clock.now(),
    );
    store.insert(winner.clone()).unwrap();
    store.insert(loser.clone()).unwrap();

    let accepted = MatchService::accept(&mut store, &clock, winner.id).unwrap();
    assert_eq!(accepted.resolved_at, Some(clock.now()));

    let err = MatchService::accept(&mut store, &clock, loser.id).unwrap_err();
    assert!(matches!(err, MatchError::Conflict(_)));

    // The losing record is still pending history, not silently mutated.
    let loser_now = store.get(loser.id).unwrap().unwrap();
    assert_eq!(loser_now.status, MatchStatus::Pending);
}

#[test]
fn bulk_accept_is_independent_per_item() {
    let today = date(2026, 3, 1);
    let clock = FixedClock::on(today);
    let mut store = MemoryStore::new();
    let shared_txn = uuid::Uuid::new_v4();

    let a = finance_core::matching::ReconciliationMatch::suggested(
        shared_txn,
        InstanceRef::new(uuid::Uuid::new_v4(), date(2026, 2, 2)),
        0.9,
        clock.now(),
    );
    let b = finance_core::matching::ReconciliationMatch::suggested(
        shared_txn,
        InstanceRef::new(uuid::Uuid::new_v4(), date(2026, 2, 16)),
        0.8,
        clock.now(),
    );
    let c = finance_core::matching::ReconciliationMatch::suggested(
        uuid::Uuid::new_v4(),
        InstanceRef::new(uuid::Uuid::new_v4(), date(2026, 2, 20)),
        0.7,
        clock.now(),
    );
    for record in [&a, &b, &c] {
        store.insert((*record).clone()).unwrap();
    }

    let outcomes = MatchService::bulk_accept(&mut store, &clock, &[a.id, b.id, c.id]);
    assert!(outcomes[0].result.is_ok());
    assert!(
        matches!(outcomes[1].result, Err(MatchError::Conflict(_))),
        "second match shares the transaction side"
    );
    assert!(outcomes[2].result.is_ok(), "unrelated match is unaffected");
}

#[test]
fn realized_transfer_creates_both_legs() {
    let mut store = MemoryStore::new();
    let savings = transfer_rule("Savings sweep", 200.0, Frequency::Monthly, 1, date(2026, 1, 1));
    let rule_id = ScheduleService::save_rule(&mut store, savings).unwrap();

    let rules = store.clone();
    let request = RealizeRequest::new(rule_id, date(2026, 2, 1));
    let realized = RealizeService::realize(&rules, &mut store, &request, date(2026, 2, 5)).unwrap();

    let RealizedRef::TransferPair {
        source,
        destination,
    } = realized
    else {
        panic!("transfer rules realize as a pair");
    };
    assert!(store.transactions().iter().any(|t| t.id == source));
    assert!(store.transactions().iter().any(|t| t.id == destination));
}

#[test]
fn full_reconciliation_flow_round_trips() {
    let today = date(2026, 3, 1);
    let clock = FixedClock::on(today);
    let config = Config::default();
    let mut store = MemoryStore::new();

    // Bi-weekly gym membership, $50, anchored 2026-01-05.
    let gym = rule("Gym", 50.0, Frequency::Weekly, 2, date(2026, 1, 5), 0);
    let rule_id = ScheduleService::save_rule(&mut store, gym).unwrap();

    // Bank feed: two debits that should match, one unrelated.
    let t1 = recorded(date(2026, 1, 5), 50.0, "GYM CLUB LLC");
    let t2 = recorded(date(2026, 1, 20), 50.5, "GYM CLUB LLC");
    let unrelated = recorded(date(2026, 1, 11), 250.0, "CAR REPAIR");
    for txn in [&t1, &t2, &unrelated] {
        store.add_transaction((*txn).clone());
    }

    let window = DateWindow::new(date(2026, 1, 1), date(2026, 2, 28));
    let rule = store.rule(rule_id).unwrap().unwrap();
    let exceptions = ExceptionSet::new(store.exceptions(rule_id).unwrap());
    let occurrences = project(&rule, &exceptions, window, today);
    assert_eq!(occurrences.len(), 4);

    let unmatched = store.find_unmatched(window, None).unwrap();
    assert_eq!(unmatched.len(), 3);

    let finder = CandidateFinder::new(config.tolerances);
    let candidates = finder.find_candidates(&unmatched, &occurrences, &store.all().unwrap());
    let suggested = MatchService::create_suggested(
        &mut store,
        &clock,
        &candidates,
        config.min_suggestion_confidence,
    )
    .unwrap();
    assert_eq!(suggested.len(), 2, "the unrelated debit finds no candidate");

    let ids: Vec<_> = suggested.iter().map(|m| m.id).collect();
    let outcomes = MatchService::bulk_accept(&mut store, &clock, &ids);
    assert!(outcomes.iter().all(|o| o.result.is_ok()));

    // Both matched transactions are now settled and out of the unmatched pool.
    let unmatched = store.find_unmatched(window, None).unwrap();
    assert_eq!(unmatched.len(), 1);
    assert_eq!(unmatched[0].id, unrelated.id);

    // Unlink the first pairing; the pair becomes suggestible again.
    let t1_match = store.accepted_for_transaction(t1.id).unwrap().unwrap();
    MatchService::unlink(&mut store, &clock, t1_match.id).unwrap();
    assert!(store.accepted_for_transaction(t1.id).unwrap().is_none());

    let unmatched = store.find_unmatched(window, None).unwrap();
    let candidates = finder.find_candidates(&unmatched, &occurrences, &store.all().unwrap());
    let resuggested = MatchService::create_suggested(
        &mut store,
        &clock,
        &candidates,
        config.min_suggestion_confidence,
    )
    .unwrap();
    assert_eq!(resuggested.len(), 1);
    assert_eq!(resuggested[0].actual_transaction_id, t1.id);
    assert_eq!(resuggested[0].instance, t1_match.instance);
    assert_ne!(resuggested[0].id, t1_match.id, "a fresh record is created");

    // History keeps every record; nothing was hard-deleted.
    assert_eq!(store.all().unwrap().len(), 3);
}
