#![allow(dead_code)]

use chrono::{NaiveDate, TimeZone, Utc};
use uuid::Uuid;

use finance_core::matching::ActualTransaction;
use finance_core::schedule::{Frequency, RecurrenceRule, RuleKind};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
}

/// Rules created through this helper get increasing creation timestamps, so
/// merge ordering by creation order is deterministic in tests.
pub fn rule(
    description: &str,
    amount: f64,
    frequency: Frequency,
    interval: u32,
    anchor: NaiveDate,
    creation_index: u32,
) -> RecurrenceRule {
    let created_at = Utc
        .with_ymd_and_hms(2025, 12, 1, 12, 0, creation_index)
        .unwrap();
    RecurrenceRule::new(
        RuleKind::Single {
            account_id: Uuid::new_v4(),
        },
        description,
        amount,
        frequency,
        interval,
        anchor,
        created_at,
    )
}

pub fn transfer_rule(
    description: &str,
    amount: f64,
    frequency: Frequency,
    interval: u32,
    anchor: NaiveDate,
) -> RecurrenceRule {
    RecurrenceRule::new(
        RuleKind::Transfer {
            source_account_id: Uuid::new_v4(),
            destination_account_id: Uuid::new_v4(),
        },
        description,
        amount,
        frequency,
        interval,
        anchor,
        Utc.with_ymd_and_hms(2025, 12, 1, 12, 0, 0).unwrap(),
    )
}

pub fn recorded(day: NaiveDate, amount: f64, description: &str) -> ActualTransaction {
    ActualTransaction {
        id: Uuid::new_v4(),
        account_id: Uuid::new_v4(),
        date: day,
        amount,
        description: description.into(),
    }
}
