#![doc(test(attr(deny(warnings))))]

//! Finance Core provides the recurrence projection and reconciliation
//! matching primitives that power personal finance tracking workflows:
//! expanding recurring rules into calendar occurrences, realizing them as
//! concrete transactions, and pairing recorded transactions against the
//! projected schedule.

pub mod config;
pub mod core;
pub mod errors;
pub mod matching;
pub mod schedule;
pub mod storage;
pub mod time;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Finance Core tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
    }
}
