//! Reconciliation matching: pairing recorded transactions against projected
//! recurring occurrences, and the persisted match records that track the
//! lifecycle of each pairing.

pub mod candidates;
pub mod record;
pub mod tolerances;

pub use candidates::{ActualTransaction, CandidateFinder, ScoredCandidate, TransactionCandidates};
pub use record::{InstanceRef, MatchKind, MatchStatus, ReconciliationMatch};
pub use tolerances::MatchingTolerances;
