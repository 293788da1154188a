//! External collaborator contracts. The core never talks to a database or
//! filesystem directly; it goes through these traits so hosts can bring
//! their own persistence. `MemoryStore` backs tests and embedding;
//! `JsonStorage` persists the reconciliation book as JSON files.

pub mod json_backend;
pub mod memory;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::StoreError;
use crate::matching::{ActualTransaction, InstanceRef, ReconciliationMatch};
use crate::schedule::{DateWindow, OccurrenceException, RecurrenceRule};

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// A transaction to be created in the external ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub account_id: Uuid,
    pub amount: f64,
    pub date: NaiveDate,
    pub description: String,
}

/// A transfer pair to be created in the external ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransfer {
    pub source_account_id: Uuid,
    pub destination_account_id: Uuid,
    pub amount: f64,
    pub date: NaiveDate,
    pub description: String,
}

/// Reference to what a realized occurrence materialized into.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RealizedRef {
    Transaction(Uuid),
    TransferPair { source: Uuid, destination: Uuid },
}

/// Linkage between a projected occurrence and its concrete transaction(s),
/// recorded at realization time so the date is excluded from past-due
/// summaries and from repeat realization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RealizationLink {
    pub instance: InstanceRef,
    pub realized: RealizedRef,
}

/// Store of recurrence rules and their per-date exception overrides.
pub trait RuleStore: Send + Sync {
    fn rule(&self, rule_id: Uuid) -> StoreResult<Option<RecurrenceRule>>;
    fn rules(&self) -> StoreResult<Vec<RecurrenceRule>>;
    fn save_rule(&mut self, rule: RecurrenceRule) -> StoreResult<()>;
    fn exceptions(&self, rule_id: Uuid) -> StoreResult<Vec<OccurrenceException>>;
    /// Upserts the override keyed by `(rule_id, scheduled_date)`.
    fn save_exception(&mut self, exception: OccurrenceException) -> StoreResult<()>;
}

/// Store of concrete transactions and realization linkage.
pub trait TransactionStore: Send + Sync {
    fn create_transaction(&mut self, new: NewTransaction) -> StoreResult<Uuid>;
    fn create_transfer_pair(&mut self, new: NewTransfer) -> StoreResult<(Uuid, Uuid)>;
    fn is_realized(&self, instance: &InstanceRef) -> StoreResult<bool>;
    fn record_realization(&mut self, link: RealizationLink) -> StoreResult<()>;
    /// Recorded transactions in the window that carry no accepted match.
    fn find_unmatched(
        &self,
        window: DateWindow,
        account_id: Option<Uuid>,
    ) -> StoreResult<Vec<ActualTransaction>>;
}

/// Store of reconciliation match records. Records are append-and-update
/// only; history is never deleted.
pub trait MatchStore: Send + Sync {
    fn insert(&mut self, record: ReconciliationMatch) -> StoreResult<()>;
    fn get(&self, id: Uuid) -> StoreResult<Option<ReconciliationMatch>>;
    fn update(&mut self, record: &ReconciliationMatch) -> StoreResult<()>;
    /// The accepted match currently settling this transaction, if any.
    fn accepted_for_transaction(
        &self,
        transaction_id: Uuid,
    ) -> StoreResult<Option<ReconciliationMatch>>;
    /// The accepted match currently settling this occurrence, if any.
    fn accepted_for_instance(
        &self,
        instance: &InstanceRef,
    ) -> StoreResult<Option<ReconciliationMatch>>;
    fn all(&self) -> StoreResult<Vec<ReconciliationMatch>>;
}

pub use json_backend::{JsonStorage, ReconciliationBook, BOOK_SCHEMA_VERSION};
pub use memory::MemoryStore;
