use std::collections::HashMap;

use uuid::Uuid;

use crate::matching::{ActualTransaction, InstanceRef, ReconciliationMatch};
use crate::schedule::{DateWindow, OccurrenceException, RecurrenceRule};

use super::{
    MatchStore, NewTransaction, NewTransfer, RealizationLink, RealizedRef, RuleStore, StoreResult,
    TransactionStore,
};

/// In-memory implementation of every store contract, for tests and
/// embedded use. Mutations go through `&mut self`, so a shared instance
/// serializes naturally.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    rules: HashMap<Uuid, RecurrenceRule>,
    exceptions: HashMap<Uuid, Vec<OccurrenceException>>,
    transactions: Vec<ActualTransaction>,
    realizations: HashMap<InstanceRef, RealizedRef>,
    matches: Vec<ReconciliationMatch>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a recorded transaction, as if imported from a bank feed.
    pub fn add_transaction(&mut self, transaction: ActualTransaction) -> Uuid {
        let id = transaction.id;
        self.transactions.push(transaction);
        id
    }

    pub fn transactions(&self) -> &[ActualTransaction] {
        &self.transactions
    }

    pub fn realization(&self, instance: &InstanceRef) -> Option<&RealizedRef> {
        self.realizations.get(instance)
    }

    fn accepted(&self) -> impl Iterator<Item = &ReconciliationMatch> {
        self.matches.iter().filter(|m| m.is_accepted())
    }
}

impl RuleStore for MemoryStore {
    fn rule(&self, rule_id: Uuid) -> StoreResult<Option<RecurrenceRule>> {
        Ok(self.rules.get(&rule_id).cloned())
    }

    fn rules(&self) -> StoreResult<Vec<RecurrenceRule>> {
        let mut rules: Vec<_> = self.rules.values().cloned().collect();
        rules.sort_by_key(|rule| (rule.created_at, rule.id));
        Ok(rules)
    }

    fn save_rule(&mut self, rule: RecurrenceRule) -> StoreResult<()> {
        self.rules.insert(rule.id, rule);
        Ok(())
    }

    fn exceptions(&self, rule_id: Uuid) -> StoreResult<Vec<OccurrenceException>> {
        Ok(self.exceptions.get(&rule_id).cloned().unwrap_or_default())
    }

    fn save_exception(&mut self, exception: OccurrenceException) -> StoreResult<()> {
        let entries = self.exceptions.entry(exception.rule_id).or_default();
        match entries
            .iter_mut()
            .find(|e| e.scheduled_date == exception.scheduled_date)
        {
            Some(existing) => *existing = exception,
            None => entries.push(exception),
        }
        Ok(())
    }
}

impl TransactionStore for MemoryStore {
    fn create_transaction(&mut self, new: NewTransaction) -> StoreResult<Uuid> {
        let id = Uuid::new_v4();
        self.transactions.push(ActualTransaction {
            id,
            account_id: new.account_id,
            date: new.date,
            amount: new.amount,
            description: new.description,
        });
        Ok(id)
    }

    fn create_transfer_pair(&mut self, new: NewTransfer) -> StoreResult<(Uuid, Uuid)> {
        let source = Uuid::new_v4();
        let destination = Uuid::new_v4();
        self.transactions.push(ActualTransaction {
            id: source,
            account_id: new.source_account_id,
            date: new.date,
            amount: -new.amount,
            description: new.description.clone(),
        });
        self.transactions.push(ActualTransaction {
            id: destination,
            account_id: new.destination_account_id,
            date: new.date,
            amount: new.amount,
            description: new.description,
        });
        Ok((source, destination))
    }

    fn is_realized(&self, instance: &InstanceRef) -> StoreResult<bool> {
        Ok(self.realizations.contains_key(instance))
    }

    fn record_realization(&mut self, link: RealizationLink) -> StoreResult<()> {
        self.realizations.insert(link.instance, link.realized);
        Ok(())
    }

    fn find_unmatched(
        &self,
        window: DateWindow,
        account_id: Option<Uuid>,
    ) -> StoreResult<Vec<ActualTransaction>> {
        let settled: Vec<Uuid> = self.accepted().map(|m| m.actual_transaction_id).collect();
        Ok(self
            .transactions
            .iter()
            .filter(|txn| window.contains(txn.date))
            .filter(|txn| account_id.is_none_or(|account| txn.account_id == account))
            .filter(|txn| !settled.contains(&txn.id))
            .cloned()
            .collect())
    }
}

impl MatchStore for MemoryStore {
    fn insert(&mut self, record: ReconciliationMatch) -> StoreResult<()> {
        self.matches.push(record);
        Ok(())
    }

    fn get(&self, id: Uuid) -> StoreResult<Option<ReconciliationMatch>> {
        Ok(self.matches.iter().find(|m| m.id == id).cloned())
    }

    fn update(&mut self, record: &ReconciliationMatch) -> StoreResult<()> {
        if let Some(existing) = self.matches.iter_mut().find(|m| m.id == record.id) {
            *existing = record.clone();
        }
        Ok(())
    }

    fn accepted_for_transaction(
        &self,
        transaction_id: Uuid,
    ) -> StoreResult<Option<ReconciliationMatch>> {
        Ok(self
            .accepted()
            .find(|m| m.actual_transaction_id == transaction_id)
            .cloned())
    }

    fn accepted_for_instance(
        &self,
        instance: &InstanceRef,
    ) -> StoreResult<Option<ReconciliationMatch>> {
        Ok(self.accepted().find(|m| &m.instance == instance).cloned())
    }

    fn all(&self) -> StoreResult<Vec<ReconciliationMatch>> {
        Ok(self.matches.clone())
    }
}
