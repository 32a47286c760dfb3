use crate::core::entity::EntityId;
use crate::core::transaction::{Transaction, TransactionSet};
use log::warn;
use std::collections::HashMap;

/// Directed adjacency over a transaction snapshot.
///
/// Maps each entity to the transactions it sent (`outgoing`) and the
/// transactions it received (`incoming`). Building the index is pure:
/// the snapshot is borrowed, never copied or mutated.
///
/// Malformed records (negative amounts) are excluded here, at the single
/// choke point all transaction detectors read through, so no detector
/// needs its own validity filter.
///
/// Per-entity transaction lists are sorted by timestamp (then id) so that
/// detection output is independent of input ordering.
#[derive(Debug)]
pub struct TransactionIndex<'a> {
    by_source: HashMap<EntityId, Vec<&'a Transaction>>,
    by_destination: HashMap<EntityId, Vec<&'a Transaction>>,
    transactions: Vec<&'a Transaction>,
    skipped: usize,
}

impl<'a> TransactionIndex<'a> {
    /// Build the index from a transaction snapshot.
    pub fn build(set: &'a TransactionSet) -> Self {
        let mut by_source: HashMap<EntityId, Vec<&'a Transaction>> = HashMap::new();
        let mut by_destination: HashMap<EntityId, Vec<&'a Transaction>> = HashMap::new();
        let mut transactions = Vec::new();
        let mut skipped = 0usize;

        for tx in set.transactions() {
            if !tx.is_well_formed() {
                skipped += 1;
                continue;
            }
            by_source.entry(tx.source().clone()).or_default().push(tx);
            by_destination
                .entry(tx.destination().clone())
                .or_default()
                .push(tx);
            transactions.push(tx);
        }

        if skipped > 0 {
            warn!("transaction index: excluded {} malformed record(s)", skipped);
        }

        let sort_key = |a: &&Transaction, b: &&Transaction| {
            a.timestamp().cmp(&b.timestamp()).then_with(|| a.id().cmp(b.id()))
        };
        for txs in by_source.values_mut() {
            txs.sort_by(sort_key);
        }
        for txs in by_destination.values_mut() {
            txs.sort_by(sort_key);
        }
        transactions.sort_by(sort_key);

        Self {
            by_source,
            by_destination,
            transactions,
            skipped,
        }
    }

    /// Transactions sent by an entity, sorted by timestamp.
    pub fn outgoing(&self, entity: &EntityId) -> &[&'a Transaction] {
        self.by_source.get(entity).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Transactions received by an entity, sorted by timestamp.
    pub fn incoming(&self, entity: &EntityId) -> &[&'a Transaction] {
        self.by_destination
            .get(entity)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All entities that sent at least one transaction, sorted.
    pub fn source_entities(&self) -> Vec<&EntityId> {
        let mut entities: Vec<&EntityId> = self.by_source.keys().collect();
        entities.sort();
        entities
    }

    /// All entities that received at least one transaction, sorted.
    pub fn destination_entities(&self) -> Vec<&EntityId> {
        let mut entities: Vec<&EntityId> = self.by_destination.keys().collect();
        entities.sort();
        entities
    }

    /// All well-formed transactions, sorted by timestamp.
    pub fn transactions(&self) -> &[&'a Transaction] {
        &self.transactions
    }

    /// Number of records excluded as malformed.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}
