use crate::core::entity::EntityId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a transaction.
///
/// Identifiers are supplied by the external data layer and are opaque
/// to the engine; only equality and ordering matter here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TransactionId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A single transfer of value between two entities.
///
/// Transactions are immutable once created. They are produced by the
/// external data layer and consumed read-only by the detectors; the
/// engine never creates, mutates, or persists them.
///
/// # Examples
///
/// ```
/// use typology_engine::core::transaction::{Transaction, TransactionId};
/// use typology_engine::core::entity::EntityId;
/// use chrono::Utc;
/// use rust_decimal_macros::dec;
///
/// let tx = Transaction::new(
///     TransactionId::new("TX-001"),
///     EntityId::new("ACME-HOLDINGS"),
///     EntityId::new("GLOBEX-LTD"),
///     dec!(9500),
///     Utc::now(),
/// );
///
/// assert_eq!(tx.amount(), dec!(9500));
/// assert!(tx.is_well_formed());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier for this transaction.
    id: TransactionId,
    /// The entity the funds left.
    source: EntityId,
    /// The entity the funds arrived at.
    destination: EntityId,
    /// Transferred amount. Expected non-negative; records that violate
    /// this are excluded from pattern consideration, never rejected.
    amount: Decimal,
    /// When the transfer occurred.
    timestamp: DateTime<Utc>,
    /// Free-text transaction category (e.g. "wire", "cash-deposit").
    category: String,
}

impl Transaction {
    pub fn new(
        id: TransactionId,
        source: EntityId,
        destination: EntityId,
        amount: Decimal,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            source,
            destination,
            amount,
            timestamp,
            category: String::new(),
        }
    }

    /// Set the transaction category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    // --- Accessors ---

    pub fn id(&self) -> &TransactionId {
        &self.id
    }

    pub fn source(&self) -> &EntityId {
        &self.source
    }

    pub fn destination(&self) -> &EntityId {
        &self.destination
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    /// Whether this record is usable for pattern detection.
    ///
    /// Malformed records (negative amounts) are silently skipped when the
    /// transaction index is built rather than aborting the batch.
    pub fn is_well_formed(&self) -> bool {
        self.amount >= Decimal::ZERO
    }
}

/// A snapshot collection of transactions submitted for analysis.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionSet {
    transactions: Vec<Transaction>,
}

impl TransactionSet {
    pub fn new() -> Self {
        Self {
            transactions: Vec::new(),
        }
    }

    pub fn add(&mut self, transaction: Transaction) {
        self.transactions.push(transaction);
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Total gross value of all well-formed transactions.
    pub fn gross_volume(&self) -> Decimal {
        self.transactions
            .iter()
            .filter(|t| t.is_well_formed())
            .map(|t| t.amount())
            .sum()
    }

    /// All unique entity ids referenced as source or destination.
    pub fn entities(&self) -> Vec<EntityId> {
        let mut entities: Vec<EntityId> = self
            .transactions
            .iter()
            .flat_map(|t| vec![t.source().clone(), t.destination().clone()])
            .collect();
        entities.sort();
        entities.dedup();
        entities
    }
}

impl FromIterator<Transaction> for TransactionSet {
    fn from_iter<T: IntoIterator<Item = Transaction>>(iter: T) -> Self {
        Self {
            transactions: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_transaction() -> Transaction {
        Transaction::new(
            TransactionId::new("TX-1"),
            EntityId::new("A"),
            EntityId::new("B"),
            dec!(9500),
            Utc::now(),
        )
        .with_category("wire")
    }

    #[test]
    fn test_transaction_creation() {
        let tx = sample_transaction();
        assert_eq!(tx.id().as_str(), "TX-1");
        assert_eq!(tx.source().as_str(), "A");
        assert_eq!(tx.destination().as_str(), "B");
        assert_eq!(tx.amount(), dec!(9500));
        assert_eq!(tx.category(), "wire");
    }

    #[test]
    fn test_negative_amount_is_malformed() {
        let tx = Transaction::new(
            TransactionId::new("TX-2"),
            EntityId::new("A"),
            EntityId::new("B"),
            dec!(-10),
            Utc::now(),
        );
        assert!(!tx.is_well_formed());
    }

    #[test]
    fn test_set_gross_volume_skips_malformed() {
        let mut set = TransactionSet::new();
        set.add(sample_transaction());
        set.add(Transaction::new(
            TransactionId::new("TX-2"),
            EntityId::new("A"),
            EntityId::new("B"),
            dec!(-100),
            Utc::now(),
        ));
        assert_eq!(set.gross_volume(), dec!(9500));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_set_entities() {
        let mut set = TransactionSet::new();
        set.add(sample_transaction());
        set.add(Transaction::new(
            TransactionId::new("TX-2"),
            EntityId::new("B"),
            EntityId::new("C"),
            dec!(100),
            Utc::now(),
        ));
        assert_eq!(set.entities().len(), 3);
    }
}
