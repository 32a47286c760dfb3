use crate::core::entity::EntityId;
use crate::core::transaction::{Transaction, TransactionId};
use crate::detect::ConfigError;
use crate::graph::transaction_index::TransactionIndex;
use chrono::Duration;
use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Configuration for layering (chain) detection.
#[derive(Debug, Clone)]
pub struct LayeringConfig {
    /// Minimum number of transactions in a chain, `L`.
    pub min_chain_length: usize,
    /// Window `W` measured from the chain's first transaction.
    pub window: Duration,
    /// Maximum relative amount deviation `V` from the chain's initial
    /// amount, as a fraction (0.1 = 10%).
    pub amount_variance: Decimal,
}

impl Default for LayeringConfig {
    fn default() -> Self {
        Self {
            min_chain_length: 3,
            window: Duration::hours(72),
            amount_variance: Decimal::new(1, 1), // 0.1
        }
    }
}

impl LayeringConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_chain_length < 2 {
            return Err(ConfigError::ChainLengthTooSmall(self.min_chain_length));
        }
        if self.window <= Duration::zero() {
            return Err(ConfigError::NonPositiveWindow(self.window));
        }
        if self.amount_variance < Decimal::ZERO || self.amount_variance > Decimal::ONE {
            return Err(ConfigError::InvalidVariance(self.amount_variance));
        }
        Ok(())
    }
}

/// Result of layering detection: deduplicated, sorted transaction ids.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayeringReport {
    pub flagged: Vec<TransactionId>,
}

impl LayeringReport {
    pub fn len(&self) -> usize {
        self.flagged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flagged.is_empty()
    }
}

/// Detect chains of similar-amount transfers across distinct entities.
///
/// Layering is characterized by near-constant-value transfers hopping
/// through intermediaries in a short window; chain length and amount
/// similarity are the discriminating signals, not cycle closure.
///
/// # Algorithm
///
/// Every transaction is a candidate chain start. A work stack of
/// (chain, visited-entities) frames extends each chain with outgoing
/// transactions from the current destination that are strictly later
/// than the previous hop, within `W` of the chain start, within `V` of
/// the initial amount, and that reach an entity not already on the
/// chain. Branching frames explore every qualifying extension; any
/// chain reaching length `L` flags all of its transactions. The
/// per-chain visited set bounds chain length by the number of entities,
/// so the search terminates on any input.
pub fn detect_layering(
    index: &TransactionIndex<'_>,
    config: &LayeringConfig,
) -> Result<LayeringReport, ConfigError> {
    config.validate()?;

    let mut flagged: BTreeSet<TransactionId> = BTreeSet::new();

    for origin in index.transactions().iter().copied() {
        // Relative variance is undefined for a zero base amount.
        if origin.amount() <= Decimal::ZERO {
            continue;
        }
        let tolerance = origin.amount() * config.amount_variance;
        let deadline = origin.timestamp() + config.window;

        let mut stack: Vec<(Vec<&Transaction>, HashSet<EntityId>)> = vec![(
            vec![origin],
            HashSet::from([origin.source().clone(), origin.destination().clone()]),
        )];

        while let Some((chain, visited)) = stack.pop() {
            if chain.len() >= config.min_chain_length {
                for tx in &chain {
                    flagged.insert(tx.id().clone());
                }
            }

            let last = chain[chain.len() - 1];
            for next in index.outgoing(last.destination()).iter().copied() {
                if next.timestamp() <= last.timestamp() || next.timestamp() > deadline {
                    continue;
                }
                if (next.amount() - origin.amount()).abs() > tolerance {
                    continue;
                }
                if visited.contains(next.destination()) {
                    continue;
                }
                let mut next_chain = chain.clone();
                next_chain.push(next);
                let mut next_visited = visited.clone();
                next_visited.insert(next.destination().clone());
                stack.push((next_chain, next_visited));
            }
        }
    }

    debug!("layering: flagged {} transaction(s)", flagged.len());
    Ok(LayeringReport {
        flagged: flagged.into_iter().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transaction::TransactionSet;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn tx(id: &str, from: &str, to: &str, amount: Decimal, offset_h: i64) -> Transaction {
        Transaction::new(
            TransactionId::new(id),
            EntityId::new(from),
            EntityId::new(to),
            amount,
            Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap() + Duration::hours(offset_h),
        )
    }

    fn run(set: &TransactionSet, config: &LayeringConfig) -> LayeringReport {
        let index = TransactionIndex::build(set);
        detect_layering(&index, config).unwrap()
    }

    #[test]
    fn test_similar_amount_chain_flagged() {
        let mut set = TransactionSet::new();
        set.add(tx("T1", "A", "B", dec!(10000), 0));
        set.add(tx("T2", "B", "C", dec!(9800), 1));
        set.add(tx("T3", "C", "D", dec!(10100), 2));

        let report = run(&set, &LayeringConfig::default());
        assert_eq!(report.len(), 3);
    }

    #[test]
    fn test_chain_shorter_than_minimum_not_flagged() {
        let mut set = TransactionSet::new();
        set.add(tx("T1", "A", "B", dec!(10000), 0));
        set.add(tx("T2", "B", "C", dec!(9800), 1));
        set.add(tx("T3", "C", "D", dec!(10100), 2));

        let config = LayeringConfig {
            min_chain_length: 5,
            ..Default::default()
        };
        assert!(run(&set, &config).is_empty());
    }

    #[test]
    fn test_amount_variance_breaks_chain() {
        let mut set = TransactionSet::new();
        set.add(tx("T1", "A", "B", dec!(10000), 0));
        set.add(tx("T2", "B", "C", dec!(9800), 1));
        // 50% off the initial amount: not a layering hop.
        set.add(tx("T3", "C", "D", dec!(5000), 2));

        assert!(run(&set, &LayeringConfig::default()).is_empty());
    }

    #[test]
    fn test_window_breaks_chain() {
        let mut set = TransactionSet::new();
        set.add(tx("T1", "A", "B", dec!(10000), 0));
        set.add(tx("T2", "B", "C", dec!(9800), 1));
        set.add(tx("T3", "C", "D", dec!(10100), 100));

        assert!(run(&set, &LayeringConfig::default()).is_empty());
    }

    #[test]
    fn test_timestamps_must_increase() {
        let mut set = TransactionSet::new();
        set.add(tx("T1", "A", "B", dec!(10000), 5));
        set.add(tx("T2", "B", "C", dec!(9800), 3));
        set.add(tx("T3", "C", "D", dec!(10100), 1));

        assert!(run(&set, &LayeringConfig::default()).is_empty());
    }

    #[test]
    fn test_cycle_does_not_masquerade_as_layering() {
        // A -> B -> A -> B ... must not count as a chain of intermediaries.
        let mut set = TransactionSet::new();
        set.add(tx("T1", "A", "B", dec!(10000), 0));
        set.add(tx("T2", "B", "A", dec!(10000), 1));
        set.add(tx("T3", "A", "B", dec!(10000), 2));

        assert!(run(&set, &LayeringConfig::default()).is_empty());
    }

    #[test]
    fn test_branching_chains_both_explored() {
        let mut set = TransactionSet::new();
        set.add(tx("T1", "A", "B", dec!(10000), 0));
        set.add(tx("T2", "B", "C", dec!(9900), 1));
        set.add(tx("T3", "C", "D", dec!(10050), 2));
        // Second branch out of B.
        set.add(tx("T4", "B", "E", dec!(10100), 1));
        set.add(tx("T5", "E", "F", dec!(9950), 2));

        let report = run(&set, &LayeringConfig::default());
        assert_eq!(report.len(), 5);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let set = TransactionSet::new();
        let index = TransactionIndex::build(&set);
        let config = LayeringConfig {
            amount_variance: dec!(1.5),
            ..Default::default()
        };
        assert!(detect_layering(&index, &config).is_err());
    }
}
