use crate::core::transaction::TransactionId;
use crate::detect::ConfigError;
use crate::graph::transaction_index::TransactionIndex;
use chrono::Duration;
use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Configuration for structuring detection.
///
/// Defaults follow common reporting practice: a 10,000 reporting
/// threshold, a 1,000 buffer band below it, and a 48 hour window.
#[derive(Debug, Clone)]
pub struct StructuringConfig {
    /// Regulatory reporting threshold `T`.
    pub reporting_threshold: Decimal,
    /// Band width `B`: amounts in `[T - B, T)` are considered sub-threshold.
    pub buffer: Decimal,
    /// Time window `W` within which clustered deposits are suspicious.
    pub window: Duration,
}

impl Default for StructuringConfig {
    fn default() -> Self {
        Self {
            reporting_threshold: Decimal::from(10_000),
            buffer: Decimal::from(1_000),
            window: Duration::hours(48),
        }
    }
}

impl StructuringConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reporting_threshold <= Decimal::ZERO {
            return Err(ConfigError::NonPositiveThreshold(self.reporting_threshold));
        }
        if self.buffer <= Decimal::ZERO || self.buffer > self.reporting_threshold {
            return Err(ConfigError::InvalidBuffer {
                threshold: self.reporting_threshold,
                buffer: self.buffer,
            });
        }
        if self.window <= Duration::zero() {
            return Err(ConfigError::NonPositiveWindow(self.window));
        }
        Ok(())
    }
}

/// Result of structuring detection: deduplicated, sorted transaction ids.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StructuringReport {
    pub flagged: Vec<TransactionId>,
}

impl StructuringReport {
    pub fn len(&self) -> usize {
        self.flagged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flagged.is_empty()
    }
}

/// Detect transactions clustered just below the reporting threshold.
///
/// # Algorithm
///
/// Per destination entity, take all transactions with amounts in the
/// half-open band `[T - B, T)`. Any two such transactions within `W` of
/// each other (absolute difference, either direction in time) flag both.
/// Accumulation into a set keyed by id makes the "each transaction
/// flagged at most once" invariant structural.
pub fn detect_structuring(
    index: &TransactionIndex<'_>,
    config: &StructuringConfig,
) -> Result<StructuringReport, ConfigError> {
    config.validate()?;

    let band_low = config.reporting_threshold - config.buffer;
    let band_high = config.reporting_threshold;
    let mut flagged: BTreeSet<TransactionId> = BTreeSet::new();

    for destination in index.destination_entities() {
        // Incoming lists are already timestamp-sorted, so each in-band
        // transaction only needs to scan forward until the window closes.
        let in_band: Vec<_> = index
            .incoming(destination)
            .iter()
            .filter(|tx| tx.amount() >= band_low && tx.amount() < band_high)
            .copied()
            .collect();

        for (i, tx) in in_band.iter().enumerate() {
            for other in &in_band[i + 1..] {
                if other.timestamp() - tx.timestamp() > config.window {
                    break;
                }
                flagged.insert(tx.id().clone());
                flagged.insert(other.id().clone());
            }
        }
    }

    debug!("structuring: flagged {} transaction(s)", flagged.len());
    Ok(StructuringReport {
        flagged: flagged.into_iter().collect(),
    })
}
