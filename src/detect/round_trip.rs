use crate::core::entity::EntityId;
use crate::core::transaction::{Transaction, TransactionId};
use crate::detect::ConfigError;
use crate::graph::transaction_index::TransactionIndex;
use chrono::Duration;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Configuration for round-trip (cycle) detection.
#[derive(Debug, Clone)]
pub struct RoundTripConfig {
    /// Maximum number of transactions in a chain, `M`. Hard depth cutoff.
    pub max_chain_length: usize,
    /// Maximum elapsed time between the first and last transaction, `W`.
    pub window: Duration,
}

impl Default for RoundTripConfig {
    fn default() -> Self {
        Self {
            max_chain_length: 5,
            window: Duration::days(7),
        }
    }
}

impl RoundTripConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_chain_length < 2 {
            return Err(ConfigError::ChainLengthTooSmall(self.max_chain_length));
        }
        if self.window <= Duration::zero() {
            return Err(ConfigError::NonPositiveWindow(self.window));
        }
        Ok(())
    }
}

/// A circular chain of transactions returning funds to their origin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundTripCycle {
    /// Entities along the cycle, starting from the origin. The last
    /// transaction returns to the first entity.
    pub entities: Vec<EntityId>,
    /// Transactions forming the cycle, in traversal order.
    pub transaction_ids: Vec<TransactionId>,
}

impl RoundTripCycle {
    /// Number of transactions (and entities) in this cycle.
    pub fn len(&self) -> usize {
        self.transaction_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transaction_ids.is_empty()
    }
}

/// Result of round-trip detection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoundTripReport {
    /// Every transaction participating in at least one round-trip,
    /// deduplicated by id.
    pub flagged: Vec<TransactionId>,
    /// Distinct cycles, deduplicated by canonical entity rotation so the
    /// same circle is not reported once per member chosen as start.
    pub cycles: Vec<RoundTripCycle>,
}

impl RoundTripReport {
    pub fn len(&self) -> usize {
        self.flagged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flagged.is_empty()
    }
}

/// Detect transaction chains that return to their origin entity.
///
/// # Algorithm
///
/// From every entity, runs a bounded depth-first search over outgoing
/// transactions using an explicit work stack (no recursion). Each stack
/// frame carries its own path and visited set, so an entity may appear
/// on different branches but never twice on the same path. A chain of
/// 2..=M transactions whose destination equals the start entity, with
/// the first-to-last elapsed time within `W`, flags every transaction
/// on the chain.
///
/// The depth cutoff `M` and per-path visited set are hard bounds: on a
/// fully connected graph of N entities the search visits at most on the
/// order of N^M frames and then stops.
pub fn detect_round_trips(
    index: &TransactionIndex<'_>,
    config: &RoundTripConfig,
) -> Result<RoundTripReport, ConfigError> {
    config.validate()?;

    let mut flagged: BTreeSet<TransactionId> = BTreeSet::new();
    let mut cycles: Vec<RoundTripCycle> = Vec::new();
    let mut seen_cycles: HashSet<Vec<EntityId>> = HashSet::new();

    for start in index.source_entities() {
        // Frame: entity to expand from, path of transactions so far,
        // entities already on this path.
        let mut stack: Vec<(EntityId, Vec<&Transaction>, HashSet<EntityId>)> = vec![(
            (*start).clone(),
            Vec::new(),
            HashSet::from([(*start).clone()]),
        )];

        while let Some((current, path, visited)) = stack.pop() {
            for tx in index.outgoing(&current).iter().copied() {
                if tx.destination() == start {
                    if path.is_empty() {
                        // Self-transfer, not a round-trip chain.
                        continue;
                    }
                    let first = path[0].timestamp();
                    let last = tx.timestamp();
                    let span = if last >= first { last - first } else { first - last };
                    if span <= config.window {
                        for leg in path.iter().copied().chain(std::iter::once(tx)) {
                            flagged.insert(leg.id().clone());
                        }
                        record_cycle(start, &path, tx, &mut seen_cycles, &mut cycles);
                    }
                } else if !visited.contains(tx.destination())
                    && path.len() + 1 < config.max_chain_length
                {
                    let mut next_path = path.clone();
                    next_path.push(tx);
                    let mut next_visited = visited.clone();
                    next_visited.insert(tx.destination().clone());
                    stack.push((tx.destination().clone(), next_path, next_visited));
                }
            }
        }
    }

    debug!(
        "round-trip: flagged {} transaction(s) across {} distinct cycle(s)",
        flagged.len(),
        cycles.len()
    );
    Ok(RoundTripReport {
        flagged: flagged.into_iter().collect(),
        cycles,
    })
}

fn record_cycle(
    start: &EntityId,
    path: &[&Transaction],
    closing: &Transaction,
    seen: &mut HashSet<Vec<EntityId>>,
    cycles: &mut Vec<RoundTripCycle>,
) {
    let mut entities = Vec::with_capacity(path.len() + 1);
    entities.push(start.clone());
    for tx in path {
        entities.push(tx.destination().clone());
    }

    if !seen.insert(canonical_rotation(&entities)) {
        return;
    }

    let mut transaction_ids: Vec<TransactionId> =
        path.iter().map(|tx| tx.id().clone()).collect();
    transaction_ids.push(closing.id().clone());
    cycles.push(RoundTripCycle {
        entities,
        transaction_ids,
    });
}

/// Normalize a cycle to its smallest rotation so the same circle found
/// from different starting entities maps to one key.
fn canonical_rotation(entities: &[EntityId]) -> Vec<EntityId> {
    if entities.is_empty() {
        return Vec::new();
    }
    let n = entities.len();
    let mut best = entities.to_vec();
    for i in 1..n {
        let rotated: Vec<EntityId> = entities[i..]
            .iter()
            .chain(entities[..i].iter())
            .cloned()
            .collect();
        if rotated < best {
            best = rotated;
        }
    }
    best
}
