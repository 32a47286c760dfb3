use crate::core::entity::{EntityId, EntitySet};
use crate::detect::ConfigError;
use crate::graph::entity_graph::EntityGraph;
use log::debug;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Configuration for suspicious-network detection.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Smallest connected component worth reporting.
    pub min_component_size: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            min_component_size: 3,
        }
    }
}

impl NetworkConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_component_size < 2 {
            return Err(ConfigError::ComponentSizeTooSmall(self.min_component_size));
        }
        Ok(())
    }
}

/// A connected sub-network of related entities, scored by aggregate risk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskNetwork {
    /// Sorted member entity ids.
    pub members: Vec<EntityId>,
    /// Mean upstream risk score over members with an entity record.
    pub average_risk_score: f64,
    /// Percentage of scored members at high or critical risk level.
    pub elevated_share: f64,
    /// Aggregate network risk: average × (1 + elevated_share / 100).
    pub network_risk: f64,
}

impl RiskNetwork {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Find connected components of related entities and rank them by risk.
///
/// Components smaller than the configured floor are discarded. Members
/// without a record in the entity snapshot still count toward component
/// size but are excluded from the risk aggregates (malformed-record
/// policy: skip, never abort).
pub fn find_risk_networks(
    graph: &EntityGraph,
    entities: &EntitySet,
    config: &NetworkConfig,
) -> Result<Vec<RiskNetwork>, ConfigError> {
    config.validate()?;

    let by_id = entities.by_id();
    let mut networks = Vec::new();

    for members in graph.components() {
        if members.len() < config.min_component_size {
            continue;
        }

        let scored: Vec<_> = members.iter().filter_map(|id| by_id.get(id)).collect();
        let (average_risk_score, elevated_share) = if scored.is_empty() {
            (0.0, 0.0)
        } else {
            let total: f64 = scored.iter().map(|e| e.risk_score()).sum();
            let elevated = scored.iter().filter(|e| e.risk_level().is_elevated()).count();
            (
                total / scored.len() as f64,
                elevated as f64 * 100.0 / scored.len() as f64,
            )
        };

        networks.push(RiskNetwork {
            members,
            average_risk_score,
            elevated_share,
            network_risk: average_risk_score * (1.0 + elevated_share / 100.0),
        });
    }

    networks.sort_by(|a, b| {
        b.network_risk
            .partial_cmp(&a.network_risk)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.members.cmp(&b.members))
    });
    debug!("network: retained {} component(s)", networks.len());
    Ok(networks)
}
