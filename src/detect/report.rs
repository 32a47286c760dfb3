use crate::core::entity::{EntityId, EntitySet, RiskLevel};
use crate::core::relationship::RelationshipSet;
use crate::core::transaction::{TransactionId, TransactionSet};
use crate::detect::centrality::{rank_by_centrality, CentralityScore};
use crate::detect::layering::{detect_layering, LayeringConfig, LayeringReport};
use crate::detect::network::{find_risk_networks, NetworkConfig, RiskNetwork};
use crate::detect::round_trip::{detect_round_trips, RoundTripConfig, RoundTripReport};
use crate::detect::shell_company::{score_shell_companies, ShellCompanyConfig, ShellCompanyFlag};
use crate::detect::structuring::{detect_structuring, StructuringConfig, StructuringReport};
use crate::detect::ConfigError;
use crate::graph::entity_graph::{EntityGraph, RelationshipCounts};
use crate::graph::transaction_index::TransactionIndex;
use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

/// Configuration for a full analysis pass.
///
/// All thresholds are caller-supplied; the defaults carry the
/// conventional constants documented on each detector config.
#[derive(Debug, Clone, Default)]
pub struct AnalysisConfig {
    pub structuring: StructuringConfig,
    pub round_trip: RoundTripConfig,
    pub layering: LayeringConfig,
    pub shell_company: ShellCompanyConfig,
    pub network: NetworkConfig,
    /// Reference instant for registration-recency checks.
    /// Defaults to the wall clock at analysis time.
    pub as_of: Option<DateTime<Utc>>,
}

impl AnalysisConfig {
    /// Validate every detector configuration. Called before any
    /// detection runs so a bad threshold fails the whole invocation
    /// instead of silently skewing one result.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.structuring.validate()?;
        self.round_trip.validate()?;
        self.layering.validate()?;
        self.shell_company.validate()?;
        self.network.validate()?;
        Ok(())
    }
}

/// The named typologies this engine detects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Typology {
    Structuring,
    RoundTrip,
    Layering,
    ShellCompany,
    SuspiciousNetwork,
}

impl std::fmt::Display for Typology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Typology::Structuring => "structuring",
            Typology::RoundTrip => "round-trip",
            Typology::Layering => "layering",
            Typology::ShellCompany => "shell-company",
            Typology::SuspiciousNetwork => "suspicious-network",
        };
        write!(f, "{}", s)
    }
}

/// A named finding with a severity and its implicated ids.
///
/// Derived view over the typed detector results; it has no lifecycle
/// beyond the analysis call that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectedPattern {
    pub typology: Typology,
    pub severity: RiskLevel,
    pub transaction_ids: Vec<TransactionId>,
    pub entity_ids: Vec<EntityId>,
}

/// Combined results of all six detectors over one input snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub structuring: StructuringReport,
    pub round_trips: RoundTripReport,
    pub layering: LayeringReport,
    pub shell_companies: Vec<ShellCompanyFlag>,
    pub risk_networks: Vec<RiskNetwork>,
    pub centrality: Vec<CentralityScore>,
}

impl AnalysisReport {
    /// Total findings across all detectors, for quick triage.
    pub fn finding_count(&self) -> usize {
        self.structuring.len()
            + self.round_trips.len()
            + self.layering.len()
            + self.shell_companies.len()
            + self.risk_networks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.finding_count() == 0
    }

    /// Flatten the typed results into named findings, one per typology
    /// with hits. Severities reflect how directly each typology
    /// evidences laundering: cycles and sub-threshold clustering are
    /// high-confidence signals, layering chains are circumstantial.
    pub fn patterns(&self) -> Vec<DetectedPattern> {
        let mut patterns = Vec::new();
        if !self.structuring.is_empty() {
            patterns.push(DetectedPattern {
                typology: Typology::Structuring,
                severity: RiskLevel::High,
                transaction_ids: self.structuring.flagged.clone(),
                entity_ids: Vec::new(),
            });
        }
        if !self.round_trips.is_empty() {
            patterns.push(DetectedPattern {
                typology: Typology::RoundTrip,
                severity: RiskLevel::High,
                transaction_ids: self.round_trips.flagged.clone(),
                entity_ids: Vec::new(),
            });
        }
        if !self.layering.is_empty() {
            patterns.push(DetectedPattern {
                typology: Typology::Layering,
                severity: RiskLevel::Medium,
                transaction_ids: self.layering.flagged.clone(),
                entity_ids: Vec::new(),
            });
        }
        if !self.shell_companies.is_empty() {
            patterns.push(DetectedPattern {
                typology: Typology::ShellCompany,
                severity: RiskLevel::High,
                transaction_ids: Vec::new(),
                entity_ids: self
                    .shell_companies
                    .iter()
                    .map(|f| f.entity_id.clone())
                    .collect(),
            });
        }
        if !self.risk_networks.is_empty() {
            let mut entity_ids: Vec<EntityId> = self
                .risk_networks
                .iter()
                .flat_map(|n| n.members.iter().cloned())
                .collect();
            entity_ids.sort();
            entity_ids.dedup();
            patterns.push(DetectedPattern {
                typology: Typology::SuspiciousNetwork,
                severity: RiskLevel::High,
                transaction_ids: Vec::new(),
                entity_ids,
            });
        }
        patterns
    }
}

/// The analysis entry point.
///
/// Builds the shared read-only indices once, then runs each detector
/// against them. Detectors do not observe each other's output and
/// could run in parallel; they are run sequentially here because the
/// computation is a short synchronous batch.
pub struct AnalysisEngine;

impl AnalysisEngine {
    /// Run all six detectors over an input snapshot.
    ///
    /// Fails fast with a [`ConfigError`] on out-of-range configuration;
    /// empty inputs produce an empty report, never an error.
    pub fn analyze(
        transactions: &TransactionSet,
        entities: &EntitySet,
        relationships: &RelationshipSet,
        config: &AnalysisConfig,
    ) -> Result<AnalysisReport, ConfigError> {
        config.validate()?;
        let as_of = config.as_of.unwrap_or_else(Utc::now);

        debug!(
            "analyzing {} transaction(s), {} entit(ies), {} relationship(s)",
            transactions.len(),
            entities.len(),
            relationships.len()
        );

        // Shared prerequisites, built once.
        let index = TransactionIndex::build(transactions);
        let graph = EntityGraph::from_relationships(relationships);
        let counts = RelationshipCounts::from_relationships(relationships);

        Ok(AnalysisReport {
            structuring: detect_structuring(&index, &config.structuring)?,
            round_trips: detect_round_trips(&index, &config.round_trip)?,
            layering: detect_layering(&index, &config.layering)?,
            shell_companies: score_shell_companies(
                entities,
                &counts,
                as_of,
                &config.shell_company,
            )?,
            risk_networks: find_risk_networks(&graph, entities, &config.network)?,
            centrality: rank_by_centrality(entities, relationships),
        })
    }
}

impl std::fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Typology Analysis Report ===")?;
        writeln!(f, "Structuring:     {} transaction(s)", self.structuring.len())?;
        writeln!(
            f,
            "Round-trips:     {} transaction(s) in {} cycle(s)",
            self.round_trips.len(),
            self.round_trips.cycles.len()
        )?;
        writeln!(f, "Layering:        {} transaction(s)", self.layering.len())?;
        writeln!(f, "Shell companies: {}", self.shell_companies.len())?;
        writeln!(f, "Risk networks:   {}", self.risk_networks.len())?;

        for cycle in &self.round_trips.cycles {
            let entities: Vec<String> = cycle.entities.iter().map(|e| e.to_string()).collect();
            writeln!(f, "  Cycle: {} → (back to start)", entities.join(" → "))?;
        }
        for flag in &self.shell_companies {
            let indicators: Vec<String> =
                flag.indicators.iter().map(|i| i.to_string()).collect();
            writeln!(
                f,
                "  Shell: {} (score {}: {})",
                flag.entity_id,
                flag.score,
                indicators.join(", ")
            )?;
        }
        for network in &self.risk_networks {
            writeln!(
                f,
                "  Network: {} member(s), risk {:.1}",
                network.len(),
                network.network_risk
            )?;
        }

        writeln!(f, "\nTop centrality:")?;
        for score in self.centrality.iter().take(10) {
            writeln!(f, "  {:>4}  {}", score.connections, score.entity_id)?;
        }
        Ok(())
    }
}
