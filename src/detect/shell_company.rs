use crate::core::entity::{EntityId, EntitySet};
use crate::detect::ConfigError;
use crate::graph::entity_graph::RelationshipCounts;
use chrono::{DateTime, Duration, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Points awarded per shell-company indicator. Total is capped at 100.
const HIGH_RISK_JURISDICTION_POINTS: u32 = 30;
const RECENT_REGISTRATION_POINTS: u32 = 20;
const RELATIONSHIP_ASYMMETRY_POINTS: u32 = 25;
const ELEVATED_RISK_POINTS: u32 = 15;
const SCORE_CAP: u32 = 100;

/// Configuration for shell-company scoring.
#[derive(Debug, Clone)]
pub struct ShellCompanyConfig {
    /// Jurisdiction codes considered high risk. Matched case-insensitively
    /// against the entity's free-text jurisdiction field.
    pub high_risk_jurisdictions: HashSet<String>,
    /// Registration younger than this counts as recent.
    pub recency_cutoff: Duration,
    /// Minimum total score for shell-company classification.
    pub score_threshold: u32,
}

impl Default for ShellCompanyConfig {
    fn default() -> Self {
        let jurisdictions = ["KY", "VG", "PA", "BZ", "SC", "MH", "VU", "LR", "CY"]
            .into_iter()
            .map(String::from)
            .collect();
        Self {
            high_risk_jurisdictions: jurisdictions,
            recency_cutoff: Duration::days(365),
            score_threshold: 50,
        }
    }
}

impl ShellCompanyConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.recency_cutoff <= Duration::zero() {
            return Err(ConfigError::NonPositiveRecency(self.recency_cutoff));
        }
        if self.score_threshold == 0 || self.score_threshold > SCORE_CAP {
            return Err(ConfigError::InvalidScoreThreshold(self.score_threshold));
        }
        Ok(())
    }

    fn is_high_risk(&self, jurisdiction: &str) -> bool {
        let normalized = jurisdiction.trim().to_ascii_uppercase();
        self.high_risk_jurisdictions
            .iter()
            .any(|j| j.eq_ignore_ascii_case(&normalized))
    }
}

/// The individual heuristics that contributed to a shell-company score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShellIndicator {
    HighRiskJurisdiction,
    RecentRegistration,
    RelationshipAsymmetry,
    ElevatedRiskLevel,
}

impl fmt::Display for ShellIndicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ShellIndicator::HighRiskJurisdiction => "high-risk jurisdiction",
            ShellIndicator::RecentRegistration => "recent registration",
            ShellIndicator::RelationshipAsymmetry => "relationship asymmetry",
            ShellIndicator::ElevatedRiskLevel => "elevated risk level",
        };
        write!(f, "{}", s)
    }
}

/// An entity classified as a likely shell company.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShellCompanyFlag {
    pub entity_id: EntityId,
    pub score: u32,
    pub indicators: Vec<ShellIndicator>,
}

/// Score entities for shell-company behavior.
///
/// Additive point scoring: +30 for a high-risk jurisdiction, +20 for
/// registration within the recency cutoff of `as_of`, +25 when outgoing
/// relationships exceed three times incoming and number more than two,
/// +15 for an existing high or critical risk level. Entities scoring at
/// or above the threshold are returned, highest score first.
///
/// Relationship tallies come from [`RelationshipCounts`], computed once
/// over the whole snapshot and shared across detectors.
pub fn score_shell_companies(
    entities: &EntitySet,
    counts: &RelationshipCounts,
    as_of: DateTime<Utc>,
    config: &ShellCompanyConfig,
) -> Result<Vec<ShellCompanyFlag>, ConfigError> {
    config.validate()?;

    let mut flagged = Vec::new();

    for entity in entities.entities() {
        let mut score = 0u32;
        let mut indicators = Vec::new();

        if config.is_high_risk(entity.jurisdiction()) {
            score += HIGH_RISK_JURISDICTION_POINTS;
            indicators.push(ShellIndicator::HighRiskJurisdiction);
        }

        if as_of - entity.registered_at() < config.recency_cutoff {
            score += RECENT_REGISTRATION_POINTS;
            indicators.push(ShellIndicator::RecentRegistration);
        }

        let outgoing = counts.outgoing(entity.id());
        let incoming = counts.incoming(entity.id());
        if outgoing > 3 * incoming && outgoing > 2 {
            score += RELATIONSHIP_ASYMMETRY_POINTS;
            indicators.push(ShellIndicator::RelationshipAsymmetry);
        }

        if entity.risk_level().is_elevated() {
            score += ELEVATED_RISK_POINTS;
            indicators.push(ShellIndicator::ElevatedRiskLevel);
        }

        let score = score.min(SCORE_CAP);
        if score >= config.score_threshold {
            flagged.push(ShellCompanyFlag {
                entity_id: entity.id().clone(),
                score,
                indicators,
            });
        }
    }

    flagged.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.entity_id.cmp(&b.entity_id)));
    debug!("shell-company: classified {} entit(ies)", flagged.len());
    Ok(flagged)
}
