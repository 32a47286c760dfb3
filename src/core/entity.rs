use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Unique identifier for an entity in the analyzed network.
///
/// An entity can represent a company, an individual, a trust, or any
/// party that appears as a transaction endpoint or relationship member.
///
/// # Examples
///
/// ```
/// use typology_engine::core::entity::EntityId;
///
/// let acme = EntityId::new("ACME-HOLDINGS");
/// let globex = EntityId::new("GLOBEX-LTD");
/// assert_ne!(acme, globex);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Ordered risk classification of an entity.
///
/// Ordering is `Low < Medium < High < Critical`, so range comparisons
/// like `level >= RiskLevel::High` read naturally.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// High or Critical.
    pub fn is_elevated(self) -> bool {
        self >= RiskLevel::High
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        };
        write!(f, "{}", s)
    }
}

/// An entity participating in the analyzed network.
///
/// Entities are immutable per analysis pass; the risk level and score
/// reflect the external data layer's existing classification, not the
/// output of this engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    id: EntityId,
    name: String,
    /// Free-text entity type (e.g. "corporation", "individual", "trust").
    kind: String,
    /// Free-text jurisdiction or country code.
    jurisdiction: String,
    /// When the entity was registered or incorporated.
    registered_at: DateTime<Utc>,
    risk_level: RiskLevel,
    /// Numeric risk score assigned by the upstream classification.
    risk_score: f64,
}

impl Entity {
    pub fn new(
        id: EntityId,
        name: impl Into<String>,
        jurisdiction: impl Into<String>,
        registered_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            kind: String::new(),
            jurisdiction: jurisdiction.into(),
            registered_at,
            risk_level: RiskLevel::Low,
            risk_score: 0.0,
        }
    }

    /// Set the entity type.
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    /// Set the upstream risk classification.
    pub fn with_risk(mut self, level: RiskLevel, score: f64) -> Self {
        self.risk_level = level;
        self.risk_score = score;
        self
    }

    // --- Accessors ---

    pub fn id(&self) -> &EntityId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn jurisdiction(&self) -> &str {
        &self.jurisdiction
    }

    pub fn registered_at(&self) -> DateTime<Utc> {
        self.registered_at
    }

    pub fn risk_level(&self) -> RiskLevel {
        self.risk_level
    }

    pub fn risk_score(&self) -> f64 {
        self.risk_score
    }
}

/// A snapshot collection of entities submitted for analysis.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntitySet {
    entities: Vec<Entity>,
}

impl EntitySet {
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
        }
    }

    pub fn add(&mut self, entity: Entity) {
        self.entities.push(entity);
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Build an id → entity lookup over this snapshot.
    ///
    /// Detectors that resolve members to entity records build this once
    /// per analysis rather than scanning the collection repeatedly.
    pub fn by_id(&self) -> HashMap<&EntityId, &Entity> {
        self.entities.iter().map(|e| (e.id(), e)).collect()
    }
}

impl FromIterator<Entity> for EntitySet {
    fn from_iter<T: IntoIterator<Item = Entity>>(iter: T) -> Self {
        Self {
            entities: iter.into_iter().collect(),
        }
    }
}
