use crate::core::entity::EntityId;
use serde::{Deserialize, Serialize};

/// A relationship between two entities.
///
/// Relationships are directed for provenance (who declared whom), but
/// the network detectors treat them as undirected edges.
///
/// # Examples
///
/// ```
/// use typology_engine::core::relationship::EntityRelationship;
/// use typology_engine::core::entity::EntityId;
///
/// let rel = EntityRelationship::new(
///     EntityId::new("ACME-HOLDINGS"),
///     EntityId::new("GLOBEX-LTD"),
///     "ownership",
/// ).with_strength(0.8);
///
/// assert_eq!(rel.kind(), "ownership");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityRelationship {
    source: EntityId,
    target: EntityId,
    /// Free-text relationship type (e.g. "ownership", "director", "shared-address").
    kind: String,
    /// Relationship strength in 0..=1.
    strength: f64,
}

impl EntityRelationship {
    pub fn new(source: EntityId, target: EntityId, kind: impl Into<String>) -> Self {
        Self {
            source,
            target,
            kind: kind.into(),
            strength: 1.0,
        }
    }

    /// Set the relationship strength, clamped to 0..=1.
    pub fn with_strength(mut self, strength: f64) -> Self {
        self.strength = strength.clamp(0.0, 1.0);
        self
    }

    // --- Accessors ---

    pub fn source(&self) -> &EntityId {
        &self.source
    }

    pub fn target(&self) -> &EntityId {
        &self.target
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn strength(&self) -> f64 {
        self.strength
    }
}

/// A snapshot collection of entity relationships.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelationshipSet {
    relationships: Vec<EntityRelationship>,
}

impl RelationshipSet {
    pub fn new() -> Self {
        Self {
            relationships: Vec::new(),
        }
    }

    pub fn add(&mut self, relationship: EntityRelationship) {
        self.relationships.push(relationship);
    }

    pub fn relationships(&self) -> &[EntityRelationship] {
        &self.relationships
    }

    pub fn len(&self) -> usize {
        self.relationships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relationships.is_empty()
    }

    /// All unique entity ids referenced as source or target.
    pub fn entities(&self) -> Vec<EntityId> {
        let mut entities: Vec<EntityId> = self
            .relationships
            .iter()
            .flat_map(|r| vec![r.source().clone(), r.target().clone()])
            .collect();
        entities.sort();
        entities.dedup();
        entities
    }
}

impl FromIterator<EntityRelationship> for RelationshipSet {
    fn from_iter<T: IntoIterator<Item = EntityRelationship>>(iter: T) -> Self {
        Self {
            relationships: iter.into_iter().collect(),
        }
    }
}
