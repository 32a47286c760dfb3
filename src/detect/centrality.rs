use crate::core::entity::{EntityId, EntitySet};
use crate::core::relationship::RelationshipSet;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An entity ranked by relationship-degree centrality.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CentralityScore {
    pub entity_id: EntityId,
    /// Raw relationship-record count, both sides, no normalization.
    pub connections: usize,
}

/// Rank entities by how many relationship records touch them.
///
/// Centrality here is the raw connection count: every relationship
/// increments both its source's and its target's counter. This is a
/// deliberately simple placeholder measure; callers needing eigenvector
/// or betweenness centrality substitute a different ranker with the
/// same ranked entity-plus-score contract.
pub fn rank_by_centrality(
    entities: &EntitySet,
    relationships: &RelationshipSet,
) -> Vec<CentralityScore> {
    let mut connections: HashMap<&EntityId, usize> = HashMap::new();
    for rel in relationships.relationships() {
        *connections.entry(rel.source()).or_insert(0) += 1;
        *connections.entry(rel.target()).or_insert(0) += 1;
    }

    let mut ranking: Vec<CentralityScore> = entities
        .entities()
        .iter()
        .map(|entity| CentralityScore {
            entity_id: entity.id().clone(),
            connections: connections.get(entity.id()).copied().unwrap_or(0),
        })
        .collect();

    ranking.sort_by(|a, b| {
        b.connections
            .cmp(&a.connections)
            .then_with(|| a.entity_id.cmp(&b.entity_id))
    });
    ranking
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entity::Entity;
    use crate::core::relationship::EntityRelationship;
    use chrono::Utc;

    fn rel(from: &str, to: &str) -> EntityRelationship {
        EntityRelationship::new(EntityId::new(from), EntityId::new(to), "ownership")
    }

    fn entity(id: &str) -> Entity {
        Entity::new(EntityId::new(id), id, "US", Utc::now())
    }

    #[test]
    fn test_hub_ranks_above_leaf() {
        let mut entities = EntitySet::new();
        for id in ["HUB", "A", "B", "C", "D"] {
            entities.add(entity(id));
        }
        let mut rels = RelationshipSet::new();
        rels.add(rel("HUB", "A"));
        rels.add(rel("HUB", "B"));
        rels.add(rel("C", "HUB"));
        rels.add(rel("D", "HUB"));

        let ranking = rank_by_centrality(&entities, &rels);
        assert_eq!(ranking[0].entity_id, EntityId::new("HUB"));
        assert_eq!(ranking[0].connections, 4);
        assert_eq!(ranking[1].connections, 1);
    }

    #[test]
    fn test_unrelated_entity_scores_zero() {
        let mut entities = EntitySet::new();
        entities.add(entity("A"));
        entities.add(entity("LONER"));
        let mut rels = RelationshipSet::new();
        rels.add(rel("A", "B"));

        let ranking = rank_by_centrality(&entities, &rels);
        assert_eq!(ranking.len(), 2);
        assert_eq!(ranking[1].entity_id, EntityId::new("LONER"));
        assert_eq!(ranking[1].connections, 0);
    }

    #[test]
    fn test_ties_broken_by_id() {
        let mut entities = EntitySet::new();
        entities.add(entity("B"));
        entities.add(entity("A"));
        let mut rels = RelationshipSet::new();
        rels.add(rel("A", "B"));

        let ranking = rank_by_centrality(&entities, &rels);
        assert_eq!(ranking[0].entity_id, EntityId::new("A"));
        assert_eq!(ranking[1].entity_id, EntityId::new("B"));
    }

    #[test]
    fn test_empty_inputs() {
        let ranking = rank_by_centrality(&EntitySet::new(), &RelationshipSet::new());
        assert!(ranking.is_empty());
    }
}
