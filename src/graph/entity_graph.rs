use crate::core::entity::EntityId;
use crate::core::relationship::{EntityRelationship, RelationshipSet};
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::Bfs;
use std::collections::{HashMap, HashSet};

/// An undirected graph of entity relationships.
///
/// Built once per analysis pass and shared read-only by the network
/// detectors. Edge weights carry the relationship strength; parallel
/// relationships between the same pair produce parallel edges.
#[derive(Debug, Default)]
pub struct EntityGraph {
    graph: UnGraph<EntityId, f64>,
    nodes: HashMap<EntityId, NodeIndex>,
}

impl EntityGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph from a relationship snapshot.
    pub fn from_relationships(relationships: &RelationshipSet) -> Self {
        let mut graph = Self::new();
        for rel in relationships.relationships() {
            graph.add_relationship(rel);
        }
        graph
    }

    /// Add a single relationship as an undirected edge.
    pub fn add_relationship(&mut self, relationship: &EntityRelationship) {
        let source = self.intern(relationship.source());
        let target = self.intern(relationship.target());
        self.graph.add_edge(source, target, relationship.strength());
    }

    fn intern(&mut self, entity: &EntityId) -> NodeIndex {
        if let Some(&index) = self.nodes.get(entity) {
            return index;
        }
        let index = self.graph.add_node(entity.clone());
        self.nodes.insert(entity.clone(), index);
        index
    }

    /// Number of unique entities in the graph.
    pub fn entity_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of relationship edges in the graph.
    pub fn relationship_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Undirected degree of an entity (0 if unknown).
    pub fn degree(&self, entity: &EntityId) -> usize {
        self.nodes
            .get(entity)
            .map(|&index| self.graph.edges(index).count())
            .unwrap_or(0)
    }

    /// Direct neighbors of an entity, sorted and deduplicated.
    pub fn neighbors(&self, entity: &EntityId) -> Vec<EntityId> {
        let Some(&index) = self.nodes.get(entity) else {
            return Vec::new();
        };
        let mut neighbors: Vec<EntityId> = self
            .graph
            .neighbors(index)
            .map(|n| self.graph[n].clone())
            .collect();
        neighbors.sort();
        neighbors.dedup();
        neighbors
    }

    /// Connected components via breadth-first traversal from each
    /// unvisited entity. Members within a component are sorted; the
    /// component list is ordered by its smallest member for determinism.
    pub fn components(&self) -> Vec<Vec<EntityId>> {
        let mut seen: HashSet<NodeIndex> = HashSet::new();
        let mut components = Vec::new();

        for start in self.graph.node_indices() {
            if seen.contains(&start) {
                continue;
            }
            let mut members = Vec::new();
            let mut bfs = Bfs::new(&self.graph, start);
            while let Some(node) = bfs.next(&self.graph) {
                seen.insert(node);
                members.push(self.graph[node].clone());
            }
            members.sort();
            components.push(members);
        }

        components.sort_by(|a, b| a.first().cmp(&b.first()));
        components
    }
}

/// Directed relationship tallies per entity.
///
/// Computed once over the whole relationship snapshot and shared by the
/// shell-company scorer, rather than recounted per call.
#[derive(Debug, Default)]
pub struct RelationshipCounts {
    outgoing: HashMap<EntityId, usize>,
    incoming: HashMap<EntityId, usize>,
}

impl RelationshipCounts {
    pub fn from_relationships(relationships: &RelationshipSet) -> Self {
        let mut outgoing: HashMap<EntityId, usize> = HashMap::new();
        let mut incoming: HashMap<EntityId, usize> = HashMap::new();
        for rel in relationships.relationships() {
            *outgoing.entry(rel.source().clone()).or_insert(0) += 1;
            *incoming.entry(rel.target().clone()).or_insert(0) += 1;
        }
        Self { outgoing, incoming }
    }

    /// Relationships where the entity is the source.
    pub fn outgoing(&self, entity: &EntityId) -> usize {
        self.outgoing.get(entity).copied().unwrap_or(0)
    }

    /// Relationships where the entity is the target.
    pub fn incoming(&self, entity: &EntityId) -> usize {
        self.incoming.get(entity).copied().unwrap_or(0)
    }

    /// Total relationship records touching the entity, either side.
    pub fn total(&self, entity: &EntityId) -> usize {
        self.outgoing(entity) + self.incoming(entity)
    }
}
