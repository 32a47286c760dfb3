//! # typology-engine
//!
//! Open AML typology-detection engine for transaction and entity
//! network analysis.
//!
//! Given an in-memory snapshot of financial transactions, entities, and
//! entity relationships, this engine flags sub-patterns indicative of
//! structuring, round-tripping, layering, shell-company behavior,
//! high-risk sub-networks, and network centrality.
//!
//! ## Architecture
//!
//! - **core** — Foundational types: transactions, entities, relationships
//! - **graph** — Transaction index, entity graph, relationship counts
//! - **detect** — The six typology detectors and the analysis entry point
//! - **simulation** — Random dataset generation for stress testing
//!
//! Data flows one direction: raw collections → shared read-only indices →
//! detectors → immutable result collections. Detectors never mutate shared
//! state and can run independently once the indices are built.

pub mod core;
pub mod detect;
pub mod graph;
pub mod simulation;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::core::entity::{Entity, EntityId, EntitySet, RiskLevel};
    pub use crate::core::relationship::{EntityRelationship, RelationshipSet};
    pub use crate::core::transaction::{Transaction, TransactionId, TransactionSet};
    pub use crate::detect::report::{
        AnalysisConfig, AnalysisEngine, AnalysisReport, DetectedPattern, Typology,
    };
    pub use crate::graph::entity_graph::EntityGraph;
    pub use crate::graph::transaction_index::TransactionIndex;
}
