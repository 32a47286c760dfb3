//! End-to-end analysis of a small hand-built laundering scenario.
//!
//! ```bash
//! cargo run --example basic_analysis
//! ```

use chrono::{Duration, Utc};
use rust_decimal_macros::dec;
use typology_engine::core::entity::{Entity, EntityId, EntitySet, RiskLevel};
use typology_engine::core::relationship::{EntityRelationship, RelationshipSet};
use typology_engine::core::transaction::{Transaction, TransactionId, TransactionSet};
use typology_engine::detect::report::{AnalysisConfig, AnalysisEngine};

fn main() {
    let now = Utc::now();

    let mut transactions = TransactionSet::new();
    // Structured deposits just under the 10,000 reporting threshold.
    transactions.add(Transaction::new(
        TransactionId::new("DEP-1"),
        EntityId::new("COURIER-1"),
        EntityId::new("FRONT-CO"),
        dec!(9400),
        now,
    ));
    transactions.add(Transaction::new(
        TransactionId::new("DEP-2"),
        EntityId::new("COURIER-2"),
        EntityId::new("FRONT-CO"),
        dec!(9700),
        now + Duration::hours(8),
    ));
    // Funds routed out and back.
    transactions.add(Transaction::new(
        TransactionId::new("OUT-1"),
        EntityId::new("FRONT-CO"),
        EntityId::new("OFFSHORE-1"),
        dec!(18000),
        now + Duration::hours(20),
    ));
    transactions.add(Transaction::new(
        TransactionId::new("RET-1"),
        EntityId::new("OFFSHORE-1"),
        EntityId::new("FRONT-CO"),
        dec!(18000),
        now + Duration::hours(44),
    ));

    let mut entities = EntitySet::new();
    entities.add(
        Entity::new(
            EntityId::new("FRONT-CO"),
            "Front Company",
            "KY",
            now - Duration::days(45),
        )
        .with_kind("corporation")
        .with_risk(RiskLevel::High, 78.0),
    );
    entities.add(
        Entity::new(
            EntityId::new("OFFSHORE-1"),
            "Offshore Nominee",
            "VG",
            now - Duration::days(100),
        )
        .with_risk(RiskLevel::Critical, 85.0),
    );
    entities.add(Entity::new(
        EntityId::new("INTERMEDIARY"),
        "Intermediary Ltd",
        "CY",
        now - Duration::days(200),
    ));

    let mut relationships = RelationshipSet::new();
    relationships.add(EntityRelationship::new(
        EntityId::new("FRONT-CO"),
        EntityId::new("OFFSHORE-1"),
        "ownership",
    ));
    relationships.add(EntityRelationship::new(
        EntityId::new("OFFSHORE-1"),
        EntityId::new("INTERMEDIARY"),
        "director",
    ));
    relationships.add(EntityRelationship::new(
        EntityId::new("INTERMEDIARY"),
        EntityId::new("FRONT-CO"),
        "shared-address",
    ));

    let report = AnalysisEngine::analyze(
        &transactions,
        &entities,
        &relationships,
        &AnalysisConfig::default(),
    )
    .expect("default configuration is valid");

    println!("{}", report);
}
