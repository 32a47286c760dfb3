use chrono::{Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use typology_engine::core::entity::{Entity, EntityId, EntitySet, RiskLevel};
use typology_engine::core::relationship::{EntityRelationship, RelationshipSet};
use typology_engine::core::transaction::{Transaction, TransactionId, TransactionSet};
use typology_engine::detect::layering::{detect_layering, LayeringConfig};
use typology_engine::detect::report::{AnalysisConfig, AnalysisEngine};
use typology_engine::detect::round_trip::{detect_round_trips, RoundTripConfig};
use typology_engine::detect::structuring::{detect_structuring, StructuringConfig};
use typology_engine::graph::transaction_index::TransactionIndex;

fn t0() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap()
}

fn tx(id: &str, from: &str, to: &str, amount: Decimal, offset_h: i64) -> Transaction {
    Transaction::new(
        TransactionId::new(id),
        EntityId::new(from),
        EntityId::new(to),
        amount,
        t0() + Duration::hours(offset_h),
    )
}

/// Full pipeline: a laundering network exercising every detector at once.
#[test]
fn full_pipeline_laundering_scenario() {
    let mut transactions = TransactionSet::new();

    // Structuring: three sub-threshold deposits into FRONT-CO within 48h.
    transactions.add(tx("S1", "CASH-1", "FRONT-CO", dec!(9500), 0));
    transactions.add(tx("S2", "CASH-2", "FRONT-CO", dec!(9200), 6));
    transactions.add(tx("S3", "CASH-3", "FRONT-CO", dec!(9800), 12));

    // Round-trip: FRONT-CO -> PASSTHRU -> FRONT-CO within a day.
    transactions.add(tx("R1", "FRONT-CO", "PASSTHRU", dec!(15000), 24));
    transactions.add(tx("R2", "PASSTHRU", "FRONT-CO", dec!(15000), 30));

    // Layering: near-constant amounts hopping L1 -> L2 -> L3 -> L4.
    transactions.add(tx("L1", "LAYER-1", "LAYER-2", dec!(10000), 0));
    transactions.add(tx("L2", "LAYER-2", "LAYER-3", dec!(9800), 1));
    transactions.add(tx("L3", "LAYER-3", "LAYER-4", dec!(10100), 2));

    // Noise: large legitimate transfer, unrelated parties.
    transactions.add(tx("N1", "MEGACORP", "SUPPLIER", dec!(250000), 5));

    let mut entities = EntitySet::new();
    entities.add(
        Entity::new(
            EntityId::new("FRONT-CO"),
            "Front Company",
            "KY",
            t0() - Duration::days(60),
        )
        .with_kind("corporation")
        .with_risk(RiskLevel::High, 75.0),
    );
    entities.add(
        Entity::new(
            EntityId::new("PASSTHRU"),
            "Passthrough Ltd",
            "VG",
            t0() - Duration::days(90),
        )
        .with_risk(RiskLevel::Critical, 88.0),
    );
    entities.add(
        Entity::new(
            EntityId::new("HOLDCO"),
            "Holding Co",
            "PA",
            t0() - Duration::days(120),
        )
        .with_risk(RiskLevel::High, 70.0),
    );
    entities.add(Entity::new(
        EntityId::new("MEGACORP"),
        "Megacorp",
        "US",
        t0() - Duration::days(5000),
    ));
    entities.add(Entity::new(
        EntityId::new("SUPPLIER"),
        "Supplier Inc",
        "DE",
        t0() - Duration::days(4000),
    ));

    let mut relationships = RelationshipSet::new();
    // FRONT-CO, PASSTHRU, HOLDCO form one suspicious triangle.
    relationships.add(EntityRelationship::new(
        EntityId::new("FRONT-CO"),
        EntityId::new("PASSTHRU"),
        "ownership",
    ));
    relationships.add(EntityRelationship::new(
        EntityId::new("PASSTHRU"),
        EntityId::new("HOLDCO"),
        "director",
    ));
    relationships.add(EntityRelationship::new(
        EntityId::new("HOLDCO"),
        EntityId::new("FRONT-CO"),
        "ownership",
    ));
    // HOLDCO fans out to satisfy the asymmetry heuristic.
    for i in 0..4 {
        relationships.add(EntityRelationship::new(
            EntityId::new("HOLDCO"),
            EntityId::new(format!("SUB-{}", i)),
            "ownership",
        ));
    }
    // MEGACORP-SUPPLIER pair: too small to be a network.
    relationships.add(EntityRelationship::new(
        EntityId::new("MEGACORP"),
        EntityId::new("SUPPLIER"),
        "supplier",
    ));

    let config = AnalysisConfig {
        as_of: Some(t0()),
        ..Default::default()
    };
    let report =
        AnalysisEngine::analyze(&transactions, &entities, &relationships, &config).unwrap();

    // Structuring flags exactly the three clustered deposits.
    assert_eq!(
        report.structuring.flagged,
        vec![
            TransactionId::new("S1"),
            TransactionId::new("S2"),
            TransactionId::new("S3"),
        ]
    );

    // Round-trip flags both legs, once each.
    assert_eq!(
        report.round_trips.flagged,
        vec![TransactionId::new("R1"), TransactionId::new("R2")]
    );
    assert_eq!(report.round_trips.cycles.len(), 1);

    // Layering flags the three-hop chain.
    assert_eq!(
        report.layering.flagged,
        vec![
            TransactionId::new("L1"),
            TransactionId::new("L2"),
            TransactionId::new("L3"),
        ]
    );

    // Shell companies: offshore, recent, elevated entities classified.
    let shell_ids: Vec<&str> = report
        .shell_companies
        .iter()
        .map(|f| f.entity_id.as_str())
        .collect();
    assert!(shell_ids.contains(&"FRONT-CO"));
    assert!(shell_ids.contains(&"PASSTHRU"));
    assert!(!shell_ids.contains(&"MEGACORP"));

    // One risk network: the triangle plus HOLDCO's subsidiaries.
    // The MEGACORP-SUPPLIER pair is below the size floor.
    assert_eq!(report.risk_networks.len(), 1);
    assert!(report.risk_networks[0].len() >= 3);
    assert!(report.risk_networks[0].network_risk > 0.0);

    // HOLDCO touches the most relationship records.
    assert_eq!(report.centrality[0].entity_id, EntityId::new("HOLDCO"));
    assert_eq!(report.centrality[0].connections, 6);

    // Report serializes.
    let json = serde_json::to_string_pretty(&report).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert!(parsed.get("shell_companies").is_some());
}

/// A single below-threshold transaction with no neighbor is never flagged.
#[test]
fn structuring_lone_transaction_never_flagged() {
    let mut set = TransactionSet::new();
    set.add(tx("T1", "A", "ACCT", dec!(9999), 0));
    let index = TransactionIndex::build(&set);
    let report = detect_structuring(&index, &StructuringConfig::default()).unwrap();
    assert!(report.is_empty());
}

/// Round-trip window boundary: A->B at t=0, B->A at t=+1h.
#[test]
fn round_trip_window_boundary() {
    let mut set = TransactionSet::new();
    set.add(tx("T1", "A", "B", dec!(5000), 0));
    set.add(tx("T2", "B", "A", dec!(5000), 1));
    let index = TransactionIndex::build(&set);

    let generous = RoundTripConfig {
        max_chain_length: 2,
        window: Duration::hours(1),
    };
    let report = detect_round_trips(&index, &generous).unwrap();
    assert_eq!(report.flagged.len(), 2);

    let tight = RoundTripConfig {
        max_chain_length: 2,
        window: Duration::minutes(59),
    };
    let report = detect_round_trips(&index, &tight).unwrap();
    assert!(report.is_empty());
}

/// Layering minimum-length boundary.
#[test]
fn layering_minimum_length_boundary() {
    let mut set = TransactionSet::new();
    set.add(tx("T1", "A", "B", dec!(10000), 0));
    set.add(tx("T2", "B", "C", dec!(9800), 1));
    set.add(tx("T3", "C", "D", dec!(10100), 2));
    let index = TransactionIndex::build(&set);

    let report = detect_layering(&index, &LayeringConfig::default()).unwrap();
    assert_eq!(report.flagged.len(), 3);

    let strict = LayeringConfig {
        min_chain_length: 5,
        ..Default::default()
    };
    let report = detect_layering(&index, &strict).unwrap();
    assert!(report.is_empty());
}

/// Malformed transactions are excluded without affecting the rest.
#[test]
fn malformed_records_skipped_silently() {
    let mut set = TransactionSet::new();
    set.add(tx("T1", "A", "B", dec!(5000), 0));
    set.add(tx("T2", "B", "A", dec!(5000), 1));
    set.add(tx("BAD", "A", "B", dec!(-1), 0));

    let report = AnalysisEngine::analyze(
        &set,
        &EntitySet::new(),
        &RelationshipSet::new(),
        &AnalysisConfig::default(),
    )
    .unwrap();
    assert_eq!(report.round_trips.flagged.len(), 2);
    assert!(!report
        .round_trips
        .flagged
        .contains(&TransactionId::new("BAD")));
}

/// Empty input yields an empty report from every detector.
#[test]
fn empty_input_yields_empty_report() {
    let report = AnalysisEngine::analyze(
        &TransactionSet::new(),
        &EntitySet::new(),
        &RelationshipSet::new(),
        &AnalysisConfig::default(),
    )
    .unwrap();
    assert!(report.is_empty());
    assert_eq!(report.finding_count(), 0);
}
