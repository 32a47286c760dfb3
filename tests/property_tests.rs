use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use typology_engine::core::entity::EntityId;
use typology_engine::core::transaction::{Transaction, TransactionId, TransactionSet};
use typology_engine::detect::layering::{detect_layering, LayeringConfig};
use typology_engine::detect::round_trip::{detect_round_trips, RoundTripConfig};
use typology_engine::detect::structuring::{detect_structuring, StructuringConfig};
use typology_engine::graph::transaction_index::TransactionIndex;

/// Random entity ids from a small pool (to increase cycle probability).
fn arb_entity() -> impl Strategy<Value = EntityId> {
    prop::sample::select(vec![
        EntityId::new("A"),
        EntityId::new("B"),
        EntityId::new("C"),
        EntityId::new("D"),
        EntityId::new("E"),
        EntityId::new("F"),
    ])
}

/// A random transaction within a few days of a fixed origin.
fn arb_transaction(index: usize) -> impl Strategy<Value = Transaction> {
    (arb_entity(), arb_entity(), 0i64..100_000i64, 0i64..96i64).prop_map(
        move |(source, destination, amount, offset_h)| {
            Transaction::new(
                TransactionId::new(format!("TX-{:04}", index)),
                source,
                destination,
                Decimal::from(amount),
                Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap() + Duration::hours(offset_h),
            )
        },
    )
}

fn arb_transaction_set(count: usize) -> impl Strategy<Value = Vec<Transaction>> {
    (0..count).map(arb_transaction).collect::<Vec<_>>()
}

proptest! {
    /// Re-running structuring on the same input yields the same flagged
    /// set, independent of input ordering.
    #[test]
    fn structuring_is_order_independent(txs in arb_transaction_set(30), seed in any::<u64>()) {
        let config = StructuringConfig::default();

        let forward: TransactionSet = txs.iter().cloned().collect();
        let index = TransactionIndex::build(&forward);
        let baseline = detect_structuring(&index, &config).unwrap();

        let mut shuffled = txs.clone();
        // Deterministic pseudo-shuffle driven by the seed.
        let n = shuffled.len();
        if n > 1 {
            for i in 0..n {
                let j = (seed as usize).wrapping_mul(31).wrapping_add(i * 17) % n;
                shuffled.swap(i, j);
            }
        }
        let reordered: TransactionSet = shuffled.into_iter().collect();
        let index = TransactionIndex::build(&reordered);
        let rerun = detect_structuring(&index, &config).unwrap();

        prop_assert_eq!(baseline.flagged, rerun.flagged);
    }

    /// Flagged structuring ids are unique and refer to input transactions.
    #[test]
    fn structuring_flags_are_deduplicated(txs in arb_transaction_set(30)) {
        let set: TransactionSet = txs.iter().cloned().collect();
        let index = TransactionIndex::build(&set);
        let report = detect_structuring(&index, &StructuringConfig::default()).unwrap();

        let mut unique = report.flagged.clone();
        unique.dedup();
        prop_assert_eq!(unique.len(), report.flagged.len());
        for id in &report.flagged {
            prop_assert!(txs.iter().any(|tx| tx.id() == id));
        }
    }

    /// Round-trip detection terminates and stays deduplicated on
    /// arbitrary (dense) graphs; hard M/W bounds, not advisory ones.
    #[test]
    fn round_trip_terminates_and_deduplicates(txs in arb_transaction_set(40)) {
        let set: TransactionSet = txs.iter().cloned().collect();
        let index = TransactionIndex::build(&set);
        let report = detect_round_trips(&index, &RoundTripConfig::default()).unwrap();

        let mut unique = report.flagged.clone();
        unique.dedup();
        prop_assert_eq!(unique.len(), report.flagged.len());
        prop_assert!(report.flagged.len() <= set.len());
    }

    /// Every layering chain member is an input transaction and no id is
    /// reported twice.
    #[test]
    fn layering_flags_are_deduplicated(txs in arb_transaction_set(30)) {
        let set: TransactionSet = txs.iter().cloned().collect();
        let index = TransactionIndex::build(&set);
        let report = detect_layering(&index, &LayeringConfig::default()).unwrap();

        let mut unique = report.flagged.clone();
        unique.dedup();
        prop_assert_eq!(unique.len(), report.flagged.len());
        prop_assert!(report.flagged.len() <= set.len());
    }
}
