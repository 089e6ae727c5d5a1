//! Invariants of composition and row statistics over generated groups.

use std::collections::BTreeSet;
use std::rc::Rc;

use proptest::prelude::*;
use rusty_spectra::data::config::OutputConfig;
use rusty_spectra::data::{Record, RecordStore};

/// Integer wavelengths keep the key sets exact.
fn record_strategy() -> impl Strategy<Value = (BTreeSet<i32>, Vec<f64>)> {
    prop::collection::btree_set(0i32..40, 1..25).prop_flat_map(|keys| {
        let n = keys.len();
        (Just(keys), prop::collection::vec(-1.0e3f64..1.0e3, n))
    })
}

fn build_store(specs: &[(BTreeSet<i32>, Vec<f64>)]) -> RecordStore {
    let records = specs
        .iter()
        .map(|(keys, values)| {
            let keys = keys.iter().map(|&k| f64::from(k)).collect();
            Record::from_columns(keys, values.clone()).unwrap().into_shared()
        })
        .collect();
    RecordStore::with_records(records, "prop", OutputConfig::default())
}

proptest! {
    #[test]
    fn composed_rows_are_the_key_intersection(specs in prop::collection::vec(record_strategy(), 1..6)) {
        let store = build_store(&specs);
        let composed = store.compose().unwrap();

        let mut common = specs[0].0.clone();
        for (keys, _) in &specs[1..] {
            common = common.intersection(keys).copied().collect();
        }

        prop_assert_eq!(composed.width(), specs.len());
        prop_assert_eq!(composed.len(), common.len());
        let got: BTreeSet<i32> = composed.keys().iter().map(|&k| k as i32).collect();
        prop_assert_eq!(got, common);
    }

    #[test]
    fn stats_rows_are_ordered(specs in prop::collection::vec(record_strategy(), 1..6)) {
        let store = build_store(&specs);
        let stats = store.stats().unwrap();
        prop_assert_eq!(stats.len(), store.compose().unwrap().len());
        for row in stats.rows() {
            prop_assert!(row.min <= row.mean && row.mean <= row.max);
            if specs.len() == 1 {
                prop_assert!(row.std.is_nan());
            } else {
                prop_assert!(row.std >= 0.0);
            }
        }
    }

    #[test]
    fn subgroups_leave_the_parent_cache_alone(specs in prop::collection::vec(record_strategy(), 2..6)) {
        let store = build_store(&specs);
        let subs = store.subgroup(&[vec![0], vec![1, 0]]).unwrap();
        for sub in &subs {
            sub.stats().unwrap();
        }
        prop_assert!(!store.is_composed());
        prop_assert!(!store.is_stats());
    }

    #[test]
    fn subgroups_keep_a_cached_parent_table(specs in prop::collection::vec(record_strategy(), 2..6)) {
        let store = build_store(&specs);
        let composed = store.compose().unwrap();
        let stats = store.stats().unwrap();

        let subs = store.subgroup(&[vec![0], vec![1, 0]]).unwrap();
        for sub in &subs {
            sub.compose().unwrap();
            sub.stats().unwrap();
        }

        prop_assert!(store.is_composed() && store.is_stats());
        prop_assert!(Rc::ptr_eq(&composed, &store.compose().unwrap()));
        prop_assert!(Rc::ptr_eq(&stats, &store.stats().unwrap()));
    }
}
