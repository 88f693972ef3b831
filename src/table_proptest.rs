#![cfg(test)]

// Property tests for RobinTable kept inside the crate so they can check the
// physical layout invariants (PSL correctness, Robin Hood ordering) that the
// public surface deliberately hides.

use crate::hash::{FnStrategy, HashStrategy};
use crate::table::{RobinTable, MIN_BUCKETS};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::collections::HashMap;

// Pool-indexed operations to improve shrinking: indices shrink to earlier
// keys, pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Put(usize, u64),
    Get(usize),
    Del(usize),
    Iterate,
    Clear(bool),
    Stats,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<Vec<u8>>, Vec<OpI>)> {
    proptest::collection::vec(proptest::collection::vec(any::<u8>(), 1..=12), 1..=8).prop_flat_map(
        |pool| {
            let idxs: Vec<usize> = (0..pool.len()).collect();
            let idx = proptest::sample::select(idxs);
            let op = prop_oneof![
                (idx.clone(), any::<u64>()).prop_map(|(i, v)| OpI::Put(i, v)),
                idx.clone().prop_map(OpI::Get),
                idx.clone().prop_map(OpI::Del),
                Just(OpI::Iterate),
                any::<bool>().prop_map(OpI::Clear),
                Just(OpI::Stats),
            ];
            proptest::collection::vec(op, 1..60).prop_map(move |ops| (pool.clone(), ops))
        },
    )
}

// Physical-layout invariants, checked against the raw bucket array:
// - bucket count is a power of two, at least MIN_BUCKETS;
// - every occupied slot's stored PSL equals its actual displacement from the
//   ideal index of its cached hash;
// - Robin Hood ordering: an entry with psl > 0 has an occupied predecessor
//   with psl >= its own psl - 1 (runs are contiguous and never get poorer by
//   more than one step);
// - the entry count equals the number of occupied slots.
fn check_layout<H: HashStrategy>(t: &RobinTable<'_, u64, H>) {
    let n = t.bucket_count();
    assert!(n.is_power_of_two());
    assert!(n >= MIN_BUCKETS);

    let mask = n - 1;
    let mut occupied = 0;
    for (i, slot) in t.buckets.iter().enumerate() {
        if let Some(b) = slot {
            occupied += 1;
            let ideal = (b.hash as usize) & mask;
            assert_eq!(b.psl, i.wrapping_sub(ideal) & mask, "stale PSL at {i}");
            if b.psl > 0 {
                let prev = t.buckets[(i + mask) & mask]
                    .as_ref()
                    .expect("probe run must be contiguous");
                assert!(prev.psl + 1 >= b.psl, "Robin Hood order broken at {i}");
            }
        }
    }
    assert_eq!(occupied, t.len());
}

fn run_state_machine<'k, H: HashStrategy>(
    mut sut: RobinTable<'k, u64, H>,
    pool: &'k [Vec<u8>],
    ops: Vec<OpI>,
) -> Result<(), TestCaseError> {
    let mut model: HashMap<&[u8], u64> = HashMap::new();

    for op in ops {
        match op {
            OpI::Put(i, v) => {
                let k: &[u8] = &pool[i];
                // First writer wins: the model only takes v for a fresh key.
                let expected = *model.entry(k).or_insert(v);
                let got = sut.put(k, v).expect("growth allocation");
                prop_assert_eq!(*got, expected);
            }
            OpI::Get(i) => {
                let k: &[u8] = &pool[i];
                prop_assert_eq!(sut.get(k).copied(), model.get(k).copied());
            }
            OpI::Del(i) => {
                let k: &[u8] = &pool[i];
                prop_assert_eq!(sut.del(k), model.remove(k));
            }
            OpI::Iterate => {
                let mut seen: Vec<(&[u8], u64)> = sut.iter().map(|(k, &v)| (k, v)).collect();
                let mut want: Vec<(&[u8], u64)> = model.iter().map(|(&k, &v)| (k, v)).collect();
                seen.sort();
                want.sort();
                prop_assert_eq!(seen, want);
            }
            OpI::Clear(shrink) => {
                sut.clear(shrink).expect("clear allocation");
                model.clear();
            }
            OpI::Stats => {
                if !sut.is_empty() {
                    let max = sut.psl_max();
                    prop_assert!(sut.psl_mean() <= max as f64);
                    prop_assert!(sut.psl_variance() >= 0.0);
                }
            }
        }

        // Post-conditions after each op
        prop_assert_eq!(sut.len(), model.len());
        check_layout(&sut);
    }
    Ok(())
}

// Property: state-machine equivalence against std::collections::HashMap,
// with the duplicate-key policy folded into the model (put on a present key
// leaves the model unchanged and must return the resident value). Layout
// invariants are re-checked after every operation, so Robin Hood stealing,
// backward-shift deletion, and both resize directions all run under scrutiny.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        let sut: RobinTable<u64> = RobinTable::with_capacity(0).unwrap();
        run_state_machine(sut, &pool, ops)?;
    }
}

// Property: the same invariants hold under worst-case collisions (a constant
// strategy sends every key to the same ideal bucket), which maximizes PSLs
// and stresses displacement, early termination, and backward shifting.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        let sut = RobinTable::with_strategy(0, FnStrategy(|_: &[u8], _: u64| 0u64), 0).unwrap();
        run_state_machine(sut, &pool, ops)?;
    }
}

// Property: a put sequence followed by deleting everything always returns the
// table to empty with an intact layout, regardless of deletion order.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_drain_returns_to_empty(
        keys in proptest::collection::hash_set(proptest::collection::vec(any::<u8>(), 1..=12), 1..100),
        reverse in any::<bool>(),
    ) {
        let keys: Vec<Vec<u8>> = keys.into_iter().collect();
        let mut t: RobinTable<u64> = RobinTable::with_capacity(0).unwrap();
        for (i, k) in keys.iter().enumerate() {
            t.put(k, i as u64).unwrap();
        }
        prop_assert_eq!(t.len(), keys.len());
        check_layout(&t);

        let order: Vec<usize> = if reverse {
            (0..keys.len()).rev().collect()
        } else {
            (0..keys.len()).collect()
        };
        for i in order {
            prop_assert_eq!(t.del(&keys[i]), Some(i as u64));
            check_layout(&t);
        }
        prop_assert!(t.is_empty());
        prop_assert_eq!(t.bucket_count(), MIN_BUCKETS);
    }
}
