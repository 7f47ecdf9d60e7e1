// Eigenschaften der CPU-Referenz über zufällige Schlüssel/Wert-Folgen.

use hpc_testbed::suite::check_segment_folds;
use hpc_testbed::udd::{UddtI2, add_i2};
use hpc_testbed::{
    Outcome, exclusive_scan_by_key, inclusive_scan_by_key, segments, staircase_keys,
};
use proptest::prelude::*;

// wenige Schlüsselwerte, damit lange Segmente entstehen
fn keyed(max_len: usize) -> impl Strategy<Value = (Vec<u8>, Vec<i64>)> {
    (0..max_len).prop_flat_map(|n| {
        (
            prop::collection::vec(0u8..4, n),
            prop::collection::vec(-1000i64..1000, n),
        )
    })
}

proptest! {
    #[test]
    fn output_length_equals_input((keys, vals) in keyed(200)) {
        let out = inclusive_scan_by_key(&keys, &vals, |a, b| a == b, |a, b| a + b).unwrap();
        prop_assert_eq!(out.len(), vals.len());
    }

    #[test]
    fn segment_start_and_fold((keys, vals) in keyed(200)) {
        let out = inclusive_scan_by_key(&keys, &vals, |a, b| a == b, |a, b| a + b).unwrap();
        let o = check_segment_folds(&keys, &vals, &out, |a, b| a == b, |a, b| a + b);
        prop_assert_eq!(o, Outcome::Passed);
    }

    #[test]
    fn segments_partition_the_input((keys, _vals) in keyed(200)) {
        let runs = segments(&keys, |a, b| a == b);
        let mut next = 0;
        for r in &runs {
            prop_assert_eq!(r.start, next);
            prop_assert!(r.end > r.start);
            // innerhalb gleich, an der Grenze verschieden
            prop_assert!(keys[r.clone()].iter().all(|k| *k == keys[r.start]));
            if r.end < keys.len() {
                prop_assert_ne!(keys[r.end], keys[r.end - 1]);
            }
            next = r.end;
        }
        prop_assert_eq!(next, keys.len());
    }

    #[test]
    fn exclusive_shifted_from_inclusive((keys, vals) in keyed(200)) {
        let inc = inclusive_scan_by_key(&keys, &vals, |a, b| a == b, |a, b| a + b).unwrap();
        let exc = exclusive_scan_by_key(&keys, &vals, 0, |a, b| a == b, |a, b| a + b).unwrap();
        // bei Addition: inklusiv = exklusiv + aktueller Wert
        for i in 0..vals.len() {
            prop_assert_eq!(inc[i], exc[i] + vals[i]);
        }
    }

    #[test]
    fn single_key_is_prefix_sum(vals in prop::collection::vec(-50i64..50, 0..100)) {
        let keys = vec![0u8; vals.len()];
        let out = inclusive_scan_by_key(&keys, &vals, |a, b| a == b, |a, b| a + b).unwrap();
        let mut acc = 0;
        for (o, v) in out.iter().zip(&vals) {
            acc += v;
            prop_assert_eq!(*o, acc);
        }
    }
}

#[test]
fn staircase_with_udd_values() {
    let keys = staircase_keys(6, 1, |k| k + 1);
    let vals = vec![UddtI2::INITIAL_ADD; 6];
    let out = inclusive_scan_by_key(&keys, &vals, |a, b| a == b, add_i2).unwrap();
    let a: Vec<i32> = out.iter().map(|v| v.a).collect();
    let b: Vec<i32> = out.iter().map(|v| v.b).collect();
    assert_eq!(a, vec![-1, -1, -2, -1, -2, -3]);
    assert_eq!(b, vec![2, 2, 4, 2, 4, 6]);
}
