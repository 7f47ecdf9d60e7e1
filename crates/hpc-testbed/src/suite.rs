//! Die registrierten Scan-by-Key-Testfälle.
//!
//! `register_reference` prüft die CPU-Referenz selbst (läuft ohne Gerät),
//! `register_device` vergleicht Geräteergebnisse gegen die Referenz.

use std::fmt::Debug;

use crate::approx::ApproxEq;
use crate::compare::compare_slices;
use crate::runner::{Outcome, Runner, selects};
use crate::scan::{exclusive_scan_by_key, inclusive_scan_by_key, segments, staircase_keys};
use crate::udd::{UddtM2, UddtM3, m2_equal_to, mix_m3};
use crate::ClError;

/// Prüft die Scan-Eigenschaften eines Ergebnisses `out`:
/// gleiche Länge, Segmentanfang = Eingabe, Segmentende = Linksfaltung.
pub fn check_segment_folds<K, V, E, F>(
    keys: &[K],
    values: &[V],
    out: &[V],
    mut eq: E,
    mut op: F,
) -> Outcome
where
    V: ApproxEq + Clone + Debug,
    E: FnMut(&K, &K) -> bool,
    F: FnMut(&V, &V) -> V,
{
    if out.len() != values.len() {
        return Outcome::Failed(format!(
            "length mismatch: expected {}, actual {}",
            values.len(),
            out.len()
        ));
    }
    for run in segments(keys, &mut eq) {
        let first = run.start;
        if !out[first].approx_eq(&values[first]) {
            return Outcome::Failed(format!(
                "segment start: expected {:?}, actual {:?}. Where i = {first}",
                values[first], out[first]
            ));
        }
        let mut fold = values[first].clone();
        for v in &values[first + 1..run.end] {
            fold = op(&fold, v);
        }
        let last = run.end - 1;
        if !out[last].approx_eq(&fold) {
            return Outcome::Failed(format!(
                "segment fold: expected {:?}, actual {:?}. Where i = {last}",
                fold, out[last]
            ));
        }
    }
    Outcome::Passed
}

fn outcome_of(r: Result<Outcome, ClError>) -> Outcome {
    r.unwrap_or_else(|e| Outcome::Failed(e.to_string()))
}

/// Staircase-Schlüssel vom Typ `UddtM2`, beginnend beim ersten Schritt.
pub fn m2_staircase(len: usize) -> Vec<UddtM2> {
    staircase_keys(len, UddtM2::IDENTITY_MIX.next(), UddtM2::next)
}

fn staircase_add() -> Result<Outcome, ClError> {
    let keys = [1, 2, 2, 3, 3, 3];
    let out = inclusive_scan_by_key(&keys, &[1; 6], |a, b| a == b, |a, b| a + b)?;
    Ok(compare_slices(&[1, 1, 2, 1, 2, 3], &out).into_outcome())
}

fn exclusive_staircase_add() -> Result<Outcome, ClError> {
    let keys = [1, 2, 2, 3, 3, 3];
    let out = exclusive_scan_by_key(&keys, &[1; 6], 0, |a, b| a == b, |a, b| a + b)?;
    Ok(compare_slices(&[0, 0, 1, 0, 1, 2], &out).into_outcome())
}

fn segment_folds_i64() -> Result<Outcome, ClError> {
    let keys = staircase_keys(1 << 10, 0_i32, |k| k + 1);
    let vals: Vec<i64> = (0..keys.len() as i64).map(|i| i * 7 - 300).collect();
    let out = inclusive_scan_by_key(&keys, &vals, |a, b| a == b, |a, b| a + b)?;
    Ok(check_segment_folds(&keys, &vals, &out, |a, b| a == b, |a, b| a + b))
}

fn mixed_m3() -> Result<Outcome, ClError> {
    let keys = m2_staircase(1 << 4);
    let vals = vec![UddtM3::INITIAL_MIX; keys.len()];
    let out = inclusive_scan_by_key(&keys, &vals, m2_equal_to, mix_m3)?;
    Ok(check_segment_folds(&keys, &vals, &out, m2_equal_to, mix_m3))
}

/// `i % 5 - 2` als `i32`-Werte; Längen über `i32::MAX` sind nicht darstellbar.
pub fn int_ramp(len: usize) -> Result<Vec<i32>, ClError> {
    let n = i32::try_from(len).map_err(|_| ClError::InvalidSize(len))?;
    Ok((0..n).map(|i| i % 5 - 2).collect())
}

/// Namen der Gerätefälle, registriert erst mit vorhandenem `ClEnv`.
pub const DEVICE_CASES: [&str; 5] = [
    "InclusiveScanByKey.IntAdd",
    "InclusiveScanByKey.FloatAdd",
    "InclusiveScanByKey.IncAddI2",
    "InclusiveScanByKey.IncMultD4",
    "InclusiveScanByKey.IncMixedM3",
];

/// Für `--list`: registrierte Fälle plus Gerätefälle, nach `filter` gefiltert.
/// Braucht kein OpenCL-Gerät.
pub fn listing<'a>(runner: &'a Runner, filter: Option<&str>) -> Vec<&'a str> {
    let mut names = runner.matching(filter);
    for name in DEVICE_CASES {
        if selects(name, filter) && !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

pub fn register_reference(runner: &mut Runner) {
    runner.add("ScanByKeyReference.Staircase", || outcome_of(staircase_add()));
    runner.add("ScanByKeyReference.ExclusiveStaircase", || {
        outcome_of(exclusive_staircase_add())
    });
    runner.add("ScanByKeyReference.SegmentFolds", || outcome_of(segment_folds_i64()));
    runner.add("ScanByKeyReference.MixedM3", || outcome_of(mixed_m3()));
}

#[cfg(feature = "opencl")]
pub use device::register_device;

#[cfg(feature = "opencl")]
mod device {
    use std::fmt::Debug;
    use std::rc::Rc;

    use bytemuck::Pod;

    use super::{DEVICE_CASES, int_ramp, m2_staircase, outcome_of};
    use crate::approx::ApproxEq;
    use crate::compare::compare_slices;
    use crate::device_scan::{DeviceScan, ScanProgram};
    use crate::platform::ClEnv;
    use crate::runner::{Outcome, Runner};
    use crate::scan::{inclusive_scan_by_key, staircase_keys};
    use crate::udd::{UddtD4, UddtI2, UddtM3, add_i2, m2_equal_to, mix_m3, mult_d4};
    use crate::ClError;

    /// Gerät gegen Referenz für ein Schlüssel/Wert-Paar
    fn device_vs_reference<K, V, E, F>(
        env: &Rc<ClEnv>,
        program: ScanProgram,
        keys: &[K],
        values: &[V],
        eq: E,
        op: F,
    ) -> Result<Outcome, ClError>
    where
        K: Pod,
        V: Pod + ApproxEq + Debug,
        E: FnMut(&K, &K) -> bool,
        F: FnMut(&V, &V) -> V,
    {
        if program.needs_fp64 && !env.supports_fp64() {
            return Ok(Outcome::Skipped("device has no cl_khr_fp64".into()));
        }
        let scan = DeviceScan::new(Rc::clone(env), program)?;
        let actual = scan.inclusive_scan_by_key(keys, values)?;
        let expected = inclusive_scan_by_key(keys, values, eq, op)?;
        Ok(compare_slices(&expected, &actual).into_outcome())
    }

    fn int_keys(len: usize) -> Vec<i32> {
        staircase_keys(len, 1, |k| k + 1)
    }

    pub fn register_device(runner: &mut Runner, env: Rc<ClEnv>, len: usize) {
        let e = Rc::clone(&env);
        runner.add(DEVICE_CASES[0], move || {
            let keys = int_keys(len);
            let vals = match int_ramp(len) {
                Ok(v) => v,
                Err(e) => return Outcome::Failed(format!("--length {len}: {e}")),
            };
            outcome_of(device_vs_reference(
                &e,
                ScanProgram::I32_ADD,
                &keys,
                &vals,
                |a, b| a == b,
                |a, b| a.wrapping_add(*b),
            ))
        });

        let e = Rc::clone(&env);
        runner.add(DEVICE_CASES[1], move || {
            let keys = int_keys(len);
            let vals: Vec<f32> = (0..len).map(|i| 0.25 + i as f32 * 0.5).collect();
            outcome_of(device_vs_reference(
                &e,
                ScanProgram::F32_ADD,
                &keys,
                &vals,
                |a, b| a == b,
                |a, b| a + b,
            ))
        });

        let e = Rc::clone(&env);
        runner.add(DEVICE_CASES[2], move || {
            let keys = int_keys(len);
            let vals = vec![UddtI2::INITIAL_ADD; len];
            outcome_of(device_vs_reference(
                &e,
                ScanProgram::I2_ADD,
                &keys,
                &vals,
                |a, b| a == b,
                add_i2,
            ))
        });

        let e = Rc::clone(&env);
        runner.add(DEVICE_CASES[3], move || {
            let keys = int_keys(len);
            let vals = vec![UddtD4::INITIAL_MULT; len];
            outcome_of(device_vs_reference(
                &e,
                ScanProgram::D4_MULT,
                &keys,
                &vals,
                |a, b| a == b,
                mult_d4,
            ))
        });

        let e = env;
        runner.add(DEVICE_CASES[4], move || {
            let keys = m2_staircase(len);
            let vals = vec![UddtM3::INITIAL_MIX; len];
            outcome_of(device_vs_reference(
                &e,
                ScanProgram::M3_MIX,
                &keys,
                &vals,
                m2_equal_to,
                mix_m3,
            ))
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_cases_pass() {
        let mut r = Runner::new();
        register_reference(&mut r);
        assert_eq!(r.len(), 4);
        let s = r.run(None);
        assert_eq!(s.failed, Vec::<String>::new());
        assert_eq!(s.passed, 4);
    }

    #[test]
    fn fold_check_catches_wrong_segment_end() {
        let keys = [1, 2, 2];
        let vals = [1, 1, 1];
        let bad = [1, 1, 1];
        let o = check_segment_folds(&keys, &vals, &bad, |a, b| a == b, |a, b| a + b);
        assert!(o.is_failure());
    }

    #[test]
    fn fold_check_catches_length_mismatch() {
        let o = check_segment_folds(&[1, 1], &[1, 1], &[1], |a: &i32, b| a == b, |a, b| a + b);
        assert!(matches!(o, Outcome::Failed(m) if m.contains("length")));
    }

    #[test]
    fn int_ramp_rejects_lengths_beyond_i32() {
        assert_eq!(int_ramp(6).unwrap(), vec![-2, -1, 0, 1, 2, -2]);
        let too_long = i32::MAX as usize + 1;
        assert!(matches!(int_ramp(too_long), Err(ClError::InvalidSize(n)) if n == too_long));
    }

    #[test]
    fn listing_needs_no_device_and_honours_filter() {
        let mut r = Runner::new();
        register_reference(&mut r);
        let all = listing(&r, None);
        assert_eq!(all.len(), 4 + DEVICE_CASES.len());
        assert!(all.contains(&"InclusiveScanByKey.IncMixedM3"));

        assert_eq!(listing(&r, Some("MixedM3")), vec![
            "ScanByKeyReference.MixedM3",
            "InclusiveScanByKey.IncMixedM3",
        ]);
        assert!(listing(&r, Some("NoSuchCase")).is_empty());
    }

    #[test]
    fn m2_staircase_segments_grow() {
        let keys = m2_staircase(6);
        let runs = segments(&keys, m2_equal_to);
        let lens: Vec<_> = runs.iter().map(|r| r.len()).collect();
        assert_eq!(lens, vec![1, 2, 3]);
        assert_eq!(keys[0].a, 1);
    }
}
