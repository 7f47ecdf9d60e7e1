//! CPU-Referenz für segmentierte Scans.
//!
//! Ein Segment ist ein maximaler Lauf benachbarter gleicher Schlüssel. Innerhalb
//! eines Segments wird kumuliert, an jeder Segmentgrenze neu begonnen.

use std::ops::Range;

use crate::ClError;

/// Inklusiver Scan-by-Key, Ergebnis als neuer Vektor.
///
/// `eq` vergleicht Schlüssel, `op` verknüpft `(vorheriges Ergebnis, aktueller Wert)`.
pub fn inclusive_scan_by_key<K, V, E, F>(
    keys: &[K],
    values: &[V],
    eq: E,
    op: F,
) -> Result<Vec<V>, ClError>
where
    V: Clone,
    E: FnMut(&K, &K) -> bool,
    F: FnMut(&V, &V) -> V,
{
    check_len(keys.len(), values.len())?;
    let mut out = values.to_vec();
    scan_in_place(keys, &mut out, eq, op);
    Ok(out)
}

/// Wie [`inclusive_scan_by_key`], schreibt aber in einen vorhandenen Puffer.
pub fn inclusive_scan_by_key_into<K, V, E, F>(
    keys: &[K],
    values: &[V],
    out: &mut [V],
    eq: E,
    op: F,
) -> Result<(), ClError>
where
    V: Clone,
    E: FnMut(&K, &K) -> bool,
    F: FnMut(&V, &V) -> V,
{
    check_len(keys.len(), values.len())?;
    check_len(keys.len(), out.len())?;
    out.clone_from_slice(values);
    scan_in_place(keys, out, eq, op);
    Ok(())
}

/// Exklusiver Scan-by-Key: erstes Element jedes Segments ist `init`,
/// danach `out[i] = op(out[i-1], values[i-1])`.
pub fn exclusive_scan_by_key<K, V, E, F>(
    keys: &[K],
    values: &[V],
    init: V,
    mut eq: E,
    mut op: F,
) -> Result<Vec<V>, ClError>
where
    V: Clone,
    E: FnMut(&K, &K) -> bool,
    F: FnMut(&V, &V) -> V,
{
    check_len(keys.len(), values.len())?;
    let mut out: Vec<V> = Vec::with_capacity(values.len());
    for i in 0..keys.len() {
        let next = if i > 0 && eq(&keys[i], &keys[i - 1]) {
            op(&out[i - 1], &values[i - 1])
        } else {
            init.clone()
        };
        out.push(next);
    }
    Ok(out)
}

/// Maximale Läufe gleicher Schlüssel als Indexbereiche.
pub fn segments<K, E>(keys: &[K], mut eq: E) -> Vec<Range<usize>>
where
    E: FnMut(&K, &K) -> bool,
{
    let mut out = Vec::new();
    let mut start = 0;
    for i in 1..keys.len() {
        if !eq(&keys[i], &keys[i - 1]) {
            out.push(start..i);
            start = i;
        }
    }
    if !keys.is_empty() {
        out.push(start..keys.len());
    }
    out
}

/// Treppen-Schlüssel `{k1, k2,k2, k3,k3,k3, ...}`: Segment `i` hat Länge `i`.
///
/// `first` ist der Schlüssel des ersten Segments, `step` erzeugt den nächsten.
pub fn staircase_keys<K, S>(len: usize, first: K, mut step: S) -> Vec<K>
where
    K: Clone,
    S: FnMut(&K) -> K,
{
    let mut keys = Vec::with_capacity(len);
    let mut key = first;
    let mut seg_len = 1;
    let mut seg_idx = 0;
    while keys.len() < len {
        if seg_idx == seg_len {
            key = step(&key);
            seg_len += 1;
            seg_idx = 0;
        }
        keys.push(key.clone());
        seg_idx += 1;
    }
    keys
}

// Erwartet `out` bereits mit den Eingabewerten belegt.
fn scan_in_place<K, V, E, F>(keys: &[K], out: &mut [V], mut eq: E, mut op: F)
where
    E: FnMut(&K, &K) -> bool,
    F: FnMut(&V, &V) -> V,
{
    for i in 1..keys.len() {
        if eq(&keys[i], &keys[i - 1]) {
            out[i] = op(&out[i - 1], &out[i]);
        }
    }
}

#[inline]
fn check_len(keys: usize, values: usize) -> Result<(), ClError> {
    if keys == values {
        Ok(())
    } else {
        Err(ClError::LengthMismatch { keys, values })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add(a: &i32, b: &i32) -> i32 {
        a + b
    }

    #[test]
    fn staircase_segments_add() {
        let keys = [1, 2, 2, 3, 3, 3];
        let vals = [1; 6];
        let out = inclusive_scan_by_key(&keys, &vals, |a, b| a == b, add).unwrap();
        assert_eq!(out, vec![1, 1, 2, 1, 2, 3]);
    }

    #[test]
    fn exclusive_staircase_add() {
        let keys = [1, 2, 2, 3, 3, 3];
        let vals = [1; 6];
        let out = exclusive_scan_by_key(&keys, &vals, 0, |a, b| a == b, add).unwrap();
        assert_eq!(out, vec![0, 0, 1, 0, 1, 2]);
    }

    #[test]
    fn empty_input() {
        let keys: [i32; 0] = [];
        let vals: [i32; 0] = [];
        assert!(inclusive_scan_by_key(&keys, &vals, |a, b| a == b, add)
            .unwrap()
            .is_empty());
        assert!(segments(&keys, |a, b| a == b).is_empty());
    }

    #[test]
    fn all_equal_keys_is_prefix_scan() {
        let keys = [7; 5];
        let vals = [1, 2, 3, 4, 5];
        let out = inclusive_scan_by_key(&keys, &vals, |a, b| a == b, add).unwrap();
        assert_eq!(out, vec![1, 3, 6, 10, 15]);
    }

    #[test]
    fn distinct_keys_copy_values() {
        let keys = [1, 2, 3, 4];
        let vals = [9, -3, 4, 0];
        let out = inclusive_scan_by_key(&keys, &vals, |a, b| a == b, add).unwrap();
        assert_eq!(out, vals.to_vec());
    }

    #[test]
    fn repeated_key_after_gap_restarts() {
        // Gleicher Schlüssel, aber nicht benachbart -> neues Segment
        let keys = [1, 1, 2, 1, 1];
        let vals = [1, 1, 1, 1, 1];
        let out = inclusive_scan_by_key(&keys, &vals, |a, b| a == b, add).unwrap();
        assert_eq!(out, vec![1, 2, 1, 1, 2]);
    }

    #[test]
    fn operand_order_is_previous_then_current() {
        let keys = [0, 0, 0];
        let vals = ["a", "b", "c"].map(String::from);
        let out = inclusive_scan_by_key(&keys, &vals, |a, b| a == b, |p, c| format!("{p}{c}"))
            .unwrap();
        assert_eq!(out, vec!["a", "ab", "abc"]);
    }

    #[test]
    fn length_mismatch_is_error() {
        let err = inclusive_scan_by_key(&[1, 2], &[1], |a: &i32, b| a == b, add).unwrap_err();
        assert!(matches!(err, ClError::LengthMismatch { keys: 2, values: 1 }));
    }

    #[test]
    fn into_rejects_short_output() {
        let mut out = [0; 2];
        let err = inclusive_scan_by_key_into(&[1, 1, 1], &[1, 1, 1], &mut out, |a, b| a == b, add)
            .unwrap_err();
        assert!(matches!(err, ClError::LengthMismatch { .. }));
    }

    #[test]
    fn into_matches_allocating_version() {
        let keys = [3, 3, 5, 5, 5, 8];
        let vals = [2, 4, 1, 1, 1, 6];
        let mut out = [0; 6];
        inclusive_scan_by_key_into(&keys, &vals, &mut out, |a, b| a == b, add).unwrap();
        assert_eq!(out, [2, 6, 1, 2, 3, 6]);
    }

    #[test]
    fn segments_cover_runs() {
        let keys = [1, 2, 2, 3, 3, 3];
        assert_eq!(segments(&keys, |a, b| a == b), vec![0..1, 1..3, 3..6]);
    }

    #[test]
    fn staircase_layout() {
        let keys = staircase_keys(8, 1, |k| k + 1);
        assert_eq!(keys, vec![1, 2, 2, 3, 3, 3, 4, 4]);
    }

    #[test]
    fn custom_key_predicate() {
        // Schlüssel gelten als gleich, wenn sie in dieselbe Zehnerstelle fallen
        let keys = [11, 15, 21, 29, 30];
        let vals = [1, 1, 1, 1, 1];
        let out = inclusive_scan_by_key(&keys, &vals, |a, b| a / 10 == b / 10, add).unwrap();
        assert_eq!(out, vec![1, 2, 1, 2, 1]);
    }
}
