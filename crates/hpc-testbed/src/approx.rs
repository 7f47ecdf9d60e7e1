//! Gleichheit mit Toleranz für Gleitkomma-Ergebnisse.
//!
//! Regel (pro Feld, gerechnet in f64): liegt die Referenz `r` betragsmäßig
//! unter der Schwelle `th`, gilt `|x - r| < th`, sonst `|(x - r) / r| < th`.

/// Schwelle für f32-Felder
pub const F32_TOLERANCE: f64 = 1e-5;
/// Schwelle für f64-Felder
pub const F64_TOLERANCE: f64 = 1e-10;

/// Absolut nahe Null, sonst relativ.
#[inline]
pub fn within(actual: f64, reference: f64, th: f64) -> bool {
    let diff = actual - reference;
    if reference.abs() < th {
        diff.abs() < th
    } else {
        (diff / reference).abs() < th
    }
}

/// Vergleich berechneter Werte gegen eine Referenz.
///
/// `self` ist der berechnete Wert, `reference` der erwartete. Die Relation ist
/// bewusst nicht symmetrisch: relativ wird immer zur Referenz gemessen.
pub trait ApproxEq {
    fn approx_eq(&self, reference: &Self) -> bool;
}

impl ApproxEq for f32 {
    fn approx_eq(&self, reference: &Self) -> bool {
        within(f64::from(*self), f64::from(*reference), F32_TOLERANCE)
    }
}

impl ApproxEq for f64 {
    fn approx_eq(&self, reference: &Self) -> bool {
        within(*self, *reference, F64_TOLERANCE)
    }
}

macro_rules! exact_approx_eq {
    ($($t:ty),*) => {
        $(impl ApproxEq for $t {
            #[inline]
            fn approx_eq(&self, reference: &Self) -> bool {
                self == reference
            }
        })*
    };
}

exact_approx_eq!(i8, i16, i32, i64, u8, u16, u32, u64, usize, isize, bool);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn near_zero_reference_uses_absolute_threshold() {
        assert!(within(5e-11, 0.0, F64_TOLERANCE));
        assert!(!within(2e-10, 0.0, F64_TOLERANCE));
        assert!(within(-8e-6, 1e-6, F32_TOLERANCE));
    }

    #[test]
    fn large_reference_uses_relative_threshold() {
        // absolute Abweichung 1.0, relativ aber nur 1e-6
        assert!(within(1_000_001.0, 1_000_000.0, F32_TOLERANCE));
        assert!(!within(1.001, 1.0, F32_TOLERANCE));
    }

    #[test]
    fn negative_reference() {
        assert!(within(-2.0000000001, -2.0, 1e-9));
        assert!(!within(-2.1, -2.0, 1e-3));
    }

    #[test]
    fn f32_and_f64_thresholds_differ() {
        let a = 1.000001_f64;
        assert!((a as f32).approx_eq(&1.0_f32));
        assert!(!a.approx_eq(&1.0_f64));
    }

    #[test]
    fn integers_are_exact() {
        assert!(3_i32.approx_eq(&3));
        assert!(!3_i32.approx_eq(&4));
    }

    #[test]
    fn nan_never_matches() {
        assert!(!f64::NAN.approx_eq(&1.0));
        assert!(!1.0_f64.approx_eq(&f64::NAN));
    }
}
