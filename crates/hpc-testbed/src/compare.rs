//! Elementweiser Vergleich Referenz gegen Gerät.

use std::fmt::{self, Debug};

use crate::approx::ApproxEq;
use crate::runner::Outcome;

/// Maximal ausgegebene Abweichungen pro Vergleich
const MAX_REPORTED: usize = 16;

#[derive(Debug, Clone, PartialEq)]
pub struct Mismatch<T> {
    pub index: usize,
    pub expected: T,
    pub actual: T,
}

impl<T: Debug> fmt::Display for Mismatch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "expected {:?}, actual {:?}. Where i = {}",
            self.expected, self.actual, self.index
        )
    }
}

/// Ergebnis eines Vergleichs; prüft immer alle Elemente.
#[derive(Debug, Clone)]
pub struct Comparison<T> {
    pub expected_len: usize,
    pub actual_len: usize,
    pub mismatches: Vec<Mismatch<T>>,
}

impl<T> Comparison<T> {
    pub fn is_match(&self) -> bool {
        self.expected_len == self.actual_len && self.mismatches.is_empty()
    }
}

impl<T: Debug> Comparison<T> {
    /// In ein Testergebnis umwandeln, mit lesbarem Fehlertext.
    pub fn into_outcome(self) -> Outcome {
        if self.is_match() {
            return Outcome::Passed;
        }
        let mut msg = String::new();
        if self.expected_len != self.actual_len {
            msg.push_str(&format!(
                "length mismatch: expected {}, actual {}\n",
                self.expected_len, self.actual_len
            ));
        }
        for m in self.mismatches.iter().take(MAX_REPORTED) {
            msg.push_str(&format!("{m}\n"));
        }
        if self.mismatches.len() > MAX_REPORTED {
            msg.push_str(&format!(
                "... {} more mismatches\n",
                self.mismatches.len() - MAX_REPORTED
            ));
        }
        Outcome::Failed(msg.trim_end().to_string())
    }
}

/// Vergleicht `actual` gegen `reference` über die gemeinsame Länge.
pub fn compare_slices<T>(reference: &[T], actual: &[T]) -> Comparison<T>
where
    T: ApproxEq + Clone,
{
    let mismatches = reference
        .iter()
        .zip(actual)
        .enumerate()
        .filter(|(_, (r, a))| !a.approx_eq(r))
        .map(|(index, (r, a))| Mismatch {
            index,
            expected: r.clone(),
            actual: a.clone(),
        })
        .collect();

    Comparison {
        expected_len: reference.len(),
        actual_len: actual.len(),
        mismatches,
    }
}
