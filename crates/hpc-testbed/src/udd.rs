//! Benutzerdefinierte Datentypen (UDD) als Schlüssel/Werte für die Tests.
//!
//! Alle Typen sind `#[repr(C)]` + `Pod`, damit sie ohne Umpacken auf das Gerät
//! gehen; die OpenCL-Gegenstücke stehen in [`OPENCL_TYPES`].

use std::ops::{Mul, Neg};

use bytemuck::{Pod, Zeroable};

use crate::approx::{ApproxEq, F32_TOLERANCE, F64_TOLERANCE, within};

/// OpenCL-C-Definitionen der Typen und Verknüpfungen, Layout identisch zu Rust.
pub const OPENCL_TYPES: &str = include_str!("../kernels/udd_types.cl");

// ─── Integer x2 ──────────────────────────────────────────────────────
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct UddtI2 {
    pub a: i32,
    pub b: i32,
}

impl UddtI2 {
    pub const IDENTITY_ADD: Self = Self { a: 0, b: 0 };
    pub const INITIAL_ADD: Self = Self { a: -1, b: 2 };
}

/// `AddI2`
pub fn add_i2(lhs: &UddtI2, rhs: &UddtI2) -> UddtI2 {
    UddtI2 {
        a: lhs.a.wrapping_add(rhs.a),
        b: lhs.b.wrapping_add(rhs.b),
    }
}

impl ApproxEq for UddtI2 {
    fn approx_eq(&self, reference: &Self) -> bool {
        self == reference
    }
}

impl Neg for UddtI2 {
    type Output = Self;
    fn neg(self) -> Self {
        Self { a: self.a.wrapping_neg(), b: self.b.wrapping_neg() }
    }
}

impl Mul for UddtI2 {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        Self {
            a: self.a.wrapping_mul(rhs.a),
            b: self.b.wrapping_mul(rhs.b),
        }
    }
}

// ─── Double x4 ───────────────────────────────────────────────────────
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct UddtD4 {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

impl UddtD4 {
    pub const IDENTITY_MULT: Self = Self { a: 1.0, b: 1.0, c: 1.0, d: 1.0 };
    pub const INITIAL_MULT: Self = Self {
        a: 1.00001,
        b: 1.000003,
        c: 1.0000005,
        d: 1.00000007,
    };
}

/// `MultD4`
pub fn mult_d4(lhs: &UddtD4, rhs: &UddtD4) -> UddtD4 {
    *lhs * *rhs
}

impl ApproxEq for UddtD4 {
    fn approx_eq(&self, r: &Self) -> bool {
        within(self.a, r.a, F64_TOLERANCE)
            && within(self.b, r.b, F64_TOLERANCE)
            && within(self.c, r.c, F64_TOLERANCE)
            && within(self.d, r.d, F64_TOLERANCE)
    }
}

impl Neg for UddtD4 {
    type Output = Self;
    fn neg(self) -> Self {
        Self { a: -self.a, b: -self.b, c: -self.c, d: -self.d }
    }
}

impl Mul for UddtD4 {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        Self {
            a: self.a * rhs.a,
            b: self.b * rhs.b,
            c: self.c * rhs.c,
            d: self.d * rhs.d,
        }
    }
}

// ─── Gemischt: int, float, double ────────────────────────────────────
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct UddtM3 {
    pub a: i32,
    pub b: f32,
    pub c: f64,
}

impl UddtM3 {
    pub const IDENTITY_MIX: Self = Self { a: 0, b: 0.0, c: 1.0 };
    pub const INITIAL_MIX: Self = Self { a: 2, b: 3.0, c: 1.000001 };
}

/// `MixM3`: `a` xor, `b` Summe, `c` Produkt
pub fn mix_m3(lhs: &UddtM3, rhs: &UddtM3) -> UddtM3 {
    UddtM3 {
        a: lhs.a ^ rhs.a,
        b: lhs.b + rhs.b,
        c: lhs.c * rhs.c,
    }
}

impl ApproxEq for UddtM3 {
    fn approx_eq(&self, r: &Self) -> bool {
        self.a == r.a
            && within(f64::from(self.b), f64::from(r.b), F32_TOLERANCE)
            && within(self.c, r.c, F64_TOLERANCE)
    }
}

impl Neg for UddtM3 {
    type Output = Self;
    fn neg(self) -> Self {
        Self { a: self.a.wrapping_neg(), b: -self.b, c: -self.c }
    }
}

impl Mul for UddtM3 {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        Self {
            a: self.a.wrapping_mul(rhs.a),
            b: self.b * rhs.b,
            c: self.c * rhs.c,
        }
    }
}

// ─── Gemischt: int, float (Schlüsseltyp) ─────────────────────────────
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct UddtM2 {
    pub a: i32,
    pub b: f32,
}

impl UddtM2 {
    pub const IDENTITY_MIX: Self = Self { a: 0, b: 3.141596 };

    /// nächster Schlüssel der Treppe
    pub fn next(&self) -> Self {
        Self { a: self.a + 1, b: self.b + 1.234567 }
    }
}

/// Schlüsselvergleich `uddtM2_equal_to` (mit Toleranz auf `b`)
pub fn m2_equal_to(lhs: &UddtM2, rhs: &UddtM2) -> bool {
    lhs.approx_eq(rhs)
}

impl ApproxEq for UddtM2 {
    fn approx_eq(&self, r: &Self) -> bool {
        self.a == r.a && within(f64::from(self.b), f64::from(r.b), F32_TOLERANCE)
    }
}

impl Neg for UddtM2 {
    type Output = Self;
    fn neg(self) -> Self {
        Self { a: self.a.wrapping_neg(), b: -self.b }
    }
}

impl Mul for UddtM2 {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        Self {
            a: self.a.wrapping_mul(rhs.a),
            b: self.b * rhs.b,
        }
    }
}
