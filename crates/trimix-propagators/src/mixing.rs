//! Phase decomposition and mixing laws.
//!
//! The nested fractions `f1`, `f2` split every cell into three phases:
//!
//! ```text
//! A = f1 * (1 - f2)     B = f1 * f2     C = 1 - f1
//! ```
//!
//! A [`MixingLaw`] combines one per-phase constant (a density or a
//! viscosity) into a single mixture value weighted by those fractions.

use std::fmt;

/// Volume fractions of the three phases at one location.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhaseFractions {
    /// Phase A, the outer part of the nested region.
    pub a: f64,
    /// Phase B, the inner part of the nested region.
    pub b: f64,
    /// Phase C, everything outside `f1`.
    pub c: f64,
}

impl PhaseFractions {
    /// Decomposition with each term clamped to `[0, 1]` independently.
    ///
    /// This is what the mixing laws and the elastic gating see, so an
    /// overshooting advection step never produces a negative weight.
    pub fn clamped(f1: f64, f2: f64) -> Self {
        Self {
            a: (f1 * (1.0 - f2)).clamp(0.0, 1.0),
            b: (f1 * f2).clamp(0.0, 1.0),
            c: (1.0 - f1).clamp(0.0, 1.0),
        }
    }

    /// Decomposition without clamping. Sums to 1 for any finite input.
    pub fn raw(f1: f64, f2: f64) -> Self {
        Self {
            a: f1 * (1.0 - f2),
            b: f1 * f2,
            c: 1.0 - f1,
        }
    }

    /// The fractions as `[a, b, c]`.
    pub fn to_array(self) -> [f64; 3] {
        [self.a, self.b, self.c]
    }

    /// `a + b + c`.
    pub fn sum(self) -> f64 {
        self.a + self.b + self.c
    }
}

/// Rule combining per-phase values into a mixture value.
pub trait MixingLaw: fmt::Debug + Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Mix `values = [A, B, C]` with the given fractions.
    fn mix(&self, fractions: PhaseFractions, values: [f64; 3]) -> f64;
}

/// Volume-fraction weighted arithmetic mean: `Σ φ_k v_k`.
///
/// The default for both density and viscosity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Arithmetic;

impl MixingLaw for Arithmetic {
    fn name(&self) -> &str {
        "arithmetic"
    }

    fn mix(&self, fractions: PhaseFractions, values: [f64; 3]) -> f64 {
        fractions
            .to_array()
            .iter()
            .zip(values)
            .map(|(phi, v)| phi * v)
            .sum()
    }
}

/// Harmonic mean: `1 / Σ φ_k / v_k` over phases with `φ_k > 0`.
///
/// A present phase with a zero value forces the mixture to 0. If no phase
/// is present the result is also 0.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Harmonic;

impl MixingLaw for Harmonic {
    fn name(&self) -> &str {
        "harmonic"
    }

    fn mix(&self, fractions: PhaseFractions, values: [f64; 3]) -> f64 {
        let mut inverse = 0.0;
        for (phi, v) in fractions.to_array().into_iter().zip(values) {
            if phi > 0.0 {
                if v == 0.0 {
                    return 0.0;
                }
                inverse += phi / v;
            }
        }
        if inverse > 0.0 {
            1.0 / inverse
        } else {
            0.0
        }
    }
}
