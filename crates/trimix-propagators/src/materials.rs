//! Per-phase material constants.
//!
//! Set once before the first step and read-only afterwards. The builder
//! is the only way to change a value, and it validates everything.

use crate::error::BuildError;

/// Constants of one phase.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhaseConstants {
    /// Density.
    pub density: f64,
    /// Dynamic viscosity.
    pub viscosity: f64,
    /// Elastic modulus.
    pub modulus: f64,
    /// Polymer relaxation time.
    pub relaxation_time: f64,
}

impl PhaseConstants {
    /// A Newtonian phase: zero modulus and relaxation time.
    pub fn newtonian(density: f64, viscosity: f64) -> Self {
        Self {
            density,
            viscosity,
            modulus: 0.0,
            relaxation_time: 0.0,
        }
    }

    /// Set the viscoelastic constants.
    pub fn with_elasticity(mut self, modulus: f64, relaxation_time: f64) -> Self {
        self.modulus = modulus;
        self.relaxation_time = relaxation_time;
        self
    }

    fn validate(&self, phase: &str) -> Result<(), BuildError> {
        let named = [
            ("density", self.density),
            ("viscosity", self.viscosity),
            ("modulus", self.modulus),
            ("relaxation_time", self.relaxation_time),
        ];
        for (what, value) in named {
            if !value.is_finite() || value < 0.0 {
                return Err(BuildError::InvalidConstant {
                    name: format!("{phase}.{what}"),
                    value,
                });
            }
        }
        Ok(())
    }
}

impl Default for PhaseConstants {
    /// Unit density, everything else zero.
    fn default() -> Self {
        Self::newtonian(1.0, 0.0)
    }
}

/// The constants of all three phases plus the elastic activation threshold.
///
/// Phase A is `f1 * (1 - f2)`, phase B is `f1 * f2`, phase C is `1 - f1`.
#[derive(Clone, Debug, PartialEq)]
pub struct MaterialConstants {
    phases: [PhaseConstants; 3],
    tol_elastic: f64,
}

impl MaterialConstants {
    /// Default activation threshold for the elastic terms.
    pub const DEFAULT_TOL_ELASTIC: f64 = 0.1;

    /// Start a builder from the defaults.
    pub fn builder() -> MaterialConstantsBuilder {
        MaterialConstantsBuilder {
            inner: Self::default(),
        }
    }

    /// Constants of phase A.
    pub fn phase_a(&self) -> &PhaseConstants {
        &self.phases[0]
    }

    /// Constants of phase B.
    pub fn phase_b(&self) -> &PhaseConstants {
        &self.phases[1]
    }

    /// Constants of phase C.
    pub fn phase_c(&self) -> &PhaseConstants {
        &self.phases[2]
    }

    /// All three phases as `[A, B, C]`.
    pub fn phases(&self) -> &[PhaseConstants; 3] {
        &self.phases
    }

    /// A phase contributes elasticity only where its clamped fraction is
    /// strictly greater than this.
    pub fn tol_elastic(&self) -> f64 {
        self.tol_elastic
    }

    /// Densities as `[A, B, C]`.
    pub fn densities(&self) -> [f64; 3] {
        self.phases.map(|p| p.density)
    }

    /// Viscosities as `[A, B, C]`.
    pub fn viscosities(&self) -> [f64; 3] {
        self.phases.map(|p| p.viscosity)
    }
}

impl Default for MaterialConstants {
    fn default() -> Self {
        Self {
            phases: [PhaseConstants::default(); 3],
            tol_elastic: Self::DEFAULT_TOL_ELASTIC,
        }
    }
}

/// Builder for [`MaterialConstants`].
#[derive(Clone, Debug)]
pub struct MaterialConstantsBuilder {
    inner: MaterialConstants,
}

impl MaterialConstantsBuilder {
    /// Constants of phase A.
    pub fn phase_a(mut self, constants: PhaseConstants) -> Self {
        self.inner.phases[0] = constants;
        self
    }

    /// Constants of phase B.
    pub fn phase_b(mut self, constants: PhaseConstants) -> Self {
        self.inner.phases[1] = constants;
        self
    }

    /// Constants of phase C.
    pub fn phase_c(mut self, constants: PhaseConstants) -> Self {
        self.inner.phases[2] = constants;
        self
    }

    /// Elastic activation threshold, in `[0, 1)`.
    pub fn tol_elastic(mut self, tol: f64) -> Self {
        self.inner.tol_elastic = tol;
        self
    }

    /// Validate and build.
    ///
    /// Every constant must be finite and non-negative. A zero density is
    /// accepted; reaching it through the mixing law is reported at step
    /// time as a non-finite specific volume.
    pub fn build(self) -> Result<MaterialConstants, BuildError> {
        for (phase, label) in self.inner.phases.iter().zip(["phase_a", "phase_b", "phase_c"]) {
            phase.validate(label)?;
        }
        let tol = self.inner.tol_elastic;
        if !(0.0..1.0).contains(&tol) {
            return Err(BuildError::InvalidThreshold { value: tol });
        }
        Ok(self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_values() {
        let m = MaterialConstants::default();
        for p in m.phases() {
            assert_eq!(*p, PhaseConstants::newtonian(1.0, 0.0));
        }
        assert_eq!(m.tol_elastic(), 0.1);
        assert_eq!(MaterialConstants::builder().build().unwrap(), m);
    }

    #[test]
    fn builder_sets_each_phase() {
        let m = MaterialConstants::builder()
            .phase_a(PhaseConstants::newtonian(1000.0, 1e-3).with_elasticity(5.0, 0.2))
            .phase_b(PhaseConstants::newtonian(900.0, 1e-2))
            .phase_c(PhaseConstants::newtonian(1.2, 1.8e-5))
            .tol_elastic(0.05)
            .build()
            .unwrap();
        assert_eq!(m.densities(), [1000.0, 900.0, 1.2]);
        assert_eq!(m.viscosities(), [1e-3, 1e-2, 1.8e-5]);
        assert_eq!(m.phase_a().modulus, 5.0);
        assert_eq!(m.phase_a().relaxation_time, 0.2);
        assert_eq!(m.tol_elastic(), 0.05);
    }

    #[test]
    fn rejects_negative_and_non_finite() {
        let err = MaterialConstants::builder()
            .phase_b(PhaseConstants::newtonian(1.0, -1.0))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            BuildError::InvalidConstant {
                name: "phase_b.viscosity".into(),
                value: -1.0
            }
        );
        assert!(MaterialConstants::builder()
            .phase_c(PhaseConstants::newtonian(f64::NAN, 0.0))
            .build()
            .is_err());
    }

    #[test]
    fn zero_density_is_allowed() {
        assert!(MaterialConstants::builder()
            .phase_a(PhaseConstants::newtonian(0.0, 0.0))
            .build()
            .is_ok());
    }

    #[test]
    fn threshold_range() {
        assert!(MaterialConstants::builder().tol_elastic(0.0).build().is_ok());
        assert!(MaterialConstants::builder().tol_elastic(1.0).build().is_err());
        assert!(MaterialConstants::builder().tol_elastic(-0.1).build().is_err());
        assert!(MaterialConstants::builder().tol_elastic(f64::NAN).build().is_err());
    }
}
