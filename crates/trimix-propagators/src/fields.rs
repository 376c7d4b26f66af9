//! Field layout of the three-phase model.
//!
//! [`ThreePhaseFields`] names every field the model reads or writes. When
//! smoothing is disabled the smoothed IDs alias the raw fraction IDs, so
//! the evaluator reads `f1`, `f2` directly and no copy is ever made.

use trimix_core::{FieldDef, FieldId};

/// IDs of every field the three-phase model touches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThreePhaseFields {
    /// Outer volume fraction.
    pub f1: FieldId,
    /// Nested volume fraction, meaningful where `f1` is appreciable.
    pub f2: FieldId,
    /// Smoothed `f1`, or `f1` itself when unfiltered.
    pub sf1: FieldId,
    /// Smoothed `f2`, or `f2` itself when unfiltered.
    pub sf2: FieldId,
    /// Static per-cell metric.
    pub cell_metric: FieldId,
    /// Static per-face metric.
    pub face_metric: FieldId,
    /// Face specific volume, `fm / ρ`.
    pub specific_volume: FieldId,
    /// Face viscosity, `fm * μ`.
    pub face_viscosity: FieldId,
    /// Cell density, `cm * ρ`.
    pub density: FieldId,
    /// Cell elastic modulus.
    pub elastic_modulus: FieldId,
    /// Cell relaxation time.
    pub relaxation_time: FieldId,
}

impl ThreePhaseFields {
    /// Sequential layout starting at `FieldId(0)`.
    ///
    /// Unfiltered: `f1, f2, cell_metric, face_metric, specific_volume,
    /// face_viscosity, density, elastic_modulus, relaxation_time`.
    /// Filtered inserts `sf1, sf2` after `f2`.
    pub fn sequential(filtered: bool) -> Self {
        let mut next = 0u32;
        let mut take = || {
            let id = FieldId(next);
            next += 1;
            id
        };
        let f1 = take();
        let f2 = take();
        let (sf1, sf2) = if filtered { (take(), take()) } else { (f1, f2) };
        Self {
            f1,
            f2,
            sf1,
            sf2,
            cell_metric: take(),
            face_metric: take(),
            specific_volume: take(),
            face_viscosity: take(),
            density: take(),
            elastic_modulus: take(),
            relaxation_time: take(),
        }
    }

    /// Whether `sf1`, `sf2` are distinct fields.
    pub fn is_filtered(&self) -> bool {
        self.sf1 != self.f1 || self.sf2 != self.f2
    }

    /// The raw fraction fields `[f1, f2]`.
    pub fn interfaces(&self) -> [FieldId; 2] {
        [self.f1, self.f2]
    }

    /// The fraction fields the evaluator reads, `[sf1, sf2]`.
    pub fn smeared_interfaces(&self) -> [FieldId; 2] {
        [self.sf1, self.sf2]
    }

    /// Number of distinct field IDs in the layout.
    pub fn len(&self) -> usize {
        if self.is_filtered() {
            11
        } else {
            9
        }
    }

    /// Always `false`.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Field definitions for a `ndim`-dimensional grid, ordered by ID.
    ///
    /// Only valid for a [`sequential`](Self::sequential) layout.
    pub fn definitions(&self, ndim: u32) -> Vec<FieldDef> {
        let fraction = |name: &str| FieldDef::scalar(name).with_bounds(0.0, 1.0);
        let mut defs: Vec<(FieldId, FieldDef)> = vec![
            (self.f1, fraction("f1")),
            (self.f2, fraction("f2")),
            (self.cell_metric, FieldDef::scalar("cell_metric").into_static()),
            (self.face_metric, FieldDef::face("face_metric", ndim).into_static()),
            (
                self.specific_volume,
                FieldDef::face("specific_volume", ndim).with_units("m^3/kg"),
            ),
            (
                self.face_viscosity,
                FieldDef::face("face_viscosity", ndim).with_units("Pa s"),
            ),
            (self.density, FieldDef::scalar("density").with_units("kg/m^3")),
            (
                self.elastic_modulus,
                FieldDef::scalar("elastic_modulus").with_units("Pa"),
            ),
            (
                self.relaxation_time,
                FieldDef::scalar("relaxation_time").with_units("s"),
            ),
        ];
        if self.is_filtered() {
            defs.push((self.sf1, fraction("sf1")));
            defs.push((self.sf2, fraction("sf2")));
        }
        defs.sort_by_key(|(id, _)| *id);
        defs.into_iter().map(|(_, def)| def).collect()
    }
}
