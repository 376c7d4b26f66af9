//! Static grid metrics.
//!
//! The property evaluator multiplies cell density by the cell metric and
//! face viscosity/specific volume by the face metric. On a Cartesian grid
//! both are 1. On an axisymmetric grid they are the distance from the
//! symmetry axis, which turns planar sums into volume-of-revolution sums.

use crate::error::SpaceError;
use crate::faces::{FaceLayout, FaceSide};
use crate::space::Space;

/// Lower bound applied to face metrics so faces on the symmetry axis keep a
/// strictly positive area.
pub const FACE_METRIC_FLOOR: f64 = 1e-20;

/// Coordinate system of a lattice.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Metric {
    /// Plain Cartesian grid: every metric is 1.
    #[default]
    Cartesian,
    /// Grid revolved around the line where the radial coordinate is zero.
    Axisymmetric {
        /// Which lattice axis measures distance from the symmetry axis.
        radial_axis: usize,
        /// Radial coordinate of the lower edge of the first cell.
        origin: f64,
        /// Cell width along the radial axis.
        spacing: f64,
    },
}

impl Metric {
    /// Check the parameters against `space`.
    pub fn validate(&self, space: &dyn Space) -> Result<(), SpaceError> {
        match *self {
            Self::Cartesian => Ok(()),
            Self::Axisymmetric {
                radial_axis,
                origin,
                spacing,
            } => {
                if radial_axis >= space.ndim() {
                    return Err(SpaceError::InvalidMetric {
                        reason: format!(
                            "radial axis {radial_axis} out of range for {}-D space",
                            space.ndim()
                        ),
                    });
                }
                if !(spacing.is_finite() && spacing > 0.0) {
                    return Err(SpaceError::InvalidMetric {
                        reason: format!("spacing must be finite and positive, got {spacing}"),
                    });
                }
                if !(origin.is_finite() && origin >= 0.0) {
                    return Err(SpaceError::InvalidMetric {
                        reason: format!("origin must be finite and non-negative, got {origin}"),
                    });
                }
                Ok(())
            }
        }
    }

    /// One value per cell, in canonical order.
    pub fn cell_metric(&self, space: &dyn Space) -> Result<Vec<f64>, SpaceError> {
        self.validate(space)?;
        Ok(match *self {
            Self::Cartesian => vec![1.0; space.cell_count()],
            Self::Axisymmetric {
                radial_axis,
                origin,
                spacing,
            } => space
                .canonical_ordering()
                .iter()
                .map(|coord| origin + (coord[radial_axis] as f64 + 0.5) * spacing)
                .collect(),
        })
    }

    /// One value per face, in [`FaceLayout`] order.
    pub fn face_metric(&self, space: &dyn Space) -> Result<Vec<f64>, SpaceError> {
        self.validate(space)?;
        let faces = FaceLayout::new(space);
        Ok(match *self {
            Self::Cartesian => vec![1.0; faces.len()],
            Self::Axisymmetric {
                radial_axis,
                origin,
                spacing,
            } => {
                let coords = space.canonical_ordering();
                faces
                    .iter()
                    .map(|face| {
                        let k = coords[face.cell][radial_axis] as f64;
                        // Faces normal to the radial axis sit on a cell edge;
                        // the others sit at the cell-centre radius.
                        let r = match (face.axis == radial_axis, face.side) {
                            (true, FaceSide::Lower) => origin + k * spacing,
                            (true, FaceSide::Upper) => origin + (k + 1.0) * spacing,
                            (false, _) => origin + (k + 0.5) * spacing,
                        };
                        r.max(FACE_METRIC_FLOOR)
                    })
                    .collect()
            }
        })
    }
}
