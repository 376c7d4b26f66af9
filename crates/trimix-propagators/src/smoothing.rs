//! Fixed-weight interface smoothing.
//!
//! Each output cell is a weighted average of the input over the cell and
//! its full Moore neighbourhood. An offset with `nnz` non-zero components
//! weighs `2^(ndim - nnz)` and the weights sum to `4^ndim`:
//!
//! ```text
//! 2-D            3-D (middle layer)
//! 1 2 1          2 4 2
//! 2 4 2  / 16    4 8 4  / 64
//! 1 2 1          2 4 2
//! ```
//!
//! At absorbing edges the missing points are dropped and the remaining
//! weights renormalised, so a constant field stays constant everywhere.

use smallvec::SmallVec;

use crate::error::BuildError;
use crate::grid_helpers::{check_len, fill_field};
use trimix_core::{FieldId, FieldSet, Prolongation, PropagatorError};
use trimix_propagator::{Phase, Propagator, StepContext, WriteMode};

/// One stencil point: offset (first `ndim` components used) and weight.
type Tap = ([i32; 3], f64);

/// Post-advection propagator smoothing fraction fields.
///
/// ```
/// use trimix_core::FieldId;
/// use trimix_propagators::InterfaceSmoothing;
///
/// let prop = InterfaceSmoothing::builder()
///     .ndim(2)
///     .pair(FieldId(0), FieldId(2))
///     .pair(FieldId(1), FieldId(3))
///     .build()
///     .unwrap();
/// assert_eq!(prop.divisor(), 16.0);
/// ```
#[derive(Debug)]
pub struct InterfaceSmoothing {
    pairs: Vec<(FieldId, FieldId)>,
    ndim: usize,
    taps: Vec<Tap>,
}

/// Builder for [`InterfaceSmoothing`].
pub struct InterfaceSmoothingBuilder {
    pairs: Vec<(FieldId, FieldId)>,
    ndim: Option<u32>,
}

impl InterfaceSmoothing {
    /// Create a new builder.
    pub fn builder() -> InterfaceSmoothingBuilder {
        InterfaceSmoothingBuilder {
            pairs: Vec::new(),
            ndim: None,
        }
    }

    /// Sum of all stencil weights, `4^ndim`.
    pub fn divisor(&self) -> f64 {
        self.taps.iter().map(|(_, w)| w).sum()
    }

    /// The `(input, output)` pairs, in declaration order.
    pub fn pairs(&self) -> &[(FieldId, FieldId)] {
        &self.pairs
    }

    fn smooth_at(&self, space: &dyn trimix_space::Space, input: &[f64], rank: usize) -> f64 {
        let mut acc = 0.0;
        let mut used = 0.0;
        for (offset, weight) in &self.taps {
            if let Some(r) = space.offset_rank(rank, &offset[..self.ndim]) {
                acc += weight * input[r];
                used += weight;
            }
        }
        // The centre tap always resolves, so `used` is never zero.
        acc / used
    }
}

impl InterfaceSmoothingBuilder {
    /// Lattice dimensionality, 2 or 3.
    pub fn ndim(mut self, ndim: u32) -> Self {
        self.ndim = Some(ndim);
        self
    }

    /// Smooth `input` into `output`. May be called repeatedly.
    pub fn pair(mut self, input: FieldId, output: FieldId) -> Self {
        self.pairs.push((input, output));
        self
    }

    /// Build the propagator and its stencil.
    pub fn build(self) -> Result<InterfaceSmoothing, BuildError> {
        let ndim = self.ndim.ok_or(BuildError::MissingField { field: "ndim" })?;
        if !(2..=3).contains(&ndim) {
            return Err(BuildError::UnsupportedDimension { ndim });
        }
        if self.pairs.is_empty() {
            return Err(BuildError::MissingField { field: "pair" });
        }
        if let Some(&(field, _)) = self.pairs.iter().find(|(i, o)| i == o) {
            return Err(BuildError::AliasedPair { field });
        }
        Ok(InterfaceSmoothing {
            pairs: self.pairs,
            ndim: ndim as usize,
            taps: stencil(ndim as usize),
        })
    }
}

/// Every offset in `{-1, 0, 1}^ndim` with weight `2^(ndim - nnz)`.
fn stencil(ndim: usize) -> Vec<Tap> {
    let mut taps: SmallVec<[Tap; 27]> = SmallVec::new();
    let count = 3usize.pow(ndim as u32);
    for code in 0..count {
        let mut offset = [0i32; 3];
        let mut rest = code;
        let mut nnz = 0;
        for slot in offset.iter_mut().take(ndim) {
            *slot = (rest % 3) as i32 - 1;
            rest /= 3;
            if *slot != 0 {
                nnz += 1;
            }
        }
        taps.push((offset, f64::from(1u32 << (ndim - nnz))));
    }
    taps.into_vec()
}

impl Propagator for InterfaceSmoothing {
    fn name(&self) -> &str {
        "interface_smoothing"
    }

    fn phase(&self) -> Phase {
        Phase::PostAdvection
    }

    fn reads(&self) -> FieldSet {
        self.pairs.iter().map(|&(input, _)| input).collect()
    }

    fn writes(&self) -> Vec<(FieldId, WriteMode)> {
        self.pairs
            .iter()
            .map(|&(_, output)| (output, WriteMode::Full))
            .collect()
    }

    fn step(&self, ctx: &mut StepContext<'_>) -> Result<(), PropagatorError> {
        let space = ctx.space();
        if space.ndim() != self.ndim {
            return Err(PropagatorError::failed(format!(
                "smoothing stencil is {}-D but the space is {}-D",
                self.ndim,
                space.ndim()
            )));
        }
        let n = space.cell_count();
        for &(input, output) in &self.pairs {
            let data = ctx.read_field(input)?;
            check_len(input, data, n)?;
            fill_field(ctx, self.name(), output, n, |rank| {
                self.smooth_at(space, data, rank)
            })?;
            let hints = ctx.hints();
            hints.set_prolongation(output, Prolongation::Bilinear);
            hints.mark_dirty(output);
        }
        tracing::trace!(step = %ctx.step_id(), pairs = self.pairs.len(), "interface smoothing");
        Ok(())
    }
}
