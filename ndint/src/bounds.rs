//! The integration domain, an axis-aligned box.

use crate::error::{Error, Result};

/// Per-dimension `(lower, upper)` limits of the integration domain.
///
/// Every pair satisfies `lower <= upper` and both limits are finite. A pair
/// with `lower == upper` is a zero-width axis, which makes the box volume zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Bounds {
    limits: Vec<(f64, f64)>,
}

impl Bounds {
    /// Validates `boundaries` and builds the box.
    ///
    /// An empty slice is accepted and describes the zero-dimensional box,
    /// whose volume is `1.0`.
    pub fn new(boundaries: &[(f64, f64)]) -> Result<Self> {
        for (d, &(lower, upper)) in boundaries.iter().enumerate() {
            if !lower.is_finite() || !upper.is_finite() {
                return Err(Error::InvalidArgument(format!(
                    "bounds of dimension {d} are not finite: ({lower}, {upper})"
                )));
            }
            if lower > upper {
                return Err(Error::InvalidArgument(format!(
                    "lower bound exceeds upper bound in dimension {d}: ({lower}, {upper})"
                )));
            }
        }

        Ok(Bounds {
            limits: boundaries.to_vec(),
        })
    }

    /// The unit hypercube `[0, 1]^dim`.
    pub fn unit_cube(dim: usize) -> Self {
        Bounds {
            limits: vec![(0.0, 1.0); dim],
        }
    }

    pub fn dim(&self) -> usize {
        self.limits.len()
    }

    pub fn lower(&self, d: usize) -> f64 {
        self.limits[d].0
    }

    pub fn upper(&self, d: usize) -> f64 {
        self.limits[d].1
    }

    pub fn width(&self, d: usize) -> f64 {
        let (lower, upper) = self.limits[d];
        upper - lower
    }

    /// Product of the axis widths, multiplied in dimension order.
    pub fn volume(&self) -> f64 {
        let mut volume = 1.0;
        for &(lower, upper) in &self.limits {
            volume *= upper - lower;
        }
        volume
    }

    pub fn as_slice(&self) -> &[(f64, f64)] {
        &self.limits
    }
}
