//! The midpoint-rule integrator.
//!
//! Every axis is split into `steps` equal parts and the integrand is sampled
//! once at the center of each of the `steps^n` grid cells. The rule is second
//! order accurate for smooth integrands, but the number of evaluations grows
//! exponentially with the dimension, so it only pays off for small `n`.

use rayon::prelude::*;
use tracing::{debug, trace};
use wide::f64x4;

use crate::bounds::Bounds;
use crate::error::{Error, Result};
use crate::integrand::{FnIntegrand, Integrand, SimdIntegrand};

/// Number of subdivisions per axis used when the caller has no preference.
pub const DEFAULT_STEPS: usize = 10;

/// The midpoint-rule integrator over a uniform grid.
#[derive(Debug, Clone)]
pub struct Midpoint {
    /// The number of subdivisions of every axis.
    steps: usize,
    /// The integration domain.
    bounds: Bounds,
    /// The cell width along each axis, `(upper - lower) / steps`.
    deltas: Vec<f64>,
    /// The volume of one grid cell, the product of `deltas`.
    cell_volume: f64,
}

impl Midpoint {
    /// Creates a new midpoint-rule integrator.
    ///
    /// # Arguments
    ///
    /// * `steps`: The number of subdivisions of every axis. Must be at least 1.
    /// * `boundaries`: A slice of `(min, max)` tuples defining the integration domain for each dimension.
    pub fn new(steps: usize, boundaries: &[(f64, f64)]) -> Result<Self> {
        if steps == 0 {
            return Err(Error::InvalidArgument(
                "step count must be at least 1".to_string(),
            ));
        }
        let bounds = Bounds::new(boundaries)?;

        let deltas: Vec<f64> = (0..bounds.dim())
            .map(|d| bounds.width(d) / steps as f64)
            .collect();
        let mut cell_volume = 1.0;
        for delta in &deltas {
            cell_volume *= delta;
        }

        Ok(Midpoint {
            steps,
            bounds,
            deltas,
            cell_volume,
        })
    }

    /// Returns the number of dimensions of the integrator.
    pub fn dim(&self) -> usize {
        self.bounds.dim()
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// The volume element `dV` every cell contributes with.
    pub fn cell_volume(&self) -> f64 {
        self.cell_volume
    }

    /// The number of grid cells, `steps^n`, or `None` if it overflows `usize`.
    pub fn n_points(&self) -> Option<usize> {
        let exp = u32::try_from(self.dim()).ok()?;
        self.steps.checked_pow(exp)
    }

    /// Integrates the given function with the midpoint rule.
    ///
    /// Cells are visited in lexicographic order of their indices, dimension 0
    /// varying slowest, and partial sums are formed per dimension exactly as
    /// nested loops would form them. The result is reproducible bit-for-bit.
    ///
    /// # Examples
    ///
    /// ```
    /// use ndint::integrand::FnIntegrand;
    /// use ndint::midpoint::Midpoint;
    ///
    /// let integrand = FnIntegrand::new(2, |x: &[f64]| x[0] * x[1]);
    /// let midpoint = Midpoint::new(20, &[(0.0, 1.0), (0.0, 2.0)]).unwrap();
    /// let value = midpoint.integrate(&integrand).unwrap();
    ///
    /// assert!((value - 1.0).abs() < 1e-12);
    /// ```
    pub fn integrate<F: Integrand + ?Sized>(&self, integrand: &F) -> Result<f64> {
        self.check_dim(integrand.dim())?;

        let mut point = vec![0.0; self.dim()];
        let sum = self.sum_cells(integrand, 0, &mut point);

        Ok(self.finish(sum))
    }

    /// Integrates the given function with the midpoint rule in parallel.
    ///
    /// The grid is split into `steps` slabs along dimension 0, one rayon task
    /// each. Slab sums are combined in slab order, so the result is identical
    /// to the one of [`Midpoint::integrate`].
    pub fn integrate_par<F: Integrand + Sync + ?Sized>(&self, integrand: &F) -> Result<f64> {
        self.check_dim(integrand.dim())?;

        if self.dim() == 0 {
            return self.integrate(integrand);
        }

        let slab_sums: Vec<f64> = (0..self.steps)
            .into_par_iter()
            .map(|i| {
                trace!(slab = i, "summing midpoint slab");
                let mut point = vec![0.0; self.dim()];
                point[0] = self.coordinate(0, i);
                self.sum_cells(integrand, 1, &mut point)
            })
            .collect();

        let mut sum = 0.0;
        for slab_sum in slab_sums {
            sum += slab_sum;
        }

        Ok(self.finish(sum))
    }

    /// Integrates the given function with the midpoint rule using SIMD.
    ///
    /// Cells are packed four at a time in the same order as
    /// [`Midpoint::integrate`]. When `steps^n` is not a multiple of four, the
    /// last packet repeats its final cell and the extra lanes are discarded.
    /// Sums are accumulated per lane, so the result can differ from the scalar
    /// one in the last bits.
    pub fn integrate_simd<F: SimdIntegrand + ?Sized>(&self, integrand: &F) -> Result<f64> {
        self.check_dim(integrand.dim())?;

        let dim = self.dim();
        let mut point: Vec<f64> = (0..dim).map(|d| self.coordinate(d, 0)).collect();
        let mut odometer = Odometer::new(0, dim);
        let mut lanes = vec![[0.0; 4]; dim];
        let mut packet = vec![f64x4::splat(0.0); dim];

        let mut sum_v = f64x4::splat(0.0);
        let mut sum_tail = 0.0;
        let mut exhausted = false;

        while !exhausted {
            let mut filled = 0;
            while filled < 4 && !exhausted {
                for d in 0..dim {
                    lanes[d][filled] = point[d];
                }
                filled += 1;
                exhausted = odometer.advance(self, &mut point).is_none();
            }

            for d in 0..dim {
                let last = lanes[d][filled - 1];
                for lane in filled..4 {
                    lanes[d][lane] = last;
                }
                packet[d] = f64x4::from(lanes[d]);
            }

            let values = integrand.eval_simd(&packet);
            if filled == 4 {
                sum_v += values;
            } else {
                for value in &values.to_array()[..filled] {
                    sum_tail += value;
                }
            }
        }

        Ok(self.finish(sum_v.reduce_add() + sum_tail))
    }

    fn finish(&self, sum: f64) -> f64 {
        let value = sum * self.cell_volume;
        debug!(
            dim = self.dim(),
            steps = self.steps,
            n_points = ?self.n_points(),
            value,
            "midpoint integration finished"
        );
        value
    }

    fn check_dim(&self, integrand_dim: usize) -> Result<()> {
        if integrand_dim != self.dim() {
            return Err(Error::InvalidArgument(format!(
                "integrand dimension {integrand_dim} does not match the {} dimensions of the bounds",
                self.dim()
            )));
        }
        Ok(())
    }

    /// The center of cell `i` along dimension `d`.
    fn coordinate(&self, d: usize, i: usize) -> f64 {
        self.bounds.lower(d) + (i as f64 + 0.5) * self.deltas[d]
    }

    /// Sums the integrand over every cell whose coordinates in dimensions
    /// `..start` are already fixed in `point`.
    ///
    /// `partials[d]` is the running sum of the loop over dimension `d`. When
    /// the odometer wraps dimension `d`, that loop is complete and its sum
    /// moves into `partials[d - 1]`.
    fn sum_cells<F: Integrand + ?Sized>(
        &self,
        integrand: &F,
        start: usize,
        point: &mut [f64],
    ) -> f64 {
        let dim = self.dim();
        if start == dim {
            return integrand.eval(point);
        }

        for d in start..dim {
            point[d] = self.coordinate(d, 0);
        }
        let mut odometer = Odometer::new(start, dim);
        let mut partials = vec![0.0; dim];

        loop {
            partials[dim - 1] += integrand.eval(point);
            match odometer.advance(self, point) {
                Some(d) => fold_partials(&mut partials, d + 1),
                None => {
                    fold_partials(&mut partials, start + 1);
                    return partials[start];
                }
            }
        }
    }
}

/// Folds the completed loops `from..` into their enclosing loops, innermost first.
fn fold_partials(partials: &mut [f64], from: usize) {
    for d in (from..partials.len()).rev() {
        partials[d - 1] += partials[d];
        partials[d] = 0.0;
    }
}

/// A mixed-radix counter over the cell indices of dimensions `start..`,
/// the last dimension running fastest.
#[derive(Debug)]
struct Odometer {
    start: usize,
    indices: Vec<usize>,
}

impl Odometer {
    fn new(start: usize, dim: usize) -> Self {
        Odometer {
            start,
            indices: vec![0; dim],
        }
    }

    /// Moves `point` to the next cell. Returns the dimension whose index was
    /// incremented, every later dimension having wrapped back to zero, or
    /// `None` once all cells have been visited.
    fn advance(&mut self, grid: &Midpoint, point: &mut [f64]) -> Option<usize> {
        for d in (self.start..self.indices.len()).rev() {
            self.indices[d] += 1;
            if self.indices[d] < grid.steps {
                point[d] = grid.coordinate(d, self.indices[d]);
                return Some(d);
            }
            self.indices[d] = 0;
            point[d] = grid.coordinate(d, 0);
        }
        None
    }
}

/// Integrates `integrand` over `bounds` with the midpoint rule and `steps`
/// subdivisions per axis.
///
/// Fails with [`Error::InvalidArgument`] if `steps` is zero or a bound pair is
/// malformed.
///
/// ```
/// use ndint::integrate_deterministic;
///
/// let f = |x: &[f64]| x.iter().map(|xi| xi * xi).sum::<f64>();
/// let value = integrate_deterministic(f, &[(0.0, 1.0); 3], 50).unwrap();
/// assert!((value - 1.0).abs() < 1e-3);
/// ```
pub fn integrate_deterministic<F>(integrand: F, bounds: &[(f64, f64)], steps: usize) -> Result<f64>
where
    F: Fn(&[f64]) -> f64,
{
    let midpoint = Midpoint::new(steps, bounds)?;
    midpoint.integrate(&FnIntegrand::new(bounds.len(), integrand))
}
