//! The `Integrand` trait, which defines the function to be integrated.

use wide::f64x4;

/// A trait representing a function to be integrated.
///
/// Implementations must be pure: the integrators call `eval` any number of
/// times, in any order, and from several threads for the parallel entry points.
pub trait Integrand {
    /// Returns the number of dimensions of the integration space.
    fn dim(&self) -> usize;

    /// Evaluates the function at a given point `x`.
    ///
    /// # Arguments
    ///
    /// * `x`: A slice of `f64` of length `dim()`, the point in the integration space.
    ///
    /// # Returns
    ///
    /// The value of the function `f(x)`.
    fn eval(&self, x: &[f64]) -> f64;
}

/// A trait representing a function to be integrated using SIMD.
pub trait SimdIntegrand {
    /// Returns the number of dimensions of the integration space.
    fn dim(&self) -> usize;

    /// Evaluates the function on a packet of 4 points.
    ///
    /// `points[d]` holds coordinate `d` of the four points, one per lane.
    fn eval_simd(&self, points: &[f64x4]) -> f64x4;
}

/// Adapts a closure taking the coordinates as a slice into an [`Integrand`].
///
/// ```
/// use ndint::integrand::{FnIntegrand, Integrand};
///
/// let f = FnIntegrand::new(2, |x: &[f64]| x[0] * x[1]);
/// assert_eq!(f.dim(), 2);
/// assert_eq!(f.eval(&[2.0, 3.0]), 6.0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FnIntegrand<F> {
    dim: usize,
    func: F,
}

impl<F> FnIntegrand<F>
where
    F: Fn(&[f64]) -> f64,
{
    pub fn new(dim: usize, func: F) -> Self {
        FnIntegrand { dim, func }
    }
}

impl<F> Integrand for FnIntegrand<F>
where
    F: Fn(&[f64]) -> f64,
{
    fn dim(&self) -> usize {
        self.dim
    }

    fn eval(&self, x: &[f64]) -> f64 {
        (self.func)(x)
    }
}
