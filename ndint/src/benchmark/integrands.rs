//! Standard test integrands with closed-form integrals.
//!
//! The Genz families are defined on the unit hypercube `[0, 1]^dim`.
//! [`SumOfSquares`] works on any box.
use crate::bounds::Bounds;
use crate::integrand::{Integrand, SimdIntegrand};
use wide::f64x4;

use libm::erf;
use std::f64::consts::PI;

/// Returns the parameters for the Genz test functions.
///
/// Both are irrational-looking but reproducible; `c` stays in `[0.5, 1.5)` so
/// none of the closed forms divide by zero.
fn genz_params(dim: usize) -> (Vec<f64>, Vec<f64>) {
    let mut c = Vec::with_capacity(dim);
    let mut w = Vec::with_capacity(dim);
    for i in 1..=dim {
        let s = (i as f64 + 1.).sqrt();
        c.push(0.5 + (s * 12345.).fract());
        w.push((s * 54321.).fract());
    }
    (c, w)
}

// Sum of squares, f(x) = sum_i x_i^2
#[derive(Clone, Debug)]
pub struct SumOfSquares {
    bounds: Vec<(f64, f64)>,
}

impl SumOfSquares {
    /// Creates the integrand for the box `bounds`. Only the closed form
    /// depends on the box; evaluation accepts any point of matching dimension.
    pub fn new(bounds: &[(f64, f64)]) -> Self {
        Self {
            bounds: bounds.to_vec(),
        }
    }

    pub fn unit_cube(dim: usize) -> Self {
        Self::new(Bounds::unit_cube(dim).as_slice())
    }

    /// `sum_i (b_i^3 - a_i^3) / 3 * prod_{j != i} (b_j - a_j)`
    pub fn analytical_result(&self) -> f64 {
        let mut result = 0.0;
        for (i, &(a, b)) in self.bounds.iter().enumerate() {
            let mut term = (b.powi(3) - a.powi(3)) / 3.;
            for (j, &(aj, bj)) in self.bounds.iter().enumerate() {
                if j != i {
                    term *= bj - aj;
                }
            }
            result += term;
        }
        result
    }
}

impl Integrand for SumOfSquares {
    fn dim(&self) -> usize {
        self.bounds.len()
    }

    fn eval(&self, x: &[f64]) -> f64 {
        x.iter().map(|xi| xi * xi).sum()
    }
}

impl SimdIntegrand for SumOfSquares {
    fn dim(&self) -> usize {
        self.bounds.len()
    }

    fn eval_simd(&self, x: &[f64x4]) -> f64x4 {
        let mut sum = f64x4::splat(0.);
        for &xi in x {
            sum += xi * xi;
        }
        sum
    }
}

// Genz Oscillatory
#[derive(Clone, Debug)]
pub struct GenzOscillatory {
    dim: usize,
    c: Vec<f64>,
    w: Vec<f64>,
    c_simd: Vec<f64x4>,
    w_simd: Vec<f64x4>,
}

impl GenzOscillatory {
    pub fn new(dim: usize) -> Self {
        let (c, w) = genz_params(dim);
        let c_simd = c.iter().map(|&val| f64x4::splat(val)).collect();
        let w_simd = w.iter().map(|&val| f64x4::splat(val)).collect();
        Self {
            dim,
            c,
            w,
            c_simd,
            w_simd,
        }
    }

    /// Real part of `prod_i (e^{i c_i (1 - w_i)} - e^{-i c_i w_i}) / (i c_i)`.
    pub fn analytical_result(&self) -> f64 {
        let (mut re, mut im) = (1.0, 0.0);
        for i in 0..self.dim {
            let (c, w) = (self.c[i], self.w[i]);
            let a_re = (c * (1. - w)).cos() - (c * w).cos();
            let a_im = (c * (1. - w)).sin() + (c * w).sin();
            // (a_re + i a_im) / (i c)
            let (f_re, f_im) = (a_im / c, -a_re / c);
            (re, im) = (re * f_re - im * f_im, re * f_im + im * f_re);
        }
        re
    }
}

impl Integrand for GenzOscillatory {
    fn dim(&self) -> usize {
        self.dim
    }

    fn eval(&self, x: &[f64]) -> f64 {
        let mut sum = 0.;
        for i in 0..self.dim {
            sum += self.c[i] * (x[i] - self.w[i]);
        }
        sum.cos()
    }
}

impl SimdIntegrand for GenzOscillatory {
    fn dim(&self) -> usize {
        self.dim
    }

    fn eval_simd(&self, x: &[f64x4]) -> f64x4 {
        let mut sum = f64x4::splat(0.);
        for i in 0..self.dim {
            sum += self.c_simd[i] * (x[i] - self.w_simd[i]);
        }
        sum.cos()
    }
}

// Genz Product Peak
#[derive(Clone, Debug)]
pub struct GenzProductPeak {
    dim: usize,
    c: Vec<f64>,
    w: Vec<f64>,
    c_simd: Vec<f64x4>,
    w_simd: Vec<f64x4>,
}

impl GenzProductPeak {
    pub fn new(dim: usize) -> Self {
        let (c, w) = genz_params(dim);
        let c_simd = c.iter().map(|&val| f64x4::splat(val)).collect();
        let w_simd = w.iter().map(|&val| f64x4::splat(val)).collect();
        Self {
            dim,
            c,
            w,
            c_simd,
            w_simd,
        }
    }

    pub fn analytical_result(&self) -> f64 {
        let mut result = 1.0;
        for i in 0..self.dim {
            let (c, w) = (self.c[i], self.w[i]);
            result *= c * ((c * (1. - w)).atan() + (c * w).atan());
        }
        result
    }
}

impl Integrand for GenzProductPeak {
    fn dim(&self) -> usize {
        self.dim
    }

    fn eval(&self, x: &[f64]) -> f64 {
        let mut result = 1.0;
        for i in 0..self.dim {
            let u = x[i] - self.w[i];
            result *= 1.0 / (1.0 / (self.c[i] * self.c[i]) + u * u);
        }
        result
    }
}

impl SimdIntegrand for GenzProductPeak {
    fn dim(&self) -> usize {
        self.dim
    }

    fn eval_simd(&self, x: &[f64x4]) -> f64x4 {
        let one = f64x4::splat(1.0);
        let mut result = one;
        for i in 0..self.dim {
            let u = x[i] - self.w_simd[i];
            result *= one / (one / (self.c_simd[i] * self.c_simd[i]) + u * u);
        }
        result
    }
}

// Genz Gaussian
#[derive(Clone, Debug)]
pub struct GenzGaussian {
    dim: usize,
    c: Vec<f64>,
    w: Vec<f64>,
    c_simd: Vec<f64x4>,
    w_simd: Vec<f64x4>,
}

impl GenzGaussian {
    pub fn new(dim: usize) -> Self {
        let (c, w) = genz_params(dim);
        let c_simd = c.iter().map(|&val| f64x4::splat(val)).collect();
        let w_simd = w.iter().map(|&val| f64x4::splat(val)).collect();
        Self {
            dim,
            c,
            w,
            c_simd,
            w_simd,
        }
    }

    pub fn analytical_result(&self) -> f64 {
        let mut result = 1.0;
        for i in 0..self.dim {
            let (c, w) = (self.c[i], self.w[i]);
            result *= (PI.sqrt() / (2. * c)) * (erf(c * (1. - w)) + erf(c * w));
        }
        result
    }
}

impl Integrand for GenzGaussian {
    fn dim(&self) -> usize {
        self.dim
    }

    fn eval(&self, x: &[f64]) -> f64 {
        let mut sum = 0.0;
        for i in 0..self.dim {
            sum += self.c[i].powi(2) * (x[i] - self.w[i]).powi(2);
        }
        (-sum).exp()
    }
}

impl SimdIntegrand for GenzGaussian {
    fn dim(&self) -> usize {
        self.dim
    }

    fn eval_simd(&self, x: &[f64x4]) -> f64x4 {
        let mut sum = f64x4::splat(0.0);
        for i in 0..self.dim {
            let u = self.c_simd[i] * (x[i] - self.w_simd[i]);
            sum += u * u;
        }
        (-sum).exp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midpoint::Midpoint;

    #[test]
    fn test_sum_of_squares_closed_form() {
        assert!((SumOfSquares::unit_cube(3).analytical_result() - 1.0).abs() < 1e-15);
        // x^2 + y^2 over [0, 2] x [-1, 1]: 8/3 * 2 + 2/3 * 2
        let f = SumOfSquares::new(&[(0.0, 2.0), (-1.0, 1.0)]);
        assert!((f.analytical_result() - 20. / 3.).abs() < 1e-12);
        assert_eq!(SumOfSquares::new(&[]).analytical_result(), 0.0);
    }

    #[test]
    fn test_genz_closed_forms() {
        let midpoint = Midpoint::new(200, &[(0.0, 1.0); 2]).unwrap();

        let oscillatory = GenzOscillatory::new(2);
        let value = midpoint.integrate(&oscillatory).unwrap();
        assert!(
            (value - oscillatory.analytical_result()).abs() < 1e-4,
            "Analytical={} vs. midpoint={}",
            oscillatory.analytical_result(),
            value
        );

        let peak = GenzProductPeak::new(2);
        let value = midpoint.integrate(&peak).unwrap();
        assert!(
            (value - peak.analytical_result()).abs() < 1e-4,
            "Analytical={} vs. midpoint={}",
            peak.analytical_result(),
            value
        );

        let gaussian = GenzGaussian::new(2);
        let value = midpoint.integrate(&gaussian).unwrap();
        assert!(
            (value - gaussian.analytical_result()).abs() < 1e-4,
            "Analytical={} vs. midpoint={}",
            gaussian.analytical_result(),
            value
        );
    }

    #[test]
    fn test_simd_agrees_with_scalar() {
        let x = [0.1, 0.7, 0.35];
        let packet: Vec<f64x4> = x.iter().map(|&xi| f64x4::splat(xi)).collect();

        let oscillatory = GenzOscillatory::new(3);
        let peak = GenzProductPeak::new(3);
        let gaussian = GenzGaussian::new(3);
        let squares = SumOfSquares::unit_cube(3);

        let pairs = [
            (oscillatory.eval(&x), oscillatory.eval_simd(&packet)),
            (peak.eval(&x), peak.eval_simd(&packet)),
            (gaussian.eval(&x), gaussian.eval_simd(&packet)),
            (squares.eval(&x), squares.eval_simd(&packet)),
        ];
        for (scalar, simd) in pairs {
            for lane in simd.to_array() {
                assert!((scalar - lane).abs() < 1e-12, "{scalar} vs. {lane}");
            }
        }
    }
}
