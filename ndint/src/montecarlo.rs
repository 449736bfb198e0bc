//! The plain Monte Carlo integrator.
//!
//! Points are drawn uniformly from the integration box and the integral is
//! estimated as the sample mean times the box volume. The statistical error
//! falls as `1/sqrt(n_samples)` whatever the dimension.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use rayon::prelude::*;
use tracing::{debug, trace};
use wide::f64x4;

use crate::bounds::Bounds;
use crate::error::{Error, Result};
use crate::integrand::{FnIntegrand, Integrand, SimdIntegrand};

/// Number of samples used when the caller has no preference.
pub const DEFAULT_SAMPLES: usize = 100_000;

/// Samples per rayon task in [`MonteCarlo::integrate_par`].
const CHUNK_SIZE: usize = 4096;

/// Stores the result of a Monte Carlo integration.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    /// The estimated value of the integral.
    pub value: f64,
    /// The estimated statistical error (one standard deviation).
    pub error: f64,
}

/// Running sums over a batch of integrand values.
#[derive(Debug, Clone, Copy, Default)]
struct SampleSums {
    n: usize,
    sum_f: f64,
    sum_f2: f64,
}

impl SampleSums {
    fn add(&mut self, f_val: f64) {
        self.n += 1;
        self.sum_f += f_val;
        self.sum_f2 += f_val * f_val;
    }

    fn merge(mut self, other: SampleSums) -> SampleSums {
        self.n += other.n;
        self.sum_f += other.sum_f;
        self.sum_f2 += other.sum_f2;
        self
    }

    fn estimate(&self, volume: f64) -> Estimate {
        let n = self.n as f64;
        let avg_f = self.sum_f / n;
        let avg_f2 = self.sum_f2 / n;

        let error = if self.n > 1 {
            let variance = (avg_f2 - avg_f * avg_f).max(0.0) / (self.n - 1) as f64;
            volume.abs() * variance.sqrt()
        } else {
            0.0
        };

        Estimate {
            value: volume * avg_f,
            error,
        }
    }
}

/// The plain Monte Carlo integrator.
pub struct MonteCarlo {
    /// The number of integrand evaluations.
    n_samples: usize,
    /// The integration domain.
    bounds: Bounds,
    /// The random number generator.
    rng: Pcg64,
}

impl MonteCarlo {
    /// Creates a new Monte Carlo integrator seeded from system entropy.
    ///
    /// # Arguments
    ///
    /// * `n_samples`: The number of integrand evaluations. Must be at least 1.
    /// * `boundaries`: A slice of `(min, max)` tuples defining the integration domain for each dimension.
    pub fn new(n_samples: usize, boundaries: &[(f64, f64)]) -> Result<Self> {
        check_samples(n_samples)?;
        let bounds = Bounds::new(boundaries)?;

        Ok(MonteCarlo {
            n_samples,
            bounds,
            rng: Pcg64::from_entropy(),
        })
    }

    /// Sets the seed for the random number generator.
    ///
    /// # Arguments
    ///
    /// * `seed`: The seed to use.
    pub fn set_seed(&mut self, seed: u64) {
        self.rng = Pcg64::seed_from_u64(seed);
    }

    /// Returns the number of dimensions of the integrator.
    pub fn dim(&self) -> usize {
        self.bounds.dim()
    }

    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// Integrates the given function by uniform sampling.
    ///
    /// Each sample takes one draw per dimension, in dimension order, and maps
    /// it to `[lower, upper)`. Repeated calls continue the random stream.
    ///
    /// # Examples
    ///
    /// ```
    /// use ndint::integrand::FnIntegrand;
    /// use ndint::montecarlo::MonteCarlo;
    ///
    /// let integrand = FnIntegrand::new(2, |x: &[f64]| (-(x[0].powi(2)) - x[1].powi(2)).exp());
    /// let mut mc = MonteCarlo::new(100_000, &[(-1.0, 1.0), (-1.0, 1.0)]).unwrap();
    /// mc.set_seed(1234);
    /// let result = mc.integrate(&integrand).unwrap();
    ///
    /// // The analytical result is approx. 2.230985
    /// assert!((result.value - 2.230985).abs() < 5. * result.error);
    /// ```
    pub fn integrate<F: Integrand + ?Sized>(&mut self, integrand: &F) -> Result<Estimate> {
        self.check_dim(integrand.dim())?;

        let sums = sample_sums(integrand, &self.bounds, self.n_samples, &mut self.rng);

        Ok(self.finish(sums))
    }

    /// Integrates the given function by uniform sampling in parallel.
    ///
    /// The samples are split into fixed-size chunks. Every chunk gets its own
    /// generator, seeded from this integrator's generator, and the chunk sums
    /// are combined in chunk order. For a given seed the result therefore does
    /// not depend on the number of threads, though it differs from the one of
    /// [`MonteCarlo::integrate`].
    pub fn integrate_par<F: Integrand + Sync + ?Sized>(
        &mut self,
        integrand: &F,
    ) -> Result<Estimate> {
        self.check_dim(integrand.dim())?;

        let n_samples = self.n_samples;
        let n_chunks = (n_samples + CHUNK_SIZE - 1) / CHUNK_SIZE;
        let seeds: Vec<u64> = (0..n_chunks).map(|_| self.rng.gen()).collect();

        let bounds = &self.bounds;
        let chunk_sums: Vec<SampleSums> = seeds
            .into_par_iter()
            .enumerate()
            .map(|(chunk, seed)| {
                let mut thread_rng = Pcg64::seed_from_u64(seed);
                let len = CHUNK_SIZE.min(n_samples - chunk * CHUNK_SIZE);
                trace!(chunk, len, "sampling monte carlo chunk");
                sample_sums(integrand, bounds, len, &mut thread_rng)
            })
            .collect();

        let sums = chunk_sums
            .into_iter()
            .fold(SampleSums::default(), SampleSums::merge);

        Ok(self.finish(sums))
    }

    /// Integrates the given function by uniform sampling using SIMD.
    ///
    /// Samples are drawn in the same order as in [`MonteCarlo::integrate`] and
    /// evaluated four at a time. A trailing partial packet is padded with the
    /// lower corner of the box and the extra lanes are discarded, so for the
    /// same seed both methods agree up to the rounding of `eval_simd`.
    pub fn integrate_simd<F: SimdIntegrand + ?Sized>(&mut self, integrand: &F) -> Result<Estimate> {
        self.check_dim(integrand.dim())?;

        let dim = self.dim();
        let mut point = vec![0.0; dim];
        let mut lanes = vec![[0.0; 4]; dim];
        let mut packet = vec![f64x4::splat(0.0); dim];
        let mut sums = SampleSums::default();

        let mut remaining = self.n_samples;
        while remaining > 0 {
            let filled = remaining.min(4);
            for lane in 0..4 {
                if lane < filled {
                    draw_point(&self.bounds, &mut self.rng, &mut point);
                } else {
                    for (d, x) in point.iter_mut().enumerate() {
                        *x = self.bounds.lower(d);
                    }
                }
                for d in 0..dim {
                    lanes[d][lane] = point[d];
                }
            }
            for d in 0..dim {
                packet[d] = f64x4::from(lanes[d]);
            }

            let f_vals = integrand.eval_simd(&packet).to_array();
            for &f_val in &f_vals[..filled] {
                sums.add(f_val);
            }
            remaining -= filled;
        }

        Ok(self.finish(sums))
    }

    fn finish(&self, sums: SampleSums) -> Estimate {
        let estimate = sums.estimate(self.bounds.volume());
        debug!(
            dim = self.dim(),
            n_samples = self.n_samples,
            value = estimate.value,
            error = estimate.error,
            "monte carlo integration finished"
        );
        estimate
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
}

fn check_samples(n_samples: usize) -> Result<()> {
    if n_samples == 0 {
        return Err(Error::InvalidArgument(
            "sample count must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// Fills `point` with one uniform draw per dimension, `lower + u * width`
/// with `u` in `[0, 1)`. A zero-width axis always yields its lower bound.
fn draw_point<R: Rng + ?Sized>(bounds: &Bounds, rng: &mut R, point: &mut [f64]) {
    for (d, x) in point.iter_mut().enumerate() {
        let u: f64 = rng.gen();
        *x = bounds.lower(d) + u * bounds.width(d);
    }
}

fn sample_sums<F, R>(integrand: &F, bounds: &Bounds, n_samples: usize, rng: &mut R) -> SampleSums
where
    F: Integrand + ?Sized,
    R: Rng + ?Sized,
{
    let mut point = vec![0.0; bounds.dim()];
    let mut sums = SampleSums::default();
    for _ in 0..n_samples {
        draw_point(bounds, rng, &mut point);
        sums.add(integrand.eval(&point));
    }
    sums
}

/// Estimates the integral of `integrand` over `bounds` from `num_samples`
/// uniform samples.
///
/// With `rng_seed` set the result is reproducible; without it the generator is
/// seeded from system entropy. Fails with [`Error::InvalidArgument`] if
/// `num_samples` is zero or a bound pair is malformed.
///
/// ```
/// use ndint::integrate_stochastic;
///
/// let f = |x: &[f64]| x.iter().map(|xi| xi * xi).sum::<f64>();
/// let value = integrate_stochastic(f, &[(0.0, 1.0); 3], 100_000, Some(7)).unwrap();
/// assert!((value - 1.0).abs() < 0.05);
/// ```
pub fn integrate_stochastic<F>(
    integrand: F,
    bounds: &[(f64, f64)],
    num_samples: usize,
    rng_seed: Option<u64>,
) -> Result<f64>
where
    F: Fn(&[f64]) -> f64,
{
    let mut mc = MonteCarlo::new(num_samples, bounds)?;
    if let Some(seed) = rng_seed {
        mc.set_seed(seed);
    }
    let estimate = mc.integrate(&FnIntegrand::new(bounds.len(), integrand))?;
    Ok(estimate.value)
}

/// Like [`integrate_stochastic`], but draws from a generator owned by the
/// caller and also reports the statistical error.
///
/// With `rng = Pcg64::seed_from_u64(seed)` the draws, and so the result, are
/// the same as those of a [`MonteCarlo`] seeded with `seed`.
pub fn integrate_stochastic_with_rng<F, R>(
    integrand: F,
    bounds: &[(f64, f64)],
    num_samples: usize,
    rng: &mut R,
) -> Result<Estimate>
where
    F: Fn(&[f64]) -> f64,
    R: Rng + ?Sized,
{
    check_samples(num_samples)?;
    let bounds = Bounds::new(bounds)?;

    let integrand = FnIntegrand::new(bounds.dim(), integrand);
    let sums = sample_sums(&integrand, &bounds, num_samples, rng);

    Ok(sums.estimate(bounds.volume()))
}
