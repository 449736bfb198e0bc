//! `ndint` integrates functions over n-dimensional boxes.
//!
//! Two independent methods are provided: the deterministic midpoint rule on a
//! uniform grid ([`midpoint`]) and plain Monte Carlo sampling with a seedable
//! generator ([`montecarlo`]). The grid needs `steps^n` evaluations, while the
//! Monte Carlo error does not depend on the dimension, so the latter is the
//! practical choice once `n` grows.

pub mod benchmark;
pub mod bounds;
pub mod error;
pub mod integrand;
pub mod midpoint;
pub mod montecarlo;

pub use error::{Error, Result};
pub use midpoint::integrate_deterministic;
pub use montecarlo::{integrate_stochastic, integrate_stochastic_with_rng, Estimate};
