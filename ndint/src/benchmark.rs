//! Integrands with known integrals, for tests, benchmarks and the comparison driver.

pub mod integrands;
