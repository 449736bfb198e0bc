//! The C-language interface for `ndint`

use std::ffi::c_void;
use std::os::raw::c_int;
use std::slice;

use ndint::integrand::Integrand;
use ndint::midpoint::Midpoint;
use ndint::montecarlo::MonteCarlo;
use ndint::Estimate;
use tracing::warn;

/// The call succeeded.
pub const NDINT_OK: c_int = 0;
/// A step count, sample count or boundary was rejected.
pub const NDINT_INVALID_ARGUMENT: c_int = 1;
/// A required pointer was null.
pub const NDINT_NULL_POINTER: c_int = 2;

/// A C-compatible struct for integration boundaries.
#[repr(C)]
pub struct NdintBoundary {
    pub min: f64,
    pub max: f64,
}

/// The C-style integrand function pointer.
/// The first argument is the point `x` (an array of f64).
/// The second argument is the dimension.
/// The third is a user-provided `user_data` pointer.
pub type NdintIntegrand = extern "C" fn(*const f64, c_int, *mut c_void) -> f64;

/// A wrapper that implements the Rust `Integrand` trait.
struct CIntegrandWrapper {
    dim: usize,
    func: NdintIntegrand,
    user_data: *mut c_void,
}

impl Integrand for CIntegrandWrapper {
    fn dim(&self) -> usize {
        self.dim
    }

    fn eval(&self, x: &[f64]) -> f64 {
        (self.func)(x.as_ptr(), self.dim as c_int, self.user_data)
    }
}

/// The opaque pointer to the Monte Carlo integrator.
pub type NdintMonteCarlo = c_void;

/// Copies `dim` boundaries out of C memory. A null pointer is only accepted
/// for the zero-dimensional box.
unsafe fn boundaries_from_raw(
    dim: usize,
    boundaries: *const NdintBoundary,
) -> Option<Vec<(f64, f64)>> {
    if dim == 0 {
        return Some(Vec::new());
    }
    if boundaries.is_null() {
        return None;
    }
    let boundaries_slice = slice::from_raw_parts(boundaries, dim);
    Some(boundaries_slice.iter().map(|b| (b.min, b.max)).collect())
}

/// Integrates the given function with the midpoint rule.
///
/// Returns `NDINT_OK` and stores the value in `result` on success.
///
/// # Safety
///
/// `boundaries` must be a valid pointer to an array of `NdintBoundary`
/// of size `dim` (it may be null when `dim` is zero), and `result` must be
/// valid for writes.
#[no_mangle]
pub unsafe extern "C" fn ndint_midpoint(
    integrand: Option<NdintIntegrand>,
    user_data: *mut c_void,
    dim: usize,
    boundaries: *const NdintBoundary,
    steps: usize,
    result: *mut f64,
) -> c_int {
    let (Some(func), false) = (integrand, result.is_null()) else {
        return NDINT_NULL_POINTER;
    };
    let Some(rust_boundaries) = boundaries_from_raw(dim, boundaries) else {
        return NDINT_NULL_POINTER;
    };

    let integrand = CIntegrandWrapper {
        dim,
        func,
        user_data,
    };

    match Midpoint::new(steps, &rust_boundaries).and_then(|m| m.integrate(&integrand)) {
        Ok(value) => {
            *result = value;
            NDINT_OK
        }
        Err(err) => {
            warn!("ndint_midpoint: {err}");
            NDINT_INVALID_ARGUMENT
        }
    }
}

/// Creates a new Monte Carlo integrator, or returns null if the arguments are
/// rejected.
///
/// # Safety
///
/// `boundaries` must be a valid pointer to an array of `NdintBoundary`
/// of size `dim` (it may be null when `dim` is zero).
#[no_mangle]
pub unsafe extern "C" fn ndint_monte_carlo_new(
    n_samples: usize,
    dim: usize,
    boundaries: *const NdintBoundary,
) -> *mut NdintMonteCarlo {
    let Some(rust_boundaries) = boundaries_from_raw(dim, boundaries) else {
        return std::ptr::null_mut();
    };

    match MonteCarlo::new(n_samples, &rust_boundaries) {
        Ok(mc) => Box::into_raw(Box::new(mc)) as *mut NdintMonteCarlo,
        Err(err) => {
            warn!("ndint_monte_carlo_new: {err}");
            std::ptr::null_mut()
        }
    }
}

/// Sets the seed for the random number generator.
///
/// # Safety
///
/// `mc_ptr` must be null or a valid pointer returned by `ndint_monte_carlo_new`.
#[no_mangle]
pub unsafe extern "C" fn ndint_monte_carlo_set_seed(mc_ptr: *mut NdintMonteCarlo, seed: u64) {
    if let Some(mc) = (mc_ptr as *mut MonteCarlo).as_mut() {
        mc.set_seed(seed);
    }
}

/// Integrates the given function by uniform sampling.
///
/// # Safety
///
/// `mc_ptr` must be a valid pointer returned by `ndint_monte_carlo_new` and
/// `result` must be valid for writes.
#[no_mangle]
pub unsafe extern "C" fn ndint_monte_carlo_integrate(
    mc_ptr: *mut NdintMonteCarlo,
    integrand: Option<NdintIntegrand>,
    user_data: *mut c_void,
    result: *mut Estimate,
) -> c_int {
    let Some(mc) = (mc_ptr as *mut MonteCarlo).as_mut() else {
        return NDINT_NULL_POINTER;
    };
    let (Some(func), false) = (integrand, result.is_null()) else {
        return NDINT_NULL_POINTER;
    };

    let integrand = CIntegrandWrapper {
        dim: mc.dim(),
        func,
        user_data,
    };

    match mc.integrate(&integrand) {
        Ok(estimate) => {
            *result = estimate;
            NDINT_OK
        }
        Err(err) => {
            warn!("ndint_monte_carlo_integrate: {err}");
            NDINT_INVALID_ARGUMENT
        }
    }
}

/// Frees the memory of the Monte Carlo integrator.
///
/// # Safety
///
/// `mc_ptr` must be null or a valid pointer returned by
/// `ndint_monte_carlo_new`, and must not be used afterward.
#[no_mangle]
pub unsafe extern "C" fn ndint_monte_carlo_free(mc_ptr: *mut NdintMonteCarlo) {
    if !mc_ptr.is_null() {
        drop(Box::from_raw(mc_ptr as *mut MonteCarlo));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Sum of squares that counts its calls through `user_data`.
    extern "C" fn sum_of_squares(x: *const f64, dim: c_int, user_data: *mut c_void) -> f64 {
        let calls = unsafe { &mut *(user_data as *mut usize) };
        *calls += 1;
        let x = unsafe { slice::from_raw_parts(x, dim as usize) };
        x.iter().map(|xi| xi * xi).sum()
    }

    fn unit_cube(dim: usize) -> Vec<NdintBoundary> {
        (0..dim)
            .map(|_| NdintBoundary { min: 0.0, max: 1.0 })
            .collect()
    }

    #[test]
    fn test_midpoint() {
        let boundaries = unit_cube(3);
        let mut calls = 0usize;
        let mut value = 0.0;
        let status = unsafe {
            ndint_midpoint(
                Some(sum_of_squares),
                &mut calls as *mut usize as *mut c_void,
                3,
                boundaries.as_ptr(),
                50,
                &mut value,
            )
        };

        assert_eq!(status, NDINT_OK);
        assert_eq!(calls, 50 * 50 * 50);
        assert!((value - 1.0).abs() < 1e-3, "midpoint={value}");
    }

    #[test]
    fn test_midpoint_rejects_bad_arguments() {
        let boundaries = unit_cube(2);
        let mut calls = 0usize;
        let user_data = &mut calls as *mut usize as *mut c_void;
        let mut value = 0.0;

        let status = unsafe {
            ndint_midpoint(Some(sum_of_squares), user_data, 2, boundaries.as_ptr(), 0, &mut value)
        };
        assert_eq!(status, NDINT_INVALID_ARGUMENT);

        let status = unsafe {
            ndint_midpoint(None, user_data, 2, boundaries.as_ptr(), 4, &mut value)
        };
        assert_eq!(status, NDINT_NULL_POINTER);

        let status = unsafe {
            ndint_midpoint(Some(sum_of_squares), user_data, 2, std::ptr::null(), 4, &mut value)
        };
        assert_eq!(status, NDINT_NULL_POINTER);
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_monte_carlo() {
        let boundaries = unit_cube(3);
        let run = |seed: u64| unsafe {
            let mc = ndint_monte_carlo_new(100_000, 3, boundaries.as_ptr());
            assert!(!mc.is_null());
            ndint_monte_carlo_set_seed(mc, seed);

            let mut calls = 0usize;
            let mut estimate = Estimate {
                value: 0.0,
                error: 0.0,
            };
            let status = ndint_monte_carlo_integrate(
                mc,
                Some(sum_of_squares),
                &mut calls as *mut usize as *mut c_void,
                &mut estimate,
            );
            ndint_monte_carlo_free(mc);

            assert_eq!(status, NDINT_OK);
            assert_eq!(calls, 100_000);
            estimate
        };

        let first = run(1234);
        let second = run(1234);
        assert_eq!(first, second);
        assert!((first.value - 1.0).abs() < 0.05, "MC={}", first.value);
    }

    #[test]
    fn test_monte_carlo_rejects_bad_arguments() {
        let boundaries = unit_cube(1);
        unsafe {
            assert!(ndint_monte_carlo_new(0, 1, boundaries.as_ptr()).is_null());
            assert!(ndint_monte_carlo_new(10, 1, std::ptr::null()).is_null());

            let mut estimate = Estimate {
                value: 0.0,
                error: 0.0,
            };
            let status = ndint_monte_carlo_integrate(
                std::ptr::null_mut(),
                Some(sum_of_squares),
                std::ptr::null_mut(),
                &mut estimate,
            );
            assert_eq!(status, NDINT_NULL_POINTER);

            ndint_monte_carlo_set_seed(std::ptr::null_mut(), 1);
            ndint_monte_carlo_free(std::ptr::null_mut());
        }
    }
}
