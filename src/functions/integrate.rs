//! Trapezoidal-rule integration.
//!
//! This is the evaluator the pipeline drives. It validates its arguments
//! eagerly — inverted bounds, non-positive or oversized step, interval
//! outside the function's declared domain — so worker threads can treat any
//! returned error as a per-job failure rather than a crash.

use std::fmt;

use super::Function;

/// Slack when checking the interval against the function's declared domain.
const DOMAIN_EPSILON: f64 = 1e-10;

/// Errors from [`integrate`].
///
/// All variants are argument/domain errors: they describe a bad job, not a
/// broken evaluator, and callers recover by recording them per job.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[non_exhaustive]
pub enum IntegrationError {
    /// `right <= left` (or a bound is NaN).
    InvalidBounds { left: f64, right: f64 },
    /// `step <= 0` or not finite.
    InvalidStep { step: f64 },
    /// `step` exceeds the interval length.
    StepExceedsInterval { step: f64, interval: f64 },
    /// `[left, right]` is not contained in the function's declared domain.
    OutOfDomain {
        left: f64,
        right: f64,
        domain_left: f64,
        domain_right: f64,
    },
}

impl fmt::Display for IntegrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBounds { left, right } => {
                write!(f, "invalid integration bounds [{left}, {right}]")
            }
            Self::InvalidStep { step } => write!(f, "integration step must be positive: {step}"),
            Self::StepExceedsInterval { step, interval } => {
                write!(f, "step {step} exceeds interval length {interval}")
            }
            Self::OutOfDomain {
                left,
                right,
                domain_left,
                domain_right,
            } => write!(
                f,
                "interval [{left}, {right}] outside function domain \
                 [{domain_left}, {domain_right}]"
            ),
        }
    }
}

impl std::error::Error for IntegrationError {}

/// Integrate `function` over `[left, right]` by the trapezoidal rule with
/// the given step.
///
/// The interval is walked in full steps; when its length is not an exact
/// multiple of `step`, the final partial trapezoid is evaluated so the whole
/// interval is always covered.
///
/// # Errors
///
/// - [`IntegrationError::InvalidBounds`] if `right <= left` or a bound is NaN.
/// - [`IntegrationError::InvalidStep`] if `step <= 0` or not finite.
/// - [`IntegrationError::StepExceedsInterval`] if `step > right - left`.
/// - [`IntegrationError::OutOfDomain`] if the interval is not contained in
///   `function.domain()` (with a small epsilon slack).
pub fn integrate<F: Function + ?Sized>(
    function: &F,
    left: f64,
    right: f64,
    step: f64,
) -> Result<f64, IntegrationError> {
    if !(right > left) {
        return Err(IntegrationError::InvalidBounds { left, right });
    }
    if !(step > 0.0) || !step.is_finite() {
        return Err(IntegrationError::InvalidStep { step });
    }
    let interval = right - left;
    if step > interval {
        return Err(IntegrationError::StepExceedsInterval { step, interval });
    }
    let (domain_left, domain_right) = function.domain();
    if left < domain_left - DOMAIN_EPSILON || right > domain_right + DOMAIN_EPSILON {
        return Err(IntegrationError::OutOfDomain {
            left,
            right,
            domain_left,
            domain_right,
        });
    }

    let mut acc = 0.0;
    let mut x = left;
    let mut fx = function.value(x);
    while x + step < right {
        let next = x + step;
        let fnext = function.value(next);
        acc += (fx + fnext) * 0.5 * step;
        x = next;
        fx = fnext;
    }
    // Final (possibly partial) trapezoid up to the right bound.
    acc += (fx + function.value(right)) * 0.5 * (right - x);
    Ok(acc)
}


#[cfg(all(test, feature = "pipe-proptest"))]
mod prop_tests {
    use super::*;
    use crate::functions::basic::{Constant, Identity};
    use proptest::prelude::*;

    proptest! {
        /// Constants integrate to c * (b - a) for arbitrary valid arguments.
        #[test]
        fn constant_integral_matches_area(
            c in -100.0f64..100.0,
            left in -50.0f64..50.0,
            width in 0.1f64..50.0,
            step_frac in 0.01f64..1.0,
        ) {
            let right = left + width;
            let step = width * step_frac;
            let v = integrate(&Constant(c), left, right, step).unwrap();
            let expected = c * width;
            prop_assert!((v - expected).abs() < 1e-7 * (1.0 + expected.abs()));
        }

        /// The trapezoidal rule is exact on linear functions regardless of step.
        #[test]
        fn identity_integral_is_exact(
            left in -50.0f64..50.0,
            width in 0.1f64..50.0,
            step_frac in 0.01f64..1.0,
        ) {
            let right = left + width;
            let step = width * step_frac;
            let v = integrate(&Identity, left, right, step).unwrap();
            let expected = (right * right - left * left) * 0.5;
            prop_assert!((v - expected).abs() < 1e-7 * (1.0 + expected.abs()));
        }
    }
}
