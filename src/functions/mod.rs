//! Scalar function abstractions and the integration evaluator.
//!
//! The pipeline consumes this layer through two narrow interfaces: the
//! [`Function`] trait (value + declared domain) and [`integrate`]. Everything
//! else here — composition, tabulation, the text/binary codecs — is the
//! surrounding toolkit those interfaces come from.

pub mod basic;
pub mod compose;
pub mod io;
pub mod tabulated;

mod integrate;

pub use integrate::{integrate, IntegrationError};
pub use tabulated::{tabulate, TabulateError, TabulatedFunction};

/// A real-valued function of one real variable with a declared domain.
///
/// Implementations must be cheap to evaluate and side-effect free: the
/// integrator calls [`value`](Function::value) in a tight loop, and the
/// pipeline shares functions across threads behind `Arc<dyn Function>`.
///
/// # Domain contract
///
/// [`domain`](Function::domain) returns the closed interval `[left, right]`
/// on which `value` is meaningful. Callers that evaluate outside the domain
/// get whatever the underlying math produces (often `NaN`); the integration
/// evaluator rejects out-of-domain intervals up front instead.
pub trait Function: Send + Sync {
    /// Evaluate the function at `x`.
    fn value(&self, x: f64) -> f64;

    /// Declared domain as `(left, right)`. Defaults to the whole real line.
    fn domain(&self) -> (f64, f64) {
        (f64::NEG_INFINITY, f64::INFINITY)
    }
}

/// Blanket impl so `&f` and `Arc<f>` work wherever a `Function` is expected.
impl<F: Function + ?Sized> Function for &F {
    fn value(&self, x: f64) -> f64 {
        (**self).value(x)
    }

    fn domain(&self) -> (f64, f64) {
        (**self).domain()
    }
}

impl<F: Function + ?Sized> Function for std::sync::Arc<F> {
    fn value(&self, x: f64) -> f64 {
        (**self).value(x)
    }

    fn domain(&self) -> (f64, f64) {
        (**self).domain()
    }
}
