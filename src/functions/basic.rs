//! Elementary functions: trig, exponential, logarithm, and two stubs
//! (`Constant`, `Identity`) that tests lean on because their integrals are
//! known exactly.

use super::Function;

/// `sin(x)` over the whole real line.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sin;

impl Function for Sin {
    fn value(&self, x: f64) -> f64 {
        x.sin()
    }
}

/// `cos(x)` over the whole real line.
#[derive(Clone, Copy, Debug, Default)]
pub struct Cos;

impl Function for Cos {
    fn value(&self, x: f64) -> f64 {
        x.cos()
    }
}

/// `e^x` over the whole real line.
#[derive(Clone, Copy, Debug, Default)]
pub struct Exp;

impl Function for Exp {
    fn value(&self, x: f64) -> f64 {
        x.exp()
    }
}

/// Logarithm with an arbitrary base, domain `(0, +inf)`.
///
/// The domain's left edge is reported as `f64::MIN_POSITIVE` rather than `0`
/// so that an interval touching zero is rejected by the evaluator instead of
/// producing `-inf` at the left endpoint.
#[derive(Clone, Copy, Debug)]
pub struct Log {
    ln_base: f64,
}

impl Log {
    /// Create a logarithm with the given base.
    ///
    /// # Panics
    ///
    /// Panics if `base <= 0` or `base == 1` (not a valid logarithm base).
    pub fn new(base: f64) -> Self {
        assert!(
            base > 0.0 && base != 1.0,
            "logarithm base must be positive and != 1, got {base}"
        );
        Self {
            ln_base: base.ln(),
        }
    }

    /// Natural logarithm (`base = e`).
    pub fn natural() -> Self {
        Self { ln_base: 1.0 }
    }
}

impl Function for Log {
    fn value(&self, x: f64) -> f64 {
        x.ln() / self.ln_base
    }

    fn domain(&self) -> (f64, f64) {
        (f64::MIN_POSITIVE, f64::INFINITY)
    }
}

/// Constant function `f(x) = c`.
#[derive(Clone, Copy, Debug)]
pub struct Constant(pub f64);

impl Function for Constant {
    fn value(&self, _x: f64) -> f64 {
        self.0
    }
}

/// Identity function `f(x) = x`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Identity;

impl Function for Identity {
    fn value(&self, x: f64) -> f64 {
        x
    }
}
