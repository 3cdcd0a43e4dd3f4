//! Function combinators: pointwise sum/product, powers, and composition.
//!
//! Combinators take `Arc<dyn Function>` operands so composed trees can be
//! shared freely (the pipeline ships functions across threads). Domains
//! combine conservatively: pointwise operators intersect their operands'
//! domains, `power` inherits its base's domain, and `compose` reports the
//! inner function's domain (the outer function is assumed total on the
//! inner's range, which holds for every combination this crate builds).

use std::sync::Arc;

use super::Function;

/// Pointwise sum `f(x) + g(x)`.
pub fn sum(f: Arc<dyn Function>, g: Arc<dyn Function>) -> Arc<dyn Function> {
    Arc::new(Sum { f, g })
}

/// Pointwise product `f(x) * g(x)`.
pub fn mult(f: Arc<dyn Function>, g: Arc<dyn Function>) -> Arc<dyn Function> {
    Arc::new(Mult { f, g })
}

/// Power `f(x)^p`.
pub fn power(f: Arc<dyn Function>, p: f64) -> Arc<dyn Function> {
    Arc::new(Power { f, p })
}

/// Composition `outer(inner(x))`.
pub fn compose(outer: Arc<dyn Function>, inner: Arc<dyn Function>) -> Arc<dyn Function> {
    Arc::new(Composition { outer, inner })
}

fn intersect(a: (f64, f64), b: (f64, f64)) -> (f64, f64) {
    (a.0.max(b.0), a.1.min(b.1))
}

struct Sum {
    f: Arc<dyn Function>,
    g: Arc<dyn Function>,
}

impl Function for Sum {
    fn value(&self, x: f64) -> f64 {
        self.f.value(x) + self.g.value(x)
    }

    fn domain(&self) -> (f64, f64) {
        intersect(self.f.domain(), self.g.domain())
    }
}

struct Mult {
    f: Arc<dyn Function>,
    g: Arc<dyn Function>,
}

impl Function for Mult {
    fn value(&self, x: f64) -> f64 {
        self.f.value(x) * self.g.value(x)
    }

    fn domain(&self) -> (f64, f64) {
        intersect(self.f.domain(), self.g.domain())
    }
}

struct Power {
    f: Arc<dyn Function>,
    p: f64,
}

impl Function for Power {
    fn value(&self, x: f64) -> f64 {
        self.f.value(x).powf(self.p)
    }

    fn domain(&self) -> (f64, f64) {
        self.f.domain()
    }
}

struct Composition {
    outer: Arc<dyn Function>,
    inner: Arc<dyn Function>,
}

impl Function for Composition {
    fn value(&self, x: f64) -> f64 {
        self.outer.value(self.inner.value(x))
    }

    fn domain(&self) -> (f64, f64) {
        self.inner.domain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::basic::{Constant, Cos, Identity, Log, Sin};

    #[test]
    fn sum_of_squares_is_one() {
        // sin^2 + cos^2 == 1, the classic smoke test for combinators.
        let s = power(Arc::new(Sin), 2.0);
        let c = power(Arc::new(Cos), 2.0);
        let one = sum(s, c);
        for i in 0..64 {
            let x = i as f64 * 0.1;
            assert!((one.value(x) - 1.0).abs() < 1e-12, "at x={x}");
        }
    }

    #[test]
    fn mult_by_constant_scales() {
        let scaled = mult(Arc::new(Identity), Arc::new(Constant(3.0)));
        assert_eq!(scaled.value(2.0), 6.0);
    }

    #[test]
    fn compose_applies_outer_to_inner() {
        // ln(e^... ) is overkill; exp(ln x) == x on (0, inf) is enough.
        let id_on_positive = compose(Arc::new(crate::functions::basic::Exp), Arc::new(Log::natural()));
        for x in [0.5, 1.0, 7.25] {
            assert!((id_on_positive.value(x) - x).abs() < 1e-12);
        }
    }

    #[test]
    fn domains_intersect() {
        let f = sum(Arc::new(Log::natural()), Arc::new(Sin));
        let (left, right) = f.domain();
        assert!(left > 0.0);
        assert_eq!(right, f64::INFINITY);
    }
}
