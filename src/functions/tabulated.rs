//! Array-backed tabulated functions with linear interpolation.
//!
//! A [`TabulatedFunction`] is a sorted sequence of `(x, y)` sample points.
//! Between adjacent samples it interpolates linearly; outside its sampled
//! interval it evaluates to `NaN` (its declared domain is exactly the
//! sampled interval, so the integration evaluator never asks).

use std::fmt;

use super::Function;

/// Slack applied when checking tabulation bounds against a function's
/// declared domain, so that e.g. tabulating `[0, pi]` on a domain computed
/// as `[0, 3.14159...]` is not rejected for a one-ulp overshoot.
const DOMAIN_EPSILON: f64 = 1e-10;

/// One sample point of a tabulated function.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FunctionPoint {
    pub x: f64,
    pub y: f64,
}

/// A function defined by a sorted array of sample points.
///
/// # Invariants
///
/// - At least two points.
/// - `x` coordinates strictly increasing.
///
/// Both are checked at construction; every other method may assume them.
#[derive(Clone, Debug, PartialEq)]
pub struct TabulatedFunction {
    points: Vec<FunctionPoint>,
}

/// Errors from constructing or tabulating a [`TabulatedFunction`].
#[derive(Debug)]
#[non_exhaustive]
pub enum TabulateError {
    /// Fewer than two sample points requested or supplied.
    TooFewPoints { count: usize },
    /// Sample `x` coordinates are not strictly increasing.
    UnorderedPoints { index: usize },
    /// Tabulation interval is empty or inverted.
    InvalidInterval { left: f64, right: f64 },
    /// Tabulation interval is not contained in the function's domain.
    OutOfDomain {
        left: f64,
        right: f64,
        domain_left: f64,
        domain_right: f64,
    },
}

impl fmt::Display for TabulateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFewPoints { count } => {
                write!(f, "tabulation needs at least 2 points, got {count}")
            }
            Self::UnorderedPoints { index } => {
                write!(f, "sample x coordinates not strictly increasing at index {index}")
            }
            Self::InvalidInterval { left, right } => {
                write!(f, "invalid tabulation interval [{left}, {right}]")
            }
            Self::OutOfDomain {
                left,
                right,
                domain_left,
                domain_right,
            } => write!(
                f,
                "tabulation interval [{left}, {right}] outside function domain \
                 [{domain_left}, {domain_right}]"
            ),
        }
    }
}

impl std::error::Error for TabulateError {}

impl TabulatedFunction {
    /// Build a tabulated function from raw sample points.
    ///
    /// Points must already be sorted by strictly increasing `x`.
    pub fn from_points(points: Vec<FunctionPoint>) -> Result<Self, TabulateError> {
        if points.len() < 2 {
            return Err(TabulateError::TooFewPoints {
                count: points.len(),
            });
        }
        for i in 1..points.len() {
            if points[i].x <= points[i - 1].x {
                return Err(TabulateError::UnorderedPoints { index: i });
            }
        }
        Ok(Self { points })
    }

    /// Number of sample points.
    #[inline]
    pub fn points_count(&self) -> usize {
        self.points.len()
    }

    /// `x` coordinate of sample `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of range.
    #[inline]
    pub fn point_x(&self, i: usize) -> f64 {
        self.points[i].x
    }

    /// `y` coordinate of sample `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of range.
    #[inline]
    pub fn point_y(&self, i: usize) -> f64 {
        self.points[i].y
    }

    /// Replace the `y` value of sample `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of range.
    #[inline]
    pub fn set_point_y(&mut self, i: usize, y: f64) {
        self.points[i].y = y;
    }

    /// All sample points, in `x` order.
    #[inline]
    pub fn points(&self) -> &[FunctionPoint] {
        &self.points
    }

    /// Left edge of the sampled interval.
    #[inline]
    pub fn left_bound(&self) -> f64 {
        self.points[0].x
    }

    /// Right edge of the sampled interval.
    #[inline]
    pub fn right_bound(&self) -> f64 {
        self.points[self.points.len() - 1].x
    }
}

impl Function for TabulatedFunction {
    /// Linear interpolation between the two samples bracketing `x`.
    ///
    /// Exactly at a sample, returns that sample's `y`. Outside the sampled
    /// interval, returns `NaN`.
    fn value(&self, x: f64) -> f64 {
        if x < self.left_bound() || x > self.right_bound() {
            return f64::NAN;
        }
        // partition_point finds the first sample with sample.x > x, so the
        // bracketing segment is [idx-1, idx].
        let idx = self.points.partition_point(|p| p.x <= x);
        if idx == 0 {
            return self.points[0].y;
        }
        if idx == self.points.len() {
            return self.points[idx - 1].y;
        }
        let lo = self.points[idx - 1];
        let hi = self.points[idx];
        let t = (x - lo.x) / (hi.x - lo.x);
        lo.y + t * (hi.y - lo.y)
    }

    fn domain(&self) -> (f64, f64) {
        (self.left_bound(), self.right_bound())
    }
}

/// Sample `function` at `points_count` evenly spaced points on `[left, right]`.
///
/// The endpoints are always sampled exactly. Fails if the interval is empty,
/// lies outside `function`'s domain (with a small epsilon slack), or fewer
/// than two points are requested.
pub fn tabulate<F: Function + ?Sized>(
    function: &F,
    left: f64,
    right: f64,
    points_count: usize,
) -> Result<TabulatedFunction, TabulateError> {
    if points_count < 2 {
        return Err(TabulateError::TooFewPoints {
            count: points_count,
        });
    }
    if !(right > left) {
        return Err(TabulateError::InvalidInterval { left, right });
    }
    let (domain_left, domain_right) = function.domain();
    if left < domain_left - DOMAIN_EPSILON || right > domain_right + DOMAIN_EPSILON {
        return Err(TabulateError::OutOfDomain {
            left,
            right,
            domain_left,
            domain_right,
        });
    }

    let step = (right - left) / (points_count - 1) as f64;
    let mut points = Vec::with_capacity(points_count);
    for i in 0..points_count {
        // Pin the last sample to `right` so fp drift cannot push it outside.
        let x = if i == points_count - 1 {
            right
        } else {
            left + i as f64 * step
        };
        points.push(FunctionPoint {
            x,
            y: function.value(x),
        });
    }
    Ok(TabulatedFunction { points })
}
