use crate::misc::FloatingPoint;

/// A closed parameter range `[t0, t1]` with `t0 <= t1`.
/// Bounds the parametrization of a curve and delimits integration spans.
/// A zero-length interval is a valid empty state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParametricInterval<T> {
    t0: T,
    t1: T,
}

impl<T: FloatingPoint> ParametricInterval<T> {
    /// Create a new interval
    /// # Failures
    /// - if either bound is not finite
    /// - if `t0 > t1`
    ///
    /// # Example
    /// ```
    /// use brep_curve::prelude::*;
    /// let interval = ParametricInterval::try_new(0.25, 0.75).unwrap();
    /// assert_eq!(interval.length(), 0.5);
    /// assert!(ParametricInterval::try_new(1., 0.).is_err());
    /// ```
    pub fn try_new(t0: T, t1: T) -> anyhow::Result<Self> {
        anyhow::ensure!(
            t0.is_finite() && t1.is_finite(),
            "Interval bounds must be finite, got [{}, {}]",
            t0,
            t1
        );
        anyhow::ensure!(
            t0 <= t1,
            "Interval bounds must be ordered, got [{}, {}]",
            t0,
            t1
        );
        Ok(Self { t0, t1 })
    }

    /// Create an interval from two bounds in any order
    pub fn from_unordered(a: T, b: T) -> Self {
        Self {
            t0: a.min(b),
            t1: a.max(b),
        }
    }

    pub fn t0(&self) -> T {
        self.t0
    }

    pub fn t1(&self) -> T {
        self.t1
    }

    pub fn bounds(&self) -> (T, T) {
        (self.t0, self.t1)
    }

    pub fn length(&self) -> T {
        self.t1 - self.t0
    }

    /// Zero-length interval
    pub fn is_empty(&self) -> bool {
        self.t0 == self.t1
    }

    pub fn contains(&self, t: T) -> bool {
        self.t0 <= t && t <= self.t1
    }

    /// Snap a parameter to the nearest bound if it lies outside
    pub fn clamp(&self, t: T) -> T {
        t.clamp(self.t0, self.t1)
    }

    /// Check if this interval lies inside `other` up to `tolerance`
    pub fn is_subset_of(&self, other: &Self, tolerance: T) -> bool {
        self.t0 >= other.t0 - tolerance && self.t1 <= other.t1 + tolerance
    }

    /// Map a parameter into `[0, 1]` relative to this interval.
    /// A zero-length interval maps everything to zero.
    pub fn normalized_at(&self, t: T) -> T {
        let length = self.length();
        if length == T::zero() {
            T::zero()
        } else {
            (t - self.t0) / length
        }
    }

    /// Inverse of [`ParametricInterval::normalized_at`]
    pub fn parameter_at_normalized(&self, s: T) -> T {
        self.t0 + self.length() * s
    }
}
