use crate::misc::FloatingPoint;

/// Hyperparameters for projecting a point onto a trimmed curve.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectionOptions<T: FloatingPoint> {
    /// Largest Newton step, in parameter units, still counted as converged.
    pub tolerance: T,
    /// Maximum number of iterations for the Newton method.
    pub max_iters: u64,
    /// Number of chords per polynomial span sampled to pick the initial guess.
    pub samples_per_span: usize,
}

impl<T: FloatingPoint> Default for ProjectionOptions<T> {
    fn default() -> Self {
        Self {
            // Newton converges quadratically, so a step of sqrt(eps) leaves an error near eps
            tolerance: T::default_epsilon().sqrt(),
            max_iters: 20,
            samples_per_span: 8,
        }
    }
}

impl<T: FloatingPoint> ProjectionOptions<T> {
    pub fn with_tolerance(mut self, tolerance: T) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_max_iters(mut self, max_iters: u64) -> Self {
        self.max_iters = max_iters;
        self
    }

    pub fn with_samples_per_span(mut self, samples_per_span: usize) -> Self {
        self.samples_per_span = samples_per_span;
        self
    }
}
