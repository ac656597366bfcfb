/// Options for generating integration points on a curve.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IntegrationOptions {
    /// Number of quadrature points per polynomial span.
    /// `None` uses `degree + 1`, the smallest Gauss rule exact for the curve's polynomial degree.
    pub points_per_span: Option<usize>,
}

impl IntegrationOptions {
    pub fn with_points_per_span(mut self, points_per_span: usize) -> Self {
        self.points_per_span = Some(points_per_span);
        self
    }

    /// Resolve the number of points per span for a curve of the given degree
    pub fn points_per_span(&self, degree: usize) -> usize {
        self.points_per_span.unwrap_or(degree + 1)
    }
}
