use std::ops::Range;

/// Non-vanishing rational basis functions of a curve at one parameter,
/// together with their derivatives.
/// Row `k` holds the `k`th derivative; column `j` belongs to control point `first + j`.
#[derive(Clone, Debug, PartialEq)]
pub struct CurveShapeFunction<T> {
    first: usize,
    values: Vec<Vec<T>>,
}

impl<T: Copy> CurveShapeFunction<T> {
    pub fn new(first: usize, values: Vec<Vec<T>>) -> Self {
        Self { first, values }
    }

    /// Highest derivative order stored
    pub fn derivative_order(&self) -> usize {
        self.values.len().saturating_sub(1)
    }

    /// Number of non-vanishing shape functions
    pub fn len(&self) -> usize {
        self.values.first().map(|row| row.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Indices of the control points with non-vanishing shape functions
    pub fn control_point_indices(&self) -> Range<usize> {
        self.first..(self.first + self.len())
    }

    /// Shape function values
    pub fn values(&self) -> &[T] {
        self.derivatives(0)
    }

    /// `k`th derivatives of the shape functions
    /// # Panics
    /// if `k` exceeds [`CurveShapeFunction::derivative_order`]
    pub fn derivatives(&self, k: usize) -> &[T] {
        &self.values[k]
    }

    pub fn get(&self, derivative: usize, index: usize) -> Option<T> {
        self.values
            .get(derivative)
            .and_then(|row| row.get(index))
            .copied()
    }
}
