use itertools::Itertools;

use crate::misc::FloatingPoint;

use super::QuadratureRule;

/// A curve parameter paired with its integration weight
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IntegrationPoint<T> {
    parameter: T,
    weight: T,
}

impl<T: Copy> IntegrationPoint<T> {
    pub fn new(parameter: T, weight: T) -> Self {
        Self { parameter, weight }
    }

    pub fn parameter(&self) -> T {
        self.parameter
    }

    pub fn weight(&self) -> T {
        self.weight
    }
}

/// Create integration points over consecutive spans.
/// Each span `[a, b]` receives the canonical rule mapped from `[-1, 1]`
/// with weights scaled by the half length of the span.
/// Zero-length spans contribute nothing, so the result is ordered by increasing parameter.
///
/// # Example
/// ```
/// use brep_curve::prelude::*;
/// let points = create_integration_points_1d(&[0., 0.5, 2.], 2, &GaussLegendreRule).unwrap();
/// assert_eq!(points.len(), 4);
/// let sum: f64 = points.iter().map(|p| p.weight()).sum();
/// assert!((sum - 2.).abs() < 1e-12);
/// ```
pub fn create_integration_points_1d<T: FloatingPoint, R: QuadratureRule + ?Sized>(
    spans: &[T],
    points_per_span: usize,
    rule: &R,
) -> anyhow::Result<Vec<IntegrationPoint<T>>> {
    let canonical: Vec<(T, T)> = rule
        .nodes_and_weights(points_per_span)?
        .into_iter()
        .map(|(node, weight)| (nalgebra::convert(node), nalgebra::convert(weight)))
        .collect();

    let half: T = nalgebra::convert(0.5);
    let points = spans
        .iter()
        .tuple_windows()
        .filter(|(a, b)| **b > **a)
        .flat_map(|(a, b)| {
            let jacobian = (*b - *a) * half;
            canonical.iter().map(move |(node, weight)| {
                IntegrationPoint::new(*a + (*node + T::one()) * jacobian, *weight * jacobian)
            })
        })
        .collect();

    Ok(points)
}
