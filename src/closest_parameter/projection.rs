use nalgebra::{Point3, Scalar};

/// Outcome of projecting a point onto a curve.
/// Non-convergence is a regular outcome: `parameter` and `point` then hold the last iterate.
#[derive(Clone, Debug, PartialEq)]
pub struct Projection<T: Scalar> {
    converged: bool,
    parameter: T,
    point: Point3<T>,
}

impl<T: Scalar + Copy> Projection<T> {
    pub fn new(converged: bool, parameter: T, point: Point3<T>) -> Self {
        Self {
            converged,
            parameter,
            point,
        }
    }

    pub fn is_converged(&self) -> bool {
        self.converged
    }

    pub fn parameter(&self) -> T {
        self.parameter
    }

    pub fn point(&self) -> &Point3<T> {
        &self.point
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::Point3;

    use super::Projection;

    #[test]
    fn copies_compare_equal() {
        let projection = Projection::new(true, 0.25_f64, Point3::new(0.25, 1., 0.));
        let copy = projection.clone();
        assert_eq!(copy, projection);
        assert!(copy.is_converged());
        assert_eq!(copy.parameter(), 0.25);
        assert_eq!(*copy.point(), Point3::new(0.25, 1., 0.));

        let stalled = Projection::new(false, 0.25_f64, Point3::new(0.25, 1., 0.));
        assert_ne!(stalled, projection);
        assert!(format!("{:?}", stalled).contains("converged: false"));
    }
}
