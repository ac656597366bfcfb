use nalgebra::{Point3, Vector3};

use crate::{interval::ParametricInterval, misc::FloatingPoint};

use super::{NurbsSurface, NurbsSurface3D, SurfaceDirection};

/// Evaluator of a parametric surface in 3D space.
/// The curve-on-surface kernel only talks to surfaces through this trait.
pub trait SurfaceEvaluator<T: FloatingPoint> {
    fn position(&self, s: T, t: T) -> Point3<T>;

    /// Triangular table of partial derivatives:
    /// `[k][l]` is differentiated `k` times in s and `l` times in t, for `k + l <= order`.
    /// `[0][0]` is the position.
    fn derivatives(&self, s: T, t: T, order: usize) -> Vec<Vec<Vector3<T>>>;

    fn polynomial_degree(&self, direction: SurfaceDirection) -> usize;

    /// Parameters where the polynomial piece changes in the given direction
    fn breakpoints(&self, direction: SurfaceDirection) -> Vec<T>;

    fn domain(&self, direction: SurfaceDirection) -> ParametricInterval<T>;
}

impl<T: FloatingPoint> SurfaceEvaluator<T> for NurbsSurface3D<T> {
    fn position(&self, s: T, t: T) -> Point3<T> {
        self.point_at(s, t)
    }

    fn derivatives(&self, s: T, t: T, order: usize) -> Vec<Vec<Vector3<T>>> {
        self.rational_derivatives(s, t, order)
    }

    fn polynomial_degree(&self, direction: SurfaceDirection) -> usize {
        self.degree(direction)
    }

    fn breakpoints(&self, direction: SurfaceDirection) -> Vec<T> {
        NurbsSurface::breakpoints(self, direction)
    }

    fn domain(&self, direction: SurfaceDirection) -> ParametricInterval<T> {
        let (start, end) = match direction {
            SurfaceDirection::U => self.u_knots_domain(),
            SurfaceDirection::V => self.v_knots_domain(),
        };
        ParametricInterval::from_unordered(start, end)
    }
}
