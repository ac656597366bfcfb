use nalgebra::{Point2, Vector2};

use crate::{interval::ParametricInterval, misc::FloatingPoint};

use super::{CurveShapeFunction, NurbsCurve, NurbsCurve2D};

/// Evaluator of a curve living in the 2D parameter domain of a surface.
/// The curve-on-surface kernel only talks to embedded curves through this trait.
pub trait CurveEvaluator<T: FloatingPoint> {
    /// Surface coordinates at the curve parameter `u`
    fn position(&self, u: T) -> Point2<T>;

    /// Position followed by the derivatives up to `order`
    fn derivatives(&self, u: T, order: usize) -> Vec<Vector2<T>>;

    fn polynomial_degree(&self) -> usize;

    /// Parameters where the polynomial piece changes, including both ends of the domain
    fn breakpoints(&self) -> Vec<T>;

    /// Full untrimmed parameter range
    fn natural_domain(&self) -> ParametricInterval<T>;

    /// Shape functions of the curve's own basis and their derivatives up to `order`
    fn shape_functions(&self, u: T, order: usize) -> CurveShapeFunction<T>;
}

impl<T: FloatingPoint> CurveEvaluator<T> for NurbsCurve2D<T> {
    fn position(&self, u: T) -> Point2<T> {
        self.point_at(u)
    }

    fn derivatives(&self, u: T, order: usize) -> Vec<Vector2<T>> {
        self.rational_derivatives(u, order)
    }

    fn polynomial_degree(&self) -> usize {
        self.degree()
    }

    fn breakpoints(&self) -> Vec<T> {
        NurbsCurve::breakpoints(self)
    }

    fn natural_domain(&self) -> ParametricInterval<T> {
        let (start, end) = self.knots_domain();
        ParametricInterval::from_unordered(start, end)
    }

    fn shape_functions(&self, u: T, order: usize) -> CurveShapeFunction<T> {
        NurbsCurve::shape_functions(self, u, order)
    }
}
