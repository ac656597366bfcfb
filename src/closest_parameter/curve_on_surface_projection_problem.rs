use argmin::core::{Gradient, Hessian};
use nalgebra::Point3;

use crate::{
    curve::CurveEvaluator, curve_on_surface::CurveOnSurface, misc::FloatingPoint,
    surface::SurfaceEvaluator,
};

/// Gradient & Hessian provider for finding the closest parameter on a curve-on-surface to a given point.
pub struct CurveOnSurfaceProjectionProblem<'a, T: FloatingPoint, C, S> {
    /// The point to find the closest parameter to.
    point: &'a Point3<T>,
    /// The composed map to find the closest parameter on.
    curve: &'a CurveOnSurface<T, C, S>,
}

impl<'a, T: FloatingPoint, C, S> CurveOnSurfaceProjectionProblem<'a, T, C, S> {
    pub fn new(point: &'a Point3<T>, curve: &'a CurveOnSurface<T, C, S>) -> Self {
        CurveOnSurfaceProjectionProblem { point, curve }
    }
}

impl<T, C, S> Gradient for CurveOnSurfaceProjectionProblem<'_, T, C, S>
where
    T: FloatingPoint,
    C: CurveEvaluator<T>,
    S: SurfaceEvaluator<T>,
{
    type Param = T;
    type Gradient = T;

    /// C'(u) * ( C(u) - P )
    fn gradient(&self, param: &Self::Param) -> Result<Self::Gradient, anyhow::Error> {
        let e = self.curve.global_space_derivatives(*param, 1);
        let d = e[0] - self.point.coords;
        Ok(e[1].dot(&d))
    }
}

impl<T, C, S> Hessian for CurveOnSurfaceProjectionProblem<'_, T, C, S>
where
    T: FloatingPoint,
    C: CurveEvaluator<T>,
    S: SurfaceEvaluator<T>,
{
    type Param = T;
    type Hessian = T;

    /// C"(u) * ( C(u) - p ) + C'(u) * C'(u)
    fn hessian(&self, param: &Self::Param) -> Result<Self::Hessian, anyhow::Error> {
        let e = self.curve.global_space_derivatives(*param, 2);
        let d = e[0] - self.point.coords;
        Ok(e[2].dot(&d) + e[1].dot(&e[1]))
    }
}
