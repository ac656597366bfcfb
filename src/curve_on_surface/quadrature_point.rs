use std::sync::{Arc, Weak};

use nalgebra::{Point3, Vector3};

use crate::{
    curve::{CurveShapeFunction, NurbsCurve2D},
    misc::FloatingPoint,
    quadrature::IntegrationPoint,
    surface::NurbsSurface3D,
};

use super::BrepCurveOnSurface;

/// An integration point of a brep curve on surface enriched with the data needed for assembly:
/// the position in 3D space, the tangent of the composed map and the shape functions of the embedded curve.
///
/// The parent link is weak, so quadrature points never keep their curve alive.
pub struct QuadraturePoint<T: FloatingPoint, C = NurbsCurve2D<T>, S = NurbsSurface3D<T>> {
    integration_point: IntegrationPoint<T>,
    position: Point3<T>,
    tangent: Vector3<T>,
    shape_functions: CurveShapeFunction<T>,
    parent: Weak<BrepCurveOnSurface<T, C, S>>,
}

impl<T: FloatingPoint, C, S> QuadraturePoint<T, C, S> {
    pub fn new(
        integration_point: IntegrationPoint<T>,
        position: Point3<T>,
        tangent: Vector3<T>,
        shape_functions: CurveShapeFunction<T>,
        parent: Weak<BrepCurveOnSurface<T, C, S>>,
    ) -> Self {
        Self {
            integration_point,
            position,
            tangent,
            shape_functions,
            parent,
        }
    }

    pub fn integration_point(&self) -> &IntegrationPoint<T> {
        &self.integration_point
    }

    pub fn parameter(&self) -> T {
        self.integration_point.parameter()
    }

    pub fn weight(&self) -> T {
        self.integration_point.weight()
    }

    pub fn position(&self) -> &Point3<T> {
        &self.position
    }

    /// Derivative of the composed map with respect to the curve parameter,
    /// independent of the orientation flag of the parent
    pub fn tangent(&self) -> &Vector3<T> {
        &self.tangent
    }

    pub fn determinant_of_jacobian(&self) -> T {
        self.tangent.norm()
    }

    pub fn shape_functions(&self) -> &CurveShapeFunction<T> {
        &self.shape_functions
    }

    /// The brep curve that produced this point, if it is still alive
    pub fn parent(&self) -> Option<Arc<BrepCurveOnSurface<T, C, S>>> {
        self.parent.upgrade()
    }
}

impl<T: FloatingPoint, C, S> Clone for QuadraturePoint<T, C, S> {
    fn clone(&self) -> Self {
        Self {
            integration_point: self.integration_point,
            position: self.position,
            tangent: self.tangent,
            shape_functions: self.shape_functions.clone(),
            parent: Weak::clone(&self.parent),
        }
    }
}

impl<T: FloatingPoint, C, S> std::fmt::Debug for QuadraturePoint<T, C, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuadraturePoint")
            .field("integration_point", &self.integration_point)
            .field("position", &self.position)
            .field("tangent", &self.tangent)
            .field("shape_functions", &self.shape_functions)
            .finish_non_exhaustive()
    }
}
