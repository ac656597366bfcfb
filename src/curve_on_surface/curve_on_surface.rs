use std::{marker::PhantomData, sync::Arc};

use nalgebra::{Point2, Point3, Vector3};

use crate::{
    curve::{CurveEvaluator, CurveShapeFunction, NurbsCurve2D},
    interval::ParametricInterval,
    misc::FloatingPoint,
    surface::{NurbsSurface3D, SurfaceEvaluator},
};

use super::{compose_derivatives, GeometryPart, GeometryParts, GeometryRole};

/// Composition of a 2D curve living in the parameter domain of a surface with that surface.
///
/// Evaluating at a curve parameter `u` evaluates the curve to get surface coordinates `(s, t)`
/// and then evaluates the surface there.
/// Both collaborators are shared, so several maps and topology entities may reference the same curve or surface.
///
/// Evaluation does not validate `u`: parameters outside the curve's natural domain are a caller error
/// and only trip a debug assertion.
#[derive(Debug)]
pub struct CurveOnSurface<T: FloatingPoint, C = NurbsCurve2D<T>, S = NurbsSurface3D<T>> {
    surface: Arc<S>,
    curve: Arc<C>,
    _marker: PhantomData<T>,
}

impl<T: FloatingPoint, C, S> Clone for CurveOnSurface<T, C, S> {
    fn clone(&self) -> Self {
        Self {
            surface: Arc::clone(&self.surface),
            curve: Arc::clone(&self.curve),
            _marker: PhantomData,
        }
    }
}

impl<T, C, S> CurveOnSurface<T, C, S>
where
    T: FloatingPoint,
    C: CurveEvaluator<T>,
    S: SurfaceEvaluator<T>,
{
    /// Create a new curve on surface
    ///
    /// # Example
    /// ```
    /// use std::sync::Arc;
    /// use brep_curve::prelude::*;
    /// use nalgebra::{Point2, Point3, Point4};
    ///
    /// let surface = NurbsSurface3D::try_new(
    ///     1,
    ///     1,
    ///     vec![0., 0., 1., 1.],
    ///     vec![0., 0., 1., 1.],
    ///     vec![
    ///         vec![Point4::new(0., 0., 0., 1.), Point4::new(0., 1., 0., 1.)],
    ///         vec![Point4::new(1., 0., 0., 1.), Point4::new(1., 1., 0., 1.)],
    ///     ],
    /// ).unwrap();
    /// let curve = NurbsCurve2D::try_polyline(&[Point2::new(0., 0.5), Point2::new(1., 0.5)]).unwrap();
    ///
    /// let curve_on_surface = CurveOnSurface::new(Arc::new(surface), Arc::new(curve));
    /// let p = curve_on_surface.global_coordinates(0.25);
    /// assert!((p - Point3::new(0.25, 0.5, 0.)).norm() < 1e-12);
    /// ```
    pub fn new(surface: Arc<S>, curve: Arc<C>) -> Self {
        Self {
            surface,
            curve,
            _marker: PhantomData,
        }
    }

    pub fn surface(&self) -> &Arc<S> {
        &self.surface
    }

    pub fn curve(&self) -> &Arc<C> {
        &self.curve
    }

    /// Full untrimmed parameter range of the embedded curve
    pub fn natural_domain(&self) -> ParametricInterval<T> {
        self.curve.natural_domain()
    }

    /// Polynomial degree of the embedded curve
    pub fn polynomial_degree(&self) -> usize {
        self.curve.polynomial_degree()
    }

    /// Breakpoints of the embedded curve.
    /// The surface's own spans are not taken into account.
    pub fn breakpoints(&self) -> Vec<T> {
        self.curve.breakpoints()
    }

    /// Surface coordinates of the curve at `u`
    pub fn parameter_2d_coordinates(&self, u: T) -> Point2<T> {
        self.debug_assert_in_domain(u);
        self.curve.position(u)
    }

    /// Position in 3D space at `u`
    pub fn global_coordinates(&self, u: T) -> Point3<T> {
        let st = self.parameter_2d_coordinates(u);
        self.surface.position(st.x, st.y)
    }

    /// Position followed by the derivatives up to `order` with respect to `u` in 3D space
    pub fn global_space_derivatives(&self, u: T, order: usize) -> Vec<Vector3<T>> {
        self.debug_assert_in_domain(u);
        let curve = self.curve.derivatives(u, order);
        let surface = self.surface.derivatives(curve[0].x, curve[0].y, order);
        compose_derivatives(&curve, &surface, order)
    }

    /// Length of the tangent, the ratio between arc length and parameter length at `u`
    pub fn determinant_of_jacobian(&self, u: T) -> T {
        self.global_space_derivatives(u, 1)[1].norm()
    }

    /// Point at the middle of the natural domain
    pub fn center(&self) -> Point3<T> {
        let domain = self.natural_domain();
        let two = T::one() + T::one();
        self.global_coordinates((domain.t0() + domain.t1()) / two)
    }

    /// Shape functions of the embedded curve's basis at `u`
    pub fn shape_functions(&self, u: T, order: usize) -> CurveShapeFunction<T> {
        self.debug_assert_in_domain(u);
        self.curve.shape_functions(u, order)
    }

    fn debug_assert_in_domain(&self, u: T) {
        if cfg!(debug_assertions) {
            let domain = self.natural_domain();
            let tolerance = nalgebra::convert::<f64, T>(1e-10) * domain.length().max(T::one());
            debug_assert!(
                ParametricInterval::from_unordered(u, u).is_subset_of(&domain, tolerance),
                "parameter {} outside of the natural domain [{}, {}]",
                u,
                domain.t0(),
                domain.t1()
            );
        }
    }
}

impl<T, C, S> GeometryParts<T, C, S> for CurveOnSurface<T, C, S>
where
    T: FloatingPoint,
    C: CurveEvaluator<T>,
    S: SurfaceEvaluator<T>,
{
    fn geometry_roles(&self) -> &'static [GeometryRole] {
        &[GeometryRole::Background, GeometryRole::EmbeddedCurve]
    }

    fn geometry_part(&self, role: GeometryRole) -> anyhow::Result<GeometryPart<T, C, S>> {
        match role {
            GeometryRole::Background => Ok(GeometryPart::Surface(Arc::clone(&self.surface))),
            GeometryRole::EmbeddedCurve => Ok(GeometryPart::Curve(Arc::clone(&self.curve))),
            other => anyhow::bail!("A curve on surface has no geometry part with role {}", other),
        }
    }
}
