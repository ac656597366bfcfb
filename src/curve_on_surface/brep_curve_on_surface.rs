use std::sync::Arc;

use argmin::core::{ArgminFloat, Executor, State, TerminationReason, TerminationStatus};
use itertools::Itertools;
use nalgebra::{Point2, Point3, Vector3};

use crate::{
    closest_parameter::{
        ClosestParameterNewton, CurveOnSurfaceProjectionProblem, Projection, ProjectionOptions,
    },
    curve::{CurveEvaluator, CurveShapeFunction, NurbsCurve2D},
    interval::ParametricInterval,
    misc::{FloatingPoint, Segment},
    quadrature::{
        create_integration_points_1d, GaussLegendreRule, IntegrationOptions, IntegrationPoint,
        QuadratureRule,
    },
    surface::{NurbsSurface3D, SurfaceEvaluator},
};

use super::{CurveOnSurface, GeometryPart, GeometryParts, GeometryRole, QuadraturePoint};

/// Topological edge of a brep: a curve on surface restricted to a trim interval with an orientation flag.
///
/// The composed map is shared, so sibling edges trimming the same curve differently
/// (or traversing it the opposite way) stay valid independently of each other.
/// All operations are read only, the entity can be queried from several threads at once.
#[derive(Debug)]
pub struct BrepCurveOnSurface<T: FloatingPoint, C = NurbsCurve2D<T>, S = NurbsSurface3D<T>> {
    curve_on_surface: Arc<CurveOnSurface<T, C, S>>,
    /// trim interval, inside the natural domain of the composed map
    interval: ParametricInterval<T>,
    /// orientation of the edge agrees with the parametrization of the curve
    same_direction: bool,
    integration_options: IntegrationOptions,
}

impl<T: FloatingPoint, C, S> Clone for BrepCurveOnSurface<T, C, S> {
    fn clone(&self) -> Self {
        Self {
            curve_on_surface: Arc::clone(&self.curve_on_surface),
            interval: self.interval,
            same_direction: self.same_direction,
            integration_options: self.integration_options,
        }
    }
}

impl<T, C, S> BrepCurveOnSurface<T, C, S>
where
    T: FloatingPoint,
    C: CurveEvaluator<T>,
    S: SurfaceEvaluator<T>,
{
    /// Create an untrimmed brep curve spanning the natural domain of the embedded curve
    pub fn new(surface: Arc<S>, curve: Arc<C>, same_direction: bool) -> Self {
        Self::from_curve_on_surface(
            Arc::new(CurveOnSurface::new(surface, curve)),
            same_direction,
        )
    }

    /// Create a brep curve restricted to `interval`
    /// # Failures
    /// - if the interval is not inside the natural domain of the embedded curve
    pub fn try_trimmed(
        surface: Arc<S>,
        curve: Arc<C>,
        interval: ParametricInterval<T>,
        same_direction: bool,
    ) -> anyhow::Result<Self> {
        Self::try_from_curve_on_surface(
            Arc::new(CurveOnSurface::new(surface, curve)),
            interval,
            same_direction,
        )
    }

    /// Create an untrimmed brep curve from an existing composed map
    pub fn from_curve_on_surface(
        curve_on_surface: Arc<CurveOnSurface<T, C, S>>,
        same_direction: bool,
    ) -> Self {
        let interval = curve_on_surface.natural_domain();
        Self {
            curve_on_surface,
            interval,
            same_direction,
            integration_options: IntegrationOptions::default(),
        }
    }

    /// Create a brep curve from an existing composed map restricted to `interval`
    /// # Failures
    /// - if the interval is not inside the natural domain of the composed map
    ///
    /// # Example
    /// ```
    /// use std::sync::Arc;
    /// use brep_curve::prelude::*;
    /// use nalgebra::{Point2, Point4};
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
    /// let curve = NurbsCurve2D::try_polyline(&[Point2::new(0., 0.), Point2::new(1., 1.)]).unwrap();
    /// let map = Arc::new(CurveOnSurface::new(Arc::new(surface), Arc::new(curve)));
    ///
    /// let inside = ParametricInterval::try_new(0.25, 0.5).unwrap();
    /// assert!(BrepCurveOnSurface::try_from_curve_on_surface(map.clone(), inside, true).is_ok());
    ///
    /// let outside = ParametricInterval::try_new(0.5, 1.5).unwrap();
    /// assert!(BrepCurveOnSurface::try_from_curve_on_surface(map, outside, true).is_err());
    /// ```
    pub fn try_from_curve_on_surface(
        curve_on_surface: Arc<CurveOnSurface<T, C, S>>,
        interval: ParametricInterval<T>,
        same_direction: bool,
    ) -> anyhow::Result<Self> {
        let domain = curve_on_surface.natural_domain();
        let tolerance = nalgebra::convert::<f64, T>(1e-10) * domain.length().max(T::one());
        anyhow::ensure!(
            interval.is_subset_of(&domain, tolerance),
            "Trim interval [{}, {}] is not inside the natural domain [{}, {}]",
            interval.t0(),
            interval.t1(),
            domain.t0(),
            domain.t1()
        );

        // absorb round-off so evaluation never leaves the natural domain
        let interval =
            ParametricInterval::from_unordered(domain.clamp(interval.t0()), domain.clamp(interval.t1()));

        Ok(Self {
            curve_on_surface,
            interval,
            same_direction,
            integration_options: IntegrationOptions::default(),
        })
    }

    pub fn with_integration_options(mut self, options: IntegrationOptions) -> Self {
        self.integration_options = options;
        self
    }

    pub fn integration_options(&self) -> &IntegrationOptions {
        &self.integration_options
    }

    /// The shared composed map
    pub fn curve_on_surface(&self) -> &Arc<CurveOnSurface<T, C, S>> {
        &self.curve_on_surface
    }

    /// Trim interval
    pub fn domain_interval(&self) -> ParametricInterval<T> {
        self.interval
    }

    pub fn has_same_direction(&self) -> bool {
        self.same_direction
    }

    /// The same trimmed curve traversed the other way, sharing the composed map
    pub fn opposite(&self) -> Self {
        Self {
            same_direction: !self.same_direction,
            ..self.clone()
        }
    }

    pub fn polynomial_degree(&self) -> usize {
        self.curve_on_surface.polynomial_degree()
    }

    pub fn global_coordinates(&self, u: T) -> Point3<T> {
        self.curve_on_surface.global_coordinates(u)
    }

    pub fn global_space_derivatives(&self, u: T, order: usize) -> Vec<Vector3<T>> {
        self.curve_on_surface.global_space_derivatives(u, order)
    }

    pub fn determinant_of_jacobian(&self, u: T) -> T {
        self.curve_on_surface.determinant_of_jacobian(u)
    }

    pub fn parameter_2d_coordinates(&self, u: T) -> Point2<T> {
        self.curve_on_surface.parameter_2d_coordinates(u)
    }

    pub fn shape_functions(&self, u: T, order: usize) -> CurveShapeFunction<T> {
        self.curve_on_surface.shape_functions(u, order)
    }

    /// Representative point of the underlying composed map, not the arc length midpoint
    pub fn center(&self) -> Point3<T> {
        self.curve_on_surface.center()
    }

    /// Breakpoints of the embedded curve inside the trim interval, framed by the interval bounds.
    /// A zero-length trim interval yields the single empty span `[t0, t0]`.
    ///
    /// # Example
    /// ```
    /// use std::sync::Arc;
    /// use brep_curve::prelude::*;
    /// use nalgebra::{Point2, Point4};
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
    /// // breakpoints at 0, 0.25, 0.5, 0.75, 1
    /// let curve = NurbsCurve2D::try_polyline(&[
    ///     Point2::new(0., 0.),
    ///     Point2::new(0.25, 0.),
    ///     Point2::new(0.5, 0.),
    ///     Point2::new(0.75, 0.),
    ///     Point2::new(1., 0.),
    /// ]).unwrap();
    ///
    /// let brep = BrepCurveOnSurface::try_trimmed(
    ///     Arc::new(surface),
    ///     Arc::new(curve),
    ///     ParametricInterval::try_new(0.1, 0.6).unwrap(),
    ///     true,
    /// ).unwrap();
    /// assert_eq!(brep.spans(), vec![0.1, 0.25, 0.5, 0.6]);
    /// ```
    pub fn spans(&self) -> Vec<T> {
        let (t0, t1) = self.interval.bounds();
        let mut spans = vec![t0];
        spans.extend(
            self.curve_on_surface
                .breakpoints()
                .into_iter()
                .filter(|t| *t > t0 && *t < t1),
        );
        spans.push(t1);
        log::trace!("{} spans in [{}, {}]", spans.len() - 1, t0, t1);
        spans
    }

    /// Integration points over the trim interval with the default Gauss-Legendre rule
    /// # Failures
    /// - if the quadrature rule cannot be built
    pub fn try_create_integration_points(&self) -> anyhow::Result<Vec<IntegrationPoint<T>>> {
        self.try_create_integration_points_with(&GaussLegendreRule, &self.integration_options)
    }

    /// Integration points over the trim interval, one rule per span, ordered by increasing parameter
    /// # Failures
    /// - if the quadrature rule cannot be built
    pub fn try_create_integration_points_with<R: QuadratureRule + ?Sized>(
        &self,
        rule: &R,
        options: &IntegrationOptions,
    ) -> anyhow::Result<Vec<IntegrationPoint<T>>> {
        let points_per_span = options.points_per_span(self.polynomial_degree());
        create_integration_points_1d(&self.spans(), points_per_span, rule)
    }

    /// Integration points over the trim interval, one Gauss-Legendre rule per span.
    /// A zero-length trim interval yields no points.
    pub fn create_integration_points(&self) -> Vec<IntegrationPoint<T>> {
        self.try_create_integration_points()
            .unwrap_or_else(|err| {
                log::warn!("failed to create integration points: {}", err);
                vec![]
            })
    }

    /// Quadrature points at the integration points of the trim interval,
    /// carrying shape functions with derivatives up to `derivative_order`
    pub fn create_quadrature_points(
        self: &Arc<Self>,
        derivative_order: usize,
    ) -> Vec<QuadraturePoint<T, C, S>> {
        let integration_points = self.create_integration_points();
        self.create_quadrature_points_from(&integration_points, derivative_order)
    }

    /// Quadrature points at the given integration points, in the same order
    pub fn create_quadrature_points_from(
        self: &Arc<Self>,
        integration_points: &[IntegrationPoint<T>],
        derivative_order: usize,
    ) -> Vec<QuadraturePoint<T, C, S>> {
        let parent = Arc::downgrade(self);
        integration_points
            .iter()
            .map(|ip| {
                let u = ip.parameter();
                let derivatives = self.global_space_derivatives(u, 1);
                QuadraturePoint::new(
                    *ip,
                    Point3::from(derivatives[0]),
                    derivatives[1],
                    self.shape_functions(u, derivative_order),
                    parent.clone(),
                )
            })
            .collect()
    }

    /// Arc length of the trimmed curve
    pub fn length(&self) -> T {
        self.create_integration_points()
            .iter()
            .fold(T::zero(), |acc, ip| {
                acc + ip.weight() * self.determinant_of_jacobian(ip.parameter())
            })
    }

    /// Initial guess for a projection: the closest point on the chords of a sampled polyline
    fn closest_sampled_parameter(&self, point: &Point3<T>, samples_per_span: usize) -> T {
        let divisions = samples_per_span.max(1);
        let samples: Vec<(T, Point3<T>)> = self
            .spans()
            .into_iter()
            .tuple_windows()
            .filter(|(a, b)| b > a)
            .flat_map(|(a, b)| {
                let step = (b - a) / T::from_count(divisions);
                (0..divisions).map(move |i| a + step * T::from_count(i))
            })
            .chain(std::iter::once(self.interval.t1()))
            .map(|u| (u, self.global_coordinates(u)))
            .collect();

        if samples.len() < 2 {
            return self.interval.t0();
        }

        samples
            .iter()
            .tuple_windows()
            .map(|(s0, s1)| {
                let segment = Segment::new(s0.1, s1.1, s0.0, s1.0);
                let (u, closest) = segment.closest_point(point);
                (u, (point - closest).norm_squared())
            })
            .min_by(|x, y| x.1.partial_cmp(&y.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(u, _)| u)
            .unwrap_or(self.interval.t0())
    }
}

impl<T, C, S> BrepCurveOnSurface<T, C, S>
where
    T: FloatingPoint + ArgminFloat,
    C: CurveEvaluator<T>,
    S: SurfaceEvaluator<T>,
{
    /// Project a point onto the trimmed curve with Newton's method, stopping when a step is below `tolerance`
    ///
    /// # Example
    /// ```
    /// use std::sync::Arc;
    /// use brep_curve::prelude::*;
    /// use nalgebra::{Point2, Point3, Point4};
    ///
    /// let surface = NurbsSurface3D::<f64>::try_new(
    ///     1,
    ///     1,
    ///     vec![0., 0., 1., 1.],
    ///     vec![0., 0., 1., 1.],
    ///     vec![
    ///         vec![Point4::new(0., 0., 0., 1.), Point4::new(0., 1., 0., 1.)],
    ///         vec![Point4::new(1., 0., 0., 1.), Point4::new(1., 1., 0., 1.)],
    ///     ],
    /// ).unwrap();
    /// let curve = NurbsCurve2D::<f64>::try_polyline(&[Point2::new(0., 0.), Point2::new(1., 0.)]).unwrap();
    /// let brep = BrepCurveOnSurface::new(Arc::new(surface), Arc::new(curve), true);
    ///
    /// let projection = brep.projection_point(&Point3::new(0.5, 5., 0.), 1e-8);
    /// assert!(projection.is_converged());
    /// assert!((projection.parameter() - 0.5).abs() < 1e-8);
    /// ```
    pub fn projection_point(&self, point: &Point3<T>, tolerance: T) -> Projection<T> {
        self.projection_point_with(point, &ProjectionOptions::default().with_tolerance(tolerance))
    }

    /// Project a point onto the trimmed curve, seeding Newton's method from a sampled polyline
    pub fn projection_point_with(
        &self,
        point: &Point3<T>,
        options: &ProjectionOptions<T>,
    ) -> Projection<T> {
        let seed = self.closest_sampled_parameter(point, options.samples_per_span);
        self.projection_point_from(point, seed, options)
    }

    /// Project a point onto the trimmed curve starting Newton's method at `seed`.
    /// Every iterate stays inside the trim interval.
    /// Non-convergence is reported through [`Projection::is_converged`] with the last iterate.
    pub fn projection_point_from(
        &self,
        point: &Point3<T>,
        seed: T,
        options: &ProjectionOptions<T>,
    ) -> Projection<T> {
        let seed = self.interval.clamp(seed);
        let solver = ClosestParameterNewton::new(self.interval.bounds(), options.tolerance);
        let problem = CurveOnSurfaceProjectionProblem::new(point, &self.curve_on_surface);

        let res = Executor::new(problem, solver)
            .configure(|state| state.param(seed).max_iters(options.max_iters))
            .run();

        let (converged, parameter) = match res {
            Ok(res) => {
                let state = res.state();
                let parameter = state.get_param().copied().unwrap_or(seed);
                let converged = match state.get_termination_status() {
                    TerminationStatus::Terminated(TerminationReason::SolverConverged) => true,
                    // the iteration budget is checked before the step size
                    TerminationStatus::Terminated(TerminationReason::MaxItersReached) => {
                        match (state.get_param(), state.get_prev_param()) {
                            (Some(current), Some(prev)) => {
                                solver.is_step_converged(*current, *prev)
                            }
                            _ => false,
                        }
                    }
                    status => {
                        log::debug!("projection stopped: {:?}", status);
                        false
                    }
                };
                (converged, parameter)
            }
            Err(err) => {
                log::warn!("projection failed: {}", err);
                (false, seed)
            }
        };

        if converged {
            log::debug!("projection converged at {} from seed {}", parameter, seed);
        } else {
            log::warn!(
                "projection did not converge within {} iterations, last parameter {}",
                options.max_iters,
                parameter
            );
        }

        Projection::new(converged, parameter, self.global_coordinates(parameter))
    }
}

impl<T, C, S> GeometryParts<T, C, S> for BrepCurveOnSurface<T, C, S>
where
    T: FloatingPoint,
    C: CurveEvaluator<T>,
    S: SurfaceEvaluator<T>,
{
    fn geometry_roles(&self) -> &'static [GeometryRole] {
        &[GeometryRole::Background, GeometryRole::CurveOnSurface]
    }

    fn geometry_part(&self, role: GeometryRole) -> anyhow::Result<GeometryPart<T, C, S>> {
        match role {
            GeometryRole::Background => self.curve_on_surface.geometry_part(role),
            GeometryRole::CurveOnSurface => Ok(GeometryPart::CurveOnSurface(Arc::clone(
                &self.curve_on_surface,
            ))),
            other => anyhow::bail!("A brep curve on surface has no geometry part with role {}", other),
        }
    }
}
