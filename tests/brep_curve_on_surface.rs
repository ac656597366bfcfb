use std::sync::Arc;

use approx::assert_relative_eq;
use brep_curve::prelude::*;
use nalgebra::{Point2, Point3, Point4};

/// Identity map of the unit square onto the xy plane
fn unit_plane() -> Arc<NurbsSurface3D<f64>> {
    let surface = NurbsSurface3D::try_new(
        1,
        1,
        vec![0., 0., 1., 1.],
        vec![0., 0., 1., 1.],
        vec![
            vec![Point4::new(0., 0., 0., 1.), Point4::new(0., 1., 0., 1.)],
            vec![Point4::new(1., 0., 0., 1.), Point4::new(1., 1., 0., 1.)],
        ],
    )
    .unwrap();
    Arc::new(surface)
}

/// z = s^2 over the unit square
fn parabolic_surface() -> Arc<NurbsSurface3D<f64>> {
    let row = |x: f64, z: f64| vec![Point4::new(x, 0., z, 1.), Point4::new(x, 1., z, 1.)];
    let surface = NurbsSurface3D::try_new(
        2,
        1,
        vec![0., 0., 0., 1., 1., 1.],
        vec![0., 0., 1., 1.],
        vec![row(0., 0.), row(0.5, 0.), row(1., 1.)],
    )
    .unwrap();
    Arc::new(surface)
}

fn bottom_edge() -> Arc<NurbsCurve2D<f64>> {
    Arc::new(NurbsCurve2D::try_polyline(&[Point2::new(0., 0.), Point2::new(1., 0.)]).unwrap())
}

/// Polyline with breakpoints at 0, 0.25, 0.5, 0.75 and 1
fn four_segment_edge() -> Arc<NurbsCurve2D<f64>> {
    let points: Vec<_> = (0..5)
        .map(|i| Point2::new(i as f64 / 4., 0.2 + 0.1 * (i % 2) as f64))
        .collect();
    Arc::new(NurbsCurve2D::try_polyline(&points).unwrap())
}

/// Rational quadratic curve with two spans, breakpoint at 0.5
fn rational_edge() -> Arc<NurbsCurve2D<f64>> {
    let curve = NurbsCurve2D::try_new(
        2,
        vec![
            Point3::new(0.1, 0.1, 1.0),
            Point3::new(0.4, 0.9, 1.0),
            Point3::new(1.6, 0.4, 2.0),
            Point3::new(0.9, 0.8, 1.0),
        ],
        vec![0., 0., 0., 0.5, 1., 1., 1.],
    )
    .unwrap();
    Arc::new(curve)
}

fn trimmed(
    surface: Arc<NurbsSurface3D<f64>>,
    curve: Arc<NurbsCurve2D<f64>>,
    t0: f64,
    t1: f64,
) -> BrepCurveOnSurface<f64> {
    let interval = ParametricInterval::try_new(t0, t1).unwrap();
    BrepCurveOnSurface::try_trimmed(surface, curve, interval, true).unwrap()
}

#[test]
fn straight_edge_on_unit_plane() {
    let brep = BrepCurveOnSurface::new(unit_plane(), bottom_edge(), true);

    assert_eq!(brep.domain_interval().bounds(), (0., 1.));
    assert!(brep.has_same_direction());
    assert_eq!(brep.polynomial_degree(), 1);
    assert_relative_eq!(brep.length(), 1.0, epsilon = 1e-12);

    let points = brep.create_integration_points();
    assert_eq!(points.len(), 2);
    let sum: f64 = points.iter().map(|p| p.weight()).sum();
    assert_relative_eq!(sum, 1.0, epsilon = 1e-12);

    let projection = brep.projection_point(&Point3::new(0.5, 5.0, 0.0), 1e-10);
    assert!(projection.is_converged());
    assert_relative_eq!(projection.parameter(), 0.5, epsilon = 1e-10);
    assert_relative_eq!(*projection.point(), Point3::new(0.5, 0., 0.), epsilon = 1e-10);

    assert_relative_eq!(brep.center(), Point3::new(0.5, 0., 0.), epsilon = 1e-12);
}

#[test]
fn trim_inside_one_span_has_no_interior_breakpoints() {
    for (t0, t1) in [(0.3, 0.45), (0.5, 0.75), (0.76, 0.99)] {
        let brep = trimmed(unit_plane(), four_segment_edge(), t0, t1);
        assert_eq!(brep.spans(), vec![t0, t1]);
    }
}

#[test]
fn interior_breakpoints_split_the_trim() {
    let cases = [
        ((0.1, 0.9), vec![0.1, 0.25, 0.5, 0.75, 0.9]),
        ((0.25, 0.75), vec![0.25, 0.5, 0.75]),
        ((0.0, 1.0), vec![0.0, 0.25, 0.5, 0.75, 1.0]),
        ((0.3, 0.6), vec![0.3, 0.5, 0.6]),
    ];
    for ((t0, t1), expected) in cases {
        let brep = trimmed(unit_plane(), four_segment_edge(), t0, t1);
        let spans = brep.spans();
        assert_eq!(spans, expected);
        assert!(spans.windows(2).all(|pair| pair[0] < pair[1]));

        // degree 1, so two points per sub-span
        let points = brep.create_integration_points();
        assert_eq!(points.len(), 2 * (spans.len() - 1));
    }
}

#[test]
fn integration_weights_sum_to_trim_length() {
    for (t0, t1) in [(0.0, 1.0), (0.1, 0.35), (0.45, 0.55), (0.2, 0.9)] {
        let brep = trimmed(parabolic_surface(), rational_edge(), t0, t1);
        let points = brep.create_integration_points();
        let sum: f64 = points.iter().map(|p| p.weight()).sum();
        assert_relative_eq!(sum, t1 - t0, epsilon = 1e-12);

        assert!(points
            .windows(2)
            .all(|pair| pair[0].parameter() < pair[1].parameter()));
        assert!(points.iter().all(|p| p.parameter() > t0 && p.parameter() < t1));
    }
}

#[test]
fn quadrature_order_follows_the_curve_degree() {
    let brep = BrepCurveOnSurface::new(parabolic_surface(), rational_edge(), true);
    // degree 2 and two spans
    assert_eq!(brep.create_integration_points().len(), 6);

    let brep = brep.with_integration_options(IntegrationOptions::default().with_points_per_span(5));
    assert_eq!(brep.create_integration_points().len(), 10);

    let broken = brep.with_integration_options(IntegrationOptions::default().with_points_per_span(0));
    assert!(broken.try_create_integration_points().is_err());
    assert!(broken.create_integration_points().is_empty());
}

/// Two-point trapezoidal rule
struct Trapezoid;

impl QuadratureRule for Trapezoid {
    fn nodes_and_weights(&self, _points: usize) -> anyhow::Result<Vec<(f64, f64)>> {
        Ok(vec![(-1., 1.), (1., 1.)])
    }
}

#[test]
fn custom_quadrature_rule() {
    let brep = trimmed(unit_plane(), four_segment_edge(), 0.1, 0.6);
    let points = brep
        .try_create_integration_points_with(&Trapezoid, &IntegrationOptions::default())
        .unwrap();
    let parameters: Vec<f64> = points.iter().map(|p| p.parameter()).collect();
    assert_eq!(parameters.len(), 6);
    assert_relative_eq!(parameters[0], 0.1, epsilon = 1e-12);
    assert_relative_eq!(parameters[1], 0.25, epsilon = 1e-12);
    assert_relative_eq!(parameters[2], 0.25, epsilon = 1e-12);
    assert_relative_eq!(parameters[5], 0.6, epsilon = 1e-12);
    let sum: f64 = points.iter().map(|p| p.weight()).sum();
    assert_relative_eq!(sum, 0.5, epsilon = 1e-12);
}

#[test]
fn length_of_straight_segments() {
    // a straight diagonal line on the plane, trimmed to half of its length
    let diagonal =
        Arc::new(NurbsCurve2D::try_polyline(&[Point2::new(0., 0.), Point2::new(1., 1.)]).unwrap());
    let brep = trimmed(unit_plane(), diagonal, 0.25, 0.75);
    assert_relative_eq!(brep.length(), 0.5 * 2f64.sqrt(), epsilon = 1e-12);

    // the zigzag polyline is straight on every span
    let zigzag = BrepCurveOnSurface::new(unit_plane(), four_segment_edge(), true);
    let expected = 4. * (0.25f64.powi(2) + 0.1f64.powi(2)).sqrt();
    assert_relative_eq!(zigzag.length(), expected, epsilon = 1e-12);
}

#[test]
fn degenerate_trim_interval_is_empty() {
    let brep = Arc::new(trimmed(parabolic_surface(), rational_edge(), 0.4, 0.4));
    assert!(brep.domain_interval().is_empty());
    assert_eq!(brep.spans(), vec![0.4, 0.4]);
    assert!(brep.create_integration_points().is_empty());
    assert!(brep.create_quadrature_points(2).is_empty());
    assert_eq!(brep.length(), 0.);

    let projection = brep.projection_point(&Point3::new(3., 3., 3.), 1e-10);
    assert_eq!(projection.parameter(), 0.4);
}

#[test]
fn point_on_curve_projects_onto_itself() {
    let brep = BrepCurveOnSurface::new(parabolic_surface(), rational_edge(), true);
    let options = ProjectionOptions::default().with_tolerance(1e-10);
    for u in [0.0, 0.05, 0.3, 0.5, 0.62, 0.95, 1.0] {
        let target = brep.global_coordinates(u);
        let projection = brep.projection_point_with(&target, &options);
        assert!(projection.is_converged(), "no convergence at {}", u);
        assert_relative_eq!(projection.parameter(), u, epsilon = 1e-8);
        assert_relative_eq!(*projection.point(), target, epsilon = 1e-8);
    }
}

#[test]
fn projection_from_a_nearby_seed() {
    let brep = BrepCurveOnSurface::new(parabolic_surface(), rational_edge(), true);
    let target = brep.global_coordinates(0.7);
    let options = ProjectionOptions::default().with_tolerance(1e-12);
    let projection = brep.projection_point_from(&target, 0.68, &options);
    assert!(projection.is_converged());
    assert_relative_eq!(projection.parameter(), 0.7, epsilon = 1e-9);
}

#[test]
fn projection_on_a_long_parameter_domain() {
    // straight edge parametrized over [0, 1000]
    let edge = NurbsCurve2D::try_new(
        1,
        vec![Point3::new(0., 0.5, 1.), Point3::new(1., 0.5, 1.)],
        vec![0., 0., 1000., 1000.],
    )
    .unwrap();
    let brep = BrepCurveOnSurface::new(unit_plane(), Arc::new(edge), true);
    let options = ProjectionOptions::default().with_tolerance(1e-9);
    let projection = brep.projection_point_with(&Point3::new(0.3, 2., 0.), &options);
    assert!(projection.is_converged());
    assert_relative_eq!(projection.parameter(), 300., epsilon = 1e-9);
    assert_relative_eq!(*projection.point(), Point3::new(0.3, 0.5, 0.), epsilon = 1e-12);
}

#[test]
fn exhausted_iteration_budget_is_reported() {
    let brep = BrepCurveOnSurface::new(parabolic_surface(), rational_edge(), true);
    let target = brep.global_coordinates(0.7);
    let options = ProjectionOptions::default()
        .with_tolerance(1e-12)
        .with_max_iters(1);
    let projection = brep.projection_point_from(&target, 0.3, &options);
    assert!(!projection.is_converged());
    assert!(brep.domain_interval().contains(projection.parameter()));
    assert_relative_eq!(
        *projection.point(),
        brep.global_coordinates(projection.parameter()),
        epsilon = 1e-12
    );
}

#[test]
fn far_away_targets_stay_inside_the_trim() {
    let brep = BrepCurveOnSurface::new(unit_plane(), bottom_edge(), true);
    let projection = brep.projection_point(&Point3::new(100., 0., 0.), 1e-10);
    assert!(projection.is_converged());
    assert_eq!(projection.parameter(), 1.);
    let projection = brep.projection_point(&Point3::new(-1e6, 3e5, 42.), 1e-10);
    assert_eq!(projection.parameter(), 0.);

    let brep = trimmed(parabolic_surface(), rational_edge(), 0.2, 0.7);
    for target in [
        Point3::new(1e3, 1e3, 1e3),
        Point3::new(-1e3, 5., 0.),
        Point3::new(0., -1e4, -1e4),
    ] {
        let projection = brep.projection_point(&target, 1e-10);
        assert!(brep.domain_interval().contains(projection.parameter()));
    }
}

#[test]
fn trim_outside_the_natural_domain_is_rejected() {
    let map = Arc::new(CurveOnSurface::new(unit_plane(), bottom_edge()));
    for (t0, t1) in [(-0.5, 0.5), (0.5, 1.5), (-1., 2.)] {
        let interval = ParametricInterval::try_new(t0, t1).unwrap();
        assert!(BrepCurveOnSurface::try_from_curve_on_surface(map.clone(), interval, true).is_err());
        assert!(
            BrepCurveOnSurface::try_trimmed(unit_plane(), bottom_edge(), interval, false).is_err()
        );
    }
    let full = ParametricInterval::try_new(0., 1.).unwrap();
    assert!(BrepCurveOnSurface::try_from_curve_on_surface(map, full, true).is_ok());
}

#[test]
fn unsupported_roles_are_errors() {
    let brep = BrepCurveOnSurface::new(unit_plane(), bottom_edge(), true);
    assert!(brep.geometry_part(GeometryRole::EmbeddedCurve).is_err());
    assert!(brep.geometry_part(GeometryRole::Background).is_ok());
    assert!(brep.geometry_part(GeometryRole::CurveOnSurface).is_ok());
}

#[test]
fn siblings_share_the_composed_map() {
    let map = Arc::new(CurveOnSurface::new(parabolic_surface(), rational_edge()));
    let first = BrepCurveOnSurface::try_from_curve_on_surface(
        map.clone(),
        ParametricInterval::try_new(0., 0.5).unwrap(),
        true,
    )
    .unwrap();
    let second = BrepCurveOnSurface::try_from_curve_on_surface(
        map.clone(),
        ParametricInterval::try_new(0.5, 1.).unwrap(),
        true,
    )
    .unwrap();
    let whole = BrepCurveOnSurface::from_curve_on_surface(map.clone(), true);
    assert!(Arc::ptr_eq(first.curve_on_surface(), second.curve_on_surface()));
    assert_eq!(Arc::strong_count(&map), 4);

    let total = whole.length();
    let first_length = first.length();
    drop(first);
    drop(whole);
    assert_eq!(Arc::strong_count(&map), 2);
    assert_relative_eq!(first_length + second.length(), total, epsilon = 1e-12);

    let reversed = second.opposite();
    assert!(!reversed.has_same_direction());
    assert_eq!(reversed.domain_interval(), second.domain_interval());
    assert!(Arc::ptr_eq(reversed.curve_on_surface(), &map));
}

#[test]
fn quadrature_points_are_deterministic() {
    let brep = Arc::new(trimmed(parabolic_surface(), rational_edge(), 0.1, 0.9));
    let integration_points = brep.create_integration_points();
    let first = brep.create_quadrature_points(2);
    let second = brep.create_quadrature_points(2);

    assert_eq!(first.len(), integration_points.len());
    for ((a, b), ip) in first.iter().zip(second.iter()).zip(integration_points.iter()) {
        assert_eq!(a.integration_point(), ip);
        assert_eq!(a.integration_point(), b.integration_point());
        assert_eq!(a.position(), b.position());
        assert_eq!(a.shape_functions(), b.shape_functions());
        assert_relative_eq!(*a.position(), brep.global_coordinates(a.parameter()), epsilon = 1e-12);
        assert_relative_eq!(
            a.determinant_of_jacobian(),
            brep.determinant_of_jacobian(a.parameter()),
            epsilon = 1e-12
        );
        assert!(Arc::ptr_eq(&a.parent().unwrap(), &brep));
    }

    // the parent link does not keep the curve alive
    drop(brep);
    assert!(first.iter().all(|p| p.parent().is_none()));
}

#[test]
fn quadrature_point_shape_functions() {
    let brep = Arc::new(BrepCurveOnSurface::new(
        parabolic_surface(),
        rational_edge(),
        true,
    ));
    let points = brep.create_quadrature_points(1);
    for point in points.iter() {
        let shape = point.shape_functions();
        assert_eq!(shape.derivative_order(), 1);
        assert_eq!(shape.len(), 3);
        let sum: f64 = shape.values().iter().sum();
        assert_relative_eq!(sum, 1.0, epsilon = 1e-12);
        let derivative_sum: f64 = shape.derivatives(1).iter().sum();
        assert_relative_eq!(derivative_sum, 0.0, epsilon = 1e-10);

        // the basis reproduces the embedded curve
        let curve = rational_edge();
        let reproduced = shape
            .control_point_indices()
            .zip(shape.values().iter())
            .fold(Point2::origin().coords, |acc, (i, n)| {
                let cp = &curve.control_points()[i];
                acc + Point2::new(cp.x / cp.z, cp.y / cp.z).coords * *n
            });
        assert_relative_eq!(
            reproduced,
            brep.parameter_2d_coordinates(point.parameter()).coords,
            epsilon = 1e-12
        );
    }

    let explicit = brep.create_quadrature_points_from(&[IntegrationPoint::new(0.5, 1.)], 0);
    assert_eq!(explicit.len(), 1);
    assert_eq!(explicit[0].parameter(), 0.5);
}

#[test]
fn concurrent_queries_on_one_entity() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<BrepCurveOnSurface<f64>>();
    assert_send_sync::<QuadraturePoint<f64>>();

    let brep = Arc::new(BrepCurveOnSurface::new(
        parabolic_surface(),
        rational_edge(),
        true,
    ));
    let expected = brep.length();
    let targets: Vec<f64> = (0..8).map(|i| i as f64 / 7.).collect();

    std::thread::scope(|scope| {
        let handles: Vec<_> = targets
            .iter()
            .map(|u| {
                let brep = Arc::clone(&brep);
                scope.spawn(move || {
                    let target = brep.global_coordinates(*u);
                    let projection = brep.projection_point(&target, 1e-10);
                    (brep.length(), brep.create_quadrature_points(1).len(), projection)
                })
            })
            .collect();

        for (handle, u) in handles.into_iter().zip(targets.iter()) {
            let (length, count, projection) = handle.join().unwrap();
            assert_eq!(length, expected);
            assert_eq!(count, 6);
            assert!(projection.is_converged());
            assert_relative_eq!(projection.parameter(), *u, epsilon = 1e-8);
        }
    });
}
