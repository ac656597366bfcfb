use approx::assert_relative_eq;
use nalgebra::{Point2, Point3, Vector2};

use super::{CurveEvaluator, NurbsCurve2D};

/// Quarter of the unit circle as a rational quadratic curve
fn quarter_circle() -> NurbsCurve2D<f64> {
    let w = std::f64::consts::FRAC_1_SQRT_2;
    NurbsCurve2D::try_new(
        2,
        vec![
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(w, w, w),
            Point3::new(0.0, 1.0, 1.0),
        ],
        vec![0., 0., 0., 1., 1., 1.],
    )
    .unwrap()
}

fn two_span_curve() -> NurbsCurve2D<f64> {
    NurbsCurve2D::try_new(
        2,
        vec![
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(0.5, 1.0, 1.0),
            Point3::new(1.5, -0.5, 2.0),
            Point3::new(2.0, 0.0, 1.0),
        ],
        vec![0., 0., 0., 0.4, 1., 1., 1.],
    )
    .unwrap()
}

#[test]
fn invalid_curves_are_rejected() {
    let points = vec![Point3::new(0.0, 0.0, 1.0), Point3::new(1.0, 0.0, 1.0)];
    assert!(NurbsCurve2D::try_new(2, points.clone(), vec![0., 0., 1., 1.]).is_err());
    assert!(NurbsCurve2D::try_new(1, points.clone(), vec![0., 0., 1.]).is_err());
    assert!(NurbsCurve2D::try_new(1, points.clone(), vec![0., 1., 0., 1.]).is_err());
    assert!(NurbsCurve2D::try_new(1, points, vec![0., 0., 0., 0.]).is_err());
    let zero_weight = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 1.0)];
    assert!(NurbsCurve2D::try_new(1, zero_weight, vec![0., 0., 1., 1.]).is_err());
    assert!(NurbsCurve2D::<f64>::try_polyline(&[Point2::new(0., 0.)]).is_err());
}

#[test]
fn rational_curve_lies_on_circle() {
    let curve = quarter_circle();
    for i in 0..=10 {
        let u = i as f64 / 10.;
        assert_relative_eq!(curve.point_at(u).coords.norm(), 1.0, epsilon = 1e-12);
    }
    assert_relative_eq!(curve.point_at(0.), Point2::new(1., 0.));
    assert_relative_eq!(curve.point_at(1.), Point2::new(0., 1.));
}

#[test]
fn rational_derivatives_match_finite_differences() {
    let curve = two_span_curve();
    let h = 1e-6;
    for u in [0.1, 0.3, 0.55, 0.9] {
        let ders = curve.rational_derivatives(u, 2);
        let forward = curve.point_at(u + h);
        let backward = curve.point_at(u - h);
        let first = (forward - backward) / (2. * h);
        assert_relative_eq!(ders[1], first, epsilon = 1e-6);

        let forward = curve.rational_derivatives(u + h, 1);
        let backward = curve.rational_derivatives(u - h, 1);
        let second: Vector2<f64> = (forward[1] - backward[1]) / (2. * h);
        assert_relative_eq!(ders[2], second, epsilon = 1e-5);
    }
}

#[test]
fn shape_functions_reproduce_the_curve() {
    let curve = two_span_curve();
    let points: Vec<Point2<f64>> = curve
        .control_points()
        .iter()
        .map(|p| Point2::new(p.x / p.z, p.y / p.z))
        .collect();

    for u in [0.0, 0.2, 0.4, 0.7, 1.0] {
        let shape = curve.shape_functions(u, 2);
        assert_eq!(shape.derivative_order(), 2);
        assert_eq!(shape.len(), 3);
        assert_relative_eq!(shape.values().iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(shape.derivatives(1).iter().sum::<f64>(), 0.0, epsilon = 1e-10);

        let ders = curve.rational_derivatives(u, 2);
        for k in 0..=2 {
            let mut sum = Vector2::zeros();
            for (j, index) in shape.control_point_indices().enumerate() {
                sum += points[index].coords * shape.derivatives(k)[j];
            }
            assert_relative_eq!(sum, ders[k], epsilon = 1e-9);
        }
    }
}

#[test]
fn evaluator_exposes_polynomial_structure() {
    let curve = two_span_curve();
    assert_eq!(CurveEvaluator::polynomial_degree(&curve), 2);
    assert_eq!(CurveEvaluator::breakpoints(&curve), vec![0., 0.4, 1.]);
    let domain = curve.natural_domain();
    assert_eq!(domain.bounds(), (0., 1.));
    assert_relative_eq!(curve.position(0.4), curve.point_at(0.4));
    assert_eq!(CurveEvaluator::derivatives(&curve, 0.5, 3).len(), 4);
}
