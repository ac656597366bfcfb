use nalgebra::allocator::Allocator;
use nalgebra::{Const, DefaultAllocator, DimName, DimNameDiff, DimNameSub, OPoint, OVector, U1};

use crate::knot::KnotVector;
use crate::misc::{Binomial, FloatingPoint};

use super::CurveShapeFunction;

/// NURBS curve representation
/// By generics, it can be used for 2D or 3D curves with f32 or f64 scalar types
#[derive(Clone, Debug)]
pub struct NurbsCurve<T: FloatingPoint, D: DimName>
where
    DefaultAllocator: Allocator<D>,
{
    /// control points with homogeneous coordinates
    /// the last element of the vector is the `weight`
    control_points: Vec<OPoint<T, D>>,
    degree: usize,
    /// knot vector for the NURBS curve
    /// the length of the knot vector is equal to the `# of control points + degree + 1`
    knots: KnotVector<T>,
}

/// 2D NURBS curve alias
pub type NurbsCurve2D<T> = NurbsCurve<T, Const<3>>;

/// 3D NURBS curve alias
pub type NurbsCurve3D<T> = NurbsCurve<T, Const<4>>;

impl<T: FloatingPoint, D: DimName> NurbsCurve<T, D>
where
    DefaultAllocator: Allocator<D>,
{
    /// Create a new NURBS curve
    /// # Failures
    /// - if the number of control points is less than or equal to the degree
    /// - the number of knots is not equal to the number of control points + the degree + 1
    /// - the knots are not sorted
    /// - a weight is not positive
    ///
    /// # Example
    /// ```
    /// use brep_curve::prelude::*;
    /// use nalgebra::Point3;
    ///
    /// let w = 1.; // weight for each control points
    /// let control_points: Vec<Point3<f64>> = vec![
    ///     Point3::new(0., 0., w),
    ///     Point3::new(0.5, 1., w),
    ///     Point3::new(1., 0., w),
    /// ];
    /// let knots = vec![0., 0., 0., 1., 1., 1.];
    /// let nurbs = NurbsCurve2D::try_new(2, control_points, knots);
    /// assert!(nurbs.is_ok());
    /// ```
    pub fn try_new(
        degree: usize,
        control_points: Vec<OPoint<T, D>>,
        knots: Vec<T>,
    ) -> anyhow::Result<Self> {
        anyhow::ensure!(
            control_points.len() > degree,
            "Too few control points for curve"
        );
        anyhow::ensure!(
            knots.len() == control_points.len() + degree + 1,
            "Invalid number of knots, got {}, expected {}",
            knots.len(),
            control_points.len() + degree + 1
        );

        let knots = KnotVector::new(knots);
        anyhow::ensure!(knots.is_non_decreasing(), "Knots must be sorted");
        let (start, end) = knots.domain(degree);
        anyhow::ensure!(start < end, "Knot domain must not be empty");
        anyhow::ensure!(
            control_points.iter().all(|p| p[D::dim() - 1] > T::zero()),
            "Control point weights must be positive"
        );

        Ok(Self {
            degree,
            control_points,
            knots,
        })
    }

    /// Create a degree 1 curve passing through the given points
    /// The knots are spread uniformly over `[0, 1]`
    /// # Example
    /// ```
    /// use brep_curve::prelude::*;
    /// use nalgebra::Point2;
    /// let line = NurbsCurve2D::try_polyline(&[Point2::new(0., 0.), Point2::new(1., 0.)]).unwrap();
    /// assert_eq!(line.knots_domain(), (0., 1.));
    /// assert_eq!(line.point_at(0.5), Point2::new(0.5, 0.));
    /// ```
    pub fn try_polyline(points: &[OPoint<T, DimNameDiff<D, U1>>]) -> anyhow::Result<Self>
    where
        D: DimNameSub<U1>,
        DefaultAllocator: Allocator<DimNameDiff<D, U1>>,
    {
        anyhow::ensure!(points.len() >= 2, "Polyline needs at least two points");

        let last = T::from_count(points.len() - 1);
        let mut knots = vec![T::zero()];
        knots.extend((0..points.len()).map(|i| T::from_count(i) / last));
        knots.push(T::one());

        let control_points = points
            .iter()
            .map(|p| {
                let mut coords: Vec<T> = p.coords.iter().copied().collect();
                coords.push(T::one());
                OPoint::from_slice(&coords)
            })
            .collect();

        Self::try_new(1, control_points, knots)
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn knots(&self) -> &KnotVector<T> {
        &self.knots
    }

    pub fn control_points(&self) -> &Vec<OPoint<T, D>> {
        &self.control_points
    }

    pub fn weights(&self) -> Vec<T> {
        self.control_points
            .iter()
            .map(|p| p[D::dim() - 1])
            .collect()
    }

    pub fn knots_domain(&self) -> (T, T) {
        self.knots.domain(self.degree)
    }

    /// Distinct knots inside the domain, bounding the polynomial spans of the curve
    pub fn breakpoints(&self) -> Vec<T> {
        self.knots.breakpoints(self.degree)
    }

    fn last_control_point_index(&self) -> usize {
        self.control_points.len() - 1
    }

    /// Evaluate the curve at a given parameter to get a dehomonogenized point
    pub fn point_at(&self, t: T) -> OPoint<T, DimNameDiff<D, U1>>
    where
        D: DimNameSub<U1>,
        DefaultAllocator: Allocator<DimNameDiff<D, U1>>,
    {
        dehomogenize(&self.point(t))
    }

    /// Evaluate the curve at a given parameter to get a point
    pub(crate) fn point(&self, t: T) -> OPoint<T, D> {
        let knot_span_index =
            self.knots
                .find_knot_span_index(self.last_control_point_index(), self.degree, t);
        let basis = self.knots.basis_functions(knot_span_index, t, self.degree);
        let mut position = OPoint::<T, D>::origin();
        for i in 0..=self.degree {
            position.coords +=
                &self.control_points[knot_span_index - self.degree + i].coords * basis[i];
        }
        position
    }

    /// Evaluate the rational derivatives at a given parameter
    /// The first element is the position, the kth element is the kth derivative
    pub fn rational_derivatives(&self, u: T, derivs: usize) -> Vec<OVector<T, DimNameDiff<D, U1>>>
    where
        D: DimNameSub<U1>,
        DefaultAllocator: Allocator<DimNameDiff<D, U1>>,
    {
        let ders = self.derivatives(u, derivs);
        let a_ders: Vec<_> = ders
            .iter()
            .map(|d| {
                d.generic_view((0, 0), (<D as DimNameSub<U1>>::Output::name(), Const::<1>))
                    .into_owned()
            })
            .collect();
        let w_ders: Vec<_> = ders.iter().map(|d| d[D::dim() - 1]).collect();

        let mut ck: Vec<OVector<T, DimNameDiff<D, U1>>> = vec![];
        let mut binom = Binomial::<T>::new();
        for k in 0..=derivs {
            let mut v = a_ders[k].clone();

            for i in 1..=k {
                let coef = binom.get(k, i) * w_ders[i];
                v -= &ck[k - i] * coef;
            }

            ck.push(v / w_ders[0]);
        }
        ck
    }

    /// Evaluate the homogeneous derivatives at a given parameter
    fn derivatives(&self, u: T, derivs: usize) -> Vec<OVector<T, D>> {
        let knot_span_index =
            self.knots
                .find_knot_span_index(self.last_control_point_index(), self.degree, u);
        let nders = self
            .knots
            .derivative_basis_functions(knot_span_index, u, self.degree, derivs);

        let du = derivs.min(self.degree);
        let mut derivatives = vec![OVector::<T, D>::zeros(); derivs + 1];
        for k in 0..=du {
            for j in 0..=self.degree {
                derivatives[k] +=
                    &self.control_points[knot_span_index - self.degree + j].coords * nders[k][j];
            }
        }

        derivatives
    }

    /// Evaluate the non-vanishing rational basis functions and their derivatives
    /// Each control point contributes with its weight, so the values form a partition of unity
    /// # Example
    /// ```
    /// use brep_curve::prelude::*;
    /// use nalgebra::Point2;
    /// let line = NurbsCurve2D::try_polyline(&[Point2::new(0., 0.), Point2::new(2., 0.)]).unwrap();
    /// let shape = line.shape_functions(0.25, 1);
    /// assert_eq!(shape.values(), &[0.75, 0.25]);
    /// assert_eq!(shape.derivatives(1), &[-1., 1.]);
    /// ```
    pub fn shape_functions(&self, u: T, derivs: usize) -> CurveShapeFunction<T> {
        let knot_span_index =
            self.knots
                .find_knot_span_index(self.last_control_point_index(), self.degree, u);
        let first = knot_span_index - self.degree;
        let nders = self
            .knots
            .derivative_basis_functions(knot_span_index, u, self.degree, derivs);
        let weights: Vec<T> = self.control_points[first..=knot_span_index]
            .iter()
            .map(|p| p[D::dim() - 1])
            .collect();

        // derivatives of the weight function
        let w_ders: Vec<T> = nders
            .iter()
            .map(|row| {
                row.iter()
                    .zip(weights.iter())
                    .fold(T::zero(), |acc, (n, w)| acc + *n * *w)
            })
            .collect();

        let mut binom = Binomial::<T>::new();
        let mut values: Vec<Vec<T>> = Vec::with_capacity(derivs + 1);
        for k in 0..=derivs {
            let row = (0..=self.degree)
                .map(|j| {
                    let mut v = nders[k][j] * weights[j];
                    for i in 1..=k {
                        v -= binom.get(k, i) * w_ders[i] * values[k - i][j];
                    }
                    v / w_ders[0]
                })
                .collect();
            values.push(row);
        }

        CurveShapeFunction::new(first, values)
    }
}

/// Dehomogenize a point
/// Weights are positive by construction, so the division is always defined
pub fn dehomogenize<T: FloatingPoint, D: DimName>(
    point: &OPoint<T, D>,
) -> OPoint<T, DimNameDiff<D, U1>>
where
    D: DimNameSub<U1>,
    DefaultAllocator: Allocator<D>,
    DefaultAllocator: Allocator<DimNameDiff<D, U1>>,
{
    let v = &point.coords;
    let w = v[D::dim() - 1];
    let coords =
        v.generic_view((0, 0), (<D as DimNameSub<U1>>::Output::name(), Const::<1>)) / w;
    OPoint { coords }
}
