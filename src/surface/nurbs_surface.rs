use nalgebra::{
    allocator::Allocator, Const, DefaultAllocator, DimName, DimNameDiff, DimNameSub, OPoint,
    OVector, U1,
};

use crate::{
    curve::nurbs_curve::dehomogenize,
    knot::KnotVector,
    misc::{Binomial, FloatingPoint},
};

use super::SurfaceDirection;

/// NURBS surface representation
/// by generics, it can be used for 2D or 3D surfaces with f32 or f64 scalar types
#[derive(Clone, Debug)]
pub struct NurbsSurface<T: FloatingPoint, D: DimName>
where
    DefaultAllocator: Allocator<D>,
{
    /// control points with homogeneous coordinates, indexed as `[u][v]`
    /// the last element of the vector is the `weight`
    control_points: Vec<Vec<OPoint<T, D>>>,
    u_degree: usize,
    v_degree: usize,
    u_knots: KnotVector<T>,
    v_knots: KnotVector<T>,
}

/// 3D NURBS surface alias
pub type NurbsSurface3D<T> = NurbsSurface<T, Const<4>>;

impl<T: FloatingPoint, D: DimName> NurbsSurface<T, D>
where
    DefaultAllocator: Allocator<D>,
    D: DimNameSub<U1>,
    DefaultAllocator: Allocator<DimNameDiff<D, U1>>,
{
    /// Create a new NURBS surface
    /// # Failures
    /// - if the control point grid does not match the knot vectors and degrees
    /// - if a knot vector is not sorted or has an empty domain
    /// - if a weight is not positive
    ///
    /// # Example
    /// ```
    /// use brep_curve::prelude::*;
    /// use nalgebra::Point4;
    /// // bilinear patch spanning [0, 2] x [0, 1] in the xy plane
    /// let surface = NurbsSurface3D::try_new(
    ///     1,
    ///     1,
    ///     vec![0., 0., 1., 1.],
    ///     vec![0., 0., 1., 1.],
    ///     vec![
    ///         vec![Point4::new(0., 0., 0., 1.), Point4::new(0., 1., 0., 1.)],
    ///         vec![Point4::new(2., 0., 0., 1.), Point4::new(2., 1., 0., 1.)],
    ///     ],
    /// ).unwrap();
    /// let p = surface.point_at(0.5, 0.5);
    /// assert_eq!((p.x, p.y, p.z), (1., 0.5, 0.));
    /// ```
    pub fn try_new(
        u_degree: usize,
        v_degree: usize,
        u_knots: Vec<T>,
        v_knots: Vec<T>,
        control_points: Vec<Vec<OPoint<T, D>>>,
    ) -> anyhow::Result<Self> {
        let u_count = control_points.len();
        anyhow::ensure!(u_count > u_degree, "Too few control points in u direction");
        anyhow::ensure!(
            u_knots.len() == u_count + u_degree + 1,
            "Invalid number of u knots, got {}, expected {}",
            u_knots.len(),
            u_count + u_degree + 1
        );

        let v_count = control_points[0].len();
        anyhow::ensure!(
            control_points.iter().all(|row| row.len() == v_count),
            "Control point rows must have the same length"
        );
        anyhow::ensure!(v_count > v_degree, "Too few control points in v direction");
        anyhow::ensure!(
            v_knots.len() == v_count + v_degree + 1,
            "Invalid number of v knots, got {}, expected {}",
            v_knots.len(),
            v_count + v_degree + 1
        );

        let u_knots = KnotVector::new(u_knots);
        let v_knots = KnotVector::new(v_knots);
        for (knots, degree) in [(&u_knots, u_degree), (&v_knots, v_degree)] {
            anyhow::ensure!(knots.is_non_decreasing(), "Knots must be sorted");
            let (start, end) = knots.domain(degree);
            anyhow::ensure!(start < end, "Knot domain must not be empty");
        }
        anyhow::ensure!(
            control_points
                .iter()
                .flatten()
                .all(|p| p[D::dim() - 1] > T::zero()),
            "Control point weights must be positive"
        );

        Ok(Self {
            u_degree,
            v_degree,
            u_knots,
            v_knots,
            control_points,
        })
    }

    pub fn u_degree(&self) -> usize {
        self.u_degree
    }

    pub fn v_degree(&self) -> usize {
        self.v_degree
    }

    pub fn degree(&self, direction: SurfaceDirection) -> usize {
        match direction {
            SurfaceDirection::U => self.u_degree,
            SurfaceDirection::V => self.v_degree,
        }
    }

    pub fn u_knots(&self) -> &KnotVector<T> {
        &self.u_knots
    }

    pub fn v_knots(&self) -> &KnotVector<T> {
        &self.v_knots
    }

    pub fn control_points(&self) -> &Vec<Vec<OPoint<T, D>>> {
        &self.control_points
    }

    /// Get the u domain of the knot vector by degree
    pub fn u_knots_domain(&self) -> (T, T) {
        self.u_knots.domain(self.u_degree)
    }

    /// Get the v domain of the knot vector by degree
    pub fn v_knots_domain(&self) -> (T, T) {
        self.v_knots.domain(self.v_degree)
    }

    /// Distinct knots inside the domain of the given direction
    pub fn breakpoints(&self, direction: SurfaceDirection) -> Vec<T> {
        match direction {
            SurfaceDirection::U => self.u_knots.breakpoints(self.u_degree),
            SurfaceDirection::V => self.v_knots.breakpoints(self.v_degree),
        }
    }

    /// Evaluate the surface at the given u, v parameters to get a point
    pub fn point_at(&self, u: T, v: T) -> OPoint<T, DimNameDiff<D, U1>> {
        dehomogenize(&self.point(u, v))
    }

    /// Evaluate the surface at the given u, v parameters to get a homogeneous point
    pub(crate) fn point(&self, u: T, v: T) -> OPoint<T, D> {
        let n = self.control_points.len() - 1;
        let m = self.control_points[0].len() - 1;

        let knot_span_index_u = self.u_knots.find_knot_span_index(n, self.u_degree, u);
        let knot_span_index_v = self.v_knots.find_knot_span_index(m, self.v_degree, v);
        let u_basis_vals = self
            .u_knots
            .basis_functions(knot_span_index_u, u, self.u_degree);
        let v_basis_vals = self
            .v_knots
            .basis_functions(knot_span_index_v, v, self.v_degree);
        let uind = knot_span_index_u - self.u_degree;

        let mut position = OPoint::<T, D>::origin();
        for l in 0..=self.v_degree {
            let mut temp = OPoint::<T, D>::origin();
            let vind = knot_span_index_v - self.v_degree + l;

            // sample u isoline
            for k in 0..=self.u_degree {
                temp.coords += &self.control_points[uind + k][vind].coords * u_basis_vals[k];
            }

            // add point from u isoline
            position.coords += temp.coords * v_basis_vals[l];
        }

        position
    }

    /// Evaluate the rational derivatives at the given u, v parameters
    /// `skl[k][l]` is the derivative taken `k` times in u and `l` times in v, for `k + l <= derivs`
    pub fn rational_derivatives(
        &self,
        u: T,
        v: T,
        derivs: usize,
    ) -> Vec<Vec<OVector<T, DimNameDiff<D, U1>>>> {
        let ders = self.derivatives(u, v, derivs);
        rational_derivatives(&ders, derivs)
    }

    /// Evaluate the homogeneous derivatives at the given u, v parameters
    fn derivatives(&self, u: T, v: T, derivs: usize) -> Vec<Vec<OVector<T, D>>> {
        let n = self.control_points.len() - 1;
        let m = self.control_points[0].len() - 1;

        let du = derivs.min(self.u_degree);
        let dv = derivs.min(self.v_degree);
        let mut skl = vec![vec![OVector::<T, D>::zeros(); derivs + 1]; derivs + 1];
        let knot_span_index_u = self.u_knots.find_knot_span_index(n, self.u_degree, u);
        let knot_span_index_v = self.v_knots.find_knot_span_index(m, self.v_degree, v);
        let uders =
            self.u_knots
                .derivative_basis_functions(knot_span_index_u, u, self.u_degree, du);
        let vders =
            self.v_knots
                .derivative_basis_functions(knot_span_index_v, v, self.v_degree, dv);
        let mut temp = vec![OVector::<T, D>::zeros(); self.v_degree + 1];

        for k in 0..=du {
            for (s, column) in temp.iter_mut().enumerate() {
                *column = OVector::<T, D>::zeros();
                for r in 0..=self.u_degree {
                    *column += &self.control_points[knot_span_index_u - self.u_degree + r]
                        [knot_span_index_v - self.v_degree + s]
                        .coords
                        * uders[k][r];
                }
            }

            let dd = (derivs - k).min(dv);
            for l in 0..=dd {
                for (s, column) in temp.iter().enumerate() {
                    skl[k][l] += column * vders[l][s];
                }
            }
        }

        skl
    }
}

/// Compute the rational derivatives of homogeneous derivatives
fn rational_derivatives<T, D>(
    ders: &[Vec<OVector<T, D>>],
    derivs: usize,
) -> Vec<Vec<OVector<T, DimNameDiff<D, U1>>>>
where
    T: FloatingPoint,
    D: DimName,
    DefaultAllocator: Allocator<D>,
    D: DimNameSub<U1>,
    DefaultAllocator: Allocator<DimNameDiff<D, U1>>,
{
    let a_ders: Vec<Vec<OVector<T, DimNameDiff<D, U1>>>> = ders
        .iter()
        .map(|row| {
            row.iter()
                .map(|d| {
                    d.generic_view((0, 0), (<D as DimNameSub<U1>>::Output::name(), Const::<1>))
                        .into_owned()
                })
                .collect()
        })
        .collect();
    let w_ders: Vec<Vec<T>> = ders
        .iter()
        .map(|row| row.iter().map(|d| d[D::dim() - 1]).collect())
        .collect();

    let mut skl: Vec<Vec<OVector<T, DimNameDiff<D, U1>>>> = vec![];
    let mut binom = Binomial::<T>::new();

    for k in 0..=derivs {
        let mut row: Vec<OVector<T, DimNameDiff<D, U1>>> = vec![];

        for l in 0..=(derivs - k) {
            let mut v = a_ders[k][l].clone();
            for j in 1..=l {
                let coef = binom.get(l, j) * w_ders[0][j];
                v -= &row[l - j] * coef;
            }

            for i in 1..=k {
                let coef = binom.get(k, i) * w_ders[i][0];
                v -= &skl[k - i][l] * coef;
                let mut v2 = OVector::<T, DimNameDiff<D, U1>>::zeros();
                for j in 1..=l {
                    v2 += &skl[k - i][l - j] * (binom.get(l, j) * w_ders[i][j]);
                }
                v -= v2 * binom.get(k, i);
            }

            row.push(v / w_ders[0][0]);
        }

        skl.push(row);
    }

    skl
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::{Point4, Vector3};

    use super::NurbsSurface3D;
    use crate::surface::SurfaceDirection;

    /// z = u^2 over [0, 1] x [0, 1], x = u, y = v
    fn parabolic_patch() -> NurbsSurface3D<f64> {
        let row = |x: f64, z: f64| vec![Point4::new(x, 0., z, 1.), Point4::new(x, 1., z, 1.)];
        NurbsSurface3D::try_new(
            2,
            1,
            vec![0., 0., 0., 1., 1., 1.],
            vec![0., 0., 1., 1.],
            vec![row(0., 0.), row(0.5, 0.), row(1., 1.)],
        )
        .unwrap()
    }

    #[test]
    fn parabola_derivatives() {
        let surface = parabolic_patch();
        let (u, v) = (0.3, 0.6);
        let p = surface.point_at(u, v);
        assert_relative_eq!(p.coords, Vector3::new(u, v, u * u), epsilon = 1e-12);

        let ders = surface.rational_derivatives(u, v, 2);
        assert_eq!(ders.len(), 3);
        assert_eq!(ders[0].len(), 3);
        assert_eq!(ders[2].len(), 1);
        assert_relative_eq!(ders[1][0], Vector3::new(1., 0., 2. * u), epsilon = 1e-12);
        assert_relative_eq!(ders[0][1], Vector3::new(0., 1., 0.), epsilon = 1e-12);
        assert_relative_eq!(ders[2][0], Vector3::new(0., 0., 2.), epsilon = 1e-12);
        assert_relative_eq!(ders[1][1], Vector3::zeros(), epsilon = 1e-12);
        assert_relative_eq!(ders[0][2], Vector3::zeros(), epsilon = 1e-12);
    }

    #[test]
    fn rational_surface_matches_finite_differences() {
        // a weighted patch so the rational terms matter
        let surface = NurbsSurface3D::try_new(
            2,
            1,
            vec![0., 0., 0., 1., 1., 1.],
            vec![0., 0., 1., 1.],
            vec![
                vec![Point4::new(0., 0., 0., 1.), Point4::new(0., 1., 0.5, 1.)],
                vec![Point4::new(1., 0., 2., 2.), Point4::new(1., 2., 2., 2.)],
                vec![Point4::new(1., 0., 0., 1.), Point4::new(1., 1., 0., 1.)],
            ],
        )
        .unwrap();

        let (u, v) = (0.4, 0.3);
        let h = 1e-6;
        let ders = surface.rational_derivatives(u, v, 2);
        let du = (surface.point_at(u + h, v) - surface.point_at(u - h, v)) / (2. * h);
        let dv = (surface.point_at(u, v + h) - surface.point_at(u, v - h)) / (2. * h);
        assert_relative_eq!(ders[1][0], du, epsilon = 1e-6);
        assert_relative_eq!(ders[0][1], dv, epsilon = 1e-6);

        let d_uv = (surface.rational_derivatives(u, v + h, 1)[1][0]
            - surface.rational_derivatives(u, v - h, 1)[1][0])
            / (2. * h);
        assert_relative_eq!(ders[1][1], d_uv, epsilon = 1e-5);
        let d_uu = (surface.rational_derivatives(u + h, v, 1)[1][0]
            - surface.rational_derivatives(u - h, v, 1)[1][0])
            / (2. * h);
        assert_relative_eq!(ders[2][0], d_uu, epsilon = 1e-5);
    }

    #[test]
    fn breakpoints_per_direction() {
        let surface = parabolic_patch();
        assert_eq!(surface.breakpoints(SurfaceDirection::U), vec![0., 1.]);
        assert_eq!(surface.degree(SurfaceDirection::U), 2);
        assert_eq!(surface.degree(SurfaceDirection::V), 1);
    }

    #[test]
    fn invalid_grid_is_rejected() {
        let row = vec![Point4::new(0., 0., 0., 1.), Point4::new(0., 1., 0., 1.)];
        let short = vec![Point4::new(1., 0., 0., 1.)];
        let result = NurbsSurface3D::try_new(
            1,
            1,
            vec![0., 0., 1., 1.],
            vec![0., 0., 1., 1.],
            vec![row, short],
        );
        assert!(result.is_err());
    }
}
