use nalgebra::Point3;

use crate::misc::FloatingPoint;

/// A chord of a curve in 3D space, carrying the curve parameters of its endpoints.
#[derive(Clone, Debug)]
pub struct Segment<T: FloatingPoint> {
    pub a: Point3<T>,
    pub b: Point3<T>,
    pub u0: T,
    pub u1: T,
}

impl<T: FloatingPoint> Segment<T> {
    pub fn new(a: Point3<T>, b: Point3<T>, u0: T, u1: T) -> Self {
        Self { a, b, u0, u1 }
    }

    /// Find the closest point on the segment to `pt`.
    /// Returns the linearly interpolated curve parameter and the point.
    pub fn closest_point(&self, pt: &Point3<T>) -> (T, Point3<T>) {
        let dif = self.b - self.a;
        let l2 = dif.norm_squared();

        if l2 < T::default_epsilon() {
            return (self.u0, self.a);
        }

        let s = ((pt - self.a).dot(&dif) / l2).clamp(T::zero(), T::one());
        (self.u0 + (self.u1 - self.u0) * s, self.a + dif * s)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    use super::Segment;

    #[test]
    fn closest_point_on_segment() {
        let segment = Segment::new(Point3::origin(), Point3::new(2., 0., 0.), 1., 3.);

        let (u, p) = segment.closest_point(&Point3::new(0.5, 4., -1.));
        assert_relative_eq!(u, 1.5);
        assert_relative_eq!(p, Point3::new(0.5, 0., 0.));

        let (u, p) = segment.closest_point(&Point3::new(-3., 1., 0.));
        assert_relative_eq!(u, 1.);
        assert_relative_eq!(p, Point3::origin());

        let (u, _) = segment.closest_point(&Point3::new(9., 0., 0.));
        assert_relative_eq!(u, 3.);
    }
}
