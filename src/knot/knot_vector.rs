use std::ops::Index;

use itertools::Itertools;
use nalgebra::RealField;

/// Knot vector representation
#[derive(Clone, Debug, PartialEq)]
pub struct KnotVector<T>(Vec<T>);

impl<T: RealField + Copy> KnotVector<T> {
    pub fn new(knots: Vec<T>) -> Self {
        Self(knots)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.0.clone()
    }

    pub fn first(&self) -> T {
        self.0[0]
    }

    pub fn last(&self) -> T {
        self.0[self.0.len() - 1]
    }

    pub fn as_slice(&self) -> &[T] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.0.iter()
    }

    /// Check that no knot is smaller than its predecessor
    pub fn is_non_decreasing(&self) -> bool {
        self.0.iter().tuple_windows().all(|(a, b)| a <= b)
    }

    /// Get the domain of the knot vector by degree
    pub fn domain(&self, degree: usize) -> (T, T) {
        (self.0[degree], self.0[self.0.len() - 1 - degree])
    }

    /// Distinct knot values inside the domain, in increasing order.
    /// Consecutive breakpoints bound the polynomial spans of a curve of the given degree.
    /// # Example
    /// ```
    /// use brep_curve::prelude::KnotVector;
    /// let knots = KnotVector::new(vec![0., 0., 0., 1., 2., 2., 3., 3., 3.]);
    /// assert_eq!(knots.breakpoints(2), vec![0., 1., 2., 3.]);
    /// ```
    pub fn breakpoints(&self, degree: usize) -> Vec<T> {
        let (start, end) = self.domain(degree);
        let eps = T::default_epsilon();
        self.0
            .iter()
            .copied()
            .filter(|knot| *knot >= start - eps && *knot <= end + eps)
            .dedup_by(|a, b| (*a - *b).abs() <= eps)
            .collect()
    }

    /// Find the knot span index by binary search
    /// `n` is the number of control points - 1
    ///
    /// # Example
    /// ```
    /// use brep_curve::prelude::KnotVector;
    /// let knots = KnotVector::new(vec![0., 0., 0., 1., 2., 3., 3., 3.]);
    /// let idx = knots.find_knot_span_index(4, 2, 2.5);
    /// assert_eq!(idx, 4);
    /// ```
    pub fn find_knot_span_index(&self, n: usize, degree: usize, u: T) -> usize {
        if u > self[n + 1] - T::default_epsilon() {
            return n;
        }

        if u < self[degree] + T::default_epsilon() {
            return degree;
        }

        // binary search
        let mut low = degree;
        let mut high = n + 1;
        let mut mid = (low + high) / 2;
        while u < self[mid] || self[mid + 1] <= u {
            if u < self[mid] {
                high = mid;
            } else {
                low = mid;
            }
            let next = (low + high) / 2;
            if mid == next {
                break;
            }
            mid = next;
        }

        mid
    }

    /// Compute the non-vanishing basis functions
    pub fn basis_functions(&self, knot_span_index: usize, u: T, degree: usize) -> Vec<T> {
        let mut basis_functions = vec![T::zero(); degree + 1];
        let mut left = vec![T::zero(); degree + 1];
        let mut right = vec![T::zero(); degree + 1];

        basis_functions[0] = T::one();

        for j in 1..=degree {
            left[j] = u - self[knot_span_index + 1 - j];
            right[j] = self[knot_span_index + j] - u;
            let mut saved = T::zero();

            for r in 0..j {
                let temp = basis_functions[r] / (right[r + 1] + left[j - r]);
                basis_functions[r] = saved + right[r + 1] * temp;
                saved = left[j - r] * temp;
            }

            basis_functions[j] = saved;
        }

        basis_functions
    }

    /// Compute the non-vanishing basis functions and their derivatives
    /// Returns a table of size (derivs + 1, degree + 1) where the kth row holds the kth derivative.
    /// Rows above the degree are zero.
    pub fn derivative_basis_functions(
        &self,
        knot_span_index: usize,
        u: T,
        degree: usize,
        derivs: usize,
    ) -> Vec<Vec<T>> {
        let mut ndu = vec![vec![T::zero(); degree + 1]; degree + 1];
        let mut left = vec![T::zero(); degree + 1];
        let mut right = vec![T::zero(); degree + 1];

        ndu[0][0] = T::one();

        for j in 1..=degree {
            left[j] = u - self[knot_span_index + 1 - j];
            right[j] = self[knot_span_index + j] - u;

            let mut saved = T::zero();
            for r in 0..j {
                // lower triangle
                ndu[j][r] = right[r + 1] + left[j - r];
                let temp = ndu[r][j - 1] / ndu[j][r];

                // upper triangle
                ndu[r][j] = saved + right[r + 1] * temp;
                saved = left[j - r] * temp;
            }
            ndu[j][j] = saved;
        }

        let mut ders = vec![vec![T::zero(); degree + 1]; derivs + 1];
        for j in 0..=degree {
            ders[0][j] = ndu[j][degree];
        }

        let du = derivs.min(degree) as isize;
        let p = degree as isize;
        let mut a = vec![vec![T::zero(); degree + 1]; 2];

        for r in 0..=p {
            // alternate rows in array a
            let mut s1 = 0;
            let mut s2 = 1;
            a[0][0] = T::one();

            for k in 1..=du {
                let mut d = T::zero();
                let rk = r - k;
                let pk = p - k;

                if r >= k {
                    a[s2][0] = a[s1][0] / ndu[(pk + 1) as usize][rk as usize];
                    d = a[s2][0] * ndu[rk as usize][pk as usize];
                }

                let j1 = if rk >= -1 { 1 } else { -rk };
                let j2 = if r - 1 <= pk { k - 1 } else { p - r };

                for j in j1..=j2 {
                    let ju = j as usize;
                    a[s2][ju] = (a[s1][ju] - a[s1][ju - 1])
                        / ndu[(pk + 1) as usize][(rk + j) as usize];
                    d += a[s2][ju] * ndu[(rk + j) as usize][pk as usize];
                }

                if r <= pk {
                    let (uk, ur) = (k as usize, r as usize);
                    a[s2][uk] = -a[s1][uk - 1] / ndu[(pk + 1) as usize][ur];
                    d += a[s2][uk] * ndu[ur][pk as usize];
                }

                ders[k as usize][r as usize] = d;

                std::mem::swap(&mut s1, &mut s2);
            }
        }

        let mut acc = p;
        for k in 1..=du {
            let factor: T = nalgebra::convert(acc as f64);
            for value in ders[k as usize].iter_mut() {
                *value *= factor;
            }
            acc *= p - k;
        }

        ders
    }
}

impl<T> Index<usize> for KnotVector<T> {
    type Output = T;
    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl<T> FromIterator<T> for KnotVector<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
