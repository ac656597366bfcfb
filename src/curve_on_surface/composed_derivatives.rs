use nalgebra::{Vector2, Vector3};

use crate::misc::{factorial, FloatingPoint};

/// Derivatives of the composition `S(c(u))` of a surface `S(s, t)` with a curve `c(u) = (s(u), t(u))`.
///
/// * `curve` - `c(u)` followed by its derivatives, at least `order + 1` entries
/// * `surface` - triangular table of partials at `c(u)`, `surface[k][l]` is `∂^(k+l) S / ∂s^k ∂t^l`
/// * `order` - highest derivative to compute
///
/// Returns `S(c(u))` followed by its derivatives up to `order`.
///
/// Both maps are expanded as truncated Taylor series around `u`,
/// so the general multivariate chain rule falls out of polynomial composition.
/// The first two orders reduce to
/// `S_s s' + S_t t'` and `S_s s'' + S_t t'' + S_ss s'^2 + 2 S_st s' t' + S_tt t'^2`.
pub fn compose_derivatives<T: FloatingPoint>(
    curve: &[Vector2<T>],
    surface: &[Vec<Vector3<T>>],
    order: usize,
) -> Vec<Vector3<T>> {
    let n = order;

    // Taylor coefficients of s(u + h) - s(u) and t(u + h) - t(u)
    let (ds, dt): (Vec<T>, Vec<T>) = (0..=n)
        .map(|k| {
            if k == 0 {
                (T::zero(), T::zero())
            } else {
                let f = factorial::<T>(k);
                (curve[k].x / f, curve[k].y / f)
            }
        })
        .unzip();

    let pow_s = truncated_powers(&ds, n);
    let pow_t = truncated_powers(&dt, n);

    let mut coefficients = vec![Vector3::zeros(); n + 1];
    for i in 0..=n {
        for j in 0..=(n - i) {
            let partial = surface[i][j] / (factorial::<T>(i) * factorial::<T>(j));
            let product = truncated_product(&pow_s[i], &pow_t[j], n);
            // (ds)^i (dt)^j starts at h^(i + j)
            for m in (i + j)..=n {
                coefficients[m] += partial * product[m];
            }
        }
    }

    coefficients
        .into_iter()
        .enumerate()
        .map(|(m, c)| c * factorial::<T>(m))
        .collect()
}

/// `p^0, p^1, ..., p^n` truncated after the `h^n` term
fn truncated_powers<T: FloatingPoint>(p: &[T], n: usize) -> Vec<Vec<T>> {
    let mut one = vec![T::zero(); n + 1];
    one[0] = T::one();
    let mut powers = vec![one];
    for i in 1..=n {
        let next = truncated_product(&powers[i - 1], p, n);
        powers.push(next);
    }
    powers
}

fn truncated_product<T: FloatingPoint>(a: &[T], b: &[T], n: usize) -> Vec<T> {
    (0..=n)
        .map(|m| (0..=m).fold(T::zero(), |acc, k| acc + a[k] * b[m - k]))
        .collect()
}
