use std::collections::HashMap;

use nalgebra::RealField;

/// Returns the factorial of `n` as a scalar.
pub fn factorial<T: RealField + Copy>(n: usize) -> T {
    (1..=n).fold(T::one(), |acc, i| acc * nalgebra::convert::<f64, T>(i as f64))
}

/// A memoized binomial coefficient calculator.
/// Rational derivative formulas query the same `(n, k)` pairs repeatedly,
/// so previously calculated coefficients are kept in a memoization map.
pub struct Binomial<T> {
    memo: HashMap<(usize, usize), T>,
}

impl<T: RealField + Copy> Default for Binomial<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: RealField + Copy> Binomial<T> {
    pub fn new() -> Self {
        Self {
            memo: HashMap::new(),
        }
    }

    /// Returns the binomial coefficient of `n` and `k` with memoization.
    pub fn get(&mut self, n: usize, k: usize) -> T {
        if k == 0 || k == n {
            return T::one();
        } else if n == 0 || k > n {
            return T::zero();
        }

        let k = k.min(n - k);

        if let Some(memoized) = self.memo.get(&(n, k)) {
            return *memoized;
        }

        let r = self.get(n - 1, k) + self.get(n - 1, k - 1);
        self.memo.insert((n, k), r);
        r
    }
}
