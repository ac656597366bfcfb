use gauss_quad::GaussLegendre;

/// Provider of canonical quadrature rules on `[-1, 1]`
pub trait QuadratureRule {
    /// Nodes and weights of a rule with the given number of points, sorted by node
    fn nodes_and_weights(&self, points: usize) -> anyhow::Result<Vec<(f64, f64)>>;
}

/// Gauss-Legendre quadrature: `n` points integrate polynomials up to degree `2n - 1` exactly
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GaussLegendreRule;

impl QuadratureRule for GaussLegendreRule {
    fn nodes_and_weights(&self, points: usize) -> anyhow::Result<Vec<(f64, f64)>> {
        match points {
            0 => anyhow::bail!("A quadrature rule needs at least one point"),
            // midpoint rule
            1 => Ok(vec![(0., 2.)]),
            n => {
                let gauss = GaussLegendre::new(n).map_err(|err| {
                    anyhow::anyhow!("Failed to build Gauss-Legendre rule of {} points: {:?}", n, err)
                })?;
                let mut pairs = gauss.as_node_weight_pairs().to_vec();
                pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
                Ok(pairs)
            }
        }
    }
}
