use argmin::{argmin_error_closure, core::*};

use crate::misc::FloatingPoint;

/// Customized Newton's method for finding the closest parameter on a trimmed curve.
/// Every iterate is clamped into the trim domain.
/// Original source: https://argmin-rs.github.io/argmin/argmin/solver/newton/struct.Newton.html
#[derive(Clone, Copy, Debug)]
pub struct ClosestParameterNewton<F> {
    /// trim domain of the parameter
    domain: (F, F),
    /// converged when a step is not larger than `tolerance`
    tolerance: F,
}

impl<F> ClosestParameterNewton<F>
where
    F: FloatingPoint + ArgminFloat,
{
    pub fn new(domain: (F, F), tolerance: F) -> Self {
        ClosestParameterNewton { domain, tolerance }
    }

    /// Snap a parameter to the nearest bound of the domain
    fn clamp(&self, u: F) -> F {
        if u < self.domain.0 {
            self.domain.0
        } else if u > self.domain.1 {
            self.domain.1
        } else {
            u
        }
    }

    /// Check whether the step from `prev` to `current` is small enough
    pub fn is_step_converged(&self, current: F, prev: F) -> bool {
        nalgebra::ComplexField::abs(current - prev) <= self.tolerance
    }

    /// The second derivative of the squared distance is unusable as a Newton denominator
    fn is_degenerate(hessian: F) -> bool {
        !nalgebra::ComplexField::is_finite(&hessian)
            || nalgebra::ComplexField::abs(hessian) <= F::default_epsilon()
    }
}

impl<O, F> Solver<O, IterState<F, F, (), F, (), F>> for ClosestParameterNewton<F>
where
    O: Gradient<Param = F, Gradient = F> + Hessian<Param = F, Hessian = F>,
    F: FloatingPoint + ArgminFloat,
{
    const NAME: &'static str = "Closest parameter newton method on a trimmed domain";

    fn next_iter(
        &mut self,
        problem: &mut Problem<O>,
        state: IterState<F, F, (), F, (), F>,
    ) -> Result<(IterState<F, F, (), F, (), F>, Option<KV>), Error> {
        let param = *state.get_param().ok_or_else(argmin_error_closure!(
            NotInitialized,
            concat!(
                "`ClosestParameterNewton` requires an initial parameter. ",
                "Please provide an initial guess via `Executor`s `configure` method."
            )
        ))?;

        let grad = problem.gradient(&param)?;
        let hessian = problem.hessian(&param)?;

        if Self::is_degenerate(hessian) {
            // keep the current parameter, `terminate` reports the breakdown
            return Ok((state.gradient(grad).hessian(hessian), None));
        }

        let new_param = self.clamp(param - grad / hessian);

        Ok((
            state.param(new_param).gradient(grad).hessian(hessian),
            None,
        ))
    }

    fn terminate(&mut self, state: &IterState<F, F, (), F, (), F>) -> TerminationStatus {
        if let Some(hessian) = state.get_hessian() {
            if Self::is_degenerate(*hessian) {
                return TerminationStatus::Terminated(TerminationReason::SolverExit(
                    "second derivative of the squared distance vanished".into(),
                ));
            }
        }

        if state.iter >= state.max_iters {
            return TerminationStatus::Terminated(TerminationReason::MaxItersReached);
        }

        match (state.get_param(), state.get_prev_param()) {
            (Some(current), Some(prev)) if self.is_step_converged(*current, *prev) => {
                TerminationStatus::Terminated(TerminationReason::SolverConverged)
            }
            _ => TerminationStatus::NotTerminated,
        }
    }
}
