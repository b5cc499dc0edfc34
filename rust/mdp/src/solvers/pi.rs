use super::common::{bellman_backup, greedy};
use super::{MdpSolver, Outcome, Params};
use crate::common::utils::max_abs_diff;
use crate::mdps::validate;
use crate::*;
use tracing::{debug, info, trace, warn};

/// Value function of a fixed policy.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub v: Values,
    pub sweeps: usize,
    /// `false` when the sweep cap was reached before the tolerance.
    pub converged: bool,
}

/// Computes `V` with `V[s] = sum_{s'} T[s, pi[s], s'] * (R[s, pi[s]] + gamma * V[s'])`
/// by synchronous sweeps starting from zero.
///
/// # Panics
/// If `pi` does not have one entry per state or names an action the model
/// does not have.
pub fn policy_evaluation<M: Mdp + ?Sized>(
    mdp: &M,
    pi: &Actions,
    params: &Params,
) -> Result<Evaluation, MdpError> {
    validate(mdp)?;
    params.validate()?;

    evaluate(mdp, pi, params)
}

fn evaluate<M: Mdp + ?Sized>(
    mdp: &M,
    pi: &Actions,
    params: &Params,
) -> Result<Evaluation, MdpError> {
    let (n_s, n_a) = (mdp.n_s(), mdp.n_a());
    assert_eq!(pi.len(), n_s, "Policy must have one action per state.");
    if let Some((s, a)) = pi.iter().enumerate().find(|&(_, &a)| a >= n_a) {
        panic!("Policy picks action {a} in state {s}, but there are only {n_a} actions.");
    }

    let mut v = Values::zeros(n_s);
    let mut sweeps = 0;
    loop {
        // Every entry of the new sweep reads the previous sweep only.
        let v_new: Values = (0..n_s)
            .map(|s| bellman_backup(mdp, s, pi[s], params.gamma, &v))
            .collect();
        let delta = max_abs_diff(v.view(), v_new.view());
        v = v_new;
        sweeps += 1;
        trace!(sweeps, delta, "policy evaluation sweep");

        if !delta.is_finite() {
            return Err(MdpError::Diverged { sweeps });
        }

        if delta < params.theta {
            return Ok(Evaluation {
                v,
                sweeps,
                converged: true,
            });
        }

        if params.exhausted(sweeps) {
            warn!(sweeps, delta, "policy evaluation hit the sweep cap");
            return Ok(Evaluation {
                v,
                sweeps,
                converged: false,
            });
        }
    }
}

/// Greedy policy with respect to `v`; ties go to the lowest action index.
pub fn policy_improvement<M: Mdp + ?Sized>(mdp: &M, v: &Values, gamma: Continous) -> Actions {
    assert!(mdp.n_a() > 0, "Model has no actions.");

    (0..mdp.n_s())
        .map(|s| greedy(mdp, s, gamma, v).0)
        .collect()
}

/// Runs policy iteration from the all-zero policy.
pub fn policy_iteration<M: Mdp + ?Sized>(mdp: &M, params: &Params) -> Result<Outcome, MdpError> {
    PolicyIteration::new(mdp, *params)?.exec()
}

/// What a single evaluate-then-improve round did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The greedy policy differs from the evaluated one and replaced it.
    Improved,
    /// The greedy policy equals the evaluated one.
    Stable,
    /// Evaluation ran out of sweeps. The policy was still replaced by the
    /// greedy one for the truncated values, but it may not be an improvement.
    EvaluationCapped,
}

/// Policy iteration - Sutton & Barto 2018, 4.3.
pub struct PolicyIteration<'a, M: Mdp + ?Sized> {
    mdp: &'a M,
    params: Params,
    v: Values,
    pi: Actions,
    iterations: usize,
}

impl<'a, M: Mdp + ?Sized> PolicyIteration<'a, M> {
    pub fn new(mdp: &'a M, params: Params) -> Result<Self, MdpError> {
        validate(mdp)?;
        params.validate()?;

        Ok(Self {
            mdp,
            params,
            v: Values::zeros(mdp.n_s()),
            pi: Actions::zeros(mdp.n_s()),
            iterations: 0,
        })
    }

    pub const fn iterations(&self) -> usize {
        self.iterations
    }

    /// Evaluates the current policy and replaces it with the greedy one.
    ///
    /// # Errors
    /// [`MdpError::Diverged`] if the evaluation overflows.
    pub fn step(&mut self) -> Result<Step, MdpError> {
        let eval = evaluate(self.mdp, &self.pi, &self.params)?;
        self.v = eval.v;

        let improved = policy_improvement(self.mdp, &self.v, self.params.gamma);
        self.iterations += 1;

        if !eval.converged {
            self.pi = improved;
            return Ok(Step::EvaluationCapped);
        }

        let changed = improved
            .iter()
            .zip(self.pi.iter())
            .filter(|(a, b)| a != b)
            .count();
        debug!(
            iteration = self.iterations,
            sweeps = eval.sweeps,
            changed,
            "policy improvement"
        );

        if changed == 0 {
            Ok(Step::Stable)
        } else {
            self.pi = improved;
            Ok(Step::Improved)
        }
    }

    fn outcome(&self, converged: bool) -> Outcome {
        let (v, pi, iterations) = (self.v.clone(), self.pi.clone(), self.iterations);
        if converged {
            Outcome::Converged { v, pi, iterations }
        } else {
            Outcome::NotConverged { v, pi, iterations }
        }
    }
}

impl<M: Mdp + ?Sized> MdpSolver for PolicyIteration<'_, M> {
    fn exec(&mut self) -> Result<Outcome, MdpError> {
        loop {
            match self.step()? {
                Step::Stable => {
                    info!(iterations = self.iterations, "policy iteration converged");
                    return Ok(self.outcome(true));
                }
                Step::EvaluationCapped => return Ok(self.outcome(false)),
                Step::Improved if self.params.exhausted(self.iterations) => {
                    warn!(
                        iterations = self.iterations,
                        "policy iteration hit the iteration cap"
                    );
                    return Ok(self.outcome(false));
                }
                Step::Improved => {}
            }
        }
    }

    fn values(&self) -> &Values {
        &self.v
    }

    fn actions(&self) -> &Actions {
        &self.pi
    }

    fn q_star(&self, s: Discrete, a: Discrete) -> Option<Continous> {
        (s < self.mdp.n_s() && a < self.mdp.n_a())
            .then(|| bellman_backup(self.mdp, s, a, self.params.gamma, &self.v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envs::*;
    use float_eq::*;
    use ndarray::array;

    #[test]
    fn evaluates_fixed_policy_on_chain() {
        let mdp = two_state_chain();
        let params = Params::new(0.9, 1e-9);

        let eval = policy_evaluation(&mdp, &array![1, 1], &params).unwrap();
        assert!(eval.converged);
        assert_float_eq!(eval.v.to_vec(), vec![9., 10.], abs_all <= 1e-7);

        let eval = policy_evaluation(&mdp, &array![0, 0], &params).unwrap();
        assert_float_eq!(eval.v.to_vec(), vec![0., 0.], abs_all <= 1e-12);
        assert_eq!(eval.sweeps, 1);
    }

    #[test]
    fn evaluation_reports_cap() {
        let mdp = single_state(5.);
        let params = Params::new(0.9, 1e-9).with_max_iterations(3);

        let eval = policy_evaluation(&mdp, &array![0], &params).unwrap();
        assert!(!eval.converged);
        assert_eq!(eval.sweeps, 3);
        // 5 + 4.5 + 4.05
        assert_float_eq!(eval.v[0], 13.55, abs <= 1e-12);
    }

    #[test]
    #[should_panic(expected = "Policy picks action 2 in state 1")]
    fn evaluation_rejects_unknown_action() {
        let mdp = two_state_chain();
        let _ = policy_evaluation(&mdp, &array![0, 2], &Params::new(0.9, 1e-6));
    }

    #[test]
    fn improvement_breaks_ties_towards_lowest_action() {
        let mdp = two_state_chain();

        // With V = 0 both actions in state 0 are worth 0.
        let pi = policy_improvement(&mdp, &array![0., 0.], 0.9);
        assert_eq!(pi, array![0, 1]);

        let pi = policy_improvement(&mdp, &array![0., 10.], 0.9);
        assert_eq!(pi, array![1, 1]);
    }

    #[test]
    fn improvement_leaves_values_alone() {
        let mdp = two_state_chain();
        let v = array![3., 4.];
        let _ = policy_improvement(&mdp, &v, 0.9);

        assert_eq!(v, array![3., 4.]);
    }

    #[test]
    fn steps_through_chain() {
        let mdp = two_state_chain();
        let mut pi = PolicyIteration::new(&mdp, Params::new(0.9, 1e-9)).unwrap();

        assert_eq!(pi.step().unwrap(), Step::Improved);
        assert_eq!(pi.actions(), &array![0, 1]);
        assert_eq!(pi.step().unwrap(), Step::Improved);
        assert_eq!(pi.actions(), &array![1, 1]);
        assert_eq!(pi.step().unwrap(), Step::Stable);
        assert_eq!(pi.iterations(), 3);

        assert_eq!(pi.pi_star(0), Some(1));
        assert_eq!(pi.pi_star(2), None);
        assert_float_eq!(pi.v_star(1), 10., abs <= 1e-7);
        assert_float_eq!(pi.q_star(1, 0).unwrap(), 9., abs <= 1e-7);
        assert_eq!(pi.q_star(0, 5), None);
    }

    #[test]
    fn policy_iteration_caps_rounds() {
        let mdp = two_state_chain();
        let params = Params::new(0.9, 1e-9).with_max_iterations(1_000);

        let outcome = policy_iteration(&mdp, &params.with_max_iterations(1)).unwrap();
        assert!(!outcome.is_converged());
        assert_eq!(outcome.iterations(), 1);

        let outcome = policy_iteration(&mdp, &params).unwrap();
        assert!(outcome.is_converged());
        assert_eq!(outcome.pi(), &array![1, 1]);
    }

    #[test]
    fn capped_evaluation_still_improves_policy() {
        let env = RiverSwim::new(Current::Weak, 1234);
        let params = Params::new(0.99, 1e-3).with_max_iterations(100);

        let outcome = policy_iteration(&env, &params).unwrap();
        assert!(!outcome.is_converged());
        assert_eq!(outcome.iterations(), 1);
        assert!(outcome.v().iter().all(|v| v.is_finite() && *v > 0.));
        // Greedy for the returned values, not the all-LEFT starting policy.
        assert_eq!(outcome.pi(), &policy_improvement(&env, outcome.v(), 0.99));
        assert_eq!(outcome.pi()[5], RIGHT);
    }

    #[test]
    fn overflowing_evaluation_is_an_error() {
        let mdp = single_state(1e308);
        let params = Params::new(0.9, 1e-6);

        assert!(matches!(
            policy_evaluation(&mdp, &array![0], &params),
            Err(MdpError::Diverged { sweeps: 2 })
        ));
        assert!(matches!(
            policy_iteration(&mdp, &params),
            Err(MdpError::Diverged { .. })
        ));
    }
}
