use super::common::{bellman_backup, greedy};
use super::pi::policy_improvement;
use super::{MdpSolver, Outcome, Params};
use crate::common::utils::max_abs_diff;
use crate::mdps::validate;
use crate::*;
use tracing::{info, trace, warn};

/// Runs value iteration from `V = 0` and extracts the greedy policy.
pub fn value_iteration<M: Mdp + ?Sized>(mdp: &M, params: &Params) -> Result<Outcome, MdpError> {
    ValueIteration::new(mdp, *params)?.exec()
}

/// Value iteration - Sutton & Barto 2018, 4.4.
///
/// Each sweep applies the Bellman optimality operator to a snapshot of the
/// previous sweep. The sup-norm change of every sweep is kept in
/// [`ValueIteration::deltas`]; since the operator is a `gamma`-contraction the
/// deltas shrink at least geometrically.
pub struct ValueIteration<'a, M: Mdp + ?Sized> {
    mdp: &'a M,
    params: Params,
    v: Values,
    pi: Actions,
    deltas: Vec<Continous>,
}

impl<'a, M: Mdp + ?Sized> ValueIteration<'a, M> {
    pub fn new(mdp: &'a M, params: Params) -> Result<Self, MdpError> {
        validate(mdp)?;
        params.validate()?;

        Ok(Self {
            mdp,
            params,
            v: Values::zeros(mdp.n_s()),
            pi: Actions::zeros(mdp.n_s()),
            deltas: vec![],
        })
    }

    pub fn deltas(&self) -> &[Continous] {
        &self.deltas
    }

    /// One synchronous sweep; returns `max_s |V_new[s] - V_old[s]|`, which is
    /// NaN or infinite once the values overflow.
    pub fn sweep(&mut self) -> Continous {
        let v_new: Values = (0..self.mdp.n_s())
            .map(|s| greedy(self.mdp, s, self.params.gamma, &self.v).1)
            .collect();
        let delta = max_abs_diff(self.v.view(), v_new.view());
        self.v = v_new;
        self.deltas.push(delta);
        trace!(sweep = self.deltas.len(), delta, "value iteration sweep");

        delta
    }
}

impl<M: Mdp + ?Sized> MdpSolver for ValueIteration<'_, M> {
    fn exec(&mut self) -> Result<Outcome, MdpError> {
        let converged = loop {
            let delta = self.sweep();
            if !delta.is_finite() {
                return Err(MdpError::Diverged {
                    sweeps: self.deltas.len(),
                });
            }
            if delta < self.params.theta {
                break true;
            }
            if self.params.exhausted(self.deltas.len()) {
                warn!(sweeps = self.deltas.len(), delta, "value iteration hit the sweep cap");
                break false;
            }
        };

        self.pi = policy_improvement(self.mdp, &self.v, self.params.gamma);

        let (v, pi, iterations) = (self.v.clone(), self.pi.clone(), self.deltas.len());
        Ok(if converged {
            info!(iterations, "value iteration converged");
            Outcome::Converged { v, pi, iterations }
        } else {
            Outcome::NotConverged { v, pi, iterations }
        })
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
