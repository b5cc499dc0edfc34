pub mod common;
pub mod pi;
pub mod vi;

pub use common::{bellman_backup, q_values};
pub use pi::{policy_evaluation, policy_improvement, policy_iteration, Evaluation, PolicyIteration};
pub use vi::{value_iteration, ValueIteration};

use crate::*;
use serde::{Deserialize, Serialize};

/// Knobs shared by every solver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Params {
    /// Discount factor, `0 <= gamma < 1`.
    pub gamma: Continous,
    /// Sweeps stop once the sup-norm change in `V` drops below `theta`.
    pub theta: Continous,
    /// Upper bound on sweeps (and on improvement rounds for policy iteration).
    /// `None` runs until the tolerance is met.
    pub max_iterations: Option<usize>,
}

impl Params {
    pub const fn new(gamma: Continous, theta: Continous) -> Self {
        Self {
            gamma,
            theta,
            max_iterations: None,
        }
    }

    #[must_use]
    pub const fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    /// `gamma == 1` is only accepted together with an iteration cap.
    pub fn validate(&self) -> Result<(), MdpError> {
        if !(self.theta.is_finite() && self.theta > 0.) {
            return Err(MdpError::InvalidTolerance(self.theta));
        }

        let upper_ok = self.gamma < 1. || (self.max_iterations.is_some() && self.gamma <= 1.);
        if !(self.gamma >= 0. && upper_ok) {
            return Err(MdpError::InvalidDiscount(self.gamma));
        }

        Ok(())
    }

    pub(crate) fn exhausted(&self, iterations: usize) -> bool {
        self.max_iterations.is_some_and(|n| iterations >= n)
    }
}

/// Result of a driver run.
///
/// For value iteration `iterations` counts sweeps; for policy iteration it
/// counts improvement rounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Converged {
        v: Values,
        pi: Actions,
        iterations: usize,
    },
    /// The iteration cap was hit first; `v` and `pi` are the best estimate.
    ///
    /// For policy iteration `pi` is greedy with respect to `v`, while `v` is
    /// the (possibly truncated) evaluation of the policy `pi` replaced. It is
    /// not the value of `pi` itself.
    NotConverged {
        v: Values,
        pi: Actions,
        iterations: usize,
    },
}

impl Outcome {
    pub const fn is_converged(&self) -> bool {
        matches!(self, Self::Converged { .. })
    }

    pub const fn v(&self) -> &Values {
        match self {
            Self::Converged { v, .. } | Self::NotConverged { v, .. } => v,
        }
    }

    pub const fn pi(&self) -> &Actions {
        match self {
            Self::Converged { pi, .. } | Self::NotConverged { pi, .. } => pi,
        }
    }

    pub const fn iterations(&self) -> usize {
        match self {
            Self::Converged { iterations, .. } | Self::NotConverged { iterations, .. } => {
                *iterations
            }
        }
    }

    pub fn into_parts(self) -> (Values, Actions) {
        match self {
            Self::Converged { v, pi, .. } | Self::NotConverged { v, pi, .. } => (v, pi),
        }
    }
}

pub trait MdpSolver {
    /// Runs to convergence or to the iteration cap.
    ///
    /// # Errors
    /// [`MdpError::Diverged`] once the value function stops being finite.
    fn exec(&mut self) -> Result<Outcome, MdpError>;

    fn values(&self) -> &Values;

    fn actions(&self) -> &Actions;

    fn q_star(&self, s: Discrete, a: Discrete) -> Option<Continous>;

    fn v_star(&self, s: Discrete) -> Continous {
        self.values()[s]
    }

    fn pi_star(&self, s: Discrete) -> Option<Discrete> {
        self.actions().get(s).copied()
    }
}

pub struct MdpSolverPolicy<S> {
    pub mdp_solver: S,
}

impl<S: MdpSolver> Policy for MdpSolverPolicy<S> {
    fn policy(&self, s: Discrete) -> Discrete {
        self.mdp_solver
            .pi_star(s)
            .unwrap_or_else(|| panic!("State {s} is outside the solved model."))
    }
}
