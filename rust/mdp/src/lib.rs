//! Dynamic programming for finite Markov Decision Processes.
//!
//! A model provider hands over a reward table `R` of shape `(S, A)` and a
//! transition tensor `T` of shape `(S, A, S)` through the [`Mdp`] trait.
//! The solvers in [`solvers`] turn that model into an optimal value function
//! and a deterministic greedy policy, either by Policy Iteration or by Value
//! Iteration.
//!
//! ```
//! use mdp::{envs, solvers::{policy_iteration, Params}};
//!
//! let mdp = envs::two_state_chain();
//! let outcome = policy_iteration(&mdp, &Params::new(0.9, 1e-6)).unwrap();
//! assert!(outcome.is_converged());
//! assert_eq!(outcome.pi().to_vec(), vec![1, 1]);
//! ```

pub mod common;
pub mod envs;
pub mod error;
pub mod mdps;
pub mod simulator;
pub mod solvers;

pub use common::defs::*;
pub use error::MdpError;
pub use mdps::{Mdp, TabularMdp};
pub use solvers::{
    bellman_backup, policy_evaluation, policy_improvement, policy_iteration, q_values,
    value_iteration, MdpSolver, Outcome, Params,
};
