use crate::*;
use rand::distributions::WeightedError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MdpError {
    #[error("model has no states")]
    EmptyStateSpace,
    #[error("model has no actions")]
    EmptyActionSpace,
    #[error("rewards have shape {rewards:?} but transitions have shape {transitions:?}")]
    ShapeMismatch {
        rewards: (usize, usize),
        transitions: (usize, usize, usize),
    },
    #[error("ragged model: {0}")]
    RaggedModel(String),
    #[error("T[{state}, {action}, {next_state}] = {p} is not a probability")]
    NotAProbability {
        state: Discrete,
        action: Discrete,
        next_state: Discrete,
        p: Continous,
    },
    #[error("transition row for state {state}, action {action} sums to {sum}, expected 1")]
    RowNotStochastic {
        state: Discrete,
        action: Discrete,
        sum: Continous,
    },
    #[error("R[{state}, {action}] is not finite")]
    NonFiniteReward { state: Discrete, action: Discrete },
    #[error("discount factor {0} must lie in [0, 1), or be 1 with an iteration cap")]
    InvalidDiscount(Continous),
    #[error("tolerance {0} must be positive and finite")]
    InvalidTolerance(Continous),
    #[error("value function stopped being finite after {sweeps} sweeps")]
    Diverged { sweeps: usize },
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Weighted(#[from] WeightedError),
}
