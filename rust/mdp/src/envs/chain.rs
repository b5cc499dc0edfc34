use crate::*;
use ndarray::array;

/// Two states, two actions. Action 0 stays put, action 1 moves to state 1,
/// which then loops on itself. Only `(1, 1)` pays a reward of 1.
pub fn two_state_chain() -> TabularMdp {
    TabularMdp::new_unchecked(
        array![[0., 0.], [0., 1.]],
        array![[[1., 0.], [0., 1.]], [[0., 1.], [0., 1.]]],
    )
}

/// One state, one action, a self loop paying `reward`.
///
/// # Panics
/// If `reward` is not finite.
pub fn single_state(reward: Continous) -> TabularMdp {
    assert!(reward.is_finite(), "Reward must be finite.");

    TabularMdp::new_unchecked(array![[reward]], array![[[1.]]])
}
