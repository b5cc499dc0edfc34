use crate::*;
use ndarray::{Array2, Array3, Axis};
use rand::prelude::*;

/// Dense random model: rewards uniform in `[-1, 1)`, each transition row a
/// normalised vector of uniform weights. Same seed, same model.
pub fn random_mdp(n_s: usize, n_a: usize, seed: u64) -> Result<TabularMdp, MdpError> {
    let rng = &mut StdRng::seed_from_u64(seed);

    let rewards = Array2::from_shape_fn((n_s, n_a), |_| rng.gen_range(-1.0..1.0));
    let mut transitions = Array3::from_shape_fn((n_s, n_a, n_s), |_| rng.gen_range(1e-3..1.0));
    for mut row in transitions.lanes_mut(Axis(2)) {
        let sum = row.sum();
        row.mapv_inplace(|p| p / sum);
    }

    TabularMdp::new(rewards, transitions)
}
