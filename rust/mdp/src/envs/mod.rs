mod chain;
mod random;
mod river_swim;

pub use chain::{single_state, two_state_chain};
pub use random::random_mdp;
pub use river_swim::{Current, RiverSwim, LEFT, RIGHT};
