use ndarray::Array1;

/// Index of a state or an action.
pub type Discrete = usize;

/// Rewards, probabilities and values.
pub type Continous = f64;

/// One value estimate per state.
pub type Values = Array1<Continous>;

/// Deterministic stationary policy: one action index per state.
pub type Actions = Array1<Discrete>;

pub trait Policy {
    fn policy(&self, s: Discrete) -> Discrete;
}

impl Policy for Actions {
    fn policy(&self, s: Discrete) -> Discrete {
        self[s]
    }
}
