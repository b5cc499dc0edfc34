use crate::*;
use ndarray::s;
use rand::distributions::WeightedIndex;
use rand::prelude::*;

pub trait Weighted<S> {
    fn s(&self) -> S;

    fn p(&self) -> Continous;
}

/// `(next_state, probability)`.
impl Weighted<Discrete> for (Discrete, Continous) {
    fn s(&self) -> Discrete {
        self.0
    }

    fn p(&self) -> Continous {
        self.1
    }
}

pub fn pick_next<T, S>(rng: &mut StdRng, ts: &[T]) -> Result<S, MdpError>
where
    T: Weighted<S>,
{
    let dist = WeightedIndex::new(ts.iter().map(|t| t.p()))?;
    Ok(ts[dist.sample(rng)].s())
}

/// Samples trajectories from a known model.
pub struct Simulator<'a, M: Mdp + ?Sized> {
    mdp: &'a M,
    rng: StdRng,
    state: Discrete,
}

impl<'a, M: Mdp + ?Sized> Simulator<'a, M> {
    pub fn new(mdp: &'a M, seed: u64) -> Self {
        Self {
            mdp,
            rng: StdRng::seed_from_u64(seed),
            state: 0,
        }
    }

    pub const fn state(&self) -> Discrete {
        self.state
    }

    /// # Panics
    /// If `state` is not a state of the model.
    pub fn reset(&mut self, state: Discrete) {
        assert!(state < self.mdp.n_s(), "State {state} out of range.");
        self.state = state;
    }

    /// Takes `action`, returning the sampled next state and the reward
    /// `R[s, action]` collected on the way.
    pub fn step(&mut self, action: Discrete) -> Result<(Discrete, Continous), MdpError> {
        let reward = self.mdp.rewards()[[self.state, action]];
        let row = self
            .mdp
            .transitions()
            .slice(s![self.state, action, ..])
            .iter()
            .copied()
            .enumerate()
            .collect::<Vec<_>>();

        self.state = pick_next(&mut self.rng, &row)?;
        Ok((self.state, reward))
    }

    /// Discounted return of following `policy` for `horizon` steps from `start`.
    pub fn discounted_return(
        &mut self,
        policy: &impl Policy,
        start: Discrete,
        horizon: usize,
        gamma: Continous,
    ) -> Result<Continous, MdpError> {
        self.reset(start);

        let mut g = 0.;
        let mut discount = 1.;
        for _ in 0..horizon {
            let (_, r) = self.step(policy.policy(self.state))?;
            g += discount * r;
            discount *= gamma;
        }

        Ok(g)
    }

    /// Monte-Carlo estimate of the policy's value at `start`.
    pub fn estimate_return(
        &mut self,
        policy: &impl Policy,
        start: Discrete,
        episodes: usize,
        horizon: usize,
        gamma: Continous,
    ) -> Result<Continous, MdpError> {
        if episodes == 0 {
            return Ok(0.);
        }

        let mut total = 0.;
        for _ in 0..episodes {
            total += self.discounted_return(policy, start, horizon, gamma)?;
        }

        Ok(total / episodes as Continous)
    }
}
