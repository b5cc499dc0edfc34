use crate::simulator::Simulator;
use crate::*;
use ndarray::{Array2, Array3, ArrayView2, ArrayView3};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const LEFT: Discrete = 0;
pub const RIGHT: Discrete = 1;

/// Strength of the current the swimmer fights when heading right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Current {
    Weak,
    Medium,
    Strong,
}

impl Current {
    /// `(right, stay, left)` probabilities of a RIGHT stroke.
    pub const fn probabilities(self) -> (Continous, Continous, Continous) {
        match self {
            Self::Weak => (0.6, 0.3, 0.1),
            Self::Medium => (0.4, 0.3, 0.3),
            Self::Strong => (0.2, 0.3, 0.5),
        }
    }
}

impl fmt::Display for Current {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Weak => "WEAK",
            Self::Medium => "MEDIUM",
            Self::Strong => "STRONG",
        };
        f.write_str(name)
    }
}

/// River Swim: a row of six river segments.
///
/// Swimming LEFT (downstream) always works and pays a little at the left bank.
/// Swimming RIGHT (upstream) fights the current and pays well only once the
/// swimmer holds the right bank.
#[derive(Debug, Clone)]
pub struct RiverSwim {
    current: Current,
    seed: u64,
    model: TabularMdp,
}

impl RiverSwim {
    pub const N_S: usize = 6;
    pub const N_A: usize = 2;
    pub const LEFT_BANK_REWARD: Continous = 0.005;
    pub const RIGHT_BANK_REWARD: Continous = 1.;

    pub fn new(current: Current, seed: u64) -> Self {
        let last = Self::N_S - 1;

        let mut rewards = Array2::zeros((Self::N_S, Self::N_A));
        rewards[[0, LEFT]] = Self::LEFT_BANK_REWARD;
        rewards[[last, RIGHT]] = Self::RIGHT_BANK_REWARD;

        let (right, stay, left) = current.probabilities();
        let mut transitions = Array3::zeros((Self::N_S, Self::N_A, Self::N_S));
        for s in 0..Self::N_S {
            transitions[[s, LEFT, s.saturating_sub(1)]] = 1.;

            // At either bank the blocked move collapses onto staying.
            transitions[[s, RIGHT, (s + 1).min(last)]] += right;
            transitions[[s, RIGHT, s]] += stay;
            transitions[[s, RIGHT, s.saturating_sub(1)]] += left;
        }

        Self {
            current,
            seed,
            model: TabularMdp::new_unchecked(rewards, transitions),
        }
    }

    pub const fn current(&self) -> Current {
        self.current
    }

    pub const fn seed(&self) -> u64 {
        self.seed
    }

    pub const fn model(&self) -> &TabularMdp {
        &self.model
    }

    /// Simulator over this river, seeded with the environment's seed.
    pub fn simulator(&self) -> Simulator<'_, TabularMdp> {
        Simulator::new(&self.model, self.seed)
    }

    pub const fn action_name(a: Discrete) -> char {
        if a == LEFT {
            'L'
        } else {
            'R'
        }
    }
}

impl Mdp for RiverSwim {
    fn rewards(&self) -> ArrayView2<'_, Continous> {
        self.model.rewards()
    }

    fn transitions(&self) -> ArrayView3<'_, Continous> {
        self.model.transitions()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mdps::validate;
    use float_eq::*;
    use rstest::*;

    #[rstest]
    #[case(Current::Weak)]
    #[case(Current::Medium)]
    #[case(Current::Strong)]
    fn model_is_valid(#[case] current: Current) {
        let env = RiverSwim::new(current, 1234);

        assert!(validate(&env).is_ok());
        assert_eq!((env.n_s(), env.n_a()), (6, 2));
    }

    #[test]
    fn banks_absorb_blocked_moves() {
        let env = RiverSwim::new(Current::Medium, 1234);
        let t = env.transitions();

        assert_float_eq!(t[[0, LEFT, 0]], 1., abs <= 1e-12);
        assert_float_eq!(t[[0, RIGHT, 0]], 0.6, abs <= 1e-12);
        assert_float_eq!(t[[0, RIGHT, 1]], 0.4, abs <= 1e-12);
        assert_float_eq!(t[[5, RIGHT, 5]], 0.7, abs <= 1e-12);
        assert_float_eq!(t[[5, RIGHT, 4]], 0.3, abs <= 1e-12);
        assert_float_eq!(t[[3, RIGHT, 4]], 0.4, abs <= 1e-12);
        assert_float_eq!(t[[3, LEFT, 2]], 1., abs <= 1e-12);
    }

    #[test]
    fn rewards_sit_on_the_banks() {
        let env = RiverSwim::new(Current::Weak, 1234);
        let r = env.rewards();

        assert_float_eq!(r[[0, LEFT]], 0.005, abs <= 1e-12);
        assert_float_eq!(r[[5, RIGHT]], 1., abs <= 1e-12);
        assert_float_eq!(r.sum(), 1.005, abs <= 1e-12);
    }

    #[test]
    fn current_names() {
        assert_eq!(Current::Strong.to_string(), "STRONG");
        assert_eq!(RiverSwim::action_name(LEFT), 'L');
        assert_eq!(RiverSwim::action_name(RIGHT), 'R');
    }
}
