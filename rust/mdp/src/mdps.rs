use crate::*;
use itertools::iproduct;
use ndarray::{Array2, Array3, ArrayView2, ArrayView3};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// How far a transition row may sum away from 1 and still be accepted.
pub const PROBABILITY_TOLERANCE: Continous = 1e-6;

/// Markov Decision Process - Sutton & Barto 2018.
///
/// The discount factor is a property of the solve, not of the model, so it is
/// passed to the solvers instead.
pub trait Mdp {
    fn n_s(&self) -> usize {
        self.rewards().nrows()
    }

    fn n_a(&self) -> usize {
        self.rewards().ncols()
    }

    /// `R[s, a]`, shape `(n_s, n_a)`.
    fn rewards(&self) -> ArrayView2<'_, Continous>;

    /// `T[s, a, s']`, shape `(n_s, n_a, n_s)`.
    fn transitions(&self) -> ArrayView3<'_, Continous>;
}

/// Checks shapes, finiteness and that every `T[s, a, ..]` is a distribution.
pub fn validate<M: Mdp + ?Sized>(mdp: &M) -> Result<(), MdpError> {
    let r = mdp.rewards();
    let t = mdp.transitions();
    let (n_s, n_a) = r.dim();

    if t.dim() != (n_s, n_a, n_s) {
        return Err(MdpError::ShapeMismatch {
            rewards: r.dim(),
            transitions: t.dim(),
        });
    }
    if n_s == 0 {
        return Err(MdpError::EmptyStateSpace);
    }
    if n_a == 0 {
        return Err(MdpError::EmptyActionSpace);
    }

    for (s, a) in iproduct!(0..n_s, 0..n_a) {
        if !r[[s, a]].is_finite() {
            return Err(MdpError::NonFiniteReward {
                state: s,
                action: a,
            });
        }

        let mut sum = 0.;
        for s_next in 0..n_s {
            let p = t[[s, a, s_next]];
            if !p.is_finite() || p < 0. {
                return Err(MdpError::NotAProbability {
                    state: s,
                    action: a,
                    next_state: s_next,
                    p,
                });
            }
            sum += p;
        }

        if (sum - 1.).abs() > PROBABILITY_TOLERANCE {
            return Err(MdpError::RowNotStochastic {
                state: s,
                action: a,
                sum,
            });
        }
    }

    Ok(())
}

/// Dense, validated model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ModelFile", into = "ModelFile")]
pub struct TabularMdp {
    rewards: Array2<Continous>,
    transitions: Array3<Continous>,
}

impl TabularMdp {
    pub fn new(
        rewards: Array2<Continous>,
        transitions: Array3<Continous>,
    ) -> Result<Self, MdpError> {
        let mdp = Self {
            rewards,
            transitions,
        };
        validate(&mdp)?;

        Ok(mdp)
    }

    /// Builds a model from nested rows, `rewards[s][a]` and `transitions[s][a][s']`.
    pub fn from_nested(
        rewards: Vec<Vec<Continous>>,
        transitions: Vec<Vec<Vec<Continous>>>,
    ) -> Result<Self, MdpError> {
        let n_s = rewards.len();
        let n_a = rewards.first().map_or(0, Vec::len);
        if rewards.iter().any(|row| row.len() != n_a) {
            return Err(MdpError::RaggedModel(
                "reward rows have different lengths".to_string(),
            ));
        }

        let t_s = transitions.len();
        let t_a = transitions.first().map_or(0, Vec::len);
        let t_n = transitions
            .first()
            .and_then(|sa| sa.first())
            .map_or(0, Vec::len);
        if transitions
            .iter()
            .any(|sa| sa.len() != t_a || sa.iter().any(|row| row.len() != t_n))
        {
            return Err(MdpError::RaggedModel(
                "transition rows have different lengths".to_string(),
            ));
        }

        let rewards = Array2::from_shape_vec((n_s, n_a), rewards.into_iter().flatten().collect())
            .map_err(|e| MdpError::RaggedModel(e.to_string()))?;
        let transitions = Array3::from_shape_vec(
            (t_s, t_a, t_n),
            transitions.into_iter().flatten().flatten().collect(),
        )
        .map_err(|e| MdpError::RaggedModel(e.to_string()))?;

        Self::new(rewards, transitions)
    }

    /// For models built from constants that are valid by construction.
    pub(crate) fn new_unchecked(
        rewards: Array2<Continous>,
        transitions: Array3<Continous>,
    ) -> Self {
        let mdp = Self {
            rewards,
            transitions,
        };
        debug_assert!(validate(&mdp).is_ok());

        mdp
    }

    /// Parses `{ "rewards": [[..]], "transitions": [[[..]]] }`.
    pub fn from_json_str(json: &str) -> Result<Self, MdpError> {
        let file: ModelFile = serde_json::from_str(json)?;
        Self::try_from(file)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, MdpError> {
        let reader = BufReader::new(File::open(path)?);
        let file: ModelFile = serde_json::from_reader(reader)?;
        Self::try_from(file)
    }
}

impl Mdp for TabularMdp {
    fn rewards(&self) -> ArrayView2<'_, Continous> {
        self.rewards.view()
    }

    fn transitions(&self) -> ArrayView3<'_, Continous> {
        self.transitions.view()
    }
}

/// On-disk model layout.
#[derive(Debug, Serialize, Deserialize)]
struct ModelFile {
    rewards: Vec<Vec<Continous>>,
    transitions: Vec<Vec<Vec<Continous>>>,
}

impl TryFrom<ModelFile> for TabularMdp {
    type Error = MdpError;

    fn try_from(file: ModelFile) -> Result<Self, Self::Error> {
        Self::from_nested(file.rewards, file.transitions)
    }
}

impl From<TabularMdp> for ModelFile {
    fn from(mdp: TabularMdp) -> Self {
        Self {
            rewards: mdp.rewards.outer_iter().map(|row| row.to_vec()).collect(),
            transitions: mdp
                .transitions
                .outer_iter()
                .map(|sa| sa.outer_iter().map(|row| row.to_vec()).collect())
                .collect(),
        }
    }
}
