use crate::common::utils::argmax_first;
use crate::*;
use ndarray::s;

/// Expected discounted return of taking `action` in `state` once and then
/// collecting `v`:
///
/// `sum_{s'} T[s, a, s'] * (R[s, a] + gamma * v[s'])`
///
/// The reward sits inside the sum, so it is weighted by the outgoing
/// probability mass of the row.
pub fn bellman_backup<M: Mdp + ?Sized>(
    mdp: &M,
    state: Discrete,
    action: Discrete,
    gamma: Continous,
    v: &Values,
) -> Continous {
    let (n_s, n_a) = (mdp.n_s(), mdp.n_a());
    assert!(state < n_s, "State {state} out of range 0..{n_s}.");
    assert!(action < n_a, "Action {action} out of range 0..{n_a}.");
    assert_eq!(v.len(), n_s, "Value function must have one entry per state.");

    let r = mdp.rewards()[[state, action]];
    mdp.transitions()
        .slice(s![state, action, ..])
        .iter()
        .zip(v.iter())
        .map(|(p, v_next)| p * (r + gamma * v_next))
        .sum()
}

/// One backup per action.
pub fn q_values<M: Mdp + ?Sized>(
    mdp: &M,
    state: Discrete,
    gamma: Continous,
    v: &Values,
) -> Values {
    (0..mdp.n_a())
        .map(|a| bellman_backup(mdp, state, a, gamma, v))
        .collect()
}

/// Best action in `state` and its value; lowest index wins ties.
pub(crate) fn greedy<M: Mdp + ?Sized>(
    mdp: &M,
    state: Discrete,
    gamma: Continous,
    v: &Values,
) -> (Discrete, Continous) {
    argmax_first(q_values(mdp, state, gamma, v).view()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envs::*;
    use float_eq::*;
    use ndarray::array;

    #[test]
    fn backup_on_deterministic_chain() {
        let mdp = two_state_chain();
        let v = array![2., 10.];

        assert_float_eq!(bellman_backup(&mdp, 0, 0, 0.9, &v), 1.8, abs <= 1e-12);
        assert_float_eq!(bellman_backup(&mdp, 0, 1, 0.9, &v), 9., abs <= 1e-12);
        assert_float_eq!(bellman_backup(&mdp, 1, 1, 0.9, &v), 10., abs <= 1e-12);
    }

    #[test]
    fn backup_weights_reward_by_row_mass() {
        let mdp = TabularMdp::new(array![[3.]], array![[[1.]]]).unwrap();

        assert_float_eq!(
            bellman_backup(&mdp, 0, 0, 0.5, &array![4.]),
            3. + 0.5 * 4.,
            abs <= 1e-12
        );
    }

    #[test]
    fn q_values_cover_every_action() {
        let mdp = two_state_chain();
        let q = q_values(&mdp, 1, 0.9, &array![0., 10.]);

        assert_float_eq!(q.to_vec(), vec![9., 10.], abs_all <= 1e-12);
    }

    #[test]
    #[should_panic(expected = "Action 2 out of range")]
    fn backup_rejects_unknown_action() {
        let mdp = two_state_chain();
        let _ = bellman_backup(&mdp, 0, 2, 0.9, &array![0., 0.]);
    }

    #[test]
    #[should_panic(expected = "one entry per state")]
    fn backup_rejects_short_value_function() {
        let mdp = two_state_chain();
        let _ = bellman_backup(&mdp, 0, 0, 0.9, &array![0.]);
    }
}
