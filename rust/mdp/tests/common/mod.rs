use mdp::*;
use ndarray::Array1;

/// `R[s, pi[s]] + gamma * sum_{s'} T[s, pi[s], s'] * V[s']` for every state.
#[allow(dead_code)]
pub fn bellman_expectation(mdp: &impl Mdp, pi: &Actions, gamma: Continous, v: &Values) -> Values {
    let (r, t) = (mdp.rewards(), mdp.transitions());
    Array1::from_shape_fn(mdp.n_s(), |s| {
        let a = pi[s];
        r[[s, a]] + gamma * (0..mdp.n_s()).map(|s_next| t[[s, a, s_next]] * v[s_next]).sum::<Continous>()
    })
}

/// Largest entry-wise difference.
#[allow(dead_code)]
pub fn sup_norm(a: &Values, b: &Values) -> Continous {
    (a - b).iter().fold(0., |m, x| m.max(x.abs()))
}
