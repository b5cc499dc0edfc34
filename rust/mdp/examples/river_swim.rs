extern crate mdp;

use mdp::{envs::*, solvers::*, MdpError};

fn main() -> Result<(), MdpError> {
    let params = Params::new(0.99, 1e-3);

    for current in [Current::Weak, Current::Medium, Current::Strong] {
        let env = RiverSwim::new(current, 1234);
        let pi = policy_iteration(&env, &params)?;
        let vi = value_iteration(&env, &params)?;

        println!("{current}");
        println!("  PI: {:.3} {:?}", pi.v(), policy_letters(pi.pi()));
        println!("  VI: {:.3} {:?}", vi.v(), policy_letters(vi.pi()));
    }

    Ok(())
}

fn policy_letters(pi: &mdp::Actions) -> String {
    pi.iter().map(|&a| RiverSwim::action_name(a)).collect()
}
