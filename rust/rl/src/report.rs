use crate::Problem;
use itertools::Itertools;
use mdp::{solvers::*, Continous, MdpError};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Run {
    pub algorithm: &'static str,
    pub outcome: Outcome,
    pub estimated_return: Option<Continous>,
}

impl Run {
    pub const fn new(algorithm: &'static str, outcome: Outcome) -> Self {
        Self {
            algorithm,
            outcome,
            estimated_return: None,
        }
    }

    fn status(&self) -> String {
        let n = self.outcome.iterations();
        if self.outcome.is_converged() {
            format!("converged after {n} iterations")
        } else {
            format!("did not converge within {n} iterations, showing best estimate")
        }
    }
}

fn banner(title: &str) -> String {
    let rule = "-".repeat(25);
    format!("\n{rule}\nBeginning {title}\n{rule}")
}

pub fn format_text(problem: &Problem, runs: &[Run]) -> String {
    let mut out = vec![problem.name()];
    for run in runs {
        out.push(banner(run.algorithm));
        out.push(format!(
            "[{}]",
            run.outcome.v().iter().map(|v| format!("{v:.3}")).join(" ")
        ));
        out.push(format!(
            "[{}]",
            run.outcome
                .pi()
                .iter()
                .map(|&a| problem.action_label(a))
                .join(", ")
        ));
        out.push(run.status());
        if let Some(g) = run.estimated_return {
            out.push(format!("simulated return from state 0: {g:.3}"));
        }
    }

    out.join("\n")
}

pub fn print_text(problem: &Problem, runs: &[Run]) {
    println!("{}", format_text(problem, runs));
}

#[derive(Serialize)]
struct JsonReport<'a> {
    env: String,
    params: &'a Params,
    runs: &'a [Run],
}

pub fn print_json(problem: &Problem, params: &Params, runs: &[Run]) -> Result<(), MdpError> {
    let report = JsonReport {
        env: problem.name(),
        params,
        runs,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdp::envs::{two_state_chain, Current, RiverSwim};

    #[test]
    fn text_report_for_chain() {
        let problem = Problem::Tabular("two-state chain".to_string(), two_state_chain());
        let outcome = policy_iteration(problem.mdp(), &Params::new(0.9, 1e-9)).unwrap();
        let text = format_text(&problem, &[Run::new("Policy Iteration", outcome)]);

        assert_eq!(
            text,
            "two-state chain\n\
             \n-------------------------\n\
             Beginning Policy Iteration\n\
             -------------------------\n\
             [9.000 10.000]\n\
             [1, 1]\n\
             converged after 3 iterations"
        );
    }

    #[test]
    fn text_report_names_river_actions() {
        let problem = Problem::River(RiverSwim::new(Current::Weak, 1234));
        let params = Params::new(0.99, 1e-3).with_max_iterations(1);
        let mut run = Run::new("Value Iteration", value_iteration(problem.mdp(), &params).unwrap());
        run.estimated_return = Some(0.5);

        let text = format_text(&problem, &[run]);
        assert!(text.starts_with("River Swim (WEAK current)"));
        assert!(text.contains("[L, L, L, L, R, R]"));
        assert!(text.contains("did not converge within 1 iterations"));
        assert!(text.ends_with("simulated return from state 0: 0.500"));
    }
}
