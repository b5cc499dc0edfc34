mod report;

use clap::{Parser, ValueEnum};
use mdp::{envs::*, simulator::Simulator, solvers::*, Continous, Discrete, Mdp, MdpError, TabularMdp};
use report::Run;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum EnvKind {
    RiverSwim,
    TwoStateChain,
    Random,
    File,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CurrentArg {
    Weak,
    Medium,
    Strong,
}

impl From<CurrentArg> for Current {
    fn from(current: CurrentArg) -> Self {
        match current {
            CurrentArg::Weak => Self::Weak,
            CurrentArg::Medium => Self::Medium,
            CurrentArg::Strong => Self::Strong,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Algorithm {
    Pi,
    Vi,
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

/// Solve a finite MDP with policy iteration and value iteration.
#[derive(Parser, Debug)]
struct Args {
    /// Model to solve
    #[arg(long, value_enum, default_value_t = EnvKind::RiverSwim)]
    env: EnvKind,
    /// Strength of the river current (river-swim only)
    #[arg(long, value_enum, default_value_t = CurrentArg::Weak)]
    current: CurrentArg,
    /// Path to a JSON model with `rewards` and `transitions`
    #[arg(long, required_if_eq("env", "file"))]
    model: Option<PathBuf>,
    /// Number of states (random only)
    #[arg(long, default_value_t = 10)]
    states: usize,
    /// Number of actions (random only)
    #[arg(long, default_value_t = 2)]
    actions: usize,
    /// Seed for model generation and simulation
    #[arg(long, default_value_t = 1234)]
    seed: u64,
    /// Discount factor
    #[arg(long, default_value_t = 0.99)]
    gamma: Continous,
    /// Convergence tolerance on the value function
    #[arg(long, default_value_t = 1e-3)]
    theta: Continous,
    /// Give up after this many sweeps / improvement rounds
    #[arg(long)]
    max_iterations: Option<usize>,
    #[arg(long, value_enum, default_value_t = Algorithm::Both)]
    algorithm: Algorithm,
    /// Monte-Carlo episodes used to cross-check the value of state 0
    #[arg(long, default_value_t = 0)]
    episodes: usize,
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
}

impl Args {
    const fn params(&self) -> Params {
        Params {
            gamma: self.gamma,
            theta: self.theta,
            max_iterations: self.max_iterations,
        }
    }
}

/// The model being solved, plus how to name its actions.
pub enum Problem {
    River(RiverSwim),
    Tabular(String, TabularMdp),
}

impl Problem {
    fn load(args: &Args) -> Result<Self, MdpError> {
        Ok(match args.env {
            EnvKind::RiverSwim => Self::River(RiverSwim::new(args.current.into(), args.seed)),
            EnvKind::TwoStateChain => Self::Tabular("two-state chain".to_string(), two_state_chain()),
            EnvKind::Random => Self::Tabular(
                format!("random {}x{} (seed {})", args.states, args.actions, args.seed),
                random_mdp(args.states, args.actions, args.seed)?,
            ),
            EnvKind::File => {
                // clap enforces `--model` together with `--env file`.
                let path = args.model.clone().unwrap_or_default();
                let mdp = TabularMdp::from_json_file(&path)?;
                Self::Tabular(path.display().to_string(), mdp)
            }
        })
    }

    pub fn mdp(&self) -> &dyn Mdp {
        match self {
            Self::River(env) => env as &dyn Mdp,
            Self::Tabular(_, mdp) => mdp as &dyn Mdp,
        }
    }

    pub fn name(&self) -> String {
        match self {
            Self::River(env) => format!("River Swim ({} current)", env.current()),
            Self::Tabular(name, _) => name.clone(),
        }
    }

    pub fn action_label(&self, a: Discrete) -> String {
        match self {
            Self::River(_) => RiverSwim::action_name(a).to_string(),
            Self::Tabular(..) => a.to_string(),
        }
    }
}

/// Steps after which `gamma^t` no longer matters for the estimate.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn horizon(gamma: Continous) -> usize {
    if gamma <= 0. {
        1
    } else if gamma < 1. {
        ((1e-6_f64.ln() / gamma.ln()).ceil() as usize).clamp(1, 100_000)
    } else {
        1_000
    }
}

fn main() -> Result<(), MdpError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let params = args.params();
    let problem = Problem::load(&args)?;
    let mdp = problem.mdp();
    info!(
        env = %problem.name(),
        n_s = mdp.n_s(),
        n_a = mdp.n_a(),
        ?params,
        "solving"
    );

    let mut runs = vec![];
    if matches!(args.algorithm, Algorithm::Pi | Algorithm::Both) {
        runs.push(Run::new("Policy Iteration", policy_iteration(mdp, &params)?));
    }
    if matches!(args.algorithm, Algorithm::Vi | Algorithm::Both) {
        runs.push(Run::new("Value Iteration", value_iteration(mdp, &params)?));
    }

    if args.episodes > 0 {
        for run in &mut runs {
            let estimate = Simulator::new(mdp, args.seed).estimate_return(
                run.outcome.pi(),
                0,
                args.episodes,
                horizon(params.gamma),
                params.gamma,
            )?;
            run.estimated_return = Some(estimate);
        }
    }

    match args.format {
        Format::Text => report::print_text(&problem, &runs),
        Format::Json => report::print_json(&problem, &params, &runs)?,
    }

    Ok(())
}
