use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "SSAKit CLI - exact stochastic simulation of chemical reaction networks with Gillespie's direct method, ensemble statistics, and mean-field cross-validation.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for ensemble runs.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a single stochastic simulation and write its trajectory.
    Simulate(SimulateArgs),
    /// Run an ensemble of independent simulations and write mean/SD curves.
    Ensemble(EnsembleArgs),
    /// Compare an ensemble against the mean-field ODE and check detailed balance.
    Validate(ValidateArgs),
    /// Print the species, reactions, and rate constants of a network file.
    Inspect(InspectArgs),
}

/// Options shared by every command that runs simulations.
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Path to the run configuration file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub config: PathBuf,

    /// Override the network file named in the run configuration.
    #[arg(long, value_name = "PATH")]
    pub network: Option<PathBuf>,

    /// Override the simulated time span.
    #[arg(short = 't', long, value_name = "FLOAT")]
    pub t_max: Option<f64>,

    /// Override the maximum number of reactions per run.
    #[arg(long, value_name = "INT")]
    pub max_steps: Option<u64>,

    /// Override the random seed. Runs are unseeded when no seed is given anywhere.
    #[arg(short, long, value_name = "INT")]
    pub seed: Option<u64>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S initial-counts.A=70
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `simulate` subcommand.
#[derive(Args, Debug)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub run: RunArgs,

    /// Path for the trajectory CSV file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Also record every reaction event and write the log to this CSV file.
    #[arg(short, long, value_name = "PATH")]
    pub events: Option<PathBuf>,
}

/// Ensemble sizing shared by `ensemble` and `validate`.
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct EnsembleOverrides {
    /// Override the number of independent runs.
    #[arg(short = 'n', long, value_name = "INT")]
    pub runs: Option<usize>,

    /// Override the number of points on the common time grid.
    #[arg(long, value_name = "INT")]
    pub grid_points: Option<usize>,
}

/// Arguments for the `ensemble` subcommand.
#[derive(Args, Debug)]
pub struct EnsembleArgs {
    #[command(flatten)]
    pub run: RunArgs,

    #[command(flatten)]
    pub ensemble: EnsembleOverrides,

    /// Path for the mean/SD CSV file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,
}

/// Arguments for the `validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub run: RunArgs,

    #[command(flatten)]
    pub ensemble: EnsembleOverrides,

    /// Override the fixed RK4 step used for the mean-field solution.
    #[arg(long, value_name = "FLOAT")]
    pub ode_step: Option<f64>,

    /// Write the mean-field solution, sampled on the ensemble grid, to this CSV file.
    #[arg(long, value_name = "PATH")]
    pub ode_output: Option<PathBuf>,

    /// Write the ensemble mean/SD curves to this CSV file.
    #[arg(long, value_name = "PATH")]
    pub ensemble_output: Option<PathBuf>,
}

/// Arguments for the `inspect` subcommand.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Path to the network file in TOML format.
    #[arg(value_name = "PATH")]
    pub network: PathBuf,
}
