use super::{create_output, load_system};
use crate::cli::EnsembleArgs;
use crate::config::builder::{CommandOverrides, build_config};
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use ssakit::core::io::trajectory_csv;
use ssakit::engine::progress::ProgressReporter;
use ssakit::engine::stepper::HaltReason;
use ssakit::workflows::{self, ensemble::EnsembleResult};
use tracing::info;

pub fn run(args: EnsembleArgs) -> Result<()> {
    let overrides = CommandOverrides {
        ensemble: args.ensemble,
        ..Default::default()
    };
    info!("Merging configuration from run file and CLI arguments...");
    let config = build_config(&args.run, &overrides)?;
    let (network, rates, initial) = load_system(&config)?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Running {} independent simulations up to t = {}...",
        config.ensemble.runs, config.simulation.t_max
    );
    let result = workflows::ensemble::run(&network, &rates, &initial, &config.ensemble, &reporter)?;

    trajectory_csv::write_ensemble(&result, create_output(&args.output)?)?;
    println!(
        "✓ Ensemble mean/SD ({} grid points) written to: {}",
        result.grid.len(),
        args.output.display()
    );
    print_summary(&result);
    Ok(())
}

pub(super) fn print_summary(result: &EnsembleResult) {
    println!(
        "  Common horizon: {:.4} ({} reactions in total)",
        result.common_horizon, result.total_steps
    );
    for reason in HaltReason::ALL {
        println!(
            "  {:<14} {:>6} run(s)",
            reason.as_str(),
            result.halt_counts.get(reason)
        );
    }

    for composition in &result.compositions {
        println!("  Size composition at t = {:.4}:", composition.time);
        for ((size, mean), se) in composition
            .sizes
            .iter()
            .zip(&composition.mean_fraction)
            .zip(&composition.standard_error)
        {
            println!("    size {:<3} {:.4} ± {:.4}", size, mean, se);
        }
    }
}
