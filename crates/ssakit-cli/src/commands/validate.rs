use super::ensemble::print_summary;
use super::{create_output, load_system};
use crate::cli::ValidateArgs;
use crate::config::builder::{CommandOverrides, build_config};
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use ssakit::core::io::trajectory_csv;
use ssakit::engine::progress::ProgressReporter;
use ssakit::workflows;
use tracing::info;

pub fn run(args: ValidateArgs) -> Result<()> {
    let overrides = CommandOverrides {
        ensemble: args.ensemble,
        ode_step: args.ode_step,
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
    let ensemble = workflows::ensemble::run(&network, &rates, &initial, &config.ensemble, &reporter)?;
    print_summary(&ensemble);

    println!("Integrating the mean-field equations...");
    let report = workflows::validate::run(&network, &rates, &initial, &ensemble, &config.validation)?;

    println!(
        "  {:<12} {:>14} {:>14} {:>14}",
        "species", "max |ODE-SSA|", "final ODE", "final mean"
    );
    for deviation in &report.deviations {
        println!(
            "  {:<12} {:>14.4} {:>14.4} {:>14.4}",
            deviation.species, deviation.max_abs_deviation, deviation.final_ode, deviation.final_mean
        );
    }

    match &report.steady_state {
        Some(steady) => println!(
            "✓ Mean-field steady state reached at t = {:.4} (residual {:.3e})",
            steady.time, steady.residual
        ),
        None => println!("Warning: the mean-field system did not settle; fluxes are taken at the end of the ODE solution."),
    }

    if report.balance.is_empty() {
        println!("  No reversible reaction pairs to check for detailed balance.");
    } else {
        println!(
            "  {:<28} {:>14} {:>14} {:>12}",
            "pair", "forward flux", "backward flux", "rel. imbal."
        );
        for pair in &report.balance {
            println!(
                "  {:<28} {:>14.6e} {:>14.6e} {:>12.3e}",
                network.describe(pair.pair.forward),
                pair.forward_flux,
                pair.backward_flux,
                pair.relative_imbalance()
            );
        }
        println!(
            "  Largest relative imbalance: {:.3e}",
            report.max_relative_imbalance()
        );
    }

    if let Some(path) = &args.ode_output {
        let names = network.catalog().names();
        trajectory_csv::write_ode(&report.ode, &names, create_output(path)?)?;
        println!("✓ Mean-field solution written to: {}", path.display());
    }
    if let Some(path) = &args.ensemble_output {
        trajectory_csv::write_ensemble(&ensemble, create_output(path)?)?;
        println!("✓ Ensemble mean/SD written to: {}", path.display());
    }
    Ok(())
}
