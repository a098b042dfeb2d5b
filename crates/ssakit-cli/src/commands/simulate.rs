use super::{create_output, load_system};
use crate::cli::SimulateArgs;
use crate::config::builder::{CommandOverrides, build_config};
use crate::error::Result;
use ssakit::core::io::trajectory_csv;
use ssakit::workflows;
use tracing::info;

pub fn run(args: SimulateArgs) -> Result<()> {
    let overrides = CommandOverrides {
        record_events: args.events.is_some(),
        ..Default::default()
    };
    info!("Merging configuration from run file and CLI arguments...");
    let config = build_config(&args.run, &overrides)?;
    let (network, rates, initial) = load_system(&config)?;

    println!(
        "Simulating {} species and {} reactions up to t = {}...",
        network.species_count(),
        network.reaction_count(),
        config.simulation.t_max
    );
    let trajectory = workflows::simulate::run(&network, &rates, &initial, &config.simulation)?;

    trajectory_csv::write_trajectory(&trajectory, create_output(&args.output)?)?;
    println!(
        "✓ Trajectory ({} records) written to: {}",
        trajectory.len(),
        args.output.display()
    );

    if let Some(path) = &args.events {
        let labels: Vec<String> = network.reactions().iter().map(|r| r.label.clone()).collect();
        trajectory_csv::write_events(&trajectory, &labels, create_output(path)?)?;
        println!(
            "✓ Event log ({} events) written to: {}",
            trajectory.events().map_or(0, <[_]>::len),
            path.display()
        );
    }

    println!(
        "  Halted ({}) after {} reactions at t = {:.4}",
        trajectory.halt(),
        trajectory.steps(),
        trajectory.final_time()
    );
    for (name, count) in trajectory.species_names().iter().zip(trajectory.final_state()) {
        println!("  {:<12} {}", name, count);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use crate::commands::tests::demo;
    use clap::Parser;
    use tempfile::tempdir;

    #[test]
    fn writes_trajectory_and_event_log() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("trajectory.csv");
        let events = dir.path().join("events.csv");
        let cli = Cli::parse_from([
            "ssakit".to_string(),
            "simulate".to_string(),
            "-c".to_string(),
            demo("binding_run.toml").display().to_string(),
            "-t".to_string(),
            "5".to_string(),
            "-o".to_string(),
            output.display().to_string(),
            "-e".to_string(),
            events.display().to_string(),
        ]);
        let Commands::Simulate(args) = cli.command else {
            unreachable!()
        };
        run(args).unwrap();

        let trajectory = std::fs::read_to_string(&output).unwrap();
        let mut lines = trajectory.lines();
        assert_eq!(lines.next(), Some("time,A,B,AB"));
        assert_eq!(lines.next(), Some("0,50,30,20"));

        let log = std::fs::read_to_string(&events).unwrap();
        assert!(log.starts_with("time,event,A,B,AB\n"));
        assert!(log.trim_end().lines().last().unwrap().contains(",stop:"));
    }
}
