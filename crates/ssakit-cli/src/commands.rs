pub mod ensemble;
pub mod inspect;
pub mod simulate;
pub mod validate;

use crate::config::models::RunConfig;
use crate::error::Result;
use ssakit::core::io::network_file::NetworkFile;
use ssakit::core::models::network::ReactionNetwork;
use ssakit::core::models::state::State;
use ssakit::core::rates::table::RateTable;
use ssakit::engine::error::EngineError;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::info;

/// Loads the network named by a run configuration and builds its initial state.
fn load_system(config: &RunConfig) -> Result<(ReactionNetwork, RateTable, State)> {
    info!("Loading reaction network from {:?}", &config.network_path);
    let (network, rates) = NetworkFile::load(&config.network_path)?;
    let initial =
        State::from_named(network.catalog(), &config.initial_counts).map_err(EngineError::from)?;
    Ok((network, rates, initial))
}

fn create_output(path: &Path) -> Result<BufWriter<File>> {
    info!("Writing output to {:?}", path);
    Ok(BufWriter::new(File::create(path)?))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::cli::{Cli, Commands, RunArgs};
    use crate::config::builder::{CommandOverrides, build_config};
    use crate::error::CliError;
    use clap::Parser;
    use std::path::PathBuf;

    pub(crate) fn demo(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../../demos")
            .join(name)
    }

    fn run_args(run_file: &str, extra: &[&str]) -> RunArgs {
        let mut argv = vec![
            "ssakit".to_string(),
            "simulate".to_string(),
            "-c".to_string(),
            demo(run_file).display().to_string(),
            "-o".to_string(),
            "out.csv".to_string(),
        ];
        argv.extend(extra.iter().map(|s| s.to_string()));
        match Cli::parse_from(argv).command {
            Commands::Simulate(args) => args.run,
            _ => unreachable!(),
        }
    }

    #[test]
    fn binding_demo_loads_with_its_initial_counts() {
        let config =
            build_config(&run_args("binding_run.toml", &[]), &CommandOverrides::default()).unwrap();
        let (network, rates, initial) = load_system(&config).unwrap();

        assert_eq!(network.catalog().names(), vec!["A", "B", "AB"]);
        assert_eq!(rates.as_slice(), &[0.05, 0.15]);
        assert_eq!(initial.counts(), &[50, 30, 20]);
        assert_eq!(config.ensemble.runs, 200);
    }

    #[test]
    fn four_square_demo_builds_the_cluster_network() {
        let config = build_config(
            &run_args("four_square_run.toml", &[]),
            &CommandOverrides::default(),
        )
        .unwrap();
        let (network, rates, initial) = load_system(&config).unwrap();

        assert_eq!(network.species_count(), 13);
        assert_eq!(rates.len(), 36);
        assert_eq!(&initial.counts()[..4], &[50, 50, 50, 50]);
        assert!(initial.counts()[4..].iter().all(|&c| c == 0));
        assert_eq!(config.ensemble.snapshot_times.len(), 5);
    }

    #[test]
    fn unknown_initial_species_is_rejected() {
        let config = build_config(
            &run_args("binding_run.toml", &["-S", "initial-counts.Z=1"]),
            &CommandOverrides::default(),
        )
        .unwrap();
        assert!(matches!(load_system(&config), Err(CliError::Core(_))));
    }
}
