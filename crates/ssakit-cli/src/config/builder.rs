use super::defaults::DefaultsConfig;
use super::file::FileConfig;
use super::models::RunConfig;
use crate::cli::{EnsembleOverrides, RunArgs};
use crate::error::{CliError, Result};
use ssakit::engine::config::{EnsembleConfigBuilder, SimulationConfigBuilder};
use ssakit::workflows::validate::ValidationConfig;
use std::path::PathBuf;
use std::str::FromStr;

/// Command-specific flags that take part in the merge.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandOverrides {
    pub record_events: bool,
    pub ensemble: EnsembleOverrides,
    pub ode_step: Option<f64>,
}

pub fn build_config(args: &RunArgs, overrides: &CommandOverrides) -> Result<RunConfig> {
    let defaults = DefaultsConfig::default();
    let file_config = FileConfig::from_file(&args.config)?;
    let mut file_config = apply_set_values(file_config, &args.set_values)?;

    let network_path = args
        .network
        .clone()
        .or(file_config.network.take())
        .ok_or_else(|| {
            CliError::Config(
                "A value for 'network' is required either in the run file or via --network."
                    .to_string(),
            )
        })?;

    let record_events = overrides.record_events
        || file_config
            .record_events
            .unwrap_or(defaults.record_events);

    let simulation = SimulationConfigBuilder::new()
        .t_max(args.t_max.or(file_config.t_max).unwrap_or(defaults.t_max))
        .max_steps(
            args.max_steps
                .or(file_config.max_steps)
                .unwrap_or(defaults.max_steps),
        )
        .maybe_seed(args.seed.or(file_config.seed))
        .record_events(record_events)
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    let ensemble_file = file_config.ensemble.take().unwrap_or_default();
    let ensemble = EnsembleConfigBuilder::new()
        .simulation(simulation.clone())
        .runs(
            overrides
                .ensemble
                .runs
                .or(ensemble_file.runs)
                .unwrap_or(defaults.runs),
        )
        .grid_points(
            overrides
                .ensemble
                .grid_points
                .or(ensemble_file.grid_points)
                .unwrap_or(defaults.grid_points),
        )
        .snapshot_times(ensemble_file.snapshot_times.unwrap_or_default())
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    let validation_file = file_config.validation.take().unwrap_or_default();
    let validation = ValidationConfig {
        ode_step: overrides
            .ode_step
            .or(validation_file.ode_step)
            .unwrap_or(defaults.ode_step),
        steady_state_tolerance: validation_file
            .steady_state_tolerance
            .unwrap_or(defaults.steady_state_tolerance),
        steady_state_max_time: validation_file
            .steady_state_max_time
            .unwrap_or(defaults.steady_state_max_time),
    };

    Ok(RunConfig {
        network_path,
        initial_counts: file_config.initial_counts.into_iter().collect(),
        simulation,
        ensemble,
        validation,
    })
}

fn parse_value<T: FromStr>(key: &str, value: &str, kind: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid {} value for {}: {}", kind, key, value)))
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let Some((key, value)) = kv_pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        };

        match key {
            "network" => config.network = Some(PathBuf::from(value)),
            "t-max" => config.t_max = Some(parse_value(key, value, "float")?),
            "max-steps" => config.max_steps = Some(parse_value(key, value, "integer")?),
            "seed" => config.seed = Some(parse_value(key, value, "integer")?),
            "record-events" => config.record_events = Some(parse_value(key, value, "boolean")?),
            "ensemble.runs" => {
                config.ensemble.get_or_insert_with(Default::default).runs =
                    Some(parse_value(key, value, "integer")?);
            }
            "ensemble.grid-points" => {
                config.ensemble.get_or_insert_with(Default::default).grid_points =
                    Some(parse_value(key, value, "integer")?);
            }
            "ensemble.snapshot-times" => {
                let times = value
                    .split(',')
                    .map(|t| parse_value(key, t, "float"))
                    .collect::<Result<Vec<f64>>>()?;
                config.ensemble.get_or_insert_with(Default::default).snapshot_times = Some(times);
            }
            "validation.ode-step" => {
                config.validation.get_or_insert_with(Default::default).ode_step =
                    Some(parse_value(key, value, "float")?);
            }
            "validation.steady-state-tolerance" => {
                config
                    .validation
                    .get_or_insert_with(Default::default)
                    .steady_state_tolerance = Some(parse_value(key, value, "float")?);
            }
            "validation.steady-state-max-time" => {
                config
                    .validation
                    .get_or_insert_with(Default::default)
                    .steady_state_max_time = Some(parse_value(key, value, "float")?);
            }
            _ => match key.strip_prefix("initial-counts.") {
                Some(species) if !species.is_empty() => {
                    config
                        .initial_counts
                        .insert(species.to_string(), parse_value(key, value, "integer")?);
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            },
        }
    }
    Ok(config)
}
