use crate::core::models::network::ReactionNetwork;
use crate::core::models::state::State;
use crate::core::rates::table::RateTable;
use crate::engine::config::EnsembleConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::rng::{derive_seed, seeded_rng};
use crate::engine::stepper::{HaltReason, Simulator};
use crate::engine::trajectory::Trajectory;
use tracing::{info, instrument, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HaltCounts {
    pub no_propensity: usize,
    pub time_limit: usize,
    pub step_limit: usize,
}

impl HaltCounts {
    pub fn record(&mut self, reason: HaltReason) {
        match reason {
            HaltReason::NoPropensity => self.no_propensity += 1,
            HaltReason::TimeLimit => self.time_limit += 1,
            HaltReason::StepLimit => self.step_limit += 1,
        }
    }

    pub fn get(&self, reason: HaltReason) -> usize {
        match reason {
            HaltReason::NoPropensity => self.no_propensity,
            HaltReason::TimeLimit => self.time_limit,
            HaltReason::StepLimit => self.step_limit,
        }
    }

    pub fn total(&self) -> usize {
        self.no_propensity + self.time_limit + self.step_limit
    }
}

/// Share of the total monomer mass held by each cluster size class at one time point,
/// averaged over the ensemble.
#[derive(Debug, Clone, PartialEq)]
pub struct SizeComposition {
    pub time: f64,
    /// Distinct species sizes in ascending order.
    pub sizes: Vec<usize>,
    pub mean_fraction: Vec<f64>,
    pub standard_error: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnsembleResult {
    pub species: Vec<String>,
    pub runs: usize,
    /// Evenly spaced on `[0, common_horizon]`.
    pub grid: Vec<f64>,
    /// `mean[k][s]`: mean count of species `s` at `grid[k]`.
    pub mean: Vec<Vec<f64>>,
    /// Sample standard deviation (`n − 1` denominator), zero for a single run.
    pub std_dev: Vec<Vec<f64>>,
    pub common_horizon: f64,
    pub halt_counts: HaltCounts,
    pub total_steps: u64,
    pub compositions: Vec<SizeComposition>,
}

impl EnsembleResult {
    pub fn species_mean(&self, species: usize) -> Vec<f64> {
        self.mean.iter().map(|row| row[species]).collect()
    }

    pub fn species_std_dev(&self, species: usize) -> Vec<f64> {
        self.std_dev.iter().map(|row| row[species]).collect()
    }
}

#[instrument(skip_all, name = "ensemble_workflow")]
pub fn run(
    network: &ReactionNetwork,
    rates: &RateTable,
    initial: &State,
    config: &EnsembleConfig,
    reporter: &ProgressReporter,
) -> Result<EnsembleResult, EngineError> {
    initial.check_len(network.catalog())?;
    info!(
        runs = config.runs,
        t_max = config.simulation.t_max,
        seed = ?config.simulation.seed,
        "Starting ensemble simulation."
    );

    let trajectories = reporter.phase("Ensemble Simulation", || {
        simulate_runs(network, rates, initial, config, reporter)
    })?;

    let result = reporter.phase("Aggregation", || aggregate(network, &trajectories, config))?;
    if result.halt_counts.step_limit > 0 {
        reporter.report(Progress::Note(format!(
            "{} of {} runs hit the step limit; statistics end at t = {}",
            result.halt_counts.step_limit, result.runs, result.common_horizon
        )));
    }

    info!(
        runs = result.runs,
        common_horizon = result.common_horizon,
        no_propensity = result.halt_counts.no_propensity,
        time_limit = result.halt_counts.time_limit,
        step_limit = result.halt_counts.step_limit,
        "Ensemble complete."
    );
    Ok(result)
}

fn simulate_runs(
    network: &ReactionNetwork,
    rates: &RateTable,
    initial: &State,
    config: &EnsembleConfig,
    reporter: &ProgressReporter,
) -> Result<Vec<Trajectory>, EngineError> {
    let mut simulation = config.simulation.clone();
    simulation.record_events = false;

    let seeds: Vec<Option<u64>> = (0..config.runs as u64)
        .map(|index| simulation.seed.map(|base| derive_seed(base, index)))
        .collect();

    reporter.report(Progress::RunsStart {
        runs: config.runs as u64,
        t_max: simulation.t_max,
    });

    #[cfg(not(feature = "parallel"))]
    let iterator = seeds.iter();

    #[cfg(feature = "parallel")]
    let iterator = seeds.par_iter();

    let results: Vec<Result<Trajectory, EngineError>> = iterator
        .map(|&seed| {
            let trajectory =
                Simulator::new(network, rates, initial.clone(), seeded_rng(seed))?.run(&simulation)?;
            reporter.run_finished(&trajectory);
            Ok(trajectory)
        })
        .collect();

    reporter.report(Progress::RunsFinish);
    results.into_iter().collect()
}

fn aggregate(
    network: &ReactionNetwork,
    trajectories: &[Trajectory],
    config: &EnsembleConfig,
) -> Result<EnsembleResult, EngineError> {
    let common_horizon = trajectories
        .iter()
        .map(Trajectory::horizon)
        .fold(f64::INFINITY, f64::min);
    if !common_horizon.is_finite() {
        return Err(EngineError::Internal("ensemble produced no runs".into()));
    }

    let mut halt_counts = HaltCounts::default();
    for trajectory in trajectories {
        halt_counts.record(trajectory.halt());
    }
    if halt_counts.step_limit > 0 {
        warn!(
            step_limited = halt_counts.step_limit,
            common_horizon, "Some runs hit the step limit; statistics are truncated."
        );
    }

    let grid = linspace(common_horizon, config.grid_points);
    let n_species = network.species_count();
    let mut mean = Vec::with_capacity(grid.len());
    let mut std_dev = Vec::with_capacity(grid.len());
    let sampled: Vec<Vec<&[u64]>> = trajectories
        .iter()
        .map(|t| t.sample_on_grid(&grid))
        .collect::<Result<_, _>>()?;

    let mut column = vec![0.0; trajectories.len()];
    for k in 0..grid.len() {
        let mut row_mean = vec![0.0; n_species];
        let mut row_sd = vec![0.0; n_species];
        for s in 0..n_species {
            for (value, run) in column.iter_mut().zip(&sampled) {
                *value = run[k][s] as f64;
            }
            (row_mean[s], row_sd[s]) = mean_and_sd(&column);
        }
        mean.push(row_mean);
        std_dev.push(row_sd);
    }

    let mut snapshot_times = config.snapshot_times.clone();
    if snapshot_times.is_empty() {
        snapshot_times.push(common_horizon);
    }
    let mut compositions = Vec::with_capacity(snapshot_times.len());
    for time in snapshot_times {
        if time > common_horizon {
            warn!(
                time,
                common_horizon, "Skipping composition snapshot beyond the common horizon."
            );
            continue;
        }
        compositions.push(size_composition(network, trajectories, time)?);
    }

    Ok(EnsembleResult {
        species: network.catalog().names(),
        runs: trajectories.len(),
        grid,
        mean,
        std_dev,
        common_horizon,
        halt_counts,
        total_steps: trajectories.iter().map(Trajectory::steps).sum(),
        compositions,
    })
}

fn size_composition(
    network: &ReactionNetwork,
    trajectories: &[Trajectory],
    time: f64,
) -> Result<SizeComposition, EngineError> {
    let species_sizes = network.catalog().sizes();
    let mut sizes = species_sizes.clone();
    sizes.sort_unstable();
    sizes.dedup();

    // fractions[class][run]
    let mut fractions = vec![Vec::with_capacity(trajectories.len()); sizes.len()];
    for trajectory in trajectories {
        let counts = trajectory.state_at(time).ok_or_else(|| {
            EngineError::Internal(format!("snapshot time {} outside run horizon", time))
        })?;
        let mut mass = vec![0.0; sizes.len()];
        for (&count, &size) in counts.iter().zip(&species_sizes) {
            if let Ok(class) = sizes.binary_search(&size) {
                mass[class] += count as f64 * size as f64;
            }
        }
        let total: f64 = mass.iter().sum();
        for (class, m) in mass.into_iter().enumerate() {
            fractions[class].push(if total > 0.0 { m / total } else { 0.0 });
        }
    }

    let n = trajectories.len() as f64;
    let (mean_fraction, standard_error) = fractions
        .iter()
        .map(|values| {
            let (mean, sd) = mean_and_sd(values);
            (mean, sd / n.sqrt())
        })
        .unzip();

    Ok(SizeComposition {
        time,
        sizes,
        mean_fraction,
        standard_error,
    })
}

/// `points` evenly spaced values on `[0, end]`, the last one exactly `end`.
pub fn linspace(end: f64, points: usize) -> Vec<f64> {
    if points < 2 {
        return vec![end; points];
    }
    let step = end / (points - 1) as f64;
    let mut grid: Vec<f64> = (0..points).map(|k| k as f64 * step).collect();
    grid[points - 1] = end;
    grid
}

/// Arithmetic mean and sample standard deviation (zero for fewer than two values).
pub fn mean_and_sd(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if values.len() < 2 {
        return (mean, 0.0);
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    (mean, variance.sqrt())
}
