use super::ensemble::EnsembleResult;
use crate::core::kinetics::KineticsError;
use crate::core::kinetics::equilibrium::{PairBalance, detailed_balance_report};
use crate::core::kinetics::integrator::{OdeSolution, Rk4Integrator, SteadyState};
use crate::core::kinetics::mean_field::MeanFieldSystem;
use crate::core::models::network::ReactionNetwork;
use crate::core::models::state::State;
use crate::core::rates::table::RateTable;
use crate::engine::error::EngineError;
use nalgebra::DVector;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationConfig {
    pub ode_step: f64,
    pub steady_state_tolerance: f64,
    pub steady_state_max_time: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            ode_step: 1e-3,
            steady_state_tolerance: 1e-8,
            steady_state_max_time: 1e5,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesDeviation {
    pub species: String,
    /// Largest `|ODE − ensemble mean|` over the shared grid.
    pub max_abs_deviation: f64,
    pub final_ode: f64,
    pub final_mean: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    /// Mean-field solution sampled on the ensemble grid.
    pub ode: OdeSolution,
    pub deviations: Vec<SpeciesDeviation>,
    /// `None` when the mean-field system did not settle within the allotted time.
    pub steady_state: Option<SteadyState>,
    /// Pair fluxes at the steady state, or at the end of the ODE solution without one.
    pub balance: Vec<PairBalance>,
}

impl ValidationReport {
    pub fn max_relative_imbalance(&self) -> f64 {
        self.balance
            .iter()
            .map(PairBalance::relative_imbalance)
            .fold(0.0, f64::max)
    }
}

#[instrument(skip_all, name = "validation_workflow")]
pub fn run(
    network: &ReactionNetwork,
    rates: &RateTable,
    initial: &State,
    ensemble: &EnsembleResult,
    config: &ValidationConfig,
) -> Result<ValidationReport, EngineError> {
    initial.check_len(network.catalog())?;
    if !(ensemble.common_horizon > 0.0) {
        return Err(EngineError::InvalidInput(format!(
            "ensemble horizon must be positive to compare trajectories, got {}",
            ensemble.common_horizon
        )));
    }

    let system = MeanFieldSystem::new(network, rates)?;
    let integrator = Rk4Integrator::new(config.ode_step)?;
    let y0 = DVector::from_iterator(
        initial.len(),
        initial.counts().iter().map(|&c| c as f64),
    );

    let ode = integrator.integrate(
        &system,
        y0.clone(),
        ensemble.common_horizon,
        ensemble.grid.len(),
    )?;

    let deviations: Vec<SpeciesDeviation> = ensemble
        .species
        .iter()
        .enumerate()
        .map(|(s, name)| {
            let max_abs_deviation = ode
                .states
                .iter()
                .zip(&ensemble.mean)
                .map(|(y, mean)| (y[s] - mean[s]).abs())
                .fold(0.0, f64::max);
            SpeciesDeviation {
                species: name.clone(),
                max_abs_deviation,
                final_ode: ode.final_state().map_or(f64::NAN, |y| y[s]),
                final_mean: ensemble.mean.last().map_or(f64::NAN, |row| row[s]),
            }
        })
        .collect();

    let steady_state = match integrator.relax_to_steady_state(
        &system,
        y0,
        config.steady_state_tolerance,
        config.steady_state_max_time,
    ) {
        Ok(steady) => Some(steady),
        Err(KineticsError::NotConverged { time, residual, .. }) => {
            warn!(time, residual, "Mean-field system did not reach a steady state.");
            None
        }
        Err(e) => return Err(e.into()),
    };

    let balance_state = match (&steady_state, ode.final_state()) {
        (Some(steady), _) => steady.state.clone(),
        (None, Some(last)) => last.clone(),
        (None, None) => return Err(EngineError::Internal("empty ODE solution".into())),
    };
    let balance = detailed_balance_report(network, &system, &balance_state)?;

    let report = ValidationReport {
        ode,
        deviations,
        steady_state,
        balance,
    };
    info!(
        max_deviation = report
            .deviations
            .iter()
            .map(|d| d.max_abs_deviation)
            .fold(0.0, f64::max),
        max_relative_imbalance = report.max_relative_imbalance(),
        "Validation complete."
    );
    Ok(report)
}
