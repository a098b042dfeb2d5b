use super::config::SimulationConfig;
use super::error::EngineError;
use super::propensity::PropensityEvaluator;
use super::rng::SimRng;
use super::trajectory::{EventKind, Trajectory, TrajectoryRecorder};
use crate::core::models::ModelError;
use crate::core::models::ids::ReactionId;
use crate::core::models::network::ReactionNetwork;
use crate::core::models::state::State;
use crate::core::rates::table::RateTable;
use rand::Rng;
use rand::distributions::Open01;
use std::fmt;
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HaltReason {
    /// Total propensity dropped to zero: no reaction can ever fire again.
    NoPropensity,
    /// The next reaction would have fired after `t_max`.
    TimeLimit,
    /// The step budget was exhausted.
    StepLimit,
}

impl HaltReason {
    pub const ALL: [HaltReason; 3] = [Self::NoPropensity, Self::TimeLimit, Self::StepLimit];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoPropensity => "no-propensity",
            Self::TimeLimit => "time-limit",
            Self::StepLimit => "step-limit",
        }
    }
}

impl fmt::Display for HaltReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `τ = −ln(r1) / a0`, exponentially distributed with rate `a0` for `r1 ~ U(0, 1)`.
#[inline]
pub fn waiting_time(r1: f64, a0: f64) -> f64 {
    -r1.ln() / a0
}

/// Index of the first reaction whose cumulative propensity is `>= target`.
///
/// Cumulative sums run in declaration order. Reactions with zero propensity own an empty
/// slot and are never returned, even when `target` sits exactly on their boundary. A
/// `target` beyond the total (floating-point overrun) falls back to the last reaction with
/// positive propensity.
pub fn select_reaction(propensities: &[f64], target: f64) -> Option<usize> {
    let mut cumulative = 0.0;
    let mut last_positive = None;
    for (i, &a) in propensities.iter().enumerate() {
        if a <= 0.0 {
            continue;
        }
        cumulative += a;
        last_positive = Some(i);
        if target <= cumulative {
            return Some(i);
        }
    }
    last_positive
}

/// Gillespie direct-method simulator for one trajectory.
pub struct Simulator<'a> {
    evaluator: PropensityEvaluator<'a>,
    state: State,
    time: f64,
    steps: u64,
    rng: SimRng,
    propensities: Vec<f64>,
}

impl<'a> Simulator<'a> {
    pub fn new(
        network: &'a ReactionNetwork,
        rates: &'a RateTable,
        initial: State,
        rng: SimRng,
    ) -> Result<Self, EngineError> {
        let evaluator = PropensityEvaluator::new(network, rates)?;
        initial.check_len(network.catalog())?;
        Ok(Self {
            evaluator,
            state: initial,
            time: 0.0,
            steps: 0,
            rng,
            propensities: vec![0.0; network.reaction_count()],
        })
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Samples `(τ, reaction)` at the current state without advancing the simulation.
    ///
    /// Returns `None` when the total propensity is zero.
    pub fn draw(&mut self) -> Option<(f64, ReactionId)> {
        let a0 = self.evaluator.evaluate(&self.state, &mut self.propensities);
        if !(a0 > 0.0) {
            return None;
        }
        let r1: f64 = self.rng.sample(Open01);
        let r2: f64 = self.rng.sample(Open01);
        let reaction = select_reaction(&self.propensities, r2 * a0)?;
        Some((waiting_time(r1, a0), ReactionId(reaction)))
    }

    /// Applies the stoichiometric delta of `reaction` to the current state.
    pub fn fire(&mut self, reaction: ReactionId) -> Result<(), EngineError> {
        let network = self.evaluator.network();
        let Some(r) = network.reaction(reaction) else {
            return Err(EngineError::Internal(format!(
                "reaction index {} out of range",
                reaction.0
            )));
        };
        self.state
            .apply_delta(r.delta(), network.catalog())
            .map_err(|e| match e {
                ModelError::NegativeCount { species } => EngineError::NegativeCount {
                    reaction: r.label.clone(),
                    species,
                    time: self.time,
                },
                other => EngineError::from(other),
            })
    }

    /// Runs until a halting condition is met and returns the recorded trajectory.
    pub fn run(mut self, config: &SimulationConfig) -> Result<Trajectory, EngineError> {
        let network = self.evaluator.network();
        let mut recorder =
            TrajectoryRecorder::new(network.catalog().names(), &self.state, config.record_events);

        let halt = loop {
            if self.steps >= config.max_steps {
                break HaltReason::StepLimit;
            }

            let a0 = self.evaluator.evaluate(&self.state, &mut self.propensities);
            if !(a0 > 0.0) {
                recorder.log_event(
                    self.time,
                    EventKind::Halt(HaltReason::NoPropensity),
                    &self.state,
                );
                break HaltReason::NoPropensity;
            }

            let r1: f64 = self.rng.sample(Open01);
            let r2: f64 = self.rng.sample(Open01);
            let tau = waiting_time(r1, a0);
            if self.time + tau > config.t_max {
                self.time = config.t_max;
                recorder.record(self.time, &self.state);
                recorder.log_event(
                    self.time,
                    EventKind::Halt(HaltReason::TimeLimit),
                    &self.state,
                );
                break HaltReason::TimeLimit;
            }

            let reaction = select_reaction(&self.propensities, r2 * a0)
                .map(ReactionId)
                .ok_or_else(|| {
                    EngineError::Internal("positive total propensity without a candidate".into())
                })?;
            self.fire(reaction)?;
            self.time += tau;
            self.steps += 1;
            recorder.record(self.time, &self.state);
            recorder.log_event(self.time, EventKind::Reaction(reaction), &self.state);
            trace!(time = self.time, reaction = %reaction, "Reaction fired.");
        };

        debug!(
            halt = %halt,
            steps = self.steps,
            time = self.time,
            "Simulation halted."
        );
        Ok(recorder.finish(halt, config.t_max, self.steps))
    }
}
