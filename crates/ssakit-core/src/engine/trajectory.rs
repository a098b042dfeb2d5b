use super::error::EngineError;
use super::stepper::HaltReason;
use crate::core::models::ids::{ReactionId, SpeciesId};
use crate::core::models::state::State;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Reaction(ReactionId),
    Halt(HaltReason),
}

/// One entry of the optional event log, carrying the counts right after the event.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub time: f64,
    pub kind: EventKind,
    pub state: Vec<u64>,
}

/// A piecewise-constant record of one simulation.
///
/// Record `k` holds the counts in effect on `[times[k], times[k + 1])`; the last record
/// holds until [`Trajectory::horizon`].
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    species: Vec<String>,
    times: Vec<f64>,
    counts: Vec<u64>,
    events: Option<Vec<Event>>,
    halt: HaltReason,
    t_max: f64,
    steps: u64,
}

impl Trajectory {
    pub fn species_names(&self) -> &[String] {
        &self.species
    }

    pub fn n_species(&self) -> usize {
        self.species.len()
    }

    /// Number of records, the initial state included.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn halt(&self) -> HaltReason {
        self.halt
    }

    pub fn t_max(&self) -> f64 {
        self.t_max
    }

    /// Number of reactions fired.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn events(&self) -> Option<&[Event]> {
        self.events.as_deref()
    }

    pub fn state_at_index(&self, index: usize) -> &[u64] {
        let n = self.species.len();
        &self.counts[index * n..(index + 1) * n]
    }

    pub fn final_state(&self) -> &[u64] {
        self.state_at_index(self.times.len() - 1)
    }

    pub fn final_time(&self) -> f64 {
        self.times[self.times.len() - 1]
    }

    pub fn species_series(&self, species: SpeciesId) -> Vec<u64> {
        self.counts
            .iter()
            .skip(species.0)
            .step_by(self.species.len())
            .copied()
            .collect()
    }

    /// Latest time up to which the state of the system is known.
    ///
    /// Runs halted by the time limit or by running out of propensity stay in their final
    /// state until `t_max`; a step-limited run is only known up to its last reaction.
    pub fn horizon(&self) -> f64 {
        match self.halt {
            HaltReason::NoPropensity | HaltReason::TimeLimit => self.t_max,
            HaltReason::StepLimit => self.final_time(),
        }
    }

    /// Counts in effect at time `t` (zero-order hold), or `None` outside `[0, horizon]`.
    pub fn state_at(&self, t: f64) -> Option<&[u64]> {
        if !(t >= self.times[0]) || t > self.horizon() {
            return None;
        }
        let index = self.times.partition_point(|&time| time <= t) - 1;
        Some(self.state_at_index(index))
    }

    pub fn sample_on_grid(&self, grid: &[f64]) -> Result<Vec<&[u64]>, EngineError> {
        grid.iter()
            .map(|&t| {
                self.state_at(t).ok_or_else(|| {
                    EngineError::InvalidInput(format!(
                        "grid time {} lies outside the trajectory horizon [0, {}]",
                        t,
                        self.horizon()
                    ))
                })
            })
            .collect()
    }

    /// Time-weighted mean count of `species` over `[from, horizon]`.
    pub fn time_average(&self, species: SpeciesId, from: f64) -> Option<f64> {
        let end = self.horizon();
        if !(from < end) || species.0 >= self.species.len() {
            return None;
        }

        let mut weighted = 0.0;
        for (k, &start) in self.times.iter().enumerate() {
            let stop = self.times.get(k + 1).copied().unwrap_or(end).min(end);
            let lower = start.max(from);
            if stop > lower {
                weighted += (stop - lower) * self.state_at_index(k)[species.0] as f64;
            }
        }
        Some(weighted / (end - from.max(self.times[0])))
    }
}

/// Append-only builder of a [`Trajectory`], used by the stepper.
#[derive(Debug)]
pub struct TrajectoryRecorder {
    species: Vec<String>,
    times: Vec<f64>,
    counts: Vec<u64>,
    events: Option<Vec<Event>>,
}

impl TrajectoryRecorder {
    pub fn new(species: Vec<String>, initial: &State, record_events: bool) -> Self {
        let mut recorder = Self {
            species,
            times: Vec::new(),
            counts: Vec::new(),
            events: record_events.then(Vec::new),
        };
        recorder.record(0.0, initial);
        recorder
    }

    pub fn record(&mut self, time: f64, state: &State) {
        self.times.push(time);
        self.counts.extend_from_slice(state.counts());
    }

    pub fn log_event(&mut self, time: f64, kind: EventKind, state: &State) {
        if let Some(events) = &mut self.events {
            events.push(Event {
                time,
                kind,
                state: state.counts().to_vec(),
            });
        }
    }

    pub fn finish(self, halt: HaltReason, t_max: f64, steps: u64) -> Trajectory {
        Trajectory {
            species: self.species,
            times: self.times,
            counts: self.counts,
            events: self.events,
            halt,
            t_max,
            steps,
        }
    }
}
