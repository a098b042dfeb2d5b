use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use ssakit::engine::progress::{Progress, ProgressCallback};
use ssakit::engine::stepper::HaltReason;
use ssakit::workflows::ensemble::HaltCounts;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

const SPINNER_TICK_MS: u64 = 80;

struct RunBoard {
    pb: ProgressBar,
    phase: &'static str,
    outcomes: HaltCounts,
    /// Smallest simulated time reached by any finished run.
    shortest_horizon: f64,
}

impl RunBoard {
    fn outcome_message(&self) -> String {
        let mut parts: Vec<String> = HaltReason::ALL
            .iter()
            .filter(|&&reason| self.outcomes.get(reason) > 0)
            .map(|&reason| format!("{} {}", reason, self.outcomes.get(reason)))
            .collect();
        if self.shortest_horizon.is_finite() {
            parts.push(format!("T* {:.4}", self.shortest_horizon));
        }
        parts.join(" | ")
    }
}

/// Renders ensemble progress on stderr: runs completed, how they halted and the shortest
/// simulated time reached so far.
#[derive(Clone)]
pub struct CliProgressHandler {
    board: Arc<Mutex<RunBoard>>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        Self::with_draw_target(ProgressDrawTarget::stderr())
    }

    #[cfg(test)]
    fn hidden() -> Self {
        Self::with_draw_target(ProgressDrawTarget::hidden())
    }

    fn with_draw_target(target: ProgressDrawTarget) -> Self {
        let pb = ProgressBar::with_draw_target(Some(0), target).with_style(spinner_style());
        pb.finish_and_clear();
        Self {
            board: Arc::new(Mutex::new(RunBoard {
                pb,
                phase: "",
                outcomes: HaltCounts::default(),
                shortest_horizon: f64::INFINITY,
            })),
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let shared = self.board.clone();

        Box::new(move |progress: Progress| {
            let Ok(mut board) = shared.lock() else {
                warn!("Progress board mutex was poisoned. Dropping progress event.");
                return;
            };

            match progress {
                Progress::PhaseStart { name } => {
                    board.phase = name;
                    board.pb.reset();
                    board.pb.set_length(0);
                    board.pb.set_style(spinner_style());
                    board.pb.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
                    board.pb.set_message(name);
                }
                Progress::PhaseFinish => {
                    board.pb.disable_steady_tick();
                    let message = format!("✓ {}", board.phase);
                    board.pb.finish_with_message(message);
                }
                Progress::RunsStart { runs, t_max } => {
                    board.outcomes = HaltCounts::default();
                    board.shortest_horizon = f64::INFINITY;
                    board.pb.disable_steady_tick();
                    board.pb.reset();
                    board.pb.set_length(runs);
                    board.pb.set_style(run_bar_style());
                    board.pb.set_prefix(format!("t_max {}", t_max));
                    board.pb.set_message("");
                }
                Progress::RunFinished { halt, horizon, .. } => {
                    board.outcomes.record(halt);
                    board.shortest_horizon = board.shortest_horizon.min(horizon);
                    let message = board.outcome_message();
                    board.pb.set_message(message);
                    board.pb.inc(1);
                }
                Progress::RunsFinish => {
                    let message = board.outcome_message();
                    board.pb.finish_with_message(message);
                }
                Progress::Note(note) => {
                    board.pb.println(format!("  ! {}", note));
                }
            }
        })
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

fn run_bar_style() -> ProgressStyle {
    ProgressStyle::with_template("{prefix:<12} [{bar:40.cyan/blue}] {pos}/{len} runs  {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn finished(halt: HaltReason, horizon: f64) -> Progress {
        Progress::RunFinished {
            halt,
            horizon,
            steps: 0,
        }
    }

    #[test]
    fn runs_are_tallied_by_halt_reason() {
        let handler = CliProgressHandler::hidden();
        let callback = handler.get_callback();

        callback(Progress::PhaseStart {
            name: "Ensemble Simulation",
        });
        callback(Progress::RunsStart {
            runs: 5,
            t_max: 10.0,
        });
        callback(finished(HaltReason::TimeLimit, 10.0));
        callback(finished(HaltReason::StepLimit, 3.25));
        callback(finished(HaltReason::TimeLimit, 10.0));
        {
            let board = handler.board.lock().unwrap();
            assert_eq!(board.pb.length(), Some(5));
            assert_eq!(board.pb.position(), 3);
            assert_eq!(board.outcomes.time_limit, 2);
            assert_eq!(board.outcomes.step_limit, 1);
            assert_eq!(board.pb.message(), "time-limit 2 | step-limit 1 | T* 3.2500");
        }

        callback(Progress::RunsFinish);
        callback(Progress::PhaseFinish);
        let board = handler.board.lock().unwrap();
        assert!(board.pb.is_finished());
        assert_eq!(board.pb.message(), "✓ Ensemble Simulation");
    }

    #[test]
    fn a_new_batch_of_runs_resets_the_tally() {
        let handler = CliProgressHandler::hidden();
        let callback = handler.get_callback();

        callback(Progress::RunsStart { runs: 1, t_max: 1.0 });
        callback(finished(HaltReason::NoPropensity, 1.0));
        callback(Progress::RunsFinish);
        assert_eq!(
            handler.board.lock().unwrap().pb.message(),
            "no-propensity 1 | T* 1.0000"
        );

        callback(Progress::RunsStart { runs: 2, t_max: 4.0 });
        callback(Progress::Note("skipped snapshot".to_string()));
        let board = handler.board.lock().unwrap();
        assert_eq!(board.outcomes.total(), 0);
        assert!(board.shortest_horizon.is_infinite());
        assert_eq!(board.pb.position(), 0);
        assert_eq!(board.pb.message(), "");
    }

    #[test]
    fn runs_reported_from_worker_threads_are_all_counted() {
        let handler = CliProgressHandler::hidden();
        let callback = handler.get_callback();

        callback(Progress::RunsStart {
            runs: 8,
            t_max: 2.0,
        });
        thread::scope(|scope| {
            for worker in 0..8 {
                let callback = &callback;
                let horizon = 2.0 - worker as f64 * 0.1;
                scope.spawn(move || callback(finished(HaltReason::TimeLimit, horizon)));
            }
        });
        let board = handler.board.lock().unwrap();
        assert_eq!(board.pb.position(), 8);
        assert_eq!(board.outcomes.time_limit, 8);
        assert!((board.shortest_horizon - 1.3).abs() < 1e-12);
    }
}
