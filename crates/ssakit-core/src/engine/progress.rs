use super::stepper::HaltReason;
use super::trajectory::Trajectory;

/// Milestones emitted by long-running workflows.
#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    PhaseStart {
        name: &'static str,
    },
    PhaseFinish,

    /// `runs` independent simulations towards `t_max` are about to start.
    RunsStart {
        runs: u64,
        t_max: f64,
    },
    /// One run stopped; `horizon` is the simulated time it covers. Runs finish in
    /// arbitrary order under the parallel feature.
    RunFinished {
        halt: HaltReason,
        horizon: f64,
        steps: u64,
    },
    RunsFinish,

    Note(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

/// Forwards workflow progress to an optional callback. Safe to share across worker threads.
#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }

    /// Runs `f` between a `PhaseStart`/`PhaseFinish` pair.
    pub fn phase<T>(&self, name: &'static str, f: impl FnOnce() -> T) -> T {
        self.report(Progress::PhaseStart { name });
        let result = f();
        self.report(Progress::PhaseFinish);
        result
    }

    pub fn run_finished(&self, trajectory: &Trajectory) {
        self.report(Progress::RunFinished {
            halt: trajectory.halt(),
            horizon: trajectory.horizon(),
            steps: trajectory.steps(),
        });
    }
}
