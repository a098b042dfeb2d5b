use ssakit::engine::config::{DEFAULT_GRID_POINTS, DEFAULT_MAX_STEPS};

pub struct DefaultsConfig {
    pub t_max: f64,
    pub max_steps: u64,
    pub record_events: bool,
    pub runs: usize,
    pub grid_points: usize,
    pub ode_step: f64,
    pub steady_state_tolerance: f64,
    pub steady_state_max_time: f64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            t_max: 100.0,
            max_steps: DEFAULT_MAX_STEPS,
            record_events: false,
            runs: 100,
            grid_points: DEFAULT_GRID_POINTS,
            ode_step: 1e-3,
            steady_state_tolerance: 1e-8,
            steady_state_max_time: 1e5,
        }
    }
}
