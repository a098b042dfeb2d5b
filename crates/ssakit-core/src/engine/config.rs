use thiserror::Error;

pub const DEFAULT_MAX_STEPS: u64 = 10_000_000;
pub const DEFAULT_GRID_POINTS: usize = 100;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid value for parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub t_max: f64,
    pub max_steps: u64,
    pub seed: Option<u64>,
    pub record_events: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnsembleConfig {
    pub simulation: SimulationConfig,
    pub runs: usize,
    pub grid_points: usize,
    /// Times at which the size-class composition is summarised; the common horizon
    /// is used when empty.
    pub snapshot_times: Vec<f64>,
}

#[derive(Default)]
pub struct SimulationConfigBuilder {
    t_max: Option<f64>,
    max_steps: Option<u64>,
    seed: Option<u64>,
    record_events: bool,
}

impl SimulationConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn t_max(mut self, t_max: f64) -> Self {
        self.t_max = Some(t_max);
        self
    }
    pub fn max_steps(mut self, max_steps: u64) -> Self {
        self.max_steps = Some(max_steps);
        self
    }
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
    pub fn maybe_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }
    pub fn record_events(mut self, record: bool) -> Self {
        self.record_events = record;
        self
    }

    pub fn build(self) -> Result<SimulationConfig, ConfigError> {
        let t_max = self.t_max.ok_or(ConfigError::MissingParameter("t_max"))?;
        if !t_max.is_finite() || t_max <= 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "t_max",
                reason: format!("must be finite and positive, got {}", t_max),
            });
        }
        let max_steps = self.max_steps.unwrap_or(DEFAULT_MAX_STEPS);
        if max_steps == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "max_steps",
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(SimulationConfig {
            t_max,
            max_steps,
            seed: self.seed,
            record_events: self.record_events,
        })
    }
}

#[derive(Default)]
pub struct EnsembleConfigBuilder {
    simulation: Option<SimulationConfig>,
    runs: Option<usize>,
    grid_points: Option<usize>,
    snapshot_times: Vec<f64>,
}

impl EnsembleConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn simulation(mut self, config: SimulationConfig) -> Self {
        self.simulation = Some(config);
        self
    }
    pub fn runs(mut self, runs: usize) -> Self {
        self.runs = Some(runs);
        self
    }
    pub fn grid_points(mut self, points: usize) -> Self {
        self.grid_points = Some(points);
        self
    }
    pub fn snapshot_times(mut self, times: Vec<f64>) -> Self {
        self.snapshot_times = times;
        self
    }

    pub fn build(self) -> Result<EnsembleConfig, ConfigError> {
        let simulation = self
            .simulation
            .ok_or(ConfigError::MissingParameter("simulation"))?;
        let runs = self.runs.ok_or(ConfigError::MissingParameter("runs"))?;
        if runs == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "runs",
                reason: "must be at least 1".to_string(),
            });
        }
        let grid_points = self.grid_points.unwrap_or(DEFAULT_GRID_POINTS);
        if grid_points < 2 {
            return Err(ConfigError::InvalidParameter {
                name: "grid_points",
                reason: format!("must be at least 2, got {}", grid_points),
            });
        }
        if let Some(bad) = self
            .snapshot_times
            .iter()
            .find(|t| !t.is_finite() || **t < 0.0)
        {
            return Err(ConfigError::InvalidParameter {
                name: "snapshot_times",
                reason: format!("times must be finite and non-negative, got {}", bad),
            });
        }

        Ok(EnsembleConfig {
            simulation,
            runs,
            grid_points,
            snapshot_times: self.snapshot_times,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulation_builder_applies_defaults() {
        let config = SimulationConfigBuilder::new().t_max(100.0).build().unwrap();
        assert_eq!(config.max_steps, DEFAULT_MAX_STEPS);
        assert_eq!(config.seed, None);
        assert!(!config.record_events);
    }

    #[test]
    fn simulation_builder_requires_positive_horizon() {
        assert_eq!(
            SimulationConfigBuilder::new().build(),
            Err(ConfigError::MissingParameter("t_max"))
        );
        assert!(matches!(
            SimulationConfigBuilder::new().t_max(0.0).build(),
            Err(ConfigError::InvalidParameter { name: "t_max", .. })
        ));
        assert!(matches!(
            SimulationConfigBuilder::new().t_max(f64::INFINITY).build(),
            Err(ConfigError::InvalidParameter { name: "t_max", .. })
        ));
        assert!(matches!(
            SimulationConfigBuilder::new().t_max(1.0).max_steps(0).build(),
            Err(ConfigError::InvalidParameter {
                name: "max_steps",
                ..
            })
        ));
    }

    #[test]
    fn ensemble_builder_validates_counts() {
        let simulation = SimulationConfigBuilder::new().t_max(1.0).build().unwrap();
        assert_eq!(
            EnsembleConfigBuilder::new()
                .simulation(simulation.clone())
                .build(),
            Err(ConfigError::MissingParameter("runs"))
        );
        assert!(
            EnsembleConfigBuilder::new()
                .simulation(simulation.clone())
                .runs(0)
                .build()
                .is_err()
        );
        assert!(
            EnsembleConfigBuilder::new()
                .simulation(simulation.clone())
                .runs(3)
                .grid_points(1)
                .build()
                .is_err()
        );
        let config = EnsembleConfigBuilder::new()
            .simulation(simulation)
            .runs(3)
            .snapshot_times(vec![0.0, 0.5])
            .build()
            .unwrap();
        assert_eq!(config.grid_points, DEFAULT_GRID_POINTS);
        assert_eq!(config.snapshot_times, vec![0.0, 0.5]);
    }
}
