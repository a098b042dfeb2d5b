use ssakit::engine::config::{EnsembleConfig, SimulationConfig};
use ssakit::workflows::validate::ValidationConfig;
use std::collections::HashMap;
use std::path::PathBuf;

/// A fully merged run: where the network lives, how it starts, and how it is simulated.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub network_path: PathBuf,
    pub initial_counts: HashMap<String, u64>,
    pub simulation: SimulationConfig,
    pub ensemble: EnsembleConfig,
    pub validation: ValidationConfig,
}
