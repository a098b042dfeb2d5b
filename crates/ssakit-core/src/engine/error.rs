use thiserror::Error;

use super::config::ConfigError;
use crate::core::kinetics::KineticsError;
use crate::core::models::ModelError;
use crate::core::rates::RateError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid simulation input: {0}")]
    InvalidInput(String),

    #[error("Reaction '{reaction}' fired at t = {time} would make species '{species}' negative")]
    NegativeCount {
        reaction: String,
        species: String,
        time: f64,
    },

    #[error("Configuration error: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Rate table error: {source}")]
    Rate {
        #[from]
        source: RateError,
    },

    #[error("Network model error: {source}")]
    Model {
        #[from]
        source: ModelError,
    },

    #[error("Mean-field computation failed: {source}")]
    Kinetics {
        #[from]
        source: KineticsError,
    },

    #[error("Internal logic error: {0}")]
    Internal(String),
}
