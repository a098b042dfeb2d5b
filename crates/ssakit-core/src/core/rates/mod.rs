pub mod physical;
pub mod table;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RateError {
    #[error("No rate constant given for key '{key}' used by reaction '{reaction}'")]
    MissingRate { key: String, reaction: String },

    #[error("Rate constant for reaction '{reaction}' must be finite and non-negative, got {value}")]
    InvalidRate { reaction: String, value: f64 },

    #[error("Rate table has {actual} entries but the network has {expected} reactions")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Reaction '{0}' has no reverse partner; paired rates cannot be assigned to it")]
    UnpairedReaction(String),

    #[error("Invalid rate rule parameter: {0}")]
    InvalidParameter(String),
}
