pub mod equilibrium;
pub mod integrator;
pub mod mean_field;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum KineticsError {
    #[error("State has {actual} components but the system has {expected} species")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Rate table has {actual} entries but the network has {expected} reactions")]
    RateLength { expected: usize, actual: usize },

    #[error("Invalid kinetics parameter: {0}")]
    InvalidParameter(String),

    #[error("No steady state reached by t = {time}: residual {residual:e} above tolerance {tolerance:e}")]
    NotConverged {
        time: f64,
        residual: f64,
        tolerance: f64,
    },
}
