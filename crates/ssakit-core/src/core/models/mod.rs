pub mod ids;
pub mod network;
pub mod reaction;
pub mod species;
pub mod state;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Species '{0}' is declared more than once")]
    DuplicateSpecies(String),

    #[error("Unknown species '{name}' referenced by {context}")]
    UnknownSpecies { name: String, context: String },

    #[error("Reaction '{reaction}' has a zero stoichiometric coefficient for species '{species}'")]
    ZeroCoefficient { reaction: String, species: String },

    #[error("Reaction '{0}' has neither reactants nor products")]
    EmptyReaction(String),

    #[error("Network must declare at least one species and one reaction")]
    EmptyNetwork,

    #[error("State has {actual} entries but the catalog has {expected} species")]
    StateLength { expected: usize, actual: usize },

    #[error("Count for species '{species}' would become negative")]
    NegativeCount { species: String },
}
