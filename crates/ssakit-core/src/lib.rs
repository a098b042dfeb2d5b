//! # SSAKit Core Library
//!
//! A library for exact stochastic simulation of chemical reaction networks, built around
//! Gillespie's direct method and cross-validated against the deterministic mean-field limit
//! of the same network.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture to keep the data model, the
//! simulation machinery, and the user-facing procedures apart.
//!
//! - **[`core`]: The Foundation.** Immutable descriptions of a reaction system: the species
//!   catalog, reactions with precomputed stoichiometric deltas, dense rate tables (including
//!   the diffusion/bond-energy rate rule), generic network builders, file I/O, and the
//!   deterministic kinetics oracle (mean-field ODEs, RK4 integration, detailed balance).
//!
//! - **[`engine`]: The Logic Core.** The stateful stochastic machinery: the propensity
//!   evaluator, the SSA stepper with its halting semantics, the trajectory recorder, seeded
//!   random sources, configuration, and progress reporting.
//!
//! - **[`workflows`]: The Public API.** Complete procedures built from the layers below:
//!   a single simulation, a parallel ensemble with aligned statistics, and the ODE
//!   cross-validation of an ensemble.

pub mod core;
pub mod engine;
pub mod workflows;
