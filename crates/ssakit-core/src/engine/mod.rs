//! # Engine Module
//!
//! This module implements the stochastic simulation engine: exact Gillespie trajectories of
//! a reaction network, one reaction event at a time.
//!
//! ## Overview
//!
//! The engine owns everything that changes while a simulation runs. It evaluates reaction
//! propensities from the current counts, draws waiting times and reaction choices from a
//! seeded random source, applies stoichiometric deltas, and records the resulting
//! piecewise-constant trajectory until one of the halting conditions is met.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Time horizon, step budget, seeding and ensemble settings
//! - **Propensities** ([`propensity`]) - Combinatorial mass-action propensities
//! - **Stepping** ([`stepper`]) - The direct-method loop and its halting semantics
//! - **Recording** ([`trajectory`]) - Immutable trajectories, event logs and grid sampling
//! - **Random Sources** ([`rng`]) - Reproducible per-run random streams
//! - **Progress Monitoring** ([`progress`]) - Progress reporting for long-running workflows
//! - **Error Handling** ([`error`]) - Engine-specific error types and error propagation
//!
//! ## Key Capabilities
//!
//! - **Exact sampling** of exponential waiting times and propensity-weighted reaction choice
//! - **Explicit halting** on zero total propensity, time limit or step budget
//! - **Fatal negative-count detection** instead of silent clamping
//! - **Reproducible runs** from a single seed, including derived seeds for ensembles

pub mod config;
pub mod error;
pub mod progress;
pub mod propensity;
pub mod rng;
pub mod stepper;
pub mod trajectory;
