//! # Workflows Module
//!
//! This module provides the high-level procedures that users of SSAKit call directly.
//!
//! ## Overview
//!
//! Workflows combine a network, its rate table and an initial state with a configuration
//! object, run the engine, and return owned results. Each workflow validates its inputs up
//! front, reports progress through a [`ProgressReporter`](crate::engine::progress::ProgressReporter)
//! where the work is long-running, and logs its outcome through `tracing`.
//!
//! ## Architecture
//!
//! - **Single Simulation** ([`simulate`]) - One seeded trajectory with its halt reason
//! - **Ensemble** ([`ensemble`]) - Independent runs in parallel, aggregated on a common grid
//! - **Validation** ([`validate`]) - Mean-field comparison and detailed balance checks
//!
//! ## Key Capabilities
//!
//! - **Reproducible ensembles** with one derived seed per run
//! - **Parallel execution** of independent trajectories with `rayon`
//! - **Aligned statistics** that never extrapolate past a run's known horizon
//! - **Deterministic cross-checks** against the mean-field limit of the same network

pub mod ensemble;
pub mod simulate;
pub mod validate;
