//! # Core Module
//!
//! This module provides the immutable building blocks of a reaction system: everything
//! that is constructed once before a simulation starts and never mutated afterwards.
//!
//! ## Architecture
//!
//! - **Reaction System Representation** ([`models`]) - Species catalog, reactions, networks and count states
//! - **Kinetic Parameters** ([`rates`]) - Dense rate tables and the physical diffusion/bond-energy rule
//! - **Network Generation** ([`builders`]) - Cluster-forming networks derived from a monomer bond graph
//! - **File I/O** ([`io`]) - TOML network descriptions and CSV export of results
//! - **Deterministic Oracle** ([`kinetics`]) - Mean-field ODEs, integration and detailed balance checks
//!
//! ## Key Capabilities
//!
//! - **Fail-fast validation** of networks and rate tables at construction time
//! - **Precomputed stoichiometric deltas** so that no per-step bookkeeping is needed
//! - **Generic ODE derivation** from the same network the stochastic engine consumes
//! - **Parameterised network builders** replacing hand-written reaction lists

pub mod builders;
pub mod io;
pub mod kinetics;
pub mod models;
pub mod rates;
