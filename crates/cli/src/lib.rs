//! Fides CLI - orchestrator over the ledger, journal and authorization gate
//!
//! This crate provides the `fides` binary and command orchestration.

pub mod commands;
pub mod config;
pub mod context;

pub use config::FidesConfig;
pub use context::AppContext;
