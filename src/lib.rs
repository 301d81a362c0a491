//! Retire old image versions from a Docker registry
//!
//! # Modules
//!
//! - [`retention`]: Decides which tags to keep and which to delete
//! - [`registry`]: Registry trait and the Docker Registry HTTP API v2 client
//! - [`cleaner`]: Runs a cleanup against a registry and reports the outcome
//! - [`config`]: Run configuration and defaults
//! - [`cli`]: Command-line flags

pub mod cleaner;
pub mod cli;
pub mod config;
pub mod registry;
pub mod retention;
