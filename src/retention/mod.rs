//! Retention selection for image tags
//!
//! Decides which tags of an image survive a cleanup run. Nothing in here
//! talks to a registry: the input is a materialized tag list and the output
//! is a [`plan::RetentionPlan`] the caller acts on.
//!
//! ```text
//!   tags ──▶ filter ──▶ semver ──▶ selector ──▶ RetentionPlan
//!          (pattern)    (parse)   (sort, split)
//! ```
//!
//! # Modules
//!
//! - [`filter`]: Whole-string regex filter selecting version candidates
//! - [`semver`]: Lenient semver parsing and version precedence
//! - [`selector`]: Splits sorted versions into KEEP and DELETE
//! - [`plan`]: Runs the pipeline under a parse-failure policy
//! - [`error`]: Error types for parsing and planning

pub mod error;
pub mod filter;
pub mod plan;
pub mod selector;
pub mod semver;
