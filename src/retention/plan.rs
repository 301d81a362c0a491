//! Retention planning: filter, parse and select in one pass

use tracing::warn;

use crate::retention::error::{ParseError, PlanError};
use crate::retention::filter::VersionFilter;
use crate::retention::selector::{RetentionDecision, select};
use crate::retention::semver::{ParsedVersion, parse_version};

/// What to do with a candidate that matches the pattern but is not a valid version
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ParseFailurePolicy {
    /// Exclude the candidate from both KEEP and DELETE and carry on
    #[default]
    Skip,
    /// Refuse to plan anything
    Abort,
}

#[derive(Debug, Clone)]
pub struct RetentionPolicy {
    pub filter: VersionFilter,
    pub keep: usize,
    pub on_parse_error: ParseFailurePolicy,
}

impl RetentionPolicy {
    pub fn new(
        pattern: &str,
        keep: usize,
        on_parse_error: ParseFailurePolicy,
    ) -> Result<Self, PlanError> {
        Ok(Self {
            filter: VersionFilter::new(pattern)?,
            keep,
            on_parse_error,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetentionPlan {
    /// Tags that matched the pattern, in registry order
    pub candidates: Vec<String>,
    /// Decisions ordered newest first
    pub decisions: Vec<RetentionDecision>,
    /// Candidates that matched the pattern but failed to parse
    pub skipped: Vec<ParseError>,
}

impl RetentionPlan {
    pub fn keep(&self) -> impl Iterator<Item = &RetentionDecision> {
        self.decisions.iter().filter(|d| d.is_keep())
    }

    /// Deletions ordered oldest first
    pub fn delete(&self) -> impl Iterator<Item = &RetentionDecision> {
        self.decisions.iter().rev().filter(|d| !d.is_keep())
    }

    pub fn candidate_count(&self) -> usize {
        self.decisions.len()
    }
}

/// Decide which of `tags` to keep and which to delete.
pub fn plan<S: AsRef<str>>(
    tags: &[S],
    policy: &RetentionPolicy,
) -> Result<RetentionPlan, PlanError> {
    let candidates = policy.filter.filter(tags);

    let mut parsed: Vec<ParsedVersion> = Vec::with_capacity(candidates.len());
    let mut skipped = Vec::new();
    for candidate in &candidates {
        match parse_version(candidate) {
            Ok(version) => parsed.push(version),
            Err(e) => match policy.on_parse_error {
                ParseFailurePolicy::Abort => return Err(e.into()),
                ParseFailurePolicy::Skip => {
                    warn!("Skipping {}", e);
                    skipped.push(e);
                }
            },
        }
    }

    Ok(RetentionPlan {
        candidates,
        decisions: select(parsed, policy.keep),
        skipped,
    })
}
