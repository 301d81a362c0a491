//! Whole-string tag filtering against the image version pattern

use regex::Regex;
use tracing::debug;

use crate::retention::error::PlanError;

/// Selects the tags that are version candidates.
///
/// A tag is a candidate only when the pattern covers the entire tag, so
/// `.*-SNAPSHOT` accepts `1.0.0-SNAPSHOT` but not `1.0.0-SNAPSHOT-debug`.
#[derive(Debug, Clone)]
pub struct VersionFilter {
    pattern: String,
    regex: Regex,
}

impl VersionFilter {
    pub fn new(pattern: &str) -> Result<Self, PlanError> {
        let regex = Regex::new(&format!("^(?:{pattern})$")).map_err(|source| {
            PlanError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            }
        })?;

        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    /// The pattern as given by the user, without anchors
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn is_match(&self, tag: &str) -> bool {
        self.regex.is_match(tag)
    }

    /// Returns matching tags in input order. Duplicates are kept.
    pub fn filter<S: AsRef<str>>(&self, tags: &[S]) -> Vec<String> {
        tags.iter()
            .map(AsRef::as_ref)
            .filter(|tag| self.is_match(tag))
            .inspect(|tag| debug!("Tag {} matches pattern {}", tag, self.pattern))
            .map(str::to_string)
            .collect()
    }
}
