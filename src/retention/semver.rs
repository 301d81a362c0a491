//! Parsing and ordering of image tags as semantic versions

use std::fmt;

use semver::Version;

use crate::retention::error::ParseError;

/// A version candidate parsed into a comparable semantic version.
///
/// Ordering follows semver precedence, so `1.0.0-SNAPSHOT < 1.0.0` and
/// `1.10.0 > 1.9.0`. Field order matters for the derived `Ord`: the raw tag
/// is only consulted when two tags normalize to the same version
/// (e.g. `1.2-SNAPSHOT` and `1.2.0-SNAPSHOT`), which keeps the order total.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ParsedVersion {
    pub version: Version,
    pub tag: String,
}

impl fmt::Display for ParsedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag)
    }
}

/// Parse a version candidate into a [`ParsedVersion`].
///
/// Accepts `major.minor.patch[-pre][+build]`, plus two lenient forms:
/// - a leading `v` directly followed by a digit is dropped (`v1.2.3`)
/// - partial cores are zero padded (`1` -> `1.0.0`, `1.2-rc.1` -> `1.2.0-rc.1`)
pub fn parse_version(candidate: &str) -> Result<ParsedVersion, ParseError> {
    let normalized = normalize(candidate);
    Version::parse(&normalized)
        .map(|version| ParsedVersion {
            version,
            tag: candidate.to_string(),
        })
        .map_err(|e| ParseError {
            candidate: candidate.to_string(),
            reason: e.to_string(),
        })
}

fn normalize(candidate: &str) -> String {
    let stripped = candidate
        .strip_prefix('v')
        .filter(|rest| rest.starts_with(|c: char| c.is_ascii_digit()))
        .unwrap_or(candidate);

    // Pre-release and build suffixes may contain dots, so pad only the core.
    let core_end = stripped.find(['-', '+']).unwrap_or(stripped.len());
    let (core, suffix) = stripped.split_at(core_end);

    match core.split('.').count() {
        1 => format!("{core}.0.0{suffix}"),
        2 => format!("{core}.0{suffix}"),
        _ => stripped.to_string(),
    }
}
