//! Partitioning of parsed versions into KEEP and DELETE

use crate::retention::semver::ParsedVersion;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Keep,
    Delete,
}

/// Decision for a single version candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionDecision {
    pub version: ParsedVersion,
    /// Position in descending order, 0 is the newest version
    pub rank: usize,
    pub verdict: Verdict,
}

impl RetentionDecision {
    pub fn tag(&self) -> &str {
        &self.version.tag
    }

    pub fn is_keep(&self) -> bool {
        self.verdict == Verdict::Keep
    }
}

/// Sort candidates newest first and keep the first `keep` of them.
///
/// `keep == 0` deletes everything, `keep >= candidates.len()` keeps everything.
pub fn select(mut candidates: Vec<ParsedVersion>, keep: usize) -> Vec<RetentionDecision> {
    candidates.sort_by(|a, b| b.cmp(a));

    candidates
        .into_iter()
        .enumerate()
        .map(|(rank, version)| RetentionDecision {
            version,
            rank,
            verdict: if rank < keep {
                Verdict::Keep
            } else {
                Verdict::Delete
            },
        })
        .collect()
}
