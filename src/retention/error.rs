use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid version '{candidate}': {reason}")]
pub struct ParseError {
    pub candidate: String,
    pub reason: String,
}

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("Invalid image version pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Aborting: {0}")]
    UnparseableVersion(#[from] ParseError),
}
