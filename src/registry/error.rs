use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("No Docker-Content-Digest header for {0}")]
    MissingDigest(String),

    #[error("Manifest deletion is disabled on the registry")]
    DeletionDisabled,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}
