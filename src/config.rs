use std::path::PathBuf;

use tracing::warn;

use crate::registry::Credentials;
use crate::retention::error::PlanError;
use crate::retention::plan::{ParseFailurePolicy, RetentionPolicy};

// =============================================================================
// Defaults
// =============================================================================

/// Registry used when neither `--url` nor `URL` is given
pub const DEFAULT_REGISTRY_URL: &str = "http://localhost:5000";

/// Only snapshot builds are retired unless told otherwise
pub const DEFAULT_IMAGE_VERSION_PATTERN: &str = ".*-SNAPSHOT.*";

/// Number of newest matching versions that survive a run
pub const DEFAULT_KEEP: usize = 3;

/// Timeout for a single registry request in milliseconds (30 seconds)
pub const REQUEST_TIMEOUT_MS: u64 = 30_000;

pub const USER_AGENT: &str = concat!("registry-cleaner/", env!("CARGO_PKG_VERSION"));

/// Settings for one cleanup run, built once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanerConfig {
    pub registry_url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Image name, e.g. "development/nginx"
    pub image: String,
    /// Regex a tag must match in full to be considered for deletion
    pub image_version: String,
    pub keep: usize,
    pub dry_run: bool,
    pub on_parse_error: ParseFailurePolicy,
}

impl CleanerConfig {
    pub fn new(image: &str) -> Self {
        Self {
            registry_url: DEFAULT_REGISTRY_URL.to_string(),
            username: None,
            password: None,
            image: image.to_string(),
            image_version: DEFAULT_IMAGE_VERSION_PATTERN.to_string(),
            keep: DEFAULT_KEEP,
            dry_run: false,
            on_parse_error: ParseFailurePolicy::default(),
        }
    }

    /// Basic credentials, if a username is configured.
    /// A password without a username is ignored.
    pub fn credentials(&self) -> Option<Credentials> {
        match (&self.username, &self.password) {
            (Some(username), password) if !username.is_empty() => Some(Credentials {
                username: username.clone(),
                password: password.clone(),
            }),
            (_, Some(_)) => {
                warn!("Password given without username, connecting anonymously");
                None
            }
            _ => None,
        }
    }

    pub fn retention_policy(&self) -> Result<RetentionPolicy, PlanError> {
        RetentionPolicy::new(&self.image_version, self.keep, self.on_parse_error)
    }
}

/// Returns the path to the data directory for registry-cleaner.
/// Uses $XDG_DATA_HOME/registry-cleaner if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/registry-cleaner,
/// or ./registry-cleaner if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the default path of the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("registry-cleaner.log")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("registry-cleaner")
}
