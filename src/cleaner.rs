//! Cleanup run: list tags, plan retention, delete what is not kept
//!
//! The plan is computed in full before any manifest is touched. Listing
//! failures abort the run; a failed digest lookup or deletion only affects
//! its own version and is collected into the report. The one exception is a
//! kept version whose digest cannot be resolved: nothing is deleted then,
//! since any deletion could remove the kept manifest.

use std::collections::HashSet;
use std::io::Write;

use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::CleanerConfig;
use crate::registry::{Registry, RegistryError};
use crate::retention::error::PlanError;
use crate::retention::plan::plan;

#[derive(Debug, Error)]
pub enum CleanerError {
    #[error("Failed to list tags for {image}: {source}")]
    ListTags {
        image: String,
        #[source]
        source: RegistryError,
    },

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

/// A version that could not be cleaned up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupFailure {
    pub tag: String,
    pub reason: String,
}

/// Outcome of a cleanup run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Number of tags that parsed as versions after filtering
    pub matched: usize,
    /// Tags that were kept, newest first
    pub kept: Vec<String>,
    /// Digests deleted from the registry
    pub deleted: Vec<String>,
    /// Digests that would have been deleted in a dry run
    pub would_delete: Vec<String>,
    /// Tags left alone because a kept version shares their manifest
    pub protected: Vec<String>,
    /// Tags whose manifest was already handled for an older tag in this run
    pub shared: Vec<String>,
    /// Tags that matched the pattern but are not valid versions
    pub skipped: Vec<String>,
    pub failures: Vec<CleanupFailure>,
}

impl CleanupReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// One-line count of every outcome
    pub fn summary(&self) -> String {
        format!(
            "Kept {}, deleted {}, would delete {}, protected {}, shared {}, skipped {}, failed {}",
            self.kept.len(),
            self.deleted.len(),
            self.would_delete.len(),
            self.protected.len(),
            self.shared.len(),
            self.skipped.len(),
            self.failures.len()
        )
    }
}

/// Run one cleanup for `config.image`, writing progress lines to `out`.
pub async fn run<W: Write>(
    config: &CleanerConfig,
    registry: &dyn Registry,
    out: &mut W,
) -> Result<CleanupReport, CleanerError> {
    let policy = config.retention_policy()?;

    let tags = registry
        .list_tags(&config.image)
        .await
        .map_err(|source| CleanerError::ListTags {
            image: config.image.clone(),
            source,
        })?;
    info!("Found {} tags for {}", tags.len(), config.image);

    let plan = plan(&tags, &policy)?;
    for candidate in &plan.candidates {
        writeln!(out, "version: {}", candidate)?;
    }

    let mut report = CleanupReport {
        matched: plan.candidate_count(),
        kept: plan.keep().map(|d| d.tag().to_string()).collect(),
        skipped: plan.skipped.iter().map(|e| e.candidate.clone()).collect(),
        ..CleanupReport::default()
    };
    for skipped in &report.skipped {
        writeln!(out, "Skipping {}: not a valid version", skipped)?;
    }

    if config.dry_run {
        writeln!(out, "DRY RUN - nothing will be deleted")?;
    }

    writeln!(
        out,
        "Found {} images that match, keeping the {} latest versions and deleting the rest",
        report.matched, config.keep
    )?;

    if plan.delete().next().is_none() {
        return Ok(report);
    }

    // Deleting a manifest removes every tag pointing at it, kept ones included.
    let mut protected_digests = HashSet::new();
    for decision in plan.keep() {
        let tag = decision.tag();
        match registry.manifest_digest(&config.image, tag).await {
            Ok(digest) => {
                protected_digests.insert(digest);
            }
            Err(e) => {
                warn!("Failed to resolve manifest digest for kept version {}: {}", tag, e);
                writeln!(
                    out,
                    "Failed to get manifest digest for kept version {}: {}",
                    tag, e
                )?;
                report.failures.push(CleanupFailure {
                    tag: tag.to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }
    if !report.failures.is_empty() {
        writeln!(
            out,
            "Not deleting anything: the manifests of kept versions are unknown"
        )?;
        return Ok(report);
    }

    let mut handled_digests = HashSet::new();
    for decision in plan.delete() {
        let tag = decision.tag();

        let digest = match registry.manifest_digest(&config.image, tag).await {
            Ok(digest) => digest,
            Err(e) => {
                warn!("Failed to resolve manifest digest for {}: {}", tag, e);
                writeln!(out, "Failed to get manifest digest for {}: {}", tag, e)?;
                report.failures.push(CleanupFailure {
                    tag: tag.to_string(),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        if protected_digests.contains(&digest) {
            writeln!(
                out,
                "Keeping {}: manifest {} is shared with a kept version",
                tag, digest
            )?;
            report.protected.push(tag.to_string());
            continue;
        }

        if !handled_digests.insert(digest.clone()) {
            writeln!(out, "Skipping {}: manifest {} was already handled", tag, digest)?;
            report.shared.push(tag.to_string());
            continue;
        }

        if config.dry_run {
            writeln!(out, "[dry run] Deleting Manifest Digest: {}", digest)?;
            report.would_delete.push(digest);
            continue;
        }

        writeln!(out, "Deleting Manifest Digest: {}", digest)?;
        match registry.delete_manifest(&config.image, &digest).await {
            Ok(()) => {
                info!("Deleted {}@{} ({})", config.image, digest, tag);
                report.deleted.push(digest);
            }
            Err(e) => {
                error!("Failed to delete {}@{}: {}", config.image, digest, e);
                writeln!(out, "Failed to delete {}: {}", digest, e)?;
                report.failures.push(CleanupFailure {
                    tag: tag.to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }

    Ok(report)
}
