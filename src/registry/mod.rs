//! Registry trait for listing tags and deleting manifests

#[cfg(test)]
use mockall::automock;

pub mod docker;
pub mod error;

pub use docker::{Credentials, DockerRegistry};
pub use error::RegistryError;

/// The three registry calls a cleanup run needs
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Registry: Send + Sync {
    /// Lists every tag pushed under `image` (e.g. "development/nginx").
    /// The registry guarantees neither order nor uniqueness.
    async fn list_tags(&self, image: &str) -> Result<Vec<String>, RegistryError>;

    /// Resolves a tag to the content digest of its manifest
    async fn manifest_digest(
        &self,
        image: &str,
        reference: &str,
    ) -> Result<String, RegistryError>;

    /// Deletes the manifest identified by `digest`
    async fn delete_manifest(&self, image: &str, digest: &str) -> Result<(), RegistryError>;
}
