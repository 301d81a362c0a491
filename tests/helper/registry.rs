//! Registry test utilities

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use mockito::{Mock, ServerGuard};

use registry_cleaner::registry::{Registry, RegistryError};

/// In-memory registry that records deletions
#[derive(Default)]
pub struct FakeRegistry {
    tags: HashMap<String, Vec<String>>,
    deleted: Mutex<Vec<String>>,
}

impl FakeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tags(mut self, image: &str, tags: &[&str]) -> Self {
        self.tags.insert(
            image.to_string(),
            tags.iter().map(|t| t.to_string()).collect(),
        );
        self
    }

    /// Digests deleted so far, in call order
    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn digest_of(tag: &str) -> String {
        format!("sha256:{}", tag.to_lowercase().replace(['.', '-'], ""))
    }
}

#[async_trait]
impl Registry for FakeRegistry {
    async fn list_tags(&self, image: &str) -> Result<Vec<String>, RegistryError> {
        self.tags
            .get(image)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(image.to_string()))
    }

    async fn manifest_digest(
        &self,
        image: &str,
        reference: &str,
    ) -> Result<String, RegistryError> {
        match self.tags.get(image) {
            Some(tags) if tags.iter().any(|t| t == reference) => Ok(Self::digest_of(reference)),
            _ => Err(RegistryError::NotFound(format!("{image}:{reference}"))),
        }
    }

    async fn delete_manifest(&self, _image: &str, digest: &str) -> Result<(), RegistryError> {
        self.deleted.lock().unwrap().push(digest.to_string());
        Ok(())
    }
}

/// mockito server speaking the Docker Registry HTTP API v2
pub struct RegistryServer {
    pub server: ServerGuard,
}

impl RegistryServer {
    pub async fn start() -> Self {
        Self {
            server: mockito::Server::new_async().await,
        }
    }

    pub fn url(&self) -> String {
        self.server.url()
    }

    pub async fn with_tags(&mut self, image: &str, tags: &[&str]) -> Mock {
        let body = serde_json::json!({ "name": image, "tags": tags }).to_string();
        self.server
            .mock("GET", format!("/v2/{image}/tags/list").as_str())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }

    pub async fn with_manifest(&mut self, image: &str, tag: &str, digest: &str) -> Mock {
        self.server
            .mock("HEAD", format!("/v2/{image}/manifests/{tag}").as_str())
            .with_status(200)
            .with_header("docker-content-digest", digest)
            .create_async()
            .await
    }

    /// Expects exactly `hits` DELETE calls for `digest`
    pub async fn expect_delete(&mut self, image: &str, digest: &str, hits: usize) -> Mock {
        self.server
            .mock("DELETE", format!("/v2/{image}/manifests/{digest}").as_str())
            .with_status(202)
            .expect(hits)
            .create_async()
            .await
    }
}
