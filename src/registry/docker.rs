//! Docker Registry HTTP API v2 implementation

use std::collections::HashSet;
use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderMap, LINK};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::{REQUEST_TIMEOUT_MS, USER_AGENT};
use crate::registry::Registry;
use crate::registry::error::RegistryError;

/// Media types accepted when resolving a tag to its manifest digest
const MANIFEST_MEDIA_TYPES: &str = "application/vnd.docker.distribution.manifest.v2+json, \
     application/vnd.docker.distribution.manifest.list.v2+json, \
     application/vnd.oci.image.manifest.v1+json, \
     application/vnd.oci.image.index.v1+json";

const DIGEST_HEADER: &str = "Docker-Content-Digest";

/// Response from `GET /v2/<name>/tags/list`
#[derive(Debug, Deserialize)]
struct TagList {
    #[serde(default)]
    tags: Option<Vec<String>>,
}

/// HTTP Basic credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: Option<String>,
}

/// Registry implementation for the Docker Registry HTTP API v2
pub struct DockerRegistry {
    client: reqwest::Client,
    base_url: String,
    credentials: Option<Credentials>,
}

impl DockerRegistry {
    pub fn new(base_url: &str, credentials: Option<Credentials>) -> Result<Self, RegistryError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_millis(REQUEST_TIMEOUT_MS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let request = self.client.request(method, url);
        match &self.credentials {
            Some(c) => request.basic_auth(&c.username, c.password.as_ref()),
            None => request,
        }
    }

    /// Resolve a `Link` target, which registries usually send as a path
    fn absolute_url(&self, target: &str) -> String {
        if target.starts_with("http://") || target.starts_with("https://") {
            target.to_string()
        } else {
            format!("{}{}", self.base_url, target)
        }
    }
}

/// Map non-success statuses to errors. `subject` names what was requested.
fn check_status(status: StatusCode, subject: &str, url: &str) -> Result<(), RegistryError> {
    match status {
        s if s.is_success() => Ok(()),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Err(RegistryError::Unauthorized(url.to_string()))
        }
        StatusCode::NOT_FOUND => Err(RegistryError::NotFound(subject.to_string())),
        _ => {
            warn!("Registry returned status {}: {}", status, url);
            Err(RegistryError::InvalidResponse(format!(
                "Unexpected status: {}",
                status
            )))
        }
    }
}

/// Extract the `rel="next"` target from a `Link` header
fn next_page(headers: &HeaderMap) -> Option<String> {
    let link = headers.get(LINK)?.to_str().ok()?;
    link.split(',').find_map(|entry| {
        let (target, params) = entry.split_once(';')?;
        params
            .split(';')
            .any(|p| p.trim() == r#"rel="next""#)
            .then(|| {
                target
                    .trim()
                    .trim_start_matches('<')
                    .trim_end_matches('>')
                    .to_string()
            })
    })
}

#[async_trait::async_trait]
impl Registry for DockerRegistry {
    async fn list_tags(&self, image: &str) -> Result<Vec<String>, RegistryError> {
        let mut url = format!("{}/v2/{}/tags/list", self.base_url, image);
        let mut tags = Vec::new();
        let mut visited = HashSet::from([url.clone()]);

        loop {
            let response = self.request(Method::GET, &url).send().await?;
            check_status(response.status(), image, &url)?;

            let next = next_page(response.headers()).map(|target| self.absolute_url(&target));

            let page: TagList = response.json().await.map_err(|e| {
                warn!("Failed to parse tag list response: {}", e);
                RegistryError::InvalidResponse(e.to_string())
            })?;
            tags.extend(page.tags.unwrap_or_default());

            match next {
                Some(next) if visited.insert(next.clone()) => {
                    debug!("Following tag list page {}", next);
                    url = next;
                }
                Some(next) => {
                    warn!("Tag list page {} was already fetched, stopping pagination", next);
                    break;
                }
                None => break,
            }
        }

        Ok(tags)
    }

    async fn manifest_digest(
        &self,
        image: &str,
        reference: &str,
    ) -> Result<String, RegistryError> {
        let url = format!("{}/v2/{}/manifests/{}", self.base_url, image, reference);

        let response = self
            .request(Method::HEAD, &url)
            .header(ACCEPT, MANIFEST_MEDIA_TYPES)
            .send()
            .await?;
        check_status(response.status(), &format!("{image}:{reference}"), &url)?;

        response
            .headers()
            .get(DIGEST_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| RegistryError::MissingDigest(format!("{image}:{reference}")))
    }

    async fn delete_manifest(&self, image: &str, digest: &str) -> Result<(), RegistryError> {
        let url = format!("{}/v2/{}/manifests/{}", self.base_url, image, digest);

        let response = self.request(Method::DELETE, &url).send().await?;
        if response.status() == StatusCode::METHOD_NOT_ALLOWED {
            return Err(RegistryError::DeletionDisabled);
        }
        check_status(response.status(), &format!("{image}@{digest}"), &url)
    }
}
