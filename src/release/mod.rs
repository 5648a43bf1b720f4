//! Upstream release discovery and artifact download.
//!
//! The upstream publishes packaged builds as GitHub releases. Resolving and
//! fetching an artifact is a three-request exchange:
//!
//! ```text
//! 1. GET /repos/{owner}/{repo}/releases/latest      -> 200 + release JSON
//! 2. GET /repos/{owner}/{repo}/releases/assets/{id} -> 302 + Location
//! 3. GET {Location}                                 -> 200 + archive bytes
//! ```
//!
//! Each step requires one exact status code. Anything else aborts with
//! [`SyncError::UnexpectedStatus`](crate::core::SyncError::UnexpectedStatus)
//! carrying the step name and code. Nothing is retried; re-running the command
//! is the recovery path.

mod client;

pub use client::ReleaseClient;

use crate::core::SyncError;
use serde::Deserialize;

/// The latest upstream release. Fetched fresh every run and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    /// Bare version, e.g. `1.2.3` for a release named `v1.2.3`.
    pub version: String,
    /// Downloadable artifacts in the order the API lists them.
    pub assets: Vec<ReleaseAsset>,
}

/// One downloadable artifact of a [`Release`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReleaseAsset {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    pub content_type: String,
    #[serde(default, rename = "browser_download_url")]
    pub download_url: String,
}

/// Wire shape of the release-listing response.
#[derive(Debug, Deserialize)]
pub(crate) struct ReleasePayload {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tag_name: Option<String>,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

impl Release {
    pub(crate) fn from_payload(payload: ReleasePayload) -> Option<Self> {
        let raw = payload
            .name
            .filter(|name| !name.trim().is_empty())
            .or(payload.tag_name)
            .filter(|name| !name.trim().is_empty())?;

        Some(Self {
            version: strip_version_prefix(&raw).to_string(),
            assets: payload.assets,
        })
    }

    /// First asset whose content type equals `content_type`.
    ///
    /// A release without such an asset is a terminal condition distinct from
    /// any network failure.
    pub fn select_artifact(&self, content_type: &str) -> Result<&ReleaseAsset, SyncError> {
        self.assets.iter().find(|asset| asset.content_type == content_type).ok_or_else(|| {
            SyncError::MissingArtifact {
                version: self.version.clone(),
                content_type: content_type.to_string(),
            }
        })
    }
}

/// Strip one leading `v` from a release name.
#[must_use]
pub fn strip_version_prefix(name: &str) -> &str {
    let name = name.trim();
    name.strip_prefix('v').unwrap_or(name)
}
