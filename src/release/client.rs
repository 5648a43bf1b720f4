use super::{Release, ReleaseAsset, ReleasePayload};
use crate::config::UpstreamConfig;
use crate::constants::{GITHUB_JSON_MEDIA_TYPE, OCTET_STREAM_MEDIA_TYPE, USER_AGENT};
use crate::core::SyncError;
use crate::utils::DownloadProgress;
use reqwest::header::{ACCEPT, LOCATION};
use reqwest::{StatusCode, Url};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// Client for the upstream release API.
///
/// Redirects are never followed automatically: the asset endpoint must answer
/// with exactly `302 Found`, and the storage location it points to is fetched
/// as a separate request without the API credentials.
pub struct ReleaseClient {
    http: reqwest::Client,
    api_base: String,
    owner: String,
    repo: String,
    token: Option<String>,
    show_progress: bool,
}

impl ReleaseClient {
    /// Build a client for the configured upstream.
    pub fn new(config: &UpstreamConfig) -> Result<Self, SyncError> {
        let mut builder = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(USER_AGENT);
        if let Some(secs) = config.connect_timeout_secs {
            builder = builder.connect_timeout(Duration::from_secs(secs));
        }
        let http = builder.build().map_err(|e| SyncError::network("HTTP client setup", &e))?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            owner: config.owner.clone(),
            repo: config.repo.clone(),
            token: config.token.clone(),
            show_progress: false,
        })
    }

    /// Show a progress bar while streaming downloads.
    #[must_use]
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    fn repo_url(&self, path: &str) -> String {
        format!("{}/repos/{}/{}/{}", self.api_base, self.owner, self.repo, path)
    }

    fn api_get(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self.http.get(url);
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Fetch the latest release.
    ///
    /// # Errors
    ///
    /// - [`SyncError::Network`] when the request cannot be completed
    /// - [`SyncError::UnexpectedStatus`] for any status other than `200`
    /// - [`SyncError::InvalidResponse`] when the body is not release metadata
    pub async fn latest(&self) -> Result<Release, SyncError> {
        let url = self.repo_url("releases/latest");
        info!("Checking {} for the latest release", url);

        let response = self
            .api_get(&url)
            .header(ACCEPT, GITHUB_JSON_MEDIA_TYPE)
            .send()
            .await
            .map_err(|e| SyncError::network("release lookup", &e))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(SyncError::UnexpectedStatus {
                step: "release lookup".to_string(),
                url,
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| SyncError::network("release lookup", &e))?;
        let payload: ReleasePayload =
            serde_json::from_str(&body).map_err(|e| SyncError::InvalidResponse {
                url: url.clone(),
                reason: e.to_string(),
            })?;

        let release = Release::from_payload(payload).ok_or_else(|| SyncError::InvalidResponse {
            url,
            reason: "release has neither a name nor a tag".to_string(),
        })?;

        debug!("Latest release is {} with {} asset(s)", release.version, release.assets.len());
        Ok(release)
    }

    /// Download a release asset into `dest_dir` and return the file path.
    ///
    /// The body is streamed chunk by chunk to disk; nothing is created in
    /// `dest_dir` unless both the lookup and the download request succeed.
    ///
    /// # Errors
    ///
    /// - [`SyncError::UnexpectedStatus`] when the lookup is not `302` or the
    ///   download is not `200`
    /// - [`SyncError::MissingRedirect`] when the `302` has no usable `Location`
    /// - [`SyncError::Network`] on transport failure, including mid-stream
    /// - [`SyncError::Io`] when the destination cannot be written
    pub async fn download(&self, asset: &ReleaseAsset, dest_dir: &Path) -> Result<PathBuf, SyncError> {
        let url = self.repo_url(&format!("releases/assets/{}", asset.id));
        info!("Resolving download location for asset {}", asset.id);

        let response = self
            .api_get(&url)
            .header(ACCEPT, OCTET_STREAM_MEDIA_TYPE)
            .send()
            .await
            .map_err(|e| SyncError::network("asset lookup", &e))?;

        let status = response.status();
        if status != StatusCode::FOUND {
            return Err(SyncError::UnexpectedStatus {
                step: "asset lookup".to_string(),
                url,
                status: status.as_u16(),
            });
        }

        let target = redirect_target(&url, response.headers().get(LOCATION))?;
        debug!("Asset {} is served from {}", asset.id, target);

        // Storage hosts reject the API credentials, so this request goes out bare
        let mut response = self
            .http
            .get(target.clone())
            .send()
            .await
            .map_err(|e| SyncError::network("asset download", &e))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(SyncError::UnexpectedStatus {
                step: "asset download".to_string(),
                url: target.to_string(),
                status: status.as_u16(),
            });
        }

        let dest = dest_dir.join(download_file_name(asset));
        let mut file =
            tokio::fs::File::create(&dest).await.map_err(|e| SyncError::io("create", &dest, &e))?;

        let progress = if self.show_progress {
            DownloadProgress::new(response.content_length(), format!("Downloading {}", asset.name))
        } else {
            DownloadProgress::hidden()
        };

        let streamed: Result<(), SyncError> = async {
            while let Some(chunk) =
                response.chunk().await.map_err(|e| SyncError::network("asset download", &e))?
            {
                file.write_all(&chunk).await.map_err(|e| SyncError::io("write", &dest, &e))?;
                progress.inc(chunk.len() as u64);
            }
            file.flush().await.map_err(|e| SyncError::io("flush", &dest, &e))?;
            file.sync_all().await.map_err(|e| SyncError::io("sync", &dest, &e))
        }
        .await;
        progress.finish_and_clear();

        if let Err(e) = streamed {
            drop(file);
            if let Err(cleanup) = tokio::fs::remove_file(&dest).await {
                warn!("Failed to remove partial download {}: {}", dest.display(), cleanup);
            }
            return Err(e);
        }

        info!("Downloaded {} bytes to {}", progress.position(), dest.display());
        Ok(dest)
    }
}

/// Resolve the `Location` header, which may be relative, against the lookup URL.
fn redirect_target(
    lookup_url: &str,
    location: Option<&reqwest::header::HeaderValue>,
) -> Result<Url, SyncError> {
    let missing = || SyncError::MissingRedirect {
        url: lookup_url.to_string(),
    };

    let location = location.and_then(|value| value.to_str().ok()).filter(|s| !s.is_empty());
    let location = location.ok_or_else(missing)?;
    Url::parse(lookup_url).and_then(|base| base.join(location)).map_err(|_| missing())
}

/// File name for a downloaded asset, never escaping the scratch directory.
fn download_file_name(asset: &ReleaseAsset) -> String {
    Path::new(&asset.name)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty() && name != "..")
        .unwrap_or_else(|| format!("asset-{}.bin", asset.id))
}
