//! Project configuration for assetsync.
//!
//! Configuration lives in `assetsync.toml` at the project root. Every field is
//! optional; the built-in defaults describe the one vendored library this
//! tool manages and the host application's asset layout. Relative paths are
//! resolved against the directory containing the configuration file (or the
//! working directory when no file exists).
//!
//! # File Format
//!
//! ```toml
//! [upstream]
//! owner = "jlfwong"
//! repo = "speedscope"
//! archive_content_type = "application/zip"
//!
//! [vendor]
//! dir = "lib/html/speedscope"
//! excluded_fragments = ["README", "perf-vertx-stacks"]
//!
//! [[vendor.rewrite]]
//! file = "index.html"
//! pattern = "https://fonts.googleapis.com/css?family=Source+Code+Pro"
//! replacement = "fonts/source-code-pro-regular.css"
//!
//! [build]
//! asset_dir = "lib/html"
//! extensions = ["js", "html", "css", "tmpl"]
//! version_file = "lib/mini_profiler/asset_version.rs"
//! ```
//!
//! # Environment Overrides
//!
//! - `ASSETSYNC_API_BASE` replaces `upstream.api_base` (used by tests and mirrors)
//! - `GITHUB_TOKEN` is sent as a bearer token when present

use crate::constants::{
    API_BASE_ENV, CONFIG_FILE_NAME, DEFAULT_API_BASE, DEFAULT_ARCHIVE_CONTENT_TYPE,
    DEFAULT_ASSET_DIR, DEFAULT_ASSET_EXTENSIONS, DEFAULT_BUNDLE_FILE, DEFAULT_EXCLUDED_FRAGMENTS,
    DEFAULT_KEEP_MANIFEST, DEFAULT_REPO_NAME, DEFAULT_REPO_OWNER, DEFAULT_REWRITE_FILE,
    DEFAULT_REWRITE_PATTERN, DEFAULT_REWRITE_REPLACEMENT, DEFAULT_STATIC_SCRIPT,
    DEFAULT_TEMPLATE_NAMESPACE, DEFAULT_TEMPLATES_FILE, DEFAULT_VENDOR_DIR,
    DEFAULT_VERSION_DELIMITER, DEFAULT_VERSION_FILE, DEFAULT_VERSION_FILE_TEMPLATE,
    DEFAULT_VERSION_MARKER, GITHUB_TOKEN_ENV,
};
use crate::core::SyncError;
use crate::vendor::RewriteRule;
use crate::vendor::keep::is_entry_name;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Complete project configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Where releases come from.
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// How the vendor directory is replaced.
    #[serde(default)]
    pub vendor: VendorConfig,

    /// Inputs and outputs of the asset build.
    #[serde(default)]
    pub build: BuildConfig,

    /// Directory relative paths are resolved against. Not part of the file.
    #[serde(skip)]
    pub root: PathBuf,
}

/// Upstream release source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpstreamConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,

    #[serde(default = "default_owner")]
    pub owner: String,

    #[serde(default = "default_repo")]
    pub repo: String,

    /// Media type the downloadable artifact must have.
    #[serde(default = "default_archive_content_type")]
    pub archive_content_type: String,

    /// Connect timeout in seconds. Unset keeps the transport default.
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,

    /// Bearer token, only ever taken from the environment.
    #[serde(skip)]
    pub token: Option<String>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            owner: default_owner(),
            repo: default_repo(),
            archive_content_type: default_archive_content_type(),
            connect_timeout_secs: None,
            token: None,
        }
    }
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_owner() -> String {
    DEFAULT_REPO_OWNER.to_string()
}

fn default_repo() -> String {
    DEFAULT_REPO_NAME.to_string()
}

fn default_archive_content_type() -> String {
    DEFAULT_ARCHIVE_CONTENT_TYPE.to_string()
}

/// Vendor directory replacement policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VendorConfig {
    /// Vendor directory, relative to the project root.
    pub dir: PathBuf,

    /// Kept-file manifest name inside the vendor directory.
    pub keep_manifest: String,

    /// Top-level archive folder to extract. Defaults to the vendor dir name.
    pub archive_prefix: Option<String>,

    /// Archive entries containing any of these fragments are skipped.
    pub excluded_fragments: Vec<String>,

    /// Version marker file inside the vendor directory.
    pub version_marker: String,

    /// Delimiter splitting the marker's first line.
    pub version_delimiter: String,

    /// Recompute the asset version after a successful sync.
    pub update_asset_version: bool,

    /// Post-extraction rewrites, applied in order.
    pub rewrite: Vec<RewriteRule>,
}

impl Default for VendorConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_VENDOR_DIR),
            keep_manifest: DEFAULT_KEEP_MANIFEST.to_string(),
            archive_prefix: None,
            excluded_fragments: DEFAULT_EXCLUDED_FRAGMENTS.iter().map(|s| (*s).to_string()).collect(),
            version_marker: DEFAULT_VERSION_MARKER.to_string(),
            version_delimiter: DEFAULT_VERSION_DELIMITER.to_string(),
            update_asset_version: true,
            rewrite: vec![RewriteRule {
                file: PathBuf::from(DEFAULT_REWRITE_FILE),
                pattern: DEFAULT_REWRITE_PATTERN.to_string(),
                replacement: DEFAULT_REWRITE_REPLACEMENT.to_string(),
            }],
        }
    }
}

/// Asset build inputs and outputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    pub asset_dir: PathBuf,
    pub extensions: Vec<String>,
    pub templates_file: PathBuf,
    pub static_script: PathBuf,
    pub bundle_file: PathBuf,
    pub version_file: PathBuf,

    /// Tera template rendered with `asset_version` into `version_file`.
    pub version_file_template: String,

    /// Global object the bundle attaches templates to.
    pub template_namespace: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            asset_dir: PathBuf::from(DEFAULT_ASSET_DIR),
            extensions: DEFAULT_ASSET_EXTENSIONS.iter().map(|s| (*s).to_string()).collect(),
            templates_file: PathBuf::from(DEFAULT_TEMPLATES_FILE),
            static_script: PathBuf::from(DEFAULT_STATIC_SCRIPT),
            bundle_file: PathBuf::from(DEFAULT_BUNDLE_FILE),
            version_file: PathBuf::from(DEFAULT_VERSION_FILE),
            version_file_template: DEFAULT_VERSION_FILE_TEMPLATE.to_string(),
            template_namespace: DEFAULT_TEMPLATE_NAMESPACE.to_string(),
        }
    }
}

impl ProjectConfig {
    /// Load configuration.
    ///
    /// With an explicit path the file must exist. Without one,
    /// `assetsync.toml` in the working directory is used when present and the
    /// defaults otherwise. Environment overrides are applied in both cases.
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load_from(path).await?,
            None => {
                let cwd = std::env::current_dir().context("Failed to determine working directory")?;
                let candidate = cwd.join(CONFIG_FILE_NAME);
                if candidate.exists() {
                    Self::load_from(&candidate).await?
                } else {
                    debug!("No {} found, using built-in defaults", CONFIG_FILE_NAME);
                    Self {
                        root: cwd,
                        ..Self::default()
                    }
                }
            }
        };

        config.apply_env_overrides();
        config.validate().map_err(|e| SyncError::Config {
            message: e.to_string(),
        })?;
        Ok(config)
    }

    /// Load configuration from a specific file, without environment overrides.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let mut config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        config.root = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => std::env::current_dir().context("Failed to determine working directory")?,
        };
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Defaults rooted at `root`, as used by tests and `load` without a file.
    #[must_use]
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(api_base) = std::env::var(API_BASE_ENV)
            && !api_base.is_empty()
        {
            debug!("Using API base from {}: {}", API_BASE_ENV, api_base);
            self.upstream.api_base = api_base;
        }

        if let Ok(token) = std::env::var(GITHUB_TOKEN_ENV)
            && !token.is_empty()
        {
            self.upstream.token = Some(token);
        }
    }

    /// Reject configurations the pipelines cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.upstream.owner.is_empty() || self.upstream.repo.is_empty() {
            bail!("upstream.owner and upstream.repo must not be empty");
        }
        if !is_entry_name(&self.vendor.keep_manifest) {
            bail!("vendor.keep_manifest must be a file name, got '{}'", self.vendor.keep_manifest);
        }
        if self.vendor.version_delimiter.is_empty() {
            bail!("vendor.version_delimiter must not be empty");
        }
        if self.vendor_dir().file_name().is_none() {
            bail!("vendor.dir must name a directory, got {}", self.vendor.dir.display());
        }
        if self.build.extensions.is_empty() {
            bail!("build.extensions must list at least one extension");
        }
        for rule in &self.vendor.rewrite {
            if rule.pattern.is_empty() {
                bail!("vendor.rewrite pattern for {} must not be empty", rule.file.display());
            }
        }
        Ok(())
    }

    /// Resolve a configured path against the project root.
    #[must_use]
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    #[must_use]
    pub fn vendor_dir(&self) -> PathBuf {
        self.resolve(&self.vendor.dir)
    }

    /// Top-level archive folder, defaulting to the vendor directory name.
    #[must_use]
    pub fn archive_prefix(&self) -> String {
        match &self.vendor.archive_prefix {
            Some(prefix) => prefix.trim_end_matches('/').to_string(),
            None => self
                .vendor
                .dir
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
        }
    }
}
