//! The upgrade and build pipelines.
//!
//! Each pipeline runs its steps strictly in sequence and stops at the first
//! failure. The upgrade pipeline is triggered manually; the build pipeline
//! runs whenever the UI assets change.
//!
//! ```text
//! upgrade: latest release -> select artifact -> download -> sync vendor dir
//!          [-> asset version]
//! build:   compile templates -> bundle -> asset version
//! ```

use crate::assets::{AssetVersion, compute_asset_version, write_version_file};
use crate::bundle::{build_bundle, write_bundle};
use crate::config::ProjectConfig;
use crate::release::ReleaseClient;
use crate::templating::{TemplateEngine, compile_document};
use crate::vendor::{RewriteOutcome, SyncReport, VendorLock, VendorSyncer};
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::{debug, info};

/// Presentation switches shared by the pipelines.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineOptions {
    /// Suppress per-entry audit lines.
    pub quiet: bool,
    /// Draw a download progress bar.
    pub show_progress: bool,
}

/// Result of a completed upgrade.
#[derive(Debug, Clone)]
pub struct UpgradeOutcome {
    pub version: String,
    pub report: SyncReport,
    /// Set when the asset version was recomputed afterwards.
    pub asset_version: Option<AssetVersion>,
}

/// Result of `vendor --check`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradeCheck {
    pub latest: String,
    pub current: Option<String>,
    pub update_available: bool,
}

/// Result of a completed build.
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub template_ids: Vec<String>,
    pub bundle_file: PathBuf,
    pub asset_version: AssetVersion,
}

/// Bring the vendor directory to the latest upstream release.
pub async fn run_upgrade(config: &ProjectConfig, options: PipelineOptions) -> Result<UpgradeOutcome> {
    let client = ReleaseClient::new(&config.upstream)?.with_progress(options.show_progress);
    let release = client.latest().await?;
    info!("Latest upstream release is {}", release.version);

    let asset = release.select_artifact(&config.upstream.archive_content_type)?.clone();
    debug!("Selected asset {} ({})", asset.id, asset.name);

    let scratch = tempfile::tempdir().context("Failed to create scratch directory")?;
    let archive = client.download(&asset, scratch.path()).await?;

    let vendor_dir = config.vendor_dir();
    let lock = VendorLock::acquire(&vendor_dir).await?;
    debug!("Holding {}", lock.path().display());

    let syncer = VendorSyncer::from_config(config).quiet(options.quiet);
    let version = release.version.clone();
    let report = tokio::task::spawn_blocking(move || syncer.sync(&archive, &version))
        .await
        .context("Vendor sync task failed")??;
    drop(lock);

    let asset_version =
        if config.vendor.update_asset_version { Some(run_version(config)?) } else { None };

    Ok(UpgradeOutcome {
        version: release.version,
        report,
        asset_version,
    })
}

/// Compare the latest upstream release with the vendored one.
pub async fn check_upgrade(config: &ProjectConfig) -> Result<UpgradeCheck> {
    let client = ReleaseClient::new(&config.upstream)?;
    let release = client.latest().await?;
    let current = VendorSyncer::from_config(config).current_version()?;

    let update_available = match &current {
        None => true,
        Some(current) => is_newer(&release.version, current),
    };

    Ok(UpgradeCheck {
        latest: release.version,
        current,
        update_available,
    })
}

/// Whether `latest` should replace `current`. Semver ordering when both parse,
/// plain inequality otherwise.
#[must_use]
pub fn is_newer(latest: &str, current: &str) -> bool {
    match (semver::Version::parse(latest), semver::Version::parse(current)) {
        (Ok(latest), Ok(current)) => latest > current,
        _ => latest != current,
    }
}

/// Compile templates, write the bundle and refresh the asset version.
///
/// Nothing is written when template compilation fails.
pub fn run_build(config: &ProjectConfig) -> Result<BuildOutcome> {
    let engine = TemplateEngine::new()?;

    let templates_file = config.resolve(&config.build.templates_file);
    let html = std::fs::read_to_string(&templates_file)
        .with_context(|| format!("Failed to read templates from {}", templates_file.display()))?;
    let templates = compile_document(&engine, &html)?;
    info!("Compiled {} template(s)", templates.len());

    let static_script_path = config.resolve(&config.build.static_script);
    let static_script = std::fs::read_to_string(&static_script_path).with_context(|| {
        format!("Failed to read static script from {}", static_script_path.display())
    })?;

    let bundle = build_bundle(&templates, &static_script, &config.build.template_namespace);
    let bundle_file = config.resolve(&config.build.bundle_file);
    write_bundle(&bundle_file, &bundle)?;

    let asset_version = run_version(config)?;
    Ok(BuildOutcome {
        template_ids: templates.ids().map(str::to_string).collect(),
        bundle_file,
        asset_version,
    })
}

/// Recompute the asset version and write the version-constant file.
pub fn run_version(config: &ProjectConfig) -> Result<AssetVersion> {
    let asset_dir = config.resolve(&config.build.asset_dir);
    let version = compute_asset_version(&asset_dir, &config.build.extensions)?;

    let version_file = config.resolve(&config.build.version_file);
    write_version_file(&version_file, &version.token, &config.build.version_file_template)?;
    info!("Asset version {} ({} files)", version.token, version.files.len());
    Ok(version)
}

/// Re-apply the rewrite rules to the live vendor directory.
pub fn run_rewrite(config: &ProjectConfig) -> Result<Vec<(PathBuf, RewriteOutcome)>> {
    Ok(VendorSyncer::from_config(config).rewrite_live()?)
}
