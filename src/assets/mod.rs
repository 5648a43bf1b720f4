//! Asset version token.
//!
//! The host application serves the UI assets with the token appended to their
//! URLs, so any content change must produce a new token:
//!
//! 1. Glob `asset_dir/*.{ext}` for each covered extension (not recursive)
//! 2. SHA-256 each file
//! 3. Sort the hex digests and hash their concatenation
//!
//! Sorting by digest rather than by path makes the token independent of
//! enumeration order and of file names.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tera::Tera;
use tracing::{debug, warn};

use crate::utils::fs::safe_write;

/// A computed token and the files it covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetVersion {
    pub token: String,
    /// Covered files with their digests, sorted by path.
    pub files: Vec<(PathBuf, String)>,
}

fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Files in `asset_dir` with one of `extensions`, sorted and deduplicated.
pub fn covered_files(asset_dir: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    let escaped = glob::Pattern::escape(&asset_dir.to_string_lossy());
    let mut files = BTreeSet::new();
    for extension in extensions {
        let pattern = format!("{}/*.{}", escaped, extension.trim_start_matches('.'));
        for entry in glob::glob(&pattern).with_context(|| format!("Invalid glob pattern: {pattern}"))? {
            let path = entry.with_context(|| format!("Failed to read entry matching {pattern}"))?;
            if path.is_file() {
                files.insert(path);
            }
        }
    }
    Ok(files.into_iter().collect())
}

/// Combine per-file digests into the token.
#[must_use]
pub fn combine_digests(digests: impl IntoIterator<Item = String>) -> String {
    let mut digests: Vec<String> = digests.into_iter().collect();
    digests.sort();
    sha256_hex(digests.concat().as_bytes())
}

/// Hash every covered file of `asset_dir`.
pub fn compute_asset_version(asset_dir: &Path, extensions: &[String]) -> Result<AssetVersion> {
    let paths = covered_files(asset_dir, extensions)?;
    if paths.is_empty() {
        warn!("No asset files matched in {}", asset_dir.display());
    }

    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let bytes = std::fs::read(&path)
            .with_context(|| format!("Failed to read asset file: {}", path.display()))?;
        let digest = sha256_hex(&bytes);
        debug!("{} {}", digest, path.display());
        files.push((path, digest));
    }

    let token = combine_digests(files.iter().map(|(_, digest)| digest.clone()));
    Ok(AssetVersion {
        token,
        files,
    })
}

/// Render the version-constant file for `token`.
pub fn render_version_file(template: &str, token: &str) -> Result<String> {
    let mut context = tera::Context::new();
    context.insert("asset_version", token);
    Tera::one_off(template, &context, false).context("Failed to render version file template")
}

/// Write the version-constant file, replacing any previous one.
pub fn write_version_file(path: &Path, token: &str, template: &str) -> Result<()> {
    let rendered = render_version_file(template, token)?;
    safe_write(path, &rendered)
        .with_context(|| format!("Failed to write asset version to {}", path.display()))
}
