//! Test utilities for assetsync.
//!
//! Available to unit tests and, with the `test-utils` feature, to the
//! integration suite:
//!
//! - [`init_test_logging`] - One-time tracing setup honoring `RUST_LOG`
//! - [`write_release_zip`] - Release archives shaped like the upstream's
//! - [`VendorFixture`] - A populated vendor directory with a kept-file manifest
//! - [`release_json`] - Release-listing response bodies

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use zip::write::SimpleFileOptions;

use crate::constants::{DEFAULT_KEEP_MANIFEST, DEFAULT_VENDOR_DIR};

static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Uses `level` when given, otherwise `RUST_LOG`, otherwise stays silent.
///
/// ```bash
/// RUST_LOG=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}

/// Write `dir/speedscope-{version}.zip` with the given entries plus a
/// `speedscope/release.txt` marker for `version`.
///
/// Returns the archive path.
pub fn write_release_zip(dir: &Path, version: &str, entries: &[(&str, &str)]) -> PathBuf {
    let path = dir.join(format!("speedscope-{version}.zip"));
    let file = File::create(&path).expect("create release archive");
    let mut writer = zip::ZipWriter::new(file);
    let options = SimpleFileOptions::default();

    writer.add_directory("speedscope/", options).expect("add release folder");
    writer.start_file("speedscope/release.txt", options).expect("start marker");
    writer
        .write_all(format!("speedscope@{version}\nSat Jan 1 00:00:00 2000\n0000000\n").as_bytes())
        .expect("write marker");
    for (name, body) in entries {
        writer.start_file(*name, options).expect("start entry");
        writer.write_all(body.as_bytes()).expect("write entry");
    }
    writer.finish().expect("finish release archive");
    path
}

/// Release-listing body with one asset per `(id, content_type)`.
#[must_use]
pub fn release_json(name: &str, assets: &[(u64, &str)]) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "tag_name": name,
        "assets": assets
            .iter()
            .map(|(id, content_type)| serde_json::json!({
                "id": id,
                "name": format!("speedscope-{id}.zip"),
                "content_type": content_type,
                "browser_download_url": format!("https://example.invalid/{id}"),
            }))
            .collect::<Vec<_>>(),
    })
}

/// Builder for a vendor directory under `root/lib/html/speedscope`.
pub struct VendorFixture {
    dir: PathBuf,
    manifest: Option<String>,
    files: Vec<(String, String)>,
}

impl VendorFixture {
    pub fn new(root: &Path) -> Self {
        Self {
            dir: root.join(DEFAULT_VENDOR_DIR),
            manifest: None,
            files: Vec::new(),
        }
    }

    /// Content of the kept-file manifest. Without it no manifest is written.
    #[must_use]
    pub fn manifest(mut self, content: &str) -> Self {
        self.manifest = Some(content.to_string());
        self
    }

    #[must_use]
    pub fn file(mut self, relative: &str, content: &str) -> Self {
        self.files.push((relative.to_string(), content.to_string()));
        self
    }

    /// Write everything and return the vendor directory.
    pub fn create(self) -> PathBuf {
        fs::create_dir_all(&self.dir).expect("create vendor dir");
        if let Some(manifest) = &self.manifest {
            fs::write(self.dir.join(DEFAULT_KEEP_MANIFEST), manifest).expect("write manifest");
        }
        for (relative, content) in &self.files {
            let path = self.dir.join(relative);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).expect("create parent");
            }
            fs::write(&path, content).expect("write vendor file");
        }
        self.dir
    }
}
