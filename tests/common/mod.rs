//! Shared fixtures for the assetsync integration tests.

// Not every test file uses every helper
#![allow(dead_code)]

use assetsync_cli::config::ProjectConfig;
use assetsync_cli::test_utils::write_release_zip;
use httpmock::prelude::*;
use httpmock::Mock;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A throwaway project root with the default asset layout.
pub struct TestProject {
    pub temp: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("create project dir");
        fs::create_dir_all(temp.path().join("lib/html")).expect("create asset dir");
        Self {
            temp,
        }
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.temp.path().join(relative)
    }

    pub fn write(&self, relative: &str, content: &str) {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent");
        }
        fs::write(path, content).expect("write project file");
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.path(relative)).expect("read project file")
    }

    /// Templates document and pretty-print script for the build pipeline.
    pub fn with_build_inputs(self, templates: &str) -> Self {
        self.write("lib/html/includes.tmpl", templates);
        self.write("lib/html/pretty-print.js", "window.prettyPrint = function () {};\n");
        self.write("lib/html/includes.css", ".profiler-result { color: black; }\n");
        self
    }

    /// Defaults rooted here, talking to `server`.
    pub fn config(&self, server: &MockServer) -> ProjectConfig {
        let mut config = ProjectConfig::with_root(self.root());
        config.upstream.api_base = server.base_url();
        config
    }

    /// `assetsync.toml` pointing at `server`.
    pub fn write_config(&self, server: &MockServer) {
        self.write(
            "assetsync.toml",
            &format!("[upstream]\napi_base = \"{}\"\n", server.base_url()),
        );
    }
}

/// Mocks for a full release exchange: listing, 302 lookup and storage download.
pub struct ReleaseMocks<'a> {
    pub latest: Mock<'a>,
    pub lookup: Mock<'a>,
    pub storage: Mock<'a>,
}

/// Serve `version` with one zip asset built from `entries`.
pub async fn mock_release<'a>(
    server: &'a MockServer,
    name: &str,
    marker_version: &str,
    entries: &[(&str, &str)],
) -> ReleaseMocks<'a> {
    let scratch = TempDir::new().expect("create scratch dir");
    let archive = write_release_zip(scratch.path(), marker_version, entries);
    let bytes = fs::read(archive).expect("read archive");

    let latest = server
        .mock_async(|when, then| {
            when.method(GET).path("/repos/jlfwong/speedscope/releases/latest");
            then.status(200).json_body(assetsync_cli::test_utils::release_json(
                name,
                &[(7, "application/octet-stream"), (42, "application/zip")],
            ));
        })
        .await;

    let storage_url = server.url("/storage/speedscope.zip");
    let lookup = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/repos/jlfwong/speedscope/releases/assets/42")
                .header("accept", "application/octet-stream");
            then.status(302).header("Location", storage_url.as_str());
        })
        .await;

    let storage = server
        .mock_async(|when, then| {
            when.method(GET).path("/storage/speedscope.zip");
            then.status(200).header("content-type", "application/zip").body(bytes.clone());
        })
        .await;

    ReleaseMocks {
        latest,
        lookup,
        storage,
    }
}

/// Release contents used by most upgrade tests.
pub const RELEASE_ENTRIES: &[(&str, &str)] = &[
    (
        "speedscope/index.html",
        r#"<link href="https://fonts.googleapis.com/css?family=Source+Code+Pro" rel="stylesheet">"#,
    ),
    ("speedscope/speedscope.a1b2c3.js", "console.log('speedscope');"),
    ("speedscope/README.md", "internal docs"),
    ("speedscope/perf-vertx-stacks-01-collapsed-all.txt", "huge sample"),
    ("LICENSE", "outside the release folder"),
];
