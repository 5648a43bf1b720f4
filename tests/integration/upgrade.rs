use crate::common::{RELEASE_ENTRIES, TestProject, mock_release};
use assetsync_cli::core::SyncError;
use assetsync_cli::pipeline::{PipelineOptions, check_upgrade, run_upgrade};
use assetsync_cli::test_utils::{VendorFixture, init_test_logging, release_json};
use httpmock::prelude::*;

fn quiet() -> PipelineOptions {
    PipelineOptions {
        quiet: true,
        show_progress: false,
    }
}

fn sync_error(error: &anyhow::Error) -> SyncError {
    error
        .chain()
        .find_map(|e| e.downcast_ref::<SyncError>())
        .cloned()
        .unwrap_or_else(|| panic!("expected a SyncError, got: {error:#}"))
}

#[tokio::test]
async fn test_upgrade_replaces_vendor_dir_and_keeps_local_files() {
    init_test_logging(None);
    let server = MockServer::start_async().await;
    let project = TestProject::new();
    let vendor = VendorFixture::new(project.root())
        .manifest("# not part of the upstream release\nfonts\n")
        .file("fonts/source-code-pro-regular.css", "@font-face {}")
        .file("speedscope.old.js", "old")
        .file("release.txt", "speedscope@1.2.2\n")
        .create();
    let mocks = mock_release(&server, "v1.2.3", "1.2.3", RELEASE_ENTRIES).await;

    let outcome = run_upgrade(&project.config(&server), quiet()).await.unwrap();

    mocks.latest.assert_async().await;
    mocks.lookup.assert_async().await;
    mocks.storage.assert_async().await;

    assert_eq!(outcome.version, "1.2.3");
    assert_eq!(outcome.report.removed, vec!["release.txt", "speedscope.old.js"]);
    assert!(vendor.join("fonts/source-code-pro-regular.css").exists());
    assert!(vendor.join(".keep").exists());
    assert!(vendor.join("speedscope.a1b2c3.js").exists());
    assert!(!vendor.join("speedscope.old.js").exists());
    assert!(!vendor.join("README.md").exists());
    assert!(!vendor.join("perf-vertx-stacks-01-collapsed-all.txt").exists());
    assert!(!vendor.join("LICENSE").exists());
    assert!(!project.path("LICENSE").exists());
    assert_eq!(
        project.read("lib/html/speedscope/index.html"),
        r#"<link href="fonts/source-code-pro-regular.css" rel="stylesheet">"#
    );
    assert_eq!(project.read("lib/html/speedscope/release.txt").lines().next(), Some("speedscope@1.2.3"));

    let asset_version = outcome.asset_version.expect("asset version recomputed");
    assert!(project.read("src/asset_version.rs").contains(&asset_version.token));
}

#[tokio::test]
async fn test_upgrade_refreshes_version_file_without_counting_vendored_files() {
    let server = MockServer::start_async().await;
    let project = TestProject::new();
    project.write("lib/html/includes.css", "body {}\n");
    VendorFixture::new(project.root()).manifest("").file("release.txt", "speedscope@1.2.2\n").create();
    let config = project.config(&server);
    let before = assetsync_cli::pipeline::run_version(&config).unwrap();
    std::fs::remove_file(project.path("src/asset_version.rs")).unwrap();
    let _mocks = mock_release(&server, "v1.2.3", "1.2.3", RELEASE_ENTRIES).await;

    let outcome = run_upgrade(&config, quiet()).await.unwrap();

    let after = outcome.asset_version.expect("asset version recomputed");
    assert_eq!(after.token, before.token);
    assert!(project.read("src/asset_version.rs").contains(&after.token));
}

#[tokio::test]
async fn test_latest_release_version_and_artifact() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/repos/jlfwong/speedscope/releases/latest");
            then.status(200).json_body(release_json("v1.2.3", &[(1, "application/zip")]));
        })
        .await;
    let project = TestProject::new();
    let config = project.config(&server);

    let client = assetsync_cli::release::ReleaseClient::new(&config.upstream).unwrap();
    let release = client.latest().await.unwrap();
    let asset = release.select_artifact("application/zip").unwrap();

    assert_eq!(release.version, "1.2.3");
    assert_eq!(asset.id, 1);
}

#[tokio::test]
async fn test_missing_zip_artifact_aborts_before_download() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/repos/jlfwong/speedscope/releases/latest");
            then.status(200)
                .json_body(release_json("v1.2.3", &[(1, "application/gzip"), (2, "text/plain")]));
        })
        .await;
    let assets = server
        .mock_async(|when, then| {
            when.method(GET).path("/repos/jlfwong/speedscope/releases/assets/1");
            then.status(302).header("Location", "/never");
        })
        .await;
    let project = TestProject::new();

    let err = run_upgrade(&project.config(&server), quiet()).await.unwrap_err();

    assert!(matches!(sync_error(&err), SyncError::MissingArtifact { version, .. } if version == "1.2.3"));
    assets.assert_calls_async(0).await;
    assert!(!project.path("lib/html/speedscope").exists());
}

#[tokio::test]
async fn test_asset_lookup_404_aborts_without_writing() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/repos/jlfwong/speedscope/releases/latest");
            then.status(200).json_body(release_json("v1.2.3", &[(1, "application/zip")]));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/repos/jlfwong/speedscope/releases/assets/1");
            then.status(404);
        })
        .await;
    let project = TestProject::new();
    let vendor = VendorFixture::new(project.root())
        .manifest("")
        .file("release.txt", "speedscope@1.2.2\n")
        .create();

    let err = run_upgrade(&project.config(&server), quiet()).await.unwrap_err();

    let error = sync_error(&err);
    assert_eq!(error.status(), Some(404));
    assert!(matches!(error, SyncError::UnexpectedStatus { ref step, .. } if step == "asset lookup"));
    assert_eq!(project.read("lib/html/speedscope/release.txt"), "speedscope@1.2.2\n");
    let entries: Vec<_> = std::fs::read_dir(&vendor).unwrap().collect();
    assert_eq!(entries.len(), 2);
    assert!(!project.path("src/asset_version.rs").exists());
}

#[tokio::test]
async fn test_version_mismatch_keeps_previous_contents() {
    let server = MockServer::start_async().await;
    let project = TestProject::new();
    let vendor = VendorFixture::new(project.root())
        .manifest("")
        .file("speedscope.old.js", "old")
        .file("release.txt", "speedscope@1.2.1\n")
        .create();
    mock_release(&server, "v1.2.3", "1.2.2", RELEASE_ENTRIES).await;

    let err = run_upgrade(&project.config(&server), quiet()).await.unwrap_err();

    assert_eq!(
        sync_error(&err),
        SyncError::VersionMismatch {
            expected: "1.2.3".to_string(),
            actual: "1.2.2".to_string(),
        }
    );
    assert_eq!(project.read("lib/html/speedscope/speedscope.old.js"), "old");
    assert!(!vendor.join("index.html").exists());
    let siblings: Vec<String> = std::fs::read_dir(project.path("lib/html"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.contains("staging") || name.contains("previous"))
        .collect();
    assert!(siblings.is_empty(), "leftover directories: {siblings:?}");
}

#[tokio::test]
async fn test_storage_failure_is_reported_with_status() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/repos/jlfwong/speedscope/releases/latest");
            then.status(200).json_body(release_json("1.2.3", &[(5, "application/zip")]));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/repos/jlfwong/speedscope/releases/assets/5");
            then.status(302).header("Location", "/storage/missing.zip");
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/storage/missing.zip");
            then.status(503);
        })
        .await;
    let project = TestProject::new();

    let err = run_upgrade(&project.config(&server), quiet()).await.unwrap_err();

    assert!(matches!(
        sync_error(&err),
        SyncError::UnexpectedStatus { step, status: 503, .. } if step == "asset download"
    ));
}

#[tokio::test]
async fn test_check_reports_available_update() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/repos/jlfwong/speedscope/releases/latest");
            then.status(200).json_body(release_json("v1.10.0", &[(1, "application/zip")]));
        })
        .await;
    let project = TestProject::new();
    VendorFixture::new(project.root()).manifest("").file("release.txt", "speedscope@1.9.0\n").create();

    let check = check_upgrade(&project.config(&server)).await.unwrap();

    assert_eq!(check.latest, "1.10.0");
    assert_eq!(check.current.as_deref(), Some("1.9.0"));
    assert!(check.update_available);
}

#[tokio::test]
async fn test_check_when_up_to_date() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/repos/jlfwong/speedscope/releases/latest");
            then.status(200).json_body(release_json("v1.9.0", &[(1, "application/zip")]));
        })
        .await;
    let project = TestProject::new();
    VendorFixture::new(project.root()).manifest("").file("release.txt", "speedscope@1.9.0\n").create();

    let check = check_upgrade(&project.config(&server)).await.unwrap();
    assert!(!check.update_available);
}
