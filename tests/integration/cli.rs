use crate::common::{RELEASE_ENTRIES, TestProject};
use assert_cmd::Command;
use assetsync_cli::test_utils::{VendorFixture, release_json, write_release_zip};
use httpmock::prelude::*;
use predicates::prelude::*;

fn assetsync(project: &TestProject) -> Command {
    let mut cmd = Command::cargo_bin("assetsync").unwrap();
    cmd.current_dir(project.root())
        .env("NO_COLOR", "1")
        .env("ASSETSYNC_NO_PROGRESS", "1")
        .env_remove("ASSETSYNC_API_BASE")
        .env_remove("GITHUB_TOKEN")
        .env_remove("RUST_LOG");
    cmd
}

fn mock_latest(server: &MockServer, name: &str) {
    server.mock(|when, then| {
        when.method(GET).path("/repos/jlfwong/speedscope/releases/latest");
        then.status(200).json_body(release_json(name, &[(42, "application/zip")]));
    });
}

#[test]
fn test_help_lists_commands() {
    let project = TestProject::new();
    assetsync(&project)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("vendor"))
        .stdout(predicate::str::contains("build"))
        .stdout(predicate::str::contains("rewrite"));
}

#[test]
fn test_build_command() {
    let project = TestProject::new().with_build_inputs(
        r#"<script id="share" type="text/x-dot-tmpl"><a href="{{= it.url }}">share</a></script>"#,
    );

    assetsync(&project)
        .arg("build")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 templates"))
        .stdout(predicate::str::contains("Asset version:"));

    assert!(project.read("lib/html/vendor.js").contains("MiniProfiler.templates[\"share\"]"));
}

#[test]
fn test_build_command_fails_on_duplicate_ids() {
    let project = TestProject::new().with_build_inputs(
        r#"<script id="x" type="text/x-dot-tmpl">1</script><script id="x" type="text/x-dot-tmpl">2</script>"#,
    );

    assetsync(&project)
        .arg("build")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid template id"));
    assert!(!project.path("lib/html/vendor.js").exists());
}

#[test]
fn test_build_without_templates_reports_io_error() {
    let project = TestProject::new();

    assetsync(&project)
        .arg("build")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("I/O error"))
        .stderr(predicate::str::contains("includes.tmpl"))
        .stderr(predicate::str::contains("Configuration error").not());
}

#[test]
fn test_invalid_config_is_a_configuration_error() {
    let project = TestProject::new();
    project.write("assetsync.toml", "[vendor]\nkeep_manifest = \"../.keep\"\n");

    assetsync(&project)
        .arg("version")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Configuration error"))
        .stderr(predicate::str::contains("keep_manifest"));
}

#[test]
fn test_version_command_prints_token() {
    let project = TestProject::new();
    project.write("lib/html/includes.css", "body {}\n");

    let output = assetsync(&project).arg("version").assert().success().get_output().stdout.clone();
    let token = String::from_utf8(output).unwrap().trim().to_string();

    assert!(!token.is_empty());
    assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    assert!(project.read("src/asset_version.rs").contains(&token));
}

#[test]
fn test_missing_config_file_is_an_error() {
    let project = TestProject::new();
    assetsync(&project)
        .args(["--config", "missing.toml", "version"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error"))
        .stderr(predicate::str::contains("missing.toml"));
}

#[test]
fn test_vendor_check_reports_update() {
    let server = MockServer::start();
    mock_latest(&server, "v1.3.0");
    let project = TestProject::new();
    project.write_config(&server);
    VendorFixture::new(project.root()).manifest("").file("release.txt", "speedscope@1.2.0\n").create();

    assetsync(&project)
        .args(["vendor", "--check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Update available"))
        .stdout(predicate::str::contains("1.2.0"))
        .stdout(predicate::str::contains("1.3.0"));
}

#[test]
fn test_vendor_installs_release() {
    let server = MockServer::start();
    mock_latest(&server, "v1.2.3");
    let scratch = tempfile::TempDir::new().unwrap();
    let archive = std::fs::read(write_release_zip(scratch.path(), "1.2.3", RELEASE_ENTRIES)).unwrap();
    server.mock(|when, then| {
        when.method(GET).path("/repos/jlfwong/speedscope/releases/assets/42");
        then.status(302).header("Location", "/storage/speedscope.zip");
    });
    server.mock(|when, then| {
        when.method(GET).path("/storage/speedscope.zip");
        then.status(200).body(archive.clone());
    });
    let project = TestProject::new();

    assetsync(&project)
        .arg("vendor")
        .env("ASSETSYNC_API_BASE", server.base_url())
        .assert()
        .success()
        .stdout(predicate::str::contains("Vendored"))
        .stdout(predicate::str::contains("1.2.3"));

    assert!(project.path("lib/html/speedscope/speedscope.a1b2c3.js").exists());
    assert!(project.path("src/asset_version.rs").exists());
}

#[test]
fn test_vendor_reports_lookup_failure() {
    let server = MockServer::start();
    mock_latest(&server, "v1.2.3");
    server.mock(|when, then| {
        when.method(GET).path("/repos/jlfwong/speedscope/releases/assets/42");
        then.status(404);
    });
    let project = TestProject::new();
    project.write_config(&server);

    assetsync(&project)
        .args(["vendor", "--quiet"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("404"))
        .stderr(predicate::str::contains("asset lookup"));
    assert!(!project.path("lib/html/speedscope").exists());
}
