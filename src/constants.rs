//! Constants shared across assetsync modules.
//!
//! Most of these are the built-in defaults behind [`crate::config`]; the
//! HTTP media types are fixed by the upstream release API.

/// Media type requested from the release-listing endpoint.
pub const GITHUB_JSON_MEDIA_TYPE: &str = "application/vnd.github.v3+json";

/// Media type requested from the asset endpoint to get a redirect to the binary.
pub const OCTET_STREAM_MEDIA_TYPE: &str = "application/octet-stream";

/// `User-Agent` sent with every request. GitHub rejects requests without one.
pub const USER_AGENT: &str = concat!("assetsync/", env!("CARGO_PKG_VERSION"));

/// Default upstream API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Default upstream repository owner.
pub const DEFAULT_REPO_OWNER: &str = "jlfwong";

/// Default upstream repository name.
pub const DEFAULT_REPO_NAME: &str = "speedscope";

/// Content type an asset must have to be selected for download.
pub const DEFAULT_ARCHIVE_CONTENT_TYPE: &str = "application/zip";

/// Default vendor directory, relative to the project root.
pub const DEFAULT_VENDOR_DIR: &str = "lib/html/speedscope";

/// Name of the kept-file manifest inside the vendor directory.
pub const DEFAULT_KEEP_MANIFEST: &str = ".keep";

/// Lines of the kept-file manifest starting with this marker are comments.
pub const KEEP_COMMENT_MARKER: char = '#';

/// Version marker file shipped inside the vendored release.
pub const DEFAULT_VERSION_MARKER: &str = "release.txt";

/// The version is the last field of the marker's first line split on this.
pub const DEFAULT_VERSION_DELIMITER: &str = "@";

/// Archive entries whose path contains one of these fragments are not vendored.
///
/// `README` drops the bundle's internal documentation; `perf-vertx-stacks` is
/// a multi-megabyte sample profile shipped with the release.
pub const DEFAULT_EXCLUDED_FRAGMENTS: &[&str] = &["README", "perf-vertx-stacks"];

/// Default asset directory scanned for the asset version.
pub const DEFAULT_ASSET_DIR: &str = "lib/html";

/// Extensions covered by the asset version.
pub const DEFAULT_ASSET_EXTENSIONS: &[&str] = &["js", "html", "css", "tmpl"];

/// Document holding the template fragments.
pub const DEFAULT_TEMPLATES_FILE: &str = "lib/html/includes.tmpl";

/// Static script appended verbatim to the bundle.
pub const DEFAULT_STATIC_SCRIPT: &str = "lib/html/pretty-print.js";

/// Generated bundle output.
pub const DEFAULT_BUNDLE_FILE: &str = "lib/html/vendor.js";

/// Generated version-constant output.
pub const DEFAULT_VERSION_FILE: &str = "src/asset_version.rs";

/// Script `type` attribute that marks a template fragment.
pub const TEMPLATE_SCRIPT_TYPE: &str = "text/x-dot-tmpl";

/// Namespace object the bundle attaches compiled templates to.
pub const DEFAULT_TEMPLATE_NAMESPACE: &str = "MiniProfiler";

/// Tera template for the generated version-constant file.
pub const DEFAULT_VERSION_FILE_TEMPLATE: &str = "// Do not edit manually. Generated by `assetsync build`.\n\npub const ASSET_VERSION: &str = \"{{ asset_version }}\";\n";

/// Default rewrite applied to the vendored entry page.
pub const DEFAULT_REWRITE_FILE: &str = "index.html";

/// External stylesheet replaced by the default rewrite.
pub const DEFAULT_REWRITE_PATTERN: &str = "https://fonts.googleapis.com/css?family=Source+Code+Pro";

/// Local stylesheet substituted by the default rewrite.
pub const DEFAULT_REWRITE_REPLACEMENT: &str = "fonts/source-code-pro-regular.css";

/// Set to any value to disable progress bars.
pub const NO_PROGRESS_ENV: &str = "ASSETSYNC_NO_PROGRESS";

/// Overrides `upstream.api_base`.
pub const API_BASE_ENV: &str = "ASSETSYNC_API_BASE";

/// Bearer token sent to the upstream API when set.
pub const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Project configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "assetsync.toml";
