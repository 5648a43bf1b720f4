//! Error handling for assetsync
//!
//! This module provides the error taxonomy shared by both pipelines and the
//! user-facing error reporting used by the CLI. The design mirrors two needs:
//! 1. **Strongly-typed errors** so callers and tests can match on the exact
//!    failure (for example a `404` at the asset lookup step)
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Architecture
//!
//! - [`SyncError`] - Enumerated failure cases of the upgrade and build pipelines
//! - [`ErrorContext`] - Wrapper that adds details and suggestions for display
//!
//! Every failure aborts the running pipeline. There is no retry and no partial
//! continuation; the diagnostic printed by [`ErrorContext::display`] is the
//! only recovery guidance the user receives.
//!
//! # Examples
//!
//! ```rust,no_run
//! use assetsync_cli::core::{SyncError, user_friendly_error};
//!
//! let error = SyncError::UnexpectedStatus {
//!     step: "asset lookup".to_string(),
//!     url: "https://api.github.com/repos/o/r/releases/assets/1".to_string(),
//!     status: 404,
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display();
//! ```

use colored::Colorize;
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// The main error type for assetsync operations.
///
/// Variants carry owned strings rather than source errors so the type stays
/// `Clone`, which lets [`user_friendly_error`] rebuild a context from a
/// downcast reference.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// Transport-level failure (DNS, TLS, connection reset, body read).
    #[error("Network error during {operation}: {reason}")]
    Network {
        operation: String,
        reason: String,
    },

    /// A request completed with a status other than the one this step requires.
    #[error("Unexpected HTTP status {status} during {step} ({url})")]
    UnexpectedStatus {
        step: String,
        url: String,
        status: u16,
    },

    /// The response body could not be decoded as release metadata.
    #[error("Invalid response from {url}: {reason}")]
    InvalidResponse {
        url: String,
        reason: String,
    },

    /// The asset lookup answered with a redirect but no usable `Location`.
    #[error("Redirect from {url} did not carry a usable Location header")]
    MissingRedirect {
        url: String,
    },

    /// The release exists but has no asset of the required media type.
    #[error("Release {version} has no asset with content type '{content_type}'")]
    MissingArtifact {
        version: String,
        content_type: String,
    },

    /// The version marker after extraction does not match the requested release.
    #[error("Version mismatch after extraction: expected {expected}, found {actual}")]
    VersionMismatch {
        expected: String,
        actual: String,
    },

    /// A template node has no id, an empty id, or an id used more than once.
    #[error("Invalid template id: {reason}")]
    DuplicateOrMissingId {
        reason: String,
    },

    /// Template source uses syntax the engine does not compile.
    #[error("Unsupported template syntax in '{template}': {reason}")]
    UnsupportedTemplateSyntax {
        template: String,
        reason: String,
    },

    /// A rewrite rule ran but its pattern is still present in the file.
    #[error("Rewrite of {path} left '{pattern}' in place")]
    RewriteIncomplete {
        path: String,
        pattern: String,
    },

    /// The downloaded archive could not be opened or read.
    #[error("Archive error in {path}: {reason}")]
    Archive {
        path: String,
        reason: String,
    },

    /// Filesystem read/write failure.
    #[error("I/O error while trying to {operation} {path}: {reason}")]
    Io {
        operation: String,
        path: String,
        reason: String,
    },

    /// Invalid or unreadable configuration.
    #[error("Configuration error: {message}")]
    Config {
        message: String,
    },

    /// Any failure without a more specific category.
    #[error("{message}")]
    Other {
        message: String,
    },
}

impl SyncError {
    /// Build an [`SyncError::Io`] from an `std::io::Error`.
    pub fn io(operation: impl Into<String>, path: &Path, error: &std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            path: path.display().to_string(),
            reason: error.to_string(),
        }
    }

    /// Build a [`SyncError::Network`] from a `reqwest::Error`.
    pub fn network(operation: impl Into<String>, error: &reqwest::Error) -> Self {
        Self::Network {
            operation: operation.into(),
            reason: error.to_string(),
        }
    }

    /// The HTTP status code, for [`SyncError::UnexpectedStatus`] only.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::UnexpectedStatus {
                status,
                ..
            } => Some(*status),
            _ => None,
        }
    }
}

/// Error with user-facing details and a suggestion.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: SyncError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context without details or suggestion.
    #[must_use]
    pub const fn new(error: SyncError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error context to stderr with terminal colors.
    ///
    /// - Error message: red and bold
    /// - Details: yellow
    /// - Suggestion: green
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] suitable for CLI display.
///
/// Known [`SyncError`] values anywhere in the chain get tailored suggestions.
/// Other errors keep their full context chain in the message.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(sync_error) = error.chain().find_map(|e| e.downcast_ref::<SyncError>()) {
        let ctx = create_error_context(sync_error.clone());
        let outer = error.to_string();
        if outer == sync_error.to_string() {
            return ctx;
        }

        // Keep the outer context message visible as details
        let details = match ctx.details {
            Some(details) => format!("{outer}\n{details}"),
            None => outer,
        };
        return ErrorContext {
            details: Some(details),
            ..ctx
        };
    }

    if let Some(toml_error) = error.chain().find_map(|e| e.downcast_ref::<toml::de::Error>()) {
        return ErrorContext::new(SyncError::Config {
            message: toml_error.to_string(),
        })
        .with_details(error.to_string())
        .with_suggestion("Check the TOML syntax in assetsync.toml. Verify quotes, brackets, and table names");
    }

    if let Some(io_error) = error.chain().find_map(|e| e.downcast_ref::<std::io::Error>()) {
        let suggestion = match io_error.kind() {
            std::io::ErrorKind::NotFound => {
                "Check that the file or directory exists and the configured path is correct"
            }
            std::io::ErrorKind::PermissionDenied => {
                "Check the file ownership and permissions of the path"
            }
            _ => "Check that the path exists and that you have permission to read and write it",
        };
        // The outermost context names the operation and the path
        return ErrorContext::new(SyncError::Io {
            operation: "read or write".to_string(),
            path: "a file".to_string(),
            reason: io_error.to_string(),
        })
        .with_details(error.to_string())
        .with_suggestion(suggestion);
    }

    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(SyncError::Other {
        message,
    })
}

fn create_error_context(error: SyncError) -> ErrorContext {
    match &error {
        SyncError::Network { .. } => ErrorContext::new(error)
            .with_suggestion("Check your internet connection and re-run the command")
            .with_details("No retry is attempted; a stalled or unreachable upstream aborts the run"),

        SyncError::UnexpectedStatus { status, .. } => {
            let suggestion = match status {
                401 | 403 => "Set GITHUB_TOKEN to authenticate, or wait for the API rate limit to reset",
                404 => "Verify the upstream owner/repo in assetsync.toml and that the release still exists",
                _ => "Re-run the command; if the status persists, check the upstream service status",
            };
            ErrorContext::new(error).with_suggestion(suggestion)
        }

        SyncError::InvalidResponse { .. } => ErrorContext::new(error)
            .with_suggestion("Check that upstream.api_base points at a GitHub-compatible releases API"),

        SyncError::MissingRedirect { .. } => ErrorContext::new(error)
            .with_details("The asset endpoint is expected to answer 302 with the storage location")
            .with_suggestion("Re-run the command; the upstream may be serving an unexpected response"),

        SyncError::MissingArtifact { content_type, .. } => {
            let suggestion = format!(
                "Wait for a release that ships a '{content_type}' asset, or adjust `vendor.archive_content_type`"
            );
            ErrorContext::new(error)
                .with_details("The release exists but has no usable artifact; nothing was downloaded")
                .with_suggestion(suggestion)
        }

        SyncError::VersionMismatch { .. } => ErrorContext::new(error)
            .with_details("The vendor directory was left untouched; the staged extraction was discarded")
            .with_suggestion("Inspect the release archive's version marker and `vendor.version_marker` settings"),

        SyncError::DuplicateOrMissingId { .. } => ErrorContext::new(error)
            .with_details("No output was written")
            .with_suggestion("Give every template script a non-empty, unique id attribute"),

        SyncError::UnsupportedTemplateSyntax { .. } => ErrorContext::new(error)
            .with_suggestion("Inline the partial; compile-time defines ({{# }} and {{## }}) are not supported"),

        SyncError::RewriteIncomplete { .. } => ErrorContext::new(error)
            .with_suggestion("Check that the rewrite replacement does not itself contain the pattern"),

        SyncError::Archive { .. } => ErrorContext::new(error)
            .with_suggestion("Re-run the command to download the archive again"),

        SyncError::Io { .. } => ErrorContext::new(error)
            .with_suggestion("Check that the path exists and that you have permission to read and write it"),

        SyncError::Config { .. } => ErrorContext::new(error)
            .with_suggestion("Check assetsync.toml or the path passed with --config"),

        SyncError::Other { .. } => ErrorContext::new(error),
    }
}
