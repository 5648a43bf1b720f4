//! Core types shared by every assetsync module.
//!
//! Currently this is the error taxonomy and its user-facing rendering; see
//! [`error`] for details.

pub mod error;

pub use error::{ErrorContext, SyncError, user_friendly_error};
