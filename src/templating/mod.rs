//! Template compilation for the UI bundle.
//!
//! The host document (`includes.tmpl`) embeds dot templates as `<script>`
//! elements. [`compile_document`] extracts them, validates their ids and
//! compiles each one with a caller-owned [`TemplateEngine`]:
//!
//! ```rust,no_run
//! use assetsync_cli::templating::{TemplateEngine, compile_document};
//!
//! # fn example() -> anyhow::Result<()> {
//! let engine = TemplateEngine::new()?;
//! let html = std::fs::read_to_string("lib/html/includes.tmpl")?;
//! let templates = compile_document(&engine, &html)?;
//! for (id, source) in templates.iter() {
//!     println!("{id}: {} bytes", source.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Id validation happens before any template is compiled, so a document with
//! a duplicate or missing id produces no output at all.

pub mod engine;
pub mod extract;

pub use engine::TemplateEngine;
pub use extract::{TemplateFragment, escape_backticks, extract_fragments, validate_ids};

use crate::constants::TEMPLATE_SCRIPT_TYPE;
use crate::core::SyncError;
use tracing::debug;

/// Compiled templates keyed by id, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateMap {
    entries: Vec<(String, String)>,
}

impl TemplateMap {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(id, source)| (id.as_str(), source.as_str()))
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&str> {
        self.entries.iter().find(|(key, _)| key == id).map(|(_, source)| source.as_str())
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(id, _)| id.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Compile every dot-template fragment of `html`.
///
/// # Errors
///
/// - [`SyncError::DuplicateOrMissingId`] before anything is compiled
/// - [`SyncError::UnsupportedTemplateSyntax`] for definitions and partials
pub fn compile_document(engine: &TemplateEngine, html: &str) -> Result<TemplateMap, SyncError> {
    let fragments = extract_fragments(html, TEMPLATE_SCRIPT_TYPE)?;
    validate_ids(&fragments)?;

    let mut entries = Vec::with_capacity(fragments.len());
    for fragment in fragments {
        let id = fragment.id.as_deref().unwrap_or_default().trim().to_string();
        let compiled = engine.compile(&id, &escape_backticks(&fragment.body))?;
        debug!("Compiled template {} ({} bytes)", id, compiled.len());
        entries.push((id, compiled));
    }

    Ok(TemplateMap {
        entries,
    })
}
