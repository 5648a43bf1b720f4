//! Template fragment extraction from the host document.
//!
//! Fragments are `<script>` elements whose `type` attribute marks them as
//! dot templates:
//!
//! ```html
//! <script id="profilerTemplate" type="text/x-dot-tmpl">
//!   <div class="profiler-result">{{= it.name }}</div>
//! </script>
//! ```
//!
//! Elements inside HTML comments are ignored. A comment marker inside a
//! script body is part of the body.

use crate::core::SyncError;
use regex::Regex;
use std::collections::HashSet;

/// One template element of the document, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateFragment {
    pub id: Option<String>,
    pub body: String,
}

fn scan_error(e: regex::Error) -> SyncError {
    SyncError::Config {
        message: format!("Invalid document pattern: {e}"),
    }
}

/// Collect the raw template elements with the given `type` attribute.
pub fn extract_fragments(html: &str, script_type: &str) -> Result<Vec<TemplateFragment>, SyncError> {
    let script = Regex::new(r"(?is)<!--.*?(?:-->|\z)|<script\b([^>]*)>(.*?)</script\s*>")
        .map_err(scan_error)?;
    let attribute = Regex::new(
        r#"([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+))"#,
    )
    .map_err(scan_error)?;

    let mut fragments = Vec::new();
    for caps in script.captures_iter(html) {
        // Comment matches carry no groups
        let (Some(attrs), Some(body)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        let mut kind = None;
        let mut id = None;
        for attr in attribute.captures_iter(attrs.as_str()) {
            let value = attr
                .get(2)
                .or_else(|| attr.get(3))
                .or_else(|| attr.get(4))
                .map_or("", |m| m.as_str())
                .to_string();
            match attr[1].to_ascii_lowercase().as_str() {
                "type" => kind = Some(value),
                "id" => id = Some(value),
                _ => {}
            }
        }

        if kind.as_deref().is_some_and(|kind| kind.trim().eq_ignore_ascii_case(script_type)) {
            fragments.push(TemplateFragment {
                id,
                body: body.as_str().to_string(),
            });
        }
    }
    Ok(fragments)
}

/// Check every fragment has a non-empty id and no id repeats.
pub fn validate_ids(fragments: &[TemplateFragment]) -> Result<(), SyncError> {
    let mut seen = HashSet::new();
    for (position, fragment) in fragments.iter().enumerate() {
        let id = match fragment.id.as_deref().map(str::trim) {
            None => {
                return Err(SyncError::DuplicateOrMissingId {
                    reason: format!("template #{} has no id attribute", position + 1),
                });
            }
            Some("") => {
                return Err(SyncError::DuplicateOrMissingId {
                    reason: format!("template #{} has an empty id", position + 1),
                });
            }
            Some(id) => id,
        };
        if !seen.insert(id) {
            return Err(SyncError::DuplicateOrMissingId {
                reason: format!("id '{id}' is used by more than one template"),
            });
        }
    }
    Ok(())
}

/// Escape backticks so template bodies can sit inside template literals.
#[must_use]
pub fn escape_backticks(body: &str) -> String {
    body.replace('`', "\\`")
}
