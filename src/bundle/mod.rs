//! Generated vendor script.
//!
//! The bundle is a plain script that registers every compiled template on the
//! namespace object and then inlines the static pretty-print script:
//!
//! ```text
//! // header comment
//! "use strict";
//! MiniProfiler.templates = {};
//! MiniProfiler.templates["profilerTemplate"] = function anonymous(it
//! ) { ... };
//! <pretty-print script>
//! MiniProfiler.loadedVendor = true;
//! ```
//!
//! Output depends only on its inputs, which keeps the asset version stable
//! across rebuilds.

use crate::templating::TemplateMap;
use crate::utils::fs::safe_write;
use anyhow::Result;
use std::fmt::Write as _;
use std::path::Path;

/// Header written at the top of the bundle.
pub const BUNDLE_HEADER: &str = "/**\n  THIS FILE IS GENERATED BY `assetsync build`.\n  DO NOT EDIT BY HAND; edit the templates and pretty-print script instead.\n*/\n";

/// Build the bundle text.
#[must_use]
pub fn build_bundle(templates: &TemplateMap, static_script: &str, namespace: &str) -> String {
    let mut out = String::with_capacity(
        BUNDLE_HEADER.len() + static_script.len() + templates.iter().map(|(_, s)| s.len() + 64).sum::<usize>(),
    );
    out.push_str(BUNDLE_HEADER);
    out.push_str("\"use strict\";\n");
    let _ = writeln!(out, "{namespace}.templates = {{}};");
    for (id, source) in templates.iter() {
        let _ = writeln!(out, "{namespace}.templates[{}] = {source};", js_string(id));
    }
    out.push_str(static_script);
    if !static_script.ends_with('\n') {
        out.push('\n');
    }
    let _ = writeln!(out, "{namespace}.loadedVendor = true;");
    out
}

/// Write the bundle, replacing any previous file.
pub fn write_bundle(path: &Path, bundle: &str) -> Result<()> {
    safe_write(path, bundle)
}

/// Double-quoted JavaScript string literal.
fn js_string(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}
