//! Dot-template compiler.
//!
//! Compiles dot-template source into the text of a JavaScript function taking
//! one argument, `it`. The output matches what the browser-side library
//! produces for the same template with its default settings, so the bundle
//! can call the functions without loading a compiler:
//!
//! | Syntax                      | Meaning                              |
//! |-----------------------------|--------------------------------------|
//! | `{{= expr }}`               | interpolation                        |
//! | `{{! expr }}`               | HTML-encoded interpolation           |
//! | `{{? cond }}`               | if                                   |
//! | `{{?? cond }}` / `{{??}}`   | else if / else                       |
//! | `{{?}}`                     | end if                               |
//! | `{{~ arr :value:index }}`   | iteration, closed by `{{~}}`         |
//! | `{{ code }}`                | arbitrary JavaScript                 |
//!
//! Compile-time definitions (`{{##`) and partials (`{{#`) are not supported.
//!
//! Static text is stripped of line breaks, tabs, block comments and
//! indentation before compiling.

use crate::core::SyncError;
use regex::{Captures, Regex};

/// Name of the single argument of compiled template functions.
pub const TEMPLATE_ARG: &str = "it";

const ENCODE_HTML_PRELUDE: &str = concat!(
    "var encodeHTML = typeof _encodeHTML !== 'undefined' ? _encodeHTML : (function() {",
    "var encodeHTMLRules = { \"&\": \"&#38;\", \"<\": \"&#60;\", \">\": \"&#62;\", '\"': \"&#34;\", \"'\": \"&#39;\", \"/\": \"&#47;\" },",
    "matchHTML = /&(?!#?\\w+;)|<|>|\"|'|\\//g;",
    "return function(code) {",
    "return code ? code.toString().replace(matchHTML, function(m) {return encodeHTMLRules[m] || m;}) : \"\";",
    "};",
    "}());"
);

/// Compiler handle. Holds the compiled pattern set; create one per build and
/// pass it to every compile call.
#[derive(Debug)]
pub struct TemplateEngine {
    indent: Regex,
    noise: Regex,
    quote: Regex,
    interpolate: Regex,
    encode: Regex,
    conditional: Regex,
    iterate: Regex,
    evaluate: Regex,
    unescape_quote: Regex,
    unescape_space: Regex,
    empty_append: Regex,
    empty_concat: Regex,
}

fn pattern(source: &str) -> Result<Regex, SyncError> {
    Regex::new(source).map_err(|e| SyncError::Config {
        message: format!("Invalid template pattern {source}: {e}"),
    })
}

impl TemplateEngine {
    pub fn new() -> Result<Self, SyncError> {
        Ok(Self {
            indent: pattern(r"(^|\r|\n)\t* +| +\t*(\r|\n|$)")?,
            noise: pattern(r"\r|\n|\t|/\*[\s\S]*?\*/")?,
            quote: pattern(r"\\`|'|\\")?,
            interpolate: pattern(r"\{\{=([\s\S]+?)\}\}")?,
            encode: pattern(r"\{\{!([\s\S]+?)\}\}")?,
            conditional: pattern(r"\{\{\?(\?)?\s*([\s\S]*?)\s*\}\}")?,
            iterate: pattern(
                r"\{\{~\s*(?:\}\}|([\s\S]+?)\s*:\s*([\w$]+)\s*(?::\s*([\w$]+))?\s*\}\})",
            )?,
            evaluate: pattern(r"\{\{([\s\S]+?\}*)\}\}")?,
            unescape_quote: pattern(r"\\('|\\|`)")?,
            unescape_space: pattern(r"[\r\t\n]")?,
            empty_append: pattern(r"(\s|;|\}|^|\{)out\+='';")?,
            empty_concat: pattern(r"\+''")?,
        })
    }

    /// Turn template code back into JavaScript after static-text escaping.
    fn unescape(&self, code: &str) -> String {
        let code = self.unescape_quote.replace_all(code, "$1");
        self.unescape_space.replace_all(&code, " ").into_owned()
    }

    /// Compile `source` into `function anonymous(it\n) {\n...\n}`.
    ///
    /// Backticks may arrive escaped as `` \` ``; they stay escaped in static
    /// text and are restored in code sections.
    pub fn compile(&self, name: &str, source: &str) -> Result<String, SyncError> {
        if source.contains("{{#") {
            return Err(SyncError::UnsupportedTemplateSyntax {
                template: name.to_string(),
                reason: "compile-time definitions and partials ({{# and {{##) are not supported"
                    .to_string(),
            });
        }
        Ok(format!("function anonymous({TEMPLATE_ARG}\n) {{\n{}\n}}", self.compile_body(source)))
    }

    /// The function body alone.
    pub fn compile_body(&self, source: &str) -> String {
        let stripped = self.indent.replace_all(source, " ");
        let stripped = self.noise.replace_all(&stripped, "");

        let text = self.quote.replace_all(&stripped, |caps: &Captures| {
            let m = &caps[0];
            if m == "\\`" { m.to_string() } else { format!("\\{m}") }
        });

        let text = self
            .interpolate
            .replace_all(&text, |caps: &Captures| format!("'+({})+'", self.unescape(&caps[1])));

        let mut needs_encode = false;
        let text = self.encode.replace_all(&text, |caps: &Captures| {
            needs_encode = true;
            format!("'+encodeHTML({})+'", self.unescape(&caps[1]))
        });

        let text = self.conditional.replace_all(&text, |caps: &Captures| {
            let code = caps.get(2).map_or("", |m| m.as_str());
            match (caps.get(1).is_some(), code.is_empty()) {
                (true, false) => format!("';}}else if({}){{out+='", self.unescape(code)),
                (true, true) => "';}else{out+='".to_string(),
                (false, false) => format!("';if({}){{out+='", self.unescape(code)),
                (false, true) => "';}out+='".to_string(),
            }
        });

        let mut sid = 0;
        let text = self.iterate.replace_all(&text, |caps: &Captures| {
            let Some(array) = caps.get(1) else {
                return "';} } out+='".to_string();
            };
            sid += 1;
            let value = &caps[2];
            let index = caps.get(3).map_or_else(|| format!("i{sid}"), |m| m.as_str().to_string());
            format!(
                "';var arr{sid}={array};if(arr{sid}){{var {value},{index}=-1,l{sid}=arr{sid}.length-1;while({index}<l{sid}){{{value}=arr{sid}[{index}+=1];out+='",
                array = self.unescape(array.as_str()),
            )
        });

        let text = self
            .evaluate
            .replace_all(&text, |caps: &Captures| format!("';{}out+='", self.unescape(&caps[1])));

        let body = format!("var out='{text}';return out;")
            .replace('\n', "\\n")
            .replace('\t', "\\t")
            .replace('\r', "\\r");
        let body = self.empty_append.replace_all(&body, "${1}");
        let body = self.empty_concat.replace_all(&body, "").into_owned();

        if needs_encode { format!("{ENCODE_HTML_PRELUDE}{body}") } else { body }
    }
}
