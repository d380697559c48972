//! Syntax highlighting for fenced code blocks.

use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;
use tracing::debug;

/// Theme used when none is requested.
pub const DEFAULT_THEME: &str = "InspiredGitHub";

/// Code highlighter backed by syntect's bundled syntaxes and themes.
#[derive(Debug)]
pub struct Highlighter {
    syntax_set: SyntaxSet,
    theme: Theme,
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new(DEFAULT_THEME)
    }
}

impl Highlighter {
    /// Create a highlighter with the named theme, falling back to any bundled theme.
    pub fn new(theme: &str) -> Self {
        let mut themes = ThemeSet::load_defaults().themes;
        let theme = match themes.remove(theme) {
            Some(t) => t,
            None => themes.into_values().next().unwrap_or_default(),
        };

        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme,
        }
    }

    /// Highlight `code` as `lang`.
    ///
    /// Returns `None` for unknown languages or when highlighting fails, so the
    /// caller can emit a plain block instead.
    pub fn highlight(&self, code: &str, lang: &str) -> Option<String> {
        let syntax = self.syntax_set.find_syntax_by_token(lang)?;

        match highlighted_html_for_string(code, &self.syntax_set, syntax, &self.theme) {
            Ok(html) => Some(html),
            Err(e) => {
                debug!(lang, error = %e, "highlighting failed, using plain block");
                None
            }
        }
    }
}

/// Plain `<pre><code>` block for code we do not highlight.
pub fn plain_block(code: &str, lang: Option<&str>) -> String {
    let class = lang
        .map(|l| format!(" class=\"language-{}\"", escape_html(l)))
        .unwrap_or_default();
    format!("<pre><code{class}>{}</code></pre>\n", escape_html(code))
}

/// Escape HTML special characters.
pub(crate) fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
