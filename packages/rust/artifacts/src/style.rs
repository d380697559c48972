//! Stylesheet minification.
//!
//! Each pass is a single regex replacement, applied in order.

use std::sync::LazyLock;

use regex::Regex;

/// Minify concatenated CSS.
///
/// Strips comments and line breaks, collapses runs of spaces, removes spaces
/// around `{`, `:` and `}`, after `,` and `;`, and before `!`.
pub fn minify_css(css: &str) -> String {
    let mut result = strip_comments_and_breaks(css);
    result = collapse_spaces(&result);
    result = tighten_braces_and_colons(&result);
    result = tighten_separators(&result);
    result = tighten_bang(&result);
    result.trim().to_string()
}

/// Remove `/* ... */` comments and `\r`, `\n`, `\t` runs.
fn strip_comments_and_breaks(css: &str) -> String {
    static COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?s)/\*.*?\*/|[\r\n\t]+").expect("valid regex")
    });

    COMMENT_RE.replace_all(css, "").to_string()
}

/// Collapse two or more spaces into one.
fn collapse_spaces(css: &str) -> String {
    static SPACES_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r" {2,}").expect("valid regex"));

    SPACES_RE.replace_all(css, " ").to_string()
}

/// Drop spaces on either side of `{`, `:` and `}`.
fn tighten_braces_and_colons(css: &str) -> String {
    static BRACE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r" *([{:}]) *").expect("valid regex"));

    BRACE_RE.replace_all(css, "$1").to_string()
}

/// Drop spaces following `,` and `;`.
fn tighten_separators(css: &str) -> String {
    static SEP_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"([;,]) +").expect("valid regex"));

    SEP_RE.replace_all(css, "$1").to_string()
}

/// Drop spaces before `!` (`0 !important` → `0!important`).
fn tighten_bang(css: &str) -> String {
    static BANG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" +!").expect("valid regex"));

    BANG_RE.replace_all(css, "!").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_comments_across_lines() {
        let css = "/* header\n   comment */body{color:red}";
        assert_eq!(minify_css(css), "body{color:red}");
    }

    #[test]
    fn full_minification() {
        let css = "\
/* Markdown preview */
body {
\tfont-family: var(--font), sans-serif;
\tmargin:  0 !important;
}

.hljs-keyword ,
.hljs-tag {
  color: #0000ff;
}
";
        assert_eq!(
            minify_css(css),
            "body{font-family:var(--font),sans-serif;margin:0!important;}.hljs-keyword ,.hljs-tag{color:#0000ff;}"
        );
    }

    #[test]
    fn empty_input_is_empty() {
        assert_eq!(minify_css(""), "");
        assert_eq!(minify_css("/* only a comment */\n"), "");
    }

    #[test]
    fn concatenated_fragments_keep_order() {
        let css = format!("{}{}", "a { x: 1; }\n", "b { y: 2; }\n");
        assert_eq!(minify_css(&css), "a{x:1;}b{y:2;}");
    }
}
