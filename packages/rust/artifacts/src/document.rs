//! Final HTML document assembly and persistence.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{info, instrument};

use mjmldocs_shared::{DocsError, Result};

/// Script embedded in the document to talk to the hosting viewer.
///
/// Outbound: `{ command: "openExample", data: <fileName> }` from rewritten anchors.
/// Inbound: `{ command: "scrollTo", anchor: <string> }` sets `location.hash`.
pub const RELAY_SCRIPT: &str = r#"
            const vscode = acquireVsCodeApi();

            function openExample(data) {
                vscode.postMessage({
                    command: "openExample",
                    data: data
                });
            }

            window.addEventListener("message", event => {
                let message = event.data;

                if (message.command == "scrollTo") {
                    location.hash = message.anchor;
                }
            });
        "#;

/// Metadata for the written artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactMeta {
    pub path: PathBuf,
    pub sha256: String,
    pub size_bytes: usize,
}

/// Wrap style and rendered body into a complete HTML document.
///
/// Runs of line breaks in the body are collapsed first.
pub fn assemble_document(style: &str, body: &str) -> String {
    let body = collapse_line_breaks(body);

    format!(
        "<!DOCTYPE html>
<html>
<head>
    <meta http-equiv=\"Content-type\" content=\"text/html;charset=UTF-8\">
    <style>{style}</style>
    <script>{RELAY_SCRIPT}</script>
</head>
<body>
{body}
</body>
</html>
"
    )
}

/// Collapse two or more consecutive `<br>` elements (with any whitespace
/// between them) into a single `<br />`.
pub fn collapse_line_breaks(html: &str) -> String {
    static BR_RUN_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?i)(?:<br\s*/?>\s*){2,}").expect("valid regex"));

    BR_RUN_RE.replace_all(html, "<br />").to_string()
}

/// Write the document to `path`, replacing any existing file.
///
/// Writes to a temp file in the same directory, then renames over the target.
#[instrument(skip(html), fields(path = %path.display(), bytes = html.len()))]
pub fn write_artifact(path: &Path, html: &str) -> Result<ArtifactMeta> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent).map_err(|e| DocsError::io(parent, e))?;

    let file_name = path
        .file_name()
        .ok_or_else(|| DocsError::validation(format!("artifact path has no file name: {}", path.display())))?
        .to_string_lossy();
    let temp = parent.join(format!(".{file_name}.tmp"));

    std::fs::write(&temp, html).map_err(|e| DocsError::io(&temp, e))?;
    std::fs::rename(&temp, path).map_err(|e| DocsError::io(path, e))?;

    let meta = ArtifactMeta {
        path: path.to_path_buf(),
        sha256: compute_sha256(html.as_bytes()),
        size_bytes: html.len(),
    };

    info!(sha256 = %meta.sha256, "artifact written");
    Ok(meta)
}

/// SHA-256 of `bytes` as lowercase hex.
fn compute_sha256(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
