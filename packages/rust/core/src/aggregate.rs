//! Source aggregation: fetch every source in list order and join them into
//! one markdown document.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info, instrument, warn};

use mjmldocs_fetcher::RemoteFetcher;
use mjmldocs_shared::{SourceEntry, SourceKind};

use crate::pipeline::ProgressReporter;

/// Separator appended after every source's contribution.
const SECTION_SEPARATOR: &str = "\n\n";

/// A frontmatter block at the very start of the document.
static FRONTMATTER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\A\s*---\r?\n(?s:.*?\r?\n)??---[ \t]*(?:\r?\n|\z)").expect("valid regex")
});

/// Result of aggregating the source list.
#[derive(Debug, Default)]
pub struct Aggregated {
    /// Joined markdown, frontmatter stripped and trimmed.
    pub content: String,
    /// Sources that contributed text.
    pub fetched: usize,
    /// Sources that contributed nothing (failed, missing, or empty).
    pub empty: usize,
    /// `(locator, reason)` for every recovered failure.
    pub errors: Vec<(String, String)>,
}

/// Walk `sources` in order and concatenate their contents.
///
/// Never fails: a source that cannot be read contributes an empty section.
#[instrument(skip_all, fields(sources = sources.len()))]
pub async fn aggregate(
    fetcher: &RemoteFetcher,
    sources: &[SourceEntry],
    local_root: &Path,
    progress: &dyn ProgressReporter,
) -> Aggregated {
    let mut out = Aggregated::default();
    let mut joined = String::new();
    let total = sources.len();

    for (i, source) in sources.iter().enumerate() {
        let text = match source.kind {
            SourceKind::Remote => match fetcher.try_fetch_content(&source.locator).await {
                Ok(text) => text,
                Err(e) => {
                    warn!(locator = %source.locator, error = %e, "source fetch failed");
                    out.errors.push((source.locator.clone(), e.to_string()));
                    String::new()
                }
            },
            SourceKind::Local => read_local(&source.locator, local_root, &mut out.errors).await,
        };

        if text.is_empty() {
            out.empty += 1;
        } else {
            out.fetched += 1;
        }
        debug!(locator = %source.locator, kind = %source.kind, len = text.len(), "source aggregated");
        progress.source_fetched(&source.locator, i + 1, total);

        joined.push_str(&text);
        joined.push_str(SECTION_SEPARATOR);
    }

    out.content = strip_frontmatter(&joined).trim().to_string();
    info!(
        fetched = out.fetched,
        empty = out.empty,
        len = out.content.len(),
        "aggregation complete"
    );
    out
}

/// Read a local source if it resolves to a regular file.
async fn read_local(locator: &str, local_root: &Path, errors: &mut Vec<(String, String)>) -> String {
    let path = local_root.join(locator);
    if !path.is_file() {
        debug!(path = %path.display(), "local source not present, skipping");
        return String::new();
    }

    match tokio::fs::read(&path).await {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "local source unreadable");
            errors.push((locator.to_string(), e.to_string()));
            String::new()
        }
    }
}

/// Remove a leading `---` ... `---` block, if the document opens with one.
pub fn strip_frontmatter(text: &str) -> &str {
    match FRONTMATTER_RE.find(text) {
        Some(m) => &text[m.end()..],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::SilentProgress;
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use mjmldocs_shared::FetchConfig;
    use url::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher_for(base: &str) -> RemoteFetcher {
        RemoteFetcher::new(FetchConfig {
            api_base: Url::parse(base).unwrap(),
            token: None,
            timeout_secs: 5,
        })
        .unwrap()
    }

    async fn mount_content(server: &MockServer, at: &str, text: &str) {
        Mock::given(method("GET"))
            .and(path(at))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": STANDARD.encode(text),
                "encoding": "base64",
            })))
            .mount(server)
            .await;
    }

    #[test]
    fn frontmatter_stripped_at_start() {
        let doc = "\n---\ntitle: Guide\nlayout: doc\n---\n# Guide\n";
        assert_eq!(strip_frontmatter(doc), "# Guide\n");
    }

    #[test]
    fn frontmatter_later_in_document_is_kept() {
        let doc = "# Intro\n\n---\nnot: frontmatter\n---\n";
        assert_eq!(strip_frontmatter(doc), doc);
    }

    #[test]
    fn empty_frontmatter_block_stripped() {
        assert_eq!(strip_frontmatter("---\n---\n# Title\n"), "# Title\n");
        assert_eq!(
            strip_frontmatter("---\n---\nbody\n---\nkept: yes\n---\n"),
            "body\n---\nkept: yes\n---\n"
        );
    }

    #[test]
    fn frontmatter_only_first_block_removed() {
        let doc = "---\na: 1\n---\nbody\n---\nb: 2\n---\n";
        assert_eq!(strip_frontmatter(doc), "body\n---\nb: 2\n---\n");
    }

    #[tokio::test]
    async fn aggregates_in_order_and_survives_failures() {
        let server = MockServer::start().await;
        mount_content(&server, "/repos/doc/one.md", "# One").await;
        mount_content(&server, "/repos/doc/three.md", "# Three").await;
        Mock::given(method("GET"))
            .and(path("/repos/doc/two.md"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let sources = vec![
            SourceEntry::remote("repos/doc/one.md"),
            SourceEntry::remote("repos/doc/two.md"),
            SourceEntry::remote("repos/doc/three.md"),
        ];
        let tmp = tempfile::tempdir().unwrap();
        let out = aggregate(&fetcher_for(&server.uri()), &sources, tmp.path(), &SilentProgress).await;

        assert_eq!(out.content, "# One\n\n\n\n# Three");
        assert_eq!(out.fetched, 2);
        assert_eq!(out.empty, 1);
        assert_eq!(out.errors.len(), 1);
        assert_eq!(out.errors[0].0, "repos/doc/two.md");
    }

    #[tokio::test]
    async fn local_sources_read_only_when_file_exists() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("pkg")).unwrap();
        std::fs::write(tmp.path().join("pkg/README.md"), "# Local\n").unwrap();

        let sources = vec![
            SourceEntry::local("pkg/README.md"),
            SourceEntry::local("pkg/MISSING.md"),
            SourceEntry::local("pkg"),
        ];
        // No remote sources, so the base is never contacted.
        let fetcher = fetcher_for("http://127.0.0.1:9");
        let out = aggregate(&fetcher, &sources, tmp.path(), &SilentProgress).await;

        assert_eq!(out.content, "# Local");
        assert_eq!(out.fetched, 1);
        assert_eq!(out.empty, 2);
        assert!(out.errors.is_empty());
    }

    #[tokio::test]
    async fn leading_frontmatter_in_first_source_is_dropped() {
        let server = MockServer::start().await;
        mount_content(&server, "/repos/doc/index.md", "---\ntitle: x\n---\n\n# Body").await;

        let sources = vec![SourceEntry::remote("repos/doc/index.md")];
        let tmp = tempfile::tempdir().unwrap();
        let out = aggregate(&fetcher_for(&server.uri()), &sources, tmp.path(), &SilentProgress).await;

        assert_eq!(out.content, "# Body");
    }
}
