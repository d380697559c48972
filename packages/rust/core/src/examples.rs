//! Live example extraction.
//!
//! Anchors into the "try it live" catalog are replaced by an action hook the
//! viewer understands, and each referenced example's source is pulled out of
//! its catalog page and written to `examples/<id-with-dashes>.mjml`.
//!
//! The anchor rewrite runs to a fixed point: every iteration replaces the
//! first remaining catalog anchor, so the number of catalog URLs left in the
//! text strictly decreases. Fetching happens afterwards, draining an ordered
//! queue of distinct ids.

use std::collections::{HashSet, VecDeque};
use std::path::Path;
use std::sync::LazyLock;

use regex::{NoExpand, Regex};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument, warn};
use url::Url;

use mjmldocs_fetcher::RemoteFetcher;
use mjmldocs_shared::{DocsError, LiveExample, Result};

use crate::pipeline::ProgressReporter;

/// Root-relative catalog links written by older docs.
static LEGACY_HREF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)href="/try-it-live/"#).expect("valid regex"));

/// First JSON string field named `value` in a catalog page.
static PAYLOAD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""value"\s*:\s*"((?:[^"\\]|\\.)*)""#).expect("valid regex")
});

/// Root-relative image paths inside example sources.
static ASSET_IMG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)src="/assets/img/(.*?)""#).expect("valid regex"));

static COMPONENTS_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)components-").expect("valid regex"));

/// One queued catalog fetch.
#[derive(Debug, Clone)]
struct ExampleTask {
    example: LiveExample,
    /// Catalog URL as it appeared in the first anchor for this id.
    url: String,
}

/// Result of extracting the live examples of one document.
#[derive(Debug, Default)]
pub struct Extracted {
    /// Document with every catalog anchor turned into an action hook.
    pub content: String,
    /// Examples written, in first-occurrence order.
    pub examples: Vec<LiveExample>,
    pub failed: usize,
    /// `(catalog id, reason)` for every skipped example.
    pub errors: Vec<(String, String)>,
}

/// Rewrites catalog anchors and collects the distinct example ids.
#[derive(Debug)]
pub struct AnchorRewriter {
    catalog: String,
    anchor_re: Regex,
}

impl AnchorRewriter {
    /// Build a rewriter for the catalog hosted at `catalog_base`.
    pub fn new(catalog_base: &Url) -> Result<Self> {
        let catalog = catalog_base.as_str().trim_end_matches('/').to_string();
        let host = catalog
            .split_once("://")
            .map_or(catalog.as_str(), |(_, rest)| rest);

        let pattern = format!(
            r#"(?i)<a[^>]*?(href\s*=\s*['"](https?://{}/try-it-live/([^"']+?))['"])[^>]*?>"#,
            regex::escape(host)
        );
        let anchor_re = Regex::new(&pattern)
            .map_err(|e| DocsError::config(format!("invalid catalog base '{catalog}': {e}")))?;

        Ok(Self { catalog, anchor_re })
    }

    /// Make root-relative catalog links absolute.
    pub fn normalize_legacy(&self, text: &str) -> String {
        let replacement = format!(r#"href="{}/try-it-live/"#, self.catalog);
        LEGACY_HREF_RE
            .replace_all(text, NoExpand(&replacement))
            .into_owned()
    }

    /// Replace every catalog anchor's `href` with the action hook.
    ///
    /// Returns the rewritten text and the distinct ids (with the URL of their
    /// first anchor) in first-occurrence order.
    fn rewrite(&self, text: &str) -> (String, Vec<ExampleTask>) {
        let mut text = self.normalize_legacy(text);
        let mut seen = HashSet::new();
        let mut tasks = Vec::new();

        loop {
            let Some((span, url, id)) = self.anchor_re.captures(&text).and_then(|caps| {
                let attr = caps.get(1)?;
                Some((attr.range(), caps[2].to_string(), caps[3].to_string()))
            }) else {
                break;
            };

            let example = LiveExample::new(id.as_str());
            text.replace_range(span, &action_hook(&example.derived_file_name));

            if seen.insert(id) {
                tasks.push(ExampleTask { example, url });
            }
        }

        (text, tasks)
    }
}

/// The attribute set that replaces a catalog `href`.
pub fn action_hook(file_name: &str) -> String {
    let title = COMPONENTS_PREFIX_RE.replace_all(file_name, "");
    format!(r#"href="javascript:void(0)" onclick="openExample('{file_name}')" title="{title}""#)
}

/// Pull the example source out of a catalog page.
///
/// Returns the decoded lines (without terminators), or `None` when the page
/// carries no payload.
pub fn extract_lines(page: &str, catalog: &str) -> Option<Vec<String>> {
    let raw = PAYLOAD_RE.captures(page)?.get(1)?.as_str();
    let unquoted = raw.replace(r#"\""#, "\"");
    let replacement = format!(r#"src="{catalog}/assets/img/$1""#);
    let absolute = ASSET_IMG_RE.replace_all(&unquoted, replacement.as_str());

    Some(
        absolute
            .split(r"\n")
            .map(|line| line.replace('\\', ""))
            .collect(),
    )
}

/// Rewrite catalog anchors in `content` and write one file per distinct example.
#[instrument(skip_all, fields(dir = %examples_dir.display()))]
pub async fn extract(
    fetcher: &RemoteFetcher,
    rewriter: &AnchorRewriter,
    content: &str,
    examples_dir: &Path,
    progress: &dyn ProgressReporter,
) -> Extracted {
    let (content, tasks) = rewriter.rewrite(content);
    let mut out = Extracted {
        content,
        ..Extracted::default()
    };

    let total = tasks.len();
    let mut queue: VecDeque<ExampleTask> = tasks.into();
    let mut current = 0;

    while let Some(ExampleTask { mut example, url }) = queue.pop_front() {
        current += 1;
        progress.example_extracted(&example.catalog_id, current, total);

        let page = match fetcher.fetch_page(&url).await {
            Ok(page) => page,
            Err(e) => {
                warn!(id = %example.catalog_id, error = %e, "example page fetch failed");
                out.failed += 1;
                out.errors.push((example.catalog_id, e.to_string()));
                continue;
            }
        };

        let Some(lines) = extract_lines(&page, &rewriter.catalog) else {
            warn!(id = %example.catalog_id, "example page has no payload");
            out.failed += 1;
            out.errors
                .push((example.catalog_id, "no \"value\" payload in page".into()));
            continue;
        };

        let dest = examples_dir.join(example.file_name());
        if let Err(e) = append_lines(&dest, &lines).await {
            warn!(id = %example.catalog_id, error = %e, "example write failed");
            out.failed += 1;
            out.errors.push((example.catalog_id, e.to_string()));
            continue;
        }

        debug!(id = %example.catalog_id, lines = lines.len(), "example written");
        example.raw_text = lines.join("\n");
        out.examples.push(example);
    }

    info!(
        written = out.examples.len(),
        failed = out.failed,
        "example extraction complete"
    );
    out
}

/// Append each line plus a newline to `dest`, creating it if needed.
async fn append_lines(dest: &Path, lines: &[String]) -> Result<()> {
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dest)
        .await
        .map_err(|e| DocsError::io(dest, e))?;

    for line in lines {
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| DocsError::io(dest, e))?;
        file.write_all(b"\n")
            .await
            .map_err(|e| DocsError::io(dest, e))?;
    }

    file.flush().await.map_err(|e| DocsError::io(dest, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::SilentProgress;
    use mjmldocs_shared::FetchConfig;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn rewriter(base: &str) -> AnchorRewriter {
        AnchorRewriter::new(&Url::parse(base).unwrap()).unwrap()
    }

    fn fetcher() -> RemoteFetcher {
        RemoteFetcher::new(FetchConfig {
            api_base: Url::parse("http://127.0.0.1:9").unwrap(),
            token: None,
            timeout_secs: 5,
        })
        .unwrap()
    }

    fn page_with(value: &str) -> String {
        format!(r#"<script>window.__DATA__ = {{"id":1,"value": "{value}"}}</script>"#)
    }

    #[test]
    fn legacy_href_becomes_hook() {
        let r = rewriter("https://mjml.io");
        let (out, _) = r.rewrite(r#"<a href="/try-it-live/x/y">Try</a>"#);
        assert_eq!(
            out,
            r#"<a href="javascript:void(0)" onclick="openExample('x-y')" title="x-y">Try</a>"#
        );
    }

    #[test]
    fn title_drops_components_prefix() {
        assert_eq!(
            action_hook("components-Components-button"),
            r#"href="javascript:void(0)" onclick="openExample('components-Components-button')" title="button""#
        );
    }

    #[test]
    fn rewrite_keeps_other_attributes_and_dedupes_ids() {
        let r = rewriter("https://mjml.io/");
        let text = concat!(
            r#"<a class="btn" href="https://mjml.io/try-it-live/components/button" target="_blank">1</a>"#,
            r#"<a href='http://mjml.io/try-it-live/components/button'>2</a>"#,
            r#"<a href="https://mjml.io/try-it-live/layouts/basic">3</a>"#,
            r#"<a href="https://other.io/try-it-live/nope">4</a>"#,
        );
        let (out, tasks) = r.rewrite(text);

        let ids: Vec<_> = tasks.iter().map(|t| t.example.catalog_id.as_str()).collect();
        assert_eq!(ids, vec!["components/button", "layouts/basic"]);
        assert_eq!(tasks[0].url, "https://mjml.io/try-it-live/components/button");
        assert!(!out.contains("mjml.io/try-it-live"));
        assert!(out.contains(r#"<a class="btn" href="javascript:void(0)""#));
        assert!(out.contains(r#"title="button" target="_blank">1</a>"#));
        assert!(out.contains("https://other.io/try-it-live/nope"));
        assert_eq!(out.matches("openExample('components-button')").count(), 2);
    }

    #[test]
    fn extract_lines_unescapes_and_splits() {
        let page = page_with(r#"<mjml>\n  <mj-image src=\"/assets/img/logo.png\" />\n</mjml>"#);
        let lines = extract_lines(&page, "https://mjml.io").unwrap();
        assert_eq!(
            lines,
            vec![
                "<mjml>",
                r#"  <mj-image src="https://mjml.io/assets/img/logo.png" />"#,
                "</mjml>",
            ]
        );
    }

    #[test]
    fn extract_lines_drops_stray_escapes() {
        let page = page_with(r"<mj-text>a\tb<\/mj-text>\n<mj-spacer \/>");
        let lines = extract_lines(&page, "https://mjml.io").unwrap();

        assert_eq!(lines, vec!["<mj-text>atb</mj-text>", "<mj-spacer />"]);
        assert!(lines.iter().all(|l| !l.contains('\\')));
    }

    #[test]
    fn extract_lines_without_payload_is_none() {
        assert!(extract_lines("<html>nothing here</html>", "https://mjml.io").is_none());
    }

    #[tokio::test]
    async fn extract_writes_one_file_per_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/try-it-live/components/button"))
            .respond_with(ResponseTemplate::new(200).set_body_string(page_with(r"a\nb\nc")))
            .expect(1)
            .mount(&server)
            .await;

        let r = rewriter(&server.uri());
        let doc = format!(
            r#"<a href="{0}/try-it-live/components/button">x</a> <a href="/try-it-live/components/button">y</a>"#,
            server.uri()
        );
        let tmp = tempfile::tempdir().unwrap();

        let out = extract(&fetcher(), &r, &doc, tmp.path(), &SilentProgress).await;

        assert_eq!(out.examples.len(), 1);
        assert_eq!(out.failed, 0);
        let written = std::fs::read_to_string(tmp.path().join("components-button.mjml")).unwrap();
        assert_eq!(written, "a\nb\nc\n");
        assert_eq!(out.content.matches("openExample('components-button')").count(), 2);
    }

    #[tokio::test]
    async fn missing_payload_skips_file_but_rewrites_anchor() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/try-it-live/broken"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .mount(&server)
            .await;

        let r = rewriter(&server.uri());
        let doc = format!(r#"<a href="{}/try-it-live/broken">x</a>"#, server.uri());
        let tmp = tempfile::tempdir().unwrap();

        let out = extract(&fetcher(), &r, &doc, tmp.path(), &SilentProgress).await;

        assert!(out.examples.is_empty());
        assert_eq!(out.failed, 1);
        assert_eq!(out.errors[0].0, "broken");
        assert!(!tmp.path().join("broken.mjml").exists());
        assert!(out.content.contains("openExample('broken')"));
    }
}
