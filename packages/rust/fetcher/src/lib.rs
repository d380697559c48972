//! Remote content fetching for the documentation build.
//!
//! Three kinds of remote access go through [`RemoteFetcher`]:
//! - contents-API files (markdown sources, stylesheets), base64-decoded
//! - plain pages (the "try it live" catalog)
//! - binary downloads streamed to disk (mirrored images)
//!
//! Only contents-API requests carry the access token.

mod payload;

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Client;
use reqwest::header::ACCEPT;
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument, warn};
use url::Url;

use mjmldocs_shared::{DocsError, FetchConfig, Result};

/// Maximum number of redirects to follow.
const MAX_REDIRECTS: usize = 5;

/// User-Agent string for all requests (the contents API rejects requests without one).
const USER_AGENT: &str = concat!("mjmldocs/", env!("CARGO_PKG_VERSION"));

/// Media type requested from the contents API.
const CONTENTS_MEDIA_TYPE: &str = "application/vnd.github+json";

// ---------------------------------------------------------------------------
// RemoteFetcher
// ---------------------------------------------------------------------------

/// Single-attempt HTTP access to the content host and third-party hosts.
#[derive(Debug, Clone)]
pub struct RemoteFetcher {
    client: Client,
    config: FetchConfig,
}

impl RemoteFetcher {
    /// Create a fetcher with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = build_client(config.timeout_secs)?;
        Ok(Self { client, config })
    }

    /// Resolve a locator: absolute URLs are used as-is, anything else is
    /// joined onto the content-host base.
    pub fn resolve(&self, locator: &str) -> Result<Url> {
        if let Ok(url) = Url::parse(locator) {
            return Ok(url);
        }

        let mut base = self.config.api_base.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        base.join(locator.trim_start_matches('/')).map_err(|e| {
            DocsError::validation(format!("cannot resolve locator '{locator}': {e}"))
        })
    }

    /// Fetch a contents-API file and return its decoded text.
    #[instrument(skip(self))]
    pub async fn try_fetch_content(&self, locator: &str) -> Result<String> {
        let url = self.resolve(locator)?;

        let mut request = self.client.get(url.as_str()).header(ACCEPT, CONTENTS_MEDIA_TYPE);
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| DocsError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DocsError::Network(format!("{url}: failed to read body: {e}")))?;

        if !status.is_success() {
            return Err(DocsError::Network(format!("{url}: HTTP {status}")));
        }

        let text = payload::decode_body(&body)?;
        debug!(%url, len = text.len(), "fetched content");
        Ok(text)
    }

    /// Fetch a contents-API file, degrading any failure to an empty string.
    pub async fn fetch_content(&self, locator: &str) -> String {
        match self.try_fetch_content(locator).await {
            Ok(text) => text,
            Err(e) => {
                warn!(locator, error = %e, "no content fetched");
                String::new()
            }
        }
    }

    /// Fetch a page as plain text (no credential, no decoding).
    #[instrument(skip(self))]
    pub async fn fetch_page(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DocsError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DocsError::Network(format!("{url}: HTTP {status}")));
        }

        response
            .text()
            .await
            .map_err(|e| DocsError::Network(format!("{url}: failed to read body: {e}")))
    }

    /// Stream a response body into `dest`, returning the number of bytes written.
    ///
    /// The body goes to a `.<name>.part` file next to `dest` that is renamed
    /// over it once complete, so a failed download never touches an existing
    /// `dest`.
    #[instrument(skip(self, dest), fields(dest = %dest.display()))]
    pub async fn download(&self, url: &str, dest: &Path) -> Result<u64> {
        let partial = partial_path(dest)?;

        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DocsError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DocsError::Network(format!("{url}: HTTP {status}")));
        }

        let mut file = tokio::fs::File::create(&partial)
            .await
            .map_err(|e| DocsError::io(&partial, e))?;

        let written = match stream_body(&mut response, &mut file, url, &partial).await {
            Ok(n) => n,
            Err(e) => {
                drop(file);
                let _ = tokio::fs::remove_file(&partial).await;
                return Err(e);
            }
        };
        drop(file);

        if let Err(e) = tokio::fs::rename(&partial, dest).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(DocsError::io(dest, e));
        }

        debug!(url, bytes = written, "download complete");
        Ok(written)
    }
}

/// Sibling `.<name>.part` path a download is staged in.
fn partial_path(dest: &Path) -> Result<PathBuf> {
    let name = dest.file_name().ok_or_else(|| {
        DocsError::validation(format!("download target has no file name: {}", dest.display()))
    })?;
    Ok(dest.with_file_name(format!(".{}.part", name.to_string_lossy())))
}

/// Copy the response body chunk by chunk into `file`.
async fn stream_body(
    response: &mut reqwest::Response,
    file: &mut tokio::fs::File,
    url: &str,
    dest: &Path,
) -> Result<u64> {
    let mut written: u64 = 0;

    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| DocsError::Network(format!("{url}: body stream failed: {e}")))?
    {
        file.write_all(&chunk)
            .await
            .map_err(|e| DocsError::io(dest, e))?;
        written += chunk.len() as u64;
    }

    file.flush().await.map_err(|e| DocsError::io(dest, e))?;
    Ok(written)
}

/// Build a reqwest client with appropriate settings.
fn build_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| DocsError::Network(format!("failed to build HTTP client: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher_for(base: &str, token: Option<&str>) -> RemoteFetcher {
        RemoteFetcher::new(FetchConfig {
            api_base: Url::parse(base).unwrap(),
            token: token.map(String::from),
            timeout_secs: 5,
        })
        .unwrap()
    }

    fn contents_body(text: &str) -> serde_json::Value {
        serde_json::json!({
            "name": "guide.md",
            "content": STANDARD.encode(text),
            "encoding": "base64",
        })
    }

    #[test]
    fn resolve_relative_and_absolute() {
        let fetcher = fetcher_for("https://api.github.com", None);

        let url = fetcher
            .resolve("repos/mjmlio/mjml/contents/doc/guide.md")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.github.com/repos/mjmlio/mjml/contents/doc/guide.md"
        );

        let url = fetcher.resolve("https://mjml.io/try-it-live/x").unwrap();
        assert_eq!(url.as_str(), "https://mjml.io/try-it-live/x");
    }

    #[test]
    fn resolve_keeps_base_path_prefix() {
        let fetcher = fetcher_for("http://localhost:8080/api/v3", None);
        let url = fetcher.resolve("/repos/a/b").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/v3/repos/a/b");
    }

    #[tokio::test]
    async fn fetch_content_decodes_base64_and_sends_token() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/mjmlio/mjml/contents/doc/guide.md"))
            .and(header("authorization", "Bearer s3cret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(contents_body("# Guide\n")))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = fetcher_for(&server.uri(), Some("s3cret"));
        let text = fetcher
            .fetch_content("repos/mjmlio/mjml/contents/doc/guide.md")
            .await;
        assert_eq!(text, "# Guide\n");
    }

    #[tokio::test]
    async fn fetch_content_not_found_is_empty() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/missing.md"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(serde_json::json!({"message": "Not Found"})),
            )
            .mount(&server)
            .await;

        let fetcher = fetcher_for(&server.uri(), None);
        assert_eq!(fetcher.fetch_content("repos/missing.md").await, "");

        let err = fetcher.try_fetch_content("repos/missing.md").await.unwrap_err();
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn fetch_content_unexpected_shape_is_empty() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/dir"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"name": "a.md"}, {"name": "b.md"}
            ])))
            .mount(&server)
            .await;

        let fetcher = fetcher_for(&server.uri(), None);
        assert_eq!(fetcher.fetch_content("repos/dir").await, "");
    }

    #[tokio::test]
    async fn fetch_page_returns_raw_text() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/try-it-live/components/button"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .mount(&server)
            .await;

        let fetcher = fetcher_for(&server.uri(), Some("ignored"));
        let body = fetcher
            .fetch_page(&format!("{}/try-it-live/components/button", server.uri()))
            .await
            .unwrap();
        assert_eq!(body, "<html>ok</html>");
    }

    #[tokio::test]
    async fn download_streams_to_disk() {
        let server = MockServer::start().await;
        let png = vec![0x89, b'P', b'N', b'G', 0, 1, 2, 3];

        Mock::given(method("GET"))
            .and(path("/img/logo.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(png.clone()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("logo.png");
        let fetcher = fetcher_for(&server.uri(), None);

        let written = fetcher
            .download(&format!("{}/img/logo.png", server.uri()), &dest)
            .await
            .unwrap();

        assert_eq!(written, png.len() as u64);
        assert_eq!(std::fs::read(&dest).unwrap(), png);
    }

    #[tokio::test]
    async fn download_http_error_writes_nothing() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/img/gone.png"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("gone.png");
        let fetcher = fetcher_for(&server.uri(), None);

        let result = fetcher
            .download(&format!("{}/img/gone.png", server.uri()), &dest)
            .await;

        assert!(result.is_err());
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn download_leaves_no_partial_file() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/img/a.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8, 2]))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("a.png");
        let fetcher = fetcher_for(&server.uri(), None);

        fetcher
            .download(&format!("{}/img/a.png", server.uri()), &dest)
            .await
            .unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.png"]);
    }

    #[tokio::test]
    async fn failed_download_keeps_existing_file() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/other/logo.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![9u8; 4]))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("logo.png");
        std::fs::write(&dest, b"first").unwrap();
        // Staging path occupied by a directory, so the second download cannot be written.
        std::fs::create_dir(dir.path().join(".logo.png.part")).unwrap();
        let fetcher = fetcher_for(&server.uri(), None);

        let result = fetcher
            .download(&format!("{}/other/logo.png", server.uri()), &dest)
            .await;

        assert!(result.is_err());
        assert_eq!(std::fs::read(&dest).unwrap(), b"first");
    }
}
