//! Asset mirroring: download every referenced image once, then point every
//! `src` attribute at the local copy.

use std::collections::{HashSet, VecDeque};
use std::path::Path;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::{debug, info, instrument, warn};

use mjmldocs_fetcher::RemoteFetcher;
use mjmldocs_shared::{ImageReference, basename};

use crate::pipeline::ProgressReporter;

/// Placeholder the viewer substitutes with the output root.
pub const ROOT_PLACEHOLDER: &str = "{{root}}";

/// `<img ... src="...">` in either quote style.
static IMG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<img\s+[^>]*?src=(?:"([^"']+)"|'([^"']+)')"#).expect("valid regex")
});

/// Any `src="..."` / `src='...'` attribute.
static SRC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)src=(?:"([^"]*)"|'([^']*)')"#).expect("valid regex"));

/// Result of mirroring the images of one document.
#[derive(Debug, Default)]
pub struct Mirrored {
    /// Document with every `src` rewritten.
    pub content: String,
    pub downloaded: usize,
    pub failed: usize,
    /// `(src, reason)` for every failed download.
    pub errors: Vec<(String, String)>,
}

/// Distinct image references in first-occurrence order.
pub fn collect_images(text: &str) -> Vec<ImageReference> {
    let mut seen = HashSet::new();
    IMG_RE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .filter(|m| seen.insert(m.as_str()))
        .map(|m| ImageReference::new(m.as_str()))
        .collect()
}

/// Rewrite every `src` attribute to `{{root}}/images/<basename>`.
pub fn rewrite_sources(text: &str) -> String {
    SRC_RE
        .replace_all(text, |caps: &Captures<'_>| {
            let src = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map_or("", |m| m.as_str());
            format!("src=\"{ROOT_PLACEHOLDER}/images/{}\"", basename(src))
        })
        .into_owned()
}

/// Download each distinct image into `images_dir`, then rewrite the document.
///
/// All downloads finish before the rewrite. Failures are logged and counted.
#[instrument(skip_all, fields(dir = %images_dir.display()))]
pub async fn mirror(
    fetcher: &RemoteFetcher,
    content: &str,
    images_dir: &Path,
    progress: &dyn ProgressReporter,
) -> Mirrored {
    let mut out = Mirrored::default();
    let mut queue: VecDeque<ImageReference> = collect_images(content).into();
    let total = queue.len();
    let mut current = 0;

    while let Some(image) = queue.pop_front() {
        current += 1;
        progress.asset_mirrored(&image.original_src, current, total);

        if image.local_file_name.is_empty() {
            warn!(src = %image.original_src, "image reference has no file name");
            out.failed += 1;
            out.errors
                .push((image.original_src, "reference has no file name".into()));
            continue;
        }

        let dest = images_dir.join(&image.local_file_name);
        match fetcher.download(&image.original_src, &dest).await {
            Ok(bytes) => {
                debug!(src = %image.original_src, file = %image.local_file_name, bytes, "image mirrored");
                out.downloaded += 1;
            }
            Err(e) => {
                warn!(src = %image.original_src, error = %e, "image download failed");
                out.failed += 1;
                out.errors.push((image.original_src, e.to_string()));
            }
        }
    }

    out.content = rewrite_sources(content);
    info!(
        downloaded = out.downloaded,
        failed = out.failed,
        "asset mirroring complete"
    );
    out
}
