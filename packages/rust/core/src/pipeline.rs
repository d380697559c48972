//! End-to-end `build` pipeline:
//! reset → aggregate → mirror images → extract examples → render → styles → write.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{info, instrument, warn};
use url::Url;

use mjmldocs_artifacts::{ArtifactMeta, assemble_document, write_artifact};
use mjmldocs_fetcher::RemoteFetcher;
use mjmldocs_markdown::Renderer;
use mjmldocs_shared::{
    DocsConfig, FetchConfig, OutputLayout, Result, SourceEntry, parse_base_url,
};

use crate::aggregate::aggregate;
use crate::assets::mirror;
use crate::examples::{AnchorRewriter, extract};
use crate::sources::{default_sources, default_styles};
use crate::style::aggregate_styles;
use crate::workspace::reset;

/// Configuration for one `build` run.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Where outputs are written.
    pub layout: OutputLayout,
    /// Content-host access.
    pub fetch: FetchConfig,
    /// Base of the "try it live" catalog.
    pub catalog_base: Url,
    /// Directory local sources are resolved against.
    pub local_root: PathBuf,
    /// Ordered markdown sources.
    pub sources: Vec<SourceEntry>,
    /// Ordered stylesheet locators.
    pub styles: Vec<String>,
}

impl BuildConfig {
    /// Merge the app config with an optional output-root override.
    ///
    /// The source and stylesheet lists are always the compiled-in ones.
    pub fn from_config(config: &DocsConfig, out_override: Option<&Path>) -> Result<Self> {
        Ok(Self {
            layout: config.output.layout(out_override),
            fetch: FetchConfig::from_config(config)?,
            catalog_base: parse_base_url("remote.catalog_base", &config.remote.catalog_base)?,
            local_root: PathBuf::from(&config.output.local_root),
            sources: default_sources(),
            styles: default_styles(),
        })
    }
}

/// Summary of one build.
#[derive(Debug)]
pub struct BuildReport {
    pub sources_total: usize,
    /// Sources that contributed nothing.
    pub sources_empty: usize,
    pub images_downloaded: usize,
    pub images_failed: usize,
    /// File names of the examples written, in order.
    pub examples_written: Vec<String>,
    pub examples_failed: usize,
    /// Number of headings in the rendered body.
    pub headings: usize,
    /// Size of the minified stylesheet.
    pub style_bytes: usize,
    /// The written artifact, or why it could not be written.
    ///
    /// Side files stay in place when this is an error.
    pub artifact: Result<ArtifactMeta>,
    /// `(item, reason)` for every recovered failure.
    pub errors: Vec<(String, String)>,
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each source is aggregated.
    fn source_fetched(&self, locator: &str, current: usize, total: usize);
    /// Called before each distinct image is downloaded.
    fn asset_mirrored(&self, src: &str, current: usize, total: usize);
    /// Called before each distinct example is fetched.
    fn example_extracted(&self, id: &str, current: usize, total: usize);
    /// Called when the pipeline completes.
    fn done(&self, report: &BuildReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn source_fetched(&self, _locator: &str, _current: usize, _total: usize) {}
    fn asset_mirrored(&self, _src: &str, _current: usize, _total: usize) {}
    fn example_extracted(&self, _id: &str, _current: usize, _total: usize) {}
    fn done(&self, _report: &BuildReport) {}
}

/// Run the full documentation build.
///
/// Only a failed workspace reset is an error. A failed artifact write is
/// carried in [`BuildReport::artifact`] alongside the rest of the report, and
/// every network failure degrades to missing content listed in
/// [`BuildReport::errors`].
#[instrument(skip_all, fields(root = %config.layout.root.display()))]
pub async fn build(config: &BuildConfig, progress: &dyn ProgressReporter) -> Result<BuildReport> {
    let start = Instant::now();
    info!(sources = config.sources.len(), "starting build");

    let fetcher = RemoteFetcher::new(config.fetch.clone())?;
    let rewriter = AnchorRewriter::new(&config.catalog_base)?;

    // --- Phase 1: Reset ---
    progress.phase("Resetting output");
    reset(&config.layout)?;

    // --- Phase 2: Aggregate ---
    progress.phase("Fetching sources");
    let aggregated = aggregate(&fetcher, &config.sources, &config.local_root, progress).await;
    let mut errors = aggregated.errors;

    // --- Phase 3: Images ---
    progress.phase("Mirroring images");
    let mirrored = mirror(&fetcher, &aggregated.content, &config.layout.images, progress).await;
    errors.extend(mirrored.errors);

    // --- Phase 4: Live examples ---
    progress.phase("Extracting live examples");
    let extracted = extract(
        &fetcher,
        &rewriter,
        &mirrored.content,
        &config.layout.examples,
        progress,
    )
    .await;
    errors.extend(extracted.errors);

    // --- Phase 5: Render ---
    progress.phase("Rendering");
    let rendered = Renderer::new().render(&extracted.content);

    // --- Phase 6: Styles ---
    progress.phase("Fetching styles");
    let style = aggregate_styles(&fetcher, &config.styles).await;

    // --- Phase 7: Artifact ---
    progress.phase("Writing artifact");
    let html = assemble_document(&style, &rendered.html);
    let artifact = write_artifact(&config.layout.artifact, &html);
    if let Err(e) = &artifact {
        warn!(path = %config.layout.artifact.display(), error = %e, "artifact write failed");
    }

    let report = BuildReport {
        sources_total: config.sources.len(),
        sources_empty: aggregated.empty,
        images_downloaded: mirrored.downloaded,
        images_failed: mirrored.failed,
        examples_written: extracted.examples.iter().map(|e| e.file_name()).collect(),
        examples_failed: extracted.failed,
        headings: rendered.headings.len(),
        style_bytes: style.len(),
        artifact,
        errors,
        elapsed: start.elapsed(),
    };

    progress.done(&report);

    info!(
        written = report.artifact.is_ok(),
        images = report.images_downloaded,
        examples = report.examples_written.len(),
        recovered = report.errors.len(),
        elapsed_ms = report.elapsed.as_millis(),
        "build complete"
    );

    Ok(report)
}
