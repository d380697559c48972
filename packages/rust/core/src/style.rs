//! Stylesheet aggregation.

use tracing::{info, instrument};

use mjmldocs_artifacts::minify_css;
use mjmldocs_fetcher::RemoteFetcher;

/// Fetch every stylesheet in order, concatenate and minify.
///
/// A stylesheet that cannot be fetched contributes nothing.
#[instrument(skip_all, fields(count = locators.len()))]
pub async fn aggregate_styles(fetcher: &RemoteFetcher, locators: &[String]) -> String {
    let mut css = String::new();
    for locator in locators {
        css.push_str(&fetcher.fetch_content(locator).await);
    }

    let minified = minify_css(&css);
    info!(raw = css.len(), minified = minified.len(), "styles aggregated");
    minified
}
