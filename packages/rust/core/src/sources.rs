//! The fixed, ordered source lists.
//!
//! Order is load-bearing: section boundaries in the final document follow
//! this list.

use mjmldocs_shared::SourceEntry;

/// Contents-API paths of the markdown sources, in document order.
pub const DOC_SOURCES: &[&str] = &[
    "repos/mjmlio/mjml/contents/doc/guide.md",
    "repos/mjmlio/mjml/contents/doc/getting_started.md",
    "repos/mjmlio/mjml/contents/doc/basic.md",
    "repos/mjmlio/mjml/contents/doc/components.md",
    "repos/mjmlio/mjml/contents/doc/head_components.md",
    "repos/mjmlio/mjml/contents/packages/mjml-head-attributes/README.md",
    "repos/mjmlio/mjml/contents/packages/mjml-head-breakpoint/README.md",
    "repos/mjmlio/mjml/contents/packages/mjml-head-font/README.md",
    "repos/mjmlio/mjml/contents/packages/mjml-head-preview/README.md",
    "repos/mjmlio/mjml/contents/packages/mjml-head-style/README.md",
    "repos/mjmlio/mjml/contents/packages/mjml-head-title/README.md",
    "repos/mjmlio/mjml/contents/doc/body_components.md",
    "repos/mjmlio/mjml/contents/packages/mjml-accordion/README.md",
    "repos/mjmlio/mjml/contents/packages/mjml-body/README.md",
    "repos/mjmlio/mjml/contents/packages/mjml-button/README.md",
    "repos/mjmlio/mjml/contents/packages/mjml-carousel/README.md",
    "repos/mjmlio/mjml/contents/packages/mjml-column/README.md",
    "repos/mjmlio/mjml/contents/packages/mjml-divider/README.md",
    "repos/mjmlio/mjml/contents/packages/mjml-group/README.md",
    "repos/mjmlio/mjml/contents/packages/mjml-hero/README.md",
    "repos/mjmlio/mjml/contents/packages/mjml-image/README.md",
    "repos/mjmlio/mjml/contents/packages/mjml-navbar/README.md",
    "repos/mjmlio/mjml/contents/packages/mjml-raw/README.md",
    "repos/mjmlio/mjml/contents/packages/mjml-section/README.md",
    "repos/mjmlio/mjml/contents/packages/mjml-social/README.md",
    "repos/mjmlio/mjml/contents/packages/mjml-spacer/README.md",
    "repos/mjmlio/mjml/contents/packages/mjml-table/README.md",
    "repos/mjmlio/mjml/contents/packages/mjml-text/README.md",
    "repos/mjmlio/mjml/contents/packages/mjml-wrapper/README.md",
    "repos/mjmlio/mjml/contents/doc/community-components.md",
    "repos/mjmlio/mjml/contents/doc/mjml-chart.md",
    "repos/mjmlio/mjml/contents/doc/create.md",
];

/// Contents-API paths of the stylesheet fragments, concatenated in this order.
pub const STYLE_SOURCES: &[&str] = &[
    "repos/Microsoft/vscode/contents/extensions/markdown-language-features/media/markdown.css",
    "repos/Microsoft/vscode/contents/extensions/markdown-language-features/media/highlight.css",
];

/// The markdown source list as [`SourceEntry`] values.
pub fn default_sources() -> Vec<SourceEntry> {
    DOC_SOURCES.iter().map(|p| SourceEntry::remote(*p)).collect()
}

/// The stylesheet list as owned locators.
pub fn default_styles() -> Vec<String> {
    STYLE_SOURCES.iter().map(|p| p.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mjmldocs_shared::SourceKind;

    #[test]
    fn guide_comes_first_and_create_last() {
        let sources = default_sources();
        assert_eq!(sources.len(), DOC_SOURCES.len());
        assert!(sources[0].locator.ends_with("doc/guide.md"));
        assert!(sources.last().unwrap().locator.ends_with("doc/create.md"));
        assert!(sources.iter().all(|s| s.kind == SourceKind::Remote));
    }

    #[test]
    fn head_components_precede_body_components() {
        let pos = |needle: &str| DOC_SOURCES.iter().position(|p| p.contains(needle)).unwrap();
        assert!(pos("mjml-head-title") < pos("doc/body_components.md"));
        assert!(pos("doc/body_components.md") < pos("mjml-accordion"));
    }

    #[test]
    fn markdown_css_precedes_highlight_css() {
        let styles = default_styles();
        assert_eq!(styles.len(), 2);
        assert!(styles[0].ends_with("markdown.css"));
        assert!(styles[1].ends_with("highlight.css"));
    }
}
