//! Output artifacts: the minified stylesheet and the final HTML document.
//!
//! - [`minify_css`] compacts the concatenated stylesheet fragments
//! - [`assemble_document`] wraps style, relay script and body into one page
//! - [`write_artifact`] persists the page atomically and reports its checksum

mod document;
mod style;

pub use document::{
    ArtifactMeta, RELAY_SCRIPT, assemble_document, collapse_line_breaks, write_artifact,
};
pub use style::minify_css;
