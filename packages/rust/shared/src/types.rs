//! Core domain types for a documentation build.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// File extension for extracted live examples.
pub const EXAMPLE_EXTENSION: &str = "mjml";

// ---------------------------------------------------------------------------
// SourceEntry
// ---------------------------------------------------------------------------

/// Where a markdown source is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Fetched from the remote content host.
    Remote,
    /// Read from disk, relative to the configured local root.
    Local,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote => f.write_str("remote"),
            Self::Local => f.write_str("local"),
        }
    }
}

/// One entry of the ordered source list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceEntry {
    /// Content-host path, absolute URL, or local file path.
    pub locator: String,
    pub kind: SourceKind,
}

impl SourceEntry {
    pub fn remote(locator: impl Into<String>) -> Self {
        Self {
            locator: locator.into(),
            kind: SourceKind::Remote,
        }
    }

    pub fn local(locator: impl Into<String>) -> Self {
        Self {
            locator: locator.into(),
            kind: SourceKind::Local,
        }
    }
}

// ---------------------------------------------------------------------------
// ImageReference
// ---------------------------------------------------------------------------

/// An image referenced from the aggregated content.
///
/// Keyed by `original_src` (exact, case-sensitive match).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageReference {
    /// The `src` value exactly as it appeared in the content.
    pub original_src: String,
    /// Name of the mirrored file inside the images directory.
    pub local_file_name: String,
}

impl ImageReference {
    pub fn new(original_src: impl Into<String>) -> Self {
        let original_src = original_src.into();
        let local_file_name = basename(&original_src).to_string();
        Self {
            original_src,
            local_file_name,
        }
    }
}

/// Last `/`-separated segment of a reference (the whole string if it has none).
pub fn basename(reference: &str) -> &str {
    reference.rsplit('/').next().unwrap_or(reference)
}

// ---------------------------------------------------------------------------
// LiveExample
// ---------------------------------------------------------------------------

/// A live example referenced by an anchor into the "try it live" catalog.
///
/// Keyed by `catalog_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveExample {
    /// Catalog identifier, e.g. `components/accordion`.
    pub catalog_id: String,
    /// `catalog_id` with path separators replaced by `-`.
    pub derived_file_name: String,
    /// Decoded example source, empty until extracted.
    pub raw_text: String,
}

impl LiveExample {
    pub fn new(catalog_id: impl Into<String>) -> Self {
        let catalog_id = catalog_id.into();
        let derived_file_name = catalog_id.replace('/', "-");
        Self {
            catalog_id,
            derived_file_name,
            raw_text: String::new(),
        }
    }

    /// File name on disk, including the example extension.
    pub fn file_name(&self) -> String {
        format!("{}.{EXAMPLE_EXTENSION}", self.derived_file_name)
    }
}

// ---------------------------------------------------------------------------
// OutputLayout
// ---------------------------------------------------------------------------

/// Resolved output locations for one build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    /// Root output directory (the `{{root}}` the viewer resolves).
    pub root: PathBuf,
    /// Mirrored images.
    pub images: PathBuf,
    /// Extracted live examples.
    pub examples: PathBuf,
    /// The generated HTML document.
    pub artifact: PathBuf,
}

impl OutputLayout {
    /// Build a layout under `root` using the given child names.
    pub fn new(root: &Path, images_dir: &str, examples_dir: &str, artifact: &str) -> Self {
        Self {
            root: root.to_path_buf(),
            images: root.join(images_dir),
            examples: root.join(examples_dir),
            artifact: root.join(artifact),
        }
    }
}
