//! Output workspace reset.
//!
//! Every build starts from a clean slate: the images and examples directories
//! are removed and recreated empty, and any stale artifact is deleted. A
//! failure here aborts the build, since a half-cleaned output would leak
//! state into the new artifact.

use std::path::Path;

use tracing::{debug, info, instrument};

use mjmldocs_shared::{DocsError, OutputLayout, Result};

/// Clear and recreate the output directories and remove the stale artifact.
#[instrument(skip_all, fields(root = %layout.root.display()))]
pub fn reset(layout: &OutputLayout) -> Result<()> {
    remove_dir_if_present(&layout.examples)?;
    remove_dir_if_present(&layout.images)?;
    remove_file_if_present(&layout.artifact)?;

    create_dir(&layout.examples)?;
    create_dir(&layout.images)?;

    info!("output workspace reset");
    Ok(())
}

/// Recursively remove `dir` when it exists and is a directory.
fn remove_dir_if_present(dir: &Path) -> Result<()> {
    match std::fs::symlink_metadata(dir) {
        Ok(meta) if meta.is_dir() => {
            debug!(path = %dir.display(), "removing directory");
            std::fs::remove_dir_all(dir).map_err(|e| DocsError::io(dir, e))
        }
        Ok(_) => Err(DocsError::validation(format!(
            "expected a directory at {}, found a file",
            dir.display()
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(DocsError::io(dir, e)),
    }
}

/// Unlink `file` when it exists and is not a directory.
fn remove_file_if_present(file: &Path) -> Result<()> {
    match std::fs::symlink_metadata(file) {
        Ok(meta) if meta.is_dir() => Err(DocsError::validation(format!(
            "expected a file at {}, found a directory",
            file.display()
        ))),
        Ok(_) => {
            debug!(path = %file.display(), "removing stale artifact");
            std::fs::remove_file(file).map_err(|e| DocsError::io(file, e))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(DocsError::io(file, e)),
    }
}

fn create_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|e| DocsError::io(dir, e))
}
