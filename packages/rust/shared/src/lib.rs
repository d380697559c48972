//! Shared types, error model, and configuration for mjmldocs.
//!
//! This crate is the foundation depended on by all other mjmldocs crates.
//! It provides:
//! - [`DocsError`], the unified error type
//! - Domain types ([`SourceEntry`], [`ImageReference`], [`LiveExample`], [`OutputLayout`])
//! - Configuration ([`DocsConfig`], [`FetchConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    DocsConfig, FetchConfig, OutputConfig, RemoteConfig, config_dir, config_file_path,
    init_config, init_config_in, load_config, load_config_from, parse_base_url, resolve_token,
};
pub use error::{DocsError, Result};
pub use types::{
    EXAMPLE_EXTENSION, ImageReference, LiveExample, OutputLayout, SourceEntry, SourceKind,
    basename,
};
