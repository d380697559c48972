//! Build orchestration for mjmldocs.
//!
//! Ties the fetcher, renderer and artifact writer together into the single
//! `build` workflow, and owns the fixed source lists plus the text rewrites
//! (image mirroring, live example extraction) applied between them.

pub mod aggregate;
pub mod assets;
pub mod examples;
pub mod pipeline;
pub mod sources;
pub mod style;
pub mod workspace;

pub use pipeline::{BuildConfig, BuildReport, ProgressReporter, SilentProgress, build};
