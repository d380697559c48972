//! mjmldocs CLI: builds the offline MJML documentation bundle.
//!
//! Pulls the MJML docs from their hosts, mirrors images and live examples
//! next to a single self-contained HTML document.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
