//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use mjmldocs_core::pipeline::{BuildConfig, BuildReport, ProgressReporter};
use mjmldocs_core::sources::{DOC_SOURCES, STYLE_SOURCES};
use mjmldocs_shared::{DocsConfig, init_config, load_config, load_config_from};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// mjmldocs: build the MJML documentation for offline viewing.
#[derive(Parser)]
#[command(
    name = "mjmldocs",
    version,
    about = "Build a self-contained MJML documentation page with local images and examples.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (defaults to ~/.mjmldocs/mjmldocs.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Fetch, rewrite and render the documentation.
    Build {
        /// Output directory (overrides `output.dir`).
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// List the markdown sources and stylesheets in build order.
    Sources,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "mjmldocs=info",
        1 => "mjmldocs=debug",
        _ => "mjmldocs=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Build { out } => cmd_build(cli.config.as_deref(), out.as_deref()).await,
        Command::Sources => cmd_sources(),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(cli.config.as_deref()),
        },
    }
}

/// Load config from an explicit path, or from the default location.
fn resolve_config(path: Option<&Path>) -> Result<DocsConfig> {
    match path {
        Some(p) => load_config_from(p).wrap_err_with(|| format!("loading {}", p.display())),
        None => Ok(load_config()?),
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_build(config_path: Option<&Path>, out: Option<&Path>) -> Result<()> {
    let config = resolve_config(config_path)?;
    let build_config = BuildConfig::from_config(&config, out)?;

    info!(
        out = %build_config.layout.root.display(),
        sources = build_config.sources.len(),
        authenticated = build_config.fetch.token.is_some(),
        "building documentation"
    );

    let reporter = CliProgress::new();
    let report = match mjmldocs_core::build(&build_config, &reporter).await {
        Ok(report) => report,
        Err(e) => {
            reporter.abandon();
            return Err(e).wrap_err("documentation build failed");
        }
    };

    print_summary(&report);

    match report.artifact {
        Ok(_) => Ok(()),
        Err(e) => Err(e).wrap_err("artifact write failed, images and examples were kept"),
    }
}

fn print_summary(report: &BuildReport) {
    println!();
    match &report.artifact {
        Ok(_) => println!("  Documentation built."),
        Err(_) => println!("  Documentation built, artifact not written."),
    }
    println!(
        "  Sources:  {} ({} empty)",
        report.sources_total, report.sources_empty
    );
    println!(
        "  Images:   {} ({} failed)",
        report.images_downloaded, report.images_failed
    );
    println!(
        "  Examples: {} ({} failed)",
        report.examples_written.len(),
        report.examples_failed
    );
    match &report.artifact {
        Ok(meta) => {
            println!("  Artifact: {}", meta.path.display());
            println!("  Size:     {} bytes", meta.size_bytes);
            println!("  SHA-256:  {}", meta.sha256);
        }
        Err(e) => println!("  Artifact: {e}"),
    }
    println!("  Time:     {:.1}s", report.elapsed.as_secs_f64());

    if !report.errors.is_empty() {
        println!();
        println!("  Recovered failures:");
        for (item, reason) in &report.errors {
            println!("    {item}: {reason}");
        }
    }
    println!();
}

fn cmd_sources() -> Result<()> {
    println!("Markdown sources:");
    for (i, locator) in DOC_SOURCES.iter().enumerate() {
        println!("  {:>2}. {locator}", i + 1);
    }
    println!();
    println!("Stylesheets:");
    for (i, locator) in STYLE_SOURCES.iter().enumerate() {
        println!("  {:>2}. {locator}", i + 1);
    }
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let config = resolve_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    fn abandon(&self) {
        self.spinner.abandon_with_message("build failed");
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn source_fetched(&self, locator: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Fetching [{current}/{total}] {locator}"));
    }

    fn asset_mirrored(&self, src: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Mirroring [{current}/{total}] {src}"));
    }

    fn example_extracted(&self, id: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Extracting [{current}/{total}] {id}"));
    }

    fn done(&self, _report: &BuildReport) {
        self.spinner.finish_and_clear();
    }
}
