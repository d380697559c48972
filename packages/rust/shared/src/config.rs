//! Application configuration for mjmldocs.
//!
//! User config lives at `~/.mjmldocs/mjmldocs.toml`.
//! CLI flags override config file values, which override defaults.
//! The source list itself is not configurable; only where the build writes
//! and which hosts it talks to.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{DocsError, Result};
use crate::types::OutputLayout;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "mjmldocs.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".mjmldocs";

// ---------------------------------------------------------------------------
// Config structs (matching mjmldocs.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocsConfig {
    /// Output locations.
    #[serde(default)]
    pub output: OutputConfig,

    /// Remote hosts and credentials.
    #[serde(default)]
    pub remote: RemoteConfig,
}

/// `[output]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Root output directory.
    #[serde(default = "default_output_dir")]
    pub dir: String,

    /// Images directory name under `dir`.
    #[serde(default = "default_images_dir")]
    pub images_dir: String,

    /// Examples directory name under `dir`.
    #[serde(default = "default_examples_dir")]
    pub examples_dir: String,

    /// Artifact file name under `dir`.
    #[serde(default = "default_artifact")]
    pub artifact: String,

    /// Directory local sources are resolved against.
    #[serde(default = "default_local_root")]
    pub local_root: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            images_dir: default_images_dir(),
            examples_dir: default_examples_dir(),
            artifact: default_artifact(),
            local_root: default_local_root(),
        }
    }
}

fn default_output_dir() -> String {
    "./documentation".into()
}
fn default_images_dir() -> String {
    "images".into()
}
fn default_examples_dir() -> String {
    "examples".into()
}
fn default_artifact() -> String {
    "documentation.html".into()
}
fn default_local_root() -> String {
    "../node_modules".into()
}

/// `[remote]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the content host API.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Base URL of the "try it live" catalog.
    #[serde(default = "default_catalog_base")]
    pub catalog_base: String,

    /// Name of the env var holding the access token (never store the token itself).
    #[serde(default = "default_token_env")]
    pub token_env: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            catalog_base: default_catalog_base(),
            token_env: default_token_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_api_base() -> String {
    "https://api.github.com".into()
}
fn default_catalog_base() -> String {
    "https://mjml.io".into()
}
fn default_token_env() -> String {
    "GITHUB_ACCESS_TOKEN".into()
}
fn default_timeout_secs() -> u64 {
    30
}

// ---------------------------------------------------------------------------
// Fetch config (runtime, merged from config + environment)
// ---------------------------------------------------------------------------

/// Runtime fetch configuration: parsed host plus the resolved credential.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Content host base; relative locators are joined onto it.
    pub api_base: Url,
    /// Bearer token for content-host requests.
    pub token: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl FetchConfig {
    /// Build from the app config, reading the credential from the environment.
    pub fn from_config(config: &DocsConfig) -> Result<Self> {
        Ok(Self {
            api_base: parse_base_url("remote.api_base", &config.remote.api_base)?,
            token: resolve_token(&config.remote),
            timeout_secs: config.remote.timeout_secs,
        })
    }
}

/// Parse a configured base URL, rejecting anything that cannot be joined onto.
pub fn parse_base_url(field: &str, value: &str) -> Result<Url> {
    let url = Url::parse(value)
        .map_err(|e| DocsError::config(format!("{field}: invalid URL '{value}': {e}")))?;
    if url.cannot_be_a_base() {
        return Err(DocsError::config(format!(
            "{field}: '{value}' cannot be used as a base URL"
        )));
    }
    Ok(url)
}

/// Read the access token from the env var named in config; empty means none.
pub fn resolve_token(remote: &RemoteConfig) -> Option<String> {
    match std::env::var(&remote.token_env) {
        Ok(val) if !val.trim().is_empty() => Some(val.trim().to_string()),
        _ => {
            tracing::debug!(var = %remote.token_env, "no access token set, requests are anonymous");
            None
        }
    }
}

impl OutputConfig {
    /// Resolve the output layout, optionally overriding the root directory.
    pub fn layout(&self, root_override: Option<&Path>) -> OutputLayout {
        let root = root_override
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(&self.dir));
        OutputLayout::new(&root, &self.images_dir, &self.examples_dir, &self.artifact)
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.mjmldocs/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| DocsError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.mjmldocs/mjmldocs.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<DocsConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(DocsConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<DocsConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| DocsError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| DocsError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    init_config_in(&dir)
}

/// Write a default config file into `dir`, creating it if needed.
pub fn init_config_in(dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| DocsError::io(dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = DocsConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| DocsError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| DocsError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
