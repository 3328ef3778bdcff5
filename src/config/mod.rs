use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const CONFIG_FILE: &str = "gh-contrib-svg";
pub const ENV_PREFIX: &str = "GH_CONTRIB";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub github: GitHubConfig,
    pub render: RenderConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    pub api_base_url: String,
    pub per_page: u32,
    pub user_agent: String,
    pub timeout_secs: u64,
    /// Repositories collected at once; 1 keeps the walk sequential.
    pub concurrency: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Side of one avatar block, in pixels.
    pub avatar_size: u32,
    /// Image width, in pixels.
    pub width: u32,
    /// Avatars per row.
    pub line_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.github.com".to_string(),
            per_page: 100,
            user_agent: format!("gh-contrib-svg/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 30,
            concurrency: 1,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            avatar_size: 120,
            width: 1000,
            line_count: 8,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
        }
    }
}

impl Config {
    /// Defaults, then `gh-contrib-svg.{toml,yaml,json}` if present, then
    /// `GH_CONTRIB_*` variables (`GH_CONTRIB_RENDER__WIDTH=800`).
    pub fn load() -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(CONFIG_FILE).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to read configuration")?;

        settings
            .try_deserialize()
            .context("Invalid configuration")
    }
}
