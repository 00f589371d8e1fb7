use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::GridError;
use crate::grid::Schemes;

pub const DEFAULT_NAMESPACE: &str =
    "://se01.dur.scotgrid.ac.uk/dpm/dur.scotgrid.ac.uk/home/pheno/{user}/";
pub const DEFAULT_REPRINT_THRESHOLD: usize = 15;

/// How `--wildcards` patterns are interpreted.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MatchStyle {
    #[default]
    Regex,
    Glob,
}

/// Colour names understood by crossterm, e.g. `yellow` or `dark_blue`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ColourConfig {
    pub directory: String,
    pub executable: String,
    pub summary: String,
    pub runcards: String,
    pub error: String,
}

impl Default for ColourConfig {
    fn default() -> Self {
        Self {
            directory: "dark_yellow".to_string(),
            executable: "dark_blue".to_string(),
            summary: "dark_green".to_string(),
            runcards: "dark_blue".to_string(),
            error: "dark_red".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Scheme-less root of the user's area; `{user}` is substituted.
    pub namespace: String,
    /// Falls back to `$USER` when unset.
    pub default_user: Option<String>,
    /// Summary counts are repeated after listings longer than this.
    pub reprint_threshold: usize,
    pub match_style: MatchStyle,
    pub schemes: Schemes,
    pub colours: ColourConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            default_user: None,
            reprint_threshold: DEFAULT_REPRINT_THRESHOLD,
            match_style: MatchStyle::default(),
            schemes: Schemes::default(),
            colours: ColourConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.namespace.starts_with("://") {
            return Err(GridError::Config(format!(
                "namespace '{}' must start with '://' so a scheme can be prefixed",
                self.namespace
            ))
            .into());
        }
        for (verb, scheme) in self.schemes.iter() {
            if scheme.trim().is_empty() || scheme.contains("://") {
                return Err(GridError::Config(format!(
                    "scheme for '{}' must be a bare protocol name, got '{}'",
                    verb, scheme
                ))
                .into());
            }
        }
        Ok(())
    }

    /// User whose area is browsed: explicit override, config, then `$USER`.
    pub fn resolve_user(&self, cli_user: Option<&str>) -> Result<String> {
        if let Some(user) = cli_user.or(self.default_user.as_deref()) {
            return Ok(user.to_string());
        }
        std::env::var("USER").context("No user given: pass --user or set default_user")
    }
}

#[derive(Debug)]
pub struct ConfigManager {
    config_file: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        let config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("gridls");

        // Create config directory if it doesn't exist
        if !config_dir.exists() {
            fs::create_dir_all(&config_dir).context("Failed to create config directory")?;
        }

        Ok(Self {
            config_file: config_dir.join("gridls.toml"),
        })
    }

    /// Use an explicit config file instead of the per-user one.
    pub fn with_file(path: &Path) -> Self {
        Self {
            config_file: path.to_path_buf(),
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_file
    }

    pub fn load_config(&self) -> Result<AppConfig> {
        // If config file doesn't exist, create it with default values
        if !self.config_file.exists() {
            let default_config = AppConfig::default();
            self.save_config(&default_config)?;
            tracing::info!("Wrote default config to {:?}", self.config_file);
        }

        let content =
            fs::read_to_string(&self.config_file).context("Failed to read config file")?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {:?}", self.config_file))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_config(&self, config: &AppConfig) -> Result<()> {
        let toml = toml::to_string_pretty(config).context("Failed to serialize config")?;
        if let Some(parent) = self.config_file.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        fs::write(&self.config_file, toml).context("Failed to write config file")?;
        Ok(())
    }
}
