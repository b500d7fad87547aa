//! Configuration management for Redraft.
//!
//! Loads configuration from ${REDRAFT_HOME}/config.toml with sensible
//! defaults.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Returns the default config template with comments.
///
/// This is embedded from default_config.toml at compile time.
/// To update, edit default_config.toml directly.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

/// Merges user config values into the default template.
///
/// This ensures new comments/sections from the template are always present,
/// while preserving user's customized values.
fn merge_with_template(user_config: &str) -> Result<String> {
    use toml_edit::{DocumentMut, Item};

    let mut doc: DocumentMut = default_config_template()
        .parse()
        .context("Failed to parse default config template")?;

    let user_doc: DocumentMut = user_config.parse().context("Failed to parse user config")?;

    fn merge_items(target: &mut toml_edit::Table, source: &toml_edit::Table) {
        for (key, value) in source.iter() {
            match value {
                Item::Value(v) => {
                    target[key] = Item::Value(v.clone());
                }
                Item::Table(src_table) => {
                    if let Some(Item::Table(target_table)) = target.get_mut(key) {
                        merge_items(target_table, src_table);
                    } else {
                        target[key] = Item::Table(src_table.clone());
                    }
                }
                Item::ArrayOfTables(src_arr) => {
                    target[key] = Item::ArrayOfTables(src_arr.clone());
                }
                Item::None => {}
            }
        }
    }

    merge_items(doc.as_table_mut(), user_doc.as_table());

    Ok(doc.to_string())
}

pub mod paths {
    //! Path resolution for Redraft configuration and data files.
    //!
    //! REDRAFT_HOME resolution order:
    //! 1. REDRAFT_HOME environment variable (if set)
    //! 2. ~/.config/redraft (default)

    use std::path::PathBuf;

    /// Returns the Redraft home directory.
    ///
    /// Checks REDRAFT_HOME env var first, falls back to ~/.config/redraft
    pub fn redraft_home() -> PathBuf {
        if let Ok(home) = std::env::var("REDRAFT_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir()
            .map(|h| h.join(".config").join("redraft"))
            .expect("Could not determine home directory")
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        redraft_home().join("config.toml")
    }
}

/// Backend API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Origin of the Redraft backend.
    pub base_url: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: Config::DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Login destination used in session-expiry redirects.
    pub login_path: String,

    /// Backend API settings.
    #[serde(default)]
    pub backend: BackendConfig,
}

impl Config {
    const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
    const DEFAULT_LOGIN_PATH: &str = "/auth/login";

    /// Loads configuration from the default config path.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Returns the effective backend origin, without a trailing slash.
    ///
    /// Resolution order: REDRAFT_BASE_URL env var > config > default.
    ///
    /// # Errors
    /// Returns an error if the resolved value is not a valid URL.
    pub fn effective_base_url(&self) -> Result<String> {
        if let Ok(env_url) = std::env::var("REDRAFT_BASE_URL") {
            let trimmed = env_url.trim();
            if !trimmed.is_empty() {
                validate_url(trimmed)?;
                return Ok(trimmed.trim_end_matches('/').to_string());
            }
        }

        let configured = self.backend.base_url.trim();
        if !configured.is_empty() {
            validate_url(configured)?;
            return Ok(configured.trim_end_matches('/').to_string());
        }

        Ok(Self::DEFAULT_BASE_URL.to_string())
    }

    /// Saves only the backend base URL to the config file.
    ///
    /// Creates the file with the default template if it doesn't exist.
    /// If the file exists, merges user values into the latest template.
    pub fn save_base_url(base_url: &str) -> Result<()> {
        Self::save_base_url_to(&paths::config_path(), base_url)
    }

    /// Saves only the backend base URL to a specific config file path.
    pub fn save_base_url_to(path: &Path, base_url: &str) -> Result<()> {
        use toml_edit::{DocumentMut, value};

        validate_url(base_url)?;

        let contents = if path.exists() {
            let user_config = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            merge_with_template(&user_config)?
        } else {
            default_config_template().to_string()
        };

        let mut doc: DocumentMut = contents
            .parse()
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        doc["backend"]["base_url"] = value(base_url.trim_end_matches('/'));

        Self::write_config(path, &doc.to_string())
    }

    /// Creates a default config file at the given path.
    /// Returns an error if the file already exists.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    /// Writes config content to a file, creating parent directories as needed.
    /// Uses atomic write (temp file + rename) to prevent corruption.
    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            login_path: Self::DEFAULT_LOGIN_PATH.to_string(),
            backend: BackendConfig::default(),
        }
    }
}

/// Validates that a URL is well-formed.
fn validate_url(url: &str) -> Result<()> {
    url::Url::parse(url).with_context(|| format!("Invalid backend base URL: {url}"))?;
    Ok(())
}
