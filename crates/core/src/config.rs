//! Layered application configuration.
//!
//! Values come from built-in defaults, then `~/.config/arcadia/config.toml`,
//! then `ARCADIA_*` environment variables.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use ::config::{Config, Environment, File};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{error::ValidationError, query::DEFAULT_PAGE_SIZE};

/// Directory under the user's config dir holding Arcadia files.
pub const CONFIG_DIR: &str = "arcadia";
const CONFIG_FILE: &str = "config.toml";
const ENV_PREFIX: &str = "ARCADIA";

const DEFAULT_CONFIG: &str = r#"# Arcadia configuration

# Games shown per page.
page_size = 12

# Quiet period before a search query is executed, in milliseconds.
search_debounce_ms = 300

# Artificial delay added to every query, in milliseconds. Useful for
# exercising the loading state.
simulated_latency_ms = 0

# JSON catalog to load instead of the built-in game list.
# catalog_path = "/path/to/catalog.json"

# Directory for log files.
# log_dir = "/path/to/logs"
"#;

/// Runtime configuration for the engine and the terminal front-end.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Games per page.
    pub page_size: usize,
    /// Debounce window for text queries.
    pub search_debounce_ms: u64,
    /// Artificial latency applied to every query.
    pub simulated_latency_ms: u64,
    /// Optional JSON catalog; the built-in list is used when unset.
    pub catalog_path: Option<PathBuf>,
    /// Where log files are written.
    pub log_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            search_debounce_ms: 300,
            simulated_latency_ms: 0,
            catalog_path: None,
            log_dir: default_log_dir(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default location plus environment overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(config_path())
    }

    /// Load configuration from the given file plus environment overrides.
    ///
    /// A missing file is not an error; defaults apply.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let settings = Config::builder()
            .add_source(File::from(path.to_path_buf()).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .with_context(|| format!("failed to read configuration {}", path.display()))?;

        let config: AppConfig = settings
            .try_deserialize()
            .with_context(|| format!("failed to parse configuration {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.page_size == 0 {
            return Err(ValidationError::InvalidConfig {
                key: "page_size",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// [`AppConfig::search_debounce_ms`] as a duration.
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    /// [`AppConfig::simulated_latency_ms`] as a duration.
    pub fn simulated_latency(&self) -> Duration {
        Duration::from_millis(self.simulated_latency_ms)
    }
}

/// Path of the user configuration file.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR)
        .join(CONFIG_FILE)
}

fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR)
        .join("logs")
}

/// Write the commented default configuration if no file exists yet.
pub fn ensure_default_config() -> Result<()> {
    ensure_default_config_at(config_path()).map(|_| ())
}

/// Write the default configuration to `path` when missing. Returns whether a file was created.
pub fn ensure_default_config_at(path: impl AsRef<Path>) -> Result<bool> {
    let path = path.as_ref();
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write default config {}", path.display()))?;
    info!(path = %path.display(), "Wrote default configuration");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_file_parses_to_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("arcadia/config.toml");
        assert!(ensure_default_config_at(&path)?);
        assert!(!ensure_default_config_at(&path)?);

        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.page_size, 12);
        assert_eq!(config.search_debounce(), Duration::from_millis(300));
        assert_eq!(config.simulated_latency(), Duration::ZERO);
        assert!(config.catalog_path.is_none());
        Ok(())
    }

    #[test]
    fn missing_file_matches_written_default() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");
        let before = AppConfig::load_from(&path)?;
        assert!(ensure_default_config_at(&path)?);
        let after = AppConfig::load_from(&path)?;
        assert_eq!(before, after);
        assert_eq!(before, AppConfig::default());
        Ok(())
    }

    #[test]
    fn file_values_override_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "page_size = 4\nsimulated_latency_ms = 250\ncatalog_path = \"/tmp/games.json\"\n",
        )?;

        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.page_size, 4);
        assert_eq!(config.simulated_latency_ms, 250);
        assert_eq!(config.catalog_path, Some(PathBuf::from("/tmp/games.json")));
        assert_eq!(config.search_debounce_ms, 300);
        Ok(())
    }

    #[test]
    fn zero_page_size_is_rejected() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");
        fs::write(&path, "page_size = 0\n")?;
        assert!(AppConfig::load_from(&path).is_err());
        Ok(())
    }
}
