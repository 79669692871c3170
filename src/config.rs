use color_eyre::eyre::eyre;
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Manages config directory and config file operations
#[derive(Clone)]
pub struct ConfigManager {
    config_dir: PathBuf,
}

impl ConfigManager {
    /// Create a ConfigManager with a custom config directory (primarily for testing)
    pub fn with_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Create a new ConfigManager for the given app name
    pub fn new(app_name: &str) -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| eyre!("Could not determine config directory"))?
            .join(app_name);

        Ok(Self { config_dir })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    fn ensure_config_dir(&self) -> Result<()> {
        if !self.config_dir.exists() {
            std::fs::create_dir_all(&self.config_dir)?;
        }
        Ok(())
    }

    /// Load the config file, falling back to defaults when it is absent.
    pub fn load(&self) -> Result<AppConfig> {
        let path = self.config_path();
        if !path.exists() {
            return Ok(AppConfig::default());
        }
        let text = std::fs::read_to_string(&path)?;
        let config: AppConfig = toml::from_str(&text)
            .map_err(|e| eyre!("Invalid config file {}: {}", path.display(), e))?;
        Ok(config)
    }

    /// Write the default configuration template to the config file.
    pub fn write_default_config(&self, force: bool) -> Result<PathBuf> {
        let config_path = self.config_path();

        if config_path.exists() && !force {
            return Err(eyre!(
                "Config file already exists at {}. Use --force to overwrite.",
                config_path.display()
            ));
        }

        self.ensure_config_dir()?;
        std::fs::write(&config_path, DEFAULT_CONFIG_TEMPLATE)?;

        Ok(config_path)
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the dashboard backend
    pub api_url: String,
    /// Rows per table page
    pub per_page: usize,
    /// Search debounce delay in milliseconds
    pub debounce_ms: u64,
    /// Window size of the rolling-average overlay on the year chart
    pub rolling_window: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:5000".to_string(),
            per_page: 10,
            debounce_ms: 300,
            rolling_window: 3,
        }
    }
}

const DEFAULT_CONFIG_TEMPLATE: &str = r#"# vgdash configuration

# Base URL of the dashboard backend
api_url = "http://127.0.0.1:5000"

# Rows per table page
per_page = 10

# Search debounce delay in milliseconds
debounce_ms = 300

# Window size of the rolling-average overlay on the year chart
rolling_window = 3
"#;
