use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable that overrides the backend base URL
pub const BACKEND_URL_ENV: &str = "MCP_CONSOLE_BACKEND_URL";

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Command backend connection
    pub backend: BackendConfig,

    /// UI preferences
    pub ui: UiConfig,
}

/// Where commands are sent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    /// Unset means requests wait for the backend indefinitely.
    pub request_timeout_secs: Option<u64>,
}

/// UI configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// chrono format string for history timestamps (local time)
    pub timestamp_format: String,
    pub placeholder: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8001".to_string(),
            request_timeout_secs: None,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            timestamp_format: "%d.%m.%Y, %H:%M:%S".to_string(),
            placeholder: "הכנס פקודה בעברית...".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from `path`, or from `~/.mcp-console/config.toml` when
    /// no path is given, then apply the environment override.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::home_dir()?.join("config.toml"),
        };

        let mut config = if config_path.exists() {
            let content = fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config file {}", config_path.display()))?;
            Self::from_toml_str(&content)
                .with_context(|| format!("Failed to parse config file {}", config_path.display()))?
        } else {
            Config::default()
        };

        if let Ok(url) = std::env::var(BACKEND_URL_ENV) {
            config.apply_base_url_override(Some(url));
        }

        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Replace the backend URL if the override is present and non-blank.
    pub fn apply_base_url_override(&mut self, url: Option<String>) {
        if let Some(url) = url {
            let url = url.trim();
            if !url.is_empty() {
                self.backend.base_url = url.to_string();
            }
        }
    }

    /// `~/.mcp-console`
    pub fn home_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not find home directory")?;
        Ok(home.join(".mcp-console"))
    }

    /// Log file used while the terminal UI owns the screen
    pub fn log_path() -> Result<PathBuf> {
        Ok(Self::home_dir()?.join("mcp-console.log"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn empty_file_yields_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.backend.base_url, "http://localhost:8001");
        assert_eq!(config.backend.request_timeout_secs, None);
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = Config::from_toml_str(
            r#"
            [backend]
            base_url = "http://10.0.0.5:9000"
            request_timeout_secs = 30
            "#,
        )
        .unwrap();

        assert_eq!(config.backend.base_url, "http://10.0.0.5:9000");
        assert_eq!(config.backend.request_timeout_secs, Some(30));
        assert_eq!(config.ui, UiConfig::default());
    }

    #[test]
    fn invalid_toml_is_an_error() {
        assert!(Config::from_toml_str("[backend\nbase_url = ").is_err());
    }

    #[test]
    fn blank_override_is_ignored() {
        let mut config = Config::default();
        config.apply_base_url_override(Some("   ".to_string()));
        assert_eq!(config.backend.base_url, "http://localhost:8001");

        config.apply_base_url_override(Some(" http://example.test ".to_string()));
        assert_eq!(config.backend.base_url, "http://example.test");

        config.apply_base_url_override(None);
        assert_eq!(config.backend.base_url, "http://example.test");
    }

    #[test]
    fn load_reads_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[ui]\ntimestamp_format = \"%H:%M\"").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.ui.timestamp_format, "%H:%M");
    }

    #[test]
    fn load_reports_unparsable_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "backend = 12").unwrap();

        let err = Config::load(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
