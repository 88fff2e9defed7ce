use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RecallConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub search: SearchConfig,
    pub ai: AiConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub transport: String,
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SearchConfig {
    /// Normalized edit-distance ceiling for a fuzzy field match (0.0 = exact only).
    pub fuzzy_threshold: f64,
    pub default_limit: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AiConfig {
    pub provider: String,
    pub model: String,
    pub endpoint: String,
    /// Takes precedence over the `gemini_api_key` setting stored in the database.
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    /// Maximum number of memories serialized into a single prompt.
    pub context_limit: usize,
}

impl Default for RecallConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            search: SearchConfig::default(),
            ai: AiConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: "stdio".into(),
            host: "127.0.0.1".into(),
            port: 7420,
            log_level: "info".into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let db_path = default_recallrift_dir()
            .join("recallrift.db")
            .to_string_lossy()
            .into_owned();
        Self { db_path }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            fuzzy_threshold: crate::memory::search::DEFAULT_FUZZY_THRESHOLD,
            default_limit: 20,
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".into(),
            model: "gemini-1.5-flash".into(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".into(),
            api_key: None,
            timeout_secs: 30,
            context_limit: 10,
        }
    }
}

/// Returns `~/.recallrift/`
pub fn default_recallrift_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".recallrift")
}

/// Returns the default config file path: `~/.recallrift/config.toml`
pub fn default_config_path() -> PathBuf {
    default_recallrift_dir().join("config.toml")
}

impl RecallConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            RecallConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    /// (RECALLRIFT_DB, RECALLRIFT_LOG_LEVEL, RECALLRIFT_AI_KEY).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("RECALLRIFT_DB") {
            self.storage.db_path = val;
        }
        if let Ok(val) = std::env::var("RECALLRIFT_LOG_LEVEL") {
            self.server.log_level = val;
        }
        if let Ok(val) = std::env::var("RECALLRIFT_AI_KEY") {
            if !val.trim().is_empty() {
                self.ai.api_key = Some(val);
            }
        }
    }

    /// Resolve the database path, expanding `~` if needed.
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = RecallConfig::default();
        assert_eq!(config.server.transport, "stdio");
        assert_eq!(config.server.log_level, "info");
        assert_eq!(config.search.fuzzy_threshold, 0.6);
        assert_eq!(config.ai.model, "gemini-1.5-flash");
        assert_eq!(config.ai.context_limit, 10);
        assert!(config.storage.db_path.ends_with("recallrift.db"));
    }

    #[test]
    fn parse_toml_config() {
        let toml_str = r#"
[server]
log_level = "debug"

[storage]
db_path = "/tmp/test.db"

[search]
fuzzy_threshold = 0.3

[ai]
model = "gemini-2.0-flash"
"#;
        let config: RecallConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.log_level, "debug");
        assert_eq!(config.storage.db_path, "/tmp/test.db");
        assert_eq!(config.search.fuzzy_threshold, 0.3);
        assert_eq!(config.ai.model, "gemini-2.0-flash");
        // defaults still apply for unset fields
        assert_eq!(config.search.default_limit, 20);
        assert_eq!(config.ai.timeout_secs, 30);
        assert!(config.ai.api_key.is_none());
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = RecallConfig::default();
        std::env::set_var("RECALLRIFT_DB", "/tmp/override.db");
        std::env::set_var("RECALLRIFT_LOG_LEVEL", "trace");
        std::env::set_var("RECALLRIFT_AI_KEY", "test-key");

        config.apply_env_overrides();

        assert_eq!(config.storage.db_path, "/tmp/override.db");
        assert_eq!(config.server.log_level, "trace");
        assert_eq!(config.ai.api_key.as_deref(), Some("test-key"));

        // Clean up
        std::env::remove_var("RECALLRIFT_DB");
        std::env::remove_var("RECALLRIFT_LOG_LEVEL");
        std::env::remove_var("RECALLRIFT_AI_KEY");
    }

    #[test]
    fn expand_tilde_leaves_absolute_paths() {
        assert_eq!(expand_tilde("/var/data/r.db"), PathBuf::from("/var/data/r.db"));
    }
}
