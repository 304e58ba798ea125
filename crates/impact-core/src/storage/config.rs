//! TOML-based application configuration.
//!
//! Stores:
//! - Database file name
//! - Narrative generation settings
//! - Analytics defaults
//! - Log filter
//!
//! Configuration is stored at `~/.config/impact/config.toml`. The narrative
//! api key is read from `ANTHROPIC_API_KEY` and never written to disk.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::{ConfigError, CoreError, Result};

/// Database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite file stem, `<name>.db` inside the data directory.
    #[serde(default = "default_db_name")]
    pub name: String,
}

/// Narrative generation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarrativeConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(skip)]
    pub api_key: Option<String>,
}

/// Analytics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Budget used by estimators when a project has none.
    #[serde(default = "default_total_budget")]
    pub default_total_budget: f64,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/impact/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub narrative: NarrativeConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

// Default functions
fn default_db_name() -> String {
    "impact_methodology".into()
}
fn default_true() -> bool {
    true
}
fn default_model() -> String {
    "claude-3-sonnet-20240229".into()
}
fn default_base_url() -> String {
    "https://api.anthropic.com".into()
}
fn default_timeout_secs() -> u64 {
    60
}
fn default_max_tokens() -> u32 {
    4096
}
fn default_total_budget() -> f64 {
    90_000.0
}
fn default_log_filter() -> String {
    "warn".into()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            name: default_db_name(),
        }
    }
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: default_model(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            max_tokens: default_max_tokens(),
            api_key: None,
        }
    }
}

impl NarrativeConfig {
    /// Api key to use for LLM narratives, if they are enabled.
    pub fn active_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .filter(|k| self.enabled && !k.trim().is_empty())
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            default_total_budget: default_total_budget(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(root: &'a serde_json::Value, key: &str) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(root: &mut serde_json::Value, key: &str, value: &str) -> Result<()> {
        let unknown = || CoreError::from(ConfigError::UnknownKey(key.to_string()));
        let invalid = |message: String| {
            CoreError::from(ConfigError::InvalidValue {
                key: key.to_string(),
                message,
            })
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as number")));
                        }
                    }
                    serde_json::Value::Object(_) => return Err(unknown()),
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the data directory, writing defaults on first use, then
    /// apply environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        let mut cfg = if path.exists() {
            Self::load_from(&path)?
        } else {
            let cfg = Self::default();
            cfg.save_to(&path)?;
            cfg
        };
        cfg.apply_env();
        Ok(cfg)
    }

    /// Parse a config file without touching the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        let load_failed = |message: String| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = std::fs::read_to_string(path).map_err(|e| load_failed(e.to_string()))?;
        let cfg = toml::from_str(&content).map_err(|e| load_failed(e.to_string()))?;
        Ok(cfg)
    }

    /// `DB_NAME` and `ANTHROPIC_API_KEY` override the file.
    pub fn apply_env(&mut self) {
        if let Ok(name) = std::env::var("DB_NAME") {
            if !name.trim().is_empty() {
                self.database.name = name;
            }
        }
        self.narrative.api_key = std::env::var("ANTHROPIC_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());
    }

    /// Persist to the data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// SQLite file inside the data directory.
    pub fn database_path(&self) -> Result<PathBuf> {
        Ok(data_dir()?.join(format!("{}.db", self.database.name)))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Object(_) => None,
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key in memory.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let mut updated: Config = serde_json::from_value(json)?;
        updated.narrative.api_key = self.narrative.api_key.take();
        *self = updated;
        Ok(())
    }

    /// All leaf keys with their values, in file order.
    pub fn entries(&self) -> Vec<(String, String)> {
        fn walk(prefix: &str, value: &serde_json::Value, out: &mut Vec<(String, String)>) {
            match value {
                serde_json::Value::Object(map) => {
                    for (k, v) in map {
                        let key = if prefix.is_empty() {
                            k.clone()
                        } else {
                            format!("{prefix}.{k}")
                        };
                        walk(&key, v, out);
                    }
                }
                serde_json::Value::String(s) => out.push((prefix.to_string(), s.clone())),
                other => out.push((prefix.to_string(), other.to_string())),
            }
        }

        let mut out = Vec::new();
        if let Ok(json) = serde_json::to_value(self) {
            walk("", &json, &mut out);
        }
        out
    }

    /// Load from disk, returning default on error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to default config");
            let mut cfg = Self::default();
            cfg.apply_env();
            cfg
        })
    }
}
