//! Application configuration.
//!
//! Configuration is loaded from a TOML file at:
//! 1. `$MAILREMIND_CONFIG` (environment variable)
//! 2. `~/.config/mailremind/config.toml` (Linux/macOS)
//!    `%APPDATA%\mailremind\config.toml` (Windows)
//! 3. Built-in defaults

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::nlp::extract::DEFAULT_CONTEXT_RADIUS;
use crate::notify::{NotificationFormatter, DEFAULT_DATE_FORMAT, DEFAULT_MAX_CONTEXT_CHARS};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General behavior settings.
    pub general: GeneralConfig,
    /// Mention extraction and date resolution.
    pub extraction: ExtractionConfig,
    /// Notification text.
    pub notify: NotifyConfig,
}

/// General behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub log_level: String,
    /// Override cache directory for logs.
    pub cache_dir: Option<PathBuf>,
    /// Mailbox query used by `scan` when none is given.
    pub default_query: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Tokens of context kept on each side of a mention.
    pub context_radius: usize,
    /// Resolve directionless expressions ("Friday") to the future.
    pub prefer_future: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    /// `strftime` format string for event dates.
    pub date_format: String,
    /// Context characters shown per digest entry.
    pub max_context_chars: usize,
}

// ── Default implementations ─────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            cache_dir: None,
            default_query: String::new(),
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            context_radius: DEFAULT_CONTEXT_RADIUS,
            prefer_future: true,
        }
    }
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            max_context_chars: DEFAULT_MAX_CONTEXT_CHARS,
        }
    }
}

impl NotifyConfig {
    pub fn formatter(&self) -> NotificationFormatter {
        NotificationFormatter::new(self.date_format.clone(), self.max_context_chars)
    }
}

// ── Load / save ─────────────────────────────────────────────────

/// Load configuration, searching standard locations.
///
/// Returns the default configuration if no file is found or on parse error.
pub fn load_config() -> Config {
    if let Some(path) = config_file_path() {
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(contents) => match toml::from_str::<Config>(&contents) {
                    Ok(cfg) => {
                        tracing::info!(path = %path.display(), "Loaded config");
                        return cfg;
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %e,
                            "Failed to parse config, using defaults"
                        );
                    }
                },
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Failed to read config file, using defaults"
                    );
                }
            }
        }
    }
    Config::default()
}

/// Save configuration to the standard location.
pub fn save_config(config: &Config) -> anyhow::Result<()> {
    let path = config_file_path()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config file path"))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(&path, contents)?;
    tracing::info!(path = %path.display(), "Saved config");
    Ok(())
}

/// Determine the config file path (checking env var first, then standard dirs).
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(env_path) = std::env::var("MAILREMIND_CONFIG") {
        return Some(PathBuf::from(env_path));
    }
    dirs::config_dir().map(|d| d.join("mailremind").join("config.toml"))
}

/// Return the cache directory for logs.
pub fn cache_dir(config: &Config) -> PathBuf {
    if let Some(ref dir) = config.general.cache_dir {
        return dir.clone();
    }
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mailremind")
}

/// Return the log file path.
pub fn log_file_path(config: &Config) -> PathBuf {
    cache_dir(config).join("mailremind.log")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.general.log_level, "warn");
        assert!(cfg.general.default_query.is_empty());
        assert_eq!(cfg.extraction.context_radius, 10);
        assert!(cfg.extraction.prefer_future);
        assert_eq!(cfg.notify.date_format, "%A, %B %d, %Y at %I:%M %p");
        assert_eq!(cfg.notify.max_context_chars, 100);
    }

    #[test]
    fn test_serialize_deserialize_roundtrip() {
        let mut cfg = Config::default();
        cfg.general.default_query = "subject:deadline".into();
        let toml_str = toml::to_string_pretty(&cfg).expect("serialize");
        let parsed: Config = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.general.default_query, "subject:deadline");
        assert_eq!(parsed.extraction.context_radius, cfg.extraction.context_radius);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let partial = r#"
[extraction]
prefer_future = false

[notify]
date_format = "%Y-%m-%d"
"#;
        let cfg: Config = toml::from_str(partial).expect("parse partial");
        assert!(!cfg.extraction.prefer_future);
        assert_eq!(cfg.notify.date_format, "%Y-%m-%d");
        // Other fields use defaults
        assert_eq!(cfg.extraction.context_radius, 10);
        assert_eq!(cfg.general.log_level, "warn");
    }

    #[test]
    fn test_cache_dir_override() {
        let mut cfg = Config::default();
        cfg.general.cache_dir = Some(PathBuf::from("/tmp/mailremind-cache"));
        assert_eq!(
            log_file_path(&cfg),
            PathBuf::from("/tmp/mailremind-cache/mailremind.log")
        );
    }
}
