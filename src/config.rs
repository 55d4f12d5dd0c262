//! Configuration management for Pulseline
//!
//! Loads settings from TOML file at ~/.pulseline/config.toml

use crate::error::{CoreError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Transcript analysis engine configuration
    #[serde(default)]
    pub engine: EngineConfig,

    /// Statusline display configuration
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Transcript analysis engine configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Nominal context window of the model, used as the percentage
    /// denominator (default: 200000)
    #[serde(default = "default_context_window")]
    pub context_window: u64,

    /// Number of trailing transcript lines scanned for the soft
    /// "recent error" signal
    #[serde(default = "default_recent_error_count")]
    pub recent_error_count: usize,

    /// Whether the mtime-keyed transcript cache is enabled
    #[serde(default = "default_true")]
    pub cache_enabled: bool,

    /// Output-token count below which an assistant turn with no stop
    /// reason is shown as "thinking". Heuristic, not a guarantee.
    #[serde(default = "default_thinking_token_threshold")]
    pub thinking_token_threshold: u64,
}

fn default_context_window() -> u64 {
    200_000
}

fn default_recent_error_count() -> usize {
    10
}

fn default_thinking_token_threshold() -> u64 {
    crate::transcript::state::DEFAULT_THINKING_TOKEN_THRESHOLD
}

fn default_true() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            context_window: default_context_window(),
            recent_error_count: default_recent_error_count(),
            cache_enabled: true,
            thinking_token_threshold: default_thinking_token_threshold(),
        }
    }
}

/// Statusline display configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    /// Whether to colorize output. The host pipes stdout, so colors are
    /// forced on when enabled; NO_COLOR and --no-color still win.
    #[serde(default = "default_true")]
    pub color: bool,

    /// Separator between statusline segments
    #[serde(default = "default_separator")]
    pub separator: String,

    /// Width of the context usage bar, in characters
    #[serde(default = "default_bar_width")]
    pub bar_width: usize,
}

fn default_separator() -> String {
    " | ".to_string()
}

fn default_bar_width() -> usize {
    10
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            color: true,
            separator: default_separator(),
            bar_width: default_bar_width(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let expanded_path = expand_path(path.as_ref());

        if !expanded_path.exists() {
            return Err(CoreError::Config(format!(
                "Configuration file not found: {}",
                expanded_path.display()
            )));
        }

        let content = std::fs::read_to_string(&expanded_path)?;
        let config: Config = toml::from_str(&content)?;

        Ok(config)
    }

    /// Load configuration from file or use defaults. A missing or broken
    /// file is logged and never fatal; the statusline must still render.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        Self::from_file(path).unwrap_or_else(|e| {
            tracing::debug!("Using default config ({})", e);
            Config::default()
        })
    }

    /// Create a default configuration file at the given path
    pub fn create_default<P: AsRef<Path>>(path: P) -> Result<()> {
        // Write a well-commented config file
        let content = r#"# Pulseline Configuration

[engine]
# Nominal model context window, used as the denominator for the
# context-usage percentage (not a hard limit; usage can exceed it).
context_window = 200000

# How many trailing transcript lines to scan for the soft
# "something went wrong recently" signal.
recent_error_count = 10

# Cache the analyzed transcript keyed by file mtime. Only pays off
# when pulseline is embedded in a long-lived host; harmless otherwise.
cache_enabled = true

# Assistant turns with no stop reason and fewer output tokens than this
# are shown as "thinking". Heuristic carried over from upstream behavior.
thinking_token_threshold = 50

[display]
# Colorize the statusline (NO_COLOR and --no-color override this)
color = true

# Separator between segments
separator = " | "

# Width of the context usage bar, in characters
bar_width = 10
"#;

        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;

        Ok(())
    }
}

/// Expand ~ to home directory in paths
pub fn expand_path(path: &Path) -> PathBuf {
    if path.starts_with("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(path.strip_prefix("~").unwrap());
        }
    }
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.engine.context_window, 200_000);
        assert_eq!(config.engine.recent_error_count, 10);
        assert!(config.engine.cache_enabled);
        assert_eq!(config.engine.thinking_token_threshold, 50);
        assert_eq!(config.display.separator, " | ");
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[engine]
context_window = 1000000
recent_error_count = 5
cache_enabled = false

[display]
color = false
bar_width = 20
"#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.engine.context_window, 1_000_000);
        assert_eq!(config.engine.recent_error_count, 5);
        assert!(!config.engine.cache_enabled);
        // unset fields keep their defaults
        assert_eq!(config.engine.thinking_token_threshold, 50);
        assert!(!config.display.color);
        assert_eq!(config.display.bar_width, 20);
        assert_eq!(config.display.separator, " | ");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.engine.context_window, 200_000);
        assert!(config.display.color);
    }

    #[test]
    fn test_load_or_default_tolerates_missing_and_broken_files() {
        let config = Config::load_or_default("/nonexistent/pulseline.toml");
        assert_eq!(config.engine.context_window, 200_000);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not [valid toml").unwrap();
        let config = Config::load_or_default(&path);
        assert!(config.display.color);
    }

    #[test]
    fn test_create_default_is_loadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        Config::create_default(&path).unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.engine.context_window, 200_000);
        assert!(config.engine.cache_enabled);
    }
}
