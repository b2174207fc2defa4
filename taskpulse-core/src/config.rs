//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/taskpulse/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/taskpulse/` (~/.config/taskpulse/)
//! - Data: `$XDG_DATA_HOME/taskpulse/` (~/.local/share/taskpulse/)
//! - State/Logs: `$XDG_STATE_HOME/taskpulse/` (~/.local/state/taskpulse/)

use crate::error::{Error, Result};
use crate::types::UserId;
use chrono::NaiveTime;
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_DATA_HOME or ~/.local/share
fn xdg_data_home() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/share"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Which user the CLI acts for
    #[serde(default)]
    pub user: UserConfig,

    /// Analysis windows and notification defaults
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// LLM configuration for suggestions (optional)
    #[serde(default)]
    pub llm: Option<LlmConfig>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Storage location overrides
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Default user settings
#[derive(Debug, Deserialize)]
pub struct UserConfig {
    /// User id used when the CLI is not given `--user`
    #[serde(default = "default_user_id")]
    pub default_id: UserId,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            default_id: default_user_id(),
        }
    }
}

fn default_user_id() -> UserId {
    1
}

/// Analysis configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    /// Lookback for hour, day and cancellation patterns
    #[serde(default = "default_pattern_window_days")]
    pub pattern_window_days: u32,

    /// Lookback for the productivity score
    #[serde(default = "default_score_window_days")]
    pub score_window_days: u32,

    /// Morning notification time written with every analysis ("HH:MM")
    #[serde(
        default = "default_morning_notification_time",
        deserialize_with = "deserialize_clock_time"
    )]
    pub morning_notification_time: NaiveTime,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            pattern_window_days: default_pattern_window_days(),
            score_window_days: default_score_window_days(),
            morning_notification_time: default_morning_notification_time(),
        }
    }
}

fn default_pattern_window_days() -> u32 {
    30
}

fn default_score_window_days() -> u32 {
    7
}

fn default_morning_notification_time() -> NaiveTime {
    NaiveTime::from_hms_opt(8, 0, 0).unwrap_or(NaiveTime::MIN)
}

/// Parse a wall-clock time written as `HH:MM` or `HH:MM:SS`.
pub fn parse_clock_time(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .ok()
}

fn deserialize_clock_time<'de, D>(deserializer: D) -> std::result::Result<NaiveTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_clock_time(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid time {:?}, expected HH:MM", raw)))
}

/// LLM provider configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    /// Provider type
    pub provider: LlmProvider,
    /// Model to use
    pub model: String,
    /// API endpoint (optional, uses default for provider)
    pub endpoint: Option<String>,
    /// API key (can also use env var)
    pub api_key: Option<String>,
    /// HTTP request timeout in seconds
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

fn default_llm_timeout() -> u64 {
    30
}

/// Supported LLM providers
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    Ollama,
    Claude,
    OpenAI,
}

impl LlmProvider {
    /// Returns the default endpoint for this provider
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            LlmProvider::Ollama => "http://localhost:11434",
            LlmProvider::Claude => "https://api.anthropic.com",
            LlmProvider::OpenAI => "https://api.openai.com",
        }
    }

    /// Environment variable consulted when no api_key is configured
    pub fn api_key_env(&self) -> Option<&'static str> {
        match self {
            LlmProvider::Ollama => None,
            LlmProvider::Claude => Some("ANTHROPIC_API_KEY"),
            LlmProvider::OpenAI => Some("OPENAI_API_KEY"),
        }
    }
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

/// Storage overrides
#[derive(Debug, Deserialize, Default)]
pub struct StorageConfig {
    /// Use this SQLite file instead of the XDG data location
    pub database_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Database file to use, honouring `[storage] database_path`
    pub fn resolved_database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(Self::database_path)
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/taskpulse/config.toml` (~/.config/taskpulse/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("taskpulse").join("config.toml")
    }

    /// Returns the data directory path (for SQLite database)
    ///
    /// `$XDG_DATA_HOME/taskpulse/` (~/.local/share/taskpulse/)
    pub fn data_dir() -> PathBuf {
        xdg_data_home().join("taskpulse")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/taskpulse/` (~/.local/state/taskpulse/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("taskpulse")
    }

    /// Returns the database file path
    ///
    /// `$XDG_DATA_HOME/taskpulse/data.db` (~/.local/share/taskpulse/data.db)
    pub fn database_path() -> PathBuf {
        Self::data_dir().join("data.db")
    }

    /// Ensure XDG base directory environment variables are set.
    ///
    /// CLI binaries call this before anything reads the XDG variables so
    /// that every path resolves against the same home.
    pub fn ensure_xdg_env() {
        let home = home_dir();

        if std::env::var("XDG_DATA_HOME").is_err() {
            std::env::set_var("XDG_DATA_HOME", home.join(".local/share"));
        }

        if std::env::var("XDG_STATE_HOME").is_err() {
            std::env::set_var("XDG_STATE_HOME", home.join(".local/state"));
        }

        if std::env::var("XDG_CONFIG_HOME").is_err() {
            std::env::set_var("XDG_CONFIG_HOME", home.join(".config"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.llm.is_none());
        assert_eq!(config.user.default_id, 1);
        assert_eq!(config.analysis.pattern_window_days, 30);
        assert_eq!(config.analysis.score_window_days, 7);
        assert_eq!(
            config.analysis.morning_notification_time,
            NaiveTime::from_hms_opt(8, 0, 0).unwrap()
        );
        assert!(config.storage.database_path.is_none());
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[user]
default_id = 42

[analysis]
pattern_window_days = 14
morning_notification_time = "07:30"

[llm]
provider = "ollama"
model = "llama3.2"

[logging]
level = "debug"

[storage]
database_path = "/tmp/taskpulse-test.db"
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.user.default_id, 42);
        assert_eq!(config.analysis.pattern_window_days, 14);
        assert_eq!(config.analysis.score_window_days, 7);
        assert_eq!(
            config.analysis.morning_notification_time,
            NaiveTime::from_hms_opt(7, 30, 0).unwrap()
        );

        let llm = config.llm.as_ref().unwrap();
        assert_eq!(llm.provider, LlmProvider::Ollama);
        assert_eq!(llm.model, "llama3.2");
        assert_eq!(llm.timeout_secs, 30);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(
            config.resolved_database_path(),
            PathBuf::from("/tmp/taskpulse-test.db")
        );
    }

    #[test]
    fn test_invalid_morning_time_is_rejected() {
        let toml = r#"
[analysis]
morning_notification_time = "breakfast"
"#;
        assert!(toml::from_str::<Config>(toml).is_err());
    }

    #[test]
    fn test_parse_clock_time() {
        assert_eq!(
            parse_clock_time("14:00"),
            NaiveTime::from_hms_opt(14, 0, 0)
        );
        assert_eq!(
            parse_clock_time("08:15:30"),
            NaiveTime::from_hms_opt(8, 15, 30)
        );
        assert!(parse_clock_time("25:00").is_none());
    }

    #[test]
    fn test_llm_provider_endpoints() {
        assert_eq!(
            LlmProvider::Ollama.default_endpoint(),
            "http://localhost:11434"
        );
        assert_eq!(
            LlmProvider::Claude.default_endpoint(),
            "https://api.anthropic.com"
        );
        assert_eq!(LlmProvider::Ollama.api_key_env(), None);
        assert_eq!(LlmProvider::OpenAI.api_key_env(), Some("OPENAI_API_KEY"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[logging]\nlevel = \"warn\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.logging.max_files, 5);

        std::fs::write(&path, "[logging\n").unwrap();
        assert!(matches!(Config::load_from(&path), Err(Error::Config(_))));
    }
}
