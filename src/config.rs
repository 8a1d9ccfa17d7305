//! Configuration for the relay.
//!
//! Read once at startup from a TOML file, then overridden by environment
//! variables.  A missing file is fine as long as the environment supplies
//! the required values:
//!
//! ```toml
//! [telegram]
//! bot_token = "123456:ABC-DEF"
//! chat_id = "-1001234567890"
//!
//! [feed]
//! url = "https://example.com/forum.xml"
//!
//! [store]
//! path = "sent_posts.json"
//!
//! [poll]
//! interval_secs = 60
//!
//! [logging]
//! level = "info"
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{RelayError, Result};

/// Env var naming the config file.
pub const CONFIG_PATH_ENV: &str = "RSS_RELAY_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Telegram destination.
#[derive(Clone, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: String,
    #[serde(default)]
    pub chat_id: String,
    /// Bot API base URL, overridable for self-hosted API servers.
    #[serde(default = "default_api_root")]
    pub api_root: String,
}

fn default_api_root() -> String {
    "https://api.telegram.org".to_string()
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            chat_id: String::new(),
            api_root: default_api_root(),
        }
    }
}

impl fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .field("api_root", &self.api_root)
            .finish()
    }
}

/// The feed to poll.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("rss-relay/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Where sent ids are persisted.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

fn default_store_path() -> PathBuf {
    PathBuf::from("sent_posts.json")
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

/// Poll cadence.
#[derive(Debug, Clone, Deserialize)]
pub struct PollConfig {
    #[serde(default = "default_interval")]
    pub interval_secs: u64,
}

fn default_interval() -> u64 {
    60
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
        }
    }
}

impl PollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `trace`, `debug`, `info`, `warn` or `error`.
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Complete relay configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub poll: PollConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Path of the config file: `$RSS_RELAY_CONFIG` or `config.toml`.
    pub fn default_path() -> PathBuf {
        std::env::var(CONFIG_PATH_ENV)
            .ok()
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| RelayError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::parse(&content)
    }

    /// Load the file if it exists, apply environment overrides, validate.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    fn load_with<P: AsRef<Path>>(path: P, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            Self::load(path)?
        } else {
            Self::default()
        };
        config.apply_env_overrides(lookup);
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| RelayError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides.  Empty values are ignored.
    ///
    /// Supported variables:
    /// - `TELEGRAM_BOT_TOKEN`
    /// - `TELEGRAM_CHAT_ID`
    /// - `RSS_RELAY_FEED_URL`
    /// - `RSS_RELAY_STORE_PATH`
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(token) = get("TELEGRAM_BOT_TOKEN") {
            self.telegram.bot_token = token;
        }
        if let Some(chat_id) = get("TELEGRAM_CHAT_ID") {
            self.telegram.chat_id = chat_id;
        }
        if let Some(url) = get("RSS_RELAY_FEED_URL") {
            self.feed.url = url;
        }
        if let Some(path) = get("RSS_RELAY_STORE_PATH") {
            self.store.path = PathBuf::from(path);
        }
    }

    /// Reject configurations the relay cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.telegram.bot_token.is_empty() {
            return Err(RelayError::Config(
                "telegram.bot_token is not set (config.toml or TELEGRAM_BOT_TOKEN)".to_string(),
            ));
        }
        if self.telegram.chat_id.is_empty() {
            return Err(RelayError::Config(
                "telegram.chat_id is not set (config.toml or TELEGRAM_CHAT_ID)".to_string(),
            ));
        }
        if self.feed.url.is_empty() {
            return Err(RelayError::Config(
                "feed.url is not set (config.toml or RSS_RELAY_FEED_URL)".to_string(),
            ));
        }

        let url = reqwest::Url::parse(&self.feed.url)
            .map_err(|e| RelayError::Config(format!("feed.url {:?}: {e}", self.feed.url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(RelayError::Config(format!(
                "feed.url must be http or https, got {}",
                url.scheme()
            )));
        }

        if self.poll.interval_secs == 0 {
            return Err(RelayError::Config(
                "poll.interval_secs must be greater than 0".to_string(),
            ));
        }
        if self.feed.timeout_secs == 0 {
            return Err(RelayError::Config(
                "feed.timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
