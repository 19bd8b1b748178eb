//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use crate::application::errors::ConfigError;
use crate::application::messaging::gatekeeper::{DEFAULT_MARKER, DEFAULT_MENU_KEYWORDS};
use crate::infrastructure::llm::LLMConfig;

/// Bot configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    pub bot: BotConfig,
    pub server: ServerConfig,
    pub line: LineConfig,
    pub weather: WeatherConfig,
    pub llm: LLMConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct BotConfig {
    pub name: String,
    /// Prefix that addresses the bot in a group chat
    pub marker: char,
    /// Bare phrases answered without the marker (rich-menu buttons)
    pub menu_keywords: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub webhook_path: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct LineConfig {
    pub channel_secret: Option<String>,
    pub channel_access_token: Option<String>,
    pub api_base: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct WeatherConfig {
    pub base_url: String,
    pub lang: String,
    pub format: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: "tczc-bot".to_string(),
            marker: DEFAULT_MARKER,
            menu_keywords: DEFAULT_MENU_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            webhook_path: "/callback".to_string(),
        }
    }
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            channel_secret: None,
            channel_access_token: None,
            api_base: "https://api.line.me".to_string(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: "https://wttr.in".to_string(),
            lang: "zh-tw".to_string(),
            format: "3".to_string(),
        }
    }
}

impl Config {
    /// Load a YAML file, then apply environment overrides
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        let mut config: Config = serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))?;
        config.apply_env();
        Ok(config)
    }

    pub fn load_env() -> Self {
        let mut config = Config::default();
        config.apply_env();
        config
    }

    fn apply_env(&mut self) {
        if let Ok(secret) = std::env::var("CHANNEL_SECRET") {
            self.line.channel_secret = Some(secret);
        }

        if let Ok(token) = std::env::var("CHANNEL_ACCESS_TOKEN") {
            self.line.channel_access_token = Some(token);
        }

        if let Ok(port) = std::env::var("PORT") {
            match port.parse() {
                Ok(p) => self.server.port = p,
                Err(_) => tracing::warn!("Ignoring invalid PORT value: {}", port),
            }
        }

        self.llm.apply_env();
    }

    /// Check that everything the webhook server needs is present
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.line.channel_secret.as_deref().map_or(true, str::is_empty) {
            return Err(ConfigError::MissingField("line.channel-secret (CHANNEL_SECRET)".to_string()));
        }
        if self.line.channel_access_token.as_deref().map_or(true, str::is_empty) {
            return Err(ConfigError::MissingField(
                "line.channel-access-token (CHANNEL_ACCESS_TOKEN)".to_string(),
            ));
        }
        if !self.server.webhook_path.starts_with('/') {
            return Err(ConfigError::InvalidValue(format!(
                "server.webhook-path must start with '/': {}",
                self.server.webhook_path
            )));
        }
        Ok(())
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self)
            .map_err(|e| ConfigError::Parse(format!("Failed to serialize config: {}", e)))
    }
}
