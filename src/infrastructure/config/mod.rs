//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use crate::application::errors::ConfigError;

/// Bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub bot: BotConfig,
    pub classes: ClassesConfig,
    pub adapters: AdaptersConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct BotConfig {
    pub name: String,
    pub prefix: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ClassesConfig {
    /// Channel where everything but purging must be run
    pub manage_channel: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct AdaptersConfig {
    pub discord: Option<DiscordConfig>,
    pub console: Option<ConsoleConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct DiscordConfig {
    pub enabled: bool,
    pub token: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConsoleConfig {
    pub enabled: bool,
    /// Simulated user name in console mode
    pub user: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bot: BotConfig {
                name: "classroom-bot".to_string(),
                prefix: "!".to_string(),
            },
            classes: ClassesConfig {
                manage_channel: "manage-classes".to_string(),
            },
            adapters: AdaptersConfig {
                discord: Some(DiscordConfig {
                    enabled: false,
                    token: None,
                }),
                console: Some(ConsoleConfig {
                    enabled: true,
                    user: "student".to_string(),
                }),
            },
        }
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self)
            .map_err(|e| ConfigError::Parse(format!("Failed to serialize config: {}", e)))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bot.prefix.is_empty() {
            return Err(ConfigError::MissingField("bot.prefix".to_string()));
        }
        if self.bot.prefix.chars().any(char::is_whitespace) {
            return Err(ConfigError::InvalidValue(format!("bot.prefix {:?} contains whitespace", self.bot.prefix)));
        }
        if self.classes.manage_channel.is_empty() {
            return Err(ConfigError::MissingField("classes.manage-channel".to_string()));
        }
        Ok(())
    }

    /// Apply environment overrides on top of this config
    pub fn with_env(mut self) -> Self {
        if let Ok(token) = std::env::var("DISCORD_TOKEN") {
            if !token.is_empty() {
                self.set_token(token);
            }
        }

        if let Ok(prefix) = std::env::var("BOT_PREFIX") {
            self.bot.prefix = prefix;
        }

        if let Ok(channel) = std::env::var("MANAGE_CHANNEL") {
            self.classes.manage_channel = channel;
        }

        self
    }

    pub fn load_env() -> Self {
        // Load from environment variables
        Config::default().with_env()
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        let discord = self.adapters.discord.get_or_insert(DiscordConfig {
            enabled: true,
            token: None,
        });
        discord.token = Some(token.into());
        discord.enabled = true;
    }

    /// Token of an enabled Discord adapter, if any
    pub fn discord_token(&self) -> Option<&str> {
        self.adapters.discord
            .as_ref()
            .filter(|d| d.enabled)
            .and_then(|d| d.token.as_deref())
    }

    /// Whether to fall back to the console when there is no Discord token
    pub fn console_enabled(&self) -> bool {
        self.adapters.console.as_ref().map(|c| c.enabled).unwrap_or(false)
    }

    pub fn console_user(&self) -> &str {
        self.adapters.console
            .as_ref()
            .map(|c| c.user.as_str())
            .unwrap_or("student")
    }
}
