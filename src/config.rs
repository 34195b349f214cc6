// Tari Faqqer - Free and Open Source Software Statement
//
// This project, faqqer, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/config.rs
// Version: 1.3.1
// Developer: Tari Faqqer Contributors
//
// This file defines the immutable application configuration. It is read once
// at startup from an optional TOML file, secrets are overlaid from the
// environment, and the result is shared read-only with every component.
//
// Tree Location:
// - src/config.rs (application configuration)
// - Depends on: serde, toml, jobs::scheduler

use crate::jobs::scheduler::CronSchedule;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const ENV_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
pub const ENV_OPENAI_KEY: &str = "OPENAI_API_KEY";
pub const ENV_EXPORT_DIR: &str = "FAQQER_EXPORT_DIR";
pub const ENV_DISCORD_TOKEN: &str = "DISCORD_BOT_TOKEN";
pub const ENV_DISCORD_PUBLIC_KEY: &str = "DISCORD_PUBLIC_KEY";
pub const ENV_DISCORD_APPLICATION_ID: &str = "DISCORD_APPLICATION_ID";
pub const ENV_DISCORD_GUILD_ID: &str = "GUILD_ID";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path:?}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Missing required setting: {0}")]
    Missing(&'static str),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub bot_token: Option<String>,
    pub api_base: String,
    pub poll_timeout_secs: u64,
    pub workers: usize,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            api_base: "https://api.telegram.org".to_string(),
            poll_timeout_secs: 30,
            workers: 4,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub faq_model: String,
    pub faq_temperature: f32,
    pub faq_timeout_secs: u64,
    pub analysis_model: String,
    pub analysis_temperature: f32,
    pub analysis_timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            faq_model: "gpt-4o-2024-08-06".to_string(),
            faq_temperature: 0.0,
            faq_timeout_secs: 60,
            analysis_model: "gpt-4o".to_string(),
            analysis_temperature: 0.3,
            analysis_timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FaqConfig {
    pub faq_file: PathBuf,
    pub avoidance_file: Option<PathBuf>,
}

impl Default for FaqConfig {
    fn default() -> Self {
        Self {
            faq_file: PathBuf::from("faq_prompt.txt"),
            avoidance_file: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    pub mainnet_url: String,
    pub nextnet_url: String,
    pub request_timeout_secs: u64,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            mainnet_url: "https://textexplore.tari.com/?json".to_string(),
            nextnet_url: "https://textexplore-nextnet.tari.com/?json".to_string(),
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JobsConfig {
    pub announcement_groups: Vec<i64>,
    pub block_height_cron: String,
    pub hash_power_cron: String,
    pub nextnet_group: Option<i64>,
    pub nextnet_cron: String,
    pub customer_analysis_cron: String,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            announcement_groups: vec![-2165121610, -1002281038272, -1188782007],
            block_height_cron: "0 */4 * * *".to_string(),
            hash_power_cron: "0 */3 * * *".to_string(),
            nextnet_group: None,
            nextnet_cron: "*/15 * * * *".to_string(),
            customer_analysis_cron: "0 */3 * * *".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub channels: Vec<String>,
    pub hours: u64,
    pub customer_service_group: i64,
    pub work_dir: PathBuf,
    pub max_message_length: usize,
    pub max_example_length: usize,
    pub max_tokens: usize,
    pub chars_per_token: usize,
    pub part_delay_ms: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            channels: vec!["tariproject".to_string(), "OrderOfSoon".to_string()],
            hours: 3,
            customer_service_group: -1002281038272,
            work_dir: PathBuf::from("temp_analysis"),
            max_message_length: 4000,
            max_example_length: 80,
            max_tokens: 25000,
            chars_per_token: 4,
            part_delay_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub export_dir: Option<PathBuf>,
    pub page_size: usize,
    pub page_delay_ms: u64,
    pub media_dir: PathBuf,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            export_dir: None,
            page_size: 100,
            page_delay_ms: 1000,
            media_dir: PathBuf::from("media_files"),
        }
    }
}

/// Discord interactions endpoint; it only runs when `public_key` is set
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DiscordConfig {
    /// Application public key, hex encoded
    pub public_key: Option<String>,
    pub application_id: Option<String>,
    /// Only needed to register the slash commands
    pub bot_token: Option<String>,
    pub guild_id: Option<String>,
    pub listen_addr: String,
    pub api_base: String,
    pub request_timeout_secs: u64,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            public_key: None,
            application_id: None,
            bot_token: None,
            guild_id: None,
            listen_addr: "0.0.0.0:8080".to_string(),
            api_base: "https://discord.com/api/v10".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl DiscordConfig {
    pub fn enabled(&self) -> bool {
        self.public_key.is_some()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<PathBuf>,
    pub config_file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            config_file: None,
        }
    }
}

/// Complete application configuration, immutable after `load`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub telegram: TelegramConfig,
    pub openai: OpenAiConfig,
    pub faq: FaqConfig,
    pub explorer: ExplorerConfig,
    pub jobs: JobsConfig,
    pub analysis: AnalysisConfig,
    pub history: HistoryConfig,
    pub discord: DiscordConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load from `path` (defaults when `None`) and overlay secrets from the environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Environment values win over the file; empty values are ignored
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(token) = non_empty(ENV_BOT_TOKEN) {
            self.telegram.bot_token = Some(token);
        }
        if let Some(key) = non_empty(ENV_OPENAI_KEY) {
            self.openai.api_key = Some(key);
        }
        if let Some(dir) = non_empty(ENV_EXPORT_DIR) {
            self.history.export_dir = Some(PathBuf::from(dir));
        }
        if let Some(token) = non_empty(ENV_DISCORD_TOKEN) {
            self.discord.bot_token = Some(token);
        }
        if let Some(key) = non_empty(ENV_DISCORD_PUBLIC_KEY) {
            self.discord.public_key = Some(key);
        }
        if let Some(id) = non_empty(ENV_DISCORD_APPLICATION_ID) {
            self.discord.application_id = Some(id);
        }
        if let Some(id) = non_empty(ENV_DISCORD_GUILD_ID).filter(|id| id != "0") {
            self.discord.guild_id = Some(id);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history.page_size == 0 {
            return Err(ConfigError::Invalid("history.page_size must be greater than 0".into()));
        }
        if self.analysis.chars_per_token == 0 {
            return Err(ConfigError::Invalid(
                "analysis.chars_per_token must be greater than 0".into(),
            ));
        }
        if self.analysis.max_message_length == 0 {
            return Err(ConfigError::Invalid(
                "analysis.max_message_length must be greater than 0".into(),
            ));
        }
        if self.telegram.workers == 0 {
            return Err(ConfigError::Invalid("telegram.workers must be greater than 0".into()));
        }
        if let Some(key) = &self.discord.public_key {
            if key.len() != 64 || hex::decode(key).is_err() {
                return Err(ConfigError::Invalid(
                    "discord.public_key must be 64 hex characters".into(),
                ));
            }
            if self.discord.application_id.is_none() {
                return Err(ConfigError::Missing(ENV_DISCORD_APPLICATION_ID));
            }
        }
        for (name, expr) in [
            ("jobs.block_height_cron", &self.jobs.block_height_cron),
            ("jobs.hash_power_cron", &self.jobs.hash_power_cron),
            ("jobs.nextnet_cron", &self.jobs.nextnet_cron),
            ("jobs.customer_analysis_cron", &self.jobs.customer_analysis_cron),
        ] {
            CronSchedule::parse(expr)
                .map_err(|e| ConfigError::Invalid(format!("{}: {}", name, e)))?;
        }
        Ok(())
    }

    pub fn bot_token(&self) -> Result<&str, ConfigError> {
        self.telegram
            .bot_token
            .as_deref()
            .ok_or(ConfigError::Missing(ENV_BOT_TOKEN))
    }

    pub fn openai_key(&self) -> Result<&str, ConfigError> {
        self.openai
            .api_key
            .as_deref()
            .ok_or(ConfigError::Missing(ENV_OPENAI_KEY))
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.history.page_delay_ms)
    }

    /// Startup warning when scheduled analyses cannot read their channels
    pub fn analysis_history_warning(&self) -> Option<String> {
        if self.history.export_dir.is_some() || self.analysis.channels.is_empty() {
            return None;
        }
        Some(format!(
            "Support analysis is scheduled ({}) for {} but history.export_dir is not set; \
             bot accounts cannot read channel history, so each run will report \"Analysis Unavailable\"",
            self.jobs.customer_analysis_cron,
            self.analysis.channels.join(", ")
        ))
    }
}


// Changelog:
// - v1.3.1 (2026-10-18): Startup warning for analyses without a history export.
// - v1.3.0 (2026-10-18): Added the [discord] section for the slash-command endpoint.
// - v1.2.0 (2026-09-30): Added the [history] section for export-backed archives.
// - v1.1.0 (2026-08-12): Cron strings are validated at load time.
// - v1.0.0 (2026-07-01): Replaced ad-hoc environment reads with AppConfig.
