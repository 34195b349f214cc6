// Tari Faqqer - Free and Open Source Software Statement
//
// This project, faqqer, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/discord/client.rs
// Version: 1.0.0
// Developer: Tari Faqqer Contributors
//
// This file implements the Discord REST calls: registering the slash
// commands for one guild, and editing the deferred reply once the FAQ
// answer is ready. Interaction tokens authorize the edit, so only command
// registration needs the bot token.
//
// Tree Location:
// - src/discord/client.rs (Discord REST API client)
// - Depends on: reqwest, serde_json

use super::{DiscordError, FAQ_COMMANDS, QUESTION_OPTION, fit_content};
use async_trait::async_trait;
use log::{debug, info};
use serde_json::{Value, json};
use std::time::Duration;

const LOG_TARGET: &str = "tari::faqqer::discord::client";

/// Option type 3 is a string in the application command schema
const STRING_OPTION: u8 = 3;

/// Delivers the answer to a deferred interaction
#[async_trait]
pub trait FollowupSender: Send + Sync {
    async fn edit_original(&self, interaction_token: &str, content: &str) -> Result<(), DiscordError>;
}

#[derive(Clone)]
pub struct DiscordApiClient {
    http: reqwest::Client,
    api_base: String,
    application_id: String,
    bot_token: Option<String>,
}

impl DiscordApiClient {
    pub fn new(
        api_base: &str,
        application_id: &str,
        bot_token: Option<&str>,
        request_timeout: Duration,
    ) -> Result<Self, DiscordError> {
        let http = reqwest::Client::builder().timeout(request_timeout).build()?;
        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            application_id: application_id.to_string(),
            bot_token: bot_token.map(str::to_string),
        })
    }

    /// Body of the bulk-overwrite request for the FAQ commands
    pub fn command_definitions() -> Value {
        let commands: Vec<Value> = FAQ_COMMANDS
            .iter()
            .map(|name| {
                let description = if *name == "faq" {
                    "Ask a FAQ question.".to_string()
                } else {
                    "Alias for FAQ.".to_string()
                };
                json!({
                    "name": name,
                    "description": description,
                    "type": 1,
                    "options": [{
                        "name": QUESTION_OPTION,
                        "description": "Your question",
                        "type": STRING_OPTION,
                        "required": true,
                    }],
                })
            })
            .collect();
        Value::Array(commands)
    }

    /// Replace the guild's commands with /faq, /ask and /faqqer
    pub async fn register_guild_commands(&self, guild_id: &str) -> Result<(), DiscordError> {
        let Some(token) = &self.bot_token else {
            return Err(DiscordError::Api {
                action: "register commands",
                status: 401,
                body: "no bot token configured".to_string(),
            });
        };
        let url = format!(
            "{}/applications/{}/guilds/{}/commands",
            self.api_base, self.application_id, guild_id
        );
        let response = self
            .http
            .put(url)
            .header(reqwest::header::AUTHORIZATION, format!("Bot {}", token))
            .json(&Self::command_definitions())
            .send()
            .await?;
        Self::check(response, "register commands").await?;
        info!(
            target: LOG_TARGET,
            "Registered {} slash commands for guild {}",
            FAQ_COMMANDS.len(),
            guild_id
        );
        Ok(())
    }

    async fn check(response: reqwest::Response, action: &'static str) -> Result<(), DiscordError> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(DiscordError::Api {
            action,
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl FollowupSender for DiscordApiClient {
    async fn edit_original(&self, interaction_token: &str, content: &str) -> Result<(), DiscordError> {
        let url = format!(
            "{}/webhooks/{}/{}/messages/@original",
            self.api_base, self.application_id, interaction_token
        );
        // The URL carries the interaction token
        let response = self
            .http
            .patch(url)
            .json(&json!({ "content": fit_content(content) }))
            .send()
            .await
            .map_err(|e| e.without_url())?;
        Self::check(response, "edit reply").await?;
        debug!(target: LOG_TARGET, "Edited deferred reply ({} chars)", content.chars().count());
        Ok(())
    }
}


// Changelog:
// - v1.0.0 (2026-10-18): Command registration and deferred reply edits.
