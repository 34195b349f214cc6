// Tari Faqqer - Free and Open Source Software Statement
//
// This project, faqqer, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/chat/telegram.rs
// Version: 1.1.0
// Developer: Tari Faqqer Contributors
//
// This file implements the Telegram Bot API client used for posting
// announcements and for receiving /faq commands through long polling.
// Bot accounts cannot page through channel history, so history requests
// fail with ChatError::HistoryUnavailable.
//
// Tree Location:
// - src/chat/telegram.rs (Bot API client)
// - Depends on: reqwest, serde, chat

use super::{ChatError, ChatTarget, MessageHistory, MessageSender};
use crate::core::types::{MediaRef, Message};
use async_trait::async_trait;
use log::{debug, warn};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;

const LOG_TARGET: &str = "tari::faqqer::chat::telegram";

/// Envelope of every Bot API response
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BotUser {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BotChat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IncomingMessage {
    pub message_id: i64,
    pub chat: BotChat,
    pub from: Option<BotUser>,
    pub date: i64,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<IncomingMessage>,
}

/// Telegram Bot API client
#[derive(Clone)]
pub struct TelegramBotClient {
    http: reqwest::Client,
    api_base: String,
    token: String,
}

impl TelegramBotClient {
    /// `request_timeout` must exceed the long-poll timeout used with `get_updates`
    pub fn new(api_base: &str, token: &str, request_timeout: Duration) -> Result<Self, ChatError> {
        let http = reqwest::Client::builder().timeout(request_timeout).build()?;
        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, body: Value) -> Result<T, ChatError> {
        // Strip the URL from transport errors, it carries the bot token
        let response = self
            .http
            .post(self.method_url(method))
            .json(&body)
            .send()
            .await
            .map_err(|e| e.without_url())?;

        let envelope: ApiResponse<T> = response.json().await.map_err(|e| e.without_url())?;
        match (envelope.ok, envelope.result) {
            (true, Some(result)) => Ok(result),
            (_, _) => Err(ChatError::Api {
                method: method.to_string(),
                description: envelope
                    .description
                    .unwrap_or_else(|| "no description".to_string()),
            }),
        }
    }

    /// Verify the token and return the bot's own account
    pub async fn authenticate(&self) -> Result<BotUser, ChatError> {
        let me: BotUser = self.call("getMe", json!({})).await?;
        debug!(target: LOG_TARGET, "Authenticated as bot {:?} ({})", me.username, me.id);
        Ok(me)
    }

    /// Long-poll for updates newer than `offset`
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, ChatError> {
        let mut body = json!({
            "timeout": timeout_secs,
            "allowed_updates": ["message"],
        });
        if let Some(offset) = offset {
            body["offset"] = json!(offset);
        }
        self.call("getUpdates", body).await
    }
}

#[async_trait]
impl MessageSender for TelegramBotClient {
    async fn send_message(
        &self,
        target: &ChatTarget,
        text: &str,
        reply_to: Option<i64>,
    ) -> Result<(), ChatError> {
        let mut body = json!({
            "chat_id": target.to_string(),
            "text": text,
            "disable_web_page_preview": true,
        });
        if let Some(message_id) = reply_to {
            body["reply_parameters"] = json!({
                "message_id": message_id,
                "allow_sending_without_reply": true,
            });
        }
        let _sent: Value = self.call("sendMessage", body).await?;
        debug!(target: LOG_TARGET, "Sent {} chars to {}", text.chars().count(), target);
        Ok(())
    }
}

#[async_trait]
impl MessageHistory for TelegramBotClient {
    async fn fetch_page(
        &self,
        channel: &str,
        _limit: usize,
        _before: Option<i64>,
    ) -> Result<Vec<Message>, ChatError> {
        warn!(target: LOG_TARGET, "Bot accounts cannot read the history of '{}'", channel);
        Err(ChatError::HistoryUnavailable {
            channel: channel.to_string(),
        })
    }

    async fn download_media(&self, _channel: &str, media: &MediaRef) -> Result<Vec<u8>, ChatError> {
        Err(ChatError::MediaUnavailable {
            locator: media.locator.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_decoding() {
        let raw = r#"{
            "ok": true,
            "result": [{
                "update_id": 901,
                "message": {
                    "message_id": 17,
                    "date": 1750000000,
                    "chat": {"id": -1002281038272, "type": "supergroup"},
                    "from": {"id": 42, "is_bot": false, "username": "miner"},
                    "text": "/faq what is tXTM?"
                }
            }]
        }"#;
        let envelope: ApiResponse<Vec<Update>> = serde_json::from_str(raw).unwrap();
        let updates = envelope.result.unwrap();
        let message = updates[0].message.as_ref().unwrap();
        assert_eq!(updates[0].update_id, 901);
        assert_eq!(message.chat.id, -1002281038272);
        assert_eq!(message.text.as_deref(), Some("/faq what is tXTM?"));
    }

    #[test]
    fn test_error_envelope_decoding() {
        let raw = r#"{"ok": false, "error_code": 401, "description": "Unauthorized"}"#;
        let envelope: ApiResponse<BotUser> = serde_json::from_str(raw).unwrap();
        assert!(!envelope.ok);
        assert_eq!(envelope.description.as_deref(), Some("Unauthorized"));
    }

    #[test]
    fn test_method_url_trims_base() {
        let client =
            TelegramBotClient::new("https://api.telegram.org/", "123:abc", Duration::from_secs(5))
                .unwrap();
        assert_eq!(
            client.method_url("getMe"),
            "https://api.telegram.org/bot123:abc/getMe"
        );
    }
}
