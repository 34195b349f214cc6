// Tari Faqqer - Free and Open Source Software Statement
//
// This project, faqqer, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/chat/export.rs
// Version: 1.0.0
// Developer: Tari Faqqer Contributors
//
// This file serves channel history from Telegram Desktop JSON exports. Each
// channel lives in `<root>/<channel>/result.json`; attachments are files
// relative to that directory. The export is loaded once per channel and then
// paged newest-first like a live transport.
//
// Tree Location:
// - src/chat/export.rs (export-backed history transport)
// - Depends on: serde_json, chrono, tokio

use super::{ChatError, MessageHistory};
use crate::core::types::{MediaRef, Message};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use log::{debug, info, warn};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

const LOG_TARGET: &str = "tari::faqqer::chat::export";
const EXPORT_FILE: &str = "result.json";

#[derive(Debug, Deserialize)]
struct ExportFile {
    #[serde(default)]
    messages: Vec<ExportMessage>,
}

#[derive(Debug, Deserialize)]
struct ExportMessage {
    id: i64,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    date_unixtime: Option<String>,
    #[serde(default)]
    from: Option<String>,
    #[serde(default)]
    reply_to_message_id: Option<i64>,
    #[serde(default)]
    text: ExportText,
    #[serde(default)]
    photo: Option<String>,
    #[serde(default)]
    file: Option<String>,
    #[serde(default)]
    file_name: Option<String>,
}

/// Message text is a plain string, or a list of plain strings and entities
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ExportText {
    Plain(String),
    Parts(Vec<ExportTextPart>),
}

impl Default for ExportText {
    fn default() -> Self {
        ExportText::Plain(String::new())
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ExportTextPart {
    Plain(String),
    Entity { text: String },
}

impl ExportText {
    fn flatten(self) -> String {
        match self {
            ExportText::Plain(text) => text,
            ExportText::Parts(parts) => parts
                .into_iter()
                .map(|part| match part {
                    ExportTextPart::Plain(text) => text,
                    ExportTextPart::Entity { text } => text,
                })
                .collect(),
        }
    }
}

impl ExportMessage {
    fn timestamp(&self) -> Option<DateTime<Utc>> {
        if let Some(secs) = self.date_unixtime.as_deref().and_then(|s| s.parse::<i64>().ok()) {
            return DateTime::from_timestamp(secs, 0);
        }
        // Older exports only carry a naive local date; it is read as UTC
        self.date
            .as_deref()
            .and_then(|d| NaiveDateTime::parse_from_str(d, "%Y-%m-%dT%H:%M:%S").ok())
            .map(|naive| naive.and_utc())
    }

    fn into_message(self) -> Option<Message> {
        let timestamp = self.timestamp()?;
        let sender = if self.kind == "service" {
            None
        } else {
            self.from.clone()
        };
        let media = self.photo.clone().or_else(|| self.file.clone()).map(|locator| {
            let file_name = self.file_name.clone().or_else(|| {
                Path::new(&locator)
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
            });
            MediaRef { file_name, locator }
        });

        let mut message = Message::new(
            self.id,
            timestamp,
            sender,
            Some(self.text.flatten()),
            self.reply_to_message_id,
        );
        if let Some(media) = media {
            message = message.with_media(media);
        }
        Some(message)
    }
}

/// History transport over a directory of Telegram Desktop exports
pub struct ExportHistory {
    root: PathBuf,
    cache: Mutex<HashMap<String, Arc<Vec<Message>>>>,
}

impl ExportHistory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    fn channel_dir(&self, channel: &str) -> PathBuf {
        self.root.join(channel.trim_start_matches('@'))
    }

    /// Parse one export document into messages sorted newest-first
    pub fn parse_export(contents: &str) -> Result<Vec<Message>, ChatError> {
        let export: ExportFile = serde_json::from_str(contents).map_err(|e| ChatError::Decode {
            what: EXPORT_FILE.to_string(),
            message: e.to_string(),
        })?;

        let total = export.messages.len();
        let mut messages: Vec<Message> = export
            .messages
            .into_iter()
            .filter_map(ExportMessage::into_message)
            .collect();
        if messages.len() < total {
            warn!(
                target: LOG_TARGET,
                "Skipped {} export entries without a readable date",
                total - messages.len()
            );
        }
        messages.sort_by(|a, b| b.id().cmp(&a.id()));
        Ok(messages)
    }

    async fn load(&self, channel: &str) -> Result<Arc<Vec<Message>>, ChatError> {
        let key = channel.trim_start_matches('@');
        let mut cache = self.cache.lock().await;
        if let Some(messages) = cache.get(key) {
            return Ok(Arc::clone(messages));
        }

        let path = self.channel_dir(channel).join(EXPORT_FILE);
        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ChatError::ChannelNotFound {
                    channel: channel.to_string(),
                });
            }
            Err(e) => return Err(ChatError::Io { path, source: e }),
        };

        let messages = Arc::new(Self::parse_export(&contents)?);
        info!(
            target: LOG_TARGET,
            "Loaded {} messages for '{}' from {:?}",
            messages.len(),
            channel,
            path
        );
        cache.insert(key.to_string(), Arc::clone(&messages));
        Ok(messages)
    }
}

#[async_trait]
impl MessageHistory for ExportHistory {
    async fn fetch_page(
        &self,
        channel: &str,
        limit: usize,
        before: Option<i64>,
    ) -> Result<Vec<Message>, ChatError> {
        let messages = self.load(channel).await?;
        let page: Vec<Message> = messages
            .iter()
            .filter(|m| before.is_none_or(|cursor| m.id() < cursor))
            .take(limit)
            .cloned()
            .collect();
        debug!(
            target: LOG_TARGET,
            "Page of {} messages from '{}' before {:?}",
            page.len(),
            channel,
            before
        );
        Ok(page)
    }

    async fn download_media(&self, channel: &str, media: &MediaRef) -> Result<Vec<u8>, ChatError> {
        let relative = Path::new(&media.locator);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(ChatError::MediaUnavailable {
                locator: media.locator.clone(),
            });
        }

        let path = self.channel_dir(channel).join(relative);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ChatError::MediaUnavailable {
                locator: media.locator.clone(),
            }),
            Err(e) => Err(ChatError::Io { path, source: e }),
        }
    }
}
