// Tari Faqqer - Free and Open Source Software Statement
//
// This project, faqqer, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/chat/mod.rs
// Version: 1.1.0
// Developer: Tari Faqqer Contributors
//
// This file is the module declaration for chat transports. It defines the
// two seams the rest of the crate talks to: reading channel history and
// sending messages. Implementations live in the submodules.
//
// Tree Location:
// - src/chat/mod.rs (chat transport traits and errors)
// - Submodules: telegram, export

pub mod export;
pub mod telegram;

use crate::core::types::{MediaRef, Message};
use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub use export::ExportHistory;
pub use telegram::TelegramBotClient;

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("HTTP request to chat API failed")]
    Http {
        #[from]
        source: reqwest::Error,
    },

    #[error("Chat API call {method} failed: {description}")]
    Api { method: String, description: String },

    #[error("History of '{channel}' cannot be read with this account")]
    HistoryUnavailable { channel: String },

    #[error("Channel '{channel}' not found")]
    ChannelNotFound { channel: String },

    #[error("Media '{locator}' is not available")]
    MediaUnavailable { locator: String },

    #[error("IO operation failed on {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode {what}: {message}")]
    Decode { what: String, message: String },
}

/// Destination of an outgoing message
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChatTarget {
    /// Numeric chat id (negative for groups and channels)
    Id(i64),
    /// Public username, with or without the leading '@'
    Username(String),
}

impl fmt::Display for ChatTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatTarget::Id(id) => write!(f, "{}", id),
            ChatTarget::Username(name) if name.starts_with('@') => write!(f, "{}", name),
            ChatTarget::Username(name) => write!(f, "@{}", name),
        }
    }
}

impl From<i64> for ChatTarget {
    fn from(id: i64) -> Self {
        ChatTarget::Id(id)
    }
}

/// Read access to channel history
#[async_trait]
pub trait MessageHistory: Send + Sync {
    /// Up to `limit` messages strictly older than `before` (newest first).
    /// `None` starts from the most recent message. An empty page means the
    /// beginning of the channel was reached.
    async fn fetch_page(
        &self,
        channel: &str,
        limit: usize,
        before: Option<i64>,
    ) -> Result<Vec<Message>, ChatError>;

    /// Raw bytes of an attachment
    async fn download_media(&self, channel: &str, media: &MediaRef) -> Result<Vec<u8>, ChatError>;
}

/// Outgoing messages
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send_message(
        &self,
        target: &ChatTarget,
        text: &str,
        reply_to: Option<i64>,
    ) -> Result<(), ChatError>;
}
