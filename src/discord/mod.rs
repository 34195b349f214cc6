// Tari Faqqer - Free and Open Source Software Statement
//
// This project, faqqer, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/discord/mod.rs
// Version: 1.0.0
// Developer: Tari Faqqer Contributors
//
// This file is the Discord front end of the FAQ assistant. Discord delivers
// the /faq, /ask and /faqqer slash commands to an HTTPS interactions
// endpoint; every request is signed with the application's Ed25519 key.
//
// Tree Location:
// - src/discord/mod.rs (errors and interaction payloads)
// - src/discord/client.rs (Discord REST API client)
// - src/discord/interactions.rs (signature check, handler and HTTP endpoint)
// - Depends on: ed25519-dalek, axum, reqwest, llm

pub mod client;
pub mod interactions;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

pub use client::{DiscordApiClient, FollowupSender};
pub use interactions::{InteractionHandler, InteractionReply, InteractionVerifier, router, serve};

/// Slash commands answered from the FAQ, as in the Telegram bot
pub const FAQ_COMMANDS: [&str; 3] = ["faq", "ask", "faqqer"];
pub const QUESTION_OPTION: &str = "question";

/// Discord rejects message content above this many characters
pub const MAX_CONTENT_CHARS: usize = 2000;

#[derive(Error, Debug)]
pub enum DiscordError {
    #[error("Invalid application public key")]
    InvalidPublicKey,

    #[error("Missing signature headers")]
    MissingSignature,

    #[error("Request signature did not verify")]
    BadSignature,

    #[error("Malformed interaction payload")]
    Payload {
        #[source]
        source: serde_json::Error,
    },

    #[error("Unsupported interaction type {0}")]
    UnsupportedType(u8),

    #[error("HTTP request to Discord failed")]
    Http {
        #[from]
        source: reqwest::Error,
    },

    #[error("Discord API returned {status} for {action}: {body}")]
    Api {
        action: &'static str,
        status: u16,
        body: String,
    },

    #[error("Failed to bind interactions endpoint on {addr}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Interactions endpoint stopped")]
    Serve {
        #[source]
        source: std::io::Error,
    },
}

impl DiscordError {
    /// Request authentication failures are answered with 401
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, DiscordError::MissingSignature | DiscordError::BadSignature)
    }
}

pub mod interaction_type {
    pub const PING: u8 = 1;
    pub const APPLICATION_COMMAND: u8 = 2;
}

/// The subset of an incoming interaction that the bot reads
#[derive(Debug, Clone, Deserialize)]
pub struct Interaction {
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default)]
    pub token: String,
    pub data: Option<CommandData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommandData {
    pub name: String,
    #[serde(default)]
    pub options: Vec<CommandOption>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommandOption {
    pub name: String,
    #[serde(default)]
    pub value: Value,
}

impl CommandData {
    /// Trimmed text of a string option, if present and non-empty
    pub fn string_option(&self, name: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|o| o.name == name)
            .and_then(|o| o.value.as_str())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }
}

/// Cut `text` to what Discord accepts as message content
pub fn fit_content(text: &str) -> String {
    if text.chars().count() <= MAX_CONTENT_CHARS {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(MAX_CONTENT_CHARS - 3).collect();
    cut.push_str("...");
    cut
}


// Changelog:
// - v1.0.0 (2026-10-18): Discord slash commands over the interactions endpoint.
