// Tari Faqqer - Free and Open Source Software Statement
//
// This project, faqqer, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/llm/faq.rs
// Version: 1.2.0
// Developer: Tari Faqqer Contributors
//
// This file answers user questions from the FAQ document. The FAQ (and the
// optional list of topics to avoid) is the system prompt; the question goes
// in the user prompt with a request for a {"answer": ...} object. The reply
// is decoded strictly and every failure maps to a fixed user-facing text.
//
// Tree Location:
// - src/llm/faq.rs (FAQ responder)
// - Depends on: llm::client, serde_json

use super::LlmError;
use super::client::{CompletionClient, CompletionRequest};
use crate::config::AppConfig;
use log::{error, info, warn};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

const LOG_TARGET: &str = "tari::faqqer::llm::faq";

pub const DECODE_FALLBACK: &str = "There was an error processing your request.";
pub const SERVICE_FALLBACK: &str =
    "Sorry, I encountered an error while trying to answer your question. Please try again.";
pub const NO_ANSWER: &str = "No answer was found.";

#[derive(Debug, Deserialize)]
struct FaqAnswer {
    answer: String,
}

pub struct FaqResponder {
    client: Arc<dyn CompletionClient>,
    system_prompt: String,
    model: String,
    temperature: f32,
    timeout: Duration,
    avoid_topics: bool,
}

impl FaqResponder {
    pub fn new(
        client: Arc<dyn CompletionClient>,
        faq_text: &str,
        avoidance_text: Option<&str>,
        config: &AppConfig,
    ) -> Self {
        Self {
            client,
            system_prompt: Self::system_prompt(faq_text, avoidance_text),
            model: config.openai.faq_model.clone(),
            temperature: config.openai.faq_temperature,
            timeout: Duration::from_secs(config.openai.faq_timeout_secs),
            avoid_topics: avoidance_text.is_some(),
        }
    }

    /// Read the FAQ (and avoidance list, when configured) from disk
    pub async fn load(client: Arc<dyn CompletionClient>, config: &AppConfig) -> Result<Self, LlmError> {
        let faq_text = read_prompt(&config.faq.faq_file).await?;
        let avoidance_text = match &config.faq.avoidance_file {
            Some(path) => Some(read_prompt(path).await?),
            None => None,
        };
        info!(
            target: LOG_TARGET,
            "Loaded FAQ of {} chars from {:?}",
            faq_text.chars().count(),
            config.faq.faq_file
        );
        Ok(Self::new(client, &faq_text, avoidance_text.as_deref(), config))
    }

    pub fn system_prompt(faq_text: &str, avoidance_text: Option<&str>) -> String {
        match avoidance_text {
            Some(avoid) => format!(
                "{}\n\nDo not talk about the following topics:\n{}\n\n\
                 If you do not know the answer with certainty, tell the user that their question \
                 will be forwarded to support staff.",
                faq_text, avoid
            ),
            None => faq_text.to_string(),
        }
    }

    pub fn user_prompt(&self, question: &str) -> String {
        let avoid_line = if self.avoid_topics {
            "Avoid mentioning banned topics.\n"
        } else {
            ""
        };
        format!(
            "Search the FAQ for the answer.\n{}\nQuestion: {}\nAnswer in JSON format: {{\"answer\": \"<answer>\"}}",
            avoid_line, question
        )
    }

    /// Strict decode of the model reply. `None` means the reply is not the expected object.
    pub fn decode_answer(raw: &str) -> Option<String> {
        match serde_json::from_str::<FaqAnswer>(raw) {
            Ok(parsed) => Some(parsed.answer),
            Err(e) => {
                warn!(target: LOG_TARGET, "Undecodable FAQ reply ({}): {:.200}", e, raw);
                None
            }
        }
    }

    /// Answer text for the user; never an error
    pub async fn answer(&self, question: &str) -> String {
        let request = CompletionRequest {
            model: self.model.clone(),
            temperature: self.temperature,
            system: Some(self.system_prompt.clone()),
            user: self.user_prompt(question),
            timeout: self.timeout,
        };

        let raw = match self.client.complete(&request).await {
            Ok(raw) => raw,
            Err(e) => {
                error!(target: LOG_TARGET, "FAQ completion failed: {}", e);
                return SERVICE_FALLBACK.to_string();
            }
        };

        match Self::decode_answer(&raw) {
            Some(answer) if answer.trim().is_empty() => NO_ANSWER.to_string(),
            Some(answer) => answer,
            None => DECODE_FALLBACK.to_string(),
        }
    }
}

async fn read_prompt(path: &Path) -> Result<String, LlmError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| LlmError::Prompt {
            path: path.to_path_buf(),
            source: e,
        })
}


// Changelog:
// - v1.2.0 (2026-09-30): Strict reply decoding without quote repair.
// - v1.1.0 (2026-08-12): Optional avoidance list in the system prompt.
// - v1.0.0 (2026-07-01): Initial FAQ responder.
