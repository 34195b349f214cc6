// Tari Faqqer - Free and Open Source Software Statement
//
// This project, faqqer, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/llm/mod.rs
// Version: 1.1.0
// Developer: Tari Faqqer Contributors
//
// This file is the module declaration for the language model features: the
// completion client, the FAQ responder and the support-channel analysis.
//
// Tree Location:
// - src/llm/mod.rs (LLM module entry point)
// - Submodules: client, faq, analysis

pub mod analysis;
pub mod client;
pub mod faq;

use std::path::PathBuf;
use thiserror::Error;

pub use analysis::{AnalysisReport, CustomerAnalyzer, IssueCategory, ReportContext};
pub use client::{CompletionClient, CompletionRequest, OpenAiClient};
pub use faq::FaqResponder;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("HTTP request to completion API failed")]
    Http {
        #[source]
        source: reqwest::Error,
    },

    #[error("Completion request timed out")]
    Timeout,

    #[error("Completion API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Completion API returned no content")]
    EmptyResponse,

    #[error("Failed to read prompt file {path:?}")]
    Prompt {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LlmError {
    pub fn from_transport(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Http { source: e }
        }
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        LlmError::from_transport(e)
    }
}
