// Tari Faqqer - Free and Open Source Software Statement
//
// This project, faqqer, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/lib.rs
// Version: 1.4.0
// Developer: Tari Faqqer Contributors
//
// This file serves as the main library entry point for faqqer, located at
// the root of the source tree. It exports all public modules and the types
// the binary and the integration tests use.
//
// Tree Location:
// - src/lib.rs (root library file)
// - Exports modules: archive, bot, chat, config, core, discord, explorer,
//   hashrate, jobs, llm, logging, utils

pub mod archive;
pub mod bot;
pub mod chat;
pub mod config;
pub mod core;
pub mod discord;
pub mod explorer;
pub mod hashrate;
pub mod jobs;
pub mod llm;
pub mod logging;
pub mod utils;

// Re-export commonly used types at the crate root for convenience
pub use crate::archive::{ArchiveStats, ChannelHistoryFetcher, HistoryWriter, archive_channels};
pub use crate::config::AppConfig;
pub use crate::core::types::{HashRateSample, MediaRef, Message, MessageSequence, OutputFormat};
pub use crate::core::units::{HashRateValueParser, UnitFamily};
pub use crate::hashrate::HashRatePostExtractor;
pub use crate::utils::format::FormatUtils;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

// Changelog:
// - v1.4.0 (2026-10-18): Added the discord module.
// - v1.3.0 (2026-09-30): Added the archive, hashrate and bot modules.
//   - Mining modules removed; the crate is now the community bot only.
// - v1.2.0 (2026-08-12): Added llm and jobs modules.
// - v1.0.0 (2026-07-01): Library root for the faqqer bot.
