// Tari Faqqer - Free and Open Source Software Statement
//
// This project, faqqer, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/hashrate/mod.rs
// Version: 1.1.0
// Developer: Tari Faqqer Contributors
//
// This file is the module declaration for the hash rate history tools. It
// provides the two operations behind `faqqer hash-rates`: retrieving report
// posts from a channel and normalizing a history file into CSV.
//
// Tree Location:
// - src/hashrate/mod.rs (hash rate history orchestration)
// - Submodules: extractor, history

pub mod extractor;
pub mod history;

use crate::archive::ChannelHistoryFetcher;
use crate::chat::ChatError;
use crate::utils::atomic_file::{AtomicFileError, write_atomic};
use chrono::{NaiveDate, Utc};
use log::{info, warn};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use extractor::{ExtractedPost, FieldDiagnostic, HashRatePostExtractor};
pub use history::{CSV_HEADER, HistoryEntry};

const LOG_TARGET: &str = "tari::faqqer::hashrate";

#[derive(Error, Debug)]
pub enum HashRateHistoryError {
    #[error("Failed to read history file {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to fetch channel history")]
    Fetch {
        #[from]
        source: ChatError,
    },

    #[error("Failed to write output")]
    Write {
        #[from]
        source: AtomicFileError,
    },
}

/// Counts reported back to the CLI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistorySummary {
    pub posts: usize,
    pub unreadable_fields: usize,
    pub history_path: Option<PathBuf>,
    pub csv_path: PathBuf,
}

/// CSV path next to a history file (`x.txt` -> `x.csv`)
pub fn csv_path_for(history_path: &Path) -> PathBuf {
    history_path.with_extension("csv")
}

/// Fetch `channel` back to `since` (UTC midnight), keep the report posts and
/// write both the history file and its CSV.
pub async fn retrieve(
    fetcher: &ChannelHistoryFetcher,
    channel: &str,
    since: NaiveDate,
    output: &Path,
) -> Result<HistorySummary, HashRateHistoryError> {
    let cutoff = since.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc();
    let sequence = fetcher.fetch_since(channel, cutoff).await?;
    let posts = HashRatePostExtractor::extract(&sequence);
    let unreadable_fields = posts.iter().map(|p| p.diagnostics.len()).sum();

    let entries: Vec<HistoryEntry> = posts
        .iter()
        .map(|post| HistoryEntry {
            date: post.message.timestamp(),
            message_id: Some(post.message.id()),
            text: post.message.text().unwrap_or_default().to_string(),
        })
        .collect();
    if entries.is_empty() {
        warn!(target: LOG_TARGET, "No report posts in '{}' since {}", channel, since);
    }

    let document = history::render_history(channel, since, Utc::now(), &entries);
    write_atomic(output, document.as_bytes()).await?;

    let samples: Vec<_> = posts.into_iter().map(|p| p.sample).collect();
    let csv_path = csv_path_for(output);
    write_atomic(&csv_path, history::render_csv(&samples).as_bytes()).await?;

    info!(
        target: LOG_TARGET,
        "Saved {} report posts from '{}' to {:?} and {:?}",
        entries.len(),
        channel,
        output,
        csv_path
    );
    Ok(HistorySummary {
        posts: entries.len(),
        unreadable_fields,
        history_path: Some(output.to_path_buf()),
        csv_path,
    })
}

/// Turn a history file into the normalized CSV
pub async fn normalize(input: &Path, output: &Path) -> Result<HistorySummary, HashRateHistoryError> {
    let contents = tokio::fs::read_to_string(input)
        .await
        .map_err(|e| HashRateHistoryError::Read {
            path: input.to_path_buf(),
            source: e,
        })?;

    let entries = history::parse_history(&contents);
    let mut unreadable_fields = 0;
    for entry in &entries {
        let (_, diagnostics) = HashRatePostExtractor::extract_fields(&entry.text, entry.date);
        for diagnostic in &diagnostics {
            warn!(
                target: LOG_TARGET,
                "Entry of {}: {} value {:?} not usable ({})",
                entry.date.format("%Y-%m-%d %H:%M:%S"),
                diagnostic.field,
                diagnostic.input,
                diagnostic.reason
            );
        }
        unreadable_fields += diagnostics.len();
    }

    let samples = history::samples_from_entries(&entries);
    write_atomic(output, history::render_csv(&samples).as_bytes()).await?;
    info!(target: LOG_TARGET, "Normalized {} entries into {:?}", samples.len(), output);

    Ok(HistorySummary {
        posts: samples.len(),
        unreadable_fields,
        history_path: None,
        csv_path: output.to_path_buf(),
    })
}

// Changelog:
// - v1.1.0 (2026-09-30): Retrieval writes the normalized CSV next to the history.
// - v1.0.0 (2026-08-20): Initial retrieve and normalize operations.
