// Tari Faqqer - Free and Open Source Software Statement
//
// This project, faqqer, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/archive/mod.rs
// Version: 1.2.0
// Developer: Tari Faqqer Contributors
//
// This file is the module declaration for channel archiving. It ties the
// fetcher and the writer together into archive_channels, which produces the
// combined history document used by the archive command and the support
// analysis job.
//
// Tree Location:
// - src/archive/mod.rs (archive orchestration)
// - Submodules: fetcher, writer

pub mod fetcher;
pub mod writer;

use crate::chat::ChatError;
use crate::core::types::OutputFormat;
use crate::utils::atomic_file::AtomicFileError;
use log::{info, warn};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use fetcher::{AggregateHistory, ChannelHistoryFetcher};
pub use writer::{HistoryWriter, MediaOutcome, MediaStore};

const LOG_TARGET: &str = "tari::faqqer::archive";

/// File stem of the combined multi-channel document
pub const COMBINED_FILE_STEM: &str = "combined_channel_history";

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("Failed to fetch history of '{channel}'")]
    Transport {
        channel: String,
        #[source]
        source: ChatError,
    },

    #[error("Fetch task for '{channel}' ended without a result")]
    TaskAborted { channel: String },

    #[error("Failed to write archive")]
    Write {
        #[from]
        source: AtomicFileError,
    },
}

impl ArchiveError {
    /// True when the transport cannot read history at all (e.g. bot accounts)
    pub fn is_history_unavailable(&self) -> bool {
        matches!(
            self,
            ArchiveError::Transport {
                source: ChatError::HistoryUnavailable { .. },
                ..
            }
        )
    }
}

/// Summary of one archive run
#[derive(Debug)]
pub struct ArchiveStats {
    pub total_messages: usize,
    pub unique_senders: usize,
    pub channels_processed: Vec<String>,
    pub failures: BTreeMap<String, ArchiveError>,
    pub output_path: PathBuf,
}

impl ArchiveStats {
    /// Every requested channel failed because history cannot be read
    pub fn history_unavailable(&self) -> bool {
        self.channels_processed.is_empty()
            && !self.failures.is_empty()
            && self.failures.values().all(ArchiveError::is_history_unavailable)
    }
}

/// Result of `archive_channels`: statistics plus the rendered document
#[derive(Debug)]
pub struct ArchiveOutcome {
    pub stats: ArchiveStats,
    pub document: String,
}

/// Longest history window accepted for an archive run
pub const MAX_WINDOW_HOURS: u64 = 24 * 365 * 20;

/// History window of `hours`, capped at `MAX_WINDOW_HOURS`
pub fn window_hours(hours: u64) -> chrono::Duration {
    chrono::Duration::hours(hours.min(MAX_WINDOW_HOURS) as i64)
}

/// Path of the combined document for `format` inside `output_dir`
pub fn combined_output_path(output_dir: &Path, format: OutputFormat) -> PathBuf {
    output_dir.join(format!("{}.{}", COMBINED_FILE_STEM, format.extension()))
}

/// Fetch `channels` over the last `window`, render one combined document and
/// write it atomically into `output_dir`.
///
/// Channel failures are reported in the stats; only the final write can fail.
pub async fn archive_channels(
    fetcher: &ChannelHistoryFetcher,
    channels: &[String],
    window: chrono::Duration,
    output_dir: &Path,
    format: OutputFormat,
    media: Option<&MediaStore>,
) -> Result<ArchiveOutcome, ArchiveError> {
    let aggregate = fetcher.aggregate(channels, window).await;
    for (channel, failure) in &aggregate.failures {
        warn!(target: LOG_TARGET, "Channel '{}' left out of archive: {}", channel, failure);
    }

    let writer = HistoryWriter::new(format, channels.join(", "))
        .with_channel_labels(aggregate.channels_processed.len() > 1);
    let document = writer.render(&aggregate.sequence, media).await;

    let output_path = combined_output_path(output_dir, format);
    crate::utils::write_atomic(&output_path, document.as_bytes()).await?;

    let stats = ArchiveStats {
        total_messages: aggregate.sequence.len(),
        unique_senders: aggregate.sequence.unique_senders(),
        channels_processed: aggregate.channels_processed,
        failures: aggregate.failures,
        output_path,
    };
    info!(
        target: LOG_TARGET,
        "Archived {} messages from {} senders across {} channels ({} failed)",
        stats.total_messages,
        stats.unique_senders,
        stats.channels_processed.len(),
        stats.failures.len()
    );
    Ok(ArchiveOutcome { stats, document })
}

// Changelog:
// - v1.2.0 (2026-09-30): archive_channels returns the document with its stats.
// - v1.1.0 (2026-08-12): Combined multi-channel archives.
// - v1.0.0 (2026-07-01): Initial single-channel archive.
