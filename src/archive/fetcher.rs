// Tari Faqqer - Free and Open Source Software Statement
//
// This project, faqqer, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/archive/fetcher.rs
// Version: 1.3.0
// Developer: Tari Faqqer Contributors
//
// This file pages backward through channel history until the cutoff is
// crossed, and fans out over several channels for combined archives. Each
// channel is paged by exactly one task; results are merged by the caller
// task only after every channel has finished.
//
// Tree Location:
// - src/archive/fetcher.rs (channel history pagination)
// - Depends on: chat, core::types, tokio

use super::ArchiveError;
use crate::chat::{ChatError, MessageHistory};
use crate::core::types::{Message, MessageSequence};
use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

const LOG_TARGET: &str = "tari::faqqer::archive::fetcher";

/// Combined history of several channels plus the channels that failed
#[derive(Debug, Default)]
pub struct AggregateHistory {
    pub sequence: MessageSequence,
    /// Channels that contributed (possibly zero messages), in request order
    pub channels_processed: Vec<String>,
    pub failures: BTreeMap<String, ArchiveError>,
}

/// Pages newest-first history into an ascending, cutoff-bounded sequence
#[derive(Clone)]
pub struct ChannelHistoryFetcher {
    transport: Arc<dyn MessageHistory>,
    page_size: usize,
    page_delay: Duration,
}

impl ChannelHistoryFetcher {
    pub fn new(transport: Arc<dyn MessageHistory>, page_size: usize, page_delay: Duration) -> Self {
        Self {
            transport,
            page_size: page_size.max(1),
            page_delay,
        }
    }

    /// Every message of `channel` with timestamp in `[now - window, now]`
    pub async fn fetch_window(
        &self,
        channel: &str,
        window: chrono::Duration,
    ) -> Result<MessageSequence, ChatError> {
        let now = Utc::now();
        self.fetch_between(channel, now - window, now).await
    }

    /// Every message of `channel` from `cutoff` up to now, ascending
    pub async fn fetch_since(
        &self,
        channel: &str,
        cutoff: DateTime<Utc>,
    ) -> Result<MessageSequence, ChatError> {
        self.fetch_between(channel, cutoff, Utc::now()).await
    }

    /// Every message of `channel` with timestamp in `[cutoff, until]`, ascending.
    ///
    /// Messages dated after `until` are skipped but do not end the scan.
    pub async fn fetch_between(
        &self,
        channel: &str,
        cutoff: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<MessageSequence, ChatError> {
        let mut cursor: Option<i64> = None;
        let mut kept: Vec<Message> = Vec::new();
        let mut pages = 0usize;
        let mut scanned = 0usize;

        info!(
            target: LOG_TARGET,
            "Fetching '{}' back to {}",
            channel,
            cutoff.format("%Y-%m-%d %H:%M:%S")
        );

        loop {
            let page = self
                .transport
                .fetch_page(channel, self.page_size, cursor)
                .await?;
            let Some(oldest) = page.last() else {
                debug!(target: LOG_TARGET, "Reached the start of '{}'", channel);
                break;
            };
            let oldest_timestamp = oldest.timestamp();
            let oldest_id = oldest.id();
            pages += 1;
            scanned += page.len();

            kept.extend(
                page.into_iter()
                    .filter(|m| m.timestamp() >= cutoff && m.timestamp() <= until)
                    .map(|m| m.with_channel(channel)),
            );

            if oldest_timestamp < cutoff {
                break;
            }
            if cursor.is_some_and(|c| oldest_id >= c) {
                warn!(
                    target: LOG_TARGET,
                    "Cursor for '{}' did not advance past {}, stopping",
                    channel,
                    oldest_id
                );
                break;
            }
            cursor = Some(oldest_id);

            if !self.page_delay.is_zero() {
                tokio::time::sleep(self.page_delay).await;
            }
        }

        let sequence = MessageSequence::from_unsorted(kept);
        info!(
            target: LOG_TARGET,
            "Fetched {} of {} scanned messages from '{}' in {} pages",
            sequence.len(),
            scanned,
            channel,
            pages
        );
        Ok(sequence)
    }

    /// Fetch each channel concurrently and merge into one ascending sequence.
    ///
    /// A failing channel never aborts the others; it is listed in `failures`.
    pub async fn aggregate(&self, channels: &[String], window: chrono::Duration) -> AggregateHistory {
        self.aggregate_since(channels, Utc::now() - window).await
    }

    pub async fn aggregate_since(
        &self,
        channels: &[String],
        cutoff: DateTime<Utc>,
    ) -> AggregateHistory {
        let until = Utc::now();
        // One pagination task per channel name
        let mut unique: Vec<String> = Vec::new();
        for channel in channels {
            if !unique.contains(channel) {
                unique.push(channel.clone());
            }
        }

        let mut tasks = JoinSet::new();
        for channel in &unique {
            let fetcher = self.clone();
            let channel = channel.clone();
            tasks.spawn(async move {
                let result = fetcher.fetch_between(&channel, cutoff, until).await;
                (channel, result)
            });
        }

        let mut pending: BTreeSet<String> = unique.iter().cloned().collect();
        let mut collected: BTreeMap<String, MessageSequence> = BTreeMap::new();
        let mut failures = BTreeMap::new();

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((channel, Ok(sequence))) => {
                    pending.remove(&channel);
                    collected.insert(channel, sequence);
                }
                Ok((channel, Err(e))) => {
                    error!(target: LOG_TARGET, "Failed to fetch '{}': {}", channel, e);
                    pending.remove(&channel);
                    failures.insert(
                        channel.clone(),
                        ArchiveError::Transport { channel, source: e },
                    );
                }
                Err(e) => {
                    error!(target: LOG_TARGET, "Channel fetch task ended abnormally: {}", e);
                }
            }
        }

        for channel in pending {
            failures.insert(channel.clone(), ArchiveError::TaskAborted { channel });
        }

        let mut merged = Vec::new();
        let mut channels_processed = Vec::new();
        for channel in unique {
            if let Some(sequence) = collected.remove(&channel) {
                merged.extend(sequence.messages().iter().cloned());
                channels_processed.push(channel);
            }
        }

        AggregateHistory {
            sequence: MessageSequence::from_unsorted(merged),
            channels_processed,
            failures,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::MediaRef;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::Mutex;

    fn at(t: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_750_000_000 + t, 0).unwrap()
    }

    /// Serves canned pages and records the cursors it was asked for
    struct PagedHistory {
        pages: Vec<Vec<Message>>,
        cursors: Mutex<Vec<Option<i64>>>,
    }

    #[async_trait]
    impl MessageHistory for PagedHistory {
        async fn fetch_page(
            &self,
            _channel: &str,
            _limit: usize,
            before: Option<i64>,
        ) -> Result<Vec<Message>, ChatError> {
            let mut cursors = self.cursors.lock().unwrap();
            let index = cursors.len();
            cursors.push(before);
            Ok(self.pages.get(index).cloned().unwrap_or_default())
        }

        async fn download_media(&self, _: &str, media: &MediaRef) -> Result<Vec<u8>, ChatError> {
            Err(ChatError::MediaUnavailable {
                locator: media.locator.clone(),
            })
        }
    }

    #[tokio::test]
    async fn test_media_only_message_is_kept() {
        let history = Arc::new(PagedHistory {
            pages: vec![vec![
                Message::new(2, at(5), Some("bob".into()), None, None),
                Message::new(1, at(-5), Some("bob".into()), Some("old".into()), None),
            ]],
            cursors: Mutex::new(Vec::new()),
        });
        let fetcher = ChannelHistoryFetcher::new(history, 10, Duration::ZERO);
        let sequence = fetcher.fetch_since("tari", at(0)).await.unwrap();
        assert_eq!(sequence.len(), 1);
        assert_eq!(sequence.messages()[0].text(), None);
        assert_eq!(sequence.messages()[0].channel(), Some("tari"));
    }

    #[tokio::test]
    async fn test_cursor_is_oldest_id_of_previous_page() {
        let history = Arc::new(PagedHistory {
            pages: vec![
                vec![Message::new(9, at(9), None, None, None), Message::new(8, at(8), None, None, None)],
                vec![Message::new(7, at(7), None, None, None)],
            ],
            cursors: Mutex::new(Vec::new()),
        });
        let fetcher = ChannelHistoryFetcher::new(history.clone(), 2, Duration::ZERO);
        let sequence = fetcher.fetch_since("tari", at(0)).await.unwrap();
        assert_eq!(sequence.len(), 3);
        assert_eq!(*history.cursors.lock().unwrap(), vec![None, Some(8), Some(7)]);
    }

    #[tokio::test]
    async fn test_window_excludes_messages_dated_in_the_future() {
        let now = Utc::now();
        let history = Arc::new(PagedHistory {
            pages: vec![vec![
                Message::new(2, now + chrono::Duration::hours(5), None, Some("future".into()), None),
                Message::new(1, now - chrono::Duration::minutes(1), None, Some("now".into()), None),
            ]],
            cursors: Mutex::new(Vec::new()),
        });
        let fetcher = ChannelHistoryFetcher::new(history, 10, Duration::ZERO);

        let sequence = fetcher.fetch_window("tari", chrono::Duration::hours(1)).await.unwrap();

        let texts: Vec<&str> = sequence.iter().filter_map(Message::text).collect();
        assert_eq!(texts, vec!["now"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_page_delay_only_between_requests() {
        let delay = Duration::from_millis(250);

        // Second page crosses the cutoff: two requests, one delay
        let history = Arc::new(PagedHistory {
            pages: vec![
                vec![Message::new(9, at(9), None, None, None), Message::new(8, at(8), None, None, None)],
                vec![Message::new(7, at(-1), None, None, None)],
            ],
            cursors: Mutex::new(Vec::new()),
        });
        let fetcher = ChannelHistoryFetcher::new(history.clone(), 2, delay);
        let started = tokio::time::Instant::now();
        fetcher.fetch_between("tari", at(0), at(100)).await.unwrap();
        assert_eq!(history.cursors.lock().unwrap().len(), 2);
        assert_eq!(started.elapsed(), delay);

        // Empty second page ends the scan without a trailing delay
        let history = Arc::new(PagedHistory {
            pages: vec![vec![Message::new(3, at(3), None, None, None)]],
            cursors: Mutex::new(Vec::new()),
        });
        let fetcher = ChannelHistoryFetcher::new(history.clone(), 2, delay);
        let started = tokio::time::Instant::now();
        fetcher.fetch_between("tari", at(0), at(100)).await.unwrap();
        assert_eq!(history.cursors.lock().unwrap().len(), 2);
        assert_eq!(started.elapsed(), delay);
    }
}

// Changelog:
// - v1.3.0 (2026-10-18): Windows are bounded above by the time the fetch started.
// - v1.2.0 (2026-09-30): Aggregation reports failed channels in a failure map.
//   - A channel whose fetch task never reports back is recorded as aborted
//     rather than left out of the result.
// - v1.1.0 (2026-08-12): Cutoff comparisons use DateTime<Utc> throughout.
// - v1.0.0 (2026-07-01): Initial backward pagination with page delay.
