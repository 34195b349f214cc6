// Tari Faqqer - Free and Open Source Software Statement
//
// This project, faqqer, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/core/types.rs
// Version: 1.2.0
// Developer: Tari Faqqer Contributors
//
// This file defines core data structures for faqqer, located in the core
// subdirectory. It includes the command-line arguments, chat messages as they
// are archived, the ordered message sequence and parsed hash rate samples.
//
// Tree Location:
// - src/core/types.rs (core data structures)
// - Depends on: clap, serde, chrono

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

/// Sender label used when a message has no resolvable author
pub const SYSTEM_SENDER: &str = "System";

/// Command-line arguments for faqqer
#[derive(Parser, Debug)]
#[command(
    name = "faqqer",
    version,
    about = "Tari community bot: network stats posts, FAQ answers and support-channel analysis",
    long_about = "faqqer posts Tari network statistics to community groups on a schedule,\n\
                  answers /faq questions with an LLM grounded on the FAQ document, and\n\
                  summarizes recent support-channel traffic into an issue report.\n\n\
                  Examples:\n\
                    Run the bot and jobs: faqqer --config faqqer.toml run\n\
                    Network stats:        faqqer stats\n\
                    Archive channels:     faqqer archive --channel tariproject --hours 72 --format html\n\
                    Hash rate CSV:        faqqer hash-rates normalize --input hash_rate_history.txt"
)]
pub struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the scheduled jobs and the FAQ bot until interrupted
    Run,

    /// Print the current network statistics
    Stats {
        /// Query the nextnet explorer instead of mainnet
        #[arg(long, default_value = "false")]
        nextnet: bool,
    },

    /// Answer a single FAQ question on stdout
    Ask {
        /// The question to answer
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },

    /// Archive recent history of one or more channels
    Archive {
        /// Channel to archive (repeatable)
        #[arg(long = "channel", required = true, value_name = "NAME")]
        channels: Vec<String>,

        /// Hours of history to include
        #[arg(long, default_value = "72", value_name = "HOURS")]
        hours: u64,

        /// Output document format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Directory receiving the archive document
        #[arg(long, default_value = "archive", value_name = "DIR")]
        output_dir: PathBuf,
    },

    /// Run the customer-support analysis once
    Analyze {
        /// Hours of history to analyze (defaults to the configured window)
        #[arg(long, value_name = "HOURS")]
        hours: Option<u64>,

        /// Focus the analysis on a single topic
        #[arg(long, value_name = "TOPIC")]
        topic: Option<String>,

        /// Post the report to the customer-service group instead of printing it
        #[arg(long, default_value = "false")]
        post: bool,
    },

    /// Hash rate history tools
    #[command(subcommand)]
    HashRates(HashRatesCommand),
}

#[derive(Subcommand, Debug)]
pub enum HashRatesCommand {
    /// Collect network stats posts from a channel into a history file and CSV
    Retrieve {
        #[arg(long, default_value = "tariproject", value_name = "NAME")]
        channel: String,

        /// First day to include (YYYY-MM-DD, UTC)
        #[arg(long, value_name = "DATE")]
        since: NaiveDate,

        #[arg(long, default_value = "hash_rate_history.txt", value_name = "FILE")]
        output: PathBuf,
    },

    /// Convert a history file into the normalized CSV
    Normalize {
        #[arg(long, default_value = "hash_rate_history.txt", value_name = "FILE")]
        input: PathBuf,

        #[arg(long, default_value = "normalized_hash_rates.csv", value_name = "FILE")]
        output: PathBuf,
    },
}

/// Rendering mode for archived history
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Text,
    Html,
}

impl OutputFormat {
    pub const fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Text => "txt",
            OutputFormat::Html => "html",
        }
    }
}

/// Attachment carried by a message, resolved through the history transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRef {
    /// File name supplied by the sender or the export, if any
    pub file_name: Option<String>,
    /// Transport-specific handle used to download the content
    pub locator: String,
}

/// One chat message retrieved from a channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    id: i64,
    timestamp: DateTime<Utc>,
    sender: Option<String>,
    text: Option<String>,
    reply_to: Option<i64>,
    channel: Option<String>,
    media: Option<MediaRef>,
}

impl Message {
    pub fn new(
        id: i64,
        timestamp: DateTime<Utc>,
        sender: Option<String>,
        text: Option<String>,
        reply_to: Option<i64>,
    ) -> Self {
        Self {
            id,
            timestamp,
            sender,
            text: text.filter(|t| !t.is_empty()),
            reply_to,
            channel: None,
            media: None,
        }
    }

    pub fn with_media(mut self, media: MediaRef) -> Self {
        self.media = Some(media);
        self
    }

    /// Attach the originating channel name
    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn sender(&self) -> Option<&str> {
        self.sender.as_deref()
    }

    /// Sender name, or the system marker for author-less messages
    pub fn sender_label(&self) -> &str {
        self.sender.as_deref().unwrap_or(SYSTEM_SENDER)
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn reply_to(&self) -> Option<i64> {
        self.reply_to
    }

    pub fn channel(&self) -> Option<&str> {
        self.channel.as_deref()
    }

    pub fn media(&self) -> Option<&MediaRef> {
        self.media.as_ref()
    }
}

/// Messages in non-decreasing timestamp order, unique per (channel, id)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageSequence {
    messages: Vec<Message>,
}

impl MessageSequence {
    /// Build a sequence from messages in any order.
    ///
    /// Later duplicates of a (channel, id) pair are dropped, then the rest is
    /// stably sorted by timestamp so equal timestamps keep arrival order.
    pub fn from_unsorted(messages: Vec<Message>) -> Self {
        let mut seen = HashSet::new();
        let mut unique: Vec<Message> = messages
            .into_iter()
            .filter(|m| seen.insert((m.channel.clone(), m.id)))
            .collect();
        unique.sort_by_key(|m| m.timestamp);
        Self { messages: unique }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Number of distinct sender labels, counting author-less messages as one "System" sender
    pub fn unique_senders(&self) -> usize {
        self.messages
            .iter()
            .map(Message::sender_label)
            .collect::<HashSet<_>>()
            .len()
    }

    pub fn first_timestamp(&self) -> Option<DateTime<Utc>> {
        self.messages.first().map(Message::timestamp)
    }

    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.messages.last().map(Message::timestamp)
    }
}

impl<'a> IntoIterator for &'a MessageSequence {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

/// Parsed snapshot of one network stats post, in fixed target units.
///
/// A field that could not be matched or parsed is `None`; zero is a real value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HashRateSample {
    pub date: DateTime<Utc>,
    pub block_height: Option<u64>,
    /// SHA3x in TH/s
    pub sha3_th: Option<f64>,
    /// RandomX (Tari) in GH/s
    pub rxt_gh: Option<f64>,
    /// RandomX (merged-mined XMR) in GH/s
    pub rxm_gh: Option<f64>,
    /// Cuckaroo 29 in Kg/s
    pub c29_kg: Option<f64>,
}

impl HashRateSample {
    pub fn empty(date: DateTime<Utc>) -> Self {
        Self {
            date,
            block_height: None,
            sha3_th: None,
            rxt_gh: None,
            rxm_gh: None,
            c29_kg: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_750_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_sequence_sorts_by_timestamp_not_id() {
        let seq = MessageSequence::from_unsorted(vec![
            Message::new(5, at(30), None, Some("c".into()), None),
            Message::new(9, at(10), None, Some("a".into()), None),
            Message::new(1, at(20), None, Some("b".into()), None),
        ]);
        let ids: Vec<i64> = seq.iter().map(Message::id).collect();
        assert_eq!(ids, vec![9, 1, 5]);
    }

    #[test]
    fn test_sequence_dedups_per_channel_only() {
        let seq = MessageSequence::from_unsorted(vec![
            Message::new(7, at(1), None, None, None).with_channel("a"),
            Message::new(7, at(2), None, None, None).with_channel("a"),
            Message::new(7, at(3), None, None, None).with_channel("b"),
        ]);
        assert_eq!(seq.len(), 2);
        assert_eq!(seq.messages()[0].timestamp(), at(1));
    }

    #[test]
    fn test_empty_text_is_absent_and_sender_falls_back() {
        let msg = Message::new(1, at(0), None, Some(String::new()), None);
        assert_eq!(msg.text(), None);
        assert_eq!(msg.sender_label(), SYSTEM_SENDER);
    }

    #[test]
    fn test_unique_senders_counts_system_once() {
        let seq = MessageSequence::from_unsorted(vec![
            Message::new(1, at(0), Some("alice".into()), None, None),
            Message::new(2, at(1), None, None, None),
            Message::new(3, at(2), None, None, None),
            Message::new(4, at(3), Some("alice".into()), None, None),
        ]);
        assert_eq!(seq.unique_senders(), 2);
    }
}

// Changelog:
// - v1.2.0 (2026-09-30): Added the hash-rates subcommands and HashRateSample.
// - v1.1.0 (2026-08-12): Messages carry their channel for multi-channel archives.
//   - MessageSequence deduplicates per (channel, id) and orders by timestamp,
//     since message ids are not comparable across channels.
// - v1.0.0 (2026-07-01): Initial data model and CLI.
