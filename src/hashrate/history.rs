// Tari Faqqer - Free and Open Source Software Statement
//
// This file is part of faqqer, licensed under the MIT License.
//
// File: src/hashrate/history.rs
// Version: 1.0.0
// Developer: Tari Faqqer Contributors
//
// The hash rate history text file (one block per report post) and the
// normalized CSV derived from it.

use super::extractor::HashRatePostExtractor;
use crate::core::types::HashRateSample;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::fmt::Write as _;

pub const ENTRY_SEPARATOR: &str =
    "================================================================================";
const POST_DIVIDER: &str =
    "--------------------------------------------------------------------------------";
const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub const CSV_HEADER: &str =
    "Date,Block Height,net_sha3 (TH/s),net_rxt (GH/s),net_rxm (GH/s),net_c29 (Kg/s)";

/// A report post as stored in the history file
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub date: DateTime<Utc>,
    pub message_id: Option<i64>,
    pub text: String,
}

/// Render the history file: a header, then one block per post
pub fn render_history(
    channel: &str,
    since: NaiveDate,
    retrieved: DateTime<Utc>,
    entries: &[HistoryEntry],
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Hash Rate History from {}", channel);
    let _ = writeln!(out, "Retrieved: {}", retrieved.format(DATE_FORMAT));
    let _ = writeln!(out, "Date Range: {} onwards", since.format("%Y-%m-%d"));
    let _ = writeln!(out, "Total Posts: {}", entries.len());
    let _ = writeln!(out, "{}\n", ENTRY_SEPARATOR);

    for entry in entries {
        let _ = writeln!(out, "Date: {}", entry.date.format(DATE_FORMAT));
        if let Some(id) = entry.message_id {
            let _ = writeln!(out, "Message ID: {}", id);
        }
        let _ = writeln!(out, "{}", POST_DIVIDER);
        out.push_str(&entry.text);
        let _ = writeln!(out, "\n{}\n", ENTRY_SEPARATOR);
    }
    out
}

/// Read entries back from a history file.
///
/// Blocks without both a parsable `Date:` line and a block height are skipped.
pub fn parse_history(contents: &str) -> Vec<HistoryEntry> {
    contents
        .split(ENTRY_SEPARATOR)
        .filter(|block| block.contains("Date:") && block.contains("Block Height:"))
        .filter_map(parse_entry)
        .collect()
}

fn parse_entry(block: &str) -> Option<HistoryEntry> {
    let mut date = None;
    let mut message_id = None;
    let mut body = block.trim();

    for line in block.lines().map(str::trim) {
        if let Some(raw) = line.strip_prefix("Date:") {
            date = date.or_else(|| {
                NaiveDateTime::parse_from_str(raw.trim(), DATE_FORMAT)
                    .ok()
                    .map(|naive| naive.and_utc())
            });
        } else if let Some(raw) = line.strip_prefix("Message ID:") {
            message_id = raw.trim().parse().ok();
        }
    }
    if let Some((_, after)) = block.split_once(POST_DIVIDER) {
        body = after.trim();
    }

    Some(HistoryEntry {
        date: date?,
        message_id,
        text: body.to_string(),
    })
}

/// Samples for `entries`, ordered by date (stable for equal dates)
pub fn samples_from_entries(entries: &[HistoryEntry]) -> Vec<HashRateSample> {
    let mut samples: Vec<HashRateSample> = entries
        .iter()
        .map(|entry| HashRatePostExtractor::extract_fields(&entry.text, entry.date).0)
        .collect();
    samples.sort_by_key(|sample| sample.date);
    samples
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn cell(value: Option<f64>) -> String {
    value.map(|v| round2(v).to_string()).unwrap_or_default()
}

/// The normalized CSV; absent values are empty cells
pub fn render_csv(samples: &[HashRateSample]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", CSV_HEADER);
    for sample in samples {
        let _ = writeln!(
            out,
            "{},{},{},{},{},{}",
            sample.date.format(DATE_FORMAT),
            sample.block_height.map(|h| h.to_string()).unwrap_or_default(),
            cell(sample.sha3_th),
            cell(sample.rxt_gh),
            cell(sample.rxm_gh),
            cell(sample.c29_kg),
        );
    }
    out
}
