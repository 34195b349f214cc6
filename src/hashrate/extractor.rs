// Tari Faqqer - Free and Open Source Software Statement
//
// This project, faqqer, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/hashrate/extractor.rs
// Version: 1.1.0
// Developer: Tari Faqqer Contributors
//
// This file recognizes network stats posts among ordinary chat messages and
// pulls block height and per-algorithm rates out of them. Every field is
// looked up on its own, so one missing or garbled line only costs that
// field.
//
// Tree Location:
// - src/hashrate/extractor.rs (report post recognition and field extraction)
// - Depends on: core::units, core::types

use crate::core::types::{HashRateSample, Message, MessageSequence};
use crate::core::units::{HashRateValueParser, RateParse, UnitFamily};
use chrono::{DateTime, Utc};
use log::{debug, warn};

const LOG_TARGET: &str = "tari::faqqer::hashrate::extractor";

pub const REPORT_HEADER: &str = "📊 Current Tari Network Stats 📊";
pub const BLOCK_HEIGHT_LABEL: &str = "Block Height:";

const SHA3_LABELS: [&str; 4] = ["SHA3x:", "SHA3x Hash Rate:", "SHA3:", "SHA3 Hash Rate:"];
const RXT_LABELS: [&str; 2] = ["RandomX (Tari):", "RandomX (Tari) Hash Rate:"];
const RXM_LABELS: [&str; 2] = [
    "RandomX (Merged-Mined XMR):",
    "RandomX (Merged-Mined XMR) Hash Rate:",
];
const EARLY_RANDOMX_LABELS: [&str; 1] = ["RandomX Hash Rate:"];
const C29_LABELS: [&str; 1] = ["Cuckaroo 29:"];

const TERA: f64 = 1e12;
const GIGA: f64 = 1e9;
const KILO: f64 = 1e3;

/// A field that was labelled in the post but could not be read
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDiagnostic {
    pub field: &'static str,
    pub input: String,
    pub reason: String,
}

/// One recognized report post and what could be read from it
#[derive(Debug, Clone)]
pub struct ExtractedPost<'a> {
    pub message: &'a Message,
    pub sample: HashRateSample,
    pub diagnostics: Vec<FieldDiagnostic>,
}

pub struct HashRatePostExtractor;

impl HashRatePostExtractor {
    /// The report signature: the fixed header plus a block height field
    pub fn is_report(text: &str) -> bool {
        text.contains(REPORT_HEADER) && text.contains(BLOCK_HEIGHT_LABEL)
    }

    /// Report posts of `sequence`, in sequence order, with their fields
    pub fn extract(sequence: &MessageSequence) -> Vec<ExtractedPost<'_>> {
        let posts: Vec<ExtractedPost<'_>> = sequence
            .iter()
            .filter_map(|message| {
                let text = message.text().filter(|t| Self::is_report(t))?;
                let (sample, diagnostics) = Self::extract_fields(text, message.timestamp());
                for diagnostic in &diagnostics {
                    warn!(
                        target: LOG_TARGET,
                        "Message {}: {} value {:?} not usable ({})",
                        message.id(),
                        diagnostic.field,
                        diagnostic.input,
                        diagnostic.reason
                    );
                }
                Some(ExtractedPost {
                    message,
                    sample,
                    diagnostics,
                })
            })
            .collect();
        debug!(
            target: LOG_TARGET,
            "Recognized {} report posts among {} messages",
            posts.len(),
            sequence.len()
        );
        posts
    }

    /// Read every known field of a post body; absent fields stay `None`
    pub fn extract_fields(text: &str, date: DateTime<Utc>) -> (HashRateSample, Vec<FieldDiagnostic>) {
        let mut diagnostics = Vec::new();
        let mut sample = HashRateSample::empty(date);

        sample.block_height = labelled_value(text, &[BLOCK_HEIGHT_LABEL])
            .and_then(|raw| parse_block_height(raw, &mut diagnostics));

        sample.sha3_th = rate_field(text, &SHA3_LABELS, "sha3", UnitFamily::Hash, TERA, &mut diagnostics);
        sample.c29_kg = rate_field(text, &C29_LABELS, "c29", UnitFamily::Graph, KILO, &mut diagnostics);

        let has_labelled_randomx = labelled_value(text, &RXT_LABELS).is_some()
            || labelled_value(text, &RXM_LABELS).is_some();
        if has_labelled_randomx {
            sample.rxt_gh = rate_field(text, &RXT_LABELS, "rxt", UnitFamily::Hash, GIGA, &mut diagnostics);
            sample.rxm_gh = rate_field(text, &RXM_LABELS, "rxm", UnitFamily::Hash, GIGA, &mut diagnostics);
        } else {
            // Early posts had one RandomX field, which was the merge-mined rate
            sample.rxm_gh = rate_field(
                text,
                &EARLY_RANDOMX_LABELS,
                "rxm",
                UnitFamily::Hash,
                GIGA,
                &mut diagnostics,
            );
        }

        (sample, diagnostics)
    }
}

/// Rest of the line after the first label found, trimmed
fn labelled_value<'t>(text: &'t str, labels: &[&str]) -> Option<&'t str> {
    labels.iter().find_map(|label| {
        let start = text.find(label)? + label.len();
        let rest = &text[start..];
        let end = rest.find('\n').unwrap_or(rest.len());
        Some(rest[..end].trim())
    })
}

fn parse_block_height(raw: &str, diagnostics: &mut Vec<FieldDiagnostic>) -> Option<u64> {
    let digits: String = raw
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == ',')
        .filter(|c| *c != ',')
        .collect();
    match digits.parse::<u64>() {
        Ok(height) => Some(height),
        Err(_) => {
            diagnostics.push(FieldDiagnostic {
                field: "block_height",
                input: raw.to_string(),
                reason: "not a block number".to_string(),
            });
            None
        }
    }
}

fn rate_field(
    text: &str,
    labels: &[&str],
    field: &'static str,
    family: UnitFamily,
    target_scale: f64,
    diagnostics: &mut Vec<FieldDiagnostic>,
) -> Option<f64> {
    let raw = labelled_value(text, labels)?;
    let parsed = HashRateValueParser::parse(raw);
    if let RateParse::Unparsed { input, reason } = &parsed {
        diagnostics.push(FieldDiagnostic {
            field,
            input: input.clone(),
            reason: reason.clone(),
        });
        return None;
    }
    match parsed.quantity_in(family) {
        Some(quantity) => Some(quantity.in_scale(target_scale)),
        None => {
            diagnostics.push(FieldDiagnostic {
                field,
                input: raw.to_string(),
                reason: format!("expected a {} unit", family),
            });
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_labelled_value_stops_at_line_end() {
        let text = "Block Height: 12,345\nSHA3x: 47.0 TH/s";
        assert_eq!(labelled_value(text, &[BLOCK_HEIGHT_LABEL]), Some("12,345"));
        assert_eq!(labelled_value(text, &SHA3_LABELS), Some("47.0 TH/s"));
        assert_eq!(labelled_value(text, &C29_LABELS), None);
    }

    #[test]
    fn test_wrong_family_is_reported() {
        let text = format!("{}\nBlock Height: 1\nSHA3x: 12 Kg", REPORT_HEADER);
        let (sample, diagnostics) = HashRatePostExtractor::extract_fields(&text, date());
        assert_eq!(sample.sha3_th, None);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].field, "sha3");
    }

    #[test]
    fn test_signature_requires_both_parts() {
        assert!(!HashRatePostExtractor::is_report("Block Height: 5"));
        assert!(!HashRatePostExtractor::is_report(REPORT_HEADER));
        assert!(HashRatePostExtractor::is_report(&format!("{REPORT_HEADER}\nBlock Height: 5")));
    }
}

// Changelog:
// - v1.1.0 (2026-09-30): Early single-RandomX posts fill the merge-mined field.
//   - Unreadable values are returned as diagnostics next to the sample.
// - v1.0.0 (2026-08-20): Initial extraction of report posts.
