// Tari Faqqer - Free and Open Source Software Statement
//
// This project, faqqer, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/utils/format.rs
// Version: 1.2.0
// Developer: Tari Faqqer Contributors
//
// This file provides utility functions for formatting statistics in faqqer,
// located in the utils subdirectory. It formats hash rates, graph rates,
// block heights, durations and long texts for chat posts and logs.
//
// Tree Location:
// - src/utils/format.rs (formatting utilities)
// - Depends on: core::units

use crate::core::units::UnitFamily;
use std::time::Duration;

/// Utility functions for formatting network statistics
pub struct FormatUtils;

impl FormatUtils {
    /// Format a base-unit value with the largest prefix that keeps it below 1000.
    ///
    /// Two decimals below 10, one below 100, none (truncated) from 100 up.
    /// Values past the largest prefix stay in that prefix.
    pub fn format_rate(value: f64, family: UnitFamily) -> String {
        let symbols = family.symbols();
        let mut scaled = value;
        let mut index = 0;
        while scaled >= 1000.0 && index < symbols.len() - 1 {
            scaled /= 1000.0;
            index += 1;
        }

        if scaled < 10.0 {
            format!("{:.2} {}", scaled, symbols[index])
        } else if scaled < 100.0 {
            format!("{:.1} {}", scaled, symbols[index])
        } else {
            format!("{} {}", scaled.trunc() as u64, symbols[index])
        }
    }

    /// Hash rate as posted to chat, e.g. "3.70 GH/s"
    pub fn format_hashrate(hashrate: f64) -> String {
        format!("{}/s", Self::format_rate(hashrate, UnitFamily::Hash))
    }

    /// Cuckaroo rate as posted to chat, e.g. "120 Kg"
    pub fn format_graph_rate(graphs: f64) -> String {
        Self::format_rate(graphs, UnitFamily::Graph)
    }

    /// Integer with comma thousands separators, e.g. 1,234,567
    pub fn format_thousands(num: u64) -> String {
        let digits = num.to_string();
        let mut out = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                out.push(',');
            }
            out.push(ch);
        }
        out
    }

    /// Format duration for human-readable output (seconds, minutes, hours)
    pub fn format_duration(duration: Duration) -> String {
        let secs = duration.as_secs();
        if secs < 60 {
            format!("{}s", secs)
        } else if secs < 3600 {
            format!("{}m {}s", secs / 60, secs % 60)
        } else {
            format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
        }
    }

    /// Cut text to at most `max_chars` characters, ending with "..." when cut
    pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
        if text.chars().count() <= max_chars {
            return text.to_string();
        }
        let keep = max_chars.saturating_sub(3);
        let mut out: String = text.chars().take(keep).collect();
        out.push_str("...");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_rate_breakpoints() {
        assert_eq!(FormatUtils::format_rate(3.7e9, UnitFamily::Hash), "3.70 GH");
        assert_eq!(FormatUtils::format_rate(1.2e5, UnitFamily::Graph), "120 Kg");
        assert_eq!(FormatUtils::format_rate(47.31e12, UnitFamily::Hash), "47.3 TH");
        assert_eq!(FormatUtils::format_rate(999.0, UnitFamily::Hash), "999 H");
        assert_eq!(FormatUtils::format_rate(1000.0, UnitFamily::Hash), "1.00 kH");
        assert_eq!(FormatUtils::format_rate(0.0, UnitFamily::Graph), "0.00 g");
    }

    #[test]
    fn test_format_rate_truncates_from_hundred() {
        assert_eq!(FormatUtils::format_rate(999.9e6, UnitFamily::Hash), "999 MH");
        assert_eq!(FormatUtils::format_rate(100.0e3, UnitFamily::Graph), "100 Kg");
    }

    #[test]
    fn test_format_rate_caps_at_largest_prefix() {
        assert_eq!(FormatUtils::format_rate(5.0e21, UnitFamily::Hash), "5000 EH");
    }

    #[test]
    fn test_post_formats() {
        assert_eq!(FormatUtils::format_hashrate(250.0e6), "250 MH/s");
        assert_eq!(FormatUtils::format_graph_rate(12_345.0), "12.3 Kg");
    }

    #[test]
    fn test_format_thousands() {
        assert_eq!(FormatUtils::format_thousands(0), "0");
        assert_eq!(FormatUtils::format_thousands(999), "999");
        assert_eq!(FormatUtils::format_thousands(1_000), "1,000");
        assert_eq!(FormatUtils::format_thousands(12_345_678), "12,345,678");
    }

    #[test]
    fn test_truncate_with_ellipsis() {
        assert_eq!(FormatUtils::truncate_with_ellipsis("short", 80), "short");
        assert_eq!(FormatUtils::truncate_with_ellipsis("abcdefghij", 8), "abcde...");
        assert_eq!(FormatUtils::truncate_with_ellipsis("ééééé", 4), "é...");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(FormatUtils::format_duration(Duration::from_secs(42)), "42s");
        assert_eq!(FormatUtils::format_duration(Duration::from_secs(125)), "2m 5s");
        assert_eq!(FormatUtils::format_duration(Duration::from_secs(7_260)), "2h 1m");
    }
}

// Changelog:
// - v1.2.0 (2026-09-30): Shared breakpoint table for hash and graph families.
//   - format_rate is the single implementation behind format_hashrate and
//     format_graph_rate, so posts and the history tools round identically.
// - v1.1.0 (2026-08-12): Added format_thousands and truncate_with_ellipsis.
// - v1.0.0 (2026-07-01): Initial hashrate and duration formatting.
