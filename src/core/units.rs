// Tari Faqqer - Free and Open Source Software Statement
//
// This project, faqqer, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/core/units.rs
// Version: 1.1.0
// Developer: Tari Faqqer Contributors
//
// This file parses hash rate tokens such as "3.70 GH/s" or "120 Kg" into base
// units (H/s or g/s). Display formatting lives in utils/format.rs.
//
// Tree Location:
// - src/core/units.rs (hash rate token parsing)
// - Depends on: std

use std::fmt;

/// Unit families used by the Tari network stats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitFamily {
    /// Hashes per second (SHA3x, RandomX)
    Hash,
    /// Graphs per second (Cuckaroo 29)
    Graph,
}

impl UnitFamily {
    /// Display symbols from base unit up, one per power of 1000
    pub const fn symbols(&self) -> [&'static str; 7] {
        match self {
            UnitFamily::Hash => ["H", "kH", "MH", "GH", "TH", "PH", "EH"],
            UnitFamily::Graph => ["g", "Kg", "Mg", "Gg", "Tg", "Pg", "Eg"],
        }
    }
}

impl fmt::Display for UnitFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitFamily::Hash => write!(f, "hash"),
            UnitFamily::Graph => write!(f, "graph"),
        }
    }
}

/// A magnitude in base units together with its family
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitQuantity {
    pub magnitude: f64,
    pub family: UnitFamily,
}

impl UnitQuantity {
    pub const fn new(magnitude: f64, family: UnitFamily) -> Self {
        Self { magnitude, family }
    }

    /// Value expressed in a multiple of the base unit (1e12 for TH, 1e3 for Kg, ...)
    pub fn in_scale(&self, scale: f64) -> f64 {
        self.magnitude / scale
    }
}

/// A successfully parsed token
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedRate {
    pub quantity: UnitQuantity,
    /// Multiplier applied to the written number (1e9 for "GH")
    pub scale: f64,
}

/// Outcome of parsing one token. Unrecognized input is never coerced to zero.
#[derive(Debug, Clone, PartialEq)]
pub enum RateParse {
    Parsed(ParsedRate),
    /// A number without any unit token; the caller decides the family
    Unitless(f64),
    Unparsed { input: String, reason: String },
}

impl RateParse {
    /// Base-unit quantity, using `expected` for unitless numbers.
    ///
    /// A unit from the other family is rejected.
    pub fn quantity_in(&self, expected: UnitFamily) -> Option<UnitQuantity> {
        match self {
            RateParse::Parsed(parsed) if parsed.quantity.family == expected => Some(parsed.quantity),
            RateParse::Parsed(_) => None,
            RateParse::Unitless(value) => Some(UnitQuantity::new(*value, expected)),
            RateParse::Unparsed { .. } => None,
        }
    }

    pub fn is_unparsed(&self) -> bool {
        matches!(self, RateParse::Unparsed { .. })
    }
}

/// Parser for hash rate tokens
pub struct HashRateValueParser;

impl HashRateValueParser {
    /// Parse "<number>[ ]<unit>[/s]".
    ///
    /// Prefixes are case-insensitive, so "kH", "KH", "kg", "KG" are accepted.
    /// Trailing text after the unit token is ignored.
    pub fn parse(text: &str) -> RateParse {
        let trimmed = text.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("n/a") {
            return Self::unparsed(text, "no value");
        }

        let number_end = trimmed
            .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == ','))
            .unwrap_or(trimmed.len());
        let number_str: String = trimmed[..number_end].chars().filter(|c| *c != ',').collect();
        let number = match number_str.parse::<f64>() {
            Ok(n) if n.is_finite() => n,
            _ => return Self::unparsed(text, "missing or malformed number"),
        };

        let unit_token: String = trimmed[number_end..]
            .trim_start()
            .chars()
            .take_while(|c| c.is_ascii_alphabetic() || *c == '/')
            .collect();
        if unit_token.is_empty() {
            return RateParse::Unitless(number);
        }

        match Self::unit_scale(&unit_token) {
            Some((family, scale)) => RateParse::Parsed(ParsedRate {
                quantity: UnitQuantity::new(number * scale, family),
                scale,
            }),
            None => Self::unparsed(text, &format!("unknown unit '{}'", unit_token)),
        }
    }

    /// Resolve a unit token to its family and multiplier
    pub fn unit_scale(token: &str) -> Option<(UnitFamily, f64)> {
        let unit = token.strip_suffix("/s").unwrap_or(token);
        let unit = match unit {
            "kgraphs" | "Kgraphs" => "Kg",
            "graphs" => "g",
            other => other,
        };

        let mut chars = unit.chars();
        let last = chars.next_back()?;
        let family = match last {
            'H' | 'h' => UnitFamily::Hash,
            'g' | 'G' => UnitFamily::Graph,
            _ => return None,
        };

        let prefix = chars.as_str();
        let scale = match prefix.to_ascii_lowercase().as_str() {
            "" => 1.0,
            "k" => 1e3,
            "m" => 1e6,
            "g" => 1e9,
            "t" => 1e12,
            "p" => 1e15,
            "e" => 1e18,
            _ => return None,
        };

        // A lone "G" would read as giga-nothing
        if prefix.is_empty() && last == 'G' {
            return None;
        }
        Some((family, scale))
    }

    fn unparsed(input: &str, reason: &str) -> RateParse {
        RateParse::Unparsed {
            input: input.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(text: &str) -> ParsedRate {
        match HashRateValueParser::parse(text) {
            RateParse::Parsed(p) => p,
            other => panic!("expected parsed value for {text:?}, got {other:?}"),
        }
    }

    fn assert_close(actual: f64, expected: f64) {
        let tolerance = expected.abs() * 1e-12;
        assert!((actual - expected).abs() <= tolerance, "{actual} != {expected}");
    }

    #[test]
    fn test_parse_gigahash() {
        let p = parsed("3.70 GH");
        assert_eq!(p.quantity.family, UnitFamily::Hash);
        assert_close(p.quantity.magnitude, 3.7e9);
        assert_eq!(p.scale, 1e9);
    }

    #[test]
    fn test_parse_kilograph() {
        let p = parsed("120 Kg");
        assert_eq!(p.quantity.family, UnitFamily::Graph);
        assert_close(p.quantity.magnitude, 1.2e5);
    }

    #[test]
    fn test_parse_accepts_rate_suffix_and_case() {
        assert_close(parsed("47.0 TH/s").quantity.magnitude, 4.7e13);
        assert_close(parsed("250MH").quantity.magnitude, 2.5e8);
        assert_close(parsed("12 KH/s").quantity.magnitude, 1.2e4);
        assert_close(parsed("12 kh").quantity.magnitude, 1.2e4);
        assert_close(parsed("3 KG").quantity.magnitude, 3e3);
        assert_close(parsed("1.5 Mg").quantity.magnitude, 1.5e6);
        assert_close(parsed("8 kgraphs").quantity.magnitude, 8e3);
        assert_close(parsed("999 H/s").quantity.magnitude, 999.0);
    }

    #[test]
    fn test_parse_garbage_is_unparsed_not_zero() {
        assert!(HashRateValueParser::parse("garbage").is_unparsed());
        assert!(HashRateValueParser::parse("").is_unparsed());
        assert!(HashRateValueParser::parse("N/A").is_unparsed());
        assert!(HashRateValueParser::parse("12 XB").is_unparsed());
        assert!(HashRateValueParser::parse("12 G").is_unparsed());
    }

    #[test]
    fn test_parse_zero_is_a_value() {
        let p = parsed("0 GH");
        assert_eq!(p.quantity.magnitude, 0.0);
    }

    #[test]
    fn test_unitless_uses_expected_family() {
        let outcome = HashRateValueParser::parse("1,234");
        assert_eq!(outcome, RateParse::Unitless(1234.0));
        let q = outcome.quantity_in(UnitFamily::Graph).unwrap();
        assert_eq!(q.family, UnitFamily::Graph);
    }

    #[test]
    fn test_wrong_family_is_rejected() {
        let outcome = HashRateValueParser::parse("120 Kg");
        assert!(outcome.quantity_in(UnitFamily::Hash).is_none());
        assert!(outcome.quantity_in(UnitFamily::Graph).is_some());
    }
}

// Changelog:
// - v1.1.0 (2026-09-30): Explicit outcomes for unparsed and unitless tokens.
//   - Unknown units are returned as RateParse::Unparsed with a reason instead
//     of silently producing no value.
// - v1.0.0 (2026-08-20): Initial token parser for the hash rate history tools.
