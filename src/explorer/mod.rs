// Tari Faqqer - Free and Open Source Software Statement
//
// This project, faqqer, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/explorer/mod.rs
// Version: 1.1.0
// Developer: Tari Faqqer Contributors
//
// This file queries the block explorer's JSON status document for the tip
// height and the per-algorithm network hash rates. Counters arrive as JSON
// numbers or as strings with thousands separators; a counter that cannot be
// read is left out rather than reported as zero.
//
// Tree Location:
// - src/explorer/mod.rs (explorer status client)
// - Depends on: reqwest, serde_json

use async_trait::async_trait;
use log::{debug, warn};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

const LOG_TARGET: &str = "tari::faqqer::explorer";

#[derive(Error, Debug)]
pub enum ExplorerError {
    #[error("HTTP request to explorer failed")]
    Http {
        #[from]
        source: reqwest::Error,
    },

    #[error("Explorer returned status {status}")]
    Status { status: u16 },
}

/// Latest network statistics. Hash rates are in H/s, Cuckaroo in g/s.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NetworkStats {
    pub block_height: Option<u64>,
    pub sha3x_hashrate: Option<f64>,
    pub monero_randomx_hashrate: Option<f64>,
    pub tari_randomx_hashrate: Option<f64>,
    pub cuckaroo_rate: Option<f64>,
}

impl NetworkStats {
    /// Read the stats out of the explorer's JSON document
    pub fn from_json(doc: &Value) -> Self {
        let block_height = doc
            .pointer("/tipInfo/metadata/best_block_height")
            .and_then(lenient_number)
            .filter(|h| *h >= 0.0)
            .map(|h| h as u64);
        if block_height.is_none() {
            warn!(target: LOG_TARGET, "Explorer response has no readable block height");
        }

        Self {
            block_height,
            sha3x_hashrate: counter(doc, "currentSha3xHashRate"),
            monero_randomx_hashrate: counter(doc, "currentMoneroRandomxHashRate"),
            tari_randomx_hashrate: counter(doc, "currentTariRandomxHashRate"),
            cuckaroo_rate: counter(doc, "currentCuckarooHashRate"),
        }
    }
}

fn counter(doc: &Value, key: &str) -> Option<f64> {
    let value = doc.get(key).and_then(lenient_number);
    if value.is_none() {
        warn!(target: LOG_TARGET, "Explorer field '{}' missing or unreadable", key);
    }
    value
}

/// A JSON number, or a string such as "1,234,567" or "12.5"
pub fn lenient_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
            cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
        }
        _ => None,
    }
}

/// Anything that can report the current network statistics
#[async_trait]
pub trait StatsSource: Send + Sync {
    async fn fetch_network_stats(&self) -> Result<NetworkStats, ExplorerError>;
}

/// Client for one explorer endpoint
#[derive(Clone)]
pub struct ExplorerClient {
    http: reqwest::Client,
    url: String,
}

impl ExplorerClient {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, ExplorerError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            url: url.to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl StatsSource for ExplorerClient {
    async fn fetch_network_stats(&self) -> Result<NetworkStats, ExplorerError> {
        let response = self.http.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ExplorerError::Status {
                status: status.as_u16(),
            });
        }
        let doc: Value = response.json().await?;
        let stats = NetworkStats::from_json(&doc);
        debug!(target: LOG_TARGET, "Network stats from {}: {:?}", self.url, stats);
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_mixed_encodings() {
        let doc = json!({
            "tipInfo": {"metadata": {"best_block_height": "45,210"}},
            "currentSha3xHashRate": "47,312,000,000,000",
            "currentMoneroRandomxHashRate": 3_700_000_000u64,
            "currentTariRandomxHashRate": "250000000",
            "currentCuckarooHashRate": 120000.5
        });
        let stats = NetworkStats::from_json(&doc);
        assert_eq!(stats.block_height, Some(45_210));
        assert_eq!(stats.sha3x_hashrate, Some(47.312e12));
        assert_eq!(stats.monero_randomx_hashrate, Some(3.7e9));
        assert_eq!(stats.tari_randomx_hashrate, Some(2.5e8));
        assert_eq!(stats.cuckaroo_rate, Some(120000.5));
    }

    #[test]
    fn test_missing_fields_are_absent_not_zero() {
        let doc = json!({
            "tipInfo": {"metadata": {"best_block_height": 10}},
            "currentSha3xHashRate": 0,
            "currentCuckarooHashRate": "n/a"
        });
        let stats = NetworkStats::from_json(&doc);
        assert_eq!(stats.block_height, Some(10));
        assert_eq!(stats.sha3x_hashrate, Some(0.0));
        assert_eq!(stats.monero_randomx_hashrate, None);
        assert_eq!(stats.cuckaroo_rate, None);
    }

    #[test]
    fn test_lenient_number_rejects_other_types() {
        assert_eq!(lenient_number(&json!(null)), None);
        assert_eq!(lenient_number(&json!([1])), None);
        assert_eq!(lenient_number(&json!(" 1,000 ")), Some(1000.0));
    }
}

// Changelog:
// - v1.1.0 (2026-09-30): Unreadable counters are absent instead of failing the fetch.
// - v1.0.0 (2026-07-01): Initial explorer client.
