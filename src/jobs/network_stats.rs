// Tari Faqqer - Free and Open Source Software Statement
//
// This project, faqqer, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/jobs/network_stats.rs
// Version: 1.1.0
// Developer: Tari Faqqer Contributors
//
// This file builds the scheduled network announcements: the block height
// reminder (mainnet groups and the nextnet group) and the hash power report.
// The hash power report is the exact post format the history extractor
// reads back, so the two must change together.
//
// Tree Location:
// - src/jobs/network_stats.rs (block height and hash power announcements)
// - Depends on: explorer, jobs::broadcast, utils::format, rand

use super::broadcast::broadcast;
use super::scheduler::Job;
use crate::chat::{ChatTarget, MessageSender};
use crate::explorer::{NetworkStats, StatsSource};
use crate::hashrate::extractor::{BLOCK_HEIGHT_LABEL, REPORT_HEADER};
use crate::utils::format::FormatUtils;
use async_trait::async_trait;
use log::{info, warn};
use rand::seq::SliceRandom;
use std::sync::Arc;

const LOG_TARGET: &str = "tari::faqqer::jobs::network_stats";

pub const SAMPLE_QUESTIONS: [&str; 6] = [
    "What are gems?",
    "What is Tari Universe?",
    "What is tXTM?",
    "What is the reward for mining?",
    "When will I earn tXTM?",
    "What is the block height?",
];

const NOT_AVAILABLE: &str = "N/A";

/// Which network an announcement is about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    Mainnet,
    Nextnet,
}

/// Block height reminder text
pub fn block_height_message(network: Network, height: u64, sample_question: &str) -> String {
    match network {
        Network::Mainnet => format!(
            "Current Tari block height: ~{}. Got a question? Type e.g. '/faq {}' in any language to get answers to recent questions.",
            FormatUtils::format_thousands(height),
            sample_question
        ),
        Network::Nextnet => format!(
            "Nextnet block height: ~{}. Try /faq <question> to get your question answered first.",
            FormatUtils::format_thousands(height)
        ),
    }
}

pub fn random_sample_question() -> &'static str {
    SAMPLE_QUESTIONS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(SAMPLE_QUESTIONS[0])
}

/// Hash power report, or `None` when the block height is unknown
pub fn hash_power_message(stats: &NetworkStats) -> Option<String> {
    let height = stats.block_height?;
    let hash = |value: Option<f64>| {
        value
            .map(FormatUtils::format_hashrate)
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    };
    let graphs = stats
        .cuckaroo_rate
        .map(FormatUtils::format_graph_rate)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    Some(format!(
        "{}\n{} {}\nRandomX (Tari): {}\nRandomX (Merged-Mined XMR): {}\nSHA3x: {}\nCuckaroo 29: {}\n\n\
         Want to learn more? Try '/faq mining' to get information about mining Tari.",
        REPORT_HEADER,
        BLOCK_HEIGHT_LABEL,
        FormatUtils::format_thousands(height),
        hash(stats.tari_randomx_hashrate),
        hash(stats.monero_randomx_hashrate),
        hash(stats.sha3x_hashrate),
        graphs
    ))
}

/// Posts the block height reminder to a set of groups
pub struct BlockHeightJob {
    name: String,
    network: Network,
    stats: Arc<dyn StatsSource>,
    sender: Arc<dyn MessageSender>,
    targets: Vec<ChatTarget>,
}

impl BlockHeightJob {
    pub fn new(
        network: Network,
        stats: Arc<dyn StatsSource>,
        sender: Arc<dyn MessageSender>,
        targets: Vec<ChatTarget>,
    ) -> Self {
        let name = match network {
            Network::Mainnet => "block-height",
            Network::Nextnet => "nextnet-block-height",
        };
        Self {
            name: name.to_string(),
            network,
            stats,
            sender,
            targets,
        }
    }
}

#[async_trait]
impl Job for BlockHeightJob {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run_once(&self) -> crate::Result<()> {
        let stats = self.stats.fetch_network_stats().await?;
        let Some(height) = stats.block_height else {
            warn!(target: LOG_TARGET, "No block height available, skipping announcement");
            return Ok(());
        };
        let text = block_height_message(self.network, height, random_sample_question());
        let report = broadcast(self.sender.as_ref(), &self.targets, &text).await;
        info!(
            target: LOG_TARGET,
            "Block height {} announced to {}/{} groups",
            height,
            report.delivered.len(),
            self.targets.len()
        );
        Ok(())
    }
}

/// Posts the per-algorithm hash power report
pub struct HashPowerJob {
    stats: Arc<dyn StatsSource>,
    sender: Arc<dyn MessageSender>,
    targets: Vec<ChatTarget>,
}

impl HashPowerJob {
    pub fn new(stats: Arc<dyn StatsSource>, sender: Arc<dyn MessageSender>, targets: Vec<ChatTarget>) -> Self {
        Self {
            stats,
            sender,
            targets,
        }
    }
}

#[async_trait]
impl Job for HashPowerJob {
    fn name(&self) -> &str {
        "hash-power"
    }

    async fn run_once(&self) -> crate::Result<()> {
        let stats = self.stats.fetch_network_stats().await?;
        let Some(text) = hash_power_message(&stats) else {
            warn!(target: LOG_TARGET, "No block height available, skipping hash power report");
            return Ok(());
        };
        let report = broadcast(self.sender.as_ref(), &self.targets, &text).await;
        info!(
            target: LOG_TARGET,
            "Hash power report posted to {}/{} groups",
            report.delivered.len(),
            self.targets.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hashrate::HashRatePostExtractor;
    use chrono::Utc;

    #[test]
    fn test_block_height_messages() {
        assert_eq!(
            block_height_message(Network::Mainnet, 45210, "What are gems?"),
            "Current Tari block height: ~45,210. Got a question? Type e.g. '/faq What are gems?' in any language to get answers to recent questions."
        );
        assert_eq!(
            block_height_message(Network::Nextnet, 45210, "unused"),
            "Nextnet block height: ~45,210. Try /faq <question> to get your question answered first."
        );
        assert!(SAMPLE_QUESTIONS.contains(&random_sample_question()));
    }

    #[test]
    fn test_hash_power_message_reads_back() {
        let stats = NetworkStats {
            block_height: Some(45210),
            sha3x_hashrate: Some(47.31e12),
            monero_randomx_hashrate: Some(3.7e9),
            tari_randomx_hashrate: None,
            cuckaroo_rate: Some(120_000.0),
        };
        let text = hash_power_message(&stats).unwrap();
        assert!(text.starts_with("📊 Current Tari Network Stats 📊\nBlock Height: 45,210\n"));
        assert!(text.contains("RandomX (Tari): N/A\n"));
        assert!(text.contains("RandomX (Merged-Mined XMR): 3.70 GH/s\n"));
        assert!(text.contains("SHA3x: 47.3 TH/s\n"));
        assert!(text.contains("Cuckaroo 29: 120 Kg\n"));

        let (sample, diagnostics) = HashRatePostExtractor::extract_fields(&text, Utc::now());
        // N/A is reported as unreadable and left empty
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].field, "rxt");
        assert_eq!(sample.block_height, Some(45210));
        assert_eq!(sample.rxt_gh, None);
        assert!((sample.rxm_gh.unwrap() - 3.7).abs() < 1e-9);
        assert!((sample.sha3_th.unwrap() - 47.3).abs() < 1e-9);
    }

    #[test]
    fn test_hash_power_message_needs_height() {
        assert_eq!(hash_power_message(&NetworkStats::default()), None);
    }
}

// Changelog:
// - v1.1.0 (2026-09-30): Absent rates print N/A instead of zero.
// - v1.0.0 (2026-07-01): Block height and hash power announcements.
