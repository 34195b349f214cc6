// Tari Faqqer - Free and Open Source Software Statement
//
// This project, faqqer, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/jobs/customer_analysis.rs
// Version: 1.2.0
// Developer: Tari Faqqer Contributors
//
// This file runs the customer-support analysis end to end: archive the
// configured channels for the requested window, send the combined text to
// the model, render the chat report and post it in parts. Scheduled runs and
// /analyze_support requests share one guard, so at most one analysis is in
// flight and a request arriving during a run is refused.
//
// Tree Location:
// - src/jobs/customer_analysis.rs (support analysis job)
// - Depends on: archive, llm::analysis, chat

use super::scheduler::Job;
use crate::archive::{ChannelHistoryFetcher, archive_channels, window_hours};
use crate::chat::{ChatTarget, MessageSender};
use crate::config::AppConfig;
use crate::core::types::OutputFormat;
use crate::llm::analysis::{
    AnalysisReport, CustomerAnalyzer, ReportContext, format_no_messages, format_parse_failure,
    format_report, format_run_error, format_service_error, format_unavailable, split_message,
};
use async_trait::async_trait;
use chrono::Utc;
use log::{error, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

const LOG_TARGET: &str = "tari::faqqer::jobs::customer_analysis";

/// Outcome of a triggered analysis
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisRun {
    /// Another analysis was already running
    Busy,
    /// Report posted; `delivered` of `parts` parts were accepted
    Posted { parts: usize, delivered: usize },
}

pub struct CustomerAnalysisJob {
    config: Arc<AppConfig>,
    fetcher: ChannelHistoryFetcher,
    analyzer: CustomerAnalyzer,
    sender: Arc<dyn MessageSender>,
    running: Mutex<()>,
}

impl CustomerAnalysisJob {
    pub fn new(
        config: Arc<AppConfig>,
        fetcher: ChannelHistoryFetcher,
        analyzer: CustomerAnalyzer,
        sender: Arc<dyn MessageSender>,
    ) -> Self {
        Self {
            config,
            fetcher,
            analyzer,
            sender,
            running: Mutex::new(()),
        }
    }

    fn context(&self, hours: u64, topic: Option<&str>) -> ReportContext {
        ReportContext {
            generated_at: Utc::now(),
            hours,
            channels: self.config.analysis.channels.clone(),
            topic: topic.map(str::to_string),
            max_example_length: self.config.analysis.max_example_length,
        }
    }

    /// Report text for the last `hours`, already split into postable parts.
    ///
    /// Every failure becomes a report variant; this never errors.
    pub async fn build_report(&self, hours: u64, topic: Option<&str>) -> Vec<String> {
        let ctx = self.context(hours, topic);
        let text = self.report_text(&ctx, hours, topic).await;
        split_message(&text, self.config.analysis.max_message_length)
    }

    async fn report_text(&self, ctx: &ReportContext, hours: u64, topic: Option<&str>) -> String {
        let outcome = match archive_channels(
            &self.fetcher,
            &self.config.analysis.channels,
            window_hours(hours),
            &self.config.analysis.work_dir,
            OutputFormat::Text,
            None,
        )
        .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(target: LOG_TARGET, "Archiving for analysis failed: {}", e);
                return format_run_error(ctx, &e.to_string());
            }
        };

        if outcome.stats.history_unavailable() {
            warn!(target: LOG_TARGET, "No channel history is readable with this account");
            return format_unavailable(ctx);
        }
        if outcome.stats.total_messages == 0 {
            info!(target: LOG_TARGET, "No messages in the last {} hours", hours);
            return format_no_messages(ctx);
        }

        info!(
            target: LOG_TARGET,
            "Analyzing {} messages from {} senders",
            outcome.stats.total_messages,
            outcome.stats.unique_senders
        );
        let raw = match self.analyzer.analyze(&outcome.document, topic).await {
            Ok(raw) => raw,
            Err(e) => {
                error!(target: LOG_TARGET, "Analysis request failed: {}", e);
                return format_service_error(ctx);
            }
        };

        match AnalysisReport::decode(&raw) {
            Ok(report) => format_report(&report, ctx),
            Err(e) => {
                error!(target: LOG_TARGET, "Analysis reply could not be decoded: {}", e);
                format_parse_failure(ctx, &e)
            }
        }
    }

    /// Run the analysis and post it to `target`, unless one is already running
    pub async fn trigger(
        &self,
        target: &ChatTarget,
        reply_to: Option<i64>,
        hours: u64,
        topic: Option<&str>,
    ) -> AnalysisRun {
        let Ok(_running) = self.running.try_lock() else {
            warn!(target: LOG_TARGET, "Analysis already in progress, request refused");
            return AnalysisRun::Busy;
        };

        let parts = self.build_report(hours, topic).await;
        let delay = Duration::from_millis(self.config.analysis.part_delay_ms);
        let mut delivered = 0;
        for (index, part) in parts.iter().enumerate() {
            if index > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            let reply = if index == 0 { reply_to } else { None };
            match self.sender.send_message(target, part, reply).await {
                Ok(()) => delivered += 1,
                Err(e) => error!(
                    target: LOG_TARGET,
                    "Failed to post report part {}/{} to {}: {}",
                    index + 1,
                    parts.len(),
                    target,
                    e
                ),
            }
        }
        info!(target: LOG_TARGET, "Posted {}/{} report parts to {}", delivered, parts.len(), target);
        AnalysisRun::Posted {
            parts: parts.len(),
            delivered,
        }
    }
}

#[async_trait]
impl Job for CustomerAnalysisJob {
    fn name(&self) -> &str {
        "customer-analysis"
    }

    async fn run_once(&self) -> crate::Result<()> {
        let target = ChatTarget::Id(self.config.analysis.customer_service_group);
        match self.trigger(&target, None, self.config.analysis.hours, None).await {
            AnalysisRun::Busy => Ok(()),
            AnalysisRun::Posted { delivered: 0, .. } => {
                Err(format!("no report part could be posted to {}", target).into())
            }
            AnalysisRun::Posted { .. } => Ok(()),
        }
    }
}

// Changelog:
// - v1.2.0 (2026-09-30): Scheduled and requested runs share one guard.
// - v1.1.0 (2026-08-12): Topic-focused analysis from /analyze_support.
// - v1.0.0 (2026-07-01): Scheduled customer-support analysis.
