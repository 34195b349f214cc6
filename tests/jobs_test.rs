// Tari Faqqer - Free and Open Source Software Statement
//
// This project, faqqer, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: tests/jobs_test.rs
// Version: 1.2.0
// Developer: Tari Faqqer Contributors
//
// This file contains tests for the job runner's non-overlap guard, the
// broadcast helper, the network announcements and the support analysis job.

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::{Duration as ChronoDuration, Utc};
    use faqqer::archive::ChannelHistoryFetcher;
    use faqqer::chat::{ChatError, ChatTarget, MessageHistory, MessageSender};
    use faqqer::config::AppConfig;
    use faqqer::core::types::{MediaRef, Message};
    use faqqer::explorer::{ExplorerError, NetworkStats, StatsSource};
    use faqqer::jobs::{
        AnalysisRun, BlockHeightJob, CustomerAnalysisJob, HashPowerJob, Job, JobRunner, JobScheduler,
        Network, broadcast,
    };
    use faqqer::llm::{CompletionClient, CompletionRequest, CustomerAnalyzer, LlmError};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tempfile::{TempDir, tempdir};
    use tokio::sync::{Notify, oneshot};

    // Records what was sent; targets listed in `reject` fail
    #[derive(Default)]
    struct RecordingSender {
        sent: Mutex<Vec<(ChatTarget, String, Option<i64>)>>,
        reject: Vec<ChatTarget>,
    }

    #[async_trait]
    impl MessageSender for RecordingSender {
        async fn send_message(&self, target: &ChatTarget, text: &str, reply_to: Option<i64>) -> Result<(), ChatError> {
            if self.reject.contains(target) {
                return Err(ChatError::Api {
                    method: "sendMessage".to_string(),
                    description: "Forbidden: bot was kicked".to_string(),
                });
            }
            self.sent
                .lock()
                .unwrap()
                .push((target.clone(), text.to_string(), reply_to));
            Ok(())
        }
    }

    struct FixedStats(NetworkStats);

    #[async_trait]
    impl StatsSource for FixedStats {
        async fn fetch_network_stats(&self) -> Result<NetworkStats, ExplorerError> {
            Ok(self.0.clone())
        }
    }

    fn stats() -> NetworkStats {
        NetworkStats {
            block_height: Some(45_210),
            sha3x_hashrate: Some(47.31e12),
            monero_randomx_hashrate: Some(3.7e9),
            tari_randomx_hashrate: Some(2.5e8),
            cuckaroo_rate: Some(120_000.0),
        }
    }

    #[tokio::test]
    async fn test_broadcast_continues_after_failure() {
        let sender = RecordingSender {
            reject: vec![ChatTarget::Id(-2)],
            ..Default::default()
        };
        let targets = vec![ChatTarget::Id(-1), ChatTarget::Id(-2), ChatTarget::Id(-3)];

        let report = broadcast(&sender, &targets, "hello").await;

        assert_eq!(report.delivered, vec![ChatTarget::Id(-1), ChatTarget::Id(-3)]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, ChatTarget::Id(-2));
        assert!(!report.all_delivered());
    }

    #[tokio::test]
    async fn test_block_height_job_posts_to_every_group() {
        let sender = Arc::new(RecordingSender::default());
        let job = BlockHeightJob::new(
            Network::Mainnet,
            Arc::new(FixedStats(stats())),
            sender.clone(),
            vec![ChatTarget::Id(-1), ChatTarget::Id(-2)],
        );

        job.run_once().await.unwrap();

        let sent = sender.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert!(sent[0].1.starts_with("Current Tari block height: ~45,210. Got a question?"));
        assert_eq!(sent[0].1, sent[1].1);
    }

    #[tokio::test]
    async fn test_jobs_skip_without_block_height() {
        let sender = Arc::new(RecordingSender::default());
        let source = Arc::new(FixedStats(NetworkStats::default()));
        let targets = vec![ChatTarget::Id(-1)];

        BlockHeightJob::new(Network::Nextnet, source.clone(), sender.clone(), targets.clone())
            .run_once()
            .await
            .unwrap();
        HashPowerJob::new(source, sender.clone(), targets).run_once().await.unwrap();

        assert!(sender.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_hash_power_job_message() {
        let sender = Arc::new(RecordingSender::default());
        let job = HashPowerJob::new(Arc::new(FixedStats(stats())), sender.clone(), vec![ChatTarget::Id(-1)]);

        job.run_once().await.unwrap();

        let sent = sender.sent.lock().unwrap();
        assert_eq!(
            sent[0].1,
            "📊 Current Tari Network Stats 📊\n\
             Block Height: 45,210\n\
             RandomX (Tari): 250 MH/s\n\
             RandomX (Merged-Mined XMR): 3.70 GH/s\n\
             SHA3x: 47.3 TH/s\n\
             Cuckaroo 29: 120 Kg\n\n\
             Want to learn more? Try '/faq mining' to get information about mining Tari."
        );
    }

    // Blocks inside run_once until released
    struct GatedJob {
        runs: AtomicUsize,
        started: Mutex<Option<oneshot::Sender<()>>>,
        release: Notify,
    }

    #[async_trait]
    impl Job for GatedJob {
        fn name(&self) -> &str {
            "gated"
        }

        async fn run_once(&self) -> faqqer::Result<()> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            if let Some(started) = self.started.lock().unwrap().take() {
                let _ = started.send(());
            }
            self.release.notified().await;
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_runner_skips_while_running() {
        let (started_tx, started_rx) = oneshot::channel();
        let job = Arc::new(GatedJob {
            runs: AtomicUsize::new(0),
            started: Mutex::new(Some(started_tx)),
            release: Notify::new(),
        });
        let runner = JobRunner::new(job.clone());

        let first = tokio::spawn({
            let runner = runner.clone();
            async move { runner.run_now().await }
        });
        started_rx.await.unwrap();

        assert!(!runner.run_now().await);
        job.release.notify_one();
        assert!(first.await.unwrap());
        assert_eq!(job.runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_scheduler_shutdown_stops_idle_triggers() {
        let job = Arc::new(GatedJob {
            runs: AtomicUsize::new(0),
            started: Mutex::new(None),
            release: Notify::new(),
        });
        let mut scheduler = JobScheduler::new();
        scheduler.add(
            JobRunner::new(job.clone()),
            faqqer::jobs::CronSchedule::parse("0 0 * * *").unwrap(),
        );
        assert_eq!(scheduler.len(), 1);

        tokio::time::timeout(Duration::from_secs(5), scheduler.shutdown())
            .await
            .unwrap();
        assert_eq!(job.runs.load(Ordering::SeqCst), 0);
    }

    // Channel history for the analysis job
    enum Channel {
        Messages(Vec<Message>),
        BotOnly,
    }

    struct AnalysisHistory(Channel);

    #[async_trait]
    impl MessageHistory for AnalysisHistory {
        async fn fetch_page(&self, channel: &str, _limit: usize, before: Option<i64>) -> Result<Vec<Message>, ChatError> {
            match &self.0 {
                Channel::BotOnly => Err(ChatError::HistoryUnavailable {
                    channel: channel.to_string(),
                }),
                Channel::Messages(messages) if before.is_none() => Ok(messages.clone()),
                Channel::Messages(_) => Ok(Vec::new()),
            }
        }

        async fn download_media(&self, _channel: &str, media: &MediaRef) -> Result<Vec<u8>, ChatError> {
            Err(ChatError::MediaUnavailable {
                locator: media.locator.clone(),
            })
        }
    }

    struct CannedCompletion(&'static str);

    #[async_trait]
    impl CompletionClient for CannedCompletion {
        async fn complete(&self, _request: &CompletionRequest) -> Result<String, LlmError> {
            Ok(self.0.to_string())
        }
    }

    const REPORT: &str = r#"{"analysis_summary": "Sync trouble", "total_issues_found": 2,
        "categories": [{"category": "Node setup and sync issues", "count": 2, "representative_example": "node stuck at 99%"}]}"#;

    fn analysis_job(channel: Channel, reply: &'static str, sender: Arc<RecordingSender>) -> (CustomerAnalysisJob, TempDir) {
        let work_dir = tempdir().unwrap();
        let mut config = AppConfig::default();
        config.analysis.channels = vec!["support".to_string()];
        config.analysis.work_dir = work_dir.path().to_path_buf();
        config.analysis.part_delay_ms = 0;
        config.analysis.max_message_length = 200;
        let config = Arc::new(config);

        let fetcher = ChannelHistoryFetcher::new(Arc::new(AnalysisHistory(channel)), 100, Duration::ZERO);
        let analyzer = CustomerAnalyzer::new(Arc::new(CannedCompletion(reply)), &config);
        (CustomerAnalysisJob::new(config, fetcher, analyzer, sender), work_dir)
    }

    fn recent_messages() -> Vec<Message> {
        let now = Utc::now();
        vec![
            Message::new(2, now - ChronoDuration::minutes(5), Some("bob".into()), Some("node stuck at 99%".into()), None),
            Message::new(1, now - ChronoDuration::minutes(30), Some("alice".into()), Some("sync broken".into()), None),
        ]
    }

    #[tokio::test]
    async fn test_analysis_report_is_posted_in_parts() {
        let sender = Arc::new(RecordingSender::default());
        let (job, work_dir) = analysis_job(Channel::Messages(recent_messages()), REPORT, sender.clone());
        let target = ChatTarget::Id(-77);

        let run = job.trigger(&target, Some(5), 3, None).await;

        let sent = sender.sent.lock().unwrap();
        assert_eq!(run, AnalysisRun::Posted { parts: sent.len(), delivered: sent.len() });
        assert!(sent.len() > 1);
        assert_eq!(sent[0].2, Some(5));
        assert!(sent[1..].iter().all(|(t, text, reply)| *t == target && text.starts_with("**(continued...)**\n") && reply.is_none()));
        let joined: String = sent
            .iter()
            .map(|(_, text, _)| text.trim_start_matches("**(continued...)**\n"))
            .collect();
        assert!(joined.contains("1. **Node setup and sync issues** (2 people)"));
        assert!(work_dir.path().join("combined_channel_history.txt").exists());
    }

    #[tokio::test]
    async fn test_analysis_report_variants() {
        let sender = Arc::new(RecordingSender::default());

        let (job, _dir) = analysis_job(Channel::BotOnly, REPORT, sender.clone());
        assert!(job.build_report(3, None).await.concat().contains("Analysis Unavailable"));

        let (job, _dir) = analysis_job(Channel::Messages(Vec::new()), REPORT, sender.clone());
        assert!(job.build_report(3, None).await.concat().contains("No messages found in the last 3 hours"));

        let (job, _dir) = analysis_job(Channel::Messages(recent_messages()), "not json", sender.clone());
        assert!(job.build_report(3, None).await.concat().contains("could not be parsed"));

        assert!(sender.sent.lock().unwrap().is_empty());
    }
}

// Changelog:
// - v1.2.0 (2026-09-30): Support analysis job coverage.
// - v1.1.0 (2026-08-12): Non-overlap guard tests.
// - v1.0.0 (2026-07-01): Broadcast and announcement tests.
