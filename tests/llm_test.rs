// Tari Faqqer - Free and Open Source Software Statement
//
// This project, faqqer, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: tests/llm_test.rs
// Version: 1.1.0
// Developer: Tari Faqqer Contributors
//
// This file contains tests for the FAQ responder fallbacks and the support
// analysis prompt and report formatting, using a scripted completion client.

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use faqqer::config::AppConfig;
    use faqqer::llm::analysis::{
        AnalysisReport, CONTINUED_PREFIX, ReportContext, format_no_messages, format_parse_failure,
        format_report, format_unavailable, split_message,
    };
    use faqqer::llm::faq::{DECODE_FALLBACK, NO_ANSWER, SERVICE_FALLBACK};
    use faqqer::llm::{CompletionClient, CompletionRequest, CustomerAnalyzer, FaqResponder, LlmError};
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;

    enum Reply {
        Text(&'static str),
        Timeout,
    }

    // Answers with a fixed reply and keeps every request it saw
    struct ScriptedClient {
        reply: Reply,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl ScriptedClient {
        fn new(reply: Reply) -> Arc<Self> {
            Arc::new(Self {
                reply,
                requests: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl CompletionClient for ScriptedClient {
        async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
            self.requests.lock().unwrap().push(request.clone());
            match self.reply {
                Reply::Text(text) => Ok(text.to_string()),
                Reply::Timeout => Err(LlmError::Timeout),
            }
        }
    }

    fn responder(client: Arc<ScriptedClient>) -> FaqResponder {
        FaqResponder::new(client, "Q: What are gems?\nA: Rewards.", None, &AppConfig::default())
    }

    #[tokio::test]
    async fn test_faq_answer_and_request_shape() {
        let client = ScriptedClient::new(Reply::Text(r#"{"answer": "Gems are rewards."}"#));
        let answer = responder(client.clone()).answer("what are gems").await;
        assert_eq!(answer, "Gems are rewards.");

        let requests = client.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model, "gpt-4o-2024-08-06");
        assert_eq!(requests[0].temperature, 0.0);
        assert_eq!(requests[0].system.as_deref(), Some("Q: What are gems?\nA: Rewards."));
        assert!(requests[0].user.contains("Question: what are gems"));
        assert!(requests[0].user.contains(r#"{"answer": "<answer>"}"#));
        assert!(!requests[0].user.contains("banned topics"));
    }

    #[tokio::test]
    async fn test_faq_fallbacks() {
        let cases = [
            (Reply::Text("{'answer': 'single quotes'}"), DECODE_FALLBACK),
            (Reply::Text("Gems are rewards."), DECODE_FALLBACK),
            (Reply::Text(r#"{"answer": "  "}"#), NO_ANSWER),
            (Reply::Timeout, SERVICE_FALLBACK),
        ];
        for (reply, expected) in cases {
            assert_eq!(responder(ScriptedClient::new(reply)).answer("q").await, expected);
        }
    }

    #[tokio::test]
    async fn test_faq_load_reads_avoidance_list() {
        let dir = tempdir().unwrap();
        let faq_path = dir.path().join("faq_prompt.txt");
        let avoid_path = dir.path().join("avoid.txt");
        std::fs::write(&faq_path, "FAQ TEXT").unwrap();
        std::fs::write(&avoid_path, "token price").unwrap();
        let mut config = AppConfig::default();
        config.faq.faq_file = faq_path;
        config.faq.avoidance_file = Some(avoid_path);

        let client = ScriptedClient::new(Reply::Text(r#"{"answer": "ok"}"#));
        let faq = FaqResponder::load(client.clone(), &config).await.unwrap();
        faq.answer("price?").await;

        let requests = client.requests.lock().unwrap();
        let system = requests[0].system.as_deref().unwrap();
        assert!(system.starts_with("FAQ TEXT\n\nDo not talk about the following topics:\ntoken price"));
        assert!(requests[0].user.contains("Avoid mentioning banned topics."));
    }

    #[tokio::test]
    async fn test_faq_load_missing_file_is_an_error() {
        let mut config = AppConfig::default();
        config.faq.faq_file = tempdir().unwrap().path().join("missing.txt");
        let client = ScriptedClient::new(Reply::Timeout);
        assert!(matches!(
            FaqResponder::load(client, &config).await,
            Err(LlmError::Prompt { .. })
        ));
    }

    #[tokio::test]
    async fn test_analyzer_truncates_to_token_budget() {
        let mut config = AppConfig::default();
        config.analysis.max_tokens = 5;
        config.analysis.chars_per_token = 4;
        let client = ScriptedClient::new(Reply::Text("{}"));
        let analyzer = CustomerAnalyzer::new(client.clone(), &config);

        analyzer.analyze("line one\nline two\nline 3", Some("wallet issues")).await.unwrap();

        let requests = client.requests.lock().unwrap();
        assert_eq!(requests[0].model, "gpt-4o");
        assert!(requests[0].system.is_none());
        assert!(requests[0].user.contains("**EXCLUSIVE FOCUS: wallet issues**"));
        assert!(requests[0].user.ends_with(
            "[TRUNCATED: Showing most recent 2 messages out of 3 total messages]\n\nline two\nline 3"
        ));
    }

    fn context(topic: Option<&str>) -> ReportContext {
        ReportContext {
            generated_at: Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap(),
            hours: 3,
            channels: vec!["tariproject".to_string(), "OrderOfSoon".to_string()],
            topic: topic.map(str::to_string),
            max_example_length: 20,
        }
    }

    #[test]
    fn test_report_with_categories() {
        let raw = r#"{
            "analysis_summary": "Mostly wallet sync problems",
            "total_issues_found": 7,
            "categories": [
                {"category": "Wallet and swap fixes", "count": 5, "representative_example": "my balance shows zero after the update"},
                {"category": "GPU Not Working", "count": 2, "representative_example": "gpu idle"}
            ]
        }"#;
        let report = AnalysisReport::decode(raw).unwrap();
        let text = format_report(&report, &context(None));

        assert!(text.starts_with("🔍 **Customer Service Analysis - 2026-03-01 09:30 UTC**\n"));
        assert!(text.contains("📊 **Summary:** Mostly wallet sync problems"));
        assert!(text.contains("📈 **Total Issues Found:** 7"));
        assert!(text.contains("1. **Wallet and swap fixes** (5 people)\n   └ _\"my balance shows ...\"_"));
        assert!(text.contains("2. **GPU Not Working** (2 people)\n   └ _\"gpu idle\"_"));
        assert!(text.ends_with("📅 **Analysis Period:** Last 3 hours\n🔗 **Channels:** tariproject, OrderOfSoon"));
    }

    #[test]
    fn test_report_variants() {
        let empty = AnalysisReport::decode(r#"{"analysis_summary": "", "total_issues_found": 0, "categories": []}"#)
            .unwrap();
        let text = format_report(&empty, &context(Some("mining")));
        assert!(text.contains("🎯 **Topic:** mining"));
        assert!(text.contains("No significant customer service issues found in the analyzed period."));
        assert!(text.contains("✅ No major customer service issues detected in the last 3 hours."));

        assert!(format_no_messages(&context(None)).ends_with("📊 No messages found in the last 3 hours to analyze."));
        assert!(format_unavailable(&context(None)).contains("⚠️ **Analysis Unavailable**"));

        // Missing field fails closed instead of being repaired
        let error = AnalysisReport::decode(r#"{"analysis_summary": "x", "categories": []}"#).unwrap_err();
        assert!(format_parse_failure(&context(None), &error).contains("could not be parsed"));
    }

    #[test]
    fn test_split_report_parts() {
        let text = "a".repeat(9000);
        let parts = split_message(&text, 4000);
        assert_eq!(parts.len(), 3);
        assert!(parts.iter().all(|p| p.chars().count() <= 4000));
        assert!(!parts[0].starts_with(CONTINUED_PREFIX));
        assert!(parts[1..].iter().all(|p| p.starts_with(CONTINUED_PREFIX)));
    }
}

// Changelog:
// - v1.1.0 (2026-09-30): Strict decode and report variant coverage.
// - v1.0.0 (2026-07-01): FAQ responder tests.
