// Tari Faqqer - Free and Open Source Software Statement
//
// This project, faqqer, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: tests/hashrate_test.rs
// Version: 1.0.0
// Developer: Tari Faqqer Contributors
//
// This file contains tests for network stats post extraction across both
// post formats and for the history file and CSV round trip.

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};
    use faqqer::archive::ChannelHistoryFetcher;
    use faqqer::chat::{ChatError, MessageHistory};
    use faqqer::core::types::{MediaRef, Message, MessageSequence};
    use faqqer::core::units::{HashRateValueParser, RateParse, UnitFamily};
    use faqqer::hashrate::{self, CSV_HEADER, HashRatePostExtractor};
    use faqqer::utils::format::FormatUtils;
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::tempdir;

    const EARLY_POST: &str = "📊 Current Tari Network Stats 📊\n\
        Block Height: 12,345\n\
        RandomX Hash Rate: 2.5 GH/s\n\
        SHA3 Hash Rate: 1.2 PH/s";

    const LATER_POST: &str = "📊 Current Tari Network Stats 📊\n\
        Block Height: 45210\n\
        RandomX (Tari): 250 MH/s\n\
        RandomX (Merged-Mined XMR): 3.70 GH/s\n\
        SHA3x: 0 H/s\n\
        Cuckaroo 29: 120 Kg\n\n\
        Want to learn more? Try '/faq mining' to get information about mining Tari.";

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, day, hour, 0, 0).unwrap()
    }

    struct OnePage(Vec<Message>);

    #[async_trait]
    impl MessageHistory for OnePage {
        async fn fetch_page(
            &self,
            _channel: &str,
            _limit: usize,
            before: Option<i64>,
        ) -> Result<Vec<Message>, ChatError> {
            Ok(if before.is_none() { self.0.clone() } else { Vec::new() })
        }

        async fn download_media(&self, _channel: &str, media: &MediaRef) -> Result<Vec<u8>, ChatError> {
            Err(ChatError::MediaUnavailable {
                locator: media.locator.clone(),
            })
        }
    }

    #[test]
    fn test_formatted_rates_parse_back_to_same_unit() {
        for family in [UnitFamily::Hash, UnitFamily::Graph] {
            for (power, symbol) in family.symbols().iter().enumerate() {
                let scale = 1000f64.powi(power as i32);
                for mantissa in [1.5, 37.25, 420.0] {
                    let value = mantissa * scale;
                    let text = FormatUtils::format_rate(value, family);
                    assert!(text.ends_with(&format!(" {}", symbol)), "{text}");

                    let RateParse::Parsed(parsed) = HashRateValueParser::parse(&text) else {
                        panic!("{text:?} did not parse");
                    };
                    assert_eq!(parsed.quantity.family, family);
                    assert_eq!(parsed.scale, scale, "{text}");
                    let error = (parsed.quantity.magnitude - value).abs() / value;
                    assert!(error < 0.005, "{text} read back as {}", parsed.quantity.magnitude);
                }
            }
        }

        // Chat posts carry the /s suffix on hash rates
        let posted = FormatUtils::format_hashrate(3.7e9);
        assert_eq!(posted, "3.70 GH/s");
        assert_eq!(
            HashRateValueParser::parse(&posted).quantity_in(UnitFamily::Hash).map(|q| q.magnitude),
            Some(3.7e9)
        );
    }

    #[test]
    fn test_early_format_fills_merged_mining_only() {
        let (sample, diagnostics) = HashRatePostExtractor::extract_fields(EARLY_POST, at(1, 0));
        assert!(diagnostics.is_empty());
        assert_eq!(sample.block_height, Some(12_345));
        assert_eq!(sample.rxm_gh, Some(2.5));
        assert_eq!(sample.rxt_gh, None);
        assert!((sample.sha3_th.unwrap() - 1200.0).abs() < 1e-6);
        assert_eq!(sample.c29_kg, None);
    }

    #[test]
    fn test_later_format_keeps_zero_as_value() {
        let (sample, diagnostics) = HashRatePostExtractor::extract_fields(LATER_POST, at(1, 0));
        assert!(diagnostics.is_empty());
        assert_eq!(sample.block_height, Some(45_210));
        assert_eq!(sample.sha3_th, Some(0.0));
        assert!((sample.rxt_gh.unwrap() - 0.25).abs() < 1e-9);
        assert!((sample.rxm_gh.unwrap() - 3.7).abs() < 1e-9);
        assert!((sample.c29_kg.unwrap() - 120.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_unit_is_reported_and_other_fields_survive() {
        let post = "📊 Current Tari Network Stats 📊\nBlock Height: 9\nSHA3x: 12 ZH/s\nCuckaroo 29: 4 Kg";
        let (sample, diagnostics) = HashRatePostExtractor::extract_fields(post, at(1, 0));
        assert_eq!(sample.sha3_th, None);
        assert_eq!(sample.c29_kg, Some(4.0));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].field, "sha3");
    }

    #[test]
    fn test_extract_skips_ordinary_messages() {
        let sequence = MessageSequence::from_unsorted(vec![
            Message::new(1, at(1, 1), Some("bot".into()), Some(EARLY_POST.into()), None),
            Message::new(2, at(1, 2), Some("alice".into()), Some("Block Height: 5 right?".into()), None),
            Message::new(3, at(1, 3), Some("bot".into()), Some(LATER_POST.into()), None),
        ]);
        let posts = HashRatePostExtractor::extract(&sequence);
        let ids: Vec<i64> = posts.iter().map(|p| p.message.id()).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[tokio::test]
    async fn test_retrieve_then_normalize_produce_same_csv() {
        let messages = vec![
            Message::new(30, at(16, 9), Some("bot".into()), Some(LATER_POST.into()), None),
            Message::new(20, at(15, 9), Some("alice".into()), Some("gm".into()), None),
            Message::new(10, at(15, 6), Some("bot".into()), Some(EARLY_POST.into()), None),
            Message::new(5, at(14, 6), Some("bot".into()), Some(EARLY_POST.into()), None),
        ];
        let fetcher = ChannelHistoryFetcher::new(Arc::new(OnePage(messages)), 100, Duration::ZERO);
        let dir = tempdir().unwrap();
        let history_path = dir.path().join("hash_rate_history.txt");
        let since = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();

        let retrieved = hashrate::retrieve(&fetcher, "tariproject", since, &history_path)
            .await
            .unwrap();
        assert_eq!(retrieved.posts, 2);
        assert_eq!(retrieved.csv_path, dir.path().join("hash_rate_history.csv"));

        let history = std::fs::read_to_string(&history_path).unwrap();
        assert!(history.starts_with("Hash Rate History from tariproject\n"));
        assert!(history.contains("Total Posts: 2\n"));
        assert!(history.contains("Message ID: 10\n"));

        let csv = std::fs::read_to_string(&retrieved.csv_path).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines,
            vec![
                CSV_HEADER,
                "2025-06-15 06:00:00,12345,1200,,2.5,",
                "2025-06-16 09:00:00,45210,0,0.25,3.7,120",
            ]
        );

        let normalized_path = dir.path().join("normalized_hash_rates.csv");
        let normalized = hashrate::normalize(&history_path, &normalized_path).await.unwrap();
        assert_eq!(normalized.posts, 2);
        assert_eq!(std::fs::read_to_string(&normalized_path).unwrap(), csv);
    }

    #[tokio::test]
    async fn test_normalize_missing_input_is_an_error() {
        let dir = tempdir().unwrap();
        let result = hashrate::normalize(&dir.path().join("absent.txt"), &dir.path().join("out.csv")).await;
        assert!(matches!(result, Err(hashrate::HashRateHistoryError::Read { .. })));
    }
}
