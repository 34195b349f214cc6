// Tari Faqqer - Free and Open Source Software Statement
//
// This project, faqqer, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/llm/analysis.rs
// Version: 1.3.0
// Developer: Tari Faqqer Contributors
//
// This file turns archived support-channel history into an issue report.
// It holds the analysis prompts, trims oversized chat logs to the most
// recent lines, decodes the model reply against a fixed schema and renders
// the chat report variants. Long reports are split for posting.
//
// Tree Location:
// - src/llm/analysis.rs (customer-support analysis)
// - Depends on: llm::client, serde, chrono, utils::format

use super::LlmError;
use super::client::{CompletionClient, CompletionRequest};
use crate::config::AppConfig;
use crate::utils::format::FormatUtils;
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::Deserialize;
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

const LOG_TARGET: &str = "tari::faqqer::llm::analysis";

pub const CONTINUED_PREFIX: &str = "**(continued...)**\n";

pub const ANALYSIS_PROMPT: &str = r#"You are a customer service analyst for a cryptocurrency/blockchain project. Analyze the provided chat messages and categorize customer service issues.

IMPORTANT:
- Translate any non-English text to English before analysis
- Present all results in English only
- Focus on actual customer problems/issues, not general questions

Look for these specific categories and any new ones you identify:

1. **Bridge reliability** - Issues with blockchain bridges, cross-chain transactions
2. **Network fragmentation** - Network connectivity, node communication issues
3. **Node setup and sync issues** - Problems setting up or syncing blockchain nodes
4. **Wallet and swap fixes** - Wallet functionality, transaction swaps
5. **Mobile wallet, sync'ing, backup** - Mobile app wallet issues, syncing, backups
6. **Fork or Orphan Chain Issues** - Mentions of forks, orphan chains, users stuck on wrong chain
7. **Setup & Installation Problems** - Installing, updating, running software including:
   - Being stuck at installation steps
   - Missing DLLs or components
   - Software failing to launch or crashing
8. **Mining Rewards Too Low** - Complaints about mining rewards:
   - Discrepancies in estimated vs actual mining output
   - Questions about why mining returns dropped
9. **Universe Wallet & Balance Issues** - Problems with:
   - Incorrect balances
   - Missing funds
   - Balance discrepancies between devices/transactions
10. **Memory Leak Issues** - Reports of:
    - High RAM usage
    - Memory leaks
    - System running out of memory
11. **GPU Not Working** - Mentions of:
    - GPUs not being recognized
    - GPUs not turning on
    - Hash rates lower than expected
12. **Mobile App Issues** - Mobile wallet problems:
    - Syncing issues
    - Wallet balance not updating
    - Transactions failing to appear
    - Problems with wallet backups
13. **Anti-Virus, Firewalls, VPNs** - Issues with security software:
    - Anti-virus warnings/false positives
    - Firewalls blocking connections
    - VPN-related connection problems

For each category found, provide:
- The issue category name
- Total number of unique people mentioning it
- A representative example of the issue (actual message text if possible, translated to English)

IMPORTANT: Respond ONLY with valid JSON format. Do not include any text before or after the JSON. Do not wrap in code blocks or markdown.

Respond in JSON format with this exact structure:
{
  "analysis_summary": "Brief overview of main issues found",
  "total_issues_found": number,
  "categories": [
    {
      "category": "Issue Category Name",
      "count": number_of_people,
      "representative_example": "Example message in English"
    }
  ]
}
"#;

/// Prompt restricted to a single topic
pub fn custom_topic_prompt(topic: &str) -> String {
    format!(
        r#"You are a customer service analyst for a cryptocurrency/blockchain project. Your task is to analyze chat messages EXCLUSIVELY for issues related to this specific topic:

**EXCLUSIVE FOCUS: {topic}**

CRITICAL INSTRUCTIONS:
- IGNORE all other customer service issues that are not directly related to "{topic}"
- ONLY identify and categorize messages that relate to the specified topic
- If no messages relate to the topic, return an empty categories array
- Translate any non-English text to English before analysis
- Present all results in English only

ANALYSIS SCOPE:
- Search for messages that mention, discuss, or report problems related to "{topic}"
- Look for variations, synonyms, and related terms
- Include both direct mentions and indirect references to the topic
- Focus on actual problems, issues, complaints, or questions about "{topic}"

For ONLY the issues related to "{topic}", provide:
- A specific category name that relates to the focused topic
- Total number of unique people mentioning issues related to this topic
- A representative example from the actual messages (translated to English if needed)

DO NOT include general customer service issues unless they directly relate to "{topic}".

IMPORTANT: Respond ONLY with valid JSON format. Do not include any text before or after the JSON. Do not wrap in code blocks or markdown.

Respond in JSON format with this exact structure:
{{
  "analysis_summary": "Summary of issues found specifically related to '{topic}' - if none found, state that clearly",
  "total_issues_found": number,
  "categories": [
    {{
      "category": "Specific issue category related to {topic}",
      "count": number_of_people,
      "representative_example": "Example message in English"
    }}
  ]
}}

If no issues related to "{topic}" are found, respond with:
{{
  "analysis_summary": "No issues related to '{topic}' were found in the analyzed messages",
  "total_issues_found": 0,
  "categories": []
}}
"#
    )
}

/// Decoded model reply
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnalysisReport {
    pub analysis_summary: String,
    pub total_issues_found: u64,
    pub categories: Vec<IssueCategory>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IssueCategory {
    pub category: String,
    pub count: u64,
    pub representative_example: String,
}

impl AnalysisReport {
    /// Schema-checked decode; no attempt is made to repair malformed replies
    pub fn decode(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

/// Keep the most recent lines that fit in `max_chars`, with a header saying so.
///
/// Content already within the limit is returned unchanged.
pub fn truncate_chat_content(content: &str, max_chars: usize) -> String {
    let total_chars = content.chars().count();
    if total_chars <= max_chars {
        return content.to_string();
    }

    let lines: Vec<&str> = content.split('\n').collect();
    let mut kept: Vec<&str> = Vec::new();
    let mut used = 0usize;
    for line in lines.iter().rev() {
        let cost = line.chars().count() + 1;
        if used + cost > max_chars {
            break;
        }
        kept.push(line);
        used += cost;
    }
    kept.reverse();

    warn!(
        target: LOG_TARGET,
        "Chat content of {} chars truncated to the last {} of {} lines",
        total_chars,
        kept.len(),
        lines.len()
    );
    format!(
        "[TRUNCATED: Showing most recent {} messages out of {} total messages]\n\n{}",
        kept.len(),
        lines.len(),
        kept.join("\n")
    )
}

/// Split `text` into posts of at most `max_chars` characters each, counting
/// the continuation marker carried by every part after the first.
pub fn split_message(text: &str, max_chars: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_chars {
        return vec![text.to_string()];
    }

    let prefix_len = CONTINUED_PREFIX.chars().count();
    let follow_size = max_chars.saturating_sub(prefix_len).max(1);
    let mut parts = Vec::new();
    let mut start = 0;
    while start < chars.len() {
        let size = if start == 0 { max_chars.max(1) } else { follow_size };
        let end = (start + size).min(chars.len());
        let chunk: String = chars[start..end].iter().collect();
        if start == 0 {
            parts.push(chunk);
        } else {
            parts.push(format!("{}{}", CONTINUED_PREFIX, chunk));
        }
        start = end;
    }
    parts
}

/// What a report covers, for its header and footer
#[derive(Debug, Clone, PartialEq)]
pub struct ReportContext {
    pub generated_at: DateTime<Utc>,
    pub hours: u64,
    pub channels: Vec<String>,
    pub topic: Option<String>,
    pub max_example_length: usize,
}

impl ReportContext {
    fn header(&self) -> String {
        format!(
            "🔍 **Customer Service Analysis - {}**\n",
            self.generated_at.format("%Y-%m-%d %H:%M UTC")
        )
    }

    fn channel_list(&self) -> String {
        self.channels.join(", ")
    }
}

/// Chat text for a decoded report
pub fn format_report(report: &AnalysisReport, ctx: &ReportContext) -> String {
    let mut out = ctx.header();
    if let Some(topic) = &ctx.topic {
        let _ = write!(out, "\n🎯 **Topic:** {}\n", topic);
    }

    if report.categories.is_empty() {
        let summary = if report.analysis_summary.trim().is_empty() {
            "No significant customer service issues found in the analyzed period."
        } else {
            report.analysis_summary.as_str()
        };
        let _ = write!(
            out,
            "\n📊 **Summary:** {}\n\n✅ No major customer service issues detected in the last {} hours.",
            summary, ctx.hours
        );
        return out;
    }

    let _ = write!(
        out,
        "\n📊 **Summary:** {}\n\n📈 **Total Issues Found:** {}\n\n**Issue Breakdown:**\n",
        report.analysis_summary, report.total_issues_found
    );
    for (index, category) in report.categories.iter().enumerate() {
        let example =
            FormatUtils::truncate_with_ellipsis(&category.representative_example, ctx.max_example_length);
        let _ = write!(
            out,
            "\n{}. **{}** ({} people)\n   └ _\"{}\"_\n",
            index + 1,
            category.category,
            category.count,
            example
        );
    }
    let _ = write!(
        out,
        "\n📅 **Analysis Period:** Last {} hours\n🔗 **Channels:** {}",
        ctx.hours,
        ctx.channel_list()
    );
    out
}

pub fn format_no_messages(ctx: &ReportContext) -> String {
    format!(
        "{}\n📊 No messages found in the last {} hours to analyze.",
        ctx.header(),
        ctx.hours
    )
}

/// Posted when no configured channel history can be read
pub fn format_unavailable(ctx: &ReportContext) -> String {
    format!(
        "{}\n⚠️ **Analysis Unavailable**\n\
         Customer service analysis requires access to channel history.\n\
         Bot accounts cannot access historical messages from channels.\n\n\
         **To enable this feature:**\n\
         • Set history.export_dir (or FAQQER_EXPORT_DIR) to a directory of Telegram Desktop exports\n\
         • Export every analyzed channel into its own subdirectory\n\n\
         **Current Configuration:**\n\
         • Analysis would cover: {}\n\
         • Time period: Last {} hours",
        ctx.header(),
        ctx.channel_list(),
        ctx.hours
    )
}

pub fn format_parse_failure(ctx: &ReportContext, error: &serde_json::Error) -> String {
    format!(
        "{}\n❌ Error processing analysis results. Raw response was received but could not be parsed.\n\n\
         **Debug Info:** JSON decode error at line {} column {}",
        ctx.header(),
        error.line(),
        error.column()
    )
}

pub fn format_service_error(ctx: &ReportContext) -> String {
    format!(
        "{}\n❌ Analysis failed due to AI service error. Please try again later.",
        ctx.header()
    )
}

pub fn format_run_error(ctx: &ReportContext, message: &str) -> String {
    format!("{}\n❌ Analysis failed with error: {}", ctx.header(), message)
}

/// Sends archived chat content to the model for categorization
pub struct CustomerAnalyzer {
    client: Arc<dyn CompletionClient>,
    model: String,
    temperature: f32,
    timeout: Duration,
    max_chars: usize,
}

impl CustomerAnalyzer {
    pub fn new(client: Arc<dyn CompletionClient>, config: &AppConfig) -> Self {
        Self {
            client,
            model: config.openai.analysis_model.clone(),
            temperature: config.openai.analysis_temperature,
            timeout: Duration::from_secs(config.openai.analysis_timeout_secs),
            max_chars: config
                .analysis
                .max_tokens
                .saturating_mul(config.analysis.chars_per_token),
        }
    }

    /// Full prompt for `chat_content`, truncated to the token budget
    pub fn prompt(&self, chat_content: &str, topic: Option<&str>) -> String {
        let instructions = match topic {
            Some(topic) => custom_topic_prompt(topic),
            None => ANALYSIS_PROMPT.to_string(),
        };
        format!(
            "{}\n\n{}",
            instructions,
            truncate_chat_content(chat_content, self.max_chars)
        )
    }

    /// Raw model reply for `chat_content`
    pub async fn analyze(&self, chat_content: &str, topic: Option<&str>) -> Result<String, LlmError> {
        let prompt = self.prompt(chat_content, topic);
        info!(
            target: LOG_TARGET,
            "Requesting analysis of ~{} tokens",
            prompt.chars().count() / 4
        );
        let request = CompletionRequest {
            model: self.model.clone(),
            temperature: self.temperature,
            system: None,
            user: prompt,
            timeout: self.timeout,
        };
        self.client.complete(&request).await
    }
}


// Changelog:
// - v1.3.0 (2026-09-30): Strict schema decode; report variants as functions.
//   - Split parts count the continuation marker against the length limit.
// - v1.2.0 (2026-08-12): Custom-topic prompt for /analyze_support.
// - v1.1.0 (2026-07-20): Truncation keeps the most recent lines.
// - v1.0.0 (2026-07-01): Initial support analysis.
