// Tari Faqqer - Free and Open Source Software Statement
//
// This project, faqqer, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/bot/commands.rs
// Version: 1.1.0
// Developer: Tari Faqqer Contributors
//
// This file parses chat text into bot commands. A command may carry an
// @botname suffix; one addressed to a different bot is ignored. Missing or
// malformed arguments produce a usage reply instead of a command.
//
// Tree Location:
// - src/bot/commands.rs (command parsing and help text)
// - Depends on: (none)

/// Longest window `/analyze_support` accepts, in hours
pub const MAX_ANALYSIS_HOURS: u64 = 168;

pub const FAQ_USAGE: &str = "Please add your question after the command, e.g. /faq What is Tari Universe?";

pub const ANALYZE_USAGE: &str = "Usage: /analyze_support [hours] [topic], e.g. /analyze_support 24 wallet issues (hours between 1 and 168)";

pub const HELP_TEXT: &str = "🤖 **Faqqer commands**\n\n\
    /faq <question> - Answer a question from the Tari FAQ (any language)\n\
    /ask <question> - Same as /faq\n\
    /faqqer <question> - Same as /faq\n\
    /analyze_support [hours] [topic] - Summarize recent support issues, optionally for one topic\n\
    /help - Show this message";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    Faq { question: String },
    AnalyzeSupport { hours: Option<u64>, topic: Option<String> },
    Help,
    /// Recognized command with unusable arguments; the text is the reply
    Usage(&'static str),
}

impl BotCommand {
    /// Parse a message text. `None` when the text is not a command for this bot.
    pub fn parse(text: &str, bot_username: Option<&str>) -> Option<Self> {
        let text = text.trim();
        let body = text.strip_prefix('/')?;
        let (head, args) = match body.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (body, ""),
        };

        let name = match head.split_once('@') {
            Some((name, addressee)) => {
                let ours = bot_username
                    .is_some_and(|bot| bot.trim_start_matches('@').eq_ignore_ascii_case(addressee));
                if !ours {
                    return None;
                }
                name
            }
            None => head,
        };

        match name.to_ascii_lowercase().as_str() {
            "faq" | "ask" | "faqqer" => {
                if args.is_empty() {
                    Some(BotCommand::Usage(FAQ_USAGE))
                } else {
                    Some(BotCommand::Faq {
                        question: args.to_string(),
                    })
                }
            }
            "analyze_support" => Some(Self::parse_analyze(args)),
            "help" | "start" => Some(BotCommand::Help),
            _ => None,
        }
    }

    fn parse_analyze(args: &str) -> Self {
        let (first, rest) = match args.split_once(char::is_whitespace) {
            Some((first, rest)) => (first, rest.trim()),
            None => (args, ""),
        };

        let (hours, topic) = if first.is_empty() {
            (None, "")
        } else if first.chars().all(|c| c.is_ascii_digit()) {
            match first.parse::<u64>() {
                Ok(h) if (1..=MAX_ANALYSIS_HOURS).contains(&h) => (Some(h), rest),
                _ => return BotCommand::Usage(ANALYZE_USAGE),
            }
        } else {
            (None, args)
        };

        BotCommand::AnalyzeSupport {
            hours,
            topic: (!topic.is_empty()).then(|| topic.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_faq_aliases() {
        for cmd in ["/faq", "/ask", "/faqqer", "/FAQ"] {
            assert_eq!(
                BotCommand::parse(&format!("{} what are gems?", cmd), None),
                Some(BotCommand::Faq {
                    question: "what are gems?".to_string()
                })
            );
        }
        assert_eq!(BotCommand::parse("/faq   ", None), Some(BotCommand::Usage(FAQ_USAGE)));
    }

    #[test]
    fn test_bot_suffix() {
        let faq = Some(BotCommand::Faq {
            question: "q".to_string(),
        });
        assert_eq!(BotCommand::parse("/faq@FaqqerBot q", Some("faqqerbot")), faq);
        assert_eq!(BotCommand::parse("/faq@OtherBot q", Some("faqqerbot")), None);
        assert_eq!(BotCommand::parse("/faq@FaqqerBot q", None), None);
    }

    #[test]
    fn test_analyze_arguments() {
        assert_eq!(
            BotCommand::parse("/analyze_support", None),
            Some(BotCommand::AnalyzeSupport { hours: None, topic: None })
        );
        assert_eq!(
            BotCommand::parse("/analyze_support 24 wallet issues", None),
            Some(BotCommand::AnalyzeSupport {
                hours: Some(24),
                topic: Some("wallet issues".to_string())
            })
        );
        assert_eq!(
            BotCommand::parse("/analyze_support GPU not working", None),
            Some(BotCommand::AnalyzeSupport {
                hours: None,
                topic: Some("GPU not working".to_string())
            })
        );
        assert_eq!(BotCommand::parse("/analyze_support 0", None), Some(BotCommand::Usage(ANALYZE_USAGE)));
        assert_eq!(BotCommand::parse("/analyze_support 500", None), Some(BotCommand::Usage(ANALYZE_USAGE)));
    }

    #[test]
    fn test_not_commands() {
        assert_eq!(BotCommand::parse("hello /faq", None), None);
        assert_eq!(BotCommand::parse("/unknown", None), None);
        assert_eq!(BotCommand::parse("/help", None), Some(BotCommand::Help));
    }
}
