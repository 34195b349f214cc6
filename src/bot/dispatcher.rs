// Tari Faqqer - Free and Open Source Software Statement
//
// This project, faqqer, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/bot/dispatcher.rs
// Version: 1.2.0
// Developer: Tari Faqqer Contributors
//
// This file runs the interactive side of the bot. One poller task
// long-polls for updates, keeps the update offset and pushes parsed
// commands into a bounded queue; a fixed pool of workers takes commands off
// the queue and answers each one in a reply to the asking message. On
// shutdown the poller stops and the workers drain what is already queued.
//
// Tree Location:
// - src/bot/dispatcher.rs (update poller and worker pool)
// - Depends on: bot::commands, chat, llm::faq, jobs::customer_analysis, async-channel

use super::commands::{BotCommand, HELP_TEXT};
use crate::chat::telegram::{TelegramBotClient, Update};
use crate::chat::{ChatError, ChatTarget, MessageSender};
use crate::jobs::customer_analysis::{AnalysisRun, CustomerAnalysisJob};
use crate::llm::FaqResponder;
use async_channel::{Receiver, Sender, bounded};
use async_trait::async_trait;
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinSet;

const LOG_TARGET: &str = "tari::faqqer::bot::dispatcher";

const QUEUE_CAPACITY: usize = 256;
const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

pub const ANALYSIS_BUSY: &str = "⏳ An analysis is already running. Please try again in a few minutes.";
pub const ANALYSIS_DISABLED: &str = "Support analysis is not enabled for this bot.";

/// Source of incoming chat updates
#[async_trait]
pub trait UpdateSource: Send + Sync {
    /// Updates with id >= `offset`, waiting up to `timeout_secs` for new ones
    async fn poll_updates(&self, offset: Option<i64>, timeout_secs: u64) -> Result<Vec<Update>, ChatError>;
}

#[async_trait]
impl UpdateSource for TelegramBotClient {
    async fn poll_updates(&self, offset: Option<i64>, timeout_secs: u64) -> Result<Vec<Update>, ChatError> {
        self.get_updates(offset, timeout_secs).await
    }
}

/// A command with the message it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingCommand {
    pub chat_id: i64,
    pub message_id: i64,
    pub command: BotCommand,
}

impl IncomingCommand {
    /// Command carried by `update`, if any
    pub fn from_update(update: &Update, bot_username: Option<&str>) -> Option<Self> {
        let message = update.message.as_ref()?;
        let command = BotCommand::parse(message.text.as_deref()?, bot_username)?;
        Some(Self {
            chat_id: message.chat.id,
            message_id: message.message_id,
            command,
        })
    }
}

/// Executes commands and posts the replies
pub struct CommandHandler {
    faq: Arc<FaqResponder>,
    analysis: Option<Arc<CustomerAnalysisJob>>,
    sender: Arc<dyn MessageSender>,
    default_hours: u64,
}

impl CommandHandler {
    pub fn new(
        faq: Arc<FaqResponder>,
        analysis: Option<Arc<CustomerAnalysisJob>>,
        sender: Arc<dyn MessageSender>,
        default_hours: u64,
    ) -> Self {
        Self {
            faq,
            analysis,
            sender,
            default_hours,
        }
    }

    pub async fn handle(&self, incoming: &IncomingCommand) -> Result<(), ChatError> {
        let chat = ChatTarget::Id(incoming.chat_id);
        let reply_to = Some(incoming.message_id);

        match &incoming.command {
            BotCommand::Faq { question } => {
                debug!(target: LOG_TARGET, "FAQ question in {}: {}", chat, question);
                let answer = self.faq.answer(question).await;
                self.sender.send_message(&chat, &answer, reply_to).await
            }
            BotCommand::AnalyzeSupport { hours, topic } => {
                let Some(job) = &self.analysis else {
                    return self.sender.send_message(&chat, ANALYSIS_DISABLED, reply_to).await;
                };
                let hours = hours.unwrap_or(self.default_hours);
                info!(
                    target: LOG_TARGET,
                    "Support analysis requested in {} for {} hours (topic: {:?})",
                    chat,
                    hours,
                    topic
                );
                match job.trigger(&chat, reply_to, hours, topic.as_deref()).await {
                    AnalysisRun::Busy => self.sender.send_message(&chat, ANALYSIS_BUSY, reply_to).await,
                    AnalysisRun::Posted { .. } => Ok(()),
                }
            }
            BotCommand::Help => self.sender.send_message(&chat, HELP_TEXT, reply_to).await,
            BotCommand::Usage(hint) => self.sender.send_message(&chat, hint, reply_to).await,
        }
    }
}

pub struct Dispatcher {
    source: Arc<dyn UpdateSource>,
    handler: Arc<CommandHandler>,
    bot_username: Option<String>,
    workers: usize,
    poll_timeout_secs: u64,
}

impl Dispatcher {
    pub fn new(
        source: Arc<dyn UpdateSource>,
        handler: Arc<CommandHandler>,
        bot_username: Option<String>,
        workers: usize,
        poll_timeout_secs: u64,
    ) -> Self {
        Self {
            source,
            handler,
            bot_username,
            workers: workers.max(1),
            poll_timeout_secs,
        }
    }

    /// Poll and answer until `shutdown` turns true
    pub async fn run(self, shutdown: watch::Receiver<bool>) {
        let (queue_tx, queue_rx) = bounded::<IncomingCommand>(QUEUE_CAPACITY);

        let mut tasks = JoinSet::new();
        for worker_id in 0..self.workers {
            tasks.spawn(worker(worker_id, queue_rx.clone(), self.handler.clone()));
        }
        drop(queue_rx);

        info!(
            target: LOG_TARGET,
            "Bot dispatcher started as {:?} with {} workers",
            self.bot_username,
            self.workers
        );
        self.poll(queue_tx, shutdown).await;

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                error!(target: LOG_TARGET, "Bot worker ended abnormally: {}", e);
            }
        }
        info!(target: LOG_TARGET, "Bot dispatcher stopped");
    }

    async fn poll(&self, queue: Sender<IncomingCommand>, mut shutdown: watch::Receiver<bool>) {
        let mut offset: Option<i64> = None;
        loop {
            if *shutdown.borrow() {
                break;
            }

            let polled = tokio::select! {
                polled = self.source.poll_updates(offset, self.poll_timeout_secs) => polled,
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    continue;
                }
            };

            let updates = match polled {
                Ok(updates) => updates,
                Err(e) => {
                    warn!(target: LOG_TARGET, "Polling for updates failed: {}", e);
                    tokio::select! {
                        _ = tokio::time::sleep(POLL_RETRY_DELAY) => {}
                        changed = shutdown.changed() => {
                            if changed.is_err() {
                                break;
                            }
                        }
                    }
                    continue;
                }
            };

            for update in &updates {
                offset = Some(offset.map_or(update.update_id + 1, |o| o.max(update.update_id + 1)));
                let Some(command) = IncomingCommand::from_update(update, self.bot_username.as_deref()) else {
                    continue;
                };
                if queue.send(command).await.is_err() {
                    error!(target: LOG_TARGET, "All bot workers have stopped");
                    return;
                }
            }
        }
        // Workers drain what is queued, then see the closed queue and exit
        queue.close();
    }
}

async fn worker(worker_id: usize, queue: Receiver<IncomingCommand>, handler: Arc<CommandHandler>) {
    while let Ok(incoming) = queue.recv().await {
        if let Err(e) = handler.handle(&incoming).await {
            error!(
                target: LOG_TARGET,
                "Worker {} failed to answer message {} in {}: {}",
                worker_id,
                incoming.message_id,
                incoming.chat_id,
                e
            );
        }
    }
    debug!(target: LOG_TARGET, "Worker {} finished", worker_id);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_update_ignores_plain_text() {
        let raw = r#"[
            {"update_id": 1, "message": {"message_id": 5, "date": 0, "chat": {"id": -9}, "text": "/ask how to mine?"}},
            {"update_id": 2, "message": {"message_id": 6, "date": 0, "chat": {"id": -9}, "text": "gm"}},
            {"update_id": 3}
        ]"#;
        let updates: Vec<Update> = serde_json::from_str(raw).unwrap();
        let commands: Vec<IncomingCommand> = updates
            .iter()
            .filter_map(|u| IncomingCommand::from_update(u, None))
            .collect();
        assert_eq!(
            commands,
            vec![IncomingCommand {
                chat_id: -9,
                message_id: 5,
                command: BotCommand::Faq {
                    question: "how to mine?".to_string()
                },
            }]
        );
    }
}

// Changelog:
// - v1.2.0 (2026-09-30): /analyze_support routed to the shared analysis job.
// - v1.1.0 (2026-08-12): Worker pool on a bounded queue.
// - v1.0.0 (2026-07-01): Long-poll dispatcher for FAQ commands.
