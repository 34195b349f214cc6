// Tari Faqqer - Free and Open Source Software Statement
//
// This project, faqqer, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/jobs/broadcast.rs
// Version: 1.0.0
// Developer: Tari Faqqer Contributors
//
// Tree Location:
// - src/jobs/broadcast.rs (post one text to many chats)
// - Depends on: chat

use crate::chat::{ChatError, ChatTarget, MessageSender};
use log::{error, info};

const LOG_TARGET: &str = "tari::faqqer::jobs::broadcast";

/// Which destinations received a broadcast
#[derive(Debug, Default)]
pub struct BroadcastReport {
    pub delivered: Vec<ChatTarget>,
    pub failed: Vec<(ChatTarget, ChatError)>,
}

impl BroadcastReport {
    pub fn all_delivered(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Send `text` to every target in order. A failed destination does not stop the rest.
pub async fn broadcast(sender: &dyn MessageSender, targets: &[ChatTarget], text: &str) -> BroadcastReport {
    let mut report = BroadcastReport::default();
    for target in targets {
        match sender.send_message(target, text, None).await {
            Ok(()) => {
                info!(target: LOG_TARGET, "Posted to {}", target);
                report.delivered.push(target.clone());
            }
            Err(e) => {
                error!(target: LOG_TARGET, "Failed to post to {}: {}", target, e);
                report.failed.push((target.clone(), e));
            }
        }
    }
    report
}
