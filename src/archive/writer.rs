// Tari Faqqer - Free and Open Source Software Statement
//
// This project, faqqer, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/archive/writer.rs
// Version: 1.2.0
// Developer: Tari Faqqer Contributors
//
// This file renders an ordered message sequence as a plain-text or HTML
// document. Reply targets resolve only against messages rendered earlier in
// the same pass, so a reply to a message outside the window (or later in
// the sequence) shows a fixed placeholder.
//
// Tree Location:
// - src/archive/writer.rs (history rendering and media download)
// - Depends on: chat, core::types, utils::atomic_file, sha2

use crate::chat::MessageHistory;
use crate::core::types::{Message, MessageSequence, OutputFormat};
use crate::utils::atomic_file::{AtomicFileError, write_atomic};
use log::{debug, info, warn};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const LOG_TARGET: &str = "tari::faqqer::archive::writer";

pub const UNKNOWN_REPLY: &str = "Unknown message";
pub const MEDIA_PLACEHOLDER: &str = "Media message";
const TEXT_SEPARATOR_WIDTH: usize = 50;
const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const HTML_STYLE: &str = "body { font-family: Arial, sans-serif; background-color: #f4f4f9; }\
.message { padding: 10px; margin-bottom: 20px; border-bottom: 1px solid #ddd; }\
.reply { font-size: 0.9em; color: #555; margin-left: 20px; }\
.user { font-weight: bold; }\
.date { font-size: 0.8em; color: #999; }\
.channel { font-size: 0.8em; color: #777; }\
.media { margin-top: 10px; }";

/// Where an attachment ended up after the download attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaOutcome {
    Saved { path: PathBuf },
    Unavailable { name: String },
}

/// Downloads attachments through the history transport into a local directory
#[derive(Clone)]
pub struct MediaStore {
    transport: Arc<dyn MessageHistory>,
    dir: PathBuf,
}

impl MediaStore {
    pub fn new(transport: Arc<dyn MessageHistory>, dir: impl Into<PathBuf>) -> Self {
        Self {
            transport,
            dir: dir.into(),
        }
    }

    /// File name for downloaded bytes: the provided name, else the content hash
    pub fn file_name_for(provided: Option<&str>, contents: &[u8]) -> String {
        provided
            .and_then(|name| Path::new(name).file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| hex::encode(Sha256::digest(contents)))
    }

    /// Never fails: download and write errors degrade to `Unavailable`
    pub async fn store(&self, message: &Message) -> Option<MediaOutcome> {
        let media = message.media()?;
        let channel = message.channel().unwrap_or_default();
        let display_name = media
            .file_name
            .clone()
            .unwrap_or_else(|| media.locator.clone());

        let contents = match self.transport.download_media(channel, media).await {
            Ok(contents) => contents,
            Err(e) => {
                warn!(
                    target: LOG_TARGET,
                    "Media for message {} is unavailable: {}",
                    message.id(),
                    e
                );
                return Some(MediaOutcome::Unavailable { name: display_name });
            }
        };

        let path = self
            .dir
            .join(Self::file_name_for(media.file_name.as_deref(), &contents));
        match write_atomic(&path, &contents).await {
            Ok(()) => {
                debug!(target: LOG_TARGET, "Saved media of message {} to {:?}", message.id(), path);
                Some(MediaOutcome::Saved { path })
            }
            Err(e) => {
                warn!(
                    target: LOG_TARGET,
                    "Failed to save media of message {}: {}",
                    message.id(),
                    e
                );
                Some(MediaOutcome::Unavailable { name: display_name })
            }
        }
    }
}

/// Renders a message sequence into one document
pub struct HistoryWriter {
    format: OutputFormat,
    title: String,
    show_channel: bool,
}

impl HistoryWriter {
    pub fn new(format: OutputFormat, title: impl Into<String>) -> Self {
        Self {
            format,
            title: title.into(),
            show_channel: false,
        }
    }

    /// Label every message with its channel (combined archives)
    pub fn with_channel_labels(mut self, show: bool) -> Self {
        self.show_channel = show;
        self
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Render the sequence. Attachments are downloaded when `media` is given.
    pub async fn render(&self, sequence: &MessageSequence, media: Option<&MediaStore>) -> String {
        let mut replies: HashMap<(Option<&str>, i64), String> = HashMap::new();
        let mut out = String::new();

        if self.format == OutputFormat::Html {
            let _ = write!(
                out,
                "<html><head><meta charset=\"utf-8\"><title>Channel History</title><style>{}</style></head><body>\
                 <h1>Chat History for {}</h1><hr>",
                HTML_STYLE,
                escape_html(&self.title)
            );
        }

        for message in sequence {
            let media_outcome = match media {
                Some(store) => store.store(message).await,
                None => None,
            };

            let content = message.text().unwrap_or(MEDIA_PLACEHOLDER).to_string();
            let reply = message.reply_to().map(|target| {
                replies
                    .get(&(message.channel(), target))
                    .cloned()
                    .unwrap_or_else(|| UNKNOWN_REPLY.to_string())
            });

            match self.format {
                OutputFormat::Text => {
                    self.render_text(&mut out, message, &content, reply.as_deref(), media_outcome.as_ref())
                }
                OutputFormat::Html => {
                    self.render_html(&mut out, message, reply.as_deref(), media_outcome.as_ref())
                }
            }

            replies.insert((message.channel(), message.id()), content);
        }

        if self.format == OutputFormat::Html {
            out.push_str("</body></html>\n");
        }
        out
    }

    /// Render and atomically replace `path`
    pub async fn write(
        &self,
        sequence: &MessageSequence,
        path: &Path,
        media: Option<&MediaStore>,
    ) -> Result<(), AtomicFileError> {
        let document = self.render(sequence, media).await;
        write_atomic(path, document.as_bytes()).await?;
        info!(
            target: LOG_TARGET,
            "Wrote {} messages as {:?} to {:?}",
            sequence.len(),
            self.format,
            path
        );
        Ok(())
    }

    fn render_text(
        &self,
        out: &mut String,
        message: &Message,
        content: &str,
        reply: Option<&str>,
        media: Option<&MediaOutcome>,
    ) {
        let date = message.timestamp().format(DATE_FORMAT);
        match message.channel().filter(|_| self.show_channel) {
            Some(channel) => {
                let _ = writeln!(
                    out,
                    "User: {} | Channel: {} | Date: {}",
                    message.sender_label(),
                    channel,
                    date
                );
            }
            None => {
                let _ = writeln!(out, "User: {} | Date: {}", message.sender_label(), date);
            }
        }
        match reply {
            Some(reply) => {
                let _ = writeln!(out, "Message: {} (Replying to: {})", content, reply);
            }
            None => {
                let _ = writeln!(out, "Message: {}", content);
            }
        }
        match media {
            Some(MediaOutcome::Saved { path }) => {
                let _ = writeln!(out, "Media: {}", path.display());
            }
            Some(MediaOutcome::Unavailable { name }) => {
                let _ = writeln!(out, "Media: unavailable ({})", name);
            }
            None => {}
        }
        out.push_str(&"-".repeat(TEXT_SEPARATOR_WIDTH));
        out.push('\n');
    }

    fn render_html(
        &self,
        out: &mut String,
        message: &Message,
        reply: Option<&str>,
        media: Option<&MediaOutcome>,
    ) {
        out.push_str("<div class=\"message\">");
        let _ = write!(out, "<div class=\"user\">{}</div>", escape_html(message.sender_label()));
        let _ = write!(
            out,
            "<div class=\"date\">{}</div>",
            message.timestamp().format(DATE_FORMAT)
        );
        if let Some(channel) = message.channel().filter(|_| self.show_channel) {
            let _ = write!(out, "<div class=\"channel\">{}</div>", escape_html(channel));
        }
        let _ = write!(
            out,
            "<div class=\"content\">{}</div>",
            escape_html(message.text().unwrap_or_default())
        );
        if let Some(reply) = reply {
            let _ = write!(out, "<div class=\"reply\">Replying to: {}</div>", escape_html(reply));
        }
        match media {
            Some(MediaOutcome::Saved { path }) => out.push_str(&media_element(path)),
            Some(MediaOutcome::Unavailable { name }) => {
                let _ = write!(
                    out,
                    "<div class=\"media\">Media unavailable: {}</div>",
                    escape_html(name)
                );
            }
            None => {}
        }
        out.push_str("</div>\n");
    }
}

fn media_element(path: &Path) -> String {
    let src = escape_html(&path.to_string_lossy());
    let name = path
        .file_name()
        .map(|n| escape_html(&n.to_string_lossy()))
        .unwrap_or_default();
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "jpg" | "jpeg" | "png" | "gif" => {
            format!("<div class=\"media\"><img src=\"{}\" alt=\"Image\" width=\"300\"></div>", src)
        }
        "mp4" | "webm" | "mkv" => format!(
            "<div class=\"media\"><video width=\"300\" controls><source src=\"{}\" type=\"video/mp4\">\
             Your browser does not support the video tag.</video></div>",
            src
        ),
        _ => format!(
            "<div class=\"media\"><a href=\"{}\" download>Download {}</a></div>",
            src, name
        ),
    }
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}


// Changelog:
// - v1.2.0 (2026-09-30): Channel labels for combined archives, HTML escaping.
// - v1.1.0 (2026-08-12): Media downloads degrade to an "unavailable" reference.
// - v1.0.0 (2026-07-01): Text and HTML rendering with reply context.
