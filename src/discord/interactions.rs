// Tari Faqqer - Free and Open Source Software Statement
//
// This project, faqqer, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/discord/interactions.rs
// Version: 1.0.0
// Developer: Tari Faqqer Contributors
//
// This file serves the Discord interactions endpoint. Each request is
// checked against the application's Ed25519 key before it is decoded. FAQ
// commands are acknowledged at once with a deferred reply; the answer is
// produced on a separate task and written into that reply.
//
// Tree Location:
// - src/discord/interactions.rs (signature check, handler and HTTP endpoint)
// - Depends on: axum, ed25519-dalek, llm::faq, discord::client

use super::{
    DiscordError, FAQ_COMMANDS, FollowupSender, Interaction, QUESTION_OPTION, fit_content,
    interaction_type,
};
use crate::bot::commands::FAQ_USAGE;
use crate::llm::FaqResponder;
use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use log::{debug, error, info, warn};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;

const LOG_TARGET: &str = "tari::faqqer::discord::interactions";

pub const SIGNATURE_HEADER: &str = "x-signature-ed25519";
pub const TIMESTAMP_HEADER: &str = "x-signature-timestamp";

/// Checks `timestamp || body` against the application public key
#[derive(Debug, Clone)]
pub struct InteractionVerifier {
    key: VerifyingKey,
}

impl InteractionVerifier {
    pub fn new(key: VerifyingKey) -> Self {
        Self { key }
    }

    pub fn from_hex(public_key: &str) -> Result<Self, DiscordError> {
        let bytes: [u8; 32] = hex::decode(public_key.trim())
            .map_err(|_| DiscordError::InvalidPublicKey)?
            .try_into()
            .map_err(|_| DiscordError::InvalidPublicKey)?;
        let key = VerifyingKey::from_bytes(&bytes).map_err(|_| DiscordError::InvalidPublicKey)?;
        Ok(Self { key })
    }

    pub fn verify(&self, signature_hex: &str, timestamp: &str, body: &[u8]) -> Result<(), DiscordError> {
        let signature_bytes = hex::decode(signature_hex).map_err(|_| DiscordError::BadSignature)?;
        let signature = Signature::from_slice(&signature_bytes).map_err(|_| DiscordError::BadSignature)?;

        let mut message = Vec::with_capacity(timestamp.len() + body.len());
        message.extend_from_slice(timestamp.as_bytes());
        message.extend_from_slice(body);
        self.key
            .verify(&message, &signature)
            .map_err(|_| DiscordError::BadSignature)
    }
}

/// Immediate response to an interaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionReply {
    Pong,
    /// "Thinking..." placeholder, edited once the answer is ready
    Deferred,
    Message(String),
}

impl InteractionReply {
    pub fn to_json(&self) -> Value {
        match self {
            InteractionReply::Pong => json!({ "type": 1 }),
            InteractionReply::Message(text) => json!({
                "type": 4,
                "data": { "content": fit_content(text) },
            }),
            InteractionReply::Deferred => json!({ "type": 5 }),
        }
    }
}

/// Reply plus the task that will complete a deferred reply
pub struct Handled {
    pub reply: InteractionReply,
    pub followup: Option<JoinHandle<()>>,
}

pub struct InteractionHandler {
    verifier: InteractionVerifier,
    faq: Arc<FaqResponder>,
    followups: Arc<dyn FollowupSender>,
}

impl InteractionHandler {
    pub fn new(verifier: InteractionVerifier, faq: Arc<FaqResponder>, followups: Arc<dyn FollowupSender>) -> Self {
        Self {
            verifier,
            faq,
            followups,
        }
    }

    /// Verify and answer one interaction request. Must run inside the runtime.
    pub fn handle(
        &self,
        signature: Option<&str>,
        timestamp: Option<&str>,
        body: &[u8],
    ) -> Result<Handled, DiscordError> {
        let (Some(signature), Some(timestamp)) = (signature, timestamp) else {
            return Err(DiscordError::MissingSignature);
        };
        self.verifier.verify(signature, timestamp, body)?;

        let interaction: Interaction =
            serde_json::from_slice(body).map_err(|e| DiscordError::Payload { source: e })?;

        match interaction.kind {
            interaction_type::PING => {
                debug!(target: LOG_TARGET, "Answered endpoint ping");
                Ok(Handled {
                    reply: InteractionReply::Pong,
                    followup: None,
                })
            }
            interaction_type::APPLICATION_COMMAND => Ok(self.command(interaction)),
            other => Err(DiscordError::UnsupportedType(other)),
        }
    }

    fn command(&self, interaction: Interaction) -> Handled {
        let immediate = |text: String| Handled {
            reply: InteractionReply::Message(text),
            followup: None,
        };

        let Some(data) = interaction.data else {
            return immediate(FAQ_USAGE.to_string());
        };
        if !FAQ_COMMANDS.contains(&data.name.as_str()) {
            warn!(target: LOG_TARGET, "Unknown slash command /{}", data.name);
            return immediate(format!("Unknown command /{}.", data.name));
        }
        let Some(question) = data.string_option(QUESTION_OPTION) else {
            return immediate(FAQ_USAGE.to_string());
        };

        info!(target: LOG_TARGET, "Discord /{} question: {}", data.name, question);
        let question = question.to_string();
        let token = interaction.token;
        let faq = self.faq.clone();
        let followups = self.followups.clone();
        let followup = tokio::spawn(async move {
            let answer = faq.answer(&question).await;
            if let Err(e) = followups.edit_original(&token, &answer).await {
                error!(target: LOG_TARGET, "Failed to deliver Discord answer: {}", e);
            }
        });

        Handled {
            reply: InteractionReply::Deferred,
            followup: Some(followup),
        }
    }
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

async fn interactions(
    State(handler): State<Arc<InteractionHandler>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    match handler.handle(header(&headers, SIGNATURE_HEADER), header(&headers, TIMESTAMP_HEADER), &body) {
        Ok(handled) => Json(handled.reply.to_json()).into_response(),
        Err(e) if e.is_unauthorized() => {
            warn!(target: LOG_TARGET, "Rejected interaction: {}", e);
            (StatusCode::UNAUTHORIZED, "invalid request signature").into_response()
        }
        Err(e) => {
            warn!(target: LOG_TARGET, "Bad interaction request: {}", e);
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
    }
}

pub fn router(handler: Arc<InteractionHandler>) -> Router {
    Router::new()
        .route("/interactions", post(interactions))
        .with_state(handler)
}

/// Bind `addr` and serve until `shutdown` turns true
pub async fn serve(
    addr: &str,
    handler: Arc<InteractionHandler>,
    shutdown: watch::Receiver<bool>,
) -> Result<(), DiscordError> {
    let listener = TcpListener::bind(addr).await.map_err(|e| DiscordError::Bind {
        addr: addr.to_string(),
        source: e,
    })?;
    serve_with(listener, handler, shutdown).await
}

pub async fn serve_with(
    listener: TcpListener,
    handler: Arc<InteractionHandler>,
    mut shutdown: watch::Receiver<bool>,
) -> Result<(), DiscordError> {
    if let Ok(local) = listener.local_addr() {
        info!(target: LOG_TARGET, "🌐 Discord interactions endpoint on http://{}/interactions", local);
    }
    axum::serve(listener, router(handler))
        .with_graceful_shutdown(async move {
            while !*shutdown.borrow() {
                if shutdown.changed().await.is_err() {
                    break;
                }
            }
        })
        .await
        .map_err(|e| DiscordError::Serve { source: e })?;
    info!(target: LOG_TARGET, "Discord interactions endpoint stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Signer, SigningKey};

    #[test]
    fn test_verifier_checks_timestamp_and_body() {
        let signing = SigningKey::from_bytes(&[3u8; 32]);
        let verifier = InteractionVerifier::from_hex(&hex::encode(signing.verifying_key().to_bytes())).unwrap();
        let signature = hex::encode(signing.sign(b"1700000000{\"type\":1}").to_bytes());

        assert!(verifier.verify(&signature, "1700000000", b"{\"type\":1}").is_ok());
        assert!(matches!(
            verifier.verify(&signature, "1700000001", b"{\"type\":1}"),
            Err(DiscordError::BadSignature)
        ));
        assert!(matches!(
            verifier.verify("zz", "1700000000", b"{\"type\":1}"),
            Err(DiscordError::BadSignature)
        ));
    }

    #[test]
    fn test_public_key_must_be_32_bytes() {
        assert!(matches!(InteractionVerifier::from_hex("abcd"), Err(DiscordError::InvalidPublicKey)));
        assert!(matches!(InteractionVerifier::from_hex("not hex"), Err(DiscordError::InvalidPublicKey)));
    }

    #[test]
    fn test_reply_json() {
        assert_eq!(InteractionReply::Pong.to_json(), json!({"type": 1}));
        assert_eq!(InteractionReply::Deferred.to_json(), json!({"type": 5}));
        assert_eq!(
            InteractionReply::Message("hi".into()).to_json(),
            json!({"type": 4, "data": {"content": "hi"}})
        );
    }
}

// Changelog:
// - v1.0.0 (2026-10-18): Signed interactions endpoint for /faq, /ask and /faqqer.
