//! DM backend client.
//!
//! Wraps the three backend endpoints behind the `DmService` trait:
//! * `POST /api/dm` – narration + state delta for the current turn
//! * `POST /api/voice` – base64 audio for a narration text
//! * `GET /api/game-start` – static character creation metadata
//!
//! Every failure (connection, timeout, non-2xx status, undecodable body) is
//! folded into one `ServiceError`; callers only ever show its message.

use crate::config::Config;
use crate::game::{DmRequest, DmResponse, GameStartInfo, VoiceRequest, VoiceResponse};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::future::Future;
use thiserror::Error;
use tracing::{debug, info, warn};

const USER_AGENT: &str = concat!("dungeon_master/", env!("CARGO_PKG_VERSION"));

/// Single user-visible failure for any backend call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{operation} failed: {detail}")]
pub struct ServiceError {
    pub operation: &'static str,
    pub detail: String,
}

impl ServiceError {
    pub fn new(operation: &'static str, detail: impl Into<String>) -> Self {
        Self { operation, detail: detail.into() }
    }
}

/// Backend operations used by the game view.
pub trait DmService: Send + Sync + 'static {
    fn narrate(&self, request: &DmRequest) -> impl Future<Output = Result<DmResponse, ServiceError>> + Send;

    fn voice(&self, request: &VoiceRequest) -> impl Future<Output = Result<VoiceResponse, ServiceError>> + Send;

    fn game_start(&self) -> impl Future<Output = Result<GameStartInfo, ServiceError>> + Send;
}

const OP_NARRATE: &str = "DM narration";
const OP_VOICE: &str = "Voice narration";
const OP_GAME_START: &str = "Game start";

/// reqwest-backed implementation talking to the HTTP backend.
#[derive(Debug, Clone)]
pub struct HttpDmClient {
    http: Client,
    base_url: String,
}

impl HttpDmClient {
    pub fn new(config: &Config) -> Result<Self, ServiceError> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ServiceError::new("Client setup", e.to_string()))?;
        Ok(Self { http, base_url: config.backend_url.trim_end_matches('/').to_string() })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn decode<T: DeserializeOwned>(operation: &'static str, resp: Response) -> Result<T, ServiceError> {
        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| ServiceError::new(operation, format!("reading response body: {e}")))?;
        debug!(target: "client", operation, status = %status, len = text.len(), "response_raw");

        if !status.is_success() {
            let detail = error_detail(&text).unwrap_or_else(|| {
                status.canonical_reason().unwrap_or("unknown status").to_string()
            });
            warn!(target: "client", operation, status = status.as_u16(), %detail, "backend_error");
            return Err(ServiceError::new(operation, format!("status {}: {}", status.as_u16(), detail)));
        }

        serde_json::from_str(&text).map_err(|e| ServiceError::new(operation, format!("unexpected response: {e}")))
    }
}

impl DmService for HttpDmClient {
    async fn narrate(&self, request: &DmRequest) -> Result<DmResponse, ServiceError> {
        info!(
            target: "client",
            turn = request.state.turn_count,
            action = request.player_action.as_deref().unwrap_or("(opening)"),
            "dm_request"
        );
        let resp = self
            .http
            .post(self.url("/api/dm"))
            .json(request)
            .send()
            .await
            .map_err(|e| ServiceError::new(OP_NARRATE, transport_detail(&e)))?;
        Self::decode(OP_NARRATE, resp).await
    }

    async fn voice(&self, request: &VoiceRequest) -> Result<VoiceResponse, ServiceError> {
        info!(target: "client", chars = request.text.chars().count(), "voice_request");
        let resp = self
            .http
            .post(self.url("/api/voice"))
            .json(request)
            .send()
            .await
            .map_err(|e| ServiceError::new(OP_VOICE, transport_detail(&e)))?;
        Self::decode(OP_VOICE, resp).await
    }

    async fn game_start(&self) -> Result<GameStartInfo, ServiceError> {
        let resp = self
            .http
            .get(self.url("/api/game-start"))
            .send()
            .await
            .map_err(|e| ServiceError::new(OP_GAME_START, transport_detail(&e)))?;
        Self::decode(OP_GAME_START, resp).await
    }
}

fn transport_detail(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!("request timed out ({e})")
    } else if e.is_connect() {
        format!("could not reach backend ({e})")
    } else {
        e.to_string()
    }
}

/// Pulls a readable message out of an error body. FastAPI-style bodies carry
/// `{"detail": "..."}`; anything else non-empty is returned as-is.
fn error_detail(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(v) => match v.get("detail") {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
            None => Some(body.to_string()),
        },
        Err(_) => Some(body.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let config = Config { backend_url: "http://localhost:8002//".into(), ..Config::default() };
        let client = HttpDmClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8002");
        assert_eq!(client.url("/api/dm"), "http://localhost:8002/api/dm");
    }

    #[test]
    fn fastapi_detail_is_extracted() {
        let body = r#"{"detail":"Failed to parse LLM response: bad json"}"#;
        assert_eq!(error_detail(body).as_deref(), Some("Failed to parse LLM response: bad json"));
        assert_eq!(error_detail("  ").as_deref(), None);
        assert_eq!(error_detail("gateway exploded").as_deref(), Some("gateway exploded"));
    }

    #[test]
    fn service_error_message_names_operation() {
        let e = ServiceError::new(OP_NARRATE, "request timed out");
        assert_eq!(e.to_string(), "DM narration failed: request timed out");
    }
}
