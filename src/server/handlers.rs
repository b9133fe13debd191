use axum::extract::Json;
use serde_json::{json, Value};

use super::mock;
use crate::game::{DmRequest, DmResponse, GameStartInfo, VoiceRequest, VoiceResponse};

/// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// POST /api/dm - 現在のターンのナレーションを返す
pub async fn dm(Json(req): Json<DmRequest>) -> Json<DmResponse> {
    tracing::info!(
        target: "server",
        turn = req.state.turn_count,
        action = req.player_action.as_deref().unwrap_or("(opening)"),
        "DM request"
    );
    Json(mock::dm_response(&req))
}

/// POST /api/voice - ナレーション音声（モックのビープ音）
pub async fn voice(Json(req): Json<VoiceRequest>) -> Json<VoiceResponse> {
    tracing::info!(target: "server", chars = req.text.chars().count(), "Voice request");
    Json(mock::voice_response())
}

/// GET /api/game-start - キャラクター作成用の情報
pub async fn game_start() -> Json<GameStartInfo> {
    Json(mock::game_start_info())
}
