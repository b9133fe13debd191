//! モックDMバックエンド
//!
//! LLMキーなしで動く元バックエンドのフォールバック動作を再現する。
//! ローカルでのプレイと HTTP クライアントの結合テストに使う。

mod handlers;
pub mod mock;

use axum::{
    routing::{get, post},
    Router,
};

/// ルーティング設定
pub fn router() -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/dm", post(handlers::dm))
        .route("/api/voice", post(handlers::voice))
        .route("/api/game-start", get(handlers::game_start))
}
