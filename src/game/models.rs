//! ゲーム状態とDMバックエンドとの送受信データ

use serde::{Deserialize, Serialize};

/// セッション中に保持されるゲーム状態（ターン毎に丸ごと置き換える）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub campaign_seed: String,
    pub player_name: String,
    pub player_class: String,
    /// 表示順を保持する重複なしの所持品リスト
    #[serde(default)]
    pub inventory: Vec<String>,
    pub hp: i32,
    pub location: String,
    #[serde(default)]
    pub last_scene: String,
    pub turn_count: u32,
}

/// DMが返す状態差分。空文字列の location / last_scene は「変更なし」
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateUpdates {
    pub hp_delta: i32,
    pub inventory_add: Vec<String>,
    pub inventory_remove: Vec<String>,
    pub location: String,
    pub last_scene: String,
}

/// POST /api/dm のレスポンス
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DmResponse {
    pub dm_narration: String,
    pub scene_summary: String,
    pub suggested_actions: [String; 3],
    #[serde(default)]
    pub state_updates: StateUpdates,
    #[serde(default)]
    pub game_over: bool,
}

/// POST /api/dm のリクエスト
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DmRequest {
    pub state: GameState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_action: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceRequest {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceResponse {
    pub audio_base64: String,
    #[serde(default = "default_content_type")]
    pub content_type: String,
}

fn default_content_type() -> String {
    "audio/mp3".to_string()
}

/// GET /api/game-start のレスポンス
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStartInfo {
    pub message: String,
    pub initial_hp: i32,
    pub default_class: String,
    pub available_classes: Vec<String>,
}
