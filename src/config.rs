//! アプリケーション設定（プロセス起動時に一度だけ読み込む）

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8002";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_SERVER_ADDR: &str = "0.0.0.0:8002";

/// アプリケーション設定
#[derive(Debug, Clone)]
pub struct Config {
    /// DMバックエンドのベースURL (DM_BACKEND_URL)
    pub backend_url: String,
    /// 1リクエストあたりのタイムアウト（60秒固定。環境変数では変えない）
    pub request_timeout: Duration,
    /// 音声ナレーションを要求するか (DM_VOICE)
    pub voice_enabled: bool,
    /// 音声クリップの書き出し先 (DM_AUDIO_DIR)
    pub audio_dir: PathBuf,
    /// モックサーバのバインドアドレス (DM_SERVER_ADDR)
    pub server_addr: String,
    /// イベントポーリング間隔（ミリ秒）
    pub poll_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            voice_enabled: true,
            audio_dir: PathBuf::from("audio"),
            server_addr: DEFAULT_SERVER_ADDR.to_string(),
            poll_interval_ms: 100,
        }
    }
}

impl Config {
    /// 新しい設定インスタンスを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 環境変数から読み込む（.env は呼び出し側で dotenvy により読み込み済みの想定）
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 任意の参照関数から読み込む。未設定・不正値はデフォルトのまま。
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(url) = get("DM_BACKEND_URL") {
            config.backend_url = url;
        }
        if let Some(raw) = get("DM_VOICE") {
            config.voice_enabled = !matches!(raw.to_ascii_lowercase().as_str(), "0" | "off" | "false" | "no");
        }
        if let Some(dir) = get("DM_AUDIO_DIR") {
            config.audio_dir = PathBuf::from(dir);
        }
        if let Some(addr) = get("DM_SERVER_ADDR") {
            config.server_addr = addr;
        }
        config
    }
}
