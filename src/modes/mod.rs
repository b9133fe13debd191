//! モードシステム: キャラクター作成（Setup）と冒険画面（Adventure）を管理

use crate::voice::AudioSink;
use crate::worker::DmWorker;
use color_eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::Frame;

/// モード間で引き継ぐ共有リソース
pub struct GameContext {
    pub worker: DmWorker,
    pub sink: Box<dyn AudioSink>,
    pub voice_enabled: bool,
}

impl GameContext {
    pub fn new(worker: DmWorker, sink: Box<dyn AudioSink>, voice_enabled: bool) -> Self {
        Self { worker, sink, voice_enabled }
    }
}

/// 各モードが実装すべきトレイト
pub trait Mode {
    /// フレーム毎の非ブロッキング更新処理（ワーカー応答のチェックなど）
    fn update(&mut self, ctx: &mut GameContext);

    /// 画面描画
    fn render(&self, f: &mut Frame);

    /// キーイベント処理
    /// 戻り値: Some(次のモード) でモード遷移、None で同じモード継続
    fn handle_key(&mut self, key: KeyEvent, ctx: &mut GameContext) -> Result<Option<AppMode>>;
}

/// アプリケーションが取り得るモードの列挙型
pub enum AppMode {
    Setup(SetupMode),
    Adventure(AdventureMode),
    Exit,
}

impl AppMode {
    /// 現在のモードで update() を呼び出す
    pub fn update(&mut self, ctx: &mut GameContext) {
        match self {
            AppMode::Setup(m) => m.update(ctx),
            AppMode::Adventure(m) => m.update(ctx),
            AppMode::Exit => {}
        }
    }

    /// 現在のモードで render() を呼び出す
    pub fn render(&self, f: &mut Frame) {
        match self {
            AppMode::Setup(m) => m.render(f),
            AppMode::Adventure(m) => m.render(f),
            AppMode::Exit => {}
        }
    }

    /// 現在のモードで handle_key() を呼び出す
    pub fn handle_key(&mut self, key: KeyEvent, ctx: &mut GameContext) -> Result<Option<AppMode>> {
        match self {
            AppMode::Setup(m) => m.handle_key(key, ctx),
            AppMode::Adventure(m) => m.handle_key(key, ctx),
            AppMode::Exit => Ok(None),
        }
    }
}

pub mod adventure;
pub mod setup;

pub use adventure::AdventureMode;
pub use setup::SetupMode;
