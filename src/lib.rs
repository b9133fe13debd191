pub mod client;
pub mod config;
pub mod game;
pub mod modes; // Setup / Adventure のモードシステム
pub mod server; // モックDMバックエンド (axum)
pub mod session; // ターン状態機械
pub mod voice;
pub mod worker;

pub use client::{DmService, HttpDmClient, ServiceError};
pub use config::Config;
pub use session::{GameSession, Phase};

use color_eyre::Result;
use crossterm::event::{self as crossterm_event, Event, KeyEventKind};
use modes::{AppMode, GameContext, SetupMode};
use ratatui::DefaultTerminal;
use std::time::Duration;

// Ensure .env is loaded for tests before anything else runs in the test process.
#[cfg(test)]
#[ctor::ctor]
fn load_dotenv_for_tests() {
    let _ = dotenvy::dotenv();
}

/// アプリケーションのメインループを実行
pub fn run(mut terminal: DefaultTerminal, mut ctx: GameContext, config: &Config) -> Result<()> {
    let mut current_mode = AppMode::Setup(SetupMode::new(&ctx));
    let poll = Duration::from_millis(config.poll_interval_ms);

    loop {
        // ワーカー応答・音声再生の進行
        current_mode.update(&mut ctx);

        terminal.draw(|f| current_mode.render(f))?;

        if crossterm_event::poll(poll)? {
            match crossterm_event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    match current_mode.handle_key(key, &mut ctx) {
                        Ok(Some(next_mode)) => {
                            if matches!(next_mode, AppMode::Exit) {
                                break;
                            }
                            current_mode = next_mode;
                        }
                        Ok(None) => {}
                        Err(e) => {
                            // エラーが発生した場合はキャラクター作成に戻す
                            tracing::error!("Error in mode: {:?}", e);
                            current_mode = AppMode::Setup(SetupMode::new(&ctx));
                        }
                    }
                }
                Event::Resize(_, _) => {
                    // 次ループで再描画されるので特別な処理なし
                }
                _ => {}
            }
        }
    }
    Ok(())
}
