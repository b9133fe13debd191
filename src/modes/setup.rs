//! キャラクター作成モード（NotStarted）: 名前入力とクラス選択

use super::{AdventureMode, AppMode, GameContext, Mode};
use crate::game::{GameStartInfo, AVAILABLE_CLASSES, DEFAULT_CLASS};
use crate::session::GameSession;
use crate::worker::{Job, Reply};
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    prelude::*,
    widgets::{Block, BorderType, Borders, Paragraph},
};
use tracing::{info, warn};

const MAX_NAME_LEN: usize = 32;

/// キャラクター作成モード状態
pub struct SetupMode {
    pub name: String,
    pub classes: Vec<String>,
    pub selected: usize,
    pub welcome: String,
    pub error: Option<String>,
    pub metadata_pending: bool,
    /// メタデータ到着後も維持したいクラス（リトライ時）
    preferred_class: Option<String>,
}

impl SetupMode {
    /// 作成画面を開き、ゲーム開始情報を要求する
    pub fn new(ctx: &GameContext) -> Self {
        let mut mode = Self {
            name: String::new(),
            classes: AVAILABLE_CLASSES.iter().map(|c| c.to_string()).collect(),
            selected: 0,
            welcome: "Welcome, adventurer!".to_string(),
            error: None,
            metadata_pending: true,
            preferred_class: None,
        };
        if let Err(e) = ctx.worker.send(Job::GameStart) {
            mode.metadata_pending = false;
            mode.error = Some(e.to_string());
        }
        mode
    }

    /// 直前の名前・クラス・失敗メッセージ付きで開く（オープニング失敗時）
    pub fn with_error(ctx: &GameContext, name: &str, class: &str, error: Option<String>) -> Self {
        let mut mode = Self::new(ctx);
        mode.name = name.to_string();
        mode.preferred_class = Some(class.to_string());
        mode.select_preferred();
        if error.is_some() {
            mode.error = error;
        }
        mode
    }

    pub fn selected_class(&self) -> &str {
        self.classes.get(self.selected).map(String::as_str).unwrap_or(DEFAULT_CLASS)
    }

    fn apply_metadata(&mut self, info: GameStartInfo) {
        if !info.available_classes.is_empty() {
            self.classes = info.available_classes;
        }
        self.selected = self.classes.iter().position(|c| *c == info.default_class).unwrap_or(0);
        self.welcome = info.message;
        self.select_preferred();
    }

    /// 手動で選んだクラスはメタデータ到着後も維持する
    fn remember_selection(&mut self) {
        if self.preferred_class.is_some() || self.metadata_pending {
            self.preferred_class = Some(self.selected_class().to_string());
        }
    }

    fn select_preferred(&mut self) {
        let Some(preferred) = &self.preferred_class else {
            return;
        };
        if let Some(i) = self.classes.iter().position(|c| c == preferred) {
            self.selected = i;
        }
    }

    fn begin(&mut self, ctx: &mut GameContext) -> Result<Option<AppMode>> {
        let mut session = GameSession::new(ctx.voice_enabled);
        match session.start(&self.name, self.selected_class()) {
            Ok(request) => {
                info!(target: "app", player = %self.name, class = %self.selected_class(), "setup: starting adventure");
                ctx.worker.send(Job::Narrate(request))?;
                Ok(Some(AppMode::Adventure(AdventureMode::new(session))))
            }
            Err(e) => {
                self.error = Some(e.to_string());
                Ok(None)
            }
        }
    }
}

impl Mode for SetupMode {
    fn update(&mut self, ctx: &mut GameContext) {
        if let Some(reply) = ctx.worker.try_recv() {
            match reply {
                Reply::GameStart(Ok(info)) => {
                    self.metadata_pending = false;
                    self.apply_metadata(info);
                }
                Reply::GameStart(Err(e)) => {
                    self.metadata_pending = false;
                    warn!(target: "app", error = %e, "setup: using built-in classes");
                    self.error = Some(e.to_string());
                }
                other => warn!(target: "app", reply = ?other, "setup: ignoring stray reply"),
            }
        }
    }

    fn render(&self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(3),                              // ようこそ
                Constraint::Length(3),                              // 名前
                Constraint::Length(self.classes.len() as u16 + 2), // クラス
                Constraint::Min(1),                                 // ステータス
                Constraint::Length(1),                              // フッター
            ])
            .split(f.area());

        let welcome = Paragraph::new(Line::from(self.welcome.clone()).bold())
            .block(rounded(" AI Dungeon Master "))
            .alignment(Alignment::Center);
        f.render_widget(welcome, chunks[0]);

        let mut name = self.name.clone();
        name.push('_');
        f.render_widget(Paragraph::new(name).block(rounded(" Name ")), chunks[1]);

        let class_lines: Vec<Line> = self
            .classes
            .iter()
            .enumerate()
            .map(|(i, c)| {
                if i == self.selected {
                    Line::from(format!("▶ {c}")).style(Style::default().fg(Color::White).bg(Color::Blue).bold())
                } else {
                    Line::from(format!("  {c}"))
                }
            })
            .collect();
        f.render_widget(Paragraph::new(class_lines).block(rounded(" Class ")), chunks[2]);

        let status = if let Some(err) = &self.error {
            Line::from(err.clone()).red()
        } else if self.metadata_pending {
            Line::from("Contacting the Dungeon Master...").dark_gray()
        } else {
            Line::from("Ready when you are.").green()
        };
        f.render_widget(Paragraph::new(status), chunks[3]);

        let footer = Paragraph::new("Type name | ↑/↓: Class | Enter: Begin | Esc: Exit")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        f.render_widget(footer, chunks[4]);
    }

    fn handle_key(&mut self, key: KeyEvent, ctx: &mut GameContext) -> Result<Option<AppMode>> {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Ok(Some(AppMode::Exit)),
            KeyCode::Esc => Ok(Some(AppMode::Exit)),
            KeyCode::Up => {
                if !self.classes.is_empty() {
                    self.selected = (self.selected + self.classes.len() - 1) % self.classes.len();
                    self.remember_selection();
                }
                Ok(None)
            }
            KeyCode::Down => {
                if !self.classes.is_empty() {
                    self.selected = (self.selected + 1) % self.classes.len();
                    self.remember_selection();
                }
                Ok(None)
            }
            KeyCode::Enter => self.begin(ctx),
            KeyCode::Backspace => {
                self.name.pop();
                Ok(None)
            }
            KeyCode::Char(c) => {
                if self.name.chars().count() < MAX_NAME_LEN {
                    self.name.push(c);
                }
                self.error = None;
                Ok(None)
            }
            _ => Ok(None),
        }
    }
}

pub(crate) fn rounded(title: &str) -> Block<'_> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
}
