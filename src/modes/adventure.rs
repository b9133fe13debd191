//! 冒険モード: ナレーション表示、行動入力、音声待ち

use super::setup::rounded;
use super::{AppMode, GameContext, Mode, SetupMode};
use crate::game::{GameState, MAX_HP};
use crate::session::{GameSession, Phase};
use crate::voice::VoiceClip;
use crate::worker::{Job, Reply};
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    prelude::*,
    widgets::{Paragraph, Wrap},
};
use tracing::{info, warn};

/// 冒険モード状態
pub struct AdventureMode {
    pub session: GameSession,
    /// 自由入力中の行動
    pub input: String,
    /// 選択中の提案（0..3）
    pub selected: Option<usize>,
    /// シンクで音声を再生中
    pub playing: bool,
    player_name: String,
    player_class: String,
}

impl AdventureMode {
    /// 開始済み（オープニング要求送信済み）のセッションから作成
    pub fn new(session: GameSession) -> Self {
        let player_name = session.state().map(|s| s.player_name.clone()).unwrap_or_default();
        let player_class = session.state().map(|s| s.player_class.clone()).unwrap_or_default();
        Self {
            session,
            input: String::new(),
            selected: None,
            playing: false,
            player_name,
            player_class,
        }
    }

    fn handle_reply(&mut self, reply: Reply, ctx: &mut GameContext) {
        match reply {
            Reply::Narration(result) => {
                let succeeded = result.is_ok();
                let voice = self.session.on_dm_response(result);
                if let Some(action) = self.session.take_failed_action() {
                    // 同じ行動をそのまま再送できるよう入力欄に戻す
                    if self.input.is_empty() {
                        self.input = action;
                    }
                }
                if succeeded {
                    self.selected = None;
                }
                if let Some(request) = voice {
                    if let Err(e) = ctx.worker.send(Job::Voice(request)) {
                        self.session.fail_voice(e.to_string());
                    }
                }
            }
            Reply::Voice(result) => {
                let Some(voice) = self.session.on_voice_response(result) else {
                    return;
                };
                let turn = self.session.state().map(|s| s.turn_count).unwrap_or_default();
                let played = VoiceClip::decode(&voice)
                    .map_err(color_eyre::Report::from)
                    .and_then(|clip| ctx.sink.play(&clip, turn));
                match played {
                    Ok(()) => self.playing = true,
                    Err(e) => self.session.fail_voice(format!("Voice playback failed: {e}")),
                }
            }
            Reply::GameStart(_) => {}
        }
    }

    fn submit(&mut self, ctx: &mut GameContext) -> Result<()> {
        let action = if !self.input.trim().is_empty() {
            self.input.clone()
        } else if let Some(choice) = self.selected.and_then(|i| self.session.suggested_actions().get(i)) {
            choice.clone()
        } else {
            return Ok(());
        };
        let request = self.session.submit_action(&action)?;
        ctx.worker.send(Job::Narrate(request))?;
        self.input.clear();
        self.selected = None;
        Ok(())
    }

    fn move_selection(&mut self, forward: bool) {
        let len = self.session.suggested_actions().len();
        if len == 0 {
            return;
        }
        self.selected = Some(match (self.selected, forward) {
            (None, true) => 0,
            (None, false) => len - 1,
            (Some(i), true) => (i + 1) % len,
            (Some(i), false) => (i + len - 1) % len,
        });
    }

    fn status_line(&self) -> Line<'static> {
        if let Some(err) = self.session.error() {
            return Line::from(format!("⚠ {err} (Esc to dismiss)")).red();
        }
        match self.session.phase() {
            Phase::AwaitingDmResponse => Line::from("The Dungeon Master is thinking...").yellow(),
            Phase::AwaitingVoice => Line::from("Narrating... (Space to skip)").cyan(),
            Phase::AwaitingPlayerAction => Line::from("Your move.").green(),
            Phase::GameOver => Line::from("GAME OVER").red().bold(),
            Phase::NotStarted => Line::from("The adventure could not begin.").red(),
        }
    }
}

impl Mode for AdventureMode {
    fn update(&mut self, ctx: &mut GameContext) {
        if self.playing && ctx.sink.is_done() {
            self.playing = false;
            self.session.finish_voice();
        }
        if let Some(reply) = ctx.worker.try_recv() {
            self.handle_reply(reply, ctx);
        }
    }

    fn render(&self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(6), // ステータス
                Constraint::Min(6),    // ナレーション
                Constraint::Length(5), // 提案
                Constraint::Length(3), // 入力
                Constraint::Length(1), // 状態
            ])
            .split(f.area());

        render_status(f, chunks[0], self.session.state());

        let narration = self
            .session
            .response()
            .map(|r| {
                let mut lines: Vec<Line> = r.dm_narration.lines().map(|l| Line::from(l.to_string())).collect();
                if !r.scene_summary.is_empty() {
                    lines.push(Line::from(""));
                    lines.push(Line::from(r.scene_summary.clone()).italic().dark_gray());
                }
                lines
            })
            .unwrap_or_else(|| vec![Line::from("...")]);
        let narration = Paragraph::new(narration)
            .block(rounded(" Dungeon Master "))
            .wrap(Wrap { trim: true });
        f.render_widget(narration, chunks[1]);

        let suggestions: Vec<Line> = self
            .session
            .suggested_actions()
            .iter()
            .enumerate()
            .map(|(i, s)| {
                if self.selected == Some(i) {
                    Line::from(format!("▶ {}. {s}", i + 1)).style(Style::default().fg(Color::White).bg(Color::Blue))
                } else {
                    Line::from(format!("  {}. {s}", i + 1))
                }
            })
            .collect();
        f.render_widget(Paragraph::new(suggestions).block(rounded(" Suggested actions ")), chunks[2]);

        let input = if self.session.phase() == Phase::GameOver {
            "r: New adventure | q: Quit".to_string()
        } else {
            format!("{}_", self.input)
        };
        f.render_widget(Paragraph::new(input).block(rounded(" Action ")), chunks[3]);

        f.render_widget(Paragraph::new(self.status_line()), chunks[4]);
    }

    fn handle_key(&mut self, key: KeyEvent, ctx: &mut GameContext) -> Result<Option<AppMode>> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Ok(Some(AppMode::Exit));
        }

        match self.session.phase() {
            Phase::NotStarted => {
                let error = self.session.error().map(str::to_string);
                let setup = SetupMode::with_error(ctx, &self.player_name, &self.player_class, error);
                return Ok(Some(AppMode::Setup(setup)));
            }
            Phase::AwaitingDmResponse => {}
            Phase::AwaitingVoice => {
                if matches!(key.code, KeyCode::Char(' ') | KeyCode::Enter | KeyCode::Esc) {
                    ctx.sink.stop();
                    self.playing = false;
                    self.session.skip_voice();
                }
            }
            Phase::GameOver => match key.code {
                KeyCode::Char('r') => {
                    self.session.reset()?;
                    info!(target: "app", "adventure: reset");
                    return Ok(Some(AppMode::Setup(SetupMode::new(ctx))));
                }
                KeyCode::Char('q') | KeyCode::Esc => return Ok(Some(AppMode::Exit)),
                _ => {}
            },
            Phase::AwaitingPlayerAction => match key.code {
                KeyCode::Esc => self.session.dismiss_error(),
                KeyCode::Up => self.move_selection(false),
                KeyCode::Down | KeyCode::Tab => self.move_selection(true),
                KeyCode::Enter => {
                    if let Err(e) = self.submit(ctx) {
                        warn!(target: "app", error = %e, "adventure: submit failed");
                        return Err(e);
                    }
                }
                KeyCode::Backspace => {
                    self.input.pop();
                }
                KeyCode::Char(c) => self.input.push(c),
                _ => {}
            },
        }
        Ok(None)
    }
}

/// キャラクター状態を描画
fn render_status(f: &mut Frame, area: Rect, state: Option<&GameState>) {
    let lines = match state {
        Some(s) => {
            let hp_line = Line::from(format!("HP: {}/{}", s.hp, MAX_HP));
            let hp_line = if s.hp <= MAX_HP / 4 { hp_line.red().bold() } else { hp_line.green() };
            let location = if s.location.is_empty() { "(unknown)" } else { s.location.as_str() };
            let inventory = if s.inventory.is_empty() { "empty".to_string() } else { s.inventory.join(", ") };
            vec![
                Line::from(format!("{} the {}", s.player_name, s.player_class)).bold(),
                hp_line,
                Line::from(format!("Location: {location} | Turn: {}", s.turn_count)),
                Line::from(format!("Inventory: {inventory}")).yellow(),
            ]
        }
        None => vec![Line::from("No adventurer yet.")],
    };
    f.render_widget(Paragraph::new(lines).block(rounded(" Adventurer ")), area);
}
