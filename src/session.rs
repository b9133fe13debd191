//! ターン状態機械
//!
//! UI（TUI）から独立して、1セッション分の `GameState` と直近の `DmResponse`
//! を保持し、フェーズ遷移を管理する。ネットワーク呼び出しそのものは行わず、
//! 送るべきリクエストを返し、届いた結果を受け取るだけ。

use crate::client::ServiceError;
use crate::game::{apply_updates, new_game_state, DmRequest, DmResponse, GameState, VoiceRequest, VoiceResponse};
use std::fmt;
use thiserror::Error;
use tracing::{info, warn};

/// セッションのフェーズ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    AwaitingDmResponse,
    AwaitingVoice,
    AwaitingPlayerAction,
    GameOver,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::NotStarted => write!(f, "not started"),
            Phase::AwaitingDmResponse => write!(f, "waiting for the DM"),
            Phase::AwaitingVoice => write!(f, "narrating"),
            Phase::AwaitingPlayerAction => write!(f, "your move"),
            Phase::GameOver => write!(f, "game over"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("cannot {action} while {phase}")]
    InvalidPhase { action: &'static str, phase: Phase },
    #[error("player name must not be empty")]
    MissingName,
}

/// 1セッション分のゲーム進行
#[derive(Debug)]
pub struct GameSession {
    phase: Phase,
    state: Option<GameState>,
    response: Option<DmResponse>,
    error: Option<String>,
    voice_enabled: bool,
    /// 応答待ちのリクエストに含まれるプレイヤー行動
    in_flight_action: Option<String>,
    /// 失敗した行動（手動リトライ用）
    failed_action: Option<String>,
}

impl GameSession {
    pub fn new(voice_enabled: bool) -> Self {
        Self {
            phase: Phase::NotStarted,
            state: None,
            response: None,
            error: None,
            voice_enabled,
            in_flight_action: None,
            failed_action: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> Option<&GameState> {
        self.state.as_ref()
    }

    pub fn response(&self) -> Option<&DmResponse> {
        self.response.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.phase == Phase::AwaitingDmResponse
    }

    pub fn accepts_actions(&self) -> bool {
        self.phase == Phase::AwaitingPlayerAction
    }

    pub fn suggested_actions(&self) -> &[String] {
        self.response.as_ref().map(|r| r.suggested_actions.as_slice()).unwrap_or(&[])
    }

    /// 冒険開始。新しい状態を作り、行動なしのオープニング要求を返す
    pub fn start(&mut self, player_name: &str, player_class: &str) -> Result<DmRequest, SessionError> {
        if self.phase != Phase::NotStarted {
            return Err(SessionError::InvalidPhase { action: "start an adventure", phase: self.phase });
        }
        let name = player_name.trim();
        if name.is_empty() {
            return Err(SessionError::MissingName);
        }
        let state = new_game_state(name, player_class.trim());
        info!(target: "session", seed = %state.campaign_seed, player = %state.player_name, class = %state.player_class, "adventure_start");

        self.state = Some(state.clone());
        self.response = None;
        self.error = None;
        self.in_flight_action = None;
        self.failed_action = None;
        self.phase = Phase::AwaitingDmResponse;
        Ok(DmRequest { state, player_action: None })
    }

    /// プレイヤー行動を送信する。行動文字列は検証せずそのまま転送する
    pub fn submit_action(&mut self, action: &str) -> Result<DmRequest, SessionError> {
        let state = match (&self.state, self.phase) {
            (Some(state), Phase::AwaitingPlayerAction) => state.clone(),
            _ => return Err(SessionError::InvalidPhase { action: "submit an action", phase: self.phase }),
        };
        info!(target: "session", turn = state.turn_count, action, "action_submitted");
        self.error = None;
        self.failed_action = None;
        self.in_flight_action = Some(action.to_string());
        self.phase = Phase::AwaitingDmResponse;
        Ok(DmRequest { state, player_action: Some(action.to_string()) })
    }

    /// DM応答を反映する。音声を要求すべき場合は VoiceRequest を返す
    pub fn on_dm_response(&mut self, result: Result<DmResponse, ServiceError>) -> Option<VoiceRequest> {
        if self.phase != Phase::AwaitingDmResponse {
            warn!(target: "session", phase = %self.phase, "unexpected_dm_response");
            return None;
        }
        let action = self.in_flight_action.take();

        let response = match result {
            Ok(r) => r,
            Err(e) => {
                warn!(target: "session", error = %e, "dm_call_failed");
                self.error = Some(e.to_string());
                if self.response.is_some() {
                    self.failed_action = action;
                    self.phase = Phase::AwaitingPlayerAction;
                } else {
                    // オープニング失敗: 開始前に戻す
                    self.state = None;
                    self.phase = Phase::NotStarted;
                }
                return None;
            }
        };

        let Some(prev) = self.state.as_ref() else {
            self.phase = Phase::NotStarted;
            return None;
        };
        let mut next = apply_updates(prev, &response.state_updates);
        if action.is_some() {
            next.turn_count += 1;
        }
        info!(
            target: "session",
            turn = next.turn_count,
            hp = next.hp,
            location = %next.location,
            game_over = response.game_over,
            "dm_response_applied"
        );

        let speak = self.voice_enabled && !response.dm_narration.trim().is_empty();
        let narration = speak.then(|| response.dm_narration.clone());
        let game_over = response.game_over;
        self.state = Some(next);
        self.response = Some(response);

        let Some(narration) = narration else {
            self.phase = if game_over { Phase::GameOver } else { Phase::AwaitingPlayerAction };
            return None;
        };
        self.phase = Phase::AwaitingVoice;
        Some(VoiceRequest { text: narration })
    }

    /// 音声応答を受け取る。再生すべきクリップがあれば返す（フェーズは AwaitingVoice のまま）
    pub fn on_voice_response(&mut self, result: Result<VoiceResponse, ServiceError>) -> Option<VoiceResponse> {
        if self.phase != Phase::AwaitingVoice {
            // スキップ後に遅れて届いた応答
            info!(target: "session", phase = %self.phase, "stale_voice_response_ignored");
            return None;
        }
        match result {
            Ok(voice) => Some(voice),
            Err(e) => {
                self.fail_voice(e.to_string());
                None
            }
        }
    }

    /// 再生完了
    pub fn finish_voice(&mut self) {
        if self.phase != Phase::AwaitingVoice {
            return;
        }
        let game_over = self.response.as_ref().is_some_and(|r| r.game_over);
        self.phase = if game_over { Phase::GameOver } else { Phase::AwaitingPlayerAction };
    }

    pub fn skip_voice(&mut self) {
        if self.phase == Phase::AwaitingVoice {
            info!(target: "session", "voice_skipped");
        }
        self.finish_voice();
    }

    /// 音声の取得・再生失敗。状態更新は確定済みなので進行は止めない
    pub fn fail_voice(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!(target: "session", error = %message, "voice_failed");
        self.error = Some(message);
        self.finish_voice();
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn take_failed_action(&mut self) -> Option<String> {
        self.failed_action.take()
    }

    /// ゲームオーバー後のリセット。状態は破棄される
    pub fn reset(&mut self) -> Result<(), SessionError> {
        match self.phase {
            Phase::GameOver | Phase::NotStarted => {
                info!(target: "session", "session_reset");
                *self = Self::new(self.voice_enabled);
                Ok(())
            }
            phase => Err(SessionError::InvalidPhase { action: "reset", phase }),
        }
    }
}
