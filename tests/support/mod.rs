#![allow(dead_code)]

//! In-process fakes shared by the worker and mode tests.

use color_eyre::Result;
use dungeon_master::game::{DmRequest, DmResponse, GameStartInfo, StateUpdates, VoiceRequest, VoiceResponse};
use dungeon_master::modes::GameContext;
use dungeon_master::server::mock;
use dungeon_master::voice::{AudioSink, VoiceClip};
use dungeon_master::worker::DmWorker;
use dungeon_master::{DmService, ServiceError};
use std::sync::{Arc, Mutex};

/// Scripted DM backend. Narration fails while `fail_narrate` is set.
#[derive(Clone, Default)]
pub struct FakeDm {
    pub fail_narrate: Arc<Mutex<bool>>,
    pub fail_voice: bool,
    pub game_over_on: Option<String>,
    pub requests: Arc<Mutex<Vec<DmRequest>>>,
}

impl DmService for FakeDm {
    async fn narrate(&self, request: &DmRequest) -> Result<DmResponse, ServiceError> {
        self.requests.lock().unwrap().push(request.clone());
        if *self.fail_narrate.lock().unwrap() {
            return Err(ServiceError::new("DM narration", "request timed out"));
        }
        let mut resp = mock::dm_response(request);
        if let Some(action) = &request.player_action {
            resp.state_updates = StateUpdates {
                hp_delta: -2,
                inventory_add: vec!["Goblin's gold coin".into()],
                location: "Dark Forest clearing".into(),
                last_scene: "Defeated a goblin".into(),
                ..Default::default()
            };
            resp.game_over = self.game_over_on.as_deref() == Some(action.as_str());
        }
        Ok(resp)
    }

    async fn voice(&self, _request: &VoiceRequest) -> Result<VoiceResponse, ServiceError> {
        if self.fail_voice {
            return Err(ServiceError::new("Voice narration", "status 500: tts down"));
        }
        Ok(mock::voice_response())
    }

    async fn game_start(&self) -> Result<GameStartInfo, ServiceError> {
        Ok(mock::game_start_info())
    }
}

/// Sink that records turns. Clips finish instantly unless `hold` is set,
/// in which case they play until `stop` is called.
#[derive(Clone, Default)]
pub struct RecordingSink {
    pub played: Arc<Mutex<Vec<u32>>>,
    pub stops: Arc<Mutex<u32>>,
    pub hold: bool,
    pub playing: Arc<Mutex<bool>>,
}

impl AudioSink for RecordingSink {
    fn play(&mut self, _clip: &VoiceClip, turn: u32) -> Result<()> {
        self.played.lock().unwrap().push(turn);
        *self.playing.lock().unwrap() = self.hold;
        Ok(())
    }

    fn is_done(&self) -> bool {
        !*self.playing.lock().unwrap()
    }

    fn stop(&mut self) {
        *self.stops.lock().unwrap() += 1;
        *self.playing.lock().unwrap() = false;
    }
}

pub fn worker(dm: FakeDm) -> DmWorker {
    let runtime = tokio::runtime::Runtime::new().expect("runtime");
    DmWorker::spawn(dm, runtime)
}

pub fn context(dm: FakeDm, sink: RecordingSink, voice_enabled: bool) -> GameContext {
    GameContext::new(worker(dm), Box::new(sink), voice_enabled)
}
