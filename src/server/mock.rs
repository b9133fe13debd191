//! モック応答の生成

use crate::game::{
    DmRequest, DmResponse, GameStartInfo, StateUpdates, VoiceResponse, AVAILABLE_CLASSES, DEFAULT_CLASS, MAX_HP,
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::f64::consts::PI;

const SAMPLE_RATE: u32 = 44_100;
const TONE_HZ: f64 = 800.0;
const TONE_AMPLITUDE: f64 = 0.3;

pub fn game_start_info() -> GameStartInfo {
    GameStartInfo {
        message: "Welcome to AI Dungeon Master!".to_string(),
        initial_hp: MAX_HP,
        default_class: DEFAULT_CLASS.to_string(),
        available_classes: AVAILABLE_CLASSES.iter().map(|c| c.to_string()).collect(),
    }
}

/// 行動なしならオープニング（酒場）、行動ありならその行動を受けた場面を返す
pub fn dm_response(req: &DmRequest) -> DmResponse {
    match req.player_action.as_deref() {
        None => DmResponse {
            dm_narration: "You wake up in a dusty tavern. The smell of ale and adventure fills the air. \
                           A cloaked figure in the corner beckons you over. What do you do?"
                .to_string(),
            scene_summary: "A mysterious figure invites you into adventure.".to_string(),
            suggested_actions: [
                "Approach the cloaked figure".to_string(),
                "Order a drink first".to_string(),
                "Leave the tavern".to_string(),
            ],
            state_updates: StateUpdates {
                inventory_add: vec!["Tavern badge".to_string()],
                location: "Dusty Tavern".to_string(),
                last_scene: "Arrived at the tavern".to_string(),
                ..Default::default()
            },
            game_over: false,
        },
        Some(action) => {
            let name = &req.state.player_name;
            DmResponse {
                dm_narration: format!(
                    "{name} decides to {}. The world shifts around you, and new paths open up.",
                    action.trim().trim_end_matches('.').to_lowercase()
                ),
                scene_summary: format!("{name} acted: {action}"),
                suggested_actions: [
                    "Look around".to_string(),
                    "Press onward".to_string(),
                    "Check your belongings".to_string(),
                ],
                state_updates: StateUpdates { last_scene: format!("Tried to {action}"), ..Default::default() },
                game_over: false,
            }
        }
    }
}

pub fn voice_response() -> VoiceResponse {
    VoiceResponse { audio_base64: STANDARD.encode(tone_wav(1)), content_type: "audio/wav".to_string() }
}

/// 16bit mono PCM の正弦波WAVを生成
pub fn tone_wav(seconds: u32) -> Vec<u8> {
    let samples = SAMPLE_RATE * seconds;
    let data_len = samples * 2;
    let mut out = Vec::with_capacity(44 + data_len as usize);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVEfmt ");
    out.extend_from_slice(&16u32.to_le_bytes()); // fmt chunk size
    out.extend_from_slice(&1u16.to_le_bytes()); // PCM
    out.extend_from_slice(&1u16.to_le_bytes()); // mono
    out.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
    out.extend_from_slice(&(SAMPLE_RATE * 2).to_le_bytes()); // byte rate
    out.extend_from_slice(&2u16.to_le_bytes()); // block align
    out.extend_from_slice(&16u16.to_le_bytes()); // bits per sample
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    for i in 0..samples {
        let t = f64::from(i) / f64::from(SAMPLE_RATE);
        let sample = (f64::from(i16::MAX) * TONE_AMPLITUDE * (2.0 * PI * TONE_HZ * t).sin()) as i16;
        out.extend_from_slice(&sample.to_le_bytes());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::new_game_state;
    use crate::voice::VoiceClip;
    use rodio::Source;

    #[test]
    fn opening_matches_tavern_scene() {
        let req = DmRequest { state: new_game_state("Mira", "Rogue"), player_action: None };
        let r = dm_response(&req);
        assert_eq!(r.state_updates.location, "Dusty Tavern");
        assert_eq!(r.state_updates.inventory_add, vec!["Tavern badge".to_string()]);
        assert!(!r.game_over);
    }

    #[test]
    fn action_is_woven_into_narration() {
        let req = DmRequest {
            state: new_game_state("Mira", "Rogue"),
            player_action: Some("Order a drink first".into()),
        };
        let r = dm_response(&req);
        assert!(r.dm_narration.contains("order a drink first"));
        assert_eq!(r.state_updates.location, "");
    }

    #[test]
    fn mock_voice_is_playable_mono_wav() {
        let clip = VoiceClip::decode(&voice_response()).unwrap();
        assert_eq!(clip.extension(), "wav");
        let source = clip.source().unwrap();
        assert_eq!(source.channels(), 1);
        assert_eq!(source.sample_rate(), SAMPLE_RATE);
    }
}
