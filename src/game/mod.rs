pub mod models;
pub mod rules;

pub use models::{DmRequest, DmResponse, GameStartInfo, GameState, StateUpdates, VoiceRequest, VoiceResponse};
pub use rules::{apply_updates, new_game_state, AVAILABLE_CLASSES, DEFAULT_CLASS, MAX_HP, MIN_HP};
