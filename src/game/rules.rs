//! ゲームルール: HP範囲、クラス一覧、状態差分の適用

use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};

use super::models::{GameState, StateUpdates};

pub const MIN_HP: i32 = 0;
pub const MAX_HP: i32 = 20;

pub const DEFAULT_CLASS: &str = "Rogue";
pub const AVAILABLE_CLASSES: [&str; 4] = ["Rogue", "Wizard", "Warrior", "Cleric"];

const SEED_LEN: usize = 12;

pub fn clamp_hp(hp: i32, delta: i32) -> i32 {
    hp.saturating_add(delta).clamp(MIN_HP, MAX_HP)
}

/// キャンペーンシードを生成（セッション開始時に一度だけ）
pub fn new_campaign_seed() -> String {
    let suffix: String = thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SEED_LEN)
        .map(char::from)
        .collect();
    format!("campaign-{suffix}")
}

/// 冒険開始時の初期状態
pub fn new_game_state(player_name: &str, player_class: &str) -> GameState {
    GameState {
        campaign_seed: new_campaign_seed(),
        player_name: player_name.to_string(),
        player_class: player_class.to_string(),
        inventory: Vec::new(),
        hp: MAX_HP,
        location: String::new(),
        last_scene: String::new(),
        turn_count: 0,
    }
}

/// 差分を適用した新しい状態を返す。turn_count はここでは変更しない。
///
/// 所持品は「削除してから追加」。両方に含まれるアイテムは末尾に追加された状態になる。
pub fn apply_updates(state: &GameState, updates: &StateUpdates) -> GameState {
    let mut inventory: Vec<String> = state
        .inventory
        .iter()
        .filter(|item| !updates.inventory_remove.contains(item))
        .cloned()
        .collect();
    for item in &updates.inventory_add {
        if !inventory.contains(item) {
            inventory.push(item.clone());
        }
    }

    GameState {
        hp: clamp_hp(state.hp, updates.hp_delta),
        inventory,
        location: replace_unless_empty(&state.location, &updates.location),
        last_scene: replace_unless_empty(&state.last_scene, &updates.last_scene),
        ..state.clone()
    }
}

fn replace_unless_empty(old: &str, new: &str) -> String {
    if new.is_empty() { old.to_string() } else { new.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with(inventory: &[&str], hp: i32) -> GameState {
        GameState {
            inventory: inventory.iter().map(|s| s.to_string()).collect(),
            hp,
            location: "Old Mill".into(),
            last_scene: "Found a key".into(),
            ..new_game_state("Mira", "Rogue")
        }
    }

    fn items(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn hp_stays_in_range() {
        for hp in MIN_HP..=MAX_HP {
            for delta in [i32::MIN, -100, -21, -1, 0, 1, 5, 21, i32::MAX] {
                let out = clamp_hp(hp, delta);
                assert!((MIN_HP..=MAX_HP).contains(&out), "hp={hp} delta={delta} -> {out}");
            }
        }
        assert_eq!(clamp_hp(20, -2), 18);
        assert_eq!(clamp_hp(3, -10), 0);
        assert_eq!(clamp_hp(19, 4), 20);
    }

    #[test]
    fn removal_then_addition_keeps_survivor_order() {
        let s = state_with(&["Sword", "Torch"], 20);
        let u = StateUpdates {
            inventory_remove: items(&["Sword"]),
            inventory_add: items(&["Shield"]),
            ..Default::default()
        };
        assert_eq!(apply_updates(&s, &u).inventory, items(&["Torch", "Shield"]));
    }

    #[test]
    fn item_in_both_lists_ends_up_added() {
        let s = state_with(&["Rope", "Lamp"], 20);
        let u = StateUpdates {
            inventory_remove: items(&["Rope"]),
            inventory_add: items(&["Rope"]),
            ..Default::default()
        };
        assert_eq!(apply_updates(&s, &u).inventory, items(&["Lamp", "Rope"]));
    }

    #[test]
    fn removing_unknown_item_is_ignored() {
        let s = state_with(&["Torch"], 20);
        let u = StateUpdates { inventory_remove: items(&["Dragon egg"]), ..Default::default() };
        assert_eq!(apply_updates(&s, &u).inventory, items(&["Torch"]));
    }

    #[test]
    fn additions_do_not_duplicate() {
        let s = state_with(&["Torch"], 20);
        let u = StateUpdates { inventory_add: items(&["Torch", "Coin", "Coin"]), ..Default::default() };
        assert_eq!(apply_updates(&s, &u).inventory, items(&["Torch", "Coin"]));
    }

    #[test]
    fn empty_text_fields_retain_previous_values() {
        let s = state_with(&[], 20);
        let next = apply_updates(&s, &StateUpdates::default());
        assert_eq!(next.location, "Old Mill");
        assert_eq!(next.last_scene, "Found a key");

        let u = StateUpdates {
            location: "Bridge".into(),
            last_scene: "Crossed the river".into(),
            ..Default::default()
        };
        let next = apply_updates(&s, &u);
        assert_eq!(next.location, "Bridge");
        assert_eq!(next.last_scene, "Crossed the river");
    }

    #[test]
    fn apply_leaves_identity_fields_and_turn_alone() {
        let s = state_with(&[], 7);
        let next = apply_updates(&s, &StateUpdates { hp_delta: 1, ..Default::default() });
        assert_eq!(next.hp, 8);
        assert_eq!(next.turn_count, s.turn_count);
        assert_eq!(next.campaign_seed, s.campaign_seed);
        assert_eq!(next.player_name, "Mira");
    }

    #[test]
    fn fresh_state_matches_start_rules() {
        let s = new_game_state("Aldo", "Cleric");
        assert_eq!(s.hp, MAX_HP);
        assert_eq!(s.turn_count, 0);
        assert!(s.inventory.is_empty());
        assert!(s.campaign_seed.starts_with("campaign-"));
        assert_eq!(s.campaign_seed.len(), "campaign-".len() + SEED_LEN);
        assert_ne!(s.campaign_seed, new_game_state("Aldo", "Cleric").campaign_seed);
    }
}
