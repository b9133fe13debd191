use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dungeon_master::game::{apply_updates, new_game_state, StateUpdates};

fn criterion_benchmark(c: &mut Criterion) {
    let mut state = new_game_state("Mira", "Rogue");
    state.inventory = (0..50).map(|i| format!("Item {i}")).collect();
    let updates = StateUpdates {
        hp_delta: -3,
        inventory_add: (45..60).map(|i| format!("Item {i}")).collect(),
        inventory_remove: (0..10).map(|i| format!("Item {i}")).collect(),
        location: "Dark Forest clearing".into(),
        last_scene: String::new(),
    };

    c.bench_function("apply_updates 50 items", |b| {
        b.iter(|| apply_updates(black_box(&state), black_box(&updates)))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
