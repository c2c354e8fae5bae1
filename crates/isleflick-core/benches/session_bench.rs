use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use glam::Vec2;
use isle_map::IsleMap;
use isleflick_core::{
    CharacterKind, CoinFace, GamePhase, GameSession, MatchConfig, PlayerNumber, PlayerSetup,
    Roster,
};

/// Coin toss, index-0 draft, tokens lined up at x = ∓2.
fn opening(seed: u64) -> GameSession {
    let mut session =
        GameSession::new(MatchConfig::default(), Roster::standard(), IsleMap::standard(), seed)
            .unwrap();
    session
        .resolve_coin_toss(
            [PlayerSetup::new("Ana", "owl"), PlayerSetup::new("Bo", "fox")],
            CoinFace::Heads,
        )
        .unwrap();
    session.eliminate_candidate(PlayerNumber::Two, 0).unwrap();
    while session.phase() == GamePhase::Selection {
        let player = session.current_player();
        session.draft_character(player, 0).unwrap();
    }

    let mut slots = [0usize; 2];
    while session.phase() == GamePhase::Placement {
        let player = session.current_player();
        let token = session.unplaced_tokens(player)[0];
        let side = if player == PlayerNumber::One { -1.0 } else { 1.0 };
        let y = -1.5 + slots[player.index()] as f32;
        slots[player.index()] += 1;
        session.drag_token(player, token, Vec2::new(2.0 * side, y)).unwrap();
        session.release_token(player, token).unwrap();
    }
    session
}

fn bench_opening(c: &mut Criterion) {
    c.bench_function("opening_to_gameplay", |b| {
        b.iter(|| black_box(opening(black_box(7)).state_hash()))
    });
}

fn bench_flick(c: &mut Criterion) {
    c.bench_function("flick_until_idle", |b| {
        b.iter_batched(
            || opening(7),
            |mut session| {
                let rogue = session
                    .arena()
                    .tokens_of(PlayerNumber::One)
                    .find(|t| t.kind() == CharacterKind::Rogue)
                    .map(|t| t.id())
                    .unwrap();
                session.select_token(PlayerNumber::One, rogue).unwrap();
                session
                    .aim_token(PlayerNumber::One, rogue, Vec2::new(-3.0, 1.5))
                    .unwrap();
                session.set_slider_force(PlayerNumber::One, rogue, 1.0).unwrap();
                session.launch_token(PlayerNumber::One, rogue).unwrap();
                black_box(session.run_until_idle(10_000))
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_state_hash(c: &mut Criterion) {
    let session = opening(7);
    c.bench_function("state_hash", |b| b.iter(|| black_box(session.state_hash())));
}

criterion_group!(benches, bench_opening, bench_flick, bench_state_hash);
criterion_main!(benches);
