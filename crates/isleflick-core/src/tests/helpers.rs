//! Test helpers for building sessions and scripting the early phases.

use glam::Vec2;
use isle_map::IsleMap;

use crate::character::{CharacterKind, Roster};
use crate::config::MatchConfig;
use crate::entity::EntityId;
use crate::phase::GamePhase;
use crate::player::{CoinFace, PlayerNumber, PlayerSetup};
use crate::session::GameSession;

/// Every phase, in flow order.
pub const ALL_PHASES: [GamePhase; 5] = [
    GamePhase::CoinToss,
    GamePhase::Elimination,
    GamePhase::Selection,
    GamePhase::Placement,
    GamePhase::GamePlay,
];

/// Standard content, stock config.
pub fn new_session(seed: u64) -> GameSession {
    new_session_with(MatchConfig::default(), seed)
}

/// Standard content with a custom config.
pub fn new_session_with(config: MatchConfig, seed: u64) -> GameSession {
    GameSession::new(config, Roster::standard(), IsleMap::standard(), seed)
        .expect("standard content is valid")
}

/// Two named seats.
pub fn seats() -> [PlayerSetup; 2] {
    [PlayerSetup::new("Ana", "owl"), PlayerSetup::new("Bo", "fox")]
}

/// Resolves the coin toss with a heads call.
pub fn toss(session: &mut GameSession) {
    session
        .resolve_coin_toss(seats(), CoinFace::Heads)
        .expect("coin toss");
}

/// Strikes and picks index 0 until the draft closes.
///
/// With the standard roster player 1 ends up with Knight, Dwarf, King and
/// Rogue; player 2 with Golem, Gryphon, Thief and Satyr; Enchantress is the
/// remaining card.
pub fn complete_draft(session: &mut GameSession) {
    while session.phase() == GamePhase::Elimination {
        session
            .eliminate_candidate(PlayerNumber::Two, 0)
            .expect("elimination");
    }
    while session.phase() == GamePhase::Selection {
        let player = session.current_player();
        session.draft_character(player, 0).expect("pick");
    }
}

/// A legal resting spot for the `slot`-th token a player places.
///
/// Land tokens line up at `x = ∓2`, mermaids in the water at `x = ∓4.6`,
/// garrison tokens on their own base.
pub fn placement_spot(player: PlayerNumber, kind: CharacterKind, slot: usize) -> Vec2 {
    let side = match player {
        PlayerNumber::One => -1.0,
        PlayerNumber::Two => 1.0,
    };
    let y = [-1.5, -0.5, 0.5, 1.5][slot % 4];
    match kind {
        CharacterKind::Mermaid => Vec2::new(4.6 * side, y),
        CharacterKind::Default => Vec2::new(3.2 * side, 0.0),
        _ => Vec2::new(2.0 * side, y),
    }
}

/// Places every token at [`placement_spot`], alternating as the session
/// dictates. Returns token ids in placement order.
pub fn place_all(session: &mut GameSession) -> Vec<EntityId> {
    place_all_with(session, placement_spot)
}

/// Like [`place_all`] with custom spots.
pub fn place_all_with(
    session: &mut GameSession,
    spot: impl Fn(PlayerNumber, CharacterKind, usize) -> Vec2,
) -> Vec<EntityId> {
    let mut slots = [0usize; 2];
    let mut order = Vec::new();
    while session.phase() == GamePhase::Placement {
        let player = session.current_player();
        let token = session.unplaced_tokens(player)[0];
        let kind = session.arena().get(token).expect("spawned").kind();
        let at = spot(player, kind, slots[player.index()]);

        session.drag_token(player, token, at).expect("drag");
        let outcome = session.release_token(player, token).expect("release");
        assert!(outcome.is_accepted(), "{kind} at {at}: {outcome:?}");

        slots[player.index()] += 1;
        order.push(token);
    }
    order
}

/// Coin toss, draft and placement; leaves the session at the start of
/// gameplay with player 1 on turn.
pub fn ready_for_gameplay(seed: u64) -> GameSession {
    let mut session = new_session(seed);
    toss(&mut session);
    complete_draft(&mut session);
    place_all(&mut session);
    session
}

/// Id of the first token of `kind` owned by `player`.
pub fn token_of(session: &GameSession, player: PlayerNumber, kind: CharacterKind) -> EntityId {
    session
        .arena()
        .tokens_of(player)
        .find(|t| t.kind() == kind)
        .map(crate::entity::Token::id)
        .expect("token drafted")
}

/// Select, aim, set slider, launch, then tick until the turn has passed.
pub fn flick(session: &mut GameSession, token: EntityId, aim: Vec2, slider: f32) -> f32 {
    let player = session.current_player();
    session.select_token(player, token).expect("select");
    session.aim_token(player, token, aim).expect("aim");
    session.set_slider_force(player, token, slider).expect("slider");
    let force = session.launch_token(player, token).expect("launch");
    session.run_until_idle(10_000);
    force
}
