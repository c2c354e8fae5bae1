//! Plays whole matches and aggregates their results.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use isle_map::IsleMap;
use isleflick_core::{
    CoinFace, GameEvent, GamePhase, GameSession, MatchConfig, PlayerNumber, PlayerSetup, Roster,
};
use serde::Serialize;

use crate::bot::Bot;

/// Content shared by every match in a run.
#[derive(Debug, Clone)]
pub struct MatchSetup {
    /// Tunables
    pub config: MatchConfig,
    /// Characters
    pub roster: Roster,
    /// Island
    pub map: IsleMap,
}

impl Default for MatchSetup {
    fn default() -> Self {
        Self {
            config: MatchConfig::default(),
            roster: Roster::standard(),
            map: IsleMap::standard(),
        }
    }
}

impl MatchSetup {
    /// Stock content, with any of the three replaced by a JSON file.
    ///
    /// # Errors
    ///
    /// Unreadable files or content that fails validation.
    pub fn load(config: Option<&Path>, roster: Option<&Path>, map: Option<&Path>) -> Result<Self> {
        let mut setup = Self::default();
        if let Some(path) = config {
            let json = read(path)?;
            setup.config = MatchConfig::from_json(&json)
                .with_context(|| format!("bad config in {}", path.display()))?;
        }
        if let Some(path) = roster {
            let json = read(path)?;
            setup.roster = Roster::from_json(&json)
                .with_context(|| format!("bad roster in {}", path.display()))?;
        }
        if let Some(path) = map {
            let json = read(path)?;
            let map: IsleMap = serde_json::from_str(&json)
                .with_context(|| format!("malformed map in {}", path.display()))?;
            map.validate()
                .with_context(|| format!("bad map in {}", path.display()))?;
            setup.map = map;
        }
        Ok(setup)
    }
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))
}

/// Result of one match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchReport {
    /// Seed the match ran with
    pub seed: u64,
    /// 1 or 2; `None` for a draw or an unfinished match
    pub winner: Option<u8>,
    /// Whether a side ran out of tokens
    pub finished: bool,
    /// Gameplay turns played
    pub turns: u32,
    /// Physics ticks elapsed
    pub ticks: u64,
    /// Coins per seat
    pub coins: [i64; 2],
    /// Glory per seat
    pub glory: [i64; 2],
    /// Tokens left per seat
    pub tokens_left: [usize; 2],
    /// Structures changing hands
    pub captures: usize,
    /// Tokens knocked off the island
    pub eliminations: usize,
    /// Final state fingerprint
    pub state_hash: u64,
}

/// Runs one bot-vs-bot match from `seed`.
///
/// Stops when a side runs out of tokens or after `max_turns` gameplay
/// turns.
///
/// # Errors
///
/// Invalid content, or a bot action the session rejects.
pub fn play(seed: u64, setup: &MatchSetup, max_turns: u32) -> Result<MatchReport> {
    let span = tracing::info_span!("match", seed);
    let _guard = span.enter();

    let mut session = GameSession::new(
        setup.config.clone(),
        setup.roster.clone(),
        setup.map.clone(),
        seed,
    )?;
    let mut bots = [
        Bot::new(PlayerNumber::One, seed.wrapping_mul(2)),
        Bot::new(PlayerNumber::Two, seed.wrapping_mul(2).wrapping_add(1)),
    ];

    let call: CoinFace = bots[0].call_coin();
    session.resolve_coin_toss(
        [PlayerSetup::new("bot-a", "a"), PlayerSetup::new("bot-b", "b")],
        call,
    )?;

    while session.phase().is_draft() {
        let bot = &mut bots[session.current_player().index()];
        if session.phase() == GamePhase::Elimination {
            bot.strike(&mut session)?;
        } else {
            bot.pick(&mut session)?;
        }
    }
    while session.phase() == GamePhase::Placement {
        bots[session.current_player().index()].place_next(&mut session)?;
    }

    let mut turns = 0;
    while session.phase() == GamePhase::GamePlay && !session.is_over() && turns < max_turns {
        bots[session.current_player().index()].take_turn(&mut session)?;
        turns += 1;
    }

    let report = build_report(&session, seed, turns);
    tracing::info!(
        winner = ?report.winner,
        turns,
        ticks = report.ticks,
        finished = report.finished,
        "match complete"
    );
    Ok(report)
}

fn build_report(session: &GameSession, seed: u64, turns: u32) -> MatchReport {
    let outcome = session.outcome();
    let ledger = session.ledger();
    let coins = PlayerNumber::ALL.map(|p| ledger.map_or(0, |l| l.coins(p)));
    let glory = PlayerNumber::ALL.map(|p| ledger.map_or(0, |l| l.glory(p)));
    let tokens_left = PlayerNumber::ALL.map(|p| session.arena().tokens_of(p).count());

    let events = session.events();
    let count = |pred: fn(&GameEvent) -> bool| events.iter().filter(|e| pred(e)).count();

    MatchReport {
        seed,
        winner: outcome.and_then(|o| o.winner).map(PlayerNumber::as_u8),
        finished: outcome.is_some(),
        turns,
        ticks: session.current_tick(),
        coins,
        glory,
        tokens_left,
        captures: count(|e| matches!(e, GameEvent::StructureCaptured { .. })),
        eliminations: count(|e| matches!(e, GameEvent::TokenEliminated { .. })),
        state_hash: session.state_hash(),
    }
}

/// Totals over many matches.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    /// Matches played
    pub matches: u64,
    /// Wins by seat
    pub wins: [u64; 2],
    /// Both sides emptied on the same flick
    pub draws: u64,
    /// Hit the turn cap
    pub unfinished: u64,
    /// Sum of gameplay turns
    pub total_turns: u64,
    /// Sum of captures
    pub total_captures: u64,
    /// Sum of eliminations
    pub total_eliminations: u64,
}

impl Summary {
    /// Folds one report in.
    pub fn add(&mut self, report: &MatchReport) {
        self.matches += 1;
        match (report.finished, report.winner) {
            (false, _) => self.unfinished += 1,
            (true, None) => self.draws += 1,
            (true, Some(seat)) => {
                if let Some(slot) = self.wins.get_mut(usize::from(seat.saturating_sub(1))) {
                    *slot += 1;
                }
            }
        }
        self.total_turns += u64::from(report.turns);
        self.total_captures += report.captures as u64;
        self.total_eliminations += report.eliminations as u64;
    }

    /// Combines two partial summaries.
    pub fn merge(&mut self, other: &Self) {
        self.matches += other.matches;
        self.wins[0] += other.wins[0];
        self.wins[1] += other.wins[1];
        self.draws += other.draws;
        self.unfinished += other.unfinished;
        self.total_turns += other.total_turns;
        self.total_captures += other.total_captures;
        self.total_eliminations += other.total_eliminations;
    }

    /// Mean gameplay turns per match.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn mean_turns(&self) -> f64 {
        if self.matches == 0 {
            0.0
        } else {
            self.total_turns as f64 / self.matches as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn match_runs_to_a_report() {
        let report = play(3, &MatchSetup::default(), 60).unwrap();
        assert_eq!(report.seed, 3);
        assert!(report.turns <= 60);
        if report.finished {
            assert!(report.tokens_left.contains(&0));
        } else {
            assert_eq!(report.turns, 60);
        }
    }

    #[test]
    fn same_seed_same_report() {
        let setup = MatchSetup::default();
        assert_eq!(play(21, &setup, 40).unwrap(), play(21, &setup, 40).unwrap());
    }

    #[test]
    fn tiny_draft_plays_out() {
        let setup = MatchSetup {
            config: MatchConfig {
                picks_per_player: 1,
                ..MatchConfig::default()
            },
            ..MatchSetup::default()
        };
        let report = play(8, &setup, 30).unwrap();
        assert!(report.tokens_left.iter().all(|&n| n <= 1));
    }

    #[test]
    fn summary_counts_outcomes() {
        let base = MatchReport {
            seed: 0,
            winner: None,
            finished: false,
            turns: 10,
            ticks: 100,
            coins: [0, 0],
            glory: [0, 0],
            tokens_left: [1, 1],
            captures: 2,
            eliminations: 1,
            state_hash: 0,
        };
        let mut summary = Summary::default();
        summary.add(&base);
        summary.add(&MatchReport {
            winner: Some(2),
            finished: true,
            ..base.clone()
        });
        summary.add(&MatchReport {
            finished: true,
            ..base.clone()
        });

        assert_eq!(summary.matches, 3);
        assert_eq!(summary.wins, [0, 1]);
        assert_eq!(summary.draws, 1);
        assert_eq!(summary.unfinished, 1);
        assert_eq!(summary.total_captures, 6);
        assert!((summary.mean_turns() - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_file_is_reported() {
        let err = MatchSetup::load(Some(Path::new("/nonexistent/config.json")), None, None)
            .unwrap_err();
        assert!(err.to_string().contains("cannot read"));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(8))]

        #[test]
        fn any_seed_plays_without_error(seed in 0u64..10_000) {
            let report = play(seed, &MatchSetup::default(), 20);
            prop_assert!(report.is_ok(), "{:?}", report.err());
        }

        #[test]
        fn merge_matches_sequential_add(split in 0usize..6) {
            let reports: Vec<MatchReport> = (0..6u64)
                .map(|i| MatchReport {
                    seed: i,
                    winner: (i % 3 != 0).then_some(if i % 2 == 0 { 1 } else { 2 }),
                    finished: i % 4 != 0,
                    turns: u32::try_from(i).unwrap_or(0),
                    ticks: i * 10,
                    coins: [0, 0],
                    glory: [0, 0],
                    tokens_left: [0, 1],
                    captures: 1,
                    eliminations: 0,
                    state_hash: i,
                })
                .collect();
            let mut all = Summary::default();
            reports.iter().for_each(|r| all.add(r));

            let (left, right) = reports.split_at(split);
            let mut a = Summary::default();
            let mut b = Summary::default();
            left.iter().for_each(|r| a.add(r));
            right.iter().for_each(|r| b.add(r));
            a.merge(&b);
            prop_assert_eq!(a, all);
        }
    }
}
