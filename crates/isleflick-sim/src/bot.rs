//! Seeded random bot.
//!
//! Plays every phase through the public session API only, so it exercises
//! the same validation a human client would hit. Choices are random but
//! drawn from its own `ChaCha8Rng`, which keeps a match reproducible from
//! its seed.

use anyhow::{bail, Context, Result};
use glam::Vec2;
use isle_map::StructureKind;
use isleflick_core::{Ability, CoinFace, EntityId, GameSession, PlacementOutcome, PlayerNumber};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Spots tried before a placement is given up.
const PLACEMENT_ATTEMPTS: usize = 256;

/// Ticks a single flick may take to play out.
pub const MAX_FLICK_TICKS: u64 = 20_000;

/// Chance per turn that the bot lifts a pinned token's anchor.
const UNPIN_CHANCE: f64 = 0.25;

/// One seat's decision maker.
#[derive(Debug, Clone)]
pub struct Bot {
    seat: PlayerNumber,
    rng: ChaCha8Rng,
}

impl Bot {
    /// A bot for `seat` with its own seed.
    #[must_use]
    pub fn new(seat: PlayerNumber, seed: u64) -> Self {
        Self {
            seat,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Heads or tails.
    pub fn call_coin(&mut self) -> CoinFace {
        CoinFace::flip(&mut self.rng)
    }

    /// Strikes a random candidate from the pool.
    ///
    /// # Errors
    ///
    /// Propagates session rejections.
    pub fn strike(&mut self, session: &mut GameSession) -> Result<()> {
        let index = self.pool_index(session)?;
        let kind = session.eliminate_candidate(self.seat, index)?;
        tracing::debug!(seat = %self.seat, %kind, "struck");
        Ok(())
    }

    /// Drafts a random candidate.
    ///
    /// # Errors
    ///
    /// Propagates session rejections.
    pub fn pick(&mut self, session: &mut GameSession) -> Result<()> {
        let index = self.pool_index(session)?;
        let kind = session.draft_character(self.seat, index)?;
        tracing::debug!(seat = %self.seat, %kind, "picked");
        Ok(())
    }

    fn pool_index(&mut self, session: &GameSession) -> Result<usize> {
        let len = session.draft().context("no draft in progress")?.pool().len();
        if len == 0 {
            bail!("draft pool is empty");
        }
        Ok(self.rng.gen_range(0..len))
    }

    /// Places the next unplaced token somewhere legal on the bot's half.
    ///
    /// # Errors
    ///
    /// Fails if no accepted spot turns up within the attempt budget.
    pub fn place_next(&mut self, session: &mut GameSession) -> Result<EntityId> {
        let token = *session
            .unplaced_tokens(self.seat)
            .first()
            .context("nothing left to place")?;
        let ability = session.arena().require(token)?.kind().ability();

        for _ in 0..PLACEMENT_ATTEMPTS {
            let spot = self.placement_spot(session, ability);
            if !session.drag_token(self.seat, token, spot)? {
                continue;
            }
            match session.release_token(self.seat, token)? {
                PlacementOutcome::Accepted(_) => return Ok(token),
                PlacementOutcome::Rejected(rejection) => {
                    tracing::trace!(%token, %rejection, "retrying placement");
                }
            }
        }
        bail!("no legal spot found for token {token}")
    }

    fn placement_spot(&mut self, session: &GameSession, ability: Ability) -> Vec2 {
        let map = session.map();
        if ability == Ability::Garrison {
            let owner = self.seat.as_u8();
            let bases: Vec<Vec2> = map
                .structures()
                .iter()
                .filter(|s| s.kind == StructureKind::Base && s.owner == owner)
                .map(|s| s.shape.center())
                .collect();
            if !bases.is_empty() {
                let center = bases[self.rng.gen_range(0..bases.len())];
                return center + self.jitter(0.3);
            }
        }

        let bounds = map.bounds();
        let mid = bounds.center().x;
        let (lo, hi) = match self.seat {
            PlayerNumber::One => (bounds.min.x, mid),
            PlayerNumber::Two => (mid, bounds.max.x),
        };
        Vec2::new(
            self.rng.gen_range(lo..=hi),
            self.rng.gen_range(bounds.min.y..=bounds.max.y),
        )
    }

    /// Plays one gameplay turn: a flick, or a pass when nothing can move.
    ///
    /// Runs the session until the hand-over lands.
    ///
    /// # Errors
    ///
    /// Propagates session rejections, or fails if the flick never settles.
    pub fn take_turn(&mut self, session: &mut GameSession) -> Result<()> {
        if self.rng.gen_bool(UNPIN_CHANCE) {
            let pinned: Vec<EntityId> = session
                .arena()
                .tokens_of(self.seat)
                .filter(|t| t.is_immobile())
                .map(|t| t.id())
                .collect();
            for token in pinned {
                session.release_immobile(self.seat, token)?;
            }
        }

        let movable: Vec<(EntityId, Vec2)> = session
            .arena()
            .tokens_of(self.seat)
            .filter(|t| t.is_placed() && t.is_unlocked() && !t.is_immobile())
            .map(|t| (t.id(), t.position()))
            .collect();
        if movable.is_empty() {
            tracing::debug!(seat = %self.seat, "nothing to flick, passing");
            session.pass_turn(self.seat)?;
            return Ok(());
        }
        let (token, from) = movable[self.rng.gen_range(0..movable.len())];

        let targets: Vec<Vec2> = session
            .arena()
            .tokens_of(self.seat.other())
            .map(|t| t.position())
            .collect();
        let heading = if targets.is_empty() {
            Vec2::ZERO
        } else {
            (targets[self.rng.gen_range(0..targets.len())] - from).normalize_or_zero()
        };
        let heading = (heading + self.jitter(0.4)).normalize_or(Vec2::X);
        let slider = self.rng.gen_range(0.3..=1.0);

        session.select_token(self.seat, token)?;
        // The token travels away from the aim point.
        session.aim_token(self.seat, token, from - heading * 0.5)?;
        session.set_slider_force(self.seat, token, slider)?;
        let force = session.launch_token(self.seat, token)?;
        tracing::debug!(seat = %self.seat, %token, force, "flicked");

        session.run_until_idle(MAX_FLICK_TICKS);
        if !session.is_over() && session.current_player() == self.seat {
            bail!("flick by {} did not settle within {MAX_FLICK_TICKS} ticks", self.seat);
        }
        Ok(())
    }

    fn jitter(&mut self, radius: f32) -> Vec2 {
        Vec2::new(
            self.rng.gen_range(-radius..=radius),
            self.rng.gen_range(-radius..=radius),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use isle_map::IsleMap;
    use isleflick_core::{GamePhase, MatchConfig, PlayerSetup, Roster};

    fn session(seed: u64) -> GameSession {
        GameSession::new(MatchConfig::default(), Roster::standard(), IsleMap::standard(), seed)
            .unwrap()
    }

    fn seats() -> [PlayerSetup; 2] {
        [PlayerSetup::new("a", "a"), PlayerSetup::new("b", "b")]
    }

    #[test]
    fn same_seed_same_calls() {
        let mut a = Bot::new(PlayerNumber::One, 9);
        let mut b = Bot::new(PlayerNumber::One, 9);
        for _ in 0..16 {
            assert_eq!(a.call_coin(), b.call_coin());
        }
    }

    #[test]
    fn bots_finish_the_draft() {
        let mut session = session(4);
        let mut bots = [Bot::new(PlayerNumber::One, 1), Bot::new(PlayerNumber::Two, 2)];
        session.resolve_coin_toss(seats(), CoinFace::Heads).unwrap();

        while session.phase().is_draft() {
            let bot = &mut bots[session.current_player().index()];
            match session.phase() {
                GamePhase::Elimination => bot.strike(&mut session).unwrap(),
                _ => bot.pick(&mut session).unwrap(),
            }
        }
        assert_eq!(session.phase(), GamePhase::Placement);
        assert_eq!(session.arena().token_count(), 8);
    }

    #[test]
    fn placements_land_on_own_half() {
        let mut session = session(4);
        let mut bots = [Bot::new(PlayerNumber::One, 1), Bot::new(PlayerNumber::Two, 2)];
        session.resolve_coin_toss(seats(), CoinFace::Heads).unwrap();
        while session.phase().is_draft() {
            let bot = &mut bots[session.current_player().index()];
            if session.phase() == GamePhase::Elimination {
                bot.strike(&mut session).unwrap();
            } else {
                bot.pick(&mut session).unwrap();
            }
        }
        while session.phase() == GamePhase::Placement {
            let bot = &mut bots[session.current_player().index()];
            bot.place_next(&mut session).unwrap();
        }

        assert_eq!(session.phase(), GamePhase::GamePlay);
        for token in session.arena().tokens_sorted() {
            let x = token.position().x;
            match token.owner() {
                PlayerNumber::One => assert!(x <= 0.0, "{token:?}"),
                PlayerNumber::Two => assert!(x >= 0.0, "{token:?}"),
            }
        }
    }
}
