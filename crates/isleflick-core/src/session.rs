//! The match session: phase and turn authority.
//!
//! [`GameSession`] is the single owner of everything that changes during a
//! match. Every player action goes through one of its methods, which either
//! applies completely or fails with a [`RulesError`] and leaves the session
//! as it was. Events produced by an operation are queued and flushed when it
//! returns: the score ledger first, then bus subscribers.
//!
//! # Flow
//!
//! ```text
//! CoinToss ─resolve_coin_toss─▶ Elimination ─eliminate_candidate─▶ Selection
//!     Selection ─draft_character (until the draft closes)─▶ Placement
//!     Placement ─release_token (until every token is placed)─▶ GamePlay
//!     GamePlay: select_token → aim_token → launch_token → tick… → hand-over
//! ```
//!
//! # Example
//!
//! ```
//! use isle_map::IsleMap;
//! use isleflick_core::character::Roster;
//! use isleflick_core::config::MatchConfig;
//! use isleflick_core::phase::GamePhase;
//! use isleflick_core::player::{CoinFace, PlayerNumber, PlayerSetup};
//! use isleflick_core::session::GameSession;
//!
//! let mut session =
//!     GameSession::new(MatchConfig::default(), Roster::standard(), IsleMap::standard(), 7)
//!         .unwrap();
//! session
//!     .resolve_coin_toss(
//!         [PlayerSetup::new("Ana", "owl"), PlayerSetup::new("Bo", "fox")],
//!         CoinFace::Heads,
//!     )
//!     .unwrap();
//!
//! assert_eq!(session.phase(), GamePhase::Elimination);
//! assert_eq!(session.current_player(), PlayerNumber::Two);
//! ```

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use glam::Vec2;
use isle_map::{IsleMap, TerrainHit};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::arena::Arena;
use crate::character::{CharacterKind, Roster};
use crate::config::MatchConfig;
use crate::draft::{Draft, DraftStage, DraftStep};
use crate::entity::{EntityId, TokenFlags};
use crate::error::{InvalidOperation, RulesError};
use crate::event::{EventBus, GameEvent};
use crate::ledger::ScoreLedger;
use crate::phase::GamePhase;
use crate::placement::{PlacementRejection, PlacementValidator};
use crate::player::{CoinFace, PlayerInfo, PlayerNumber, PlayerSetup};
use crate::presentation::{Cue, NullPresentation, Presentation, Surface};
use crate::resolver::{default_resolvers, ResolveContext, Resolver};
use crate::scheduler::{Deferred, Scheduler};

/// Candidates the selection stage must open with so each player drafts one.
const MIN_SELECTION_POOL: usize = 3;

/// Result of releasing a dragged token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlacementOutcome {
    /// The token rests on the map
    Accepted(TerrainHit),
    /// The token went back to staging
    Rejected(PlacementRejection),
}

impl PlacementOutcome {
    /// Returns `true` for an accepted placement.
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }
}

/// Where the current flick stands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlickState {
    /// Waiting for the player on turn
    #[default]
    Idle,
    /// Tokens are still moving after `by` launched
    InFlight {
        /// Player who launched
        by: PlayerNumber,
    },
    /// Everything settled; the hand-over is scheduled
    AwaitingHandOver,
}

/// How a match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOutcome {
    /// Winner, `None` when both sides ran out together
    pub winner: Option<PlayerNumber>,
    /// Physics tick of the final event
    pub tick: u64,
}

/// One match, from coin toss to the last token standing.
pub struct GameSession {
    config: MatchConfig,
    roster: Roster,
    map: IsleMap,
    arena: Arena,
    phase: GamePhase,
    current_player: PlayerNumber,
    ledger: Option<ScoreLedger>,
    draft: Option<Draft>,
    validator: PlacementValidator,
    resolvers: Vec<Box<dyn Resolver>>,
    scheduler: Scheduler<Deferred>,
    bus: EventBus,
    presentation: Box<dyn Presentation>,
    rng: ChaCha8Rng,
    seed: u64,
    pending: Vec<GameEvent>,
    event_log: Vec<GameEvent>,
    flick: FlickState,
    outcome: Option<MatchOutcome>,
    tokens_spawned: bool,
}

impl GameSession {
    /// Creates a session waiting for the coin toss.
    ///
    /// # Arguments
    ///
    /// * `config` - Match tunables
    /// * `roster` - Character content; the draft pool is its draftable kinds
    /// * `map` - Island layout
    /// * `seed` - Seed for the coin toss
    ///
    /// # Errors
    ///
    /// Returns an error if any of the inputs fails validation, or if
    /// `eliminations` would leave a player without a single pick.
    pub fn new(
        config: MatchConfig,
        roster: Roster,
        map: IsleMap,
        seed: u64,
    ) -> Result<Self, RulesError> {
        config.validate()?;
        roster.validate()?;
        map.validate()?;
        let pool = roster.draftable().len();
        if pool == 0 {
            return Err(RulesError::ConfigurationMissing(
                "draftable characters".into(),
            ));
        }
        // A lone survivor becomes the remaining card, so two picks need three
        if pool.saturating_sub(config.eliminations) < MIN_SELECTION_POOL {
            return Err(RulesError::InvalidConfig(format!(
                "{} eliminations leave too few of {pool} candidates for both players to pick",
                config.eliminations
            )));
        }

        let validator = PlacementValidator::from_config(&config);
        let resolvers = default_resolvers(&config);
        Ok(Self {
            config,
            roster,
            map,
            arena: Arena::new(),
            phase: GamePhase::CoinToss,
            current_player: PlayerNumber::One,
            ledger: None,
            draft: None,
            validator,
            resolvers,
            scheduler: Scheduler::new(),
            bus: EventBus::new(),
            presentation: Box::new(NullPresentation),
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
            pending: Vec::new(),
            event_log: Vec::new(),
            flick: FlickState::Idle,
            outcome: None,
            tokens_spawned: false,
        })
    }

    /// Replaces the presentation collaborator (builder pattern).
    #[must_use]
    pub fn with_presentation(mut self, presentation: impl Presentation + 'static) -> Self {
        self.presentation = Box::new(presentation);
        self.presentation.show_surface(Surface::CoinToss);
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Active phase.
    #[must_use]
    pub const fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Player on turn.
    #[must_use]
    pub const fn current_player(&self) -> PlayerNumber {
        self.current_player
    }

    /// Tokens.
    #[must_use]
    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Map, including current structure owners.
    #[must_use]
    pub fn map(&self) -> &IsleMap {
        &self.map
    }

    /// Character content.
    #[must_use]
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Tunables.
    #[must_use]
    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Balances; `None` before the coin toss.
    #[must_use]
    pub fn ledger(&self) -> Option<&ScoreLedger> {
        self.ledger.as_ref()
    }

    /// Player record; `None` before the coin toss.
    #[must_use]
    pub fn player(&self, player: PlayerNumber) -> Option<&PlayerInfo> {
        self.ledger.as_ref().map(|l| l.player(player))
    }

    /// Draft state; `None` before the coin toss.
    #[must_use]
    pub fn draft(&self) -> Option<&Draft> {
        self.draft.as_ref()
    }

    /// Flick progress.
    #[must_use]
    pub const fn flick_state(&self) -> FlickState {
        self.flick
    }

    /// Final result, once the match is over.
    #[must_use]
    pub const fn outcome(&self) -> Option<MatchOutcome> {
        self.outcome
    }

    /// Returns `true` once a winner (or draw) is decided.
    #[must_use]
    pub const fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    /// Seed the session was built with.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Physics ticks run so far.
    #[must_use]
    pub const fn current_tick(&self) -> u64 {
        self.arena.current_tick()
    }

    /// The event bus, for subscribing.
    pub fn bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    /// Every event flushed since the last [`take_events`](Self::take_events).
    #[must_use]
    pub fn events(&self) -> &[GameEvent] {
        &self.event_log
    }

    /// Drains the event log.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.event_log)
    }

    /// Tokens of `player` not yet placed, in id order.
    #[must_use]
    pub fn unplaced_tokens(&self, player: PlayerNumber) -> Vec<EntityId> {
        self.arena
            .tokens_of(player)
            .filter(|t| !t.is_placed())
            .map(|t| t.id())
            .collect()
    }

    // =========================================================================
    // Phase and turn
    // =========================================================================

    /// Sends the match to `phase`.
    ///
    /// Unconditional. Entering `Placement` spawns every drafted token at its
    /// owner's staging point (once per match); entering `GamePlay` reveals
    /// every token. Re-entering the active phase changes no state but
    /// repeats the presentation calls.
    pub fn change_phase(&mut self, phase: GamePhase) {
        let from = self.phase;
        self.presentation.hide_surface(surface_for(from));
        self.phase = phase;

        match phase {
            GamePhase::Placement => {
                self.presentation.hide_surface(Surface::DraftGrid);
                self.spawn_drafted_tokens();
            }
            GamePhase::GamePlay => {
                self.presentation.hide_surface(Surface::DraftGrid);
                self.presentation.hide_surface(Surface::PlacementPanel);
                self.reveal_tokens();
            }
            GamePhase::CoinToss | GamePhase::Elimination | GamePhase::Selection => {}
        }
        self.presentation.show_surface(surface_for(phase));

        if from != phase {
            tracing::info!(%from, to = %phase, "phase changed");
            self.pending.push(GameEvent::PhaseChanged { from, to: phase });
        }
        self.flush();
    }

    /// Gives the turn to player `n`.
    ///
    /// Setting the player already on turn is a no-op.
    ///
    /// # Errors
    ///
    /// [`InvalidOperation::InvalidPlayer`] unless `n` is 1 or 2.
    pub fn change_player_turn(&mut self, n: u8) -> Result<(), RulesError> {
        self.run("change_player_turn", |s| {
            let player = PlayerNumber::from_u8(n)?;
            s.set_turn(player);
            Ok(())
        })
    }

    /// Flips the opening coin.
    ///
    /// `seats[0]` makes the `call`; whoever the coin favours becomes player 1.
    /// Creates both player records, starts the draft and hands player 2 the
    /// first elimination. Returns the face shown.
    ///
    /// # Errors
    ///
    /// [`InvalidOperation::CoinTossResolved`] if the toss already happened.
    pub fn resolve_coin_toss(
        &mut self,
        seats: [PlayerSetup; 2],
        call: CoinFace,
    ) -> Result<CoinFace, RulesError> {
        self.run("resolve_coin_toss", move |s| {
            if s.ledger.is_some() {
                return Err(InvalidOperation::CoinTossResolved.into());
            }
            let face = CoinFace::flip(&mut s.rng);
            let caller_won = face == call;
            let [caller, other] = seats;
            let (one, two) = if caller_won {
                (caller, other)
            } else {
                (other, caller)
            };
            tracing::info!(%face, %call, caller_won, one = %one.name, two = %two.name, "coin toss");

            let coins = s.config.starting_coins;
            s.ledger = Some(ScoreLedger::new(
                PlayerInfo::new(PlayerNumber::One, one, coins),
                PlayerInfo::new(PlayerNumber::Two, two, coins),
            ));
            let draft = Draft::new(
                s.roster.draftable(),
                s.config.eliminations,
                s.config.picks_per_player,
            );
            let stage = draft.stage();
            let to_act = draft.to_act();
            s.draft = Some(draft);

            s.presentation.play_cue(Cue::CoinFlip);
            s.pending
                .push(GameEvent::CoinTossResolved { face, caller_won });
            s.enter_draft_stage(stage, to_act);
            Ok(face)
        })
    }

    // =========================================================================
    // Draft
    // =========================================================================

    /// Player 2 strikes the pool candidate at `index`.
    ///
    /// # Errors
    ///
    /// Wrong phase, wrong player or an index outside the pool.
    pub fn eliminate_candidate(
        &mut self,
        actor: PlayerNumber,
        index: usize,
    ) -> Result<CharacterKind, RulesError> {
        self.run("eliminate_candidate", |s| {
            s.ensure_live()?;
            s.ensure_phase(GamePhase::Elimination)?;
            let step = s.draft_mut()?.eliminate(actor, index)?;
            s.presentation.play_cue(Cue::CardEliminate);
            Ok(s.after_draft_step(step))
        })
    }

    /// `actor` drafts the pool candidate at `index`.
    ///
    /// # Errors
    ///
    /// Wrong phase, wrong player or an index outside the pool.
    pub fn draft_character(
        &mut self,
        actor: PlayerNumber,
        index: usize,
    ) -> Result<CharacterKind, RulesError> {
        self.run("draft_character", |s| {
            s.ensure_live()?;
            s.ensure_phase(GamePhase::Selection)?;
            let step = s.draft_mut()?.pick(actor, index)?;
            if let Some(ledger) = s.ledger.as_mut() {
                ledger.player_mut(actor).drafted.push(step.kind);
            }
            s.presentation.play_cue(Cue::CardPick);
            Ok(s.after_draft_step(step))
        })
    }

    // =========================================================================
    // Placement
    // =========================================================================

    /// Moves an unplaced token while its owner drags it.
    ///
    /// Returns whether the spot under it is legal terrain, which is also
    /// shown on the placement indicator.
    ///
    /// # Errors
    ///
    /// Wrong phase, not the owner on turn, or the token is already placed.
    pub fn drag_token(
        &mut self,
        actor: PlayerNumber,
        token: EntityId,
        position: Vec2,
    ) -> Result<bool, RulesError> {
        self.run("drag_token", |s| {
            s.ensure_live()?;
            s.ensure_phase(GamePhase::Placement)?;
            s.ensure_controllable(actor, token)?;
            if s.arena.require(token)?.is_placed() {
                return Err(InvalidOperation::AlreadyPlaced(token).into());
            }

            let t = s.arena.require_mut(token)?;
            t.drag_to(position);
            s.arena.update_spatial(token);
            let valid = s.validator.is_legal_placement(s.arena.require(token)?, &s.map);
            s.presentation.set_placement_indicator(token, valid);
            Ok(valid)
        })
    }

    /// Turns a token in place.
    ///
    /// # Errors
    ///
    /// Outside placement or gameplay, not the owner on turn, or the token is
    /// in flight.
    pub fn rotate_token(
        &mut self,
        actor: PlayerNumber,
        token: EntityId,
        rotation: f32,
    ) -> Result<(), RulesError> {
        self.run("rotate_token", |s| {
            s.ensure_live()?;
            if !matches!(s.phase, GamePhase::Placement | GamePhase::GamePlay) {
                return Err(InvalidOperation::WrongPhase {
                    expected: GamePhase::Placement,
                    actual: s.phase,
                }
                .into());
            }
            s.ensure_controllable(actor, token)?;
            let t = s.arena.require_mut(token)?;
            if t.is_thrown() {
                return Err(InvalidOperation::AlreadyThrown(token).into());
            }
            t.transform.rotation = rotation;
            Ok(())
        })
    }

    /// Drops a dragged token and validates the spot.
    ///
    /// A legal spot places the token, fires its ability and passes the turn
    /// to the other player if they still have tokens to place. An illegal
    /// spot sends the token back to staging; that is an outcome, not an
    /// error. The phase moves to gameplay once every token is placed.
    ///
    /// # Errors
    ///
    /// Wrong phase, not the owner on turn, or the token is already placed.
    pub fn release_token(
        &mut self,
        actor: PlayerNumber,
        token: EntityId,
    ) -> Result<PlacementOutcome, RulesError> {
        self.run("release_token", |s| {
            s.ensure_live()?;
            s.ensure_phase(GamePhase::Placement)?;
            s.ensure_controllable(actor, token)?;
            let kind = {
                let t = s.arena.require(token)?;
                if t.is_placed() {
                    return Err(InvalidOperation::AlreadyPlaced(token).into());
                }
                t.kind()
            };
            let definition = s.roster.require(kind)?.clone();

            let t = s.arena.require_mut(token)?;
            t.flags.remove(TokenFlags::DRAGGING);
            let verdict = s.validator.validate(s.arena.require(token)?, &s.map, &s.arena);

            match verdict {
                Ok(hit) => {
                    let t = s.arena.require_mut(token)?;
                    t.flags.insert(TokenFlags::PLACED);
                    let activation = definition.ability().activate(t, &definition);
                    let rewards: Vec<_> = activation.events(t).collect();
                    tracing::info!(%token, %actor, %kind, terrain = %hit.terrain, "token placed");

                    s.presentation.set_placement_indicator(token, true);
                    s.presentation.play_cue(Cue::PlacementOk);
                    s.pending.push(GameEvent::PlacementResult {
                        token,
                        owner: actor,
                        accepted: true,
                        rejection: None,
                    });
                    s.pending
                        .push(GameEvent::AbilityActivated { token, kind });
                    s.pending.extend(rewards);
                    s.after_placement(actor);
                    Ok(PlacementOutcome::Accepted(hit))
                }
                Err(rejection) => {
                    s.arena.require_mut(token)?.reset_to_staging();
                    s.arena.update_spatial(token);
                    tracing::info!(%token, %actor, %rejection, "placement rejected");

                    s.presentation.set_placement_indicator(token, false);
                    s.presentation.play_cue(Cue::PlacementFail);
                    s.pending.push(GameEvent::PlacementResult {
                        token,
                        owner: actor,
                        accepted: false,
                        rejection: Some(rejection),
                    });
                    Ok(PlacementOutcome::Rejected(rejection))
                }
            }
        })
    }

    /// Lifts a Golem's pin. Releasing an unpinned token is a no-op.
    ///
    /// # Errors
    ///
    /// Unknown token, or not the owner on turn.
    pub fn release_immobile(
        &mut self,
        actor: PlayerNumber,
        token: EntityId,
    ) -> Result<(), RulesError> {
        self.run("release_immobile", |s| {
            s.ensure_live()?;
            s.ensure_controllable(actor, token)?;
            let t = s.arena.require_mut(token)?;
            if t.is_immobile() {
                t.flags.remove(TokenFlags::IMMOBILE);
                tracing::info!(%token, %actor, "immobile released");
            }
            Ok(())
        })
    }

    // =========================================================================
    // Gameplay
    // =========================================================================

    /// Picks the token to flick this turn. Clears any earlier selection.
    ///
    /// # Errors
    ///
    /// Wrong phase, flick in progress, not the owner on turn, or the token
    /// is unplaced, locked or immobile.
    pub fn select_token(&mut self, actor: PlayerNumber, token: EntityId) -> Result<(), RulesError> {
        self.run("select_token", |s| {
            s.ensure_flick_ready()?;
            s.ensure_controllable(actor, token)?;
            let t = s.arena.require(token)?;
            if !t.is_placed() {
                return Err(InvalidOperation::NotPlaced(token).into());
            }
            if !t.is_unlocked() {
                return Err(InvalidOperation::Locked(token).into());
            }
            if t.is_immobile() {
                return Err(InvalidOperation::Immobile(token).into());
            }

            s.clear_selection(actor);
            let t = s.arena.require_mut(token)?;
            t.flags.insert(TokenFlags::SELECTED);
            t.aim_point = None;
            let at = t.position();
            s.presentation.focus_camera(at);
            tracing::debug!(%token, %actor, "token selected");
            Ok(())
        })
    }

    /// Moves the aiming indicator of the selected token.
    ///
    /// # Errors
    ///
    /// Wrong phase, flick in progress, not the owner on turn, or the token
    /// is not selected.
    pub fn aim_token(
        &mut self,
        actor: PlayerNumber,
        token: EntityId,
        aim_point: Vec2,
    ) -> Result<(), RulesError> {
        self.run("aim_token", |s| {
            s.ensure_flick_ready()?;
            s.ensure_controllable(actor, token)?;
            let t = s.arena.require_mut(token)?;
            if !t.is_selected() {
                return Err(InvalidOperation::NotSelected(token).into());
            }
            t.aim_point = Some(aim_point);
            Ok(())
        })
    }

    /// Sets the launch strength slider, in `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Out-of-range value, wrong phase, flick in progress, or not the owner
    /// on turn.
    pub fn set_slider_force(
        &mut self,
        actor: PlayerNumber,
        token: EntityId,
        value: f32,
    ) -> Result<(), RulesError> {
        self.run("set_slider_force", |s| {
            if !(0.0..=1.0).contains(&value) {
                return Err(InvalidOperation::SliderOutOfRange(value).into());
            }
            s.ensure_flick_ready()?;
            s.ensure_controllable(actor, token)?;
            s.arena.require_mut(token)?.slider_force = value;
            Ok(())
        })
    }

    /// Flicks the selected token away from its aiming indicator.
    ///
    /// Force is `slider * speed / max(weight, min_weight)`. The turn stays
    /// locked until every token has settled. Returns the force applied.
    ///
    /// # Errors
    ///
    /// Wrong phase, flick in progress, not the owner on turn, token not
    /// selected, already thrown, immobile or not aimed.
    pub fn launch_token(&mut self, actor: PlayerNumber, token: EntityId) -> Result<f32, RulesError> {
        self.run("launch_token", |s| {
            s.ensure_flick_ready()?;
            s.ensure_controllable(actor, token)?;
            let (kind, slider) = {
                let t = s.arena.require(token)?;
                if t.is_thrown() {
                    return Err(InvalidOperation::AlreadyThrown(token).into());
                }
                if !t.is_selected() {
                    return Err(InvalidOperation::NotSelected(token).into());
                }
                (t.kind(), t.slider_force)
            };
            let force = s
                .roster
                .require(kind)?
                .throw_force(slider, s.config.min_weight);

            s.arena.require_mut(token)?.launch(force)?;
            s.arena.update_spatial(token);
            s.flick = FlickState::InFlight { by: actor };
            tracing::info!(%token, %actor, %kind, force, "token launched");

            s.presentation.play_cue(Cue::Launch);
            s.pending.push(GameEvent::TokenLaunched {
                token,
                owner: actor,
                force,
            });
            Ok(force)
        })
    }

    /// Ends the turn without flicking.
    ///
    /// # Errors
    ///
    /// Wrong phase, flick in progress, or `actor` is not on turn.
    pub fn pass_turn(&mut self, actor: PlayerNumber) -> Result<(), RulesError> {
        self.run("pass_turn", |s| {
            s.ensure_flick_ready()?;
            if actor != s.current_player {
                return Err(InvalidOperation::WrongTurn {
                    actor,
                    current: s.current_player,
                }
                .into());
            }
            s.hand_over(actor.other());
            Ok(())
        })
    }

    /// Advances one physics step.
    ///
    /// Runs the resolvers during gameplay, arms the turn hand-over once a
    /// flick has played out, and fires due scheduled continuations.
    pub fn tick(&mut self) {
        self.arena.advance_tick();
        let now = self.arena.current_tick();

        if self.phase == GamePhase::GamePlay && self.outcome.is_none() {
            let mut events = Vec::new();
            for resolver in &self.resolvers {
                let mut ctx = ResolveContext {
                    arena: &mut self.arena,
                    map: &mut self.map,
                    roster: &self.roster,
                    config: &self.config,
                    events: &mut events,
                };
                resolver.resolve(&mut ctx);
            }
            if events
                .iter()
                .any(|e| matches!(e, GameEvent::StructureCaptured { .. }))
            {
                self.presentation.play_cue(Cue::Capture);
            }
            self.pending.extend(events);
        }

        if let FlickState::InFlight { by } = self.flick {
            if !self.arena.any_moving() {
                let delay = self.config.ticks_for(self.config.turn_handover_delay);
                self.scheduler
                    .schedule_in(now, delay, Deferred::HandOverTurn { to: by.other() });
                self.flick = FlickState::AwaitingHandOver;
                tracing::debug!(tick = now, delay, "flick settled");
            }
        }

        for deferred in self.scheduler.advance(now) {
            match deferred {
                Deferred::HandOverTurn { to } => {
                    if self.outcome.is_none() {
                        self.hand_over(to);
                    }
                }
            }
        }
        self.flush();
    }

    /// Runs ticks until nothing moves and no continuation is pending, or
    /// `max_ticks` have passed. Returns the ticks run.
    pub fn run_until_idle(&mut self, max_ticks: u64) -> u64 {
        let mut ran = 0;
        while ran < max_ticks && (self.flick != FlickState::Idle || !self.scheduler.is_empty()) {
            self.tick();
            ran += 1;
        }
        ran
    }

    /// Deterministic fingerprint of the match state.
    ///
    /// Two sessions built from the same inputs and fed the same operations
    /// hash equal.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.phase.hash(&mut hasher);
        self.current_player.hash(&mut hasher);
        self.arena.current_tick().hash(&mut hasher);
        self.flick.hash(&mut hasher);
        self.outcome.map(|o| o.winner).hash(&mut hasher);

        for token in self.arena.tokens_sorted() {
            token.id().hash(&mut hasher);
            token.owner().hash(&mut hasher);
            token.kind().hash(&mut hasher);
            token.flags.bits().hash(&mut hasher);
            isle_map::hash::hash_vec2(token.position(), &mut hasher);
            isle_map::hash::hash_vec2(token.velocity(), &mut hasher);
            token.transform.rotation.to_bits().hash(&mut hasher);
        }
        if let Some(ledger) = &self.ledger {
            for info in ledger.players() {
                info.coins.hash(&mut hasher);
                info.glory.hash(&mut hasher);
                info.tokens.hash(&mut hasher);
            }
        }
        if let Some(draft) = &self.draft {
            draft.pool().hash(&mut hasher);
            draft.remaining_cards().hash(&mut hasher);
        }
        isle_map::hash::hash_into(&self.map, &mut hasher);
        hasher.finish()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Runs an operation, logs a failure, and flushes queued events.
    fn run<T>(
        &mut self,
        op: &'static str,
        f: impl FnOnce(&mut Self) -> Result<T, RulesError>,
    ) -> Result<T, RulesError> {
        let result = f(self);
        if let Err(err) = &result {
            tracing::warn!(
                op,
                %err,
                phase = %self.phase,
                player = %self.current_player,
                "operation rejected"
            );
        }
        self.flush();
        result
    }

    fn ensure_live(&self) -> Result<(), InvalidOperation> {
        if self.outcome.is_some() {
            return Err(InvalidOperation::MatchOver);
        }
        Ok(())
    }

    fn ensure_phase(&self, expected: GamePhase) -> Result<(), InvalidOperation> {
        if self.phase != expected {
            return Err(InvalidOperation::WrongPhase {
                expected,
                actual: self.phase,
            });
        }
        Ok(())
    }

    fn ensure_flick_ready(&self) -> Result<(), InvalidOperation> {
        self.ensure_live()?;
        self.ensure_phase(GamePhase::GamePlay)?;
        if self.flick != FlickState::Idle {
            return Err(InvalidOperation::FlickInProgress);
        }
        Ok(())
    }

    fn ensure_controllable(&self, actor: PlayerNumber, token: EntityId) -> Result<(), RulesError> {
        self.arena
            .require(token)?
            .ensure_controllable(actor, self.current_player)?;
        Ok(())
    }

    fn draft_mut(&mut self) -> Result<&mut Draft, RulesError> {
        self.draft
            .as_mut()
            .ok_or_else(|| RulesError::ConfigurationMissing("draft".into()))
    }

    fn set_turn(&mut self, player: PlayerNumber) {
        if self.current_player == player {
            tracing::debug!(%player, "turn unchanged");
            return;
        }
        self.current_player = player;
        tracing::info!(%player, "turn changed");
        self.presentation.play_cue(Cue::TurnChange);
        self.pending.push(GameEvent::TurnChanged { player });
    }

    fn after_draft_step(&mut self, step: DraftStep) -> CharacterKind {
        self.pending.extend(step.events);
        if let Some(draft) = &self.draft {
            let (stage, to_act) = (draft.stage(), draft.to_act());
            self.enter_draft_stage(stage, to_act);
        }
        step.kind
    }

    fn enter_draft_stage(&mut self, stage: DraftStage, to_act: PlayerNumber) {
        match stage {
            DraftStage::Elimination | DraftStage::Selection => {
                if self.phase != stage.phase() {
                    self.change_phase(stage.phase());
                }
                self.set_turn(to_act);
            }
            DraftStage::Complete => {
                self.change_phase(GamePhase::Placement);
                let first = self.first_to_place(PlayerNumber::One);
                self.set_turn(first);
                self.presentation
                    .focus_camera(self.config.staging_for(first));
            }
        }
    }

    fn first_to_place(&self, preferred: PlayerNumber) -> PlayerNumber {
        if self.unplaced_tokens(preferred).is_empty() {
            preferred.other()
        } else {
            preferred
        }
    }

    fn after_placement(&mut self, placed_by: PlayerNumber) {
        let all_placed = self.arena.tokens_sorted().all(|t| t.is_placed());
        if all_placed {
            self.change_phase(GamePhase::GamePlay);
            self.flick = FlickState::Idle;
            self.set_turn(PlayerNumber::One);
            return;
        }
        let next = self.first_to_place(placed_by.other());
        self.set_turn(next);
        self.presentation.focus_camera(self.config.staging_for(next));
    }

    fn spawn_drafted_tokens(&mut self) {
        if self.tokens_spawned {
            return;
        }
        let (Some(draft), Some(ledger)) = (&self.draft, &mut self.ledger) else {
            tracing::warn!("placement entered without a draft; no tokens spawned");
            return;
        };
        for player in PlayerNumber::ALL {
            for &kind in draft.picks(player) {
                let Some(definition) = self.roster.get(kind) else {
                    tracing::warn!(%kind, "{}", RulesError::ConfigurationMissing(format!("character {kind}")));
                    continue;
                };
                let mass = definition.weight.max(self.config.min_weight);
                let staging = self.config.staging_for(player);
                let token = self.arena.spawn(player, kind, staging, mass);
                ledger.player_mut(player).tokens.push(token);
                self.pending.push(GameEvent::TokenSpawned {
                    token,
                    owner: player,
                    kind,
                });
            }
        }
        self.tokens_spawned = true;
        tracing::info!(tokens = self.arena.token_count(), "tokens spawned");
    }

    fn reveal_tokens(&mut self) {
        for token in self.arena.tokens_sorted_mut() {
            if !token.is_unlocked() {
                token.flags.insert(TokenFlags::UNLOCKED);
            }
            self.presentation.reveal_token(token.id());
        }
    }

    fn clear_selection(&mut self, player: PlayerNumber) {
        for token in self.arena.tokens_sorted_mut() {
            if token.owner() == player {
                token.flags.remove(TokenFlags::SELECTED);
                token.aim_point = None;
            }
        }
    }

    fn hand_over(&mut self, to: PlayerNumber) {
        self.clear_selection(to.other());
        self.flick = FlickState::Idle;
        self.set_turn(to);
    }

    /// Delivers queued events: ledger first, then subscribers.
    fn flush(&mut self) {
        while !self.pending.is_empty() {
            let batch = std::mem::take(&mut self.pending);
            for event in batch {
                if let Some(ledger) = self.ledger.as_mut() {
                    ledger.apply(&event);
                }
                self.bus.publish(&event);
                self.event_log.push(event);
            }
            self.check_match_end();
        }
    }

    fn check_match_end(&mut self) {
        if self.outcome.is_some() || self.phase != GamePhase::GamePlay || !self.tokens_spawned {
            return;
        }
        let one = self.arena.tokens_of(PlayerNumber::One).count();
        let two = self.arena.tokens_of(PlayerNumber::Two).count();
        let winner = match (one, two) {
            (0, 0) => None,
            (0, _) => Some(PlayerNumber::Two),
            (_, 0) => Some(PlayerNumber::One),
            _ => return,
        };
        let tick = self.arena.current_tick();
        self.outcome = Some(MatchOutcome { winner, tick });
        self.scheduler.clear();
        self.flick = FlickState::Idle;
        tracing::info!(?winner, tick, "match ended");
        self.pending.push(GameEvent::MatchEnded { winner });
    }
}

const fn surface_for(phase: GamePhase) -> Surface {
    match phase {
        GamePhase::CoinToss => Surface::CoinToss,
        GamePhase::Elimination | GamePhase::Selection => Surface::DraftGrid,
        GamePhase::Placement => Surface::PlacementPanel,
        GamePhase::GamePlay => Surface::GameplayHud,
    }
}

impl fmt::Debug for GameSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameSession")
            .field("phase", &self.phase)
            .field("current_player", &self.current_player)
            .field("tick", &self.arena.current_tick())
            .field("tokens", &self.arena.token_count())
            .field("flick", &self.flick)
            .field("outcome", &self.outcome)
            .field("seed", &self.seed)
            .finish_non_exhaustive()
    }
}
