//! The pre-match draft.
//!
//! Player 2 first strikes `eliminations` candidates from the shared pool,
//! one per call. Selection then alternates, player 1 first, until each
//! player holds `picks_per_player` characters. Whenever exactly one
//! candidate is left after a pick it is set aside as a remaining card and
//! the draft closes; an empty pool or two full rosters close it too.

use serde::{Deserialize, Serialize};

use crate::character::CharacterKind;
use crate::error::InvalidOperation;
use crate::event::GameEvent;
use crate::phase::GamePhase;
use crate::player::PlayerNumber;

/// Where the draft stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DraftStage {
    /// Player 2 is striking candidates
    Elimination,
    /// Players are picking
    Selection,
    /// Nothing left to do
    Complete,
}

impl DraftStage {
    /// Phase this stage belongs to.
    #[must_use]
    pub const fn phase(self) -> GamePhase {
        match self {
            Self::Elimination => GamePhase::Elimination,
            Self::Selection => GamePhase::Selection,
            Self::Complete => GamePhase::Placement,
        }
    }
}

/// Outcome of one elimination or pick.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftStep {
    /// Character struck or taken
    pub kind: CharacterKind,
    /// Events produced, in order
    pub events: Vec<GameEvent>,
}

/// Draft state for one match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pool: Vec<CharacterKind>,
    eliminated: Vec<CharacterKind>,
    picks: [Vec<CharacterKind>; 2],
    remaining_cards: Vec<CharacterKind>,
    eliminations_left: usize,
    picks_per_player: usize,
    stage: DraftStage,
    to_act: PlayerNumber,
}

impl Draft {
    /// Starts a draft over `pool`.
    ///
    /// Starts directly in selection when there is nothing to strike.
    #[must_use]
    pub fn new(pool: Vec<CharacterKind>, eliminations: usize, picks_per_player: usize) -> Self {
        let eliminations_left = eliminations.min(pool.len());
        let mut draft = Self {
            pool,
            eliminated: Vec::new(),
            picks: [Vec::new(), Vec::new()],
            remaining_cards: Vec::new(),
            eliminations_left,
            picks_per_player,
            stage: DraftStage::Elimination,
            to_act: PlayerNumber::Two,
        };
        if eliminations_left == 0 {
            draft.begin_selection();
        }
        draft
    }

    /// Current stage.
    #[must_use]
    pub const fn stage(&self) -> DraftStage {
        self.stage
    }

    /// Player expected to act next.
    #[must_use]
    pub const fn to_act(&self) -> PlayerNumber {
        self.to_act
    }

    /// Candidates still available.
    #[must_use]
    pub fn pool(&self) -> &[CharacterKind] {
        &self.pool
    }

    /// Candidates struck so far.
    #[must_use]
    pub fn eliminated(&self) -> &[CharacterKind] {
        &self.eliminated
    }

    /// Characters drafted by `player`, in pick order.
    #[must_use]
    pub fn picks(&self, player: PlayerNumber) -> &[CharacterKind] {
        &self.picks[player.index()]
    }

    /// Candidates set aside when the draft closed.
    #[must_use]
    pub fn remaining_cards(&self) -> &[CharacterKind] {
        &self.remaining_cards
    }

    /// Strikes the candidate at `index`.
    ///
    /// # Errors
    ///
    /// - [`InvalidOperation::WrongPhase`] outside elimination
    /// - [`InvalidOperation::WrongTurn`] when `player` is not player 2
    /// - [`InvalidOperation::IndexOutOfRange`] for a bad index
    pub fn eliminate(
        &mut self,
        player: PlayerNumber,
        index: usize,
    ) -> Result<DraftStep, InvalidOperation> {
        self.expect(DraftStage::Elimination, player)?;
        let kind = self.take(index)?;
        self.eliminated.push(kind);
        self.eliminations_left -= 1;
        tracing::debug!(%player, %kind, left = self.eliminations_left, "candidate eliminated");

        let mut events = vec![GameEvent::CandidateEliminated { player, kind }];
        if self.eliminations_left == 0 || self.pool.is_empty() {
            self.begin_selection();
            events.extend(self.close_if_done());
        }
        Ok(DraftStep { kind, events })
    }

    /// Drafts the candidate at `index` for `player`.
    ///
    /// # Errors
    ///
    /// - [`InvalidOperation::WrongPhase`] outside selection
    /// - [`InvalidOperation::WrongTurn`] when it is the other player's pick
    /// - [`InvalidOperation::IndexOutOfRange`] for a bad index
    pub fn pick(
        &mut self,
        player: PlayerNumber,
        index: usize,
    ) -> Result<DraftStep, InvalidOperation> {
        self.expect(DraftStage::Selection, player)?;
        let kind = self.take(index)?;
        self.picks[player.index()].push(kind);
        tracing::debug!(%player, %kind, pool = self.pool.len(), "character drafted");

        let mut events = vec![GameEvent::CharacterDrafted { player, kind }];
        let other = player.other();
        if !self.is_full(other) {
            self.to_act = other;
        }
        events.extend(self.close_if_done());
        Ok(DraftStep { kind, events })
    }

    fn expect(&self, stage: DraftStage, player: PlayerNumber) -> Result<(), InvalidOperation> {
        if self.stage != stage {
            return Err(InvalidOperation::WrongPhase {
                expected: stage.phase(),
                actual: self.stage.phase(),
            });
        }
        if player != self.to_act {
            return Err(InvalidOperation::WrongTurn {
                actor: player,
                current: self.to_act,
            });
        }
        Ok(())
    }

    fn take(&mut self, index: usize) -> Result<CharacterKind, InvalidOperation> {
        if index >= self.pool.len() {
            return Err(InvalidOperation::IndexOutOfRange {
                index,
                len: self.pool.len(),
            });
        }
        Ok(self.pool.remove(index))
    }

    fn begin_selection(&mut self) {
        self.stage = DraftStage::Selection;
        self.to_act = PlayerNumber::One;
    }

    fn is_full(&self, player: PlayerNumber) -> bool {
        self.picks[player.index()].len() >= self.picks_per_player
    }

    fn close_if_done(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if self.pool.len() == 1 {
            let kind = self.pool.remove(0);
            self.remaining_cards.push(kind);
            events.push(GameEvent::RemainingCardAssigned { kind });
        }
        let both_full = PlayerNumber::ALL.into_iter().all(|p| self.is_full(p));
        if self.pool.is_empty() || both_full {
            self.remaining_cards.append(&mut self.pool);
            self.stage = DraftStage::Complete;
            tracing::info!(
                one = ?self.picks[0],
                two = ?self.picks[1],
                remaining = ?self.remaining_cards,
                "draft complete"
            );
        }
        events
    }
}
