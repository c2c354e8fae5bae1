//! Coin and glory bookkeeping.
//!
//! The ledger never decides anything; it applies reward and elimination
//! events to the two [`PlayerInfo`] records as they are flushed.

use serde::{Deserialize, Serialize};

use crate::event::GameEvent;
use crate::player::{PlayerInfo, PlayerNumber};

/// Per-player balances for one match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreLedger {
    players: [PlayerInfo; 2],
}

impl ScoreLedger {
    /// Wraps the two player records, seat one first.
    #[must_use]
    pub fn new(one: PlayerInfo, two: PlayerInfo) -> Self {
        Self { players: [one, two] }
    }

    /// Record for `player`.
    #[must_use]
    pub fn player(&self, player: PlayerNumber) -> &PlayerInfo {
        &self.players[player.index()]
    }

    /// Mutable record for `player`.
    pub fn player_mut(&mut self, player: PlayerNumber) -> &mut PlayerInfo {
        &mut self.players[player.index()]
    }

    /// Both records, seat one first.
    #[must_use]
    pub fn players(&self) -> &[PlayerInfo; 2] {
        &self.players
    }

    /// Coin balance.
    #[must_use]
    pub fn coins(&self, player: PlayerNumber) -> i64 {
        self.player(player).coins
    }

    /// Glory points.
    #[must_use]
    pub fn glory(&self, player: PlayerNumber) -> i64 {
        self.player(player).glory
    }

    /// Applies one event. Returns `true` if a balance or roster changed.
    ///
    /// Balances saturate at the `i64` limits.
    pub fn apply(&mut self, event: &GameEvent) -> bool {
        match *event {
            GameEvent::CoinsAwarded { player, amount } => {
                let info = self.player_mut(player);
                info.coins = info.coins.saturating_add(amount);
                tracing::debug!(%player, amount, balance = info.coins, "coins awarded");
                true
            }
            GameEvent::GloryAwarded { player, amount } => {
                let info = self.player_mut(player);
                info.glory = info.glory.saturating_add(amount);
                tracing::debug!(%player, amount, glory = info.glory, "glory awarded");
                true
            }
            GameEvent::TokenEliminated { token, owner } => {
                let tokens = &mut self.player_mut(owner).tokens;
                let before = tokens.len();
                tokens.retain(|t| *t != token);
                before != tokens.len()
            }
            _ => false,
        }
    }
}
