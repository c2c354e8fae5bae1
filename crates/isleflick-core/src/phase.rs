//! Match phases.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The single active phase of a match.
///
/// Normal flow is `CoinToss → Elimination → Selection → Placement → GamePlay`.
/// The session may be sent to any phase at any time; transitions are
/// unconditional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GamePhase {
    /// Deciding who is player 1
    #[default]
    CoinToss,
    /// Player 2 removes candidates from the pool
    Elimination,
    /// Players alternately draft characters
    Selection,
    /// Players position their drafted tokens
    Placement,
    /// Flicking combat
    GamePlay,
}

impl GamePhase {
    /// Phases where the draft pool is in use.
    #[must_use]
    pub const fn is_draft(self) -> bool {
        matches!(self, Self::Elimination | Self::Selection)
    }
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CoinToss => write!(f, "CoinToss"),
            Self::Elimination => write!(f, "Elimination"),
            Self::Selection => write!(f, "Selection"),
            Self::Placement => write!(f, "Placement"),
            Self::GamePlay => write!(f, "GamePlay"),
        }
    }
}
