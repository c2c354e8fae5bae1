//! Error types for the rules core.
//!
//! Every public session operation returns `Result<_, RulesError>`. A failed
//! operation never leaves partial state behind: the session logs the error
//! and the caller's view of the match is unchanged.
//!
//! Placement rejections are *not* errors; see
//! [`PlacementRejection`](crate::placement::PlacementRejection).

use thiserror::Error;

use crate::entity::EntityId;
use crate::phase::GamePhase;
use crate::player::PlayerNumber;

/// Top-level error for rules operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RulesError {
    /// A required piece of content or configuration is absent.
    #[error("configuration missing: {0}")]
    ConfigurationMissing(String),

    /// Configuration is present but unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The map failed validation.
    #[error("invalid map: {0}")]
    Map(#[from] isle_map::MapError),

    /// The operation is not allowed in the current state.
    #[error(transparent)]
    InvalidOperation(#[from] InvalidOperation),
}

/// Operations rejected because of who asked or when.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum InvalidOperation {
    /// A raw player number outside {1, 2}.
    #[error("player number {0} is not 1 or 2")]
    InvalidPlayer(u8),

    /// The actor is not the current player.
    #[error("player {actor} acted during player {current}'s turn")]
    WrongTurn {
        /// Player who attempted the action
        actor: PlayerNumber,
        /// Player whose turn it is
        current: PlayerNumber,
    },

    /// The actor does not own the token.
    #[error("token {token} belongs to player {owner}, not player {actor}")]
    NotOwner {
        /// Token the action targeted
        token: EntityId,
        /// Owner of that token
        owner: PlayerNumber,
        /// Player who attempted the action
        actor: PlayerNumber,
    },

    /// The operation belongs to another phase.
    #[error("operation requires phase {expected}, current phase is {actual}")]
    WrongPhase {
        /// Phase the operation needs
        expected: GamePhase,
        /// Phase the session is in
        actual: GamePhase,
    },

    /// The token is in flight.
    #[error("token {0} is already thrown")]
    AlreadyThrown(EntityId),

    /// The token is pinned in place.
    #[error("token {0} is immobile")]
    Immobile(EntityId),

    /// The token has not been placed on the map.
    #[error("token {0} is not placed")]
    NotPlaced(EntityId),

    /// The token is already on the map.
    #[error("token {0} is already placed")]
    AlreadyPlaced(EntityId),

    /// The token has not been revealed for combat.
    #[error("token {0} is locked")]
    Locked(EntityId),

    /// The token must be selected first.
    #[error("token {0} is not selected")]
    NotSelected(EntityId),

    /// The aim point is missing or on top of the token.
    #[error("token {0} has no usable aim")]
    NoAim(EntityId),

    /// No token with this id exists.
    #[error("unknown token {0}")]
    UnknownToken(EntityId),

    /// A list index beyond the end.
    #[error("index {index} out of range (len {len})")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Length of the list
        len: usize,
    },

    /// A slider value outside `[0, 1]`.
    #[error("slider force {0} outside [0, 1]")]
    SliderOutOfRange(f32),

    /// A flick from this turn is still moving or awaiting hand-over.
    #[error("a flick is still resolving")]
    FlickInProgress,

    /// The coin toss already happened.
    #[error("the coin toss is already resolved")]
    CoinTossResolved,

    /// The match has a result.
    #[error("the match is over")]
    MatchOver,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_operation_converts() {
        let err: RulesError = InvalidOperation::InvalidPlayer(3).into();
        assert_eq!(
            err,
            RulesError::InvalidOperation(InvalidOperation::InvalidPlayer(3))
        );
    }

    #[test]
    fn messages_are_readable() {
        let err = InvalidOperation::WrongTurn {
            actor: PlayerNumber::Two,
            current: PlayerNumber::One,
        };
        assert_eq!(err.to_string(), "player 2 acted during player 1's turn");

        let err = RulesError::ConfigurationMissing("character Golem".into());
        assert_eq!(err.to_string(), "configuration missing: character Golem");
    }

    #[test]
    fn transparent_display() {
        let err: RulesError = InvalidOperation::FlickInProgress.into();
        assert_eq!(err.to_string(), "a flick is still resolving");
    }
}
