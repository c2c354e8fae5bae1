//! Player identity and per-player match records.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::character::CharacterKind;
use crate::entity::EntityId;
use crate::error::InvalidOperation;

/// One of the two seats in a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PlayerNumber {
    /// Player 1 (won the coin toss)
    One,
    /// Player 2
    Two,
}

impl PlayerNumber {
    /// Both players in seat order.
    pub const ALL: [Self; 2] = [Self::One, Self::Two];

    /// Parses a raw player number.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidOperation::InvalidPlayer`] for anything but 1 or 2.
    pub const fn from_u8(n: u8) -> Result<Self, InvalidOperation> {
        match n {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            other => Err(InvalidOperation::InvalidPlayer(other)),
        }
    }

    /// Raw player number (1 or 2).
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
        }
    }

    /// Zero-based seat index.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::One => 0,
            Self::Two => 1,
        }
    }

    /// The opponent.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::One => Self::Two,
            Self::Two => Self::One,
        }
    }
}

impl fmt::Display for PlayerNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

impl TryFrom<u8> for PlayerNumber {
    type Error = InvalidOperation;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        Self::from_u8(n)
    }
}

impl From<PlayerNumber> for u8 {
    fn from(p: PlayerNumber) -> Self {
        p.as_u8()
    }
}

/// Who sits at a seat before the coin toss.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSetup {
    /// Display name
    pub name: String,
    /// Icon asset key, resolved by the presentation layer
    pub icon: String,
}

impl PlayerSetup {
    /// Creates a setup entry.
    #[must_use]
    pub fn new(name: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            icon: icon.into(),
        }
    }
}

/// Per-player aggregate for one match.
///
/// Created when the coin toss resolves; lives until the match ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInfo {
    /// Seat
    pub number: PlayerNumber,
    /// Display name
    pub name: String,
    /// Icon asset key
    pub icon: String,
    /// Tokens still in the match
    pub tokens: Vec<EntityId>,
    /// Characters drafted, in pick order
    pub drafted: Vec<CharacterKind>,
    /// Coin balance
    pub coins: i64,
    /// Glory points
    pub glory: i64,
}

impl PlayerInfo {
    /// Creates a fresh record.
    #[must_use]
    pub fn new(number: PlayerNumber, setup: PlayerSetup, starting_coins: i64) -> Self {
        Self {
            number,
            name: setup.name,
            icon: setup.icon,
            tokens: Vec::new(),
            drafted: Vec::new(),
            coins: starting_coins,
            glory: 0,
        }
    }
}

/// Coin face for the opening toss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoinFace {
    /// Heads
    Heads,
    /// Tails
    Tails,
}

impl CoinFace {
    /// Flips a fair coin.
    pub fn flip<R: Rng + ?Sized>(rng: &mut R) -> Self {
        if rng.gen_bool(0.5) {
            Self::Heads
        } else {
            Self::Tails
        }
    }

    /// The opposite face.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::Heads => Self::Tails,
            Self::Tails => Self::Heads,
        }
    }
}

impl fmt::Display for CoinFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Heads => write!(f, "heads"),
            Self::Tails => write!(f, "tails"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_u8_accepts_seats_only() {
        assert_eq!(PlayerNumber::from_u8(1), Ok(PlayerNumber::One));
        assert_eq!(PlayerNumber::from_u8(2), Ok(PlayerNumber::Two));
        assert_eq!(
            PlayerNumber::from_u8(0),
            Err(InvalidOperation::InvalidPlayer(0))
        );
        assert_eq!(
            PlayerNumber::from_u8(3),
            Err(InvalidOperation::InvalidPlayer(3))
        );
    }

    #[test]
    fn other_is_an_involution() {
        for p in PlayerNumber::ALL {
            assert_ne!(p, p.other());
            assert_eq!(p, p.other().other());
        }
    }

    #[test]
    fn index_matches_seat() {
        assert_eq!(PlayerNumber::One.index(), 0);
        assert_eq!(PlayerNumber::Two.index(), 1);
        assert_eq!(u8::from(PlayerNumber::Two), 2);
    }

    #[test]
    fn new_info_starts_empty() {
        let info = PlayerInfo::new(PlayerNumber::One, PlayerSetup::new("Ana", "fox"), 3);
        assert_eq!(info.coins, 3);
        assert_eq!(info.glory, 0);
        assert!(info.tokens.is_empty());
        assert_eq!(info.name, "Ana");
    }

    #[test]
    fn coin_flip_is_seeded() {
        use rand::SeedableRng;
        use rand_chacha::ChaCha8Rng;

        let flips = |seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            (0..16).map(|_| CoinFace::flip(&mut rng)).collect::<Vec<_>>()
        };
        assert_eq!(flips(9), flips(9));
        assert_eq!(CoinFace::Heads.other(), CoinFace::Tails);
    }
}
