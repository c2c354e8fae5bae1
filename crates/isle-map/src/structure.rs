//! Bases and vaults.
//!
//! Structures are static map entities with an owning player. Player numbers
//! are plain `u8`s here (1 or 2); `0` marks a neutral structure. The map
//! crate does not know about turns or rewards, it only records ownership.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::shape::Shape;

/// Owner value of a structure nobody holds.
pub const NEUTRAL_OWNER: u8 = 0;

/// Unique identifier for a structure within a map.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StructureId(u32);

impl StructureId {
    /// Creates a new `StructureId`.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for StructureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StructureId({})", self.0)
    }
}

impl fmt::Display for StructureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StructureKind {
    /// Base: counts as `Terrain::Base`, captured for glory points
    Base,
    /// Vault: captured for coins
    Vault,
}

impl fmt::Display for StructureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Base => write!(f, "Base"),
            Self::Vault => write!(f, "Vault"),
        }
    }
}

/// A base or vault placed on the map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Structure {
    /// Identifier, unique within the map
    pub id: StructureId,
    /// Base or vault
    pub kind: StructureKind,
    /// Owning player, `NEUTRAL_OWNER` when unheld
    pub owner: u8,
    /// Collider footprint
    pub shape: Shape,
}

impl Structure {
    /// Create a new structure.
    #[must_use]
    pub fn new(id: StructureId, kind: StructureKind, owner: u8, shape: Shape) -> Self {
        Self {
            id,
            kind,
            owner,
            shape,
        }
    }

    /// Returns `true` if nobody owns this structure.
    #[must_use]
    pub const fn is_neutral(&self) -> bool {
        self.owner == NEUTRAL_OWNER
    }

    /// Owned by a player other than `player`.
    #[must_use]
    pub const fn is_hostile_to(&self, player: u8) -> bool {
        self.owner != NEUTRAL_OWNER && self.owner != player
    }

    /// A capture by `player` changes ownership.
    #[must_use]
    pub const fn is_capturable_by(&self, player: u8) -> bool {
        self.owner != player
    }
}
