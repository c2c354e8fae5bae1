//! Terrain query results.

use serde::{Deserialize, Serialize};

use crate::structure::StructureId;
use crate::terrain::Terrain;

/// Best terrain found inside a probe circle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainHit {
    /// Terrain category of the winning collider
    pub terrain: Terrain,
    /// Base structure that produced the hit, if any
    pub structure: Option<StructureId>,
    /// Owner of that base (`NEUTRAL_OWNER` for plain terrain)
    pub owner: u8,
}

impl TerrainHit {
    /// Hit on a plain terrain patch.
    #[must_use]
    pub const fn plain(terrain: Terrain) -> Self {
        Self {
            terrain,
            structure: None,
            owner: crate::NEUTRAL_OWNER,
        }
    }

    /// Hit on a base structure.
    #[must_use]
    pub const fn base(structure: StructureId, owner: u8) -> Self {
        Self {
            terrain: Terrain::Base,
            structure: Some(structure),
            owner,
        }
    }

    /// The hit is a base held by someone other than `player`.
    #[must_use]
    pub const fn is_opponent_base(&self, player: u8) -> bool {
        matches!(self.terrain, Terrain::Base)
            && self.owner != crate::NEUTRAL_OWNER
            && self.owner != player
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_hit_is_never_an_opponent_base() {
        let hit = TerrainHit::plain(Terrain::Land);
        assert!(!hit.is_opponent_base(1));
        assert_eq!(hit.structure, None);
    }

    #[test]
    fn base_hit_ownership() {
        let hit = TerrainHit::base(StructureId::new(3), 2);
        assert!(hit.is_opponent_base(1));
        assert!(!hit.is_opponent_base(2));
        assert!(!TerrainHit::base(StructureId::new(3), 0).is_opponent_base(1));
    }
}
