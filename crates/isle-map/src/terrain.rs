//! Terrain categories and terrain patches.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::shape::Shape;

/// Terrain category under a point.
///
/// `Base` is never authored as a patch; it is reported for points covered by
/// a base structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Terrain {
    /// Open water
    Water,
    /// Island ground
    Land,
    /// Ground covered by a base structure
    Base,
}

impl Terrain {
    /// Query precedence when several colliders overlap the probe.
    ///
    /// Structures sit on top of land, land sits on top of water.
    #[must_use]
    pub const fn precedence(self) -> u8 {
        match self {
            Self::Water => 0,
            Self::Land => 1,
            Self::Base => 2,
        }
    }

    /// Land or base.
    #[must_use]
    pub const fn is_ground(self) -> bool {
        matches!(self, Self::Land | Self::Base)
    }
}

impl fmt::Display for Terrain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Water => write!(f, "Water"),
            Self::Land => write!(f, "Land"),
            Self::Base => write!(f, "Base"),
        }
    }
}

/// A region of uniform terrain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TerrainPatch {
    /// Terrain category of the region
    pub terrain: Terrain,
    /// Collider covering the region
    pub shape: Shape,
}

impl TerrainPatch {
    /// Create a new patch.
    #[must_use]
    pub fn new(terrain: Terrain, shape: Shape) -> Self {
        Self { terrain, shape }
    }

    /// Water patch.
    #[must_use]
    pub fn water(shape: Shape) -> Self {
        Self::new(Terrain::Water, shape)
    }

    /// Land patch.
    #[must_use]
    pub fn land(shape: Shape) -> Self {
        Self::new(Terrain::Land, shape)
    }
}
