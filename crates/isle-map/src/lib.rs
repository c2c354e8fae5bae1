//! # Isle Map
//!
//! Static island map for isleflick matches.
//!
//! The map describes the arena as a set of terrain patches (water, land) and
//! owned structures (bases, vaults). It answers the one question the rules
//! engine asks of the world: *what is under this point?*
//!
//! - **Terrain queries**: best terrain hit inside a probe circle
//! - **Structures**: bases and vaults with an owning player (0 = neutral)
//! - **Captures**: the only runtime mutation the map accepts
//! - **Hashing**: deterministic state hash for replay checks
//!
//! ## Quick Start
//!
//! ```
//! use glam::Vec2;
//! use isle_map::{IsleMap, Terrain};
//!
//! let map = IsleMap::standard();
//!
//! // The centre of the standard island is land
//! let hit = map.terrain_at(Vec2::ZERO, 0.1).unwrap();
//! assert_eq!(hit.terrain, Terrain::Land);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod hash;
pub mod map;
pub mod query;
pub mod shape;
pub mod structure;
pub mod terrain;

// Re-exports for convenience
pub use hash::hash_map;
pub use map::{IsleMap, MapError};
pub use query::TerrainHit;
pub use shape::Shape;
pub use structure::{Structure, StructureId, StructureKind, NEUTRAL_OWNER};
pub use terrain::{Terrain, TerrainPatch};

use glam::Vec2;

/// Axis-aligned 2D bounding box.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Bounds {
    /// Minimum corner
    pub min: Vec2,
    /// Maximum corner
    pub max: Vec2,
}

impl Bounds {
    /// Create bounds from dimensions (centered at origin).
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            min: Vec2::new(-width / 2.0, -height / 2.0),
            max: Vec2::new(width / 2.0, height / 2.0),
        }
    }

    /// Create bounds from min/max corners.
    #[must_use]
    pub fn from_min_max(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Get the center of the bounds.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Get the size of the bounds.
    #[must_use]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Half of the size on each axis.
    #[must_use]
    pub fn half_extents(&self) -> Vec2 {
        self.size() * 0.5
    }

    /// Check if a point is inside the bounds (edges inclusive).
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    /// Check if this bounds intersects a circle.
    #[must_use]
    pub fn intersects_circle(&self, center: Vec2, radius: f32) -> bool {
        center.distance_squared(self.clamp(center)) <= radius * radius
    }

    /// Closest point inside the bounds.
    #[must_use]
    pub fn clamp(&self, point: Vec2) -> Vec2 {
        point.clamp(self.min, self.max)
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new(10.0, 6.0)
    }
}
