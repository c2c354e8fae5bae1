//! `IsleMap`: top-level API for the island map.
//!
//! The map owns the arena bounds, the terrain patches and the structures.
//! Everything except structure ownership is fixed once the map is built.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::query::TerrainHit;
use crate::shape::Shape;
use crate::structure::{Structure, StructureId, StructureKind, NEUTRAL_OWNER};
use crate::terrain::{Terrain, TerrainPatch};
use crate::Bounds;

/// Errors raised while building or mutating a map.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MapError {
    /// A patch or structure has a zero-sized or non-finite collider.
    #[error("degenerate collider shape: {0:?}")]
    DegenerateShape(Shape),

    /// Bases must be declared as structures so they carry an owner.
    #[error("terrain patches cannot be of category Base")]
    BasePatch,

    /// Two structures share an identifier.
    #[error("duplicate structure id {0}")]
    DuplicateStructure(StructureId),

    /// No structure with this identifier exists.
    #[error("unknown structure id {0}")]
    UnknownStructure(StructureId),
}

/// The island map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsleMap {
    /// Playable arena, centered on the origin
    bounds: Bounds,
    /// Terrain patches in declaration order
    patches: Vec<TerrainPatch>,
    /// Structures, kept sorted by id
    structures: Vec<Structure>,
}

impl IsleMap {
    /// Create an empty map with the given arena bounds.
    #[must_use]
    pub fn new(bounds: Bounds) -> Self {
        Self {
            bounds,
            patches: Vec::new(),
            structures: Vec::new(),
        }
    }

    /// The stock 10 x 6 island.
    ///
    /// Water fills the arena; a rectangular island sits in the middle with a
    /// base at each end (player 1 west, player 2 east) and two neutral vaults
    /// on the north and south shores.
    #[must_use]
    pub fn standard() -> Self {
        let mut map = Self::new(Bounds::new(10.0, 6.0));
        map.patches = vec![
            TerrainPatch::water(Shape::rect_centered(Vec2::ZERO, 10.0, 6.0)),
            TerrainPatch::land(Shape::rect_centered(Vec2::ZERO, 8.0, 4.0)),
        ];
        map.structures = vec![
            Structure::new(
                StructureId::new(1),
                StructureKind::Base,
                1,
                Shape::circle(Vec2::new(-3.2, 0.0), 0.6),
            ),
            Structure::new(
                StructureId::new(2),
                StructureKind::Base,
                2,
                Shape::circle(Vec2::new(3.2, 0.0), 0.6),
            ),
            Structure::new(
                StructureId::new(3),
                StructureKind::Vault,
                NEUTRAL_OWNER,
                Shape::circle(Vec2::new(0.0, 1.3), 0.4),
            ),
            Structure::new(
                StructureId::new(4),
                StructureKind::Vault,
                NEUTRAL_OWNER,
                Shape::circle(Vec2::new(0.0, -1.3), 0.4),
            ),
        ];
        map
    }

    /// Adds a terrain patch.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::BasePatch`] for `Terrain::Base` patches and
    /// [`MapError::DegenerateShape`] for invalid colliders.
    pub fn add_patch(&mut self, patch: TerrainPatch) -> Result<(), MapError> {
        if patch.terrain == Terrain::Base {
            return Err(MapError::BasePatch);
        }
        if !patch.shape.is_valid() {
            return Err(MapError::DegenerateShape(patch.shape));
        }
        self.patches.push(patch);
        Ok(())
    }

    /// Adds a structure.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::DuplicateStructure`] if the id is taken and
    /// [`MapError::DegenerateShape`] for invalid colliders.
    pub fn add_structure(&mut self, structure: Structure) -> Result<(), MapError> {
        if !structure.shape.is_valid() {
            return Err(MapError::DegenerateShape(structure.shape));
        }
        match self.structures.binary_search_by_key(&structure.id, |s| s.id) {
            Ok(_) => Err(MapError::DuplicateStructure(structure.id)),
            Err(idx) => {
                self.structures.insert(idx, structure);
                Ok(())
            }
        }
    }

    /// Re-checks every collider and structure id.
    ///
    /// Maps built through `add_*` are always valid; deserialized maps are not.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), MapError> {
        for patch in &self.patches {
            if patch.terrain == Terrain::Base {
                return Err(MapError::BasePatch);
            }
            if !patch.shape.is_valid() {
                return Err(MapError::DegenerateShape(patch.shape));
            }
        }
        for pair in self.structures.windows(2) {
            if pair[0].id >= pair[1].id {
                return Err(MapError::DuplicateStructure(pair[1].id));
            }
        }
        if let Some(bad) = self.structures.iter().find(|s| !s.shape.is_valid()) {
            return Err(MapError::DegenerateShape(bad.shape));
        }
        Ok(())
    }

    /// Arena bounds.
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Terrain patches in declaration order.
    #[must_use]
    pub fn patches(&self) -> &[TerrainPatch] {
        &self.patches
    }

    /// Structures in id order.
    #[must_use]
    pub fn structures(&self) -> &[Structure] {
        &self.structures
    }

    /// Looks up a structure.
    #[must_use]
    pub fn structure(&self, id: StructureId) -> Option<&Structure> {
        self.structures
            .binary_search_by_key(&id, |s| s.id)
            .ok()
            .map(|idx| &self.structures[idx])
    }

    /// Terrain under `point`.
    ///
    /// Colliders containing `point` decide first. Among those, bases win over
    /// land and land wins over water. Only when nothing contains `point` does
    /// the probe circle widen the search, with the same ranking. Among several
    /// bases the one whose center is closest to `point` wins. Returns `None`
    /// when no collider is in range.
    #[must_use]
    pub fn terrain_at(&self, point: Vec2, probe_radius: f32) -> Option<TerrainHit> {
        self.best_hit(point, |shape| shape.contains(point))
            .or_else(|| self.best_hit(point, |shape| shape.intersects_circle(point, probe_radius)))
    }

    fn best_hit(&self, point: Vec2, touches: impl Fn(&Shape) -> bool) -> Option<TerrainHit> {
        let base = self
            .structures
            .iter()
            .filter(|s| s.kind == StructureKind::Base)
            .filter(|s| touches(&s.shape))
            .min_by(|a, b| {
                let da = a.shape.center().distance_squared(point);
                let db = b.shape.center().distance_squared(point);
                da.total_cmp(&db)
            });
        if let Some(base) = base {
            return Some(TerrainHit::base(base.id, base.owner));
        }

        self.patches
            .iter()
            .filter(|p| touches(&p.shape))
            .map(|p| p.terrain)
            .max_by_key(|t| t.precedence())
            .map(TerrainHit::plain)
    }

    /// Structures whose footprint contains `point`, in id order.
    pub fn structures_containing(&self, point: Vec2) -> impl Iterator<Item = &Structure> + '_ {
        self.structures
            .iter()
            .filter(move |s| s.shape.contains(point))
    }

    /// Transfers a structure to `new_owner`.
    ///
    /// Returns the previous owner.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::UnknownStructure`] if `id` is not on the map.
    pub fn capture(&mut self, id: StructureId, new_owner: u8) -> Result<u8, MapError> {
        let idx = self
            .structures
            .binary_search_by_key(&id, |s| s.id)
            .map_err(|_| MapError::UnknownStructure(id))?;
        let structure = &mut self.structures[idx];
        let previous = structure.owner;
        structure.owner = new_owner;
        tracing::info!(
            structure = %id,
            kind = %structure.kind,
            previous,
            new_owner,
            "structure captured"
        );
        Ok(previous)
    }
}

impl Default for IsleMap {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod query_tests {
        use super::*;

        #[test]
        fn open_water_reports_water() {
            let map = IsleMap::standard();
            let hit = map.terrain_at(Vec2::new(4.7, 2.7), 0.1).unwrap();
            assert_eq!(hit.terrain, Terrain::Water);
        }

        #[test]
        fn island_reports_land() {
            let map = IsleMap::standard();
            let hit = map.terrain_at(Vec2::new(1.0, 0.5), 0.1).unwrap();
            assert_eq!(hit, TerrainHit::plain(Terrain::Land));
        }

        #[test]
        fn base_beats_land() {
            let map = IsleMap::standard();
            let hit = map.terrain_at(Vec2::new(3.2, 0.0), 0.1).unwrap();
            assert_eq!(hit.terrain, Terrain::Base);
            assert_eq!(hit.owner, 2);
            assert_eq!(hit.structure, Some(StructureId::new(2)));
        }

        #[test]
        fn vault_is_not_terrain() {
            let map = IsleMap::standard();
            let hit = map.terrain_at(Vec2::new(0.0, 1.3), 0.05).unwrap();
            assert_eq!(hit.terrain, Terrain::Land);
        }

        #[test]
        fn outside_everything_is_none() {
            let map = IsleMap::standard();
            assert!(map.terrain_at(Vec2::new(20.0, 20.0), 0.1).is_none());
        }

        #[test]
        fn shoreline_centre_in_water_is_water() {
            let map = IsleMap::standard();
            // Probe reaches the island edge at x = +-4.0, centre does not
            for x in [4.05, -4.05] {
                let hit = map.terrain_at(Vec2::new(x, 0.0), 0.1).unwrap();
                assert_eq!(hit, TerrainHit::plain(Terrain::Water), "x = {x}");
            }
        }

        #[test]
        fn shoreline_centre_on_land_is_land() {
            let map = IsleMap::standard();
            let hit = map.terrain_at(Vec2::new(-3.95, 1.5), 0.1).unwrap();
            assert_eq!(hit, TerrainHit::plain(Terrain::Land));
        }

        #[test]
        fn probe_reaches_land_when_nothing_contains_centre() {
            let mut map = IsleMap::new(Bounds::default());
            map.add_patch(TerrainPatch::land(Shape::circle(Vec2::ZERO, 1.0)))
                .unwrap();
            let hit = map.terrain_at(Vec2::new(1.05, 0.0), 0.1).unwrap();
            assert_eq!(hit.terrain, Terrain::Land);
            assert!(map.terrain_at(Vec2::new(1.5, 0.0), 0.1).is_none());
        }

        #[test]
        fn structures_containing_point() {
            let map = IsleMap::standard();
            let ids: Vec<_> = map
                .structures_containing(Vec2::new(0.0, -1.3))
                .map(|s| s.id)
                .collect();
            assert_eq!(ids, vec![StructureId::new(4)]);
        }
    }

    mod build_tests {
        use super::*;

        #[test]
        fn base_patches_rejected() {
            let mut map = IsleMap::new(Bounds::default());
            let patch = TerrainPatch::new(Terrain::Base, Shape::circle(Vec2::ZERO, 1.0));
            assert_eq!(map.add_patch(patch), Err(MapError::BasePatch));
        }

        #[test]
        fn degenerate_patch_rejected() {
            let mut map = IsleMap::new(Bounds::default());
            let patch = TerrainPatch::land(Shape::circle(Vec2::ZERO, 0.0));
            assert!(matches!(map.add_patch(patch), Err(MapError::DegenerateShape(_))));
        }

        #[test]
        fn duplicate_structure_rejected() {
            let mut map = IsleMap::standard();
            let dup = Structure::new(
                StructureId::new(1),
                StructureKind::Vault,
                0,
                Shape::circle(Vec2::ZERO, 0.5),
            );
            assert_eq!(
                map.add_structure(dup),
                Err(MapError::DuplicateStructure(StructureId::new(1)))
            );
        }

        #[test]
        fn structures_stay_sorted() {
            let mut map = IsleMap::new(Bounds::default());
            for id in [5, 2, 9] {
                map.add_structure(Structure::new(
                    StructureId::new(id),
                    StructureKind::Vault,
                    0,
                    Shape::circle(Vec2::ZERO, 0.5),
                ))
                .unwrap();
            }
            let ids: Vec<u32> = map.structures().iter().map(|s| s.id.as_u32()).collect();
            assert_eq!(ids, vec![2, 5, 9]);
            assert!(map.validate().is_ok());
        }

        #[test]
        fn standard_map_is_valid() {
            assert!(IsleMap::standard().validate().is_ok());
        }
    }

    mod capture_tests {
        use super::*;

        #[test]
        fn capture_changes_owner() {
            let mut map = IsleMap::standard();
            let previous = map.capture(StructureId::new(3), 1).unwrap();
            assert_eq!(previous, NEUTRAL_OWNER);
            assert_eq!(map.structure(StructureId::new(3)).unwrap().owner, 1);
        }

        #[test]
        fn capture_unknown_structure_fails() {
            let mut map = IsleMap::standard();
            assert_eq!(
                map.capture(StructureId::new(99), 1),
                Err(MapError::UnknownStructure(StructureId::new(99)))
            );
        }
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn every_arena_point_has_terrain(x in -5.0f32..=5.0, y in -3.0f32..=3.0) {
                let map = IsleMap::standard();
                prop_assert!(map.terrain_at(Vec2::new(x, y), 0.0).is_some());
            }

            #[test]
            fn base_hits_always_carry_a_structure(x in -5.0f32..=5.0, y in -3.0f32..=3.0) {
                let map = IsleMap::standard();
                if let Some(hit) = map.terrain_at(Vec2::new(x, y), 0.1) {
                    prop_assert_eq!(hit.terrain == Terrain::Base, hit.structure.is_some());
                }
            }
        }
    }

    #[test]
    fn serialization_roundtrip() {
        let map = IsleMap::standard();
        let json = serde_json::to_string(&map).unwrap();
        let restored: IsleMap = serde_json::from_str(&json).unwrap();
        assert_eq!(map, restored);
    }
}
