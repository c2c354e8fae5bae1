//! State hashing for determinism verification.
//!
//! Two maps that went through the same captures must hash identically.
//! Floats are hashed by bit pattern.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use glam::Vec2;

use crate::shape::Shape;
use crate::structure::Structure;
use crate::terrain::TerrainPatch;
use crate::{Bounds, IsleMap};

/// Compute a deterministic hash of map state.
///
/// Covers bounds, every patch and every structure including its owner.
#[must_use]
pub fn hash_map(map: &IsleMap) -> u64 {
    let mut hasher = DefaultHasher::new();
    hash_into(map, &mut hasher);
    hasher.finish()
}

/// Feed map state into an existing hasher.
///
/// Used by callers that hash a larger state (a whole match) in one pass.
pub fn hash_into<H: Hasher>(map: &IsleMap, hasher: &mut H) {
    hash_bounds(&map.bounds(), hasher);

    map.patches().len().hash(hasher);
    for patch in map.patches() {
        hash_patch(patch, hasher);
    }

    map.structures().len().hash(hasher);
    for structure in map.structures() {
        hash_structure(structure, hasher);
    }
}

fn hash_patch<H: Hasher>(patch: &TerrainPatch, hasher: &mut H) {
    patch.terrain.hash(hasher);
    hash_shape(&patch.shape, hasher);
}

fn hash_structure<H: Hasher>(structure: &Structure, hasher: &mut H) {
    structure.id.hash(hasher);
    structure.kind.hash(hasher);
    structure.owner.hash(hasher);
    hash_shape(&structure.shape, hasher);
}

fn hash_shape<H: Hasher>(shape: &Shape, hasher: &mut H) {
    match shape {
        Shape::Circle { center, radius } => {
            0u8.hash(hasher);
            hash_vec2(*center, hasher);
            radius.to_bits().hash(hasher);
        }
        Shape::Rect { bounds } => {
            1u8.hash(hasher);
            hash_bounds(bounds, hasher);
        }
    }
}

fn hash_bounds<H: Hasher>(bounds: &Bounds, hasher: &mut H) {
    hash_vec2(bounds.min, hasher);
    hash_vec2(bounds.max, hasher);
}

/// Hash a vector by bit pattern.
pub fn hash_vec2<H: Hasher>(v: Vec2, hasher: &mut H) {
    v.x.to_bits().hash(hasher);
    v.y.to_bits().hash(hasher);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::StructureId;

    #[test]
    fn identical_maps_hash_identically() {
        assert_eq!(hash_map(&IsleMap::standard()), hash_map(&IsleMap::standard()));
    }

    #[test]
    fn capture_changes_hash() {
        let before = IsleMap::standard();
        let mut after = before.clone();
        after.capture(StructureId::new(3), 2).unwrap();
        assert_ne!(hash_map(&before), hash_map(&after));
    }

    #[test]
    fn same_captures_same_hash() {
        let mut a = IsleMap::standard();
        let mut b = IsleMap::standard();
        a.capture(StructureId::new(4), 1).unwrap();
        b.capture(StructureId::new(4), 1).unwrap();
        assert_eq!(hash_map(&a), hash_map(&b));
    }
}
