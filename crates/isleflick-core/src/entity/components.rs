//! Component structs held by tokens.
//!
//! Tokens are small enough that a plain struct of components beats any
//! archetype storage. Components are grouped by which system writes them:
//! physics writes `TransformState` and `PhysicsState`, the session writes
//! `TokenFlags`.

use bitflags::bitflags;
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Position and orientation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformState {
    /// World position
    pub position: Vec2,
    /// Orientation in radians (counter-clockwise from +X)
    pub rotation: f32,
}

impl TransformState {
    /// Creates a transform at a position.
    #[must_use]
    pub const fn new(position: Vec2, rotation: f32) -> Self {
        Self { position, rotation }
    }
}

/// Rigid-body motion state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsState {
    /// Linear velocity (units/second)
    pub velocity: Vec2,
    /// Angular velocity (radians/second)
    pub spin: f32,
    /// Collision mass, floored character weight
    pub mass: f32,
}

impl Default for PhysicsState {
    fn default() -> Self {
        Self {
            velocity: Vec2::ZERO,
            spin: 0.0,
            mass: 1.0,
        }
    }
}

impl PhysicsState {
    /// Creates a resting body of the given mass.
    #[must_use]
    pub const fn with_mass(mass: f32) -> Self {
        Self {
            velocity: Vec2::ZERO,
            spin: 0.0,
            mass,
        }
    }

    /// Linear speed.
    #[must_use]
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }
}

bitflags! {
    /// Token state flags.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct TokenFlags: u16 {
        /// In flight after a launch or a hit
        const THROWN   = 1 << 0;
        /// Resting on the map after a successful placement
        const PLACED   = 1 << 1;
        /// Pinned in place (Golem)
        const IMMOBILE = 1 << 2;
        /// Revealed and usable in combat
        const UNLOCKED = 1 << 3;
        /// Being moved by its owner during placement
        const DRAGGING = 1 << 4;
        /// Chosen by its owner for the next flick
        const SELECTED = 1 << 5;
    }
}
