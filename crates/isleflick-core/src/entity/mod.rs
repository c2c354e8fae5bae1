//! Token entities.
//!
//! This module provides the per-instance combat state of a match:
//! - [`EntityId`]: Unique identifier for tokens
//! - [`Token`]: One drafted character on (or waiting beside) the map
//!
//! # State machine
//!
//! ```text
//! unplaced ─drag─▶ dragging ─release(legal)─▶ placed ─select─▶ selected
//!     ▲                 │                                         │ aim
//!     └──release(bad)───┘            settled ◀─speed<ε── thrown ◀─┘ launch
//! ```
//!
//! # Example
//!
//! ```
//! use glam::Vec2;
//! use isleflick_core::character::CharacterKind;
//! use isleflick_core::entity::{EntityId, Token};
//! use isleflick_core::player::PlayerNumber;
//!
//! let token = Token::new(
//!     EntityId::new(0),
//!     PlayerNumber::One,
//!     CharacterKind::Knight,
//!     Vec2::new(-6.0, 0.0),
//!     1.5,
//! );
//! assert!(!token.is_placed());
//! assert_eq!(token.position(), Vec2::new(-6.0, 0.0));
//! ```

pub mod components;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::character::CharacterKind;
use crate::error::InvalidOperation;
use crate::player::PlayerNumber;

pub use components::{PhysicsState, TokenFlags, TransformState};

/// Slider position a fresh token starts with.
pub const DEFAULT_SLIDER_FORCE: f32 = 0.5;

/// Unique identifier for a token.
///
/// Ids are assigned monotonically by the arena and never reused within a
/// match, so ordering by id is a stable, deterministic iteration order.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates a new `EntityId` from a raw `u64` value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` value of this identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

impl From<EntityId> for u64 {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

/// One drafted character in a match.
///
/// # Invariants
///
/// - Only the owner, on the owner's turn, may move, aim or launch it
///   (see [`Token::ensure_controllable`])
/// - `THROWN` is set exactly while the token is moving under physics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    id: EntityId,
    owner: PlayerNumber,
    kind: CharacterKind,
    /// Where the token waits while unplaced
    staging: Vec2,
    /// Position and orientation
    pub transform: TransformState,
    /// Motion state
    pub physics: PhysicsState,
    /// State flags
    pub flags: TokenFlags,
    /// Aiming indicator position, if the owner has aimed
    pub aim_point: Option<Vec2>,
    /// Launch strength slider in `[0, 1]`
    pub slider_force: f32,
}

impl Token {
    /// Creates an unplaced token waiting at `staging`.
    #[must_use]
    pub fn new(
        id: EntityId,
        owner: PlayerNumber,
        kind: CharacterKind,
        staging: Vec2,
        mass: f32,
    ) -> Self {
        Self {
            id,
            owner,
            kind,
            staging,
            transform: TransformState::new(staging, 0.0),
            physics: PhysicsState::with_mass(mass),
            flags: TokenFlags::empty(),
            aim_point: None,
            slider_force: DEFAULT_SLIDER_FORCE,
        }
    }

    /// Returns the token's identifier.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Returns the owning player.
    #[must_use]
    pub const fn owner(&self) -> PlayerNumber {
        self.owner
    }

    /// Returns the character kind.
    #[must_use]
    pub const fn kind(&self) -> CharacterKind {
        self.kind
    }

    /// Current position.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.transform.position
    }

    /// Current velocity.
    #[must_use]
    pub const fn velocity(&self) -> Vec2 {
        self.physics.velocity
    }

    /// Staging spot.
    #[must_use]
    pub const fn staging(&self) -> Vec2 {
        self.staging
    }

    /// In flight.
    #[must_use]
    pub const fn is_thrown(&self) -> bool {
        self.flags.contains(TokenFlags::THROWN)
    }

    /// On the map.
    #[must_use]
    pub const fn is_placed(&self) -> bool {
        self.flags.contains(TokenFlags::PLACED)
    }

    /// Pinned in place.
    #[must_use]
    pub const fn is_immobile(&self) -> bool {
        self.flags.contains(TokenFlags::IMMOBILE)
    }

    /// Revealed for combat.
    #[must_use]
    pub const fn is_unlocked(&self) -> bool {
        self.flags.contains(TokenFlags::UNLOCKED)
    }

    /// Being dragged by its owner.
    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        self.flags.contains(TokenFlags::DRAGGING)
    }

    /// Selected for the next flick.
    #[must_use]
    pub const fn is_selected(&self) -> bool {
        self.flags.contains(TokenFlags::SELECTED)
    }

    /// Non-zero velocity.
    #[must_use]
    pub fn is_moving(&self) -> bool {
        self.physics.velocity != Vec2::ZERO
    }

    /// Checks the owner-on-turn invariant.
    ///
    /// # Errors
    ///
    /// [`InvalidOperation::WrongTurn`] when `actor` is not `current`,
    /// [`InvalidOperation::NotOwner`] when `actor` does not own the token.
    pub fn ensure_controllable(
        &self,
        actor: PlayerNumber,
        current: PlayerNumber,
    ) -> Result<(), InvalidOperation> {
        if actor != current {
            return Err(InvalidOperation::WrongTurn { actor, current });
        }
        if actor != self.owner {
            return Err(InvalidOperation::NotOwner {
                token: self.id,
                owner: self.owner,
                actor,
            });
        }
        Ok(())
    }

    /// Moves the token while dragging.
    pub fn drag_to(&mut self, position: Vec2) {
        self.flags.insert(TokenFlags::DRAGGING);
        self.transform.position = position;
    }

    /// Sends the token back to its staging spot.
    pub fn reset_to_staging(&mut self) {
        self.flags.remove(TokenFlags::DRAGGING | TokenFlags::PLACED);
        self.transform = TransformState::new(self.staging, 0.0);
        self.physics.velocity = Vec2::ZERO;
        self.physics.spin = 0.0;
    }

    /// Applies a launch impulse.
    ///
    /// The direction runs from the aiming indicator to the token, so the
    /// owner pulls back to shoot forward. `force` is the already-scaled
    /// throw force (see
    /// [`CharacterDefinition::throw_force`](crate::character::CharacterDefinition::throw_force)).
    ///
    /// Returns the velocity after the impulse.
    ///
    /// # Errors
    ///
    /// - [`InvalidOperation::AlreadyThrown`] while in flight
    /// - [`InvalidOperation::Immobile`] for pinned tokens
    /// - [`InvalidOperation::NoAim`] without an aim point, or with the aim
    ///   point on top of the token
    pub fn launch(&mut self, force: f32) -> Result<Vec2, InvalidOperation> {
        if self.is_thrown() {
            return Err(InvalidOperation::AlreadyThrown(self.id));
        }
        if self.is_immobile() {
            return Err(InvalidOperation::Immobile(self.id));
        }
        let aim = self.aim_point.ok_or(InvalidOperation::NoAim(self.id))?;
        let direction = (self.transform.position - aim).normalize_or_zero();
        if direction == Vec2::ZERO {
            return Err(InvalidOperation::NoAim(self.id));
        }

        self.physics.velocity += direction * force;
        self.flags.insert(TokenFlags::THROWN);
        self.flags.remove(TokenFlags::SELECTED);
        self.aim_point = None;
        Ok(self.physics.velocity)
    }

    /// Brings the token to rest and makes it launchable again.
    pub fn settle(&mut self) {
        self.physics.velocity = Vec2::ZERO;
        self.physics.spin = 0.0;
        self.transform.rotation = 0.0;
        self.flags.remove(TokenFlags::THROWN);
    }
}
