//! Token storage for one match.
//!
//! The arena owns every token still in play. It provides:
//! - Storage with deterministic iteration order (`BTreeMap`)
//! - A spatial index for overlap and collision queries
//! - Token lifecycle (spawn/despawn)
//! - The physics tick counter
//!
//! # Spatial Index Synchronization
//!
//! The spatial index is not updated when a token is moved through
//! [`Arena::get_mut`]. Call [`Arena::update_spatial`] (or
//! [`Arena::sync_spatial`] after a batch) before querying.
//!
//! # Example
//!
//! ```
//! use glam::Vec2;
//! use isleflick_core::arena::Arena;
//! use isleflick_core::character::CharacterKind;
//! use isleflick_core::player::PlayerNumber;
//!
//! let mut arena = Arena::new();
//! let a = arena.spawn(PlayerNumber::One, CharacterKind::Knight, Vec2::ZERO, 1.5);
//! let b = arena.spawn(PlayerNumber::Two, CharacterKind::Rogue, Vec2::new(3.0, 0.0), 0.6);
//!
//! let ids: Vec<_> = arena.token_ids_sorted().collect();
//! assert_eq!(ids, vec![a, b]);
//! assert_eq!(arena.spatial().query_radius(Vec2::ZERO, 1.0), vec![a]);
//! ```

use std::collections::{BTreeMap, HashMap};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::character::CharacterKind;
use crate::entity::{EntityId, Token};
use crate::error::InvalidOperation;
use crate::player::PlayerNumber;

// =============================================================================
// Spatial Index
// =============================================================================

/// Token positions for proximity queries.
///
/// Queries scan every entry; a match never holds more than a handful of
/// tokens. Results are sorted by id so callers iterate deterministically.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpatialIndex {
    positions: HashMap<EntityId, Vec2>,
}

impl SpatialIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or updates a position.
    pub fn insert(&mut self, id: EntityId, pos: Vec2) {
        self.positions.insert(id, pos);
    }

    /// Removes an entry.
    pub fn remove(&mut self, id: EntityId) {
        self.positions.remove(&id);
    }

    /// Position of `id`, if indexed.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<Vec2> {
        self.positions.get(&id).copied()
    }

    /// Ids within `radius` of `center` (inclusive), sorted by id.
    #[must_use]
    pub fn query_radius(&self, center: Vec2, radius: f32) -> Vec<EntityId> {
        let radius_sq = radius * radius;
        let mut results: Vec<EntityId> = self
            .positions
            .iter()
            .filter(|(_, pos)| center.distance_squared(**pos) <= radius_sq)
            .map(|(id, _)| *id)
            .collect();
        results.sort();
        results
    }

    /// Number of indexed tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns true if nothing is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

// =============================================================================
// Arena
// =============================================================================

/// Container for the tokens of one match.
///
/// Ids are assigned monotonically from zero and never reused, so iteration
/// order is spawn order on every platform.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Arena {
    next_id: u64,
    tokens: BTreeMap<EntityId, Token>,
    spatial: SpatialIndex,
    tick: u64,
}

impl Arena {
    /// Creates an empty arena at tick 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an unplaced token waiting at `staging`.
    pub fn spawn(
        &mut self,
        owner: PlayerNumber,
        kind: CharacterKind,
        staging: Vec2,
        mass: f32,
    ) -> EntityId {
        let id = EntityId::new(self.next_id);
        self.next_id += 1;
        self.spatial.insert(id, staging);
        self.tokens
            .insert(id, Token::new(id, owner, kind, staging, mass));
        id
    }

    /// Removes a token, returning it if it existed.
    pub fn despawn(&mut self, id: EntityId) -> Option<Token> {
        self.spatial.remove(id);
        self.tokens.remove(&id)
    }

    /// Token by id.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Token> {
        self.tokens.get(&id)
    }

    /// Mutable token by id. Remember to [`update_spatial`](Self::update_spatial).
    #[must_use]
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Token> {
        self.tokens.get_mut(&id)
    }

    /// Token by id, or [`InvalidOperation::UnknownToken`].
    ///
    /// # Errors
    ///
    /// Fails when `id` is not in the arena.
    pub fn require(&self, id: EntityId) -> Result<&Token, InvalidOperation> {
        self.get(id).ok_or(InvalidOperation::UnknownToken(id))
    }

    /// Mutable variant of [`require`](Self::require).
    ///
    /// # Errors
    ///
    /// Fails when `id` is not in the arena.
    pub fn require_mut(&mut self, id: EntityId) -> Result<&mut Token, InvalidOperation> {
        self.tokens
            .get_mut(&id)
            .ok_or(InvalidOperation::UnknownToken(id))
    }

    /// Whether `id` is in the arena.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.tokens.contains_key(&id)
    }

    /// Token ids in spawn order.
    pub fn token_ids_sorted(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.tokens.keys().copied()
    }

    /// Tokens in spawn order.
    pub fn tokens_sorted(&self) -> impl Iterator<Item = &Token> + '_ {
        self.tokens.values()
    }

    /// Mutable tokens in spawn order.
    pub fn tokens_sorted_mut(&mut self) -> impl Iterator<Item = &mut Token> + '_ {
        self.tokens.values_mut()
    }

    /// Tokens owned by `owner`, in spawn order.
    pub fn tokens_of(&self, owner: PlayerNumber) -> impl Iterator<Item = &Token> + '_ {
        self.tokens.values().filter(move |t| t.owner() == owner)
    }

    /// Number of tokens.
    #[must_use]
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    /// Returns true if the arena holds no tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Any token still moving.
    #[must_use]
    pub fn any_moving(&self) -> bool {
        self.tokens.values().any(|t| t.is_thrown() || t.is_moving())
    }

    /// The spatial index.
    #[must_use]
    pub fn spatial(&self) -> &SpatialIndex {
        &self.spatial
    }

    /// Re-indexes one token after a move.
    pub fn update_spatial(&mut self, id: EntityId) {
        if let Some(token) = self.tokens.get(&id) {
            self.spatial.insert(id, token.position());
        }
    }

    /// Re-indexes every token.
    pub fn sync_spatial(&mut self) {
        for (id, token) in &self.tokens {
            self.spatial.insert(*id, token.position());
        }
    }

    /// Current physics tick.
    #[must_use]
    pub const fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Advances the tick counter.
    pub fn advance_tick(&mut self) {
        self.tick += 1;
    }
}
