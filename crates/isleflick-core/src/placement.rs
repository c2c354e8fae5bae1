//! Placement legality.
//!
//! A released token may stay where it was dropped only if
//! 1. some terrain collider is within the probe radius,
//! 2. that terrain is not a base held by the opponent,
//! 3. the token's ability accepts the terrain, and
//! 4. no other placed token sits within the overlap radius.
//!
//! Overlaps are only detected. The validator never computes a new spot;
//! the player has to drag the token somewhere else.

use std::fmt;

use isle_map::{IsleMap, StructureId, Terrain, TerrainHit};
use serde::{Deserialize, Serialize};

use crate::arena::Arena;
use crate::config::MatchConfig;
use crate::entity::{EntityId, Token};

/// Why a placement was sent back to staging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlacementRejection {
    /// No terrain collider in range
    NoTerrain,
    /// The ability refuses this terrain
    WrongTerrain(Terrain),
    /// Dropped on the opponent's base
    OpponentBase(StructureId),
    /// Another placed token is too close
    Overlap(EntityId),
}

impl fmt::Display for PlacementRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoTerrain => write!(f, "no terrain in range"),
            Self::WrongTerrain(t) => write!(f, "cannot rest on {t}"),
            Self::OpponentBase(id) => write!(f, "base {id} belongs to the opponent"),
            Self::Overlap(id) => write!(f, "overlaps token {id}"),
        }
    }
}

/// Result of an overlap scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlapOutcome {
    /// Nothing in the way
    Clear,
    /// Not checked because the owner is still dragging
    Skipped,
    /// Still overlapping after every attempt
    Blocked {
        /// Closest offending token (lowest id on ties)
        by: EntityId,
        /// Scans made
        attempts: u32,
    },
}

/// Decides whether a token may rest where it is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementValidator {
    /// Terrain probe radius
    pub probe_radius: f32,
    /// Overlap scan radius
    pub overlap_radius: f32,
    /// Overlap scans before giving up
    pub overlap_attempts: u32,
}

impl PlacementValidator {
    /// Builds a validator from the match tunables.
    #[must_use]
    pub fn from_config(config: &MatchConfig) -> Self {
        Self {
            probe_radius: config.terrain_probe_radius,
            overlap_radius: config.overlap_radius,
            overlap_attempts: config.overlap_attempts.max(1),
        }
    }

    /// Terrain and ownership checks (rules 1 to 3).
    ///
    /// # Errors
    ///
    /// Returns the first rule the position breaks.
    pub fn check_terrain(
        &self,
        token: &Token,
        map: &IsleMap,
    ) -> Result<TerrainHit, PlacementRejection> {
        let hit = map
            .terrain_at(token.position(), self.probe_radius)
            .ok_or(PlacementRejection::NoTerrain)?;
        if hit.is_opponent_base(token.owner().as_u8()) {
            let id = hit.structure.ok_or(PlacementRejection::WrongTerrain(hit.terrain))?;
            return Err(PlacementRejection::OpponentBase(id));
        }
        if !token.kind().ability().validate_placement(Some(hit.terrain)) {
            return Err(PlacementRejection::WrongTerrain(hit.terrain));
        }
        Ok(hit)
    }

    /// Terrain legality as a plain yes/no.
    #[must_use]
    pub fn is_legal_placement(&self, token: &Token, map: &IsleMap) -> bool {
        self.check_terrain(token, map).is_ok()
    }

    /// Scans for other placed tokens within the overlap radius.
    ///
    /// Skipped while the token is being dragged. Positions do not change
    /// between scans, so a blocked scan stays blocked; the attempt count is
    /// reported for the logs.
    #[must_use]
    pub fn resolve_overlap(&self, token: &Token, arena: &Arena) -> OverlapOutcome {
        if token.is_dragging() {
            return OverlapOutcome::Skipped;
        }
        let mut attempts = 0;
        let mut blocker = None;
        while attempts < self.overlap_attempts {
            attempts += 1;
            blocker = self.closest_overlap(token, arena);
            if blocker.is_none() {
                return OverlapOutcome::Clear;
            }
        }
        match blocker {
            Some(by) => {
                tracing::debug!(token = %token.id(), %by, attempts, "overlap persists");
                OverlapOutcome::Blocked { by, attempts }
            }
            None => OverlapOutcome::Clear,
        }
    }

    fn closest_overlap(&self, token: &Token, arena: &Arena) -> Option<EntityId> {
        let here = token.position();
        arena
            .spatial()
            .query_radius(here, self.overlap_radius)
            .into_iter()
            .filter(|id| *id != token.id())
            .filter_map(|id| arena.get(id))
            .filter(|other| other.is_placed())
            .min_by(|a, b| {
                let da = a.position().distance_squared(here);
                let db = b.position().distance_squared(here);
                da.total_cmp(&db).then(a.id().cmp(&b.id()))
            })
            .map(Token::id)
    }

    /// Full check for a released token.
    ///
    /// # Errors
    ///
    /// Returns why the token has to go back to staging.
    pub fn validate(
        &self,
        token: &Token,
        map: &IsleMap,
        arena: &Arena,
    ) -> Result<TerrainHit, PlacementRejection> {
        let hit = self.check_terrain(token, map)?;
        match self.resolve_overlap(token, arena) {
            OverlapOutcome::Blocked { by, .. } => Err(PlacementRejection::Overlap(by)),
            OverlapOutcome::Clear | OverlapOutcome::Skipped => Ok(hit),
        }
    }
}

impl Default for PlacementValidator {
    fn default() -> Self {
        Self::from_config(&MatchConfig::default())
    }
}
