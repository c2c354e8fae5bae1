//! Match configuration.
//!
//! `MatchConfig` carries every tunable the rules core reads. It is loaded
//! once (usually from JSON) before the session is built and never changes
//! during a match. Missing JSON fields fall back to the stock values.
//!
//! # Example
//!
//! ```
//! use isleflick_core::config::MatchConfig;
//!
//! let config = MatchConfig::from_json(r#"{ "picks_per_player": 3 }"#).unwrap();
//! assert_eq!(config.picks_per_player, 3);
//! assert!((config.settle_speed - 0.1).abs() < f32::EPSILON);
//! ```

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::RulesError;
use crate::player::PlayerNumber;

/// Fixed timestep for physics integration (1/60 second).
pub const FIXED_DT: f32 = 1.0 / 60.0;

/// Tunables for one match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Physics step length in seconds
    pub fixed_dt: f32,
    /// Fraction of velocity lost per second
    pub linear_damping: f32,
    /// Fraction of spin lost per second
    pub angular_damping: f32,
    /// Bounciness of token-token collisions, in `[0, 1]`
    pub restitution: f32,
    /// Speed under which a moving token counts as settled
    pub settle_speed: f32,
    /// Collider radius of a token
    pub token_radius: f32,
    /// Probe radius for terrain queries
    pub terrain_probe_radius: f32,
    /// Scan radius for placement overlap checks
    pub overlap_radius: f32,
    /// Overlap scans before a placement is rejected
    pub overlap_attempts: u32,
    /// Floor applied to character weight in the throw formula
    pub min_weight: f32,
    /// Candidates player 2 removes before selection starts
    pub eliminations: usize,
    /// Characters each player drafts
    pub picks_per_player: usize,
    /// Coins each player starts with
    pub starting_coins: i64,
    /// Seconds between a flick settling and the turn passing
    pub turn_handover_delay: f32,
    /// Off-map waiting spot for unplaced tokens, by seat
    pub staging: [Vec2; 2],
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            fixed_dt: FIXED_DT,
            linear_damping: 0.5,
            angular_damping: 3.0,
            restitution: 0.8,
            settle_speed: 0.1,
            token_radius: 0.2,
            terrain_probe_radius: 0.1,
            overlap_radius: 0.2,
            overlap_attempts: 10,
            min_weight: 0.1,
            eliminations: 1,
            picks_per_player: 4,
            starting_coins: 0,
            turn_handover_delay: 0.5,
            staging: [Vec2::new(-6.0, 0.0), Vec2::new(6.0, 0.0)],
        }
    }
}

impl MatchConfig {
    /// Parses a JSON document and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError::InvalidConfig`] for malformed JSON or values
    /// that fail [`MatchConfig::validate`].
    pub fn from_json(json: &str) -> Result<Self, RulesError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| RulesError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks ranges.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> Result<(), RulesError> {
        let positive = [
            ("fixed_dt", self.fixed_dt),
            ("settle_speed", self.settle_speed),
            ("token_radius", self.token_radius),
            ("min_weight", self.min_weight),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(RulesError::InvalidConfig(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        let non_negative = [
            ("linear_damping", self.linear_damping),
            ("angular_damping", self.angular_damping),
            ("terrain_probe_radius", self.terrain_probe_radius),
            ("overlap_radius", self.overlap_radius),
            ("turn_handover_delay", self.turn_handover_delay),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(RulesError::InvalidConfig(format!(
                    "{name} must be non-negative, got {value}"
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.restitution) {
            return Err(RulesError::InvalidConfig(format!(
                "restitution must be in [0, 1], got {}",
                self.restitution
            )));
        }
        if self.overlap_attempts == 0 {
            return Err(RulesError::InvalidConfig(
                "overlap_attempts must be at least 1".into(),
            ));
        }
        if self.picks_per_player == 0 {
            return Err(RulesError::InvalidConfig(
                "picks_per_player must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Staging spot for a seat.
    #[must_use]
    pub fn staging_for(&self, player: PlayerNumber) -> Vec2 {
        self.staging[player.index()]
    }

    /// Whole ticks covering `seconds`, at least one.
    ///
    /// A small tolerance keeps exact multiples of `fixed_dt` from rounding up.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn ticks_for(&self, seconds: f32) -> u64 {
        ((seconds / self.fixed_dt - 1e-3).ceil().max(0.0) as u64).max(1)
    }
}
