//! Character definitions and the roster.
//!
//! A [`CharacterDefinition`] is authored content: name, cost, movement stats
//! and reward values. Definitions are read-only at runtime. The
//! [`Roster`] holds exactly one definition per [`CharacterKind`] in play and
//! is loaded once at startup.
//!
//! # Example
//!
//! ```
//! use isleflick_core::character::{CharacterKind, Roster};
//!
//! let roster = Roster::standard();
//! let golem = roster.get(CharacterKind::Golem).unwrap();
//! assert!(golem.weight > roster.get(CharacterKind::Rogue).unwrap().weight);
//! assert_eq!(roster.draftable().len(), 10);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ability::Ability;
use crate::error::RulesError;

/// Character type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CharacterKind {
    /// Water-bound; places only on water
    Mermaid,
    /// Armoured melee
    Knight,
    /// Heavy; becomes immobile once placed
    Golem,
    /// Sturdy and greedy
    Dwarf,
    /// Fast flyer
    Gryphon,
    /// Brings coins on arrival
    King,
    /// Vault specialist
    Thief,
    /// Light and quick
    Rogue,
    /// Rebounds off the arena edge
    Satyr,
    /// Brings coins on arrival
    Enchantress,
    /// Generic garrison unit; places only on bases
    Default,
}

impl CharacterKind {
    /// Every kind, in authoring order.
    pub const ALL: [Self; 11] = [
        Self::Mermaid,
        Self::Knight,
        Self::Golem,
        Self::Dwarf,
        Self::Gryphon,
        Self::King,
        Self::Thief,
        Self::Rogue,
        Self::Satyr,
        Self::Enchantress,
        Self::Default,
    ];

    /// The ability variant this kind uses.
    #[must_use]
    pub const fn ability(self) -> Ability {
        Ability::for_kind(self)
    }

    /// `Default` never enters the draft pool.
    #[must_use]
    pub const fn is_draftable(self) -> bool {
        !matches!(self, Self::Default)
    }
}

impl fmt::Display for CharacterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Mermaid => "Mermaid",
            Self::Knight => "Knight",
            Self::Golem => "Golem",
            Self::Dwarf => "Dwarf",
            Self::Gryphon => "Gryphon",
            Self::King => "King",
            Self::Thief => "Thief",
            Self::Rogue => "Rogue",
            Self::Satyr => "Satyr",
            Self::Enchantress => "Enchantress",
            Self::Default => "Default",
        };
        f.write_str(name)
    }
}

/// Static per-character attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterDefinition {
    /// Display name
    pub name: String,
    /// Character type; selects the ability
    pub kind: CharacterKind,
    /// Draft cost
    pub cost: u32,
    /// Throw speed multiplier
    pub speed: f32,
    /// Mass; divides throw force and weighs collisions
    pub weight: f32,
    /// Coins granted when the token is placed
    #[serde(default)]
    pub bonus_coins: i64,
    /// Coins granted for capturing a vault
    #[serde(default = "default_vault_coins")]
    pub vault_coins: i64,
    /// Glory granted for capturing a base
    #[serde(default = "default_base_glory")]
    pub base_glory: i64,
}

fn default_vault_coins() -> i64 {
    1
}

fn default_base_glory() -> i64 {
    1
}

impl CharacterDefinition {
    /// Creates a definition with stock reward values.
    #[must_use]
    pub fn new(kind: CharacterKind, cost: u32, speed: f32, weight: f32) -> Self {
        Self {
            name: kind.to_string(),
            kind,
            cost,
            speed,
            weight,
            bonus_coins: 0,
            vault_coins: default_vault_coins(),
            base_glory: default_base_glory(),
        }
    }

    /// Sets the placement bonus (builder pattern).
    #[must_use]
    pub fn with_bonus_coins(mut self, coins: i64) -> Self {
        self.bonus_coins = coins;
        self
    }

    /// Sets capture rewards (builder pattern).
    #[must_use]
    pub fn with_capture_rewards(mut self, vault_coins: i64, base_glory: i64) -> Self {
        self.vault_coins = vault_coins;
        self.base_glory = base_glory;
        self
    }

    /// Ability of this character.
    #[must_use]
    pub const fn ability(&self) -> Ability {
        self.kind.ability()
    }

    /// Throw force for a slider position: `slider * speed / max(weight, min_weight)`.
    #[must_use]
    pub fn throw_force(&self, slider: f32, min_weight: f32) -> f32 {
        slider * self.speed / self.weight.max(min_weight)
    }
}

/// The authored set of characters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    definitions: Vec<CharacterDefinition>,
}

impl Roster {
    /// Builds a roster and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError::InvalidConfig`] for duplicate kinds or
    /// non-positive speed/weight.
    pub fn new(definitions: Vec<CharacterDefinition>) -> Result<Self, RulesError> {
        let roster = Self { definitions };
        roster.validate()?;
        Ok(roster)
    }

    /// The stock roster: the ten draftable characters plus `Default`.
    #[must_use]
    pub fn standard() -> Self {
        use CharacterKind as K;
        Self {
            definitions: vec![
                CharacterDefinition::new(K::Mermaid, 3, 1.2, 1.0),
                CharacterDefinition::new(K::Knight, 4, 1.0, 1.5).with_capture_rewards(1, 2),
                CharacterDefinition::new(K::Golem, 5, 0.6, 3.0),
                CharacterDefinition::new(K::Dwarf, 3, 0.9, 1.8).with_capture_rewards(2, 1),
                CharacterDefinition::new(K::Gryphon, 4, 1.5, 0.8),
                CharacterDefinition::new(K::King, 6, 0.8, 2.0)
                    .with_bonus_coins(2)
                    .with_capture_rewards(1, 3),
                CharacterDefinition::new(K::Thief, 2, 1.3, 0.7).with_capture_rewards(3, 1),
                CharacterDefinition::new(K::Rogue, 2, 1.4, 0.6),
                CharacterDefinition::new(K::Satyr, 3, 1.2, 1.0),
                CharacterDefinition::new(K::Enchantress, 4, 1.1, 0.9).with_bonus_coins(1),
                CharacterDefinition::new(K::Default, 0, 1.0, 1.0),
            ],
        }
    }

    /// Parses a JSON array of definitions.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError::InvalidConfig`] for malformed JSON or a roster
    /// that fails validation.
    pub fn from_json(json: &str) -> Result<Self, RulesError> {
        let definitions: Vec<CharacterDefinition> =
            serde_json::from_str(json).map_err(|e| RulesError::InvalidConfig(e.to_string()))?;
        Self::new(definitions)
    }

    /// Checks uniqueness and stat ranges.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError::InvalidConfig`] describing the first problem.
    pub fn validate(&self) -> Result<(), RulesError> {
        for (i, def) in self.definitions.iter().enumerate() {
            if self.definitions[..i].iter().any(|d| d.kind == def.kind) {
                return Err(RulesError::InvalidConfig(format!(
                    "duplicate definition for {}",
                    def.kind
                )));
            }
            if !(def.speed.is_finite() && def.speed > 0.0) {
                return Err(RulesError::InvalidConfig(format!(
                    "{} speed must be positive",
                    def.kind
                )));
            }
            if !(def.weight.is_finite() && def.weight > 0.0) {
                return Err(RulesError::InvalidConfig(format!(
                    "{} weight must be positive",
                    def.kind
                )));
            }
        }
        Ok(())
    }

    /// Definition for a kind, if authored.
    #[must_use]
    pub fn get(&self, kind: CharacterKind) -> Option<&CharacterDefinition> {
        self.definitions.iter().find(|d| d.kind == kind)
    }

    /// Definition for a kind.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError::ConfigurationMissing`] if the kind is not authored.
    pub fn require(&self, kind: CharacterKind) -> Result<&CharacterDefinition, RulesError> {
        self.get(kind)
            .ok_or_else(|| RulesError::ConfigurationMissing(format!("character {kind}")))
    }

    /// Draftable kinds in authoring order.
    #[must_use]
    pub fn draftable(&self) -> Vec<CharacterKind> {
        self.definitions
            .iter()
            .map(|d| d.kind)
            .filter(|k| k.is_draftable())
            .collect()
    }

    /// All definitions.
    #[must_use]
    pub fn definitions(&self) -> &[CharacterDefinition] {
        &self.definitions
    }

    /// Number of definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Returns true if nothing is authored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl Default for Roster {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_roster_covers_every_kind() {
        let roster = Roster::standard();
        assert!(roster.validate().is_ok());
        for kind in CharacterKind::ALL {
            assert!(roster.get(kind).is_some(), "{kind} missing");
        }
        assert_eq!(roster.len(), 11);
    }

    #[test]
    fn default_is_not_draftable() {
        let pool = Roster::standard().draftable();
        assert_eq!(pool.len(), 10);
        assert!(!pool.contains(&CharacterKind::Default));
    }

    #[test]
    fn duplicates_rejected() {
        let defs = vec![
            CharacterDefinition::new(CharacterKind::Knight, 1, 1.0, 1.0),
            CharacterDefinition::new(CharacterKind::Knight, 2, 1.0, 1.0),
        ];
        assert!(matches!(Roster::new(defs), Err(RulesError::InvalidConfig(_))));
    }

    #[test]
    fn zero_weight_rejected() {
        let defs = vec![CharacterDefinition::new(CharacterKind::Rogue, 1, 1.0, 0.0)];
        let err = Roster::new(defs).unwrap_err();
        assert!(err.to_string().contains("weight"));
    }

    #[test]
    fn require_reports_missing_content() {
        let roster = Roster::new(vec![CharacterDefinition::new(
            CharacterKind::Knight,
            1,
            1.0,
            1.0,
        )])
        .unwrap();
        let err = roster.require(CharacterKind::Satyr).unwrap_err();
        assert_eq!(
            err,
            RulesError::ConfigurationMissing("character Satyr".into())
        );
    }

    #[test]
    fn throw_force_formula() {
        let def = CharacterDefinition::new(CharacterKind::Knight, 1, 2.0, 4.0);
        assert!((def.throw_force(0.5, 0.1) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn throw_force_floors_weight() {
        let mut def = CharacterDefinition::new(CharacterKind::Rogue, 1, 1.0, 1.0);
        def.weight = 0.01;
        assert!((def.throw_force(1.0, 0.1) - 10.0).abs() < 1e-4);
    }

    #[test]
    fn json_roundtrip_with_defaults() {
        let json = r#"[{ "name": "Tess", "kind": "Thief", "cost": 2, "speed": 1.3, "weight": 0.7 }]"#;
        let roster = Roster::from_json(json).unwrap();
        let thief = roster.get(CharacterKind::Thief).unwrap();
        assert_eq!(thief.name, "Tess");
        assert_eq!(thief.vault_coins, 1);
        assert_eq!(thief.bonus_coins, 0);
    }
}
