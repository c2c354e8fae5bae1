//! Per-character rule hooks.
//!
//! Each [`CharacterKind`] maps to one [`Ability`] variant. The variants only
//! differ where a character bends the default rules:
//!
//! | variant | characters | deviation |
//! |---|---|---|
//! | `Standard` | most | none |
//! | `Aquatic` | Mermaid | places on water only |
//! | `Anchored` | Golem | immobile once placed |
//! | `Rebound` | Satyr | bounces off the arena edge instead of leaving |
//! | `Garrison` | Default | places on bases only |

use glam::Vec2;
use isle_map::{Bounds, Structure, StructureKind, Terrain};
use serde::{Deserialize, Serialize};

use crate::character::{CharacterDefinition, CharacterKind};
use crate::entity::{Token, TokenFlags};
use crate::event::GameEvent;

/// Rule variant attached to a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ability {
    /// Default rules
    Standard,
    /// Water only
    Aquatic,
    /// Pinned after placement
    Anchored,
    /// Reflects off the arena boundary
    Rebound,
    /// Bases only
    Garrison,
}

/// What [`Ability::activate`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Activation {
    /// Coins granted to the owner
    pub bonus_coins: i64,
    /// The token was pinned
    pub became_immobile: bool,
}

impl Activation {
    /// Reward events for this activation.
    pub fn events(&self, token: &Token) -> impl Iterator<Item = GameEvent> {
        (self.bonus_coins != 0)
            .then_some(GameEvent::CoinsAwarded {
                player: token.owner(),
                amount: self.bonus_coins,
            })
            .into_iter()
    }
}

impl Ability {
    /// Ability used by `kind`.
    #[must_use]
    pub const fn for_kind(kind: CharacterKind) -> Self {
        match kind {
            CharacterKind::Mermaid => Self::Aquatic,
            CharacterKind::Golem => Self::Anchored,
            CharacterKind::Satyr => Self::Rebound,
            CharacterKind::Default => Self::Garrison,
            CharacterKind::Knight
            | CharacterKind::Dwarf
            | CharacterKind::Gryphon
            | CharacterKind::King
            | CharacterKind::Thief
            | CharacterKind::Rogue
            | CharacterKind::Enchantress => Self::Standard,
        }
    }

    /// Fires once when a placement is confirmed.
    ///
    /// Grants the configured bonus coins and pins `Anchored` tokens. The pin
    /// persists across phases until released explicitly.
    pub fn activate(self, token: &mut Token, definition: &CharacterDefinition) -> Activation {
        let became_immobile = matches!(self, Self::Anchored) && !token.is_immobile();
        if matches!(self, Self::Anchored) {
            token.flags.insert(TokenFlags::IMMOBILE);
        }
        tracing::debug!(
            token = %token.id(),
            kind = %token.kind(),
            bonus = definition.bonus_coins,
            became_immobile,
            "ability activated"
        );
        Activation {
            bonus_coins: definition.bonus_coins,
            became_immobile,
        }
    }

    /// Whether a token may rest on `terrain`.
    ///
    /// `None` means no collider was found in range, which is never legal.
    #[must_use]
    pub const fn validate_placement(self, terrain: Option<Terrain>) -> bool {
        match (self, terrain) {
            (_, None) => false,
            (Self::Aquatic, Some(t)) => matches!(t, Terrain::Water),
            (Self::Garrison, Some(t)) => matches!(t, Terrain::Base),
            (Self::Standard | Self::Anchored | Self::Rebound, Some(t)) => {
                matches!(t, Terrain::Land | Terrain::Base)
            }
        }
    }

    /// Reward for resting on a vault. `None` when the token's owner already
    /// holds it.
    #[must_use]
    pub fn on_vault_capture(
        self,
        token: &Token,
        definition: &CharacterDefinition,
        vault: &Structure,
    ) -> Option<GameEvent> {
        if vault.kind != StructureKind::Vault || !vault.is_capturable_by(token.owner().as_u8()) {
            return None;
        }
        (definition.vault_coins != 0).then_some(GameEvent::CoinsAwarded {
            player: token.owner(),
            amount: definition.vault_coins,
        })
    }

    /// Reward for resting on a base. `None` when the token's owner already
    /// holds it.
    #[must_use]
    pub fn on_base_capture(
        self,
        token: &Token,
        definition: &CharacterDefinition,
        base: &Structure,
    ) -> Option<GameEvent> {
        if base.kind != StructureKind::Base || !base.is_capturable_by(token.owner().as_u8()) {
            return None;
        }
        (definition.base_glory != 0).then_some(GameEvent::GloryAwarded {
            player: token.owner(),
            amount: definition.base_glory,
        })
    }

    /// Tokens of this ability bounce off the arena edge.
    #[must_use]
    pub const fn reflects_at_boundary(self) -> bool {
        matches!(self, Self::Rebound)
    }

    /// Keeps a `Rebound` token inside `arena`.
    ///
    /// Each axis is checked on its own: at or past an edge while still
    /// moving outwards, that velocity component is negated and the position
    /// clamped to the edge. A corner reflects both components. Other
    /// abilities are left untouched.
    ///
    /// Returns `true` if any axis reflected.
    pub fn handle_boundary_reflection(self, token: &mut Token, arena: Bounds) -> bool {
        if !self.reflects_at_boundary() {
            return false;
        }
        let mut position = token.transform.position;
        let mut velocity = token.physics.velocity;
        let mut reflected = false;

        for axis in 0..2 {
            let (lo, hi) = (arena.min[axis], arena.max[axis]);
            let outward = (position[axis] >= hi && velocity[axis] > 0.0)
                || (position[axis] <= lo && velocity[axis] < 0.0);
            if outward {
                velocity[axis] = -velocity[axis];
                reflected = true;
            }
            position[axis] = position[axis].clamp(lo, hi);
        }

        if reflected {
            tracing::debug!(token = %token.id(), ?velocity, "boundary reflection");
        }
        token.transform.position = position;
        token.physics.velocity = velocity;
        reflected
    }
}

/// Convenience for the centred arena of `size`.
#[must_use]
pub fn centered_arena(size: Vec2) -> Bounds {
    Bounds::new(size.x, size.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityId;
    use crate::player::PlayerNumber;
    use isle_map::{Shape, StructureId};

    fn token(kind: CharacterKind, owner: PlayerNumber) -> Token {
        Token::new(EntityId::new(1), owner, kind, Vec2::ZERO, 1.0)
    }

    mod placement_rule_tests {
        use super::*;

        const ALL_TERRAIN: [Option<Terrain>; 4] = [
            None,
            Some(Terrain::Water),
            Some(Terrain::Land),
            Some(Terrain::Base),
        ];

        #[test]
        fn mermaid_needs_water() {
            for terrain in ALL_TERRAIN {
                assert_eq!(
                    Ability::Aquatic.validate_placement(terrain),
                    terrain == Some(Terrain::Water),
                    "{terrain:?}"
                );
            }
        }

        #[test]
        fn others_need_ground() {
            for kind in CharacterKind::ALL {
                let ability = kind.ability();
                if matches!(ability, Ability::Aquatic | Ability::Garrison) {
                    continue;
                }
                for terrain in ALL_TERRAIN {
                    assert_eq!(
                        ability.validate_placement(terrain),
                        matches!(terrain, Some(Terrain::Land | Terrain::Base)),
                        "{kind} on {terrain:?}"
                    );
                }
            }
        }

        #[test]
        fn garrison_needs_base() {
            assert!(Ability::Garrison.validate_placement(Some(Terrain::Base)));
            assert!(!Ability::Garrison.validate_placement(Some(Terrain::Land)));
            assert!(!Ability::Garrison.validate_placement(Some(Terrain::Water)));
        }
    }

    mod activation_tests {
        use super::*;

        #[test]
        fn golem_is_pinned() {
            let def = CharacterDefinition::new(CharacterKind::Golem, 5, 0.6, 3.0);
            let mut golem = token(CharacterKind::Golem, PlayerNumber::One);

            let activation = Ability::Anchored.activate(&mut golem, &def);

            assert!(activation.became_immobile);
            assert!(golem.is_immobile());
            assert_eq!(activation.events(&golem).count(), 0);
        }

        #[test]
        fn bonus_coins_reported() {
            let def = CharacterDefinition::new(CharacterKind::King, 6, 0.8, 2.0).with_bonus_coins(2);
            let mut king = token(CharacterKind::King, PlayerNumber::Two);

            let activation = Ability::Standard.activate(&mut king, &def);
            let events: Vec<_> = activation.events(&king).collect();

            assert!(!king.is_immobile());
            assert_eq!(
                events,
                vec![GameEvent::CoinsAwarded {
                    player: PlayerNumber::Two,
                    amount: 2
                }]
            );
        }
    }

    mod capture_tests {
        use super::*;

        fn structure(kind: StructureKind, owner: u8) -> Structure {
            Structure::new(
                StructureId::new(1),
                kind,
                owner,
                Shape::circle(Vec2::ZERO, 0.5),
            )
        }

        #[test]
        fn enemy_base_awards_glory_once() {
            let def = CharacterDefinition::new(CharacterKind::Knight, 4, 1.0, 1.5);
            let knight = token(CharacterKind::Knight, PlayerNumber::One);
            let base = structure(StructureKind::Base, 2);

            let events: Vec<_> = Ability::Standard
                .on_base_capture(&knight, &def, &base)
                .into_iter()
                .collect();

            assert_eq!(
                events,
                vec![GameEvent::GloryAwarded {
                    player: PlayerNumber::One,
                    amount: 1
                }]
            );
        }

        #[test]
        fn own_structures_award_nothing() {
            let def = CharacterDefinition::new(CharacterKind::Thief, 2, 1.3, 0.7);
            let thief = token(CharacterKind::Thief, PlayerNumber::Two);

            assert!(Ability::Standard
                .on_base_capture(&thief, &def, &structure(StructureKind::Base, 2))
                .is_none());
            assert!(Ability::Standard
                .on_vault_capture(&thief, &def, &structure(StructureKind::Vault, 2))
                .is_none());
        }

        #[test]
        fn vault_hook_ignores_bases() {
            let def = CharacterDefinition::new(CharacterKind::Thief, 2, 1.3, 0.7);
            let thief = token(CharacterKind::Thief, PlayerNumber::One);

            assert!(Ability::Standard
                .on_vault_capture(&thief, &def, &structure(StructureKind::Base, 2))
                .is_none());
            assert!(Ability::Standard
                .on_vault_capture(&thief, &def, &structure(StructureKind::Vault, 0))
                .is_some());
        }
    }

    mod reflection_tests {
        use super::*;

        fn satyr_at(position: Vec2, velocity: Vec2) -> Token {
            let mut satyr = token(CharacterKind::Satyr, PlayerNumber::One);
            satyr.transform.position = position;
            satyr.physics.velocity = velocity;
            satyr
        }

        #[test]
        fn x_edge_flips_x_only() {
            let arena = centered_arena(Vec2::new(10.0, 6.0));
            let mut satyr = satyr_at(Vec2::new(5.3, 1.0), Vec2::new(4.0, 0.5));

            assert!(Ability::Rebound.handle_boundary_reflection(&mut satyr, arena));

            assert!((satyr.position().x - 5.0).abs() < f32::EPSILON);
            assert!((satyr.position().y - 1.0).abs() < f32::EPSILON);
            assert!((satyr.velocity().x + 4.0).abs() < f32::EPSILON);
            assert!((satyr.velocity().y - 0.5).abs() < f32::EPSILON);
        }

        #[test]
        fn corner_flips_both() {
            let arena = centered_arena(Vec2::new(10.0, 6.0));
            let mut satyr = satyr_at(Vec2::new(-5.5, 3.2), Vec2::new(-1.0, 2.0));

            assert!(Ability::Rebound.handle_boundary_reflection(&mut satyr, arena));

            assert_eq!(satyr.position(), Vec2::new(-5.0, 3.0));
            assert_eq!(satyr.velocity(), Vec2::new(1.0, -2.0));
        }

        #[test]
        fn inward_motion_not_reflected_twice() {
            let arena = centered_arena(Vec2::new(10.0, 6.0));
            let mut satyr = satyr_at(Vec2::new(5.0, 0.0), Vec2::new(-3.0, 0.0));

            assert!(!Ability::Rebound.handle_boundary_reflection(&mut satyr, arena));
            assert_eq!(satyr.velocity(), Vec2::new(-3.0, 0.0));
        }

        #[test]
        fn other_abilities_ignore_boundary() {
            let arena = centered_arena(Vec2::new(10.0, 6.0));
            let mut knight = satyr_at(Vec2::new(6.0, 0.0), Vec2::new(1.0, 0.0));

            assert!(!Ability::Standard.handle_boundary_reflection(&mut knight, arena));
            assert_eq!(knight.position(), Vec2::new(6.0, 0.0));
        }
    }
}
