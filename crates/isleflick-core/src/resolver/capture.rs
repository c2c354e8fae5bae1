//! Structure captures.
//!
//! A token that comes to rest inside a base or vault it does not hold takes
//! it over. The capture resolver looks at the `TokenSettled` events the
//! physics stage produced this tick; each structure changes hands at most
//! once per pass, so rewards are never doubled.

use std::collections::BTreeSet;

use isle_map::{Structure, StructureId, StructureKind};

use crate::entity::EntityId;
use crate::event::GameEvent;

use super::{ResolveContext, Resolver};

/// Turns resting positions into captures and rewards.
#[derive(Debug, Clone, Copy, Default)]
pub struct CaptureResolver;

impl CaptureResolver {
    /// Creates the resolver.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn settle_targets(events: &[GameEvent]) -> Vec<EntityId> {
        events
            .iter()
            .filter_map(|e| match e {
                GameEvent::TokenSettled { token } => Some(*token),
                _ => None,
            })
            .collect()
    }

    fn capture_one(
        ctx: &mut ResolveContext<'_>,
        token_id: EntityId,
        taken: &mut BTreeSet<StructureId>,
    ) {
        let Some(token) = ctx.arena.get(token_id) else {
            return;
        };
        let owner = token.owner();
        let Some(definition) = ctx.roster.get(token.kind()) else {
            tracing::warn!(token = %token_id, kind = %token.kind(), "no definition, capture skipped");
            return;
        };
        let ability = definition.ability();
        let targets: Vec<Structure> = ctx
            .map
            .structures_containing(token.position())
            .filter(|s| s.is_capturable_by(owner.as_u8()))
            .filter(|s| !taken.contains(&s.id))
            .copied()
            .collect();

        for structure in targets {
            let reward = match structure.kind {
                StructureKind::Vault => ability.on_vault_capture(token, definition, &structure),
                StructureKind::Base => ability.on_base_capture(token, definition, &structure),
            };
            let previous_owner = match ctx.map.capture(structure.id, owner.as_u8()) {
                Ok(previous) => previous,
                Err(err) => {
                    tracing::warn!(%err, "capture failed");
                    continue;
                }
            };
            taken.insert(structure.id);
            ctx.events.push(GameEvent::StructureCaptured {
                structure: structure.id,
                kind: structure.kind,
                previous_owner,
                new_owner: owner,
                token: token_id,
            });
            ctx.events.extend(reward);
        }
    }
}

impl Resolver for CaptureResolver {
    fn name(&self) -> &'static str {
        "capture"
    }

    fn resolve(&self, ctx: &mut ResolveContext<'_>) {
        let mut taken = BTreeSet::new();
        for token in Self::settle_targets(ctx.events) {
            Self::capture_one(ctx, token, &mut taken);
        }
    }
}
