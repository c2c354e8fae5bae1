//! Token physics.
//!
//! Each tick the `PhysicsResolver`:
//! 1. integrates every thrown token (`position += velocity * dt`) and damps it
//! 2. resolves circle-circle contacts between placed tokens
//! 3. reflects `Rebound` tokens off the arena edge and eliminates any other
//!    token whose centre has left the arena
//! 4. settles thrown tokens slower than `settle_speed`
//!
//! # Fixed Timestep
//!
//! The step length comes from [`MatchConfig::fixed_dt`] (1/60 s by default)
//! so results never depend on frame time.

use glam::Vec2;

use crate::arena::Arena;
use crate::config::MatchConfig;
use crate::entity::{EntityId, TokenFlags};
use crate::event::GameEvent;

use super::{ResolveContext, Resolver};

/// Integration, contact and settle rules.
///
/// # Example
///
/// ```
/// use isleflick_core::config::{MatchConfig, FIXED_DT};
/// use isleflick_core::resolver::PhysicsResolver;
///
/// let resolver = PhysicsResolver::from_config(&MatchConfig::default());
/// assert!((resolver.dt() - FIXED_DT).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicsResolver {
    dt: f32,
    linear_damping: f32,
    angular_damping: f32,
    restitution: f32,
    settle_speed: f32,
    token_radius: f32,
}

impl PhysicsResolver {
    /// Reads the physics tunables.
    #[must_use]
    pub fn from_config(config: &MatchConfig) -> Self {
        Self {
            dt: config.fixed_dt,
            linear_damping: config.linear_damping,
            angular_damping: config.angular_damping,
            restitution: config.restitution,
            settle_speed: config.settle_speed,
            token_radius: config.token_radius,
        }
    }

    /// Step length in seconds.
    #[must_use]
    pub fn dt(&self) -> f32 {
        self.dt
    }

    /// Moves and damps thrown tokens.
    fn integrate(&self, arena: &mut Arena) {
        let linear = (1.0 - self.linear_damping * self.dt).max(0.0);
        let angular = (1.0 - self.angular_damping * self.dt).max(0.0);
        for token in arena.tokens_sorted_mut().filter(|t| t.is_thrown()) {
            token.transform.position += token.physics.velocity * self.dt;
            token.transform.rotation += token.physics.spin * self.dt;
            token.physics.velocity *= linear;
            token.physics.spin *= angular;
        }
        arena.sync_spatial();
    }

    /// Pairwise contacts between placed tokens, lower id first.
    ///
    /// Immobile tokens have infinite mass. A token knocked into motion
    /// becomes thrown so it settles like a flicked one.
    fn collide(&self, arena: &mut Arena) {
        let ids: Vec<EntityId> = arena
            .tokens_sorted()
            .filter(|t| t.is_placed())
            .map(|t| t.id())
            .collect();
        let reach = self.token_radius * 2.0;

        for (i, &a_id) in ids.iter().enumerate() {
            for &b_id in &ids[i + 1..] {
                let (Some(a), Some(b)) = (arena.get(a_id), arena.get(b_id)) else {
                    continue;
                };
                if !(a.is_thrown() || b.is_thrown()) {
                    continue;
                }
                let delta = b.position() - a.position();
                let distance = delta.length();
                if distance >= reach {
                    continue;
                }
                let inv_a = inverse_mass(a.is_immobile(), a.physics.mass);
                let inv_b = inverse_mass(b.is_immobile(), b.physics.mass);
                let inv_sum = inv_a + inv_b;
                if inv_sum <= 0.0 {
                    continue;
                }
                let normal = if distance > f32::EPSILON {
                    delta / distance
                } else {
                    Vec2::X
                };

                let closing = (b.velocity() - a.velocity()).dot(normal);
                let impulse = if closing < 0.0 {
                    -(1.0 + self.restitution) * closing / inv_sum
                } else {
                    0.0
                };
                let push = (reach - distance) / inv_sum;

                tracing::trace!(a = %a_id, b = %b_id, impulse, "contact");
                if let Some(a) = arena.get_mut(a_id) {
                    a.physics.velocity -= normal * impulse * inv_a;
                    a.transform.position -= normal * push * inv_a;
                    if inv_a > 0.0 && impulse > 0.0 {
                        a.flags.insert(TokenFlags::THROWN);
                    }
                }
                if let Some(b) = arena.get_mut(b_id) {
                    b.physics.velocity += normal * impulse * inv_b;
                    b.transform.position += normal * push * inv_b;
                    if inv_b > 0.0 && impulse > 0.0 {
                        b.flags.insert(TokenFlags::THROWN);
                    }
                }
            }
        }
        arena.sync_spatial();
    }

    /// Edge rules. Returns the tokens that left the arena.
    fn boundaries(ctx: &mut ResolveContext<'_>) -> Vec<EntityId> {
        let bounds = ctx.map.bounds();
        let mut gone = Vec::new();
        for token in ctx.arena.tokens_sorted_mut().filter(|t| t.is_thrown()) {
            let ability = token.kind().ability();
            if ability.reflects_at_boundary() {
                ability.handle_boundary_reflection(token, bounds);
            } else if !bounds.contains(token.position()) {
                gone.push(token.id());
            }
        }
        gone
    }

    fn settle(&self, arena: &mut Arena, events: &mut Vec<GameEvent>) {
        for token in arena.tokens_sorted_mut() {
            if token.is_thrown() && token.physics.speed() < self.settle_speed {
                token.settle();
                tracing::debug!(token = %token.id(), position = ?token.position(), "token settled");
                events.push(GameEvent::TokenSettled { token: token.id() });
            }
        }
    }
}

impl Default for PhysicsResolver {
    fn default() -> Self {
        Self::from_config(&MatchConfig::default())
    }
}

fn inverse_mass(immobile: bool, mass: f32) -> f32 {
    if immobile || mass <= 0.0 {
        0.0
    } else {
        1.0 / mass
    }
}

impl Resolver for PhysicsResolver {
    fn name(&self) -> &'static str {
        "physics"
    }

    fn resolve(&self, ctx: &mut ResolveContext<'_>) {
        if !ctx.arena.tokens_sorted().any(|t| t.is_thrown()) {
            return;
        }
        self.integrate(ctx.arena);
        self.collide(ctx.arena);

        for id in Self::boundaries(ctx) {
            if let Some(token) = ctx.arena.despawn(id) {
                tracing::info!(token = %id, owner = %token.owner(), kind = %token.kind(), "token left the arena");
                ctx.events.push(GameEvent::TokenEliminated {
                    token: id,
                    owner: token.owner(),
                });
            }
        }
        ctx.arena.sync_spatial();

        self.settle(ctx.arena, ctx.events);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::{CharacterKind, Roster};
    use crate::player::PlayerNumber;
    use isle_map::IsleMap;

    struct World {
        arena: Arena,
        map: IsleMap,
        roster: Roster,
        config: MatchConfig,
        events: Vec<GameEvent>,
    }

    impl World {
        fn new() -> Self {
            Self {
                arena: Arena::new(),
                map: IsleMap::standard(),
                roster: Roster::standard(),
                config: MatchConfig::default(),
                events: Vec::new(),
            }
        }

        fn placed(&mut self, kind: CharacterKind, at: Vec2, mass: f32) -> EntityId {
            let id = self.arena.spawn(PlayerNumber::One, kind, at, mass);
            self.arena.get_mut(id).unwrap().flags.insert(TokenFlags::PLACED);
            id
        }

        fn throw(&mut self, id: EntityId, velocity: Vec2) {
            let token = self.arena.get_mut(id).unwrap();
            token.physics.velocity = velocity;
            token.flags.insert(TokenFlags::THROWN);
        }

        fn step(&mut self) {
            let resolver = PhysicsResolver::from_config(&self.config);
            let mut ctx = ResolveContext {
                arena: &mut self.arena,
                map: &mut self.map,
                roster: &self.roster,
                config: &self.config,
                events: &mut self.events,
            };
            resolver.resolve(&mut ctx);
        }

        fn run(&mut self, ticks: usize) {
            for _ in 0..ticks {
                self.step();
            }
        }
    }

    mod integration_tests {
        use super::*;

        #[test]
        fn thrown_token_moves_and_slows() {
            let mut world = World::new();
            let id = world.placed(CharacterKind::Knight, Vec2::ZERO, 1.5);
            world.throw(id, Vec2::new(1.0, 0.0));

            world.step();

            let token = world.arena.get(id).unwrap();
            assert!(token.position().x > 0.0);
            assert!(token.velocity().x < 1.0);
            assert_eq!(world.arena.spatial().get(id), Some(token.position()));
        }

        #[test]
        fn resting_tokens_untouched() {
            let mut world = World::new();
            let id = world.placed(CharacterKind::Knight, Vec2::new(1.0, 1.0), 1.5);

            world.run(10);

            assert_eq!(world.arena.get(id).unwrap().position(), Vec2::new(1.0, 1.0));
            assert!(world.events.is_empty());
        }

        #[test]
        fn slow_token_settles_once() {
            let mut world = World::new();
            let id = world.placed(CharacterKind::Knight, Vec2::ZERO, 1.5);
            world.throw(id, Vec2::new(0.5, 0.0));

            world.run(600);

            let token = world.arena.get(id).unwrap();
            assert!(!token.is_thrown());
            assert!(!token.is_moving());
            let settles = world
                .events
                .iter()
                .filter(|e| matches!(e, GameEvent::TokenSettled { .. }))
                .count();
            assert_eq!(settles, 1);
        }
    }

    mod collision_tests {
        use super::*;

        #[test]
        fn hit_token_starts_moving() {
            let mut world = World::new();
            let striker = world.placed(CharacterKind::Knight, Vec2::new(0.0, 0.0), 1.0);
            let target = world.placed(CharacterKind::Rogue, Vec2::new(0.5, 0.0), 1.0);
            world.throw(striker, Vec2::new(3.0, 0.0));

            world.run(10);

            let hit = world.arena.get(target).unwrap();
            assert!(hit.is_thrown());
            assert!(hit.velocity().x > 0.0);
            assert!(world.arena.get(striker).unwrap().velocity().x < hit.velocity().x);
        }

        #[test]
        fn immobile_token_does_not_move() {
            let mut world = World::new();
            let golem = world.placed(CharacterKind::Golem, Vec2::new(0.5, 0.0), 3.0);
            world
                .arena
                .get_mut(golem)
                .unwrap()
                .flags
                .insert(TokenFlags::IMMOBILE);
            let striker = world.placed(CharacterKind::Knight, Vec2::ZERO, 1.0);
            world.throw(striker, Vec2::new(3.0, 0.0));

            world.run(10);

            let golem = world.arena.get(golem).unwrap();
            assert_eq!(golem.position(), Vec2::new(0.5, 0.0));
            assert!(!golem.is_thrown());
            assert!(world.arena.get(striker).unwrap().velocity().x < 0.0);
        }
    }

    mod boundary_tests {
        use super::*;

        #[test]
        fn token_leaving_arena_is_eliminated() {
            let mut world = World::new();
            let id = world.placed(CharacterKind::Knight, Vec2::new(4.95, 0.0), 1.5);
            world.throw(id, Vec2::new(6.0, 0.0));

            world.step();

            assert!(!world.arena.contains(id));
            assert!(world.arena.spatial().get(id).is_none());
            assert_eq!(
                world.events,
                vec![GameEvent::TokenEliminated {
                    token: id,
                    owner: PlayerNumber::One
                }]
            );
        }

        #[test]
        fn satyr_bounces_back() {
            let mut world = World::new();
            let id = world.placed(CharacterKind::Satyr, Vec2::new(4.95, 0.0), 1.0);
            world.throw(id, Vec2::new(6.0, 0.0));

            world.step();

            let satyr = world.arena.get(id).unwrap();
            assert!((satyr.position().x - 5.0).abs() < 1e-6);
            assert!(satyr.velocity().x < 0.0);
            assert!(world.events.is_empty());
        }
    }
}
