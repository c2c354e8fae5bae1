//! Per-tick rule resolution.
//!
//! Resolvers run in a fixed order once per physics tick. Each one reads and
//! mutates the match through a [`ResolveContext`] and appends the events it
//! produces. Later resolvers see the events of earlier ones from the same
//! tick, which is how a settle turns into a capture.
//!
//! # Available Resolvers
//!
//! - [`PhysicsResolver`]: integration, collisions, boundaries, settling
//! - [`CaptureResolver`]: bases and vaults under freshly settled tokens
//!
//! # Invariants
//!
//! - Resolvers iterate tokens in id order and are deterministic
//! - Resolvers never touch phase or turn state

mod capture;
mod physics;

pub use capture::CaptureResolver;
pub use physics::PhysicsResolver;

use isle_map::IsleMap;

use crate::arena::Arena;
use crate::character::Roster;
use crate::config::MatchConfig;
use crate::event::GameEvent;

/// Mutable view of a match handed to each resolver.
#[derive(Debug)]
pub struct ResolveContext<'a> {
    /// Tokens
    pub arena: &'a mut Arena,
    /// Map, for terrain and structure ownership
    pub map: &'a mut IsleMap,
    /// Character stats
    pub roster: &'a Roster,
    /// Tunables
    pub config: &'a MatchConfig,
    /// Events produced so far this tick
    pub events: &'a mut Vec<GameEvent>,
}

/// One stage of per-tick resolution.
///
/// # Example
///
/// ```
/// use isleflick_core::resolver::{ResolveContext, Resolver};
///
/// struct Noop;
///
/// impl Resolver for Noop {
///     fn name(&self) -> &'static str {
///         "noop"
///     }
///
///     fn resolve(&self, _ctx: &mut ResolveContext<'_>) {}
/// }
/// ```
pub trait Resolver: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Applies this stage to the match.
    fn resolve(&self, ctx: &mut ResolveContext<'_>);
}

/// The stock resolver chain, in run order.
#[must_use]
pub fn default_resolvers(config: &MatchConfig) -> Vec<Box<dyn Resolver>> {
    vec![
        Box::new(PhysicsResolver::from_config(config)),
        Box::new(CaptureResolver::new()),
    ]
}
