//! # Isleflick Core
//!
//! Rules core for isleflick, a two-player token-flicking game on an island
//! map.
//!
//! A match runs through a coin toss, a draft (player 2 strikes candidates,
//! then both players pick), placement of the drafted tokens, and flicking
//! combat where tokens capture bases and vaults and knock each other off the
//! island.
//!
//! ## Architecture
//!
//! - **Session**: [`GameSession`] owns the phase, the turn and every piece of
//!   match state; all player actions go through it
//! - **Content**: [`Roster`] of [`CharacterDefinition`]s, each with one
//!   [`Ability`]
//! - **Rules**: [`PlacementValidator`], [`Draft`], [`ScoreLedger`]
//! - **Resolvers**: physics and capture stages run once per tick
//! - **Boundaries**: typed [`EventBus`] and the [`Presentation`] trait
//!
//! ## Usage
//!
//! ```
//! use isle_map::IsleMap;
//! use isleflick_core::{CoinFace, GamePhase, GameSession, MatchConfig, PlayerNumber, PlayerSetup, Roster};
//!
//! let mut session =
//!     GameSession::new(MatchConfig::default(), Roster::standard(), IsleMap::standard(), 42)
//!         .unwrap();
//! session
//!     .resolve_coin_toss([PlayerSetup::new("Ana", "owl"), PlayerSetup::new("Bo", "fox")], CoinFace::Tails)
//!     .unwrap();
//! session.eliminate_candidate(PlayerNumber::Two, 0).unwrap();
//! assert_eq!(session.phase(), GamePhase::Selection);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub use isle_map;

pub mod ability;
pub mod arena;
pub mod character;
pub mod config;
pub mod draft;
pub mod entity;
pub mod error;
pub mod event;
pub mod ledger;
pub mod phase;
pub mod placement;
pub mod player;
pub mod presentation;
pub mod resolver;
pub mod scheduler;
pub mod session;

pub use ability::Ability;
pub use arena::Arena;
pub use character::{CharacterDefinition, CharacterKind, Roster};
pub use config::{MatchConfig, FIXED_DT};
pub use draft::{Draft, DraftStage};
pub use entity::{EntityId, Token, TokenFlags};
pub use error::{InvalidOperation, RulesError};
pub use event::{EventBus, EventKind, GameEvent};
pub use ledger::ScoreLedger;
pub use phase::GamePhase;
pub use placement::{PlacementRejection, PlacementValidator};
pub use player::{CoinFace, PlayerInfo, PlayerNumber, PlayerSetup};
pub use presentation::{NullPresentation, Presentation, RecordingPresentation};
pub use session::{FlickState, GameSession, MatchOutcome, PlacementOutcome};

#[cfg(test)]
mod tests;
