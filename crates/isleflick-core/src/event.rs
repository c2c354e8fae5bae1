//! Game events and the typed event bus.
//!
//! Every observable change in a match is described by a [`GameEvent`]. The
//! session queues events while an operation runs and flushes them once it
//! finishes: the [`ScoreLedger`](crate::ledger::ScoreLedger) sees them
//! first, then the [`EventBus`] subscribers.
//!
//! # Routing
//!
//! Each event variant maps to exactly one [`EventKind`]. Subscribers
//! register per kind, so a handler only ever sees the payload shape it was
//! registered for.
//!
//! # Example
//!
//! ```
//! use std::sync::{Arc, Mutex};
//! use isleflick_core::event::{EventBus, EventKind, GameEvent};
//! use isleflick_core::player::PlayerNumber;
//!
//! let mut bus = EventBus::new();
//! let seen = Arc::new(Mutex::new(0));
//! let counter = Arc::clone(&seen);
//! bus.subscribe(EventKind::CoinsAwarded, "hud", move |_| {
//!     *counter.lock().unwrap() += 1;
//! });
//! // Subscribing again under the same key replaces the handler.
//! let counter = Arc::clone(&seen);
//! bus.subscribe(EventKind::CoinsAwarded, "hud", move |_| {
//!     *counter.lock().unwrap() += 1;
//! });
//!
//! bus.publish(&GameEvent::CoinsAwarded { player: PlayerNumber::One, amount: 2 });
//! assert_eq!(*seen.lock().unwrap(), 1);
//! ```

use std::collections::HashMap;
use std::fmt;

use isle_map::{StructureId, StructureKind};
use serde::{Deserialize, Serialize};

use crate::character::CharacterKind;
use crate::entity::EntityId;
use crate::phase::GamePhase;
use crate::placement::PlacementRejection;
use crate::player::{CoinFace, PlayerNumber};

/// Something that happened in a match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// The opening coin landed.
    CoinTossResolved {
        /// Face shown
        face: CoinFace,
        /// Whether the calling seat guessed right and took seat one
        caller_won: bool,
    },
    /// The active phase changed.
    PhaseChanged {
        /// Previous phase
        from: GamePhase,
        /// New phase
        to: GamePhase,
    },
    /// The player to act changed.
    TurnChanged {
        /// Player now on turn
        player: PlayerNumber,
    },
    /// A candidate was struck from the draft pool.
    CandidateEliminated {
        /// Who struck it
        player: PlayerNumber,
        /// Character removed
        kind: CharacterKind,
    },
    /// A candidate was drafted.
    CharacterDrafted {
        /// Drafting player
        player: PlayerNumber,
        /// Character taken
        kind: CharacterKind,
    },
    /// The last undrafted candidate was set aside.
    RemainingCardAssigned {
        /// Character set aside
        kind: CharacterKind,
    },
    /// A token entered the match at its staging point.
    TokenSpawned {
        /// New token
        token: EntityId,
        /// Owner
        owner: PlayerNumber,
        /// Character
        kind: CharacterKind,
    },
    /// A placement attempt finished.
    PlacementResult {
        /// Token released
        token: EntityId,
        /// Owner
        owner: PlayerNumber,
        /// Whether the token now rests on the map
        accepted: bool,
        /// Why it was sent back, when rejected
        rejection: Option<PlacementRejection>,
    },
    /// A token's ability fired on placement.
    AbilityActivated {
        /// Token
        token: EntityId,
        /// Character
        kind: CharacterKind,
    },
    /// A token was flicked.
    TokenLaunched {
        /// Token
        token: EntityId,
        /// Owner
        owner: PlayerNumber,
        /// Throw force applied
        force: f32,
    },
    /// A moving token came to rest.
    TokenSettled {
        /// Token
        token: EntityId,
    },
    /// A token left the arena and is out of the match.
    TokenEliminated {
        /// Token
        token: EntityId,
        /// Owner
        owner: PlayerNumber,
    },
    /// A base or vault changed hands.
    StructureCaptured {
        /// Structure
        structure: StructureId,
        /// Base or vault
        kind: StructureKind,
        /// Owner before the capture (0 when neutral)
        previous_owner: u8,
        /// Capturing player
        new_owner: PlayerNumber,
        /// Token resting on it
        token: EntityId,
    },
    /// Coins were granted.
    CoinsAwarded {
        /// Recipient
        player: PlayerNumber,
        /// Amount
        amount: i64,
    },
    /// Glory points were granted.
    GloryAwarded {
        /// Recipient
        player: PlayerNumber,
        /// Amount
        amount: i64,
    },
    /// The match is over.
    MatchEnded {
        /// Winner, `None` on a draw
        winner: Option<PlayerNumber>,
    },
}

impl GameEvent {
    /// Returns the routing tag for this event.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::CoinTossResolved { .. } => EventKind::CoinTossResolved,
            Self::PhaseChanged { .. } => EventKind::PhaseChanged,
            Self::TurnChanged { .. } => EventKind::TurnChanged,
            Self::CandidateEliminated { .. } => EventKind::CandidateEliminated,
            Self::CharacterDrafted { .. } => EventKind::CharacterDrafted,
            Self::RemainingCardAssigned { .. } => EventKind::RemainingCardAssigned,
            Self::TokenSpawned { .. } => EventKind::TokenSpawned,
            Self::PlacementResult { .. } => EventKind::PlacementResult,
            Self::AbilityActivated { .. } => EventKind::AbilityActivated,
            Self::TokenLaunched { .. } => EventKind::TokenLaunched,
            Self::TokenSettled { .. } => EventKind::TokenSettled,
            Self::TokenEliminated { .. } => EventKind::TokenEliminated,
            Self::StructureCaptured { .. } => EventKind::StructureCaptured,
            Self::CoinsAwarded { .. } => EventKind::CoinsAwarded,
            Self::GloryAwarded { .. } => EventKind::GloryAwarded,
            Self::MatchEnded { .. } => EventKind::MatchEnded,
        }
    }

    /// Returns the token this event is about, if any.
    #[must_use]
    pub const fn token(&self) -> Option<EntityId> {
        match self {
            Self::TokenSpawned { token, .. }
            | Self::PlacementResult { token, .. }
            | Self::AbilityActivated { token, .. }
            | Self::TokenLaunched { token, .. }
            | Self::TokenSettled { token }
            | Self::TokenEliminated { token, .. }
            | Self::StructureCaptured { token, .. } => Some(*token),
            _ => None,
        }
    }
}

/// Routing tag, one per [`GameEvent`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum EventKind {
    CoinTossResolved,
    PhaseChanged,
    TurnChanged,
    CandidateEliminated,
    CharacterDrafted,
    RemainingCardAssigned,
    TokenSpawned,
    PlacementResult,
    AbilityActivated,
    TokenLaunched,
    TokenSettled,
    TokenEliminated,
    StructureCaptured,
    CoinsAwarded,
    GloryAwarded,
    MatchEnded,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Identifies one subscription within a kind.
pub type SubscriberKey = &'static str;

type Handler = Box<dyn FnMut(&GameEvent) + Send>;

/// Publish/subscribe registry keyed by [`EventKind`].
///
/// Delivery order across subscribers of one kind is not part of the
/// contract.
#[derive(Default)]
pub struct EventBus {
    subscribers: HashMap<EventKind, Vec<(SubscriberKey, Handler)>>,
}

impl EventBus {
    /// Creates an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `kind` under `key`.
    ///
    /// An existing subscription with the same key is removed first, so
    /// subscribing twice leaves exactly one handler.
    pub fn subscribe<F>(&mut self, kind: EventKind, key: SubscriberKey, handler: F)
    where
        F: FnMut(&GameEvent) + Send + 'static,
    {
        let list = self.subscribers.entry(kind).or_default();
        list.retain(|(k, _)| *k != key);
        list.push((key, Box::new(handler)));
        tracing::debug!(%kind, key, "subscribed");
    }

    /// Removes the subscription for `key`. Returns `true` if one existed.
    pub fn unsubscribe(&mut self, kind: EventKind, key: SubscriberKey) -> bool {
        let Some(list) = self.subscribers.get_mut(&kind) else {
            return false;
        };
        let before = list.len();
        list.retain(|(k, _)| *k != key);
        before != list.len()
    }

    /// Number of handlers registered for `kind`.
    #[must_use]
    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.subscribers.get(&kind).map_or(0, Vec::len)
    }

    /// Delivers `event` to every handler of its kind.
    ///
    /// Returns the number of handlers called.
    pub fn publish(&mut self, event: &GameEvent) -> usize {
        let Some(list) = self.subscribers.get_mut(&event.kind()) else {
            return 0;
        };
        for (_, handler) in list.iter_mut() {
            handler(event);
        }
        list.len()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<_> = self
            .subscribers
            .iter()
            .map(|(kind, list)| (*kind, list.len()))
            .collect();
        kinds.sort();
        f.debug_struct("EventBus").field("subscribers", &kinds).finish()
    }
}
