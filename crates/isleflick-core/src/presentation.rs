//! Hooks into whatever draws the game.
//!
//! The rules core never waits on these calls. Every method has a no-op
//! default so a front end only implements what it shows.

use std::sync::{Arc, Mutex};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::entity::EntityId;

/// UI surfaces the session toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Surface {
    /// Coin toss screen
    CoinToss,
    /// Draft card grid
    DraftGrid,
    /// Token placement panel
    PlacementPanel,
    /// In-match HUD
    GameplayHud,
}

/// Sound or animation cues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cue {
    /// Coin spinning
    CoinFlip,
    /// Card drafted
    CardPick,
    /// Card struck out
    CardEliminate,
    /// Placement accepted
    PlacementOk,
    /// Placement rejected
    PlacementFail,
    /// Token flicked
    Launch,
    /// Structure captured
    Capture,
    /// Turn passed
    TurnChange,
}

/// Front-end collaborator.
pub trait Presentation: Send {
    /// Shows a surface.
    fn show_surface(&mut self, _surface: Surface) {}

    /// Hides a surface.
    fn hide_surface(&mut self, _surface: Surface) {}

    /// Plays a cue.
    fn play_cue(&mut self, _cue: Cue) {}

    /// Moves the camera.
    fn focus_camera(&mut self, _target: Vec2) {}

    /// Shows the valid/invalid marker under a dragged token.
    fn set_placement_indicator(&mut self, _token: EntityId, _valid: bool) {}

    /// Reveals a token's face for combat.
    fn reveal_token(&mut self, _token: EntityId) {}
}

/// Ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPresentation;

impl Presentation for NullPresentation {}

/// One recorded presentation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum PresentationCall {
    Show(Surface),
    Hide(Surface),
    Cue(Cue),
    Focus(Vec2),
    Indicator { token: EntityId, valid: bool },
    Reveal(EntityId),
}

/// Records calls into a shared log. Clones share the log.
#[derive(Debug, Clone, Default)]
pub struct RecordingPresentation {
    calls: Arc<Mutex<Vec<PresentationCall>>>,
}

impl RecordingPresentation {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every call so far.
    #[must_use]
    pub fn calls(&self) -> Vec<PresentationCall> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    /// Forgets recorded calls.
    pub fn clear(&self) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.clear();
        }
    }

    fn push(&self, call: PresentationCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

impl Presentation for RecordingPresentation {
    fn show_surface(&mut self, surface: Surface) {
        self.push(PresentationCall::Show(surface));
    }

    fn hide_surface(&mut self, surface: Surface) {
        self.push(PresentationCall::Hide(surface));
    }

    fn play_cue(&mut self, cue: Cue) {
        self.push(PresentationCall::Cue(cue));
    }

    fn focus_camera(&mut self, target: Vec2) {
        self.push(PresentationCall::Focus(target));
    }

    fn set_placement_indicator(&mut self, token: EntityId, valid: bool) {
        self.push(PresentationCall::Indicator { token, valid });
    }

    fn reveal_token(&mut self, token: EntityId) {
        self.push(PresentationCall::Reveal(token));
    }
}
