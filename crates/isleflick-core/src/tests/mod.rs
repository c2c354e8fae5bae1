//! Session-level tests.
//!
//! - `determinism.rs`: same seed and inputs give the same match
//! - `integration.rs`: full matches through the public session API
//! - `helpers.rs`: session setup and scripted draft/placement

mod helpers;

pub use helpers::*;
