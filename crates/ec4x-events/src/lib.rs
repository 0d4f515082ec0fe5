//! Event stream and visibility filtering for the EC4X engine.
//!
//! The resolver produces a flat log of typed [`GameEvent`] values per
//! turn. Each event kind has exactly one audience rule; [`filter_events`]
//! applies it to build the per-house stream the transport delivers.
//!
//! # Modules
//!
//! - [`event`] -- The [`GameEvent`] ADT with structured per-kind payloads.
//! - [`visibility`] -- The audience table and the per-house filter.

pub mod event;
pub mod visibility;

// Re-export primary types at crate root.
pub use event::{EventPayload, GameEvent};
pub use visibility::{Audience, audience, filter_events, is_visible};
