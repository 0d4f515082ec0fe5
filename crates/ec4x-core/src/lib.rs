//! The EC4X turn-resolution engine.
//!
//! EC4X is an asynchronous turn-based 4X strategy system; this crate is
//! its deterministic core. The engine exposes a small, stable surface:
//!
//! - [`new_game`] -- deterministic initial state from a [`GameSetup`].
//! - [`validate`] -- pure command validation plus the budget gate.
//! - [`resolve_turn`] -- the 4-phase resolver (Conflict, Income, Command,
//!   Maintenance) over a `(game, turn)`-seeded RNG.
//! - [`project_for`] -- the fog-of-war projector.
//! - [`filter_events`] -- the per-house event stream filter.
//! - [`is_victory`] -- the end-of-game check.
//!
//! The engine never touches the filesystem, environment variables, or the
//! clock; everything it needs arrives as a value. Multi-game workloads
//! run one independent resolver per game with nothing shared.
//!
//! # Modules
//!
//! - [`error`] -- The engine error taxonomy.
//! - [`rng`] -- Seed derivation and deterministic salts.
//! - [`setup`] -- Game setup and initial state.
//! - [`phases`] -- The four phase implementations.
//! - [`resolve`] -- The turn orchestrator.
//! - [`projection`] -- The fog-of-war projector.
//! - [`victory`] -- Victory detection.

pub mod error;
pub mod phases;
pub mod projection;
pub mod resolve;
pub mod rng;
pub mod setup;
pub mod victory;

// The engine surface, re-exported flat.
pub use ec4x_events::filter_events;
pub use ec4x_rules::{GameConfig, ValidationOutcome, validate};
pub use error::EngineError;
pub use projection::project_for;
pub use resolve::{ResolveOutcome, resolve_turn};
pub use rng::turn_seed;
pub use setup::{GameSetup, new_game};
pub use victory::{PRESTIGE_VICTORY_THRESHOLD, is_victory};

/// Parse a balance configuration from a YAML string.
///
/// The engine reads no files; callers that keep balance tables in
/// external data files load the text themselves and hand it over.
///
/// # Errors
///
/// Returns [`EngineError::ConfigParse`] when the YAML does not match the
/// configuration schema.
pub fn parse_config(yaml: &str) -> Result<GameConfig, EngineError> {
    Ok(serde_yml::from_str(yaml)?)
}
