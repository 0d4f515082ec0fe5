//! Append-only game journaling and replay for the EC4X engine.
//!
//! The persistence contract is deliberately thin: one append-only log
//! per game holding, per turn, the engine version, the packets consumed,
//! the RNG seed, the canonical post-turn snapshot, and the event log.
//! Replaying the log from turn 1 reproduces every snapshot bit-exactly;
//! the format is opaque to the engine itself.
//!
//! # Modules
//!
//! - [`record`] -- Journal entry types and the engine version tag.
//! - [`store`] -- The [`TurnStore`] contract and the in-memory store.
//! - [`journal`] -- The JSON-lines file journal.
//! - [`replay`] -- Bit-exact replay verification.
//! - [`error`] -- Error types.

pub mod error;
pub mod journal;
pub mod record;
pub mod replay;
pub mod store;

// Re-export primary types at crate root.
pub use error::PersistError;
pub use journal::FileJournal;
pub use record::{ENGINE_VERSION, Genesis, JournalEntry, TurnRecord};
pub use replay::replay;
pub use store::{MemoryStore, TurnStore};
