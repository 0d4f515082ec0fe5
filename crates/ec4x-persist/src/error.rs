//! Error types for the `ec4x-persist` crate.

/// Errors that can occur while journaling or replaying a game.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// The journal file could not be read or written.
    #[error("journal I/O failed: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// A journal entry could not be serialized or deserialized.
    #[error("journal serialization failed: {source}")]
    Serialization {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// The journal is missing its genesis entry.
    #[error("journal has no genesis entry")]
    MissingGenesis,

    /// A turn record arrived out of order.
    #[error("journal expected turn {expected}, got {got}")]
    OutOfOrder {
        /// The turn the journal expected next.
        expected: u32,
        /// The turn that was appended.
        got: u32,
    },

    /// Replay diverged from a recorded snapshot.
    #[error("replay diverged at turn {turn}")]
    ReplayDiverged {
        /// The first turn whose recomputed state differs.
        turn: u32,
    },

    /// The journal was written by an incompatible engine version.
    #[error("journal written by engine {found}, this engine is {running}")]
    VersionMismatch {
        /// The version in the journal.
        found: String,
        /// The running engine's version.
        running: String,
    },
}
