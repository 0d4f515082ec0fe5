//! The journal contract and the in-memory store.
//!
//! [`TurnStore`] is the single writer interface the daemon feeds from the
//! resolver's post-turn output. [`MemoryStore`] backs tests and replay
//! tooling; the file journal implements the same contract on disk.

use ec4x_state::GameState;
use tracing::debug;

use crate::error::PersistError;
use crate::record::{Genesis, JournalEntry, TurnRecord};

/// An append-only per-game turn journal.
pub trait TurnStore {
    /// Write the genesis entry. Must be called exactly once, first.
    fn write_genesis(&mut self, genesis: Genesis) -> Result<(), PersistError>;

    /// Append one resolved turn. Turns must arrive in order.
    fn append_turn(&mut self, record: TurnRecord) -> Result<(), PersistError>;

    /// The genesis entry, if written.
    fn genesis(&self) -> Option<&Genesis>;

    /// All turn records, ascending.
    fn turns(&self) -> &[TurnRecord];

    /// The most recent canonical state: the last record's snapshot, or
    /// the genesis state.
    fn latest_state(&self) -> Option<&GameState> {
        self.turns()
            .last()
            .map(|record| &record.state)
            .or_else(|| self.genesis().map(|genesis| &genesis.initial_state))
    }
}

/// Validate that a record continues the journal.
pub(crate) fn check_order(
    genesis: Option<&Genesis>,
    turns: &[TurnRecord],
    record: &TurnRecord,
) -> Result<(), PersistError> {
    let Some(genesis) = genesis else {
        return Err(PersistError::MissingGenesis);
    };
    let expected = turns
        .last()
        .map_or(genesis.initial_state.turn, |last| last.turn.saturating_add(1));
    if record.turn != expected {
        return Err(PersistError::OutOfOrder {
            expected,
            got: record.turn,
        });
    }
    Ok(())
}

/// The in-memory journal.
#[derive(Debug, Default)]
pub struct MemoryStore {
    genesis: Option<Genesis>,
    records: Vec<TurnRecord>,
}

impl MemoryStore {
    /// An empty store.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            genesis: None,
            records: Vec::new(),
        }
    }

    /// Rebuild a store from journal entries (for example, read from a
    /// file).
    pub fn from_entries(
        entries: impl IntoIterator<Item = JournalEntry>,
    ) -> Result<Self, PersistError> {
        let mut store = Self::new();
        for entry in entries {
            match entry {
                JournalEntry::Genesis(genesis) => store.write_genesis(*genesis)?,
                JournalEntry::Turn(record) => store.append_turn(*record)?,
            }
        }
        Ok(store)
    }
}

impl TurnStore for MemoryStore {
    fn write_genesis(&mut self, genesis: Genesis) -> Result<(), PersistError> {
        debug!(game = %genesis.game_id, "genesis written");
        self.genesis = Some(genesis);
        Ok(())
    }

    fn append_turn(&mut self, record: TurnRecord) -> Result<(), PersistError> {
        check_order(self.genesis.as_ref(), &self.records, &record)?;
        debug!(turn = record.turn, events = record.events.len(), "turn appended");
        self.records.push(record);
        Ok(())
    }

    fn genesis(&self) -> Option<&Genesis> {
        self.genesis.as_ref()
    }

    fn turns(&self) -> &[TurnRecord] {
        &self.records
    }
}
