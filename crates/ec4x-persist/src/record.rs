//! Journal entry types.
//!
//! A game journal is a genesis entry (the engine version, the game id,
//! and turn-1 state) followed by one [`TurnRecord`] per resolved turn:
//! the packets consumed, the RNG seed, the canonical post-turn snapshot,
//! and the event log. Entries are append-only and never rewritten.

use std::collections::BTreeMap;

use ec4x_events::GameEvent;
use ec4x_state::GameState;
use ec4x_types::{CommandPacket, GameId, HouseId};
use serde::{Deserialize, Serialize};

/// The engine version stamped into every journal.
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// The first entry of every journal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genesis {
    /// The engine version that created the game.
    pub engine_version: String,
    /// The game this journal belongs to.
    pub game_id: GameId,
    /// The initial state, before any turn resolved.
    pub initial_state: GameState,
}

/// One resolved turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnRecord {
    /// The engine version that resolved the turn.
    pub engine_version: String,
    /// The turn that was resolved.
    pub turn: u32,
    /// The RNG seed the resolver ran on.
    pub seed: u64,
    /// The command packets consumed, per house.
    pub packets: BTreeMap<HouseId, CommandPacket>,
    /// The canonical state after the turn.
    pub state: GameState,
    /// The full (unfiltered) event log of the turn.
    pub events: Vec<GameEvent>,
}

/// One line of the journal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JournalEntry {
    /// The genesis entry.
    Genesis(Box<Genesis>),
    /// A resolved turn.
    Turn(Box<TurnRecord>),
}
