//! Replay: fold the resolver over a journal and verify it bit-exactly.
//!
//! Replaying from turn 1 must reproduce every recorded snapshot and
//! event log. Any divergence means the journal and the running engine
//! disagree (version drift, corrupted data, nondeterminism) and is
//! reported with the first diverging turn.

use ec4x_core::{GameConfig, resolve_turn};
use ec4x_state::GameState;
use tracing::{debug, info};

use crate::error::PersistError;
use crate::record::ENGINE_VERSION;
use crate::store::TurnStore;

/// Replay a journal from its genesis, verifying every turn.
///
/// Returns the final state on success.
///
/// # Errors
///
/// Returns [`PersistError::MissingGenesis`] for an empty journal,
/// [`PersistError::VersionMismatch`] when the journal was written by a
/// different engine version, and [`PersistError::ReplayDiverged`] when a
/// recomputed turn differs from its recorded snapshot.
pub fn replay(store: &impl TurnStore, config: &GameConfig) -> Result<GameState, PersistError> {
    let genesis = store.genesis().ok_or(PersistError::MissingGenesis)?;
    if genesis.engine_version != ENGINE_VERSION {
        return Err(PersistError::VersionMismatch {
            found: genesis.engine_version.clone(),
            running: ENGINE_VERSION.to_owned(),
        });
    }

    let mut state = genesis.initial_state.clone();
    for record in store.turns() {
        let outcome = resolve_turn(&state, &record.packets, config, record.seed);
        if outcome.state != record.state || outcome.events != record.events {
            return Err(PersistError::ReplayDiverged { turn: record.turn });
        }
        state = outcome.state;
        debug!(turn = record.turn, "replayed");
    }
    info!(
        game = %genesis.game_id,
        turns = store.turns().len(),
        "replay verified"
    );
    Ok(state)
}
