//! The four-phase turn pipeline.
//!
//! A turn is exactly Conflict, Income, Command, Maintenance, in that
//! order, sharing one seeded RNG and one [`TurnContext`]. Phases iterate
//! houses, systems, and fleets in ascending id order; all cross-phase
//! hand-off (queued prestige, wreck values, validated commands) travels
//! through the context, never through hidden state.

pub mod command;
pub mod conflict;
pub mod income;
pub mod maintenance;

use std::collections::{BTreeMap, BTreeSet};

use ec4x_rules::ValidationOutcome;
use ec4x_types::{HouseId, SystemId};

/// Mutable context threaded through the four phases of one turn.
#[derive(Debug, Default)]
pub struct TurnContext {
    /// Validation outcome per submitting house.
    pub outcomes: BTreeMap<HouseId, ValidationOutcome>,
    /// Houses that submitted a packet this turn.
    pub submitted: BTreeSet<HouseId>,
    /// Prestige deltas queued for application in Maintenance:
    /// `(house, delta, reason)`.
    pub pending_prestige: Vec<(HouseId, i64, String)>,
    /// PP value of wrecks created this turn, per system, for salvage.
    pub wreck_value: BTreeMap<SystemId, i64>,
}

impl TurnContext {
    /// Queue a prestige change for Maintenance.
    pub fn queue_prestige(&mut self, house: HouseId, delta: i64, reason: impl Into<String>) {
        self.pending_prestige.push((house, delta, reason.into()));
    }
}
