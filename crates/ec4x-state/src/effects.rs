//! Time-bounded espionage effects.

use ec4x_types::{EffectId, EffectKind, HouseId, SystemId};
use serde::{Deserialize, Serialize};

/// A modifier produced by a successful espionage action.
///
/// Ticked down by one in every Maintenance phase and removed at zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OngoingEffect {
    /// The effect's identity.
    pub id: EffectId,
    /// What the effect does.
    pub kind: EffectKind,
    /// The house suffering the effect.
    pub target_house: HouseId,
    /// The house that planted it.
    pub source_house: HouseId,
    /// The system the effect is scoped to, where the kind takes one.
    pub system: Option<SystemId>,
    /// Strength of the effect (percent for reductions, flat otherwise).
    pub magnitude: i64,
    /// Turns left before the effect lapses.
    pub turns_remaining: u32,
}

impl OngoingEffect {
    /// Tick one turn off the effect. Returns `true` when it has lapsed.
    pub const fn tick(&mut self) -> bool {
        self.turns_remaining = self.turns_remaining.saturating_sub(1);
        self.turns_remaining == 0
    }
}
