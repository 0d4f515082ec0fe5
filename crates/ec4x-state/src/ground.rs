//! Ground units: armies, marines, batteries, and planetary shields.

use ec4x_types::{ColonyId, CombatState, GroundClass, GroundUnitId, HouseId, ShipId};
use serde::{Deserialize, Serialize};

/// Where a ground unit currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroundLocation {
    /// Stationed at a colony.
    Colony(ColonyId),
    /// Embarked in a transport's hold.
    Carrier(ShipId),
}

/// A ground asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundUnit {
    /// The unit's identity.
    pub id: GroundUnitId,
    /// Owning house.
    pub owner: HouseId,
    /// Unit class.
    pub class: GroundClass,
    /// Where the unit is.
    pub location: GroundLocation,
    /// Attack strength.
    pub attack: u32,
    /// Defense strength.
    pub defense: u32,
    /// Combat state.
    pub combat_state: CombatState,
}

impl GroundUnit {
    /// Effective attack strength: crippled units fight at half.
    #[must_use]
    pub const fn effective_attack(&self) -> u32 {
        match self.combat_state {
            CombatState::Undamaged => self.attack,
            CombatState::Crippled => self.attack / 2,
            CombatState::Destroyed => 0,
        }
    }
}
