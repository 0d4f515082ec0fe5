//! Facilities: neorias (production) and kastras (starbases).

use ec4x_types::{ColonyId, CombatState, HouseId, KastraId, NeoriaClass, NeoriaId, SystemId};
use serde::{Deserialize, Serialize};

/// A production facility at a colony.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Neoria {
    /// The facility's identity.
    pub id: NeoriaId,
    /// The colony that hosts it.
    pub colony: ColonyId,
    /// Subclass: spaceport, shipyard, or drydock.
    pub class: NeoriaClass,
    /// The turn it was commissioned.
    pub commissioned_turn: u32,
    /// Dock count before the CST multiplier.
    pub base_docks: u32,
    /// Dock count after the owner's CST multiplier. Recomputed on every
    /// CST advance.
    pub effective_docks: u32,
    /// Combat state. Crippled facilities stop servicing docks.
    pub combat_state: CombatState,
}

impl Neoria {
    /// A freshly commissioned facility.
    #[must_use]
    pub const fn commissioned(
        id: NeoriaId,
        colony: ColonyId,
        class: NeoriaClass,
        turn: u32,
        effective_docks: u32,
    ) -> Self {
        Self {
            id,
            colony,
            class,
            commissioned_turn: turn,
            base_docks: class.base_docks(),
            effective_docks,
            combat_state: CombatState::Undamaged,
        }
    }

    /// Docks currently usable: zero unless undamaged.
    #[must_use]
    pub const fn usable_docks(&self) -> u32 {
        match self.combat_state {
            CombatState::Undamaged => self.effective_docks,
            CombatState::Crippled | CombatState::Destroyed => 0,
        }
    }

    /// Whether this facility can service construction (not repair-only and
    /// undamaged).
    #[must_use]
    pub const fn can_construct(&self) -> bool {
        !self.class.repair_only() && matches!(self.combat_state, CombatState::Undamaged)
    }
}

/// A starbase. Ship-like in combat, with WEP locked in at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kastra {
    /// The starbase's identity.
    pub id: KastraId,
    /// Owning house.
    pub owner: HouseId,
    /// The colony it defends.
    pub colony: ColonyId,
    /// The system it sits in.
    pub system: SystemId,
    /// The turn it was commissioned.
    pub commissioned_turn: u32,
    /// Attack strength.
    pub attack: u32,
    /// Defense strength.
    pub defense: u32,
    /// The builder's WEP level at construction, locked into its fire.
    pub wep_at_build: u8,
    /// Combat state.
    pub combat_state: CombatState,
}

impl Kastra {
    /// Whether the starbase's surveillance net is up.
    ///
    /// Crippled and destroyed starbases stop watching the system; an
    /// espionage `StarbaseCrippled` effect has the same result through the
    /// combat state.
    #[must_use]
    pub const fn surveillance_active(&self) -> bool {
        matches!(self.combat_state, CombatState::Undamaged)
    }

    /// Effective attack strength: crippled starbases fire at half.
    #[must_use]
    pub const fn effective_attack(&self) -> u32 {
        match self.combat_state {
            CombatState::Undamaged => self.attack,
            CombatState::Crippled => self.attack / 2,
            CombatState::Destroyed => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crippled_neoria_offers_no_docks() {
        let mut neoria = Neoria::commissioned(
            NeoriaId::from_parts(0, 0),
            ColonyId::from_parts(0, 0),
            NeoriaClass::Shipyard,
            3,
            12,
        );
        assert_eq!(neoria.usable_docks(), 12);
        neoria.combat_state = CombatState::Crippled;
        assert_eq!(neoria.usable_docks(), 0);
    }

    #[test]
    fn drydock_never_constructs() {
        let neoria = Neoria::commissioned(
            NeoriaId::from_parts(0, 0),
            ColonyId::from_parts(0, 0),
            NeoriaClass::Drydock,
            1,
            5,
        );
        assert!(!neoria.can_construct());
    }
}
