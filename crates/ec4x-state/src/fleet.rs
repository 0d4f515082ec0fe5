//! Fleets and ships.
//!
//! A ship is the atomic combat and cargo unit; a fleet is a movable
//! grouping of ships at one system. Ship stats are frozen at construction
//! from the configuration tables and the builder's WEP level; only the
//! combat state mutates afterwards.

use std::collections::BTreeSet;

use ec4x_types::{
    CombatState, FleetCommandKind, FleetId, FleetStatus, HouseId, ShipClass, ShipId, ShipRole,
    StandingOrderKind, SystemId,
};
use ec4x_map::FleetProfile;
use serde::{Deserialize, Serialize};

/// Stats frozen into a ship when it is commissioned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipStats {
    /// Attack strength.
    pub attack: u32,
    /// Defense strength.
    pub defense: u32,
    /// Command cost against the house squadron capacity.
    pub command_cost: u32,
    /// Cargo capacity in PTU or marines.
    pub cargo_capacity: u32,
    /// The builder's WEP level at construction time.
    pub wep_at_build: u8,
}

/// An atomic combatant or cargo unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ship {
    /// The ship's identity.
    pub id: ShipId,
    /// Owning house.
    pub owner: HouseId,
    /// Containing fleet, or `None` for colony-stationed fighters.
    pub fleet: Option<FleetId>,
    /// Stationing colony, for fighters not attached to a fleet.
    pub stationed_colony: Option<ec4x_types::ColonyId>,
    /// Hull class.
    pub class: ShipClass,
    /// Role, derived from the class at construction.
    pub role: ShipRole,
    /// Stats frozen at construction.
    pub stats: ShipStats,
    /// The only attribute that mutates after commissioning.
    pub combat_state: CombatState,
    /// Colonist PTU in the hold.
    pub colonists: u32,
    /// Marines in the hold.
    pub marines: u32,
    /// Carrier this fighter is assigned to, if any.
    pub assigned_carrier: Option<ShipId>,
    /// Fighters embarked on this carrier.
    pub embarked_fighters: Vec<ShipId>,
}

impl Ship {
    /// Whether the ship still fights and moves.
    #[must_use]
    pub const fn is_functional(&self) -> bool {
        matches!(self.combat_state, CombatState::Undamaged)
    }

    /// Whether the ship is gone.
    #[must_use]
    pub const fn is_destroyed(&self) -> bool {
        matches!(self.combat_state, CombatState::Destroyed)
    }

    /// Effective attack strength: crippled ships fight at half.
    #[must_use]
    pub const fn effective_attack(&self) -> u32 {
        match self.combat_state {
            CombatState::Undamaged => self.stats.attack,
            CombatState::Crippled => self.stats.attack / 2,
            CombatState::Destroyed => 0,
        }
    }
}

/// The order a fleet is currently executing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveOrder {
    /// What the fleet is doing.
    pub kind: FleetCommandKind,
    /// Destination or objective system, where the order takes one.
    pub target_system: Option<SystemId>,
    /// Target fleet for JoinFleet and Rendezvous.
    pub target_fleet: Option<FleetId>,
}

/// A movable grouping of ships at one system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fleet {
    /// The fleet's identity.
    pub id: FleetId,
    /// Owning house.
    pub owner: HouseId,
    /// Current location.
    pub system: SystemId,
    /// Activation status.
    pub status: FleetStatus,
    /// Member ships, ascending id order.
    pub ships: BTreeSet<ShipId>,
    /// The order currently being executed, if any.
    pub active_order: Option<ActiveOrder>,
    /// Standing order between explicit commands.
    pub standing_order: Option<StandingOrderKind>,
}

impl Fleet {
    /// An empty fleet shell at a system.
    #[must_use]
    pub const fn empty(id: FleetId, owner: HouseId, system: SystemId) -> Self {
        Self {
            id,
            owner,
            system,
            status: FleetStatus::Active,
            ships: BTreeSet::new(),
            active_order: None,
            standing_order: None,
        }
    }

    /// Compute the traversal profile from the member ships.
    ///
    /// `resolve` maps a ship id to its `(class, combat_state)`; ids that no
    /// longer resolve are ignored.
    pub fn profile<F>(&self, mut resolve: F) -> FleetProfile
    where
        F: FnMut(ShipId) -> Option<(ShipClass, CombatState)>,
    {
        let mut has_crippled = false;
        let mut all_restricted_capable = true;
        let mut any = false;
        for ship in &self.ships {
            let Some((class, combat_state)) = resolve(*ship) else {
                continue;
            };
            if matches!(combat_state, CombatState::Destroyed) {
                continue;
            }
            any = true;
            if matches!(combat_state, CombatState::Crippled) {
                has_crippled = true;
            }
            if !class.restricted_lane_capable() {
                all_restricted_capable = false;
            }
        }
        FleetProfile {
            has_crippled,
            restricted_capable: any && all_restricted_capable && !has_crippled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ship(class: ShipClass, combat_state: CombatState) -> (ShipClass, CombatState) {
        (class, combat_state)
    }

    fn fleet_of(n: u32) -> Fleet {
        let mut fleet = Fleet::empty(
            FleetId::from_parts(0, 0),
            HouseId::from_parts(0, 0),
            SystemId::from_parts(0, 0),
        );
        for i in 0..n {
            fleet.ships.insert(ShipId::from_parts(i, 0));
        }
        fleet
    }

    #[test]
    fn scout_fleet_profile_is_restricted_capable() {
        let fleet = fleet_of(2);
        let profile = fleet.profile(|_| Some(ship(ShipClass::Scout, CombatState::Undamaged)));
        assert!(profile.restricted_capable);
        assert!(!profile.has_crippled);
    }

    #[test]
    fn crippled_member_poisons_the_profile() {
        let fleet = fleet_of(2);
        let mut first = true;
        let profile = fleet.profile(|_| {
            let state = if first {
                first = false;
                CombatState::Crippled
            } else {
                CombatState::Undamaged
            };
            Some(ship(ShipClass::Scout, state))
        });
        assert!(profile.has_crippled);
        assert!(!profile.restricted_capable);
    }

    #[test]
    fn crippled_attack_is_halved() {
        let ship = Ship {
            id: ShipId::from_parts(0, 0),
            owner: HouseId::from_parts(0, 0),
            fleet: None,
            stationed_colony: None,
            class: ShipClass::Cruiser,
            role: ShipClass::Cruiser.role(),
            stats: ShipStats {
                attack: 9,
                defense: 6,
                command_cost: 3,
                cargo_capacity: 0,
                wep_at_build: 2,
            },
            combat_state: CombatState::Crippled,
            colonists: 0,
            marines: 0,
            assigned_carrier: None,
            embarked_fighters: Vec::new(),
        };
        assert_eq!(ship.effective_attack(), 4);
    }
}
