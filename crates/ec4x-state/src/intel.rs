//! Per-house intelligence databases.
//!
//! Each house keeps a database of what it has learned about foreign
//! systems, fleets, and colonies. Visibility levels only ever rise;
//! entries age toward staleness but never downgrade. Disinformation can
//! corrupt a database's numeric estimates for a window, which the
//! fog-of-war projector applies at read time without revealing that
//! corruption is present.

use std::collections::BTreeMap;

use ec4x_types::{
    HouseId, PlanetClass, ResourceRating, ShipClass, SystemId, VisibilityLevel,
};
use serde::{Deserialize, Serialize};

/// Turns before a fleet sighting stops counting as fresh.
pub const FRESH_SIGHTING_TURNS: u32 = 3;

/// What a house knows about one foreign system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemIntel {
    /// Confidence level. Never downgrades.
    pub visibility: VisibilityLevel,
    /// Planet class, if ever scouted.
    pub planet_class: Option<PlanetClass>,
    /// Resource rating, if ever scouted.
    pub resource_rating: Option<ResourceRating>,
    /// The colony owner seen at last observation.
    pub owner: Option<HouseId>,
    /// The turn this entry was last refreshed.
    pub last_updated_turn: u32,
}

/// What a house knows about one foreign house's fleet presence in one
/// system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleetIntel {
    /// The fleet's owner.
    pub owner: HouseId,
    /// Where the force was seen.
    pub system: SystemId,
    /// Rough hull count.
    pub estimated_ships: u32,
    /// Exact composition, recorded only when detection succeeded against
    /// the force.
    pub exact_composition: Option<BTreeMap<ShipClass, u32>>,
    /// The turn of the sighting.
    pub last_seen_turn: u32,
}

impl FleetIntel {
    /// Whether the sighting is still fresh at the given turn.
    #[must_use]
    pub const fn is_fresh(&self, turn: u32) -> bool {
        turn.saturating_sub(self.last_seen_turn) <= FRESH_SIGHTING_TURNS
    }
}

/// What a house knows about one foreign colony.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColonyIntel {
    /// The colony's owner at observation time.
    pub owner: HouseId,
    /// The system the colony occupies.
    pub system: SystemId,
    /// Estimated population units.
    pub estimated_population: Option<u32>,
    /// Estimated industrial units.
    pub estimated_industry: Option<u32>,
    /// Estimated defensive strength.
    pub estimated_defenses: Option<u32>,
    /// The turn this snapshot was taken.
    pub last_updated_turn: u32,
}

/// One house's accumulated intelligence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntelDatabase {
    /// Per-system entries.
    pub systems: BTreeMap<SystemId, SystemIntel>,
    /// Per-(owner, system) fleet sightings.
    pub fleets: BTreeMap<(HouseId, SystemId), FleetIntel>,
    /// Per-system colony snapshots.
    pub colonies: BTreeMap<SystemId, ColonyIntel>,
}

impl IntelDatabase {
    /// An empty database.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            systems: BTreeMap::new(),
            fleets: BTreeMap::new(),
            colonies: BTreeMap::new(),
        }
    }

    /// Record an observation of a system at a visibility level.
    ///
    /// The stored level never drops: recording Adjacent over an Observed
    /// entry refreshes the timestamp but keeps Observed. Field details are
    /// merged in when the new observation carries them.
    pub fn record_system(
        &mut self,
        system: SystemId,
        visibility: VisibilityLevel,
        planet_class: Option<PlanetClass>,
        resource_rating: Option<ResourceRating>,
        owner: Option<HouseId>,
        turn: u32,
    ) {
        let entry = self.systems.entry(system).or_insert(SystemIntel {
            visibility,
            planet_class,
            resource_rating,
            owner,
            last_updated_turn: turn,
        });
        entry.visibility = entry.visibility.max(visibility);
        if planet_class.is_some() {
            entry.planet_class = planet_class;
        }
        if resource_rating.is_some() {
            entry.resource_rating = resource_rating;
        }
        if owner.is_some() || visibility >= VisibilityLevel::Observed {
            entry.owner = owner;
        }
        entry.last_updated_turn = entry.last_updated_turn.max(turn);
    }

    /// Record a fleet sighting, replacing any older sighting for the same
    /// owner and system.
    pub fn record_fleet(&mut self, sighting: FleetIntel) {
        let key = (sighting.owner, sighting.system);
        match self.fleets.get(&key) {
            Some(existing) if existing.last_seen_turn > sighting.last_seen_turn => {}
            _ => {
                self.fleets.insert(key, sighting);
            }
        }
    }

    /// Record a colony snapshot, replacing any older snapshot for the
    /// system.
    pub fn record_colony(&mut self, snapshot: ColonyIntel) {
        let key = snapshot.system;
        match self.colonies.get(&key) {
            Some(existing) if existing.last_updated_turn > snapshot.last_updated_turn => {}
            _ => {
                self.colonies.insert(key, snapshot);
            }
        }
    }

    /// The visibility level the database grants for a system.
    #[must_use]
    pub fn visibility_of(&self, system: SystemId) -> VisibilityLevel {
        self.systems
            .get(&system)
            .map_or(VisibilityLevel::None, |entry| entry.visibility)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sys(n: u32) -> SystemId {
        SystemId::from_parts(n, 0)
    }

    #[test]
    fn visibility_never_downgrades() {
        let mut db = IntelDatabase::new();
        db.record_system(
            sys(1),
            VisibilityLevel::Observed,
            Some(PlanetClass::Lush),
            Some(ResourceRating::Rich),
            None,
            4,
        );
        db.record_system(sys(1), VisibilityLevel::Adjacent, None, None, None, 9);
        let entry = db.systems.get(&sys(1));
        assert_eq!(entry.map(|e| e.visibility), Some(VisibilityLevel::Observed));
        assert_eq!(entry.map(|e| e.planet_class), Some(Some(PlanetClass::Lush)));
        assert_eq!(entry.map(|e| e.last_updated_turn), Some(9));
    }

    #[test]
    fn older_fleet_sightings_never_overwrite_newer() {
        let mut db = IntelDatabase::new();
        let owner = HouseId::from_parts(1, 0);
        db.record_fleet(FleetIntel {
            owner,
            system: sys(2),
            estimated_ships: 8,
            exact_composition: None,
            last_seen_turn: 10,
        });
        db.record_fleet(FleetIntel {
            owner,
            system: sys(2),
            estimated_ships: 3,
            exact_composition: None,
            last_seen_turn: 6,
        });
        let entry = db.fleets.get(&(owner, sys(2)));
        assert_eq!(entry.map(|e| e.estimated_ships), Some(8));
    }

    #[test]
    fn freshness_window_is_inclusive() {
        let sighting = FleetIntel {
            owner: HouseId::from_parts(0, 0),
            system: sys(0),
            estimated_ships: 1,
            exact_composition: None,
            last_seen_turn: 5,
        };
        assert!(sighting.is_fresh(5 + FRESH_SIGHTING_TURNS));
        assert!(!sighting.is_fresh(6 + FRESH_SIGHTING_TURNS));
    }
}
