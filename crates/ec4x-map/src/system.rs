//! Star systems: the nodes of the star map.

use std::collections::BTreeSet;

use ec4x_types::{Hex, LaneId, PlanetClass, ResourceRating, SystemId};
use serde::{Deserialize, Serialize};

/// A star system on the map.
///
/// Immutable after map generation, with one exception: terraforming may
/// raise the planet class one step at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct System {
    /// The system's identity.
    pub id: SystemId,
    /// Map position.
    pub hex: Hex,
    /// Ring index: distance from the map center.
    pub ring: u32,
    /// Display name.
    pub name: String,
    /// Habitability class of the primary planet.
    pub planet_class: PlanetClass,
    /// Mineral and energy richness.
    pub resource_rating: ResourceRating,
    /// Jump lanes incident on this system.
    pub lanes: BTreeSet<LaneId>,
}

impl System {
    /// Apply one completed terraform step, returning the new class.
    ///
    /// Returns `None` if the planet is already Eden.
    pub fn terraform_step(&mut self) -> Option<PlanetClass> {
        let next = self.planet_class.improved()?;
        self.planet_class = next;
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn harsh_system() -> System {
        System {
            id: SystemId::from_parts(0, 0),
            hex: Hex::new(1, -1),
            ring: 1,
            name: "Weyland".to_owned(),
            planet_class: PlanetClass::Harsh,
            resource_rating: ResourceRating::Poor,
            lanes: BTreeSet::new(),
        }
    }

    #[test]
    fn terraform_climbs_one_step() {
        let mut system = harsh_system();
        assert_eq!(system.terraform_step(), Some(PlanetClass::Benign));
        assert_eq!(system.planet_class, PlanetClass::Benign);
    }

    #[test]
    fn terraform_stops_at_eden() {
        let mut system = harsh_system();
        system.planet_class = PlanetClass::Eden;
        assert_eq!(system.terraform_step(), None);
    }
}
