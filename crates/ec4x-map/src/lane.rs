//! Jump lanes: the edges of the star map.

use ec4x_types::{LaneClass, LaneId, SystemId};
use serde::{Deserialize, Serialize};

/// The traversal profile of a fleet, computed from its member ships.
///
/// Pathfinding and movement consult this instead of the fleet itself so the
/// map crate stays independent of the entity tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleetProfile {
    /// Whether any member ship is crippled.
    pub has_crippled: bool,
    /// Whether every member ship is an uncrippled restricted-lane-capable
    /// hull (Scout or Raider).
    pub restricted_capable: bool,
}

impl FleetProfile {
    /// The profile of an undamaged mixed-hull fleet.
    pub const LINE: Self = Self {
        has_crippled: false,
        restricted_capable: false,
    };

    /// The profile of an undamaged all-scout fleet.
    pub const SCOUT: Self = Self {
        has_crippled: false,
        restricted_capable: true,
    };
}

/// A jump lane between two systems. Immutable after map generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JumpLane {
    /// The lane's identity.
    pub id: LaneId,
    /// One endpoint.
    pub a: SystemId,
    /// The other endpoint.
    pub b: SystemId,
    /// Traffic class.
    pub class: LaneClass,
}

impl JumpLane {
    /// The endpoint opposite `from`, or `None` if `from` is not an
    /// endpoint.
    #[must_use]
    pub const fn other_end(&self, from: SystemId) -> Option<SystemId> {
        if from.into_raw() == self.a.into_raw() {
            Some(self.b)
        } else if from.into_raw() == self.b.into_raw() {
            Some(self.a)
        } else {
            None
        }
    }

    /// Whether a fleet with the given profile may traverse this lane.
    ///
    /// Major lanes are open to everyone. Minor lanes are closed to fleets
    /// carrying crippled ships. Restricted lanes admit only uncrippled
    /// Scout and Raider hulls.
    #[must_use]
    pub const fn permits(&self, profile: FleetProfile) -> bool {
        match self.class {
            LaneClass::Major => true,
            LaneClass::Minor => !profile.has_crippled,
            LaneClass::Restricted => profile.restricted_capable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lane(class: LaneClass) -> JumpLane {
        JumpLane {
            id: LaneId::from_parts(0, 0),
            a: SystemId::from_parts(1, 0),
            b: SystemId::from_parts(2, 0),
            class,
        }
    }

    #[test]
    fn other_end_is_symmetric() {
        let lane = lane(LaneClass::Major);
        assert_eq!(lane.other_end(lane.a), Some(lane.b));
        assert_eq!(lane.other_end(lane.b), Some(lane.a));
        assert_eq!(lane.other_end(SystemId::from_parts(9, 0)), None);
    }

    #[test]
    fn minor_lanes_exclude_crippled_fleets() {
        let lane = lane(LaneClass::Minor);
        assert!(lane.permits(FleetProfile::LINE));
        assert!(!lane.permits(FleetProfile {
            has_crippled: true,
            restricted_capable: false,
        }));
    }

    #[test]
    fn restricted_lanes_admit_scouts_only() {
        let lane = lane(LaneClass::Restricted);
        assert!(!lane.permits(FleetProfile::LINE));
        assert!(lane.permits(FleetProfile::SCOUT));
    }
}
