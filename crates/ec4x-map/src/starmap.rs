//! The star map: systems as nodes, jump lanes as undirected edges.
//!
//! The [`StarMap`] stores all [`System`] nodes and [`JumpLane`] edges and
//! provides neighbor lookups and shortest-path computation that respects
//! lane permissions for a given [`FleetProfile`].
//!
//! Internally, an adjacency map indexes incident lanes per system:
//! `BTreeMap<SystemId, Vec<LaneId>>`. Systems and lanes are never removed,
//! so identifiers are allocated sequentially and never reused.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use ec4x_types::{Hex, LaneClass, LaneId, SystemId};
use serde::{Deserialize, Serialize};

use crate::error::MapError;
use crate::lane::{FleetProfile, JumpLane};
use crate::system::System;

/// The star map holding all systems and jump lanes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarMap {
    /// All systems indexed by their identifier.
    systems: BTreeMap<SystemId, System>,
    /// All lanes indexed by their identifier.
    lanes: BTreeMap<LaneId, JumpLane>,
    /// Incident-lane adjacency per system.
    adjacency: BTreeMap<SystemId, Vec<LaneId>>,
    /// Hex occupancy, to reject duplicate placements.
    by_hex: BTreeMap<Hex, SystemId>,
    /// Next system index to allocate.
    next_system: u32,
    /// Next lane index to allocate.
    next_lane: u32,
}

impl StarMap {
    /// Create an empty star map.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            systems: BTreeMap::new(),
            lanes: BTreeMap::new(),
            adjacency: BTreeMap::new(),
            by_hex: BTreeMap::new(),
            next_system: 0,
            next_lane: 0,
        }
    }

    // -------------------------------------------------------------------
    // System operations
    // -------------------------------------------------------------------

    /// Add a system at a hex, allocating its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::DuplicateSystem`] if the hex is already
    /// occupied.
    pub fn add_system(
        &mut self,
        hex: Hex,
        name: String,
        planet_class: ec4x_types::PlanetClass,
        resource_rating: ec4x_types::ResourceRating,
    ) -> Result<SystemId, MapError> {
        if self.by_hex.contains_key(&hex) {
            return Err(MapError::DuplicateSystem(hex));
        }
        let id = SystemId::from_parts(self.next_system, 0);
        self.next_system = self.next_system.saturating_add(1);
        self.systems.insert(
            id,
            System {
                id,
                hex,
                ring: hex.ring(),
                name,
                planet_class,
                resource_rating,
                lanes: BTreeSet::new(),
            },
        );
        self.adjacency.entry(id).or_default();
        self.by_hex.insert(hex, id);
        Ok(id)
    }

    /// Get an immutable reference to a system.
    #[must_use]
    pub fn system(&self, id: SystemId) -> Option<&System> {
        self.systems.get(&id)
    }

    /// Get a mutable reference to a system.
    ///
    /// Only terraforming legitimately mutates a system after generation.
    pub fn system_mut(&mut self, id: SystemId) -> Option<&mut System> {
        self.systems.get_mut(&id)
    }

    /// The system occupying a hex, if any.
    #[must_use]
    pub fn system_at(&self, hex: Hex) -> Option<SystemId> {
        self.by_hex.get(&hex).copied()
    }

    /// Number of systems on the map.
    #[must_use]
    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    /// Iterate over all systems in ascending `SystemId` order.
    pub fn systems(&self) -> impl Iterator<Item = &System> {
        self.systems.values()
    }

    // -------------------------------------------------------------------
    // Lane operations
    // -------------------------------------------------------------------

    /// Link two systems with a lane of the given class.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::LaneEndpointMissing`] if either endpoint does
    /// not exist, or [`MapError::DegenerateLane`] if the endpoints are the
    /// same system.
    pub fn add_lane(
        &mut self,
        a: SystemId,
        b: SystemId,
        class: LaneClass,
    ) -> Result<LaneId, MapError> {
        if a == b {
            return Err(MapError::DegenerateLane(a));
        }
        if !self.systems.contains_key(&a) {
            return Err(MapError::LaneEndpointMissing(a));
        }
        if !self.systems.contains_key(&b) {
            return Err(MapError::LaneEndpointMissing(b));
        }
        let id = LaneId::from_parts(self.next_lane, 0);
        self.next_lane = self.next_lane.saturating_add(1);
        self.lanes.insert(id, JumpLane { id, a, b, class });
        self.adjacency.entry(a).or_default().push(id);
        self.adjacency.entry(b).or_default().push(id);
        if let Some(system) = self.systems.get_mut(&a) {
            system.lanes.insert(id);
        }
        if let Some(system) = self.systems.get_mut(&b) {
            system.lanes.insert(id);
        }
        Ok(id)
    }

    /// Get an immutable reference to a lane.
    #[must_use]
    pub fn lane(&self, id: LaneId) -> Option<&JumpLane> {
        self.lanes.get(&id)
    }

    /// Number of lanes on the map.
    #[must_use]
    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    /// Iterate over all lanes in ascending `LaneId` order.
    pub fn lanes(&self) -> impl Iterator<Item = &JumpLane> {
        self.lanes.values()
    }

    /// The lanes incident on a system.
    #[must_use]
    pub fn lanes_of(&self, id: SystemId) -> &[LaneId] {
        self.adjacency.get(&id).map_or(&[], Vec::as_slice)
    }

    /// Neighboring systems reachable over one lane with the given profile,
    /// in ascending `SystemId` order.
    #[must_use]
    pub fn neighbors(&self, from: SystemId, profile: FleetProfile) -> Vec<SystemId> {
        let mut out: Vec<SystemId> = self
            .lanes_of(from)
            .iter()
            .filter_map(|lane_id| self.lanes.get(lane_id))
            .filter(|lane| lane.permits(profile))
            .filter_map(|lane| lane.other_end(from))
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }

    // -------------------------------------------------------------------
    // Pathfinding
    // -------------------------------------------------------------------

    /// Shortest path between two systems under lane permissions.
    ///
    /// Lanes have uniform cost (one jump per turn), so this is a BFS with
    /// deterministic ascending-id expansion. Returns the full node
    /// sequence including both endpoints, or `None` when no permitted
    /// path exists. A path from a system to itself is the single-element
    /// sequence.
    #[must_use]
    pub fn shortest_path(
        &self,
        from: SystemId,
        to: SystemId,
        profile: FleetProfile,
    ) -> Option<Vec<SystemId>> {
        if !self.systems.contains_key(&from) || !self.systems.contains_key(&to) {
            return None;
        }
        if from == to {
            return Some(vec![from]);
        }

        let mut prev: BTreeMap<SystemId, SystemId> = BTreeMap::new();
        let mut queue: VecDeque<SystemId> = VecDeque::new();
        queue.push_back(from);
        prev.insert(from, from);

        while let Some(current) = queue.pop_front() {
            for next in self.neighbors(current, profile) {
                if prev.contains_key(&next) {
                    continue;
                }
                prev.insert(next, current);
                if next == to {
                    return Some(walk_back(&prev, from, to));
                }
                queue.push_back(next);
            }
        }

        None
    }

    /// Number of jumps on the shortest permitted path, if one exists.
    #[must_use]
    pub fn jump_distance(
        &self,
        from: SystemId,
        to: SystemId,
        profile: FleetProfile,
    ) -> Option<u32> {
        self.shortest_path(from, to, profile)
            .map(|path| u32::try_from(path.len().saturating_sub(1)).unwrap_or(u32::MAX))
    }

    /// All systems within `range` jumps of `from` under the profile,
    /// excluding `from` itself, in ascending `SystemId` order.
    #[must_use]
    pub fn systems_within(
        &self,
        from: SystemId,
        range: u32,
        profile: FleetProfile,
    ) -> Vec<SystemId> {
        let mut depth: BTreeMap<SystemId, u32> = BTreeMap::new();
        let mut queue: VecDeque<SystemId> = VecDeque::new();
        depth.insert(from, 0);
        queue.push_back(from);

        while let Some(current) = queue.pop_front() {
            let d = depth.get(&current).copied().unwrap_or(0);
            if d >= range {
                continue;
            }
            for next in self.neighbors(current, profile) {
                if !depth.contains_key(&next) {
                    depth.insert(next, d.saturating_add(1));
                    queue.push_back(next);
                }
            }
        }

        depth.into_keys().filter(|id| *id != from).collect()
    }
}

/// Reconstruct a path from the BFS predecessor map.
fn walk_back(prev: &BTreeMap<SystemId, SystemId>, from: SystemId, to: SystemId) -> Vec<SystemId> {
    let mut path = vec![to];
    let mut current = to;
    while current != from {
        let Some(parent) = prev.get(&current).copied() else {
            break;
        };
        path.push(parent);
        current = parent;
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use ec4x_types::{PlanetClass, ResourceRating};

    use super::*;

    fn add(map: &mut StarMap, q: i32, r: i32) -> SystemId {
        map.add_system(
            Hex::new(q, r),
            format!("S{q}:{r}"),
            PlanetClass::Benign,
            ResourceRating::Abundant,
        )
        .unwrap_or(SystemId::from_parts(0, 0))
    }

    /// A line of four systems: a -Major- b -Minor- c -Restricted- d.
    fn line_map() -> (StarMap, [SystemId; 4]) {
        let mut map = StarMap::new();
        let a = add(&mut map, 0, 0);
        let b = add(&mut map, 1, 0);
        let c = add(&mut map, 2, 0);
        let d = add(&mut map, 3, 0);
        let _ = map.add_lane(a, b, LaneClass::Major);
        let _ = map.add_lane(b, c, LaneClass::Minor);
        let _ = map.add_lane(c, d, LaneClass::Restricted);
        (map, [a, b, c, d])
    }

    #[test]
    fn shortest_path_follows_lanes() {
        let (map, [a, _, c, _]) = line_map();
        let path = map.shortest_path(a, c, FleetProfile::LINE);
        assert_eq!(path.map(|p| p.len()), Some(3));
    }

    #[test]
    fn crippled_fleets_are_blocked_by_minor_lanes() {
        let (map, [a, b, c, _]) = line_map();
        let crippled = FleetProfile {
            has_crippled: true,
            restricted_capable: false,
        };
        assert!(map.shortest_path(a, b, crippled).is_some());
        assert!(map.shortest_path(a, c, crippled).is_none());
    }

    #[test]
    fn only_scout_fleets_cross_restricted_lanes() {
        let (map, [a, _, _, d]) = line_map();
        assert!(map.shortest_path(a, d, FleetProfile::LINE).is_none());
        assert!(map.shortest_path(a, d, FleetProfile::SCOUT).is_some());
    }

    #[test]
    fn path_to_self_is_trivial() {
        let (map, [a, ..]) = line_map();
        assert_eq!(map.shortest_path(a, a, FleetProfile::LINE), Some(vec![a]));
    }

    #[test]
    fn systems_within_respects_range() {
        let (map, [a, b, c, _]) = line_map();
        let reach = map.systems_within(a, 2, FleetProfile::LINE);
        assert_eq!(reach, vec![b, c]);
    }

    #[test]
    fn duplicate_hex_is_rejected() {
        let mut map = StarMap::new();
        let _ = add(&mut map, 0, 0);
        let dup = map.add_system(
            Hex::new(0, 0),
            "Dup".to_owned(),
            PlanetClass::Benign,
            ResourceRating::Abundant,
        );
        assert!(matches!(dup, Err(MapError::DuplicateSystem(_))));
    }
}
