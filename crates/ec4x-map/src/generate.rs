//! Deterministic star-map generation.
//!
//! Builds concentric rings of systems around a central hub, rolls planet
//! classes and resource ratings from ring-weighted tables, links neighbors
//! with jump lanes of rolled classes, and places one homeworld per house
//! equally spaced on the outer ring.
//!
//! All randomness comes from the caller's seeded generator; the same seed
//! and shape always produce the same map.

use ec4x_types::{Hex, LaneClass, PlanetClass, ResourceRating, SystemId};
use rand::Rng;
use tracing::debug;

use crate::error::MapError;
use crate::starmap::StarMap;

/// Requested shape of a generated map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapShape {
    /// Number of rings around the central system.
    pub rings: u32,
    /// Number of houses to place homeworlds for.
    pub houses: u32,
}

/// A freshly generated map plus the homeworld placements.
#[derive(Debug, Clone)]
pub struct GeneratedMap {
    /// The star map.
    pub map: StarMap,
    /// One homeworld system per house, in house order.
    pub homeworlds: Vec<SystemId>,
}

/// Base star names; cycled with a numeral suffix once exhausted.
const STAR_NAMES: [&str; 24] = [
    "Achernar", "Aldebaran", "Altair", "Antares", "Arcturus", "Bellatrix", "Canopus", "Capella",
    "Castor", "Deneb", "Electra", "Fomalhaut", "Hadar", "Izar", "Kochab", "Merak", "Mirach",
    "Pollux", "Procyon", "Regulus", "Rigel", "Spica", "Thuban", "Vega",
];

/// Planet-class weights for the inner third of the map.
const INNER_CLASS_WEIGHTS: [(PlanetClass, u32); 7] = [
    (PlanetClass::Eden, 1),
    (PlanetClass::Lush, 3),
    (PlanetClass::Benign, 6),
    (PlanetClass::Harsh, 4),
    (PlanetClass::Hostile, 3),
    (PlanetClass::Desolate, 2),
    (PlanetClass::Extreme, 1),
];

/// Planet-class weights for the outer rings; harsher frontier.
const OUTER_CLASS_WEIGHTS: [(PlanetClass, u32); 7] = [
    (PlanetClass::Eden, 0),
    (PlanetClass::Lush, 2),
    (PlanetClass::Benign, 4),
    (PlanetClass::Harsh, 5),
    (PlanetClass::Hostile, 4),
    (PlanetClass::Desolate, 3),
    (PlanetClass::Extreme, 2),
];

/// Resource-rating weights, uniform across the map.
const RATING_WEIGHTS: [(ResourceRating, u32); 5] = [
    (ResourceRating::VeryPoor, 1),
    (ResourceRating::Poor, 3),
    (ResourceRating::Abundant, 5),
    (ResourceRating::Rich, 3),
    (ResourceRating::VeryRich, 1),
];

/// Lane-class weights for neighbor links.
const LANE_WEIGHTS: [(LaneClass, u32); 3] = [
    (LaneClass::Major, 5),
    (LaneClass::Minor, 3),
    (LaneClass::Restricted, 2),
];

/// Generate a map of the requested shape.
///
/// # Errors
///
/// Returns [`MapError::InvalidShape`] when the shape cannot host the
/// requested houses (fewer than 2 rings, fewer than 2 houses, or more
/// houses than outer-ring positions).
pub fn generate_map(shape: MapShape, rng: &mut impl Rng) -> Result<GeneratedMap, MapError> {
    if shape.rings < 2 {
        return Err(MapError::InvalidShape {
            reason: "at least 2 rings are required".to_owned(),
        });
    }
    if shape.houses < 2 {
        return Err(MapError::InvalidShape {
            reason: "at least 2 houses are required".to_owned(),
        });
    }
    let outer_positions = shape.rings.saturating_mul(6);
    if shape.houses > outer_positions {
        return Err(MapError::InvalidShape {
            reason: format!(
                "{} houses do not fit on an outer ring of {outer_positions} positions",
                shape.houses
            ),
        });
    }

    let mut map = StarMap::new();
    let inner_limit = shape.rings.div_ceil(3);

    // Place systems ring by ring so SystemId order tracks ring order.
    let mut name_counter = 0usize;
    for radius in 0..=shape.rings {
        for hex in ring_hexes(radius) {
            let class_weights = if radius <= inner_limit {
                &INNER_CLASS_WEIGHTS
            } else {
                &OUTER_CLASS_WEIGHTS
            };
            let planet_class = weighted_pick(rng, class_weights, PlanetClass::Benign);
            let rating = weighted_pick(rng, &RATING_WEIGHTS, ResourceRating::Abundant);
            let name = star_name(name_counter);
            name_counter = name_counter.saturating_add(1);
            map.add_system(hex, name, planet_class, rating)?;
        }
    }

    // Link neighbors. Directions 0..3 from each hex cover every adjacent
    // pair exactly once.
    let mut lane_specs: Vec<(SystemId, SystemId, LaneClass)> = Vec::new();
    let system_hexes: Vec<(SystemId, Hex)> = map.systems().map(|s| (s.id, s.hex)).collect();
    for (id, hex) in &system_hexes {
        for dir in 0..3usize {
            let neighbor_hex = hex.offset(Hex::DIRECTIONS[dir]);
            if let Some(neighbor) = map.system_at(neighbor_hex) {
                let class = weighted_pick(rng, &LANE_WEIGHTS, LaneClass::Minor);
                lane_specs.push((*id, neighbor, class));
            }
        }
    }

    // Every system must keep at least one Major lane so no fleet profile
    // can be permanently stranded, and the Major/Minor subgraph must stay
    // connected so line fleets can always reach the whole map.
    ensure_major_access(&mut lane_specs, &system_hexes);
    let ids: Vec<SystemId> = system_hexes.iter().map(|(id, _)| *id).collect();
    ensure_line_connectivity(&mut lane_specs, &ids);

    for (a, b, class) in lane_specs {
        map.add_lane(a, b, class)?;
    }

    // Homeworlds: equally spaced outer-ring positions, forced to a
    // settler-grade world.
    let outer: Vec<Hex> = ring_hexes(shape.rings);
    let stride = outer.len().checked_div(shape.houses as usize).unwrap_or(1);
    let mut homeworlds = Vec::with_capacity(shape.houses as usize);
    for slot in 0..shape.houses as usize {
        let hex = outer
            .get(slot.saturating_mul(stride))
            .copied()
            .unwrap_or(Hex::ORIGIN);
        let Some(id) = map.system_at(hex) else {
            return Err(MapError::InvalidShape {
                reason: "outer ring position has no system".to_owned(),
            });
        };
        if let Some(system) = map.system_mut(id) {
            system.planet_class = PlanetClass::Benign;
            system.resource_rating = ResourceRating::Abundant;
        }
        homeworlds.push(id);
    }

    debug!(
        systems = map.system_count(),
        lanes = map.lane_count(),
        houses = shape.houses,
        "generated star map"
    );

    Ok(GeneratedMap { map, homeworlds })
}

/// All hexes at exactly `radius` from the origin, in a deterministic walk
/// order.
fn ring_hexes(radius: u32) -> Vec<Hex> {
    if radius == 0 {
        return vec![Hex::ORIGIN];
    }
    let r = i32::try_from(radius).unwrap_or(i32::MAX);
    let mut out = Vec::with_capacity(6 * radius as usize);
    let mut hex = Hex::new(-r, r);
    for dir in Hex::DIRECTIONS {
        for _ in 0..radius {
            out.push(hex);
            hex = hex.offset(dir);
        }
    }
    out
}

/// Pick an entry from a weight table using the generator.
///
/// The fallback is returned only if every weight is zero.
fn weighted_pick<T: Copy>(rng: &mut impl Rng, entries: &[(T, u32)], fallback: T) -> T {
    let total: u32 = entries.iter().map(|(_, w)| w).sum();
    if total == 0 {
        return fallback;
    }
    let mut roll = rng.random_range(0..total);
    for (value, weight) in entries {
        if roll < *weight {
            return *value;
        }
        roll = roll.saturating_sub(*weight);
    }
    fallback
}

/// Promote one lane per Major-less system so every system keeps trunk
/// access.
fn ensure_major_access(
    lane_specs: &mut [(SystemId, SystemId, LaneClass)],
    systems: &[(SystemId, Hex)],
) {
    for (id, _) in systems {
        let has_major = lane_specs
            .iter()
            .any(|(a, b, class)| (*a == *id || *b == *id) && *class == LaneClass::Major);
        if has_major {
            continue;
        }
        if let Some(spec) = lane_specs.iter_mut().find(|(a, b, _)| a == id || b == id) {
            spec.2 = LaneClass::Major;
        }
    }
}

/// Promote bridging Restricted lanes until the Major/Minor subgraph is one
/// connected component.
///
/// The full neighbor graph is connected, so each pass either finishes or
/// promotes one bridge; the loop always terminates.
fn ensure_line_connectivity(lane_specs: &mut [(SystemId, SystemId, LaneClass)], ids: &[SystemId]) {
    let Some(&start) = ids.first() else {
        return;
    };
    loop {
        let mut reached: std::collections::BTreeSet<SystemId> = std::collections::BTreeSet::new();
        reached.insert(start);
        let mut queue: std::collections::VecDeque<SystemId> = std::collections::VecDeque::new();
        queue.push_back(start);
        while let Some(current) = queue.pop_front() {
            for (a, b, class) in lane_specs.iter() {
                if *class == LaneClass::Restricted {
                    continue;
                }
                let other = if *a == current {
                    Some(*b)
                } else if *b == current {
                    Some(*a)
                } else {
                    None
                };
                if let Some(next) = other
                    && reached.insert(next)
                {
                    queue.push_back(next);
                }
            }
        }
        if reached.len() == ids.len() {
            return;
        }
        let bridge = lane_specs.iter_mut().find(|(a, b, class)| {
            *class == LaneClass::Restricted && (reached.contains(a) != reached.contains(b))
        });
        match bridge {
            Some(spec) => spec.2 = LaneClass::Major,
            None => return,
        }
    }
}

/// Deterministic star name for the nth system.
fn star_name(n: usize) -> String {
    let base = STAR_NAMES.get(n % STAR_NAMES.len()).copied().unwrap_or("Star");
    let cycle = n / STAR_NAMES.len();
    if cycle == 0 {
        base.to_owned()
    } else {
        format!("{base} {}", cycle.saturating_add(1))
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use crate::lane::FleetProfile;

    use super::*;

    fn shape() -> MapShape {
        MapShape {
            rings: 3,
            houses: 4,
        }
    }

    #[test]
    fn same_seed_same_map() {
        let mut rng_a = ChaCha8Rng::seed_from_u64(99);
        let mut rng_b = ChaCha8Rng::seed_from_u64(99);
        let a = generate_map(shape(), &mut rng_a).ok();
        let b = generate_map(shape(), &mut rng_b).ok();
        assert!(a.is_some());
        assert_eq!(a.map(|g| g.map), b.map(|g| g.map));
    }

    #[test]
    fn ring_three_map_has_37_systems() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let generated = generate_map(shape(), &mut rng).ok();
        assert_eq!(generated.map(|g| g.map.system_count()), Some(37));
    }

    #[test]
    fn homeworlds_are_settler_grade_and_distinct() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let Some(generated) = generate_map(shape(), &mut rng).ok() else {
            return;
        };
        assert_eq!(generated.homeworlds.len(), 4);
        let mut seen = std::collections::BTreeSet::new();
        for id in &generated.homeworlds {
            assert!(seen.insert(*id));
            let system = generated.map.system(*id);
            assert_eq!(system.map(|s| s.planet_class), Some(PlanetClass::Benign));
            assert_eq!(
                system.map(|s| s.resource_rating),
                Some(ResourceRating::Abundant)
            );
        }
    }

    #[test]
    fn every_system_reaches_every_other_for_line_fleets() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let Some(generated) = generate_map(shape(), &mut rng).ok() else {
            return;
        };
        let ids: Vec<SystemId> = generated.map.systems().map(|s| s.id).collect();
        let first = ids.first().copied();
        let Some(first) = first else { return };
        for id in &ids {
            assert!(
                generated
                    .map
                    .shortest_path(first, *id, FleetProfile::LINE)
                    .is_some(),
                "system {id} unreachable"
            );
        }
    }

    #[test]
    fn too_many_houses_is_rejected() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let result = generate_map(
            MapShape {
                rings: 2,
                houses: 13,
            },
            &mut rng,
        );
        assert!(matches!(result, Err(MapError::InvalidShape { .. })));
    }
}
