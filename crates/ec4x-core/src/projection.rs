//! The fog-of-war projector.
//!
//! `project_for` is a pure function from `(state, viewer)` to a
//! [`PlayerView`] value snapshot. It reads no clock and draws no
//! randomness: the intel-corruption scramble is a deterministic per-turn
//! offset, so projecting twice yields identical views. Own assets appear
//! in full; foreign assets appear only through the viewer's intelligence
//! database under the visibility rules.

use std::collections::BTreeMap;

use ec4x_state::GameState;
use ec4x_types::{
    ActView, EffectKind, ForeignColonyView, ForeignFleetView, HouseId, OwnColonyView,
    OwnFleetView, OwnHouseView, OwnShipView, PlayerView, ProposalView, RelationView, SystemId,
    SystemView, VisibilityLevel,
};

use crate::rng::corruption_offset;

/// Project the canonical state into one house's view.
#[must_use]
pub fn project_for(state: &GameState, viewer: HouseId) -> PlayerView {
    PlayerView {
        viewer,
        turn: state.turn,
        year: state.year,
        month: state.month,
        act: ActView {
            act: state.act.act,
            started_turn: state.act.started_turn,
            colonization_percent: state.act.colonization_percent,
            total_prestige: state.act.total_prestige,
        },
        house: own_house(state, viewer),
        systems: visible_systems(state, viewer),
        own_fleets: own_fleets(state, viewer),
        own_colonies: own_colonies(state, viewer),
        foreign_fleets: foreign_fleets(state, viewer),
        foreign_colonies: foreign_colonies(state, viewer),
        relations: relations(state),
        proposals: proposals(state, viewer),
    }
}

fn own_house(state: &GameState, viewer: HouseId) -> OwnHouseView {
    state.houses.get(viewer).map_or_else(
        || OwnHouseView {
            id: viewer,
            name: String::new(),
            treasury: 0,
            prestige: 0,
            status: ec4x_types::HouseStatus::Active,
            tech: ec4x_types::TechTree::default(),
            ebp: 0,
            cip: 0,
            turns_without_orders: 0,
            negative_prestige_turns: 0,
            consecutive_shortfall_turns: 0,
        },
        |house| OwnHouseView {
            id: viewer,
            name: house.name.clone(),
            treasury: house.treasury,
            prestige: house.prestige,
            status: house.status,
            tech: house.tech.clone(),
            ebp: house.espionage.ebp,
            cip: house.espionage.cip,
            turns_without_orders: house.turns_without_orders,
            negative_prestige_turns: house.negative_prestige_turns,
            consecutive_shortfall_turns: house.consecutive_shortfall_turns,
        },
    )
}

/// Current physical presence grants Owned/Observed visibility; the intel
/// database supplies the rest. Levels never combine downward: the view
/// takes the maximum of presence and history.
fn visible_systems(state: &GameState, viewer: HouseId) -> BTreeMap<SystemId, SystemView> {
    let mut out = BTreeMap::new();
    let db = state.intel.get(&viewer);

    for system in state.map.systems() {
        let owned = state
            .colony_at(system.id)
            .and_then(|id| state.colonies.get(id))
            .is_some_and(|colony| colony.owner == viewer);
        let present = state.has_presence(viewer, system.id);

        let historical = db.map_or(VisibilityLevel::None, |db| db.visibility_of(system.id));
        let current = if owned {
            VisibilityLevel::Owned
        } else if present {
            VisibilityLevel::Observed
        } else {
            VisibilityLevel::None
        };
        let level = historical.max(current);
        if level == VisibilityLevel::None {
            continue;
        }

        let entry = db.and_then(|db| db.systems.get(&system.id));
        let (name, planet_class, resource_rating, owner, last_updated) = if owned || present {
            let owner = state
                .colony_at(system.id)
                .and_then(|id| state.colonies.get(id))
                .map(|colony| colony.owner);
            (
                Some(system.name.clone()),
                Some(system.planet_class),
                Some(system.resource_rating),
                owner,
                if owned { None } else { Some(state.turn) },
            )
        } else if level >= VisibilityLevel::Scouted {
            (
                Some(system.name.clone()),
                entry.and_then(|e| e.planet_class),
                entry.and_then(|e| e.resource_rating),
                entry.and_then(|e| e.owner),
                entry.map(|e| e.last_updated_turn),
            )
        } else {
            // Adjacent-only entries expose ring and location, nothing
            // else.
            (None, None, None, None, entry.map(|e| e.last_updated_turn))
        };

        out.insert(
            system.id,
            SystemView {
                id: system.id,
                visibility: level,
                hex: system.hex,
                ring: system.ring,
                name,
                planet_class,
                resource_rating,
                owner,
                last_updated_turn: last_updated,
            },
        );
    }
    out
}

fn own_fleets(state: &GameState, viewer: HouseId) -> Vec<OwnFleetView> {
    state
        .fleets_of(viewer)
        .into_iter()
        .filter_map(|fleet_id| {
            let fleet = state.fleets.get(fleet_id)?;
            let ships = fleet
                .ships
                .iter()
                .filter_map(|ship_id| state.ships.get(*ship_id))
                .map(|ship| OwnShipView {
                    class: ship.class,
                    combat_state: ship.combat_state,
                    colonists: ship.colonists,
                    marines: ship.marines,
                })
                .collect();
            Some(OwnFleetView {
                id: fleet_id,
                system: fleet.system,
                status: fleet.status,
                standing_order: fleet.standing_order,
                ships,
            })
        })
        .collect()
}

fn own_colonies(state: &GameState, viewer: HouseId) -> Vec<OwnColonyView> {
    state
        .colonies_of(viewer)
        .into_iter()
        .filter_map(|colony_id| {
            let colony = state.colonies.get(colony_id)?;
            Some(OwnColonyView {
                id: colony_id,
                system: colony.system,
                population: colony.population,
                infrastructure: colony.infrastructure,
                industrial_units: colony.industrial_units,
                tax_rate: colony.tax_rate,
                blockaded_by: colony.blockade.map(|b| b.by),
                construction_queue: colony.construction_queue.len(),
                repair_queue: colony.repair_queue.len(),
                terraforming: colony.terraform_project.is_some(),
            })
        })
        .collect()
}

/// A foreign fleet appears when the viewer has presence in its system
/// this turn, or a non-stale sighting in the database.
fn foreign_fleets(state: &GameState, viewer: HouseId) -> Vec<ForeignFleetView> {
    let mut out = Vec::new();
    let turn = state.turn;

    // Live sightings through current presence.
    for system in state.map.systems() {
        if !state.has_presence(viewer, system.id) {
            continue;
        }
        let mut by_owner: BTreeMap<HouseId, u32> = BTreeMap::new();
        for fleet_id in state.fleets_at(system.id) {
            if let Some(fleet) = state.fleets.get(fleet_id)
                && fleet.owner != viewer
            {
                let ships = u32::try_from(fleet.ships.len()).unwrap_or(0);
                let entry = by_owner.entry(fleet.owner).or_insert(0);
                *entry = entry.saturating_add(ships);
            }
        }
        for (owner, ships) in by_owner {
            // Exact composition only when the stored sighting carries it
            // (detection succeeded against that force).
            let exact = state
                .intel
                .get(&viewer)
                .and_then(|db| db.fleets.get(&(owner, system.id)))
                .filter(|intel| intel.last_seen_turn == turn)
                .and_then(|intel| intel.exact_composition.clone());
            out.push(ForeignFleetView {
                owner,
                system: system.id,
                last_seen_turn: turn,
                estimated_ships: ships,
                exact_composition: exact,
            });
        }
    }

    // Historical sightings that are not superseded by live presence.
    if let Some(db) = state.intel.get(&viewer) {
        for ((owner, system), intel) in &db.fleets {
            if state.has_presence(viewer, *system) {
                continue;
            }
            if !intel.is_fresh(turn) {
                continue;
            }
            out.push(ForeignFleetView {
                owner: *owner,
                system: *system,
                last_seen_turn: intel.last_seen_turn,
                estimated_ships: intel.estimated_ships,
                exact_composition: None,
            });
        }
    }
    out
}

/// Foreign colonies come only from the intel database, with corruption
/// applied silently.
fn foreign_colonies(state: &GameState, viewer: HouseId) -> Vec<ForeignColonyView> {
    let Some(db) = state.intel.get(&viewer) else {
        return Vec::new();
    };
    db.colonies
        .iter()
        .filter(|(_, intel)| intel.owner != viewer)
        .map(|(system, intel)| {
            let corrupted = !state
                .active_effects(EffectKind::IntelCorrupted, viewer, Some(*system))
                .is_empty();
            let scramble = |value: Option<u32>| {
                value.map(|v| {
                    if corrupted {
                        scrambled(v, state.turn, *system, viewer)
                    } else {
                        v
                    }
                })
            };
            ForeignColonyView {
                owner: intel.owner,
                system: *system,
                estimated_population: scramble(intel.estimated_population),
                estimated_industry: scramble(intel.estimated_industry),
                estimated_defenses: scramble(intel.estimated_defenses),
                last_updated_turn: intel.last_updated_turn,
            }
        })
        .collect()
}

/// Scramble a numeric estimate by the deterministic per-turn offset. The
/// presence of corruption is never revealed to the viewer.
fn scrambled(value: u32, turn: u32, system: SystemId, viewer: HouseId) -> u32 {
    let offset = corruption_offset(turn, system, viewer);
    let scaled = i64::from(value).saturating_mul(100 + offset) / 100;
    u32::try_from(scaled.max(0)).unwrap_or(u32::MAX)
}

/// The diplomatic matrix is fully public.
fn relations(state: &GameState) -> Vec<RelationView> {
    let houses = state.house_ids();
    let mut out = Vec::new();
    for (i, a) in houses.iter().enumerate() {
        for b in houses.iter().skip(i + 1) {
            out.push(RelationView {
                from: *a,
                to: *b,
                state: state.diplomacy.state_of(*a, *b),
            });
        }
    }
    out
}

/// Pending proposals are visible only to their two houses.
fn proposals(state: &GameState, viewer: HouseId) -> Vec<ProposalView> {
    state
        .proposals
        .iter()
        .filter(|(_, proposal)| proposal.from == viewer || proposal.to == viewer)
        .map(|(id, proposal)| ProposalView {
            id,
            from: proposal.from,
            to: proposal.to,
            expires_turn: proposal.expires_turn,
        })
        .collect()
}
