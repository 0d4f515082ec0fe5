//! Phase 3: Command.
//!
//! Executes every order that survived validation and the budget gate:
//! fleet orders and movement, simultaneous colonization with its
//! deterministic tiebreak, build orders and dock assignment, population
//! transfers, terraform starts, research conversion, espionage
//! investment, diplomatic actions, standing orders, and colony
//! directives. The phase ends with blockade bookkeeping and the
//! empty-fleet sweep.

use std::collections::BTreeMap;

use ec4x_events::{EventPayload, GameEvent};
use ec4x_rules::{GameConfig, budget, diplomacy, espionage, research, validation};
use ec4x_state::{
    ActiveOrder, Blockade, GameState, PTU_PER_PU, PopulationInTransit, Project, ProjectKind,
};
use ec4x_types::{
    BuildItem, ColonyDirective, ColonyId, FleetCommand, FleetCommandKind, FleetId, HouseId,
    HouseStatus, NeoriaId, ShipClass, StandingOrderKind, SystemId, VisibilityLevel,
};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::phases::TurnContext;
use crate::rng::system_salt;

/// Jump radius a colonization fallback scan covers.
const FALLBACK_SCAN_RANGE: u32 = 2;

/// Maximum fallback sub-rounds after a lost colonization race.
const FALLBACK_ROUNDS: u32 = 3;

/// Run the Command phase.
pub fn run(
    state: &mut GameState,
    config: &GameConfig,
    _rng: &mut ChaCha8Rng,
    ctx: &mut TurnContext,
    events: &mut Vec<GameEvent>,
) {
    cancel_silent_house_offensives(state);
    apply_fleet_orders(state, ctx, events);
    advance_movement(state, events);
    execute_spy_missions(state, config, ctx, events);
    resolve_colonization(state, ctx, events);
    execute_builds(state, config, ctx);
    execute_transfers(state, config, ctx);
    start_terraform(state, config, ctx);
    apply_research(state, config, ctx);
    apply_espionage_investment(state, config, ctx, events);
    apply_diplomacy(state, ctx, events);
    apply_standing_and_management(state, ctx);
    update_blockades(state);
    auto_seek_home(state);
    cleanup_empty_fleets(state);
}

// ---------------------------------------------------------------------------
// Fleet orders
// ---------------------------------------------------------------------------

/// Autopilot and collapsed houses keep only defensive postures: any
/// offensive or expansion order cancels into SeekHome, which settles into
/// Patrol on arrival.
fn cancel_silent_house_offensives(state: &mut GameState) {
    let silent: Vec<HouseId> = state
        .houses
        .iter()
        .filter(|(_, house)| {
            matches!(
                house.status,
                HouseStatus::Autopilot | HouseStatus::DefensiveCollapse
            )
        })
        .map(|(id, _)| id)
        .collect();
    for house in silent {
        let collapsed = state
            .houses
            .get(house)
            .is_some_and(ec4x_state::House::is_collapsed);
        for fleet_id in state.fleets_of(house) {
            let Some(fleet) = state.fleets.get_mut(fleet_id) else {
                continue;
            };
            let cancel = match fleet.active_order {
                Some(order) => !order.kind.autopilot_permitted(),
                // Collapsed houses recall everything.
                None => collapsed,
            };
            if cancel {
                fleet.active_order = Some(ActiveOrder {
                    kind: FleetCommandKind::SeekHome,
                    target_system: None,
                    target_fleet: None,
                });
            }
        }
    }
}

fn apply_fleet_orders(state: &mut GameState, ctx: &mut TurnContext, events: &mut Vec<GameEvent>) {
    for house in state.house_ids() {
        let mut commands: Vec<FleetCommand> = ctx
            .outcomes
            .get(&house)
            .map(|outcome| outcome.accepted.fleet.clone())
            .unwrap_or_default();
        // Lower priority runs first; the stable sort keeps packet order
        // within a priority band.
        commands.sort_by_key(|command| command.priority);
        for command in commands {
            apply_one_fleet_order(state, ctx, house, &command, events);
        }
    }
}

fn apply_one_fleet_order(
    state: &mut GameState,
    ctx: &mut TurnContext,
    house: HouseId,
    command: &FleetCommand,
    events: &mut Vec<GameEvent>,
) {
    let turn = state.turn;
    match command.kind {
        // Planetary attacks were handled in the Conflict phase.
        FleetCommandKind::Bombard | FleetCommandKind::Invade | FleetCommandKind::Blitz => {}

        FleetCommandKind::Hold => {
            if let Some(fleet) = state.fleets.get_mut(command.fleet) {
                fleet.active_order = None;
            }
        }
        FleetCommandKind::Move
        | FleetCommandKind::Patrol
        | FleetCommandKind::SeekHome
        | FleetCommandKind::Colonize
        | FleetCommandKind::Rendezvous
        | FleetCommandKind::SpyPlanet
        | FleetCommandKind::SpySystem
        | FleetCommandKind::HackStarbase
        | FleetCommandKind::ViewWorld => {
            if let Some(fleet) = state.fleets.get_mut(command.fleet) {
                fleet.active_order = Some(ActiveOrder {
                    kind: command.kind,
                    target_system: command.target_system,
                    target_fleet: command.target_fleet,
                });
            }
        }
        FleetCommandKind::JoinFleet => {
            if let Some(target) = command.target_fleet {
                merge_fleets(state, command.fleet, target);
                events.push(GameEvent::for_house(
                    turn,
                    house,
                    EventPayload::OrderCompleted {
                        fleet: command.fleet,
                    },
                ));
            }
        }
        FleetCommandKind::Salvage => {
            let system = state.fleets.get(command.fleet).map(|f| f.system);
            let credit = system
                .and_then(|s| ctx.wreck_value.remove(&s))
                .unwrap_or(0);
            if credit > 0 {
                if let Some(house_row) = state.houses.get_mut(house) {
                    house_row.treasury = house_row.treasury.saturating_add(credit);
                }
                events.push(GameEvent::for_house(
                    turn,
                    house,
                    EventPayload::OrderCompleted {
                        fleet: command.fleet,
                    },
                ));
            } else {
                events.push(GameEvent::for_house(
                    turn,
                    house,
                    EventPayload::OrderFailed {
                        fleet: command.fleet,
                        detail: "no recoverable wrecks".to_owned(),
                    },
                ));
            }
        }
        FleetCommandKind::Reserve => {
            stand_down(state, command.fleet, ec4x_types::FleetStatus::Reserve);
        }
        FleetCommandKind::Mothball => {
            stand_down(state, command.fleet, ec4x_types::FleetStatus::Mothballed);
        }
    }
}

/// Move every ship of `from` into `into`, then drop the empty shell.
fn merge_fleets(state: &mut GameState, from: FleetId, into: FleetId) {
    let ships: Vec<ec4x_types::ShipId> = state
        .fleets
        .get(from)
        .map(|fleet| fleet.ships.iter().copied().collect())
        .unwrap_or_default();
    for ship_id in &ships {
        if let Some(ship) = state.ships.get_mut(*ship_id) {
            ship.fleet = Some(into);
        }
    }
    if let Some(fleet) = state.fleets.get_mut(into) {
        fleet.ships.extend(ships.iter().copied());
    }
    if let Some(fleet) = state.fleets.get_mut(from) {
        fleet.ships.clear();
    }
    let _ = state.remove_fleet(from);
}

/// Enter reserve or mothballs, auto-merging into the colony's single
/// fleet of that status.
fn stand_down(state: &mut GameState, fleet_id: FleetId, status: ec4x_types::FleetStatus) {
    let Some((owner, system)) = state
        .fleets
        .get(fleet_id)
        .map(|fleet| (fleet.owner, fleet.system))
    else {
        return;
    };
    let existing = state.fleets_at(system).into_iter().find(|other| {
        *other != fleet_id
            && state
                .fleets
                .get(*other)
                .is_some_and(|f| f.owner == owner && f.status == status)
    });
    if let Some(target) = existing {
        merge_fleets(state, fleet_id, target);
    } else if let Some(fleet) = state.fleets.get_mut(fleet_id) {
        fleet.status = status;
        fleet.active_order = None;
    }
}

// ---------------------------------------------------------------------------
// Movement
// ---------------------------------------------------------------------------

/// The destination a fleet's active order currently implies.
fn order_destination(state: &GameState, fleet_id: FleetId) -> Option<SystemId> {
    let fleet = state.fleets.get(fleet_id)?;
    let order = fleet.active_order?;
    match order.kind {
        FleetCommandKind::Move
        | FleetCommandKind::Patrol
        | FleetCommandKind::Colonize
        | FleetCommandKind::SpyPlanet
        | FleetCommandKind::SpySystem
        | FleetCommandKind::HackStarbase
        | FleetCommandKind::Bombard
        | FleetCommandKind::Invade
        | FleetCommandKind::Blitz => order.target_system,
        FleetCommandKind::SeekHome => nearest_owned_colony_system(state, fleet.owner, fleet.system),
        FleetCommandKind::Rendezvous => order
            .target_fleet
            .and_then(|other| state.fleets.get(other))
            .map(|other| other.system),
        _ => None,
    }
}

/// The nearest owned colony system reachable by this house from a start.
fn nearest_owned_colony_system(
    state: &GameState,
    house: HouseId,
    from: SystemId,
) -> Option<SystemId> {
    let mut best: Option<(u32, SystemId)> = None;
    for colony_id in state.colonies_of(house) {
        let Some(colony) = state.colonies.get(colony_id) else {
            continue;
        };
        let Some(jumps) = state
            .map
            .jump_distance(from, colony.system, ec4x_map::FleetProfile::LINE)
        else {
            continue;
        };
        if best.is_none_or(|(d, _)| jumps < d) {
            best = Some((jumps, colony.system));
        }
    }
    best.map(|(_, system)| system)
}

/// Advance every fleet with a movement order one lane along its shortest
/// permitted path. Arrivals settle their orders.
fn advance_movement(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let turn = state.turn;
    let fleet_ids: Vec<FleetId> = state.fleets.ids();
    for fleet_id in fleet_ids {
        let Some(destination) = order_destination(state, fleet_id) else {
            continue;
        };
        let Some(fleet) = state.fleets.get(fleet_id) else {
            continue;
        };
        let owner = fleet.owner;
        let here = fleet.system;

        if here != destination {
            let profile = state.fleet_profile(fleet_id);
            let Some(path) = state.map.shortest_path(here, destination, profile) else {
                events.push(GameEvent::for_house(
                    turn,
                    owner,
                    EventPayload::OrderFailed {
                        fleet: fleet_id,
                        detail: "route closed".to_owned(),
                    },
                ));
                if let Some(fleet) = state.fleets.get_mut(fleet_id) {
                    fleet.active_order = None;
                }
                continue;
            };
            if let Some(&next) = path.get(1) {
                let _ = state.move_fleet(fleet_id, next);
                observe_system(state, owner, next);
                surveillance_check(state, fleet_id, next, events);
            }
        }

        // Settle arrivals.
        let Some(fleet) = state.fleets.get(fleet_id) else {
            continue;
        };
        if fleet.system != destination {
            continue;
        }
        let kind = fleet.active_order.map(|order| order.kind);
        match kind {
            Some(FleetCommandKind::Move | FleetCommandKind::Rendezvous) => {
                if let Some(fleet) = state.fleets.get_mut(fleet_id) {
                    fleet.active_order = None;
                }
                events.push(
                    GameEvent::for_house(turn, owner, EventPayload::FleetArrived { fleet: fleet_id })
                        .at(destination),
                );
            }
            Some(FleetCommandKind::SeekHome) => {
                if let Some(fleet) = state.fleets.get_mut(fleet_id) {
                    fleet.active_order = Some(ActiveOrder {
                        kind: FleetCommandKind::Patrol,
                        target_system: None,
                        target_fleet: None,
                    });
                }
                events.push(
                    GameEvent::for_house(turn, owner, EventPayload::FleetArrived { fleet: fleet_id })
                        .at(destination),
                );
            }
            // Patrol holds station; colonize and spy orders resolve in
            // their own steps.
            _ => {}
        }
    }
}

/// Foreign starbase surveillance challenges a fleet entering its system.
///
/// Detection is deterministic from the turn salt so movement never
/// perturbs the battle RNG draw order. Raider-only fleets can slip
/// through; everything else is logged into the watcher's database.
fn surveillance_check(
    state: &mut GameState,
    fleet_id: FleetId,
    system: SystemId,
    events: &mut Vec<GameEvent>,
) {
    let turn = state.turn;
    let Some(fleet) = state.fleets.get(fleet_id) else {
        return;
    };
    let owner = fleet.owner;
    let ship_count = u32::try_from(fleet.ships.len()).unwrap_or(0);
    let all_raiders = ship_count > 0
        && fleet.ships.iter().all(|id| {
            state
                .ships
                .get(*id)
                .is_some_and(|s| s.class == ShipClass::Raider && !s.is_destroyed())
        });

    let watchers: Vec<HouseId> = state
        .kastras
        .iter()
        .filter(|(_, kastra)| {
            kastra.system == system && kastra.owner != owner && kastra.surveillance_active()
        })
        .map(|(_, kastra)| kastra.owner)
        .collect();

    for watcher in watchers {
        let slipped = all_raiders
            && system_salt(turn, system).wrapping_add(u64::from(fleet_id.into_raw())) % 100 < 60;
        if slipped {
            events.push(
                GameEvent::for_house(turn, owner, EventPayload::RaiderStealthSuccess).at(system),
            );
            continue;
        }
        events.push(
            GameEvent::for_house(turn, watcher, EventPayload::StarbaseSurveillanceDetection)
                .at(system)
                .against(owner),
        );
        state.intel_mut(watcher).record_fleet(ec4x_state::FleetIntel {
            owner,
            system,
            estimated_ships: ship_count,
            exact_composition: None,
            last_seen_turn: turn,
        });
    }
}

/// Record what a moving fleet sees at a system it enters.
fn observe_system(state: &mut GameState, house: HouseId, system: SystemId) {
    let turn = state.turn;
    let snapshot = state.map.system(system).map(|s| {
        (
            s.planet_class,
            s.resource_rating,
        )
    });
    let owner = state
        .colony_at(system)
        .and_then(|id| state.colonies.get(id))
        .map(|c| c.owner);
    if let Some((planet_class, resource_rating)) = snapshot {
        state.intel_mut(house).record_system(
            system,
            VisibilityLevel::Scouted,
            Some(planet_class),
            Some(resource_rating),
            owner,
            turn,
        );
    }
}

// ---------------------------------------------------------------------------
// Spy missions
// ---------------------------------------------------------------------------

/// Scout fleets on station over their targets gather intelligence.
fn execute_spy_missions(
    state: &mut GameState,
    config: &GameConfig,
    _ctx: &TurnContext,
    events: &mut Vec<GameEvent>,
) {
    let turn = state.turn;
    let missions: Vec<(FleetId, FleetCommandKind, SystemId, HouseId)> = state
        .fleets
        .iter()
        .filter_map(|(id, fleet)| {
            let order = fleet.active_order?;
            let target = order.target_system?;
            if order.kind.is_spy_mission() && fleet.system == target {
                Some((id, order.kind, target, fleet.owner))
            } else {
                None
            }
        })
        .collect();

    for (fleet_id, kind, system, house) in missions {
        let colony_owner = state
            .colony_at(system)
            .and_then(|id| state.colonies.get(id))
            .map(|c| c.owner);

        // The watchers notice deep recon more often than a drive-by.
        let base_detect = match kind {
            FleetCommandKind::HackStarbase => 40_i64,
            FleetCommandKind::SpyPlanet => 25,
            _ => 15,
        };
        let detected = colony_owner.is_some_and(|defender| {
            if defender == house {
                return false;
            }
            let cic = state
                .houses
                .get(defender)
                .map_or(1, |h| i64::from(h.tech.counter_intel));
            let clk = state
                .houses
                .get(house)
                .map_or(1, |h| i64::from(h.tech.cloaking));
            let chance = base_detect
                .saturating_add(config.espionage.detection_per_cic.saturating_mul(cic))
                .saturating_sub(config.espionage.detection_per_clk.saturating_mul(clk))
                .clamp(5, 95);
            // Deterministic threshold from the turn salt keeps scout
            // sweeps off the main RNG draw order.
            let roll = i64::try_from(system_salt(turn, system) % 100).unwrap_or(0);
            roll < chance
        });

        if detected && let Some(defender) = colony_owner {
            events.push(
                GameEvent::for_house(turn, defender, EventPayload::ScoutDetected)
                    .at(system)
                    .against(house),
            );
        }

        gather_intel(state, house, system, kind);
        events.push(
            GameEvent::for_house(turn, house, EventPayload::IntelGathered { fleet: fleet_id })
                .at(system),
        );
        if let Some(fleet) = state.fleets.get_mut(fleet_id) {
            fleet.active_order = None;
        }
    }

    // ViewWorld fleets sweep their surroundings without moving.
    let watchers: Vec<(FleetId, SystemId, HouseId)> = state
        .fleets
        .iter()
        .filter_map(|(id, fleet)| {
            let order = fleet.active_order?;
            (order.kind == FleetCommandKind::ViewWorld).then_some((id, fleet.system, fleet.owner))
        })
        .collect();
    for (fleet_id, system, house) in watchers {
        gather_intel(state, house, system, FleetCommandKind::SpySystem);
        for neighbor in state.map.neighbors(system, ec4x_map::FleetProfile::SCOUT) {
            observe_adjacent(state, house, neighbor);
        }
        events.push(
            GameEvent::for_house(turn, house, EventPayload::IntelGathered { fleet: fleet_id })
                .at(system),
        );
        if let Some(fleet) = state.fleets.get_mut(fleet_id) {
            fleet.active_order = None;
        }
    }
}

fn observe_adjacent(state: &mut GameState, house: HouseId, system: SystemId) {
    let turn = state.turn;
    state
        .intel_mut(house)
        .record_system(system, VisibilityLevel::Adjacent, None, None, None, turn);
}

/// Write what a mission learns into the scout owner's database.
fn gather_intel(state: &mut GameState, house: HouseId, system: SystemId, kind: FleetCommandKind) {
    let turn = state.turn;
    let snapshot = state
        .map
        .system(system)
        .map(|s| (s.planet_class, s.resource_rating));
    let colony = state
        .colony_at(system)
        .and_then(|id| state.colonies.get(id))
        .map(|c| {
            (
                c.owner,
                c.population,
                c.industrial_units,
                u32::try_from(c.ground_units.len()).unwrap_or(0),
            )
        });

    // Fleet presence at the system, per foreign owner.
    let mut foreign_ships: BTreeMap<HouseId, u32> = BTreeMap::new();
    for fleet_id in state.fleets_at(system) {
        if let Some(fleet) = state.fleets.get(fleet_id)
            && fleet.owner != house
        {
            let count = u32::try_from(fleet.ships.len()).unwrap_or(0);
            let entry = foreign_ships.entry(fleet.owner).or_insert(0);
            *entry = entry.saturating_add(count);
        }
    }

    let level = if matches!(kind, FleetCommandKind::SpyPlanet | FleetCommandKind::HackStarbase) {
        VisibilityLevel::Observed
    } else {
        VisibilityLevel::Scouted
    };

    let db = state.intel.entry(house).or_default();
    if let Some((planet_class, resource_rating)) = snapshot {
        db.record_system(
            system,
            level,
            Some(planet_class),
            Some(resource_rating),
            colony.map(|(owner, ..)| owner),
            turn,
        );
    }
    // An intel block on the colony's owner keeps estimates out of
    // foreign databases while it holds.
    let blocked = colony.is_some_and(|(owner, ..)| {
        !state
            .active_effects(ec4x_types::EffectKind::IntelBlocked, owner, None)
            .is_empty()
    });
    let db = state.intel.entry(house).or_default();
    if let Some((owner, population, industry, defenses)) = colony
        && owner != house
        && level == VisibilityLevel::Observed
        && !blocked
    {
        db.record_colony(ec4x_state::ColonyIntel {
            owner,
            system,
            estimated_population: Some(population),
            estimated_industry: Some(industry),
            estimated_defenses: Some(defenses),
            last_updated_turn: turn,
        });
    }
    for (owner, ships) in foreign_ships {
        db.record_fleet(ec4x_state::FleetIntel {
            owner,
            system,
            estimated_ships: ships,
            exact_composition: None,
            last_seen_turn: turn,
        });
    }
}

// ---------------------------------------------------------------------------
// Colonization
// ---------------------------------------------------------------------------

struct ColonizeIntent {
    fleet: FleetId,
    house: HouseId,
    target: SystemId,
}

/// Simultaneous colonization with the deterministic tiebreak, then up to
/// three fallback sub-rounds for the losers.
fn resolve_colonization(state: &mut GameState, _ctx: &TurnContext, events: &mut Vec<GameEvent>) {
    let turn = state.turn;

    let mut intents: Vec<ColonizeIntent> = state
        .fleets
        .iter()
        .filter_map(|(id, fleet)| {
            let order = fleet.active_order?;
            let target = order.target_system?;
            (order.kind == FleetCommandKind::Colonize && fleet.system == target).then_some(
                ColonizeIntent {
                    fleet: id,
                    house: fleet.owner,
                    target,
                },
            )
        })
        .collect();

    for round in 0..=FALLBACK_ROUNDS {
        if intents.is_empty() {
            break;
        }

        // Group by target system.
        let mut by_target: BTreeMap<SystemId, Vec<usize>> = BTreeMap::new();
        for (index, intent) in intents.iter().enumerate() {
            by_target.entry(intent.target).or_default().push(index);
        }

        let mut losers: Vec<usize> = Vec::new();
        for (system, contenders) in by_target {
            // Winner: strength descending, then house id ascending.
            let mut ranked: Vec<(i64, HouseId, usize)> = contenders
                .iter()
                .filter_map(|index| {
                    let intent = intents.get(*index)?;
                    let strength = ec4x_rules::combat::fleet_strength(state, intent.fleet);
                    Some((strength, intent.house, *index))
                })
                .collect();
            ranked.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
            let Some(&(_, _, winner_index)) = ranked.first() else {
                continue;
            };

            if let Some(winner) = intents.get(winner_index) {
                found_colony_from_fleet(state, winner.fleet, winner.house, system, round, events);
            }
            for &(_, _, index) in ranked.iter().skip(1) {
                if let Some(loser) = intents.get(index) {
                    events.push(
                        GameEvent::for_house(
                            turn,
                            loser.house,
                            EventPayload::OrderFailed {
                                fleet: loser.fleet,
                                detail: "lost colonization race".to_owned(),
                            },
                        )
                        .at(system),
                    );
                }
                losers.push(index);
            }
        }

        // Losers scan for a fallback target.
        let mut next_round: Vec<ColonizeIntent> = Vec::new();
        for index in losers {
            let Some(intent) = intents.get(index) else {
                continue;
            };
            let fleet = intent.fleet;
            let house = intent.house;
            match fallback_target(state, fleet) {
                Some(target) if round < FALLBACK_ROUNDS => {
                    let _ = state.move_fleet(fleet, target);
                    if let Some(fleet_row) = state.fleets.get_mut(fleet) {
                        fleet_row.active_order = Some(ActiveOrder {
                            kind: FleetCommandKind::Colonize,
                            target_system: Some(target),
                            target_fleet: None,
                        });
                    }
                    next_round.push(ColonizeIntent {
                        fleet,
                        house,
                        target,
                    });
                }
                _ => {
                    events.push(GameEvent::for_house(turn, house, EventPayload::NoViableTarget));
                    if let Some(fleet_row) = state.fleets.get_mut(fleet) {
                        fleet_row.active_order = None;
                    }
                }
            }
        }
        intents = next_round;
    }
}

/// The nearest uncolonized settler-grade system within scan range. Ties
/// at equal distance break on the per-system turn salt.
fn fallback_target(state: &GameState, fleet_id: FleetId) -> Option<SystemId> {
    let fleet = state.fleets.get(fleet_id)?;
    let profile = state.fleet_profile(fleet_id);
    let turn = state.turn;
    let mut best: Option<(u32, u64, SystemId)> = None;
    for candidate in state
        .map
        .systems_within(fleet.system, FALLBACK_SCAN_RANGE, profile)
    {
        if state.colony_at(candidate).is_some() {
            continue;
        }
        let acceptable = state
            .map
            .system(candidate)
            .is_some_and(|s| validation::fallback_class_acceptable(s.planet_class));
        if !acceptable {
            continue;
        }
        let jumps = state
            .map
            .jump_distance(fleet.system, candidate, profile)
            .unwrap_or(u32::MAX);
        let salt = system_salt(turn, candidate);
        if best.is_none_or(|(d, s, _)| (jumps, salt) < (d, s)) {
            best = Some((jumps, salt, candidate));
        }
    }
    best.map(|(_, _, system)| system)
}

/// Deposit the settler cargo: the expansion hull is consumed into the
/// new colony's infrastructure, extra colonists land as loose PTU.
fn found_colony_from_fleet(
    state: &mut GameState,
    fleet_id: FleetId,
    house: HouseId,
    system: SystemId,
    round: u32,
    events: &mut Vec<GameEvent>,
) {
    let turn = state.turn;
    let Some(colony_id) = state.found_colony(house, system, 50) else {
        return;
    };

    // Every expansion or auxiliary hull with colonists lands its cargo;
    // expansion hulls are consumed.
    let settlers: Vec<ec4x_types::ShipId> = state
        .fleets
        .get(fleet_id)
        .map(|fleet| fleet.ships.iter().copied().collect())
        .unwrap_or_default();
    let mut landed_ptu = 0_u32;
    for ship_id in settlers {
        let Some(ship) = state.ships.get(ship_id) else {
            continue;
        };
        if ship.colonists == 0 {
            continue;
        }
        landed_ptu = landed_ptu.saturating_add(ship.colonists);
        let consumed = ship.class == ShipClass::Etac;
        if let Some(ship) = state.ships.get_mut(ship_id) {
            ship.colonists = 0;
        }
        if consumed {
            let _ = state.remove_ship(ship_id);
            if let Some(colony) = state.colonies.get_mut(colony_id) {
                colony.infrastructure = colony.infrastructure.saturating_add(1);
            }
        }
    }

    // The foundation is 3 PU; landed cargo beyond it stays as loose PTU.
    let foundation_ptu = ec4x_state::FOUNDING_PU.saturating_mul(PTU_PER_PU);
    if let Some(colony) = state.colonies.get_mut(colony_id) {
        colony.ptu = colony
            .ptu
            .saturating_add(landed_ptu.saturating_sub(foundation_ptu));
    }

    state.intel_mut(house).record_system(
        system,
        VisibilityLevel::Owned,
        None,
        None,
        Some(house),
        turn,
    );

    events.push(
        GameEvent::for_house(turn, house, EventPayload::ColonyEstablished { colony: colony_id })
            .at(system),
    );
    if round > 0 {
        events.push(
            GameEvent::for_house(
                turn,
                house,
                EventPayload::FallbackColonySuccess { settled: system },
            )
            .at(system),
        );
    }
    debug!(%house, %system, round, "colony established");
}

// ---------------------------------------------------------------------------
// Builds
// ---------------------------------------------------------------------------

/// Create construction projects and assign docks.
fn execute_builds(state: &mut GameState, config: &GameConfig, ctx: &TurnContext) {
    for house in state.house_ids() {
        let builds: Vec<ec4x_types::BuildCommand> = ctx
            .outcomes
            .get(&house)
            .map(|outcome| outcome.accepted.builds.clone())
            .unwrap_or_default();
        for command in builds {
            let per_unit_quantity = match command.item {
                BuildItem::Ship(_) | BuildItem::Ground(_) => command.quantity.max(1),
                BuildItem::Facility(_) | BuildItem::IndustrialUnits => 1,
            };
            for _ in 0..per_unit_quantity {
                queue_project(state, config, command.colony, command.item);
            }
        }
    }
}

/// Queue one project, assigning a dock where the item needs one.
fn queue_project(state: &mut GameState, config: &GameConfig, colony_id: ColonyId, item: BuildItem) {
    let needs_dock = matches!(item, BuildItem::Ship(_));
    let dock = if needs_dock {
        choose_dock(state, colony_id)
    } else {
        None
    };
    let quantity_cost = budget::build_cost(state, config, colony_id, item, 1);
    let turns = budget::build_turns(config, item);
    let project_id = state.projects.insert_with(|id| Project {
        id,
        colony: colony_id,
        kind: ProjectKind::Construction(item),
        total_cost: quantity_cost,
        paid: 0,
        turns_remaining: turns,
        dock,
    });
    if let Some(colony) = state.colonies.get_mut(colony_id) {
        colony.construction_queue.push(project_id);
    }
    debug!(%colony_id, ?item, %project_id, "construction queued");
}

/// Pick the dock for a new ship project: shipyards before spaceports,
/// round-robin by most free docks, ascending id as the final tiebreak.
/// Returns `None` when every dock is busy; the project then waits queued.
pub(crate) fn choose_dock(state: &GameState, colony_id: ColonyId) -> Option<NeoriaId> {
    let colony = state.colonies.get(colony_id)?;
    let mut best: Option<(u8, u32, NeoriaId)> = None;
    for neoria_id in &colony.neorias {
        let Some(neoria) = state.neorias.get(*neoria_id) else {
            continue;
        };
        if !neoria.can_construct() {
            continue;
        }
        let free = neoria
            .usable_docks()
            .saturating_sub(state.occupied_docks(*neoria_id));
        if free == 0 {
            continue;
        }
        // Lower rank wins: shipyards first, then the most free docks.
        let rank = if neoria.class == ec4x_types::NeoriaClass::Shipyard {
            0
        } else {
            1
        };
        let better = match best {
            None => true,
            Some((best_rank, best_free, _)) => {
                (rank, std::cmp::Reverse(free)) < (best_rank, std::cmp::Reverse(best_free))
            }
        };
        if better {
            best = Some((rank, free, *neoria_id));
        }
    }
    best.map(|(_, _, id)| id)
}

// ---------------------------------------------------------------------------
// Transfers, terraforming
// ---------------------------------------------------------------------------

/// Create population-in-transit packets: cost debited, source debited.
fn execute_transfers(state: &mut GameState, config: &GameConfig, ctx: &TurnContext) {
    for house in state.house_ids() {
        let transfers: Vec<ec4x_types::PopulationTransferCommand> = ctx
            .outcomes
            .get(&house)
            .map(|outcome| outcome.accepted.transfers.clone())
            .unwrap_or_default();
        for command in transfers {
            let cost =
                budget::transfer_cost(state, config, command.source, command.destination, command.ptu);
            let jumps = budget::transfer_jumps(state, command.source, command.destination).max(1);

            if !debit_population(state, command.source, command.ptu) {
                continue;
            }
            if let Some(house_row) = state.houses.get_mut(house) {
                house_row.treasury = house_row.treasury.saturating_sub(cost);
            }
            let arrival_turn = state.turn.saturating_add(jumps);
            let _ = state.transits.insert_with(|id| PopulationInTransit {
                id,
                owner: house,
                source: command.source,
                destination: command.destination,
                ptu: command.ptu,
                cost_paid: cost,
                arrival_turn,
            });
            debug!(%house, ptu = command.ptu, arrival_turn, "population lifted");
        }
    }
}

/// Take PTU out of a colony, converting PU to loose PTU as needed.
fn debit_population(state: &mut GameState, colony_id: ColonyId, ptu: u32) -> bool {
    let Some(colony) = state.colonies.get_mut(colony_id) else {
        return false;
    };
    if u64::from(ptu) > colony.population_ptu().saturating_sub(u64::from(PTU_PER_PU)) {
        return false;
    }
    while colony.ptu < ptu && colony.population > 1 {
        colony.population -= 1;
        colony.ptu = colony.ptu.saturating_add(PTU_PER_PU);
    }
    if colony.ptu < ptu {
        return false;
    }
    colony.ptu -= ptu;
    true
}

/// Queue terraform projects.
fn start_terraform(state: &mut GameState, config: &GameConfig, ctx: &TurnContext) {
    for house in state.house_ids() {
        let commands: Vec<ec4x_types::TerraformCommand> = ctx
            .outcomes
            .get(&house)
            .map(|outcome| outcome.accepted.terraform.clone())
            .unwrap_or_default();
        for command in commands {
            let target = state
                .colonies
                .get(command.colony)
                .and_then(|colony| state.map.system(colony.system))
                .and_then(|system| system.planet_class.improved());
            let Some(target) = target else {
                continue;
            };
            let cost = config.terraform.cost_for(target);
            let turns = config.terraform.duration_turns;
            let project_id = state.projects.insert_with(|id| Project {
                id,
                colony: command.colony,
                kind: ProjectKind::Terraform { target },
                total_cost: cost,
                paid: 0,
                turns_remaining: turns,
                dock: None,
            });
            if let Some(colony) = state.colonies.get_mut(command.colony) {
                colony.terraform_project = Some(project_id);
            }
            debug!(colony = %command.colony, ?target, "terraforming started");
        }
    }
}

// ---------------------------------------------------------------------------
// Research, espionage investment, diplomacy, administration
// ---------------------------------------------------------------------------

fn apply_research(state: &mut GameState, config: &GameConfig, ctx: &TurnContext) {
    for house_id in state.house_ids() {
        let Some(outcome) = ctx.outcomes.get(&house_id) else {
            continue;
        };
        let mut allocation = outcome.accepted.research.clone();
        let spent = allocation.total_pp();
        // A compromised science program accrues SRP at a discount, but
        // the PP are spent regardless.
        for effect in state.active_effects(ec4x_types::EffectKind::SrpReduction, house_id, None) {
            allocation.srp_pp = allocation
                .srp_pp
                .saturating_mul(100_i64.saturating_sub(effect.magnitude).max(0))
                / 100;
        }
        if let Some(house) = state.houses.get_mut(house_id) {
            house.treasury = house.treasury.saturating_sub(spent);
            research::apply_allocation(house, config, &allocation);
        }
    }
}

fn apply_espionage_investment(
    state: &mut GameState,
    config: &GameConfig,
    ctx: &mut TurnContext,
    events: &mut Vec<GameEvent>,
) {
    for house_id in state.house_ids() {
        let Some(outcome) = ctx.outcomes.get(&house_id) else {
            continue;
        };
        let ebp = outcome.accepted.ebp_investment;
        let cip = outcome.accepted.cip_investment;
        let bought = ebp.saturating_add(cip);
        if bought == 0 {
            continue;
        }
        let cost = i64::from(bought).saturating_mul(config.espionage.pp_per_point);
        if let Some(house) = state.houses.get_mut(house_id) {
            house.treasury = house.treasury.saturating_sub(cost);
            house.espionage.ebp = house.espionage.ebp.saturating_add(ebp);
            house.espionage.cip = house.espionage.cip.saturating_add(cip);
            house.espionage.bought_this_turn = bought;
            house.espionage.cumulative_invested =
                house.espionage.cumulative_invested.saturating_add(cost);
        }
        espionage::over_investment_penalty(state, config, house_id, bought, events);
    }
}

fn apply_diplomacy(state: &mut GameState, ctx: &TurnContext, events: &mut Vec<GameEvent>) {
    for house_id in state.house_ids() {
        let commands: Vec<ec4x_types::DiplomaticCommand> = ctx
            .outcomes
            .get(&house_id)
            .map(|outcome| outcome.accepted.diplomatic.clone())
            .unwrap_or_default();
        for command in commands {
            diplomacy::execute_command(state, house_id, &command, events);
        }
    }
}

fn apply_standing_and_management(state: &mut GameState, ctx: &TurnContext) {
    for house_id in state.house_ids() {
        let Some(outcome) = ctx.outcomes.get(&house_id) else {
            continue;
        };
        for (fleet_id, order) in &outcome.accepted.standing {
            if let Some(fleet) = state.fleets.get_mut(*fleet_id) {
                fleet.standing_order = Some(*order);
            }
        }
        for command in &outcome.accepted.colony_management {
            if let Some(colony) = state.colonies.get_mut(command.colony) {
                match command.directive {
                    ColonyDirective::SetTaxRate(rate) => colony.tax_rate = rate.min(100),
                    ColonyDirective::SetAutoRepair(enabled) => colony.auto_repair = enabled,
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// End-of-phase bookkeeping
// ---------------------------------------------------------------------------

/// Update colony blockade state from hostile blockading fleets.
fn update_blockades(state: &mut GameState) {
    let colonies: Vec<(ColonyId, SystemId, HouseId)> = state
        .colonies
        .iter()
        .map(|(id, colony)| (id, colony.system, colony.owner))
        .collect();
    for (colony_id, system, owner) in colonies {
        let blockader = state.fleets_at(system).into_iter().find_map(|fleet_id| {
            let fleet = state.fleets.get(fleet_id)?;
            let hostile = fleet.owner != owner
                && state.diplomacy.state_of(fleet.owner, owner).triggers_combat()
                && fleet.standing_order == Some(StandingOrderKind::Blockade);
            hostile.then_some(fleet.owner)
        });
        if let Some(colony) = state.colonies.get_mut(colony_id) {
            colony.blockade = match (colony.blockade, blockader) {
                (Some(existing), Some(by)) if existing.by == by => Some(Blockade {
                    by,
                    turns: existing.turns.saturating_add(1),
                }),
                (_, Some(by)) => Some(Blockade { by, turns: 1 }),
                (_, None) => None,
            };
        }
    }
}

/// Fleets parked under hostile guns reroute home when their standing
/// order allows it.
fn auto_seek_home(state: &mut GameState) {
    let candidates: Vec<FleetId> = state
        .fleets
        .iter()
        .filter(|(_, fleet)| fleet.standing_order == Some(StandingOrderKind::AutoSeekHome))
        .map(|(id, _)| id)
        .collect();
    for fleet_id in candidates {
        let Some(fleet) = state.fleets.get(fleet_id) else {
            continue;
        };
        let threatened = state.fleets_at(fleet.system).iter().any(|other| {
            state.fleets.get(*other).is_some_and(|f| {
                f.owner != fleet.owner
                    && state
                        .diplomacy
                        .state_of(fleet.owner, f.owner)
                        .triggers_combat()
            })
        });
        if threatened && let Some(fleet) = state.fleets.get_mut(fleet_id) {
            fleet.active_order = Some(ActiveOrder {
                kind: FleetCommandKind::SeekHome,
                target_system: None,
                target_fleet: None,
            });
        }
    }
}

/// No fleet with zero ships survives the Command phase.
fn cleanup_empty_fleets(state: &mut GameState) {
    let empty: Vec<FleetId> = state
        .fleets
        .iter()
        .filter(|(_, fleet)| fleet.ships.is_empty())
        .map(|(id, _)| id)
        .collect();
    for fleet_id in empty {
        let _ = state.remove_fleet(fleet_id);
    }
}
