//! Multi-house battle resolution for the space and orbital theaters.
//!
//! Every system holding fleets from two or more houses whose pairwise
//! diplomatic state triggers combat becomes one [`MultiHouseBattle`]. Each
//! participating house's fleets are aggregated into a
//! [`HouseCombatForce`]; theaters resolve Space first, then Orbital when a
//! defended colony with starbases is on the scene. Planetary combat runs
//! separately, driven by explicit bombardment and invasion orders.
//!
//! Determinism: forces are built and fire in ascending house id; hits are
//! soaked in ascending ship-class priority with ascending ship id as the
//! tiebreak; every roll draws from the turn RNG in this fixed order.

use std::collections::BTreeMap;

use ec4x_events::{EventPayload, GameEvent};
use ec4x_state::GameState;
use ec4x_types::{
    CerOutcome, CombatState, DetectionOutcome, FleetId, HouseId, KastraId, PrestigeTier, ShipId,
    StandingOrderKind, SystemId, Theater,
};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::combat::cer;
use crate::combat::detection::detection_outcome;
use crate::config::GameConfig;

/// One house's aggregated combat force in a system battle.
#[derive(Debug, Clone)]
pub struct HouseCombatForce {
    /// The house.
    pub house: HouseId,
    /// Its fleets on the scene, ascending.
    pub fleets: Vec<FleetId>,
    /// The house's ELI level.
    pub eli: u8,
    /// The house's CLK level.
    pub clk: u8,
    /// Morale die-roll modifier from the prestige tier.
    pub morale_drm: i32,
    /// Whether the house owns the colony here.
    pub home_defense: bool,
    /// Detection outcome rolled for this force as an attacker.
    pub detection: DetectionOutcome,
}

/// A battle grouping every engaged house at one system.
#[derive(Debug, Clone)]
pub struct MultiHouseBattle {
    /// Where the battle is.
    pub system: SystemId,
    /// The engaged forces, ascending house id.
    pub forces: Vec<HouseCombatForce>,
}

/// Collect every system that hosts a battle this turn.
///
/// A system qualifies when fleets of at least two houses are present and
/// some pairwise diplomatic state between present houses triggers combat.
/// Pacted (Ally) pairs never fight.
#[must_use]
pub fn collect_battle_systems(state: &GameState) -> Vec<SystemId> {
    let mut out = Vec::new();
    for system in state.map.systems() {
        let mut houses: Vec<HouseId> = Vec::new();
        for fleet_id in state.fleets_at(system.id) {
            if let Some(fleet) = state.fleets.get(fleet_id)
                && !houses.contains(&fleet.owner)
            {
                houses.push(fleet.owner);
            }
        }
        if houses.len() < 2 {
            continue;
        }
        let mut engaged = false;
        for (i, a) in houses.iter().enumerate() {
            for b in houses.iter().skip(i + 1) {
                if state.diplomacy.state_of(*a, *b).triggers_combat() {
                    engaged = true;
                }
            }
        }
        if engaged {
            out.push(system.id);
        }
    }
    out
}

/// Build the battle grouping for a system.
#[must_use]
pub fn build_battle(state: &GameState, config: &GameConfig, system: SystemId) -> MultiHouseBattle {
    let colony_owner = state
        .colony_at(system)
        .and_then(|id| state.colonies.get(id))
        .map(|colony| colony.owner);

    let mut fleets_by_house: BTreeMap<HouseId, Vec<FleetId>> = BTreeMap::new();
    for fleet_id in state.fleets_at(system) {
        if let Some(fleet) = state.fleets.get(fleet_id) {
            fleets_by_house.entry(fleet.owner).or_default().push(fleet_id);
        }
    }

    let defender_has_starbase = starbases_at(state, system).iter().any(|id| {
        state
            .kastras
            .get(*id)
            .is_some_and(ec4x_state::Kastra::surveillance_active)
    });

    let mut forces = Vec::new();
    for (house, fleets) in fleets_by_house {
        let (eli, clk, prestige) = state
            .houses
            .get(house)
            .map_or((1, 1, 0), |h| (h.tech.electronic_intel, h.tech.cloaking, h.prestige));
        // Detection is rolled against the best hostile sensor grid.
        let best_hostile_eli = best_hostile_eli(state, &forces_houses(state, system, house));
        let morale_index = tier_index(PrestigeTier::from_prestige(prestige));
        let morale_drm = config
            .combat
            .morale_drm
            .get(morale_index)
            .copied()
            .unwrap_or(0);
        forces.push(HouseCombatForce {
            house,
            fleets,
            eli,
            clk,
            morale_drm,
            home_defense: colony_owner == Some(house),
            detection: detection_outcome(clk, best_hostile_eli, defender_has_starbase),
        });
    }

    MultiHouseBattle { system, forces }
}

const fn tier_index(tier: PrestigeTier) -> usize {
    tier as usize
}

/// Successful detection (ambush or surprise) exposes the exact hostile
/// composition to the detecting house's intel database.
fn record_battle_intel(state: &mut GameState, battle: &MultiHouseBattle) {
    let turn = state.turn;
    let system = battle.system;
    let mut recordings: Vec<(HouseId, ec4x_state::FleetIntel)> = Vec::new();

    for force in &battle.forces {
        if force.detection == DetectionOutcome::Intercept {
            continue;
        }
        for other in &battle.forces {
            if other.house == force.house
                || !state
                    .diplomacy
                    .state_of(force.house, other.house)
                    .triggers_combat()
            {
                continue;
            }
            let mut composition: BTreeMap<ec4x_types::ShipClass, u32> = BTreeMap::new();
            let mut total = 0_u32;
            for fleet_id in &other.fleets {
                let Some(fleet) = state.fleets.get(*fleet_id) else {
                    continue;
                };
                for ship_id in &fleet.ships {
                    if let Some(ship) = state.ships.get(*ship_id)
                        && !ship.is_destroyed()
                    {
                        let entry = composition.entry(ship.class).or_insert(0);
                        *entry = entry.saturating_add(1);
                        total = total.saturating_add(1);
                    }
                }
            }
            recordings.push((
                force.house,
                ec4x_state::FleetIntel {
                    owner: other.house,
                    system,
                    estimated_ships: total,
                    exact_composition: Some(composition),
                    last_seen_turn: turn,
                },
            ));
        }
    }

    for (viewer, sighting) in recordings {
        state.intel_mut(viewer).record_fleet(sighting);
    }
}

fn forces_houses(state: &GameState, system: SystemId, except: HouseId) -> Vec<HouseId> {
    let mut houses = Vec::new();
    for fleet_id in state.fleets_at(system) {
        if let Some(fleet) = state.fleets.get(fleet_id)
            && fleet.owner != except
            && state.diplomacy.state_of(except, fleet.owner).triggers_combat()
            && !houses.contains(&fleet.owner)
        {
            houses.push(fleet.owner);
        }
    }
    houses
}

fn best_hostile_eli(state: &GameState, hostiles: &[HouseId]) -> u8 {
    hostiles
        .iter()
        .filter_map(|house| state.houses.get(*house))
        .map(|house| house.tech.electronic_intel)
        .max()
        .unwrap_or(1)
}

/// Starbases present at a system, ascending.
#[must_use]
pub fn starbases_at(state: &GameState, system: SystemId) -> Vec<KastraId> {
    state
        .kastras
        .iter()
        .filter(|(_, kastra)| kastra.system == system)
        .map(|(id, _)| id)
        .collect()
}

/// Resolve the Space and Orbital theaters of one battle.
///
/// Ship combat state is the only persistent mutation; destroyed ships and
/// starbases are removed at the end of each theater.
pub fn resolve_battle(
    state: &mut GameState,
    config: &GameConfig,
    rng: &mut ChaCha8Rng,
    system: SystemId,
    events: &mut Vec<GameEvent>,
) {
    let battle = build_battle(state, config, system);
    if battle.forces.len() < 2 {
        return;
    }
    record_battle_intel(state, &battle);
    let turn = state.turn;
    let participants: Vec<HouseId> = battle.forces.iter().map(|f| f.house).collect();
    events.push(
        GameEvent::global(
            turn,
            EventPayload::BattleOccurred {
                participants: participants.clone(),
            },
        )
        .at(system),
    );
    debug!(%system, houses = participants.len(), "battle begins");

    run_theater(state, config, rng, &battle, Theater::Space, events);

    // The orbital theater engages when a defended colony's starbases are
    // still on station and hostiles remain.
    let defended = starbases_at(state, system).iter().any(|id| {
        state
            .kastras
            .get(*id)
            .is_some_and(|k| !matches!(k.combat_state, CombatState::Destroyed))
    });
    if defended && hostile_attackers_remain(state, system) {
        run_theater(state, config, rng, &battle, Theater::Orbital, events);
    }
}

fn hostile_attackers_remain(state: &GameState, system: SystemId) -> bool {
    let Some(colony_owner) = state
        .colony_at(system)
        .and_then(|id| state.colonies.get(id))
        .map(|c| c.owner)
    else {
        return false;
    };
    state.fleets_at(system).iter().any(|fleet_id| {
        state.fleets.get(*fleet_id).is_some_and(|fleet| {
            fleet.owner != colony_owner
                && state
                    .diplomacy
                    .state_of(fleet.owner, colony_owner)
                    .triggers_combat()
                && fleet_strength(state, *fleet_id) > 0
        })
    })
}

/// Aggregate effective attack of a fleet's live ships, WEP-scaled.
#[must_use]
pub fn fleet_strength(state: &GameState, fleet_id: FleetId) -> i64 {
    state.fleets.get(fleet_id).map_or(0, |fleet| {
        fleet
            .ships
            .iter()
            .filter_map(|id| state.ships.get(*id))
            .filter(|ship| !ship.is_destroyed())
            .map(|ship| {
                cer::wep_scaled_attack(ship.effective_attack(), ship.stats.wep_at_build, 10)
            })
            .sum()
    })
}

fn run_theater(
    state: &mut GameState,
    config: &GameConfig,
    rng: &mut ChaCha8Rng,
    battle: &MultiHouseBattle,
    theater: Theater,
    events: &mut Vec<GameEvent>,
) {
    let turn = state.turn;
    let system = battle.system;
    events.push(GameEvent::global(turn, EventPayload::CombatTheaterBegan { theater }).at(system));

    let mut rounds = 0;
    for round in 1..=config.combat.max_space_rounds {
        if !two_sides_standing(state, battle) {
            break;
        }
        rounds = round;
        events.push(
            GameEvent::global(turn, EventPayload::CombatPhaseBegan { theater, round }).at(system),
        );
        fire_round(state, config, rng, battle, theater, round, events);
        evaluate_retreats(state, config, battle, events);
        events.push(
            GameEvent::global(turn, EventPayload::CombatPhaseCompleted { theater, round })
                .at(system),
        );
    }

    sweep_destroyed(state, battle, events);
    events.push(
        GameEvent::global(
            turn,
            EventPayload::CombatTheaterCompleted { theater, rounds },
        )
        .at(system),
    );
}

/// Whether at least two mutually hostile forces still have fighting ships.
fn two_sides_standing(state: &GameState, battle: &MultiHouseBattle) -> bool {
    let standing: Vec<HouseId> = battle
        .forces
        .iter()
        .filter(|force| {
            force_attack(state, battle.system, force) > 0
                || force_has_ships(state, battle.system, force)
        })
        .map(|force| force.house)
        .collect();
    let mut pairs = false;
    for (i, a) in standing.iter().enumerate() {
        for b in standing.iter().skip(i + 1) {
            if state.diplomacy.state_of(*a, *b).triggers_combat() {
                pairs = true;
            }
        }
    }
    pairs
}

/// Fleets that retreated mid-battle no longer count for their force.
fn force_has_ships(state: &GameState, system: SystemId, force: &HouseCombatForce) -> bool {
    force.fleets.iter().any(|fleet_id| {
        state.fleets.get(*fleet_id).is_some_and(|fleet| {
            fleet.system == system
                && fleet
                    .ships
                    .iter()
                    .any(|id| state.ships.get(*id).is_some_and(|s| !s.is_destroyed()))
        })
    })
}

fn force_attack(state: &GameState, system: SystemId, force: &HouseCombatForce) -> i64 {
    force
        .fleets
        .iter()
        .filter(|fleet_id| {
            state
                .fleets
                .get(**fleet_id)
                .is_some_and(|fleet| fleet.system == system)
        })
        .map(|fleet_id| fleet_strength(state, *fleet_id))
        .sum()
}

/// Mean WEP-scaled attack per live ship in a force, the CER weapon
/// strength.
fn force_mean_attack(state: &GameState, system: SystemId, force: &HouseCombatForce) -> i64 {
    let mut total = 0_i64;
    let mut count = 0_i64;
    for fleet_id in &force.fleets {
        let Some(fleet) = state.fleets.get(*fleet_id) else {
            continue;
        };
        if fleet.system != system {
            continue;
        }
        for ship_id in &fleet.ships {
            if let Some(ship) = state.ships.get(*ship_id)
                && !ship.is_destroyed()
            {
                total = total.saturating_add(cer::wep_scaled_attack(
                    ship.effective_attack(),
                    ship.stats.wep_at_build,
                    10,
                ));
                count += 1;
            }
        }
    }
    if count == 0 { 0 } else { total / count }
}

/// One round of fire: shooters act in ascending house id, distributing
/// hits evenly across hostile forces (the default targeting matrix).
#[allow(clippy::too_many_arguments)]
fn fire_round(
    state: &mut GameState,
    config: &GameConfig,
    rng: &mut ChaCha8Rng,
    battle: &MultiHouseBattle,
    theater: Theater,
    round: u32,
    events: &mut Vec<GameEvent>,
) {
    let turn = state.turn;
    let system = battle.system;

    for force in &battle.forces {
        let hostiles: Vec<&HouseCombatForce> = battle
            .forces
            .iter()
            .filter(|other| {
                other.house != force.house
                    && state
                        .diplomacy
                        .state_of(force.house, other.house)
                        .triggers_combat()
                    && force_has_ships(state, system, other)
            })
            .collect();
        if hostiles.is_empty() {
            continue;
        }
        let total_attack = force_attack(state, system, force);
        if total_attack <= 0 {
            continue;
        }
        let drm = force.morale_drm
            + if round == 1 {
                force.detection.round_one_drm()
            } else {
                0
            };
        let mean_attack = force_mean_attack(state, system, force);
        let share = total_attack / i64::try_from(hostiles.len()).unwrap_or(1).max(1);
        let hits = u32::try_from(share.max(0)).unwrap_or(0);
        events.push(
            GameEvent::for_house(turn, force.house, EventPayload::WeaponFired { hits })
                .at(system),
        );

        let targets: Vec<HouseId> = hostiles.iter().map(|h| h.house).collect();
        for target_house in targets {
            let Some(target_force) = battle.forces.iter().find(|f| f.house == target_house)
            else {
                continue;
            };
            allocate_hits(
                state, config, rng, system, force, target_force, hits, mean_attack, drm, events,
            );
        }
    }

    // Orbital theater: starbases and stationed fighters return fire at
    // hostile forces.
    if theater == Theater::Orbital {
        starbase_fire(state, config, rng, battle, events);
        fighter_defense(state, config, rng, battle, events);
    }
}

/// Colony-stationed fighters scramble in defense of their home orbit.
fn fighter_defense(
    state: &mut GameState,
    config: &GameConfig,
    rng: &mut ChaCha8Rng,
    battle: &MultiHouseBattle,
    events: &mut Vec<GameEvent>,
) {
    let turn = state.turn;
    let system = battle.system;
    let Some((colony_id, owner)) = state
        .colony_at(system)
        .and_then(|id| state.colonies.get(id).map(|c| (id, c.owner)))
    else {
        return;
    };

    let mut fighters = 0_u32;
    let mut attack = 0_i64;
    for (_, ship) in state.ships.iter() {
        if ship.stationed_colony == Some(colony_id) && !ship.is_destroyed() {
            fighters = fighters.saturating_add(1);
            attack = attack.saturating_add(cer::wep_scaled_attack(
                ship.effective_attack(),
                ship.stats.wep_at_build,
                config.combat.wep_percent_step,
            ));
        }
    }
    if fighters == 0 || attack <= 0 {
        return;
    }

    let hostile_houses: Vec<HouseId> = battle
        .forces
        .iter()
        .filter(|force| {
            force.house != owner
                && state.diplomacy.state_of(owner, force.house).triggers_combat()
                && force_has_ships(state, system, force)
        })
        .map(|force| force.house)
        .collect();
    if hostile_houses.is_empty() {
        return;
    }

    events.push(
        GameEvent::for_house(turn, owner, EventPayload::FighterEngagement { fighters })
            .at(system),
    );

    let share = attack / i64::try_from(hostile_houses.len()).unwrap_or(1).max(1);
    let hits = u32::try_from(share.max(0)).unwrap_or(0);
    let shooter = HouseCombatForce {
        house: owner,
        fleets: Vec::new(),
        eli: 1,
        clk: 1,
        morale_drm: 0,
        home_defense: true,
        detection: DetectionOutcome::Intercept,
    };
    for target_house in hostile_houses {
        if let Some(target) = battle.forces.iter().find(|f| f.house == target_house) {
            allocate_hits(
                state, config, rng, system, &shooter, target, hits, attack, 0, events,
            );
        }
    }
}

/// Soak order for a force: live ships ascending (class priority, id).
fn soak_order(state: &GameState, system: SystemId, force: &HouseCombatForce) -> Vec<ShipId> {
    let mut ships: Vec<(ec4x_types::ShipClass, ShipId)> = Vec::new();
    for fleet_id in &force.fleets {
        let Some(fleet) = state.fleets.get(*fleet_id) else {
            continue;
        };
        if fleet.system != system {
            continue;
        }
        for ship_id in &fleet.ships {
            if let Some(ship) = state.ships.get(*ship_id)
                && !ship.is_destroyed()
            {
                ships.push((ship.class, *ship_id));
            }
        }
    }
    ships.sort_unstable();
    ships.into_iter().map(|(_, id)| id).collect()
}

#[allow(clippy::too_many_arguments)]
fn allocate_hits(
    state: &mut GameState,
    config: &GameConfig,
    rng: &mut ChaCha8Rng,
    system: SystemId,
    shooter: &HouseCombatForce,
    target: &HouseCombatForce,
    hits: u32,
    mean_attack: i64,
    drm: i32,
    events: &mut Vec<GameEvent>,
) {
    let turn = state.turn;
    let order = soak_order(state, system, target);
    let mut cursor = 0_usize;

    for _ in 0..hits {
        let Some(ship_id) = order.get(cursor).copied() else {
            break;
        };
        let Some(ship) = state.ships.get(ship_id) else {
            cursor += 1;
            continue;
        };
        if ship.is_destroyed() {
            cursor += 1;
            continue;
        }
        let defense = i64::from(ship.stats.defense);
        let outcome = cer::resolve_hit(&config.combat.space_cer, mean_attack, defense, drm, rng);
        match outcome {
            CerOutcome::Miss => {}
            CerOutcome::Cripple => {
                let class = ship.class;
                if let Some(ship) = state.ships.get_mut(ship_id) {
                    ship.combat_state = ship.combat_state.degraded();
                    let new_state = ship.combat_state;
                    events.push(
                        GameEvent::for_house(
                            turn,
                            target.house,
                            EventPayload::ShipDamaged { class, new_state },
                        )
                        .at(system)
                        .against(shooter.house),
                    );
                    if new_state == CombatState::Destroyed {
                        cursor += 1;
                    }
                }
            }
            CerOutcome::Destroy => {
                let class = ship.class;
                if let Some(ship) = state.ships.get_mut(ship_id) {
                    ship.combat_state = CombatState::Destroyed;
                }
                events.push(
                    GameEvent::for_house(turn, target.house, EventPayload::ShipDestroyed { class })
                        .at(system)
                        .against(shooter.house),
                );
                cursor += 1;
            }
        }
    }
}

/// Starbase return fire in the orbital theater.
fn starbase_fire(
    state: &mut GameState,
    config: &GameConfig,
    rng: &mut ChaCha8Rng,
    battle: &MultiHouseBattle,
    events: &mut Vec<GameEvent>,
) {
    let turn = state.turn;
    let system = battle.system;
    for kastra_id in starbases_at(state, system) {
        let Some(kastra) = state.kastras.get(kastra_id) else {
            continue;
        };
        if matches!(kastra.combat_state, CombatState::Destroyed) {
            continue;
        }
        let owner = kastra.owner;
        let attack = cer::wep_scaled_attack(
            kastra.effective_attack(),
            kastra.wep_at_build,
            config.combat.wep_percent_step,
        );
        if attack <= 0 {
            continue;
        }
        events.push(
            GameEvent::global(turn, EventPayload::StarbaseCombat { owner }).at(system),
        );
        let hostile_forces: Vec<&HouseCombatForce> = battle
            .forces
            .iter()
            .filter(|force| {
                force.house != owner
                    && state.diplomacy.state_of(owner, force.house).triggers_combat()
                    && force_has_ships(state, system, force)
            })
            .collect();
        if hostile_forces.is_empty() {
            continue;
        }
        let share = attack / i64::try_from(hostile_forces.len()).unwrap_or(1).max(1);
        let hits = u32::try_from(share.max(0)).unwrap_or(0);
        let shooter = HouseCombatForce {
            house: owner,
            fleets: Vec::new(),
            eli: 1,
            clk: 1,
            morale_drm: 0,
            home_defense: true,
            detection: DetectionOutcome::Intercept,
        };
        let targets: Vec<HouseId> = hostile_forces.iter().map(|f| f.house).collect();
        for target_house in targets {
            if let Some(target) = battle.forces.iter().find(|f| f.house == target_house) {
                allocate_hits(
                    state, config, rng, system, &shooter, target, hits, attack, 0, events,
                );
            }
        }
    }
}

/// End-of-round retreat checks.
///
/// A fleet withdraws when its strength has fallen under the configured
/// fraction of the strongest hostile force, unless its standing order pins
/// it in place. Retreat needs a permitted adjacent lane to a system not
/// held by hostile fleets; a fleet with no such lane is pinned.
fn evaluate_retreats(
    state: &mut GameState,
    config: &GameConfig,
    battle: &MultiHouseBattle,
    events: &mut Vec<GameEvent>,
) {
    let turn = state.turn;
    let system = battle.system;
    let threshold = i64::from(config.combat.retreat_threshold_percent);

    for force in &battle.forces {
        let own = force_attack(state, system, force);
        let strongest_hostile = battle
            .forces
            .iter()
            .filter(|other| {
                other.house != force.house
                    && state
                        .diplomacy
                        .state_of(force.house, other.house)
                        .triggers_combat()
            })
            .map(|other| force_attack(state, system, other))
            .max()
            .unwrap_or(0);
        if strongest_hostile == 0 {
            continue;
        }
        if own.saturating_mul(100) >= strongest_hostile.saturating_mul(threshold) {
            continue;
        }

        for fleet_id in &force.fleets {
            let pinned_by_orders = state.fleets.get(*fleet_id).is_some_and(|fleet| {
                matches!(
                    fleet.standing_order,
                    Some(StandingOrderKind::GuardColony | StandingOrderKind::Blockade)
                )
            });
            if pinned_by_orders {
                continue;
            }
            if let Some(to_system) = retreat_lane(state, force.house, *fleet_id) {
                let moved = state.move_fleet(*fleet_id, to_system);
                if moved {
                    if let Some(fleet) = state.fleets.get_mut(*fleet_id) {
                        fleet.active_order = None;
                    }
                    events.push(
                        GameEvent::for_house(
                            turn,
                            force.house,
                            EventPayload::FleetRetreat {
                                fleet: *fleet_id,
                                to_system,
                            },
                        )
                        .at(system),
                    );
                }
            }
        }
    }
}

/// The first permitted adjacent system not held by hostile fleets.
fn retreat_lane(state: &GameState, house: HouseId, fleet_id: FleetId) -> Option<SystemId> {
    let fleet = state.fleets.get(fleet_id)?;
    let profile = state.fleet_profile(fleet_id);
    for neighbor in state.map.neighbors(fleet.system, profile) {
        let hostile_held = state.fleets_at(neighbor).iter().any(|other| {
            state.fleets.get(*other).is_some_and(|f| {
                f.owner != house && state.diplomacy.state_of(house, f.owner).triggers_combat()
            })
        });
        if !hostile_held {
            return Some(neighbor);
        }
    }
    None
}

/// Remove destroyed ships and starbases at end of theater.
fn sweep_destroyed(state: &mut GameState, battle: &MultiHouseBattle, events: &mut Vec<GameEvent>) {
    let turn = state.turn;
    let system = battle.system;

    let dead_ships: Vec<ShipId> = state
        .ships
        .iter()
        .filter(|(_, ship)| ship.is_destroyed())
        .filter(|(_, ship)| {
            ship.fleet
                .and_then(|fleet_id| state.fleets.get(fleet_id))
                .is_some_and(|fleet| fleet.system == system)
        })
        .map(|(id, _)| id)
        .collect();
    for ship_id in dead_ships {
        let fighters: Vec<ShipId> = state
            .ships
            .get(ship_id)
            .map(|s| s.embarked_fighters.clone())
            .unwrap_or_default();
        if !fighters.is_empty() {
            events.push(
                GameEvent::global(
                    turn,
                    EventPayload::CarrierDestroyed {
                        fighters_lost: u32::try_from(fighters.len()).unwrap_or(0),
                    },
                )
                .at(system),
            );
            for fighter in fighters {
                let _ = state.remove_ship(fighter);
            }
        }
        let _ = state.remove_ship(ship_id);
    }

    let dead_kastras: Vec<KastraId> = starbases_at(state, system)
        .into_iter()
        .filter(|id| {
            state
                .kastras
                .get(*id)
                .is_some_and(|k| matches!(k.combat_state, CombatState::Destroyed))
        })
        .collect();
    for kastra_id in dead_kastras {
        if let Some(kastra) = state.kastras.remove(kastra_id)
            && let Some(colony) = state.colonies.get_mut(kastra.colony)
        {
            colony.kastras.remove(&kastra_id);
        }
    }
}
