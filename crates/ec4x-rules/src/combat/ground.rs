//! The planetary theater: bombardment, invasion, and blitz raids.
//!
//! Planetary combat runs after the space and orbital theaters, driven by
//! explicit fleet orders. Ground batteries fire back at the bombarding
//! fleet, planetary shields roll to block incoming hits (planet breakers
//! bypass them), and invasion resolves marine-against-army brackets on
//! the ground CER until one side is spent.

use ec4x_events::{EventPayload, GameEvent};
use ec4x_state::{GameState, GroundLocation};
use ec4x_types::{
    CerOutcome, ColonyId, CombatState, FleetId, GroundClass, GroundUnitId, ProjectId,
    ShipClass, ShipId,
};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::combat::cer;
use crate::config::GameConfig;

/// Live ground units of a class at a colony, ascending.
fn ground_units_of(state: &GameState, colony: ColonyId, class: GroundClass) -> Vec<GroundUnitId> {
    state
        .ground_units
        .iter()
        .filter(|(_, unit)| {
            unit.class == class
                && unit.location == GroundLocation::Colony(colony)
                && !matches!(unit.combat_state, CombatState::Destroyed)
        })
        .map(|(id, _)| id)
        .collect()
}

/// Whether the colony has a live planetary shield, and its block chance.
fn shield_block_percent(state: &GameState, config: &GameConfig, colony: ColonyId) -> Option<u32> {
    let owner = state.colonies.get(colony)?.owner;
    let sld = state.houses.get(owner)?.tech.planetary_shields;
    let has_shield = !ground_units_of(state, colony, GroundClass::PlanetaryShield).is_empty();
    if !has_shield {
        return None;
    }
    let index = usize::from(sld.clamp(1, 10)) - 1;
    config.combat.shield_block_percent.get(index).copied()
}

/// Fleet ships still able to fire, ascending.
fn firing_ships(state: &GameState, fleet: FleetId) -> Vec<ShipId> {
    state.fleets.get(fleet).map_or_else(Vec::new, |fleet| {
        fleet
            .ships
            .iter()
            .filter(|id| {
                state
                    .ships
                    .get(**id)
                    .is_some_and(|ship| !ship.is_destroyed() && ship.stats.attack > 0)
            })
            .copied()
            .collect()
    })
}

// ---------------------------------------------------------------------------
// Bombardment
// ---------------------------------------------------------------------------

/// Resolve a bombardment order: up to the configured number of rounds of
/// orbit-to-surface fire, with battery return fire each round.
pub fn resolve_bombardment(
    state: &mut GameState,
    config: &GameConfig,
    rng: &mut ChaCha8Rng,
    fleet_id: FleetId,
    colony_id: ColonyId,
    events: &mut Vec<GameEvent>,
) {
    let turn = state.turn;
    let Some((system, attacker)) = state
        .fleets
        .get(fleet_id)
        .map(|fleet| (fleet.system, fleet.owner))
    else {
        return;
    };
    let Some(defender) = state.colonies.get(colony_id).map(|c| c.owner) else {
        return;
    };
    debug!(%fleet_id, %colony_id, "bombardment begins");

    for round in 1..=config.combat.max_bombardment_rounds {
        if firing_ships(state, fleet_id).is_empty() {
            break;
        }
        events.push(
            GameEvent::for_house(turn, attacker, EventPayload::BombardmentRoundBegan { round })
                .at(system)
                .against(defender),
        );

        let infrastructure_hits =
            bombardment_fire(state, config, rng, fleet_id, colony_id, events);
        battery_fire(state, config, rng, fleet_id, colony_id, events);

        events.push(
            GameEvent::for_house(
                turn,
                attacker,
                EventPayload::BombardmentRoundCompleted {
                    round,
                    infrastructure_hits,
                },
            )
            .at(system)
            .against(defender),
        );
    }
}

/// One round of orbital fire at the colony. Returns infrastructure hits.
fn bombardment_fire(
    state: &mut GameState,
    config: &GameConfig,
    rng: &mut ChaCha8Rng,
    fleet_id: FleetId,
    colony_id: ColonyId,
    events: &mut Vec<GameEvent>,
) -> u32 {
    let turn = state.turn;
    let Some(system) = state.fleets.get(fleet_id).map(|f| f.system) else {
        return 0;
    };
    let block = shield_block_percent(state, config, colony_id);
    let mut infrastructure_hits = 0_u32;

    // Surface targets soak in a fixed order: batteries, then shields,
    // then garrison, then infrastructure.
    for ship_id in firing_ships(state, fleet_id) {
        let Some(ship) = state.ships.get(ship_id) else {
            continue;
        };
        let attack = cer::wep_scaled_attack(
            ship.effective_attack(),
            ship.stats.wep_at_build,
            config.combat.wep_percent_step,
        );
        let bypasses_shield = ship.class == ShipClass::PlanetBreaker;
        if attack <= 0 {
            continue;
        }

        if let Some(percent) = block
            && !bypasses_shield
            && rng.random_range(0..100_u32) < percent
        {
            events.push(GameEvent::global(turn, EventPayload::ShieldActivated).at(system));
            continue;
        }

        let target = ground_units_of(state, colony_id, GroundClass::GroundBattery)
            .first()
            .copied()
            .or_else(|| {
                ground_units_of(state, colony_id, GroundClass::PlanetaryShield)
                    .first()
                    .copied()
            })
            .or_else(|| {
                ground_units_of(state, colony_id, GroundClass::Army)
                    .first()
                    .copied()
            });

        if let Some(unit_id) = target {
            let defense = state
                .ground_units
                .get(unit_id)
                .map_or(1, |unit| i64::from(unit.defense));
            let outcome = cer::resolve_hit(&config.combat.ground_cer, attack, defense, 0, rng);
            apply_ground_outcome(state, unit_id, outcome);
        } else {
            // Nothing left on the surface but the colony itself.
            if let Some(colony) = state.colonies.get_mut(colony_id) {
                if colony.industrial_units > 0 {
                    colony.industrial_units = colony.industrial_units.saturating_sub(1);
                } else if colony.infrastructure > 1 {
                    colony.infrastructure = colony.infrastructure.saturating_sub(1);
                } else if colony.population > 0 {
                    colony.population = colony.population.saturating_sub(1);
                }
            }
            infrastructure_hits = infrastructure_hits.saturating_add(1);
        }
    }

    infrastructure_hits
}

/// Ground batteries fire at the bombarding fleet.
fn battery_fire(
    state: &mut GameState,
    config: &GameConfig,
    rng: &mut ChaCha8Rng,
    fleet_id: FleetId,
    colony_id: ColonyId,
    events: &mut Vec<GameEvent>,
) {
    let turn = state.turn;
    let Some((system, attacker)) = state
        .fleets
        .get(fleet_id)
        .map(|fleet| (fleet.system, fleet.owner))
    else {
        return;
    };
    for battery_id in ground_units_of(state, colony_id, GroundClass::GroundBattery) {
        let Some(battery) = state.ground_units.get(battery_id) else {
            continue;
        };
        let attack = i64::from(battery.effective_attack());
        if attack <= 0 {
            continue;
        }
        let Some(target_id) = firing_ships(state, fleet_id).first().copied() else {
            break;
        };
        let Some(target) = state.ships.get(target_id) else {
            continue;
        };
        let defense = i64::from(target.stats.defense);
        let class = target.class;
        let outcome = cer::resolve_hit(&config.combat.ground_cer, attack, defense, 0, rng);
        match outcome {
            CerOutcome::Miss => {}
            CerOutcome::Cripple => {
                if let Some(ship) = state.ships.get_mut(target_id) {
                    ship.combat_state = ship.combat_state.degraded();
                    let new_state = ship.combat_state;
                    events.push(
                        GameEvent::for_house(
                            turn,
                            attacker,
                            EventPayload::ShipDamaged { class, new_state },
                        )
                        .at(system),
                    );
                }
            }
            CerOutcome::Destroy => {
                if let Some(ship) = state.ships.get_mut(target_id) {
                    ship.combat_state = CombatState::Destroyed;
                }
                events.push(
                    GameEvent::for_house(turn, attacker, EventPayload::ShipDestroyed { class })
                        .at(system),
                );
            }
        }
    }
}

fn apply_ground_outcome(state: &mut GameState, unit_id: GroundUnitId, outcome: CerOutcome) {
    if let Some(unit) = state.ground_units.get_mut(unit_id) {
        match outcome {
            CerOutcome::Miss => {}
            CerOutcome::Cripple => unit.combat_state = unit.combat_state.degraded(),
            CerOutcome::Destroy => unit.combat_state = CombatState::Destroyed,
        }
    }
}

// ---------------------------------------------------------------------------
// Invasion
// ---------------------------------------------------------------------------

/// Resolve an invasion: marine brackets against the garrison on the
/// ground CER. Success transfers the colony; failure is repelled.
pub fn resolve_invasion(
    state: &mut GameState,
    config: &GameConfig,
    rng: &mut ChaCha8Rng,
    fleet_id: FleetId,
    colony_id: ColonyId,
    events: &mut Vec<GameEvent>,
) {
    let turn = state.turn;
    let Some((system, attacker)) = state
        .fleets
        .get(fleet_id)
        .map(|fleet| (fleet.system, fleet.owner))
    else {
        return;
    };
    let Some(defender) = state.colonies.get(colony_id).map(|c| c.owner) else {
        return;
    };
    events.push(
        GameEvent::for_house(turn, attacker, EventPayload::InvasionBegan)
            .at(system)
            .against(defender),
    );

    let mut marines = landed_marines(state, fleet_id);
    let marine_row = config.ground.row(GroundClass::Marine);

    loop {
        let garrison: Vec<GroundUnitId> = ground_units_of(state, colony_id, GroundClass::Army)
            .into_iter()
            .chain(ground_units_of(state, colony_id, GroundClass::GroundBattery))
            .collect();
        if marines == 0 || garrison.is_empty() {
            break;
        }

        let mut attacker_losses = 0_u32;
        let mut defender_losses = 0_u32;
        let mut progress = false;

        // Marine bracket fires at the first defender.
        if let Some(unit_id) = garrison.first().copied() {
            let defense = state
                .ground_units
                .get(unit_id)
                .map_or(1, |unit| i64::from(unit.defense));
            let attack = i64::from(marine_row.attack).saturating_mul(i64::from(marines));
            let outcome = cer::resolve_hit(&config.combat.ground_cer, attack, defense, 0, rng);
            apply_ground_outcome(state, unit_id, outcome);
            if outcome != CerOutcome::Miss {
                progress = true;
            }
            let destroyed = state
                .ground_units
                .get(unit_id)
                .is_none_or(|unit| matches!(unit.combat_state, CombatState::Destroyed));
            if destroyed {
                defender_losses += 1;
            }
        }

        // The garrison bracket fires back at the marines.
        for unit_id in &garrison {
            let Some(unit) = state.ground_units.get(*unit_id) else {
                continue;
            };
            if matches!(unit.combat_state, CombatState::Destroyed) {
                continue;
            }
            let attack = i64::from(unit.effective_attack());
            let outcome = cer::resolve_hit(
                &config.combat.ground_cer,
                attack,
                i64::from(marine_row.defense),
                0,
                rng,
            );
            if outcome != CerOutcome::Miss && marines > 0 {
                marines -= 1;
                attacker_losses += 1;
                progress = true;
            }
        }

        events.push(
            GameEvent::for_house(
                turn,
                attacker,
                EventPayload::GroundCombatRound {
                    attacker_losses,
                    defender_losses,
                },
            )
            .at(system)
            .against(defender),
        );

        if !progress {
            // A stalemate bracket would loop forever; the assault stalls
            // and is treated as repelled.
            break;
        }
    }

    set_marines(state, fleet_id, marines);
    let garrison_left = !ground_units_of(state, colony_id, GroundClass::Army).is_empty()
        || !ground_units_of(state, colony_id, GroundClass::GroundBattery).is_empty();

    if marines > 0 && !garrison_left {
        // Ownership transfers; the defender's remaining ground assets are
        // forfeit.
        forfeit_ground_assets(state, colony_id);
        state.transfer_colony(colony_id, attacker);
        events.push(
            GameEvent::for_house(turn, attacker, EventPayload::ColonyCaptured { from: defender })
                .at(system),
        );
        events.push(
            GameEvent::for_house(turn, attacker, EventPayload::SystemCaptured { from: defender })
                .at(system),
        );
        debug!(%colony_id, %attacker, %defender, "colony captured");
    } else {
        events.push(
            GameEvent::for_house(turn, defender, EventPayload::InvasionRepelled)
                .at(system)
                .against(attacker),
        );
    }
}

/// Total marines aboard a fleet's transports.
fn landed_marines(state: &GameState, fleet_id: FleetId) -> u32 {
    state.fleets.get(fleet_id).map_or(0, |fleet| {
        fleet
            .ships
            .iter()
            .filter_map(|id| state.ships.get(*id))
            .filter(|ship| !ship.is_destroyed())
            .map(|ship| ship.marines)
            .sum()
    })
}

/// Write surviving marines back to the transports, filling in ship order.
fn set_marines(state: &mut GameState, fleet_id: FleetId, mut remaining: u32) {
    let ships: Vec<ShipId> = state
        .fleets
        .get(fleet_id)
        .map(|fleet| fleet.ships.iter().copied().collect())
        .unwrap_or_default();
    for ship_id in ships {
        if let Some(ship) = state.ships.get_mut(ship_id) {
            if ship.marines == 0 {
                continue;
            }
            let aboard = ship.marines.min(remaining);
            ship.marines = aboard;
            remaining -= aboard;
        }
    }
}

/// Destroy the defender's remaining ground units at a captured colony.
fn forfeit_ground_assets(state: &mut GameState, colony_id: ColonyId) {
    let units: Vec<GroundUnitId> = state
        .ground_units
        .iter()
        .filter(|(_, unit)| unit.location == GroundLocation::Colony(colony_id))
        .map(|(id, _)| id)
        .collect();
    for unit_id in units {
        let _ = state.ground_units.remove(unit_id);
    }
    if let Some(colony) = state.colonies.get_mut(colony_id) {
        colony.ground_units.clear();
    }
}

// ---------------------------------------------------------------------------
// Blitz
// ---------------------------------------------------------------------------

/// Resolve a blitz raid: steal in-flight projects and loose PTU, then the
/// raiders depart. Ownership never changes hands.
pub fn resolve_blitz(
    state: &mut GameState,
    config: &GameConfig,
    _rng: &mut ChaCha8Rng,
    fleet_id: FleetId,
    colony_id: ColonyId,
    events: &mut Vec<GameEvent>,
) {
    let turn = state.turn;
    let Some((system, attacker)) = state
        .fleets
        .get(fleet_id)
        .map(|fleet| (fleet.system, fleet.owner))
    else {
        return;
    };
    let Some(defender) = state.colonies.get(colony_id).map(|c| c.owner) else {
        return;
    };
    events.push(
        GameEvent::for_house(turn, attacker, EventPayload::BlitzBegan)
            .at(system)
            .against(defender),
    );

    // Steal a share of the colony's in-flight projects: the stolen
    // projects simply die, their paid PP written off.
    let projects: Vec<ProjectId> = state
        .projects
        .iter()
        .filter(|(_, project)| project.colony == colony_id)
        .map(|(id, _)| id)
        .collect();
    let steal_count = projects
        .len()
        .saturating_mul(config.combat.blitz_loot_percent as usize)
        / 100;
    for project_id in projects.into_iter().take(steal_count) {
        if let Some(project) = state.projects.remove(project_id)
            && let Some(colony) = state.colonies.get_mut(colony_id)
        {
            colony.construction_queue.retain(|id| *id != project_id);
            colony.repair_queue.retain(|id| *id != project_id);
            if colony.terraform_project == Some(project_id) {
                colony.terraform_project = None;
            }
            debug!(%project_id, paid = project.paid, "project lost to blitz");
        }
    }

    // Loose PTU are carried off into the raiders' holds, up to capacity.
    let loot_ptu = state
        .colonies
        .get(colony_id)
        .map_or(0, |c| c.ptu.saturating_mul(config.combat.blitz_loot_percent) / 100);
    if loot_ptu > 0 {
        if let Some(colony) = state.colonies.get_mut(colony_id) {
            colony.ptu = colony.ptu.saturating_sub(loot_ptu);
        }
        let ships: Vec<ShipId> = state
            .fleets
            .get(fleet_id)
            .map(|fleet| fleet.ships.iter().copied().collect())
            .unwrap_or_default();
        let mut remaining = loot_ptu;
        for ship_id in ships {
            if remaining == 0 {
                break;
            }
            if let Some(ship) = state.ships.get_mut(ship_id) {
                let space = ship.stats.cargo_capacity.saturating_sub(ship.colonists);
                let taken = space.min(remaining);
                ship.colonists = ship.colonists.saturating_add(taken);
                remaining -= taken;
            }
        }
    }
}
