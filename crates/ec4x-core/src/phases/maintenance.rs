//! Phase 4: Maintenance.
//!
//! The bookkeeping phase: upkeep and the shortfall policy, project
//! advancement and commissioning, effect and transit ticks with smart
//! delivery, population and industrial growth, queued prestige, the
//! status state machines, derived-capability recomputation, act
//! progression, and finally the turn counter.

use ec4x_events::{EventPayload, GameEvent};
use ec4x_rules::{GameConfig, diplomacy, economy, research};
use ec4x_state::{
    GameState, GroundLocation, GroundUnit, Kastra, Neoria, Project, ProjectKind, RepairTarget,
    ShipStats,
};
use ec4x_types::{
    Act, BuildItem, ColonyId, CombatState, DiplomaticState, EffectId, FacilityKind, FleetStatus,
    HouseId, HouseStatus, ProjectId, ShipClass, TransferOutcome, TransitId,
};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::phases::{TurnContext, command};

/// Consecutive shortfall turns before a house is forced onto autopilot.
const SHORTFALL_AUTOPILOT_THRESHOLD: u8 = 3;

/// Consecutive silent turns before a house goes onto autopilot.
const SILENT_AUTOPILOT_THRESHOLD: u8 = 3;

/// Consecutive negative-prestige turns before defensive collapse.
const COLLAPSE_THRESHOLD: u8 = 3;

/// Ships crippled per shortfall turn.
const SHORTFALL_CRIPPLES_PER_TURN: usize = 3;

/// Turns between passive industrial-unit growth steps.
const IU_GROWTH_PERIOD: u32 = 6;

/// Run the Maintenance phase.
pub fn run(
    state: &mut GameState,
    config: &GameConfig,
    rng: &mut ChaCha8Rng,
    ctx: &mut TurnContext,
    events: &mut Vec<GameEvent>,
) {
    pay_upkeep(state, config, events);
    assign_waiting_docks(state);
    advance_projects(state, config, events);
    queue_auto_repairs(state, config);
    tick_effects(state);
    tick_transits(state, events);
    grow_populations(state, config);
    grow_industry(state);
    remove_dead_colonies(state);
    apply_queued_prestige(state, ctx, events);
    update_collapse(state, events);
    update_autopilot(state, ctx, events);
    if state.is_upgrade_month() {
        run_research_cycles(state, config, rng, events);
    }
    recompute_effective_docks(state, config);
    refresh_adjacent_intel(state);
    diplomacy::expire_proposals(state, events);
    update_act(state);
    state.advance_turn();
}

/// Every colony keeps its neighborhood at Adjacent visibility: ring and
/// location only, no planet details.
fn refresh_adjacent_intel(state: &mut GameState) {
    let turn = state.turn;
    let observations: Vec<(HouseId, ec4x_types::SystemId)> = state
        .colonies
        .iter()
        .flat_map(|(_, colony)| {
            state
                .map
                .neighbors(colony.system, ec4x_map::FleetProfile::SCOUT)
                .into_iter()
                .map(move |neighbor| (colony.owner, neighbor))
        })
        .collect();
    for (house, system) in observations {
        state.intel_mut(house).record_system(
            system,
            ec4x_types::VisibilityLevel::Adjacent,
            None,
            None,
            None,
            turn,
        );
    }
}

// ---------------------------------------------------------------------------
// Upkeep and shortfall
// ---------------------------------------------------------------------------

fn pay_upkeep(state: &mut GameState, config: &GameConfig, events: &mut Vec<GameEvent>) {
    let turn = state.turn;
    for house_id in state.house_ids() {
        let bill = economy::projected_maintenance(state, config, house_id);
        let treasury_after = state.houses.get(house_id).map_or(0, |house| {
            house.treasury.saturating_sub(bill)
        });
        if let Some(house) = state.houses.get_mut(house_id) {
            house.treasury = treasury_after;
        }

        if treasury_after < 0 {
            if let Some(house) = state.houses.get_mut(house_id) {
                house.consecutive_shortfall_turns =
                    house.consecutive_shortfall_turns.saturating_add(1);
            }
            events.push(GameEvent::for_house(
                turn,
                house_id,
                EventPayload::ResourceWarning {
                    detail: format!("maintenance shortfall: {treasury_after} PP"),
                },
            ));
            // The shortfall policy degrades the cheapest ships first.
            let targets = economy::shortfall_targets(state, config, house_id);
            for ship_id in targets.into_iter().take(SHORTFALL_CRIPPLES_PER_TURN) {
                if let Some(ship) = state.ships.get_mut(ship_id) {
                    ship.combat_state = CombatState::Crippled;
                }
            }
            let over_threshold = state.houses.get(house_id).is_some_and(|house| {
                house.consecutive_shortfall_turns >= SHORTFALL_AUTOPILOT_THRESHOLD
                    && house.status == HouseStatus::Active
            });
            if over_threshold {
                if let Some(house) = state.houses.get_mut(house_id) {
                    house.status = HouseStatus::Autopilot;
                }
                events.push(GameEvent::for_house(
                    turn,
                    house_id,
                    EventPayload::StatusChanged {
                        status: HouseStatus::Autopilot,
                    },
                ));
            }
        } else if let Some(house) = state.houses.get_mut(house_id) {
            house.consecutive_shortfall_turns = 0;
        }
        debug!(house = %house_id, bill, treasury_after, "upkeep paid");
    }
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

/// Give queued dockless ship projects a dock as capacity frees up.
fn assign_waiting_docks(state: &mut GameState) {
    let waiting: Vec<(ProjectId, ColonyId)> = state
        .projects
        .iter()
        .filter(|(_, project)| {
            project.dock.is_none()
                && matches!(
                    project.kind,
                    ProjectKind::Construction(BuildItem::Ship(_))
                        | ProjectKind::Repair(RepairTarget::Ship(_))
                )
        })
        .map(|(id, project)| (id, project.colony))
        .collect();
    for (project_id, colony_id) in waiting {
        if let Some(dock) = command::choose_dock(state, colony_id)
            && let Some(project) = state.projects.get_mut(project_id)
        {
            project.dock = Some(dock);
        }
    }
}

/// Advance every active project one payment step; commission the
/// completed ones.
fn advance_projects(state: &mut GameState, config: &GameConfig, events: &mut Vec<GameEvent>) {
    let project_ids: Vec<ProjectId> = state.projects.ids();
    for project_id in project_ids {
        let Some(project) = state.projects.get(project_id) else {
            continue;
        };
        // Ship work cannot proceed without a dock.
        let needs_dock = matches!(
            project.kind,
            ProjectKind::Construction(BuildItem::Ship(_)) | ProjectKind::Repair(RepairTarget::Ship(_))
        );
        if needs_dock && project.dock.is_none() {
            continue;
        }
        let Some(owner) = state
            .colonies
            .get(project.colony)
            .map(|colony| colony.owner)
        else {
            continue;
        };
        let due = project.due_this_turn();
        let affordable = state
            .houses
            .get(owner)
            .is_some_and(|house| house.treasury >= due);
        if !affordable {
            // Stalled: no payment, no progress.
            continue;
        }
        if let Some(house) = state.houses.get_mut(owner) {
            house.treasury = house.treasury.saturating_sub(due);
        }
        if let Some(project) = state.projects.get_mut(project_id) {
            project.paid = project.paid.saturating_add(due);
            project.turns_remaining = project.turns_remaining.saturating_sub(1);
        }

        let complete = state
            .projects
            .get(project_id)
            .is_some_and(Project::is_complete);
        if complete {
            commission(state, config, project_id, events);
        }
    }
}

/// Pay-to-finish: spawn the product, free the dock, drop the project.
fn commission(
    state: &mut GameState,
    config: &GameConfig,
    project_id: ProjectId,
    events: &mut Vec<GameEvent>,
) {
    let turn = state.turn;
    let Some(project) = state.projects.remove(project_id) else {
        return;
    };
    let colony_id = project.colony;
    if let Some(colony) = state.colonies.get_mut(colony_id) {
        colony.construction_queue.retain(|id| *id != project_id);
        colony.repair_queue.retain(|id| *id != project_id);
        if colony.terraform_project == Some(project_id) {
            colony.terraform_project = None;
        }
    }
    let Some((owner, system)) = state
        .colonies
        .get(colony_id)
        .map(|colony| (colony.owner, colony.system))
    else {
        return;
    };

    match project.kind {
        ProjectKind::Construction(item) => {
            spawn_item(state, config, owner, colony_id, system, item);
            events.push(
                GameEvent::for_house(
                    turn,
                    owner,
                    EventPayload::ConstructionCompleted {
                        colony: colony_id,
                        item: format!("{item:?}"),
                    },
                )
                .at(system),
            );
        }
        ProjectKind::Repair(target) => {
            match target {
                RepairTarget::Ship(ship_id) => {
                    if let Some(ship) = state.ships.get_mut(ship_id) {
                        ship.combat_state = CombatState::Undamaged;
                    }
                }
                RepairTarget::Neoria(neoria_id) => {
                    if let Some(neoria) = state.neorias.get_mut(neoria_id) {
                        neoria.combat_state = CombatState::Undamaged;
                    }
                }
                RepairTarget::Kastra(kastra_id) => {
                    if let Some(kastra) = state.kastras.get_mut(kastra_id) {
                        kastra.combat_state = CombatState::Undamaged;
                    }
                }
            }
            events.push(
                GameEvent::for_house(
                    turn,
                    owner,
                    EventPayload::RepairCompleted { colony: colony_id },
                )
                .at(system),
            );
        }
        ProjectKind::Terraform { target } => {
            if let Some(system_row) = state.map.system_mut(system) {
                let _ = system_row.terraform_step();
            }
            events.push(
                GameEvent::for_house(
                    turn,
                    owner,
                    EventPayload::TerraformCompleted {
                        colony: colony_id,
                        new_class: target,
                    },
                )
                .at(system),
            );
        }
    }
    debug!(%project_id, %colony_id, "project commissioned");
}

/// Spawn a commissioned construction product.
fn spawn_item(
    state: &mut GameState,
    config: &GameConfig,
    owner: HouseId,
    colony_id: ColonyId,
    system: ec4x_types::SystemId,
    item: BuildItem,
) {
    let tech = state.houses.get(owner).map(|house| house.tech.clone());
    let (wep, cst) = tech.map_or((1, 1), |tech| (tech.weapons, tech.construction));
    match item {
        BuildItem::Ship(class) => {
            let row = config.ships.row(class);
            let stats = ShipStats {
                attack: row.attack,
                defense: row.defense,
                command_cost: row.command_cost,
                cargo_capacity: row.cargo_capacity,
                wep_at_build: wep,
            };
            if class == ShipClass::Fighter {
                let ship_id = state.ships.insert_with(|id| ec4x_state::Ship {
                    id,
                    owner,
                    fleet: None,
                    stationed_colony: Some(colony_id),
                    class,
                    role: class.role(),
                    stats,
                    combat_state: CombatState::Undamaged,
                    colonists: 0,
                    marines: 0,
                    assigned_carrier: None,
                    embarked_fighters: Vec::new(),
                });
                debug!(ship = %ship_id, "fighter stationed");
            } else {
                let fleet_id = home_fleet(state, owner, system);
                let _ = state.commission_ship(fleet_id, class, stats);
                if class == ShipClass::PlanetBreaker
                    && let Some(house) = state.houses.get_mut(owner)
                {
                    house.planet_breakers_built = house.planet_breakers_built.saturating_add(1);
                }
            }
        }
        BuildItem::Facility(FacilityKind::Neoria(class)) => {
            let docks = config.facilities.effective_docks(class.base_docks(), cst);
            let turn = state.turn;
            let neoria = state
                .neorias
                .insert_with(|id| Neoria::commissioned(id, colony_id, class, turn, docks));
            if let Some(colony) = state.colonies.get_mut(colony_id) {
                colony.neorias.insert(neoria);
            }
        }
        BuildItem::Facility(FacilityKind::Kastra) => {
            let turn = state.turn;
            let facilities = &config.facilities;
            let (attack, defense) = (facilities.kastra_attack, facilities.kastra_defense);
            let kastra = state.kastras.insert_with(|id| Kastra {
                id,
                owner,
                colony: colony_id,
                system,
                commissioned_turn: turn,
                attack,
                defense,
                wep_at_build: wep,
                combat_state: CombatState::Undamaged,
            });
            if let Some(colony) = state.colonies.get_mut(colony_id) {
                colony.kastras.insert(kastra);
            }
        }
        BuildItem::Ground(class) => {
            let row = config.ground.row(class);
            let unit = state.ground_units.insert_with(|id| GroundUnit {
                id,
                owner,
                class,
                location: GroundLocation::Colony(colony_id),
                attack: row.attack,
                defense: row.defense,
                combat_state: CombatState::Undamaged,
            });
            if let Some(colony) = state.colonies.get_mut(colony_id) {
                colony.ground_units.insert(unit);
            }
        }
        BuildItem::IndustrialUnits => {
            if let Some(colony) = state.colonies.get_mut(colony_id) {
                colony.industrial_units = colony.industrial_units.saturating_add(1);
            }
        }
    }
}

/// The owner's active fleet at a system, or a fresh shell.
fn home_fleet(state: &mut GameState, owner: HouseId, system: ec4x_types::SystemId) -> ec4x_types::FleetId {
    let existing = state.fleets_at(system).into_iter().find(|fleet_id| {
        state
            .fleets
            .get(*fleet_id)
            .is_some_and(|fleet| fleet.owner == owner && fleet.status == FleetStatus::Active)
    });
    existing.unwrap_or_else(|| state.create_fleet(owner, system))
}

/// Queue repair projects for crippled assets at auto-repair colonies.
fn queue_auto_repairs(state: &mut GameState, config: &GameConfig) {
    let colonies: Vec<(ColonyId, ec4x_types::SystemId, HouseId)> = state
        .colonies
        .iter()
        .filter(|(_, colony)| colony.auto_repair)
        .map(|(id, colony)| (id, colony.system, colony.owner))
        .collect();

    for (colony_id, system, owner) in colonies {
        let mut targets: Vec<(RepairTarget, i64)> = Vec::new();

        for (neoria_id, neoria) in state.neorias.iter() {
            if neoria.colony == colony_id && neoria.combat_state == CombatState::Crippled {
                targets.push((
                    RepairTarget::Neoria(neoria_id),
                    config.facilities.neoria_cost(neoria.class),
                ));
            }
        }
        for (kastra_id, kastra) in state.kastras.iter() {
            if kastra.colony == colony_id && kastra.combat_state == CombatState::Crippled {
                targets.push((RepairTarget::Kastra(kastra_id), config.facilities.kastra_cost));
            }
        }
        for fleet_id in state.fleets_at(system) {
            let Some(fleet) = state.fleets.get(fleet_id) else {
                continue;
            };
            if fleet.owner != owner {
                continue;
            }
            for ship_id in &fleet.ships {
                if let Some(ship) = state.ships.get(*ship_id)
                    && ship.combat_state == CombatState::Crippled
                {
                    targets.push((
                        RepairTarget::Ship(*ship_id),
                        config.ships.row(ship.class).cost,
                    ));
                }
            }
        }

        for (target, base_cost) in targets {
            let queued = state.projects.iter().any(|(_, project)| {
                matches!(project.kind, ProjectKind::Repair(existing) if existing == target)
            });
            if queued {
                continue;
            }
            let cost = base_cost.saturating_mul(config.economy.repair_cost_percent) / 100;
            let dock = if matches!(target, RepairTarget::Ship(_)) {
                command::choose_dock(state, colony_id)
            } else {
                None
            };
            let turns = config.economy.repair_turns;
            let project_id = state.projects.insert_with(|id| Project {
                id,
                colony: colony_id,
                kind: ProjectKind::Repair(target),
                total_cost: cost,
                paid: 0,
                turns_remaining: turns,
                dock,
            });
            if let Some(colony) = state.colonies.get_mut(colony_id) {
                colony.repair_queue.push(project_id);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Effects, transits, growth
// ---------------------------------------------------------------------------

fn tick_effects(state: &mut GameState) {
    let expired: Vec<EffectId> = {
        let mut done = Vec::new();
        for (id, effect) in state.effects.iter_mut() {
            if effect.tick() {
                done.push(id);
            }
        }
        done
    };
    for effect_id in expired {
        let _ = state.effects.remove(effect_id);
    }
}

/// Smart delivery for arrived population packets.
fn tick_transits(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let turn = state.turn;
    let arrived: Vec<TransitId> = state
        .transits
        .iter()
        .filter(|(_, transit)| turn >= transit.arrival_turn)
        .map(|(id, _)| id)
        .collect();

    for transit_id in arrived {
        let Some(transit) = state.transits.remove(transit_id) else {
            continue;
        };
        let destination_ok = state.colonies.get(transit.destination).is_some_and(|colony| {
            colony.owner == transit.owner && !colony.is_blockaded()
        });

        let (outcome, delivered_to) = if destination_ok {
            (TransferOutcome::Delivered, Some(transit.destination))
        } else {
            let fallback = nearest_other_colony(state, transit.owner, transit.destination);
            match fallback {
                Some(colony_id) => (TransferOutcome::Redirected, Some(colony_id)),
                None => (TransferOutcome::Lost, None),
            }
        };

        if let Some(colony_id) = delivered_to
            && let Some(colony) = state.colonies.get_mut(colony_id)
        {
            colony.ptu = colony.ptu.saturating_add(transit.ptu);
        }

        events.push(GameEvent::for_house(
            turn,
            transit.owner,
            EventPayload::TransferResolved {
                outcome,
                destination: transit.destination,
                delivered_to,
                ptu: transit.ptu,
            },
        ));
        debug!(%transit_id, ?outcome, "transfer resolved");
    }
}

/// The owner's nearest other colony to a lost destination, by jumps from
/// the destination's system (ascending colony id breaks ties).
fn nearest_other_colony(
    state: &GameState,
    owner: HouseId,
    destination: ColonyId,
) -> Option<ColonyId> {
    // The destination colony may be gone entirely; distances then fall
    // back to a flat penalty and ascending id decides.
    let from = state.colonies.get(destination).map(|colony| colony.system);
    let mut best: Option<(u32, ColonyId)> = None;
    for colony_id in state.colonies_of(owner) {
        if colony_id == destination {
            continue;
        }
        let Some(colony) = state.colonies.get(colony_id) else {
            continue;
        };
        let jumps = from
            .and_then(|f| {
                state
                    .map
                    .jump_distance(f, colony.system, ec4x_map::FleetProfile::LINE)
            })
            .unwrap_or(u32::MAX / 2);
        if best.is_none_or(|(d, _)| jumps < d) {
            best = Some((jumps, colony_id));
        }
    }
    best.map(|(_, id)| id)
}

/// Natural growth plus starbase bonuses, and the PTU-to-PU conversion.
fn grow_populations(state: &mut GameState, config: &GameConfig) {
    let colony_ids: Vec<ColonyId> = state.colonies.ids();
    for colony_id in colony_ids {
        let Some(colony) = state.colonies.get(colony_id) else {
            continue;
        };
        let working_starbases = colony
            .kastras
            .iter()
            .filter(|id| {
                state
                    .kastras
                    .get(**id)
                    .is_some_and(Kastra::surveillance_active)
            })
            .count();
        let bonus = u32::try_from(working_starbases).unwrap_or(0);
        let growth = economy::growth_ptu(config, colony.population).saturating_add(bonus);
        if let Some(colony) = state.colonies.get_mut(colony_id) {
            colony.ptu = colony.ptu.saturating_add(growth);
            let _ = colony.absorb_ptu();
        }
    }
}

/// Passive industrial growth on a slow clock.
fn grow_industry(state: &mut GameState) {
    if !state.turn.is_multiple_of(IU_GROWTH_PERIOD) {
        return;
    }
    for (_, colony) in state.colonies.iter_mut() {
        if colony.industrial_units < colony.population {
            colony.industrial_units = colony.industrial_units.saturating_add(1);
        }
    }
}

/// A colony that has lost its whole population is gone: facilities,
/// projects, and ground units go with it.
fn remove_dead_colonies(state: &mut GameState) {
    let dead: Vec<ColonyId> = state
        .colonies
        .iter()
        .filter(|(_, colony)| colony.population == 0 && colony.ptu == 0)
        .map(|(id, _)| id)
        .collect();
    for colony_id in dead {
        let neorias: Vec<_> = state
            .neorias
            .iter()
            .filter(|(_, n)| n.colony == colony_id)
            .map(|(id, _)| id)
            .collect();
        for id in neorias {
            let _ = state.neorias.remove(id);
        }
        let kastras: Vec<_> = state
            .kastras
            .iter()
            .filter(|(_, k)| k.colony == colony_id)
            .map(|(id, _)| id)
            .collect();
        for id in kastras {
            let _ = state.kastras.remove(id);
        }
        let units: Vec<_> = state
            .ground_units
            .iter()
            .filter(|(_, u)| u.location == GroundLocation::Colony(colony_id))
            .map(|(id, _)| id)
            .collect();
        for id in units {
            let _ = state.ground_units.remove(id);
        }
        let projects: Vec<_> = state
            .projects
            .iter()
            .filter(|(_, p)| p.colony == colony_id)
            .map(|(id, _)| id)
            .collect();
        for id in projects {
            let _ = state.projects.remove(id);
        }
        let _ = state.remove_colony(colony_id);
        debug!(%colony_id, "colony lost to depopulation");
    }
}

// ---------------------------------------------------------------------------
// Prestige and status machines
// ---------------------------------------------------------------------------

fn apply_queued_prestige(state: &mut GameState, ctx: &mut TurnContext, events: &mut Vec<GameEvent>) {
    let turn = state.turn;
    for (house_id, delta, reason) in std::mem::take(&mut ctx.pending_prestige) {
        if let Some(house) = state.houses.get_mut(house_id) {
            house.prestige = house.prestige.saturating_add(delta);
        }
        events.push(GameEvent::for_house(
            turn,
            house_id,
            EventPayload::PrestigeChanged { delta, reason },
        ));
    }
}

/// Three consecutive negative-prestige turns end a house for good.
fn update_collapse(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let turn = state.turn;
    for house_id in state.house_ids() {
        let Some(house) = state.houses.get_mut(house_id) else {
            continue;
        };
        if house.is_collapsed() {
            continue;
        }
        if house.prestige < 0 {
            house.negative_prestige_turns = house.negative_prestige_turns.saturating_add(1);
        } else {
            house.negative_prestige_turns = 0;
        }
        if house.negative_prestige_turns >= COLLAPSE_THRESHOLD {
            house.collapse();
            events.push(GameEvent::for_house(
                turn,
                house_id,
                EventPayload::StatusChanged {
                    status: HouseStatus::DefensiveCollapse,
                },
            ));
            events.push(GameEvent::global(turn, EventPayload::HouseEliminated).against(house_id));
            debug!(house = %house_id, "defensive collapse");
        }
    }
}

/// Houses that stayed silent too long go onto autopilot.
fn update_autopilot(state: &mut GameState, ctx: &TurnContext, events: &mut Vec<GameEvent>) {
    let turn = state.turn;
    for house_id in state.house_ids() {
        if ctx.submitted.contains(&house_id) {
            continue;
        }
        let Some(house) = state.houses.get_mut(house_id) else {
            continue;
        };
        if house.is_collapsed() {
            continue;
        }
        house.turns_without_orders = house.turns_without_orders.saturating_add(1);
        if house.turns_without_orders >= SILENT_AUTOPILOT_THRESHOLD
            && house.status == HouseStatus::Active
        {
            house.status = HouseStatus::Autopilot;
            events.push(GameEvent::for_house(
                turn,
                house_id,
                EventPayload::StatusChanged {
                    status: HouseStatus::Autopilot,
                },
            ));
            debug!(house = %house_id, "autopilot engaged");
        }
    }
}

// ---------------------------------------------------------------------------
// Derived updates
// ---------------------------------------------------------------------------

fn run_research_cycles(
    state: &mut GameState,
    config: &GameConfig,
    rng: &mut ChaCha8Rng,
    events: &mut Vec<GameEvent>,
) {
    for house_id in state.house_ids() {
        let collapsed = state
            .houses
            .get(house_id)
            .is_none_or(ec4x_state::House::is_collapsed);
        if collapsed {
            continue;
        }
        research::run_upgrade_cycle(state, config, rng, house_id, events);
    }
}

/// `effective_docks = base_docks x cstMultiplier(level)`, recomputed for
/// every facility so CST advances land immediately.
fn recompute_effective_docks(state: &mut GameState, config: &GameConfig) {
    let updates: Vec<(ec4x_types::NeoriaId, u32)> = state
        .neorias
        .iter()
        .filter_map(|(id, neoria)| {
            let owner = state.colonies.get(neoria.colony)?.owner;
            let cst = state.houses.get(owner)?.tech.construction;
            Some((id, config.facilities.effective_docks(neoria.base_docks, cst)))
        })
        .collect();
    for (neoria_id, docks) in updates {
        if let Some(neoria) = state.neorias.get_mut(neoria_id) {
            neoria.effective_docks = docks;
        }
    }
}

/// Measure colonization and prestige, and advance the public act.
fn update_act(state: &mut GameState) {
    let total_systems = state.map.system_count().max(1);
    let colonized = state.colonies.len();
    let percent = u8::try_from(colonized.saturating_mul(100) / total_systems).unwrap_or(100);
    let total_prestige: i64 = state
        .houses
        .iter()
        .filter(|(_, house)| !house.is_collapsed())
        .map(|(_, house)| house.prestige)
        .sum();

    let standing = state
        .houses
        .iter()
        .filter(|(_, house)| !house.is_collapsed())
        .count();
    let at_war = state
        .diplomacy
        .iter()
        .any(|(_, record)| record.state.0 == DiplomaticState::Enemy);

    let next_act = if standing <= 2 || total_prestige >= 2000 {
        Act::Endgame
    } else if at_war || percent >= 70 {
        Act::TotalWar
    } else if percent >= 40 {
        Act::RisingTensions
    } else {
        Act::LandGrab
    };

    if next_act != state.act.act && next_act > state.act.act {
        state.act.act = next_act;
        state.act.started_turn = state.turn;
    }
    state.act.colonization_percent = percent;
    state.act.total_prestige = total_prestige;
}
