//! Phase 1: Conflict.
//!
//! Battles resolve wherever mutually hostile fleets share a system, in
//! ascending system order: space theater, then orbital. Espionage actions
//! resolve next, one per house in ascending house order. Planetary-combat
//! orders (bombard, invade, blitz) execute last, for every fleet already
//! on station over its target; fleets still in transit keep the order and
//! strike on a later turn.

use ec4x_events::{EventPayload, GameEvent};
use ec4x_rules::combat;
use ec4x_rules::{GameConfig, espionage};
use ec4x_state::{ActiveOrder, GameState};
use ec4x_types::{FleetCommandKind, FleetId, SystemId};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::phases::TurnContext;

/// Prestige swing for taking a colony.
const CAPTURE_PRESTIGE: i64 = 20;

/// Run the Conflict phase.
pub fn run(
    state: &mut GameState,
    config: &GameConfig,
    rng: &mut ChaCha8Rng,
    ctx: &mut TurnContext,
    events: &mut Vec<GameEvent>,
) {
    let first_new_event = events.len();

    // a-f: system battles, ascending system id.
    for system in combat::collect_battle_systems(state) {
        combat::resolve_battle(state, config, rng, system, events);
    }

    // g: espionage, one action per house, ascending house id.
    for house in state.house_ids() {
        let command = ctx
            .outcomes
            .get(&house)
            .and_then(|outcome| outcome.accepted.espionage.clone());
        if let Some(command) = command {
            espionage::resolve_action(state, config, rng, house, &command, events);
        }
    }

    // h: planetary combat after space and orbital resolution.
    run_planetary_orders(state, config, rng, ctx, events);

    // Book wreck values and combat prestige from this phase's events.
    digest_combat_events(config, ctx, events, first_new_event);
}

/// Execute planetary-combat orders for fleets on station; stage orders
/// for fleets still in transit.
fn run_planetary_orders(
    state: &mut GameState,
    config: &GameConfig,
    rng: &mut ChaCha8Rng,
    ctx: &TurnContext,
    events: &mut Vec<GameEvent>,
) {
    // Standing orders from earlier turns fire first.
    let carried: Vec<(FleetId, FleetCommandKind, SystemId)> = state
        .fleets
        .iter()
        .filter_map(|(id, fleet)| {
            let order = fleet.active_order?;
            let target = order.target_system?;
            if order.kind.is_planetary_attack() && fleet.system == target {
                Some((id, order.kind, target))
            } else {
                None
            }
        })
        .collect();
    for (fleet_id, kind, target) in carried {
        execute_planetary(state, config, rng, fleet_id, kind, target, events);
    }

    // Newly accepted orders: execute when on station, stage otherwise.
    for house in state.house_ids() {
        let Some(outcome) = ctx.outcomes.get(&house) else {
            continue;
        };
        for command in &outcome.accepted.fleet {
            if !command.kind.is_planetary_attack() {
                continue;
            }
            let Some(fleet) = state.fleets.get(command.fleet) else {
                continue;
            };
            let target = command.target_system.unwrap_or(fleet.system);
            if fleet.system == target {
                execute_planetary(state, config, rng, command.fleet, command.kind, target, events);
            } else if let Some(fleet) = state.fleets.get_mut(command.fleet) {
                fleet.active_order = Some(ActiveOrder {
                    kind: command.kind,
                    target_system: Some(target),
                    target_fleet: None,
                });
                debug!(fleet = %command.fleet, %target, "planetary order staged for transit");
            }
        }
    }
}

fn execute_planetary(
    state: &mut GameState,
    config: &GameConfig,
    rng: &mut ChaCha8Rng,
    fleet_id: FleetId,
    kind: FleetCommandKind,
    target: SystemId,
    events: &mut Vec<GameEvent>,
) {
    let Some(colony_id) = state.colony_at(target) else {
        if let Some(owner) = state.fleets.get(fleet_id).map(|f| f.owner) {
            events.push(
                GameEvent::for_house(
                    state.turn,
                    owner,
                    EventPayload::OrderFailed {
                        fleet: fleet_id,
                        detail: "no colony remains at the target".to_owned(),
                    },
                )
                .at(target),
            );
        }
        clear_order(state, fleet_id);
        return;
    };

    match kind {
        FleetCommandKind::Bombard => {
            combat::resolve_bombardment(state, config, rng, fleet_id, colony_id, events);
        }
        FleetCommandKind::Invade => {
            combat::resolve_invasion(state, config, rng, fleet_id, colony_id, events);
        }
        FleetCommandKind::Blitz => {
            combat::resolve_blitz(state, config, rng, fleet_id, colony_id, events);
        }
        _ => {}
    }
    clear_order(state, fleet_id);
}

fn clear_order(state: &mut GameState, fleet_id: FleetId) {
    if let Some(fleet) = state.fleets.get_mut(fleet_id) {
        fleet.active_order = None;
    }
}

/// Walk the phase's new events once: wreck values for salvage, prestige
/// for captures and repelled invasions.
fn digest_combat_events(
    config: &GameConfig,
    ctx: &mut TurnContext,
    events: &[GameEvent],
    first_new_event: usize,
) {
    for event in events.iter().skip(first_new_event) {
        match &event.payload {
            EventPayload::ShipDestroyed { class } => {
                if let Some(system) = event.system {
                    let value = config.ships.row(*class).cost / 4;
                    let entry = ctx.wreck_value.entry(system).or_insert(0);
                    *entry = entry.saturating_add(value);
                }
            }
            EventPayload::ColonyCaptured { from } => {
                if let Some(attacker) = event.house {
                    ctx.queue_prestige(attacker, CAPTURE_PRESTIGE, "colony captured");
                }
                ctx.queue_prestige(*from, -CAPTURE_PRESTIGE, "colony lost");
            }
            EventPayload::InvasionRepelled => {
                if let Some(defender) = event.house {
                    ctx.queue_prestige(defender, CAPTURE_PRESTIGE / 2, "invasion repelled");
                }
            }
            _ => {}
        }
    }
}
