//! The turn resolver: exactly four phases over one seeded RNG.
//!
//! `resolve_turn` is a pure function of `(state, packets, config, seed)`:
//! the input state is never mutated, all randomness comes from the seed,
//! and iteration everywhere is in ascending id order. After every phase
//! the invariant audit runs; any finding poisons the turn, the working
//! state is discarded, and the prior state is returned untouched with
//! diagnostic events.

use std::collections::BTreeMap;

use ec4x_events::{EventPayload, GameEvent};
use ec4x_rules::{GameConfig, validate};
use ec4x_state::{AuditFinding, GameState};
use ec4x_types::{CommandPacket, HouseId};
use tracing::{info, warn};

use crate::phases::{TurnContext, command, conflict, income, maintenance};
use crate::rng;

/// The distinguished return of one turn resolution.
#[derive(Debug, Clone)]
pub struct ResolveOutcome {
    /// The post-turn state; identical to the input when poisoned.
    pub state: GameState,
    /// The turn's event log.
    pub events: Vec<GameEvent>,
    /// Audit findings when the turn was poisoned; empty on success.
    pub poisoned: Vec<AuditFinding>,
}

/// Resolve one turn.
///
/// The seed should come from [`rng::turn_seed`] so replays of different
/// games stay uncorrelated; it is a parameter so that replay tooling can
/// feed back a recorded seed.
#[must_use]
pub fn resolve_turn(
    state: &GameState,
    packets: &BTreeMap<HouseId, CommandPacket>,
    config: &GameConfig,
    seed: u64,
) -> ResolveOutcome {
    let mut working = state.clone();
    let mut events: Vec<GameEvent> = Vec::new();
    let mut ctx = TurnContext::default();
    let turn = working.turn;
    info!(game = %working.game_id, turn, packets = packets.len(), "resolving turn");

    // Receiving any packet wakes an autopilot house before validation.
    for (house_id, _) in packets {
        if let Some(house) = working.houses.get_mut(*house_id) {
            house.on_packet_received();
        }
        ctx.submitted.insert(*house_id);
    }

    // Validation and the budget gate, houses ascending.
    for (house_id, packet) in packets {
        let outcome = validate(&working, config, packet);
        for rejection in &outcome.rejections {
            events.push(GameEvent::for_house(
                turn,
                rejection.house,
                EventPayload::CommandRejected {
                    reason: rejection.reason,
                    detail: rejection.detail.clone(),
                },
            ));
        }
        let summary = &outcome.cost_summary;
        events.push(GameEvent::for_house(
            turn,
            *house_id,
            EventPayload::CostSummary {
                build: summary.build,
                research: summary.research,
                espionage: summary.espionage,
                civil: summary.civil,
                maintenance_reserved: summary.maintenance_reserved,
                can_afford: summary.can_afford,
                warnings: summary.warnings.clone(),
            },
        ));
        ctx.outcomes.insert(*house_id, outcome);
    }

    let mut turn_rng = rng::turn_rng(seed);

    conflict::run(&mut working, config, &mut turn_rng, &mut ctx, &mut events);
    if let Some(poisoned) = audit(state, &working, turn) {
        return poisoned;
    }

    income::run(&mut working, config, &mut ctx, &mut events);
    if let Some(poisoned) = audit(state, &working, turn) {
        return poisoned;
    }

    command::run(&mut working, config, &mut turn_rng, &mut ctx, &mut events);
    if let Some(poisoned) = audit(state, &working, turn) {
        return poisoned;
    }

    maintenance::run(&mut working, config, &mut turn_rng, &mut ctx, &mut events);
    if let Some(poisoned) = audit(state, &working, turn) {
        return poisoned;
    }

    info!(turn, events = events.len(), "turn resolved");
    ResolveOutcome {
        state: working,
        events,
        poisoned: Vec::new(),
    }
}

/// Run the invariant audit; on findings, roll back to the prior state.
fn audit(prior: &GameState, working: &GameState, turn: u32) -> Option<ResolveOutcome> {
    let findings = working.verify_invariants();
    if findings.is_empty() {
        return None;
    }
    warn!(turn, count = findings.len(), "turn poisoned; rolling back");
    let rendered: Vec<String> = findings.iter().map(ToString::to_string).collect();
    Some(ResolveOutcome {
        state: prior.clone(),
        events: vec![GameEvent::global(
            turn,
            EventPayload::TurnPoisoned { findings: rendered },
        )],
        poisoned: findings,
    })
}
