//! Diplomacy rules: relation transitions, pacts, violations.
//!
//! Relations move through the four-state machine one player action at a
//! time: Neutral and Ally interconvert through proposals, hostility
//! escalates Neutral to Hostile to Enemy, and Enemy stands down to
//! Neutral. Breaking a pact costs prestige on a worsening schedule and
//! opens dishonor and isolation windows on the pair.

use ec4x_events::{EventPayload, GameEvent};
use ec4x_state::{
    FIRST_VIOLATION_PENALTY, GameState, PROPOSAL_LIFETIME_TURNS, PendingProposal,
    REPEAT_VIOLATION_PENALTY,
};
use ec4x_types::{DiplomaticAction, DiplomaticCommand, DiplomaticState, HouseId, ProposalId};
use tracing::debug;

/// Turns a pact-breaker stays dishonored.
const DISHONOR_TURNS: u32 = 6;

/// Turns a repeat violator stays isolated.
const ISOLATION_TURNS: u32 = 12;

/// Execute one validated diplomatic command.
pub fn execute_command(
    state: &mut GameState,
    actor: HouseId,
    command: &DiplomaticCommand,
    events: &mut Vec<GameEvent>,
) {
    let turn = state.turn;
    let target = command.target;
    match command.action {
        DiplomaticAction::ProposePact => {
            let expires_turn = turn.saturating_add(PROPOSAL_LIFETIME_TURNS);
            let _ = state.proposals.insert_with(|id| PendingProposal {
                id,
                from: actor,
                to: target,
                created_turn: turn,
                expires_turn,
            });
            events.push(
                GameEvent::for_house(turn, actor, EventPayload::PactProposed { expires_turn })
                    .against(target),
            );
        }
        DiplomaticAction::AcceptPact => {
            let proposal = find_proposal(state, target, actor);
            if let Some(proposal_id) = proposal {
                let _ = state.proposals.remove(proposal_id);
                state.diplomacy.set_state(actor, target, DiplomaticState::Ally);
                state.diplomacy.record_mut(actor, target).pact_since = Some(turn);
                events.push(
                    GameEvent::for_house(turn, actor, EventPayload::PactSealed).against(target),
                );
                events.push(
                    GameEvent::for_house(
                        turn,
                        actor,
                        EventPayload::DiplomaticStateChanged {
                            state: DiplomaticState::Ally,
                        },
                    )
                    .against(target),
                );
                debug!(%actor, %target, "pact sealed");
            }
        }
        DiplomaticAction::WithdrawProposal => {
            if let Some(proposal_id) = find_proposal(state, actor, target) {
                let _ = state.proposals.remove(proposal_id);
                events.push(
                    GameEvent::for_house(turn, actor, EventPayload::ProposalClosed).against(target),
                );
            }
        }
        DiplomaticAction::BreakPact => {
            let penalty = violation_penalty(state, actor, target);
            state
                .diplomacy
                .set_state(actor, target, DiplomaticState::Neutral);
            {
                let record = state.diplomacy.record_mut(actor, target);
                record.pact_since = None;
                record.violations = record.violations.saturating_add(1);
                record.dishonor_until = Some(turn.saturating_add(DISHONOR_TURNS));
                if record.violations > 1 {
                    record.isolation_until = Some(turn.saturating_add(ISOLATION_TURNS));
                }
            }
            if let Some(house) = state.houses.get_mut(actor) {
                house.prestige = house.prestige.saturating_add(penalty);
            }
            events.push(
                GameEvent::for_house(turn, actor, EventPayload::PactBroken { penalty })
                    .against(target),
            );
            events.push(
                GameEvent::for_house(
                    turn,
                    actor,
                    EventPayload::DiplomaticStateChanged {
                        state: DiplomaticState::Neutral,
                    },
                )
                .against(target),
            );
            debug!(%actor, %target, penalty, "pact broken");
        }
        DiplomaticAction::DeclareHostile => {
            transition(state, actor, target, DiplomaticState::Hostile, events);
        }
        DiplomaticAction::DeclareEnemy => {
            transition(state, actor, target, DiplomaticState::Enemy, events);
        }
        DiplomaticAction::SetNeutral => {
            transition(state, actor, target, DiplomaticState::Neutral, events);
        }
    }
}

fn transition(
    state: &mut GameState,
    actor: HouseId,
    target: HouseId,
    to: DiplomaticState,
    events: &mut Vec<GameEvent>,
) {
    let turn = state.turn;
    state.diplomacy.set_state(actor, target, to);
    events.push(
        GameEvent::for_house(turn, actor, EventPayload::DiplomaticStateChanged { state: to })
            .against(target),
    );
    debug!(%actor, %target, ?to, "diplomatic state changed");
}

/// Find the open proposal from one house to another.
fn find_proposal(state: &GameState, from: HouseId, to: HouseId) -> Option<ProposalId> {
    state
        .proposals
        .iter()
        .find(|(_, proposal)| proposal.from == from && proposal.to == to)
        .map(|(id, _)| id)
}

/// The prestige penalty for this violation: worse the first time, a flat
/// rate for repeats.
fn violation_penalty(state: &GameState, a: HouseId, b: HouseId) -> i64 {
    let prior = state.diplomacy.record(a, b).map_or(0, |r| r.violations);
    if prior == 0 {
        FIRST_VIOLATION_PENALTY
    } else {
        REPEAT_VIOLATION_PENALTY
    }
}

/// Expire lapsed proposals. Runs in Maintenance.
pub fn expire_proposals(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let turn = state.turn;
    let lapsed: Vec<(ProposalId, HouseId, HouseId)> = state
        .proposals
        .iter()
        .filter(|(_, proposal)| proposal.expires_turn <= turn)
        .map(|(id, proposal)| (id, proposal.from, proposal.to))
        .collect();
    for (proposal_id, from, to) in lapsed {
        let _ = state.proposals.remove(proposal_id);
        events.push(GameEvent::for_house(turn, from, EventPayload::ProposalClosed).against(to));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ec4x_map::{MapShape, generate_map};
    use ec4x_types::{GameId, TechTree};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn two_house_state() -> (GameState, HouseId, HouseId) {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let map = generate_map(
            MapShape {
                rings: 2,
                houses: 2,
            },
            &mut rng,
        )
        .map(|g| g.map)
        .unwrap_or_default();
        let mut state = GameState::empty(GameId::new(), map);
        let a = state.add_house("Atreides".to_owned(), 100, TechTree::default());
        let b = state.add_house("Harkonnen".to_owned(), 100, TechTree::default());
        (state, a, b)
    }

    fn run(state: &mut GameState, actor: HouseId, target: HouseId, action: DiplomaticAction) {
        let mut events = Vec::new();
        execute_command(state, actor, &DiplomaticCommand { target, action }, &mut events);
    }

    #[test]
    fn propose_then_accept_seals_a_pact() {
        let (mut state, a, b) = two_house_state();
        run(&mut state, a, b, DiplomaticAction::ProposePact);
        assert_eq!(state.proposals.len(), 1);
        run(&mut state, b, a, DiplomaticAction::AcceptPact);
        assert_eq!(state.proposals.len(), 0);
        assert_eq!(state.diplomacy.state_of(a, b), DiplomaticState::Ally);
    }

    #[test]
    fn breaking_a_pact_costs_five_then_three() {
        let (mut state, a, b) = two_house_state();
        state.diplomacy.set_state(a, b, DiplomaticState::Ally);
        run(&mut state, a, b, DiplomaticAction::BreakPact);
        assert_eq!(state.houses.get(a).map(|h| h.prestige), Some(-5));
        assert_eq!(state.diplomacy.state_of(a, b), DiplomaticState::Neutral);

        state.diplomacy.set_state(a, b, DiplomaticState::Ally);
        run(&mut state, a, b, DiplomaticAction::BreakPact);
        assert_eq!(state.houses.get(a).map(|h| h.prestige), Some(-8));
    }

    #[test]
    fn escalation_ladder_reaches_enemy() {
        let (mut state, a, b) = two_house_state();
        run(&mut state, a, b, DiplomaticAction::DeclareHostile);
        assert_eq!(state.diplomacy.state_of(a, b), DiplomaticState::Hostile);
        run(&mut state, a, b, DiplomaticAction::DeclareEnemy);
        assert_eq!(state.diplomacy.state_of(a, b), DiplomaticState::Enemy);
        run(&mut state, a, b, DiplomaticAction::SetNeutral);
        assert_eq!(state.diplomacy.state_of(a, b), DiplomaticState::Neutral);
    }

    #[test]
    fn proposals_lapse_after_their_window() {
        let (mut state, a, b) = two_house_state();
        run(&mut state, a, b, DiplomaticAction::ProposePact);
        let mut events = Vec::new();
        state.turn = state.turn.saturating_add(PROPOSAL_LIFETIME_TURNS);
        expire_proposals(&mut state, &mut events);
        assert_eq!(state.proposals.len(), 0);
    }
}
