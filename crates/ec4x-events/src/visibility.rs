//! Per-event audience rules and the visibility filter.
//!
//! Each event kind maps to exactly one [`Audience`]; the filter applies
//! that rule using the state's single presence test. The projector and
//! this filter are the only two places fog-of-war is enforced.

use ec4x_state::GameState;
use ec4x_types::HouseId;

use crate::event::{EventPayload, GameEvent};

/// Who may see an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    /// The acting house only.
    Actor,
    /// The acting house and the target house.
    ActorAndTarget,
    /// The target (detecting) house only.
    Target,
    /// Any house with presence in the event's system.
    PresenceInSystem,
    /// Every house.
    All,
}

/// The audience rule for a payload kind.
#[must_use]
pub const fn audience(payload: &EventPayload) -> Audience {
    match payload {
        // Own order completions, rejections, reports.
        EventPayload::CommandRejected { .. }
        | EventPayload::OrderCompleted { .. }
        | EventPayload::OrderFailed { .. }
        | EventPayload::FleetArrived { .. }
        | EventPayload::ConstructionCompleted { .. }
        | EventPayload::RepairCompleted { .. }
        | EventPayload::TechAdvance { .. }
        | EventPayload::Breakthrough { .. }
        | EventPayload::IntelGathered { .. }
        | EventPayload::PrestigeChanged { .. }
        | EventPayload::ResourceWarning { .. }
        | EventPayload::CostSummary { .. }
        | EventPayload::ColonyIncomeReport { .. }
        | EventPayload::TransferResolved { .. }
        | EventPayload::TerraformCompleted { .. }
        | EventPayload::StatusChanged { .. } => Audience::Actor,

        // Diplomacy is public, except proposals which stay between the
        // two houses.
        EventPayload::DiplomaticStateChanged { .. }
        | EventPayload::PactSealed
        | EventPayload::PactBroken { .. }
        | EventPayload::HouseEliminated => Audience::All,
        EventPayload::PactProposed { .. } | EventPayload::ProposalClosed => {
            Audience::ActorAndTarget
        }

        // Combat and colonization are visible to anyone on the scene.
        EventPayload::BattleOccurred { .. }
        | EventPayload::CombatTheaterBegan { .. }
        | EventPayload::CombatTheaterCompleted { .. }
        | EventPayload::CombatPhaseBegan { .. }
        | EventPayload::CombatPhaseCompleted { .. }
        | EventPayload::WeaponFired { .. }
        | EventPayload::ShipDamaged { .. }
        | EventPayload::ShipDestroyed { .. }
        | EventPayload::ShieldActivated
        | EventPayload::StarbaseCombat { .. }
        | EventPayload::BombardmentRoundBegan { .. }
        | EventPayload::BombardmentRoundCompleted { .. }
        | EventPayload::FleetRetreat { .. }
        | EventPayload::InvasionBegan
        | EventPayload::BlitzBegan
        | EventPayload::GroundCombatRound { .. }
        | EventPayload::InvasionRepelled
        | EventPayload::FighterEngagement { .. }
        | EventPayload::CarrierDestroyed { .. }
        | EventPayload::ColonyCaptured { .. }
        | EventPayload::SystemCaptured { .. }
        | EventPayload::ColonyEstablished { .. }
        | EventPayload::FallbackColonySuccess { .. }
        | EventPayload::NoViableTarget => Audience::PresenceInSystem,

        // Espionage successes go to the attacker alone.
        EventPayload::EspionageExecuted { .. } => Audience::Actor,

        // Detections go to the detecting house, and the attacker learns
        // the mission was blown.
        EventPayload::SpyMissionDetected { .. } => Audience::ActorAndTarget,
        EventPayload::ScoutDetected | EventPayload::ScoutDestroyed => Audience::Target,

        // Owner-only diagnostics.
        EventPayload::RaiderStealthSuccess | EventPayload::StarbaseSurveillanceDetection => {
            Audience::Actor
        }

        // Engine diagnostics are public.
        EventPayload::TurnPoisoned { .. } => Audience::All,
    }
}

/// Whether one event is visible to a viewer.
#[must_use]
pub fn is_visible(event: &GameEvent, viewer: HouseId, state: &GameState) -> bool {
    match audience(&event.payload) {
        Audience::All => true,
        Audience::Actor => event.house == Some(viewer),
        Audience::Target => event.target_house == Some(viewer),
        Audience::ActorAndTarget => {
            event.house == Some(viewer) || event.target_house == Some(viewer)
        }
        Audience::PresenceInSystem => event
            .system
            .is_some_and(|system| state.has_presence(viewer, system)),
    }
}

/// Build one house's event stream from the turn's full log.
#[must_use]
pub fn filter_events(events: &[GameEvent], viewer: HouseId, state: &GameState) -> Vec<GameEvent> {
    events
        .iter()
        .filter(|event| is_visible(event, viewer, state))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use ec4x_map::{MapShape, generate_map};
    use ec4x_types::{GameId, SystemId, TechTree, Theater};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn state_with_two_houses() -> (GameState, HouseId, HouseId, SystemId) {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
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
        let system = state
            .map
            .systems()
            .next()
            .map(|s| s.id)
            .unwrap_or(SystemId::from_parts(0, 0));
        (state, a, b, system)
    }

    #[test]
    fn actor_events_stay_private() {
        let (state, a, b, _) = state_with_two_houses();
        let event = GameEvent::for_house(
            1,
            a,
            EventPayload::ResourceWarning {
                detail: "treasury low".to_owned(),
            },
        );
        assert!(is_visible(&event, a, &state));
        assert!(!is_visible(&event, b, &state));
    }

    #[test]
    fn diplomacy_is_public() {
        let (state, a, b, _) = state_with_two_houses();
        let event = GameEvent::for_house(1, a, EventPayload::PactSealed).against(b);
        assert!(is_visible(&event, a, &state));
        assert!(is_visible(&event, b, &state));
    }

    #[test]
    fn combat_requires_presence() {
        let (mut state, a, b, system) = state_with_two_houses();
        let event = GameEvent::for_house(
            1,
            a,
            EventPayload::CombatTheaterBegan {
                theater: Theater::Space,
            },
        )
        .at(system);
        // Neither house has presence yet: only participants with assets
        // on the scene may watch.
        assert!(!is_visible(&event, b, &state));
        let _ = state.create_fleet(b, system);
        assert!(is_visible(&event, b, &state));
    }

    #[test]
    fn detections_reach_detector_and_attacker() {
        let (state, a, b, _) = state_with_two_houses();
        let event = GameEvent::for_house(
            3,
            a,
            EventPayload::SpyMissionDetected {
                kind: ec4x_types::EspionageActionKind::Sabotage,
            },
        )
        .against(b);
        assert!(is_visible(&event, a, &state));
        assert!(is_visible(&event, b, &state));
    }

    #[test]
    fn filter_builds_per_house_streams() {
        let (mut state, a, b, system) = state_with_two_houses();
        let _ = state.create_fleet(a, system);
        let events = vec![
            GameEvent::for_house(
                1,
                a,
                EventPayload::ResourceWarning {
                    detail: "x".to_owned(),
                },
            ),
            GameEvent::global(1, EventPayload::HouseEliminated),
            GameEvent::for_house(1, b, EventPayload::ShipDestroyed {
                class: ec4x_types::ShipClass::Destroyer,
            })
            .at(system),
        ];
        let stream_a = filter_events(&events, a, &state);
        let stream_b = filter_events(&events, b, &state);
        // House A sees its warning, the public event, and the combat at
        // its system; house B has no presence there.
        assert_eq!(stream_a.len(), 3);
        assert_eq!(stream_b.len(), 1);
    }
}
