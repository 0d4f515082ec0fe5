//! End-to-end engine scenarios and the quantified property suite.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use std::collections::BTreeMap;

use ec4x_core::{
    GameConfig, GameSetup, is_victory, new_game, project_for, resolve_turn, turn_seed,
};
use ec4x_events::EventPayload;
use ec4x_map::{MapShape, generate_map};
use ec4x_state::{GameState, PopulationInTransit, ShipStats};
use ec4x_types::{
    BuildCommand, BuildItem, CommandPacket, DiplomaticState, FleetCommand, FleetCommandKind,
    GameId, HouseId, HouseStatus, PlanetClass, ResourceRating, ShipClass, SystemId, TechTree,
};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn game_id(n: u128) -> GameId {
    GameId::from(uuid::Uuid::from_u128(n))
}

fn no_packets() -> BTreeMap<HouseId, CommandPacket> {
    BTreeMap::new()
}

/// A bare state on a small generated map, no houses yet.
fn bare_state(seed: u64) -> GameState {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let map = generate_map(
        MapShape {
            rings: 2,
            houses: 2,
        },
        &mut rng,
    )
    .map(|g| g.map)
    .expect("map generation");
    GameState::empty(game_id(1), map)
}

fn nth_system(state: &GameState, n: usize) -> SystemId {
    state.map.systems().nth(n).map(|s| s.id).expect("system")
}

// ---------------------------------------------------------------------------
// Determinism and invariants
// ---------------------------------------------------------------------------

#[test]
fn resolution_is_bit_identical() {
    let setup = GameSetup {
        game_id: game_id(2),
        seed: 11,
        ..GameSetup::default()
    };
    let config = GameConfig::default();
    let state = new_game(&setup, &config).expect("new game");
    let seed = turn_seed(state.game_id, state.turn);

    let a = resolve_turn(&state, &no_packets(), &config, seed);
    let b = resolve_turn(&state, &no_packets(), &config, seed);
    assert_eq!(a.state, b.state);
    assert_eq!(a.events, b.events);
    assert!(a.poisoned.is_empty());
}

#[test]
fn resolved_states_pass_the_audit() {
    let setup = GameSetup {
        game_id: game_id(3),
        seed: 4,
        ..GameSetup::default()
    };
    let config = GameConfig::default();
    let mut state = new_game(&setup, &config).expect("new game");
    for _ in 0..5 {
        let seed = turn_seed(state.game_id, state.turn);
        let outcome = resolve_turn(&state, &no_packets(), &config, seed);
        assert!(outcome.poisoned.is_empty());
        state = outcome.state;
        assert!(state.verify_invariants().is_empty());
    }
    assert_eq!(state.turn, 6);
}

// ---------------------------------------------------------------------------
// Scenario 1: basic income
// ---------------------------------------------------------------------------

#[test]
fn lush_homeworld_income_report() {
    let mut state = bare_state(5);
    let config = GameConfig::default();
    let house = state.add_house("House Tahl".to_owned(), 500, TechTree::default());
    let system = nth_system(&state, 0);
    if let Some(s) = state.map.system_mut(system) {
        s.planet_class = PlanetClass::Lush;
        s.resource_rating = ResourceRating::Abundant;
    }
    let colony = state.found_colony(house, system, 50).expect("colony");
    state.colonies.get_mut(colony).expect("colony").population = 12;

    let seed = turn_seed(state.game_id, state.turn);
    let outcome = resolve_turn(&state, &no_packets(), &config, seed);
    assert!(outcome.poisoned.is_empty());

    // PU 12, Lush 125%, Abundant 100%, tax 50%: gross 150, collected 75.
    let report = outcome
        .events
        .iter()
        .find_map(|event| match &event.payload {
            EventPayload::ColonyIncomeReport {
                colony: c,
                gross,
                collected,
                blockaded,
            } if *c == colony => Some((*gross, *collected, *blockaded)),
            _ => None,
        })
        .expect("income report");
    assert_eq!(report, (150, 75, false));

    // No assets means no upkeep; the treasury moves by income alone.
    assert_eq!(
        outcome.state.houses.get(house).map(|h| h.treasury),
        Some(575)
    );

    // Re-running the same inputs reproduces the same state and events.
    let again = resolve_turn(&state, &no_packets(), &config, seed);
    assert_eq!(again.state, outcome.state);
    assert_eq!(again.events, outcome.events);
}

// ---------------------------------------------------------------------------
// Scenario 2: simultaneous colonization tiebreak
// ---------------------------------------------------------------------------

/// Give a fleet a settler hull plus escorts totalling a chosen strength.
fn settler_fleet(
    state: &mut GameState,
    house: HouseId,
    at: SystemId,
    strength: u32,
) -> ec4x_types::FleetId {
    let fleet = state.create_fleet(house, at);
    let etac = state
        .commission_ship(
            fleet,
            ShipClass::Etac,
            ShipStats {
                attack: 0,
                defense: 2,
                command_cost: 1,
                cargo_capacity: 30,
                wep_at_build: 1,
            },
        )
        .expect("etac");
    state.ships.get_mut(etac).expect("etac").colonists = 30;
    let _ = state
        .commission_ship(
            fleet,
            ShipClass::Destroyer,
            ShipStats {
                attack: strength,
                defense: 4,
                command_cost: 2,
                cargo_capacity: 0,
                wep_at_build: 1,
            },
        )
        .expect("escort");
    fleet
}

#[test]
fn colonization_race_tiebreak() {
    let mut state = bare_state(9);
    let config = GameConfig::default();
    let a = state.add_house("A".to_owned(), 500, TechTree::default());
    let b = state.add_house("B".to_owned(), 500, TechTree::default());
    let c = state.add_house("C".to_owned(), 500, TechTree::default());
    // Pacted rivals race without shooting; the tiebreak alone decides.
    state.diplomacy.set_state(a, b, DiplomaticState::Ally);
    state.diplomacy.set_state(a, c, DiplomaticState::Ally);
    state.diplomacy.set_state(b, c, DiplomaticState::Ally);
    let target = nth_system(&state, 3);
    if let Some(s) = state.map.system_mut(target) {
        s.planet_class = PlanetClass::Eden;
    }

    let strengths = [(a, 12), (b, 12), (c, 7)];
    let mut packets = BTreeMap::new();
    for (house, strength) in strengths {
        let fleet = settler_fleet(&mut state, house, target, strength);
        let mut packet = CommandPacket::empty(state.game_id, house, state.turn);
        packet.fleet_commands.push(FleetCommand {
            fleet,
            kind: FleetCommandKind::Colonize,
            target_system: Some(target),
            target_fleet: None,
            priority: 0,
        });
        packets.insert(house, packet);
    }

    let seed = turn_seed(state.game_id, state.turn);
    let outcome = resolve_turn(&state, &packets, &config, seed);
    assert!(outcome.poisoned.is_empty());

    // Strength-descending then house-ascending: house A wins.
    let winner = outcome
        .events
        .iter()
        .find_map(|event| match &event.payload {
            EventPayload::ColonyEstablished { colony } => {
                outcome.state.colonies.get(*colony).map(|c| c.owner)
            }
            _ => None,
        })
        .expect("a colony was established");
    assert_eq!(winner, a);

    let lost_races = outcome
        .events
        .iter()
        .filter(|event| {
            matches!(
                &event.payload,
                EventPayload::OrderFailed { detail, .. } if detail == "lost colonization race"
            )
        })
        .count();
    assert_eq!(lost_races, 2);

    // Losers either settled a fallback system or reported no target.
    let fallback_or_exhausted = outcome
        .events
        .iter()
        .filter(|event| {
            matches!(
                &event.payload,
                EventPayload::FallbackColonySuccess { .. } | EventPayload::NoViableTarget
            )
        })
        .count();
    assert!(fallback_or_exhausted >= 1);
}

// ---------------------------------------------------------------------------
// Scenario 3: budget rejection cascade
// ---------------------------------------------------------------------------

#[test]
fn budget_cascade_rejects_in_fifo_order() {
    let mut state = bare_state(13);
    // Tune the tables so projected maintenance is exactly 50: five
    // destroyers at 10 PP upkeep each.
    let mut config = GameConfig::default();
    config.ships.rows[ShipClass::Destroyer.table_index()].upkeep = 10;

    let house = state.add_house("House Sor".to_owned(), 300, TechTree::uniform(9));
    let system = nth_system(&state, 0);
    let colony = state.found_colony(house, system, 50).expect("colony");

    // A shipyard keeps ship costs at base (no planet-side doubling).
    let docks = config.facilities.effective_docks(10, 9);
    let yard = state.neorias.insert_with(|id| {
        ec4x_state::Neoria::commissioned(id, colony, ec4x_types::NeoriaClass::Shipyard, 1, docks)
    });
    state.colonies.get_mut(colony).expect("colony").neorias.insert(yard);

    let fleet = state.create_fleet(house, system);
    for _ in 0..5 {
        let _ = state.commission_ship(
            fleet,
            ShipClass::Destroyer,
            ShipStats {
                attack: 5,
                defense: 4,
                command_cost: 2,
                cargo_capacity: 0,
                wep_at_build: 1,
            },
        );
    }

    let mut packet = CommandPacket::empty(state.game_id, house, state.turn);
    packet.build_commands.push(BuildCommand {
        colony,
        item: BuildItem::Ship(ShipClass::Battleship),
        quantity: 1,
    });
    packet.build_commands.push(BuildCommand {
        colony,
        item: BuildItem::Ship(ShipClass::Cruiser),
        quantity: 1,
    });
    packet.ebp_investment = 1;
    packet.research.srp_pp = 60;

    let outcome = ec4x_core::validate(&state, &config, &packet);

    // Reservation 50 leaves 250: the 280 PP battleship dies, the 120 PP
    // cruiser passes (130 left), the 40 PP point passes (90 left), and
    // research fits whole (30 left).
    assert_eq!(outcome.cost_summary.maintenance_reserved, 50);
    assert_eq!(outcome.rejections.len(), 1);
    assert_eq!(
        outcome.rejections[0].reason,
        ec4x_types::RejectionReason::InsufficientFunds
    );
    assert_eq!(outcome.accepted.builds.len(), 1);
    assert!(matches!(
        outcome.accepted.builds[0].item,
        BuildItem::Ship(ShipClass::Cruiser)
    ));
    assert_eq!(outcome.accepted.ebp_investment, 1);
    assert_eq!(outcome.accepted.research.total_pp(), 60);
    assert_eq!(outcome.cost_summary.build, 120);
    assert_eq!(outcome.cost_summary.espionage, 40);
    assert_eq!(outcome.cost_summary.research, 60);
    assert!(!outcome.cost_summary.can_afford);
}

// ---------------------------------------------------------------------------
// Scenario 4: detection and a deterministic engagement
// ---------------------------------------------------------------------------

#[test]
fn hostile_destroyers_fight_deterministically() {
    let mut state = bare_state(21);
    let config = GameConfig::default();
    let a = state.add_house("A".to_owned(), 500, TechTree::default());
    let b = state.add_house("B".to_owned(), 500, TechTree::default());
    if let Some(house) = state.houses.get_mut(a) {
        house.tech.cloaking = 5;
        house.tech.electronic_intel = 4;
    }
    if let Some(house) = state.houses.get_mut(b) {
        house.tech.electronic_intel = 2;
    }
    state.diplomacy.set_state(a, b, DiplomaticState::Enemy);

    let system = nth_system(&state, 1);
    for house in [a, b] {
        let fleet = state.create_fleet(house, system);
        let _ = state.commission_ship(
            fleet,
            ShipClass::Destroyer,
            ShipStats {
                attack: 5,
                defense: 4,
                command_cost: 2,
                cargo_capacity: 0,
                wep_at_build: 1,
            },
        );
    }

    let seed = turn_seed(state.game_id, 7);
    let first = resolve_turn(&state, &no_packets(), &config, seed);
    let second = resolve_turn(&state, &no_packets(), &config, seed);
    assert_eq!(first.events, second.events);

    assert!(first.events.iter().any(|event| matches!(
        event.payload,
        EventPayload::BattleOccurred { .. }
    )));
    let damage_events = first
        .events
        .iter()
        .filter(|event| {
            matches!(
                event.payload,
                EventPayload::ShipDamaged { .. } | EventPayload::ShipDestroyed { .. }
            )
        })
        .count();
    assert!(damage_events > 0, "a fought round leaves marks");
}

#[test]
fn allied_fleets_never_fight() {
    let mut state = bare_state(22);
    let config = GameConfig::default();
    let a = state.add_house("A".to_owned(), 500, TechTree::default());
    let b = state.add_house("B".to_owned(), 500, TechTree::default());
    state.diplomacy.set_state(a, b, DiplomaticState::Ally);

    let system = nth_system(&state, 1);
    for house in [a, b] {
        let fleet = state.create_fleet(house, system);
        let _ = state.commission_ship(
            fleet,
            ShipClass::Cruiser,
            ShipStats {
                attack: 7,
                defense: 6,
                command_cost: 2,
                cargo_capacity: 0,
                wep_at_build: 1,
            },
        );
    }

    let seed = turn_seed(state.game_id, state.turn);
    let outcome = resolve_turn(&state, &no_packets(), &config, seed);
    assert!(!outcome.events.iter().any(|event| matches!(
        event.payload,
        EventPayload::BattleOccurred { .. }
            | EventPayload::ShipDamaged { .. }
            | EventPayload::ShipDestroyed { .. }
    )));
}

// ---------------------------------------------------------------------------
// Scenario 5: transfer smart delivery
// ---------------------------------------------------------------------------

#[test]
fn captured_destination_redirects_the_transfer() {
    let mut state = bare_state(31);
    let config = GameConfig::default();
    let h = state.add_house("H".to_owned(), 1000, TechTree::default());
    let enemy = state.add_house("E".to_owned(), 1000, TechTree::default());

    let source_system = nth_system(&state, 0);
    let dest_system = nth_system(&state, 1);
    let source = state.found_colony(h, source_system, 50).expect("source");
    state.colonies.get_mut(source).expect("source").population = 10;
    let dest = state.found_colony(h, dest_system, 50).expect("dest");

    // A 3-PTU packet already in flight, due this turn.
    let arrival = state.turn;
    let _ = state.transits.insert_with(|id| PopulationInTransit {
        id,
        owner: h,
        source,
        destination: dest,
        ptu: 3,
        cost_paid: 45,
        arrival_turn: arrival,
    });

    // The destination falls before processing.
    assert!(state.transfer_colony(dest, enemy));

    let seed = turn_seed(state.game_id, state.turn);
    let outcome = resolve_turn(&state, &no_packets(), &config, seed);
    assert!(outcome.poisoned.is_empty());

    let resolved = outcome
        .events
        .iter()
        .find_map(|event| match &event.payload {
            EventPayload::TransferResolved {
                outcome,
                destination,
                delivered_to,
                ptu,
            } => Some((*outcome, *destination, *delivered_to, *ptu)),
            _ => None,
        })
        .expect("transfer resolved");
    assert_eq!(
        resolved,
        (
            ec4x_types::TransferOutcome::Redirected,
            dest,
            Some(source),
            3
        )
    );
}

// ---------------------------------------------------------------------------
// Scenario 6: autopilot threshold
// ---------------------------------------------------------------------------

#[test]
fn silence_engages_autopilot_and_a_packet_clears_it() {
    let setup = GameSetup {
        game_id: game_id(6),
        seed: 2,
        house_names: vec!["Silent".to_owned(), "Other".to_owned()],
        ..GameSetup::default()
    };
    let config = GameConfig::default();
    let mut state = new_game(&setup, &config).expect("new game");
    let silent = state.house_ids()[0];

    for _ in 0..3 {
        let seed = turn_seed(state.game_id, state.turn);
        state = resolve_turn(&state, &no_packets(), &config, seed).state;
    }
    assert_eq!(
        state.houses.get(silent).map(|h| h.status),
        Some(HouseStatus::Autopilot)
    );

    let packet = CommandPacket::empty(state.game_id, silent, state.turn);
    let packets: BTreeMap<HouseId, CommandPacket> = [(silent, packet)].into_iter().collect();
    let seed = turn_seed(state.game_id, state.turn);
    let outcome = resolve_turn(&state, &packets, &config, seed);
    assert_eq!(
        outcome.state.houses.get(silent).map(|h| h.status),
        Some(HouseStatus::Active)
    );
    assert_eq!(
        outcome.state.houses.get(silent).map(|h| h.turns_without_orders),
        Some(0)
    );
}

// ---------------------------------------------------------------------------
// Dock capacity
// ---------------------------------------------------------------------------

#[test]
fn dock_capacity_is_never_exceeded() {
    let mut state = bare_state(41);
    let config = GameConfig::default();
    let house = state.add_house("Builder".to_owned(), 2000, TechTree::uniform(2));
    let system = nth_system(&state, 0);
    let colony = state.found_colony(house, system, 50).expect("colony");

    // One spaceport: 5 effective docks at CST 2 is still 5 (110% of 5,
    // floored).
    let docks = config.facilities.effective_docks(5, 2);
    let port = state.neorias.insert_with(|id| {
        ec4x_state::Neoria::commissioned(id, colony, ec4x_types::NeoriaClass::Spaceport, 1, docks)
    });
    state.colonies.get_mut(colony).expect("colony").neorias.insert(port);

    let mut packet = CommandPacket::empty(state.game_id, house, state.turn);
    packet.build_commands.push(BuildCommand {
        colony,
        item: BuildItem::Ship(ShipClass::Destroyer),
        quantity: 7,
    });
    let packets: BTreeMap<HouseId, CommandPacket> = [(house, packet)].into_iter().collect();

    let seed = turn_seed(state.game_id, state.turn);
    let outcome = resolve_turn(&state, &packets, &config, seed);
    assert!(outcome.poisoned.is_empty());

    // However many projects remain in flight, dock occupancy never
    // exceeds the effective dock count.
    let occupied = outcome.state.occupied_docks(port);
    assert!(occupied <= docks, "{occupied} > {docks}");
    let total_projects = outcome.state.projects.len();
    let docked = outcome
        .state
        .projects
        .iter()
        .filter(|(_, project)| project.dock.is_some())
        .count();
    assert!(docked <= docks as usize);
    // The overflow beyond the docks waits in the queue.
    assert!(total_projects >= docked);
}

// ---------------------------------------------------------------------------
// Fog of war
// ---------------------------------------------------------------------------

#[test]
fn projection_hides_unknown_foreign_assets() {
    let setup = GameSetup {
        game_id: game_id(8),
        seed: 3,
        ..GameSetup::default()
    };
    let config = GameConfig::default();
    let state = new_game(&setup, &config).expect("new game");
    let houses = state.house_ids();
    let viewer = houses[0];

    let view = project_for(&state, viewer);
    assert_eq!(view.viewer, viewer);
    // Own assets in full.
    assert_eq!(view.own_colonies.len(), 1);
    assert_eq!(view.own_fleets.len(), 1);
    // Homeworlds start mutually unknown.
    assert!(view.foreign_colonies.is_empty());
    assert!(view.foreign_fleets.is_empty());
    // Diplomacy is public: every other-house pair appears.
    assert_eq!(view.relations.len(), houses.len() * (houses.len() - 1) / 2);
    // Every visible system obeys the rules: foreign detail only with
    // intel.
    for system_view in view.systems.values() {
        if system_view.visibility == ec4x_types::VisibilityLevel::Adjacent {
            assert!(system_view.planet_class.is_none());
            assert!(system_view.name.is_none());
        }
    }
}

#[test]
fn projection_is_stable() {
    let setup = GameSetup {
        game_id: game_id(9),
        seed: 14,
        ..GameSetup::default()
    };
    let config = GameConfig::default();
    let state = new_game(&setup, &config).expect("new game");
    let viewer = state.house_ids()[0];
    assert_eq!(project_for(&state, viewer), project_for(&state, viewer));
}

// ---------------------------------------------------------------------------
// Victory
// ---------------------------------------------------------------------------

#[test]
fn no_victory_at_game_start() {
    let setup = GameSetup {
        game_id: game_id(10),
        seed: 1,
        ..GameSetup::default()
    };
    let config = GameConfig::default();
    let state = new_game(&setup, &config).expect("new game");
    assert!(is_victory(&state).is_none());
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Determinism: the same seed and inputs always produce the same
    /// state and events, for arbitrary seeds.
    #[test]
    fn resolve_is_deterministic_for_any_seed(seed in any::<u64>()) {
        let setup = GameSetup {
            game_id: game_id(77),
            seed: 5,
            ..GameSetup::default()
        };
        let config = GameConfig::default();
        let state = new_game(&setup, &config).expect("new game");
        let a = resolve_turn(&state, &no_packets(), &config, seed);
        let b = resolve_turn(&state, &no_packets(), &config, seed);
        prop_assert_eq!(a.state, b.state);
        prop_assert_eq!(a.events, b.events);
    }

    /// Ownership and index consistency hold after any number of quiet
    /// turns, and no empty fleet survives the Command phase.
    #[test]
    fn invariants_hold_over_quiet_turns(turns in 1_u32..6) {
        let setup = GameSetup {
            game_id: game_id(78),
            seed: 6,
            ..GameSetup::default()
        };
        let config = GameConfig::default();
        let mut state = new_game(&setup, &config).expect("new game");
        for _ in 0..turns {
            let seed = turn_seed(state.game_id, state.turn);
            let outcome = resolve_turn(&state, &no_packets(), &config, seed);
            prop_assert!(outcome.poisoned.is_empty());
            state = outcome.state;
        }
        prop_assert!(state.verify_invariants().is_empty());
        for (_, fleet) in state.fleets.iter() {
            prop_assert!(!fleet.ships.is_empty());
        }
    }

    /// Population is conserved in PTU terms across quiet turns up to
    /// natural growth: the total never decreases without combat or lost
    /// transfers.
    #[test]
    fn population_never_shrinks_quietly(turns in 1_u32..5) {
        let setup = GameSetup {
            game_id: game_id(79),
            seed: 7,
            ..GameSetup::default()
        };
        let config = GameConfig::default();
        let mut state = new_game(&setup, &config).expect("new game");
        let total = |state: &GameState| -> u64 {
            let colonies: u64 = state
                .colonies
                .iter()
                .map(|(_, colony)| colony.population_ptu())
                .sum();
            let transit: u64 = state
                .transits
                .iter()
                .map(|(_, t)| u64::from(t.ptu))
                .sum();
            colonies + transit
        };
        let before = total(&state);
        for _ in 0..turns {
            let seed = turn_seed(state.game_id, state.turn);
            state = resolve_turn(&state, &no_packets(), &config, seed).state;
        }
        prop_assert!(total(&state) >= before);
    }
}
