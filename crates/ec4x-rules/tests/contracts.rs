//! Per-command validation contracts.
//!
//! One test per contract from the command model: ownership, existence,
//! reachability, capability, tech gates, capacity gates, diplomatic
//! legality, and the espionage singleton.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use ec4x_map::{MapShape, generate_map};
use ec4x_rules::{GameConfig, validate};
use ec4x_state::{GameState, ShipStats};
use ec4x_types::{
    BuildCommand, BuildItem, ColonyId, CommandPacket, CommandSection, DiplomaticAction,
    DiplomaticCommand, DiplomaticState, EspionageActionKind, EspionageCommand, FleetCommand,
    FleetCommandKind, FleetId, GameId, HouseId, PlanetClass, PopulationTransferCommand,
    RejectionReason, ShipClass, SystemId, TechTree, TerraformCommand,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

struct Fixture {
    state: GameState,
    config: GameConfig,
    us: HouseId,
    them: HouseId,
    our_colony: ColonyId,
    our_fleet: FleetId,
    their_fleet: FleetId,
    home: SystemId,
}

fn fixture() -> Fixture {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let map = generate_map(
        MapShape {
            rings: 3,
            houses: 2,
        },
        &mut rng,
    )
    .map(|g| g.map)
    .expect("map");
    let mut state = GameState::empty(GameId::from(uuid::Uuid::from_u128(5)), map);
    let us = state.add_house("Us".to_owned(), 1000, TechTree::uniform(2));
    let them = state.add_house("Them".to_owned(), 1000, TechTree::uniform(2));

    let home = state.map.systems().next().map(|s| s.id).expect("system");
    let our_colony = state.found_colony(us, home, 50).expect("colony");
    state.colonies.get_mut(our_colony).expect("colony").population = 10;

    let our_fleet = state.create_fleet(us, home);
    let destroyer = ShipStats {
        attack: 5,
        defense: 4,
        command_cost: 2,
        cargo_capacity: 0,
        wep_at_build: 2,
    };
    let _ = state.commission_ship(our_fleet, ShipClass::Destroyer, destroyer);

    let far = state.map.systems().nth(8).map(|s| s.id).expect("system");
    let their_fleet = state.create_fleet(them, far);
    let _ = state.commission_ship(their_fleet, ShipClass::Destroyer, destroyer);

    Fixture {
        state,
        config: GameConfig::default(),
        us,
        them,
        our_colony,
        our_fleet,
        their_fleet,
        home,
    }
}

fn packet_for(fixture: &Fixture) -> CommandPacket {
    CommandPacket::empty(fixture.state.game_id, fixture.us, fixture.state.turn)
}

fn sole_rejection(
    fixture: &Fixture,
    packet: &CommandPacket,
) -> (CommandSection, RejectionReason) {
    let outcome = validate(&fixture.state, &fixture.config, packet);
    assert_eq!(outcome.rejections.len(), 1, "{:?}", outcome.rejections);
    (
        outcome.rejections[0].section,
        outcome.rejections[0].reason,
    )
}

#[test]
fn wrong_turn_packets_die_whole() {
    let fixture = fixture();
    let mut packet = packet_for(&fixture);
    packet.turn = 9;
    let (_, reason) = sole_rejection(&fixture, &packet);
    assert_eq!(reason, RejectionReason::WrongTurn);
}

#[test]
fn foreign_fleet_orders_are_security_violations() {
    let fixture = fixture();
    let mut packet = packet_for(&fixture);
    packet.fleet_commands.push(FleetCommand {
        fleet: fixture.their_fleet,
        kind: FleetCommandKind::Hold,
        target_system: None,
        target_fleet: None,
        priority: 0,
    });
    let (section, reason) = sole_rejection(&fixture, &packet);
    assert_eq!(section, CommandSection::Fleet);
    assert_eq!(reason, RejectionReason::SecurityViolation);
}

#[test]
fn missing_fleet_is_entity_missing() {
    let fixture = fixture();
    let mut packet = packet_for(&fixture);
    packet.fleet_commands.push(FleetCommand {
        fleet: FleetId::from_parts(999, 0),
        kind: FleetCommandKind::Hold,
        target_system: None,
        target_fleet: None,
        priority: 0,
    });
    let (_, reason) = sole_rejection(&fixture, &packet);
    assert_eq!(reason, RejectionReason::EntityMissing);
}

#[test]
fn colonize_needs_a_loaded_expansion_hull() {
    let mut fixture = fixture();
    let target = fixture
        .state
        .map
        .systems()
        .find(|s| fixture.state.colony_at(s.id).is_none())
        .map(|s| s.id)
        .expect("open system");
    let mut packet = packet_for(&fixture);
    packet.fleet_commands.push(FleetCommand {
        fleet: fixture.our_fleet,
        kind: FleetCommandKind::Colonize,
        target_system: Some(target),
        target_fleet: None,
        priority: 0,
    });
    let (_, reason) = sole_rejection(&fixture, &packet);
    assert_eq!(reason, RejectionReason::CapabilityMissing);

    // Load an expansion hull and the same order passes.
    let etac = fixture
        .state
        .commission_ship(
            fixture.our_fleet,
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
    fixture.state.ships.get_mut(etac).expect("etac").colonists = 30;
    let outcome = validate(&fixture.state, &fixture.config, &packet);
    assert!(outcome.rejections.is_empty());
    assert_eq!(outcome.accepted.fleet.len(), 1);
}

#[test]
fn spy_missions_demand_scout_only_fleets() {
    let fixture = fixture();
    let mut packet = packet_for(&fixture);
    packet.fleet_commands.push(FleetCommand {
        fleet: fixture.our_fleet,
        kind: FleetCommandKind::SpySystem,
        target_system: Some(fixture.home),
        target_fleet: None,
        priority: 0,
    });
    let (_, reason) = sole_rejection(&fixture, &packet);
    assert_eq!(reason, RejectionReason::CapabilityMissing);
}

#[test]
fn planetary_attacks_require_a_war_declaration() {
    let mut fixture = fixture();
    // Put an enemy colony in reach.
    let their_system = fixture
        .state
        .map
        .systems()
        .nth(5)
        .map(|s| s.id)
        .expect("system");
    let _ = fixture
        .state
        .found_colony(fixture.them, their_system, 50)
        .expect("their colony");

    let mut packet = packet_for(&fixture);
    packet.fleet_commands.push(FleetCommand {
        fleet: fixture.our_fleet,
        kind: FleetCommandKind::Bombard,
        target_system: Some(their_system),
        target_fleet: None,
        priority: 0,
    });
    let (_, reason) = sole_rejection(&fixture, &packet);
    assert_eq!(reason, RejectionReason::NotAtWar);

    // DeclareEnemy first, then the same order is legal.
    fixture
        .state
        .diplomacy
        .set_state(fixture.us, fixture.them, DiplomaticState::Enemy);
    let outcome = validate(&fixture.state, &fixture.config, &packet);
    assert!(outcome.rejections.is_empty());
}

#[test]
fn tech_gates_block_advanced_hulls() {
    let fixture = fixture();
    // CST 2 cannot lay down a Dreadnought (CST 7).
    let mut packet = packet_for(&fixture);
    packet.build_commands.push(BuildCommand {
        colony: fixture.our_colony,
        item: BuildItem::Ship(ShipClass::Dreadnought),
        quantity: 1,
    });
    let (section, reason) = sole_rejection(&fixture, &packet);
    assert_eq!(section, CommandSection::Build);
    assert_eq!(reason, RejectionReason::TechGate);
}

#[test]
fn fighter_capacity_is_per_colony() {
    let fixture = fixture();
    // Infrastructure 1 hosts 6 fighters; a 7th is refused.
    let mut packet = packet_for(&fixture);
    packet.build_commands.push(BuildCommand {
        colony: fixture.our_colony,
        item: BuildItem::Ship(ShipClass::Fighter),
        quantity: 7,
    });
    let (_, reason) = sole_rejection(&fixture, &packet);
    assert_eq!(reason, RejectionReason::CapacityExceeded);

    packet.build_commands[0].quantity = 6;
    let outcome = validate(&fixture.state, &fixture.config, &packet);
    assert!(outcome.rejections.is_empty());
}

#[test]
fn diplomatic_commands_respect_the_state_machine() {
    let fixture = fixture();
    let mut packet = packet_for(&fixture);
    // Enemy cannot be declared from Neutral; Hostile comes first.
    packet.diplomatic_commands.push(DiplomaticCommand {
        target: fixture.them,
        action: DiplomaticAction::DeclareEnemy,
    });
    let (_, reason) = sole_rejection(&fixture, &packet);
    assert_eq!(reason, RejectionReason::InvalidParameter);
}

#[test]
fn self_targeted_diplomacy_is_refused() {
    let fixture = fixture();
    let mut packet = packet_for(&fixture);
    packet.diplomatic_commands.push(DiplomaticCommand {
        target: fixture.us,
        action: DiplomaticAction::ProposePact,
    });
    let (_, reason) = sole_rejection(&fixture, &packet);
    assert_eq!(reason, RejectionReason::InvalidDiplomaticTarget);
}

#[test]
fn transfers_keep_a_pu_at_the_source() {
    let mut fixture = fixture();
    let second = fixture
        .state
        .map
        .systems()
        .nth(1)
        .map(|s| s.id)
        .expect("system");
    let destination = fixture
        .state
        .found_colony(fixture.us, second, 50)
        .expect("colony");

    let mut packet = packet_for(&fixture);
    packet.population_transfers.push(PopulationTransferCommand {
        source: fixture.our_colony,
        destination,
        // 10 PU = 100 PTU; lifting 95 would leave less than one PU.
        ptu: 95,
    });
    let (_, reason) = sole_rejection(&fixture, &packet);
    assert_eq!(reason, RejectionReason::InvalidParameter);

    packet.population_transfers[0].ptu = 30;
    let outcome = validate(&fixture.state, &fixture.config, &packet);
    assert!(outcome.rejections.is_empty());
}

#[test]
fn terraforming_is_gated_on_ter() {
    let mut fixture = fixture();
    if let Some(system) = fixture.state.map.system_mut(fixture.home) {
        system.planet_class = PlanetClass::Hostile;
    }
    // Reaching Harsh requires TER 3; the fixture house has TER 2.
    let mut packet = packet_for(&fixture);
    packet.terraform_commands.push(TerraformCommand {
        colony: fixture.our_colony,
    });
    let (_, reason) = sole_rejection(&fixture, &packet);
    assert_eq!(reason, RejectionReason::TechGate);

    if let Some(house) = fixture.state.houses.get_mut(fixture.us) {
        house.tech.terraforming = 3;
    }
    let outcome = validate(&fixture.state, &fixture.config, &packet);
    assert!(outcome.rejections.is_empty());
}

#[test]
fn espionage_needs_banked_ebp() {
    let mut fixture = fixture();
    let mut packet = packet_for(&fixture);
    packet.espionage_action = Some(EspionageCommand {
        kind: EspionageActionKind::Sabotage,
        target_house: fixture.them,
        target_system: None,
    });
    let (section, reason) = sole_rejection(&fixture, &packet);
    assert_eq!(section, CommandSection::Espionage);
    assert_eq!(reason, RejectionReason::InsufficientFunds);

    if let Some(house) = fixture.state.houses.get_mut(fixture.us) {
        house.espionage.ebp = 4;
    }
    let outcome = validate(&fixture.state, &fixture.config, &packet);
    assert!(outcome.rejections.is_empty());
    assert!(outcome.accepted.espionage.is_some());
}

#[test]
fn rejections_never_interrupt_the_rest_of_the_packet() {
    let fixture = fixture();
    let mut packet = packet_for(&fixture);
    packet.fleet_commands.push(FleetCommand {
        fleet: fixture.their_fleet,
        kind: FleetCommandKind::Hold,
        target_system: None,
        target_fleet: None,
        priority: 0,
    });
    packet.fleet_commands.push(FleetCommand {
        fleet: fixture.our_fleet,
        kind: FleetCommandKind::Hold,
        target_system: None,
        target_fleet: None,
        priority: 0,
    });
    packet.build_commands.push(BuildCommand {
        colony: fixture.our_colony,
        item: BuildItem::IndustrialUnits,
        quantity: 1,
    });
    let outcome = validate(&fixture.state, &fixture.config, &packet);
    assert_eq!(outcome.rejections.len(), 1);
    assert_eq!(outcome.accepted.fleet.len(), 1);
    assert_eq!(outcome.accepted.builds.len(), 1);
}
