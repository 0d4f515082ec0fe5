//! The command validation pipeline.
//!
//! Validation is a pure, total function over `(state, packet)`: every
//! command either survives or yields a typed [`CommandRejection`], and no
//! rejection ever interrupts the rest of the packet. Structural stages run
//! here; treasury enforcement happens afterwards in the budget gate, and
//! [`validate`] chains the two into the engine's `ValidationOutcome`.
//!
//! Stage order per command: structural shape, ownership, existence,
//! reachability, capability, tech gate, capacity gate, diplomatic
//! legality.

use std::collections::BTreeMap;

use ec4x_state::GameState;
use ec4x_types::{
    BuildCommand, BuildItem, ColonyDirective, ColonyId, ColonyManagementCommand, CommandPacket,
    CommandRejection, CommandSection, DiplomaticAction, DiplomaticCommand, DiplomaticState,
    EspionageActionKind, EspionageCommand, FacilityKind, FleetCommand, FleetCommandKind, FleetId,
    HouseId, HouseStatus, PlanetClass, PopulationTransferCommand, RejectionReason, ShipClass,
    StandingOrderKind, TerraformCommand,
};
use tracing::warn;

use crate::budget::{self, CostSummary};
use crate::config::{GameConfig, TerraformConfig};

/// The commands that survived validation and the budget gate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AcceptedCommands {
    /// Fleet orders.
    pub fleet: Vec<FleetCommand>,
    /// Build orders.
    pub builds: Vec<BuildCommand>,
    /// Research allocation, possibly reduced by the budget gate.
    pub research: ec4x_types::ResearchAllocation,
    /// Diplomatic actions.
    pub diplomatic: Vec<DiplomaticCommand>,
    /// Population transfers.
    pub transfers: Vec<PopulationTransferCommand>,
    /// Terraform starts.
    pub terraform: Vec<TerraformCommand>,
    /// Colony directives.
    pub colony_management: Vec<ColonyManagementCommand>,
    /// Standing-order settings.
    pub standing: BTreeMap<FleetId, StandingOrderKind>,
    /// The espionage action, if accepted.
    pub espionage: Option<EspionageCommand>,
    /// EBP points bought, possibly reduced by the budget gate.
    pub ebp_investment: u32,
    /// CIP points bought, possibly reduced by the budget gate.
    pub cip_investment: u32,
}

/// The result of validating one packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOutcome {
    /// Commands that survived every gate.
    pub accepted: AcceptedCommands,
    /// Typed rejections, reported to the emitting house only.
    pub rejections: Vec<CommandRejection>,
    /// The budget gate's cost summary.
    pub cost_summary: CostSummary,
}

/// Validate a packet: structural stages, then the budget gate.
///
/// Pure: never mutates state, never draws randomness.
#[must_use]
pub fn validate(state: &GameState, config: &GameConfig, packet: &CommandPacket) -> ValidationOutcome {
    let mut rejections = Vec::new();

    // A packet for the wrong turn or from an unknown house yields nothing.
    if !state.houses.contains(packet.house) {
        rejections.push(reject(
            packet.house,
            CommandSection::Fleet,
            0,
            RejectionReason::EntityMissing,
            "packet from unknown house".to_owned(),
        ));
        return ValidationOutcome {
            accepted: AcceptedCommands::default(),
            rejections,
            cost_summary: CostSummary::empty(),
        };
    }
    if packet.turn != state.turn {
        rejections.push(reject(
            packet.house,
            CommandSection::Fleet,
            0,
            RejectionReason::WrongTurn,
            format!("packet for turn {} in turn {}", packet.turn, state.turn),
        ));
        return ValidationOutcome {
            accepted: AcceptedCommands::default(),
            rejections,
            cost_summary: CostSummary::empty(),
        };
    }

    let collapsed = state
        .houses
        .get(packet.house)
        .is_some_and(|h| h.status == HouseStatus::DefensiveCollapse);

    let mut structural = AcceptedCommands::default();

    for (index, command) in packet.fleet_commands.iter().enumerate() {
        match check_fleet_command(state, packet.house, collapsed, command) {
            Ok(()) => structural.fleet.push(command.clone()),
            Err((reason, detail)) => {
                audit_if_security(packet.house, reason, &detail);
                rejections.push(reject(packet.house, CommandSection::Fleet, index, reason, detail));
            }
        }
    }

    if collapsed {
        // Collapsed houses keep only their permitted fleet orders; every
        // other section dies wholesale.
        reject_section_if_any(
            &mut rejections,
            packet.house,
            CommandSection::Build,
            packet.build_commands.len(),
            "house in defensive collapse",
        );
        reject_section_if_any(
            &mut rejections,
            packet.house,
            CommandSection::Research,
            usize::from(packet.research.total_pp() > 0),
            "house in defensive collapse",
        );
        reject_section_if_any(
            &mut rejections,
            packet.house,
            CommandSection::Diplomatic,
            packet.diplomatic_commands.len(),
            "house in defensive collapse",
        );
        reject_section_if_any(
            &mut rejections,
            packet.house,
            CommandSection::Espionage,
            usize::from(packet.espionage_action.is_some()),
            "house in defensive collapse",
        );
    } else {
        for (index, command) in packet.build_commands.iter().enumerate() {
            match check_build_command(state, config, packet.house, command, &structural.builds) {
                Ok(()) => structural.builds.push(command.clone()),
                Err((reason, detail)) => {
                    audit_if_security(packet.house, reason, &detail);
                    rejections.push(reject(
                        packet.house,
                        CommandSection::Build,
                        index,
                        reason,
                        detail,
                    ));
                }
            }
        }

        structural.research = packet.research.clone();

        for (index, command) in packet.diplomatic_commands.iter().enumerate() {
            match check_diplomatic_command(state, packet.house, command) {
                Ok(()) => structural.diplomatic.push(command.clone()),
                Err((reason, detail)) => rejections.push(reject(
                    packet.house,
                    CommandSection::Diplomatic,
                    index,
                    reason,
                    detail,
                )),
            }
        }

        for (index, command) in packet.population_transfers.iter().enumerate() {
            match check_transfer_command(state, packet.house, command, structural.transfers.len())
            {
                Ok(()) => structural.transfers.push(command.clone()),
                Err((reason, detail)) => {
                    audit_if_security(packet.house, reason, &detail);
                    rejections.push(reject(
                        packet.house,
                        CommandSection::Transfer,
                        index,
                        reason,
                        detail,
                    ));
                }
            }
        }

        for (index, command) in packet.terraform_commands.iter().enumerate() {
            match check_terraform_command(state, packet.house, command) {
                Ok(()) => structural.terraform.push(command.clone()),
                Err((reason, detail)) => rejections.push(reject(
                    packet.house,
                    CommandSection::Terraform,
                    index,
                    reason,
                    detail,
                )),
            }
        }

        if let Some(espionage) = &packet.espionage_action {
            match check_espionage_command(state, config, packet.house, espionage) {
                Ok(()) => structural.espionage = Some(espionage.clone()),
                Err((reason, detail)) => rejections.push(reject(
                    packet.house,
                    CommandSection::Espionage,
                    0,
                    reason,
                    detail,
                )),
            }
        }
        structural.ebp_investment = packet.ebp_investment;
        structural.cip_investment = packet.cip_investment;
    }

    for (index, command) in packet.colony_management.iter().enumerate() {
        match check_management_command(state, packet.house, command) {
            Ok(()) => structural.colony_management.push(command.clone()),
            Err((reason, detail)) => {
                audit_if_security(packet.house, reason, &detail);
                rejections.push(reject(
                    packet.house,
                    CommandSection::ColonyManagement,
                    index,
                    reason,
                    detail,
                ));
            }
        }
    }

    for (index, (fleet_id, order)) in packet.standing_commands.iter().enumerate() {
        match check_standing_command(state, packet.house, *fleet_id) {
            Ok(()) => {
                structural.standing.insert(*fleet_id, *order);
            }
            Err((reason, detail)) => {
                audit_if_security(packet.house, reason, &detail);
                rejections.push(reject(
                    packet.house,
                    CommandSection::Standing,
                    index,
                    reason,
                    detail,
                ));
            }
        }
    }

    budget::apply_gate(state, config, packet.house, structural, rejections)
}

/// A rejection check's failure value.
type Refusal = (RejectionReason, String);

fn reject(
    house: HouseId,
    section: CommandSection,
    command_index: usize,
    reason: RejectionReason,
    detail: String,
) -> CommandRejection {
    CommandRejection {
        house,
        section,
        command_index,
        reason,
        detail,
    }
}

/// Security violations are audited as structured warnings in addition to
/// the rejection the house receives.
fn audit_if_security(house: HouseId, reason: RejectionReason, detail: &str) {
    if reason == RejectionReason::SecurityViolation {
        warn!(%house, detail, "security violation: ownership check refuted");
    }
}

fn reject_section_if_any(
    rejections: &mut Vec<CommandRejection>,
    house: HouseId,
    section: CommandSection,
    count: usize,
    detail: &str,
) {
    for index in 0..count {
        rejections.push(reject(
            house,
            section,
            index,
            RejectionReason::StatusForbids,
            detail.to_owned(),
        ));
    }
}

// ---------------------------------------------------------------------------
// Fleet commands
// ---------------------------------------------------------------------------

fn check_fleet_command(
    state: &GameState,
    house: HouseId,
    collapsed: bool,
    command: &FleetCommand,
) -> Result<(), Refusal> {
    let Some(fleet) = state.fleets.get(command.fleet) else {
        return Err((
            RejectionReason::EntityMissing,
            format!("fleet {} does not exist", command.fleet),
        ));
    };
    if fleet.owner != house {
        return Err((
            RejectionReason::SecurityViolation,
            format!("fleet {} is not owned by {house}", command.fleet),
        ));
    }

    if collapsed
        && !matches!(
            command.kind,
            FleetCommandKind::SeekHome | FleetCommandKind::Patrol | FleetCommandKind::Hold
        )
    {
        return Err((
            RejectionReason::StatusForbids,
            "collapsed houses may only hold, patrol, or seek home".to_owned(),
        ));
    }

    match command.kind {
        FleetCommandKind::Move | FleetCommandKind::Patrol => {
            check_reachable_target(state, command)
        }
        FleetCommandKind::Colonize => check_colonize(state, command),
        FleetCommandKind::Bombard | FleetCommandKind::Invade | FleetCommandKind::Blitz => {
            check_planetary_attack(state, house, command)
        }
        FleetCommandKind::SpyPlanet
        | FleetCommandKind::SpySystem
        | FleetCommandKind::HackStarbase => check_spy_mission(state, command),
        FleetCommandKind::JoinFleet => check_join(state, house, command),
        FleetCommandKind::Rendezvous => check_rendezvous(state, house, command),
        FleetCommandKind::Reserve | FleetCommandKind::Mothball => {
            check_stand_down(state, house, command)
        }
        FleetCommandKind::Hold
        | FleetCommandKind::SeekHome
        | FleetCommandKind::Salvage
        | FleetCommandKind::ViewWorld => Ok(()),
    }
}

fn check_reachable_target(state: &GameState, command: &FleetCommand) -> Result<(), Refusal> {
    let Some(target) = command.target_system else {
        return Err((
            RejectionReason::InvalidParameter,
            "movement order without a target system".to_owned(),
        ));
    };
    if state.map.system(target).is_none() {
        return Err((
            RejectionReason::EntityMissing,
            format!("system {target} does not exist"),
        ));
    }
    let Some(fleet) = state.fleets.get(command.fleet) else {
        return Err((
            RejectionReason::EntityMissing,
            format!("fleet {} does not exist", command.fleet),
        ));
    };
    let profile = state.fleet_profile(command.fleet);
    if state.map.shortest_path(fleet.system, target, profile).is_none() {
        return Err((
            RejectionReason::NoPath,
            format!("no permitted path from {} to {target}", fleet.system),
        ));
    }
    Ok(())
}

fn check_colonize(state: &GameState, command: &FleetCommand) -> Result<(), Refusal> {
    check_reachable_target(state, command)?;
    let Some(target) = command.target_system else {
        return Err((
            RejectionReason::InvalidParameter,
            "colonize order without a target system".to_owned(),
        ));
    };
    if state.colony_at(target).is_some() {
        return Err((
            RejectionReason::InvalidParameter,
            format!("system {target} is already colonized"),
        ));
    }
    let has_settler = state
        .fleets
        .get(command.fleet)
        .map(|fleet| {
            fleet.ships.iter().any(|ship_id| {
                state.ships.get(*ship_id).is_some_and(|ship| {
                    !ship.is_destroyed()
                        && matches!(
                            ship.role,
                            ec4x_types::ShipRole::Expansion | ec4x_types::ShipRole::Auxiliary
                        )
                        && ship.colonists > 0
                })
            })
        })
        .unwrap_or(false);
    if has_settler {
        Ok(())
    } else {
        Err((
            RejectionReason::CapabilityMissing,
            "no functional expansion hull with colonists aboard".to_owned(),
        ))
    }
}

fn check_planetary_attack(
    state: &GameState,
    house: HouseId,
    command: &FleetCommand,
) -> Result<(), Refusal> {
    let Some(fleet) = state.fleets.get(command.fleet) else {
        return Err((
            RejectionReason::EntityMissing,
            format!("fleet {} does not exist", command.fleet),
        ));
    };
    let target_system = command.target_system.unwrap_or(fleet.system);
    let Some(colony_id) = state.colony_at(target_system) else {
        return Err((
            RejectionReason::EntityMissing,
            format!("no colony at {target_system}"),
        ));
    };
    let Some(colony) = state.colonies.get(colony_id) else {
        return Err((
            RejectionReason::EntityMissing,
            format!("colony {colony_id} does not exist"),
        ));
    };
    if colony.owner == house {
        return Err((
            RejectionReason::InvalidParameter,
            "cannot attack an owned colony".to_owned(),
        ));
    }
    if state.diplomacy.state_of(house, colony.owner) != DiplomaticState::Enemy {
        return Err((
            RejectionReason::NotAtWar,
            "planetary attacks require an Enemy declaration".to_owned(),
        ));
    }
    let has_teeth = fleet.ships.iter().any(|ship_id| {
        state
            .ships
            .get(*ship_id)
            .is_some_and(|ship| !ship.is_destroyed() && ship.stats.attack > 0)
    });
    if !has_teeth {
        return Err((
            RejectionReason::CapabilityMissing,
            "no combat hull with attack strength".to_owned(),
        ));
    }
    if command.kind != FleetCommandKind::Bombard {
        let has_marines = fleet.ships.iter().any(|ship_id| {
            state
                .ships
                .get(*ship_id)
                .is_some_and(|ship| !ship.is_destroyed() && ship.marines > 0)
        });
        if !has_marines {
            return Err((
                RejectionReason::CapabilityMissing,
                "invasion requires marines aboard".to_owned(),
            ));
        }
    }
    Ok(())
}

fn check_spy_mission(state: &GameState, command: &FleetCommand) -> Result<(), Refusal> {
    let Some(fleet) = state.fleets.get(command.fleet) else {
        return Err((
            RejectionReason::EntityMissing,
            format!("fleet {} does not exist", command.fleet),
        ));
    };
    let mut any = false;
    for ship_id in &fleet.ships {
        let Some(ship) = state.ships.get(*ship_id) else {
            continue;
        };
        if ship.is_destroyed() {
            continue;
        }
        any = true;
        if ship.class != ShipClass::Scout {
            return Err((
                RejectionReason::CapabilityMissing,
                "spy missions require a scout-only fleet".to_owned(),
            ));
        }
    }
    if any {
        Ok(())
    } else {
        Err((
            RejectionReason::CapabilityMissing,
            "spy missions require at least one functional scout".to_owned(),
        ))
    }
}

fn check_join(state: &GameState, house: HouseId, command: &FleetCommand) -> Result<(), Refusal> {
    let Some(target_id) = command.target_fleet else {
        return Err((
            RejectionReason::InvalidParameter,
            "join order without a target fleet".to_owned(),
        ));
    };
    let Some(target) = state.fleets.get(target_id) else {
        return Err((
            RejectionReason::EntityMissing,
            format!("fleet {target_id} does not exist"),
        ));
    };
    if target.owner != house {
        return Err((
            RejectionReason::SecurityViolation,
            format!("fleet {target_id} is not owned by {house}"),
        ));
    }
    let same_system = state
        .fleets
        .get(command.fleet)
        .is_some_and(|fleet| fleet.system == target.system);
    if same_system {
        Ok(())
    } else {
        Err((
            RejectionReason::InvalidParameter,
            "join requires both fleets in the same system".to_owned(),
        ))
    }
}

fn check_rendezvous(
    state: &GameState,
    house: HouseId,
    command: &FleetCommand,
) -> Result<(), Refusal> {
    let Some(target_id) = command.target_fleet else {
        return Err((
            RejectionReason::InvalidParameter,
            "rendezvous order without a target fleet".to_owned(),
        ));
    };
    let Some(target) = state.fleets.get(target_id) else {
        return Err((
            RejectionReason::EntityMissing,
            format!("fleet {target_id} does not exist"),
        ));
    };
    if target.owner != house {
        return Err((
            RejectionReason::SecurityViolation,
            format!("fleet {target_id} is not owned by {house}"),
        ));
    }
    let Some(fleet) = state.fleets.get(command.fleet) else {
        return Err((
            RejectionReason::EntityMissing,
            format!("fleet {} does not exist", command.fleet),
        ));
    };
    let profile = state.fleet_profile(command.fleet);
    if state
        .map
        .shortest_path(fleet.system, target.system, profile)
        .is_none()
    {
        return Err((
            RejectionReason::NoPath,
            format!("no permitted path to rendezvous at {}", target.system),
        ));
    }
    Ok(())
}

fn check_stand_down(
    state: &GameState,
    house: HouseId,
    command: &FleetCommand,
) -> Result<(), Refusal> {
    let at_own_colony = state
        .fleets
        .get(command.fleet)
        .and_then(|fleet| state.colony_at(fleet.system))
        .and_then(|colony_id| state.colonies.get(colony_id))
        .is_some_and(|colony| colony.owner == house);
    if at_own_colony {
        Ok(())
    } else {
        Err((
            RejectionReason::InvalidParameter,
            "reserve and mothball require an owned colony at the fleet's system".to_owned(),
        ))
    }
}

// ---------------------------------------------------------------------------
// Build commands
// ---------------------------------------------------------------------------

fn check_build_command(
    state: &GameState,
    config: &GameConfig,
    house: HouseId,
    command: &BuildCommand,
    already_accepted: &[BuildCommand],
) -> Result<(), Refusal> {
    let Some(colony) = state.colonies.get(command.colony) else {
        return Err((
            RejectionReason::EntityMissing,
            format!("colony {} does not exist", command.colony),
        ));
    };
    if colony.owner != house {
        return Err((
            RejectionReason::SecurityViolation,
            format!("colony {} is not owned by {house}", command.colony),
        ));
    }
    if command.quantity == 0 {
        return Err((
            RejectionReason::InvalidParameter,
            "build quantity must be at least 1".to_owned(),
        ));
    }
    let cst = state.houses.get(house).map_or(1, |h| h.tech.construction);

    match command.item {
        BuildItem::Ship(class) => {
            let row = config.ships.row(class);
            if cst < row.required_cst {
                return Err((
                    RejectionReason::TechGate,
                    format!(
                        "{class:?} requires CST {}, house has {cst}",
                        row.required_cst
                    ),
                ));
            }
            check_ship_capacity(state, config, house, colony.id, class, command.quantity, already_accepted)
        }
        BuildItem::Facility(FacilityKind::Neoria(class)) => {
            let required = config.facilities.neoria_cst(class);
            if cst < required {
                return Err((
                    RejectionReason::TechGate,
                    format!("{class:?} requires CST {required}, house has {cst}"),
                ));
            }
            // A shipyard is raised in orbit and needs a working spaceport
            // below it.
            if class == ec4x_types::NeoriaClass::Shipyard && !has_uncrippled_spaceport(state, colony)
            {
                return Err((
                    RejectionReason::TechGate,
                    "shipyard construction requires an uncrippled spaceport".to_owned(),
                ));
            }
            Ok(())
        }
        BuildItem::Facility(FacilityKind::Kastra) => {
            let required = config.facilities.kastra_cst;
            if cst < required {
                return Err((
                    RejectionReason::TechGate,
                    format!("starbase requires CST {required}, house has {cst}"),
                ));
            }
            // Starbases need shipyard assist.
            let has_yard = colony.neorias.iter().any(|id| {
                state
                    .neorias
                    .get(*id)
                    .is_some_and(|n| n.class == ec4x_types::NeoriaClass::Shipyard && n.can_construct())
            });
            if has_yard {
                Ok(())
            } else {
                Err((
                    RejectionReason::TechGate,
                    "starbase construction requires an uncrippled shipyard".to_owned(),
                ))
            }
        }
        BuildItem::Ground(_) | BuildItem::IndustrialUnits => Ok(()),
    }
}

fn has_uncrippled_spaceport(state: &GameState, colony: &ec4x_state::Colony) -> bool {
    colony.neorias.iter().any(|id| {
        state.neorias.get(*id).is_some_and(|n| {
            n.class == ec4x_types::NeoriaClass::Spaceport
                && matches!(n.combat_state, ec4x_types::CombatState::Undamaged)
        })
    })
}

/// Fighter colony capacity and house squadron capacity.
fn check_ship_capacity(
    state: &GameState,
    config: &GameConfig,
    house: HouseId,
    colony_id: ColonyId,
    class: ShipClass,
    quantity: u32,
    already_accepted: &[BuildCommand],
) -> Result<(), Refusal> {
    if class == ShipClass::Fighter {
        let Some(colony) = state.colonies.get(colony_id) else {
            return Err((
                RejectionReason::EntityMissing,
                format!("colony {colony_id} does not exist"),
            ));
        };
        let capacity = colony
            .infrastructure
            .saturating_mul(config.capacities.fighters_per_infrastructure);
        let stationed = state
            .ships
            .iter()
            .filter(|(_, ship)| ship.stationed_colony == Some(colony_id) && !ship.is_destroyed())
            .count();
        let queued = queued_ships(state, config, colony_id, ShipClass::Fighter)
            .saturating_add(accepted_quantity(already_accepted, colony_id, ShipClass::Fighter));
        let stationed = u32::try_from(stationed).unwrap_or(u32::MAX);
        if stationed
            .saturating_add(queued)
            .saturating_add(quantity)
            > capacity
        {
            return Err((
                RejectionReason::CapacityExceeded,
                format!("fighter capacity {capacity} exceeded at colony {colony_id}"),
            ));
        }
        return Ok(());
    }

    if !class.counts_toward_squadron_capacity() {
        return Ok(());
    }
    let capacity = squadron_capacity(state, config, house);
    let row = config.ships.row(class);
    let committed = squadron_commitment(state, config, house)
        .saturating_add(accepted_command_cost(config, already_accepted));
    let added = row.command_cost.saturating_mul(quantity);
    if committed.saturating_add(added) > capacity {
        return Err((
            RejectionReason::CapacityExceeded,
            format!(
                "squadron capacity {capacity} exceeded ({committed} committed, {added} requested)"
            ),
        ));
    }
    Ok(())
}

/// The house's squadron command capacity.
#[must_use]
pub fn squadron_capacity(state: &GameState, config: &GameConfig, house: HouseId) -> u32 {
    let sc = state
        .houses
        .get(house)
        .map_or(1, |h| h.tech.strategic_command);
    config.capacities.squadron_capacity_base.saturating_add(
        config
            .capacities
            .squadron_capacity_per_sc
            .saturating_mul(u32::from(sc.saturating_sub(1))),
    )
}

/// Command cost of every live non-scout ship plus queued hulls.
#[must_use]
pub fn squadron_commitment(state: &GameState, config: &GameConfig, house: HouseId) -> u32 {
    let live: u32 = state
        .ships
        .iter()
        .filter(|(_, ship)| {
            ship.owner == house
                && !ship.is_destroyed()
                && ship.class.counts_toward_squadron_capacity()
        })
        .map(|(_, ship)| ship.stats.command_cost)
        .sum();
    let queued: u32 = state
        .projects
        .iter()
        .filter_map(|(_, project)| match project.kind {
            ec4x_state::ProjectKind::Construction(BuildItem::Ship(class))
                if class.counts_toward_squadron_capacity()
                    && state
                        .colonies
                        .get(project.colony)
                        .is_some_and(|c| c.owner == house) =>
            {
                Some(config.ships.row(class).command_cost)
            }
            _ => None,
        })
        .sum();
    live.saturating_add(queued)
}

fn queued_ships(
    state: &GameState,
    _config: &GameConfig,
    colony: ColonyId,
    class: ShipClass,
) -> u32 {
    let count = state
        .projects
        .iter()
        .filter(|(_, project)| {
            project.colony == colony
                && matches!(
                    project.kind,
                    ec4x_state::ProjectKind::Construction(BuildItem::Ship(c)) if c == class
                )
        })
        .count();
    u32::try_from(count).unwrap_or(u32::MAX)
}

fn accepted_quantity(accepted: &[BuildCommand], colony: ColonyId, class: ShipClass) -> u32 {
    accepted
        .iter()
        .filter(|c| c.colony == colony && c.item == BuildItem::Ship(class))
        .map(|c| c.quantity)
        .sum()
}

fn accepted_command_cost(config: &GameConfig, accepted: &[BuildCommand]) -> u32 {
    accepted
        .iter()
        .filter_map(|c| match c.item {
            BuildItem::Ship(class) if class.counts_toward_squadron_capacity() => {
                Some(config.ships.row(class).command_cost.saturating_mul(c.quantity))
            }
            _ => None,
        })
        .sum()
}

// ---------------------------------------------------------------------------
// Diplomatic commands
// ---------------------------------------------------------------------------

fn check_diplomatic_command(
    state: &GameState,
    house: HouseId,
    command: &DiplomaticCommand,
) -> Result<(), Refusal> {
    if command.target == house {
        return Err((
            RejectionReason::InvalidDiplomaticTarget,
            "diplomatic action aimed at self".to_owned(),
        ));
    }
    let Some(target) = state.houses.get(command.target) else {
        return Err((
            RejectionReason::InvalidDiplomaticTarget,
            format!("house {} does not exist", command.target),
        ));
    };
    if target.is_collapsed() {
        return Err((
            RejectionReason::InvalidDiplomaticTarget,
            format!("house {} has collapsed", command.target),
        ));
    }

    let current = state.diplomacy.state_of(house, command.target);
    let legal = match command.action {
        DiplomaticAction::ProposePact => current == DiplomaticState::Neutral,
        DiplomaticAction::AcceptPact | DiplomaticAction::WithdrawProposal => {
            has_open_proposal(state, house, command.target)
        }
        DiplomaticAction::BreakPact => current == DiplomaticState::Ally,
        DiplomaticAction::DeclareHostile => current == DiplomaticState::Neutral,
        DiplomaticAction::DeclareEnemy => current == DiplomaticState::Hostile,
        DiplomaticAction::SetNeutral => current == DiplomaticState::Enemy,
    };
    if legal {
        Ok(())
    } else {
        Err((
            RejectionReason::InvalidParameter,
            format!("{:?} is not legal from {current:?}", command.action),
        ))
    }
}

fn has_open_proposal(state: &GameState, a: HouseId, b: HouseId) -> bool {
    state.proposals.iter().any(|(_, proposal)| {
        (proposal.from == a && proposal.to == b) || (proposal.from == b && proposal.to == a)
    })
}

// ---------------------------------------------------------------------------
// Civil commands
// ---------------------------------------------------------------------------

fn check_transfer_command(
    state: &GameState,
    house: HouseId,
    command: &PopulationTransferCommand,
    accepted_so_far: usize,
) -> Result<(), Refusal> {
    if command.ptu == 0 {
        return Err((
            RejectionReason::InvalidParameter,
            "transfer of zero PTU".to_owned(),
        ));
    }
    if command.source == command.destination {
        return Err((
            RejectionReason::InvalidParameter,
            "transfer source and destination are the same colony".to_owned(),
        ));
    }
    let Some(source) = state.colonies.get(command.source) else {
        return Err((
            RejectionReason::EntityMissing,
            format!("colony {} does not exist", command.source),
        ));
    };
    let Some(destination) = state.colonies.get(command.destination) else {
        return Err((
            RejectionReason::EntityMissing,
            format!("colony {} does not exist", command.destination),
        ));
    };
    if source.owner != house {
        return Err((
            RejectionReason::SecurityViolation,
            format!("colony {} is not owned by {house}", command.source),
        ));
    }
    if destination.owner != house {
        return Err((
            RejectionReason::InvalidParameter,
            "transfer destination must be an owned colony".to_owned(),
        ));
    }

    // The source must keep at least one PU after the lift.
    let available = source
        .population_ptu()
        .saturating_sub(u64::from(ec4x_state::PTU_PER_PU));
    if u64::from(command.ptu) > available {
        return Err((
            RejectionReason::InvalidParameter,
            format!(
                "source must retain one PU; only {available} PTU are liftable"
            ),
        ));
    }

    let in_flight = state
        .transits
        .iter()
        .filter(|(_, transit)| transit.owner == house)
        .count();
    if in_flight.saturating_add(accepted_so_far) >= ec4x_state::MAX_ACTIVE_TRANSFERS {
        return Err((
            RejectionReason::TransferLimit,
            format!(
                "at most {} transfers may be in flight",
                ec4x_state::MAX_ACTIVE_TRANSFERS
            ),
        ));
    }

    let profile = ec4x_map::FleetProfile::LINE;
    let Some(jumps) = state
        .map
        .jump_distance(source.system, destination.system, profile)
    else {
        return Err((
            RejectionReason::NoPath,
            format!(
                "no lane route from {} to {}",
                source.system, destination.system
            ),
        ));
    };

    // Strategic lift bounds how far civilians can be shipped.
    let stl = state
        .houses
        .get(house)
        .map_or(1, |h| h.tech.strategic_lift);
    let max_jumps = 2_u32.saturating_add(u32::from(stl).saturating_mul(2));
    if jumps > max_jumps {
        return Err((
            RejectionReason::NoPath,
            format!("{jumps} jumps exceeds the STL {stl} lift range of {max_jumps}"),
        ));
    }
    Ok(())
}

fn check_terraform_command(
    state: &GameState,
    house: HouseId,
    command: &TerraformCommand,
) -> Result<(), Refusal> {
    let Some(colony) = state.colonies.get(command.colony) else {
        return Err((
            RejectionReason::EntityMissing,
            format!("colony {} does not exist", command.colony),
        ));
    };
    if colony.owner != house {
        return Err((
            RejectionReason::SecurityViolation,
            format!("colony {} is not owned by {house}", command.colony),
        ));
    }
    if colony.terraform_project.is_some() {
        return Err((
            RejectionReason::InvalidParameter,
            "a terraform project is already running".to_owned(),
        ));
    }
    let Some(system) = state.map.system(colony.system) else {
        return Err((
            RejectionReason::EntityMissing,
            format!("system {} does not exist", colony.system),
        ));
    };
    let Some(target) = system.planet_class.improved() else {
        return Err((
            RejectionReason::InvalidParameter,
            "the planet is already Eden".to_owned(),
        ));
    };
    let ter = state.houses.get(house).map_or(1, |h| h.tech.terraforming);
    let required = TerraformConfig::required_ter(target);
    if ter < required {
        return Err((
            RejectionReason::TechGate,
            format!("terraforming to {target:?} requires TER {required}, house has {ter}"),
        ));
    }
    Ok(())
}

fn check_management_command(
    state: &GameState,
    house: HouseId,
    command: &ColonyManagementCommand,
) -> Result<(), Refusal> {
    let Some(colony) = state.colonies.get(command.colony) else {
        return Err((
            RejectionReason::EntityMissing,
            format!("colony {} does not exist", command.colony),
        ));
    };
    if colony.owner != house {
        return Err((
            RejectionReason::SecurityViolation,
            format!("colony {} is not owned by {house}", command.colony),
        ));
    }
    match command.directive {
        ColonyDirective::SetTaxRate(rate) if rate > 100 => Err((
            RejectionReason::InvalidParameter,
            format!("tax rate {rate} is out of range"),
        )),
        ColonyDirective::SetTaxRate(_) | ColonyDirective::SetAutoRepair(_) => Ok(()),
    }
}

fn check_espionage_command(
    state: &GameState,
    config: &GameConfig,
    house: HouseId,
    command: &EspionageCommand,
) -> Result<(), Refusal> {
    let self_targeted = command.target_house == house;
    if self_targeted && command.kind != EspionageActionKind::CounterIntelSweep {
        return Err((
            RejectionReason::InvalidDiplomaticTarget,
            "espionage aimed at self".to_owned(),
        ));
    }
    if !self_targeted && command.kind == EspionageActionKind::CounterIntelSweep {
        return Err((
            RejectionReason::InvalidParameter,
            "counter-intel sweeps run against one's own houses".to_owned(),
        ));
    }
    let Some(target) = state.houses.get(command.target_house) else {
        return Err((
            RejectionReason::InvalidDiplomaticTarget,
            format!("house {} does not exist", command.target_house),
        ));
    };
    if target.is_collapsed() && !self_targeted {
        return Err((
            RejectionReason::InvalidDiplomaticTarget,
            format!("house {} has collapsed", command.target_house),
        ));
    }
    let cost = config
        .espionage
        .action_cost
        .get(command.kind as usize)
        .copied()
        .unwrap_or(1);
    let ebp = state.houses.get(house).map_or(0, |h| h.espionage.ebp);
    if ebp < cost {
        return Err((
            RejectionReason::InsufficientFunds,
            format!("{:?} costs {cost} EBP, house has {ebp}", command.kind),
        ));
    }
    Ok(())
}

fn check_standing_command(
    state: &GameState,
    house: HouseId,
    fleet_id: FleetId,
) -> Result<(), Refusal> {
    let Some(fleet) = state.fleets.get(fleet_id) else {
        return Err((
            RejectionReason::EntityMissing,
            format!("fleet {fleet_id} does not exist"),
        ));
    };
    if fleet.owner != house {
        return Err((
            RejectionReason::SecurityViolation,
            format!("fleet {fleet_id} is not owned by {house}"),
        ));
    }
    Ok(())
}

/// Whether the planet class is one a colonize fallback should consider.
#[must_use]
pub const fn fallback_class_acceptable(class: PlanetClass) -> bool {
    !matches!(class, PlanetClass::Desolate | PlanetClass::Extreme)
}
