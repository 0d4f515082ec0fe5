//! Command-packet schema: the wire form players submit each turn.
//!
//! A [`CommandPacket`] bundles everything one house wants to do on one
//! turn. The serde representation of these types is the serialization
//! boundary; the concrete encoding (JSON, binary) is the transport's
//! business.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::enums::{
    EspionageActionKind, FleetCommandKind, GroundClass, NeoriaClass, RejectionReason, ShipClass,
    StandingOrderKind,
};
use crate::ids::{ColonyId, FleetId, GameId, HouseId, SystemId};
use crate::tech::TechField;

// ---------------------------------------------------------------------------
// Fleet commands
// ---------------------------------------------------------------------------

/// One order issued to one fleet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleetCommand {
    /// The fleet being ordered.
    pub fleet: FleetId,
    /// What the fleet should do.
    pub kind: FleetCommandKind,
    /// Destination or objective system, where the command takes one.
    pub target_system: Option<SystemId>,
    /// Target fleet for JoinFleet and Rendezvous.
    pub target_fleet: Option<FleetId>,
    /// Execution priority within the packet (lower runs first).
    pub priority: u8,
}

// ---------------------------------------------------------------------------
// Build commands
// ---------------------------------------------------------------------------

/// The kind of facility a build command can raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FacilityKind {
    /// A production facility of the given subclass.
    Neoria(NeoriaClass),
    /// A starbase.
    Kastra,
}

/// What a build command produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BuildItem {
    /// A ship of the given hull class.
    Ship(ShipClass),
    /// A facility.
    Facility(FacilityKind),
    /// A ground unit.
    Ground(GroundClass),
    /// One step of industrial units at the colony.
    IndustrialUnits,
}

/// An order to construct something at a colony.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildCommand {
    /// The colony doing the building.
    pub colony: ColonyId,
    /// What to build.
    pub item: BuildItem,
    /// How many to build (ships and ground units only; facilities and IU
    /// steps are always quantity 1).
    pub quantity: u32,
}

// ---------------------------------------------------------------------------
// Research allocation
// ---------------------------------------------------------------------------

/// PP committed to research this turn, by point category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchAllocation {
    /// PP converted to economic research points.
    pub erp_pp: i64,
    /// PP converted to science research points.
    pub srp_pp: i64,
    /// PP converted to technology research points, per target field.
    pub trp_pp: BTreeMap<TechField, i64>,
}

impl ResearchAllocation {
    /// Total PP this allocation commits.
    #[must_use]
    pub fn total_pp(&self) -> i64 {
        let trp: i64 = self.trp_pp.values().copied().sum();
        self.erp_pp.saturating_add(self.srp_pp).saturating_add(trp)
    }
}

// ---------------------------------------------------------------------------
// Diplomatic commands
// ---------------------------------------------------------------------------

/// A diplomatic action toward another house.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DiplomaticAction {
    /// Offer a non-aggression pact (Neutral -> Ally on acceptance).
    ProposePact,
    /// Accept a standing pact proposal from the target.
    AcceptPact,
    /// Withdraw one's own standing proposal to the target.
    WithdrawProposal,
    /// Break an active pact (Ally -> Neutral, with prestige penalty).
    BreakPact,
    /// Declare hostility (Neutral -> Hostile).
    DeclareHostile,
    /// Declare open war (Hostile -> Enemy).
    DeclareEnemy,
    /// Stand down from war (Enemy -> Neutral).
    SetNeutral,
}

/// One diplomatic command in a packet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiplomaticCommand {
    /// The house the action is aimed at.
    pub target: HouseId,
    /// The action to take.
    pub action: DiplomaticAction,
}

// ---------------------------------------------------------------------------
// Civil commands
// ---------------------------------------------------------------------------

/// An order to ship PTU from one owned colony to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationTransferCommand {
    /// The colony giving up population.
    pub source: ColonyId,
    /// The colony that should receive it.
    pub destination: ColonyId,
    /// How many PTU to ship.
    pub ptu: u32,
}

/// An order to begin terraforming a colony's planet one class step up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerraformCommand {
    /// The colony whose planet is being terraformed.
    pub colony: ColonyId,
}

/// A colony administration directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColonyDirective {
    /// Set the colony tax rate (percent, 0-100).
    SetTaxRate(u8),
    /// Toggle automatic queueing of repair projects.
    SetAutoRepair(bool),
}

/// One colony-management command in a packet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColonyManagementCommand {
    /// The colony being administered.
    pub colony: ColonyId,
    /// The directive to apply.
    pub directive: ColonyDirective,
}

/// The espionage action a house attempts this turn (at most one).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EspionageCommand {
    /// The kind of operation.
    pub kind: EspionageActionKind,
    /// The house being acted against (self for CounterIntelSweep).
    pub target_house: HouseId,
    /// The system the operation focuses on, where the kind takes one.
    pub target_system: Option<SystemId>,
}

// ---------------------------------------------------------------------------
// The packet
// ---------------------------------------------------------------------------

/// Everything one house submits for one turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandPacket {
    /// The game this packet belongs to.
    pub game_id: GameId,
    /// The submitting house.
    pub house: HouseId,
    /// The turn the packet was written against.
    pub turn: u32,
    /// The house treasury as the client saw it at submission, for drift
    /// diagnostics.
    pub treasury: i64,
    /// Orders to fleets.
    pub fleet_commands: Vec<FleetCommand>,
    /// Construction orders.
    pub build_commands: Vec<BuildCommand>,
    /// Research spending.
    pub research: ResearchAllocation,
    /// Diplomatic actions.
    pub diplomatic_commands: Vec<DiplomaticCommand>,
    /// Civilian population transfers.
    pub population_transfers: Vec<PopulationTransferCommand>,
    /// Terraform starts.
    pub terraform_commands: Vec<TerraformCommand>,
    /// Colony administration directives.
    pub colony_management: Vec<ColonyManagementCommand>,
    /// Standing-order settings, per fleet.
    pub standing_commands: BTreeMap<FleetId, StandingOrderKind>,
    /// The one espionage action this turn, if any.
    pub espionage_action: Option<EspionageCommand>,
    /// EBP points to buy this turn.
    pub ebp_investment: u32,
    /// CIP points to buy this turn.
    pub cip_investment: u32,
}

impl CommandPacket {
    /// An empty packet for the given house and turn.
    #[must_use]
    pub fn empty(game_id: GameId, house: HouseId, turn: u32) -> Self {
        Self {
            game_id,
            house,
            turn,
            treasury: 0,
            fleet_commands: Vec::new(),
            build_commands: Vec::new(),
            research: ResearchAllocation::default(),
            diplomatic_commands: Vec::new(),
            population_transfers: Vec::new(),
            terraform_commands: Vec::new(),
            colony_management: Vec::new(),
            standing_commands: BTreeMap::new(),
            espionage_action: None,
            ebp_investment: 0,
            cip_investment: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Rejections
// ---------------------------------------------------------------------------

/// Which section of the packet a rejected command came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CommandSection {
    /// A fleet command.
    Fleet,
    /// A build command.
    Build,
    /// The research allocation.
    Research,
    /// A diplomatic command.
    Diplomatic,
    /// A population transfer.
    Transfer,
    /// A terraform command.
    Terraform,
    /// A colony-management command.
    ColonyManagement,
    /// The espionage action or investment.
    Espionage,
    /// A standing-order setting.
    Standing,
}

/// A structured record of one rejected command.
///
/// Reported to the emitting house only; never interrupts the rest of the
/// packet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRejection {
    /// The house whose command was rejected.
    pub house: HouseId,
    /// Which packet section the command came from.
    pub section: CommandSection,
    /// Index of the command within its section.
    pub command_index: usize,
    /// Why it was rejected.
    pub reason: RejectionReason,
    /// Human-readable detail for the client.
    pub detail: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_packet_has_no_commands() {
        let packet = CommandPacket::empty(GameId::new(), HouseId::from_parts(0, 0), 4);
        assert_eq!(packet.turn, 4);
        assert!(packet.fleet_commands.is_empty());
        assert!(packet.espionage_action.is_none());
    }

    #[test]
    fn packet_roundtrips_through_json() {
        let mut packet = CommandPacket::empty(GameId::new(), HouseId::from_parts(1, 0), 9);
        packet.build_commands.push(BuildCommand {
            colony: ColonyId::from_parts(2, 0),
            item: BuildItem::Ship(ShipClass::Destroyer),
            quantity: 3,
        });
        packet.research.erp_pp = 40;
        let json = serde_json::to_string(&packet).ok();
        let back: Option<CommandPacket> =
            json.as_deref().and_then(|j| serde_json::from_str(j).ok());
        assert_eq!(back.as_ref(), Some(&packet));
    }

    #[test]
    fn research_total_sums_all_categories() {
        let mut research = ResearchAllocation {
            erp_pp: 10,
            srp_pp: 20,
            trp_pp: BTreeMap::new(),
        };
        research.trp_pp.insert(TechField::Weapons, 15);
        research.trp_pp.insert(TechField::Cloaking, 5);
        assert_eq!(research.total_pp(), 50);
    }
}
