//! Player-view value types produced by the fog-of-war projector.
//!
//! A [`PlayerView`] is a pure value snapshot of everything one house is
//! allowed to know. It never contains references into the canonical state;
//! foreign entities appear only through the viewer's intelligence database,
//! with estimates instead of exact numbers where the rules say so.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::enums::{
    Act, CombatState, DiplomaticState, FleetStatus, HouseStatus, PlanetClass, ResourceRating,
    ShipClass, StandingOrderKind, VisibilityLevel,
};
use crate::hex::Hex;
use crate::ids::{ColonyId, FleetId, HouseId, ProposalId, SystemId};
use crate::tech::TechTree;

// ---------------------------------------------------------------------------
// Public context
// ---------------------------------------------------------------------------

/// The public act-progression banner, identical for every viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActView {
    /// The current act.
    pub act: Act,
    /// The turn the act began.
    pub started_turn: u32,
    /// Colonization percentage at the last act measurement.
    pub colonization_percent: u8,
    /// Sum of all active houses' prestige at the last measurement.
    pub total_prestige: i64,
}

/// One entry of the fully public diplomatic matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationView {
    /// First house of the ordered pair.
    pub from: HouseId,
    /// Second house of the ordered pair.
    pub to: HouseId,
    /// Current diplomatic state.
    pub state: DiplomaticState,
}

/// A pending pact proposal, visible only to its two houses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalView {
    /// The proposal's identity.
    pub id: ProposalId,
    /// The proposing house.
    pub from: HouseId,
    /// The house being courted.
    pub to: HouseId,
    /// The turn the proposal lapses.
    pub expires_turn: u32,
}

// ---------------------------------------------------------------------------
// Own assets
// ---------------------------------------------------------------------------

/// The viewer's own house, in full detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnHouseView {
    /// The house's identity.
    pub id: HouseId,
    /// Display name.
    pub name: String,
    /// Treasury in PP.
    pub treasury: i64,
    /// Prestige total.
    pub prestige: i64,
    /// Current status.
    pub status: HouseStatus,
    /// Full tech tree.
    pub tech: TechTree,
    /// Espionage budget points on hand.
    pub ebp: u32,
    /// Counter-intelligence points on hand.
    pub cip: u32,
    /// Consecutive turns without a submitted packet.
    pub turns_without_orders: u8,
    /// Consecutive turns of negative prestige.
    pub negative_prestige_turns: u8,
    /// Consecutive turns of maintenance shortfall.
    pub consecutive_shortfall_turns: u8,
}

/// One of the viewer's own ships.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnShipView {
    /// Hull class.
    pub class: ShipClass,
    /// Combat state.
    pub combat_state: CombatState,
    /// Colonist PTU in the hold.
    pub colonists: u32,
    /// Marines in the hold.
    pub marines: u32,
}

/// One of the viewer's own fleets, in full detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnFleetView {
    /// The fleet's identity.
    pub id: FleetId,
    /// Where the fleet is.
    pub system: SystemId,
    /// Activation status.
    pub status: FleetStatus,
    /// Standing order, if set.
    pub standing_order: Option<StandingOrderKind>,
    /// Member ships.
    pub ships: Vec<OwnShipView>,
}

/// One of the viewer's own colonies, in full detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnColonyView {
    /// The colony's identity.
    pub id: ColonyId,
    /// The system the colony occupies.
    pub system: SystemId,
    /// Population units.
    pub population: u32,
    /// Infrastructure level.
    pub infrastructure: u32,
    /// Industrial units.
    pub industrial_units: u32,
    /// Current tax rate percent.
    pub tax_rate: u8,
    /// Whether the colony is blockaded, and by whom.
    pub blockaded_by: Option<HouseId>,
    /// Construction projects queued or active.
    pub construction_queue: usize,
    /// Repair projects queued or active.
    pub repair_queue: usize,
    /// Whether a terraform project is running.
    pub terraforming: bool,
}

// ---------------------------------------------------------------------------
// Foreign assets, through the intel database
// ---------------------------------------------------------------------------

/// What the viewer knows about one system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemView {
    /// The system's identity.
    pub id: SystemId,
    /// The viewer's confidence level for this system.
    pub visibility: VisibilityLevel,
    /// Map position. Known at every visibility level above None.
    pub hex: Hex,
    /// Ring index (distance from map center).
    pub ring: u32,
    /// System name; hidden at Adjacent visibility.
    pub name: Option<String>,
    /// Planet class; hidden below Scouted visibility.
    pub planet_class: Option<PlanetClass>,
    /// Resource rating; hidden below Scouted visibility.
    pub resource_rating: Option<ResourceRating>,
    /// Colony owner, if known.
    pub owner: Option<HouseId>,
    /// Turn this entry was last refreshed; `None` for currently-owned
    /// systems.
    pub last_updated_turn: Option<u32>,
}

/// What the viewer knows about one foreign fleet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignFleetView {
    /// The fleet's owner.
    pub owner: HouseId,
    /// The system where the fleet was last seen.
    pub system: SystemId,
    /// The turn of the sighting.
    pub last_seen_turn: u32,
    /// Rough ship count estimate.
    pub estimated_ships: u32,
    /// Exact composition, exposed only when detection succeeded against
    /// this force this turn.
    pub exact_composition: Option<BTreeMap<ShipClass, u32>>,
}

/// What the viewer knows about one foreign colony.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignColonyView {
    /// The colony's owner.
    pub owner: HouseId,
    /// The system the colony occupies.
    pub system: SystemId,
    /// Estimated population units.
    pub estimated_population: Option<u32>,
    /// Estimated industrial units.
    pub estimated_industry: Option<u32>,
    /// Estimated defensive strength.
    pub estimated_defenses: Option<u32>,
    /// The turn this snapshot was taken.
    pub last_updated_turn: u32,
}

// ---------------------------------------------------------------------------
// The view
// ---------------------------------------------------------------------------

/// Everything one house is allowed to know about the game right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    /// The house this view was projected for.
    pub viewer: HouseId,
    /// Current turn.
    pub turn: u32,
    /// Current game year.
    pub year: u32,
    /// Current game month (1-12).
    pub month: u8,
    /// Public act progression.
    pub act: ActView,
    /// The viewer's own house in full.
    pub house: OwnHouseView,
    /// Every system the viewer knows anything about.
    pub systems: BTreeMap<SystemId, SystemView>,
    /// The viewer's own fleets.
    pub own_fleets: Vec<OwnFleetView>,
    /// The viewer's own colonies.
    pub own_colonies: Vec<OwnColonyView>,
    /// Foreign fleets the visibility rules grant.
    pub foreign_fleets: Vec<ForeignFleetView>,
    /// Foreign colonies known through intel.
    pub foreign_colonies: Vec<ForeignColonyView>,
    /// The public diplomatic matrix.
    pub relations: Vec<RelationView>,
    /// Pact proposals involving the viewer.
    pub proposals: Vec<ProposalView>,
}

// ---------------------------------------------------------------------------
// Victory
// ---------------------------------------------------------------------------

/// How a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VictoryKind {
    /// A house reached the prestige threshold.
    PrestigeThreshold,
    /// The last-two-standing final-conflict rule resolved.
    FinalConflict,
}

/// The outcome of a finished game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VictoryOutcome {
    /// Which rule ended the game.
    pub kind: VictoryKind,
    /// The winning house(s).
    pub winners: Vec<HouseId>,
}
