//! Shared type definitions for the EC4X turn-resolution engine.
//!
//! This crate is the single source of truth for the types that cross crate
//! boundaries: opaque identifiers, the closed enum vocabularies, the tech
//! tree, the command-packet wire schema, hex coordinates, and the
//! player-view value types.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe packed-u32 wrappers for all entity identifiers
//! - [`enums`] -- Enumeration types (map, ships, state machines, rejections)
//! - [`tech`] -- The fourteen-field technology tree
//! - [`hex`] -- Axial hex coordinates for the star map
//! - [`commands`] -- The per-turn command-packet schema
//! - [`view`] -- Fog-of-war player-view snapshots

pub mod commands;
pub mod enums;
pub mod hex;
pub mod ids;
pub mod tech;
pub mod view;

// Re-export all public types at crate root for convenience.
pub use commands::{
    BuildCommand, BuildItem, ColonyDirective, ColonyManagementCommand, CommandPacket,
    CommandRejection, CommandSection, DiplomaticAction, DiplomaticCommand, EspionageCommand,
    FacilityKind, FleetCommand, PopulationTransferCommand, ResearchAllocation, TerraformCommand,
};
pub use enums::{
    Act, BreakthroughKind, CargoKind, CerOutcome, CombatState, DetectionOutcome, DiplomaticState,
    EffectKind, EspionageActionKind, FleetCommandKind, FleetStatus, GroundClass, HouseStatus,
    LaneClass, NeoriaClass, PlanetClass, PrestigeTier, RejectionReason, ResourceRating, ShipClass,
    ShipRole, StandingOrderKind, Theater, TransferOutcome, VisibilityLevel,
};
pub use hex::Hex;
pub use ids::{
    ColonyId, EffectId, FleetId, GameId, GroundUnitId, HouseId, KastraId, LaneId, NeoriaId,
    ProjectId, ProposalId, ShipId, SystemId, TransitId,
};
pub use tech::{TechField, TechTree};
pub use view::{
    ActView, ForeignColonyView, ForeignFleetView, OwnColonyView, OwnFleetView, OwnHouseView,
    OwnShipView, PlayerView, ProposalView, RelationView, SystemView, VictoryKind, VictoryOutcome,
};
