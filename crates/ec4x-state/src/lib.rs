//! Canonical game state for the EC4X turn-resolution engine.
//!
//! This crate owns the entity model: generational arena tables for every
//! entity kind, the [`GameState`] aggregate that holds them together with
//! the star map, diplomatic matrix, per-house intelligence databases, and
//! turn counters, and the invariant audit the resolver uses to detect
//! poisoned turns.
//!
//! # Modules
//!
//! - [`arena`] -- Generational arena tables with free lists and stable ids.
//! - [`house`] -- Houses, tax policy, espionage budget, research stock.
//! - [`colony`] -- Colonies and population accounting.
//! - [`fleet`] -- Fleets, ships, frozen ship stats, traversal profiles.
//! - [`facility`] -- Neorias (production) and kastras (starbases).
//! - [`ground`] -- Ground units.
//! - [`project`] -- Construction, repair, and terraform projects.
//! - [`effects`] -- Time-bounded espionage effects.
//! - [`transit`] -- Population packets in transit.
//! - [`intel`] -- Per-house intelligence databases.
//! - [`diplomacy`] -- The relation matrix and pact proposals.
//! - [`state`] -- The [`GameState`] aggregate and its secondary indices.
//! - [`audit`] -- The post-phase invariant audit.
//! - [`error`] -- Error types.

pub mod arena;
pub mod audit;
pub mod colony;
pub mod diplomacy;
pub mod effects;
pub mod error;
pub mod facility;
pub mod fleet;
pub mod ground;
pub mod house;
pub mod intel;
pub mod project;
pub mod state;
pub mod transit;

// Re-export primary types at crate root.
pub use arena::{Arena, ArenaId};
pub use audit::AuditFinding;
pub use colony::{Blockade, Colony, FOUNDING_PU, PTU_PER_PU};
pub use diplomacy::{
    DiplomaticMatrix, FIRST_VIOLATION_PENALTY, PROPOSAL_LIFETIME_TURNS, PendingProposal,
    RelationRecord, REPEAT_VIOLATION_PENALTY,
};
pub use effects::OngoingEffect;
pub use error::StateError;
pub use facility::{Kastra, Neoria};
pub use fleet::{ActiveOrder, Fleet, Ship, ShipStats};
pub use ground::{GroundLocation, GroundUnit};
pub use house::{EspionageBudget, House, ResearchStock, TaxPolicy, RESEARCH_WINDOW, TAX_WINDOW};
pub use intel::{ColonyIntel, FleetIntel, FRESH_SIGHTING_TURNS, IntelDatabase, SystemIntel};
pub use project::{Project, ProjectKind, RepairTarget};
pub use state::{ActProgression, GameState};
pub use transit::{MAX_ACTIVE_TRANSFERS, PopulationInTransit};
