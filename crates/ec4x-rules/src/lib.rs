//! Domain mechanics for the EC4X turn-resolution engine.
//!
//! Everything that decides what commands may do and what they cost lives
//! here: the pure validation pipeline, the budget gate, theatered combat,
//! colony economics, research cycles, espionage, and diplomacy. The phase
//! resolver in `ec4x-core` sequences these rules; this crate holds the
//! rules themselves.
//!
//! # Modules
//!
//! - [`config`] -- The immutable balance tables ([`GameConfig`]).
//! - [`validation`] -- The total, pure command validation pipeline.
//! - [`budget`] -- Running-treasury budget gate and cost summary.
//! - [`combat`] -- Detection, CER tables, space/orbital battles, ground
//!   combat.
//! - [`economy`] -- Income, growth, maintenance, shortfall policy.
//! - [`research`] -- Point conversion, upgrade cycles, breakthroughs.
//! - [`espionage`] -- Action resolution, detection rolls, effects.
//! - [`diplomacy`] -- Relation transitions, pacts, violations.

pub mod budget;
pub mod combat;
pub mod config;
pub mod diplomacy;
pub mod economy;
pub mod espionage;
pub mod research;
pub mod validation;

// Re-export primary types at crate root.
pub use budget::{CostSummary, build_cost, build_turns, transfer_cost, transfer_jumps};
pub use config::{
    CapacityConfig, CerRow, CombatConfig, EconomyConfig, EspionageConfig, FacilityConfig,
    GameConfig, GroundRow, GroundTable, ResearchConfig, ShipRow, ShipTable, TerraformConfig,
    TransferConfig,
};
pub use economy::{ColonyIncome, colony_income, growth_ptu, projected_maintenance};
pub use validation::{AcceptedCommands, ValidationOutcome, validate};
