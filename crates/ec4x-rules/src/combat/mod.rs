//! Theatered combat resolution.
//!
//! Combat resolves in three theaters per system battle: Space, then
//! Orbital, then Planetary. The first two run automatically wherever
//! hostile fleets share a system; the planetary theater runs only on
//! explicit bombardment, invasion, and blitz orders.
//!
//! # Modules
//!
//! - [`detection`] -- CLK-versus-ELI detection and the round-1 DRM.
//! - [`cer`] -- Combat Effect Resolution tables and ratio buckets.
//! - [`battle`] -- Multi-house space and orbital battle resolution.
//! - [`ground`] -- Bombardment, invasion, and blitz.

pub mod battle;
pub mod cer;
pub mod detection;
pub mod ground;

pub use battle::{
    HouseCombatForce, MultiHouseBattle, build_battle, collect_battle_systems, fleet_strength,
    resolve_battle, starbases_at,
};
pub use cer::{ratio_bucket, resolve_hit, wep_scaled_attack};
pub use detection::detection_outcome;
pub use ground::{resolve_blitz, resolve_bombardment, resolve_invasion};
