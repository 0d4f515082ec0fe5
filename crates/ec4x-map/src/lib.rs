//! Star map for the EC4X turn-resolution engine.
//!
//! This crate models the spatial layer: star systems as nodes of a hex
//! graph, jump lanes of three traffic classes as undirected edges, and the
//! pathfinding used by fleet movement. All queries respect lane permissions
//! for a given fleet profile (crippled ships are barred from Minor lanes,
//! only uncrippled Scout and Raider hulls may use Restricted lanes).
//!
//! # Modules
//!
//! - [`error`] -- Error types for star-map operations.
//! - [`system`] -- [`System`] nodes; immutable after generation except for
//!   terraforming.
//! - [`lane`] -- [`JumpLane`] edges and the [`FleetProfile`] permission
//!   model.
//! - [`starmap`] -- The graph: adjacency indices, neighbor queries, BFS
//!   shortest paths, range scans.
//! - [`generate`] -- Deterministic ring-map generation with homeworld
//!   placement.

pub mod error;
pub mod generate;
pub mod lane;
pub mod starmap;
pub mod system;

// Re-export primary types at crate root.
pub use error::MapError;
pub use generate::{GeneratedMap, MapShape, generate_map};
pub use lane::{FleetProfile, JumpLane};
pub use starmap::StarMap;
pub use system::System;
