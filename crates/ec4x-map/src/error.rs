//! Error types for the `ec4x-map` crate.
//!
//! All fallible operations in this crate return [`MapError`] through the
//! standard [`Result`] type alias.

use ec4x_types::{LaneId, SystemId};

/// Errors that can occur during star-map operations.
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    /// A system was not found in the star map.
    #[error("system not found: {0}")]
    SystemNotFound(SystemId),

    /// A jump lane was not found in the star map.
    #[error("jump lane not found: {0}")]
    LaneNotFound(LaneId),

    /// A duplicate system was inserted where uniqueness is required.
    #[error("duplicate system at hex {0}")]
    DuplicateSystem(ec4x_types::Hex),

    /// A lane was added with a missing endpoint.
    #[error("lane endpoint missing: {0}")]
    LaneEndpointMissing(SystemId),

    /// A lane was added between a system and itself.
    #[error("lane endpoints must differ: {0}")]
    DegenerateLane(SystemId),

    /// Map generation was asked for an impossible shape.
    #[error("invalid map shape: {reason}")]
    InvalidShape {
        /// Explanation of what is wrong with the requested shape.
        reason: String,
    },
}
