//! Error types for the `ec4x-state` crate.

use ec4x_types::{ColonyId, FleetId, HouseId, ShipId, SystemId};

/// Errors that can occur during canonical-state operations.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    /// A house was not found.
    #[error("house not found: {0}")]
    HouseNotFound(HouseId),

    /// A colony was not found.
    #[error("colony not found: {0}")]
    ColonyNotFound(ColonyId),

    /// A fleet was not found.
    #[error("fleet not found: {0}")]
    FleetNotFound(FleetId),

    /// A ship was not found.
    #[error("ship not found: {0}")]
    ShipNotFound(ShipId),

    /// A system already hosts a colony.
    #[error("system {0} is already settled")]
    SystemAlreadySettled(SystemId),
}
