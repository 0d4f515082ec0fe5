//! Type-safe identifier wrappers for every entity kind.
//!
//! Every entity in the engine has a strongly-typed ID to prevent accidental
//! mixing of identifiers at compile time. Entity IDs are opaque 32-bit tags
//! that pack an arena slot index (high 20 bits) and a slot generation
//! (low 12 bits), so ascending raw-ID order equals ascending slot order and
//! iteration over an arena visits entities in ascending ID order.
//!
//! [`GameId`] is the exception: games are externally identified and use a
//! UUID v7, which also serves as the root of the per-turn RNG seed.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of bits reserved for the slot generation in a packed entity ID.
pub const GENERATION_BITS: u32 = 12;

/// Maximum arena slot index representable in a packed entity ID.
pub const MAX_INDEX: u32 = (1 << (32 - GENERATION_BITS)) - 1;

/// Maximum generation value representable in a packed entity ID.
pub const MAX_GENERATION: u32 = (1 << GENERATION_BITS) - 1;

/// Generates a newtype wrapper around a packed `u32` with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Pack an arena slot index and generation into an identifier.
            ///
            /// The index is masked to 20 bits and the generation to 12 bits.
            #[must_use]
            pub const fn from_parts(index: u32, generation: u32) -> Self {
                Self(((index & MAX_INDEX) << GENERATION_BITS) | (generation & MAX_GENERATION))
            }

            /// Reconstruct an identifier from its raw packed value.
            #[must_use]
            pub const fn from_raw(raw: u32) -> Self {
                Self(raw)
            }

            /// Return the raw packed value.
            #[must_use]
            pub const fn into_raw(self) -> u32 {
                self.0
            }

            /// Return the arena slot index encoded in this identifier.
            #[must_use]
            pub const fn index(self) -> u32 {
                self.0 >> GENERATION_BITS
            }

            /// Return the slot generation encoded in this identifier.
            #[must_use]
            pub const fn generation(self) -> u32 {
                self.0 & MAX_GENERATION
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}.{}", self.index(), self.generation())
            }
        }
    };
}

define_id! {
    /// Unique identifier for a house (player faction).
    HouseId
}

define_id! {
    /// Unique identifier for a star system (node in the star map).
    SystemId
}

define_id! {
    /// Unique identifier for a jump lane (edge in the star map).
    LaneId
}

define_id! {
    /// Unique identifier for a colony.
    ColonyId
}

define_id! {
    /// Unique identifier for a fleet.
    FleetId
}

define_id! {
    /// Unique identifier for a ship.
    ShipId
}

define_id! {
    /// Unique identifier for a neoria (production facility).
    NeoriaId
}

define_id! {
    /// Unique identifier for a kastra (starbase).
    KastraId
}

define_id! {
    /// Unique identifier for a ground unit.
    GroundUnitId
}

define_id! {
    /// Unique identifier for a construction, repair, or terraform project.
    ProjectId
}

define_id! {
    /// Unique identifier for an ongoing espionage effect.
    EffectId
}

define_id! {
    /// Unique identifier for a population-in-transit packet.
    TransitId
}

define_id! {
    /// Unique identifier for a pending diplomatic proposal.
    ProposalId
}

/// Unique identifier for a game.
///
/// Games are identified externally (by the daemon and transport), so this is
/// a UUID rather than a packed arena ID. The UUID bytes also seed the
/// deterministic per-turn RNG.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(pub Uuid);

impl GameId {
    /// Create a new game identifier using UUID v7 (time-ordered).
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Return the inner [`Uuid`] value.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for GameId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for GameId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for GameId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_unpack_roundtrip() {
        let id = FleetId::from_parts(1042, 7);
        assert_eq!(id.index(), 1042);
        assert_eq!(id.generation(), 7);
    }

    #[test]
    fn ascending_index_means_ascending_id() {
        let a = SystemId::from_parts(3, 900);
        let b = SystemId::from_parts(4, 0);
        assert!(a < b);
    }

    #[test]
    fn parts_are_masked() {
        let id = ShipId::from_parts(MAX_INDEX + 1, MAX_GENERATION + 1);
        assert_eq!(id.index(), 0);
        assert_eq!(id.generation(), 0);
    }

    #[test]
    fn serde_is_transparent() {
        let id = ColonyId::from_parts(5, 2);
        let json = serde_json::to_string(&id).ok();
        assert_eq!(json.as_deref(), Some("20482"));
    }
}
