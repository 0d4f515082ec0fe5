//! Civilian population packets in transit between colonies.

use ec4x_types::{ColonyId, HouseId, TransitId};
use serde::{Deserialize, Serialize};

/// Maximum simultaneous transfers one house may have in flight.
pub const MAX_ACTIVE_TRANSFERS: usize = 5;

/// A civilian transfer packet between two colonies.
///
/// Created in the Command phase (cost debited, source PU debited) and
/// resolved in Maintenance once the arrival turn is reached, with the
/// smart-delivery fallback: Delivered to the destination, Redirected to the
/// nearest other owned colony, or Lost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationInTransit {
    /// The packet's identity.
    pub id: TransitId,
    /// Owning house.
    pub owner: HouseId,
    /// The colony the population left.
    pub source: ColonyId,
    /// The colony the population is headed to.
    pub destination: ColonyId,
    /// How many PTU are aboard.
    pub ptu: u32,
    /// Total PP paid for the lift.
    pub cost_paid: i64,
    /// The turn the packet arrives.
    pub arrival_turn: u32,
}
