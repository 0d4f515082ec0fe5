//! Colonies: a house's presence at a system.

use std::collections::BTreeSet;

use ec4x_types::{ColonyId, GroundUnitId, HouseId, KastraId, NeoriaId, ProjectId, SystemId};
use serde::{Deserialize, Serialize};

/// PTU that make up one PU. Used for population conservation accounting.
pub const PTU_PER_PU: u32 = 10;

/// PU a freshly founded colony starts with.
pub const FOUNDING_PU: u32 = 3;

/// An active blockade of a colony.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blockade {
    /// The blockading house.
    pub by: HouseId,
    /// Consecutive turns the blockade has held.
    pub turns: u32,
}

/// A house's colony at one system. At most one colony per system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Colony {
    /// The colony's identity.
    pub id: ColonyId,
    /// Owning house. Changes only through successful invasion.
    pub owner: HouseId,
    /// The system the colony occupies.
    pub system: SystemId,
    /// Population units.
    pub population: u32,
    /// Loose PTU at the colony: growth accumulator plus delivered
    /// transfers. Converts to PU at [`PTU_PER_PU`].
    pub ptu: u32,
    /// Infrastructure level.
    pub infrastructure: u32,
    /// Industrial units.
    pub industrial_units: u32,
    /// Tax rate percent for this colony.
    pub tax_rate: u8,
    /// Active blockade, if any.
    pub blockade: Option<Blockade>,
    /// Construction projects, queued and active.
    pub construction_queue: Vec<ProjectId>,
    /// Repair projects, queued and active.
    pub repair_queue: Vec<ProjectId>,
    /// The terraform project, if one is running.
    pub terraform_project: Option<ProjectId>,
    /// Ground units stationed here.
    pub ground_units: BTreeSet<GroundUnitId>,
    /// Production facilities here.
    pub neorias: BTreeSet<NeoriaId>,
    /// Starbases here.
    pub kastras: BTreeSet<KastraId>,
    /// Set when the colony exceeds a capacity limit, cleared when it
    /// recovers.
    pub capacity_violation: bool,
    /// Whether damaged assets are queued for repair automatically.
    pub auto_repair: bool,
}

impl Colony {
    /// A freshly founded colony.
    #[must_use]
    pub fn founded(id: ColonyId, owner: HouseId, system: SystemId, tax_rate: u8) -> Self {
        Self {
            id,
            owner,
            system,
            population: FOUNDING_PU,
            ptu: 0,
            infrastructure: 1,
            industrial_units: 0,
            tax_rate,
            blockade: None,
            construction_queue: Vec::new(),
            repair_queue: Vec::new(),
            terraform_project: None,
            ground_units: BTreeSet::new(),
            neorias: BTreeSet::new(),
            kastras: BTreeSet::new(),
            capacity_violation: false,
            auto_repair: true,
        }
    }

    /// Whether the colony is currently blockaded.
    #[must_use]
    pub const fn is_blockaded(&self) -> bool {
        self.blockade.is_some()
    }

    /// Total population in PTU terms, for conservation accounting.
    #[must_use]
    pub const fn population_ptu(&self) -> u64 {
        (self.population as u64) * (PTU_PER_PU as u64) + (self.ptu as u64)
    }

    /// Convert accumulated loose PTU into whole PU.
    ///
    /// Returns the number of PU gained.
    pub const fn absorb_ptu(&mut self) -> u32 {
        let gained = self.ptu / PTU_PER_PU;
        self.ptu %= PTU_PER_PU;
        self.population += gained;
        gained
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn colony() -> Colony {
        Colony::founded(
            ColonyId::from_parts(0, 0),
            HouseId::from_parts(0, 0),
            SystemId::from_parts(0, 0),
            50,
        )
    }

    #[test]
    fn founding_population_is_three_pu() {
        assert_eq!(colony().population, FOUNDING_PU);
    }

    #[test]
    fn ptu_absorbs_into_pu_at_threshold() {
        let mut colony = colony();
        colony.ptu = 23;
        assert_eq!(colony.absorb_ptu(), 2);
        assert_eq!(colony.population, FOUNDING_PU + 2);
        assert_eq!(colony.ptu, 3);
    }

    #[test]
    fn population_ptu_counts_both_pools() {
        let mut colony = colony();
        colony.ptu = 4;
        assert_eq!(colony.population_ptu(), 34);
    }
}
