//! In-flight construction, repair, and terraform projects.
//!
//! A project is queued when its build order commits, becomes active when a
//! dock is assigned (or immediately, for orbital and planetary work that
//! needs none), and commissions in the Maintenance phase once fully paid.
//! Dock occupancy persists for the whole queued-and-active lifetime.

use ec4x_types::{BuildItem, ColonyId, KastraId, NeoriaId, PlanetClass, ProjectId, ShipId};
use serde::{Deserialize, Serialize};

/// What a repair project restores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RepairTarget {
    /// A crippled ship.
    Ship(ShipId),
    /// A crippled neoria.
    Neoria(NeoriaId),
    /// A crippled starbase.
    Kastra(KastraId),
}

/// What kind of work a project is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectKind {
    /// Building something new.
    Construction(BuildItem),
    /// Restoring a crippled asset to undamaged.
    Repair(RepairTarget),
    /// Raising the planet class one step.
    Terraform {
        /// The class the planet will become.
        target: PlanetClass,
    },
}

/// An in-flight project at a colony.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// The project's identity.
    pub id: ProjectId,
    /// The owning colony.
    pub colony: ColonyId,
    /// What is being done.
    pub kind: ProjectKind,
    /// Total PP cost.
    pub total_cost: i64,
    /// PP paid so far.
    pub paid: i64,
    /// Turns of work left.
    pub turns_remaining: u32,
    /// Dock assignment. `None` for orbital shipyard-assisted facility
    /// construction and for terraforming, which occupy no dock.
    pub dock: Option<NeoriaId>,
}

impl Project {
    /// PP still owed.
    #[must_use]
    pub const fn remaining_cost(&self) -> i64 {
        self.total_cost.saturating_sub(self.paid)
    }

    /// This turn's payment: an even share of the remaining cost over the
    /// remaining turns, rounded up so the final turn clears the balance.
    #[must_use]
    pub fn due_this_turn(&self) -> i64 {
        let remaining = self.remaining_cost();
        if remaining <= 0 || self.turns_remaining == 0 {
            return remaining;
        }
        let turns = self.turns_remaining as i64;
        remaining.saturating_add(turns.saturating_sub(1)) / turns
    }

    /// Whether the project is fully paid and out of work turns.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.turns_remaining == 0 && self.paid >= self.total_cost
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(total: i64, turns: u32) -> Project {
        Project {
            id: ProjectId::from_parts(0, 0),
            colony: ColonyId::from_parts(0, 0),
            kind: ProjectKind::Construction(BuildItem::IndustrialUnits),
            total_cost: total,
            paid: 0,
            turns_remaining: turns,
            dock: None,
        }
    }

    #[test]
    fn payments_clear_exactly_on_the_last_turn() {
        let mut project = project(100, 3);
        // 34 + 33 + 33
        assert_eq!(project.due_this_turn(), 34);
        project.paid += 34;
        project.turns_remaining = 2;
        assert_eq!(project.due_this_turn(), 33);
        project.paid += 33;
        project.turns_remaining = 1;
        assert_eq!(project.due_this_turn(), 33);
        project.paid += 33;
        project.turns_remaining = 0;
        assert!(project.is_complete());
    }

    #[test]
    fn zero_turn_project_owes_the_balance() {
        let project = project(50, 0);
        assert_eq!(project.due_this_turn(), 50);
    }
}
