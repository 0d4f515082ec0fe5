//! Post-phase invariant audit.
//!
//! The resolver runs this audit after every phase. A clean state returns
//! no findings; any finding poisons the turn (the resolver discards the
//! partial state and keeps the prior turn). Findings are data, never
//! panics, so a poisoned turn is always reportable.

use ec4x_types::{ColonyId, FleetId, HouseId, NeoriaId, ProjectId, ShipId, SystemId};

use crate::state::GameState;

/// One violated invariant found by the audit.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuditFinding {
    /// A fleet's owner is not a live house.
    #[error("fleet {fleet} owned by missing house {owner}")]
    FleetOwnerMissing {
        /// The offending fleet.
        fleet: FleetId,
        /// The dangling owner reference.
        owner: HouseId,
    },

    /// A fleet sits at a system that is not on the map.
    #[error("fleet {fleet} located at unknown system {system}")]
    FleetSystemMissing {
        /// The offending fleet.
        fleet: FleetId,
        /// The dangling system reference.
        system: SystemId,
    },

    /// A live fleet is missing from an index that should list it.
    #[error("fleet {fleet} missing from index {index}")]
    FleetMissingFromIndex {
        /// The unindexed fleet.
        fleet: FleetId,
        /// Which index is missing it.
        index: &'static str,
    },

    /// An index references a fleet that no longer exists.
    #[error("index {index} references missing fleet {fleet}")]
    IndexReferencesMissingFleet {
        /// The stale reference.
        fleet: FleetId,
        /// Which index holds it.
        index: &'static str,
    },

    /// A ship's fleet back-reference disagrees with the fleet's roster.
    #[error("ship {ship} and fleet {fleet} disagree about membership")]
    ShipFleetMismatch {
        /// The ship.
        ship: ShipId,
        /// The fleet.
        fleet: FleetId,
    },

    /// A fleet roster lists a ship that does not exist.
    #[error("fleet {fleet} lists missing ship {ship}")]
    FleetListsMissingShip {
        /// The fleet.
        fleet: FleetId,
        /// The dangling ship reference.
        ship: ShipId,
    },

    /// A commissioned ship belongs to no fleet and no colony station.
    #[error("ship {ship} is attached to neither fleet nor colony")]
    ShipUnattached {
        /// The orphaned ship.
        ship: ShipId,
    },

    /// A colony's owner is not a live house.
    #[error("colony {colony} owned by missing house {owner}")]
    ColonyOwnerMissing {
        /// The offending colony.
        colony: ColonyId,
        /// The dangling owner reference.
        owner: HouseId,
    },

    /// The colony indices disagree with the colony arena.
    #[error("colony {colony} inconsistent with index {index}")]
    ColonyIndexInconsistent {
        /// The colony.
        colony: ColonyId,
        /// Which index disagrees.
        index: &'static str,
    },

    /// A neoria has more assigned projects than usable docks.
    #[error("neoria {neoria} has {occupied} projects on {docks} docks")]
    DockOverCommit {
        /// The overloaded facility.
        neoria: NeoriaId,
        /// Projects assigned.
        occupied: u32,
        /// Docks available.
        docks: u32,
    },

    /// A project's dock assignment references a missing neoria.
    #[error("project {project} assigned to missing neoria {neoria}")]
    ProjectDockDangling {
        /// The project.
        project: ProjectId,
        /// The dangling dock reference.
        neoria: NeoriaId,
    },

    /// A project belongs to a colony that no longer exists.
    #[error("project {project} owned by missing colony {colony}")]
    ProjectColonyMissing {
        /// The project.
        project: ProjectId,
        /// The dangling colony reference.
        colony: ColonyId,
    },
}

impl GameState {
    /// Walk every invariant the engine relies on and report violations.
    ///
    /// An empty result means the state is sound.
    #[must_use]
    pub fn verify_invariants(&self) -> Vec<AuditFinding> {
        let mut findings = Vec::new();
        self.audit_fleets(&mut findings);
        self.audit_ships(&mut findings);
        self.audit_colonies(&mut findings);
        self.audit_projects(&mut findings);
        findings
    }

    fn audit_fleets(&self, findings: &mut Vec<AuditFinding>) {
        for (fleet_id, fleet) in self.fleets.iter() {
            if !self.houses.contains(fleet.owner) {
                findings.push(AuditFinding::FleetOwnerMissing {
                    fleet: fleet_id,
                    owner: fleet.owner,
                });
            }
            if self.map.system(fleet.system).is_none() {
                findings.push(AuditFinding::FleetSystemMissing {
                    fleet: fleet_id,
                    system: fleet.system,
                });
            }
            if !self.fleets_of(fleet.owner).contains(&fleet_id) {
                findings.push(AuditFinding::FleetMissingFromIndex {
                    fleet: fleet_id,
                    index: "fleets_by_owner",
                });
            }
            if !self.fleets_at(fleet.system).contains(&fleet_id) {
                findings.push(AuditFinding::FleetMissingFromIndex {
                    fleet: fleet_id,
                    index: "fleets_by_system",
                });
            }
            for ship_id in &fleet.ships {
                match self.ships.get(*ship_id) {
                    None => findings.push(AuditFinding::FleetListsMissingShip {
                        fleet: fleet_id,
                        ship: *ship_id,
                    }),
                    Some(ship) if ship.fleet != Some(fleet_id) => {
                        findings.push(AuditFinding::ShipFleetMismatch {
                            ship: *ship_id,
                            fleet: fleet_id,
                        });
                    }
                    Some(_) => {}
                }
            }
        }

        for house_id in self.house_ids() {
            for fleet_id in self.fleets_of(house_id) {
                if !self.fleets.contains(fleet_id) {
                    findings.push(AuditFinding::IndexReferencesMissingFleet {
                        fleet: fleet_id,
                        index: "fleets_by_owner",
                    });
                }
            }
        }
    }

    fn audit_ships(&self, findings: &mut Vec<AuditFinding>) {
        for (ship_id, ship) in self.ships.iter() {
            match (ship.fleet, ship.stationed_colony) {
                (None, None) => findings.push(AuditFinding::ShipUnattached { ship: ship_id }),
                (Some(fleet_id), _) => {
                    let listed = self
                        .fleets
                        .get(fleet_id)
                        .is_some_and(|fleet| fleet.ships.contains(&ship_id));
                    if !listed {
                        findings.push(AuditFinding::ShipFleetMismatch {
                            ship: ship_id,
                            fleet: fleet_id,
                        });
                    }
                }
                (None, Some(_)) => {}
            }
        }
    }

    fn audit_colonies(&self, findings: &mut Vec<AuditFinding>) {
        for (colony_id, colony) in self.colonies.iter() {
            if !self.houses.contains(colony.owner) {
                findings.push(AuditFinding::ColonyOwnerMissing {
                    colony: colony_id,
                    owner: colony.owner,
                });
            }
            if self.colony_at(colony.system) != Some(colony_id) {
                findings.push(AuditFinding::ColonyIndexInconsistent {
                    colony: colony_id,
                    index: "colony_by_system",
                });
            }
            if !self.colonies_of(colony.owner).contains(&colony_id) {
                findings.push(AuditFinding::ColonyIndexInconsistent {
                    colony: colony_id,
                    index: "colonies_by_owner",
                });
            }
        }
    }

    fn audit_projects(&self, findings: &mut Vec<AuditFinding>) {
        for (project_id, project) in self.projects.iter() {
            if !self.colonies.contains(project.colony) {
                findings.push(AuditFinding::ProjectColonyMissing {
                    project: project_id,
                    colony: project.colony,
                });
            }
            if let Some(neoria_id) = project.dock
                && !self.neorias.contains(neoria_id)
            {
                findings.push(AuditFinding::ProjectDockDangling {
                    project: project_id,
                    neoria: neoria_id,
                });
            }
        }

        for (neoria_id, neoria) in self.neorias.iter() {
            let occupied = self.occupied_docks(neoria_id);
            let docks = neoria.effective_docks;
            if occupied > docks {
                findings.push(AuditFinding::DockOverCommit {
                    neoria: neoria_id,
                    occupied,
                    docks,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use ec4x_map::{MapShape, generate_map};
    use ec4x_types::{GameId, SystemId, TechTree};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn state_with_fleet() -> (GameState, FleetId) {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let map = generate_map(
            MapShape {
                rings: 2,
                houses: 2,
            },
            &mut rng,
        )
        .map(|g| g.map)
        .unwrap_or_default();
        let mut state = GameState::empty(GameId::new(), map);
        let house = state.add_house("Atreides".to_owned(), 100, TechTree::default());
        let system = state
            .map
            .systems()
            .next()
            .map(|s| s.id)
            .unwrap_or(SystemId::from_parts(0, 0));
        let fleet = state.create_fleet(house, system);
        (state, fleet)
    }

    #[test]
    fn clean_state_has_no_findings() {
        let (state, _) = state_with_fleet();
        assert!(state.verify_invariants().is_empty());
    }

    #[test]
    fn dangling_roster_entry_is_found() {
        let (mut state, fleet) = state_with_fleet();
        if let Some(f) = state.fleets.get_mut(fleet) {
            f.ships.insert(ec4x_types::ShipId::from_parts(77, 0));
        }
        let findings = state.verify_invariants();
        assert!(
            findings
                .iter()
                .any(|f| matches!(f, AuditFinding::FleetListsMissingShip { .. }))
        );
    }

    #[test]
    fn stale_location_is_found() {
        let (mut state, fleet) = state_with_fleet();
        if let Some(f) = state.fleets.get_mut(fleet) {
            // Bypassing move_fleet desynchronizes the location index.
            f.system = SystemId::from_parts(9999, 0);
        }
        let findings = state.verify_invariants();
        assert!(!findings.is_empty());
    }
}
