//! The canonical game state aggregate.
//!
//! [`GameState`] exclusively owns every entity table, the star map, the
//! diplomatic matrix, the per-house intel databases, and the turn
//! counters. All cross-entity references are ids.
//!
//! Secondary indices (fleets by owner, fleets by system, colonies by
//! owner, colony by system) are maintained by the mutation methods here,
//! never rebuilt ad hoc. Code that inserts or removes entities must go
//! through these methods; the invariant audit walks the indices after
//! every phase and poisons the turn on any inconsistency.

use std::collections::{BTreeMap, BTreeSet};

use ec4x_map::{FleetProfile, StarMap};
use ec4x_types::{
    Act, ColonyId, CombatState, EffectId, EffectKind, FleetId, GameId, GroundUnitId, HouseId,
    KastraId, NeoriaId, ProjectId, ProposalId, ShipClass, ShipId, SystemId, TechTree, TransitId,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::arena::Arena;
use crate::colony::Colony;
use crate::diplomacy::{DiplomaticMatrix, PendingProposal};
use crate::effects::OngoingEffect;
use crate::facility::{Kastra, Neoria};
use crate::fleet::{Fleet, Ship, ShipStats};
use crate::ground::GroundUnit;
use crate::house::House;
use crate::intel::IntelDatabase;
use crate::project::Project;
use crate::transit::PopulationInTransit;

/// The public act-progression banner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActProgression {
    /// The current act.
    pub act: Act,
    /// The turn the act began.
    pub started_turn: u32,
    /// Colonization percent at the last measurement.
    pub colonization_percent: u8,
    /// Total active-house prestige at the last measurement.
    pub total_prestige: i64,
}

impl Default for ActProgression {
    fn default() -> Self {
        Self {
            act: Act::LandGrab,
            started_turn: 1,
            colonization_percent: 0,
            total_prestige: 0,
        }
    }
}

/// Secondary indices maintained alongside the entity arenas.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct StateIndices {
    /// Fleets per owning house.
    fleets_by_owner: BTreeMap<HouseId, BTreeSet<FleetId>>,
    /// Fleets per system.
    fleets_by_system: BTreeMap<SystemId, BTreeSet<FleetId>>,
    /// Colonies per owning house.
    colonies_by_owner: BTreeMap<HouseId, BTreeSet<ColonyId>>,
    /// The one colony per system, if settled.
    colony_by_system: BTreeMap<SystemId, ColonyId>,
}

/// The canonical state of one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// The game this state belongs to.
    pub game_id: GameId,
    /// Current turn, starting at 1.
    pub turn: u32,
    /// Current game year.
    pub year: u32,
    /// Current game month, 1-12. Research upgrades run in months 1 and 7.
    pub month: u8,
    /// The star map.
    pub map: StarMap,
    /// All houses.
    pub houses: Arena<HouseId, House>,
    /// All colonies.
    pub colonies: Arena<ColonyId, Colony>,
    /// All fleets.
    pub fleets: Arena<FleetId, Fleet>,
    /// All ships.
    pub ships: Arena<ShipId, Ship>,
    /// All neorias.
    pub neorias: Arena<NeoriaId, Neoria>,
    /// All kastras.
    pub kastras: Arena<KastraId, Kastra>,
    /// All ground units.
    pub ground_units: Arena<GroundUnitId, GroundUnit>,
    /// All in-flight projects.
    pub projects: Arena<ProjectId, Project>,
    /// All ongoing espionage effects.
    pub effects: Arena<EffectId, OngoingEffect>,
    /// All population packets in transit.
    pub transits: Arena<TransitId, PopulationInTransit>,
    /// All pending pact proposals.
    pub proposals: Arena<ProposalId, PendingProposal>,
    /// The diplomatic matrix.
    pub diplomacy: DiplomaticMatrix,
    /// Per-house intelligence databases.
    pub intel: BTreeMap<HouseId, IntelDatabase>,
    /// The public act banner.
    pub act: ActProgression,
    /// Secondary indices.
    indices: StateIndices,
}

impl GameState {
    /// An empty state for a game, before setup populates it.
    #[must_use]
    pub fn empty(game_id: GameId, map: StarMap) -> Self {
        Self {
            game_id,
            turn: 1,
            year: 1,
            month: 1,
            map,
            houses: Arena::new(),
            colonies: Arena::new(),
            fleets: Arena::new(),
            ships: Arena::new(),
            neorias: Arena::new(),
            kastras: Arena::new(),
            ground_units: Arena::new(),
            projects: Arena::new(),
            effects: Arena::new(),
            transits: Arena::new(),
            proposals: Arena::new(),
            diplomacy: DiplomaticMatrix::new(),
            intel: BTreeMap::new(),
            act: ActProgression::default(),
            indices: StateIndices::default(),
        }
    }

    // -------------------------------------------------------------------
    // Turn counters
    // -------------------------------------------------------------------

    /// Advance the turn counter and derived year/month.
    pub fn advance_turn(&mut self) {
        self.turn = self.turn.saturating_add(1);
        let zero_based = self.turn.saturating_sub(1);
        self.month = u8::try_from(zero_based % 12).map_or(1, |m| m.saturating_add(1));
        self.year = (zero_based / 12).saturating_add(1);
    }

    /// Whether the current month is a research upgrade month.
    #[must_use]
    pub const fn is_upgrade_month(&self) -> bool {
        self.month == 1 || self.month == 7
    }

    // -------------------------------------------------------------------
    // Houses
    // -------------------------------------------------------------------

    /// Add a house at game setup.
    pub fn add_house(&mut self, name: String, treasury: i64, tech: TechTree) -> HouseId {
        let id = self
            .houses
            .insert_with(|id| House::founding(id, name, treasury, tech));
        self.intel.entry(id).or_default();
        self.indices.fleets_by_owner.entry(id).or_default();
        self.indices.colonies_by_owner.entry(id).or_default();
        id
    }

    /// All house ids in ascending order.
    #[must_use]
    pub fn house_ids(&self) -> Vec<HouseId> {
        self.houses.ids()
    }

    /// The intel database of a house, created on first touch.
    pub fn intel_mut(&mut self, house: HouseId) -> &mut IntelDatabase {
        self.intel.entry(house).or_default()
    }

    // -------------------------------------------------------------------
    // Colonies
    // -------------------------------------------------------------------

    /// Found a colony at a system.
    ///
    /// Returns `None` if the system is already settled.
    pub fn found_colony(
        &mut self,
        owner: HouseId,
        system: SystemId,
        tax_rate: u8,
    ) -> Option<ColonyId> {
        if self.indices.colony_by_system.contains_key(&system) {
            return None;
        }
        let id = self
            .colonies
            .insert_with(|id| Colony::founded(id, owner, system, tax_rate));
        self.indices.colony_by_system.insert(system, id);
        self.indices.colonies_by_owner.entry(owner).or_default().insert(id);
        debug!(%owner, %system, colony = %id, "colony founded");
        Some(id)
    }

    /// The colony at a system, if settled.
    #[must_use]
    pub fn colony_at(&self, system: SystemId) -> Option<ColonyId> {
        self.indices.colony_by_system.get(&system).copied()
    }

    /// All colonies of a house, ascending.
    #[must_use]
    pub fn colonies_of(&self, owner: HouseId) -> Vec<ColonyId> {
        self.indices
            .colonies_by_owner
            .get(&owner)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Remove a colony (population reached zero or assets razed).
    ///
    /// The caller is responsible for the colony's facilities, projects,
    /// and ground units beforehand.
    pub fn remove_colony(&mut self, id: ColonyId) -> Option<Colony> {
        let colony = self.colonies.remove(id)?;
        self.indices.colony_by_system.remove(&colony.system);
        if let Some(set) = self.indices.colonies_by_owner.get_mut(&colony.owner) {
            set.remove(&id);
        }
        debug!(colony = %id, system = %colony.system, "colony removed");
        Some(colony)
    }

    /// Transfer a colony to a new owner (successful invasion).
    ///
    /// Reassigns the ownership index and the defending starbases.
    pub fn transfer_colony(&mut self, id: ColonyId, new_owner: HouseId) -> bool {
        let Some(colony) = self.colonies.get_mut(id) else {
            return false;
        };
        let old_owner = colony.owner;
        colony.owner = new_owner;
        colony.blockade = None;
        let kastras: Vec<KastraId> = colony.kastras.iter().copied().collect();
        if let Some(set) = self.indices.colonies_by_owner.get_mut(&old_owner) {
            set.remove(&id);
        }
        self.indices
            .colonies_by_owner
            .entry(new_owner)
            .or_default()
            .insert(id);
        for kastra_id in kastras {
            if let Some(kastra) = self.kastras.get_mut(kastra_id) {
                kastra.owner = new_owner;
            }
        }
        debug!(colony = %id, %old_owner, %new_owner, "colony changed hands");
        true
    }

    // -------------------------------------------------------------------
    // Fleets and ships
    // -------------------------------------------------------------------

    /// Create an empty fleet shell.
    pub fn create_fleet(&mut self, owner: HouseId, system: SystemId) -> FleetId {
        let id = self.fleets.insert_with(|id| Fleet::empty(id, owner, system));
        self.indices.fleets_by_owner.entry(owner).or_default().insert(id);
        self.indices.fleets_by_system.entry(system).or_default().insert(id);
        id
    }

    /// Remove a fleet shell. Member ships must already be detached.
    pub fn remove_fleet(&mut self, id: FleetId) -> Option<Fleet> {
        let fleet = self.fleets.remove(id)?;
        if let Some(set) = self.indices.fleets_by_owner.get_mut(&fleet.owner) {
            set.remove(&id);
        }
        if let Some(set) = self.indices.fleets_by_system.get_mut(&fleet.system) {
            set.remove(&id);
        }
        Some(fleet)
    }

    /// Move a fleet to another system, updating the location index.
    pub fn move_fleet(&mut self, id: FleetId, to: SystemId) -> bool {
        let Some(fleet) = self.fleets.get_mut(id) else {
            return false;
        };
        let from = fleet.system;
        if from == to {
            return true;
        }
        fleet.system = to;
        if let Some(set) = self.indices.fleets_by_system.get_mut(&from) {
            set.remove(&id);
        }
        self.indices.fleets_by_system.entry(to).or_default().insert(id);
        true
    }

    /// All fleets at a system, ascending.
    #[must_use]
    pub fn fleets_at(&self, system: SystemId) -> Vec<FleetId> {
        self.indices
            .fleets_by_system
            .get(&system)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// All fleets of a house, ascending.
    #[must_use]
    pub fn fleets_of(&self, owner: HouseId) -> Vec<FleetId> {
        self.indices
            .fleets_by_owner
            .get(&owner)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Commission a ship into a fleet.
    pub fn commission_ship(
        &mut self,
        fleet_id: FleetId,
        class: ShipClass,
        stats: ShipStats,
    ) -> Option<ShipId> {
        let owner = self.fleets.get(fleet_id)?.owner;
        let ship_id = self.ships.insert_with(|id| Ship {
            id,
            owner,
            fleet: Some(fleet_id),
            stationed_colony: None,
            class,
            role: class.role(),
            stats,
            combat_state: CombatState::Undamaged,
            colonists: 0,
            marines: 0,
            assigned_carrier: None,
            embarked_fighters: Vec::new(),
        });
        if let Some(fleet) = self.fleets.get_mut(fleet_id) {
            fleet.ships.insert(ship_id);
        }
        Some(ship_id)
    }

    /// Remove a ship, detaching it from its fleet or station.
    pub fn remove_ship(&mut self, id: ShipId) -> Option<Ship> {
        let ship = self.ships.remove(id)?;
        if let Some(fleet_id) = ship.fleet
            && let Some(fleet) = self.fleets.get_mut(fleet_id)
        {
            fleet.ships.remove(&id);
        }
        Some(ship)
    }

    /// The traversal profile of a fleet, from its live member ships.
    #[must_use]
    pub fn fleet_profile(&self, fleet_id: FleetId) -> FleetProfile {
        self.fleets.get(fleet_id).map_or(FleetProfile::LINE, |fleet| {
            fleet.profile(|ship_id| {
                self.ships
                    .get(ship_id)
                    .map(|ship| (ship.class, ship.combat_state))
            })
        })
    }

    // -------------------------------------------------------------------
    // Presence
    // -------------------------------------------------------------------

    /// The single source of truth for "house has presence in system":
    /// an owned colony there, an owned fleet there, or an owned uncrippled
    /// starbase with active surveillance there.
    #[must_use]
    pub fn has_presence(&self, house: HouseId, system: SystemId) -> bool {
        if let Some(colony_id) = self.colony_at(system)
            && self.colonies.get(colony_id).is_some_and(|c| c.owner == house)
        {
            return true;
        }
        if self
            .fleets_at(system)
            .iter()
            .any(|id| self.fleets.get(*id).is_some_and(|f| f.owner == house))
        {
            return true;
        }
        self.kastras.iter().any(|(_, kastra)| {
            kastra.owner == house && kastra.system == system && kastra.surveillance_active()
        })
    }

    // -------------------------------------------------------------------
    // Effects
    // -------------------------------------------------------------------

    /// Active effects of a kind against a house, optionally scoped to a
    /// system.
    #[must_use]
    pub fn active_effects(
        &self,
        kind: EffectKind,
        target: HouseId,
        system: Option<SystemId>,
    ) -> Vec<&OngoingEffect> {
        self.effects
            .iter()
            .map(|(_, effect)| effect)
            .filter(|effect| {
                effect.kind == kind
                    && effect.target_house == target
                    && (system.is_none() || effect.system == system)
            })
            .collect()
    }

    /// Dock slots already occupied at a neoria by queued-and-active
    /// projects.
    #[must_use]
    pub fn occupied_docks(&self, neoria: NeoriaId) -> u32 {
        let count = self
            .projects
            .iter()
            .filter(|(_, project)| project.dock == Some(neoria))
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }
}

#[cfg(test)]
mod tests {
    use ec4x_map::MapShape;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn small_state() -> GameState {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let generated = ec4x_map::generate_map(
            MapShape {
                rings: 2,
                houses: 2,
            },
            &mut rng,
        );
        let map = generated.map(|g| g.map).unwrap_or_default();
        GameState::empty(GameId::new(), map)
    }

    fn first_system(state: &GameState) -> SystemId {
        state
            .map
            .systems()
            .next()
            .map(|s| s.id)
            .unwrap_or(SystemId::from_parts(0, 0))
    }

    #[test]
    fn turn_counters_derive_year_and_month() {
        let mut state = small_state();
        assert_eq!((state.year, state.month), (1, 1));
        for _ in 0..12 {
            state.advance_turn();
        }
        assert_eq!((state.year, state.month), (2, 1));
        state.advance_turn();
        assert_eq!(state.month, 2);
    }

    #[test]
    fn upgrade_months_are_one_and_seven() {
        let mut state = small_state();
        let mut upgrade_months = Vec::new();
        for _ in 0..12 {
            if state.is_upgrade_month() {
                upgrade_months.push(state.month);
            }
            state.advance_turn();
        }
        assert_eq!(upgrade_months, vec![1, 7]);
    }

    #[test]
    fn colony_indices_stay_consistent() {
        let mut state = small_state();
        let house = state.add_house("Harkonnen".to_owned(), 500, TechTree::default());
        let system = first_system(&state);
        let colony = state.found_colony(house, system, 50);
        assert!(colony.is_some());
        assert_eq!(state.colony_at(system), colony);
        // Second colony at the same system is refused.
        assert!(state.found_colony(house, system, 50).is_none());
        let Some(colony) = colony else { return };
        let _ = state.remove_colony(colony);
        assert_eq!(state.colony_at(system), None);
        assert!(state.colonies_of(house).is_empty());
    }

    #[test]
    fn fleet_movement_updates_the_location_index() {
        let mut state = small_state();
        let house = state.add_house("Corrino".to_owned(), 500, TechTree::default());
        let systems: Vec<SystemId> = state.map.systems().map(|s| s.id).take(2).collect();
        let (Some(&a), Some(&b)) = (systems.first(), systems.get(1)) else {
            return;
        };
        let fleet = state.create_fleet(house, a);
        assert_eq!(state.fleets_at(a), vec![fleet]);
        assert!(state.move_fleet(fleet, b));
        assert!(state.fleets_at(a).is_empty());
        assert_eq!(state.fleets_at(b), vec![fleet]);
    }

    #[test]
    fn presence_through_colony_fleet_or_starbase() {
        let mut state = small_state();
        let house = state.add_house("Ordos".to_owned(), 500, TechTree::default());
        let other = state.add_house("Moritani".to_owned(), 500, TechTree::default());
        let system = first_system(&state);
        assert!(!state.has_presence(house, system));
        let fleet = state.create_fleet(house, system);
        assert!(state.has_presence(house, system));
        assert!(!state.has_presence(other, system));
        let _ = state.remove_fleet(fleet);
        assert!(!state.has_presence(house, system));
    }

    #[test]
    fn transfer_colony_reassigns_ownership_index() {
        let mut state = small_state();
        let a = state.add_house("Atreides".to_owned(), 500, TechTree::default());
        let b = state.add_house("Harkonnen".to_owned(), 500, TechTree::default());
        let system = first_system(&state);
        let Some(colony) = state.found_colony(a, system, 50) else {
            return;
        };
        assert!(state.transfer_colony(colony, b));
        assert!(state.colonies_of(a).is_empty());
        assert_eq!(state.colonies_of(b), vec![colony]);
    }

    #[test]
    fn commissioned_ships_join_their_fleet() {
        let mut state = small_state();
        let house = state.add_house("Vernius".to_owned(), 500, TechTree::default());
        let system = first_system(&state);
        let fleet = state.create_fleet(house, system);
        let ship = state.commission_ship(
            fleet,
            ShipClass::Destroyer,
            ShipStats {
                attack: 5,
                defense: 4,
                command_cost: 2,
                cargo_capacity: 0,
                wep_at_build: 1,
            },
        );
        let Some(ship) = ship else { return };
        assert!(
            state
                .fleets
                .get(fleet)
                .is_some_and(|f| f.ships.contains(&ship))
        );
        let removed = state.remove_ship(ship);
        assert!(removed.is_some());
        assert!(
            state
                .fleets
                .get(fleet)
                .is_some_and(|f| f.ships.is_empty())
        );
    }
}
