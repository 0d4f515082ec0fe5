//! Deterministic game setup.
//!
//! [`new_game`] builds turn-1 state from a [`GameSetup`] descriptor: the
//! map is generated from the setup seed, each house gets a homeworld
//! colony with a spaceport, a garrison, and a small starting fleet with a
//! loaded expansion hull. The same setup always produces the same state.

use ec4x_map::MapShape;
use ec4x_rules::GameConfig;
use ec4x_state::{GameState, GroundLocation, GroundUnit, Neoria, ShipStats};
use ec4x_types::{GameId, GroundClass, NeoriaClass, ShipClass, TechTree};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::EngineError;
use crate::rng;

/// Everything that parameterizes a fresh game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSetup {
    /// The game's external identity.
    pub game_id: GameId,
    /// Seed for map generation and starting rolls.
    pub seed: u64,
    /// One display name per house.
    pub house_names: Vec<String>,
    /// Rings of systems around the map center.
    pub map_rings: u32,
    /// Starting treasury per house, in PP.
    pub starting_treasury: i64,
    /// Level every tech field starts at.
    pub starting_tech_level: u8,
    /// Homeworld starting population, in PU.
    pub homeworld_population: u32,
    /// Homeworld starting tax rate percent.
    pub starting_tax_rate: u8,
}

impl Default for GameSetup {
    fn default() -> Self {
        Self {
            game_id: GameId::new(),
            seed: 0,
            house_names: vec![
                "House Atreides".to_owned(),
                "House Harkonnen".to_owned(),
                "House Corrino".to_owned(),
                "House Ordos".to_owned(),
            ],
            map_rings: 4,
            starting_treasury: 1000,
            starting_tech_level: 1,
            homeworld_population: 10,
            starting_tax_rate: 50,
        }
    }
}

/// Hulls every house starts with, beyond the loaded expansion ship.
const STARTING_ESCORTS: [ShipClass; 3] =
    [ShipClass::Scout, ShipClass::Frigate, ShipClass::Frigate];

/// Freeze a ship's stats from the config tables at a WEP level.
fn frozen_stats(config: &GameConfig, class: ShipClass, wep: u8) -> ShipStats {
    let row = config.ships.row(class);
    ShipStats {
        attack: row.attack,
        defense: row.defense,
        command_cost: row.command_cost,
        cargo_capacity: row.cargo_capacity,
        wep_at_build: wep,
    }
}

/// Build turn-1 state for a setup.
///
/// # Errors
///
/// Returns [`EngineError::InvalidSetup`] for impossible descriptors and
/// [`EngineError::MapGeneration`] when the map cannot host the houses.
pub fn new_game(setup: &GameSetup, config: &GameConfig) -> Result<GameState, EngineError> {
    if setup.house_names.len() < 2 {
        return Err(EngineError::InvalidSetup {
            reason: "a game needs at least 2 houses".to_owned(),
        });
    }
    if setup.homeworld_population == 0 {
        return Err(EngineError::InvalidSetup {
            reason: "homeworld population must be at least 1 PU".to_owned(),
        });
    }
    let houses = u32::try_from(setup.house_names.len()).map_err(|_| EngineError::InvalidSetup {
        reason: "too many houses".to_owned(),
    })?;

    let mut map_rng = rng::turn_rng(setup.seed);
    let generated = ec4x_map::generate_map(
        MapShape {
            rings: setup.map_rings,
            houses,
        },
        &mut map_rng,
    )?;

    let mut state = GameState::empty(setup.game_id, generated.map);
    let tech = TechTree::uniform(setup.starting_tech_level.max(1));
    let wep = tech.weapons;

    for (slot, name) in setup.house_names.iter().enumerate() {
        let house = state.add_house(name.clone(), setup.starting_treasury, tech.clone());
        let Some(&homeworld) = generated.homeworlds.get(slot) else {
            return Err(EngineError::InvalidSetup {
                reason: "homeworld placement ran short".to_owned(),
            });
        };

        let Some(colony_id) = state.found_colony(house, homeworld, setup.starting_tax_rate) else {
            return Err(EngineError::InvalidSetup {
                reason: "two houses share a homeworld".to_owned(),
            });
        };
        if let Some(colony) = state.colonies.get_mut(colony_id) {
            colony.population = setup.homeworld_population;
            colony.infrastructure = 2;
            colony.industrial_units = 2;
        }

        // The homeworld starts with a spaceport and a garrison.
        let docks = config
            .facilities
            .effective_docks(NeoriaClass::Spaceport.base_docks(), tech.construction);
        let neoria = state.neorias.insert_with(|id| {
            Neoria::commissioned(id, colony_id, NeoriaClass::Spaceport, 1, docks)
        });
        if let Some(colony) = state.colonies.get_mut(colony_id) {
            colony.neorias.insert(neoria);
        }
        let army_row = config.ground.row(GroundClass::Army);
        let army = state.ground_units.insert_with(|id| GroundUnit {
            id,
            owner: house,
            class: GroundClass::Army,
            location: GroundLocation::Colony(colony_id),
            attack: army_row.attack,
            defense: army_row.defense,
            combat_state: ec4x_types::CombatState::Undamaged,
        });
        if let Some(colony) = state.colonies.get_mut(colony_id) {
            colony.ground_units.insert(army);
        }

        // A small starting fleet with a loaded expansion hull.
        let fleet = state.create_fleet(house, homeworld);
        for class in STARTING_ESCORTS {
            let _ = state.commission_ship(fleet, class, frozen_stats(config, class, wep));
        }
        let etac_stats = frozen_stats(config, ShipClass::Etac, wep);
        if let Some(etac) = state.commission_ship(fleet, ShipClass::Etac, etac_stats)
            && let Some(ship) = state.ships.get_mut(etac)
        {
            ship.colonists = etac_stats.cargo_capacity;
        }
    }

    info!(
        game = %setup.game_id,
        houses = setup.house_names.len(),
        systems = state.map.system_count(),
        "game created"
    );
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_setup_same_state() {
        let setup = GameSetup {
            game_id: GameId::from(uuid::Uuid::from_u128(7)),
            ..GameSetup::default()
        };
        let config = GameConfig::default();
        let a = new_game(&setup, &config).ok();
        let b = new_game(&setup, &config).ok();
        assert!(a.is_some());
        assert_eq!(a, b);
    }

    #[test]
    fn every_house_starts_with_a_colony_and_fleet() {
        let setup = GameSetup::default();
        let config = GameConfig::default();
        let Ok(state) = new_game(&setup, &config) else {
            return;
        };
        for house in state.house_ids() {
            assert_eq!(state.colonies_of(house).len(), 1);
            assert_eq!(state.fleets_of(house).len(), 1);
        }
        assert!(state.verify_invariants().is_empty());
    }

    #[test]
    fn one_house_is_rejected() {
        let setup = GameSetup {
            house_names: vec!["Loner".to_owned()],
            ..GameSetup::default()
        };
        let result = new_game(&setup, &GameConfig::default());
        assert!(matches!(result, Err(EngineError::InvalidSetup { .. })));
    }
}
