//! Economy rules: colony income, upkeep, growth.
//!
//! Income is integer PP throughout: the gross is the base output with a
//! chain of percent factors applied in a fixed order, so the same inputs
//! always produce the same PP. The Maintenance phase uses the projection
//! here both for the budget gate's reservation and for the actual charge.

use ec4x_state::GameState;
use ec4x_types::{ColonyId, EffectKind, FleetStatus, HouseId, ShipId};
use tracing::debug;

use crate::config::GameConfig;

/// One colony's income for the turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColonyIncome {
    /// The colony.
    pub colony: ColonyId,
    /// Gross output before tax.
    pub gross: i64,
    /// PP actually collected into the treasury.
    pub collected: i64,
    /// Whether a blockade suppressed the take.
    pub blockaded: bool,
}

/// Apply a percent factor to a value.
const fn pct(value: i64, percent: i64) -> i64 {
    value.saturating_mul(percent) / 100
}

/// Compute one colony's income.
///
/// Gross output is `PU x base`, scaled by planet class, resource rating,
/// infrastructure, industrial units, the owner's EL, and starbase bonuses.
/// The tax rate then converts gross to collected PP, and a blockade or a
/// tax-suppression effect cuts the collected amount.
#[must_use]
pub fn colony_income(state: &GameState, config: &GameConfig, colony_id: ColonyId) -> ColonyIncome {
    let Some(colony) = state.colonies.get(colony_id) else {
        return ColonyIncome {
            colony: colony_id,
            gross: 0,
            collected: 0,
            blockaded: false,
        };
    };
    let Some(system) = state.map.system(colony.system) else {
        return ColonyIncome {
            colony: colony_id,
            gross: 0,
            collected: 0,
            blockaded: colony.is_blockaded(),
        };
    };
    let economy = &config.economy;

    let mut gross = i64::from(colony.population).saturating_mul(economy.base_pp_per_pu);
    gross = pct(gross, economy.planet_factor(system.planet_class));
    gross = pct(gross, economy.resource_factor(system.resource_rating));
    gross = pct(
        gross,
        100_i64.saturating_add(
            economy
                .infrastructure_percent_step
                .saturating_mul(i64::from(colony.infrastructure.saturating_sub(1))),
        ),
    );
    gross = pct(
        gross,
        100_i64.saturating_add(
            economy
                .iu_percent_step
                .saturating_mul(i64::from(colony.industrial_units)),
        ),
    );
    let el = state
        .houses
        .get(colony.owner)
        .map_or(1, |h| h.tech.economic);
    gross = pct(
        gross,
        100_i64.saturating_add(
            economy
                .el_percent_step
                .saturating_mul(i64::from(el.saturating_sub(1))),
        ),
    );
    let working_starbases = colony
        .kastras
        .iter()
        .filter(|id| {
            state
                .kastras
                .get(**id)
                .is_some_and(ec4x_state::Kastra::surveillance_active)
        })
        .count();
    gross = pct(
        gross,
        100_i64.saturating_add(
            economy
                .starbase_bonus_percent
                .saturating_mul(i64::try_from(working_starbases).unwrap_or(0)),
        ),
    );

    // Net colony value suppression from espionage.
    for effect in state.active_effects(EffectKind::NcvReduction, colony.owner, None) {
        gross = pct(gross, 100_i64.saturating_sub(effect.magnitude).max(0));
    }

    let mut collected = pct(gross, i64::from(colony.tax_rate));
    let blockaded = colony.is_blockaded();
    if blockaded {
        collected = pct(
            collected,
            100_i64.saturating_sub(economy.blockade_penalty_percent).max(0),
        );
    }
    for effect in state.active_effects(EffectKind::TaxReduction, colony.owner, None) {
        collected = pct(collected, 100_i64.saturating_sub(effect.magnitude).max(0));
    }

    ColonyIncome {
        colony: colony_id,
        gross,
        collected,
        blockaded,
    }
}

/// Prestige delta for this turn's rolling tax average: a low-tax bonus, a
/// high-tax penalty, or nothing.
#[must_use]
pub const fn tax_prestige_delta(config: &GameConfig, rolling_average: u32) -> i64 {
    if rolling_average <= config.economy.low_tax_threshold {
        config.economy.low_tax_prestige_bonus
    } else if rolling_average >= config.economy.high_tax_threshold {
        -config.economy.high_tax_prestige_penalty
    } else {
        0
    }
}

/// Natural growth: PTU added to a colony this turn.
#[must_use]
pub fn growth_ptu(config: &GameConfig, population: u32) -> u32 {
    if population == 0 {
        return 0;
    }
    population
        .saturating_mul(config.economy.growth_rate_percent)
        .checked_div(100)
        .unwrap_or(0)
        .max(1)
}

// ---------------------------------------------------------------------------
// Maintenance
// ---------------------------------------------------------------------------

/// The projected maintenance bill for a house this turn.
///
/// Ships pay by fleet status (reserve and mothballed fleets pay reduced
/// shares), facilities and ground units pay flat upkeep. Destroyed assets
/// pay nothing.
#[must_use]
pub fn projected_maintenance(state: &GameState, config: &GameConfig, house: HouseId) -> i64 {
    let mut total: i64 = 0;

    for (_, ship) in state.ships.iter() {
        if ship.owner != house || ship.is_destroyed() {
            continue;
        }
        let upkeep = config.ships.row(ship.class).upkeep;
        let status = ship
            .fleet
            .and_then(|fleet_id| state.fleets.get(fleet_id))
            .map_or(FleetStatus::Active, |fleet| fleet.status);
        let share = match status {
            FleetStatus::Active => 100,
            FleetStatus::Reserve => config.economy.reserve_upkeep_percent,
            FleetStatus::Mothballed => config.economy.mothball_upkeep_percent,
        };
        total = total.saturating_add(pct(upkeep, share));
    }

    for (_, neoria) in state.neorias.iter() {
        let owned = state
            .colonies
            .get(neoria.colony)
            .is_some_and(|c| c.owner == house);
        if owned && !matches!(neoria.combat_state, ec4x_types::CombatState::Destroyed) {
            total = total.saturating_add(config.facilities.neoria_upkeep(neoria.class));
        }
    }

    for (_, kastra) in state.kastras.iter() {
        if kastra.owner == house
            && !matches!(kastra.combat_state, ec4x_types::CombatState::Destroyed)
        {
            total = total.saturating_add(config.facilities.kastra_upkeep);
        }
    }

    for (_, unit) in state.ground_units.iter() {
        if unit.owner == house
            && !matches!(unit.combat_state, ec4x_types::CombatState::Destroyed)
        {
            total = total.saturating_add(config.ground.row(unit.class).upkeep);
        }
    }

    debug!(%house, total, "projected maintenance");
    total
}

/// Ships to cripple under a maintenance shortfall, cheapest upkeep first.
///
/// The shortfall policy degrades the cheapest active ships first so a
/// bankrupt house loses its escorts before its capital ships; ties break
/// on ascending ship id.
#[must_use]
pub fn shortfall_targets(state: &GameState, config: &GameConfig, house: HouseId) -> Vec<ShipId> {
    let mut candidates: Vec<(i64, ShipId)> = state
        .ships
        .iter()
        .filter(|(_, ship)| {
            ship.owner == house && matches!(ship.combat_state, ec4x_types::CombatState::Undamaged)
        })
        .map(|(id, ship)| (config.ships.row(ship.class).upkeep, id))
        .collect();
    candidates.sort_unstable();
    candidates.into_iter().map(|(_, id)| id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ec4x_map::{MapShape, generate_map};
    use ec4x_types::{GameId, PlanetClass, ResourceRating, SystemId, TechTree};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn lush_colony_state() -> (GameState, ColonyId) {
        let mut rng = ChaCha8Rng::seed_from_u64(31);
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
        let house = state.add_house("Atreides".to_owned(), 0, TechTree::default());
        let system = state
            .map
            .systems()
            .next()
            .map(|s| s.id)
            .unwrap_or(SystemId::from_parts(0, 0));
        if let Some(s) = state.map.system_mut(system) {
            s.planet_class = PlanetClass::Lush;
            s.resource_rating = ResourceRating::Abundant;
        }
        let colony = state
            .found_colony(house, system, 50)
            .unwrap_or(ColonyId::from_parts(0, 0));
        if let Some(c) = state.colonies.get_mut(colony) {
            c.population = 12;
        }
        (state, colony)
    }

    #[test]
    fn lush_abundant_homeworld_income() {
        // PU 12 x 10 PP = 120, Lush 125% -> 150, Abundant 100% -> 150,
        // infra 1 / IU 0 / EL 1 leave it unchanged; tax 50% -> 75 PP.
        let (state, colony) = lush_colony_state();
        let config = GameConfig::default();
        let income = colony_income(&state, &config, colony);
        assert_eq!(income.gross, 150);
        assert_eq!(income.collected, 75);
        assert!(!income.blockaded);
    }

    #[test]
    fn blockade_cuts_collected_income() {
        let (mut state, colony) = lush_colony_state();
        let config = GameConfig::default();
        let enemy = state.add_house("Harkonnen".to_owned(), 0, TechTree::default());
        if let Some(c) = state.colonies.get_mut(colony) {
            c.blockade = Some(ec4x_state::Blockade { by: enemy, turns: 1 });
        }
        let income = colony_income(&state, &config, colony);
        assert!(income.blockaded);
        // 75 PP cut by the 75% blockade penalty.
        assert_eq!(income.collected, 18);
    }

    #[test]
    fn growth_is_at_least_one_ptu() {
        let config = GameConfig::default();
        assert_eq!(growth_ptu(&config, 0), 0);
        assert_eq!(growth_ptu(&config, 3), 1);
        assert_eq!(growth_ptu(&config, 40), 2);
    }

    #[test]
    fn tax_prestige_brackets() {
        let config = GameConfig::default();
        assert_eq!(tax_prestige_delta(&config, 20), 2);
        assert_eq!(tax_prestige_delta(&config, 50), 0);
        assert_eq!(tax_prestige_delta(&config, 80), -2);
    }
}
