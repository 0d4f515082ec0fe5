//! Research rules: point conversion, bi-annual upgrades, breakthroughs.
//!
//! Research PP convert to points when the Command phase executes the
//! allocation. On upgrade turns (game months 1 and 7) each house may
//! advance each field by at most one level, paying the level cost from
//! the matching point pool. A breakthrough roll follows, with odds scaled
//! by recent research spending.

use ec4x_events::{EventPayload, GameEvent};
use ec4x_state::{GameState, House};
use ec4x_types::{BreakthroughKind, HouseId, ResearchAllocation, TechField};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::config::GameConfig;

/// Convert an accepted research allocation into banked points.
///
/// ERP and SRP are general pools; TRP bank per target field.
pub fn apply_allocation(
    house: &mut House,
    config: &GameConfig,
    allocation: &ResearchAllocation,
) {
    let research = &config.research;
    house.research.erp = house
        .research
        .erp
        .saturating_add(allocation.erp_pp / research.pp_per_erp.max(1));
    house.research.srp = house
        .research
        .srp
        .saturating_add(allocation.srp_pp / research.pp_per_srp.max(1));
    for (field, pp) in &allocation.trp_pp {
        let points = pp / research.pp_per_trp.max(1);
        let entry = house.research.trp.entry(*field).or_insert(0);
        *entry = entry.saturating_add(points);
    }
    house.research.record_spending(allocation.total_pp());
}

/// Cost in points to advance a field to `next_level`, after any standing
/// discount.
#[must_use]
pub fn level_cost(config: &GameConfig, house: &House, next_level: u8) -> i64 {
    let base = config
        .research
        .level_cost_per_level
        .saturating_mul(i64::from(next_level));
    let discount = i64::from(house.research.next_cost_discount);
    base.saturating_mul(100_i64.saturating_sub(discount).max(0)) / 100
}

/// Which point pool pays for a field.
const fn pool_for(field: TechField) -> Pool {
    match field {
        TechField::Economic => Pool::Erp,
        TechField::Science => Pool::Srp,
        _ => Pool::Trp,
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Pool {
    Erp,
    Srp,
    Trp,
}

/// Run one house's upgrade cycle: each field may advance at most one
/// level, paid from its pool. Returns events for each advance.
pub fn run_upgrade_cycle(
    state: &mut GameState,
    config: &GameConfig,
    rng: &mut ChaCha8Rng,
    house_id: HouseId,
    events: &mut Vec<GameEvent>,
) {
    let turn = state.turn;
    let mut advanced_fields: Vec<(TechField, u8)> = Vec::new();

    if let Some(house) = state.houses.get_mut(house_id) {
        for field in TechField::ALL {
            let next = house.tech.level(field).saturating_add(1);
            let cost = level_cost(config, house, next);
            let affordable = match pool_for(field) {
                Pool::Erp => house.research.erp >= cost,
                Pool::Srp => house.research.srp >= cost,
                Pool::Trp => house.research.trp.get(&field).copied().unwrap_or(0) >= cost,
            };
            if !affordable {
                continue;
            }
            match pool_for(field) {
                Pool::Erp => house.research.erp -= cost,
                Pool::Srp => house.research.srp -= cost,
                Pool::Trp => {
                    if let Some(points) = house.research.trp.get_mut(&field) {
                        *points -= cost;
                    }
                }
            }
            // The discount is spent by the first advance that uses it.
            house.research.next_cost_discount = 0;
            let level = house.tech.advance(field);
            advanced_fields.push((field, level));
        }
    }

    for (field, level) in &advanced_fields {
        events.push(GameEvent::for_house(
            turn,
            house_id,
            EventPayload::TechAdvance {
                field: *field,
                level: *level,
            },
        ));
        events.push(GameEvent::for_house(
            turn,
            house_id,
            EventPayload::PrestigeChanged {
                delta: 5,
                reason: format!("{field:?} advanced to level {level}"),
            },
        ));
        if let Some(house) = state.houses.get_mut(house_id) {
            house.prestige = house.prestige.saturating_add(5);
        }
        debug!(%house_id, ?field, level, "tech advance");
    }

    // Dock recomputation for CST advances happens in Maintenance
    // alongside the other derived updates.
    roll_breakthrough(state, config, rng, house_id, events);
}

/// The breakthrough roll: base odds plus a bonus per window spending.
fn roll_breakthrough(
    state: &mut GameState,
    config: &GameConfig,
    rng: &mut ChaCha8Rng,
    house_id: HouseId,
    events: &mut Vec<GameEvent>,
) {
    let turn = state.turn;
    let research = &config.research;
    let window = state
        .houses
        .get(house_id)
        .map_or(0, |h| h.research.window_spending());
    let bonus = u32::try_from(window / research.breakthrough_rp_step.max(1)).unwrap_or(0);
    let chance = research.breakthrough_base_percent.saturating_add(bonus).min(95);
    if rng.random_range(0..100_u32) >= chance {
        return;
    }

    let kind = match rng.random_range(0..4_u32) {
        0 => BreakthroughKind::Minor,
        1 => BreakthroughKind::Moderate,
        2 => BreakthroughKind::Major,
        _ => BreakthroughKind::Revolutionary,
    };

    if let Some(house) = state.houses.get_mut(house_id) {
        match kind {
            BreakthroughKind::Minor => {
                house.research.srp = house.research.srp.saturating_add(research.minor_windfall_rp);
            }
            BreakthroughKind::Moderate => {
                house.research.next_cost_discount = research.moderate_discount_percent;
            }
            BreakthroughKind::Major => {
                // A free level in EL or SL, whichever trails.
                let field = if house.tech.economic <= house.tech.science {
                    TechField::Economic
                } else {
                    TechField::Science
                };
                let level = house.tech.advance(field);
                events.push(GameEvent::for_house(
                    turn,
                    house_id,
                    EventPayload::TechAdvance { field, level },
                ));
            }
            BreakthroughKind::Revolutionary => {
                house.research.unique_techs = house.research.unique_techs.saturating_add(1);
            }
        }
    }

    events.push(GameEvent::for_house(
        turn,
        house_id,
        EventPayload::Breakthrough { kind },
    ));
    debug!(%house_id, ?kind, "research breakthrough");
}

#[cfg(test)]
mod tests {
    use super::*;
    use ec4x_types::TechTree;

    fn house() -> House {
        House::founding(
            HouseId::from_parts(0, 0),
            "Atreides".to_owned(),
            1000,
            TechTree::default(),
        )
    }

    #[test]
    fn allocation_converts_at_configured_rates() {
        let config = GameConfig::default();
        let mut house = house();
        let allocation = ResearchAllocation {
            erp_pp: 100,
            srp_pp: 55,
            trp_pp: [(TechField::Weapons, 45)].into_iter().collect(),
        };
        apply_allocation(&mut house, &config, &allocation);
        assert_eq!(house.research.erp, 10);
        assert_eq!(house.research.srp, 5);
        assert_eq!(house.research.trp.get(&TechField::Weapons), Some(&3));
        assert_eq!(house.research.window_spending(), 200);
    }

    #[test]
    fn discount_reduces_level_cost() {
        let config = GameConfig::default();
        let mut house = house();
        assert_eq!(level_cost(&config, &house, 2), 200);
        house.research.next_cost_discount = 20;
        assert_eq!(level_cost(&config, &house, 2), 160);
    }
}
