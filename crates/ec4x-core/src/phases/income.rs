//! Phase 2: Income.
//!
//! Every colony's gross output is computed from population, planet class,
//! resource rating, infrastructure, industry, the owner's EL, and
//! starbase bonuses; the tax rate and any blockade convert that to
//! collected PP. Collapsed houses collect nothing. The phase also records
//! this turn's tax rates into each house's rolling window and queues the
//! low-tax bonus or high-tax penalty for Maintenance to apply.

use ec4x_events::{EventPayload, GameEvent};
use ec4x_rules::{GameConfig, economy};
use ec4x_state::GameState;
use ec4x_types::HouseStatus;
use tracing::debug;

use crate::phases::TurnContext;

/// Run the Income phase.
pub fn run(
    state: &mut GameState,
    config: &GameConfig,
    ctx: &mut TurnContext,
    events: &mut Vec<GameEvent>,
) {
    let turn = state.turn;

    for house_id in state.house_ids() {
        let collapsed = state
            .houses
            .get(house_id)
            .is_none_or(|house| house.status == HouseStatus::DefensiveCollapse);

        let mut house_income: i64 = 0;
        let mut rate_sum: u32 = 0;
        let mut colony_count: u32 = 0;

        for colony_id in state.colonies_of(house_id) {
            let income = economy::colony_income(state, config, colony_id);
            let system = state.colonies.get(colony_id).map(|c| c.system);
            rate_sum += state
                .colonies
                .get(colony_id)
                .map_or(0, |c| u32::from(c.tax_rate));
            colony_count += 1;

            // Collapsed houses still see the report but collect nothing.
            let collected = if collapsed { 0 } else { income.collected };
            house_income = house_income.saturating_add(collected);

            let mut event = GameEvent::for_house(
                turn,
                house_id,
                EventPayload::ColonyIncomeReport {
                    colony: colony_id,
                    gross: income.gross,
                    collected,
                    blockaded: income.blockaded,
                },
            );
            if let Some(system) = system {
                event = event.at(system);
            }
            events.push(event);
        }

        if let Some(house) = state.houses.get_mut(house_id) {
            house.treasury = house.treasury.saturating_add(house_income);
            // The rolling tax window tracks the mean colony rate.
            if colony_count > 0 {
                house.tax.current_rate = u8::try_from(rate_sum / colony_count).unwrap_or(100);
            }
            house.tax.record_turn();
            let rolling = house.tax.rolling_average();
            let delta = economy::tax_prestige_delta(config, rolling);
            if delta != 0 && !collapsed {
                let reason = if delta > 0 { "low taxes" } else { "high taxes" };
                ctx.queue_prestige(house_id, delta, reason);
            }
        }

        debug!(house = %house_id, income = house_income, "income collected");
    }
}
