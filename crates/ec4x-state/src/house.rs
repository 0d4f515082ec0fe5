//! Houses: the player factions.

use std::collections::VecDeque;

use ec4x_types::{HouseId, HouseStatus, TechField, TechTree};
use serde::{Deserialize, Serialize};

/// Number of turns of tax history kept for the rolling average.
pub const TAX_WINDOW: usize = 6;

/// Number of turns of research spending kept for breakthrough odds.
pub const RESEARCH_WINDOW: usize = 6;

/// A house's espionage budget.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EspionageBudget {
    /// Espionage budget points on hand.
    pub ebp: u32,
    /// Counter-intelligence points on hand.
    pub cip: u32,
    /// Points bought this turn (for the over-investment penalty).
    pub bought_this_turn: u32,
    /// Cumulative PP ever invested in espionage.
    pub cumulative_invested: i64,
}

/// A house's tax policy: the current rate and a rolling window of recent
/// rates used for prestige bonuses and penalties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxPolicy {
    /// The house-wide default tax rate percent.
    pub current_rate: u8,
    /// The last [`TAX_WINDOW`] rates, oldest first.
    pub recent_rates: VecDeque<u8>,
}

impl TaxPolicy {
    /// A policy starting at the given rate with a full window of it.
    #[must_use]
    pub fn starting_at(rate: u8) -> Self {
        Self {
            current_rate: rate,
            recent_rates: std::iter::repeat_n(rate, TAX_WINDOW).collect(),
        }
    }

    /// Push this turn's rate into the window, evicting the oldest.
    pub fn record_turn(&mut self) {
        self.recent_rates.push_back(self.current_rate);
        while self.recent_rates.len() > TAX_WINDOW {
            self.recent_rates.pop_front();
        }
    }

    /// Rolling average rate over the window, in percent.
    #[must_use]
    pub fn rolling_average(&self) -> u32 {
        if self.recent_rates.is_empty() {
            return u32::from(self.current_rate);
        }
        let sum: u32 = self.recent_rates.iter().map(|r| u32::from(*r)).sum();
        sum / u32::try_from(self.recent_rates.len()).unwrap_or(1)
    }
}

impl Default for TaxPolicy {
    fn default() -> Self {
        Self::starting_at(50)
    }
}

/// A house's accumulated research stock.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchStock {
    /// Economic research points.
    pub erp: i64,
    /// Science research points.
    pub srp: i64,
    /// Technology research points, per field.
    pub trp: std::collections::BTreeMap<TechField, i64>,
    /// PP spent on research in each of the last [`RESEARCH_WINDOW`] turns,
    /// oldest first.
    pub recent_spending: VecDeque<i64>,
    /// Percent discount on the next level cost, from a Moderate
    /// breakthrough.
    pub next_cost_discount: u8,
    /// Count of Revolutionary unique technologies unlocked.
    pub unique_techs: u32,
}

impl ResearchStock {
    /// Push this turn's research spending into the window.
    pub fn record_spending(&mut self, pp: i64) {
        self.recent_spending.push_back(pp);
        while self.recent_spending.len() > RESEARCH_WINDOW {
            self.recent_spending.pop_front();
        }
    }

    /// Total PP spent on research over the window.
    #[must_use]
    pub fn window_spending(&self) -> i64 {
        self.recent_spending.iter().copied().sum()
    }
}

/// A player faction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct House {
    /// The house's identity.
    pub id: HouseId,
    /// Display name.
    pub name: String,
    /// Treasury in PP. May go negative through maintenance shortfall.
    pub treasury: i64,
    /// Prestige total.
    pub prestige: i64,
    /// Current status. `DefensiveCollapse` is terminal.
    pub status: HouseStatus,
    /// Technology levels.
    pub tech: TechTree,
    /// Espionage budget.
    pub espionage: EspionageBudget,
    /// Tax policy and history.
    pub tax: TaxPolicy,
    /// Research point stock.
    pub research: ResearchStock,
    /// Consecutive turns without a submitted packet.
    pub turns_without_orders: u8,
    /// Consecutive turns ending with negative prestige.
    pub negative_prestige_turns: u8,
    /// Consecutive turns of maintenance shortfall.
    pub consecutive_shortfall_turns: u8,
    /// Planet breakers ever commissioned, for prestige accounting.
    pub planet_breakers_built: u32,
}

impl House {
    /// A fresh house at game start.
    #[must_use]
    pub fn founding(id: HouseId, name: String, treasury: i64, tech: TechTree) -> Self {
        Self {
            id,
            name,
            treasury,
            prestige: 0,
            status: HouseStatus::Active,
            tech,
            espionage: EspionageBudget::default(),
            tax: TaxPolicy::default(),
            research: ResearchStock::default(),
            turns_without_orders: 0,
            negative_prestige_turns: 0,
            consecutive_shortfall_turns: 0,
            planet_breakers_built: 0,
        }
    }

    /// Whether the house is out of the game for victory purposes.
    #[must_use]
    pub const fn is_collapsed(&self) -> bool {
        matches!(self.status, HouseStatus::DefensiveCollapse)
    }

    /// Enter defensive collapse. Terminal: once set it is never cleared.
    pub const fn collapse(&mut self) {
        self.status = HouseStatus::DefensiveCollapse;
    }

    /// React to a received packet: an Autopilot house wakes back up.
    pub const fn on_packet_received(&mut self) {
        self.turns_without_orders = 0;
        if matches!(self.status, HouseStatus::Autopilot) {
            self.status = HouseStatus::Active;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn house() -> House {
        House::founding(
            HouseId::from_parts(0, 0),
            "Atreides".to_owned(),
            1000,
            TechTree::default(),
        )
    }

    #[test]
    fn tax_window_is_bounded() {
        let mut tax = TaxPolicy::starting_at(40);
        tax.current_rate = 60;
        for _ in 0..10 {
            tax.record_turn();
        }
        assert_eq!(tax.recent_rates.len(), TAX_WINDOW);
        assert_eq!(tax.rolling_average(), 60);
    }

    #[test]
    fn collapse_is_not_undone_by_packets() {
        let mut house = house();
        house.collapse();
        house.on_packet_received();
        assert!(house.is_collapsed());
    }

    #[test]
    fn autopilot_wakes_on_packet() {
        let mut house = house();
        house.status = HouseStatus::Autopilot;
        house.turns_without_orders = 4;
        house.on_packet_received();
        assert_eq!(house.status, HouseStatus::Active);
        assert_eq!(house.turns_without_orders, 0);
    }
}
