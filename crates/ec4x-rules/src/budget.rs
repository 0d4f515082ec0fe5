//! The budget gate: running-treasury accounting over validated commands.
//!
//! After structural validation, surviving commands pass through the gate
//! in a fixed order: maintenance reservation, build commands (FIFO within
//! the packet), research allocation, espionage investment, population
//! transfers, terraform starts. Each item either deducts its cost from the
//! running remainder or dies with `InsufficientFunds`; research is the one
//! section that reduces instead of dying. The gate emits a [`CostSummary`]
//! the client uses for pre-submit previews.

use ec4x_state::GameState;
use ec4x_types::{
    BuildCommand, BuildItem, ColonyId, CommandRejection, CommandSection, FacilityKind, HouseId,
    RejectionReason, ShipClass, TechField,
};
use tracing::debug;

use crate::config::GameConfig;
use crate::economy;
use crate::validation::{AcceptedCommands, ValidationOutcome};

/// Warn when committed spending exceeds this share of the free treasury.
const COMMITMENT_WARNING_PERCENT: i64 = 90;

/// The budget gate's report for one packet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CostSummary {
    /// PP committed to builds.
    pub build: i64,
    /// PP committed to research.
    pub research: i64,
    /// PP committed to espionage points.
    pub espionage: i64,
    /// PP committed to transfers and terraforming.
    pub civil: i64,
    /// PP reserved for this turn's projected maintenance.
    pub maintenance_reserved: i64,
    /// Total committed, excluding the reservation.
    pub total: i64,
    /// Whether everything requested fit the treasury.
    pub can_afford: bool,
    /// Human-readable warnings (heavy commitment, reduced research).
    pub warnings: Vec<String>,
    /// Human-readable errors, mirroring the budget rejections.
    pub errors: Vec<String>,
}

impl CostSummary {
    /// A summary for a packet that produced nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            can_afford: true,
            ..Self::default()
        }
    }
}

/// Run the budget gate over structurally valid commands.
#[must_use]
pub fn apply_gate(
    state: &GameState,
    config: &GameConfig,
    house: HouseId,
    structural: AcceptedCommands,
    mut rejections: Vec<CommandRejection>,
) -> ValidationOutcome {
    let treasury = state.houses.get(house).map_or(0, |h| h.treasury);
    let maintenance_reserved = economy::projected_maintenance(state, config, house);
    let mut remaining = treasury.saturating_sub(maintenance_reserved);

    let mut summary = CostSummary {
        maintenance_reserved,
        can_afford: true,
        ..CostSummary::default()
    };
    let mut accepted = AcceptedCommands {
        colony_management: structural.colony_management,
        standing: structural.standing,
        fleet: structural.fleet,
        espionage: structural.espionage,
        ..AcceptedCommands::default()
    };

    // 1. Build commands, FIFO within the packet.
    for (index, command) in structural.builds.into_iter().enumerate() {
        let cost = build_cost(state, config, command.colony, command.item, command.quantity);
        if remaining >= cost {
            remaining -= cost;
            summary.build = summary.build.saturating_add(cost);
            accepted.builds.push(command);
        } else {
            let detail =
                format!("build needs {cost} PP, {remaining} PP remain after reservations");
            summary.can_afford = false;
            summary.errors.push(detail.clone());
            rejections.push(CommandRejection {
                house,
                section: CommandSection::Build,
                command_index: index,
                reason: RejectionReason::InsufficientFunds,
                detail,
            });
        }
    }

    // 2. Research allocation: reduced, never rejected.
    let requested_research = structural.research.total_pp();
    let mut research = structural.research;
    if requested_research > remaining {
        reduce_research(&mut research, remaining);
        summary.warnings.push(format!(
            "research reduced from {requested_research} to {} PP",
            research.total_pp()
        ));
    }
    let research_pp = research.total_pp();
    remaining = remaining.saturating_sub(research_pp);
    summary.research = research_pp;
    accepted.research = research;

    // 3. Espionage investment, one point at a time, EBP before CIP.
    let point_cost = config.espionage.pp_per_point;
    let affordable_points = u32::try_from((remaining / point_cost.max(1)).max(0)).unwrap_or(0);
    let requested_points = structural
        .ebp_investment
        .saturating_add(structural.cip_investment);
    let granted_points = requested_points.min(affordable_points);
    accepted.ebp_investment = granted_points.min(structural.ebp_investment);
    accepted.cip_investment = granted_points.saturating_sub(accepted.ebp_investment);
    let espionage_pp = i64::from(granted_points).saturating_mul(point_cost);
    remaining = remaining.saturating_sub(espionage_pp);
    summary.espionage = espionage_pp;
    if granted_points < requested_points {
        let detail = format!(
            "espionage investment reduced to {granted_points} of {requested_points} points"
        );
        summary.can_afford = false;
        summary.errors.push(detail.clone());
        rejections.push(CommandRejection {
            house,
            section: CommandSection::Espionage,
            command_index: 0,
            reason: RejectionReason::InsufficientFunds,
            detail,
        });
    }

    // 4. Population transfers, FIFO.
    for (index, command) in structural.transfers.into_iter().enumerate() {
        let cost = transfer_cost(state, config, command.source, command.destination, command.ptu);
        if remaining >= cost {
            remaining -= cost;
            summary.civil = summary.civil.saturating_add(cost);
            accepted.transfers.push(command);
        } else {
            let detail = format!("transfer needs {cost} PP, {remaining} PP remain");
            summary.can_afford = false;
            summary.errors.push(detail.clone());
            rejections.push(CommandRejection {
                house,
                section: CommandSection::Transfer,
                command_index: index,
                reason: RejectionReason::InsufficientFunds,
                detail,
            });
        }
    }

    // 5. Terraform starts, FIFO.
    for (index, command) in structural.terraform.into_iter().enumerate() {
        let cost = terraform_cost(state, config, command.colony);
        if remaining >= cost {
            remaining -= cost;
            summary.civil = summary.civil.saturating_add(cost);
            accepted.terraform.push(command);
        } else {
            let detail = format!("terraforming needs {cost} PP, {remaining} PP remain");
            summary.can_afford = false;
            summary.errors.push(detail.clone());
            rejections.push(CommandRejection {
                house,
                section: CommandSection::Terraform,
                command_index: index,
                reason: RejectionReason::InsufficientFunds,
                detail,
            });
        }
    }

    summary.total = summary
        .build
        .saturating_add(summary.research)
        .saturating_add(summary.espionage)
        .saturating_add(summary.civil);

    let free = treasury.saturating_sub(maintenance_reserved).max(0);
    if free > 0 && summary.total.saturating_mul(100) > free.saturating_mul(COMMITMENT_WARNING_PERCENT)
    {
        summary
            .warnings
            .push(format!("{} of {free} free PP committed", summary.total));
    }

    debug!(
        %house,
        total = summary.total,
        reserved = maintenance_reserved,
        remaining,
        "budget gate applied"
    );

    ValidationOutcome {
        accepted,
        rejections,
        cost_summary: summary,
    }
}

// ---------------------------------------------------------------------------
// Cost computation
// ---------------------------------------------------------------------------

/// PP cost of one build command.
///
/// Ships built planet-side (no uncrippled shipyard at the colony) cost
/// double, except Fighters which never incur the penalty.
#[must_use]
pub fn build_cost(
    state: &GameState,
    config: &GameConfig,
    colony: ColonyId,
    item: BuildItem,
    quantity: u32,
) -> i64 {
    let quantity = i64::from(quantity.max(1));
    match item {
        BuildItem::Ship(class) => {
            let base = config.ships.row(class).cost.saturating_mul(quantity);
            if class != ShipClass::Fighter && !colony_has_working_shipyard(state, colony) {
                base.saturating_mul(2)
            } else {
                base
            }
        }
        BuildItem::Facility(FacilityKind::Neoria(class)) => config.facilities.neoria_cost(class),
        BuildItem::Facility(FacilityKind::Kastra) => config.facilities.kastra_cost,
        BuildItem::Ground(class) => config.ground.row(class).cost.saturating_mul(quantity),
        BuildItem::IndustrialUnits => {
            let iu = state
                .colonies
                .get(colony)
                .map_or(0, |c| i64::from(c.industrial_units));
            (iu / 10 + 1).saturating_mul(config.economy.iu_cost_base)
        }
    }
}

/// Whether a colony has an uncrippled shipyard to build in orbit.
#[must_use]
pub fn colony_has_working_shipyard(state: &GameState, colony: ColonyId) -> bool {
    state.colonies.get(colony).is_some_and(|c| {
        c.neorias.iter().any(|id| {
            state.neorias.get(*id).is_some_and(|n| {
                n.class == ec4x_types::NeoriaClass::Shipyard && n.can_construct()
            })
        })
    })
}

/// PP cost of lifting `ptu` between two colonies.
///
/// The per-PTU base is the average of the source and destination planet
/// classes, with a surcharge per jump beyond the first.
#[must_use]
pub fn transfer_cost(
    state: &GameState,
    config: &GameConfig,
    source: ColonyId,
    destination: ColonyId,
    ptu: u32,
) -> i64 {
    let class_of = |colony: ColonyId| {
        state
            .colonies
            .get(colony)
            .and_then(|c| state.map.system(c.system))
            .map_or(ec4x_types::PlanetClass::Benign, |s| s.planet_class)
    };
    let base_source = config.transfers.base_for(class_of(source));
    let base_dest = config.transfers.base_for(class_of(destination));
    let base = (base_source.saturating_add(base_dest)) / 2;
    let jumps = transfer_jumps(state, source, destination).max(1);
    let surcharge_jumps = i64::from(jumps.saturating_sub(1));
    let multiplier = 100_i64.saturating_add(
        config
            .transfers
            .per_jump_surcharge_percent
            .saturating_mul(surcharge_jumps),
    );
    base.saturating_mul(i64::from(ptu))
        .saturating_mul(multiplier)
        / 100
}

/// Jump count between two colonies over line-fleet lanes.
#[must_use]
pub fn transfer_jumps(state: &GameState, source: ColonyId, destination: ColonyId) -> u32 {
    let system_of = |colony: ColonyId| state.colonies.get(colony).map(|c| c.system);
    let (Some(from), Some(to)) = (system_of(source), system_of(destination)) else {
        return 1;
    };
    state
        .map
        .jump_distance(from, to, ec4x_map::FleetProfile::LINE)
        .unwrap_or(1)
}

/// PP cost of starting a terraform project at a colony.
#[must_use]
pub fn terraform_cost(state: &GameState, config: &GameConfig, colony: ColonyId) -> i64 {
    let target = state
        .colonies
        .get(colony)
        .and_then(|c| state.map.system(c.system))
        .and_then(|s| s.planet_class.improved());
    target.map_or(0, |t| config.terraform.cost_for(t))
}

/// Reduce a research allocation to fit a budget: per-field TRP dies first
/// (highest field last in declaration order goes first), then SRP, then
/// ERP.
fn reduce_research(research: &mut ec4x_types::ResearchAllocation, budget: i64) {
    let budget = budget.max(0);
    let mut over = research.total_pp().saturating_sub(budget);
    if over <= 0 {
        return;
    }
    let fields: Vec<TechField> = research.trp_pp.keys().rev().copied().collect();
    for field in fields {
        if over <= 0 {
            break;
        }
        if let Some(pp) = research.trp_pp.get_mut(&field) {
            let cut = (*pp).min(over);
            *pp -= cut;
            over -= cut;
            if *pp == 0 {
                research.trp_pp.remove(&field);
            }
        }
    }
    if over > 0 {
        let cut = research.srp_pp.min(over);
        research.srp_pp -= cut;
        over -= cut;
    }
    if over > 0 {
        let cut = research.erp_pp.min(over);
        research.erp_pp -= cut;
    }
}

/// Turns a construction project of this item takes.
#[must_use]
pub fn build_turns(config: &GameConfig, item: BuildItem) -> u32 {
    match item {
        BuildItem::Ship(class) => {
            let cost = config.ships.row(class).cost;
            let rate = config.economy.ship_build_rate.max(1);
            let turns = cost.saturating_add(rate.saturating_sub(1)) / rate;
            u32::try_from(turns).unwrap_or(1).max(1)
        }
        BuildItem::Facility(_) => config.economy.facility_build_turns.max(1),
        BuildItem::Ground(_) => config.economy.ground_build_turns.max(1),
        BuildItem::IndustrialUnits => config.economy.iu_build_turns.max(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::AcceptedCommands;
    use ec4x_map::{MapShape, generate_map};
    use ec4x_types::{GameId, SystemId, TechTree};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn state_with_house(treasury: i64) -> (GameState, HouseId, ColonyId) {
        let mut rng = ChaCha8Rng::seed_from_u64(21);
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
        let house = state.add_house("Atreides".to_owned(), treasury, TechTree::uniform(9));
        let system = state
            .map
            .systems()
            .next()
            .map(|s| s.id)
            .unwrap_or(SystemId::from_parts(0, 0));
        let colony = state
            .found_colony(house, system, 50)
            .unwrap_or(ColonyId::from_parts(0, 0));
        (state, house, colony)
    }

    #[test]
    fn planet_side_ships_cost_double() {
        let (state, _, colony) = state_with_house(1000);
        let config = GameConfig::default();
        let cost = build_cost(
            &state,
            &config,
            colony,
            BuildItem::Ship(ShipClass::Cruiser),
            1,
        );
        assert_eq!(cost, 240);
        let fighters = build_cost(
            &state,
            &config,
            colony,
            BuildItem::Ship(ShipClass::Fighter),
            2,
        );
        assert_eq!(fighters, 20);
    }

    #[test]
    fn gate_accepts_an_affordable_build() {
        let (state, house, colony) = state_with_house(300);
        let config = GameConfig::default();
        let structural = AcceptedCommands {
            builds: vec![
                BuildCommand {
                    colony,
                    item: BuildItem::IndustrialUnits,
                    quantity: 1,
                },
            ],
            ..AcceptedCommands::default()
        };
        let outcome = apply_gate(&state, &config, house, structural, Vec::new());
        // IU step costs 20; no maintenance yet (no assets), so it passes.
        assert_eq!(outcome.cost_summary.build, 20);
        assert!(outcome.cost_summary.can_afford);
        assert!(outcome.rejections.is_empty());
    }

    #[test]
    fn research_reduces_instead_of_dying() {
        let (state, house, _) = state_with_house(50);
        let config = GameConfig::default();
        let structural = AcceptedCommands {
            research: ec4x_types::ResearchAllocation {
                erp_pp: 40,
                srp_pp: 40,
                trp_pp: std::collections::BTreeMap::new(),
            },
            ..AcceptedCommands::default()
        };
        let outcome = apply_gate(&state, &config, house, structural, Vec::new());
        assert_eq!(outcome.accepted.research.total_pp(), 50);
        assert_eq!(outcome.accepted.research.erp_pp, 40);
        assert_eq!(outcome.accepted.research.srp_pp, 10);
        assert!(!outcome.cost_summary.warnings.is_empty());
    }

    #[test]
    fn espionage_points_grant_partially() {
        let (state, house, _) = state_with_house(100);
        let config = GameConfig::default();
        let structural = AcceptedCommands {
            ebp_investment: 2,
            cip_investment: 1,
            ..AcceptedCommands::default()
        };
        let outcome = apply_gate(&state, &config, house, structural, Vec::new());
        // 100 PP buys 2 of the 3 requested 40-PP points.
        assert_eq!(outcome.accepted.ebp_investment, 2);
        assert_eq!(outcome.accepted.cip_investment, 0);
        assert_eq!(outcome.cost_summary.espionage, 80);
        assert_eq!(outcome.rejections.len(), 1);
    }
}
