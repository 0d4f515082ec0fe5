//! Balance configuration: the numeric tables every rule reads.
//!
//! The engine never reads files; callers build a [`GameConfig`] (usually
//! [`GameConfig::default`]) and pass it by reference into validation and
//! resolution. All tables are fixed arrays indexed by their enum, and all
//! defaults are plain data, so two processes with the same config resolve
//! identically.

use ec4x_types::{GroundClass, NeoriaClass, PlanetClass, ResourceRating, ShipClass};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Ships
// ---------------------------------------------------------------------------

/// Static stats for one ship class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipRow {
    /// Build cost in PP.
    pub cost: i64,
    /// Attack strength.
    pub attack: u32,
    /// Defense strength.
    pub defense: u32,
    /// Command cost against the squadron capacity.
    pub command_cost: u32,
    /// Cargo capacity (PTU for expansion hulls, marines for transports,
    /// fighters for carriers).
    pub cargo_capacity: u32,
    /// Minimum CST level to lay the hull down.
    pub required_cst: u8,
    /// Upkeep per turn in PP.
    pub upkeep: i64,
}

/// Per-class ship stats, indexed by [`ShipClass::table_index`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipTable {
    /// The rows, one per class in [`ShipClass::ALL`] order.
    pub rows: [ShipRow; 18],
}

impl ShipTable {
    /// The stats row for a class.
    #[must_use]
    pub const fn row(&self, class: ShipClass) -> ShipRow {
        self.rows[class.table_index()]
    }
}

const fn ship_row(
    cost: i64,
    attack: u32,
    defense: u32,
    command_cost: u32,
    cargo_capacity: u32,
    required_cst: u8,
    upkeep: i64,
) -> ShipRow {
    ShipRow {
        cost,
        attack,
        defense,
        command_cost,
        cargo_capacity,
        required_cst,
        upkeep,
    }
}

impl Default for ShipTable {
    fn default() -> Self {
        Self {
            rows: [
                // Fighter
                ship_row(10, 2, 1, 0, 0, 1, 1),
                // Corvette (in the tables, out of the balance)
                ship_row(25, 2, 2, 1, 0, 1, 1),
                // Frigate
                ship_row(40, 3, 3, 1, 0, 1, 2),
                // Scout
                ship_row(30, 1, 2, 0, 0, 1, 1),
                // Raider
                ship_row(60, 4, 3, 1, 2, 2, 2),
                // Destroyer
                ship_row(80, 5, 4, 2, 0, 2, 3),
                // Cruiser
                ship_row(120, 7, 6, 2, 0, 3, 4),
                // LightCruiser
                ship_row(100, 6, 5, 2, 0, 3, 4),
                // HeavyCruiser
                ship_row(150, 8, 7, 3, 0, 4, 5),
                // Battlecruiser
                ship_row(200, 10, 8, 3, 0, 5, 6),
                // Battleship
                ship_row(280, 12, 11, 4, 0, 6, 8),
                // Dreadnought
                ship_row(360, 15, 14, 5, 0, 7, 10),
                // SuperDreadnought
                ship_row(450, 18, 17, 6, 0, 8, 12),
                // Carrier
                ship_row(220, 4, 8, 4, 6, 5, 7),
                // SuperCarrier
                ship_row(320, 5, 10, 5, 10, 7, 9),
                // Etac
                ship_row(100, 0, 2, 1, 30, 1, 2),
                // TroopTransport
                ship_row(90, 0, 3, 1, 20, 2, 2),
                // PlanetBreaker
                ship_row(600, 25, 10, 8, 0, 9, 15),
            ],
        }
    }
}

// ---------------------------------------------------------------------------
// Facilities
// ---------------------------------------------------------------------------

/// Costs and gates for facilities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacilityConfig {
    /// Spaceport build cost.
    pub spaceport_cost: i64,
    /// Shipyard build cost.
    pub shipyard_cost: i64,
    /// Drydock build cost.
    pub drydock_cost: i64,
    /// Kastra (starbase) build cost.
    pub kastra_cost: i64,
    /// CST required for a spaceport.
    pub spaceport_cst: u8,
    /// CST required for a shipyard.
    pub shipyard_cst: u8,
    /// CST required for a drydock.
    pub drydock_cst: u8,
    /// CST required for a kastra.
    pub kastra_cst: u8,
    /// Kastra attack strength at construction.
    pub kastra_attack: u32,
    /// Kastra defense strength at construction.
    pub kastra_defense: u32,
    /// Upkeep per turn: spaceport.
    pub spaceport_upkeep: i64,
    /// Upkeep per turn: shipyard.
    pub shipyard_upkeep: i64,
    /// Upkeep per turn: drydock.
    pub drydock_upkeep: i64,
    /// Upkeep per turn: kastra.
    pub kastra_upkeep: i64,
    /// Effective-dock multiplier percent per CST level, levels 1-10.
    pub cst_dock_multiplier: [u32; 10],
}

impl FacilityConfig {
    /// Build cost of a neoria subclass.
    #[must_use]
    pub const fn neoria_cost(&self, class: NeoriaClass) -> i64 {
        match class {
            NeoriaClass::Spaceport => self.spaceport_cost,
            NeoriaClass::Shipyard => self.shipyard_cost,
            NeoriaClass::Drydock => self.drydock_cost,
        }
    }

    /// CST gate of a neoria subclass.
    #[must_use]
    pub const fn neoria_cst(&self, class: NeoriaClass) -> u8 {
        match class {
            NeoriaClass::Spaceport => self.spaceport_cst,
            NeoriaClass::Shipyard => self.shipyard_cst,
            NeoriaClass::Drydock => self.drydock_cst,
        }
    }

    /// Upkeep of a neoria subclass.
    #[must_use]
    pub const fn neoria_upkeep(&self, class: NeoriaClass) -> i64 {
        match class {
            NeoriaClass::Spaceport => self.spaceport_upkeep,
            NeoriaClass::Shipyard => self.shipyard_upkeep,
            NeoriaClass::Drydock => self.drydock_upkeep,
        }
    }

    /// Effective docks for a base dock count at a CST level.
    #[must_use]
    pub fn effective_docks(&self, base_docks: u32, cst_level: u8) -> u32 {
        let index = usize::from(cst_level.clamp(1, 10)) - 1;
        let percent = self.cst_dock_multiplier.get(index).copied().unwrap_or(100);
        base_docks.saturating_mul(percent) / 100
    }
}

impl Default for FacilityConfig {
    fn default() -> Self {
        Self {
            spaceport_cost: 150,
            shipyard_cost: 250,
            drydock_cost: 180,
            kastra_cost: 300,
            spaceport_cst: 1,
            shipyard_cst: 3,
            drydock_cst: 2,
            kastra_cst: 4,
            kastra_attack: 15,
            kastra_defense: 20,
            spaceport_upkeep: 3,
            shipyard_upkeep: 5,
            drydock_upkeep: 3,
            kastra_upkeep: 8,
            cst_dock_multiplier: [100, 110, 120, 130, 140, 150, 160, 170, 180, 190],
        }
    }
}

// ---------------------------------------------------------------------------
// Ground units
// ---------------------------------------------------------------------------

/// Static stats for one ground class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundRow {
    /// Build cost in PP.
    pub cost: i64,
    /// Attack strength.
    pub attack: u32,
    /// Defense strength.
    pub defense: u32,
    /// Upkeep per turn in PP.
    pub upkeep: i64,
}

/// Per-class ground stats, indexed by [`GroundClass::table_index`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundTable {
    /// The rows, one per class in [`GroundClass::ALL`] order.
    pub rows: [GroundRow; 4],
}

impl GroundTable {
    /// The stats row for a class.
    #[must_use]
    pub const fn row(&self, class: GroundClass) -> GroundRow {
        self.rows[class.table_index()]
    }
}

impl Default for GroundTable {
    fn default() -> Self {
        Self {
            rows: [
                // Army
                GroundRow {
                    cost: 30,
                    attack: 3,
                    defense: 4,
                    upkeep: 1,
                },
                // Marine
                GroundRow {
                    cost: 40,
                    attack: 5,
                    defense: 3,
                    upkeep: 1,
                },
                // GroundBattery
                GroundRow {
                    cost: 80,
                    attack: 8,
                    defense: 6,
                    upkeep: 2,
                },
                // PlanetaryShield
                GroundRow {
                    cost: 200,
                    attack: 0,
                    defense: 10,
                    upkeep: 4,
                },
            ],
        }
    }
}

// ---------------------------------------------------------------------------
// Economy
// ---------------------------------------------------------------------------

/// Income, growth, and construction economics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EconomyConfig {
    /// Base PP output per PU before modifiers.
    pub base_pp_per_pu: i64,
    /// Output percent per planet class, [`PlanetClass::ALL`] order.
    pub planet_percent: [i64; 7],
    /// Output percent per resource rating, [`ResourceRating::ALL`] order.
    pub resource_percent: [i64; 5],
    /// Output percent added per infrastructure level above 1.
    pub infrastructure_percent_step: i64,
    /// Output percent added per industrial unit.
    pub iu_percent_step: i64,
    /// Output percent added per EL level above 1.
    pub el_percent_step: i64,
    /// Output percent added per undamaged starbase at the colony.
    pub starbase_bonus_percent: i64,
    /// Percent of income lost under blockade.
    pub blockade_penalty_percent: i64,
    /// Natural growth: PTU per turn is `pu * rate / 100`, minimum 1.
    pub growth_rate_percent: u32,
    /// Base cost of one industrial-unit step.
    pub iu_cost_base: i64,
    /// Rolling tax average at or below this earns the low-tax prestige
    /// bonus.
    pub low_tax_threshold: u32,
    /// Prestige gained per turn of low taxes.
    pub low_tax_prestige_bonus: i64,
    /// Rolling tax average at or above this draws the high-tax penalty.
    pub high_tax_threshold: u32,
    /// Prestige lost per turn of high taxes.
    pub high_tax_prestige_penalty: i64,
    /// Fraction of upkeep paid by reserve fleets, percent.
    pub reserve_upkeep_percent: i64,
    /// Fraction of upkeep paid by mothballed fleets, percent.
    pub mothball_upkeep_percent: i64,
    /// Build turns for a ship: `max(1, ceil(cost / this))`.
    pub ship_build_rate: i64,
    /// Build turns for facilities.
    pub facility_build_turns: u32,
    /// Build turns for an IU step.
    pub iu_build_turns: u32,
    /// Build turns for ground units.
    pub ground_build_turns: u32,
    /// Repair cost as a percent of build cost.
    pub repair_cost_percent: i64,
    /// Turns a repair project takes.
    pub repair_turns: u32,
}

impl EconomyConfig {
    /// Output percent for a planet class.
    #[must_use]
    pub const fn planet_factor(&self, class: PlanetClass) -> i64 {
        self.planet_percent[class.steps_from_eden() as usize]
    }

    /// Output percent for a resource rating.
    #[must_use]
    pub fn resource_factor(&self, rating: ResourceRating) -> i64 {
        let index = ResourceRating::ALL
            .iter()
            .position(|r| *r == rating)
            .unwrap_or(2);
        self.resource_percent.get(index).copied().unwrap_or(100)
    }
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            base_pp_per_pu: 10,
            // Eden, Lush, Benign, Harsh, Hostile, Desolate, Extreme
            planet_percent: [150, 125, 100, 75, 50, 30, 15],
            // VeryPoor, Poor, Abundant, Rich, VeryRich
            resource_percent: [50, 75, 100, 125, 150],
            infrastructure_percent_step: 5,
            iu_percent_step: 2,
            el_percent_step: 10,
            starbase_bonus_percent: 10,
            blockade_penalty_percent: 75,
            growth_rate_percent: 5,
            iu_cost_base: 20,
            low_tax_threshold: 30,
            low_tax_prestige_bonus: 2,
            high_tax_threshold: 70,
            high_tax_prestige_penalty: 2,
            reserve_upkeep_percent: 50,
            mothball_upkeep_percent: 25,
            ship_build_rate: 120,
            facility_build_turns: 4,
            iu_build_turns: 2,
            ground_build_turns: 1,
            repair_cost_percent: 40,
            repair_turns: 2,
        }
    }
}

// ---------------------------------------------------------------------------
// Research
// ---------------------------------------------------------------------------

/// Research point conversion and breakthrough odds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchConfig {
    /// PP per economic research point.
    pub pp_per_erp: i64,
    /// PP per science research point.
    pub pp_per_srp: i64,
    /// PP per technology research point.
    pub pp_per_trp: i64,
    /// Points to buy a level: `level * this`.
    pub level_cost_per_level: i64,
    /// Base breakthrough chance percent on an upgrade turn.
    pub breakthrough_base_percent: u32,
    /// Extra percent per this many RP invested over the window.
    pub breakthrough_rp_step: i64,
    /// Minor breakthrough windfall in RP.
    pub minor_windfall_rp: i64,
    /// Moderate breakthrough discount percent on the next level.
    pub moderate_discount_percent: u8,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            pp_per_erp: 10,
            pp_per_srp: 10,
            pp_per_trp: 15,
            level_cost_per_level: 100,
            breakthrough_base_percent: 10,
            breakthrough_rp_step: 50,
            minor_windfall_rp: 10,
            moderate_discount_percent: 20,
        }
    }
}

// ---------------------------------------------------------------------------
// Espionage
// ---------------------------------------------------------------------------

/// Espionage costs, detection, and effect windows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EspionageConfig {
    /// PP per EBP or CIP point.
    pub pp_per_point: i64,
    /// EBP cost per action kind, in `EspionageActionKind` declaration
    /// order.
    pub action_cost: [u32; 9],
    /// Turns an ongoing effect lasts.
    pub effect_duration: u32,
    /// Detection base chance percent.
    pub detection_base_percent: i64,
    /// Detection percent per defender CIC level.
    pub detection_per_cic: i64,
    /// Detection percent per defender CIP point.
    pub detection_per_cip: i64,
    /// Detection percent subtracted per attacker CLK level.
    pub detection_per_clk: i64,
    /// Points per turn buyable without the over-investment penalty.
    pub invest_limit_per_turn: u32,
    /// Prestige penalty for over-investing.
    pub over_invest_penalty: i64,
    /// Effect magnitude percent for reduction-type effects.
    pub reduction_magnitude_percent: i64,
    /// SRP stolen by a successful tech theft.
    pub tech_theft_srp: i64,
    /// IU destroyed by a successful sabotage.
    pub sabotage_iu: u32,
}

impl Default for EspionageConfig {
    fn default() -> Self {
        Self {
            pp_per_point: 40,
            // TechTheft, Sabotage, Assassination, CyberAttack,
            // IntelligenceTheft, Disinformation, EconomicManipulation,
            // PsyOps, CounterIntelSweep
            action_cost: [3, 2, 4, 3, 2, 2, 3, 2, 1],
            effect_duration: 3,
            detection_base_percent: 25,
            detection_per_cic: 8,
            detection_per_cip: 2,
            detection_per_clk: 5,
            invest_limit_per_turn: 5,
            over_invest_penalty: 2,
            reduction_magnitude_percent: 25,
            tech_theft_srp: 30,
            sabotage_iu: 2,
        }
    }
}

// ---------------------------------------------------------------------------
// Combat
// ---------------------------------------------------------------------------

/// One CER row: the d10+DRM thresholds for a ratio bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CerRow {
    /// Rolls at or above this cripple the target.
    pub cripple_at: i32,
    /// Rolls at or above this destroy the target outright.
    pub destroy_at: i32,
}

/// Combat resolution tables and modifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatConfig {
    /// Space/orbital CER, one row per attack:defense ratio bucket
    /// (1:4, 1:3, 1:2, 1:1, 2:1, 3:1, 4:1).
    pub space_cer: [CerRow; 7],
    /// Ground CER, same bucket layout.
    pub ground_cer: [CerRow; 7],
    /// Maximum rounds in the space and orbital theaters.
    pub max_space_rounds: u32,
    /// Maximum bombardment rounds in the planetary theater.
    pub max_bombardment_rounds: u32,
    /// Morale DRM per prestige tier, in `PrestigeTier` order.
    pub morale_drm: [i32; 6],
    /// Attack percent added per WEP level above 1.
    pub wep_percent_step: i64,
    /// Shield block percent per SLD level, levels 1-10.
    pub shield_block_percent: [u32; 10],
    /// Fraction of a defeated colony's projects a blitz steals, percent.
    pub blitz_loot_percent: u32,
    /// Fleet strength ratio (percent) below which a fleet tries to
    /// retreat when its orders allow.
    pub retreat_threshold_percent: u32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            space_cer: [
                CerRow {
                    cripple_at: 9,
                    destroy_at: 12,
                },
                CerRow {
                    cripple_at: 8,
                    destroy_at: 11,
                },
                CerRow {
                    cripple_at: 7,
                    destroy_at: 10,
                },
                CerRow {
                    cripple_at: 6,
                    destroy_at: 9,
                },
                CerRow {
                    cripple_at: 5,
                    destroy_at: 8,
                },
                CerRow {
                    cripple_at: 4,
                    destroy_at: 7,
                },
                CerRow {
                    cripple_at: 3,
                    destroy_at: 6,
                },
            ],
            ground_cer: [
                CerRow {
                    cripple_at: 10,
                    destroy_at: 13,
                },
                CerRow {
                    cripple_at: 9,
                    destroy_at: 12,
                },
                CerRow {
                    cripple_at: 8,
                    destroy_at: 11,
                },
                CerRow {
                    cripple_at: 7,
                    destroy_at: 10,
                },
                CerRow {
                    cripple_at: 6,
                    destroy_at: 9,
                },
                CerRow {
                    cripple_at: 5,
                    destroy_at: 8,
                },
                CerRow {
                    cripple_at: 4,
                    destroy_at: 7,
                },
            ],
            max_space_rounds: 10,
            max_bombardment_rounds: 3,
            // Collapsing, VeryLow, Low, Normal, High, VeryHigh
            morale_drm: [-3, -2, -1, 0, 1, 2],
            wep_percent_step: 10,
            shield_block_percent: [20, 30, 40, 50, 60, 65, 70, 75, 80, 85],
            blitz_loot_percent: 50,
            retreat_threshold_percent: 33,
        }
    }
}

// ---------------------------------------------------------------------------
// Transfers and terraforming
// ---------------------------------------------------------------------------

/// Population transfer costs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferConfig {
    /// Base PP per PTU per planet class, [`PlanetClass::ALL`] order. The
    /// charged base is the average of the source and destination classes.
    pub class_base: [i64; 7],
    /// Percent surcharge per jump beyond the first.
    pub per_jump_surcharge_percent: i64,
}

impl TransferConfig {
    /// Base PP per PTU for a class.
    #[must_use]
    pub const fn base_for(&self, class: PlanetClass) -> i64 {
        self.class_base[class.steps_from_eden() as usize]
    }
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            // Eden, Lush, Benign, Harsh, Hostile, Desolate, Extreme
            class_base: [10, 12, 15, 20, 30, 40, 60],
            per_jump_surcharge_percent: 20,
        }
    }
}

/// Terraforming costs and gates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerraformConfig {
    /// PP cost by target class, [`PlanetClass::ALL`] order.
    pub cost_by_target: [i64; 7],
    /// Turns a terraform project takes.
    pub duration_turns: u32,
}

impl TerraformConfig {
    /// The PP cost to reach a target class.
    #[must_use]
    pub const fn cost_for(&self, target: PlanetClass) -> i64 {
        self.cost_by_target[target.steps_from_eden() as usize]
    }

    /// The TER level required to reach a target class.
    #[must_use]
    pub const fn required_ter(target: PlanetClass) -> u8 {
        6 - target.steps_from_eden()
    }
}

impl Default for TerraformConfig {
    fn default() -> Self {
        Self {
            // Eden, Lush, Benign, Harsh, Hostile, Desolate, Extreme
            cost_by_target: [2000, 1400, 900, 500, 250, 100, 60],
            duration_turns: 6,
        }
    }
}

// ---------------------------------------------------------------------------
// Capacities
// ---------------------------------------------------------------------------

/// Capacity limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityConfig {
    /// Fighters a colony can station per infrastructure level.
    pub fighters_per_infrastructure: u32,
    /// Base squadron command capacity per house.
    pub squadron_capacity_base: u32,
    /// Extra capacity per SC level above 1.
    pub squadron_capacity_per_sc: u32,
}

impl Default for CapacityConfig {
    fn default() -> Self {
        Self {
            fighters_per_infrastructure: 6,
            squadron_capacity_base: 40,
            squadron_capacity_per_sc: 10,
        }
    }
}

// ---------------------------------------------------------------------------
// The aggregate
// ---------------------------------------------------------------------------

/// Every balance table the engine reads, as one immutable value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Per-class ship stats.
    pub ships: ShipTable,
    /// Facility costs and gates.
    pub facilities: FacilityConfig,
    /// Per-class ground stats.
    pub ground: GroundTable,
    /// Income, growth, and construction economics.
    pub economy: EconomyConfig,
    /// Research conversion and breakthroughs.
    pub research: ResearchConfig,
    /// Espionage costs and detection.
    pub espionage: EspionageConfig,
    /// Combat tables.
    pub combat: CombatConfig,
    /// Population transfer costs.
    pub transfers: TransferConfig,
    /// Terraforming costs.
    pub terraform: TerraformConfig,
    /// Capacity limits.
    pub capacities: CapacityConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_anchor_costs_hold() {
        let config = GameConfig::default();
        assert_eq!(config.ships.row(ShipClass::Battleship).cost, 280);
        assert_eq!(config.ships.row(ShipClass::Cruiser).cost, 120);
        assert_eq!(config.espionage.pp_per_point, 40);
    }

    #[test]
    fn dock_multiplier_scales_with_cst() {
        let config = FacilityConfig::default();
        assert_eq!(config.effective_docks(10, 1), 10);
        assert_eq!(config.effective_docks(10, 5), 14);
        assert_eq!(config.effective_docks(5, 10), 9);
    }

    #[test]
    fn terraform_gate_tightens_toward_eden() {
        assert_eq!(TerraformConfig::required_ter(PlanetClass::Desolate), 1);
        assert_eq!(TerraformConfig::required_ter(PlanetClass::Benign), 4);
        assert_eq!(TerraformConfig::required_ter(PlanetClass::Eden), 6);
    }

    #[test]
    fn config_roundtrips_through_json() {
        let config = GameConfig::default();
        let json = serde_json::to_string(&config).ok();
        let back: Option<GameConfig> =
            json.as_deref().and_then(|j| serde_json::from_str(j).ok());
        assert_eq!(back.as_ref(), Some(&config));
    }
}
