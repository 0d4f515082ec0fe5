//! Enumeration types shared across the EC4X engine.
//!
//! These are the closed vocabularies of the game: planet and resource
//! classes, ship and facility classes, combat and diplomatic states, fleet
//! command kinds, espionage actions, and the rejection taxonomy. Every enum
//! here derives `Ord` so collections keyed on them iterate deterministically.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Star map
// ---------------------------------------------------------------------------

/// Habitability class of a system's primary planet.
///
/// Ordered from most to least habitable. Terraforming raises a planet one
/// class step toward [`PlanetClass::Eden`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PlanetClass {
    /// Ideal habitability, maximum output.
    Eden,
    /// Fertile and comfortable.
    Lush,
    /// Ordinary habitable world.
    Benign,
    /// Marginal, requires effort to settle.
    Harsh,
    /// Dangerous environment, low output.
    Hostile,
    /// Barely exploitable rock.
    Desolate,
    /// Near-uninhabitable extreme environment.
    Extreme,
}

impl PlanetClass {
    /// All planet classes in habitability order.
    pub const ALL: [Self; 7] = [
        Self::Eden,
        Self::Lush,
        Self::Benign,
        Self::Harsh,
        Self::Hostile,
        Self::Desolate,
        Self::Extreme,
    ];

    /// The next class up the habitability ladder, if any.
    ///
    /// This is the result of one completed terraforming project.
    #[must_use]
    pub const fn improved(self) -> Option<Self> {
        match self {
            Self::Eden => None,
            Self::Lush => Some(Self::Eden),
            Self::Benign => Some(Self::Lush),
            Self::Harsh => Some(Self::Benign),
            Self::Hostile => Some(Self::Harsh),
            Self::Desolate => Some(Self::Hostile),
            Self::Extreme => Some(Self::Desolate),
        }
    }

    /// Number of terraform steps between this class and Eden.
    #[must_use]
    pub const fn steps_from_eden(self) -> u8 {
        match self {
            Self::Eden => 0,
            Self::Lush => 1,
            Self::Benign => 2,
            Self::Harsh => 3,
            Self::Hostile => 4,
            Self::Desolate => 5,
            Self::Extreme => 6,
        }
    }
}

/// Mineral and energy richness of a system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ResourceRating {
    /// Almost nothing worth extracting.
    VeryPoor,
    /// Below-average yields.
    Poor,
    /// Ordinary yields.
    Abundant,
    /// Above-average yields.
    Rich,
    /// Exceptional yields.
    VeryRich,
}

impl ResourceRating {
    /// All resource ratings in ascending richness order.
    pub const ALL: [Self; 5] = [
        Self::VeryPoor,
        Self::Poor,
        Self::Abundant,
        Self::Rich,
        Self::VeryRich,
    ];
}

/// Class of a jump lane connecting two systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LaneClass {
    /// Heavily traveled trunk lane, open to all ships.
    Major,
    /// Secondary lane, closed to fleets carrying crippled ships.
    Minor,
    /// Hazardous passage traversable only by uncrippled Scout and Raider
    /// hulls.
    Restricted,
}

// ---------------------------------------------------------------------------
// Ships and facilities
// ---------------------------------------------------------------------------

/// Hull class of a ship.
///
/// Stats for each class are frozen into the ship at construction from the
/// configuration tables. The ordering doubles as the damage-soak priority:
/// smaller classes absorb hits first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ShipClass {
    /// Colony-based light combat craft.
    Fighter,
    /// Minimal escort hull. Present in the tables but carries no balance
    /// weight.
    Corvette,
    /// Light escort.
    Frigate,
    /// Recon hull; the only class permitted on spy missions.
    Scout,
    /// Stealth commerce raider; may use restricted lanes.
    Raider,
    /// Standard escort.
    Destroyer,
    /// Workhorse combatant.
    Cruiser,
    /// Fast cruiser variant.
    LightCruiser,
    /// Up-gunned cruiser variant.
    HeavyCruiser,
    /// Fast capital ship.
    Battlecruiser,
    /// Capital ship.
    Battleship,
    /// Heavy capital ship.
    Dreadnought,
    /// Flagship-grade capital ship.
    SuperDreadnought,
    /// Fighter carrier.
    Carrier,
    /// Heavy fighter carrier.
    SuperCarrier,
    /// Expansion transport; its hull is consumed founding a colony.
    Etac,
    /// Marine and colonist spacelift.
    TroopTransport,
    /// Siege weapon that bypasses planetary shields.
    PlanetBreaker,
}

impl ShipClass {
    /// All ship classes in soak-priority order.
    pub const ALL: [Self; 18] = [
        Self::Fighter,
        Self::Corvette,
        Self::Frigate,
        Self::Scout,
        Self::Raider,
        Self::Destroyer,
        Self::Cruiser,
        Self::LightCruiser,
        Self::HeavyCruiser,
        Self::Battlecruiser,
        Self::Battleship,
        Self::Dreadnought,
        Self::SuperDreadnought,
        Self::Carrier,
        Self::SuperCarrier,
        Self::Etac,
        Self::TroopTransport,
        Self::PlanetBreaker,
    ];

    /// Table index for fixed per-class arrays.
    #[must_use]
    pub const fn table_index(self) -> usize {
        self as usize
    }

    /// The role this hull fills.
    #[must_use]
    pub const fn role(self) -> ShipRole {
        match self {
            Self::Scout => ShipRole::Recon,
            Self::Etac => ShipRole::Expansion,
            Self::TroopTransport => ShipRole::Auxiliary,
            _ => ShipRole::Combat,
        }
    }

    /// Whether this hull may traverse restricted jump lanes (when
    /// uncrippled).
    #[must_use]
    pub const fn restricted_lane_capable(self) -> bool {
        matches!(self, Self::Scout | Self::Raider)
    }

    /// Whether this hull counts against the house squadron capacity.
    ///
    /// Scouts are exempt so that intelligence gathering never competes with
    /// the battle line for command slots.
    #[must_use]
    pub const fn counts_toward_squadron_capacity(self) -> bool {
        !matches!(self, Self::Scout | Self::Fighter)
    }
}

/// Broad role a ship hull fills within a fleet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ShipRole {
    /// Line combatant.
    Combat,
    /// Intelligence gathering.
    Recon,
    /// Colony foundation.
    Expansion,
    /// Cargo and troop spacelift.
    Auxiliary,
}

/// Cargo carried in a ship's hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CargoKind {
    /// Ground-assault marines.
    Marines,
    /// Civilian colonists, measured in PTU.
    Colonists,
}

/// Class of a ground unit stationed at a colony.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GroundClass {
    /// Garrison formation.
    Army,
    /// Assault infantry carried by troop transports.
    Marine,
    /// Surface battery that fires on bombarding fleets.
    GroundBattery,
    /// Planetary shield generator.
    PlanetaryShield,
}

impl GroundClass {
    /// All ground classes.
    pub const ALL: [Self; 4] = [
        Self::Army,
        Self::Marine,
        Self::GroundBattery,
        Self::PlanetaryShield,
    ];

    /// Table index for fixed per-class arrays.
    #[must_use]
    pub const fn table_index(self) -> usize {
        self as usize
    }
}

/// Subclass of a neoria (production facility).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NeoriaClass {
    /// Planet-side port with 5 docks; ships built here cost double.
    Spaceport,
    /// Orbital yard with 10 docks.
    Shipyard,
    /// Repair-only facility with 5 docks.
    Drydock,
}

impl NeoriaClass {
    /// Dock count before the CST multiplier is applied.
    #[must_use]
    pub const fn base_docks(self) -> u32 {
        match self {
            Self::Spaceport | Self::Drydock => 5,
            Self::Shipyard => 10,
        }
    }

    /// Whether this facility can only service repair projects.
    #[must_use]
    pub const fn repair_only(self) -> bool {
        matches!(self, Self::Drydock)
    }
}

// ---------------------------------------------------------------------------
// State machines
// ---------------------------------------------------------------------------

/// Combat state of a ship or facility.
///
/// Transitions only ever move rightward: Undamaged -> Crippled -> Destroyed.
/// Crippled entities recover through repair projects between turns, never
/// within a battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CombatState {
    /// Fully operational.
    Undamaged,
    /// Half effectiveness, movement restrictions apply.
    Crippled,
    /// Removed from play at end of theater.
    Destroyed,
}

impl CombatState {
    /// Apply one hit worth of damage, returning the degraded state.
    #[must_use]
    pub const fn degraded(self) -> Self {
        match self {
            Self::Undamaged => Self::Crippled,
            Self::Crippled | Self::Destroyed => Self::Destroyed,
        }
    }
}

/// Activation status of a fleet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FleetStatus {
    /// Under way, full upkeep.
    Active,
    /// Stood down at a colony, reduced upkeep.
    Reserve,
    /// Sealed at a colony, minimal upkeep, slow to reactivate.
    Mothballed,
}

/// Status of a house within a game.
///
/// `Active` and `Autopilot` are mutually reversible; `DefensiveCollapse` is
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HouseStatus {
    /// Player is submitting orders.
    Active,
    /// No orders for 3+ turns; standing orders continue.
    Autopilot,
    /// Terminal collapse after 3+ consecutive negative-prestige turns.
    DefensiveCollapse,
}

/// Diplomatic state between an ordered pair of houses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DiplomaticState {
    /// Default stance; combat triggers on contact.
    Neutral,
    /// Pacted; combat never triggers.
    Ally,
    /// Declared hostility.
    Hostile,
    /// Open war; required before planetary attacks.
    Enemy,
}

impl DiplomaticState {
    /// Whether fleets of two houses in this state fight on contact.
    #[must_use]
    pub const fn triggers_combat(self) -> bool {
        !matches!(self, Self::Ally)
    }
}

/// Coarse public phase of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Act {
    /// Expansion race across unclaimed systems.
    LandGrab,
    /// Borders close, first skirmishes.
    RisingTensions,
    /// General war.
    TotalWar,
    /// Final scramble for victory.
    Endgame,
}

// ---------------------------------------------------------------------------
// Combat vocabulary
// ---------------------------------------------------------------------------

/// Combat theater, resolved sequentially within a system battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Theater {
    /// Deep-space fleet engagement.
    Space,
    /// Orbital engagement including starbases.
    Orbital,
    /// Bombardment, invasion, and ground combat.
    Planetary,
}

/// Outcome of the pre-battle detection roll for one attacker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DetectionOutcome {
    /// Total surprise: +4 DRM in round 1.
    Ambush,
    /// Partial surprise: +3 DRM in round 1.
    Surprise,
    /// Both sides ready: no modifier.
    Intercept,
}

impl DetectionOutcome {
    /// The round-1 die-roll modifier this outcome grants the attacker.
    #[must_use]
    pub const fn round_one_drm(self) -> i32 {
        match self {
            Self::Ambush => 4,
            Self::Surprise => 3,
            Self::Intercept => 0,
        }
    }
}

/// Result of a single Combat Effect Resolution table lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CerOutcome {
    /// No effect.
    Miss,
    /// Target degrades one combat state.
    Cripple,
    /// Target is destroyed outright.
    Destroy,
}

/// Prestige standing tier, used for morale die-roll modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PrestigeTier {
    /// Deeply negative prestige.
    Collapsing,
    /// Strongly negative prestige.
    VeryLow,
    /// Mildly negative prestige.
    Low,
    /// Neutral standing.
    Normal,
    /// Strong positive standing.
    High,
    /// Exceptional standing.
    VeryHigh,
}

impl PrestigeTier {
    /// Classify a raw prestige total into a tier.
    #[must_use]
    pub const fn from_prestige(prestige: i64) -> Self {
        match prestige {
            i64::MIN..=-500 => Self::Collapsing,
            -499..=-200 => Self::VeryLow,
            -199..=-1 => Self::Low,
            0..=499 => Self::Normal,
            500..=1499 => Self::High,
            _ => Self::VeryHigh,
        }
    }
}

// ---------------------------------------------------------------------------
// Fleet commands
// ---------------------------------------------------------------------------

/// Kind of an order issued to a fleet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FleetCommandKind {
    /// Remain in place.
    Hold,
    /// Move toward a target system, one lane per turn.
    Move,
    /// Patrol the current system.
    Patrol,
    /// Route to the nearest owned colony.
    SeekHome,
    /// Found a colony at the target system.
    Colonize,
    /// Bombard the target system's colony from orbit.
    Bombard,
    /// Land marines to take the target colony.
    Invade,
    /// Lightning raid: steal assets and withdraw.
    Blitz,
    /// Scout mission against a colony.
    SpyPlanet,
    /// Scout mission surveying a system.
    SpySystem,
    /// Scout mission against a starbase's datanet.
    HackStarbase,
    /// Merge into another fleet at the same system.
    JoinFleet,
    /// Move to meet another fleet at its location.
    Rendezvous,
    /// Recover wrecks at the current system.
    Salvage,
    /// Stand down into the colony reserve fleet.
    Reserve,
    /// Seal ships into the colony mothball fleet.
    Mothball,
    /// Hold position and report everything in sensor range.
    ViewWorld,
}

impl FleetCommandKind {
    /// Whether this command is one of the scout-only spy missions.
    #[must_use]
    pub const fn is_spy_mission(self) -> bool {
        matches!(self, Self::SpyPlanet | Self::SpySystem | Self::HackStarbase)
    }

    /// Whether this command initiates planetary combat and therefore
    /// requires an Enemy declaration against the defender.
    #[must_use]
    pub const fn is_planetary_attack(self) -> bool {
        matches!(self, Self::Bombard | Self::Invade | Self::Blitz)
    }

    /// Whether an Autopilot house may keep running this command.
    ///
    /// Offensive and expansion orders cancel into SeekHome + Patrol when a
    /// house goes silent; defensive postures continue.
    #[must_use]
    pub const fn autopilot_permitted(self) -> bool {
        matches!(self, Self::Hold | Self::Patrol | Self::SeekHome | Self::ViewWorld)
    }
}

/// Standing order attached to a fleet between explicit commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StandingOrderKind {
    /// Defend the colony at the fleet's location.
    GuardColony,
    /// Patrol the fleet's current system.
    Patrol,
    /// Blockade the foreign colony at the fleet's location.
    Blockade,
    /// Withdraw toward home when hostiles blockade the fleet's system.
    AutoSeekHome,
}

// ---------------------------------------------------------------------------
// Espionage
// ---------------------------------------------------------------------------

/// Kind of espionage action a house may attempt (at most one per turn).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EspionageActionKind {
    /// Steal accumulated science research points.
    TechTheft,
    /// Damage industrial units at a target colony.
    Sabotage,
    /// Attempt to eliminate a rival functionary for prestige damage.
    Assassination,
    /// Cripple a starbase's systems for a window.
    CyberAttack,
    /// Copy the target's intel database entries.
    IntelligenceTheft,
    /// Corrupt the target's intel database for a window.
    Disinformation,
    /// Suppress the target's tax income for a window.
    EconomicManipulation,
    /// Undermine morale and prestige.
    PsyOps,
    /// Sweep one's own houses for foreign assets.
    CounterIntelSweep,
}

/// Kind of a time-bounded espionage effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    /// Target's science point accrual is reduced.
    SrpReduction,
    /// Target's net colony value is reduced.
    NcvReduction,
    /// Target's tax income is reduced.
    TaxReduction,
    /// Target starbase is crippled without combat.
    StarbaseCrippled,
    /// Target cannot gather fresh intel on the acting house.
    IntelBlocked,
    /// Target's intel database entries for a system are scrambled.
    IntelCorrupted,
}

// ---------------------------------------------------------------------------
// Intelligence
// ---------------------------------------------------------------------------

/// Confidence level of an intel database entry for a foreign system.
///
/// Levels never downgrade; fresher observations only ever raise them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum VisibilityLevel {
    /// Nothing known.
    None,
    /// Adjacent to owned territory: ring and location only.
    Adjacent,
    /// Scouted in passing: planet class and rating known.
    Scouted,
    /// Observed in detail: colony and fleet estimates attached.
    Observed,
    /// Owned this turn: full detail.
    Owned,
}

// ---------------------------------------------------------------------------
// Transfers
// ---------------------------------------------------------------------------

/// How a population-in-transit packet resolved on arrival.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TransferOutcome {
    /// Arrived at the intended destination.
    Delivered,
    /// Destination was lost or blockaded; rerouted to the nearest owned
    /// colony.
    Redirected,
    /// No viable destination remained; the PTU are gone.
    Lost,
}

// ---------------------------------------------------------------------------
// Research
// ---------------------------------------------------------------------------

/// Magnitude of a research breakthrough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BreakthroughKind {
    /// Small windfall of research points.
    Minor,
    /// Discount on the next level cost.
    Moderate,
    /// Free economic or science level.
    Major,
    /// Unique technology unlocked.
    Revolutionary,
}

// ---------------------------------------------------------------------------
// Rejection taxonomy
// ---------------------------------------------------------------------------

/// Why a command was rejected by the validator or budget gate.
///
/// Rejections are data, not errors: they accumulate in the validation
/// outcome and are reported to the emitting house only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RejectionReason {
    /// The command claimed ownership the validator refutes. Audited.
    SecurityViolation,
    /// A referenced entity does not exist.
    EntityMissing,
    /// No path exists under lane rules for this fleet's state.
    NoPath,
    /// The fleet lacks the ships the command requires.
    CapabilityMissing,
    /// The house's tech level does not permit this item.
    TechGate,
    /// A capacity limit (docks, fighters, squadrons) would be exceeded.
    CapacityExceeded,
    /// Diplomatic action aimed at self or an eliminated house.
    InvalidDiplomaticTarget,
    /// A parameter is out of range.
    InvalidParameter,
    /// The running budget cannot cover this item's cost.
    InsufficientFunds,
    /// The packet's turn does not match the current turn.
    WrongTurn,
    /// Planetary attack against a house not declared Enemy.
    NotAtWar,
    /// Per-house limit on simultaneous population transfers reached.
    TransferLimit,
    /// The house's status (collapse, autopilot) forbids this command.
    StatusForbids,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combat_state_degrades_monotonically() {
        assert_eq!(CombatState::Undamaged.degraded(), CombatState::Crippled);
        assert_eq!(CombatState::Crippled.degraded(), CombatState::Destroyed);
        assert_eq!(CombatState::Destroyed.degraded(), CombatState::Destroyed);
    }

    #[test]
    fn terraform_ladder_tops_out_at_eden() {
        assert_eq!(PlanetClass::Extreme.improved(), Some(PlanetClass::Desolate));
        assert_eq!(PlanetClass::Lush.improved(), Some(PlanetClass::Eden));
        assert_eq!(PlanetClass::Eden.improved(), None);
    }

    #[test]
    fn ally_never_triggers_combat() {
        assert!(!DiplomaticState::Ally.triggers_combat());
        assert!(DiplomaticState::Neutral.triggers_combat());
        assert!(DiplomaticState::Hostile.triggers_combat());
        assert!(DiplomaticState::Enemy.triggers_combat());
    }

    #[test]
    fn prestige_tiers_partition_the_number_line() {
        assert_eq!(PrestigeTier::from_prestige(-501), PrestigeTier::Collapsing);
        assert_eq!(PrestigeTier::from_prestige(-200), PrestigeTier::VeryLow);
        assert_eq!(PrestigeTier::from_prestige(-1), PrestigeTier::Low);
        assert_eq!(PrestigeTier::from_prestige(0), PrestigeTier::Normal);
        assert_eq!(PrestigeTier::from_prestige(500), PrestigeTier::High);
        assert_eq!(PrestigeTier::from_prestige(2000), PrestigeTier::VeryHigh);
    }

    #[test]
    fn spy_missions_are_the_scout_subset() {
        assert!(FleetCommandKind::SpyPlanet.is_spy_mission());
        assert!(FleetCommandKind::SpySystem.is_spy_mission());
        assert!(FleetCommandKind::HackStarbase.is_spy_mission());
        assert!(!FleetCommandKind::Patrol.is_spy_mission());
    }

    #[test]
    fn restricted_lanes_admit_scouts_and_raiders_only() {
        for class in ShipClass::ALL {
            let expected = matches!(class, ShipClass::Scout | ShipClass::Raider);
            assert_eq!(class.restricted_lane_capable(), expected);
        }
    }
}
