//! The typed event ADT.
//!
//! Every state change during resolution produces an immutable
//! [`GameEvent`] appended to the turn's event log. Payloads are structured
//! per kind so consumers (the TUI, diagnostics exporters, training-data
//! collectors) never parse strings.

use ec4x_types::{
    BreakthroughKind, ColonyId, CombatState, DiplomaticState, EspionageActionKind, FleetId,
    HouseId, HouseStatus, PlanetClass, RejectionReason, ShipClass, SystemId, TechField, Theater,
    TransferOutcome,
};
use serde::{Deserialize, Serialize};

/// One event in a turn's log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    /// The turn the event happened on.
    pub turn: u32,
    /// The primary acting house, if any.
    pub house: Option<HouseId>,
    /// The house acted against, if any.
    pub target_house: Option<HouseId>,
    /// The system the event happened at, if localized.
    pub system: Option<SystemId>,
    /// The kind-specific payload.
    pub payload: EventPayload,
}

/// Structured payload, one variant per event kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventPayload {
    // --- Orders and reports (acting house only) ---
    /// A command failed validation or the budget gate.
    CommandRejected {
        /// Why it was rejected.
        reason: RejectionReason,
        /// Human-readable detail.
        detail: String,
    },
    /// An order ran to completion.
    OrderCompleted {
        /// The fleet that finished its order.
        fleet: FleetId,
    },
    /// An order could not be carried out at execution time.
    OrderFailed {
        /// The fleet whose order died.
        fleet: FleetId,
        /// What went wrong.
        detail: String,
    },
    /// A fleet reached its destination.
    FleetArrived {
        /// The arriving fleet.
        fleet: FleetId,
    },
    /// A construction project commissioned its product.
    ConstructionCompleted {
        /// The colony that built it.
        colony: ColonyId,
        /// What was built.
        item: String,
    },
    /// A repair project restored its target.
    RepairCompleted {
        /// The colony that serviced it.
        colony: ColonyId,
    },
    /// A technology field advanced one level.
    TechAdvance {
        /// The advanced field.
        field: TechField,
        /// The new level.
        level: u8,
    },
    /// A research breakthrough fired.
    Breakthrough {
        /// Its magnitude.
        kind: BreakthroughKind,
    },
    /// A scout mission brought home intelligence.
    IntelGathered {
        /// The fleet that gathered it.
        fleet: FleetId,
    },
    /// Prestige changed.
    PrestigeChanged {
        /// Signed delta.
        delta: i64,
        /// Why.
        reason: String,
    },
    /// Treasury or maintenance warning.
    ResourceWarning {
        /// What to worry about.
        detail: String,
    },
    /// The budget gate's cost summary for the submitted packet.
    CostSummary {
        /// PP committed to builds.
        build: i64,
        /// PP committed to research.
        research: i64,
        /// PP committed to espionage.
        espionage: i64,
        /// PP committed to transfers and terraforming.
        civil: i64,
        /// PP reserved for maintenance.
        maintenance_reserved: i64,
        /// Whether everything was affordable.
        can_afford: bool,
        /// Warnings (for example, treasury over 90% committed).
        warnings: Vec<String>,
    },
    /// Per-colony income report.
    ColonyIncomeReport {
        /// The colony.
        colony: ColonyId,
        /// Gross output before tax.
        gross: i64,
        /// PP actually collected.
        collected: i64,
        /// Whether a blockade suppressed the take.
        blockaded: bool,
    },
    /// A population transfer resolved.
    TransferResolved {
        /// Where the packet ended up.
        outcome: TransferOutcome,
        /// The intended destination.
        destination: ColonyId,
        /// Where the PTU actually landed, if anywhere.
        delivered_to: Option<ColonyId>,
        /// How many PTU were aboard.
        ptu: u32,
    },
    /// A terraform project completed.
    TerraformCompleted {
        /// The colony whose planet improved.
        colony: ColonyId,
        /// The new planet class.
        new_class: PlanetClass,
    },
    /// A house's status changed (autopilot engaged or cleared).
    StatusChanged {
        /// The new status.
        status: HouseStatus,
    },

    // --- Diplomacy (public) ---
    /// The diplomatic state between two houses changed.
    DiplomaticStateChanged {
        /// The new state.
        state: DiplomaticState,
    },
    /// A pact was sealed.
    PactSealed,
    /// A pact was broken, with the prestige penalty applied.
    PactBroken {
        /// Prestige penalty applied to the breaker.
        penalty: i64,
    },
    /// A pact proposal was made (visible to the two houses).
    PactProposed {
        /// The turn the proposal lapses.
        expires_turn: u32,
    },
    /// A pact proposal lapsed or was withdrawn.
    ProposalClosed,
    /// A house left the game for good.
    HouseEliminated,

    // --- Combat (presence in system) ---
    /// A battle began at a system.
    BattleOccurred {
        /// The houses engaged, ascending.
        participants: Vec<HouseId>,
    },
    /// A theater opened.
    CombatTheaterBegan {
        /// Which theater.
        theater: Theater,
    },
    /// A theater finished.
    CombatTheaterCompleted {
        /// Which theater.
        theater: Theater,
        /// Rounds fought.
        rounds: u32,
    },
    /// A combat round opened.
    CombatPhaseBegan {
        /// Which theater.
        theater: Theater,
        /// Round number, starting at 1.
        round: u32,
    },
    /// A combat round finished.
    CombatPhaseCompleted {
        /// Which theater.
        theater: Theater,
        /// Round number, starting at 1.
        round: u32,
    },
    /// A house's force fired.
    WeaponFired {
        /// Hits landed.
        hits: u32,
    },
    /// A ship was crippled.
    ShipDamaged {
        /// Its hull class.
        class: ShipClass,
        /// The state it fell to.
        new_state: CombatState,
    },
    /// A ship was destroyed.
    ShipDestroyed {
        /// Its hull class.
        class: ShipClass,
    },
    /// A planetary shield blocked a hit.
    ShieldActivated,
    /// A starbase joined the orbital fight.
    StarbaseCombat {
        /// The starbase owner.
        owner: HouseId,
    },
    /// A bombardment round opened.
    BombardmentRoundBegan {
        /// Round number, 1-3.
        round: u32,
    },
    /// A bombardment round finished.
    BombardmentRoundCompleted {
        /// Round number, 1-3.
        round: u32,
        /// Infrastructure damage dealt.
        infrastructure_hits: u32,
    },
    /// A fleet withdrew from the battle.
    FleetRetreat {
        /// The retreating fleet.
        fleet: FleetId,
        /// Where it fell back to.
        to_system: SystemId,
    },
    /// An invasion began.
    InvasionBegan,
    /// A blitz raid began.
    BlitzBegan,
    /// One bracket of ground combat resolved.
    GroundCombatRound {
        /// Attacker losses.
        attacker_losses: u32,
        /// Defender losses.
        defender_losses: u32,
    },
    /// The invasion was thrown back.
    InvasionRepelled,
    /// Fighters engaged.
    FighterEngagement {
        /// Fighters committed.
        fighters: u32,
    },
    /// A carrier went down with its fighters.
    CarrierDestroyed {
        /// Fighters lost with it.
        fighters_lost: u32,
    },
    /// A colony changed hands.
    ColonyCaptured {
        /// The losing house.
        from: HouseId,
    },
    /// Control of a system changed hands.
    SystemCaptured {
        /// The losing house.
        from: HouseId,
    },

    // --- Colonization (presence in target system) ---
    /// A new colony was founded.
    ColonyEstablished {
        /// The new colony.
        colony: ColonyId,
    },
    /// A colonization attempt fell back to another system and succeeded.
    FallbackColonySuccess {
        /// The system actually settled.
        settled: SystemId,
    },
    /// No viable fallback system was found.
    NoViableTarget,

    // --- Espionage successes (attacker only) ---
    /// An espionage action succeeded.
    EspionageExecuted {
        /// Which operation.
        kind: EspionageActionKind,
        /// Operation-specific magnitude (SRP stolen, IU destroyed, ...).
        magnitude: i64,
    },

    // --- Espionage detections (detecting house, plus attacker variant) ---
    /// A spy mission against us was detected.
    SpyMissionDetected {
        /// What they tried.
        kind: EspionageActionKind,
    },
    /// A foreign scout was detected in our space.
    ScoutDetected,
    /// A foreign scout was destroyed in our space.
    ScoutDestroyed,

    // --- Owner-only diagnostics ---
    /// A raider slipped through unseen.
    RaiderStealthSuccess,
    /// The starbase surveillance net flagged a contact.
    StarbaseSurveillanceDetection,

    // --- Engine diagnostics ---
    /// The turn was poisoned and rolled back.
    TurnPoisoned {
        /// The audit findings, rendered.
        findings: Vec<String>,
    },
}

impl GameEvent {
    /// Shorthand constructor for a global event.
    #[must_use]
    pub const fn global(turn: u32, payload: EventPayload) -> Self {
        Self {
            turn,
            house: None,
            target_house: None,
            system: None,
            payload,
        }
    }

    /// Shorthand constructor for an acting-house event.
    #[must_use]
    pub const fn for_house(turn: u32, house: HouseId, payload: EventPayload) -> Self {
        Self {
            turn,
            house: Some(house),
            target_house: None,
            system: None,
            payload,
        }
    }

    /// Attach a system to the event.
    #[must_use]
    pub const fn at(mut self, system: SystemId) -> Self {
        self.system = Some(system);
        self
    }

    /// Attach a target house to the event.
    #[must_use]
    pub const fn against(mut self, target: HouseId) -> Self {
        self.target_house = Some(target);
        self
    }
}
