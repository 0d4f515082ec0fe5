//! The diplomatic matrix and pending pact proposals.

use std::collections::BTreeMap;

use ec4x_types::{DiplomaticState, HouseId, ProposalId};
use serde::{Deserialize, Serialize};

/// How many turns a pact proposal stays open before lapsing.
pub const PROPOSAL_LIFETIME_TURNS: u32 = 3;

/// Prestige penalty for breaking a pact the first time.
pub const FIRST_VIOLATION_PENALTY: i64 = -5;

/// Prestige penalty for each repeat violation.
pub const REPEAT_VIOLATION_PENALTY: i64 = -3;

/// The record kept for one pair of houses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationRecord {
    /// The current state. Symmetric between the pair.
    pub state: RelationState,
    /// The turn an active pact was sealed, if the pair is allied.
    pub pact_since: Option<u32>,
    /// How many times either side has violated a pact with the other.
    pub violations: u8,
    /// Turn until which the pact-breaker is dishonored (no new proposals
    /// accepted from them by anyone).
    pub dishonor_until: Option<u32>,
    /// Turn until which a violator is isolated (no proposals at all).
    pub isolation_until: Option<u32>,
}

/// Wrapper so the matrix can default missing entries to Neutral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationState(pub DiplomaticState);

impl Default for RelationState {
    fn default() -> Self {
        Self(DiplomaticState::Neutral)
    }
}

/// The full relation matrix, keyed by the normalized (low, high) pair.
///
/// Relations are symmetric; the matrix is the single source of truth and
/// is fully public to every viewer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiplomaticMatrix {
    relations: BTreeMap<(HouseId, HouseId), RelationRecord>,
}

/// Normalize a pair so either ordering addresses the same record.
const fn pair(a: HouseId, b: HouseId) -> (HouseId, HouseId) {
    if a.into_raw() <= b.into_raw() {
        (a, b)
    } else {
        (b, a)
    }
}

impl DiplomaticMatrix {
    /// An empty matrix; every pair defaults to Neutral.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            relations: BTreeMap::new(),
        }
    }

    /// The diplomatic state between two houses.
    #[must_use]
    pub fn state_of(&self, a: HouseId, b: HouseId) -> DiplomaticState {
        self.relations
            .get(&pair(a, b))
            .map_or(DiplomaticState::Neutral, |record| record.state.0)
    }

    /// The full record for a pair, if one exists.
    #[must_use]
    pub fn record(&self, a: HouseId, b: HouseId) -> Option<&RelationRecord> {
        self.relations.get(&pair(a, b))
    }

    /// Mutable access to a pair's record, creating the default Neutral
    /// record on first touch.
    pub fn record_mut(&mut self, a: HouseId, b: HouseId) -> &mut RelationRecord {
        self.relations.entry(pair(a, b)).or_default()
    }

    /// Set the state between two houses.
    pub fn set_state(&mut self, a: HouseId, b: HouseId, state: DiplomaticState) {
        self.record_mut(a, b).state = RelationState(state);
    }

    /// Iterate over every explicit pair record.
    pub fn iter(&self) -> impl Iterator<Item = (&(HouseId, HouseId), &RelationRecord)> {
        self.relations.iter()
    }
}

/// A standing pact proposal between two houses.
///
/// Visible only to the two involved houses; lapses after
/// [`PROPOSAL_LIFETIME_TURNS`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingProposal {
    /// The proposal's identity.
    pub id: ProposalId,
    /// The proposing house.
    pub from: HouseId,
    /// The house being courted.
    pub to: HouseId,
    /// The turn the proposal was made.
    pub created_turn: u32,
    /// The turn the proposal lapses.
    pub expires_turn: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(n: u32) -> HouseId {
        HouseId::from_parts(n, 0)
    }

    #[test]
    fn unknown_pairs_default_to_neutral() {
        let matrix = DiplomaticMatrix::new();
        assert_eq!(matrix.state_of(h(0), h(1)), DiplomaticState::Neutral);
    }

    #[test]
    fn state_is_symmetric() {
        let mut matrix = DiplomaticMatrix::new();
        matrix.set_state(h(2), h(0), DiplomaticState::Enemy);
        assert_eq!(matrix.state_of(h(0), h(2)), DiplomaticState::Enemy);
        assert_eq!(matrix.state_of(h(2), h(0)), DiplomaticState::Enemy);
    }

    #[test]
    fn violations_accumulate_on_the_pair() {
        let mut matrix = DiplomaticMatrix::new();
        matrix.record_mut(h(0), h(1)).violations = 1;
        assert_eq!(matrix.record(h(1), h(0)).map(|r| r.violations), Some(1));
    }
}
