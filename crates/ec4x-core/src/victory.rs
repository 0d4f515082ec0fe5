//! Victory detection.
//!
//! A game ends when a house crosses the prestige threshold, or when the
//! final-conflict rule leaves one house standing. Collapsed houses never
//! count toward victory.

use ec4x_state::GameState;
use ec4x_types::{HouseId, VictoryKind, VictoryOutcome};

/// Prestige total that wins outright.
pub const PRESTIGE_VICTORY_THRESHOLD: i64 = 2500;

/// Check whether the game is over.
///
/// Prestige victory is checked first; on a shared turn the highest total
/// wins, with every house at the maximum listed (ties are joint
/// winners). Otherwise, a single standing house wins the final conflict.
#[must_use]
pub fn is_victory(state: &GameState) -> Option<VictoryOutcome> {
    let standing: Vec<HouseId> = state
        .houses
        .iter()
        .filter(|(_, house)| !house.is_collapsed())
        .map(|(id, _)| id)
        .collect();

    let best = standing
        .iter()
        .filter_map(|id| state.houses.get(*id).map(|house| house.prestige))
        .max()
        .unwrap_or(0);
    if best >= PRESTIGE_VICTORY_THRESHOLD {
        let winners = standing
            .iter()
            .filter(|id| {
                state
                    .houses
                    .get(**id)
                    .is_some_and(|house| house.prestige == best)
            })
            .copied()
            .collect();
        return Some(VictoryOutcome {
            kind: VictoryKind::PrestigeThreshold,
            winners,
        });
    }

    if standing.len() == 1 {
        return Some(VictoryOutcome {
            kind: VictoryKind::FinalConflict,
            winners: standing,
        });
    }

    None
}

#[cfg(test)]
mod tests {
    use ec4x_map::{MapShape, generate_map};
    use ec4x_types::{GameId, TechTree};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn three_house_state() -> (GameState, Vec<HouseId>) {
        let mut rng = ChaCha8Rng::seed_from_u64(13);
        let map = generate_map(
            MapShape {
                rings: 2,
                houses: 3,
            },
            &mut rng,
        )
        .map(|g| g.map)
        .unwrap_or_default();
        let mut state = GameState::empty(GameId::new(), map);
        let houses = vec![
            state.add_house("A".to_owned(), 0, TechTree::default()),
            state.add_house("B".to_owned(), 0, TechTree::default()),
            state.add_house("C".to_owned(), 0, TechTree::default()),
        ];
        (state, houses)
    }

    #[test]
    fn no_winner_early() {
        let (state, _) = three_house_state();
        assert!(is_victory(&state).is_none());
    }

    #[test]
    fn prestige_threshold_wins() {
        let (mut state, houses) = three_house_state();
        if let Some(&winner) = houses.first()
            && let Some(house) = state.houses.get_mut(winner)
        {
            house.prestige = PRESTIGE_VICTORY_THRESHOLD;
        }
        let outcome = is_victory(&state);
        assert_eq!(
            outcome.as_ref().map(|o| o.kind),
            Some(VictoryKind::PrestigeThreshold)
        );
        assert_eq!(outcome.map(|o| o.winners), Some(vec![houses[0]]));
    }

    #[test]
    fn collapsed_houses_never_win() {
        let (mut state, houses) = three_house_state();
        for &house_id in houses.iter().skip(1) {
            if let Some(house) = state.houses.get_mut(house_id) {
                house.collapse();
            }
        }
        let outcome = is_victory(&state);
        assert_eq!(
            outcome.as_ref().map(|o| o.kind),
            Some(VictoryKind::FinalConflict)
        );
        assert_eq!(outcome.map(|o| o.winners), Some(vec![houses[0]]));
    }
}
