//! Deterministic randomness for turn resolution.
//!
//! Every turn runs on one [`ChaCha8Rng`] seeded from `(game id, turn)`,
//! so replays of different games stay uncorrelated and the same inputs
//! always produce the same stream. The hash is FNV-1a over the game id's
//! bytes and the turn counter: the standard library hasher is not stable
//! across releases, so the engine carries its own.

use ec4x_types::{GameId, SystemId};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// FNV-1a over a byte slice, continuing from a running hash.
#[must_use]
pub const fn fnv1a(mut hash: u64, bytes: &[u8]) -> u64 {
    let mut i = 0;
    while i < bytes.len() {
        hash ^= bytes[i] as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
        i += 1;
    }
    hash
}

/// The RNG seed for one turn of one game.
#[must_use]
pub const fn turn_seed(game_id: GameId, turn: u32) -> u64 {
    let hash = fnv1a(FNV_OFFSET, game_id.into_inner().as_bytes());
    fnv1a(hash, &turn.to_le_bytes())
}

/// The turn RNG.
#[must_use]
pub fn turn_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// The deterministic salt used to vary per-system decisions (for
/// example, the colonization fallback scan) across turns.
#[must_use]
pub const fn system_salt(turn: u32, system: SystemId) -> u64 {
    let hash = fnv1a(FNV_OFFSET, &turn.to_le_bytes());
    fnv1a(hash, &system.into_raw().to_le_bytes())
}

/// The deterministic intel-corruption offset for (turn, system, viewer):
/// a percent in `20..=40` with a sign bit.
#[must_use]
pub const fn corruption_offset(turn: u32, system: SystemId, viewer: ec4x_types::HouseId) -> i64 {
    let mut hash = fnv1a(FNV_OFFSET, &turn.to_le_bytes());
    hash = fnv1a(hash, &system.into_raw().to_le_bytes());
    hash = fnv1a(hash, &viewer.into_raw().to_le_bytes());
    let percent = 20 + (hash % 21) as i64;
    if hash & (1 << 40) == 0 { percent } else { -percent }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_are_stable() {
        let game = GameId::from(uuid::Uuid::from_u128(42));
        assert_eq!(turn_seed(game, 7), turn_seed(game, 7));
        assert_ne!(turn_seed(game, 7), turn_seed(game, 8));
    }

    #[test]
    fn different_games_decorrelate() {
        let a = GameId::from(uuid::Uuid::from_u128(1));
        let b = GameId::from(uuid::Uuid::from_u128(2));
        assert_ne!(turn_seed(a, 3), turn_seed(b, 3));
    }

    #[test]
    fn corruption_offset_stays_in_band() {
        for turn in 0..50 {
            let offset = corruption_offset(
                turn,
                SystemId::from_parts(turn, 0),
                ec4x_types::HouseId::from_parts(1, 0),
            );
            assert!((20..=40).contains(&offset.abs()));
        }
    }
}
