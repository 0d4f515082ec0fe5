//! Combat Effect Resolution: the hit tables.
//!
//! A CER lookup maps (weapon strength, defense strength) to a ratio
//! bucket, rolls a d10, applies the die-roll modifier, and reads the
//! bucket's thresholds: Miss below the cripple line, Cripple between the
//! lines, Destroy at or above the destroy line.

use ec4x_types::CerOutcome;
use rand::Rng;

use crate::config::CerRow;

/// Map an attack-vs-defense comparison to a ratio bucket, 0 (1:4 or
/// worse) through 6 (4:1 or better).
#[must_use]
pub const fn ratio_bucket(attack: i64, defense: i64) -> usize {
    if defense <= 0 {
        return 6;
    }
    if attack <= 0 {
        return 0;
    }
    if attack >= defense.saturating_mul(4) {
        6
    } else if attack >= defense.saturating_mul(3) {
        5
    } else if attack >= defense.saturating_mul(2) {
        4
    } else if defense >= attack.saturating_mul(4) {
        0
    } else if defense >= attack.saturating_mul(3) {
        1
    } else if defense >= attack.saturating_mul(2) {
        2
    } else {
        3
    }
}

/// Resolve one hit against the given table.
pub fn resolve_hit(
    table: &[CerRow; 7],
    attack: i64,
    defense: i64,
    drm: i32,
    rng: &mut impl Rng,
) -> CerOutcome {
    let bucket = ratio_bucket(attack, defense);
    let row = table[bucket];
    let roll = rng.random_range(1..=10) + drm;
    if roll >= row.destroy_at {
        CerOutcome::Destroy
    } else if roll >= row.cripple_at {
        CerOutcome::Cripple
    } else {
        CerOutcome::Miss
    }
}

/// Weapon strength for a shooter: base attack scaled by the WEP level
/// frozen at build time.
#[must_use]
pub fn wep_scaled_attack(base_attack: u32, wep_at_build: u8, wep_percent_step: i64) -> i64 {
    let percent =
        100_i64.saturating_add(wep_percent_step.saturating_mul(i64::from(wep_at_build.saturating_sub(1))));
    i64::from(base_attack).saturating_mul(percent) / 100
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use crate::config::CombatConfig;

    use super::*;

    #[test]
    fn buckets_cover_the_ratio_line() {
        assert_eq!(ratio_bucket(1, 4), 0);
        assert_eq!(ratio_bucket(1, 3), 1);
        assert_eq!(ratio_bucket(1, 2), 2);
        assert_eq!(ratio_bucket(5, 5), 3);
        assert_eq!(ratio_bucket(2, 1), 4);
        assert_eq!(ratio_bucket(3, 1), 5);
        assert_eq!(ratio_bucket(9, 2), 6);
        assert_eq!(ratio_bucket(9, 0), 6);
        assert_eq!(ratio_bucket(0, 1), 0);
    }

    #[test]
    fn heavy_drm_forces_destruction() {
        let config = CombatConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        // Bucket 6 destroys at 6; a +10 DRM makes every roll lethal.
        let outcome = resolve_hit(&config.space_cer, 40, 5, 10, &mut rng);
        assert_eq!(outcome, CerOutcome::Destroy);
    }

    #[test]
    fn hopeless_ratio_with_negative_drm_misses() {
        let config = CombatConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        // Bucket 0 cripples at 9; a -5 DRM caps the roll at 5.
        for _ in 0..20 {
            let outcome = resolve_hit(&config.space_cer, 1, 40, -5, &mut rng);
            assert_eq!(outcome, CerOutcome::Miss);
        }
    }

    #[test]
    fn wep_scaling_is_ten_percent_per_level() {
        assert_eq!(wep_scaled_attack(10, 1, 10), 10);
        assert_eq!(wep_scaled_attack(10, 3, 10), 12);
        assert_eq!(wep_scaled_attack(7, 5, 10), 9);
    }
}
