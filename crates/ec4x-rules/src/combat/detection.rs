//! Pre-battle detection.
//!
//! For each attacking force the engine compares the attacker's cloaking
//! against the defender's electronic intelligence. The outcome grants the
//! attacker a round-1 die-roll modifier: total surprise is worth +4,
//! partial surprise +3, a plain intercept nothing.

use ec4x_types::DetectionOutcome;

/// Compute the detection outcome for one attacker against one defender.
///
/// `drm = attacker CLK - defender ELI`, plus 2 when the defender has a
/// starbase on station. `drm >= 5` is an ambush, `1..=4` surprise,
/// anything else an intercept.
#[must_use]
pub fn detection_outcome(
    attacker_clk: u8,
    defender_eli: u8,
    defender_has_starbase: bool,
) -> DetectionOutcome {
    let mut drm = i32::from(attacker_clk) - i32::from(defender_eli);
    if defender_has_starbase {
        drm += 2;
    }
    match drm {
        5.. => DetectionOutcome::Ambush,
        1..=4 => DetectionOutcome::Surprise,
        _ => DetectionOutcome::Intercept,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moderate_margin_is_a_surprise() {
        // Attacker CLK 5 against defender ELI 2, no starbase: drm 3.
        assert_eq!(
            detection_outcome(5, 2, false),
            DetectionOutcome::Surprise
        );
    }

    #[test]
    fn high_margin_is_an_ambush() {
        assert_eq!(detection_outcome(7, 1, false), DetectionOutcome::Ambush);
        assert_eq!(detection_outcome(4, 1, true), DetectionOutcome::Ambush);
    }

    #[test]
    fn matched_sensors_intercept() {
        assert_eq!(detection_outcome(3, 3, false), DetectionOutcome::Intercept);
        assert_eq!(detection_outcome(1, 5, false), DetectionOutcome::Intercept);
    }

    #[test]
    fn round_one_drm_follows_outcome() {
        assert_eq!(DetectionOutcome::Ambush.round_one_drm(), 4);
        assert_eq!(DetectionOutcome::Surprise.round_one_drm(), 3);
        assert_eq!(DetectionOutcome::Intercept.round_one_drm(), 0);
    }
}
