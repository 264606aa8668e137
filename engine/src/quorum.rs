//! Pure quorum evaluation.

/// Whether `approval_weight` clears `quorum_threshold_percent` of
/// `total_active_power`.
///
/// Evaluated entirely in integer arithmetic — comparing
/// `approval_weight * 100 >= threshold * total` in u128 — so the verdict
/// cannot flap at exact boundaries the way a floating-point division can.
/// A total of zero is never executable (fail closed).
pub fn is_executable(
    approval_weight: u64,
    quorum_threshold_percent: u8,
    total_active_power: u64,
) -> bool {
    if total_active_power == 0 {
        return false;
    }
    (approval_weight as u128) * 100
        >= (quorum_threshold_percent as u128) * (total_active_power as u128)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_total_power_is_never_executable() {
        assert!(!is_executable(0, 60, 0));
        assert!(!is_executable(1_000_000, 1, 0));
    }

    #[test]
    fn boundary_at_sixty_percent() {
        assert!(!is_executable(59, 60, 100));
        assert!(is_executable(60, 60, 100));
        assert!(is_executable(61, 60, 100));
    }

    #[test]
    fn one_percent_threshold() {
        assert!(is_executable(1, 1, 100));
        assert!(!is_executable(0, 1, 100));
    }

    #[test]
    fn hundred_percent_threshold_requires_full_weight() {
        assert!(!is_executable(99, 100, 100));
        assert!(is_executable(100, 100, 100));
    }

    #[test]
    fn exact_fraction_does_not_flap() {
        // 2/3 of 3 is exactly 2; 66% of 3 is 1.98, so 2 clears it, 1 does not.
        assert!(is_executable(2, 66, 3));
        assert!(!is_executable(1, 66, 3));
    }

    #[test]
    fn no_overflow_at_u64_extremes() {
        assert!(is_executable(u64::MAX, 100, u64::MAX));
        assert!(!is_executable(u64::MAX - 1, 100, u64::MAX));
        assert!(is_executable(u64::MAX / 2 + 1, 50, u64::MAX));
    }

    #[test]
    fn approval_above_total_is_executable() {
        // Can happen transiently when a member is deactivated between a
        // tally and a total read; the verdict must still be stable.
        assert!(is_executable(150, 60, 100));
    }
}
