//! Percentage formatting used at the report boundary.
//!
//! All report percentages are whole numbers rounded half-up. A zero
//! denominator yields `0`, never `NaN` and never `100`.

/// Completion threshold (in percent) for long-form videos.
pub const WATCHED_THRESHOLD_PCT: f64 = 95.0;

/// `round(numerator / denominator * 100)` with half-up rounding.
///
/// Computed in integer arithmetic so `1/3` is exactly `33` and `1/2` is
/// exactly `50`.
pub fn ratio_percentage(numerator: u64, denominator: u64) -> u32 {
    if denominator == 0 {
        return 0;
    }
    let scaled = (u128::from(numerator) * 200 + u128::from(denominator)) / (2 * u128::from(denominator));
    u32::try_from(scaled).unwrap_or(u32::MAX)
}

/// Round a non-negative floating percentage half-up to a whole number.
pub fn round_half_up(value: f64) -> u32 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    (value + 0.5).floor() as u32
}

/// `resume / total * 100`, clamped to `[0, 100]`. A non-positive total is 0.
pub fn watch_percentage(resume_time: f64, total_time: f64) -> f64 {
    if total_time <= 0.0 || !resume_time.is_finite() {
        return 0.0;
    }
    (resume_time / total_time * 100.0).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_third_rounds_down() {
        assert_eq!(ratio_percentage(1, 3), 33);
    }

    #[test]
    fn two_thirds_rounds_up() {
        assert_eq!(ratio_percentage(2, 3), 67);
    }

    #[test]
    fn exact_half_rounds_up() {
        // 1/8 = 12.5%
        assert_eq!(ratio_percentage(1, 8), 13);
    }

    #[test]
    fn zero_denominator_is_zero() {
        assert_eq!(ratio_percentage(0, 0), 0);
        assert_eq!(ratio_percentage(5, 0), 0);
    }

    #[test]
    fn full_ratio_is_hundred() {
        assert_eq!(ratio_percentage(4, 4), 100);
    }

    #[test]
    fn round_half_up_handles_edges() {
        assert_eq!(round_half_up(49.5), 50);
        assert_eq!(round_half_up(49.49), 49);
        assert_eq!(round_half_up(f64::NAN), 0);
        assert_eq!(round_half_up(-3.0), 0);
    }

    #[test]
    fn watch_percentage_clamps_overshoot() {
        assert_eq!(watch_percentage(130.0, 100.0), 100.0);
        assert_eq!(watch_percentage(50.0, 200.0), 25.0);
        assert_eq!(watch_percentage(10.0, 0.0), 0.0);
    }
}
