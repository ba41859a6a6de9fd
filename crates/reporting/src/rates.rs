//! Rounding and ratio helpers shared by the calculators. Every division is
//! guarded so an empty denominator yields zero rather than NaN.

/// Round to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// `part / whole * 100`, or zero when `whole` is zero.
pub fn percent(part: u64, whole: u64) -> f64 {
    if whole > 0 {
        part as f64 / whole as f64 * 100.0
    } else {
        0.0
    }
}

/// Integer percentage, rounded half up.
pub fn percent_rounded(part: u64, whole: u64) -> u32 {
    percent(part, whole).round() as u32
}

/// Arithmetic mean, or zero for an empty input.
pub fn mean<I: IntoIterator<Item = f64>>(values: I) -> f64 {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0u64), |(sum, count), v| (sum + v, count + 1));
    if count > 0 {
        sum / count as f64
    } else {
        0.0
    }
}

/// Relative change from `previous` to `current` in percent. Growth from zero
/// has no meaningful percentage and is reported as zero.
pub fn percent_change(current: f64, previous: f64) -> f64 {
    if previous > 0.0 {
        (current - previous) / previous * 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_guards_zero() {
        assert_eq!(percent(3, 0), 0.0);
        assert_eq!(percent_rounded(1, 3), 33);
        assert_eq!(percent_rounded(2, 3), 67);
    }

    #[test]
    fn test_mean_and_round() {
        assert_eq!(mean(Vec::<f64>::new()), 0.0);
        assert_eq!(round1(mean([1.0, 2.0, 2.0])), 1.7);
    }

    #[test]
    fn test_percent_change() {
        assert_eq!(percent_change(200.0, 100.0), 100.0);
        assert_eq!(percent_change(50.0, 100.0), -50.0);
        assert_eq!(percent_change(50.0, 0.0), 0.0);
    }
}
