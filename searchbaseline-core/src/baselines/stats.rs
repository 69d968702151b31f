//! Summary statistic helpers
//!
//! Small numeric helpers shared by the post-processors. Medians are used
//! wherever the source distribution is heavy-tailed (session length, click
//! position); means are reserved for daily count columns.

/// Arithmetic mean, or None for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Median with average-of-middle-two for even counts, or None for empty.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).expect("non-NaN statistic inputs"));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Round to `places` decimal places.
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

/// Percentage of `numerator` over `denominator`, or None when the
/// denominator is empty.
pub fn percentage(numerator: usize, denominator: usize) -> Option<f64> {
    if denominator == 0 {
        return None;
    }
    Some(100.0 * numerator as f64 / denominator as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[3.0]), Some(3.0));
        let counts = [
            50000.0, 52000.0, 53000.0, 54000.0, 55000.0, 56000.0, 57000.0,
        ];
        let daily_mean = round_to(mean(&counts).unwrap(), 2);
        assert_eq!(daily_mean, 53857.14);
    }

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(median(&[]), None);
        assert_eq!(median(&[7.0]), Some(7.0));
        assert_eq!(median(&[0.0, 0.0, 3.0, 13.0, 499.0]), Some(3.0));
        // Even count averages the middle pair
        assert_eq!(median(&[1.0, 2.0, 2.0, 5.0, 12.0, 49.0]), Some(3.5));
        // Order independent
        assert_eq!(median(&[49.0, 1.0, 12.0, 2.0, 5.0, 2.0]), Some(3.5));
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(53857.142857, 2), 53857.14);
        assert_eq!(round_to(2.345, 1), 2.3);
        assert_eq!(round_to(59.999, 2), 60.0);
    }

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(3, 5), Some(60.0));
        assert_eq!(percentage(0, 5), Some(0.0));
        assert_eq!(percentage(5, 5), Some(100.0));
        assert_eq!(percentage(1, 0), None);
    }
}
