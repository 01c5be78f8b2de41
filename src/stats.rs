pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1 denominator). Zero for fewer than two values.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() <= 1 {
        return 0.0;
    }
    let avg = values.iter().sum::<f64>() / values.len() as f64;
    let sum_sq: f64 = values.iter().map(|value| (value - avg).powi(2)).sum();
    (sum_sq / (values.len() - 1) as f64).sqrt()
}

/// Mean of the later half minus mean of the earlier half, split at `floor(n / 2)`.
/// `None` below four values, where the halves are too small to compare.
pub fn half_split_trend(values: &[f64]) -> Option<f64> {
    if values.len() < 4 {
        return None;
    }
    let (earlier, later) = values.split_at(values.len() / 2);
    Some(mean(later)? - mean(earlier)?)
}

/// Trend used for readiness: half split for four or more values, last minus first for
/// exactly three, zero otherwise.
pub fn window_trend(values: &[f64]) -> f64 {
    match values.len() {
        0..=2 => 0.0,
        3 => values[2] - values[0],
        _ => half_split_trend(values).unwrap_or(0.0),
    }
}

pub fn risk_days(values: &[f64], threshold: f64) -> usize {
    values.iter().filter(|&&value| value < threshold).count()
}

pub fn min(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}

pub fn max(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_empty_is_none() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[0.5, -0.5, 0.3]), Some(0.3 / 3.0));
    }

    #[test]
    fn std_dev_uses_sample_denominator() {
        assert_eq!(std_dev(&[0.4]), 0.0);
        let value = std_dev(&[0.0, 1.0]);
        assert!((value - 0.5_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn trend_splits_odd_windows_toward_later_half() {
        // floor(7 / 2) = 3: first three against last four
        let values = [-0.6, -0.5, -0.5, -0.4, -0.3, -0.2, -0.1];
        let trend = window_trend(&values);
        let expected = -0.25 - (-1.6 / 3.0);
        assert!((trend - expected).abs() < 1e-12);
    }

    #[test]
    fn three_values_use_endpoints() {
        assert!((window_trend(&[0.1, 0.9, 0.4]) - 0.3).abs() < 1e-12);
        assert_eq!(half_split_trend(&[0.1, 0.9, 0.4]), None);
    }

    #[test]
    fn short_windows_have_flat_trend() {
        assert_eq!(window_trend(&[]), 0.0);
        assert_eq!(window_trend(&[0.2, 0.8]), 0.0);
    }

    #[test]
    fn risk_days_are_strictly_below_threshold() {
        assert_eq!(risk_days(&[-0.4, -0.41, 0.0, -0.9], -0.4), 2);
    }
}
