use std::collections::BTreeMap;

use rayon::prelude::*;
use tracing::debug;

use crate::models::{AthleteSeries, ReadinessRecord, Role, Sample, Status};
use crate::stats;

pub const DEFAULT_WINDOW: usize = 7;
pub const MIN_SAMPLES: usize = 3;

const LATEST_WEIGHT: f64 = 0.40;
const AVERAGE_WEIGHT: f64 = 0.30;
const TREND_WEIGHT: f64 = 0.15;
const VARIABILITY_FACTOR: f64 = 40.0;
const VARIABILITY_CAP: f64 = 25.0;
const RISK_DAY_PENALTY: f64 = 6.0;

/// Window statistics that feed the composite score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreInputs {
    pub latest: f64,
    pub recent_avg: f64,
    pub trend: f64,
    pub variability: f64,
    pub risk_days: usize,
}

/// Weighted composite on a 0-100 scale, penalised for instability and risk days.
///
/// The trend term assumes trends mostly fall inside ±0.5; anything beyond saturates.
pub fn composite_score(inputs: &ScoreInputs) -> f64 {
    let norm_latest = (inputs.latest + 1.0) / 2.0;
    let norm_avg = (inputs.recent_avg + 1.0) / 2.0;
    let norm_trend = (inputs.trend + 0.5).clamp(0.0, 1.0);

    let raw = 100.0
        * (LATEST_WEIGHT * norm_latest + AVERAGE_WEIGHT * norm_avg + TREND_WEIGHT * norm_trend);
    let variability_penalty = (inputs.variability * VARIABILITY_FACTOR).min(VARIABILITY_CAP);
    let risk_penalty = inputs.risk_days as f64 * RISK_DAY_PENALTY;

    (raw - variability_penalty - risk_penalty).clamp(0.0, 100.0)
}

/// Trailing `window` samples by date with malformed entries dropped. Missing readings
/// still occupy their slot in the window.
pub fn window_values(samples: &[Sample], window: usize) -> Vec<f64> {
    let mut sorted = samples.to_vec();
    sorted.sort_by_key(|sample| sample.date);
    let start = sorted.len().saturating_sub(window);
    sorted[start..].iter().filter_map(Sample::value).collect()
}

pub fn estimate(
    series: &AthleteSeries,
    risk_threshold: f64,
    role: Option<Role>,
    window: usize,
) -> ReadinessRecord {
    let values = window_values(&series.samples, window);
    let risk_days = stats::risk_days(&values, risk_threshold);

    if values.len() < MIN_SAMPLES {
        debug!(
            athlete = %series.athlete_id,
            valid = values.len(),
            "insufficient data for readiness"
        );
        return ReadinessRecord {
            athlete_id: series.athlete_id.clone(),
            role,
            score: 0.0,
            status: Status::Unknown,
            latest: values.last().copied(),
            recent_avg: stats::mean(&values),
            trend: 0.0,
            variability: None,
            risk_days,
            samples_used: values.len(),
        };
    }

    let inputs = ScoreInputs {
        latest: values[values.len() - 1],
        recent_avg: stats::mean(&values).unwrap_or(0.0),
        trend: stats::window_trend(&values),
        variability: stats::std_dev(&values),
        risk_days,
    };
    let score = composite_score(&inputs);

    ReadinessRecord {
        athlete_id: series.athlete_id.clone(),
        role,
        score,
        status: Status::from_score(score),
        latest: Some(inputs.latest),
        recent_avg: Some(inputs.recent_avg),
        trend: inputs.trend,
        variability: Some(inputs.variability),
        risk_days,
        samples_used: values.len(),
    }
}

/// Score every athlete in parallel. Roles come from `roster`; athletes missing from it
/// are unassigned. Output is ordered by athlete id.
pub fn estimate_all(
    series: &[AthleteSeries],
    roster: &BTreeMap<String, Role>,
    risk_threshold: f64,
    window: usize,
) -> Vec<ReadinessRecord> {
    let mut records: Vec<ReadinessRecord> = series
        .par_iter()
        .map(|athlete| {
            let role = roster.get(&athlete.athlete_id).copied();
            estimate(athlete, risk_threshold, role, window)
        })
        .collect();

    records.sort_by(|a, b| a.athlete_id.cmp(&b.athlete_id));
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn series_from(values: &[f64]) -> AthleteSeries {
        let start = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let samples = values
            .iter()
            .enumerate()
            .map(|(offset, &value)| Sample::new(start + Duration::days(offset as i64), value))
            .collect();
        AthleteSeries::new("Cole Palmer", samples)
    }

    #[test]
    fn declining_week_scores_into_rest() {
        let series = series_from(&[-0.6, -0.5, -0.5, -0.4, -0.3, -0.2, -0.1]);
        let record = estimate(&series, -0.4, Some(Role::Forward), DEFAULT_WINDOW);

        assert_eq!(record.risk_days, 3);
        assert!((record.trend - 0.283_333_333).abs() < 1e-6);
        assert!((record.variability.unwrap() - 0.179_947_082).abs() < 1e-6);
        assert!((record.score - 13.980_688_14).abs() < 1e-6);
        assert_eq!(record.status, Status::Rest);
        assert_eq!(record.max_minutes(), 0);
    }

    #[test]
    fn single_sample_is_unknown() {
        let series = series_from(&[0.9]);
        let record = estimate(&series, -0.4, None, DEFAULT_WINDOW);
        assert_eq!(record.status, Status::Unknown);
        assert_eq!(record.score, 0.0);
        assert_eq!(record.recent_avg, Some(0.9));
        assert_eq!(record.recommendation(), "Insufficient Data");
    }

    #[test]
    fn empty_series_is_unknown_without_stats() {
        let record = estimate(&AthleteSeries::new("Nobody", vec![]), -0.4, None, 7);
        assert_eq!(record.status, Status::Unknown);
        assert_eq!(record.recent_avg, None);
        assert_eq!(record.risk_days, 0);
    }

    #[test]
    fn malformed_samples_count_as_absent() {
        let start = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let samples = vec![
            Sample::new(start, 0.5),
            Sample::missing(start + Duration::days(1)),
            Sample::new(start + Duration::days(2), f64::NAN),
            Sample::new(start + Duration::days(3), -0.6),
        ];
        let record = estimate(&AthleteSeries::new("Reece James", samples), -0.4, None, 7);

        assert_eq!(record.status, Status::Unknown);
        assert_eq!(record.samples_used, 2);
        assert_eq!(record.risk_days, 1);
        assert!((record.recent_avg.unwrap() - (-0.05)).abs() < 1e-12);
    }

    #[test]
    fn window_uses_latest_dates_even_when_unsorted() {
        let start = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let mut samples: Vec<Sample> = (0..10)
            .map(|day| Sample::new(start + Duration::days(day), if day < 3 { -1.0 } else { 0.5 }))
            .collect();
        samples.reverse();
        let record = estimate(&AthleteSeries::new("Enzo Fernandez", samples), -0.4, None, 7);

        assert_eq!(record.samples_used, 7);
        assert_eq!(record.risk_days, 0);
        assert_eq!(record.recent_avg, Some(0.5));
        assert_eq!(record.latest, Some(0.5));
    }

    #[test]
    fn steady_high_scores_are_ready() {
        let series = series_from(&[0.8; 7]);
        let record = estimate(&series, -0.4, Some(Role::Midfielder), 7);
        // 0.40 * 90 + 0.30 * 90 + 0.15 * 50 = 70.5
        assert!((record.score - 70.5).abs() < 1e-9);
        assert_eq!(record.status, Status::Ready);
    }

    #[test]
    fn three_samples_use_endpoint_trend() {
        let record = estimate(&series_from(&[0.0, 0.6, 0.2]), -0.4, None, 7);
        assert!((record.trend - 0.2).abs() < 1e-12);
        assert_ne!(record.status, Status::Unknown);
    }

    #[test]
    fn score_is_monotonic_in_latest() {
        let mut previous = f64::MIN;
        for step in 0..=20 {
            let inputs = ScoreInputs {
                latest: -1.0 + step as f64 * 0.1,
                recent_avg: 0.1,
                trend: 0.05,
                variability: 0.2,
                risk_days: 1,
            };
            let score = composite_score(&inputs);
            assert!(score >= previous);
            assert!((0.0..=100.0).contains(&score));
            previous = score;
        }
    }

    #[test]
    fn estimate_is_repeatable() {
        let series = series_from(&[0.1, -0.3, 0.4, 0.2, -0.1, 0.3]);
        let first = estimate(&series, -0.2, Some(Role::Defender), 7);
        let second = estimate(&series, -0.2, Some(Role::Defender), 7);
        assert_eq!(first, second);
        assert_eq!(first.score.to_bits(), second.score.to_bits());
    }

    #[test]
    fn estimate_all_assigns_roles_and_sorts_by_id() {
        let mut roster = BTreeMap::new();
        roster.insert("Bravo".to_string(), Role::Goalkeeper);
        let series = vec![
            AthleteSeries::new("Charlie", vec![]),
            AthleteSeries::new("Bravo", series_from(&[0.2, 0.3, 0.4]).samples),
            AthleteSeries::new("Alpha", vec![]),
        ];

        let records = estimate_all(&series, &roster, -0.4, 7);
        let ids: Vec<&str> = records.iter().map(|r| r.athlete_id.as_str()).collect();
        assert_eq!(ids, vec!["Alpha", "Bravo", "Charlie"]);
        assert_eq!(records[1].role, Some(Role::Goalkeeper));
        assert_eq!(records[0].role, None);
    }
}
