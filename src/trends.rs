use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use crate::models::{Sample, WeeklySummary};
use crate::stats;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Last7,
    Last14,
    Last30,
    Last90,
    All,
}

impl Period {
    fn days(self) -> Option<i64> {
        match self {
            Period::Last7 => Some(7),
            Period::Last14 => Some(14),
            Period::Last30 => Some(30),
            Period::Last90 => Some(90),
            Period::All => None,
        }
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "7" => Ok(Period::Last7),
            "14" => Ok(Period::Last14),
            "30" => Ok(Period::Last30),
            "90" => Ok(Period::Last90),
            "all" => Ok(Period::All),
            other => Err(format!("unknown period `{other}` (expected 7, 14, 30, 90 or all)")),
        }
    }
}

/// Samples within `period` of the latest date, inclusive, in date order.
pub fn filter_period(samples: &[Sample], period: Period) -> Vec<Sample> {
    let mut sorted = samples.to_vec();
    sorted.sort_by_key(|sample| sample.date);

    let Some(end) = sorted.last().map(|sample| sample.date) else {
        return sorted;
    };
    match period.days() {
        Some(days) => {
            let start = end - Duration::days(days - 1);
            sorted.retain(|sample| sample.date >= start);
            sorted
        }
        None => sorted,
    }
}

/// Trailing mean over up to `window` points; the first entries average what is available.
pub fn rolling_average(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.clamp(1, values.len().max(1));
    (0..values.len())
        .map(|end| {
            let start = (end + 1).saturating_sub(window);
            stats::mean(&values[start..=end]).unwrap_or(0.0)
        })
        .collect()
}

fn week_ending(date: NaiveDate) -> NaiveDate {
    let days_to_sunday = 6 - date.weekday().num_days_from_monday() as i64;
    date + Duration::days(days_to_sunday)
}

/// Per-week statistics for weeks ending on Sunday. Weeks without valid samples are
/// omitted.
pub fn weekly_summary(samples: &[Sample], risk_threshold: f64) -> Vec<WeeklySummary> {
    let mut weeks: BTreeMap<NaiveDate, Vec<(NaiveDate, f64)>> = BTreeMap::new();
    for sample in samples {
        if let Some(value) = sample.value() {
            weeks
                .entry(week_ending(sample.date))
                .or_default()
                .push((sample.date, value));
        }
    }

    weeks
        .into_iter()
        .map(|(week_ending, mut days)| {
            days.sort_by_key(|(date, _)| *date);
            let values: Vec<f64> = days.into_iter().map(|(_, value)| value).collect();
            let risk_days = stats::risk_days(&values, risk_threshold);
            WeeklySummary {
                week_ending,
                mean: stats::mean(&values).unwrap_or(0.0),
                min: stats::min(&values).unwrap_or(0.0),
                max: stats::max(&values).unwrap_or(0.0),
                std: stats::std_dev(&values),
                risk_days,
                days_in_week: values.len(),
                risk_pct: risk_days as f64 / values.len() as f64 * 100.0,
            }
        })
        .collect()
}

const RECENT_DAYS: usize = 5;
const RECENT_SHIFT: f64 = 0.05;
const MOMENTUM_SHIFT: f64 = 0.07;

/// Recent average against the period average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Flat,
}

impl Direction {
    fn from_shift(shift: f64, band: f64) -> Self {
        if shift > band {
            Direction::Up
        } else if shift < -band {
            Direction::Down
        } else {
            Direction::Flat
        }
    }

    pub fn marker(self) -> &'static str {
        match self {
            Direction::Up => "▲",
            Direction::Down => "▼",
            Direction::Flat => "▬",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesOverview {
    pub total_days: usize,
    pub average: Option<f64>,
    pub latest: Option<f64>,
    /// Mean of the last five valid readings.
    pub recent_avg: Option<f64>,
    pub recent_days: usize,
    pub recent_direction: Option<Direction>,
    pub days_below_threshold: usize,
    pub risk_pct: f64,
}

fn sorted_values(samples: &[Sample]) -> Vec<(NaiveDate, f64)> {
    let mut sorted: Vec<(NaiveDate, f64)> = samples
        .iter()
        .filter_map(|sample| sample.value().map(|value| (sample.date, value)))
        .collect();
    sorted.sort_by_key(|(date, _)| *date);
    sorted
}

pub fn overview(samples: &[Sample], risk_threshold: f64) -> SeriesOverview {
    let values: Vec<f64> = sorted_values(samples).into_iter().map(|(_, v)| v).collect();
    let below = stats::risk_days(&values, risk_threshold);
    let average = stats::mean(&values);
    let recent = &values[values.len().saturating_sub(RECENT_DAYS)..];
    let recent_avg = stats::mean(recent);
    let recent_direction = match (recent_avg, average) {
        (Some(recent), Some(average)) => Some(Direction::from_shift(recent - average, RECENT_SHIFT)),
        _ => None,
    };

    SeriesOverview {
        total_days: values.len(),
        average,
        latest: values.last().copied(),
        recent_avg,
        recent_days: recent.len(),
        recent_direction,
        days_below_threshold: below,
        risk_pct: if values.is_empty() {
            0.0
        } else {
            below as f64 / values.len() as f64 * 100.0
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Momentum {
    Improving,
    Declining,
    Stable,
}

impl Momentum {
    pub fn label(self) -> &'static str {
        match self {
            Momentum::Improving => "Improving",
            Momentum::Declining => "Declining",
            Momentum::Stable => "Stable",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Consistency {
    VeryConsistent,
    Consistent,
    Variable,
    HighlyVariable,
}

impl Consistency {
    fn from_std(std: f64) -> Self {
        match std {
            s if s < 0.15 => Consistency::VeryConsistent,
            s if s < 0.25 => Consistency::Consistent,
            s if s < 0.35 => Consistency::Variable,
            _ => Consistency::HighlyVariable,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Consistency::VeryConsistent => "Very Consistent",
            Consistency::Consistent => "Consistent",
            Consistency::Variable => "Variable",
            Consistency::HighlyVariable => "Highly Variable",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesInsights {
    pub best_day: (NaiveDate, f64),
    pub worst_day: (NaiveDate, f64),
    pub recent_days: usize,
    /// Recent mean minus period mean.
    pub recent_shift: f64,
    pub momentum: Momentum,
    pub std: f64,
    pub consistency: Consistency,
}

/// Best and worst day, recent momentum and consistency for a period. `None` below three
/// valid readings. Ties on best or worst resolve to the earliest date.
pub fn insights(samples: &[Sample]) -> Option<SeriesInsights> {
    let days = sorted_values(samples);
    if days.len() < 3 {
        return None;
    }

    let mut best = days[0];
    let mut worst = days[0];
    for &(date, value) in &days[1..] {
        if value > best.1 {
            best = (date, value);
        }
        if value < worst.1 {
            worst = (date, value);
        }
    }

    let values: Vec<f64> = days.iter().map(|(_, value)| *value).collect();
    let recent = &values[values.len().saturating_sub(RECENT_DAYS)..];
    let recent_shift = stats::mean(recent)? - stats::mean(&values)?;
    let momentum = match Direction::from_shift(recent_shift, MOMENTUM_SHIFT) {
        Direction::Up => Momentum::Improving,
        Direction::Down => Momentum::Declining,
        Direction::Flat => Momentum::Stable,
    };
    let std = stats::std_dev(&values);

    Some(SeriesInsights {
        best_day: best,
        worst_day: worst,
        recent_days: recent.len(),
        recent_shift,
        momentum,
        std,
        consistency: Consistency::from_std(std),
    })
}
