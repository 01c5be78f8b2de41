use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One daily recovery reading. `score` is `None` when the source value was missing
/// or not numeric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub date: NaiveDate,
    pub score: Option<f64>,
}

impl Sample {
    pub fn new(date: NaiveDate, score: f64) -> Self {
        Self {
            date,
            score: Some(score),
        }
    }

    pub fn missing(date: NaiveDate) -> Self {
        Self { date, score: None }
    }

    /// The score, if it is present and finite.
    pub fn value(&self) -> Option<f64> {
        self.score.filter(|value| value.is_finite())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AthleteSeries {
    pub athlete_id: String,
    pub samples: Vec<Sample>,
}

impl AthleteSeries {
    pub fn new(athlete_id: impl Into<String>, samples: Vec<Sample>) -> Self {
        Self {
            athlete_id: athlete_id.into(),
            samples,
        }
    }

    /// Copy of the samples in ascending date order.
    pub fn sorted_samples(&self) -> Vec<Sample> {
        let mut samples = self.samples.clone();
        samples.sort_by_key(|sample| sample.date);
        samples
    }

    pub fn valid_values(&self) -> Vec<f64> {
        self.sorted_samples().iter().filter_map(Sample::value).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "GK")]
    Goalkeeper,
    #[serde(rename = "DEF")]
    Defender,
    #[serde(rename = "MID")]
    Midfielder,
    #[serde(rename = "FWD")]
    Forward,
}

impl Role {
    pub const ALL: [Role; 4] = [
        Role::Goalkeeper,
        Role::Defender,
        Role::Midfielder,
        Role::Forward,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Role::Goalkeeper => "GK",
            Role::Defender => "DEF",
            Role::Midfielder => "MID",
            Role::Forward => "FWD",
        }
    }

    /// Display order on a team sheet: goalkeeper first, forwards last.
    pub fn sort_order(self) -> u8 {
        match self {
            Role::Goalkeeper => 0,
            Role::Defender => 1,
            Role::Midfielder => 2,
            Role::Forward => 3,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "GK" => Ok(Role::Goalkeeper),
            "DEF" => Ok(Role::Defender),
            "MID" => Ok(Role::Midfielder),
            "FWD" => Ok(Role::Forward),
            other => Err(format!("unknown role `{other}` (expected GK, DEF, MID or FWD)")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Optimal,
    Ready,
    Limited,
    Bench,
    Rest,
    Unknown,
}

impl Status {
    pub const ALL: [Status; 6] = [
        Status::Optimal,
        Status::Ready,
        Status::Limited,
        Status::Bench,
        Status::Rest,
        Status::Unknown,
    ];

    /// Band a composite score. Never yields `Unknown`.
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            Status::Optimal
        } else if score >= 65.0 {
            Status::Ready
        } else if score >= 50.0 {
            Status::Limited
        } else if score >= 35.0 {
            Status::Bench
        } else {
            Status::Rest
        }
    }

    pub fn max_minutes(self) -> u32 {
        match self {
            Status::Optimal | Status::Ready => 90,
            Status::Limited => 60,
            Status::Bench => 30,
            Status::Rest | Status::Unknown => 0,
        }
    }

    pub fn recommendation(self) -> &'static str {
        match self {
            Status::Optimal => "Start Candidate",
            Status::Ready => "Available to Start",
            Status::Limited => "Limited Minutes (Max 60-70)",
            Status::Bench => "Bench Option (Max 30-45)",
            Status::Rest => "Rest / Unavailable",
            Status::Unknown => "Insufficient Data",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Status::Optimal => "optimal",
            Status::Ready => "ready",
            Status::Limited => "limited",
            Status::Bench => "bench",
            Status::Rest => "rest",
            Status::Unknown => "unknown",
        }
    }

    pub fn is_available(self) -> bool {
        !matches!(self, Status::Rest | Status::Unknown)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadinessRecord {
    pub athlete_id: String,
    pub role: Option<Role>,
    pub score: f64,
    pub status: Status,
    pub latest: Option<f64>,
    pub recent_avg: Option<f64>,
    pub trend: f64,
    pub variability: Option<f64>,
    pub risk_days: usize,
    pub samples_used: usize,
}

impl ReadinessRecord {
    pub fn max_minutes(&self) -> u32 {
        self.status.max_minutes()
    }

    pub fn recommendation(&self) -> &'static str {
        self.status.recommendation()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SquadPlan {
    pub starting: Vec<ReadinessRecord>,
    pub bench: Vec<ReadinessRecord>,
    pub excluded: Vec<ReadinessRecord>,
}

impl SquadPlan {
    pub fn len(&self) -> usize {
        self.starting.len() + self.bench.len() + self.excluded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn available_count(&self) -> usize {
        self.starting.len() + self.bench.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SquadSummary {
    pub bench_coverage: Vec<(Role, bool)>,
    pub improving: usize,
    pub declining: usize,
    pub status_counts: Vec<(Status, usize)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklySummary {
    pub week_ending: NaiveDate,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub std: f64,
    pub risk_days: usize,
    pub days_in_week: usize,
    pub risk_pct: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_bands_use_inclusive_lower_bounds() {
        assert_eq!(Status::from_score(80.0), Status::Optimal);
        assert_eq!(Status::from_score(79.99), Status::Ready);
        assert_eq!(Status::from_score(65.0), Status::Ready);
        assert_eq!(Status::from_score(50.0), Status::Limited);
        assert_eq!(Status::from_score(35.0), Status::Bench);
        assert_eq!(Status::from_score(34.9), Status::Rest);
        assert_eq!(Status::from_score(0.0), Status::Rest);
    }

    #[test]
    fn max_minutes_follow_status() {
        assert_eq!(Status::Optimal.max_minutes(), 90);
        assert_eq!(Status::Ready.max_minutes(), 90);
        assert_eq!(Status::Limited.max_minutes(), 60);
        assert_eq!(Status::Bench.max_minutes(), 30);
        assert_eq!(Status::Rest.max_minutes(), 0);
        assert_eq!(Status::Unknown.max_minutes(), 0);
    }

    #[test]
    fn role_codes_parse_case_insensitively() {
        assert_eq!("gk".parse::<Role>(), Ok(Role::Goalkeeper));
        assert_eq!(" Mid ".parse::<Role>(), Ok(Role::Midfielder));
        assert!("ST".parse::<Role>().is_err());
    }

    #[test]
    fn non_finite_scores_are_not_values() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        assert_eq!(Sample::new(date, f64::NAN).value(), None);
        assert_eq!(Sample::missing(date).value(), None);
        assert_eq!(Sample::new(date, 0.25).value(), Some(0.25));
    }
}
