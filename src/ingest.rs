use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::Path;

use anyhow::{bail, Context};
use chrono::{NaiveDate, NaiveDateTime};
use tracing::{info, warn};

use crate::models::{AthleteSeries, Sample};

pub const SCORE_METRIC: &str = "emboss_baseline_score";
pub const DEFAULT_PLAYER: &str = "Default Player";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    /// `date`, `emboss_baseline_score`, optional `player_name`.
    Standard {
        date: usize,
        score: usize,
        player: Option<usize>,
    },
    /// `metric`, `value`, `sessionDate` (DD/MM/YYYY), optional `playerId`/`playerName`.
    Raw {
        metric: usize,
        value: usize,
        date: usize,
        player: Option<usize>,
    },
}

impl Layout {
    fn detect(headers: &csv::StringRecord) -> anyhow::Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);

        if let (Some(date), Some(score)) = (find("date"), find(SCORE_METRIC)) {
            return Ok(Layout::Standard {
                date,
                score,
                player: find("player_name"),
            });
        }
        if let (Some(metric), Some(value), Some(date)) =
            (find("metric"), find("value"), find("sessionDate"))
        {
            return Ok(Layout::Raw {
                metric,
                value,
                date,
                player: find("playerId").or_else(|| find("playerName")),
            });
        }
        bail!(
            "unrecognised CSV layout: expected columns (date, {SCORE_METRIC}) \
             or (metric, value, sessionDate)"
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub rows: usize,
    pub kept: usize,
    pub skipped_metric: usize,
    pub bad_date: usize,
    pub bad_score: usize,
}

fn parse_standard_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
}

fn parse_session_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%d/%m/%Y").ok()
}

fn parse_score(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Group rows into per-athlete series sorted by date. Rows with an unparseable date or
/// score are dropped and counted.
pub fn read_series<R: Read>(reader: R) -> anyhow::Result<(Vec<AthleteSeries>, LoadStats)> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = reader.headers().context("failed to read CSV header")?.clone();
    let layout = Layout::detect(&headers)?;

    let mut grouped: BTreeMap<String, Vec<Sample>> = BTreeMap::new();
    let mut stats = LoadStats::default();

    for result in reader.records() {
        let record = result?;
        stats.rows += 1;
        let field = |index: usize| record.get(index).unwrap_or("");

        let (date, score, player) = match layout {
            Layout::Standard {
                date,
                score,
                player,
            } => (
                parse_standard_date(field(date)),
                parse_score(field(score)),
                player.map(field),
            ),
            Layout::Raw {
                metric,
                value,
                date,
                player,
            } => {
                if field(metric).trim() != SCORE_METRIC {
                    stats.skipped_metric += 1;
                    continue;
                }
                (
                    parse_session_date(field(date)),
                    parse_score(field(value)),
                    player.map(field),
                )
            }
        };

        let Some(date) = date else {
            stats.bad_date += 1;
            continue;
        };
        let Some(score) = score else {
            stats.bad_score += 1;
            continue;
        };

        let player = player
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_PLAYER);
        grouped
            .entry(player.to_string())
            .or_default()
            .push(Sample::new(date, score));
        stats.kept += 1;
    }

    if stats.bad_date + stats.bad_score > 0 {
        warn!(
            bad_date = stats.bad_date,
            bad_score = stats.bad_score,
            "dropped malformed rows"
        );
    }

    let series = grouped
        .into_iter()
        .map(|(athlete_id, mut samples)| {
            samples.sort_by_key(|sample| sample.date);
            AthleteSeries::new(athlete_id, samples)
        })
        .collect();

    Ok((series, stats))
}

pub fn load_csv(path: &Path) -> anyhow::Result<Vec<AthleteSeries>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let (series, stats) =
        read_series(file).with_context(|| format!("failed to load {}", path.display()))?;
    info!(
        path = %path.display(),
        athletes = series.len(),
        rows = stats.kept,
        "loaded recovery data"
    );
    Ok(series)
}

/// Write series in the standard layout.
pub fn write_series<W: Write>(writer: W, series: &[AthleteSeries]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(["date", SCORE_METRIC, "player_name"])?;
    for athlete in series {
        for sample in &athlete.samples {
            let score = sample.value().map(|v| v.to_string()).unwrap_or_default();
            writer.write_record([
                sample.date.to_string(),
                score,
                athlete.athlete_id.clone(),
            ])?;
        }
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_standard_layout_grouped_by_player() {
        let data = "\
date,emboss_baseline_score,player_name
2026-03-03,0.25,Cole Palmer
2026-03-01,-0.10,Cole Palmer
2026-03-02 08:30:00,0.4,Reece James
2026-03-04,n/a,Reece James
not-a-date,0.3,Reece James
";
        let (series, stats) = read_series(data.as_bytes()).unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].athlete_id, "Cole Palmer");
        assert_eq!(series[0].samples.len(), 2);
        assert_eq!(
            series[0].samples[0].date,
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
        );
        assert_eq!(series[1].samples.len(), 1);
        assert_eq!(stats.rows, 5);
        assert_eq!(stats.bad_score, 1);
        assert_eq!(stats.bad_date, 1);
    }

    #[test]
    fn missing_player_column_uses_default_player() {
        let data = "date,emboss_baseline_score\n2026-03-01,0.1\n2026-03-02,0.2\n";
        let (series, _) = read_series(data.as_bytes()).unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].athlete_id, DEFAULT_PLAYER);
    }

    #[test]
    fn reads_raw_export_layout() {
        let data = "\
metric,value,sessionDate,playerId
emboss_baseline_score,0.31,02/03/2026,Enzo Fernandez
sleep_hours,7.5,02/03/2026,Enzo Fernandez
emboss_baseline_score,-0.2,03/03/2026,Enzo Fernandez
";
        let (series, stats) = read_series(data.as_bytes()).unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].samples.len(), 2);
        assert_eq!(
            series[0].samples[0].date,
            NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
        );
        assert_eq!(stats.skipped_metric, 1);
    }

    #[test]
    fn rejects_unknown_layout() {
        let err = read_series("when,how_much\n2026-03-01,1\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("unrecognised CSV layout"));
    }

    #[test]
    fn written_series_read_back() {
        let series = vec![AthleteSeries::new(
            "Malo Gusto",
            vec![
                Sample::new(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(), 0.125),
                Sample::new(NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(), -0.5),
            ],
        )];
        let mut buffer = Vec::new();
        write_series(&mut buffer, &series).unwrap();
        let (read_back, _) = read_series(buffer.as_slice()).unwrap();
        assert_eq!(read_back, series);
    }

    #[test]
    fn written_scores_keep_full_precision_near_threshold() {
        let start = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let values = [0.123456, -0.40004, -0.39996, 0.2, 0.3];
        let samples = values
            .iter()
            .enumerate()
            .map(|(offset, &value)| Sample::new(start + chrono::Duration::days(offset as i64), value))
            .collect();
        let series = vec![AthleteSeries::new("Levi Colwill", samples)];

        let mut buffer = Vec::new();
        write_series(&mut buffer, &series).unwrap();
        let (read_back, _) = read_series(buffer.as_slice()).unwrap();
        assert_eq!(read_back, series);

        let before = crate::readiness::estimate(&series[0], -0.4, None, 7);
        let after = crate::readiness::estimate(&read_back[0], -0.4, None, 7);
        assert_eq!(before.risk_days, 1);
        assert_eq!(after.risk_days, 1);
        assert!((before.score - after.score).abs() < 1e-12);
        assert_eq!(before.status, after.status);
    }
}
