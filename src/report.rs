use std::fmt::Write;

use chrono::NaiveDate;

use crate::config::Settings;
use crate::models::{ReadinessRecord, SquadPlan, Status};
use crate::squad;

fn role_label(record: &ReadinessRecord) -> &'static str {
    record.role.map_or("N/A", |role| role.code())
}

fn trend_marker(trend: f64) -> &'static str {
    if trend > 0.05 {
        "up"
    } else if trend < -0.05 {
        "down"
    } else {
        "flat"
    }
}

/// Why an athlete ended up outside the matchday squad.
pub fn exclusion_reason(record: &ReadinessRecord, settings: &Settings) -> &'static str {
    match (record.status, record.role) {
        (Status::Unknown, _) => "Insufficient Data",
        (_, None) => "No position",
        (_, Some(role)) if !settings.quota.contains(role) => "Position not in quota",
        (Status::Rest, _) => "Rest",
        _ => "Not selected",
    }
}

fn write_record_line(output: &mut String, record: &ReadinessRecord) {
    let _ = writeln!(
        output,
        "- {} ({}) score {:.1} [{}] trend {:+.2} ({}), risk days {}, max {} min",
        record.athlete_id,
        role_label(record),
        record.score,
        record.status,
        record.trend,
        trend_marker(record.trend),
        record.risk_days,
        record.max_minutes()
    );
}

pub fn build_report(plan: &SquadPlan, settings: &Settings, as_of: NaiveDate) -> String {
    let summary = squad::summarize(plan);
    let mut output = String::new();

    let _ = writeln!(output, "# Matchday Readiness Report");
    let _ = writeln!(
        output,
        "Generated {} (risk threshold {:.2}, {}-day window)",
        as_of, settings.risk_threshold, settings.window
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Summary");
    let _ = writeln!(
        output,
        "- {} athletes assessed, {} available ({} starting, {} bench)",
        plan.len(),
        plan.available_count(),
        plan.starting.len(),
        plan.bench.len()
    );
    let _ = writeln!(
        output,
        "- {} improving, {} declining",
        summary.improving, summary.declining
    );
    for (status, count) in &summary.status_counts {
        let _ = writeln!(output, "- {status}: {count}");
    }

    let _ = writeln!(output);
    let _ = writeln!(
        output,
        "## Starting Lineup ({}/{})",
        plan.starting.len(),
        settings.quota.target()
    );
    if plan.starting.is_empty() {
        let _ = writeln!(output, "No athletes available to start.");
    } else {
        for record in &plan.starting {
            write_record_line(&mut output, record);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Bench ({}/{})", plan.bench.len(), settings.bench_capacity);
    if plan.bench.is_empty() {
        let _ = writeln!(output, "No bench options.");
    } else {
        for record in &plan.bench {
            write_record_line(&mut output, record);
        }
        let covered: Vec<String> = summary
            .bench_coverage
            .iter()
            .map(|(role, present)| format!("{role} {}", if *present { "yes" } else { "no" }))
            .collect();
        let _ = writeln!(output, "Bench cover: {}", covered.join(", "));
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Unavailable");
    if plan.excluded.is_empty() {
        let _ = writeln!(output, "Everyone is in the matchday squad.");
    } else {
        for record in &plan.excluded {
            let _ = writeln!(
                output,
                "- {} ({}) score {:.1}: {}",
                record.athlete_id,
                role_label(record),
                record.score,
                exclusion_reason(record, settings)
            );
        }
    }

    output
}
