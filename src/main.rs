use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use tracing::info;

use squad_readiness::config::{self, Settings};
use squad_readiness::models::{AthleteSeries, ReadinessRecord};
use squad_readiness::trends::{self, Period};
use squad_readiness::{ingest, readiness, recovery, report, squad, synth};

#[derive(Parser)]
#[command(name = "squad-readiness")]
#[command(about = "Matchday readiness scoring and lineup selection from daily recovery scores", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct DataArgs {
    /// Recovery data CSV
    #[arg(long)]
    csv: PathBuf,
    /// Squad settings TOML (built-in defaults when omitted)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Override the configured risk threshold
    #[arg(long, allow_hyphen_values = true)]
    risk_threshold: Option<f64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the default squad settings file
    InitConfig {
        #[arg(long, default_value = "squad.toml")]
        out: PathBuf,
    },
    /// Generate synthetic recovery data
    Seed {
        #[arg(long, default_value = "recovery.csv")]
        out: PathBuf,
        #[arg(long, default_value_t = 20)]
        players: usize,
        #[arg(long, default_value_t = 90)]
        days: usize,
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
    /// Score readiness for every athlete
    Score {
        #[command(flatten)]
        data: DataArgs,
        #[arg(long, default_value_t = 30)]
        limit: usize,
    },
    /// Recommend a starting lineup and bench
    Lineup {
        #[command(flatten)]
        data: DataArgs,
        /// Also write the plan as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// Recovery detail for one athlete
    Player {
        #[command(flatten)]
        data: DataArgs,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "30")]
        period: Period,
        #[arg(long, default_value_t = 7)]
        rolling_window: usize,
    },
    /// Generate a markdown lineup report
    Report {
        #[command(flatten)]
        data: DataArgs,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    init_tracing()?;
    let cli = Cli::parse();

    match cli.command {
        Commands::InitConfig { out } => {
            let text = Settings::default()
                .to_toml()
                .context("failed to serialise default settings")?;
            std::fs::write(&out, text)?;
            println!("Settings written to {}.", out.display());
        }
        Commands::Seed {
            out,
            players,
            days,
            seed,
        } => {
            let series = synth::generate(players, days, Utc::now().date_naive(), seed);
            let file = std::fs::File::create(&out)
                .with_context(|| format!("failed to create {}", out.display()))?;
            ingest::write_series(file, &series)?;
            println!(
                "Wrote {days} days for {} athletes to {}.",
                series.len(),
                out.display()
            );
        }
        Commands::Score { data, limit } => {
            let (settings, series) = load(&data)?;
            let mut records = score(&series, &settings);
            records.sort_by(|a, b| b.score.total_cmp(&a.score));

            if records.is_empty() {
                println!("No athletes found in this dataset.");
                return Ok(());
            }

            println!("Athletes by readiness:");
            for record in records.iter().take(limit) {
                println!(
                    "- {} ({}) score {:.1} [{}] {}, trend {:+.2}, risk days {}",
                    record.athlete_id,
                    record.role.map_or("N/A", |role| role.code()),
                    record.score,
                    record.status,
                    record.recommendation(),
                    record.trend,
                    record.risk_days
                );
            }
        }
        Commands::Lineup { data, json } => {
            let (settings, series) = load(&data)?;
            let records = score(&series, &settings);
            let plan = squad::allocate(&records, &settings.quota, settings.bench_capacity);
            let summary = squad::summarize(&plan);

            println!(
                "Starting lineup ({}/{}):",
                plan.starting.len(),
                settings.quota.target()
            );
            for record in &plan.starting {
                println!(
                    "- {} {} {:.1} [{}]",
                    record.role.map_or("N/A", |role| role.code()),
                    record.athlete_id,
                    record.score,
                    record.status
                );
            }
            println!("Bench ({}/{}):", plan.bench.len(), settings.bench_capacity);
            for record in &plan.bench {
                println!(
                    "- {} {} {:.1} [{}] max {} min",
                    record.role.map_or("N/A", |role| role.code()),
                    record.athlete_id,
                    record.score,
                    record.status,
                    record.max_minutes()
                );
            }
            println!("Unavailable: {}", plan.excluded.len());
            for record in &plan.excluded {
                println!(
                    "- {} {:.1}: {}",
                    record.athlete_id,
                    record.score,
                    report::exclusion_reason(record, &settings)
                );
            }
            println!(
                "{} improving, {} declining.",
                summary.improving, summary.declining
            );

            if let Some(path) = json {
                let body = serde_json::to_string_pretty(&plan)?;
                std::fs::write(&path, body)?;
                println!("Plan written to {}.", path.display());
            }
        }
        Commands::Player {
            data,
            name,
            period,
            rolling_window,
        } => {
            let (settings, series) = load(&data)?;
            let athlete = series
                .iter()
                .find(|athlete| athlete.athlete_id == name)
                .with_context(|| format!("no data for athlete `{name}`"))?;
            print_player(athlete, &settings, period, rolling_window);
        }
        Commands::Report { data, out } => {
            let (settings, series) = load(&data)?;
            let records = score(&series, &settings);
            let plan = squad::allocate(&records, &settings.quota, settings.bench_capacity);
            let body = report::build_report(&plan, &settings, Utc::now().date_naive());
            std::fs::write(&out, body)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}

fn load(data: &DataArgs) -> anyhow::Result<(Settings, Vec<AthleteSeries>)> {
    let settings = load_settings(data.config.as_deref(), data.risk_threshold)?;
    let series = ingest::load_csv(&data.csv)?;
    Ok((settings, series))
}

fn load_settings(path: Option<&Path>, risk_threshold: Option<f64>) -> anyhow::Result<Settings> {
    let settings = match path {
        Some(path) => config::load(path)?,
        None => Settings::default(),
    };
    let settings = match risk_threshold {
        Some(value) => settings.with_risk_threshold(value)?,
        None => settings,
    };
    info!(
        risk_threshold = settings.risk_threshold,
        window = settings.window,
        roster = settings.roster.len(),
        "settings loaded"
    );
    Ok(settings)
}

fn score(series: &[AthleteSeries], settings: &Settings) -> Vec<ReadinessRecord> {
    readiness::estimate_all(
        series,
        &settings.roster,
        settings.risk_threshold,
        settings.window,
    )
}

fn print_player(athlete: &AthleteSeries, settings: &Settings, period: Period, rolling_window: usize) {
    let filtered = trends::filter_period(&athlete.samples, period);
    let overview = trends::overview(&filtered, settings.risk_threshold);
    let role = settings.roster.get(&athlete.athlete_id).copied();
    let record = readiness::estimate(athlete, settings.risk_threshold, role, settings.window);

    println!("{} ({})", athlete.athlete_id, role.map_or("N/A", |r| r.code()));
    println!(
        "Days: {}  Average: {}  Latest: {}  Risk: {:.1}% ({} days below {:.2})",
        overview.total_days,
        overview.average.map_or("-".to_string(), |v| format!("{v:.2}")),
        overview.latest.map_or("-".to_string(), |v| format!("{v:.2}")),
        overview.risk_pct,
        overview.days_below_threshold,
        settings.risk_threshold
    );
    if let (Some(recent), Some(direction)) = (overview.recent_avg, overview.recent_direction) {
        println!(
            "Recent avg ({}d): {recent:.2} {}",
            overview.recent_days,
            direction.marker()
        );
    }
    println!(
        "Readiness {:.1} [{}] {} (max {} min)",
        record.score,
        record.status,
        record.recommendation(),
        record.max_minutes()
    );

    if let Some(insights) = trends::insights(&filtered) {
        println!();
        println!(
            "Best day: {} ({:.2})",
            insights.best_day.0.format("%a, %d %b"),
            insights.best_day.1
        );
        println!(
            "Worst day: {} ({:.2})",
            insights.worst_day.0.format("%a, %d %b"),
            insights.worst_day.1
        );
        println!(
            "Recent trend: {} (last {}d vs period avg: {:+.2})",
            insights.momentum.label(),
            insights.recent_days,
            insights.recent_shift
        );
        println!(
            "Consistency: {} (std dev: {:.2})",
            insights.consistency.label(),
            insights.std
        );
    }

    let values: Vec<f64> = filtered.iter().filter_map(|s| s.value()).collect();
    let recent = &values[values.len().saturating_sub(readiness::DEFAULT_WINDOW)..];
    let assessment = recovery::assess(recent, settings.risk_threshold);
    println!();
    println!("{}", assessment.title());
    for line in assessment.advice() {
        println!("- {line}");
    }

    let workload = recovery::workload(&athlete.valid_values());
    println!();
    match workload.acwr {
        Some(acwr) => println!(
            "{} (ACWR {:.2}, week change {:+.2})",
            workload.title(),
            acwr,
            workload.week_change.unwrap_or(0.0)
        ),
        None => println!("{}", workload.title()),
    }
    for line in workload.advice() {
        println!("- {line}");
    }

    let rolling = trends::rolling_average(&values, rolling_window);
    if let Some(latest) = rolling.last() {
        println!();
        println!("{rolling_window}-day rolling average: {latest:.2}");
    }

    println!();
    println!("Weekly summary:");
    for week in trends::weekly_summary(&filtered, settings.risk_threshold) {
        println!(
            "- week ending {}: mean {:.2} (min {:.2}, max {:.2}, sd {:.2}), {} risk of {} days ({:.0}%)",
            week.week_ending,
            week.mean,
            week.min,
            week.max,
            week.std,
            week.risk_days,
            week.days_in_week,
            week.risk_pct
        );
    }
}

fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("squad_readiness=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
