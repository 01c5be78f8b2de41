use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use squad_readiness::config::Settings;
use squad_readiness::ingest;
use squad_readiness::models::{ReadinessRecord, Role, SquadPlan, Status};
use squad_readiness::readiness;
use squad_readiness::squad::{self, Quota};
use squad_readiness::synth;

fn record(id: &str, role: Option<Role>, score: f64) -> ReadinessRecord {
    ReadinessRecord {
        athlete_id: id.to_string(),
        role,
        score,
        status: Status::from_score(score),
        latest: None,
        recent_avg: None,
        trend: 0.0,
        variability: None,
        risk_days: 0,
        samples_used: 7,
    }
}

fn random_records(rng: &mut StdRng, count: usize) -> Vec<ReadinessRecord> {
    (0..count)
        .map(|index| {
            let role = match rng.gen_range(0..5) {
                0 => None,
                n => Some(Role::ALL[n - 1]),
            };
            // Coarse scores so ties actually happen.
            let score = rng.gen_range(0..=20) as f64 * 5.0;
            let mut record = record(&format!("athlete-{index:02}"), role, score);
            if rng.gen_bool(0.1) {
                record.status = Status::Unknown;
                record.score = 0.0;
            }
            record
        })
        .collect()
}

fn sorted_ids(records: &[ReadinessRecord]) -> Vec<String> {
    let mut ids: Vec<String> = records.iter().map(|r| r.athlete_id.clone()).collect();
    ids.sort();
    ids
}

fn assert_partition(plan: &SquadPlan, records: &[ReadinessRecord]) {
    assert_eq!(plan.len(), records.len());
    let mut seen = HashSet::new();
    for record in plan
        .starting
        .iter()
        .chain(plan.bench.iter())
        .chain(plan.excluded.iter())
    {
        assert!(seen.insert(record.athlete_id.clone()), "duplicate {}", record.athlete_id);
    }
    assert_eq!(seen.len(), records.len());
}

#[test]
fn quota_scenario_from_squad_planning() {
    let quota = Quota::new(vec![(Role::Goalkeeper, 1), (Role::Defender, 2)]).unwrap();
    let records = vec![
        record("gk", Some(Role::Goalkeeper), 90.0),
        record("def-80", Some(Role::Defender), 80.0),
        record("def-70", Some(Role::Defender), 70.0),
        record("def-60", Some(Role::Defender), 60.0),
    ];

    let plan = squad::allocate(&records, &quota, 1);
    let scores: Vec<f64> = plan.starting.iter().map(|r| r.score).collect();
    assert_eq!(scores, vec![90.0, 80.0, 70.0]);
    assert_eq!(plan.bench.len(), 1);
    assert_eq!(plan.bench[0].athlete_id, "def-60");
}

#[test]
fn allocation_is_a_partition_for_random_squads() {
    let mut rng = StdRng::seed_from_u64(11);
    let quota = Quota::standard();
    for _ in 0..50 {
        let count = rng.gen_range(0..40);
        let records = random_records(&mut rng, count);
        let plan = squad::allocate(&records, &quota, 7);

        assert_partition(&plan, &records);
        assert!(plan.starting.len() <= quota.target());
        assert!(plan.bench.len() <= 7);
        assert!(plan
            .starting
            .iter()
            .chain(plan.bench.iter())
            .all(|r| r.status.is_available() && r.role.is_some()));
    }
}

#[test]
fn allocation_ignores_input_order() {
    let mut rng = StdRng::seed_from_u64(29);
    let quota = Quota::standard();
    for _ in 0..25 {
        let records = random_records(&mut rng, 30);
        let expected = squad::allocate(&records, &quota, 7);

        let mut shuffled = records.clone();
        shuffled.shuffle(&mut rng);
        let plan = squad::allocate(&shuffled, &quota, 7);

        assert_eq!(sorted_ids(&plan.starting), sorted_ids(&expected.starting));
        assert_eq!(sorted_ids(&plan.bench), sorted_ids(&expected.bench));
        assert_eq!(sorted_ids(&plan.excluded), sorted_ids(&expected.excluded));
    }
}

#[test]
fn quotas_are_met_when_supply_allows() {
    let mut rng = StdRng::seed_from_u64(5);
    let quota = Quota::standard();
    for _ in 0..25 {
        let records = random_records(&mut rng, 40);
        let plan = squad::allocate(&records, &quota, 7);

        for (role, required) in quota.iter() {
            let supply = records
                .iter()
                .filter(|r| r.role == Some(role) && squad::is_selectable(r, &quota))
                .count();
            let started = plan.starting.iter().filter(|r| r.role == Some(role)).count();
            if supply >= required {
                assert!(started >= required, "{role}: {started} of {required}");
            } else {
                assert_eq!(started, supply);
            }
        }
    }
}

#[test]
fn ample_supply_fills_every_quota_exactly() {
    let mut rng = StdRng::seed_from_u64(17);
    let quota = Quota::standard();
    let depth = [
        (Role::Goalkeeper, 3),
        (Role::Defender, 6),
        (Role::Midfielder, 5),
        (Role::Forward, 5),
    ];
    for _ in 0..25 {
        let mut records = Vec::new();
        for (role, count) in depth {
            for index in 0..count {
                let score = rng.gen_range(10..=20) as f64 * 5.0;
                records.push(record(&format!("{}-{index}", role.code()), Some(role), score));
            }
        }
        records.shuffle(&mut rng);
        let plan = squad::allocate(&records, &quota, 7);

        assert_eq!(plan.starting.len(), quota.target());
        for (role, required) in quota.iter() {
            let started = plan.starting.iter().filter(|r| r.role == Some(role)).count();
            assert_eq!(started, required, "{role}");
        }
        assert_partition(&plan, &records);
    }
}

#[test]
fn synthetic_squad_flows_through_csv_into_a_lineup() {
    let end = NaiveDate::from_ymd_opt(2026, 5, 17).unwrap();
    let generated = synth::generate(20, 60, end, 42);

    let mut buffer = Vec::new();
    ingest::write_series(&mut buffer, &generated).unwrap();
    let (series, stats) = ingest::read_series(buffer.as_slice()).unwrap();
    assert_eq!(series.len(), 20);
    assert_eq!(stats.kept, 20 * 60);

    let settings = Settings::default();
    let records =
        readiness::estimate_all(&series, &settings.roster, settings.risk_threshold, settings.window);
    assert!(records.iter().all(|r| (0.0..=100.0).contains(&r.score)));
    assert!(records.iter().all(|r| r.status != Status::Unknown));

    let plan = squad::allocate(&records, &settings.quota, settings.bench_capacity);
    assert_partition(&plan, &records);
    assert!(plan.starting.len() <= 11);
}

#[test]
fn athletes_without_a_role_are_never_selected() {
    let roster: BTreeMap<String, Role> = BTreeMap::new();
    let end = NaiveDate::from_ymd_opt(2026, 5, 17).unwrap();
    let series = synth::generate(6, 14, end, 3);

    let records = readiness::estimate_all(&series, &roster, -0.4, 7);
    let plan = squad::allocate(&records, &Quota::standard(), 7);
    assert!(plan.starting.is_empty());
    assert!(plan.bench.is_empty());
    assert_eq!(plan.excluded.len(), 6);
}
