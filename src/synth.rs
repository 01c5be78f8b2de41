use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::models::{AthleteSeries, Role, Sample};

pub const SQUAD: &[(&str, Role)] = &[
    ("Robert Sanchez", Role::Goalkeeper),
    ("Filip Jorgensen", Role::Goalkeeper),
    ("Reece James", Role::Defender),
    ("Malo Gusto", Role::Defender),
    ("Wesley Fofana", Role::Defender),
    ("Trevoh Chalobah", Role::Defender),
    ("Levi Colwill", Role::Defender),
    ("Benoit Badiashile", Role::Defender),
    ("Marc Cucurella", Role::Defender),
    ("Josh Acheampong", Role::Defender),
    ("Enzo Fernandez", Role::Midfielder),
    ("Moises Caicedo", Role::Midfielder),
    ("Romeo Lavia", Role::Midfielder),
    ("Kiernan Dewsbury-Hall", Role::Midfielder),
    ("Cole Palmer", Role::Forward),
    ("Noni Madueke", Role::Forward),
    ("Pedro Neto", Role::Forward),
    ("Tyrique George", Role::Forward),
    ("Nicolas Jackson", Role::Forward),
    ("Christopher Nkunku", Role::Forward),
];

/// Regular starters who hold their level a little better when fit.
const KEY_PLAYERS: &[&str] = &[
    "Cole Palmer",
    "Reece James",
    "Enzo Fernandez",
    "Moises Caicedo",
    "Nicolas Jackson",
    "Pedro Neto",
    "Levi Colwill",
    "Malo Gusto",
];

const INJURY_PRONE: &[&str] = &[
    "Romeo Lavia",
    "Wesley Fofana",
    "Reece James",
    "Christopher Nkunku",
    "Benoit Badiashile",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Profile {
    Ready,
    Limited,
    Bench,
    Rest,
}

impl Profile {
    /// (base level range, noise range, match-day dip range, daily recovery range)
    fn ranges(self) -> [(f64, f64); 4] {
        match self {
            Profile::Ready => [(0.25, 0.55), (0.08, 0.20), (0.08, 0.20), (0.08, 0.18)],
            Profile::Limited => [(0.0, 0.25), (0.15, 0.30), (0.15, 0.35), (0.05, 0.15)],
            Profile::Bench => [(-0.15, 0.05), (0.20, 0.35), (0.20, 0.40), (0.04, 0.12)],
            Profile::Rest => [(-0.6, -0.25), (0.20, 0.40), (0.30, 0.55), (0.02, 0.10)],
        }
    }

    /// (number of fatigue spells, severity range)
    fn fatigue(self, rng: &mut StdRng) -> (usize, (f64, f64)) {
        match self {
            Profile::Ready => (rng.gen_range(0..2), (0.15, 0.30)),
            Profile::Limited | Profile::Bench => (rng.gen_range(1..3), (0.25, 0.50)),
            Profile::Rest => (rng.gen_range(2..4), (0.40, 0.70)),
        }
    }
}

fn assign_profiles(count: usize, rng: &mut StdRng) -> Vec<Profile> {
    let ready = count * 65 / 100;
    let limited = count * 15 / 100;
    let bench = count * 15 / 100;
    let mut profiles: Vec<Profile> = (0..count)
        .map(|index| match index {
            i if i < ready => Profile::Ready,
            i if i < ready + limited => Profile::Limited,
            i if i < ready + limited + bench => Profile::Bench,
            _ => Profile::Rest,
        })
        .collect();
    profiles.shuffle(rng);
    profiles
}

fn uniform(rng: &mut StdRng, (low, high): (f64, f64)) -> f64 {
    rng.gen_range(low..high)
}

/// Shift base level and noise for fit key players and unfit injury-prone ones.
fn adjust_levels(name: &str, profile: Profile, base: f64, noise: f64) -> (f64, f64) {
    let (mut base, mut noise) = (base, noise);
    if profile == Profile::Ready && KEY_PLAYERS.contains(&name) {
        base += 0.05;
        noise *= 0.9;
    }
    if profile != Profile::Ready && INJURY_PRONE.contains(&name) {
        base -= 0.1;
        noise += 0.05;
    }
    (base, noise)
}

/// Subtract a spell of reduced recovery that eases off by `easing` over its length.
fn apply_spell(pattern: &mut [f64], start: usize, length: usize, severity: f64, easing: f64) {
    for i in 0..length {
        let Some(value) = pattern.get_mut(start + i) else {
            break;
        };
        let eased = i as f64 / length as f64 * easing;
        *value -= severity * (1.0 - eased);
    }
}

/// Match every seventh day from day five. The three days after a match gain back the
/// recovery accumulated so far, capped at 110% of the dip.
fn apply_matches(pattern: &mut [f64], dip: (f64, f64), recovery: (f64, f64), rng: &mut StdRng) {
    for match_day in (5..pattern.len()).step_by(7) {
        let impact = uniform(rng, dip);
        pattern[match_day] -= impact;
        let speed = uniform(rng, recovery);
        let mut recovered = 0.0;
        for offset in 1..4 {
            let Some(value) = pattern.get_mut(match_day + offset) else {
                break;
            };
            recovered += speed * rng.gen_range(0.8..1.2);
            *value += recovered.min(impact * 1.1);
        }
    }
}

fn simulate(name: &str, profile: Profile, days: usize, rng: &mut StdRng) -> Vec<f64> {
    let [base, noise, dip, recovery] = profile.ranges();
    let base = uniform(rng, base);
    let noise = uniform(rng, noise);
    let (base, noise) = adjust_levels(name, profile, base, noise);

    let baseline: Vec<f64> = (0..days)
        .map(|_| base + rng.gen_range(-noise..noise))
        .collect();
    let mut pattern = vec![0.0; days];

    apply_matches(&mut pattern, dip, recovery, rng);

    let (spells, severity) = profile.fatigue(rng);
    for _ in 0..spells {
        let start = rng.gen_range(0..days.saturating_sub(20).max(1));
        let length = rng.gen_range(3..7);
        let severity = uniform(rng, severity);
        apply_spell(&mut pattern, start, length, severity, 0.8);
    }

    if profile == Profile::Rest || (profile != Profile::Ready && INJURY_PRONE.contains(&name)) {
        let back = rng.gen_range(7..14);
        let length = rng.gen_range(4..7);
        let severity = rng.gen_range(0.4..0.8);
        if let Some(start) = days.checked_sub(back) {
            apply_spell(&mut pattern, start, length, severity, 0.3);
        }
    }

    if profile == Profile::Ready {
        for (i, day) in (0..days).rev().take(10).enumerate() {
            pattern[day] += 0.005 * i as f64;
            let level = baseline[day] + pattern[day];
            if level < 0.15 {
                pattern[day] += 0.15 - level;
            }
        }
    }

    let mut scores: Vec<f64> = baseline
        .iter()
        .zip(&pattern)
        .map(|(level, shift)| (level + shift).clamp(-1.0, 1.0))
        .collect();

    if profile == Profile::Ready {
        for score in scores.iter_mut().rev().take(5) {
            *score = score.max(rng.gen_range(0.2..0.6));
        }
    }

    scores
}

/// Generate `days` of daily scores ending on `end` for up to `players` squad members.
/// The same seed always yields the same data.
pub fn generate(players: usize, days: usize, end: NaiveDate, seed: u64) -> Vec<AthleteSeries> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut names: Vec<&str> = SQUAD.iter().map(|(name, _)| *name).collect();
    names.shuffle(&mut rng);
    names.truncate(players.min(SQUAD.len()));

    let profiles = assign_profiles(names.len(), &mut rng);
    let start = end - Duration::days(days.saturating_sub(1) as i64);

    let mut series: Vec<AthleteSeries> = names
        .into_iter()
        .zip(profiles)
        .map(|(name, profile)| {
            let samples = simulate(name, profile, days, &mut rng)
                .into_iter()
                .enumerate()
                .map(|(offset, score)| Sample::new(start + Duration::days(offset as i64), score))
                .collect();
            AthleteSeries::new(name, samples)
        })
        .collect();

    series.sort_by(|a, b| a.athlete_id.cmp(&b.athlete_id));
    series
}
