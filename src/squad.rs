use std::cmp::Ordering;

use thiserror::Error;
use tracing::debug;

use crate::models::{ReadinessRecord, Role, SquadPlan, SquadSummary, Status};

pub const DEFAULT_BENCH_CAPACITY: usize = 7;

const TREND_SIGNAL: f64 = 0.05;

#[derive(Debug, Error, PartialEq)]
pub enum QuotaError {
    #[error("role {0} appears more than once in the quota")]
    DuplicateRole(Role),

    #[error("quota must require at least one starter")]
    Empty,
}

/// Required starters per role. Iteration order is the order roles are filled in.
#[derive(Debug, Clone, PartialEq)]
pub struct Quota {
    slots: Vec<(Role, usize)>,
}

impl Quota {
    pub fn new(slots: Vec<(Role, usize)>) -> Result<Self, QuotaError> {
        for (index, (role, _)) in slots.iter().enumerate() {
            if slots[..index].iter().any(|(seen, _)| seen == role) {
                return Err(QuotaError::DuplicateRole(*role));
            }
        }
        let quota = Self { slots };
        if quota.target() == 0 {
            return Err(QuotaError::Empty);
        }
        Ok(quota)
    }

    /// 1-4-3-3.
    pub fn standard() -> Self {
        Self {
            slots: vec![
                (Role::Goalkeeper, 1),
                (Role::Defender, 4),
                (Role::Midfielder, 3),
                (Role::Forward, 3),
            ],
        }
    }

    pub fn target(&self) -> usize {
        self.slots.iter().map(|(_, count)| count).sum()
    }

    pub fn get(&self, role: Role) -> Option<usize> {
        self.slots
            .iter()
            .find(|(candidate, _)| *candidate == role)
            .map(|(_, count)| *count)
    }

    pub fn contains(&self, role: Role) -> bool {
        self.get(role).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Role, usize)> + '_ {
        self.slots.iter().copied()
    }
}

impl Default for Quota {
    fn default() -> Self {
        Self::standard()
    }
}

pub fn is_selectable(record: &ReadinessRecord, quota: &Quota) -> bool {
    record.status.is_available() && record.role.is_some_and(|role| quota.contains(role))
}

/// Score descending, athlete id ascending.
fn by_fitness(a: &ReadinessRecord, b: &ReadinessRecord) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.athlete_id.cmp(&b.athlete_id))
}

fn by_team_sheet(a: &ReadinessRecord, b: &ReadinessRecord) -> Ordering {
    let order = |record: &ReadinessRecord| record.role.map_or(u8::MAX, Role::sort_order);
    order(a).cmp(&order(b)).then_with(|| by_fitness(a, b))
}

/// Split records into starting, bench and excluded.
///
/// Quotas are filled role by role first; any shortfall is backfilled from the best
/// remaining selectable athletes regardless of role. The bench takes the next best
/// up to `bench_capacity`.
pub fn allocate(records: &[ReadinessRecord], quota: &Quota, bench_capacity: usize) -> SquadPlan {
    let (mut pool, mut excluded): (Vec<ReadinessRecord>, Vec<ReadinessRecord>) = records
        .iter()
        .cloned()
        .partition(|record| is_selectable(record, quota));
    pool.sort_by(by_fitness);

    let mut starting = Vec::with_capacity(quota.target());
    for (role, count) in quota.iter() {
        let mut taken = 0;
        let mut index = 0;
        while taken < count && index < pool.len() {
            if pool[index].role == Some(role) {
                starting.push(pool.remove(index));
                taken += 1;
            } else {
                index += 1;
            }
        }
        if taken < count {
            debug!(role = %role, required = count, available = taken, "quota short");
        }
    }

    let backfill = quota.target().saturating_sub(starting.len()).min(pool.len());
    starting.extend(pool.drain(..backfill));

    let bench_size = bench_capacity.min(pool.len());
    let mut bench: Vec<ReadinessRecord> = pool.drain(..bench_size).collect();

    excluded.append(&mut pool);

    starting.sort_by(by_team_sheet);
    bench.sort_by(by_fitness);
    excluded.sort_by(by_fitness);

    SquadPlan {
        starting,
        bench,
        excluded,
    }
}

/// Bench coverage is reported for every position, whether or not the quota asks for it.
pub fn summarize(plan: &SquadPlan) -> SquadSummary {
    let bench_coverage = Role::ALL
        .iter()
        .map(|&role| (role, plan.bench.iter().any(|r| r.role == Some(role))))
        .collect();

    let everyone = || {
        plan.starting
            .iter()
            .chain(plan.bench.iter())
            .chain(plan.excluded.iter())
    };
    let assessed = || everyone().filter(|r| r.status != Status::Unknown);

    let status_counts = Status::ALL
        .iter()
        .map(|&status| (status, everyone().filter(|r| r.status == status).count()))
        .collect();

    SquadSummary {
        bench_coverage,
        improving: assessed().filter(|r| r.trend > TREND_SIGNAL).count(),
        declining: assessed().filter(|r| r.trend < -TREND_SIGNAL).count(),
        status_counts,
    }
}
