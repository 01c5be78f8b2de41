use serde::Serialize;

use crate::stats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    HighRisk,
    ModerateRisk,
    Optimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    AcuteFatigue,
    Inconsistent,
    CumulativeFatigue,
    Declining,
    Unstable,
    General,
    Improving,
    Excellent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecoveryMetrics {
    pub below_threshold: usize,
    pub recent_avg: f64,
    pub recent_min: f64,
    pub trend: f64,
    pub variability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecoveryAssessment {
    pub level: RiskLevel,
    pub scenario: Scenario,
    pub metrics: RecoveryMetrics,
}

impl RecoveryAssessment {
    pub fn title(&self) -> &'static str {
        match self.level {
            RiskLevel::HighRisk => "High Risk: Recovery Intervention Needed",
            RiskLevel::ModerateRisk => "Moderate Risk: Modified Training Recommended",
            RiskLevel::Optimal => "Optimal: Continue Current Program",
        }
    }

    pub fn advice(&self) -> &'static [&'static str] {
        use RiskLevel::*;
        use Scenario::*;

        match (self.level, self.scenario) {
            (HighRisk, AcuteFatigue) => &[
                "Immediate 48-hour recovery protocol (passive recovery)",
                "Reduce training load by 50-60%, focus on technique over intensity",
                "Implement contrast therapy (3:1 cold:hot) and compression therapy",
                "Schedule assessment with medical staff to rule out underlying issues",
                "Emphasize sleep hygiene: 9+ hours with pre-sleep routine",
                "Increase protein intake to 1.8-2.0g/kg body weight to support recovery",
            ],
            (HighRisk, Inconsistent) => &[
                "Implement 36-hour modified recovery protocol",
                "Reduce intensity by 40%, emphasize steady-state over interval work",
                "Focus on sleep consistency (regular sleep/wake times)",
                "Implement daily recovery monitoring with morning readiness assessment",
                "Schedule physiotherapy for targeted recovery techniques",
                "Adjust nutrition timing: increase pre/post session carbohydrate window",
            ],
            (HighRisk, _) => &[
                "Implement full recovery protocol for 48-72 hours",
                "Reduce training volume by 40-50%, remove high-intensity components",
                "Prioritize sleep quality enhancement and aim for 8-9 hours",
                "Schedule manual therapy session with physiotherapy team",
                "Consider lower-body unloading techniques (pool-based recovery)",
                "Implement detailed recovery diary with 3x daily monitoring",
            ],
            (ModerateRisk, Declining) => &[
                "Reduce training volume by 20-30% for next 2-3 sessions",
                "Implement recovery-focused day between high-intensity sessions",
                "Increase emphasis on tissue preparation (targeted mobility work)",
                "Adjust carbohydrate intake timing around training sessions",
                "Focus on quality sleep (8+ hours) with 30-min pre-sleep routine",
                "Monitor morning HRV and subjective readiness scores",
            ],
            (ModerateRisk, Unstable) => &[
                "Modify training intensity by 15-25% based on daily readiness",
                "Implement structured recovery protocols between sessions",
                "Focus on nutrition consistency and hydration timing",
                "Incorporate targeted mobility work for primary muscle groups",
                "Establish consistent sleep/wake cycle with 7.5-8.5 hours of sleep",
                "Monitor subjective wellness scores daily (fatigue, soreness, mood)",
            ],
            (ModerateRisk, _) => &[
                "Reduce training intensity by 20-25% for next 2 sessions",
                "Increase recovery time between high-intensity exposures",
                "Emphasize nutrition timing and 30-30-30 macronutrient distribution",
                "Prioritize sleep quality improvements and consistent timing",
                "Implement specific mobility protocols pre/post training",
                "Monitor symptoms closely during next training block",
            ],
            (Optimal, Improving) => &[
                "Maintain current training load with option to progress 5-10%",
                "Continue proactive recovery protocols between sessions",
                "Focus on nutrition quality and timing for performance",
                "Maintain consistent sleep hygiene practices",
                "Consider additional technical development during good recovery periods",
                "Document effective recovery strategies in player profile",
            ],
            (Optimal, Excellent) => &[
                "Opportunity to introduce progressive overload (10-15%)",
                "Maintain recovery protocols with focus on proactive strategies",
                "Consider introducing new training stimuli during this window",
                "Optimize nutrition for performance and adaptation",
                "Maintain sleep quality while potentially increasing training volume",
                "Document key performance indicators during optimal recovery phases",
            ],
            (Optimal, _) => &[
                "Maintain current training progression with daily monitoring",
                "Continue consistent recovery routines between sessions",
                "Focus on nutrition quality and fueling for performance",
                "Maintain sleep consistency and quality (7-9 hours)",
                "Regular monitoring of recovery metrics with weekly review",
                "Prepare for potential increase in training load if recovery sustains",
            ],
        }
    }
}

/// Classify a recent window of scores (usually the last seven days).
pub fn assess(recent: &[f64], risk_threshold: f64) -> RecoveryAssessment {
    let metrics = RecoveryMetrics {
        below_threshold: stats::risk_days(recent, risk_threshold),
        recent_avg: stats::mean(recent).unwrap_or(0.0),
        recent_min: stats::min(recent).unwrap_or(0.0),
        trend: stats::half_split_trend(recent).unwrap_or(0.0),
        variability: stats::std_dev(recent),
    };

    let RecoveryMetrics {
        below_threshold: below,
        recent_avg: avg,
        recent_min: low,
        trend,
        variability,
    } = metrics;

    let (level, scenario) = if below >= 3
        || low < risk_threshold - 0.3
        || (below >= 2 && trend < -0.1)
    {
        let scenario = if low < risk_threshold - 0.4 {
            Scenario::AcuteFatigue
        } else if variability > 0.3 {
            Scenario::Inconsistent
        } else {
            Scenario::CumulativeFatigue
        };
        (RiskLevel::HighRisk, scenario)
    } else if below >= 1 || avg < risk_threshold + 0.15 || (trend < -0.05 && avg < 0.0) {
        let scenario = if trend < -0.1 {
            Scenario::Declining
        } else if variability > 0.2 {
            Scenario::Unstable
        } else {
            Scenario::General
        };
        (RiskLevel::ModerateRisk, scenario)
    } else {
        let scenario = if trend > 0.1 {
            Scenario::Improving
        } else if avg > 0.3 {
            Scenario::Excellent
        } else {
            Scenario::General
        };
        (RiskLevel::Optimal, scenario)
    };

    RecoveryAssessment {
        level,
        scenario,
        metrics,
    }
}

pub const ACUTE_DAYS: usize = 7;
pub const CHRONIC_DAYS: usize = 28;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkloadStatus {
    InsufficientData,
    HighSpike,
    DetrainingRisk,
    OptimalProgression,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkloadAssessment {
    pub status: WorkloadStatus,
    pub acwr: Option<f64>,
    pub week_change: Option<f64>,
}

impl WorkloadAssessment {
    pub fn title(&self) -> &'static str {
        match self.status {
            WorkloadStatus::InsufficientData => "Insufficient Data for Workload Analysis",
            WorkloadStatus::HighSpike => "High Acute:Chronic Workload Ratio",
            WorkloadStatus::DetrainingRisk => "Low Acute:Chronic Workload Ratio",
            WorkloadStatus::OptimalProgression => "Balanced Workload Progression",
        }
    }

    pub fn advice(&self) -> &'static [&'static str] {
        match self.status {
            WorkloadStatus::InsufficientData => &[
                "Continue collecting daily recovery data",
                "Use RPE and training load metrics to supplement recovery data",
                "Focus on establishing baseline recovery patterns",
            ],
            WorkloadStatus::HighSpike => &[
                "Reduce training load by 15-20% for next 3-5 days",
                "Implement 'acute recovery' protocol to manage spike",
                "Increase recovery monitoring frequency to twice daily",
                "Gradually return to normal loading with max 5-10% increases",
                "Review training design to avoid future load spikes",
            ],
            WorkloadStatus::DetrainingRisk => &[
                "Progressively increase load by 5-10% per session",
                "Focus on maintaining neuromuscular readiness with activation work",
                "Implement progressive loading strategy over next 7-10 days",
                "Monitor tissue resilience during load increase phase",
                "Emphasize quality movement patterns during rebuilding phase",
            ],
            WorkloadStatus::OptimalProgression => &[
                "Maintain current loading strategy with consistent progression",
                "Continue with planned periodization model",
                "Monitor for early signs of fatigue accumulation",
                "Focus on optimizing recovery between training stimuli",
                "Document effective loading patterns for future reference",
            ],
        }
    }
}

/// Acute (7-day) against chronic (28-day) mean of the full history, oldest first.
pub fn workload(history: &[f64]) -> WorkloadAssessment {
    if history.len() < CHRONIC_DAYS {
        return WorkloadAssessment {
            status: WorkloadStatus::InsufficientData,
            acwr: None,
            week_change: None,
        };
    }

    let len = history.len();
    let acute = stats::mean(&history[len - ACUTE_DAYS..]).unwrap_or(0.0);
    let chronic = stats::mean(&history[len - CHRONIC_DAYS..]).unwrap_or(0.0);
    let acwr = if chronic != 0.0 { acute / chronic } else { 1.0 };
    let previous_week = stats::mean(&history[len - 2 * ACUTE_DAYS..len - ACUTE_DAYS]).unwrap_or(0.0);

    let status = if acwr > 1.5 {
        WorkloadStatus::HighSpike
    } else if acwr < 0.8 {
        WorkloadStatus::DetrainingRisk
    } else {
        WorkloadStatus::OptimalProgression
    };

    WorkloadAssessment {
        status,
        acwr: Some(acwr),
        week_change: Some(acute - previous_week),
    }
}
