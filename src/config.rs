use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Role;
use crate::readiness::DEFAULT_WINDOW;
use crate::squad::{Quota, DEFAULT_BENCH_CAPACITY};
use crate::synth::SQUAD;

pub const DEFAULT_RISK_THRESHOLD: f64 = -0.4;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    Validation { field: String, message: String },
}

impl ConfigError {
    fn validation(field: &str, message: impl Into<String>) -> Self {
        ConfigError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// On-disk layout. Role codes stay strings here so bad values surface as validation
/// errors naming the field rather than opaque parse errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SettingsFile {
    #[serde(default = "default_risk_threshold")]
    risk_threshold: f64,
    #[serde(default = "default_window")]
    window: usize,
    #[serde(default = "default_bench_capacity")]
    bench_capacity: usize,
    #[serde(default = "default_quota")]
    quota: Vec<(String, usize)>,
    #[serde(default)]
    roster: BTreeMap<String, String>,
}

fn default_risk_threshold() -> f64 {
    DEFAULT_RISK_THRESHOLD
}

fn default_window() -> usize {
    DEFAULT_WINDOW
}

fn default_bench_capacity() -> usize {
    DEFAULT_BENCH_CAPACITY
}

fn default_quota() -> Vec<(String, usize)> {
    Quota::standard()
        .iter()
        .map(|(role, count)| (role.code().to_string(), count))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub risk_threshold: f64,
    pub window: usize,
    pub bench_capacity: usize,
    pub quota: Quota,
    pub roster: BTreeMap<String, Role>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            risk_threshold: DEFAULT_RISK_THRESHOLD,
            window: DEFAULT_WINDOW,
            bench_capacity: DEFAULT_BENCH_CAPACITY,
            quota: Quota::standard(),
            roster: SQUAD
                .iter()
                .map(|(name, role)| (name.to_string(), *role))
                .collect(),
        }
    }
}

impl Settings {
    /// Parse and validate settings from TOML text. Missing keys take their defaults;
    /// a missing roster table means every athlete is unassigned.
    pub fn from_toml(text: &str, path: &Path) -> Result<Self, ConfigError> {
        let file: SettingsFile = toml::from_str(text).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::try_from(file)
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        let file = SettingsFile {
            risk_threshold: self.risk_threshold,
            window: self.window,
            bench_capacity: self.bench_capacity,
            quota: self
                .quota
                .iter()
                .map(|(role, count)| (role.code().to_string(), count))
                .collect(),
            roster: self
                .roster
                .iter()
                .map(|(name, role)| (name.clone(), role.code().to_string()))
                .collect(),
        };
        toml::to_string_pretty(&file)
    }

    pub fn with_risk_threshold(mut self, risk_threshold: f64) -> Result<Self, ConfigError> {
        validate_threshold(risk_threshold)?;
        self.risk_threshold = risk_threshold;
        Ok(self)
    }
}

fn validate_threshold(value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || !(-1.0..=1.0).contains(&value) {
        return Err(ConfigError::validation(
            "risk_threshold",
            format!("must be within [-1, 1], got {value}"),
        ));
    }
    Ok(())
}

impl TryFrom<SettingsFile> for Settings {
    type Error = ConfigError;

    fn try_from(file: SettingsFile) -> Result<Self, Self::Error> {
        validate_threshold(file.risk_threshold)?;

        if file.window == 0 {
            return Err(ConfigError::validation("window", "must be at least 1"));
        }

        let mut slots = Vec::with_capacity(file.quota.len());
        for (code, count) in &file.quota {
            let role = code
                .parse::<Role>()
                .map_err(|message| ConfigError::validation("quota", message))?;
            slots.push((role, *count));
        }
        let quota =
            Quota::new(slots).map_err(|e| ConfigError::validation("quota", e.to_string()))?;

        let mut roster = BTreeMap::new();
        for (name, code) in file.roster {
            let role = code.parse::<Role>().map_err(|message| {
                ConfigError::validation("roster", format!("{name}: {message}"))
            })?;
            roster.insert(name, role);
        }

        Ok(Settings {
            risk_threshold: file.risk_threshold,
            window: file.window,
            bench_capacity: file.bench_capacity,
            quota,
            roster,
        })
    }
}

pub fn load(path: &Path) -> Result<Settings, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    Settings::from_toml(&text, path)
}
