use std::path::PathBuf;
use std::time::Duration;

use crate::model::Ms;
use crate::occupancy::{UtilizationConfig, UtilizationFormula, WorkDay};

const MINUTE: Ms = 60_000;

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { var: &'static str, value: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Missing(var) => write!(f, "{var} must be set"),
            ConfigError::Invalid { var, value } => write!(f, "invalid value for {var}: {value:?}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Settings for the `chairside` binary, read from `CHAIRSIDE_*` variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub snapshot_path: PathBuf,
    pub clinic: String,
    /// Fixed evaluation instant. Wall clock when unset.
    pub at: Option<Ms>,
    /// Re-read the snapshot file on this interval. One-shot when unset.
    pub refresh: Option<Duration>,
    pub utilization: UtilizationConfig,
    pub work_day: WorkDay,
    pub metrics_port: Option<u16>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let snapshot_path = lookup("CHAIRSIDE_SNAPSHOT")
            .map(PathBuf::from)
            .ok_or(ConfigError::Missing("CHAIRSIDE_SNAPSHOT"))?;
        let clinic = lookup("CHAIRSIDE_CLINIC").unwrap_or_else(|| "default".into());
        let at: Option<Ms> = parse_opt(&lookup, "CHAIRSIDE_AT")?;
        let refresh = parse_opt::<u64>(&lookup, "CHAIRSIDE_REFRESH_SECS")?
            .filter(|&secs| secs > 0)
            .map(Duration::from_secs);

        let slot_ms = minutes_opt(&lookup, "CHAIRSIDE_SLOT_MINUTES")?.unwrap_or(15 * MINUTE);
        let formula: UtilizationFormula =
            parse_opt(&lookup, "CHAIRSIDE_UTILIZATION_FORMULA")?.unwrap_or_default();
        let clamp: bool = parse_opt(&lookup, "CHAIRSIDE_CLAMP_UTILIZATION")?.unwrap_or(true);

        let open_offset_ms = minutes_opt(&lookup, "CHAIRSIDE_DAY_OPEN_MINUTES")?.unwrap_or(8 * 60 * MINUTE);
        let length_ms = minutes_opt(&lookup, "CHAIRSIDE_DAY_LENGTH_MINUTES")?.unwrap_or(8 * 60 * MINUTE);

        let metrics_port: Option<u16> = parse_opt(&lookup, "CHAIRSIDE_METRICS_PORT")?;

        Ok(Self {
            snapshot_path,
            clinic,
            at,
            refresh,
            utilization: UtilizationConfig {
                slot_ms,
                formula,
                clamp,
            },
            work_day: WorkDay {
                open_offset_ms,
                length_ms,
            },
            metrics_port,
        })
    }
}

fn parse_opt<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { var, value }),
    }
}

/// A minute count converted to `Ms`; counts that do not fit are invalid.
fn minutes_opt(lookup: &impl Fn(&str) -> Option<String>, var: &'static str) -> Result<Option<Ms>, ConfigError> {
    let Some(minutes) = parse_opt::<Ms>(lookup, var)? else {
        return Ok(None);
    };
    minutes.checked_mul(MINUTE).map(Some).ok_or_else(|| ConfigError::Invalid {
        var,
        value: minutes.to_string(),
    })
}
