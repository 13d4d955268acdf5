use anyhow::{Context, Result};
use chrono::Datelike;
use serde::Deserialize;
use std::{fs, path::Path, time::Duration};
use tracing::{debug, info};

use crate::period::Period;

/// File picked up from the working directory when it exists.
pub const DEFAULT_CONFIG_FILE: &str = "yieldcurve.yaml";

pub const DEFAULT_BASE_URL: &str =
    "https://home.treasury.gov/resource-center/data-chart-center/interest-rates/daily-treasury-rates.csv/all";

/// Months compared against the current one unless configured otherwise.
pub const DEFAULT_HISTORICAL_PERIODS: [Period; 3] = [
    Period::fixed(2006, 8),
    Period::fixed(2019, 8),
    Period::fixed(2000, 8),
];

/// Settings for a single run.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub fetch: FetchConfig,
    /// Fixed months compared against the current one.
    pub historical_periods: Vec<Period>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct FetchConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 20,
            max_retries: 5,
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fetch: FetchConfig::default(),
            historical_periods: DEFAULT_HISTORICAL_PERIODS.to_vec(),
        }
    }
}

impl Config {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("parsing config yaml")
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        Self::from_yaml_str(&text).with_context(|| format!("loading {}", path.display()))
    }

    /// Loads `path` if it exists, defaults otherwise.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            info!(path = %path.display(), "loading config");
            Self::from_file(path)
        } else {
            debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Current month first, then the historical months in configured order.
    pub fn periods<D: Datelike>(&self, today: &D) -> Vec<Period> {
        std::iter::once(Period::containing(today))
            .chain(self.historical_periods.iter().copied())
            .collect()
    }
}
