use anyhow::{anyhow, bail, Result};
use chrono::Datelike;
use serde::{Deserialize, Deserializer};
use std::{fmt, str::FromStr};

/// A calendar year-month selecting one monthly treasury rates file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            bail!("month {} out of range in period {}{:02}", month, year, month);
        }
        if !(1000..=9999).contains(&year) {
            bail!("year {} is not four digits", year);
        }
        Ok(Self { year, month })
    }

    /// Constructor for constants; out-of-range values fail const evaluation.
    pub(crate) const fn fixed(year: i32, month: u32) -> Self {
        assert!(month >= 1 && month <= 12);
        assert!(year >= 1000 && year <= 9999);
        Self { year, month }
    }

    /// The period containing `date`.
    pub fn containing<D: Datelike>(date: &D) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}{:02}", self.year, self.month)
    }
}

/// Parses the `YYYYMM` form used in the treasury query string.
impl FromStr for Period {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.len() != 6 || !s.chars().all(|c| c.is_ascii_digit()) {
            return Err(anyhow!("period {:?} is not in YYYYMM form", s));
        }
        let year: i32 = s[0..4].parse()?;
        let month: u32 = s[4..6].parse()?;
        Period::new(year, month)
    }
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // YAML may hand us 200608 as an integer or "200608" as a string
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(u32),
            Str(String),
        }
        let raw = Raw::deserialize(deserializer)?;
        let text = match raw {
            Raw::Int(n) => n.to_string(),
            Raw::Str(s) => s,
        };
        text.parse().map_err(serde::de::Error::custom)
    }
}
