// src/process/mod.rs

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::{debug, info};

use crate::period::Period;

pub mod date_parser;
pub mod table;
pub mod utils;

pub use table::{parse_table, CurveRow, YieldTable, MATURITIES, MATURITY_COUNT};

/// Latest-day curves gathered across periods.
#[derive(Clone, Debug, Default)]
pub struct CurveSet {
    rows: Vec<CurveRow>,
}

impl CurveSet {
    pub fn push(&mut self, row: CurveRow) {
        self.rows.push(row);
    }

    /// Stable ascending sort by date.
    pub fn sort_by_date(&mut self) {
        self.rows.sort_by_key(|r| r.date);
    }

    pub fn rows(&self) -> &[CurveRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// First row for each distinct date, in the set's current order.
    pub fn by_date(&self) -> Vec<&CurveRow> {
        let mut seen: Vec<NaiveDate> = Vec::new();
        self.rows
            .iter()
            .filter(|r| {
                if seen.contains(&r.date) {
                    false
                } else {
                    seen.push(r.date);
                    true
                }
            })
            .collect()
    }
}

/// Pick the latest-dated curve out of one period's response.
///
/// Missing or blank text and tables without rows yield `Ok(None)`; a
/// malformed document is an error.
pub fn extract_latest(period: Period, text: Option<&str>) -> Result<Option<CurveRow>> {
    let text = match text {
        Some(t) if !t.trim().is_empty() => t,
        _ => {
            info!(%period, "No response text for period, skipping");
            return Ok(None);
        }
    };

    let table = parse_table(text).with_context(|| format!("parsing CSV for {}", period))?;
    match table.latest() {
        Some(row) => {
            debug!(%period, date = %row.date, rows = table.len(), "selected latest curve");
            Ok(Some(row.clone()))
        }
        None => {
            info!(%period, "Failed to download data for period");
            Ok(None)
        }
    }
}

/// Fold every period's response into one date-sorted [`CurveSet`].
pub fn combine<S: AsRef<str>>(responses: &[(Period, Option<S>)]) -> Result<CurveSet> {
    let mut curves = CurveSet::default();
    for (period, text) in responses {
        if let Some(row) = extract_latest(*period, text.as_ref().map(|s| s.as_ref()))? {
            curves.push(row);
        }
    }
    curves.sort_by_date();
    info!(curves = curves.len(), periods = responses.len(), "combined curves");
    Ok(curves)
}
