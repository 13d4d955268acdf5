// src/fetch/urls.rs
use anyhow::{Context, Result};
use url::Url;

use crate::period::Period;

const YIELD_CURVE_TYPE: &str = "daily_treasury_yield_curve";

/// Build the monthly CSV URL for `period` under `base`.
///
/// `base` is the `.../daily-treasury-rates.csv/all` endpoint; the period is
/// appended as a path segment and repeated in the month filter.
pub fn period_url(base: &str, period: Period) -> Result<Url> {
    let code = period.to_string();
    let mut url = Url::parse(&format!("{}/{}", base.trim_end_matches('/'), code))
        .with_context(|| format!("building URL for {} from {}", code, base))?;
    url.query_pairs_mut()
        .append_pair("field_tdr_date_value_month", &code)
        .append_pair("type", YIELD_CURVE_TYPE)
        .append_key_only("page")
        .append_pair("_format", "csv");
    Ok(url)
}

/// URLs for every period, in the same order.
pub fn period_urls(base: &str, periods: &[Period]) -> Result<Vec<Url>> {
    periods.iter().map(|&p| period_url(base, p)).collect()
}
