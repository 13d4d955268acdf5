//! Compare U.S. Treasury par yield curves across a handful of months.
//!
//! Each month's daily CSV is fetched concurrently, reduced to its latest
//! trading day, and the resulting curves are charted against each other.

use anyhow::Result;
use tracing::info;

pub mod chart;
pub mod config;
pub mod fetch;
pub mod period;
pub mod process;

use chart::CurveChart;
use fetch::Fetcher;
use period::Period;
use process::CurveSet;

/// Fetch every period under `base_url` and combine their latest curves.
pub async fn collect_curves(
    fetcher: &Fetcher,
    base_url: &str,
    periods: &[Period],
) -> Result<CurveSet> {
    let urls = fetch::period_urls(base_url, periods)?;
    for (period, url) in periods.iter().zip(&urls) {
        info!(%period, %url, "queued");
    }
    let bodies = fetcher.fetch_all(&urls).await?;
    let responses: Vec<(Period, Option<String>)> = periods.iter().copied().zip(bodies).collect();
    process::combine(&responses)
}

/// Chart model for `curves`, or `None` after logging that there is nothing to plot.
pub fn chart_or_report(curves: &CurveSet) -> Option<CurveChart> {
    let plot = CurveChart::from_curves(curves);
    if plot.is_none() {
        info!("No data");
    }
    plot
}
