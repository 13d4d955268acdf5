use anyhow::Result;
use chrono::Local;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};
use treasury_curves::{
    chart, chart_or_report, collect_curves,
    config::{Config, DEFAULT_CONFIG_FILE},
    fetch::Fetcher,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    // stderr, so the chart has the terminal's stdout to itself
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();
    info!("startup");

    // failures are reported, never turned into an exit code
    if let Err(e) = run().await {
        error!("run failed: {:#}", e);
    }
    Ok(())
}

async fn run() -> Result<()> {
    // ─── 2) configure ────────────────────────────────────────────────
    let config = Config::load_or_default(DEFAULT_CONFIG_FILE)?;
    let periods = config.periods(&Local::now());
    let fetcher = Fetcher::new(&config.fetch)?;

    // ─── 3) fetch & select latest curves ─────────────────────────────
    let curves = collect_curves(&fetcher, &config.fetch.base_url, &periods).await?;

    // ─── 4) plot ─────────────────────────────────────────────────────
    if let Some(plot) = chart_or_report(&curves) {
        info!(curves = plot.series.len(), "showing chart");
        chart::show(&plot)?;
    }

    info!("all done");
    Ok(())
}
