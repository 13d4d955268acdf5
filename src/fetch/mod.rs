// src/fetch/mod.rs

use anyhow::{Context, Result};
use futures::future::join_all;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use crate::config::FetchConfig;

pub mod urls;

pub use urls::{period_url, period_urls};

/// HTTP client that retries timed-out requests a bounded number of times.
#[derive(Clone, Debug)]
pub struct Fetcher {
    client: Client,
    max_retries: u32,
}

impl Fetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        Self::with_timeout(config.timeout(), config.max_retries)
    }

    pub fn with_timeout(timeout: Duration, max_retries: u32) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("building HTTP client")?;
        Ok(Self {
            client,
            max_retries,
        })
    }

    async fn get_text(&self, url: &Url) -> reqwest::Result<String> {
        self.client
            .get(url.clone())
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }

    /// GET `url` and return its body.
    ///
    /// Timeouts are retried up to `max_retries` times; once those run out the
    /// result is `Ok(None)`. Every other failure is returned as an error.
    #[instrument(level = "debug", skip(self, url), fields(url = %url))]
    pub async fn fetch(&self, url: &Url) -> Result<Option<String>> {
        let mut retries_left = self.max_retries;
        loop {
            match self.get_text(url).await {
                Ok(text) => {
                    debug!(bytes = text.len(), "fetched");
                    return Ok(Some(text));
                }
                Err(e) if e.is_timeout() => {
                    if retries_left == 0 {
                        error!("Failed to fetch {} after several retries.", url);
                        return Ok(None);
                    }
                    warn!(
                        "Timeout for {}. Retrying... ({} retries left)",
                        url, retries_left
                    );
                    retries_left -= 1;
                }
                Err(e) => return Err(e).with_context(|| format!("GET {} failed", url)),
            }
        }
    }

    /// Fetch every URL concurrently; results come back in input order.
    pub async fn fetch_all(&self, urls: &[Url]) -> Result<Vec<Option<String>>> {
        info!(count = urls.len(), "fetching periods");
        let results = join_all(urls.iter().map(|url| self.fetch(url))).await;
        let bodies = results.into_iter().collect::<Result<Vec<_>>>()?;
        let missing = bodies.iter().filter(|b| b.is_none()).count();
        info!(fetched = bodies.len() - missing, missing, "fetch complete");
        Ok(bodies)
    }
}


#[cfg(test)]
mod tests {
    use super::test_server::{serve, Reply};
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn fast_fetcher(max_retries: u32) -> Fetcher {
        Fetcher::with_timeout(Duration::from_millis(200), max_retries).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_returns_body() {
        let (base, hits) = serve(|_| Reply::Body("Date,1 Mo\n".to_string())).await;
        let url = Url::parse(&format!("{}/all/200608", base)).unwrap();

        let body = fast_fetcher(5).fetch(&url).await.unwrap();

        assert_eq!(body.as_deref(), Some("Date,1 Mo\n"));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_timeout_exhausts_retries_to_none() {
        let (base, hits) = serve(|_| Reply::Stall).await;
        let url = Url::parse(&format!("{}/all/200608", base)).unwrap();

        let body = fast_fetcher(2).fetch(&url).await.unwrap();

        assert!(body.is_none());
        // first attempt plus two retries
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_timeout_then_success() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let seen = attempts.clone();
        let (base, _) = serve(move |_| {
            if seen.fetch_add(1, Ordering::SeqCst) < 2 {
                Reply::Stall
            } else {
                Reply::Body("ok".to_string())
            }
        })
        .await;
        let url = Url::parse(&format!("{}/x", base)).unwrap();

        let body = fast_fetcher(5).fetch(&url).await.unwrap();

        assert_eq!(body.as_deref(), Some("ok"));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_http_error_status_propagates() {
        let (base, hits) = serve(|_| Reply::Status(500)).await;
        let url = Url::parse(&format!("{}/x", base)).unwrap();

        assert!(fast_fetcher(5).fetch(&url).await.is_err());
        // not a timeout, so no retry
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_connection_refused_propagates() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let url = Url::parse(&format!("http://{}/x", addr)).unwrap();

        assert!(fast_fetcher(5).fetch(&url).await.is_err());
    }

    #[tokio::test]
    async fn test_fetch_all_keeps_order_and_absence() {
        let (base, _) = serve(|path| {
            if path.contains("200008") {
                Reply::Stall
            } else if path.contains("201908") {
                Reply::Body("b".to_string())
            } else {
                Reply::Body("a".to_string())
            }
        })
        .await;
        let periods: Vec<_> = ["200608", "200008", "201908"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        let urls = period_urls(&format!("{}/all", base), &periods).unwrap();

        let bodies = fast_fetcher(1).fetch_all(&urls).await.unwrap();

        assert_eq!(
            bodies,
            vec![Some("a".to_string()), None, Some("b".to_string())]
        );
    }
}
