//! Upstream quote fetcher and quote cache.

use crate::cache::TtlCache;
use crate::config::UPSTREAM_TIMEOUT;
use crate::db::Privilege;
use crate::error::ApiError;
use std::time::Duration;
use tracing::debug;

/// Fetches quote payloads from the upstream API, keeping a TTL-bounded
/// cache of uppercased ticker → payload in front of it.
///
/// Concurrent misses for the same ticker are not deduplicated; both
/// requests hit the upstream and the later write-back wins.
#[derive(Debug)]
pub struct QuoteFetcher {
    client: reqwest::Client,
    cache: TtlCache<String, serde_json::Value>,
    base_url: String,
    api_token: String,
}

impl QuoteFetcher {
    /// Creates a fetcher for the given upstream, with the given quote
    /// cache parameters.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn new(
        base_url: &str,
        api_token: &str,
        ttl: Duration,
        capacity: usize,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(UPSTREAM_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            cache: TtlCache::new(ttl, capacity),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token: api_token.to_string(),
        })
    }

    /// Returns the quote payload for `ticker`.
    ///
    /// The ticker is uppercased first. Privileged callers always force
    /// an upstream fetch; everyone else gets the cached payload when a
    /// live entry exists. Every successful fetch is written back to the
    /// cache, resetting its TTL, so a privileged refresh also extends
    /// freshness for non-privileged callers.
    ///
    /// # Errors
    /// Returns [`ApiError::UpstreamFetch`] on network failure, timeout,
    /// non-2xx status, or a non-JSON body; the cache is left untouched.
    pub async fn get_quote(
        &self,
        ticker: &str,
        privilege: Privilege,
    ) -> Result<serde_json::Value, ApiError> {
        let ticker = ticker.to_uppercase();

        if !privilege.is_privileged()
            && let Some(payload) = self.cache.get(&ticker)
        {
            debug!(%ticker, "quote cache hit");
            return Ok(payload);
        }

        let payload = self.fetch(&ticker).await.map_err(|reason| {
            ApiError::UpstreamFetch {
                ticker: ticker.clone(),
                reason,
            }
        })?;

        self.cache.insert(ticker, payload.clone());
        Ok(payload)
    }

    /// One upstream round trip for an already-uppercased ticker.
    async fn fetch(&self, ticker: &str) -> Result<serde_json::Value, String> {
        let url = format!("{}/{}", self.base_url, ticker);
        debug!(%ticker, %url, "fetching quote upstream");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("token", self.api_token.as_str()),
                ("modules", "defaultKeyStatistics"),
            ])
            .send()
            .await
            .map_err(|e| e.to_string())?
            .error_for_status()
            .map_err(|e| e.to_string())?;

        response.json().await.map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::extract::Path;
    use axum::http::StatusCode;
    use axum::routing::get;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Runs a stub upstream on an ephemeral port, counting hits.
    ///
    /// `/quote/{ticker}` answers with a canned payload; the ticker
    /// `FAIL` answers 500.
    async fn stub_upstream() -> (String, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);

        let app = Router::new().route(
            "/quote/{ticker}",
            get(move |Path(ticker): Path<String>| {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    if ticker == "FAIL" {
                        Err(StatusCode::INTERNAL_SERVER_ERROR)
                    } else {
                        Ok(axum::Json(serde_json::json!({
                            "results": [{"symbol": ticker, "regularMarketPrice": 42.5}]
                        })))
                    }
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub upstream");
        let addr = listener.local_addr().expect("stub addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("stub serve");
        });

        (format!("http://{}/quote", addr), hits)
    }

    fn fetcher(base_url: &str) -> QuoteFetcher {
        QuoteFetcher::new(base_url, "test_token", Duration::from_secs(60), 100)
            .expect("build fetcher")
    }

    #[tokio::test]
    async fn test_miss_fetches_and_caches() {
        let (base_url, hits) = stub_upstream().await;
        let fetcher = fetcher(&base_url);

        let payload = fetcher.get_quote("aapl", Privilege::No).await.expect("ok");
        assert_eq!(payload["results"][0]["symbol"], "AAPL");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_second_request_within_ttl_served_from_cache() {
        let (base_url, hits) = stub_upstream().await;
        let fetcher = fetcher(&base_url);

        let first = fetcher.get_quote("AAPL", Privilege::No).await.expect("ok");
        let second = fetcher.get_quote("AAPL", Privilege::No).await.expect("ok");

        assert_eq!(first, second);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_privileged_caller_always_fetches() {
        let (base_url, hits) = stub_upstream().await;
        let fetcher = fetcher(&base_url);

        fetcher.get_quote("AAPL", Privilege::Yes).await.expect("ok");
        fetcher.get_quote("AAPL", Privilege::Yes).await.expect("ok");
        assert_eq!(hits.load(Ordering::SeqCst), 2);

        // The privileged refresh extended freshness for everyone else.
        fetcher.get_quote("AAPL", Privilege::No).await.expect("ok");
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_upstream_failure_leaves_cache_unset() {
        let (base_url, hits) = stub_upstream().await;
        let fetcher = fetcher(&base_url);

        let err = fetcher.get_quote("FAIL", Privilege::No).await.unwrap_err();
        match err {
            ApiError::UpstreamFetch { ticker, .. } => assert_eq!(ticker, "FAIL"),
            other => panic!("unexpected error: {other:?}"),
        }

        // Still a miss on retry: failures are not cached.
        let _ = fetcher.get_quote("FAIL", Privilege::No).await;
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unreachable_upstream_reports_cause() {
        // Nothing listens on this port.
        let fetcher = fetcher("http://127.0.0.1:1/quote");

        let err = fetcher.get_quote("AAPL", Privilege::No).await.unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("Failed to fetch data for AAPL: "));
    }
}
