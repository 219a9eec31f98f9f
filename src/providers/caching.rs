use crate::core::cache::Cache;
use crate::core::nav::{NavHistoryProvider, NavSeries};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub type SeriesCache = dyn Cache<String, Arc<NavSeries>>;

/// Read-through cache in front of a [`NavHistoryProvider`].
///
/// Never fails: any provider error degrades to an empty series, which callers
/// treat as "no data available". Failures are remembered for `failure_ttl`
/// only, so a dead code is retried once that window passes.
#[derive(Clone)]
pub struct HistoryFetcher {
    inner: Arc<dyn NavHistoryProvider>,
    cache: Arc<SeriesCache>,
    ttl: Duration,
    failure_ttl: Option<Duration>,
}

impl HistoryFetcher {
    pub fn new(
        inner: Arc<dyn NavHistoryProvider>,
        cache: Arc<SeriesCache>,
        ttl: Duration,
        failure_ttl: Option<Duration>,
    ) -> Self {
        Self {
            inner,
            cache,
            ttl,
            failure_ttl,
        }
    }

    pub async fn fetch(&self, code: &str) -> Arc<NavSeries> {
        let key = code.to_string();
        if let Some(cached) = self.cache.get(&key).await {
            debug!("Cache hit for NAV history: {}", code);
            return cached;
        }
        debug!("Cache miss for NAV history: {}", code);

        match self.inner.fetch_history(code).await {
            Ok(series) if !series.is_empty() => {
                let series = Arc::new(series);
                self.cache.put(key, Arc::clone(&series), Some(self.ttl)).await;
                series
            }
            Ok(_) => {
                warn!("Empty NAV history for code {}", code);
                self.remember_failure(key).await
            }
            Err(e) => {
                warn!(error = ?e, "NAV history fetch failed for code {}", code);
                self.remember_failure(key).await
            }
        }
    }

    async fn remember_failure(&self, key: String) -> Arc<NavSeries> {
        let empty = Arc::new(NavSeries::default());
        if let Some(ttl) = self.failure_ttl {
            self.cache.put(key, Arc::clone(&empty), Some(ttl)).await;
        }
        empty
    }
}
