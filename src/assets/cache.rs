use std::time::{Duration, Instant};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::assets::fetch::{AssetFetch, HttpAssetFetcher};
use crate::error::AppResult;

/// One memoized asset, already encoded for embedding
#[derive(Debug, Clone)]
struct CachedAsset {
    source_url: String,
    data_uri: String,
    fetched_at: Instant,
}

/// Process-wide cache for the shared logo
///
/// Lifecycle of the slot: empty -> populated -> stale -> populated.
/// The slot lock is held across the fetch, so concurrent callers on a
/// cold start coalesce into a single network call; the rest read the
/// freshly populated value.
pub struct AssetCache<F: AssetFetch = HttpAssetFetcher> {
    fetcher: F,
    ttl: Duration,
    slot: Mutex<Option<CachedAsset>>,
}

impl AssetCache<HttpAssetFetcher> {
    pub fn new(ttl: Duration, fetch_timeout: Duration) -> Self {
        Self::with_fetcher(HttpAssetFetcher::new(fetch_timeout), ttl)
    }
}

impl<F: AssetFetch> AssetCache<F> {
    pub fn with_fetcher(fetcher: F, ttl: Duration) -> Self {
        Self {
            fetcher,
            ttl,
            slot: Mutex::new(None),
        }
    }

    /// Return the asset at `url` as a `data:` URI, fetching at most
    /// once per TTL window. A URL change also forces a refetch.
    pub async fn data_uri(&self, url: &str) -> AppResult<String> {
        let mut slot = self.slot.lock().await;

        if let Some(cached) = slot.as_ref() {
            if cached.source_url == url && cached.fetched_at.elapsed() <= self.ttl {
                debug!("asset cache hit: {}", url);
                return Ok(cached.data_uri.clone());
            }
            debug!("asset cache stale or URL changed, refetching: {}", url);
        }

        let fetched = self.fetcher.fetch(url).await?;
        let data_uri = format!(
            "data:{};base64,{}",
            fetched.mime_type,
            BASE64.encode(&fetched.bytes)
        );
        info!("✓ asset cached: {} ({} bytes)", url, fetched.bytes.len());

        *slot = Some(CachedAsset {
            source_url: url.to_string(),
            data_uri: data_uri.clone(),
            fetched_at: Instant::now(),
        });

        Ok(data_uri)
    }

    /// Rewind the cached entry's timestamp (tests control time instead
    /// of sleeping through a real TTL)
    #[cfg(test)]
    pub async fn age_entry(&self, by: Duration) {
        let mut slot = self.slot.lock().await;
        if let Some(cached) = slot.as_mut() {
            if let Some(earlier) = cached.fetched_at.checked_sub(by) {
                cached.fetched_at = earlier;
            }
        }
    }
}
