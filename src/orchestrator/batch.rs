//! Batch rendering orchestrator
//!
//! Drives the whole pipeline for one request: validate, fetch the
//! logo once, launch one engine session, render every item through a
//! bounded-concurrency stream, and assemble the archive from whatever
//! succeeded. Per-item failures are recorded and skipped; only
//! validation and engine-startup failures abort the batch.

use std::time::Instant;

use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use crate::archive::ArchiveAssembler;
use crate::assets::{AssetCache, AssetFetch, HttpAssetFetcher};
use crate::config::Config;
use crate::engine::{PagePool, RenderSession};
use crate::error::{AppResult, RenderError, ValidationError};
use crate::models::{NormalizedItem, RenderItem, RenderOutcome, RenderRequest};
use crate::preprocess::{self, LogoSubstitution, PreprocessOptions};

/// Outcome of one item, tagged with its batch position
#[derive(Debug)]
pub struct ItemResult {
    pub index: usize,
    pub output_name: String,
    pub outcome: RenderOutcome,
}

/// Counters for one completed batch
#[derive(Debug, Default, Clone, Copy)]
pub struct BatchStats {
    pub total: usize,
    pub rendered: usize,
    pub failed: usize,
}

/// A finished batch: the archive plus its counters
#[derive(Debug)]
pub struct BatchOutput {
    pub archive: Vec<u8>,
    pub stats: BatchStats,
}

/// Drives one batch end to end
pub struct BatchOrchestrator<F: AssetFetch = HttpAssetFetcher> {
    config: Config,
    cache: AssetCache<F>,
}

impl BatchOrchestrator<HttpAssetFetcher> {
    pub fn new(config: Config) -> Self {
        let cache = AssetCache::new(config.asset_ttl, config.asset_fetch_timeout);
        Self { config, cache }
    }
}

impl<F: AssetFetch> BatchOrchestrator<F> {
    /// Build an orchestrator around an existing cache (tests inject a
    /// fake fetcher this way)
    pub fn with_cache(config: Config, cache: AssetCache<F>) -> Self {
        Self { config, cache }
    }

    /// Process a full request, honoring its per-batch logo override
    pub async fn run_request(&self, request: RenderRequest) -> AppResult<BatchOutput> {
        let logo_url = request
            .logo_url
            .unwrap_or_else(|| self.config.logo_url.clone());
        self.run_batch(request.items, &logo_url).await
    }

    /// Process a batch of items and return the archive bytes
    pub async fn run(&self, items: Vec<RenderItem>) -> AppResult<Vec<u8>> {
        let logo_url = self.config.logo_url.clone();
        Ok(self.run_batch(items, &logo_url).await?.archive)
    }

    async fn run_batch(&self, items: Vec<RenderItem>, logo_url: &str) -> AppResult<BatchOutput> {
        if items.is_empty() {
            return Err(ValidationError::EmptyBatch.into());
        }

        log_batch_start(items.len(), self.config.max_concurrent_pages);

        // one fetch serves N items; failure degrades, never aborts
        let logo = self.acquire_logo(logo_url).await;
        let options = PreprocessOptions {
            strip_external_fonts: self.config.strip_external_fonts,
        };

        let normalized: Vec<NormalizedItem> = items
            .iter()
            .enumerate()
            .map(|(index, item)| NormalizedItem {
                index,
                output_name: item.output_name(),
                final_html: preprocess::normalize(&item.html, logo.as_ref(), &options),
            })
            .collect();

        // no engine, no batch
        let mut session = RenderSession::launch(&self.config).await?;
        let results = self.render_all(&session, normalized).await;
        session.close().await;

        let (archive, stats) = assemble(results)?;
        print_final_stats(&stats, archive.len(), &self.config.archive_name);
        Ok(BatchOutput { archive, stats })
    }

    async fn acquire_logo(&self, url: &str) -> Option<LogoSubstitution> {
        match self.cache.data_uri(url).await {
            Ok(data_uri) => Some(LogoSubstitution {
                source_url: url.to_string(),
                data_uri,
                marker_alt: self.config.logo_marker_alt.clone(),
            }),
            Err(e) => {
                warn!(
                    "⚠️ logo fetch failed, documents keep their original reference: {}",
                    e
                );
                None
            }
        }
    }

    async fn render_all(
        &self,
        session: &RenderSession,
        items: Vec<NormalizedItem>,
    ) -> Vec<ItemResult> {
        let pool = PagePool::new(session);
        let deadline = Instant::now() + self.config.batch_deadline;
        let concurrency = self.config.max_concurrent_pages.max(1);

        // buffered(n) bounds in-flight renders and yields results in
        // input order
        stream::iter(
            items
                .into_iter()
                .map(|item| self.render_one(session, &pool, item, deadline)),
        )
        .buffered(concurrency)
        .collect()
        .await
    }

    async fn render_one(
        &self,
        session: &RenderSession,
        pool: &PagePool<'_>,
        item: NormalizedItem,
        deadline: Instant,
    ) -> ItemResult {
        let index = item.index;

        if item.final_html.trim().is_empty() {
            return failed_item(
                index,
                &item.output_name,
                RenderError::BlankDocument { item_index: index }.to_string(),
            );
        }
        if Instant::now() >= deadline {
            return failed_item(
                index,
                &item.output_name,
                RenderError::DeadlineExceeded { item_index: index }.to_string(),
            );
        }
        if !session.is_alive() {
            return failed_item(
                index,
                &item.output_name,
                "rendering engine terminated, item not attempted".to_string(),
            );
        }

        let mut page = match pool.checkout().await {
            Ok(page) => page,
            Err(e) => return failed_item(index, &item.output_name, e.to_string()),
        };

        match page.render_pdf(&item.final_html, index).await {
            Ok(pdf) => {
                pool.checkin(page).await;
                info!("✓ item {} rendered -> {}", index, item.output_name);
                ItemResult {
                    index,
                    output_name: item.output_name,
                    outcome: RenderOutcome::Success { pdf },
                }
            }
            Err(e) => {
                // an item-scoped failure (timeout included) leaves the
                // page reusable; an engine-level failure retires it
                if e.is_item_scoped() && session.is_alive() {
                    pool.checkin(page).await;
                }
                failed_item(index, &item.output_name, e.to_string())
            }
        }
    }
}

fn failed_item(index: usize, output_name: &str, reason: String) -> ItemResult {
    warn!("❌ item {} failed: {}", index, reason);
    ItemResult {
        index,
        output_name: output_name.to_string(),
        outcome: RenderOutcome::Failure { reason },
    }
}

/// Route per-item outcomes into the archive
///
/// Entries follow input item order. Failed items are omitted from the
/// archive (rather than represented by marker entries); their count is
/// visible in the stats and the logs.
pub(crate) fn assemble(mut results: Vec<ItemResult>) -> AppResult<(Vec<u8>, BatchStats)> {
    // order by original index, not completion order
    results.sort_by_key(|r| r.index);

    let mut assembler = ArchiveAssembler::new();
    let mut stats = BatchStats {
        total: results.len(),
        ..Default::default()
    };

    for result in results {
        match result.outcome {
            RenderOutcome::Success { pdf } => {
                let stored = assembler.add(&result.output_name, &pdf)?;
                if stored != result.output_name {
                    info!(
                        "duplicate output name '{}', stored as '{}'",
                        result.output_name, stored
                    );
                }
                stats.rendered += 1;
            }
            RenderOutcome::Failure { reason } => {
                warn!("item {} omitted from archive: {}", result.index, reason);
                stats.failed += 1;
            }
        }
    }

    Ok((assembler.finalize()?, stats))
}

// ========== Logging helpers ==========

fn log_batch_start(total: usize, concurrency: usize) {
    info!("{}", "=".repeat(60));
    info!("📦 batch started: {} item(s), concurrency {}", total, concurrency);
    info!("{}", "=".repeat(60));
}

fn print_final_stats(stats: &BatchStats, archive_bytes: usize, archive_name: &str) {
    info!("{}", "=".repeat(60));
    info!("📊 batch finished at {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));
    info!("✅ rendered: {}/{}", stats.rendered, stats.total);
    info!("❌ failed: {}", stats.failed);
    info!("🗜️ archive: {} ({} bytes)", archive_name, archive_bytes);
    info!("{}", "=".repeat(60));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use std::io::Cursor;
    use zip::ZipArchive;

    fn success(index: usize, name: &str, body: &[u8]) -> ItemResult {
        ItemResult {
            index,
            output_name: name.to_string(),
            outcome: RenderOutcome::Success { pdf: body.to_vec() },
        }
    }

    fn failure(index: usize, name: &str, reason: &str) -> ItemResult {
        ItemResult {
            index,
            output_name: name.to_string(),
            outcome: RenderOutcome::Failure {
                reason: reason.to_string(),
            },
        }
    }

    fn entry_names(bytes: &[u8]) -> Vec<String> {
        let archive = ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
        archive.file_names().map(str::to_string).collect()
    }

    #[tokio::test]
    async fn empty_batch_is_a_validation_error() {
        let orchestrator = BatchOrchestrator::new(Config::default());
        let err = orchestrator.run(Vec::new()).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Validation(ValidationError::EmptyBatch)
        ));
    }

    #[test]
    fn one_failure_does_not_lose_the_other_entries() {
        let results = vec![
            success(0, "a.pdf", b"%PDF a"),
            failure(1, "b.pdf", "render exception"),
            success(2, "c.pdf", b"%PDF c"),
        ];
        let (bytes, stats) = assemble(results).unwrap();

        assert_eq!(stats.total, 3);
        assert_eq!(stats.rendered, 2);
        assert_eq!(stats.failed, 1);
        assert_eq!(entry_names(&bytes), vec!["a.pdf", "c.pdf"]);
    }

    #[test]
    fn entries_follow_input_order_not_completion_order() {
        // completion order scrambled on purpose
        let results = vec![
            success(2, "terceiro.pdf", b"3"),
            success(0, "primeiro.pdf", b"1"),
            success(1, "segundo.pdf", b"2"),
        ];
        let (bytes, _) = assemble(results).unwrap();
        assert_eq!(
            entry_names(&bytes),
            vec!["primeiro.pdf", "segundo.pdf", "terceiro.pdf"]
        );
    }

    #[test]
    fn all_failures_still_yield_a_valid_empty_archive() {
        let results = vec![
            failure(0, "a.pdf", "boom"),
            failure(1, "b.pdf", "boom"),
        ];
        let (bytes, stats) = assemble(results).unwrap();

        assert_eq!(stats.rendered, 0);
        assert_eq!(stats.failed, 2);
        let archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 0);
    }

    #[test]
    fn colliding_names_are_disambiguated() {
        let results = vec![
            success(0, "notificacao.pdf", b"1"),
            success(1, "notificacao.pdf", b"2"),
        ];
        let (bytes, _) = assemble(results).unwrap();
        assert_eq!(
            entry_names(&bytes),
            vec!["notificacao.pdf", "notificacao-2.pdf"]
        );
    }
}
