//! One reusable page context
//!
//! A page renders exactly one document at a time. After the first
//! render the page is "warm": the font/image readiness ceiling drops
//! from the fresh-page allowance to a short one, because the page has
//! already paid its setup cost and slow resources must not stall the
//! rest of the batch.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chromiumoxide::cdp::browser_protocol::emulation::SetEmulatedMediaParams;
use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::Page;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::error::{AppError, AppResult, EngineError, RenderError};

/// Bounded-wait ceilings for the render pipeline
#[derive(Debug, Clone)]
pub struct RenderTimeouts {
    pub content_load: Duration,
    pub warm_resource_wait: Duration,
    pub cold_resource_wait: Duration,
    pub pdf_export: Duration,
}

/// A4 paper, inches
const PAPER_WIDTH_IN: f64 = 8.27;
const PAPER_HEIGHT_IN: f64 = 11.69;

/// Awaits the load event, `document.fonts.ready` and a terminal state
/// (loaded or errored) for every image. Raced against a timer by the
/// caller; must never reject.
const RESOURCE_WAIT_JS: &str = r#"
(async () => {
  if (document.readyState !== 'complete') {
    await new Promise((resolve) => window.addEventListener('load', resolve, { once: true }));
  }
  if (document.fonts && document.fonts.ready) {
    try { await document.fonts.ready; } catch (e) {}
  }
  const imgs = Array.from(document.images || []);
  await Promise.all(
    imgs.map((img) => {
      if (img.complete) return Promise.resolve();
      return new Promise((resolve) => {
        img.addEventListener('load', resolve, { once: true });
        img.addEventListener('error', resolve, { once: true });
      });
    })
  );
  return true;
})()
"#;

/// One page context, used by exactly one in-flight render at a time
pub struct RenderPage {
    page: Page,
    warm: bool,
    timeouts: RenderTimeouts,
    engine_alive: Arc<AtomicBool>,
}

impl RenderPage {
    pub(crate) fn new(page: Page, timeouts: RenderTimeouts, engine_alive: Arc<AtomicBool>) -> Self {
        Self {
            page,
            warm: false,
            timeouts,
            engine_alive,
        }
    }

    /// True once this page has completed at least one render attempt
    pub fn is_warm(&self) -> bool {
        self.warm
    }

    /// Render one document to PDF bytes
    ///
    /// Pipeline: set content -> emulate print media -> bounded
    /// font/image wait -> PDF export. Failures are scoped to the item;
    /// the page stays usable for the next one.
    pub async fn render_pdf(&mut self, html: &str, item_index: usize) -> AppResult<Vec<u8>> {
        if !self.engine_alive.load(Ordering::SeqCst) {
            return Err(EngineError::Terminated.into());
        }

        self.load_content(html, item_index).await?;
        self.apply_print_media(item_index).await?;
        self.await_resources(item_index).await;
        self.export_pdf(item_index).await
    }

    async fn load_content(&self, html: &str, item_index: usize) -> AppResult<()> {
        timeout(self.timeouts.content_load, self.page.set_content(html))
            .await
            .map_err(|_| RenderError::ContentLoadTimeout {
                item_index,
                limit: self.timeouts.content_load,
            })?
            .map_err(|e| AppError::content_load_failed(item_index, e))?;
        Ok(())
    }

    async fn apply_print_media(&self, item_index: usize) -> AppResult<()> {
        let params = SetEmulatedMediaParams {
            media: Some("print".to_string()),
            ..Default::default()
        };
        self.page
            .execute(params)
            .await
            .map_err(|e| AppError::content_load_failed(item_index, e))?;
        Ok(())
    }

    /// Bounded wait: the readiness script races the warm/cold ceiling
    /// and the render proceeds on whichever finishes first. A slow or
    /// broken resource can cost at most the ceiling, never the batch.
    async fn await_resources(&mut self, item_index: usize) {
        let ceiling = if self.warm {
            self.timeouts.warm_resource_wait
        } else {
            self.timeouts.cold_resource_wait
        };

        let params = EvaluateParams::builder()
            .expression(RESOURCE_WAIT_JS)
            .await_promise(true)
            .return_by_value(true)
            .build();

        match params {
            Ok(params) => match timeout(ceiling, self.page.evaluate(params)).await {
                Ok(Ok(_)) => debug!("item {}: fonts and images ready", item_index),
                Ok(Err(e)) => {
                    warn!("item {}: resource wait script failed, proceeding: {}", item_index, e)
                }
                Err(_) => debug!(
                    "item {}: resource wait ceiling ({:?}) reached, proceeding",
                    item_index, ceiling
                ),
            },
            Err(e) => warn!("item {}: resource wait setup failed, proceeding: {}", item_index, e),
        }

        self.warm = true;
    }

    async fn export_pdf(&self, item_index: usize) -> AppResult<Vec<u8>> {
        let params = PrintToPdfParams {
            print_background: Some(true),
            prefer_css_page_size: Some(true),
            paper_width: Some(PAPER_WIDTH_IN),
            paper_height: Some(PAPER_HEIGHT_IN),
            margin_top: Some(0.0),
            margin_bottom: Some(0.0),
            margin_left: Some(0.0),
            margin_right: Some(0.0),
            ..Default::default()
        };

        let bytes = timeout(self.timeouts.pdf_export, self.page.pdf(params))
            .await
            .map_err(|_| RenderError::ExportTimeout {
                item_index,
                limit: self.timeouts.pdf_export,
            })?
            .map_err(|e| AppError::export_failed(item_index, e))?;

        debug!("item {}: PDF exported ({} bytes)", item_index, bytes.len());
        Ok(bytes)
    }
}
