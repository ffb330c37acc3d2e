//! Browser session lifecycle
//!
//! State machine: launch -> ready -> (render on pages)* -> close.
//! A background task drains the CDP event stream; when that stream
//! ends the browser process is gone and the `alive` flag flips, which
//! the orchestrator uses to fail remaining items instead of retrying
//! against a dead engine.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::engine::page::{RenderPage, RenderTimeouts};
use crate::error::{AppResult, EngineError};

/// One headless-browser instance, exclusively owned by the
/// orchestrator for the duration of a batch
pub struct RenderSession {
    browser: Option<Browser>,
    event_task: Option<JoinHandle<()>>,
    alive: Arc<AtomicBool>,
    timeouts: RenderTimeouts,
}

impl RenderSession {
    /// Launch the engine, bounded by the configured startup timeout
    pub async fn launch(config: &Config) -> AppResult<Self> {
        info!("🚀 launching headless browser...");

        let mut builder = BrowserConfig::builder().new_headless_mode().args(vec![
            "--disable-gpu",
            "--no-sandbox",
            "--disable-dev-shm-usage",
            "--remote-debugging-port=0",
        ]);
        if let Some(path) = &config.chrome_executable {
            builder = builder.chrome_executable(Path::new(path));
        }
        let browser_config = builder.build().map_err(|message| EngineError::InvalidConfig {
            message,
        })?;

        let (browser, mut handler) =
            timeout(config.engine_start_timeout, Browser::launch(browser_config))
                .await
                .map_err(|_| EngineError::StartTimeout {
                    limit: config.engine_start_timeout,
                })?
                .map_err(|e| EngineError::StartFailed {
                    source: Box::new(e),
                })?;
        debug!("browser process launched");

        // drain browser events in the background; the stream ending
        // means the process is gone
        let alive = Arc::new(AtomicBool::new(true));
        let alive_flag = alive.clone();
        let event_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
            alive_flag.store(false, Ordering::SeqCst);
        });

        // brief pause to let the browser state settle
        sleep(Duration::from_millis(300)).await;

        info!("✓ headless browser ready");

        Ok(Self {
            browser: Some(browser),
            event_task: Some(event_task),
            alive,
            timeouts: RenderTimeouts {
                content_load: config.content_load_timeout,
                warm_resource_wait: config.warm_resource_wait,
                cold_resource_wait: config.cold_resource_wait,
                pdf_export: config.pdf_export_timeout,
            },
        })
    }

    /// True while the browser process is still with us
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst) && self.browser.is_some()
    }

    /// Create a fresh page context
    pub async fn new_page(&self) -> AppResult<RenderPage> {
        if !self.is_alive() {
            return Err(EngineError::Terminated.into());
        }
        let browser = self.browser.as_ref().ok_or(EngineError::Terminated)?;
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| EngineError::PageCreationFailed {
                source: Box::new(e),
            })?;
        debug!("page context created");
        Ok(RenderPage::new(page, self.timeouts.clone(), self.alive.clone()))
    }

    /// Tear the browser down; idempotent and safe after failures
    pub async fn close(&mut self) {
        if let Some(mut browser) = self.browser.take() {
            if let Err(e) = browser.close().await {
                warn!("⚠️ browser close failed, killing process: {}", e);
                let _ = browser.kill().await;
            }
            if let Err(e) = browser.wait().await {
                warn!("⚠️ waiting for browser exit failed: {}", e);
            }
            debug!("browser terminated");
        }
        if let Some(task) = self.event_task.take() {
            task.abort();
        }
        self.alive.store(false, Ordering::SeqCst);
    }
}
