//! Page pool
//!
//! Pages are created lazily and returned after each item, so a batch
//! running with concurrency N touches at most N page contexts and
//! every page after its first item runs warm. The concurrency bound
//! itself lives in the orchestrator; the pool only recycles.

use tokio::sync::Mutex;
use tracing::debug;

use crate::engine::page::RenderPage;
use crate::engine::session::RenderSession;
use crate::error::AppResult;

pub struct PagePool<'a> {
    session: &'a RenderSession,
    idle: Mutex<Vec<RenderPage>>,
}

impl<'a> PagePool<'a> {
    pub fn new(session: &'a RenderSession) -> Self {
        Self {
            session,
            idle: Mutex::new(Vec::new()),
        }
    }

    /// Take an idle page, or create a fresh one when none is waiting
    pub async fn checkout(&self) -> AppResult<RenderPage> {
        if let Some(page) = self.idle.lock().await.pop() {
            debug!("reusing warm page");
            return Ok(page);
        }
        self.session.new_page().await
    }

    /// Return a page after its item fully finished (rendered or failed)
    pub async fn checkin(&self, page: RenderPage) {
        self.idle.lock().await.push(page);
    }
}
