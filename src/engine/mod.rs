//! Rendering engine layer
//!
//! Owns the headless browser process and exposes "render HTML to PDF
//! bytes" with bounded waits at every suspension point. One session is
//! opened per batch and torn down on every exit path; pages are pooled
//! and reused sequentially so the per-page startup cost is paid at
//! most `max_concurrent_pages` times per batch.

pub mod page;
pub mod pool;
pub mod session;

pub use page::RenderPage;
pub use pool::PagePool;
pub use session::RenderSession;
