//! Logging initialization
//!
//! Honors `RUST_LOG` when set; otherwise falls back to `info` (or
//! `debug` when verbose logging is requested).

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber
pub fn init(verbose: bool) {
    let fallback = if verbose { "pdf_lote=debug,info" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    // try_init: tests may call this more than once
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
