//! # pdf_lote
//!
//! Batch HTML-to-PDF rendering with single-archive packaging.
//!
//! One request carries N notification documents; the crate renders
//! each through a headless browser and returns one ZIP holding every
//! PDF that succeeded. A single misbehaving document (slow fonts,
//! broken images, malformed markup) costs only its own entry.
//!
//! ## Architecture
//!
//! Layered, leaf-first:
//!
//! ### ① Shared assets (`assets/`)
//! - `AssetCache` fetches the logo once, memoizes it as a data URI
//!   with a 6 h TTL, and serializes refreshes so a cold start never
//!   fires redundant fetches
//!
//! ### ② Preprocessing (`preprocess`)
//! - rewrites each document so the logo is embedded inline (literal,
//!   entity-escaped and marker-`<img>` match rules), optionally
//!   stripping external font links
//!
//! ### ③ Engine (`engine/`)
//! - `RenderSession` owns the browser process for one batch
//! - `RenderPage` renders one document at a time with bounded waits at
//!   every suspension point
//! - `PagePool` recycles pages so reused ones run warm
//!
//! ### ④ Orchestration (`orchestrator/`)
//! - `BatchOrchestrator` validates, acquires the asset once, drives
//!   the engine with bounded concurrency, isolates per-item failures
//!   and hands successes to the archive
//!
//! ### ⑤ Archive (`archive`)
//! - `ArchiveAssembler` collects named PDF payloads into one ZIP with
//!   unique entry names

pub mod archive;
pub mod assets;
pub mod config;
pub mod engine;
pub mod error;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod preprocess;

// re-export the common surface
pub use archive::ArchiveAssembler;
pub use assets::{AssetCache, AssetFetch, FetchedAsset, HttpAssetFetcher};
pub use config::Config;
pub use engine::{PagePool, RenderPage, RenderSession};
pub use error::{AppError, AppResult};
pub use models::{NormalizedItem, RenderItem, RenderOutcome, RenderRequest};
pub use orchestrator::{BatchOrchestrator, BatchOutput, BatchStats};
pub use preprocess::{LogoSubstitution, PreprocessOptions};
