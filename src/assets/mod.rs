//! Shared-asset layer
//!
//! Fetches the batch logo once and memoizes it as a data URI so every
//! document in a batch embeds the same bytes instead of re-fetching a
//! remote image N times (or dropping it when the host throttles).

pub mod cache;
pub mod fetch;

pub use cache::AssetCache;
pub use fetch::{AssetFetch, FetchedAsset, HttpAssetFetcher};
