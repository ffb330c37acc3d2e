//! Data model: the batch request and the per-item types flowing
//! through the pipeline

pub mod item;

pub use item::{NormalizedItem, RenderItem, RenderOutcome, RenderRequest};
