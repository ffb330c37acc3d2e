//! Batch orchestration layer
//!
//! ## Responsibilities
//!
//! 1. **Validation**: reject empty batches before any resource is touched
//! 2. **Asset acquisition**: one logo fetch serves every item in the batch
//! 3. **Session ownership**: exactly one engine session per batch,
//!    closed on every path
//! 4. **Failure isolation**: a bad document costs its own entry, never
//!    the batch
//! 5. **Deterministic output**: archive entry order follows input item
//!    order regardless of render concurrency

pub mod batch;

pub use batch::{BatchOrchestrator, BatchOutput, BatchStats};
