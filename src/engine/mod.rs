// src/engine/mod.rs

//! Supervision engine for sigbar.
//!
//! This module ties together:
//! - the per-block state table
//! - the main runtime event loop that reacts to:
//!   - block stdout lines
//!   - refresh signals routed from the OS
//!   - shutdown requests

pub mod runtime;

pub use runtime::{BarEvent, Runtime};
