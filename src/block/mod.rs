// src/block/mod.rs

//! Block runtime and per-block state.
//!
//! A "block" is one shell command run as a long-lived child process. The
//! supervisor holds the child's stdin (the wake channel) and reads status
//! lines from its stdout.
//!
//! - [`spawn`] launches the child and wires its stdout into the runtime
//!   event channel.
//! - [`state`] holds the bounded last-known output text per block.

pub mod spawn;
pub mod state;

pub use spawn::{spawn_block, BlockHandle};
pub use state::{BlockState, OUTPUT_CAPACITY};

use crate::config::BlockConfig;

/// Immutable per-block specification, fixed at startup.
#[derive(Debug, Clone)]
pub struct BlockSpec {
    /// Shell command text, run through `sh -c`.
    pub command: String,
    /// Optional refresh-signal offset from SIGRTMIN.
    pub signal: Option<u32>,
}

impl From<&BlockConfig> for BlockSpec {
    fn from(cfg: &BlockConfig) -> Self {
        Self {
            command: cfg.command.clone(),
            signal: cfg.signal,
        }
    }
}
