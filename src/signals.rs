// src/signals.rs

//! Signal router: maps real-time OS signals onto block refreshes.
//!
//! Each distinct `signal` offset `k` in the block table gets one
//! `tokio::signal::unix` stream for `SIGRTMIN + k`. Delivery turns into a
//! `BarEvent::Refresh { offset }` on the runtime channel; the runtime then
//! writes a wake byte to every block sharing that offset.
//!
//! Signal streams coalesce: a burst of identical signals arriving before
//! the runtime drains them may be observed as a single refresh. At least
//! one refresh per burst is guaranteed, which is all a status bar needs.

use anyhow::{Context, Result};
use std::collections::BTreeSet;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;
use tracing::debug;

use crate::block::BlockSpec;
use crate::engine::BarEvent;

/// Largest valid refresh-signal offset on this platform.
pub fn max_signal_offset() -> u32 {
    (libc::SIGRTMAX() - libc::SIGRTMIN()) as u32
}

/// Indices of every block whose configured offset equals `offset`.
///
/// Several blocks may share one offset; one delivered signal wakes them
/// all. An offset no block uses matches nothing.
pub fn matching_blocks(specs: &[BlockSpec], offset: u32) -> Vec<usize> {
    specs
        .iter()
        .enumerate()
        .filter(|(_, spec)| spec.signal == Some(offset))
        .map(|(index, _)| index)
        .collect()
}

/// Install one signal stream per distinct configured offset.
///
/// Must be called from within the tokio runtime. Failing to install a
/// handler is fatal: the block table promises refresh signals that could
/// then never be delivered.
pub fn spawn_signal_router(
    specs: &[BlockSpec],
    events_tx: mpsc::Sender<BarEvent>,
) -> Result<()> {
    let offsets: BTreeSet<u32> = specs.iter().filter_map(|s| s.signal).collect();

    for offset in offsets {
        let signum = libc::SIGRTMIN() + offset as i32;
        let mut stream = signal(SignalKind::from_raw(signum))
            .with_context(|| format!("installing handler for SIGRTMIN+{offset}"))?;

        let tx = events_tx.clone();
        tokio::spawn(async move {
            while stream.recv().await.is_some() {
                debug!(offset, "refresh signal received");
                if tx.send(BarEvent::Refresh { offset }).await.is_err() {
                    break;
                }
            }
        });
    }

    Ok(())
}

/// Ctrl-C / SIGINT → graceful shutdown of the runtime loop.
pub fn spawn_shutdown_listener(events_tx: mpsc::Sender<BarEvent>) {
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            eprintln!("failed to listen for Ctrl+C: {e}");
            return;
        }
        let _ = events_tx.send(BarEvent::ShutdownRequested).await;
    });
}
