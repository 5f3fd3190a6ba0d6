// src/engine/runtime.rs

use std::io::Write;

use anyhow::{Context, Result};
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::block::{BlockHandle, BlockSpec, BlockState};
use crate::signals::matching_blocks;
use crate::status::compose;

/// Events sent into the runtime from block readers and the signal router.
///
/// - block stdout readers send `BlockOutput`
/// - the signal router sends `Refresh`
/// - Ctrl-C handling sends `ShutdownRequested`
#[derive(Debug, Clone)]
pub enum BarEvent {
    BlockOutput { index: usize, line: String },
    Refresh { offset: u32 },
    ShutdownRequested,
}

/// The main supervision runtime.
///
/// Responsibilities:
/// - Consume `BarEvent`s from the unified channel.
/// - Maintain the per-block state table (it is the only mutator, so the
///   single-consumer loop needs no locks).
/// - Write wake bytes to blocks on refresh signals.
/// - Emit a freshly composed status line whenever any block's output
///   actually changes.
pub struct Runtime {
    specs: Vec<BlockSpec>,
    blocks: Vec<BlockHandle>,
    states: Vec<BlockState>,
    delimiter: String,

    /// Unified event stream from all producers (readers, router, ctrl-c).
    events_rx: mpsc::Receiver<BarEvent>,

    /// Where composed status lines go. Production wiring hands in stdout;
    /// tests hand in a capture buffer.
    out: Box<dyn Write + Send>,
}

impl Runtime {
    /// Build the runtime from the block table. Each entry pairs a spec
    /// with the handle of its spawned process, so the spec/handle/state
    /// tables always have the same length and order. One `BlockState` is
    /// created per entry.
    pub fn new(
        table: Vec<(BlockSpec, BlockHandle)>,
        delimiter: String,
        events_rx: mpsc::Receiver<BarEvent>,
        out: Box<dyn Write + Send>,
    ) -> Self {
        let (specs, blocks): (Vec<_>, Vec<_>) = table.into_iter().unzip();
        let states = specs.iter().map(|_| BlockState::new()).collect();
        Self {
            specs,
            blocks,
            states,
            delimiter,
            events_rx,
            out,
        }
    }

    /// Main event loop.
    ///
    /// All block spawning must be complete before this is called; the loop
    /// assumes the tables never change size. Runs until shutdown is
    /// requested or every event producer is gone.
    pub async fn run(mut self) -> Result<()> {
        info!("sigbar runtime started");

        while let Some(event) = self.events_rx.recv().await {
            debug!(?event, "runtime received event");

            let mut changed = false;
            let mut keep_running = self.handle_event(event, &mut changed).await?;

            // Drain whatever else is already queued before composing, so a
            // batch of simultaneous updates yields one redraw.
            while keep_running {
                match self.events_rx.try_recv() {
                    Ok(event) => {
                        keep_running = self.handle_event(event, &mut changed).await?;
                    }
                    Err(_) => break,
                }
            }

            if changed {
                self.emit_status()?;
            }
            if !keep_running {
                break;
            }
        }

        info!("sigbar runtime exiting");
        Ok(())
    }

    /// Apply one event; sets `changed` when a recomposition is warranted.
    /// Returns false when the loop should stop.
    async fn handle_event(&mut self, event: BarEvent, changed: &mut bool) -> Result<bool> {
        match event {
            BarEvent::BlockOutput { index, line } => {
                if self.states[index].apply(&line) {
                    *changed = true;
                } else {
                    debug!(block = index, "output unchanged, redraw suppressed");
                }
                Ok(true)
            }
            BarEvent::Refresh { offset } => {
                self.handle_refresh(offset).await?;
                Ok(true)
            }
            BarEvent::ShutdownRequested => {
                info!("shutdown requested, stopping runtime");
                Ok(false)
            }
        }
    }

    /// Wake every block sharing this signal offset by writing one newline
    /// byte to its stdin. The block is expected to sit in a read loop and
    /// treat any input line as a refresh trigger.
    ///
    /// A failed write means the wake channel of a block we still hold is
    /// broken, which violates the table invariant: fatal.
    async fn handle_refresh(&mut self, offset: u32) -> Result<()> {
        let targets = matching_blocks(&self.specs, offset);
        if targets.is_empty() {
            debug!(offset, "refresh signal matches no block");
            return Ok(());
        }

        for index in targets {
            debug!(block = index, pid = ?self.blocks[index].pid, offset, "waking block");
            let stdin = &mut self.blocks[index].stdin;
            stdin
                .write_all(b"\n")
                .await
                .with_context(|| format!("writing wake byte to block {index}"))?;
            stdin
                .flush()
                .await
                .with_context(|| format!("flushing wake byte to block {index}"))?;
        }
        Ok(())
    }

    /// Compose and print the full status line, flushing immediately.
    ///
    /// The sink is the protocol with the bar; if it is gone, so are we.
    fn emit_status(&mut self) -> Result<()> {
        let line = compose(&self.states, &self.delimiter);
        writeln!(self.out, "{line}").context("writing status line")?;
        self.out.flush().context("flushing status line")?;
        Ok(())
    }
}
