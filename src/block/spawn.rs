// src/block/spawn.rs

use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::process::{ChildStdin, ChildStdout, Command};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::block::{BlockSpec, OUTPUT_CAPACITY};
use crate::engine::BarEvent;

/// Supervisor-side handle to one spawned block.
///
/// `stdin` is the wake channel: writing a newline byte to it tells the
/// block to refresh. It stays open for the block's entire lifetime.
pub struct BlockHandle {
    pub pid: Option<u32>,
    pub stdin: ChildStdin,
}

/// Spawn one block process and wire its stdout into the runtime channel.
///
/// The command text is run through `sh -c`, with stdin, stdout and stderr
/// piped back to the supervisor. Failure to spawn is fatal for the whole
/// supervisor: a half-initialized block table has no safe degraded mode.
///
/// Once spawned, the block is on its own. If it exits or its exec fails
/// (`sh` reports that on stderr), its stdout simply reaches EOF and the
/// block stops contributing updates; it is never restarted.
pub fn spawn_block(
    index: usize,
    spec: &BlockSpec,
    events_tx: mpsc::Sender<BarEvent>,
) -> Result<BlockHandle> {
    info!(block = index, cmd = %spec.command, "spawning block process");

    let mut cmd = Command::new("sh");
    cmd.arg("-c")
        .arg(&spec.command)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawning process for block {} ({})", index, spec.command))?;

    let stdin = child
        .stdin
        .take()
        .context("child stdin pipe missing after spawn")?;
    let stdout = child
        .stdout
        .take()
        .context("child stdout pipe missing after spawn")?;
    let stderr = child.stderr.take();

    spawn_output_reader(index, stdout, events_tx);

    // Always consume stderr so buffers don't fill; log at debug.
    if let Some(stderr) = stderr {
        tokio::spawn(async move {
            let reader = BufReader::new(stderr);
            let mut lines = reader.lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(block = index, "stderr: {}", line);
            }
        });
    }

    let pid = child.id();

    // Reap the child when it exits. No restart: a dead block's slot keeps
    // its last output and stops updating.
    tokio::spawn(async move {
        match child.wait().await {
            Ok(status) => {
                warn!(block = index, exit = %status, "block process exited");
            }
            Err(err) => {
                warn!(block = index, error = %err, "waiting on block process failed");
            }
        }
    });

    Ok(BlockHandle { pid, stdin })
}

/// Forward each stdout line of a block into the runtime event channel.
///
/// The task ends at EOF (block exited or closed its stdout); that is a
/// soft condition, never an error.
fn spawn_output_reader(
    index: usize,
    stdout: ChildStdout,
    events_tx: mpsc::Sender<BarEvent>,
) {
    tokio::spawn(async move {
        let mut reader = BufReader::new(stdout);
        let mut raw = Vec::with_capacity(OUTPUT_CAPACITY);

        loop {
            raw.clear();
            match read_capped_line(&mut reader, &mut raw).await {
                Ok(false) => break,
                Ok(true) => {
                    let line = String::from_utf8_lossy(&raw).into_owned();
                    debug!(block = index, "stdout: {}", line);
                    if events_tx
                        .send(BarEvent::BlockOutput { index, line })
                        .await
                        .is_err()
                    {
                        // Runtime is gone; nothing left to report to.
                        break;
                    }
                }
                Err(err) => {
                    debug!(block = index, error = %err, "stdout read failed");
                    break;
                }
            }
        }

        debug!(block = index, "stdout reader ended");
    });
}

/// Read one newline-terminated line, keeping at most `OUTPUT_CAPACITY - 1`
/// bytes and discarding the rest. A block streaming bytes without ever
/// emitting a newline therefore costs a fixed amount of supervisor memory,
/// never an unbounded buffer.
///
/// Returns `Ok(false)` at EOF with no pending data; a partial line at EOF
/// is still delivered.
async fn read_capped_line<R>(reader: &mut R, raw: &mut Vec<u8>) -> std::io::Result<bool>
where
    R: AsyncBufRead + Unpin,
{
    const MAX: usize = OUTPUT_CAPACITY - 1;
    loop {
        let buf = reader.fill_buf().await?;
        if buf.is_empty() {
            return Ok(!raw.is_empty());
        }

        if let Some(pos) = buf.iter().position(|&b| b == b'\n') {
            let keep = pos.min(MAX - raw.len());
            raw.extend_from_slice(&buf[..keep]);
            reader.consume(pos + 1);
            return Ok(true);
        }

        let n = buf.len();
        let keep = n.min(MAX - raw.len());
        raw.extend_from_slice(&buf[..keep]);
        reader.consume(n);
    }
}
