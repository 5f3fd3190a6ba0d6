//! Drives the full runtime loop against real child processes: signal in,
//! composed line out.

use std::error::Error;
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{sleep, timeout};

use sigbar::block::{spawn_block, BlockHandle, BlockSpec};
use sigbar::engine::{BarEvent, Runtime};
use sigbar::signals::spawn_signal_router;

type TestResult = Result<(), Box<dyn Error>>;

/// Captures everything the runtime emits, in place of stdout.
#[derive(Clone, Default)]
struct CaptureSink(Arc<Mutex<Vec<u8>>>);

impl CaptureSink {
    fn lines(&self) -> Vec<String> {
        let buf = self.0.lock().unwrap();
        String::from_utf8_lossy(&buf)
            .lines()
            .map(str::to_string)
            .collect()
    }
}

impl Write for CaptureSink {
    fn write(&mut self, data: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().write(data)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

async fn wait_for_lines(
    capture: &CaptureSink,
    count: usize,
) -> Result<Vec<String>, Box<dyn Error>> {
    let lines = timeout(Duration::from_secs(5), async {
        loop {
            let lines = capture.lines();
            if lines.len() >= count {
                return lines;
            }
            sleep(Duration::from_millis(20)).await;
        }
    })
    .await?;
    Ok(lines)
}

/// Spawn the given blocks, wire the signal router, and run the runtime in a
/// background task writing into the returned capture sink.
fn start_bar(specs: Vec<BlockSpec>) -> Result<CaptureSink, Box<dyn Error>> {
    let (tx, rx) = mpsc::channel::<BarEvent>(64);
    spawn_signal_router(&specs, tx.clone())?;

    let blocks: Vec<BlockHandle> = specs
        .iter()
        .enumerate()
        .map(|(index, spec)| spawn_block(index, spec, tx.clone()))
        .collect::<Result<_, _>>()?;

    let capture = CaptureSink::default();
    let table: Vec<_> = specs.into_iter().zip(blocks).collect();
    let runtime = Runtime::new(table, " | ".to_string(), rx, Box::new(capture.clone()));
    tokio::spawn(runtime.run());

    Ok(capture)
}

fn read_loop_spec(startup: &str, on_trigger: &str, signal: u32) -> BlockSpec {
    BlockSpec {
        command: format!(
            "printf '{startup}\\n'; while read -r _; do printf '{on_trigger}\\n'; done"
        ),
        signal: Some(signal),
    }
}

#[tokio::test]
async fn refresh_signal_yields_a_second_composed_line() -> TestResult {
    let capture = start_bar(vec![read_loop_spec("0", "1", 6)])?;

    let lines = wait_for_lines(&capture, 1).await?;
    assert_eq!(lines[0], "0");

    unsafe {
        libc::raise(libc::SIGRTMIN() + 6);
    }

    let lines = wait_for_lines(&capture, 2).await?;
    assert!(lines[1].ends_with('1'), "second line: {:?}", lines[1]);
    assert_eq!(lines[1], "1");
    Ok(())
}

#[tokio::test]
async fn unchanged_output_after_refresh_emits_no_redraw() -> TestResult {
    let capture = start_bar(vec![read_loop_spec("x", "x", 7)])?;

    let lines = wait_for_lines(&capture, 1).await?;
    assert_eq!(lines[0], "x");

    unsafe {
        libc::raise(libc::SIGRTMIN() + 7);
    }

    // The wake byte reaches the block and it re-emits "x"; the runtime
    // must suppress the redundant redraw.
    sleep(Duration::from_millis(300)).await;
    assert_eq!(capture.lines(), vec!["x".to_string()]);
    Ok(())
}

async fn wait_for_last(capture: &CaptureSink, expected: &str) -> Result<(), Box<dyn Error>> {
    timeout(Duration::from_secs(5), async {
        loop {
            if capture.lines().last().is_some_and(|l| l == expected) {
                return;
            }
            sleep(Duration::from_millis(20)).await;
        }
    })
    .await?;
    Ok(())
}

#[tokio::test]
async fn refresh_fans_out_to_every_block_sharing_the_offset() -> TestResult {
    let capture = start_bar(vec![
        read_loop_spec("a0", "a1", 8),
        read_loop_spec("b0", "b1", 8),
    ])?;

    // The two startup lines may compose one at a time; wait until both
    // segments are present before signalling.
    wait_for_last(&capture, "a0 | b0").await?;

    unsafe {
        libc::raise(libc::SIGRTMIN() + 8);
    }

    // One delivered signal wakes both blocks.
    wait_for_last(&capture, "a1 | b1").await?;
    Ok(())
}
