// src/lib.rs

pub mod block;
pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod logging;
pub mod signals;
pub mod status;

use std::path::PathBuf;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::info;

use crate::block::{spawn_block, BlockSpec};
use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;
use crate::config::model::ConfigFile;
use crate::engine::{BarEvent, Runtime};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - the signal router
/// - block spawning
/// - the runtime event loop
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)?;

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(());
    }

    let specs: Vec<BlockSpec> = cfg.block.iter().map(BlockSpec::from).collect();

    // Runtime event channel: block readers, signal router and ctrl-c all
    // feed this single stream.
    let (events_tx, events_rx) = mpsc::channel::<BarEvent>(64);

    // Install signal handling before any block runs, so no early refresh
    // signal can be lost. Events queue in the channel until the loop starts.
    signals::spawn_signal_router(&specs, events_tx.clone())?;
    signals::spawn_shutdown_listener(events_tx.clone());

    // Spawn the whole table up front. The runtime loop only starts once
    // every BlockState slot exists; the tables never change size after
    // this point.
    let blocks = specs
        .iter()
        .enumerate()
        .map(|(index, spec)| spawn_block(index, spec, events_tx.clone()))
        .collect::<Result<Vec<_>>>()?;

    info!(blocks = specs.len(), "all blocks spawned");

    let table: Vec<_> = specs.into_iter().zip(blocks).collect();
    let runtime = Runtime::new(
        table,
        cfg.delimiter.clone(),
        events_rx,
        Box::new(std::io::stdout()),
    );
    runtime.run().await
}

/// Simple dry-run output: print the delimiter and the block table.
fn print_dry_run(cfg: &ConfigFile) {
    println!("sigbar dry-run");
    println!("  delimiter = {:?}", cfg.delimiter);
    println!();

    println!("blocks ({}):", cfg.block.len());
    for (index, block) in cfg.block.iter().enumerate() {
        println!("  [{index}] {}", block.command);
        if let Some(offset) = block.signal {
            println!("      signal: SIGRTMIN+{offset}");
        }
    }
}
