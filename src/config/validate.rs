// src/config/validate.rs

use anyhow::{anyhow, Result};

use crate::config::model::ConfigFile;
use crate::signals::max_signal_offset;

/// Run basic semantic validation against a loaded configuration.
///
/// This checks:
/// - there is at least one `[[block]]`
/// - every command is non-blank
/// - every `signal` offset fits inside the real-time signal range
///   (`0 ..= SIGRTMAX - SIGRTMIN`)
///
/// Duplicate offsets are deliberately allowed: one delivered signal then
/// fans out to every block sharing the offset.
pub fn validate_config(cfg: &ConfigFile) -> Result<()> {
    ensure_has_blocks(cfg)?;
    validate_commands(cfg)?;
    validate_signal_offsets(cfg)?;
    Ok(())
}

fn ensure_has_blocks(cfg: &ConfigFile) -> Result<()> {
    if cfg.block.is_empty() {
        return Err(anyhow!(
            "config must contain at least one [[block]] entry"
        ));
    }
    Ok(())
}

fn validate_commands(cfg: &ConfigFile) -> Result<()> {
    for (index, block) in cfg.block.iter().enumerate() {
        if block.command.trim().is_empty() {
            return Err(anyhow!("block {} has an empty command", index));
        }
    }
    Ok(())
}

fn validate_signal_offsets(cfg: &ConfigFile) -> Result<()> {
    let max = max_signal_offset();
    for (index, block) in cfg.block.iter().enumerate() {
        if let Some(offset) = block.signal {
            if offset > max {
                return Err(anyhow!(
                    "block {} has signal offset {} outside the real-time range 0..={}",
                    index,
                    offset,
                    max
                ));
            }
        }
    }
    Ok(())
}
