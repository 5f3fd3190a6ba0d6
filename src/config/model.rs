// src/config/model.rs

use serde::Deserialize;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// delimiter = " | "
///
/// [[block]]
/// command = "date '+%a %d %b %R'"
/// signal = 1
///
/// [[block]]
/// command = "volume-status"
/// ```
///
/// The `[[block]]` array is order-significant: it defines both the output
/// order of the composed status line and the index used when routing
/// refresh signals.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    /// String printed between consecutive block outputs.
    #[serde(default = "default_delimiter")]
    pub delimiter: String,

    /// The block table, in display order.
    #[serde(default)]
    pub block: Vec<BlockConfig>,
}

fn default_delimiter() -> String {
    " | ".to_string()
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            block: Vec::new(),
        }
    }
}

/// One `[[block]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct BlockConfig {
    /// Shell command text, run through `sh -c`.
    pub command: String,

    /// Optional refresh-signal offset from SIGRTMIN.
    ///
    /// Sending `SIGRTMIN + signal` to the supervisor wakes this block.
    /// Several blocks may share the same offset; one delivered signal
    /// then wakes all of them.
    #[serde(default)]
    pub signal: Option<u32>,
}
