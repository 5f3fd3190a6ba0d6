// src/block/state.rs

/// Capacity of a block's output buffer, including the terminator slot of
/// the classic fixed C buffer this mirrors. The stored payload is at most
/// `OUTPUT_CAPACITY - 1` bytes.
pub const OUTPUT_CAPACITY: usize = 64;

/// Last-known output of one block.
///
/// There is exactly one `BlockState` per block spec, at the same index.
/// Only the runtime event loop mutates it, so no synchronization is needed.
#[derive(Debug, Clone, Default)]
pub struct BlockState {
    last_output: String,
}

impl BlockState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stored text, at most `OUTPUT_CAPACITY - 1` bytes.
    pub fn last_output(&self) -> &str {
        &self.last_output
    }

    /// Store a freshly read line, bounded to the buffer capacity.
    ///
    /// Returns `true` if the stored text changed, i.e. a status
    /// recomposition is warranted. Re-reading an identical line is a no-op
    /// so unchanged blocks never cause redundant redraws.
    pub fn apply(&mut self, line: &str) -> bool {
        let text = clamp_to_capacity(line);
        if text == self.last_output {
            return false;
        }
        self.last_output.clear();
        self.last_output.push_str(text);
        true
    }
}

/// Truncate to at most `OUTPUT_CAPACITY - 1` bytes, backing up to the
/// nearest UTF-8 character boundary so the result stays valid text.
fn clamp_to_capacity(line: &str) -> &str {
    const MAX: usize = OUTPUT_CAPACITY - 1;
    if line.len() <= MAX {
        return line;
    }
    let mut end = MAX;
    while !line.is_char_boundary(end) {
        end -= 1;
    }
    &line[..end]
}
