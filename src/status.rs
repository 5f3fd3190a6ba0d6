// src/status.rs

//! Status composer: joins every block's current output into one line.

use crate::block::BlockState;

/// Compose the full status line from the block table, in table order.
///
/// Each block's text and the delimiter are stripped of embedded CR/LF so a
/// misbehaving block can never break the one-line-per-update protocol. For
/// a table of N blocks the result always holds N segments and N-1
/// delimiters. The trailing newline is added by the caller when emitting.
pub fn compose(states: &[BlockState], delimiter: &str) -> String {
    let mut line = String::new();
    for (index, state) in states.iter().enumerate() {
        if index > 0 {
            push_sanitized(&mut line, delimiter);
        }
        push_sanitized(&mut line, state.last_output());
    }
    line
}

fn push_sanitized(out: &mut String, text: &str) {
    out.extend(text.chars().filter(|&c| c != '\r' && c != '\n'));
}
