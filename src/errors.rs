// src/errors.rs

//! Crate-wide error aliases.
//!
//! Everything in the supervisor treats infrastructure failures as fatal and
//! propagates them with `anyhow`; this module is the single place to add
//! more structured error types later if a recoverable class ever appears.

pub use anyhow::{Error, Result};
