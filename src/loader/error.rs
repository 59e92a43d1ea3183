//! GGUF parse errors

use thiserror::Error;

/// Errors raised while opening or parsing a GGUF file
#[derive(Debug, Error)]
pub enum GgufError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid GGUF magic: expected 'GGUF', got '{0}'")]
    InvalidMagic(String),

    #[error("Unsupported GGUF version: {0} (expected 2 or 3)")]
    UnsupportedVersion(u32),

    #[error("GGUF file truncated at byte offset {offset} (needed {needed} more bytes)")]
    Truncated { offset: usize, needed: usize },

    #[error("Unknown GGUF metadata type {value_type} at byte offset {offset}")]
    UnknownValueType { value_type: u32, offset: usize },

    #[error("GGUF size field at byte offset {offset} does not fit in memory: {value}")]
    SizeOverflow { offset: usize, value: u64 },

    #[error("Invalid UTF-8 in GGUF key or tensor name at byte offset {offset}")]
    InvalidUtf8 { offset: usize },

    #[error("GGUF arrays nested {depth} levels deep at byte offset {offset}")]
    NestingTooDeep { offset: usize, depth: usize },

    #[error("Invalid general.alignment field: {0}")]
    InvalidAlignment(String),
}
