//! gguf-vocab - dump the tokenizer vocabulary of a GGUF model
//!
//! Reads the `tokenizer.ggml.tokens` metadata field of a GGUF file and
//! prints it either as `index: token` lines or as a JSON object keyed by
//! index.
//!
//! # Architecture
//!
//! - **loader**: memory-mapped, read-only GGUF parsing; metadata fields are
//!   kept as raw byte parts plus the indices of their values
//! - **tokenizer**: strict UTF-8 decoding of the vocabulary and rendering
//! - **cli**: argument parsing and the dump command
//!
//! # Example
//!
//! ```bash
//! # Plain listing
//! gguf-vocab mistral-7b.Q4_K_M.gguf
//!
//! # JSON object, e.g. for jq
//! gguf-vocab --json mistral-7b.Q4_K_M.gguf
//! ```

pub mod cli;
pub mod config;
pub mod loader;
pub mod tokenizer;

#[cfg(test)]
#[path = "../tests/common/gguf.rs"]
mod test_utils;

// Re-export key types
pub use config::{DumpConfig, OutputFormat};
pub use loader::{resolve_endianness, ByteOrder, Endian, Field, GgufFile, GgufReader};
pub use tokenizer::{dump_vocabulary, extract_vocabulary, VocabError, Vocabulary};
