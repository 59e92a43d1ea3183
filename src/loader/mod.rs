//! GGUF loading
//!
//! This module provides read-only access to GGUF files:
//! - Model path resolution (file, directory, or name in the model directory)
//! - Memory mapping and container parsing
//! - Host/file byte order resolution
//!
//! Metadata values are kept as raw byte parts; decoding them is left to the
//! consumer (see [`crate::tokenizer`]).

mod detect;
mod endian;
mod error;
mod gguf;
mod reader;

pub use detect::{detect_gguf, find_model_path};
pub use endian::{host_endian, resolve_endianness, ByteOrder, Endian};
pub use error::GgufError;
pub use gguf::{get_gguf_info, GgufFile, GgufInfo};
pub use reader::{
    Field, GgufReader, GgufValueType, TensorInfo, GGUF_DEFAULT_ALIGNMENT, GGUF_MAGIC,
};
