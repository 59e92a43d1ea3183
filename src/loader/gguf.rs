//! GGUF file access
//!
//! Maps a GGUF file into memory and hands the bytes to [`GgufReader`].

use std::fs::File;
use std::path::{Path, PathBuf};

use memmap2::Mmap;
use serde::Serialize;

use super::endian::{resolve_endianness, ByteOrder, Endian};
use super::error::GgufError;
use super::reader::{GgufReader, GgufValueType};

/// A read-only, memory-mapped GGUF file
pub struct GgufFile {
    path: PathBuf,
    mmap: Mmap,
}

impl GgufFile {
    /// Open and map a GGUF file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, GgufError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        // SAFETY: the mapping is read-only and nothing in this process
        // writes to the file while it is mapped.
        let mmap = unsafe { Mmap::map(&file)? };

        tracing::debug!("Mapped {} ({} bytes)", path.display(), mmap.len());

        Ok(Self {
            path: path.to_path_buf(),
            mmap,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn bytes(&self) -> &[u8] {
        &self.mmap
    }

    /// Parse the mapped bytes. Fields borrow from this file.
    pub fn reader(&self) -> Result<GgufReader<'_>, GgufError> {
        GgufReader::new(self.bytes())
    }
}

/// Summary of a parsed GGUF file
#[derive(Debug, Clone, Serialize)]
pub struct GgufInfo {
    pub version: u32,
    pub byte_order: ByteOrder,
    pub host_endian: Endian,
    pub file_endian: Endian,
    pub metadata_count: usize,
    pub tensor_count: usize,
    pub architecture: Option<String>,
    pub vocab_size: Option<usize>,
}

/// Summarize a parsed GGUF file without decoding the vocabulary
pub fn get_gguf_info(reader: &GgufReader<'_>) -> GgufInfo {
    let (host_endian, file_endian) = resolve_endianness(reader.byte_order());

    let architecture = reader
        .get_field("general.architecture")
        .filter(|f| f.value_type() == Some(GgufValueType::String))
        .and_then(|f| f.data.first().and_then(|&d| f.part(d)))
        .map(|raw| String::from_utf8_lossy(raw).into_owned());

    let vocab_size = reader
        .get_field(crate::tokenizer::TOKENS_KEY)
        .filter(|f| f.is_string_array())
        .map(|f| f.data.len());

    GgufInfo {
        version: reader.version(),
        byte_order: reader.byte_order(),
        host_endian,
        file_endian,
        metadata_count: reader.fields().len(),
        tensor_count: reader.tensors().len(),
        architecture,
        vocab_size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::GgufBuilder;

    #[test]
    fn test_open_mapped_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.gguf");
        let bytes = GgufBuilder::new()
            .string_array("tokenizer.ggml.tokens", &["a", "b"])
            .build();
        std::fs::write(&path, &bytes).unwrap();

        let file = GgufFile::open(&path).unwrap();
        assert_eq!(file.path(), path.as_path());
        assert_eq!(file.bytes(), bytes.as_slice());

        let reader = file.reader().unwrap();
        assert_eq!(reader.fields().len(), 1);
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = GgufFile::open(dir.path().join("missing.gguf")).err().unwrap();
        assert!(matches!(err, GgufError::Io(_)));
    }

    #[test]
    fn test_gguf_info() {
        let bytes = GgufBuilder::new()
            .string("general.architecture", "llama")
            .string_array("tokenizer.ggml.tokens", &["a", "b", "c"])
            .tensor("w", &[2], 0, 0)
            .swapped()
            .build();
        let reader = GgufReader::new(&bytes).unwrap();
        let info = get_gguf_info(&reader);

        assert_eq!(info.version, 3);
        assert_eq!(info.byte_order, ByteOrder::Swapped);
        assert_ne!(info.host_endian, info.file_endian);
        assert_eq!(info.metadata_count, 2);
        assert_eq!(info.tensor_count, 1);
        assert_eq!(info.architecture.as_deref(), Some("llama"));
        assert_eq!(info.vocab_size, Some(3));
    }

    #[test]
    fn test_gguf_info_without_vocab() {
        let bytes = GgufBuilder::new().u32("general.alignment", 32).build();
        let reader = GgufReader::new(&bytes).unwrap();
        let info = get_gguf_info(&reader);

        assert_eq!(info.byte_order, ByteOrder::Native);
        assert_eq!(info.host_endian, info.file_endian);
        assert!(info.architecture.is_none());
        assert!(info.vocab_size.is_none());
    }
}
