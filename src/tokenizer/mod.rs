//! Tokenizer vocabulary extraction
//!
//! The vocabulary of a GGUF model is stored as the string array field
//! `tokenizer.ggml.tokens`. Each item is decoded as strict UTF-8; a single
//! malformed token fails the whole extraction.

mod format;

pub use format::{render_json, render_text};

use thiserror::Error;

use crate::config::DumpConfig;
use crate::loader::{resolve_endianness, Field, GgufReader, GgufValueType};

/// Metadata key holding the vocabulary
pub const TOKENS_KEY: &str = "tokenizer.ggml.tokens";

/// Errors raised while extracting or rendering a vocabulary
#[derive(Debug, Error)]
pub enum VocabError {
    #[error("GGUF metadata field not found: {0}")]
    MissingField(String),

    #[error("Field {name} is not a string array (types: {types:?})")]
    NotStringArray {
        name: String,
        types: Vec<GgufValueType>,
    },

    #[error("Field {name}: token {index} refers to part {part}, which does not exist")]
    PartOutOfRange {
        name: String,
        index: usize,
        part: usize,
    },

    #[error("Token {index} is not valid UTF-8")]
    Decode {
        index: usize,
        #[source]
        source: std::str::Utf8Error,
    },

    #[error("Failed to serialize vocabulary: {0}")]
    Json(#[from] serde_json::Error),
}

/// Ordered tokens of a vocabulary, borrowed from the GGUF buffer.
///
/// The token at position `i` has index `i`; indices are contiguous from 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary<'a> {
    tokens: Vec<&'a str>,
}

impl<'a> Vocabulary<'a> {
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&'a str> {
        self.tokens.get(index).copied()
    }

    /// `(index, token)` pairs in ascending index order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &'a str)> + '_ {
        self.tokens.iter().copied().enumerate()
    }
}

/// Look up a required metadata field
pub fn require_field<'r, 'a>(
    reader: &'r GgufReader<'a>,
    name: &str,
) -> Result<&'r Field<'a>, VocabError> {
    reader
        .get_field(name)
        .ok_or_else(|| VocabError::MissingField(name.to_string()))
}

/// Decode every item of a string array field
pub fn extract_vocabulary<'a>(field: &Field<'a>) -> Result<Vocabulary<'a>, VocabError> {
    if !field.is_string_array() {
        return Err(VocabError::NotStringArray {
            name: field.name.clone(),
            types: field.types.clone(),
        });
    }

    let tokens = field
        .data
        .iter()
        .enumerate()
        .map(|(index, &part)| {
            let raw = field.part(part).ok_or_else(|| VocabError::PartOutOfRange {
                name: field.name.clone(),
                index,
                part,
            })?;
            std::str::from_utf8(raw).map_err(|source| VocabError::Decode { index, source })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Vocabulary { tokens })
}

/// Extract the vocabulary of a parsed file and render it.
///
/// Nothing is returned unless the whole vocabulary decodes.
pub fn dump_vocabulary(reader: &GgufReader<'_>, config: &DumpConfig) -> Result<String, VocabError> {
    // Strings are raw bytes, so the byte order only matters for diagnostics.
    let (host_endian, file_endian) = resolve_endianness(reader.byte_order());
    tracing::debug!("Host endian: {}, file endian: {}", host_endian, file_endian);

    let field = require_field(reader, TOKENS_KEY)?;
    let vocab = extract_vocabulary(field)?;
    tracing::debug!("Extracted {} tokens from {}", vocab.len(), field.name);

    config.format.render(&vocab)
}
