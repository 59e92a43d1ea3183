//! Vocabulary rendering

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::{VocabError, Vocabulary};
use crate::config::OutputFormat;

impl OutputFormat {
    /// Render a vocabulary in this format
    pub fn render(self, vocab: &Vocabulary<'_>) -> Result<String, VocabError> {
        match self {
            OutputFormat::Text => Ok(render_text(vocab)),
            OutputFormat::Json => render_json(vocab),
        }
    }
}

/// One `index: token` line per entry
pub fn render_text(vocab: &Vocabulary<'_>) -> String {
    let mut out = String::new();
    for (index, token) in vocab.iter() {
        out.push_str(&index.to_string());
        out.push_str(": ");
        out.push_str(token);
        out.push('\n');
    }
    out
}

/// A pretty-printed JSON object keyed by the decimal index
pub fn render_json(vocab: &Vocabulary<'_>) -> Result<String, VocabError> {
    let mut out = serde_json::to_string_pretty(vocab)?;
    out.push('\n');
    Ok(out)
}

// Serialized as a map so keys stay in index order ("2" before "10").
impl Serialize for Vocabulary<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (index, token) in self.iter() {
            map.serialize_entry(&index.to_string(), token)?;
        }
        map.end()
    }
}
