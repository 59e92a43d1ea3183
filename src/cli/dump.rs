//! Vocabulary dump command

use std::io::{self, Write};

use anyhow::{Context, Result};

use crate::config::DumpConfig;
use crate::loader::{detect_gguf, find_model_path, get_gguf_info, GgufFile};
use crate::tokenizer::dump_vocabulary;

/// Dump the vocabulary of `model` to stdout
pub fn dump(model: &str, config: &DumpConfig) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    dump_to(model, config, &mut out)
}

/// Dump the vocabulary of `model` to `out`
///
/// The output is fully rendered before anything is written, so a failure
/// leaves `out` untouched.
pub fn dump_to<W: Write>(model: &str, config: &DumpConfig, out: &mut W) -> Result<()> {
    match serde_json::to_string(config) {
        Ok(json) => tracing::debug!("Dump configuration: {}", json),
        Err(e) => tracing::debug!("Dump configuration not serializable: {}", e),
    }

    if config.announce_progress() {
        tracing::info!("* Loading: {}", model);
    }

    let model_path = find_model_path(model, &config.model_dir)?;
    let path = detect_gguf(&model_path)?;

    let file = GgufFile::open(&path)
        .with_context(|| format!("Failed to open GGUF file: {}", path.display()))?;
    let reader = file
        .reader()
        .with_context(|| format!("Failed to parse GGUF file: {}", path.display()))?;

    let info = get_gguf_info(&reader);
    tracing::debug!(
        "GGUF v{} ({:?}): {} metadata fields, {} tensors",
        info.version,
        info.byte_order,
        info.metadata_count,
        info.tensor_count
    );

    let rendered = dump_vocabulary(&reader, config)
        .with_context(|| format!("Failed to dump vocabulary of {}", file.path().display()))?;

    out.write_all(rendered.as_bytes())?;
    out.flush()?;

    Ok(())
}
