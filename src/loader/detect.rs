//! Model path resolution

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};

/// Resolve a model argument to an existing path
///
/// Tries the argument as a path first, then as a name inside `model_dir`.
pub fn find_model_path(model: &str, model_dir: &Path) -> Result<PathBuf> {
    let direct = PathBuf::from(model);
    if direct.exists() {
        return Ok(direct);
    }

    let in_dir = model_dir.join(model);
    if in_dir.exists() {
        return Ok(in_dir);
    }

    Err(anyhow!("Model not found: {}", model))
}

/// Locate the GGUF file for a resolved model path
///
/// The path can be:
/// - A direct path to a file, whatever its extension (the reader checks the magic)
/// - A directory containing a .gguf file (the first match is used)
pub fn detect_gguf<P: AsRef<Path>>(path: P) -> Result<PathBuf> {
    let path = path.as_ref();

    if path.is_file() {
        Ok(path.to_path_buf())
    } else if path.is_dir() {
        find_gguf_in_dir(path)
            .ok_or_else(|| anyhow!("No GGUF files found in directory: {}", path.display()))
    } else {
        Err(anyhow!("Model path does not exist: {}", path.display()))
    }
}

/// Find a GGUF file in a directory
fn find_gguf_in_dir(dir: &Path) -> Option<PathBuf> {
    let pattern = Path::new(&glob::Pattern::escape(dir.to_str()?)).join("*.gguf");
    let mut matches: Vec<PathBuf> = glob::glob(pattern.to_str()?)
        .ok()?
        .filter_map(|r| r.ok())
        .collect();
    matches.sort();
    if matches.len() > 1 {
        tracing::warn!(
            "{} GGUF files in {}, using {}",
            matches.len(),
            dir.display(),
            matches[0].display()
        );
    }
    matches.into_iter().next()
}
