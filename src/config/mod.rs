//! Configuration for a vocabulary dump
//!
//! Built once from the command line and passed explicitly to the dump
//! operation; nothing here reads global state after construction.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Environment variable naming the directory searched for model names
pub const MODEL_DIR_ENV: &str = "GGUF_VOCAB_MODEL_DIR";

const DEFAULT_LOG_FILTER: &str = "gguf_vocab=info";
const VERBOSE_LOG_FILTER: &str = "gguf_vocab=debug";

/// Output format of the dump
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `index: token` lines
    #[default]
    Text,
    /// Pretty-printed JSON object keyed by index
    Json,
}

impl OutputFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Dump configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DumpConfig {
    /// Output format
    #[serde(default)]
    pub format: OutputFormat,

    /// Raise the log level to debug
    #[serde(default)]
    pub verbose: bool,

    /// Directory searched when the model argument is not a path
    #[serde(default = "default_model_dir")]
    pub model_dir: PathBuf,
}

fn default_model_dir() -> PathBuf {
    std::env::var(MODEL_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./models"))
}

impl Default for DumpConfig {
    fn default() -> Self {
        Self::new(OutputFormat::default())
    }
}

impl DumpConfig {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            verbose: false,
            model_dir: default_model_dir(),
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_model_dir(mut self, model_dir: impl Into<PathBuf>) -> Self {
        self.model_dir = model_dir.into();
        self
    }

    /// Log filter for this run
    ///
    /// `--verbose` forces debug output; otherwise `RUST_LOG` applies, falling
    /// back to info.
    pub fn log_filter(&self) -> EnvFilter {
        if self.verbose {
            EnvFilter::new(VERBOSE_LOG_FILTER)
        } else {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into())
        }
    }

    /// Whether informational progress lines should be logged.
    ///
    /// JSON output is meant to be piped, so it stays quiet.
    pub fn announce_progress(&self) -> bool {
        self.format == OutputFormat::Text
    }
}
