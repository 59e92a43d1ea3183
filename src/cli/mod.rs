//! CLI
//!
//! A single command: dump the tokenizer vocabulary of a GGUF model.

mod dump;

pub use dump::{dump, dump_to};

use std::ffi::OsString;

use clap::Parser;

use crate::config::{DumpConfig, OutputFormat};

/// Dump the tokenizer vocabulary of a GGUF model
#[derive(Parser, Debug)]
#[command(name = "gguf-vocab")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// GGUF model file, a directory containing one, or a name in $GGUF_VOCAB_MODEL_DIR
    pub model: String,

    /// Produce JSON output
    #[arg(long)]
    pub json: bool,

    /// Verbose output
    #[arg(long, short)]
    pub verbose: bool,
}

impl Cli {
    /// Parse the process arguments
    ///
    /// With no arguments at all, help is printed to stdout and the process
    /// exits successfully.
    pub fn parse_args() -> Self {
        Self::parse_from(help_if_empty(std::env::args_os()))
    }

    /// Configuration for this invocation
    pub fn config(&self) -> DumpConfig {
        DumpConfig::new(OutputFormat::from_json_flag(self.json)).with_verbose(self.verbose)
    }
}

fn help_if_empty<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    if args.len() <= 1 {
        args.push("--help".into());
    }
    args
}
