use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gguf_vocab::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse_args();
    let config = cli.config();

    // Logs go to stderr; stdout carries only the vocabulary.
    tracing_subscriber::registry()
        .with(config.log_filter())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    gguf_vocab::cli::dump(&cli.model, &config)?;

    Ok(())
}
