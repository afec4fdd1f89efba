use clap::Parser;
use oasmux::cli::{run, Cli};
use oasmux::logging::{init_logging, LogConfig};

fn main() -> anyhow::Result<()> {
    init_logging(&LogConfig::from_env())?;
    run(Cli::parse())
}
