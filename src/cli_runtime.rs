use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use draftlink::model::ClientConfig;

use crate::cli_commands::Commands;

#[derive(Parser)]
#[command(name = "draftlink")]
#[command(about = "Version a local file through the DraftLink desktop service", long_about = None)]
pub(crate) struct Cli {
    /// JSON config file (defaults to $DRAFTLINK_CONFIG, then built-in defaults)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Service base URL, overriding the config file
    #[arg(long, global = true)]
    url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

pub(crate) fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let mut config = ClientConfig::resolve(cli.config.as_deref())?;
    if let Some(url) = cli.url {
        config.base_url = url;
        config.validate()?;
    }

    crate::cli_exec::handle_command(config, cli.command)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
