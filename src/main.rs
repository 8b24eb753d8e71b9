use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use polychat_cli::cli::commands::{chat, configure, languages};
use polychat_cli::cli::{Args, Command};
use polychat_cli::output::{self, OutputConfig};
use polychat_cli::translation::validate_language;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    output::init(OutputConfig::from_flags(args.quiet, args.no_color));
    init_tracing(args.verbose);

    match args.command {
        Command::Chat { to, server, api } => {
            if let Some(ref lang) = to {
                validate_language(lang)?;
            }

            let options = chat::ChatOptions { to, server, api };
            chat::run_chat(options).await?;
        }
        Command::Languages => {
            languages::print_catalog().await?;
        }
        Command::Configure { show } => {
            configure::run_configure(show)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(!output::is_no_color())
        .with_writer(std::io::stderr)
        .try_init();
}
