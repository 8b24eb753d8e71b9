use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "polychat")]
#[command(about = "Chat with strangers in your own language")]
#[command(version)]
pub struct Args {
    /// Suppress status output and the waiting spinner
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Log diagnostics to stderr (overridden by RUST_LOG)
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start an interactive chat session
    Chat {
        /// Language you want to read messages in (e.g., en, fr, es)
        #[arg(short = 't', long = "to")]
        to: Option<String>,

        /// WebSocket URL of the chat server
        #[arg(short = 's', long)]
        server: Option<String>,

        /// Base URL of the translation API
        #[arg(short = 'a', long)]
        api: Option<String>,
    },
    /// List languages messages can be translated into
    Languages,
    /// Configure polychat settings
    Configure {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}
