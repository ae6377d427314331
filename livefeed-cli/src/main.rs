mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use cli::handlers;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "livefeed")]
#[command(version = "0.1.0")]
#[command(about = "Multi-transport streaming client for live message channels")]
#[command(
    help_template = "{name} - {version}\n{about}\n\n{usage-heading}\n  {usage}\n\n{all-args}{options}\n"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Subscribe to a channel and print messages as they arrive
    ///
    /// Exactly one transport is active at a time. Press Ctrl-C to stop.
    ///
    /// Examples:
    ///   livefeed subscribe
    ///   livefeed subscribe --transport websocket --channel test-common
    ///   livefeed subscribe --transport longpoll --server http://localhost:7999
    Subscribe {
        /// Delivery transport (sse, websocket, longpoll)
        #[arg(short, long, default_value = "sse")]
        transport: String,

        /// Channel name
        #[arg(short, long)]
        channel: Option<String>,

        /// Stream server base URL
        #[arg(long)]
        server: Option<String>,

        /// Bearer token presented to the server
        #[arg(long)]
        token: Option<String>,

        /// Print messages as JSON records
        #[arg(long)]
        json: bool,
    },

    /// Publish a message to a channel
    Publish {
        /// Message text to publish
        message: String,

        /// Channel name
        #[arg(short, long)]
        channel: Option<String>,

        /// Publish server base URL
        #[arg(long)]
        server: Option<String>,

        /// Bearer token presented to the server
        #[arg(long)]
        token: Option<String>,
    },

    /// Configure livefeed settings
    Config {
        /// Write a default configuration file
        #[arg(long)]
        init: bool,

        /// Path to configuration file
        #[arg(long)]
        config_file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Subscribe {
            transport,
            channel,
            server,
            token,
            json,
        } => {
            handlers::handle_subscribe(transport, channel, server, token, json).await?;
        }
        Commands::Publish {
            message,
            channel,
            server,
            token,
        } => {
            handlers::handle_publish(message, channel, server, token).await?;
        }
        Commands::Config { init, config_file } => {
            if init {
                handlers::handle_config_init(config_file)?;
            } else {
                println!("Config command requires --init flag");
                println!("Usage: livefeed config --init [--config-file PATH]");
            }
        }
    }

    Ok(())
}
