//! CLI command handlers

use anyhow::{Context, Result};
use livefeed_core::models::{Configuration, TransportKind};
use livefeed_core::services::logging::init_logging;
use livefeed_core::{Publisher, TransportManager};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::broadcast::error::RecvError;

/// Load the configuration file and fold CLI overrides on top.
fn load_configuration(
    channel: Option<String>,
    stream_server: Option<String>,
    publish_server: Option<String>,
    token: Option<String>,
) -> Result<Configuration> {
    let path = Configuration::default_config_path()
        .context("Failed to determine configuration path")?;
    let mut config =
        Configuration::load_from_file(&path).context("Failed to load configuration")?;

    if let Some(channel) = channel {
        config.channel = channel;
    }
    if let Some(server) = stream_server {
        config.stream_base_url = server;
    }
    if let Some(server) = publish_server {
        config.publish_base_url = server;
    }
    if let Some(token) = token {
        config.auth_token = token;
    }

    config
        .validate()
        .map_err(|errors| anyhow::anyhow!("Invalid configuration: {}", errors.join("; ")))?;
    Ok(config)
}

/// Handle the 'subscribe' command
pub async fn handle_subscribe(
    transport: String,
    channel: Option<String>,
    server: Option<String>,
    token: Option<String>,
    json: bool,
) -> Result<()> {
    let kind: TransportKind = transport.parse()?;
    let config = load_configuration(channel, server, None, token)?;
    let _ = init_logging(config.log_level.clone());

    let manager = TransportManager::new(config);
    let mut feed = manager.subscribe();
    let mut status = manager.status();
    manager.select(Some(kind)).await;

    if !json {
        println!(
            "📡 Subscribed to '{}' via {} (Ctrl-C to stop)",
            manager.config().channel,
            kind
        );
    }

    loop {
        tokio::select! {
            received = feed.recv() => match received {
                Ok(message) => {
                    if json {
                        println!("{}", serde_json::to_string(&message)?);
                    } else {
                        match &message.timestamp {
                            Some(ts) => println!("[{}] {}", ts, message.body),
                            None => println!("{}", message.body),
                        }
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    eprintln!("⚠️  Dropped {} messages (consumer too slow)", skipped);
                }
                Err(RecvError::Closed) => break,
            },
            changed = status.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = *status.borrow_and_update();
                if !json {
                    println!("— status: {}", state);
                }
            }
            _ = signal::ctrl_c() => break,
        }
    }

    manager.stop().await;
    if !json {
        println!("👋 Subscription stopped");
    }
    Ok(())
}

/// Handle the 'publish' command
pub async fn handle_publish(
    message: String,
    channel: Option<String>,
    server: Option<String>,
    token: Option<String>,
) -> Result<()> {
    let config = load_configuration(channel, None, server, token)?;
    let _ = init_logging(config.log_level.clone());
    let channel = config.channel.clone();

    let publisher = Publisher::new(Arc::new(config));
    let ack = publisher
        .publish(&message)
        .await
        .context("Failed to publish message")?;

    if ack.trim().is_empty() {
        println!("✅ Message published to '{}'", channel);
    } else {
        println!("✅ Message published to '{}': {}", channel, ack.trim());
    }
    Ok(())
}

/// Handle 'config --init'
pub fn handle_config_init(config_file: Option<PathBuf>) -> Result<()> {
    let path = match config_file {
        Some(path) => path,
        None => Configuration::default_config_path()
            .context("Failed to determine configuration path")?,
    };

    let config = Configuration::default();
    config
        .save_to_file(&path)
        .with_context(|| format!("Failed to write configuration to {}", path.display()))?;

    println!("📝 Wrote default configuration to {}", path.display());
    Ok(())
}
