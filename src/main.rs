mod bot;
mod command;
mod config;
mod keygen;
mod token;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::bot::AppState;
use crate::config::{BotConfig, EnvStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,envbot=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // No CLI flags: the env file location itself comes from the environment.
    let env_path = std::env::var("ENVBOT_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(".env"));

    info!("Loading configuration from: {}", env_path.display());
    let store = EnvStore::new(&env_path);
    let config = BotConfig::load(&store)
        .with_context(|| format!("Failed to load config from {}", env_path.display()))?;

    info!("Configuration loaded successfully");
    info!("  Token service: {}", config.token_url);
    info!("  API domain: {}", config.api_domain);
    info!("  Authorized chats: {:?}", config.authorized_users);

    // Create shared state
    let state = Arc::new(AppState::new(config, store)?);

    // Run the Telegram bot
    info!("Bot is starting...");
    bot::run(state).await?;

    Ok(())
}
