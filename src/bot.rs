use std::sync::Arc;

use anyhow::Result;
use teloxide::prelude::*;
use teloxide::types::ParseMode;
use tracing::{error, info, warn};

use crate::command::{self, Command};
use crate::config::{BotConfig, EnvStore, API_KEY_VAR};
use crate::keygen;
use crate::token::{self, TokenClient};

const DENIED_REPLY: &str = "🚫 You are not authorized to use this bot.";

const UNKNOWN_REPLY: &str = "❓ Unknown command. Use /start to see the available commands.";

const START_REPLY: &str = "*Hello! 👋*\n\n\
     Use the following commands:\n\n\
     /update_env <var> <value> - Update an environment variable 🛠️\n\
     /create_user - Generate a new API key 🔑\n\
     /get_token - Request a fresh JWT token 🎟️";

/// Shared application state
pub struct AppState {
    config: BotConfig,
    store: EnvStore,
    tokens: TokenClient,
}

impl AppState {
    pub fn new(config: BotConfig, store: EnvStore) -> Result<Self> {
        let tokens = TokenClient::new(&config.token_url)?;
        Ok(Self {
            config,
            store,
            tokens,
        })
    }
}

/// Start the Telegram bot
pub async fn run(state: Arc<AppState>) -> Result<()> {
    let bot = Bot::new(&state.config.bot_token);

    info!("Starting Telegram bot...");

    let handler = Update::filter_message().endpoint(handle_message);

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .default_handler(|upd| async move {
            warn!("Unhandled update: {:?}", upd.id);
        })
        .error_handler(LoggingErrorHandler::with_custom_text("bot"))
        .build()
        .dispatch()
        .await;

    Ok(())
}

async fn handle_message(bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let text = match msg.text() {
        Some(t) => t.to_string(),
        None => return Ok(()),
    };

    let chat_id = msg.chat.id.0;
    info!("Message from chat {}: {}", chat_id, text);

    let reply = respond(&state, chat_id, &text).await;
    bot.send_message(msg.chat.id, reply)
        .parse_mode(ParseMode::Markdown)
        .await?;

    Ok(())
}

/// Full pipeline for one inbound message: authorize, classify, execute,
/// format. Every failure becomes reply text; nothing propagates out of a
/// single message's handling.
pub async fn respond(state: &AppState, chat_id: i64, text: &str) -> String {
    if !state.config.authorized_users.contains(&chat_id) {
        return DENIED_REPLY.to_string();
    }

    let command = match command::classify(text) {
        Ok(c) => c,
        Err(e) => return e.reply().to_string(),
    };

    match command {
        Command::Start => START_REPLY.to_string(),
        Command::UpdateEnv { key, value } => match state.store.set(&key, &value).await {
            Ok(()) => format!("✅ Variable `{key}` updated to `{value}`"),
            Err(e) => {
                error!("Failed to persist {}: {:#}", key, e);
                format!("🚨 Failed to save variable `{key}`: `{e:#}`")
            }
        },
        Command::CreateUser => {
            let new_key = keygen::generate_api_key();
            match state.store.set(API_KEY_VAR, &new_key).await {
                Ok(()) => format!("🔑 New API key generated: `{new_key}`"),
                Err(e) => {
                    error!("Failed to persist the new API key: {:#}", e);
                    format!("🚨 Failed to save the new API key: `{e:#}`")
                }
            }
        }
        Command::GetToken => get_token_reply(state).await,
        Command::Unknown => UNKNOWN_REPLY.to_string(),
    }
}

async fn get_token_reply(state: &AppState) -> String {
    // Re-read the credential so a /create_user earlier in this process
    // lifetime is honored immediately.
    let api_key = match state.store.get(API_KEY_VAR) {
        Ok(Some(k)) => k,
        Ok(None) => return "🚨 No API key is configured; run /create_user first.".to_string(),
        Err(e) => {
            error!("Failed to read the API key: {:#}", e);
            return format!("🚨 Failed to read the API key: `{e:#}`");
        }
    };

    match state.tokens.fetch(&api_key).await {
        Ok(resp) => token::format_token_reply(&resp, &state.config.api_domain),
        Err(e) => {
            error!("Token request failed: {:#}", e);
            format!("🚨 Failed to obtain token: `{e:#}`")
        }
    }
}
