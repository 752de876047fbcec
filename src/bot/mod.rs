//! Bot layer - Discord-specific interface and command handlers
//!
//! This module wires the ledger commands into a poise framework, holds the state
//! every command shares, and turns command failures into one-line replies.

/// Discord command implementations (entries, reports, charts, general)
pub mod commands;

use crate::{
    config::AppConfig,
    core::SharedLedger,
    errors::{Error, Result},
};
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Shared data available to all bot commands.
pub struct BotData {
    /// The record log every command reads from or writes to
    pub ledger: SharedLedger,
    /// Application settings
    pub config: Arc<AppConfig>,
}

impl BotData {
    /// Creates a new `BotData` instance from an opened ledger and the loaded settings.
    #[must_use]
    pub const fn new(ledger: SharedLedger, config: Arc<AppConfig>) -> Self {
        Self { ledger, config }
    }
}

/// Poise context type used by every command.
pub type Context<'a> = poise::Context<'a, BotData, Error>;

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {:?}", error);
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error in command `{}`: {:?}", ctx.command().name, error);
            if let Err(e) = ctx.say(error.user_message()).await {
                error!("Failed to send error message: {}", e);
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                warn!("Error while handling error: {}", e);
            }
        }
    }
}

/// Connects to Discord and serves commands until the client stops.
///
/// # Errors
/// Returns `Error::FrameworkError` if the client cannot be built or loses its connection.
#[instrument(skip(token, config, ledger))]
pub async fn run_bot(token: String, config: Arc<AppConfig>, ledger: SharedLedger) -> Result<()> {
    let prefix = config.command_prefix.clone();

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::all(),
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some(prefix),
                ..Default::default()
            },
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                info!("Registering commands globally...");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(BotData::new(ledger, config))
            })
        })
        .build();

    // Prefix commands need message content
    let intents = serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::DIRECT_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT;

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::Client::builder(&token, intents)
        .framework(framework)
        .await
        .inspect_err(|e| error!("Error creating client: {:?}", e))?;

    info!("Starting bot client...");
    client
        .start()
        .await
        .inspect_err(|e| error!("Client error: {:?}", e))?;
    Ok(())
}
