// This is the entry point of the suggestion box bot.
//
// **Architecture Overview:**
// - `core/` = Business logic (platform-agnostic)
// - `infra/` = Implementations of core traits (databases)
// - `discord/` = Discord-specific adapters (transport, commands, events)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Set up the Discord framework
// 4. Register commands and event handlers

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "discord/discord_layer.rs"]
mod discord;
#[path = "infra/infra_layer.rs"]
mod infra;

use crate::core::moderation::{AdminService, ModerationService, SuggestionConfig};
use crate::core::proposals::ProposalService;
use crate::discord::moderation::{events, SerenityTransport};
use crate::discord::{Data, Error};
use crate::infra::moderation::SqliteModerationStore;
use anyhow::Context as _;
use poise::serenity_prelude as serenity;
use std::sync::Arc;

const DEFAULT_DB_PATH: &str = "data/suggestions.db";

/// Event handler for non-command Discord events.
async fn event_handler(
    _ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::Message { new_message } => {
            // Ignore bot messages (including our own)
            if new_message.author.bot {
                return Ok(());
            }
            events::handle_message(data, new_message).await;
        }
        serenity::FullEvent::InteractionCreate {
            interaction: serenity::Interaction::Component(component),
        } => {
            events::handle_component(data, component).await;
        }
        _ => {}
    }

    Ok(())
}

/// Read a required non-zero id from the environment.
fn required_id(name: &str) -> anyhow::Result<u64> {
    let raw = std::env::var(name).with_context(|| format!("Missing {} environment variable", name))?;
    let id = raw
        .trim()
        .parse::<u64>()
        .with_context(|| format!("{} must be a numeric Discord id, got {:?}", name, raw))?;
    anyhow::ensure!(id != 0, "{} must not be zero", name);
    Ok(id)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging so we can see what's happening
    tracing_subscriber::fmt::init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    let token = std::env::var("DISCORD_TOKEN").context(
        "Missing DISCORD_TOKEN environment variable! Create a .env file with your bot token.",
    )?;
    let config = SuggestionConfig {
        owner_id: required_id("SUGGESTIONS_OWNER_ID")?,
        channel_id: required_id("SUGGESTIONS_CHANNEL_ID")?,
    };
    let db_path =
        std::env::var("SUGGESTIONS_DB_PATH").unwrap_or_else(|_| DEFAULT_DB_PATH.to_string());

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================
    // This is the "composition root" where we wire everything together.

    let store = Arc::new(
        SqliteModerationStore::new(&db_path)
            .await
            .with_context(|| format!("Failed to open suggestion database at {}", db_path))?,
    );

    let proposals = Arc::new(ProposalService::new(Arc::clone(&store), config));
    let moderation = Arc::new(ModerationService::new(Arc::clone(&store), config));
    let admin = Arc::new(AdminService::new(Arc::clone(&store), config.owner_id));

    tracing::info!(
        owner_id = config.owner_id,
        channel_id = moderation.config().channel_id,
        db_path = %db_path,
        "Configuration loaded"
    );

    // ========================================================================
    // DISCORD FRAMEWORK SETUP
    // ========================================================================

    let intents = serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::DIRECT_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT; // Required to read message content

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: discord::commands::suggestions::all(),
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some(crate::core::proposals::COMMAND_PREFIX.to_string()),
                ..Default::default()
            },
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(move |ctx, _ready, _framework| {
            Box::pin(async move {
                let transport = SerenityTransport::new(ctx.http.clone());

                match admin.seed_owner(&transport).await {
                    Ok(true) => {}
                    Ok(false) => tracing::debug!("Owner already stored as moderator"),
                    Err(e) => tracing::warn!(error = %e, "Failed to seed owner as moderator"),
                }

                tracing::info!("Suggestion box is ready");
                Ok(Data {
                    proposals,
                    moderation,
                    admin,
                    transport,
                })
            })
        })
        .build();

    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await
        .context("Error creating client")?;

    client.start().await.context("Error running bot")?;
    Ok(())
}
