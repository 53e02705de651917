// Discord commands for the suggestion box.
//
// Same pattern as every command file: pull primitive ids out of the context,
// call the core service, let the service send its own replies through the
// transport. Outcomes are only logged here.

use crate::core::moderation::{AdminOutcome, AdminService, ModerationService};
use crate::core::proposals::ProposalService;
use crate::discord::moderation::SerenityTransport;
use crate::infra::moderation::SqliteModerationStore;
use std::sync::Arc;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

/// Shared state handed to every command and event.
pub struct Data {
    pub proposals: Arc<ProposalService<SqliteModerationStore>>,
    pub moderation: Arc<ModerationService<SqliteModerationStore>>,
    pub admin: Arc<AdminService<SqliteModerationStore>>,
    pub transport: SerenityTransport,
}

/// Welcome text, or the control panel for the owner and moderators.
#[poise::command(prefix_command)]
pub async fn start(ctx: Context<'_>) -> Result<(), Error> {
    let data = ctx.data();
    let panel = data
        .proposals
        .start(&data.transport, ctx.channel_id().get(), ctx.author().id.get())
        .await;

    tracing::debug!(user_id = ctx.author().id.get(), ?panel, "Start panel shown");
    Ok(())
}

/// Show the oldest pending suggestion.
#[poise::command(prefix_command)]
pub async fn proposals(ctx: Context<'_>) -> Result<(), Error> {
    let data = ctx.data();
    let outcome = data
        .moderation
        .show_next(&data.transport, ctx.channel_id().get(), ctx.author().id.get())
        .await;

    tracing::debug!(user_id = ctx.author().id.get(), ?outcome, "Queue requested");
    Ok(())
}

/// Make a user a moderator (owner only).
#[poise::command(prefix_command)]
pub async fn addadmin(
    ctx: Context<'_>,
    #[description = "User ID of the new moderator"] user_id: Option<String>,
) -> Result<(), Error> {
    let data = ctx.data();
    let outcome = data
        .admin
        .add_moderator(
            &data.transport,
            ctx.channel_id().get(),
            ctx.author().id.get(),
            user_id.as_deref(),
        )
        .await;

    log_admin_outcome("addadmin", ctx.author().id.get(), &outcome);
    Ok(())
}

/// Revoke a moderator (owner only).
#[poise::command(prefix_command)]
pub async fn removeadmin(
    ctx: Context<'_>,
    #[description = "User ID of the moderator"] user_id: Option<String>,
) -> Result<(), Error> {
    let data = ctx.data();
    let outcome = data
        .admin
        .remove_moderator(
            &data.transport,
            ctx.channel_id().get(),
            ctx.author().id.get(),
            user_id.as_deref(),
        )
        .await;

    log_admin_outcome("removeadmin", ctx.author().id.get(), &outcome);
    Ok(())
}

/// List moderators (owner only).
#[poise::command(prefix_command)]
pub async fn admins(ctx: Context<'_>) -> Result<(), Error> {
    let data = ctx.data();
    let outcome = data
        .admin
        .list_moderators(&data.transport, ctx.channel_id().get(), ctx.author().id.get())
        .await;

    log_admin_outcome("admins", ctx.author().id.get(), &outcome);
    Ok(())
}

fn log_admin_outcome(command: &str, actor_id: u64, outcome: &AdminOutcome) {
    match outcome {
        AdminOutcome::AccessDenied => {
            tracing::debug!(command, actor_id, "Owner-only command refused");
        }
        _ => tracing::debug!(command, actor_id, ?outcome, "Admin command handled"),
    }
}

/// Every command the framework registers.
pub fn all() -> Vec<poise::Command<Data, Error>> {
    vec![start(), proposals(), addadmin(), removeadmin(), admins()]
}
