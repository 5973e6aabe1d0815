//! Implementation of `lease messages` subcommands.

use anyhow::Result;
use lease_core::core::CoreContext;
use lease_core::ids::{is_listing_id, is_message_id, is_user_id};

use super::helpers::{acting_user, check_id, open_services};
use crate::output::{Formatter, OutputFormat};

/// Send a message as the acting user.
#[tracing::instrument(skip(ctx, content))]
pub fn run_messages_send(
    ctx: &CoreContext,
    receiver_id: &str,
    content: &str,
    listing_id: Option<&str>,
    actor: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    check_id(receiver_id, "user", is_user_id)?;
    if let Some(listing_id) = listing_id {
        check_id(listing_id, "listing", is_listing_id)?;
    }
    let services = open_services(ctx)?;
    let sender = acting_user(&services, actor)?;
    let message = services
        .messages()
        .send(&sender, receiver_id, content, listing_id)?;
    Formatter::new(format).print(&message)?;
    Ok(())
}

/// List the acting user's conversations.
#[tracing::instrument(skip(ctx))]
pub fn run_messages_conversations(
    ctx: &CoreContext,
    actor: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let services = open_services(ctx)?;
    let viewer = acting_user(&services, actor)?;
    let conversations = services.conversations().list(&viewer)?;
    Formatter::new(format).print_list(&conversations, "No conversations yet", "conversations")?;
    Ok(())
}

/// Show the thread between the acting user and a partner.
#[tracing::instrument(skip(ctx))]
pub fn run_messages_show(
    ctx: &CoreContext,
    partner_id: &str,
    actor: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    check_id(partner_id, "user", is_user_id)?;
    let services = open_services(ctx)?;
    let viewer = acting_user(&services, actor)?;
    let thread = services
        .conversations()
        .get_conversation(&viewer, partner_id)?;
    Formatter::new(format).print_list(&thread, "No messages with this member", "messages")?;
    Ok(())
}

/// Mark everything a partner sent the acting user as read.
#[tracing::instrument(skip(ctx))]
pub fn run_messages_read(
    ctx: &CoreContext,
    partner_id: &str,
    actor: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    check_id(partner_id, "user", is_user_id)?;
    let services = open_services(ctx)?;
    let viewer = acting_user(&services, actor)?;
    let result = services.inbox().mark_read(&viewer, partner_id)?;
    Formatter::new(format).print(&result)?;
    Ok(())
}

/// Count unread messages addressed to the acting user.
#[tracing::instrument(skip(ctx))]
pub fn run_messages_unread(
    ctx: &CoreContext,
    actor: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let services = open_services(ctx)?;
    let viewer = acting_user(&services, actor)?;
    let unread = services.inbox().unread_count(&viewer)?;

    let result = serde_json::json!({
        "user_id": viewer,
        "unread_count": unread,
    });
    Formatter::new(format).print(&result)?;
    Ok(())
}

/// Delete a message the acting user sent.
#[tracing::instrument(skip(ctx))]
pub fn run_messages_delete(
    ctx: &CoreContext,
    message_id: &str,
    actor: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    check_id(message_id, "message", is_message_id)?;
    let services = open_services(ctx)?;
    let sender = acting_user(&services, actor)?;
    services.messages().delete(message_id, &sender)?;

    let result = serde_json::json!({
        "message_id": message_id,
        "deleted": true,
    });
    Formatter::new(format).print(&result)?;
    Ok(())
}
