//! Implementation of `lease users` subcommands.

use anyhow::Result;
use lease_core::core::{CoreContext, CoreError};
use lease_core::ids::is_user_id;
use lease_core::store::UserProfile;

use super::helpers::{check_id, open_services};
use crate::output::{Formatter, OutputFormat};

/// Register a member.
#[tracing::instrument(skip(ctx, password_hash))]
pub fn run_users_register(
    ctx: &CoreContext,
    name: &str,
    email: &str,
    password_hash: &str,
    format: OutputFormat,
) -> Result<()> {
    let services = open_services(ctx)?;
    let user = services.users().register(name, email, password_hash)?;
    Formatter::new(format).print(&UserProfile::from(user))?;
    Ok(())
}

/// Show a member's public profile.
#[tracing::instrument(skip(ctx))]
pub fn run_users_show(ctx: &CoreContext, user_id: &str, format: OutputFormat) -> Result<()> {
    check_id(user_id, "user", is_user_id)?;
    let services = open_services(ctx)?;
    let profile = services.users().profile(user_id)?;
    Formatter::new(format).print(&profile)?;
    Ok(())
}

/// Find a member's public profile by email.
#[tracing::instrument(skip(ctx))]
pub fn run_users_lookup(ctx: &CoreContext, email: &str, format: OutputFormat) -> Result<()> {
    let services = open_services(ctx)?;
    let user = services
        .users()
        .find_by_email(email)?
        .ok_or_else(|| CoreError::UserNotFound {
            user_id: email.trim().to_string(),
        })?;
    Formatter::new(format).print(&UserProfile::from(user))?;
    Ok(())
}
