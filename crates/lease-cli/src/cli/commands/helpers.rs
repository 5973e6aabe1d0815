//! Shared helpers for CLI commands.

use anyhow::{bail, Result};
use lease_core::core::{CoreContext, LeaseServices};
use lease_core::identity::resolve_actor;
use lease_core::ids::is_user_id;

/// Ensure the configured database has been created with `lease init`.
pub fn ensure_initialized(ctx: &CoreContext) -> Result<()> {
    let path = ctx.config().db_path();
    if !path.exists() {
        bail!(
            "No database at {}. Run 'lease init' first.",
            path.display()
        );
    }
    Ok(())
}

/// Open the configured database and hand out services.
pub fn open_services(ctx: &CoreContext) -> Result<LeaseServices> {
    ensure_initialized(ctx)?;
    Ok(ctx.services()?)
}

/// Reject an identifier of the wrong shape before it reaches the core.
pub fn check_id(value: &str, kind: &str, is_valid: fn(&str) -> bool) -> Result<()> {
    if !is_valid(value) {
        bail!("Not a valid {kind} ID: {value}");
    }
    Ok(())
}

/// Resolve the acting user and check that the account exists.
pub fn acting_user(services: &LeaseServices, explicit: Option<&str>) -> Result<String> {
    let actor = resolve_actor(explicit)?;
    check_id(&actor, "user", is_user_id)?;
    services.users().get(&actor)?;
    Ok(actor)
}
