//! Implementation of `lease ratings` subcommands.

use anyhow::Result;
use lease_core::core::CoreContext;
use lease_core::ids::is_listing_id;

use super::helpers::{check_id, open_services};
use crate::output::{Formatter, OutputFormat};

/// Recompute derived ratings for one listing or all of them.
#[tracing::instrument(skip(ctx))]
pub fn run_ratings_reconcile(
    ctx: &CoreContext,
    listing_id: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    if let Some(listing_id) = listing_id {
        check_id(listing_id, "listing", is_listing_id)?;
    }
    let services = open_services(ctx)?;
    let recomputed = services.ratings().reconcile(listing_id)?;

    let result = serde_json::json!({
        "listing_id": listing_id,
        "recomputed": recomputed,
    });
    Formatter::new(format).print(&result)?;
    Ok(())
}
