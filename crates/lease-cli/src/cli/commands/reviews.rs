//! Implementation of `lease reviews` subcommands.

use anyhow::Result;
use lease_core::core::CoreContext;
use lease_core::ids::{is_listing_id, is_review_id};

use super::helpers::{acting_user, check_id, open_services};
use crate::output::{Formatter, OutputFormat};

/// Review a listing as the acting user.
#[tracing::instrument(skip(ctx, comment))]
pub fn run_reviews_create(
    ctx: &CoreContext,
    listing_id: &str,
    rating: i64,
    comment: &str,
    actor: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    check_id(listing_id, "listing", is_listing_id)?;
    let services = open_services(ctx)?;
    let author = acting_user(&services, actor)?;
    let review = services
        .reviews()
        .create(listing_id, &author, rating, comment)?;
    Formatter::new(format).print(&review)?;
    Ok(())
}

/// List the reviews of a listing.
#[tracing::instrument(skip(ctx))]
pub fn run_reviews_list(ctx: &CoreContext, listing_id: &str, format: OutputFormat) -> Result<()> {
    check_id(listing_id, "listing", is_listing_id)?;
    let services = open_services(ctx)?;
    let reviews = services.reviews().list_for_listing(listing_id)?;
    Formatter::new(format).print_list(&reviews, "No reviews yet", "reviews")?;
    Ok(())
}

/// Show the acting user's review of a listing.
#[tracing::instrument(skip(ctx))]
pub fn run_reviews_mine(
    ctx: &CoreContext,
    listing_id: &str,
    actor: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    check_id(listing_id, "listing", is_listing_id)?;
    let services = open_services(ctx)?;
    let author = acting_user(&services, actor)?;
    let review = services.reviews().get_mine(listing_id, &author)?;
    Formatter::new(format).print(&review)?;
    Ok(())
}

/// Edit the acting user's review.
#[tracing::instrument(skip(ctx, comment))]
pub fn run_reviews_update(
    ctx: &CoreContext,
    review_id: &str,
    rating: Option<i64>,
    comment: Option<&str>,
    actor: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    check_id(review_id, "review", is_review_id)?;
    let services = open_services(ctx)?;
    let author = acting_user(&services, actor)?;
    let review = services
        .reviews()
        .update(review_id, &author, rating, comment)?;
    Formatter::new(format).print(&review)?;
    Ok(())
}

/// Delete the acting user's review.
#[tracing::instrument(skip(ctx))]
pub fn run_reviews_delete(
    ctx: &CoreContext,
    review_id: &str,
    actor: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    check_id(review_id, "review", is_review_id)?;
    let services = open_services(ctx)?;
    let author = acting_user(&services, actor)?;
    services.reviews().delete(review_id, &author)?;

    let result = serde_json::json!({
        "review_id": review_id,
        "deleted": true,
    });
    Formatter::new(format).print(&result)?;
    Ok(())
}
