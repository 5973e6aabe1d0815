//! Implementation of `lease listings` subcommands.

use anyhow::Result;
use lease_core::core::listings::{ListingPatch, NewListing};
use lease_core::core::CoreContext;
use lease_core::ids::{is_listing_id, is_user_id};
use lease_core::store::ListingFilter;

use super::helpers::{acting_user, check_id, open_services};
use crate::cli::{ListingFields, ListingPatchArgs};
use crate::output::{Formatter, OutputFormat};

impl From<ListingFields> for NewListing {
    fn from(fields: ListingFields) -> Self {
        Self {
            title: fields.title,
            description: fields.description,
            price: fields.price,
            address: fields.address,
            zip_code: fields.zip_code,
            country: fields.country,
            bedrooms: fields.bedrooms,
            distance_from_campus: fields.distance,
            lease_duration: fields.lease_duration,
            images: fields.images,
            availability: fields.availability,
        }
    }
}

impl From<ListingPatchArgs> for ListingPatch {
    fn from(args: ListingPatchArgs) -> Self {
        Self {
            title: args.title,
            description: args.description,
            price: args.price,
            address: args.address,
            zip_code: args.zip_code,
            country: args.country,
            bedrooms: args.bedrooms,
            distance_from_campus: args.distance,
            lease_duration: args.lease_duration,
            images: args.images,
            availability: args.availability,
        }
    }
}

/// Post a listing as the acting user.
#[tracing::instrument(skip(ctx, fields))]
pub fn run_listings_create(
    ctx: &CoreContext,
    fields: ListingFields,
    actor: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let services = open_services(ctx)?;
    let owner = acting_user(&services, actor)?;
    let listing = services.listings().create(&owner, &fields.into())?;
    Formatter::new(format).print(&listing)?;
    Ok(())
}

/// Browse listings.
#[tracing::instrument(skip(ctx))]
pub fn run_listings_list(
    ctx: &CoreContext,
    filter: &ListingFilter,
    format: OutputFormat,
) -> Result<()> {
    if let Some(owner) = &filter.owner_id {
        check_id(owner, "user", is_user_id)?;
    }
    let services = open_services(ctx)?;
    let listings = services.listings().list(filter)?;

    let empty_msg = if filter.search.is_some()
        || filter.availability.is_some()
        || filter.max_price.is_some()
        || filter.min_bedrooms.is_some()
        || filter.owner_id.is_some()
    {
        "No listings match the filters"
    } else {
        "No listings yet"
    };

    Formatter::new(format).print_list(&listings, empty_msg, "listings")?;
    Ok(())
}

/// Show one listing.
#[tracing::instrument(skip(ctx))]
pub fn run_listings_show(ctx: &CoreContext, listing_id: &str, format: OutputFormat) -> Result<()> {
    check_id(listing_id, "listing", is_listing_id)?;
    let services = open_services(ctx)?;
    let listing = services.listings().get(listing_id)?;
    Formatter::new(format).print(&listing)?;
    Ok(())
}

/// Edit a listing the acting user owns.
#[tracing::instrument(skip(ctx, patch))]
pub fn run_listings_update(
    ctx: &CoreContext,
    listing_id: &str,
    patch: ListingPatchArgs,
    actor: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    check_id(listing_id, "listing", is_listing_id)?;
    let services = open_services(ctx)?;
    let actor = acting_user(&services, actor)?;
    let listing = services
        .listings()
        .update(listing_id, &actor, &patch.into())?;
    Formatter::new(format).print(&listing)?;
    Ok(())
}

/// Delete a listing the acting user owns.
#[tracing::instrument(skip(ctx))]
pub fn run_listings_delete(
    ctx: &CoreContext,
    listing_id: &str,
    actor: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    check_id(listing_id, "listing", is_listing_id)?;
    let services = open_services(ctx)?;
    let actor = acting_user(&services, actor)?;
    services.listings().delete(listing_id, &actor)?;

    let result = serde_json::json!({
        "listing_id": listing_id,
        "deleted": true,
    });
    Formatter::new(format).print(&result)?;
    Ok(())
}
