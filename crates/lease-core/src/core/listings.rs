//! Listing service: create, browse, edit, and remove rental listings.
//!
//! Listing edits never touch `average_rating` or `review_count`; those are
//! owned by the rating aggregator.

use tracing::debug;

use crate::ids::new_listing_id;
use crate::store::{now_ts, Availability, Database, Listing, ListingFilter};
use crate::validation::{self, ADDRESS_LEN, COUNTRY_LEN, DESCRIPTION_LEN, LEASE_DURATION_LEN, TITLE_LEN, ZIP_CODE_LEN};

use super::{CoreError, CoreResult};

/// Fields for a new listing.
#[derive(Debug, Clone)]
pub struct NewListing {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub address: String,
    pub zip_code: String,
    pub country: String,
    pub bedrooms: i64,
    pub distance_from_campus: f64,
    pub lease_duration: String,
    pub images: Vec<String>,
    /// Defaults to [`Availability::Available`].
    pub availability: Option<Availability>,
}

/// Partial update of a listing. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct ListingPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub address: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    pub bedrooms: Option<i64>,
    pub distance_from_campus: Option<f64>,
    pub lease_duration: Option<String>,
    pub images: Option<Vec<String>>,
    pub availability: Option<Availability>,
}

/// Service for listing operations.
pub struct ListingService<'a> {
    db: &'a Database,
}

impl<'a> ListingService<'a> {
    pub(crate) const fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Create a listing owned by `owner_id`.
    pub fn create(&self, owner_id: &str, input: &NewListing) -> CoreResult<Listing> {
        if self.db.get_user(owner_id)?.is_none() {
            return Err(CoreError::UserNotFound {
                user_id: owner_id.to_string(),
            });
        }

        let ts = now_ts();
        let listing = Listing {
            listing_id: new_listing_id()?,
            owner_id: owner_id.to_string(),
            title: validation::text("title", &input.title, TITLE_LEN)?,
            description: validation::text("description", &input.description, DESCRIPTION_LEN)?,
            price: validation::price(input.price)?,
            address: validation::text("address", &input.address, ADDRESS_LEN)?,
            zip_code: validation::text("zip_code", &input.zip_code, ZIP_CODE_LEN)?,
            country: validation::text("country", &input.country, COUNTRY_LEN)?,
            bedrooms: validation::bedrooms(input.bedrooms)?,
            distance_from_campus: validation::distance(input.distance_from_campus)?,
            lease_duration: validation::text(
                "lease_duration",
                &input.lease_duration,
                LEASE_DURATION_LEN,
            )?,
            images: validation::images(&input.images),
            availability: input.availability.unwrap_or_default(),
            average_rating: 0.0,
            review_count: 0,
            created_at: ts.clone(),
            updated_at: ts,
        };

        self.db.insert_listing(&listing)?;
        debug!(listing_id = %listing.listing_id, owner_id, "created listing");
        Ok(listing)
    }

    /// Get a listing by ID.
    ///
    /// Returns `Err(CoreError::ListingNotFound)` if the listing does not exist.
    pub fn get(&self, listing_id: &str) -> CoreResult<Listing> {
        self.db
            .get_listing(listing_id)?
            .ok_or_else(|| CoreError::ListingNotFound {
                listing_id: listing_id.to_string(),
            })
    }

    /// Browse listings, newest first.
    pub fn list(&self, filter: &ListingFilter) -> CoreResult<Vec<Listing>> {
        Ok(self.db.list_listings(filter)?)
    }

    /// Apply a partial update. Only the owner may edit a listing.
    pub fn update(
        &self,
        listing_id: &str,
        actor_id: &str,
        patch: &ListingPatch,
    ) -> CoreResult<Listing> {
        let mut listing = self.require_owned(listing_id, actor_id, "update")?;

        if let Some(title) = &patch.title {
            listing.title = validation::text("title", title, TITLE_LEN)?;
        }
        if let Some(description) = &patch.description {
            listing.description = validation::text("description", description, DESCRIPTION_LEN)?;
        }
        if let Some(price) = patch.price {
            listing.price = validation::price(price)?;
        }
        if let Some(address) = &patch.address {
            listing.address = validation::text("address", address, ADDRESS_LEN)?;
        }
        if let Some(zip_code) = &patch.zip_code {
            listing.zip_code = validation::text("zip_code", zip_code, ZIP_CODE_LEN)?;
        }
        if let Some(country) = &patch.country {
            listing.country = validation::text("country", country, COUNTRY_LEN)?;
        }
        if let Some(bedrooms) = patch.bedrooms {
            listing.bedrooms = validation::bedrooms(bedrooms)?;
        }
        if let Some(distance) = patch.distance_from_campus {
            listing.distance_from_campus = validation::distance(distance)?;
        }
        if let Some(duration) = &patch.lease_duration {
            listing.lease_duration =
                validation::text("lease_duration", duration, LEASE_DURATION_LEN)?;
        }
        if let Some(images) = &patch.images {
            listing.images = validation::images(images);
        }
        if let Some(availability) = patch.availability {
            listing.availability = availability;
        }
        listing.updated_at = now_ts();

        if !self.db.update_listing(&listing)? {
            return Err(CoreError::ListingNotFound {
                listing_id: listing_id.to_string(),
            });
        }

        // Re-read so the returned rating fields are current.
        self.get(listing_id)
    }

    /// Delete a listing. Only the owner may delete it; its reviews go with it.
    pub fn delete(&self, listing_id: &str, actor_id: &str) -> CoreResult<()> {
        self.require_owned(listing_id, actor_id, "delete")?;
        if !self.db.delete_listing(listing_id)? {
            return Err(CoreError::ListingNotFound {
                listing_id: listing_id.to_string(),
            });
        }
        debug!(listing_id, "deleted listing");
        Ok(())
    }

    fn require_owned(&self, listing_id: &str, actor_id: &str, action: &str) -> CoreResult<Listing> {
        let listing = self.get(listing_id)?;
        if listing.owner_id != actor_id {
            return Err(CoreError::forbidden(format!(
                "not authorized to {action} this listing"
            )));
        }
        Ok(listing)
    }
}
