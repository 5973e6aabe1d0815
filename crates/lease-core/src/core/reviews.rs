//! Review lifecycle: create, edit, and delete reviews of listings.
//!
//! Every mutation that commits is followed by an explicit call to the
//! [`RatingAggregator`] for the affected listing. A failed recompute is
//! logged and leaves the review mutation in place; the listing's rating is
//! a cache and the next recompute (or a reconcile pass) repairs it.

use tracing::{debug, error};

use crate::ids::new_review_id;
use crate::store::{now_ts, Database, Review};
use crate::validation;

use super::ratings::RatingAggregator;
use super::{CoreError, CoreResult};

/// Service for review operations.
pub struct ReviewService<'a> {
    db: &'a Database,
}

impl<'a> ReviewService<'a> {
    pub(crate) const fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Create a review of `listing_id` by `author_id`.
    ///
    /// Owners cannot review their own listing (`Forbidden`) and each member
    /// may review a listing once (`Conflict`).
    #[tracing::instrument(skip(self, comment))]
    pub fn create(
        &self,
        listing_id: &str,
        author_id: &str,
        rating: i64,
        comment: &str,
    ) -> CoreResult<Review> {
        let rating = validation::rating(rating)?;
        let comment = validation::review_comment(comment)?;

        let listing = self
            .db
            .get_listing(listing_id)?
            .ok_or_else(|| CoreError::ListingNotFound {
                listing_id: listing_id.to_string(),
            })?;
        if listing.owner_id == author_id {
            return Err(CoreError::forbidden("cannot review own listing"));
        }
        if self.db.get_user(author_id)?.is_none() {
            return Err(CoreError::UserNotFound {
                user_id: author_id.to_string(),
            });
        }
        if self.db.find_review_by_author(listing_id, author_id)?.is_some() {
            return Err(CoreError::conflict("already reviewed"));
        }

        let ts = now_ts();
        let review = Review {
            review_id: new_review_id()?,
            listing_id: listing_id.to_string(),
            user_id: author_id.to_string(),
            author_name: None,
            rating,
            comment,
            created_at: ts.clone(),
            updated_at: ts,
        };

        // A concurrent create for the same pair can slip past the check
        // above; the unique index turns it into a no-op here.
        if !self.db.insert_review(&review)? {
            return Err(CoreError::conflict("already reviewed"));
        }
        debug!(review_id = %review.review_id, "created review");

        self.refresh_rating(listing_id);
        self.get(&review.review_id)
    }

    /// Edit a review. Only its author may edit it; omitted fields are kept.
    #[tracing::instrument(skip(self, comment))]
    pub fn update(
        &self,
        review_id: &str,
        actor_id: &str,
        rating: Option<i64>,
        comment: Option<&str>,
    ) -> CoreResult<Review> {
        let review = self.require_authored(review_id, actor_id)?;

        let rating = rating.map(validation::rating).transpose()?;
        let comment = comment.map(validation::review_comment).transpose()?;
        let rating = rating.unwrap_or(review.rating);
        let comment = comment.unwrap_or(review.comment);

        if !self
            .db
            .update_review(review_id, rating, &comment, &now_ts())?
        {
            return Err(CoreError::ReviewNotFound {
                review_id: review_id.to_string(),
            });
        }
        debug!(review_id, "updated review");

        self.refresh_rating(&review.listing_id);
        self.get(review_id)
    }

    /// Delete a review. Only its author may delete it.
    #[tracing::instrument(skip(self))]
    pub fn delete(&self, review_id: &str, actor_id: &str) -> CoreResult<()> {
        let review = self.require_authored(review_id, actor_id)?;
        let listing_id = review.listing_id;

        if !self.db.delete_review(review_id)? {
            return Err(CoreError::ReviewNotFound {
                review_id: review_id.to_string(),
            });
        }
        debug!(review_id, "deleted review");

        self.refresh_rating(&listing_id);
        Ok(())
    }

    /// Get a review by ID.
    ///
    /// Returns `Err(CoreError::ReviewNotFound)` if the review does not exist.
    pub fn get(&self, review_id: &str) -> CoreResult<Review> {
        self.db
            .get_review(review_id)?
            .ok_or_else(|| CoreError::ReviewNotFound {
                review_id: review_id.to_string(),
            })
    }

    /// Reviews of a listing, newest first.
    pub fn list_for_listing(&self, listing_id: &str) -> CoreResult<Vec<Review>> {
        if self.db.get_listing(listing_id)?.is_none() {
            return Err(CoreError::ListingNotFound {
                listing_id: listing_id.to_string(),
            });
        }
        Ok(self.db.list_reviews_for_listing(listing_id)?)
    }

    /// The review `user_id` wrote on `listing_id`, if any.
    pub fn get_by_author(&self, listing_id: &str, user_id: &str) -> CoreResult<Option<Review>> {
        Ok(self.db.find_review_by_author(listing_id, user_id)?)
    }

    /// Like [`Self::get_by_author`], but a missing review is an error.
    pub fn get_mine(&self, listing_id: &str, user_id: &str) -> CoreResult<Review> {
        self.get_by_author(listing_id, user_id)?
            .ok_or_else(|| CoreError::NoReviewByAuthor {
                listing_id: listing_id.to_string(),
                user_id: user_id.to_string(),
            })
    }

    fn require_authored(&self, review_id: &str, actor_id: &str) -> CoreResult<Review> {
        let review = self.get(review_id)?;
        if review.user_id != actor_id {
            return Err(CoreError::forbidden("not the author of this review"));
        }
        Ok(review)
    }

    fn refresh_rating(&self, listing_id: &str) {
        if let Err(err) = RatingAggregator::new(self.db).recompute(listing_id) {
            error!(listing_id, error = %err, "rating recompute failed; run reconcile to repair");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_support::{seed_listing, seed_user, services};
    use crate::core::ErrorKind;

    fn rating_of(services: &crate::core::LeaseServices, listing_id: &str) -> (f64, i64) {
        let listing = services.listings().get(listing_id).unwrap();
        (listing.average_rating, listing.review_count)
    }

    #[test]
    fn test_create_review_and_aggregate() {
        let services = services();
        let owner = seed_user(&services, "Owner", "owner@ucla.edu");
        let bob = seed_user(&services, "Bob", "bob@ucla.edu");
        let listing = seed_listing(&services, &owner);

        let review = services
            .reviews()
            .create(&listing, &bob, 4, "  Decent place overall  ")
            .unwrap();
        assert_eq!(review.comment, "Decent place overall");
        assert_eq!(review.author_name.as_deref(), Some("Bob"));
        assert_eq!(rating_of(&services, &listing), (4.0, 1));
    }

    #[test]
    fn test_owner_cannot_review() {
        let services = services();
        let owner = seed_user(&services, "Owner", "owner@ucla.edu");
        let listing = seed_listing(&services, &owner);

        let err = services
            .reviews()
            .create(&listing, &owner, 5, "My own place is great")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
        assert_eq!(rating_of(&services, &listing), (0.0, 0));
    }

    #[test]
    fn test_second_review_conflicts() {
        let services = services();
        let owner = seed_user(&services, "Owner", "owner@ucla.edu");
        let bob = seed_user(&services, "Bob", "bob@ucla.edu");
        let listing = seed_listing(&services, &owner);

        services
            .reviews()
            .create(&listing, &bob, 4, "Decent place overall")
            .unwrap();
        let err = services
            .reviews()
            .create(&listing, &bob, 1, "Changed my mind about it")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(rating_of(&services, &listing), (4.0, 1));
    }

    #[test]
    fn test_create_validates_input() {
        let services = services();
        let owner = seed_user(&services, "Owner", "owner@ucla.edu");
        let bob = seed_user(&services, "Bob", "bob@ucla.edu");
        let listing = seed_listing(&services, &owner);

        let err = services
            .reviews()
            .create(&listing, &bob, 6, "Decent place overall")
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput { field: "rating", .. }));

        let err = services
            .reviews()
            .create(&listing, &bob, 3, "  too short ")
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput { field: "comment", .. }));

        let err = services
            .reviews()
            .create("lst-0000000000", &bob, 3, "Decent place overall")
            .unwrap_err();
        assert!(matches!(err, CoreError::ListingNotFound { .. }));
    }

    #[test]
    fn test_update_is_author_only_and_partial() {
        let services = services();
        let owner = seed_user(&services, "Owner", "owner@ucla.edu");
        let bob = seed_user(&services, "Bob", "bob@ucla.edu");
        let listing = seed_listing(&services, &owner);
        let review = services
            .reviews()
            .create(&listing, &bob, 4, "Decent place overall")
            .unwrap();

        let err = services
            .reviews()
            .update(&review.review_id, &owner, Some(1), None)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);

        let updated = services
            .reviews()
            .update(&review.review_id, &bob, Some(2), None)
            .unwrap();
        assert_eq!(updated.rating, 2);
        assert_eq!(updated.comment, "Decent place overall");
        assert_eq!(rating_of(&services, &listing), (2.0, 1));

        let err = services
            .reviews()
            .update("rev-0000000000", &bob, Some(2), None)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_create_update_delete_restores_aggregate() {
        let services = services();
        let owner = seed_user(&services, "Owner", "owner@ucla.edu");
        let bob = seed_user(&services, "Bob", "bob@ucla.edu");
        let carol = seed_user(&services, "Carol", "carol@ucla.edu");
        let listing = seed_listing(&services, &owner);

        services
            .reviews()
            .create(&listing, &carol, 3, "Solid value for the area")
            .unwrap();
        let before = rating_of(&services, &listing);

        let review = services
            .reviews()
            .create(&listing, &bob, 5, "Wonderful experience here")
            .unwrap();
        services
            .reviews()
            .update(&review.review_id, &bob, Some(1), Some("Actually it was noisy"))
            .unwrap();
        services.reviews().delete(&review.review_id, &bob).unwrap();

        assert_eq!(rating_of(&services, &listing), before);
    }

    #[test]
    fn test_delete_is_author_only() {
        let services = services();
        let owner = seed_user(&services, "Owner", "owner@ucla.edu");
        let bob = seed_user(&services, "Bob", "bob@ucla.edu");
        let listing = seed_listing(&services, &owner);
        let review = services
            .reviews()
            .create(&listing, &bob, 4, "Decent place overall")
            .unwrap();

        let err = services
            .reviews()
            .delete(&review.review_id, &owner)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);

        services.reviews().delete(&review.review_id, &bob).unwrap();
        assert_eq!(rating_of(&services, &listing), (0.0, 0));
        let err = services.reviews().get(&review.review_id).unwrap_err();
        assert!(matches!(err, CoreError::ReviewNotFound { .. }));
    }

    #[test]
    fn test_failed_recompute_keeps_review_until_reconcile() {
        let services = services();
        let owner = seed_user(&services, "Owner", "owner@ucla.edu");
        let bob = seed_user(&services, "Bob", "bob@ucla.edu");
        let listing = seed_listing(&services, &owner);

        services
            .db()
            .conn()
            .execute_batch(
                "CREATE TRIGGER block_rating_writes
                 BEFORE UPDATE OF average_rating ON listings
                 BEGIN SELECT RAISE(ABORT, 'rating writes disabled'); END;",
            )
            .unwrap();

        let review = services
            .reviews()
            .create(&listing, &bob, 4, "Decent place overall")
            .unwrap();
        assert_eq!(services.reviews().get(&review.review_id).unwrap().rating, 4);
        assert_eq!(rating_of(&services, &listing), (0.0, 0));

        services
            .db()
            .conn()
            .execute_batch("DROP TRIGGER block_rating_writes;")
            .unwrap();

        assert_eq!(services.ratings().reconcile(Some(&listing)).unwrap(), 1);
        assert_eq!(rating_of(&services, &listing), (4.0, 1));
    }

    #[test]
    fn test_lookup_by_author() {
        let services = services();
        let owner = seed_user(&services, "Owner", "owner@ucla.edu");
        let bob = seed_user(&services, "Bob", "bob@ucla.edu");
        let carol = seed_user(&services, "Carol", "carol@ucla.edu");
        let listing = seed_listing(&services, &owner);
        let review = services
            .reviews()
            .create(&listing, &bob, 4, "Decent place overall")
            .unwrap();

        let mine = services.reviews().get_mine(&listing, &bob).unwrap();
        assert_eq!(mine.review_id, review.review_id);

        assert!(services
            .reviews()
            .get_by_author(&listing, &carol)
            .unwrap()
            .is_none());
        let err = services.reviews().get_mine(&listing, &carol).unwrap_err();
        assert!(matches!(err, CoreError::NoReviewByAuthor { .. }));
    }

    #[test]
    fn test_list_for_listing_newest_first() {
        let services = services();
        let owner = seed_user(&services, "Owner", "owner@ucla.edu");
        let bob = seed_user(&services, "Bob", "bob@ucla.edu");
        let carol = seed_user(&services, "Carol", "carol@ucla.edu");
        let listing = seed_listing(&services, &owner);

        services
            .reviews()
            .create(&listing, &bob, 4, "Decent place overall")
            .unwrap();
        services
            .reviews()
            .create(&listing, &carol, 5, "Wonderful experience here")
            .unwrap();

        let reviews = services.reviews().list_for_listing(&listing).unwrap();
        let authors: Vec<_> = reviews.iter().map(|r| r.user_id.as_str()).collect();
        assert_eq!(authors, vec![carol.as_str(), bob.as_str()]);
    }
}
