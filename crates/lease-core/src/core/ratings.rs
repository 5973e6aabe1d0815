//! Rating aggregator: recompute the derived rating fields of a listing.
//!
//! `average_rating` and `review_count` on a listing are a cache over the
//! review rows. This is the only writer of those columns. Every recompute
//! reads the current review set and writes the result inside one
//! `IMMEDIATE` transaction, so concurrent recomputes serialize and the last
//! one to commit always reflects every committed review.

use anyhow::Context;
use rusqlite::{Transaction, TransactionBehavior};
use tracing::{debug, warn};

use crate::store::{review_totals, write_rating_stats, Database, RatingStats, ReviewTotals};

use super::{CoreError, CoreResult};

impl RatingStats {
    /// Stats for a listing with no reviews.
    pub const EMPTY: Self = Self {
        average_rating: 0.0,
        review_count: 0,
    };

    /// Derive stats from review totals.
    ///
    /// The mean is rounded to one decimal place, half-up. The rounding is
    /// done on the exact rational `sum / count` in integer arithmetic, so
    /// a mean of exactly x.x5 always rounds up.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_totals(totals: ReviewTotals) -> Self {
        if totals.count <= 0 {
            return Self::EMPTY;
        }
        // round(sum / count * 10) = floor((20 * sum + count) / (2 * count))
        let tenths = (20 * totals.rating_sum + totals.count) / (2 * totals.count);
        Self {
            average_rating: tenths as f64 / 10.0,
            review_count: totals.count,
        }
    }
}

/// What a recompute did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecomputeOutcome {
    /// The listing now carries these stats.
    Updated(RatingStats),
    /// The listing no longer exists; nothing was written.
    ListingMissing,
}

/// Service that owns the derived rating fields of listings.
pub struct RatingAggregator<'a> {
    db: &'a Database,
}

impl<'a> RatingAggregator<'a> {
    pub(crate) const fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Recompute and persist the rating stats of one listing.
    ///
    /// Idempotent: with no intervening review change, calling it again
    /// writes the same values. A vanished listing is reported as
    /// [`RecomputeOutcome::ListingMissing`], not as an error. Storage
    /// failures surface as [`CoreError::AggregationFailure`].
    #[tracing::instrument(skip(self))]
    pub fn recompute(&self, listing_id: &str) -> CoreResult<RecomputeOutcome> {
        self.recompute_inner(listing_id)
            .map_err(|source| CoreError::AggregationFailure {
                listing_id: listing_id.to_string(),
                source,
            })
    }

    fn recompute_inner(&self, listing_id: &str) -> anyhow::Result<RecomputeOutcome> {
        let tx = Transaction::new_unchecked(self.db.conn(), TransactionBehavior::Immediate)
            .context("Failed to begin rating transaction")?;

        let totals = review_totals(&tx, listing_id)?;
        let stats = RatingStats::from_totals(totals);
        let updated = write_rating_stats(&tx, listing_id, &stats)?;

        tx.commit().context("Failed to commit rating transaction")?;

        if updated {
            debug!(
                listing_id,
                average_rating = stats.average_rating,
                review_count = stats.review_count,
                "recomputed listing rating"
            );
            Ok(RecomputeOutcome::Updated(stats))
        } else {
            warn!(listing_id, "listing vanished before its rating could be recomputed");
            Ok(RecomputeOutcome::ListingMissing)
        }
    }

    /// Recompute one listing, or every listing when `listing_id` is `None`.
    ///
    /// This is the out-of-band repair pass after an aggregation failure.
    /// Returns the number of listings whose stats were written.
    pub fn reconcile(&self, listing_id: Option<&str>) -> CoreResult<usize> {
        let ids = match listing_id {
            Some(id) => {
                if self.db.get_listing(id)?.is_none() {
                    return Err(CoreError::ListingNotFound {
                        listing_id: id.to_string(),
                    });
                }
                vec![id.to_string()]
            }
            None => self.db.list_listing_ids()?,
        };

        let mut updated = 0;
        for id in &ids {
            if let RecomputeOutcome::Updated(_) = self.recompute(id)? {
                updated += 1;
            }
        }
        Ok(updated)
    }
}
