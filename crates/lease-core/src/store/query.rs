//! Query API and row types for the lease database.
//!
//! All result types implement Serialize for JSON/text output.

use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, Type, ValueRef};
use rusqlite::{params, Connection, OptionalExtension, Row, ToSql};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Database;

// ============================================================================
// Query Result Types
// ============================================================================

/// Availability of a listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum Availability {
    #[default]
    Available,
    Pending,
    Rented,
}

impl Availability {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Available => "Available",
            Self::Pending => "Pending",
            Self::Rented => "Rented",
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An availability string that is not one of the known statuses.
#[derive(Debug, Error)]
#[error("unknown availability status: {0}")]
pub struct UnknownAvailability(String);

impl FromStr for Availability {
    type Err = UnknownAvailability;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "available" => Ok(Self::Available),
            "pending" => Ok(Self::Pending),
            "rented" => Ok(Self::Rented),
            _ => Err(UnknownAvailability(s.to_string())),
        }
    }
}

impl ToSql for Availability {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Availability {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

/// A registered member.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub user_id: String,
    pub display_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: String,
}

/// Public view of a member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub user_id: String,
    pub display_name: String,
    pub email: String,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            user_id: user.user_id,
            display_name: user.display_name,
            email: user.email,
        }
    }
}

/// One side of a message exchange.
///
/// Name and email are `None` when the account can no longer be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Participant {
    pub user_id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
}

/// A rental listing.
#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    pub listing_id: String,
    pub owner_id: String,
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
    pub availability: Availability,
    /// Derived: mean review rating rounded to one decimal, 0 with no reviews.
    pub average_rating: f64,
    /// Derived: number of reviews on the listing.
    pub review_count: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// Filters for browsing listings. Every field is optional.
#[derive(Debug, Clone, Default)]
pub struct ListingFilter {
    /// Substring matched against title, description, and address.
    /// Case is folded with Unicode rules, so "É" matches "é".
    pub search: Option<String>,
    pub availability: Option<Availability>,
    pub max_price: Option<f64>,
    pub min_bedrooms: Option<i64>,
    pub owner_id: Option<String>,
}

/// A review of a listing.
#[derive(Debug, Clone, Serialize)]
pub struct Review {
    pub review_id: String,
    pub listing_id: String,
    pub user_id: String,
    /// Author's display name, if the account still resolves.
    pub author_name: Option<String>,
    pub rating: i64,
    pub comment: String,
    pub created_at: String,
    pub updated_at: String,
}

/// A direct message between two members.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub message_id: String,
    pub sender: Participant,
    pub receiver: Participant,
    pub listing_id: Option<String>,
    pub listing_title: Option<String>,
    pub content: String,
    pub read: bool,
    pub read_at: Option<String>,
    pub created_at: String,
}

/// Raw review totals for one listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReviewTotals {
    pub count: i64,
    pub rating_sum: i64,
}

/// Derived rating fields as stored on a listing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatingStats {
    pub average_rating: f64,
    pub review_count: i64,
}

// ============================================================================
// Query Functions
// ============================================================================

const LISTING_COLUMNS: &str = "listing_id, owner_id, title, description, price, address,
    zip_code, country, bedrooms, distance_from_campus, lease_duration, images,
    availability, average_rating, review_count, created_at, updated_at";

const REVIEW_SELECT: &str = "SELECT rv.review_id, rv.listing_id, rv.user_id, u.display_name,
        rv.rating, rv.comment, rv.created_at, rv.updated_at
     FROM reviews rv
     LEFT JOIN users u ON u.user_id = rv.user_id";

const MESSAGE_SELECT: &str = "SELECT m.message_id,
        m.sender_id, s.display_name, s.email,
        m.receiver_id, r.display_name, r.email,
        m.listing_id, l.title, m.content, m.read, m.read_at, m.created_at
     FROM messages m
     LEFT JOIN users s ON s.user_id = m.sender_id
     LEFT JOIN users r ON r.user_id = m.receiver_id
     LEFT JOIN listings l ON l.listing_id = m.listing_id";

impl Database {
    // ------------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------------

    /// Get a user by ID. Returns `None` if the user doesn't exist.
    pub fn get_user(&self, user_id: &str) -> Result<Option<User>> {
        self.conn
            .query_row(
                "SELECT user_id, display_name, email, password_hash, created_at
                 FROM users WHERE user_id = ?",
                params![user_id],
                user_from_row,
            )
            .optional()
            .context("Failed to query user")
    }

    /// Get a user by (normalized) email.
    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.conn
            .query_row(
                "SELECT user_id, display_name, email, password_hash, created_at
                 FROM users WHERE email = ?",
                params![email],
                user_from_row,
            )
            .optional()
            .context("Failed to query user by email")
    }

    // ------------------------------------------------------------------------
    // Listings
    // ------------------------------------------------------------------------

    /// Get a listing by ID. Returns `None` if the listing doesn't exist.
    pub fn get_listing(&self, listing_id: &str) -> Result<Option<Listing>> {
        self.conn
            .query_row(
                &format!("SELECT {LISTING_COLUMNS} FROM listings WHERE listing_id = ?"),
                params![listing_id],
                listing_from_row,
            )
            .optional()
            .context("Failed to query listing")
    }

    /// List listings with optional filtering.
    ///
    /// Returns listings sorted by creation date (newest first).
    pub fn list_listings(&self, filter: &ListingFilter) -> Result<Vec<Listing>> {
        let mut sql = format!("SELECT {LISTING_COLUMNS} FROM listings WHERE 1=1");
        let mut param_values: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(availability) = filter.availability {
            sql.push_str(" AND availability = ?");
            param_values.push(Box::new(availability));
        }
        if let Some(max_price) = filter.max_price {
            sql.push_str(" AND price <= ?");
            param_values.push(Box::new(max_price));
        }
        if let Some(min_bedrooms) = filter.min_bedrooms {
            sql.push_str(" AND bedrooms >= ?");
            param_values.push(Box::new(min_bedrooms));
        }
        if let Some(owner) = &filter.owner_id {
            sql.push_str(" AND owner_id = ?");
            param_values.push(Box::new(owner.clone()));
        }

        sql.push_str(" ORDER BY created_at DESC, rowid DESC");

        let params: Vec<&dyn ToSql> = param_values.iter().map(|p| p.as_ref()).collect();

        let mut stmt = self
            .conn
            .prepare(&sql)
            .context("Failed to prepare list_listings query")?;

        let rows = stmt
            .query_map(params.as_slice(), listing_from_row)
            .context("Failed to execute list_listings query")?;

        // SQLite lower() only folds ASCII, so search is matched here.
        let needle = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let mut results = Vec::new();
        for row in rows {
            let listing = row.context("Failed to read listing row")?;
            if needle
                .as_deref()
                .is_none_or(|needle| listing_matches(&listing, needle))
            {
                results.push(listing);
            }
        }
        Ok(results)
    }

    /// IDs of every listing, oldest first.
    pub fn list_listing_ids(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT listing_id FROM listings ORDER BY created_at, rowid")
            .context("Failed to prepare listing id query")?;
        let ids = stmt
            .query_map([], |row| row.get(0))
            .context("Failed to query listing ids")?
            .collect::<Result<Vec<String>, _>>()
            .context("Failed to read listing ids")?;
        Ok(ids)
    }

    // ------------------------------------------------------------------------
    // Reviews
    // ------------------------------------------------------------------------

    /// Get a review by ID. Returns `None` if the review doesn't exist.
    pub fn get_review(&self, review_id: &str) -> Result<Option<Review>> {
        self.conn
            .query_row(
                &format!("{REVIEW_SELECT} WHERE rv.review_id = ?"),
                params![review_id],
                review_from_row,
            )
            .optional()
            .context("Failed to query review")
    }

    /// Get the review `user_id` wrote on `listing_id`, if any.
    pub fn find_review_by_author(&self, listing_id: &str, user_id: &str) -> Result<Option<Review>> {
        self.conn
            .query_row(
                &format!("{REVIEW_SELECT} WHERE rv.listing_id = ? AND rv.user_id = ?"),
                params![listing_id, user_id],
                review_from_row,
            )
            .optional()
            .context("Failed to query review by author")
    }

    /// List reviews for a listing, newest first.
    pub fn list_reviews_for_listing(&self, listing_id: &str) -> Result<Vec<Review>> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "{REVIEW_SELECT} WHERE rv.listing_id = ?
                 ORDER BY rv.created_at DESC, rv.rowid DESC"
            ))
            .context("Failed to prepare list_reviews query")?;

        let rows = stmt
            .query_map(params![listing_id], review_from_row)
            .context("Failed to execute list_reviews query")?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row.context("Failed to read review row")?);
        }
        Ok(results)
    }

    /// Count and rating sum of the reviews currently stored for a listing.
    pub fn review_totals(&self, listing_id: &str) -> Result<ReviewTotals> {
        review_totals(&self.conn, listing_id)
    }

    // ------------------------------------------------------------------------
    // Messages
    // ------------------------------------------------------------------------

    /// Get a message by ID. Returns `None` if the message doesn't exist.
    pub fn get_message(&self, message_id: &str) -> Result<Option<Message>> {
        self.conn
            .query_row(
                &format!("{MESSAGE_SELECT} WHERE m.message_id = ?"),
                params![message_id],
                message_from_row,
            )
            .optional()
            .context("Failed to query message")
    }

    /// Every message `user_id` sent or received, newest first.
    pub fn messages_involving(&self, user_id: &str) -> Result<Vec<Message>> {
        self.query_messages(
            &format!(
                "{MESSAGE_SELECT} WHERE m.sender_id = ?1 OR m.receiver_id = ?1
                 ORDER BY m.created_at DESC, m.rowid DESC"
            ),
            params![user_id],
        )
    }

    /// Every message exchanged between two users in either direction,
    /// oldest first.
    pub fn messages_between(&self, user_a: &str, user_b: &str) -> Result<Vec<Message>> {
        self.query_messages(
            &format!(
                "{MESSAGE_SELECT}
                 WHERE (m.sender_id = ?1 AND m.receiver_id = ?2)
                    OR (m.sender_id = ?2 AND m.receiver_id = ?1)
                 ORDER BY m.created_at ASC, m.rowid ASC"
            ),
            params![user_a, user_b],
        )
    }

    /// Number of unread messages addressed to `user_id`.
    pub fn count_unread(&self, user_id: &str) -> Result<i64> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM messages WHERE receiver_id = ? AND read = 0",
                params![user_id],
                |row| row.get(0),
            )
            .context("Failed to count unread messages")
    }

    fn query_messages(&self, sql: &str, params: &[&dyn ToSql]) -> Result<Vec<Message>> {
        let mut stmt = self
            .conn
            .prepare(sql)
            .context("Failed to prepare message query")?;

        let rows = stmt
            .query_map(params, message_from_row)
            .context("Failed to execute message query")?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row.context("Failed to read message row")?);
        }
        Ok(results)
    }
}

fn listing_matches(listing: &Listing, needle: &str) -> bool {
    [&listing.title, &listing.description, &listing.address]
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
}

/// Count and rating sum of the reviews for a listing, read on `conn`.
///
/// Takes a bare connection so it can run inside the aggregator's transaction.
pub(crate) fn review_totals(conn: &Connection, listing_id: &str) -> Result<ReviewTotals> {
    conn.query_row(
        "SELECT COUNT(*), COALESCE(SUM(rating), 0) FROM reviews WHERE listing_id = ?",
        params![listing_id],
        |row| {
            Ok(ReviewTotals {
                count: row.get(0)?,
                rating_sum: row.get(1)?,
            })
        },
    )
    .context("Failed to aggregate reviews")
}

// ============================================================================
// Row Mapping
// ============================================================================

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        user_id: row.get(0)?,
        display_name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn listing_from_row(row: &Row<'_>) -> rusqlite::Result<Listing> {
    let images_json: String = row.get(11)?;
    let images: Vec<String> = serde_json::from_str(&images_json)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(11, Type::Text, Box::new(e)))?;

    Ok(Listing {
        listing_id: row.get(0)?,
        owner_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        price: row.get(4)?,
        address: row.get(5)?,
        zip_code: row.get(6)?,
        country: row.get(7)?,
        bedrooms: row.get(8)?,
        distance_from_campus: row.get(9)?,
        lease_duration: row.get(10)?,
        images,
        availability: row.get(12)?,
        average_rating: row.get(13)?,
        review_count: row.get(14)?,
        created_at: row.get(15)?,
        updated_at: row.get(16)?,
    })
}

fn review_from_row(row: &Row<'_>) -> rusqlite::Result<Review> {
    Ok(Review {
        review_id: row.get(0)?,
        listing_id: row.get(1)?,
        user_id: row.get(2)?,
        author_name: row.get(3)?,
        rating: row.get(4)?,
        comment: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

fn message_from_row(row: &Row<'_>) -> rusqlite::Result<Message> {
    Ok(Message {
        message_id: row.get(0)?,
        sender: Participant {
            user_id: row.get(1)?,
            display_name: row.get(2)?,
            email: row.get(3)?,
        },
        receiver: Participant {
            user_id: row.get(4)?,
            display_name: row.get(5)?,
            email: row.get(6)?,
        },
        listing_id: row.get(7)?,
        listing_title: row.get(8)?,
        content: row.get(9)?,
        read: row.get(10)?,
        read_at: row.get(11)?,
        created_at: row.get(12)?,
    })
}
