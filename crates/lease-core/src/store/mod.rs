//! SQLite store for lease.
//!
//! Users, listings, reviews, and messages are the only persisted entities.
//! Conversations are never stored: they are folded from the message log on
//! read. The listing rating columns are derived state and are written only
//! through [`write_rating_stats`], which the rating aggregator owns.

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]

mod query;

pub use query::{
    Availability, Listing, ListingFilter, Message, Participant, RatingStats, Review,
    ReviewTotals, UnknownAvailability, User, UserProfile,
};
pub(crate) use query::review_totals;

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use rusqlite::{params, Connection};

/// How long a connection waits on a lock held by another writer.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Current time as a fixed-width RFC 3339 UTC string.
///
/// Fixed microsecond precision keeps lexical and chronological order equal,
/// so `ORDER BY created_at` is correct on the stored text.
#[must_use]
pub fn now_ts() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Handle to the lease database.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create a database at the given path.
    ///
    /// Creates parent directories if they don't exist.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create parent directories: {}", parent.display())
                })?;
            }
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;

        // WAL lets readers proceed while another connection writes.
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
            row.get::<_, String>(0)
        })
        .context("Failed to enable WAL journal")?;

        Self::configure(conn)
    }

    /// Create an in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::configure(conn)
    }

    fn configure(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .context("Failed to enable foreign keys")?;
        conn.busy_timeout(BUSY_TIMEOUT)
            .context("Failed to set busy timeout")?;
        Ok(Self { conn })
    }

    /// Initialize the database schema.
    ///
    /// Creates all tables and indexes if they don't exist.
    pub fn init_schema(&self) -> Result<()> {
        self.conn
            .execute_batch(SCHEMA_SQL)
            .context("Failed to initialize schema")?;
        Ok(())
    }

    /// Get a reference to the underlying connection (for advanced queries).
    #[must_use]
    pub const fn conn(&self) -> &Connection {
        &self.conn
    }

    // ========================================================================
    // Users
    // ========================================================================

    /// Insert a user. Returns `false` if the email is already registered.
    pub fn insert_user(&self, user: &User) -> Result<bool> {
        let inserted = self
            .conn
            .execute(
                "INSERT INTO users (user_id, display_name, email, password_hash, created_at)
                 VALUES (?, ?, ?, ?, ?)
                 ON CONFLICT (email) DO NOTHING",
                params![
                    user.user_id,
                    user.display_name,
                    user.email,
                    user.password_hash,
                    user.created_at,
                ],
            )
            .context("Failed to insert user")?;
        Ok(inserted == 1)
    }

    // ========================================================================
    // Listings
    // ========================================================================

    /// Insert a listing. The derived rating columns take their defaults.
    pub fn insert_listing(&self, listing: &Listing) -> Result<()> {
        let images = serde_json::to_string(&listing.images).context("Failed to encode images")?;
        self.conn
            .execute(
                "INSERT INTO listings (
                    listing_id, owner_id, title, description, price,
                    address, zip_code, country, bedrooms, distance_from_campus,
                    lease_duration, images, availability, created_at, updated_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    listing.listing_id,
                    listing.owner_id,
                    listing.title,
                    listing.description,
                    listing.price,
                    listing.address,
                    listing.zip_code,
                    listing.country,
                    listing.bedrooms,
                    listing.distance_from_campus,
                    listing.lease_duration,
                    images,
                    listing.availability,
                    listing.created_at,
                    listing.updated_at,
                ],
            )
            .context("Failed to insert listing")?;
        Ok(())
    }

    /// Write the editable fields of a listing.
    ///
    /// `average_rating` and `review_count` on `listing` are ignored.
    /// Returns `false` if the listing no longer exists.
    pub fn update_listing(&self, listing: &Listing) -> Result<bool> {
        let images = serde_json::to_string(&listing.images).context("Failed to encode images")?;
        let changed = self
            .conn
            .execute(
                "UPDATE listings SET
                    title = ?, description = ?, price = ?, address = ?, zip_code = ?,
                    country = ?, bedrooms = ?, distance_from_campus = ?,
                    lease_duration = ?, images = ?, availability = ?, updated_at = ?
                 WHERE listing_id = ?",
                params![
                    listing.title,
                    listing.description,
                    listing.price,
                    listing.address,
                    listing.zip_code,
                    listing.country,
                    listing.bedrooms,
                    listing.distance_from_campus,
                    listing.lease_duration,
                    images,
                    listing.availability,
                    listing.updated_at,
                    listing.listing_id,
                ],
            )
            .context("Failed to update listing")?;
        Ok(changed == 1)
    }

    /// Delete a listing. Its reviews cascade; messages keep their row but
    /// lose the listing reference.
    pub fn delete_listing(&self, listing_id: &str) -> Result<bool> {
        let changed = self
            .conn
            .execute(
                "DELETE FROM listings WHERE listing_id = ?",
                params![listing_id],
            )
            .context("Failed to delete listing")?;
        Ok(changed == 1)
    }

    // ========================================================================
    // Reviews
    // ========================================================================

    /// Insert a review.
    ///
    /// Returns `false` without writing if the author already has a review on
    /// the listing. The check and the insert are one statement, so two
    /// concurrent inserts for the same pair cannot both succeed.
    pub fn insert_review(&self, review: &Review) -> Result<bool> {
        let inserted = self
            .conn
            .execute(
                "INSERT INTO reviews (
                    review_id, listing_id, user_id, rating, comment, created_at, updated_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT (listing_id, user_id) DO NOTHING",
                params![
                    review.review_id,
                    review.listing_id,
                    review.user_id,
                    review.rating,
                    review.comment,
                    review.created_at,
                    review.updated_at,
                ],
            )
            .context("Failed to insert review")?;
        Ok(inserted == 1)
    }

    /// Overwrite a review's rating and comment.
    pub fn update_review(
        &self,
        review_id: &str,
        rating: i64,
        comment: &str,
        updated_at: &str,
    ) -> Result<bool> {
        let changed = self
            .conn
            .execute(
                "UPDATE reviews SET rating = ?, comment = ?, updated_at = ?
                 WHERE review_id = ?",
                params![rating, comment, updated_at, review_id],
            )
            .context("Failed to update review")?;
        Ok(changed == 1)
    }

    pub fn delete_review(&self, review_id: &str) -> Result<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM reviews WHERE review_id = ?", params![review_id])
            .context("Failed to delete review")?;
        Ok(changed == 1)
    }

    // ========================================================================
    // Messages
    // ========================================================================

    pub fn insert_message(&self, message: &NewMessage<'_>) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO messages (
                    message_id, sender_id, receiver_id, listing_id, content, read, created_at
                ) VALUES (?, ?, ?, ?, ?, 0, ?)",
                params![
                    message.message_id,
                    message.sender_id,
                    message.receiver_id,
                    message.listing_id,
                    message.content,
                    message.created_at,
                ],
            )
            .context("Failed to insert message")?;
        Ok(())
    }

    /// Mark every unread message from `sender_id` to `receiver_id` as read.
    ///
    /// Returns the number of rows that actually changed.
    pub fn mark_read(&self, receiver_id: &str, sender_id: &str, read_at: &str) -> Result<usize> {
        self.conn
            .execute(
                "UPDATE messages SET read = 1, read_at = ?
                 WHERE sender_id = ? AND receiver_id = ? AND read = 0",
                params![read_at, sender_id, receiver_id],
            )
            .context("Failed to mark messages read")
    }

    pub fn delete_message(&self, message_id: &str) -> Result<bool> {
        let changed = self
            .conn
            .execute(
                "DELETE FROM messages WHERE message_id = ?",
                params![message_id],
            )
            .context("Failed to delete message")?;
        Ok(changed == 1)
    }
}

/// A message about to be persisted.
#[derive(Debug, Clone)]
pub struct NewMessage<'a> {
    pub message_id: &'a str,
    pub sender_id: &'a str,
    pub receiver_id: &'a str,
    pub listing_id: Option<&'a str>,
    pub content: &'a str,
    pub created_at: &'a str,
}

/// Persist derived rating stats onto a listing.
///
/// Returns `false` if the listing does not exist.
pub(crate) fn write_rating_stats(
    conn: &Connection,
    listing_id: &str,
    stats: &RatingStats,
) -> Result<bool> {
    let changed = conn
        .execute(
            "UPDATE listings SET average_rating = ?, review_count = ? WHERE listing_id = ?",
            params![stats.average_rating, stats.review_count, listing_id],
        )
        .context("Failed to write rating stats")?;
    Ok(changed == 1)
}

// ============================================================================
// Schema SQL
// ============================================================================

const SCHEMA_SQL: &str = r"
-- USERS
CREATE TABLE IF NOT EXISTS users (
    user_id TEXT PRIMARY KEY,
    display_name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    created_at TEXT NOT NULL
);

-- LISTINGS
CREATE TABLE IF NOT EXISTS listings (
    listing_id TEXT PRIMARY KEY,
    owner_id TEXT NOT NULL REFERENCES users(user_id),
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    price REAL NOT NULL CHECK (price >= 0),
    address TEXT NOT NULL,
    zip_code TEXT NOT NULL,
    country TEXT NOT NULL,
    bedrooms INTEGER NOT NULL CHECK (bedrooms >= 0),
    distance_from_campus REAL NOT NULL CHECK (distance_from_campus >= 0),
    lease_duration TEXT NOT NULL,
    images TEXT NOT NULL DEFAULT '[]',
    availability TEXT NOT NULL DEFAULT 'Available'
        CHECK (availability IN ('Available', 'Pending', 'Rented')),
    average_rating REAL NOT NULL DEFAULT 0
        CHECK (average_rating >= 0 AND average_rating <= 5),
    review_count INTEGER NOT NULL DEFAULT 0 CHECK (review_count >= 0),
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_listings_owner ON listings(owner_id, created_at);
CREATE INDEX IF NOT EXISTS idx_listings_availability ON listings(availability);
CREATE INDEX IF NOT EXISTS idx_listings_price ON listings(price);

-- REVIEWS
CREATE TABLE IF NOT EXISTS reviews (
    review_id TEXT PRIMARY KEY,
    listing_id TEXT NOT NULL REFERENCES listings(listing_id) ON DELETE CASCADE,
    user_id TEXT NOT NULL REFERENCES users(user_id),
    rating INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
    comment TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE (listing_id, user_id)
);

CREATE INDEX IF NOT EXISTS idx_reviews_listing ON reviews(listing_id, created_at);

-- MESSAGES
-- Participants are not foreign keys: a thread outlives a deleted account.
CREATE TABLE IF NOT EXISTS messages (
    message_id TEXT PRIMARY KEY,
    sender_id TEXT NOT NULL,
    receiver_id TEXT NOT NULL,
    listing_id TEXT REFERENCES listings(listing_id) ON DELETE SET NULL,
    content TEXT NOT NULL,
    read INTEGER NOT NULL DEFAULT 0,
    read_at TEXT,
    created_at TEXT NOT NULL,
    CHECK (sender_id <> receiver_id)
);

CREATE INDEX IF NOT EXISTS idx_messages_pair ON messages(sender_id, receiver_id, created_at);
CREATE INDEX IF NOT EXISTS idx_messages_unread ON messages(receiver_id, read);
";

// ============================================================================
// Tests
// ============================================================================
