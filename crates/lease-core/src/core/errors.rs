//! Typed error types for the lease-core service layer.

use std::fmt;

use thiserror::Error;

/// Result type alias for core service operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Coarse classification of a [`CoreError`], for transports that map
/// failures onto status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Forbidden,
    Conflict,
    InvalidInput,
    AggregationFailure,
    Internal,
}

impl ErrorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Forbidden => "forbidden",
            Self::Conflict => "conflict",
            Self::InvalidInput => "invalid_input",
            Self::AggregationFailure => "aggregation_failure",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur in the lease-core service layer.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A user was not found.
    #[error("User not found: {user_id}")]
    UserNotFound { user_id: String },

    /// A listing was not found.
    #[error("Listing not found: {listing_id}")]
    ListingNotFound { listing_id: String },

    /// A review was not found.
    #[error("Review not found: {review_id}")]
    ReviewNotFound { review_id: String },

    /// The actor has not reviewed the listing.
    #[error("No review by {user_id} on listing {listing_id}")]
    NoReviewByAuthor { listing_id: String, user_id: String },

    /// A message was not found.
    #[error("Message not found: {message_id}")]
    MessageNotFound { message_id: String },

    /// The actor may not perform this operation.
    #[error("Forbidden: {reason}")]
    Forbidden { reason: String },

    /// The operation would violate a uniqueness invariant or business rule.
    #[error("Conflict: {reason}")]
    Conflict { reason: String },

    /// A field failed validation.
    #[error("Invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    /// The derived rating of a listing could not be persisted.
    #[error("Failed to recompute rating for listing {listing_id}")]
    AggregationFailure {
        listing_id: String,
        #[source]
        source: anyhow::Error,
    },

    /// An internal storage or database error.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CoreError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::UserNotFound { .. }
            | Self::ListingNotFound { .. }
            | Self::ReviewNotFound { .. }
            | Self::NoReviewByAuthor { .. }
            | Self::MessageNotFound { .. } => ErrorKind::NotFound,
            Self::Forbidden { .. } => ErrorKind::Forbidden,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::InvalidInput { .. } => ErrorKind::InvalidInput,
            Self::AggregationFailure { .. } => ErrorKind::AggregationFailure,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    pub(crate) fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden {
            reason: reason.into(),
        }
    }

    pub(crate) fn conflict(reason: impl Into<String>) -> Self {
        Self::Conflict {
            reason: reason.into(),
        }
    }
}
