//! CLI command definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use lease_core::store::Availability;

pub mod commands;

/// Housing marketplace for a university community
#[derive(Parser, Debug)]
#[command(name = "lease")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output as JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Act as this user (default: $LEASE_USER)
    #[arg(long = "as", global = true, value_name = "USER_ID")]
    pub actor: Option<String>,

    /// Database file (default: $LEASE_DB or .lease/lease.db)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Institutional email domain (default: $LEASE_EMAIL_DOMAIN or ucla.edu)
    #[arg(long, global = true)]
    pub email_domain: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the database and schema
    Init,

    /// Manage members
    #[command(subcommand)]
    Users(UsersCommands),

    /// Post and browse listings
    #[command(subcommand)]
    Listings(ListingsCommands),

    /// Review listings
    #[command(subcommand)]
    Reviews(ReviewsCommands),

    /// Maintain derived listing ratings
    #[command(subcommand)]
    Ratings(RatingsCommands),

    /// Direct messages and conversations
    #[command(subcommand)]
    Messages(MessagesCommands),
}

// ============================================================================
// Users subcommands
// ============================================================================

#[derive(Subcommand, Debug)]
pub enum UsersCommands {
    /// Register a member
    Register {
        /// Display name
        #[arg(long)]
        name: String,

        /// Institutional email address
        #[arg(long)]
        email: String,

        /// Pre-computed password hash
        #[arg(long)]
        password_hash: String,
    },

    /// Show a member's public profile
    Show {
        /// User ID
        user_id: String,
    },

    /// Find a member by institutional email
    Lookup {
        /// Email address (case-insensitive)
        email: String,
    },
}

// ============================================================================
// Listings subcommands
// ============================================================================

#[derive(Subcommand, Debug)]
pub enum ListingsCommands {
    /// Post a listing as the acting user
    Create(ListingFields),

    /// Browse listings, newest first
    List {
        /// Case-insensitive substring of title, description, or address
        #[arg(long)]
        search: Option<String>,

        /// Filter by availability
        #[arg(long)]
        availability: Option<Availability>,

        /// Maximum monthly price
        #[arg(long)]
        max_price: Option<f64>,

        /// Minimum number of bedrooms
        #[arg(long)]
        min_bedrooms: Option<i64>,

        /// Only listings posted by this user
        #[arg(long)]
        owner: Option<String>,
    },

    /// Show a listing
    Show {
        /// Listing ID
        listing_id: String,
    },

    /// Edit a listing you own
    Update {
        /// Listing ID
        listing_id: String,

        #[command(flatten)]
        patch: ListingPatchArgs,
    },

    /// Delete a listing you own, with its reviews
    Delete {
        /// Listing ID
        listing_id: String,
    },
}

/// Fields of a new listing.
#[derive(Args, Debug)]
pub struct ListingFields {
    #[arg(long)]
    pub title: String,

    #[arg(long)]
    pub description: String,

    /// Monthly price
    #[arg(long)]
    pub price: f64,

    #[arg(long)]
    pub address: String,

    #[arg(long)]
    pub zip_code: String,

    #[arg(long, default_value = "USA")]
    pub country: String,

    #[arg(long)]
    pub bedrooms: i64,

    /// Distance from campus in miles
    #[arg(long)]
    pub distance: f64,

    /// e.g. "12 months"
    #[arg(long)]
    pub lease_duration: String,

    /// Image reference; repeat for more (at most 10 are kept)
    #[arg(long = "image")]
    pub images: Vec<String>,

    #[arg(long)]
    pub availability: Option<Availability>,
}

/// Editable listing fields; omitted flags keep the stored value.
#[derive(Args, Debug)]
pub struct ListingPatchArgs {
    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub price: Option<f64>,

    #[arg(long)]
    pub address: Option<String>,

    #[arg(long)]
    pub zip_code: Option<String>,

    #[arg(long)]
    pub country: Option<String>,

    #[arg(long)]
    pub bedrooms: Option<i64>,

    #[arg(long)]
    pub distance: Option<f64>,

    #[arg(long)]
    pub lease_duration: Option<String>,

    /// Replace the image list; repeat for more
    #[arg(long = "image")]
    pub images: Option<Vec<String>>,

    #[arg(long)]
    pub availability: Option<Availability>,
}

// ============================================================================
// Reviews subcommands
// ============================================================================

#[derive(Subcommand, Debug)]
pub enum ReviewsCommands {
    /// Review a listing as the acting user
    Create {
        /// Listing ID
        listing_id: String,

        /// Rating from 1 to 5
        #[arg(long)]
        rating: i64,

        /// Comment, 10 to 500 characters
        #[arg(long)]
        comment: String,
    },

    /// List reviews of a listing, newest first
    List {
        /// Listing ID
        listing_id: String,
    },

    /// Show the acting user's review of a listing
    Mine {
        /// Listing ID
        listing_id: String,
    },

    /// Edit your review
    Update {
        /// Review ID
        review_id: String,

        #[arg(long)]
        rating: Option<i64>,

        #[arg(long)]
        comment: Option<String>,
    },

    /// Delete your review
    Delete {
        /// Review ID
        review_id: String,
    },
}

// ============================================================================
// Ratings subcommands
// ============================================================================

#[derive(Subcommand, Debug)]
pub enum RatingsCommands {
    /// Recompute derived ratings from the stored reviews
    Reconcile {
        /// Listing ID (all listings if omitted)
        listing_id: Option<String>,
    },
}

// ============================================================================
// Messages subcommands
// ============================================================================

#[derive(Subcommand, Debug)]
pub enum MessagesCommands {
    /// Send a message as the acting user
    Send {
        /// Receiver's user ID
        receiver_id: String,

        /// Message text, 1 to 1000 characters
        #[arg(long, short = 'm')]
        message: String,

        /// Listing the message is about
        #[arg(long)]
        listing: Option<String>,
    },

    /// List the acting user's conversations, most recent first
    Conversations,

    /// Show the thread with one partner, oldest first
    Show {
        /// Partner's user ID
        partner_id: String,
    },

    /// Mark everything a partner sent you as read
    Read {
        /// Partner's user ID
        partner_id: String,
    },

    /// Count unread messages addressed to the acting user
    Unread,

    /// Delete a message you sent
    Delete {
        /// Message ID
        message_id: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "lease",
            "reviews",
            "create",
            "lst-0000000001",
            "--rating",
            "4",
            "--comment",
            "Decent place overall",
            "--as",
            "usr-0000000002",
            "--json",
        ])
        .unwrap();
        assert!(cli.json);
        assert_eq!(cli.actor.as_deref(), Some("usr-0000000002"));
        assert!(matches!(
            cli.command,
            Commands::Reviews(ReviewsCommands::Create { rating: 4, .. })
        ));
    }

    #[test]
    fn test_parse_listing_filter() {
        let cli = Cli::try_parse_from([
            "lease",
            "listings",
            "list",
            "--availability",
            "pending",
            "--max-price",
            "1500",
        ])
        .unwrap();
        let Commands::Listings(ListingsCommands::List {
            availability,
            max_price,
            ..
        }) = cli.command
        else {
            panic!("expected listings list");
        };
        assert_eq!(availability, Some(Availability::Pending));
        assert_eq!(max_price, Some(1500.0));
    }
}
