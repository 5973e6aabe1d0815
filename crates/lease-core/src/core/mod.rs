//! Service layer for lease-core.
//!
//! Provides typed, high-level APIs for users, listings, reviews, rating
//! aggregation, messaging, conversations, and read state. Each service
//! borrows one open [`Database`]; the transport decides how long a
//! [`LeaseServices`] lives (typically one per request or command).
//!
//! # Usage
//!
//! ```no_run
//! use lease_core::config::LeaseConfig;
//! use lease_core::core::CoreContext;
//!
//! let ctx = CoreContext::new(LeaseConfig::default());
//! let services = ctx.services().unwrap();
//! let conversations = services.conversations().list("usr-0000000001").unwrap();
//! ```

pub mod conversations;
pub mod errors;
pub mod inbox;
pub mod listings;
pub mod messages;
pub mod ratings;
pub mod reviews;
pub mod users;

pub use errors::{CoreError, CoreResult, ErrorKind};

use crate::config::LeaseConfig;
use crate::store::Database;

/// Context for lease-core services.
///
/// Holds the resolved configuration. Cheap to clone; open one
/// [`LeaseServices`] per unit of work.
#[derive(Debug, Clone)]
pub struct CoreContext {
    config: LeaseConfig,
}

impl CoreContext {
    #[must_use]
    pub const fn new(config: LeaseConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &LeaseConfig {
        &self.config
    }

    /// Open the configured database and make sure its schema exists.
    pub fn open(&self) -> CoreResult<Database> {
        let db = Database::open(self.config.db_path())?;
        db.init_schema()?;
        Ok(db)
    }

    /// Create a `LeaseServices` instance backed by the configured database.
    pub fn services(&self) -> CoreResult<LeaseServices> {
        let db = self.open()?;
        Ok(LeaseServices::new(self.clone(), db))
    }
}

/// Facade providing all lease service APIs.
///
/// Owns an open database and hands out domain-specific service objects.
pub struct LeaseServices {
    ctx: CoreContext,
    db: Database,
}

impl LeaseServices {
    /// Wrap an already opened database. The schema must be initialized.
    #[must_use]
    pub const fn new(ctx: CoreContext, db: Database) -> Self {
        Self { ctx, db }
    }

    /// Access user operations.
    #[must_use]
    pub const fn users(&self) -> users::UserService<'_> {
        users::UserService::new(&self.ctx, &self.db)
    }

    /// Access listing operations.
    #[must_use]
    pub const fn listings(&self) -> listings::ListingService<'_> {
        listings::ListingService::new(&self.db)
    }

    /// Access review operations.
    #[must_use]
    pub const fn reviews(&self) -> reviews::ReviewService<'_> {
        reviews::ReviewService::new(&self.db)
    }

    /// Access rating aggregation.
    #[must_use]
    pub const fn ratings(&self) -> ratings::RatingAggregator<'_> {
        ratings::RatingAggregator::new(&self.db)
    }

    /// Access message send/delete operations.
    #[must_use]
    pub const fn messages(&self) -> messages::MessageService<'_> {
        messages::MessageService::new(&self.db)
    }

    /// Access conversation views.
    #[must_use]
    pub const fn conversations(&self) -> conversations::ConversationService<'_> {
        conversations::ConversationService::new(&self.db)
    }

    /// Access read-state operations.
    #[must_use]
    pub const fn inbox(&self) -> inbox::InboxService<'_> {
        inbox::InboxService::new(&self.db)
    }

    /// Get a reference to the underlying database.
    ///
    /// Useful for advanced queries not covered by the service layer.
    #[must_use]
    pub const fn db(&self) -> &Database {
        &self.db
    }
}
