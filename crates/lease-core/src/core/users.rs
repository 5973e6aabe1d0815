//! User service: register and look up members.

use tracing::debug;

use crate::ids::new_user_id;
use crate::store::{now_ts, Database, User, UserProfile};
use crate::validation;

use super::{CoreContext, CoreError, CoreResult};

/// Service for user operations.
pub struct UserService<'a> {
    ctx: &'a CoreContext,
    db: &'a Database,
}

impl<'a> UserService<'a> {
    pub(crate) const fn new(ctx: &'a CoreContext, db: &'a Database) -> Self {
        Self { ctx, db }
    }

    /// Register a new member.
    ///
    /// The email must belong to the configured institutional domain.
    /// `password_hash` is stored as given; hashing is the auth layer's job.
    pub fn register(
        &self,
        display_name: &str,
        email: &str,
        password_hash: &str,
    ) -> CoreResult<User> {
        let display_name = validation::display_name(display_name)?;
        let email = validation::institutional_email(email, self.ctx.config().email_domain())?;
        if password_hash.trim().is_empty() {
            return Err(CoreError::InvalidInput {
                field: "password_hash",
                reason: "cannot be empty".to_string(),
            });
        }

        let user = User {
            user_id: new_user_id()?,
            display_name,
            email,
            password_hash: password_hash.to_string(),
            created_at: now_ts(),
        };

        if !self.db.insert_user(&user)? {
            return Err(CoreError::conflict(format!(
                "an account already exists for {}",
                user.email
            )));
        }

        debug!(user_id = %user.user_id, "registered user");
        Ok(user)
    }

    /// Get a user by ID.
    ///
    /// Returns `Err(CoreError::UserNotFound)` if the user does not exist.
    pub fn get(&self, user_id: &str) -> CoreResult<User> {
        self.db
            .get_user(user_id)?
            .ok_or_else(|| CoreError::UserNotFound {
                user_id: user_id.to_string(),
            })
    }

    /// Public profile of a user.
    pub fn profile(&self, user_id: &str) -> CoreResult<UserProfile> {
        self.get(user_id).map(UserProfile::from)
    }

    /// Look up a user by email, returning `None` if not registered.
    pub fn find_by_email(&self, email: &str) -> CoreResult<Option<User>> {
        let email = email.trim().to_ascii_lowercase();
        Ok(self.db.get_user_by_email(&email)?)
    }
}
