//! Command implementations.

pub mod helpers;
pub mod init;
pub mod listings;
pub mod messages;
pub mod ratings;
pub mod reviews;
pub mod users;

pub use init::run_init;
pub use listings::{
    run_listings_create, run_listings_delete, run_listings_list, run_listings_show,
    run_listings_update,
};
pub use messages::{
    run_messages_conversations, run_messages_delete, run_messages_read, run_messages_send,
    run_messages_show, run_messages_unread,
};
pub use ratings::run_ratings_reconcile;
pub use reviews::{
    run_reviews_create, run_reviews_delete, run_reviews_list, run_reviews_mine,
    run_reviews_update,
};
pub use users::{run_users_lookup, run_users_register, run_users_show};
