//! lease-core: domain logic for the lease housing marketplace.
//!
//! This crate owns the SQLite store, the review lifecycle and rating
//! aggregation, the conversation projection over the message log, and the
//! shared domain types.

pub mod config;
pub mod core;
pub mod identity;
pub mod ids;
pub mod store;
pub mod validation;
