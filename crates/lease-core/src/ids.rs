//! ID generation for users, listings, reviews, and messages.
//!
//! Uses short, human-readable slugs: usr-xxx, lst-xxx, rev-xxx, msg-xxx

use anyhow::{anyhow, Result};

/// Prefix for user IDs
const USER_PREFIX: &str = "usr";
/// Prefix for listing IDs
const LISTING_PREFIX: &str = "lst";
/// Prefix for review IDs
const REVIEW_PREFIX: &str = "rev";
/// Prefix for message IDs
const MESSAGE_PREFIX: &str = "msg";

/// Length of the random suffix (in base36 chars)
const SUFFIX_LEN: usize = 10;

const CHARS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generate a base36 suffix from OS randomness.
fn base36_suffix(len: usize) -> Result<String> {
    let mut bytes = [0u8; 8];
    getrandom::fill(&mut bytes).map_err(|e| anyhow!("Failed to read OS randomness: {e}"))?;

    let mut n = u64::from_le_bytes(bytes);
    let mut result = String::with_capacity(len);
    while result.len() < len {
        let idx = (n % 36) as usize;
        result.push(char::from(CHARS[idx]));
        n /= 36;
    }

    Ok(result)
}

fn new_id(prefix: &str) -> Result<String> {
    Ok(format!("{prefix}-{}", base36_suffix(SUFFIX_LEN)?))
}

fn has_shape(s: &str, prefix: &str) -> bool {
    s.strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('-'))
        .is_some_and(|suffix| {
            suffix.len() == SUFFIX_LEN
                && suffix
                    .bytes()
                    .all(|b| b.is_ascii_digit() || b.is_ascii_lowercase())
        })
}

/// Generate a new user ID (e.g., "usr-0k3f9a1bz2")
pub fn new_user_id() -> Result<String> {
    new_id(USER_PREFIX)
}

/// Generate a new listing ID (e.g., "lst-77qwe0pl3m")
pub fn new_listing_id() -> Result<String> {
    new_id(LISTING_PREFIX)
}

/// Generate a new review ID (e.g., "rev-1d3fa9c0xx")
pub fn new_review_id() -> Result<String> {
    new_id(REVIEW_PREFIX)
}

/// Generate a new message ID (e.g., "msg-ab12cd34ef")
pub fn new_message_id() -> Result<String> {
    new_id(MESSAGE_PREFIX)
}

/// Check if a string looks like a valid user ID
#[must_use]
pub fn is_user_id(s: &str) -> bool {
    has_shape(s, USER_PREFIX)
}

/// Check if a string looks like a valid listing ID
#[must_use]
pub fn is_listing_id(s: &str) -> bool {
    has_shape(s, LISTING_PREFIX)
}

/// Check if a string looks like a valid review ID
#[must_use]
pub fn is_review_id(s: &str) -> bool {
    has_shape(s, REVIEW_PREFIX)
}

/// Check if a string looks like a valid message ID
#[must_use]
pub fn is_message_id(s: &str) -> bool {
    has_shape(s, MESSAGE_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_id_formats() {
        let user = new_user_id().unwrap();
        assert!(user.starts_with("usr-"), "ID should start with 'usr-': {user}");
        assert_eq!(user.len(), 14);
        assert!(is_user_id(&user));

        assert!(is_listing_id(&new_listing_id().unwrap()));
        assert!(is_review_id(&new_review_id().unwrap()));
        assert!(is_message_id(&new_message_id().unwrap()));
    }

    #[test]
    fn test_uniqueness() {
        let mut ids: HashSet<String> = HashSet::new();
        for _ in 0..1000 {
            let id = new_message_id().unwrap();
            assert!(ids.insert(id.clone()), "Generated duplicate ID: {id}");
        }
    }

    #[test]
    fn test_validators() {
        assert!(is_review_id("rev-abcd012345"));
        assert!(!is_review_id("lst-abcd012345"));
        assert!(!is_review_id("rev-abc")); // too short
        assert!(!is_review_id("rev-ABCD012345")); // uppercase

        assert!(is_listing_id("lst-0000000000"));
        assert!(!is_user_id("usr_0000000000"));
        assert!(!is_message_id("msg-00000000000")); // too long
    }
}
