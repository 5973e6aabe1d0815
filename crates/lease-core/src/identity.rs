//! Acting-user resolution.
//!
//! The core never authenticates anyone: the transport in front of it
//! resolves who is calling and passes that user ID into every operation.
//! This module is the shared resolution rule for local transports.

use std::env;

use anyhow::{bail, Result};

/// Environment variables checked for the acting user, in priority order.
const IDENTITY_VARS: &[&str] = &["LEASE_USER", "LEASE_ACTOR"];

/// Get the acting user ID.
///
/// Resolution order:
/// 1. Explicit override (`--as`)
/// 2. `LEASE_USER` environment variable
/// 3. `LEASE_ACTOR` environment variable
///
/// Returns an error if no identity is set.
pub fn resolve_actor(explicit: Option<&str>) -> Result<String> {
    if let Some(id) = explicit.map(str::trim).filter(|id| !id.is_empty()) {
        return Ok(id.to_string());
    }

    for var in IDENTITY_VARS {
        if let Ok(id) = env::var(var) {
            let id = id.trim();
            if !id.is_empty() {
                return Ok(id.to_string());
            }
        }
    }

    bail!("Acting user required. Use --as <user-id> or set LEASE_USER.")
}
