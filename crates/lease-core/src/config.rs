//! Runtime configuration.
//!
//! Every setting is resolved in the same order: explicit value (usually a
//! CLI flag), then environment variable, then built-in default.

use std::env;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Environment variable overriding the database location.
pub const DB_PATH_VAR: &str = "LEASE_DB";
/// Environment variable overriding the institutional email domain.
pub const EMAIL_DOMAIN_VAR: &str = "LEASE_EMAIL_DOMAIN";

/// Database location used when nothing else is configured.
pub const DEFAULT_DB_PATH: &str = ".lease/lease.db";
/// Email domain accepted for registration when nothing else is configured.
pub const DEFAULT_EMAIL_DOMAIN: &str = "ucla.edu";

/// Resolved configuration for a lease process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaseConfig {
    db_path: PathBuf,
    email_domain: String,
}

impl LeaseConfig {
    #[must_use]
    pub fn new(db_path: impl Into<PathBuf>, email_domain: impl Into<String>) -> Self {
        Self {
            db_path: db_path.into(),
            email_domain: email_domain.into().trim().to_ascii_lowercase(),
        }
    }

    /// Resolve configuration from explicit overrides and the environment.
    #[must_use]
    pub fn resolve(db_path: Option<&Path>, email_domain: Option<&str>) -> Self {
        let db_path = db_path.map_or_else(
            || setting(DB_PATH_VAR, DEFAULT_DB_PATH).into(),
            Path::to_path_buf,
        );
        let email_domain = email_domain.map_or_else(
            || setting(EMAIL_DOMAIN_VAR, DEFAULT_EMAIL_DOMAIN),
            ToString::to_string,
        );
        Self::new(db_path, email_domain)
    }

    /// Path to the SQLite database file.
    #[must_use]
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Institutional domain that registration emails must belong to.
    #[must_use]
    pub fn email_domain(&self) -> &str {
        &self.email_domain
    }
}

impl Default for LeaseConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DB_PATH, DEFAULT_EMAIL_DOMAIN)
    }
}

fn setting(var: &str, default: &str) -> String {
    match env::var(var) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => {
            debug!("{var} not set, using default: {default}");
            default.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_values_win() {
        let config = LeaseConfig::resolve(Some(Path::new("/tmp/x.db")), Some("Example.EDU "));
        assert_eq!(config.db_path(), Path::new("/tmp/x.db"));
        assert_eq!(config.email_domain(), "example.edu");
    }

    #[test]
    fn test_default() {
        let config = LeaseConfig::default();
        assert_eq!(config.db_path(), Path::new(DEFAULT_DB_PATH));
        assert_eq!(config.email_domain(), "ucla.edu");
    }
}
