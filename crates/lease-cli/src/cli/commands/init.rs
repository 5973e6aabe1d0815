//! Implementation of `lease init` command.

use anyhow::Result;
use lease_core::core::CoreContext;

use crate::output::{Formatter, OutputFormat};

/// Run the init command.
///
/// Creates the database file and its schema. Safe to run again.
#[tracing::instrument(skip(ctx))]
pub fn run_init(ctx: &CoreContext, format: OutputFormat) -> Result<()> {
    let path = ctx.config().db_path();
    let existed = path.exists();
    ctx.open()?;

    let result = serde_json::json!({
        "database": path.display().to_string(),
        "created": !existed,
    });
    Formatter::new(format).print(&result)?;

    Ok(())
}
