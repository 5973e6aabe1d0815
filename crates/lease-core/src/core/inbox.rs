//! Message read state.

use serde::Serialize;
use tracing::debug;

use crate::store::{now_ts, Database};

use super::CoreResult;

/// Result of marking a conversation read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MarkReadResult {
    pub modified_count: usize,
}

/// Service for read-state operations.
pub struct InboxService<'a> {
    db: &'a Database,
}

impl<'a> InboxService<'a> {
    pub(crate) const fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Mark every unread message from `partner_id` to `viewer_id` as read.
    ///
    /// One `UPDATE` statement, so it is atomic. Messages the viewer sent are
    /// untouched. Calling it again reports zero modified rows.
    #[tracing::instrument(skip(self))]
    pub fn mark_read(&self, viewer_id: &str, partner_id: &str) -> CoreResult<MarkReadResult> {
        let modified_count = self.db.mark_read(viewer_id, partner_id, &now_ts())?;
        debug!(modified_count, "marked messages read");
        Ok(MarkReadResult { modified_count })
    }

    /// Number of unread messages addressed to `user_id`.
    pub fn unread_count(&self, user_id: &str) -> CoreResult<i64> {
        Ok(self.db.count_unread(user_id)?)
    }
}
