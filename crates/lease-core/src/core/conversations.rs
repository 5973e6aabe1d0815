//! Conversation projector.
//!
//! There is no conversation table. A conversation is the set of messages
//! between a viewer and one partner, folded from the message log on every
//! read.

use std::collections::HashMap;

use serde::Serialize;

use crate::store::{Database, Message, Participant};

use super::{CoreError, CoreResult};

/// One row of a viewer's inbox: the latest state of the exchange with one partner.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationSummary {
    pub partner: Participant,
    pub last_message: Message,
    /// Messages from the partner the viewer has not read yet.
    pub unread_count: i64,
    pub total_messages: i64,
}

/// Fold a viewer's messages into one summary per partner.
///
/// `messages` must be newest first. Summaries come out in the order their
/// partner is first seen, so the most recently active conversation leads.
/// Messages the viewer is not part of are skipped.
#[must_use]
pub fn project_conversations(viewer_id: &str, messages: &[Message]) -> Vec<ConversationSummary> {
    let mut summaries: Vec<ConversationSummary> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for message in messages {
        let (partner, incoming) = if message.sender.user_id == viewer_id {
            (&message.receiver, false)
        } else if message.receiver.user_id == viewer_id {
            (&message.sender, true)
        } else {
            continue;
        };
        let unread = i64::from(incoming && !message.read);

        if let Some(&slot) = index.get(partner.user_id.as_str()) {
            let summary = &mut summaries[slot];
            summary.total_messages += 1;
            summary.unread_count += unread;
        } else {
            index.insert(partner.user_id.as_str(), summaries.len());
            summaries.push(ConversationSummary {
                partner: partner.clone(),
                last_message: message.clone(),
                unread_count: unread,
                total_messages: 1,
            });
        }
    }

    summaries
}

/// Service for conversation views. Never writes.
pub struct ConversationService<'a> {
    db: &'a Database,
}

impl<'a> ConversationService<'a> {
    pub(crate) const fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// All conversations of `viewer_id`, most recently active first.
    ///
    /// A viewer with no messages gets an empty list.
    pub fn list(&self, viewer_id: &str) -> CoreResult<Vec<ConversationSummary>> {
        let messages = self.db.messages_involving(viewer_id)?;
        Ok(project_conversations(viewer_id, &messages))
    }

    /// The full thread between `viewer_id` and `partner_id`, oldest first.
    pub fn get_conversation(&self, viewer_id: &str, partner_id: &str) -> CoreResult<Vec<Message>> {
        if viewer_id == partner_id {
            return Err(CoreError::conflict("a conversation needs two different members"));
        }
        Ok(self.db.messages_between(viewer_id, partner_id)?)
    }
}
