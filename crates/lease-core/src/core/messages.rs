//! Message service: send and delete direct messages.

use tracing::debug;

use crate::ids::new_message_id;
use crate::store::{now_ts, Database, Message, NewMessage};
use crate::validation;

use super::{CoreError, CoreResult};

/// Service for message operations.
pub struct MessageService<'a> {
    db: &'a Database,
}

impl<'a> MessageService<'a> {
    pub(crate) const fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Send a message from `sender_id` to `receiver_id`, optionally about a listing.
    ///
    /// Messaging yourself is rejected with `Conflict` before anything is read
    /// or written.
    #[tracing::instrument(skip(self, content))]
    pub fn send(
        &self,
        sender_id: &str,
        receiver_id: &str,
        content: &str,
        listing_id: Option<&str>,
    ) -> CoreResult<Message> {
        if sender_id == receiver_id {
            return Err(CoreError::conflict("cannot send a message to yourself"));
        }
        let content = validation::message_content(content)?;

        for user_id in [sender_id, receiver_id] {
            if self.db.get_user(user_id)?.is_none() {
                return Err(CoreError::UserNotFound {
                    user_id: user_id.to_string(),
                });
            }
        }
        if let Some(listing_id) = listing_id {
            if self.db.get_listing(listing_id)?.is_none() {
                return Err(CoreError::ListingNotFound {
                    listing_id: listing_id.to_string(),
                });
            }
        }

        let message_id = new_message_id()?;
        let created_at = now_ts();
        self.db.insert_message(&NewMessage {
            message_id: &message_id,
            sender_id,
            receiver_id,
            listing_id,
            content: &content,
            created_at: &created_at,
        })?;
        debug!(%message_id, "sent message");

        self.get(&message_id)
    }

    /// Get a message by ID.
    ///
    /// Returns `Err(CoreError::MessageNotFound)` if the message does not exist.
    pub fn get(&self, message_id: &str) -> CoreResult<Message> {
        self.db
            .get_message(message_id)?
            .ok_or_else(|| CoreError::MessageNotFound {
                message_id: message_id.to_string(),
            })
    }

    /// Delete a message. Only its sender may delete it.
    #[tracing::instrument(skip(self))]
    pub fn delete(&self, message_id: &str, actor_id: &str) -> CoreResult<()> {
        let message = self.get(message_id)?;
        if message.sender.user_id != actor_id {
            return Err(CoreError::forbidden("only the sender can delete a message"));
        }
        if !self.db.delete_message(message_id)? {
            return Err(CoreError::MessageNotFound {
                message_id: message_id.to_string(),
            });
        }
        debug!(message_id, "deleted message");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_support::{seed_listing, seed_user, services};
    use crate::core::ErrorKind;

    #[test]
    fn test_send_resolves_participants_and_listing() {
        let services = services();
        let dana = seed_user(&services, "Dana", "dana@ucla.edu");
        let eli = seed_user(&services, "Eli", "eli@ucla.edu");
        let listing = seed_listing(&services, &eli);

        let message = services
            .messages()
            .send(&dana, &eli, " Is this still available? ", Some(&listing))
            .unwrap();
        assert_eq!(message.content, "Is this still available?");
        assert_eq!(message.sender.display_name.as_deref(), Some("Dana"));
        assert_eq!(message.receiver.email.as_deref(), Some("eli@ucla.edu"));
        assert_eq!(message.listing_id.as_deref(), Some(listing.as_str()));
        assert_eq!(message.listing_title.as_deref(), Some("Landfair two bedroom"));
        assert!(!message.read);
        assert!(message.read_at.is_none());
    }

    #[test]
    fn test_send_to_self_conflicts() {
        let services = services();
        let fay = seed_user(&services, "Fay", "fay@ucla.edu");

        let err = services
            .messages()
            .send(&fay, &fay, "note to self", None)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(services.db().messages_involving(&fay).unwrap().is_empty());
    }

    #[test]
    fn test_send_checks_references() {
        let services = services();
        let dana = seed_user(&services, "Dana", "dana@ucla.edu");
        let eli = seed_user(&services, "Eli", "eli@ucla.edu");

        let err = services
            .messages()
            .send(&dana, "usr-0000000000", "hello", None)
            .unwrap_err();
        assert!(matches!(err, CoreError::UserNotFound { .. }));

        let err = services
            .messages()
            .send(&dana, &eli, "hello", Some("lst-0000000000"))
            .unwrap_err();
        assert!(matches!(err, CoreError::ListingNotFound { .. }));

        let err = services.messages().send(&dana, &eli, "   ", None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_delete_is_sender_only() {
        let services = services();
        let dana = seed_user(&services, "Dana", "dana@ucla.edu");
        let eli = seed_user(&services, "Eli", "eli@ucla.edu");
        let message = services
            .messages()
            .send(&dana, &eli, "hello", None)
            .unwrap();

        let err = services
            .messages()
            .delete(&message.message_id, &eli)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);

        services
            .messages()
            .delete(&message.message_id, &dana)
            .unwrap();
        let err = services.messages().get(&message.message_id).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
