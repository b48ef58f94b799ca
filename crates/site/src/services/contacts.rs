//! Contact messages: public submission and the admin inbox.

use folio_core::{ContactId, ContactStatus, IdentityId, TransitionError};

use crate::db::{ContactStore, RepositoryError};
use crate::models::{Contact, ContactForm, ReplyForm};
use crate::services::content::{ContentError, Notice};

/// Errors from an inbox status change.
#[derive(Debug, thiserror::Error)]
pub enum ContactError {
    #[error(transparent)]
    Transition(#[from] TransitionError),

    /// `replied` is only reachable through the reply action.
    #[error("use the reply action to mark a contact as replied")]
    ReplyRequired,

    #[error("validation failed")]
    Validation(#[from] folio_core::ValidationErrors),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Store a public contact form submission with status `unread`.
///
/// # Errors
///
/// Returns `ContentError::Validation` with every failing field (nothing is
/// written), or `ContentError::Repository` if the insert fails.
#[tracing::instrument(skip_all)]
pub async fn submit_contact<S: ContactStore>(
    store: &S,
    form: &ContactForm,
) -> Result<Contact, ContentError> {
    let submission = form.validate()?;
    let contact = store.insert_contact(&submission).await.inspect_err(|e| {
        tracing::error!(error = %e, "Failed to store contact submission");
    })?;

    tracing::info!(id = %contact.id, "Contact submission received");
    Ok(contact)
}

/// The admin inbox.
pub struct ContactInbox<'a, S> {
    store: &'a S,
}

impl<'a, S: ContactStore> ContactInbox<'a, S> {
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// All contacts, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the read fails.
    pub async fn list(&self) -> Result<Vec<Contact>, RepositoryError> {
        self.store.contacts().await
    }

    async fn load(&self, id: ContactId) -> Result<Contact, RepositoryError> {
        self.store.contact(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Move a contact along `unread -> read -> archived`.
    ///
    /// # Errors
    ///
    /// - `ContactError::ReplyRequired` when asked for `replied`
    /// - `ContactError::Transition` for any other disallowed move
    /// - `ContactError::Repository` (`NotFound` for a missing contact)
    pub async fn transition(
        &self,
        actor: IdentityId,
        id: ContactId,
        next: ContactStatus,
    ) -> Result<(Contact, Notice), ContactError> {
        if next == ContactStatus::Replied {
            return Err(ContactError::ReplyRequired);
        }

        let current = self.load(id).await?;
        let next = current.status.transition_to(next)?;
        let contact = self.store.set_contact_status(id, next).await?;

        tracing::info!(%id, %actor, from = %current.status, to = %next, "Contact status changed");
        let notice = Notice::success(format!("Contact marked as {next}"));
        Ok((contact, notice))
    }

    /// Reply to a contact.
    ///
    /// Nothing is dispatched: the reply is validated, the contact becomes
    /// `replied` from any status, and the notice names the recipient.
    ///
    /// # Errors
    ///
    /// Returns `ContactError::Validation` if subject or message is blank.
    pub async fn reply(
        &self,
        actor: IdentityId,
        id: ContactId,
        form: &ReplyForm,
    ) -> Result<(Contact, Notice), ContactError> {
        let reply = form.validate()?;
        let current = self.load(id).await?;
        let next = current.status.transition_to(ContactStatus::Replied)?;
        let contact = self.store.set_contact_status(id, next).await?;

        tracing::info!(%id, %actor, subject = %reply.subject, "Contact reply recorded");
        let notice = Notice::success(format!("Reply sent to {}", contact.email));
        Ok((contact, notice))
    }

    /// Delete a contact.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the contact does not exist.
    pub async fn delete(&self, actor: IdentityId, id: ContactId) -> Result<Notice, RepositoryError> {
        if !self.store.delete_contact(id).await? {
            return Err(RepositoryError::NotFound);
        }
        tracing::info!(%id, %actor, "Contact deleted");
        Ok(Notice::success("Contact deleted successfully"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    fn form(name: &str, email: &str, message: &str) -> ContactForm {
        ContactForm {
            name: name.to_owned(),
            email: email.to_owned(),
            message: message.to_owned(),
        }
    }

    async fn submitted(store: &MemoryStore) -> Contact {
        submit_contact(store, &form("Visitor", "visitor@example.com", "Hello there"))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_submission_starts_unread() {
        let store = MemoryStore::new();
        let contact = submitted(&store).await;
        assert_eq!(contact.status, ContactStatus::Unread);
        assert_eq!(contact.name, "Visitor");
    }

    #[tokio::test]
    async fn test_invalid_submission_reports_fields() {
        let store = MemoryStore::new();
        let err = submit_contact(&store, &form(" ", "nope", &"x".repeat(1001)))
            .await
            .unwrap_err();
        let ContentError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert!(errors.get("name").is_some());
        assert!(errors.get("email").is_some());
        assert!(errors.get("message").is_some());
        assert!(store.contacts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_status_transitions() {
        let store = MemoryStore::new();
        let inbox = ContactInbox::new(&store);
        let actor = IdentityId::generate();
        let contact = submitted(&store).await;

        assert!(matches!(
            inbox.transition(actor, contact.id, ContactStatus::Archived).await,
            Err(ContactError::Transition(_))
        ));
        assert!(matches!(
            inbox.transition(actor, contact.id, ContactStatus::Replied).await,
            Err(ContactError::ReplyRequired)
        ));

        let (read, notice) = inbox
            .transition(actor, contact.id, ContactStatus::Read)
            .await
            .unwrap();
        assert_eq!(read.status, ContactStatus::Read);
        assert_eq!(notice.message, "Contact marked as read");

        let (archived, _) = inbox
            .transition(actor, contact.id, ContactStatus::Archived)
            .await
            .unwrap();
        assert_eq!(archived.status, ContactStatus::Archived);

        assert!(matches!(
            inbox.transition(actor, contact.id, ContactStatus::Unread).await,
            Err(ContactError::Transition(_))
        ));
    }

    #[tokio::test]
    async fn test_reply_from_any_status() {
        let store = MemoryStore::new();
        let inbox = ContactInbox::new(&store);
        let actor = IdentityId::generate();
        let contact = submitted(&store).await;

        let blank = ReplyForm::default();
        assert!(matches!(
            inbox.reply(actor, contact.id, &blank).await,
            Err(ContactError::Validation(_))
        ));
        assert_eq!(
            inbox.load(contact.id).await.unwrap().status,
            ContactStatus::Unread
        );

        let reply = ReplyForm {
            subject: "Re: Hello".to_owned(),
            message: "Thanks for reaching out".to_owned(),
        };
        let (replied, notice) = inbox.reply(actor, contact.id, &reply).await.unwrap();
        assert_eq!(replied.status, ContactStatus::Replied);
        assert_eq!(notice.message, "Reply sent to visitor@example.com");
    }

    #[tokio::test]
    async fn test_missing_contact() {
        let store = MemoryStore::new();
        let inbox = ContactInbox::new(&store);
        let actor = IdentityId::generate();
        assert!(matches!(
            inbox.transition(actor, ContactId::generate(), ContactStatus::Read).await,
            Err(ContactError::Repository(RepositoryError::NotFound))
        ));
        assert!(matches!(
            inbox.delete(actor, ContactId::generate()).await,
            Err(RepositoryError::NotFound)
        ));
    }
}
