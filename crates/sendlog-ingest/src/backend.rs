use crate::error::BackendError;
use sendlog_core::domain::{CompanyScope, Contact, ContactDraft, ContactId, OffPlatformSend};

/// Answer to an email lookup. `Fuzzy` holds same-domain suggestions and may
/// be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Exact(Contact),
    Fuzzy(Vec<Contact>),
}

/// The contact store the pipeline reads from and writes to.
pub trait ContactBackend {
    fn backend_name(&self) -> &'static str;

    fn find_contact_by_email(
        &self,
        email: &str,
        scope: Option<&CompanyScope>,
    ) -> Result<Lookup, BackendError>;

    fn create_contact(&self, draft: &ContactDraft) -> Result<Contact, BackendError>;

    fn record_off_platform_send(
        &self,
        contact_id: &ContactId,
        send: &OffPlatformSend,
    ) -> Result<(), BackendError>;
}

impl<T: ContactBackend + ?Sized> ContactBackend for &T {
    fn backend_name(&self) -> &'static str {
        (**self).backend_name()
    }

    fn find_contact_by_email(
        &self,
        email: &str,
        scope: Option<&CompanyScope>,
    ) -> Result<Lookup, BackendError> {
        (**self).find_contact_by_email(email, scope)
    }

    fn create_contact(&self, draft: &ContactDraft) -> Result<Contact, BackendError> {
        (**self).create_contact(draft)
    }

    fn record_off_platform_send(
        &self,
        contact_id: &ContactId,
        send: &OffPlatformSend,
    ) -> Result<(), BackendError> {
        (**self).record_off_platform_send(contact_id, send)
    }
}

impl<T: ContactBackend + ?Sized> ContactBackend for Box<T> {
    fn backend_name(&self) -> &'static str {
        (**self).backend_name()
    }

    fn find_contact_by_email(
        &self,
        email: &str,
        scope: Option<&CompanyScope>,
    ) -> Result<Lookup, BackendError> {
        (**self).find_contact_by_email(email, scope)
    }

    fn create_contact(&self, draft: &ContactDraft) -> Result<Contact, BackendError> {
        (**self).create_contact(draft)
    }

    fn record_off_platform_send(
        &self,
        contact_id: &ContactId,
        send: &OffPlatformSend,
    ) -> Result<(), BackendError> {
        (**self).record_off_platform_send(contact_id, send)
    }
}
