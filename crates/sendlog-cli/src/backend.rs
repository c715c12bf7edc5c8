use sendlog_config::MatchingConfig;
use sendlog_core::domain::{
    email_domain, normalize_email, CompanyScope, Contact, ContactDraft, ContactId, OffPlatformSend,
};
use sendlog_core::time::now_utc;
use sendlog_ingest::{BackendError, ContactBackend, Lookup};
use sendlog_store::error::StoreError;
use sendlog_store::repo::{ContactNew, SendNew};
use sendlog_store::Store;
use tracing::debug;

/// The local SQLite store as a contact backend.
pub struct LocalBackend<'a> {
    store: &'a Store,
    matching: &'a MatchingConfig,
}

impl<'a> LocalBackend<'a> {
    pub fn new(store: &'a Store, matching: &'a MatchingConfig) -> Self {
        Self { store, matching }
    }
}

impl ContactBackend for LocalBackend<'_> {
    fn backend_name(&self) -> &'static str {
        "local"
    }

    fn find_contact_by_email(
        &self,
        email: &str,
        scope: Option<&CompanyScope>,
    ) -> Result<Lookup, BackendError> {
        let contacts = self.store.contacts();
        if let Some(contact) = contacts.find_by_email(email, scope).map_err(store_error)? {
            return Ok(Lookup::Exact(contact));
        }

        let Some(domain) = email_domain(email) else {
            return Ok(Lookup::Fuzzy(Vec::new()));
        };
        if self.matching.ignores(&domain) {
            debug!(domain = %domain, "domain excluded from fuzzy matching");
            return Ok(Lookup::Fuzzy(Vec::new()));
        }

        let normalized = normalize_email(email).unwrap_or_default();
        let candidates = contacts
            .list_by_domain(&domain, scope)
            .map_err(store_error)?
            .into_iter()
            .filter(|contact| contact.email != normalized)
            .collect();
        Ok(Lookup::Fuzzy(candidates))
    }

    fn create_contact(&self, draft: &ContactDraft) -> Result<Contact, BackendError> {
        self.store
            .contacts()
            .create(now_utc(), ContactNew::from(draft.clone()))
            .map_err(store_error)
    }

    fn record_off_platform_send(
        &self,
        contact_id: &ContactId,
        send: &OffPlatformSend,
    ) -> Result<(), BackendError> {
        self.store
            .sends()
            .record(
                now_utc(),
                SendNew {
                    contact_id: contact_id.clone(),
                    send: send.clone(),
                },
            )
            .map(|_| ())
            .map_err(store_error)
    }
}

fn store_error(err: StoreError) -> BackendError {
    BackendError::Store(err.to_string())
}
