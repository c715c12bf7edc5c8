#![allow(dead_code)]

use sendlog_core::domain::{
    email_domain, normalize_email, CompanyScope, Contact, ContactDraft, ContactId, OffPlatformSend,
};
use sendlog_ingest::{BackendError, ContactBackend, Lookup};
use std::cell::{Cell, RefCell};

/// In-memory contact store that records every call.
#[derive(Default)]
pub struct FakeBackend {
    pub contacts: RefCell<Vec<(Option<CompanyScope>, Contact)>>,
    pub sends: RefCell<Vec<(ContactId, OffPlatformSend)>>,
    pub lookups: Cell<usize>,
    pub server_error_for: Option<String>,
    pub failing_records: Cell<usize>,
    pub panicking_records: Cell<usize>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contact(self, email: &str, first: &str, scope: Option<&str>) -> Self {
        self.add_contact(email, first, scope);
        self
    }

    pub fn add_contact(&self, email: &str, first: &str, scope: Option<&str>) -> Contact {
        let contact = Contact {
            id: ContactId::new(),
            first_name: Some(first.to_string()),
            last_name: None,
            email: email.to_string(),
            title: None,
            company_name: None,
        };
        let scope = scope.map(|scope| CompanyScope::new(scope).unwrap());
        self.contacts.borrow_mut().push((scope, contact.clone()));
        contact
    }

    pub fn contact(&self, email: &str) -> Contact {
        self.contacts
            .borrow()
            .iter()
            .map(|(_, contact)| contact)
            .find(|contact| contact.email == email)
            .cloned()
            .unwrap()
    }

    pub fn contact_count(&self) -> usize {
        self.contacts.borrow().len()
    }

    pub fn send_count(&self) -> usize {
        self.sends.borrow().len()
    }
}

impl ContactBackend for FakeBackend {
    fn backend_name(&self) -> &'static str {
        "fake"
    }

    fn find_contact_by_email(
        &self,
        email: &str,
        scope: Option<&CompanyScope>,
    ) -> Result<Lookup, BackendError> {
        self.lookups.set(self.lookups.get() + 1);
        let email = normalize_email(email).unwrap();
        if self.server_error_for.as_deref() == Some(email.as_str()) {
            return Err(BackendError::Server {
                status: 503,
                message: "unavailable".to_string(),
            });
        }

        let contacts = self.contacts.borrow();
        let visible = contacts
            .iter()
            .filter(|(contact_scope, _)| scope.is_none() || contact_scope.as_ref() == scope)
            .map(|(_, contact)| contact);
        let mut fuzzy = Vec::new();
        let domain = email_domain(&email);
        for contact in visible {
            if contact.email == email {
                return Ok(Lookup::Exact(contact.clone()));
            }
            if email_domain(&contact.email) == domain {
                fuzzy.push(contact.clone());
            }
        }
        Ok(Lookup::Fuzzy(fuzzy))
    }

    fn create_contact(&self, draft: &ContactDraft) -> Result<Contact, BackendError> {
        let contact = Contact {
            id: ContactId::new(),
            first_name: draft.first_name.clone(),
            last_name: draft.last_name.clone(),
            email: draft.email.clone(),
            title: None,
            company_name: None,
        };
        self.contacts
            .borrow_mut()
            .push((Some(draft.company_scope.clone()), contact.clone()));
        Ok(contact)
    }

    fn record_off_platform_send(
        &self,
        contact_id: &ContactId,
        send: &OffPlatformSend,
    ) -> Result<(), BackendError> {
        if self.panicking_records.get() > 0 {
            self.panicking_records.set(self.panicking_records.get() - 1);
            panic!("backend crashed while recording");
        }
        if self.failing_records.get() > 0 {
            self.failing_records.set(self.failing_records.get() - 1);
            return Err(BackendError::Rejected {
                status: 422,
                message: "validation failed".to_string(),
            });
        }
        self.sends
            .borrow_mut()
            .push((contact_id.clone(), send.clone()));
        Ok(())
    }
}
