use crate::domain::email::{is_plausible_email, normalize_email};
use crate::domain::ids::ContactId;
use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tenant under which contacts are created and searched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompanyScope(String);

impl CompanyScope {
    pub fn new(value: &str) -> Result<Self, CoreError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(CoreError::InvalidCompanyScope);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CompanyScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: ContactId,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: String,
    pub title: Option<String>,
    pub company_name: Option<String>,
}

impl Contact {
    pub fn display_name(&self) -> String {
        let name = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if name.is_empty() {
            self.email.clone()
        } else {
            name
        }
    }
}

/// Input for creating a contact when resolution finds nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDraft {
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company_scope: CompanyScope,
}

impl ContactDraft {
    pub fn new(
        email: &str,
        first_name: Option<&str>,
        last_name: Option<&str>,
        company_scope: CompanyScope,
    ) -> Result<Self, CoreError> {
        if !is_plausible_email(email) {
            return Err(CoreError::InvalidEmail(email.to_string()));
        }
        let email = normalize_email(email).ok_or(CoreError::EmptyEmail)?;
        Ok(Self {
            email,
            first_name: clean_name(first_name),
            last_name: clean_name(last_name),
            company_scope,
        })
    }
}

fn clean_name(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::{CompanyScope, Contact, ContactDraft};
    use crate::domain::ids::ContactId;

    #[test]
    fn display_name_falls_back_to_email() {
        let contact = Contact {
            id: ContactId::new(),
            first_name: None,
            last_name: Some("  ".to_string()),
            email: "jane@acme.com".to_string(),
            title: None,
            company_name: None,
        };
        assert_eq!(contact.display_name(), "jane@acme.com");
    }

    #[test]
    fn draft_normalizes_email_and_drops_blank_names() {
        let scope = CompanyScope::new("acme").expect("scope");
        let draft = ContactDraft::new(" Jane@Acme.com ", Some("Jane"), Some(" "), scope)
            .expect("draft");
        assert_eq!(draft.email, "jane@acme.com");
        assert_eq!(draft.first_name.as_deref(), Some("Jane"));
        assert!(draft.last_name.is_none());
    }

    #[test]
    fn draft_rejects_address_without_at_sign() {
        let scope = CompanyScope::new("acme").expect("scope");
        assert!(ContactDraft::new("jane.acme.com", None, None, scope).is_err());
    }

    #[test]
    fn company_scope_rejects_blank() {
        assert!(CompanyScope::new("  ").is_err());
    }
}
