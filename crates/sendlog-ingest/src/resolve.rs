use crate::backend::{ContactBackend, Lookup};
use crate::error::{IngestError, Result};
use sendlog_core::domain::{
    normalize_email, CompanyScope, Contact, ContactDraft, ContactId, MatchResult,
    NormalizedEmailRecord,
};
use serde::Serialize;
use tracing::debug;

/// Exact lookup first, then same-domain candidates. Backend failures are
/// reported once and never re-queried.
pub fn resolve_match<B: ContactBackend>(
    backend: &B,
    email: &str,
    scope: Option<&CompanyScope>,
) -> Result<MatchResult> {
    let email = normalize_email(email).ok_or_else(|| IngestError::InvalidEmail(email.to_string()))?;
    if !email.contains('@') {
        return Err(IngestError::InvalidEmail(email));
    }

    let lookup = backend
        .find_contact_by_email(&email, scope)
        .map_err(|source| IngestError::Resolution {
            email: email.clone(),
            source,
        })?;

    let result = match lookup {
        Lookup::Exact(contact) => MatchResult::ExactMatch { contact },
        Lookup::Fuzzy(candidates) => MatchResult::from_domain_candidates(candidates),
    };
    debug!(
        backend = backend.backend_name(),
        email = %email,
        outcome = result.label(),
        "resolved contact"
    );
    Ok(result)
}

/// The contact a record will be attached to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Target {
    pub contact: Contact,
    pub created: bool,
}

/// Turns a match into an attachable contact. Fuzzy matches need `confirmed`
/// to name one of the candidates; `NoMatch` creates a contact when a scope
/// is available.
pub fn establish_target<B: ContactBackend>(
    backend: &B,
    record: &NormalizedEmailRecord,
    result: MatchResult,
    confirmed: Option<&ContactId>,
    scope: Option<&CompanyScope>,
) -> Result<Target> {
    match result {
        MatchResult::ExactMatch { contact } => Ok(Target {
            contact,
            created: false,
        }),
        MatchResult::FuzzyMatch { .. } | MatchResult::MultipleFuzzyMatches { .. } => {
            let Some(id) = confirmed else {
                return Err(IngestError::UnconfirmedMatch {
                    email: record.email.clone(),
                    candidates: result.candidates().into_iter().cloned().collect(),
                });
            };
            let chosen = result
                .candidates()
                .into_iter()
                .find(|contact| &contact.id == id)
                .cloned()
                .ok_or_else(|| IngestError::NotACandidate {
                    email: record.email.clone(),
                    contact_id: id.clone(),
                })?;
            debug!(email = %record.email, contact = %chosen.id, "fuzzy match confirmed");
            Ok(Target {
                contact: chosen,
                created: false,
            })
        }
        MatchResult::NoMatch => {
            let Some(scope) = scope else {
                return Err(IngestError::NoCompanyScope {
                    email: record.email.clone(),
                });
            };
            let draft = ContactDraft::new(
                &record.email,
                record.first_name.as_deref(),
                record.last_name.as_deref(),
                scope.clone(),
            )?;
            let contact = backend
                .create_contact(&draft)
                .map_err(|source| IngestError::Resolution {
                    email: record.email.clone(),
                    source,
                })?;
            debug!(email = %record.email, contact = %contact.id, "created contact");
            Ok(Target {
                contact,
                created: true,
            })
        }
    }
}

pub fn persist<B: ContactBackend>(
    backend: &B,
    target: &Target,
    record: &NormalizedEmailRecord,
) -> Result<()> {
    record
        .validate()
        .map_err(|_| IngestError::InvalidEmail(record.email.clone()))?;
    backend
        .record_off_platform_send(&target.contact.id, &record.to_send())
        .map_err(|source| IngestError::Persistence {
            email: record.email.clone(),
            source,
        })
}
