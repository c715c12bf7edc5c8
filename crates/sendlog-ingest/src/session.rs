use crate::backend::ContactBackend;
use crate::batch::Confirmations;
use crate::blob::{parse_email_blob, BlobRecordOptions};
use crate::error::{IngestError, Result};
use crate::resolve::{establish_target, persist, resolve_match};
use sendlog_core::domain::{
    normalize_email, CompanyScope, Contact, ContactId, MatchResult, NormalizedEmailRecord,
};
use serde::Serialize;
use std::mem;
use tracing::{debug, info, warn};

/// Where a single-record log is in its lifecycle. Every state carries
/// exactly the data valid for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Parsing,
    AwaitingConfirmation {
        record: NormalizedEmailRecord,
        result: MatchResult,
    },
    ReadyToSave {
        record: NormalizedEmailRecord,
        result: MatchResult,
        confirmed: Option<ContactId>,
    },
    Saving,
    Saved {
        contact: Contact,
        created_contact: bool,
    },
    Failed {
        reason: String,
        /// Kept so the same record can be retried.
        record: Option<NormalizedEmailRecord>,
    },
}

impl SessionState {
    pub const fn label(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Parsing => "parsing",
            SessionState::AwaitingConfirmation { .. } => "awaiting_confirmation",
            SessionState::ReadyToSave { .. } => "ready_to_save",
            SessionState::Saving => "saving",
            SessionState::Saved { .. } => "saved",
            SessionState::Failed { .. } => "failed",
        }
    }

    /// Calls on a session are already serialised by `&mut self`; a busy
    /// state is only observable after a backend call unwound mid-operation.
    /// Such a session refuses work until `reset`.
    pub const fn is_busy(&self) -> bool {
        matches!(self, SessionState::Parsing | SessionState::Saving)
    }
}

/// Last resolution, reused while the address stays the same.
#[derive(Debug, Clone)]
struct ResolutionMemo {
    email: String,
    result: MatchResult,
}

/// Drives one record from input to a logged send, pausing for an explicit
/// confirmation whenever the contact match is fuzzy.
pub struct LogSession<B> {
    backend: B,
    scope: Option<CompanyScope>,
    state: SessionState,
    confirmations: Confirmations,
    memo: Option<ResolutionMemo>,
}

impl<B: ContactBackend> LogSession<B> {
    pub fn new(backend: B, scope: Option<CompanyScope>) -> Self {
        Self {
            backend,
            scope,
            state: SessionState::Idle,
            confirmations: Confirmations::new(),
            memo: None,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn load_blob(&mut self, blob: &str, options: &BlobRecordOptions) -> Result<&SessionState> {
        if self.state.is_busy() {
            return Err(IngestError::Busy);
        }
        self.state = SessionState::Parsing;
        match parse_email_blob(blob).to_record(options) {
            Ok(record) => self.resolve_loaded(record),
            Err(err) => self.fail(err, None),
        }
    }

    pub fn load_record(&mut self, record: NormalizedEmailRecord) -> Result<&SessionState> {
        if self.state.is_busy() {
            return Err(IngestError::Busy);
        }
        self.state = SessionState::Parsing;
        self.resolve_loaded(record)
    }

    /// Accepts one of the offered candidates. Anything outside the
    /// candidate list is refused and the session keeps waiting.
    pub fn confirm(&mut self, contact_id: ContactId) -> Result<&SessionState> {
        let (record, result) = match mem::replace(&mut self.state, SessionState::Idle) {
            SessionState::AwaitingConfirmation { record, result } => (record, result),
            other => {
                self.state = other;
                return Err(IngestError::InvalidState("confirm"));
            }
        };

        if !result.offers(&contact_id) {
            let err = IngestError::NotACandidate {
                email: record.email.clone(),
                contact_id,
            };
            self.state = SessionState::AwaitingConfirmation { record, result };
            return Err(err);
        }
        if let Err(err) = self.confirmations.insert(&record.email, contact_id.clone()) {
            self.state = SessionState::AwaitingConfirmation { record, result };
            return Err(err);
        }

        debug!(email = %record.email, contact = %contact_id, "match confirmed");
        self.state = SessionState::ReadyToSave {
            record,
            result,
            confirmed: Some(contact_id),
        };
        Ok(&self.state)
    }

    pub fn save(&mut self) -> Result<&SessionState> {
        let state = mem::replace(&mut self.state, SessionState::Saving);
        let (record, result, confirmed) = match state {
            SessionState::ReadyToSave {
                record,
                result,
                confirmed,
            } => (record, result, confirmed),
            SessionState::AwaitingConfirmation { record, result } => {
                let err = IngestError::UnconfirmedMatch {
                    email: record.email.clone(),
                    candidates: result.candidates().into_iter().cloned().collect(),
                };
                self.state = SessionState::AwaitingConfirmation { record, result };
                return Err(err);
            }
            other => {
                let err = if other.is_busy() {
                    IngestError::Busy
                } else {
                    IngestError::InvalidState("save")
                };
                self.state = other;
                return Err(err);
            }
        };

        let outcome = establish_target(
            &self.backend,
            &record,
            result,
            confirmed.as_ref(),
            self.scope.as_ref(),
        )
        .and_then(|target| persist(&self.backend, &target, &record).map(|()| target));
        // A save may have created the contact, so the cached lookup is stale.
        self.memo = None;

        match outcome {
            Ok(target) => {
                info!(
                    email = %record.email,
                    contact = %target.contact.id,
                    created = target.created,
                    "send logged"
                );
                self.state = SessionState::Saved {
                    contact: target.contact,
                    created_contact: target.created,
                };
                Ok(&self.state)
            }
            Err(err) => self.fail(err, Some(record)),
        }
    }

    /// Runs a failed record through resolution again.
    pub fn retry(&mut self) -> Result<&SessionState> {
        let state = mem::replace(&mut self.state, SessionState::Idle);
        match state {
            SessionState::Failed {
                record: Some(record),
                ..
            } => {
                self.memo = None;
                self.load_record(record)
            }
            other => {
                self.state = other;
                Err(IngestError::InvalidState("retry"))
            }
        }
    }

    pub fn reset(&mut self) {
        self.state = SessionState::Idle;
    }

    fn resolve_loaded(&mut self, record: NormalizedEmailRecord) -> Result<&SessionState> {
        match self.resolve(&record) {
            Ok(result) => {
                let confirmed = self.confirmations.get(&record.email).cloned();
                self.state = match confirmed {
                    None if result.needs_confirmation() => {
                        SessionState::AwaitingConfirmation { record, result }
                    }
                    confirmed => SessionState::ReadyToSave {
                        record,
                        result,
                        confirmed,
                    },
                };
                Ok(&self.state)
            }
            Err(err) => self.fail(err, Some(record)),
        }
    }

    fn resolve(&mut self, record: &NormalizedEmailRecord) -> Result<MatchResult> {
        record
            .validate()
            .map_err(|_| IngestError::InvalidEmail(record.email.clone()))?;
        let email = normalize_email(&record.email)
            .ok_or_else(|| IngestError::InvalidEmail(record.email.clone()))?;

        if let Some(memo) = &self.memo {
            if memo.email == email {
                return Ok(memo.result.clone());
            }
        }

        let result = resolve_match(&self.backend, &email, self.scope.as_ref())?;
        self.memo = Some(ResolutionMemo {
            email,
            result: result.clone(),
        });
        Ok(result)
    }

    fn fail(
        &mut self,
        err: IngestError,
        record: Option<NormalizedEmailRecord>,
    ) -> Result<&SessionState> {
        warn!(error = %err, "log failed");
        self.state = SessionState::Failed {
            reason: err.to_string(),
            record,
        };
        Err(err)
    }
}
