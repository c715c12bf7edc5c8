use sendlog_core::domain::{Contact, ContactId};
use sendlog_core::CoreError;
use thiserror::Error;

/// Structural problems that make every row of a CSV untrustworthy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("too few rows")]
    TooFewRows,
    #[error("missing email column")]
    MissingEmailColumn,
}

/// Failure reported by a contact backend call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },
    #[error("request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("store error: {0}")]
    Store(String),
    #[error("{0}")]
    Unavailable(String),
}

impl BackendError {
    pub fn is_server_error(&self) -> bool {
        matches!(self, BackendError::Server { .. })
    }
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("invalid email address: {0:?}")]
    InvalidEmail(String),
    #[error("contact for {email} needs confirmation ({} candidate(s))", .candidates.len())]
    UnconfirmedMatch {
        email: String,
        candidates: Vec<Contact>,
    },
    #[error("contact {contact_id} is not a candidate for {email}")]
    NotACandidate { email: String, contact_id: ContactId },
    #[error("no contact matches {email} and no company scope is set to create one")]
    NoCompanyScope { email: String },
    #[error("could not resolve contact for {email}: {source}")]
    Resolution {
        email: String,
        #[source]
        source: BackendError,
    },
    #[error("could not record send for {email}: {source}")]
    Persistence {
        email: String,
        #[source]
        source: BackendError,
    },
    #[error("another operation is already in progress")]
    Busy,
    #[error("nothing to {0}")]
    InvalidState(&'static str),
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    #[error("csv write error: {0}")]
    Csv(#[from] ::csv::Error),
}

pub type Result<T> = std::result::Result<T, IngestError>;
