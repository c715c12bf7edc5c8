use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("email address is required")]
    EmptyEmail,
    #[error("invalid email address: {0:?}")]
    InvalidEmail(String),
    #[error("invalid id: {0:?}")]
    InvalidId(String),
    #[error("invalid company scope")]
    InvalidCompanyScope,
    #[error("invalid platform label")]
    InvalidPlatformLabel,
}
