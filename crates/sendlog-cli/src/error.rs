use anyhow::Error;
use sendlog_config::ConfigError;
use sendlog_core::time::TimeParseError;
use sendlog_core::CoreError;
use sendlog_ingest::{BackendError, IngestError, ParseError};
use sendlog_store::error::{StoreError, StoreErrorKind};
use std::process::ExitCode;
use thiserror::Error as ThisError;

pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_NOT_FOUND: u8 = 2;
pub const EXIT_INVALID_INPUT: u8 = 3;

#[derive(Debug, ThisError)]
pub enum CliError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("not found: {0}")]
    NotFound(String),
}

pub fn invalid_input(message: impl Into<String>) -> Error {
    CliError::InvalidInput(message.into()).into()
}

pub fn not_found(message: impl Into<String>) -> Error {
    CliError::NotFound(message.into()).into()
}

pub fn report_error(err: &Error, verbose: bool) {
    if verbose {
        eprintln!("error: {:#}", err);
    } else {
        eprintln!("error: {}", err);
    }
}

pub fn exit_code_for(err: &Error) -> ExitCode {
    for cause in err.chain() {
        if let Some(cli_err) = cause.downcast_ref::<CliError>() {
            return ExitCode::from(match cli_err {
                CliError::InvalidInput(_) => EXIT_INVALID_INPUT,
                CliError::NotFound(_) => EXIT_NOT_FOUND,
            });
        }
        if let Some(ingest_err) = cause.downcast_ref::<IngestError>() {
            return ExitCode::from(ingest_exit_code(ingest_err));
        }
        if let Some(backend_err) = cause.downcast_ref::<BackendError>() {
            return ExitCode::from(backend_exit_code(backend_err));
        }
        if let Some(store_err) = cause.downcast_ref::<StoreError>() {
            return ExitCode::from(store_exit_code(store_err));
        }
        if let Some(config_err) = cause.downcast_ref::<ConfigError>() {
            return ExitCode::from(config_exit_code(config_err));
        }
        if let Some(_parse_err) = cause.downcast_ref::<ParseError>() {
            return ExitCode::from(EXIT_INVALID_INPUT);
        }
        if let Some(_core_err) = cause.downcast_ref::<CoreError>() {
            return ExitCode::from(EXIT_INVALID_INPUT);
        }
        if let Some(_time_err) = cause.downcast_ref::<TimeParseError>() {
            return ExitCode::from(EXIT_INVALID_INPUT);
        }
    }
    ExitCode::from(EXIT_FAILURE)
}

fn ingest_exit_code(err: &IngestError) -> u8 {
    match err {
        IngestError::Parse(_)
        | IngestError::InvalidEmail(_)
        | IngestError::UnconfirmedMatch { .. }
        | IngestError::NotACandidate { .. }
        | IngestError::NoCompanyScope { .. }
        | IngestError::Core(_) => EXIT_INVALID_INPUT,
        IngestError::Resolution { source, .. } | IngestError::Persistence { source, .. } => {
            backend_exit_code(source)
        }
        IngestError::Busy | IngestError::InvalidState(_) | IngestError::Csv(_) => EXIT_FAILURE,
    }
}

fn backend_exit_code(err: &BackendError) -> u8 {
    match err {
        BackendError::Unavailable(_) | BackendError::Rejected { .. } => EXIT_INVALID_INPUT,
        BackendError::Server { .. } | BackendError::Transport(_) | BackendError::Store(_) => {
            EXIT_FAILURE
        }
    }
}

fn store_exit_code(err: &StoreError) -> u8 {
    match err.kind() {
        StoreErrorKind::NotFound => EXIT_NOT_FOUND,
        StoreErrorKind::InvalidId
        | StoreErrorKind::InvalidDataPath
        | StoreErrorKind::DuplicateEmail
        | StoreErrorKind::Core => EXIT_INVALID_INPUT,
        StoreErrorKind::MissingHomeDir
        | StoreErrorKind::Migration
        | StoreErrorKind::InvalidDate
        | StoreErrorKind::Sql
        | StoreErrorKind::Io => EXIT_FAILURE,
    }
}

fn config_exit_code(err: &ConfigError) -> u8 {
    match err {
        ConfigError::MissingHomeDir => EXIT_FAILURE,
        ConfigError::InvalidConfigPath(_)
        | ConfigError::MissingConfigFile(_)
        | ConfigError::InsecurePermissions(_)
        | ConfigError::InvalidCompanyScope
        | ConfigError::InvalidPlatform(_)
        | ConfigError::InvalidIgnoreDomain(_)
        | ConfigError::InvalidBackendField { .. }
        | ConfigError::Read { .. }
        | ConfigError::Parse { .. } => EXIT_INVALID_INPUT,
    }
}
