pub mod backend;
pub mod batch;
pub mod blob;
pub mod csv;
pub mod error;
pub mod http;
pub mod resolve;
pub mod session;

pub use backend::{ContactBackend, Lookup};
pub use batch::{import_parsed, BatchOptions, BatchReport, Confirmations, PendingConfirmation};
pub use blob::{parse_email_blob, BlobRecordOptions, ParsedEmail};
pub use self::csv::{csv_template, export_sends, parse_csv, CsvEntry, CsvOptions, ExportRow, ParsedCsv, SkippedRow};
pub use error::{BackendError, IngestError, ParseError, Result};
pub use http::HttpBackend;
pub use resolve::{establish_target, persist, resolve_match, Target};
pub use session::{LogSession, SessionState};
