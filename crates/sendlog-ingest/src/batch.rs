use crate::backend::ContactBackend;
use crate::csv::{CsvEntry, ParsedCsv};
use crate::error::{IngestError, Result};
use crate::resolve::{establish_target, persist, resolve_match};
use sendlog_core::domain::{normalize_email, CompanyScope, Contact, ContactId};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{info, warn};

/// Explicit contact choices for addresses that resolved fuzzily, keyed by
/// normalised email.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Confirmations {
    by_email: HashMap<String, ContactId>,
}

impl Confirmations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, email: &str, contact_id: ContactId) -> Result<()> {
        let key = normalize_email(email)
            .filter(|key| key.contains('@'))
            .ok_or_else(|| IngestError::InvalidEmail(email.to_string()))?;
        self.by_email.insert(key, contact_id);
        Ok(())
    }

    pub fn get(&self, email: &str) -> Option<&ContactId> {
        self.by_email.get(&normalize_email(email)?)
    }

    pub fn len(&self) -> usize {
        self.by_email.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_email.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingConfirmation {
    pub row: usize,
    pub email: String,
    pub candidates: Vec<Contact>,
}

/// Outcome of one batch. Rows waiting on a confirmation are neither saved
/// nor skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub saved: usize,
    pub created_contacts: usize,
    pub skipped: usize,
    pub pending: Vec<PendingConfirmation>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct BatchOptions<'a> {
    pub scope: Option<&'a CompanyScope>,
    pub confirmations: &'a Confirmations,
}

enum RowOutcome {
    Saved { created: bool },
    Pending(Vec<Contact>),
}

/// Resolves and persists every extracted row in order, one round trip at a
/// time. A failing row is recorded and the batch moves on.
pub fn import_parsed<B: ContactBackend>(
    backend: &B,
    parsed: ParsedCsv,
    options: BatchOptions<'_>,
) -> BatchReport {
    let mut report = BatchReport {
        warnings: parsed.warnings,
        ..BatchReport::default()
    };
    let mut errors: Vec<(usize, String)> = Vec::new();

    for skipped in parsed.skipped {
        let err = IngestError::InvalidEmail(skipped.email);
        warn!(row = skipped.row, error = %err, "skipping row");
        report.skipped += 1;
        errors.push((skipped.row, format!("row {}: {err}", skipped.row)));
    }

    for entry in parsed.entries {
        match import_row(backend, &entry, options) {
            Ok(RowOutcome::Saved { created }) => {
                report.saved += 1;
                if created {
                    report.created_contacts += 1;
                }
            }
            Ok(RowOutcome::Pending(candidates)) => {
                report.pending.push(PendingConfirmation {
                    row: entry.row,
                    email: entry.record.email.clone(),
                    candidates,
                });
            }
            Err(err) => {
                warn!(row = entry.row, error = %err, "row failed");
                report.skipped += 1;
                errors.push((entry.row, format!("row {}: {err}", entry.row)));
            }
        }
    }

    errors.sort_by_key(|(row, _)| *row);
    report.errors = errors.into_iter().map(|(_, message)| message).collect();

    info!(
        backend = backend.backend_name(),
        saved = report.saved,
        skipped = report.skipped,
        pending = report.pending.len(),
        "batch complete"
    );
    report
}

fn import_row<B: ContactBackend>(
    backend: &B,
    entry: &CsvEntry,
    options: BatchOptions<'_>,
) -> Result<RowOutcome> {
    let record = &entry.record;
    let result = resolve_match(backend, &record.email, options.scope)?;
    let confirmed = options.confirmations.get(&record.email);
    if result.needs_confirmation() && confirmed.is_none() {
        return Ok(RowOutcome::Pending(
            result.candidates().into_iter().cloned().collect(),
        ));
    }

    let target = establish_target(backend, record, result, confirmed, options.scope)?;
    persist(backend, &target, record)?;
    Ok(RowOutcome::Saved {
        created: target.created,
    })
}
