use anyhow::{Context as _, Result};
use chrono::{DateTime, Local, NaiveDate, Utc};
use sendlog_core::domain::{CompanyScope, Contact, ContactId, Platform};
use sendlog_core::time::{parse_date_shapes, today_local};
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;

use crate::error::invalid_input;

/// Reads a file, or stdin when no path (or `-`) is given.
pub fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path.as_os_str() != "-" => fs::read_to_string(path)
            .with_context(|| format!("read input file {}", path.display())),
        _ => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .with_context(|| "read stdin")?;
            Ok(buf)
        }
    }
}

pub fn parse_contact_id(raw: &str) -> Result<ContactId> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(invalid_input("contact id cannot be empty"));
    }
    ContactId::from_str(trimmed).map_err(|_| invalid_input(format!("invalid contact id: {raw}")))
}

pub fn parse_company_scope(raw: &str) -> Result<CompanyScope> {
    CompanyScope::new(raw).map_err(|_| invalid_input("company scope cannot be empty"))
}

pub fn parse_platform(raw: &str) -> Result<Platform> {
    Platform::from_str(raw).map_err(|_| {
        invalid_input(format!(
            "invalid platform {raw:?}: expected one of {}",
            Platform::suggestions().join("|")
        ))
    })
}

/// Accepts any of the sent-date shapes; defaults to today.
pub fn parse_sent_date_arg(raw: Option<&str>) -> Result<NaiveDate> {
    match raw.map(str::trim).filter(|raw| !raw.is_empty()) {
        Some(raw) => parse_date_shapes(raw).ok_or_else(|| {
            invalid_input(format!(
                "invalid date {raw:?}: expected YYYY-MM-DD, M/D/YYYY or Month D, YYYY"
            ))
        }),
        None => Ok(today_local()),
    }
}

pub fn format_timestamp_datetime(ts: i64) -> String {
    DateTime::<Utc>::from_timestamp(ts, 0)
        .map(|dt| dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| ts.to_string())
}

pub fn contact_line(contact: &Contact) -> String {
    let name = contact.display_name();
    if name == contact.email {
        format!("{}  {}", contact.id, contact.email)
    } else {
        format!("{}  {} <{}>", contact.id, name, contact.email)
    }
}
