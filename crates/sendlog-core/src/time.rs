use chrono::{Local, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

// `<Weekday,> Month D, YYYY`
static LONG_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:\b[a-z]+,\s*)?\b([a-z]+)\.?\s+(\d{1,2}),\s*(\d{4})\b")
        .expect("long date regex")
});
// `M/D/YYYY`
static US_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b").expect("us date regex"));
// `YYYY-MM-DD`
static ISO_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{4})-(\d{2})-(\d{2})\b").expect("iso date regex"));

#[derive(Debug, Error)]
pub enum TimeParseError {
    #[error("date cannot be empty")]
    Empty,
    #[error("invalid date format: expected YYYY-MM-DD")]
    InvalidDateFormat,
}

/// Value of a `Sent:` header: a recognised calendar date, or the header
/// text kept verbatim when no shape matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SentDate {
    Parsed(NaiveDate),
    Raw(String),
}

impl SentDate {
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            SentDate::Parsed(date) => Some(*date),
            SentDate::Raw(_) => None,
        }
    }

    pub fn as_text(&self) -> String {
        match self {
            SentDate::Parsed(date) => format_date(*date),
            SentDate::Raw(raw) => raw.clone(),
        }
    }
}

pub fn now_utc() -> i64 {
    Utc::now().timestamp()
}

pub fn today_local() -> NaiveDate {
    Local::now().date_naive()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn parse_iso_date(input: &str) -> Result<NaiveDate, TimeParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(TimeParseError::Empty);
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|_| TimeParseError::InvalidDateFormat)
}

pub fn parse_sent_date(value: &str) -> SentDate {
    match parse_date_shapes(value) {
        Some(date) => SentDate::Parsed(date),
        None => SentDate::Raw(value.trim().to_string()),
    }
}

/// Tries the long, `M/D/YYYY` and ISO shapes in that order.
pub fn parse_date_shapes(value: &str) -> Option<NaiveDate> {
    long_date(value)
        .or_else(|| us_date(value))
        .or_else(|| iso_date(value))
}

fn long_date(value: &str) -> Option<NaiveDate> {
    let caps = LONG_DATE.captures(value)?;
    let month = month_number(caps.get(1)?.as_str())?;
    let day: u32 = caps.get(2)?.as_str().parse().ok()?;
    let year: i32 = caps.get(3)?.as_str().parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn us_date(value: &str) -> Option<NaiveDate> {
    let caps = US_DATE.captures(value)?;
    let month: u32 = caps.get(1)?.as_str().parse().ok()?;
    let day: u32 = caps.get(2)?.as_str().parse().ok()?;
    let year: i32 = caps.get(3)?.as_str().parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn iso_date(value: &str) -> Option<NaiveDate> {
    let caps = ISO_DATE.captures(value)?;
    let year: i32 = caps.get(1)?.as_str().parse().ok()?;
    let month: u32 = caps.get(2)?.as_str().parse().ok()?;
    let day: u32 = caps.get(3)?.as_str().parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn month_number(name: &str) -> Option<u32> {
    let lower = name.to_ascii_lowercase();
    let month = match lower.as_str() {
        "january" | "jan" => 1,
        "february" | "feb" => 2,
        "march" | "mar" => 3,
        "april" | "apr" => 4,
        "may" => 5,
        "june" | "jun" => 6,
        "july" | "jul" => 7,
        "august" | "aug" => 8,
        "september" | "sept" | "sep" => 9,
        "october" | "oct" => 10,
        "november" | "nov" => 11,
        "december" | "dec" => 12,
        _ => return None,
    };
    Some(month)
}
