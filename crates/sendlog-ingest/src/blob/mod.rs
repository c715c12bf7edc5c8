//! Pasted email parsing.
//!
//! Each detector in [`headers`] and [`body`] is a pure function over the
//! normalised text; [`parse_email_blob`] composes them.

mod body;
mod headers;

pub use body::{extract_body, strip_signature};
pub use headers::{header_value, split_address, Header};

use crate::error::{IngestError, Result};
use chrono::NaiveDate;
use sendlog_core::domain::{NormalizedEmailRecord, Platform};
use sendlog_core::time::{parse_sent_date, SentDate};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedEmail {
    pub from: Option<String>,
    pub from_email: Option<String>,
    pub to: Option<String>,
    pub to_email: Option<String>,
    pub sent: Option<SentDate>,
    pub subject: Option<String>,
    pub body: String,
}

pub fn parse_email_blob(input: &str) -> ParsedEmail {
    let text = input.replace("\r\n", "\n").replace('\r', "\n");

    let (from, from_email) = header_value(&text, Header::From)
        .map(|value| split_address(&value))
        .unwrap_or_default();
    let (to, to_email) = header_value(&text, Header::To)
        .map(|value| split_address(&value))
        .unwrap_or_default();
    let sent = header_value(&text, Header::Sent)
        .or_else(|| header_value(&text, Header::Date))
        .map(|value| parse_sent_date(&value));
    let subject = header_value(&text, Header::Subject);
    let body = extract_body(&text).unwrap_or_else(|| input.to_string());

    ParsedEmail {
        from,
        from_email,
        to,
        to_email,
        sent,
        subject,
        body,
    }
}

#[derive(Debug, Clone)]
pub struct BlobRecordOptions {
    pub platform: Platform,
    pub notes: Option<String>,
    /// Used when `Sent:` is missing or unreadable.
    pub today: NaiveDate,
    /// Replaces the `To:` address, for blobs pasted without headers.
    pub recipient_override: Option<String>,
}

impl ParsedEmail {
    /// The recipient is the contact the send is logged against.
    pub fn to_record(&self, options: &BlobRecordOptions) -> Result<NormalizedEmailRecord> {
        let email = options
            .recipient_override
            .as_deref()
            .or(self.to_email.as_deref())
            .map(str::trim)
            .unwrap_or("");
        if !email.contains('@') {
            return Err(IngestError::InvalidEmail(
                self.to.clone().unwrap_or_else(|| email.to_string()),
            ));
        }

        let (first_name, last_name) = self
            .to
            .as_deref()
            .map(split_person_name)
            .unwrap_or_default();
        let body = if self.body.trim().is_empty() {
            None
        } else {
            Some(self.body.clone())
        };

        Ok(NormalizedEmailRecord {
            first_name,
            last_name,
            email: email.to_string(),
            subject: self.subject.clone(),
            body,
            sent_date: self
                .sent
                .as_ref()
                .and_then(SentDate::date)
                .unwrap_or(options.today),
            platform: options.platform.clone(),
            notes: options.notes.clone(),
        })
    }

    /// The `Sent:` text when it could not be read as a date.
    pub fn unparsed_sent(&self) -> Option<&str> {
        match &self.sent {
            Some(SentDate::Raw(raw)) => Some(raw),
            _ => None,
        }
    }
}

/// `Jane Smith`, `Smith, Jane` and single names.
fn split_person_name(name: &str) -> (Option<String>, Option<String>) {
    let name = name.trim();
    if let Some((last, first)) = name.split_once(',') {
        return (non_empty(first), non_empty(last));
    }
    match name.split_once(char::is_whitespace) {
        Some((first, last)) => (non_empty(first), non_empty(last)),
        None => (non_empty(name), None),
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> BlobRecordOptions {
        BlobRecordOptions {
            platform: Platform::Outlook,
            notes: None,
            today: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            recipient_override: None,
        }
    }

    const OUTLOOK: &str = "From: Jane Smith <jane@x.com>\r\n\
Sent: Tuesday, March 5, 2024 10:14 AM\r\n\
To: John Doe <John.Doe@Acme.com>\r\n\
Subject: Quick follow-up\r\n\
\r\n\
Hi John,\r\n\
\r\n\
Let's meet.\r\n\
\r\n\
Best,\r\n\
Jane Smith\r\n\
jane@x.com\r\n\
(555) 123-4567\r\n";

    #[test]
    fn outlook_forward_parses_every_field() {
        let parsed = parse_email_blob(OUTLOOK);
        assert_eq!(parsed.from.as_deref(), Some("Jane Smith"));
        assert_eq!(parsed.from_email.as_deref(), Some("jane@x.com"));
        assert_eq!(parsed.to.as_deref(), Some("John Doe"));
        assert_eq!(parsed.to_email.as_deref(), Some("John.Doe@Acme.com"));
        assert_eq!(
            parsed.sent,
            Some(SentDate::Parsed(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()))
        );
        assert_eq!(parsed.subject.as_deref(), Some("Quick follow-up"));
        assert_eq!(parsed.body, "Hi John,\n\nLet's meet.");
    }

    #[test]
    fn signature_with_contact_details_is_stripped() {
        let blob = "Subject: Meet\n\nHi John,\n\nLet's meet.\n\nBest,\nJane Smith\njane@x.com\n(555) 123-4567";
        assert_eq!(parse_email_blob(blob).body, "Hi John,\n\nLet's meet.");
    }

    #[test]
    fn lone_name_body_is_preserved() {
        let blob = "To: john@acme.com\n\nJane Smith";
        assert_eq!(parse_email_blob(blob).body, "Jane Smith");
    }

    #[test]
    fn unreadable_sent_header_is_kept_raw() {
        let parsed = parse_email_blob("Sent: sometime last Tuesday\nTo: a@x.com\n\nHello");
        assert_eq!(
            parsed.sent,
            Some(SentDate::Raw("sometime last Tuesday".to_string()))
        );
        assert_eq!(parsed.unparsed_sent(), Some("sometime last Tuesday"));
        let record = parsed.to_record(&options()).expect("record");
        assert_eq!(record.sent_date, options().today);
    }

    #[test]
    fn headerless_paste_is_body_verbatim() {
        let blob = "Thanks for coffee!\r\nTalk soon,\r\nJane\r\n";
        let parsed = parse_email_blob(blob);
        assert_eq!(parsed.body, blob);
        assert_eq!(parsed, ParsedEmail { body: blob.to_string(), ..ParsedEmail::default() });
    }

    #[test]
    fn recipient_without_address_leaves_to_email_empty() {
        let parsed = parse_email_blob("To: John Doe\nSubject: Hi\n\nBody");
        assert_eq!(parsed.to.as_deref(), Some("John Doe"));
        assert!(parsed.to_email.is_none());

        let err = parsed.to_record(&options()).unwrap_err();
        assert!(matches!(err, IngestError::InvalidEmail(ref value) if value == "John Doe"));
    }

    #[test]
    fn record_uses_recipient_identity() {
        let record = parse_email_blob(OUTLOOK).to_record(&options()).expect("record");
        assert_eq!(record.email, "John.Doe@Acme.com");
        assert_eq!(record.first_name.as_deref(), Some("John"));
        assert_eq!(record.last_name.as_deref(), Some("Doe"));
        assert_eq!(record.sent_date, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        assert_eq!(record.platform, Platform::Outlook);
        assert_eq!(record.body.as_deref(), Some("Hi John,\n\nLet's meet."));
    }

    #[test]
    fn recipient_override_supplies_missing_address() {
        let mut opts = options();
        opts.recipient_override = Some("jane@x.com".to_string());
        let record = parse_email_blob("just a note")
            .to_record(&opts)
            .expect("record");
        assert_eq!(record.email, "jane@x.com");
        assert_eq!(record.body.as_deref(), Some("just a note"));
    }

    #[test]
    fn comma_names_are_last_first() {
        assert_eq!(
            split_person_name("Smith, Jane"),
            (Some("Jane".to_string()), Some("Smith".to_string()))
        );
        assert_eq!(split_person_name("Jane"), (Some("Jane".to_string()), None));
    }
}
