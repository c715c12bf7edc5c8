use crate::error::{IngestError, ParseError};
use ::csv::{QuoteStyle, Terminator, WriterBuilder};
use chrono::NaiveDate;
use sendlog_core::domain::{is_plausible_email, Contact, LoggedSend, NormalizedEmailRecord, Platform};
use sendlog_core::time::{format_date, parse_date_shapes};
use serde::Serialize;
use std::io;

pub const TEMPLATE_HEADER: [&str; 6] = [
    "first name",
    "last name",
    "email",
    "date of email",
    "subject",
    "body",
];

const EXPORT_EXTRA_HEADER: [&str; 2] = ["platform", "notes"];

#[derive(Debug, Clone)]
pub struct CsvOptions {
    pub default_platform: Platform,
    /// Substituted for missing or unreadable dates.
    pub today: NaiveDate,
}

/// A record together with its 1-based data row number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CsvEntry {
    pub row: usize,
    pub record: NormalizedEmailRecord,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    pub row: usize,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedCsv {
    pub entries: Vec<CsvEntry>,
    pub skipped: Vec<SkippedRow>,
    pub warnings: Vec<String>,
}

impl ParsedCsv {
    pub fn records(&self) -> impl Iterator<Item = &NormalizedEmailRecord> {
        self.entries.iter().map(|entry| &entry.record)
    }
}

pub fn parse_csv(data: &str, options: &CsvOptions) -> Result<ParsedCsv, ParseError> {
    let mut rows = scan_rows(data);
    rows.retain(|row| !is_blank_row(row));
    if rows.len() < 2 {
        return Err(ParseError::TooFewRows);
    }

    let header: Vec<String> = rows[0]
        .iter()
        .map(|field| field.cleaned().to_ascii_lowercase())
        .collect();
    let columns = ColumnMap::resolve(&header)?;

    let mut parsed = ParsedCsv {
        entries: Vec::new(),
        skipped: Vec::new(),
        warnings: Vec::new(),
    };

    for (index, mut raw) in rows.into_iter().skip(1).enumerate() {
        let row = index + 1;
        if raw.len() < header.len() {
            raw.resize_with(header.len(), Field::default);
        }
        let cells: Vec<String> = raw.iter().map(Field::cleaned).collect();
        let cell = |column: Option<usize>| -> &str {
            column
                .and_then(|index| cells.get(index))
                .map(String::as_str)
                .unwrap_or("")
        };

        let email = cell(Some(columns.email)).trim();
        if !is_plausible_email(email) {
            parsed.skipped.push(SkippedRow {
                row,
                email: email.to_string(),
            });
            continue;
        }

        let raw_date = cell(columns.sent_date).trim();
        let sent_date = match parse_date_shapes(raw_date) {
            Some(date) => date,
            None => {
                if !raw_date.is_empty() {
                    parsed.warnings.push(format!(
                        "row {row}: unreadable date {raw_date:?}, using {}",
                        format_date(options.today)
                    ));
                }
                options.today
            }
        };

        let platform = match cell(columns.platform).trim() {
            "" => options.default_platform.clone(),
            label => label
                .parse()
                .unwrap_or_else(|_| options.default_platform.clone()),
        };

        parsed.entries.push(CsvEntry {
            row,
            record: NormalizedEmailRecord {
                first_name: non_blank(cell(columns.first_name).trim()),
                last_name: non_blank(cell(columns.last_name).trim()),
                email: email.to_string(),
                subject: non_blank(cell(columns.subject).trim()),
                body: non_blank_untrimmed(cell(columns.body)),
                sent_date,
                platform,
                notes: non_blank_untrimmed(cell(columns.notes)),
            },
        });
    }

    Ok(parsed)
}

/// Column roles resolved by substring match on the lowercased header.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ColumnMap {
    email: usize,
    first_name: Option<usize>,
    last_name: Option<usize>,
    subject: Option<usize>,
    sent_date: Option<usize>,
    body: Option<usize>,
    platform: Option<usize>,
    notes: Option<usize>,
}

impl ColumnMap {
    fn resolve(header: &[String]) -> Result<Self, ParseError> {
        let find = |pred: &dyn Fn(&str) -> bool| header.iter().position(|name| pred(name));
        let is_date = |name: &str| name.contains("date") || name.contains("sent");

        // `date of email` must not take the email role.
        let email = find(&|name| name.contains("email") && !is_date(name))
            .or_else(|| find(&|name| name.contains("email")))
            .ok_or(ParseError::MissingEmailColumn)?;

        Ok(Self {
            email,
            first_name: find(&|name| name.contains("first") && name.contains("name")),
            last_name: find(&|name| name.contains("last") && name.contains("name")),
            subject: find(&|name| name.contains("subject")),
            sent_date: find(&is_date),
            body: find(&|name| name.contains("body")),
            platform: find(&|name| name.contains("platform")),
            notes: find(&|name| name.contains("note")),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Field {
    text: String,
    quoted: bool,
}

impl Field {
    /// Quoted fields are kept exactly; bare fields are trimmed and lose a
    /// leftover surrounding quote pair.
    fn cleaned(&self) -> String {
        if self.quoted {
            return self.text.clone();
        }
        let trimmed = self.text.trim();
        trimmed
            .strip_prefix('"')
            .and_then(|inner| inner.strip_suffix('"'))
            .unwrap_or(trimmed)
            .to_string()
    }
}

/// Single pass over the input. A quote opens a quoted field only at the
/// start of a field, after optional blanks; inside one, `""` is a literal
/// quote and separators and line breaks are data. Blanks after the closing
/// quote are dropped. Unterminated quotes run to end of input.
fn scan_rows(data: &str) -> Vec<Vec<Field>> {
    let data = data.strip_prefix('\u{feff}').unwrap_or(data);
    let mut rows = Vec::new();
    let mut row: Vec<Field> = Vec::new();
    let mut field = Field::default();
    let mut in_quotes = false;
    let mut chars = data.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            if ch == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.text.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                field.text.push(ch);
            }
            continue;
        }

        match ch {
            '"' if !field.quoted && field.text.trim().is_empty() => {
                field.text.clear();
                in_quotes = true;
                field.quoted = true;
            }
            ' ' | '\t' if field.quoted => {}
            ',' => row.push(std::mem::take(&mut field)),
            '\r' | '\n' => {
                if ch == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                row.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut row));
            }
            _ => field.text.push(ch),
        }
    }

    if !field.text.is_empty() || field.quoted || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }
    rows
}

fn is_blank_row(row: &[Field]) -> bool {
    row.iter().all(|field| field.text.trim().is_empty())
}

fn non_blank(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn non_blank_untrimmed(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn write_rows<I, R>(style: QuoteStyle, rows: I) -> Result<String, IngestError>
where
    I: IntoIterator<Item = R>,
    R: IntoIterator,
    R::Item: AsRef<[u8]>,
{
    let mut writer = WriterBuilder::new()
        .quote_style(style)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    for row in rows {
        writer.write_record(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| ::csv::Error::from(err.into_error()))?;
    String::from_utf8(bytes).map_err(|err| {
        ::csv::Error::from(io::Error::new(io::ErrorKind::InvalidData, err)).into()
    })
}

/// Header names stay bare; every data field is quoted so edge whitespace
/// survives the trimming reader.
fn write_table<R>(
    header: &[&str],
    rows: impl IntoIterator<Item = R>,
) -> Result<String, IngestError>
where
    R: IntoIterator,
    R::Item: AsRef<[u8]>,
{
    let mut out = write_rows(QuoteStyle::Necessary, [header])?;
    out.push_str(&write_rows(QuoteStyle::Always, rows)?);
    Ok(out)
}

/// Downloadable import template: the header plus one example row whose body
/// spans several lines.
pub fn csv_template() -> Result<String, IngestError> {
    write_table(
        &TEMPLATE_HEADER,
        [[
            "John",
            "Doe",
            "john.doe@example.com",
            "2024-01-15",
            "Following up on our conversation",
            "Hi John,\n\nIt was great meeting you at the conference last week. I wanted to follow up on our conversation about partnership opportunities.\n\nBest regards,\nJane",
        ]],
    )
}

pub struct ExportRow<'a> {
    pub contact: &'a Contact,
    pub send: &'a LoggedSend,
}

/// Logged sends in the template layout plus platform and notes, so the
/// output re-imports cleanly.
pub fn export_sends(rows: &[ExportRow<'_>]) -> Result<String, IngestError> {
    let header: Vec<&str> = TEMPLATE_HEADER
        .iter()
        .chain(EXPORT_EXTRA_HEADER.iter())
        .copied()
        .collect();
    write_table(
        &header,
        rows.iter().map(|row| {
            let send = &row.send.send;
            [
                row.contact.first_name.clone().unwrap_or_default(),
                row.contact.last_name.clone().unwrap_or_default(),
                row.contact.email.clone(),
                format_date(send.sent_date),
                send.subject.clone().unwrap_or_default(),
                send.body.clone().unwrap_or_default(),
                send.platform.to_string(),
                send.notes.clone().unwrap_or_default(),
            ]
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> CsvOptions {
        CsvOptions {
            default_platform: Platform::Manual,
            today: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        }
    }

    #[test]
    fn quoted_field_keeps_commas_newlines_and_escaped_quotes() {
        let original = "He said \"hi\",\nline2";
        let data = "email,body\njane@x.com,\"He said \"\"hi\"\",\nline2\"\n";

        let parsed = parse_csv(data, &options()).expect("parse");
        assert_eq!(parsed.entries.len(), 1);
        let body = parsed.entries[0].record.body.as_deref().expect("body");
        assert_eq!(body, original);

        let rebuilt = write_table(&["email", "body"], [["jane@x.com", body]]).expect("write");
        assert_eq!(
            rebuilt,
            "email,body\n\"jane@x.com\",\"He said \"\"hi\"\",\nline2\"\n"
        );
        let reparsed = parse_csv(&rebuilt, &options()).expect("reparse");
        assert_eq!(reparsed.entries[0].record.body.as_deref(), Some(original));
    }

    #[test]
    fn quote_after_blanks_still_opens_a_quoted_field() {
        let data = "email, subject, body\njane@x.com, \"Hello, world\", \"line1\nline2\"\nbob@y.com, Hi, ok\n";
        let parsed = parse_csv(data, &options()).expect("parse");
        assert!(parsed.skipped.is_empty());
        assert_eq!(parsed.entries.len(), 2);

        let jane = &parsed.entries[0];
        assert_eq!(jane.row, 1);
        assert_eq!(jane.record.subject.as_deref(), Some("Hello, world"));
        assert_eq!(jane.record.body.as_deref(), Some("line1\nline2"));

        let bob = &parsed.entries[1];
        assert_eq!(bob.row, 2);
        assert_eq!(bob.record.email, "bob@y.com");
        assert_eq!(bob.record.body.as_deref(), Some("ok"));
    }

    #[test]
    fn blanks_after_closing_quote_are_dropped() {
        let data = "email,subject,notes\na@x.com,\"Hi, there\"  ,\t\"x\"\n";
        let parsed = parse_csv(data, &options()).expect("parse");
        let record = &parsed.entries[0].record;
        assert_eq!(record.subject.as_deref(), Some("Hi, there"));
        assert_eq!(record.notes.as_deref(), Some("x"));
    }

    #[test]
    fn export_quotes_edge_whitespace_so_it_survives_reimport() {
        let exported =
            write_table(&["email", "body"], [["a@x.com", "  indented\n"]]).expect("write");
        let parsed = parse_csv(&exported, &options()).expect("parse");
        assert_eq!(parsed.entries[0].record.body.as_deref(), Some("  indented\n"));
    }

    #[test]
    fn crlf_and_cr_line_breaks_split_rows() {
        let data = "email,subject\r\na@x.com,One\rb@y.com,Two\r\n";
        let parsed = parse_csv(data, &options()).expect("parse");
        let emails: Vec<_> = parsed.records().map(|r| r.email.as_str()).collect();
        assert_eq!(emails, vec!["a@x.com", "b@y.com"]);
        assert_eq!(parsed.entries[1].record.subject.as_deref(), Some("Two"));
    }

    #[test]
    fn quoted_crlf_inside_body_is_data() {
        let data = "email,body\na@x.com,\"one\r\ntwo\"\n";
        let parsed = parse_csv(data, &options()).expect("parse");
        assert_eq!(parsed.entries[0].record.body.as_deref(), Some("one\r\ntwo"));
    }

    #[test]
    fn ragged_row_is_padded() {
        let data = "first name,email,subject,body\nJane,jane@x.com\n";
        let parsed = parse_csv(data, &options()).expect("parse");
        let record = &parsed.entries[0].record;
        assert_eq!(record.first_name.as_deref(), Some("Jane"));
        assert!(record.subject.is_none());
        assert!(record.body.is_none());
    }

    #[test]
    fn rows_without_usable_email_are_skipped() {
        let data = "email,subject\na@x.com,One\nnot-an-email,Two\n,Three\nc@z.com,Four\n";
        let parsed = parse_csv(data, &options()).expect("parse");
        assert_eq!(parsed.entries.len(), 2);
        assert_eq!(
            parsed.skipped,
            vec![
                SkippedRow {
                    row: 2,
                    email: "not-an-email".to_string()
                },
                SkippedRow {
                    row: 3,
                    email: String::new()
                },
            ]
        );
        assert_eq!(parsed.entries[1].row, 4);
    }

    #[test]
    fn too_few_rows_fails() {
        assert_eq!(
            parse_csv("email,subject\n", &options()).unwrap_err(),
            ParseError::TooFewRows
        );
        assert_eq!(
            parse_csv("email\n\n   \n", &options()).unwrap_err(),
            ParseError::TooFewRows
        );
        assert_eq!(parse_csv("", &options()).unwrap_err(), ParseError::TooFewRows);
    }

    #[test]
    fn missing_email_column_fails() {
        let err = parse_csv("name,subject\nJane,Hi\n", &options()).unwrap_err();
        assert_eq!(err, ParseError::MissingEmailColumn);
    }

    #[test]
    fn headers_resolve_by_substring() {
        let data = "Sent On,Contact E-mail,Email Address,First Name,LAST NAME,Subject Line,Message Body,Platform,Notes\n\
                    3/5/2024,ignored,Jane@X.com,Jane,Smith,Hello,Body text,LinkedIn,met at expo\n";
        let parsed = parse_csv(data, &options()).expect("parse");
        let record = &parsed.entries[0].record;
        assert_eq!(record.email, "Jane@X.com");
        assert_eq!(record.first_name.as_deref(), Some("Jane"));
        assert_eq!(record.last_name.as_deref(), Some("Smith"));
        assert_eq!(record.subject.as_deref(), Some("Hello"));
        assert_eq!(record.body.as_deref(), Some("Body text"));
        assert_eq!(record.platform, Platform::Linkedin);
        assert_eq!(record.notes.as_deref(), Some("met at expo"));
        assert_eq!(record.sent_date, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
    }

    #[test]
    fn unreadable_date_defaults_to_today_with_warning() {
        let data = "email,date\na@x.com,last week\nb@x.com,\n";
        let parsed = parse_csv(data, &options()).expect("parse");
        assert_eq!(parsed.entries[0].record.sent_date, options().today);
        assert_eq!(parsed.entries[1].record.sent_date, options().today);
        assert_eq!(parsed.warnings.len(), 1);
        assert!(parsed.warnings[0].contains("last week"));
    }

    #[test]
    fn stray_quotes_on_bare_fields_are_stripped() {
        let data = "email,subject,notes\na@x.com,  \"Hello\" ,5\" tall\n";
        let parsed = parse_csv(data, &options()).expect("parse");
        let record = &parsed.entries[0].record;
        assert_eq!(record.subject.as_deref(), Some("Hello"));
        assert_eq!(record.notes.as_deref(), Some("5\" tall"));
    }

    #[test]
    fn unterminated_quote_runs_to_end_of_input() {
        let data = "email,body\na@x.com,\"never closed\nstill body";
        let parsed = parse_csv(data, &options()).expect("parse");
        assert_eq!(
            parsed.entries[0].record.body.as_deref(),
            Some("never closed\nstill body")
        );
    }

    #[test]
    fn parsing_twice_yields_identical_output() {
        let data = csv_template().expect("template");
        let first = parse_csv(&data, &options()).expect("parse");
        let second = parse_csv(&data, &options()).expect("parse");
        assert_eq!(first, second);
    }

    #[test]
    fn template_round_trips_to_one_record() {
        let template = csv_template().expect("template");
        assert!(template.starts_with("first name,last name,email,date of email,subject,body\n"));

        let parsed = parse_csv(&template, &options()).expect("parse");
        assert_eq!(parsed.entries.len(), 1);
        let record = &parsed.entries[0].record;
        assert_eq!(record.email, "john.doe@example.com");
        assert_eq!(record.sent_date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        let body = record.body.as_deref().expect("body");
        assert!(body.starts_with("Hi John,\n\n"));
        assert!(body.ends_with("Best regards,\nJane"));
    }
}
