use once_cell::sync::Lazy;
use regex::Regex;

static FROM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)^[ \t]*from:[ \t]*(.*)$").expect("from header regex"));
static TO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)^[ \t]*to:[ \t]*(.*)$").expect("to header regex"));
static SENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)^[ \t]*sent:[ \t]*(.*)$").expect("sent header regex"));
static DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)^[ \t]*date:[ \t]*(.*)$").expect("date header regex"));
static SUBJECT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)^[ \t]*subject:[ \t]*(.*)$").expect("subject header regex")
});
static ANGLE_ADDRESS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.*?)<([^<>]*)>").expect("angle address regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Header {
    From,
    To,
    Sent,
    Date,
    Subject,
}

impl Header {
    fn pattern(self) -> &'static Regex {
        match self {
            Header::From => &FROM,
            Header::To => &TO,
            Header::Sent => &SENT,
            Header::Date => &DATE,
            Header::Subject => &SUBJECT,
        }
    }
}

/// Value of the first line starting with the header keyword. Blank values
/// count as absent.
pub fn header_value(text: &str, header: Header) -> Option<String> {
    let captures = header.pattern().captures(text)?;
    let value = captures.get(1)?.as_str().trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Display name and address of a `From:`/`To:` value.
///
/// `Jane Smith <jane@x.com>` splits on the brackets; a bare value holding an
/// `@` is all address (the first such token when several are listed);
/// anything else is a name with no usable address.
pub fn split_address(value: &str) -> (Option<String>, Option<String>) {
    let value = value.trim();
    if let Some(captures) = ANGLE_ADDRESS.captures(value) {
        let name = captures
            .get(1)
            .map(|m| clean_display_name(m.as_str()))
            .filter(|name| !name.is_empty());
        let email = captures
            .get(2)
            .map(|m| strip_mailto(m.as_str().trim()).to_string())
            .filter(|email| email.contains('@'));
        return (name, email);
    }

    if value.contains('@') {
        let email = value
            .split(|c: char| c.is_whitespace() || c == ',' || c == ';')
            .map(strip_mailto)
            .find(|token| token.contains('@'))
            .map(str::to_string);
        return (None, email);
    }

    let name = clean_display_name(value);
    if name.is_empty() {
        (None, None)
    } else {
        (Some(name), None)
    }
}

fn clean_display_name(value: &str) -> String {
    value
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .trim()
        .to_string()
}

fn strip_mailto(value: &str) -> &str {
    value.strip_prefix("mailto:").unwrap_or(value)
}
