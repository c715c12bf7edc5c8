use once_cell::sync::Lazy;
use regex::Regex;

static HEADER_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[ \t]*(?:from|to|sent|date|subject):").expect("header line regex")
});
static CLOSING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:best|regards|sincerely|thanks|thank you|cheers),?$")
        .expect("closing regex")
});
static NAME_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][a-z]+(?: [A-Z][a-z]+)?$").expect("name line regex"));
static PHONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(\d{3}\)|\d{3}-\d{3}-\d{4}").expect("phone regex"));
static COMPANY_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:LLC|Inc|Corp|Law|PLLC)\b").expect("company suffix regex"));

/// Body after the last header line, with any trailing signature removed.
/// `None` when the text has no header lines at all.
pub fn extract_body(text: &str) -> Option<String> {
    let lines: Vec<&str> = text.split('\n').collect();
    let last_header = lines.iter().rposition(|line| HEADER_LINE.is_match(line))?;

    let rest = &lines[last_header + 1..];
    let start = rest
        .iter()
        .position(|line| !line.trim().is_empty())
        .unwrap_or(rest.len());
    let kept = strip_signature(&rest[start..]);
    Some(kept.join("\n").trim_end().to_string())
}

/// Drops the first signature-looking line and everything after it. Nothing
/// is dropped until at least one line has been kept.
pub fn strip_signature<'a>(lines: &[&'a str]) -> Vec<&'a str> {
    let mut kept = Vec::new();
    for (index, line) in lines.iter().enumerate() {
        if !kept.is_empty() && starts_signature(lines, index) {
            break;
        }
        kept.push(*line);
    }
    kept
}

fn starts_signature(lines: &[&str], index: usize) -> bool {
    let line = lines[index].trim();
    let next = |offset: usize| lines.get(index + offset).map(|line| line.trim());

    if CLOSING.is_match(line) && next(1).is_some_and(is_name_line) {
        return true;
    }
    is_name_line(line) && (1..=2).filter_map(next).any(has_contact_detail)
}

fn is_name_line(line: &str) -> bool {
    NAME_LINE.is_match(line)
}

fn has_contact_detail(line: &str) -> bool {
    line.contains('@') || PHONE.is_match(line) || COMPANY_SUFFIX.is_match(line)
}
