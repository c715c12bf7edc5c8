pub fn normalize_email(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_ascii_lowercase())
}

/// An address is usable downstream only if it carries an `@`.
pub fn is_plausible_email(value: &str) -> bool {
    let trimmed = value.trim();
    !trimmed.is_empty() && trimmed.contains('@')
}

/// Lowercased domain part after the last `@`, if any.
pub fn email_domain(value: &str) -> Option<String> {
    let (_, domain) = value.trim().rsplit_once('@')?;
    let domain = domain.trim();
    if domain.is_empty() {
        return None;
    }
    Some(domain.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::{email_domain, is_plausible_email, normalize_email};

    #[test]
    fn normalize_email_trims_and_lowercases() {
        let value = normalize_email("  Ada@Example.com ");
        assert_eq!(value.as_deref(), Some("ada@example.com"));
    }

    #[test]
    fn plausible_email_requires_at_sign() {
        assert!(is_plausible_email("jane@x.com"));
        assert!(!is_plausible_email("not-an-email"));
        assert!(!is_plausible_email("   "));
    }

    #[test]
    fn email_domain_uses_last_at_sign() {
        assert_eq!(email_domain("Jane@Acme.COM").as_deref(), Some("acme.com"));
        assert_eq!(email_domain("odd@name@corp.io").as_deref(), Some("corp.io"));
        assert!(email_domain("jane@").is_none());
        assert!(email_domain("jane").is_none());
    }
}
