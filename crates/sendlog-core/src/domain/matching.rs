use crate::domain::contact::Contact;
use crate::domain::ids::ContactId;
use serde::Serialize;

/// Outcome of resolving one address against the contact store. Never
/// persisted; fuzzy outcomes only exist to drive a confirmation step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchResult {
    ExactMatch { contact: Contact },
    FuzzyMatch { contact: Contact },
    MultipleFuzzyMatches { candidates: Vec<Contact> },
    NoMatch,
}

impl MatchResult {
    pub fn from_domain_candidates(mut candidates: Vec<Contact>) -> Self {
        match candidates.len() {
            0 => MatchResult::NoMatch,
            1 => MatchResult::FuzzyMatch {
                contact: candidates.remove(0),
            },
            _ => MatchResult::MultipleFuzzyMatches { candidates },
        }
    }

    pub fn needs_confirmation(&self) -> bool {
        matches!(
            self,
            MatchResult::FuzzyMatch { .. } | MatchResult::MultipleFuzzyMatches { .. }
        )
    }

    pub fn candidates(&self) -> Vec<&Contact> {
        match self {
            MatchResult::ExactMatch { contact } | MatchResult::FuzzyMatch { contact } => {
                vec![contact]
            }
            MatchResult::MultipleFuzzyMatches { candidates } => candidates.iter().collect(),
            MatchResult::NoMatch => Vec::new(),
        }
    }

    pub fn offers(&self, id: &ContactId) -> bool {
        self.candidates().iter().any(|contact| &contact.id == id)
    }

    pub const fn label(&self) -> &'static str {
        match self {
            MatchResult::ExactMatch { .. } => "exact",
            MatchResult::FuzzyMatch { .. } => "fuzzy",
            MatchResult::MultipleFuzzyMatches { .. } => "multiple-fuzzy",
            MatchResult::NoMatch => "none",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::MatchResult;
    use crate::domain::contact::Contact;
    use crate::domain::ids::ContactId;

    fn contact(email: &str) -> Contact {
        Contact {
            id: ContactId::new(),
            first_name: None,
            last_name: None,
            email: email.to_string(),
            title: None,
            company_name: None,
        }
    }

    #[test]
    fn domain_candidates_classify_by_count() {
        assert_eq!(MatchResult::from_domain_candidates(Vec::new()), MatchResult::NoMatch);

        let single = MatchResult::from_domain_candidates(vec![contact("a@acme.com")]);
        assert!(matches!(single, MatchResult::FuzzyMatch { .. }));
        assert!(single.needs_confirmation());

        let multiple =
            MatchResult::from_domain_candidates(vec![contact("a@acme.com"), contact("b@acme.com")]);
        assert_eq!(multiple.candidates().len(), 2);
        assert_eq!(multiple.label(), "multiple-fuzzy");
    }

    #[test]
    fn exact_match_does_not_need_confirmation() {
        let exact = MatchResult::ExactMatch {
            contact: contact("a@acme.com"),
        };
        assert!(!exact.needs_confirmation());
        assert!(!MatchResult::NoMatch.needs_confirmation());
    }

    #[test]
    fn offers_checks_candidate_ids() {
        let a = contact("a@acme.com");
        let id = a.id.clone();
        let result = MatchResult::from_domain_candidates(vec![a, contact("b@acme.com")]);
        assert!(result.offers(&id));
        assert!(!result.offers(&ContactId::new()));
    }
}
