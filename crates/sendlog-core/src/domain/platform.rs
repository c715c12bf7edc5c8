use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Channel an off-platform email went out through. Free-form labels are
/// kept as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Platform {
    Gmail,
    Outlook,
    Linkedin,
    Apollo,
    InPerson,
    Csv,
    #[default]
    Manual,
    Other(String),
}

impl Platform {
    pub fn as_str(&self) -> &str {
        match self {
            Platform::Gmail => "gmail",
            Platform::Outlook => "outlook",
            Platform::Linkedin => "linkedin",
            Platform::Apollo => "apollo",
            Platform::InPerson => "in-person",
            Platform::Csv => "csv",
            Platform::Manual => "manual",
            Platform::Other(label) => label,
        }
    }

    pub const fn suggestions() -> &'static [&'static str] {
        &[
            "gmail",
            "outlook",
            "linkedin",
            "apollo",
            "in-person",
            "csv",
            "manual",
            "other",
        ]
    }
}

impl FromStr for Platform {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(CoreError::InvalidPlatformLabel);
        }
        let lower = trimmed.to_ascii_lowercase();
        Ok(match lower.as_str() {
            "gmail" => Platform::Gmail,
            "outlook" => Platform::Outlook,
            "linkedin" => Platform::Linkedin,
            "apollo" => Platform::Apollo,
            "in-person" | "in person" | "in_person" => Platform::InPerson,
            "csv" => Platform::Csv,
            "manual" => Platform::Manual,
            _ => Platform::Other(lower),
        })
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Platform> for String {
    fn from(value: Platform) -> Self {
        value.as_str().to_string()
    }
}

impl TryFrom<String> for Platform {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
