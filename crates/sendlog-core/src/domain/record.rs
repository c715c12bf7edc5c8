use crate::domain::email::{is_plausible_email, normalize_email};
use crate::domain::platform::Platform;
use crate::domain::send::OffPlatformSend;
use crate::error::CoreError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One off-platform email, as produced by either extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedEmailRecord {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: String,
    pub subject: Option<String>,
    pub body: Option<String>,
    pub sent_date: NaiveDate,
    pub platform: Platform,
    pub notes: Option<String>,
}

impl NormalizedEmailRecord {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.email.trim().is_empty() {
            return Err(CoreError::EmptyEmail);
        }
        if !is_plausible_email(&self.email) {
            return Err(CoreError::InvalidEmail(self.email.clone()));
        }
        Ok(())
    }

    pub fn normalized_email(&self) -> Option<String> {
        normalize_email(&self.email)
    }

    pub fn to_send(&self) -> OffPlatformSend {
        OffPlatformSend {
            sent_date: self.sent_date,
            subject: self.subject.clone(),
            body: self.body.clone(),
            platform: self.platform.clone(),
            notes: self.notes.clone(),
        }
    }
}
