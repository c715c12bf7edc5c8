use crate::domain::ids::{ContactId, SendId};
use crate::domain::platform::Platform;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Activity payload attached to a contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OffPlatformSend {
    pub sent_date: NaiveDate,
    pub subject: Option<String>,
    pub body: Option<String>,
    pub platform: Platform,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggedSend {
    pub id: SendId,
    pub contact_id: ContactId,
    pub created_at: i64,
    #[serde(flatten)]
    pub send: OffPlatformSend,
}
