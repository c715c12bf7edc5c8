use crate::domain::{Contact, LoggedSend};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactDetailDto {
    #[serde(flatten)]
    pub contact: Contact,
    pub company_scope: Option<String>,
    pub created_at: i64,
    pub sends: Vec<LoggedSend>,
}
