pub mod domain;
pub mod dto;
pub mod error;
pub mod time;

pub use domain::*;
pub use dto::*;
pub use error::CoreError;
pub use time::{parse_sent_date, SentDate};
