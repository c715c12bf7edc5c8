pub mod contact;
pub mod email;
pub mod ids;
pub mod matching;
pub mod platform;
pub mod record;
pub mod send;

pub use contact::{CompanyScope, Contact, ContactDraft};
pub use email::{email_domain, is_plausible_email, normalize_email};
pub use ids::{ContactId, SendId};
pub use matching::MatchResult;
pub use platform::Platform;
pub use record::NormalizedEmailRecord;
pub use send::{LoggedSend, OffPlatformSend};
