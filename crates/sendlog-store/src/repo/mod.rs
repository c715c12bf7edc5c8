pub mod contacts;
pub mod sends;

pub use contacts::{ContactNew, ContactsRepo, StoredContact};
pub use sends::{SendNew, SendsRepo};
