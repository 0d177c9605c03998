pub mod data;
pub mod models;

// Re-export commonly used types
pub use data::ContactData;
pub use models::{Contact, ContactType, ContactableType, CreateContact};
