//! Chatrooms domain - containers and messages for AI chat, comments, discussions.

pub mod activities;
pub mod data;
pub mod models;

// Re-export commonly used types
pub use data::*;
pub use models::*;
