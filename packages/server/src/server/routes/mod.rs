// HTTP routes
pub mod graphql;
pub mod health;
pub mod stream;

pub use graphql::*;
pub use health::*;
