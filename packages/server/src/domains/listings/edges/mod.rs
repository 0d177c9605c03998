pub mod agent_mutation;
pub mod agent_queries;
pub mod mutation;
pub mod query;

pub use agent_mutation::*;
pub use agent_queries::*;
pub use mutation::*;
pub use query::*;
