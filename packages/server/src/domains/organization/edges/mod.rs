// GraphQL resolvers for organization domain
pub mod mutation;
pub mod post_edges;
pub mod post_types;
pub mod query;
pub mod types;

pub use mutation::*;
pub use post_edges::*;
pub use post_types::*;
pub use query::*;
pub use types::*;
