//! Resource domain data types (GraphQL types)

pub mod resource_types;

pub use resource_types::{
    EditResourceInput, ResourceConnection, ResourceData, ResourceStatusData, ResourceVersionData,
};
