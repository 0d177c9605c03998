pub mod need;
pub mod organization;
pub mod source;

pub use need::NeedData;
pub use organization::{OrganizationData, TagData};
pub use source::SourceData;
