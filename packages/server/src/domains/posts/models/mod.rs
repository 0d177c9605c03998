pub mod business_post;
pub mod post;
pub mod post_contact;
pub mod post_report;

pub use business_post::*;
pub use post::*;
pub use post_contact::*;
