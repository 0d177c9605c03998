pub mod business_listing;
pub mod listing;
pub mod listing_report;
pub mod listing_website_sync;

pub use business_listing::*;
pub use listing::*;
pub use listing_website_sync::*;
