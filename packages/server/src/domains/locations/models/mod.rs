pub mod location;
pub mod locationable;
pub mod zip_code;

pub use location::{CreateLocation, Location};
pub use locationable::Locationable;
pub use zip_code::ZipCode;
