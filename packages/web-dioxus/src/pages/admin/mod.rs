//! Admin pages

mod dashboard;
mod extraction;
mod login;
mod organizations;
mod posts;
mod resources;
mod websites;

pub use dashboard::*;
pub use extraction::*;
pub use login::*;
pub use organizations::*;
pub use posts::*;
pub use resources::*;
pub use websites::*;
