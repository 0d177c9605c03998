//! Tag module - re-exports from domains/tag for backward compatibility
//!
//! This module has been moved to domains/tag. This re-export layer
//! maintains backward compatibility with existing code.

pub use crate::domains::tag::{Tag, Taggable, TaggableType};
