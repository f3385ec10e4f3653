//! Observer modules
//! Contains the agents whose regions of interest drive chunk loading.

pub mod observer;

// Re-export commonly used types
pub use observer::{BoundsSource, Observer, StaticBounds};
