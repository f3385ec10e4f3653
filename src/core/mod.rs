//! Core data structures for the chunk streamer
//! Contains chunk coordinates, per-chunk records, and the error taxonomy.

pub mod chunk;
pub mod coord;
pub mod error;

// Re-export commonly used types
pub use chunk::ChunkRecord;
pub use coord::{ChunkCoord, Region};
pub use error::{ConfigError, LoadError, RegionError, SettingsError, UnloadError};
