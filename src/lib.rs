//! Spatial chunk streaming
//!
//! Loads fixed-size chunks around one or more observers and evicts chunks
//! nobody has asked for recently.

// Core module with fundamental types
pub mod core;

// Observer module with the agents that drive loading
pub mod player;

// World module with the grid, cache, and backends
pub mod world;

// Settings file support
pub mod utils;

pub mod constants;

// Re-exports
pub use constants::*;
pub use crate::core::{ChunkCoord, ChunkRecord, ConfigError, LoadError, Region, RegionError, SettingsError, UnloadError};
pub use player::{BoundsSource, Observer, StaticBounds};
pub use utils::{CacheSettings, ObserverSettings, StreamerSettings, cadence_warnings};
pub use world::{
    Backend, BackendKind, CacheConfig, CacheStats, CellSpan, ChunkCache, ChunkGrid, ChunkLoaderPort, Clock,
    Cube, CubeBackend, EvictionQueue, IntervalTimer, LogBackend, ManualClock, RequestReport, SharedChunkCache,
    SweepOutcome, SweepWorker, SystemClock,
};
