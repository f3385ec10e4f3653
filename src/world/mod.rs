//! Chunk streaming modules
//! Contains grid quantization, the chunk cache, eviction, backends, and timing.

pub mod cache;
pub mod clock;
pub mod grid;
pub mod loader;
pub mod queue;
pub mod sweeper;
pub mod timer;

// Re-export commonly used types
pub use cache::{CacheConfig, CacheStats, ChunkCache, RequestReport, SharedChunkCache, SweepOutcome};
pub use clock::{Clock, ManualClock, SystemClock};
pub use grid::{CellSpan, ChunkGrid};
pub use loader::{Backend, BackendKind, ChunkLoaderPort, Cube, CubeBackend, LogBackend};
pub use queue::EvictionQueue;
pub use sweeper::SweepWorker;
pub use timer::IntervalTimer;
