// Grid defaults
pub const DEFAULT_CHUNK_SIZE: f32 = 1000.0;

// Eviction defaults (seconds)
pub const DEFAULT_STALENESS_SECS: f32 = 2.0;
pub const DEFAULT_SWEEP_INTERVAL_SECS: f32 = 0.1;

// Largest number of chunks a single request may cover
pub const DEFAULT_MAX_CHUNKS_PER_REQUEST: usize = 65_536;

// Observer defaults
pub const DEFAULT_POLL_INTERVAL_SECS: f32 = 0.1;
pub const DEFAULT_OBSERVER_HALF_EXTENT: f32 = 500.0;

// Demo host
pub const DEFAULT_DEMO_TICKS: u32 = 600;
pub const DEFAULT_DEMO_TICK_MS: u64 = 16;
pub const DEMO_OBSERVER_SPEED: f32 = 400.0;
