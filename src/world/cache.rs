//! Chunk cache with lazy time-based eviction
//!
//! Observers call [`ChunkCache::request`] with the region they care about.
//! Chunks that have not been requested for `staleness_threshold` are evicted
//! in two phases:
//!
//! 1. [`ChunkCache::mark_stale`] runs every update tick and queues stale
//!    chunks. It never talks to the backend.
//! 2. [`ChunkCache::sweep_one`] runs every `sweep_interval`, pops one queued
//!    chunk and unloads it only if it is still stale. A request that lands
//!    between the two phases cancels the eviction.
//!
//! In a single-threaded host, apply all observer requests for a tick before
//! calling `mark_stale` for that tick. The sweep interval should not exceed
//! the observers' poll interval; this is not enforced here.

use std::collections::hash_map::Entry;
use std::sync::Arc;
use std::time::Duration;

use glam::Vec3;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::constants::DEFAULT_MAX_CHUNKS_PER_REQUEST;
use crate::core::{ChunkCoord, ChunkRecord, ConfigError, LoadError, Region, RegionError, UnloadError};
use crate::world::clock::{Clock, SystemClock};
use crate::world::grid::ChunkGrid;
use crate::world::loader::{Backend, ChunkLoaderPort};
use crate::world::queue::EvictionQueue;

/// Validated cache parameters. Fixed for the lifetime of a cache, since
/// changing the chunk size would misalign every loaded chunk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheConfig {
    chunk_size: f32,
    staleness_threshold: Duration,
    sweep_interval: Duration,
    max_chunks_per_request: usize,
}

impl CacheConfig {
    pub fn new(
        chunk_size: f32,
        staleness_threshold: Duration,
        sweep_interval: Duration,
    ) -> Result<Self, ConfigError> {
        if !chunk_size.is_finite() || chunk_size <= 0.0 {
            return Err(ConfigError::InvalidChunkSize(chunk_size));
        }
        Ok(Self {
            chunk_size,
            staleness_threshold,
            sweep_interval,
            max_chunks_per_request: DEFAULT_MAX_CHUNKS_PER_REQUEST,
        })
    }

    /// Cap on the chunks one request may cover. Larger regions are rejected
    /// before anything is loaded.
    pub fn with_max_chunks_per_request(mut self, limit: usize) -> Result<Self, ConfigError> {
        if limit == 0 {
            return Err(ConfigError::ZeroRequestLimit);
        }
        self.max_chunks_per_request = limit;
        Ok(self)
    }

    pub fn chunk_size(&self) -> f32 {
        self.chunk_size
    }

    pub fn staleness_threshold(&self) -> Duration {
        self.staleness_threshold
    }

    pub fn sweep_interval(&self) -> Duration {
        self.sweep_interval
    }

    pub fn max_chunks_per_request(&self) -> usize {
        self.max_chunks_per_request
    }
}

/// What a single [`ChunkCache::request`] did.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RequestReport {
    /// Chunks newly loaded by the backend
    pub loaded: Vec<ChunkCoord>,
    /// Chunks that were already loaded and got their timestamp refreshed
    pub refreshed: Vec<ChunkCoord>,
    /// Chunks the backend failed to load; they stay untracked and are
    /// retried by the next overlapping request
    pub failed: Vec<(ChunkCoord, LoadError)>,
}

impl RequestReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn covered(&self) -> usize {
        self.loaded.len() + self.refreshed.len() + self.failed.len()
    }
}

/// Result of one sweep step.
#[derive(Debug, Clone, PartialEq)]
pub enum SweepOutcome {
    /// Nothing was queued
    Idle,
    /// Queued chunk was no longer loaded
    Discarded(ChunkCoord),
    /// Queued chunk was requested again after being marked
    Cancelled(ChunkCoord),
    /// Queued chunk was still stale and the backend unloaded it
    Unloaded(ChunkCoord),
    /// The backend failed to unload; the record was dropped anyway and the
    /// backend resource may leak
    UnloadFailed(ChunkCoord, UnloadError),
}

impl SweepOutcome {
    pub fn is_idle(&self) -> bool {
        matches!(self, SweepOutcome::Idle)
    }

    /// Whether the chunk left the loaded set during this step.
    pub fn evicted(&self) -> Option<ChunkCoord> {
        match self {
            SweepOutcome::Unloaded(coord) | SweepOutcome::UnloadFailed(coord, _) => Some(*coord),
            _ => None,
        }
    }
}

/// Running counters, mostly for logging.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub loaded: usize,
    pub queued: usize,
    pub loads: u64,
    pub load_failures: u64,
    pub refreshes: u64,
    pub marked: u64,
    pub unloads: u64,
    pub unload_failures: u64,
    pub cancelled: u64,
    pub discarded: u64,
}

/// Cache shared between observer threads and a sweep worker.
pub type SharedChunkCache<L = Backend, C = SystemClock> = Arc<Mutex<ChunkCache<L, C>>>;

/// Tracks which chunks are loaded and when each was last requested.
pub struct ChunkCache<L = Backend, C = SystemClock> {
    config: CacheConfig,
    grid: ChunkGrid,
    loader: L,
    clock: C,
    loaded: FxHashMap<ChunkCoord, ChunkRecord>,
    eviction: EvictionQueue,
    stats: CacheStats,
}

impl<L: ChunkLoaderPort, C: Clock> ChunkCache<L, C> {
    pub fn new(config: CacheConfig, loader: L, clock: C) -> Result<Self, ConfigError> {
        let grid = ChunkGrid::new(config.chunk_size())?;
        Ok(Self {
            config,
            grid,
            loader,
            clock,
            loaded: FxHashMap::default(),
            eviction: EvictionQueue::new(),
            stats: CacheStats::default(),
        })
    }

    pub fn into_shared(self) -> SharedChunkCache<L, C> {
        Arc::new(Mutex::new(self))
    }

    pub fn request_region(&mut self, region: &Region) -> Result<RequestReport, RegionError> {
        self.request(region.center, region.half_extents)
    }

    /// Make sure every chunk overlapping the box is loaded and stamp it with
    /// the current time.
    ///
    /// `half_extents` is the distance from `center` to each face, not the
    /// full box size; use [`Region::from_size`] to convert. Already loaded
    /// chunks are only refreshed, never loaded twice.
    ///
    /// Regions that reach past the `i32` cell range, or cover more than
    /// `max_chunks_per_request` chunks, are rejected without touching state.
    pub fn request(&mut self, center: Vec3, half_extents: Vec3) -> Result<RequestReport, RegionError> {
        if !center.is_finite() || !half_extents.is_finite() {
            return Err(RegionError::NonFinite {
                center,
                half_extents,
            });
        }

        let span = self.grid.span(center, half_extents)?;
        let limit = self.config.max_chunks_per_request();
        if span.len().is_none_or(|cells| cells > limit) {
            return Err(RegionError::TooManyChunks { limit });
        }

        let now = self.clock.now();
        let mut report = RequestReport::default();

        for coord in span.iter() {
            match self.loaded.entry(coord) {
                Entry::Occupied(mut entry) => {
                    entry.get_mut().touch(now);
                    self.stats.refreshes += 1;
                    report.refreshed.push(coord);
                }
                Entry::Vacant(entry) => match self.loader.load_chunk(coord) {
                    Ok(()) => {
                        tracing::debug!("Loaded chunk {}", coord);
                        entry.insert(ChunkRecord::new(coord, now));
                        self.stats.loads += 1;
                        report.loaded.push(coord);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load chunk {}: {}", coord, e);
                        self.stats.load_failures += 1;
                        report.failed.push((coord, e));
                    }
                },
            }
        }

        Ok(report)
    }

    /// Mark phase. Queues every chunk idle for at least the staleness
    /// threshold, oldest first. Returns how many chunks were newly queued.
    pub fn mark_stale(&mut self, now: Duration) -> usize {
        let threshold = self.config.staleness_threshold();
        let mut stale: Vec<&ChunkRecord> = self
            .loaded
            .values()
            .filter(|record| record.is_stale(now, threshold))
            .filter(|record| !self.eviction.contains(record.coord))
            .collect();
        stale.sort_by_key(|record| (record.last_access, record.coord));

        let coords: Vec<ChunkCoord> = stale.into_iter().map(|record| record.coord).collect();
        let mut marked = 0;
        for coord in coords {
            if self.eviction.push(coord) {
                marked += 1;
            }
        }

        if marked > 0 {
            tracing::debug!("Marked {} stale chunks ({} queued)", marked, self.eviction.len());
        }
        self.stats.marked += marked as u64;
        marked
    }

    /// Sweep phase. Handles at most one queued chunk, re-checking that it is
    /// still loaded and still stale before unloading it.
    pub fn sweep_one(&mut self, now: Duration) -> SweepOutcome {
        let Some(coord) = self.eviction.pop() else {
            return SweepOutcome::Idle;
        };

        let Some(record) = self.loaded.get(&coord) else {
            self.stats.discarded += 1;
            return SweepOutcome::Discarded(coord);
        };

        if !record.is_stale(now, self.config.staleness_threshold()) {
            tracing::trace!("Eviction of chunk {} cancelled by a newer request", coord);
            self.stats.cancelled += 1;
            return SweepOutcome::Cancelled(coord);
        }

        let result = self.loader.unload_chunk(coord);
        self.loaded.remove(&coord);
        match result {
            Ok(()) => {
                tracing::debug!("Unloaded chunk {}", coord);
                self.stats.unloads += 1;
                SweepOutcome::Unloaded(coord)
            }
            Err(e) => {
                tracing::warn!("Failed to unload chunk {}, dropping it anyway: {}", coord, e);
                self.stats.unload_failures += 1;
                SweepOutcome::UnloadFailed(coord, e)
            }
        }
    }

    /// Run up to `max` sweep steps, stopping early once the queue is empty.
    pub fn sweep(&mut self, now: Duration, max: usize) -> Vec<SweepOutcome> {
        let mut outcomes = Vec::new();
        for _ in 0..max {
            let outcome = self.sweep_one(now);
            if outcome.is_idle() {
                break;
            }
            outcomes.push(outcome);
        }
        outcomes
    }

    /// Unload every tracked chunk regardless of age and clear the queue.
    /// Returns the backend failures; those records are dropped as well.
    pub fn unload_all(&mut self) -> Vec<(ChunkCoord, UnloadError)> {
        self.eviction.clear();

        let mut coords: Vec<ChunkCoord> = self.loaded.keys().copied().collect();
        coords.sort();

        let mut failures = Vec::new();
        for coord in coords {
            self.loaded.remove(&coord);
            match self.loader.unload_chunk(coord) {
                Ok(()) => self.stats.unloads += 1,
                Err(e) => {
                    tracing::warn!("Failed to unload chunk {} during shutdown: {}", coord, e);
                    self.stats.unload_failures += 1;
                    failures.push((coord, e));
                }
            }
        }

        tracing::info!("Unloaded all chunks ({} failures)", failures.len());
        failures
    }

    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    pub fn is_loaded(&self, coord: ChunkCoord) -> bool {
        self.loaded.contains_key(&coord)
    }

    pub fn record(&self, coord: ChunkCoord) -> Option<&ChunkRecord> {
        self.loaded.get(&coord)
    }

    pub fn loaded_count(&self) -> usize {
        self.loaded.len()
    }

    pub fn loaded_coords(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.loaded.keys().copied()
    }

    pub fn pending_evictions(&self) -> usize {
        self.eviction.len()
    }

    pub fn is_pending_eviction(&self, coord: ChunkCoord) -> bool {
        self.eviction.contains(coord)
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn grid(&self) -> &ChunkGrid {
        &self.grid
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            loaded: self.loaded.len(),
            queued: self.eviction.len(),
            ..self.stats
        }
    }
}
