use std::time::Duration;

use glam::Vec3;

use crate::core::{Region, RegionError};
use crate::world::cache::{ChunkCache, RequestReport};
use crate::world::clock::Clock;
use crate::world::loader::ChunkLoaderPort;
use crate::world::timer::IntervalTimer;

/// Where an observer's region of interest comes from (a fixed point, a
/// moving entity, a camera). Computing the region is up to the implementor.
pub trait BoundsSource {
    fn region(&self) -> Region;
}

/// Fixed position with a fixed reach.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticBounds {
    pub position: Vec3,
    pub half_extents: Vec3,
}

impl StaticBounds {
    pub fn new(position: Vec3, half_extents: Vec3) -> Self {
        Self {
            position,
            half_extents,
        }
    }
}

impl BoundsSource for StaticBounds {
    fn region(&self) -> Region {
        Region::new(self.position, self.half_extents)
    }
}

/// Periodically reports a region of interest to a chunk cache.
pub struct Observer<S = StaticBounds> {
    name: String,
    source: S,
    timer: IntervalTimer,
}

impl<S: BoundsSource> Observer<S> {
    /// The first update always reports, later ones once per `poll_interval`.
    pub fn new(name: impl Into<String>, source: S, poll_interval: Duration) -> Self {
        Self {
            name: name.into(),
            source,
            timer: IntervalTimer::ready(poll_interval),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn poll_interval(&self) -> Duration {
        self.timer.interval()
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Advance the poll timer. Returns the region to request when it fires.
    pub fn update(&mut self, dt: Duration) -> Option<Region> {
        if self.timer.tick(dt) {
            Some(self.source.region())
        } else {
            None
        }
    }

    /// Advance the poll timer and, when it fires, request the region from
    /// `cache` directly.
    pub fn drive<L, C>(
        &mut self,
        dt: Duration,
        cache: &mut ChunkCache<L, C>,
    ) -> Option<Result<RequestReport, RegionError>>
    where
        L: ChunkLoaderPort,
        C: Clock,
    {
        let region = self.update(dt)?;
        let result = cache.request_region(&region);
        match &result {
            Ok(report) if !report.loaded.is_empty() => {
                tracing::debug!("Observer {} loaded {} chunks", self.name, report.loaded.len())
            }
            Err(e) => tracing::warn!("Observer {} sent an invalid region: {}", self.name, e),
            _ => {}
        }
        Some(result)
    }
}
