//! FIFO eviction queue
//!
//! Insertion-ordered set of chunks marked for eviction. Each chunk can only
//! be queued once; re-marking a queued chunk is a no-op.

use std::collections::VecDeque;

use rustc_hash::FxHashSet;

use crate::core::ChunkCoord;

#[derive(Debug, Default)]
pub struct EvictionQueue {
    order: VecDeque<ChunkCoord>,
    queued: FxHashSet<ChunkCoord>,
}

impl EvictionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `coord` unless it is already queued.
    /// Returns true if the chunk was added.
    pub fn push(&mut self, coord: ChunkCoord) -> bool {
        if self.queued.insert(coord) {
            self.order.push_back(coord);
            true
        } else {
            false
        }
    }

    pub fn pop(&mut self) -> Option<ChunkCoord> {
        let coord = self.order.pop_front()?;
        self.queued.remove(&coord);
        Some(coord)
    }

    pub fn peek(&self) -> Option<ChunkCoord> {
        self.order.front().copied()
    }

    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.queued.contains(&coord)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.order.iter().copied()
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.queued.clear();
    }
}
