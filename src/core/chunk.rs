use std::time::Duration;

use super::coord::ChunkCoord;

/// Bookkeeping for one loaded chunk. Exists only while the backend holds
/// the chunk's resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkRecord {
    pub coord: ChunkCoord,
    pub last_access: Duration,
}

impl ChunkRecord {
    pub fn new(coord: ChunkCoord, now: Duration) -> Self {
        Self {
            coord,
            last_access: now,
        }
    }

    pub fn touch(&mut self, now: Duration) {
        // Concurrent observers may report slightly out of order; never move backwards.
        self.last_access = self.last_access.max(now);
    }

    /// Time since the last request, zero if `now` predates it.
    pub fn age(&self, now: Duration) -> Duration {
        now.saturating_sub(self.last_access)
    }

    pub fn is_stale(&self, now: Duration, threshold: Duration) -> bool {
        self.age(now) >= threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touch_moves_forward_only() {
        let mut record = ChunkRecord::new(ChunkCoord::ZERO, Duration::from_secs(5));
        record.touch(Duration::from_secs(3));
        assert_eq!(record.last_access, Duration::from_secs(5));
        record.touch(Duration::from_secs(8));
        assert_eq!(record.last_access, Duration::from_secs(8));
    }

    #[test]
    fn staleness_is_inclusive() {
        let record = ChunkRecord::new(ChunkCoord::ZERO, Duration::from_secs(1));
        let threshold = Duration::from_secs(2);
        assert!(!record.is_stale(Duration::from_millis(2999), threshold));
        assert!(record.is_stale(Duration::from_secs(3), threshold));
    }

    #[test]
    fn age_saturates_for_earlier_time() {
        let record = ChunkRecord::new(ChunkCoord::ZERO, Duration::from_secs(10));
        assert_eq!(record.age(Duration::from_secs(4)), Duration::ZERO);
    }
}
