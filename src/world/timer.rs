use std::time::Duration;

/// Frame-driven cadence. Accumulates elapsed time and fires once the
/// interval has passed, then starts over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntervalTimer {
    interval: Duration,
    elapsed: Duration,
}

impl IntervalTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            elapsed: Duration::ZERO,
        }
    }

    /// Timer that fires on the very first tick.
    pub fn ready(interval: Duration) -> Self {
        Self {
            interval,
            elapsed: interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Advance by `dt`. Returns true when the interval elapsed; leftover
    /// time is dropped so a long frame fires only once.
    pub fn tick(&mut self, dt: Duration) -> bool {
        self.elapsed += dt;
        if self.elapsed >= self.interval {
            self.elapsed = Duration::ZERO;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_after_interval() {
        let mut timer = IntervalTimer::new(Duration::from_millis(100));
        assert!(!timer.tick(Duration::from_millis(60)));
        assert!(timer.tick(Duration::from_millis(40)));
        assert!(!timer.tick(Duration::from_millis(60)));
    }

    #[test]
    fn long_frame_fires_once() {
        let mut timer = IntervalTimer::new(Duration::from_millis(10));
        assert!(timer.tick(Duration::from_millis(95)));
        assert!(!timer.tick(Duration::from_millis(1)));
    }

    #[test]
    fn ready_timer_fires_immediately() {
        let mut timer = IntervalTimer::ready(Duration::from_secs(1));
        assert!(timer.tick(Duration::ZERO));
    }

    #[test]
    fn zero_interval_fires_every_tick() {
        let mut timer = IntervalTimer::new(Duration::ZERO);
        assert!(timer.tick(Duration::ZERO));
        assert!(timer.tick(Duration::ZERO));
    }

    #[test]
    fn reset_discards_partial_progress() {
        let mut timer = IntervalTimer::new(Duration::from_millis(100));
        assert!(!timer.tick(Duration::from_millis(90)));
        timer.reset();
        assert!(!timer.tick(Duration::from_millis(90)));
        assert!(timer.tick(Duration::from_millis(10)));
    }
}
