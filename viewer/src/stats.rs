use std::collections::VecDeque;
use std::time::Duration;

/// Timing readout for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickStats {
    /// Smoothed frames per second over the retained window.
    pub fps: f64,
    /// Duration of the tick just recorded, in milliseconds.
    pub last_frame_ms: f64,
}

/// Rolling timing window for the pipeline loop.
///
/// FPS is the reciprocal of the mean tick duration over a bounded FIFO
/// window (`window.len() / sum(window)`), so a burst of slow ticks ages out
/// as new ones arrive. Lifetime totals are kept separately for the shutdown
/// summary.
#[derive(Debug)]
pub struct PerfTracker {
    window: VecDeque<Duration>,
    capacity: usize,
    total_ticks: u64,
    total_elapsed: Duration,
}

impl PerfTracker {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            window: VecDeque::with_capacity(capacity),
            capacity,
            total_ticks: 0,
            total_elapsed: Duration::ZERO,
        }
    }

    /// Push one tick duration, evicting the oldest entry once the window is
    /// full.
    pub fn record(&mut self, elapsed: Duration) -> TickStats {
        if self.window.len() == self.capacity {
            self.window.pop_front();
        }
        self.window.push_back(elapsed);
        self.total_ticks += 1;
        self.total_elapsed += elapsed;
        TickStats {
            fps: self.fps(),
            last_frame_ms: elapsed.as_secs_f64() * 1000.0,
        }
    }

    /// Smoothed FPS over the retained window. Zero until something has been
    /// recorded.
    pub fn fps(&self) -> f64 {
        let sum: Duration = self.window.iter().sum();
        if sum.is_zero() {
            return 0.0;
        }
        self.window.len() as f64 / sum.as_secs_f64()
    }

    /// Lifetime average FPS, for the shutdown summary.
    pub fn average_fps(&self) -> f64 {
        if self.total_elapsed.is_zero() {
            return 0.0;
        }
        self.total_ticks as f64 / self.total_elapsed.as_secs_f64()
    }

    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fps_converges_on_steady_input() {
        let mut perf = PerfTracker::new(30);
        let mut stats = TickStats {
            fps: 0.0,
            last_frame_ms: 0.0,
        };
        for _ in 0..50 {
            stats = perf.record(Duration::from_millis(20));
        }
        // 20 ms per tick -> 1000/20 = 50 fps
        assert!((stats.fps - 50.0).abs() < 0.01, "fps = {}", stats.fps);
        assert!((stats.last_frame_ms - 20.0).abs() < 0.01);
    }

    #[test]
    fn window_is_bounded() {
        let mut perf = PerfTracker::new(30);
        for _ in 0..100 {
            perf.record(Duration::from_millis(1));
        }
        assert_eq!(perf.window.len(), 30);
        assert_eq!(perf.total_ticks(), 100);
    }

    #[test]
    fn old_entries_age_out() {
        let mut perf = PerfTracker::new(4);
        for _ in 0..4 {
            perf.record(Duration::from_millis(100));
        }
        // Fill the window with fast ticks; the slow ones must be gone.
        for _ in 0..4 {
            perf.record(Duration::from_millis(10));
        }
        assert!((perf.fps() - 100.0).abs() < 0.01, "fps = {}", perf.fps());
    }

    #[test]
    fn empty_tracker_reports_zero() {
        let perf = PerfTracker::new(30);
        assert_eq!(perf.fps(), 0.0);
        assert_eq!(perf.average_fps(), 0.0);
    }

    #[test]
    fn lifetime_average_spans_the_whole_run() {
        let mut perf = PerfTracker::new(2);
        perf.record(Duration::from_millis(10));
        perf.record(Duration::from_millis(10));
        perf.record(Duration::from_millis(40));
        perf.record(Duration::from_millis(40));
        // window average is 25 fps, lifetime is 4 ticks / 100 ms = 40 fps
        assert!((perf.average_fps() - 40.0).abs() < 0.01);
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let mut perf = PerfTracker::new(0);
        perf.record(Duration::from_millis(5));
        assert_eq!(perf.window.len(), 1);
    }
}
