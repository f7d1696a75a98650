/// Deterministic frame-skip gate: process 1 of every N frames.
///
/// Gated-out frames bypass the transforms but are still displayed and still
/// count toward FPS. The savings come from skipping the expensive transform,
/// not from skipping display.
pub fn should_process(tick: u64, interval: u32) -> bool {
    tick % u64::from(interval.max(1)) == 0
}

/// Owns the monotonically increasing tick counter for the pipeline loop.
#[derive(Debug, Default)]
pub struct FrameSkip {
    tick: u64,
}

impl FrameSkip {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the counter and report whether this tick is processed.
    /// Interval changes take effect on the next call; past decisions are
    /// never revisited.
    pub fn gate(&mut self, interval: u32) -> bool {
        let admit = should_process(self.tick, interval);
        self.tick += 1;
        admit
    }

    /// Ticks seen so far.
    pub fn ticks(&self) -> u64 {
        self.tick
    }
}
