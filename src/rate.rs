//! Per-sink frame divider

/// Lets one of every `divisor` ticks through
///
/// The first tick after creation always passes, then every `divisor`-th
/// tick after it, so the phase is fixed for the lifetime of the limiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimiter {
    divisor: u32,
    counter: u32,
}

impl RateLimiter {
    /// Create a limiter. A divisor of 0 behaves like 1.
    pub const fn new(divisor: u32) -> Self {
        Self {
            divisor: if divisor == 0 { 1 } else { divisor },
            counter: 0,
        }
    }

    /// Limiter that passes every tick
    pub const fn every_tick() -> Self {
        Self::new(1)
    }

    /// Advance by one tick, returns true if this tick may run
    pub fn tick(&mut self) -> bool {
        self.counter = (self.counter + 1) % self.divisor;
        self.counter == 1 % self.divisor
    }

    pub const fn divisor(&self) -> u32 {
        self.divisor
    }

    /// Restart the phase, the next tick passes
    pub fn reset(&mut self) {
        self.counter = 0;
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::every_tick()
    }
}
