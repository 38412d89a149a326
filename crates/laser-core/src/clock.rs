use crate::constants::MAX_FRAME_DT;
use instant::Instant;

/// Wall-clock frame timer. Deltas are clamped so a stalled tab or a
/// breakpoint does not fast-forward every timer at once.
#[derive(Clone, Debug)]
pub struct FrameClock {
    last_instant: Instant,
    elapsed: f32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            last_instant: Instant::now(),
            elapsed: 0.0,
        }
    }

    /// Seconds since the previous call (clamped) and total elapsed seconds.
    pub fn tick(&mut self) -> (f32, f32) {
        let now = Instant::now();
        let dt = (now - self.last_instant).as_secs_f32();
        self.last_instant = now;
        self.advance(dt)
    }

    /// Step by an explicit delta, for fixed-step loops and tests.
    pub fn advance(&mut self, dt: f32) -> (f32, f32) {
        let dt = dt.clamp(0.0, MAX_FRAME_DT);
        self.elapsed += dt;
        (dt, self.elapsed)
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_stalls_are_clamped() {
        let mut clock = FrameClock::new();
        let (dt, elapsed) = clock.advance(5.0);
        assert_eq!(dt, MAX_FRAME_DT);
        assert_eq!(elapsed, MAX_FRAME_DT);
        assert_eq!(clock.advance(-1.0).0, 0.0);
    }
}
