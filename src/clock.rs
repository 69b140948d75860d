// clock.rs - Frame delta
//
// Turns raw frame timestamps into the delta each simulator sees. The ceiling
// keeps a backgrounded tab from feeding one enormous step on return.

/// Largest delta ever handed to a simulator, in ms
pub const MAX_FRAME_MS: f64 = 100.0;

/// Nominal frame length the per-frame tunings are expressed against
pub const FRAME_MS: f32 = 1000.0 / 60.0;

/// Clamp a raw timestamp gap into [0, MAX_FRAME_MS]; NaN counts as no time
#[inline]
pub fn clamp_delta(raw_ms: f64) -> f64 {
    if raw_ms.is_nan() { return 0.0; }
    raw_ms.clamp(0.0, MAX_FRAME_MS)
}

#[derive(Clone, Debug, Default)]
pub struct FrameClock {
    last: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self { last: None }
    }

    /// Delta in ms since the previous call. The first frame yields 0.
    pub fn advance(&mut self, now_ms: f64) -> f64 {
        let dt = match self.last {
            Some(prev) => clamp_delta(now_ms - prev),
            None => 0.0,
        };
        if now_ms.is_finite() {
            self.last = Some(now_ms);
        }
        dt
    }

    /// Forget the previous timestamp, e.g. after the loop was paused
    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_frame_is_zero() {
        let mut c = FrameClock::new();
        assert_eq!(c.advance(1234.0), 0.0);
        assert_eq!(c.advance(1250.0), 16.0);
    }

    #[test]
    fn gaps_are_clamped() {
        let mut c = FrameClock::new();
        c.advance(0.0);
        assert_eq!(c.advance(5000.0), MAX_FRAME_MS);
        // clock going backwards
        assert_eq!(c.advance(4000.0), 0.0);
        assert_eq!(c.advance(f64::NAN), 0.0);
        assert_eq!(c.advance(4010.0), 10.0);
    }

    #[test]
    fn clamp_always_in_range() {
        for raw in [-1e9, -1.0, 0.0, 16.7, 99.9, 100.0, 100.1, 5000.0, f64::INFINITY, f64::NAN] {
            let dt = clamp_delta(raw);
            assert!((0.0..=MAX_FRAME_MS).contains(&dt), "{raw} -> {dt}");
            assert_eq!(clamp_delta(dt), dt);
        }
    }

    #[test]
    fn reset_restarts() {
        let mut c = FrameClock::new();
        c.advance(0.0);
        c.reset();
        assert_eq!(c.advance(50.0), 0.0);
    }
}
