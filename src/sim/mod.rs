// sim/ - Backdrop simulations
//
// Each layer owns its entities outright and exposes the same three-step
// lifecycle: rebuild for a viewport, step by a frame delta, draw. None of them
// touch the platform; the host feeds time and pointer input.

mod floating;
mod grid;
pub mod spatial;
mod stars;
mod swarm;

pub use floating::{FloatingField, FloatingParticle};
pub use grid::{GridPoint, WaveGrid};
pub use stars::{Star, StarField};
pub use swarm::{Particle, Swarm};

use rand::Rng;

use crate::clock::FRAME_MS;
use crate::surface::Surface;
use crate::viewport::Viewport;

/// Pointer state for one tick
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Input {
    /// Logical surface coordinates; `None` when the pointer is off the page
    pub cursor: Option<(f32, f32)>,
    /// Pointer moved since the previous tick
    pub moved: bool,
}

impl Input {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn at(x: f32, y: f32) -> Self {
        Self { cursor: Some((x, y)), moved: false }
    }

    pub fn moved_to(x: f32, y: f32) -> Self {
        Self { cursor: Some((x, y)), moved: true }
    }
}

pub trait Simulation {
    /// Throw away the population and build a fresh one sized for `viewport`
    fn init(&mut self, viewport: &Viewport);

    /// Advance by `dt_ms` (already clamped by the frame clock)
    fn tick(&mut self, dt_ms: f32, input: &Input);

    /// Connections first, then entities
    fn draw(&self, surface: &mut dyn Surface);

    /// Live entity count, for logging and tests
    fn population(&self) -> usize;
}

/// Frame delta as a multiple of a 60 Hz frame
#[inline]
pub(crate) fn frames(dt_ms: f32) -> f32 {
    dt_ms / FRAME_MS
}

/// Uniform in [lo, hi], tolerant of swapped or equal bounds
#[inline]
pub(crate) fn between<R: Rng>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
    lo + rng.r#gen::<f32>() * (hi - lo)
}

#[inline]
pub(crate) fn distance(a: (f32, f32), b: (f32, f32)) -> f32 {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    (dx * dx + dy * dy).sqrt()
}

/// Unit push away from the cursor scaled by linear falloff inside `radius`.
/// Zero outside the radius or with no cursor.
pub(crate) fn repulsion(pos: (f32, f32), cursor: Option<(f32, f32)>, radius: f32) -> (f32, f32) {
    let Some(c) = cursor else { return (0.0, 0.0) };
    if radius <= 0.0 { return (0.0, 0.0); }
    let d = distance(pos, c);
    if d >= radius || d < 1e-3 { return (0.0, 0.0); }
    let falloff = 1.0 - d / radius;
    ((pos.0 - c.0) / d * falloff, (pos.1 - c.1) / d * falloff)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn one_frame_is_one() {
        assert!((frames(FRAME_MS) - 1.0).abs() < 1e-6);
        assert_eq!(frames(0.0), 0.0);
    }

    #[test]
    fn between_handles_swapped_bounds() {
        let mut rng = SmallRng::seed_from_u64(5);
        for _ in 0..100 {
            let v = between(&mut rng, 3.0, 1.0);
            assert!((1.0..=3.0).contains(&v));
        }
        assert_eq!(between(&mut rng, 2.0, 2.0), 2.0);
    }

    #[test]
    fn repulsion_points_away_and_fades() {
        let near = repulsion((10.0, 0.0), Some((0.0, 0.0)), 100.0);
        assert!(near.0 > 0.8 && near.1.abs() < 1e-6);
        let far = repulsion((150.0, 0.0), Some((0.0, 0.0)), 100.0);
        assert_eq!(far, (0.0, 0.0));
        assert_eq!(repulsion((1.0, 1.0), None, 100.0), (0.0, 0.0));
    }
}
