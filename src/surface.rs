// surface.rs - Drawing API shared by every layer
//
// Coordinates are logical pixels. Implementations own the mapping onto their
// physical buffer (device pixel ratio) so simulators never see it.

use crate::color::Rgba;
use crate::viewport::Viewport;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GradientShape {
    /// Concentric circles around (cx, cy) from radius r0 to r1
    Radial { cx: f32, cy: f32, r0: f32, r1: f32 },
    /// Along the segment (x0, y0) -> (x1, y1)
    Linear { x0: f32, y0: f32, x1: f32, y1: f32 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Gradient {
    pub shape: GradientShape,
    /// Offsets in 0..1, ascending
    pub stops: Vec<(f32, Rgba)>,
}

impl Gradient {
    pub fn radial(cx: f32, cy: f32, r0: f32, r1: f32) -> Self {
        Self { shape: GradientShape::Radial { cx, cy, r0, r1 }, stops: Vec::new() }
    }

    pub fn linear(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { shape: GradientShape::Linear { x0, y0, x1, y1 }, stops: Vec::new() }
    }

    pub fn stop(mut self, offset: f32, color: Rgba) -> Self {
        self.stops.push((offset.clamp(0.0, 1.0), color));
        self
    }

    /// Gradient parameter at a point (unclamped)
    pub fn param(&self, x: f32, y: f32) -> f32 {
        match self.shape {
            GradientShape::Radial { cx, cy, r0, r1 } => {
                let d = ((x - cx) * (x - cx) + (y - cy) * (y - cy)).sqrt();
                let span = r1 - r0;
                if span.abs() < f32::EPSILON { return 1.0; }
                (d - r0) / span
            }
            GradientShape::Linear { x0, y0, x1, y1 } => {
                let (dx, dy) = (x1 - x0, y1 - y0);
                let len2 = dx * dx + dy * dy;
                if len2 < f32::EPSILON { return 0.0; }
                ((x - x0) * dx + (y - y0) * dy) / len2
            }
        }
    }

    /// Color at gradient parameter t, with canvas-style padding past the ends
    pub fn sample(&self, t: f32) -> Rgba {
        let Some(&(first_at, first)) = self.stops.first() else { return Rgba::TRANSPARENT };
        if t <= first_at { return first; }
        for pair in self.stops.windows(2) {
            let (a_at, a) = pair[0];
            let (b_at, b) = pair[1];
            if t <= b_at {
                let span = b_at - a_at;
                if span <= f32::EPSILON { return b; }
                return a.lerp(b, (t - a_at) / span);
            }
        }
        self.stops[self.stops.len() - 1].1
    }
}

/// A 2D drawing target
pub trait Surface {
    /// Re-size the backing buffer for a viewport and reset its scale
    fn resize(&mut self, viewport: &Viewport);

    /// Clear everything to transparent
    fn clear(&mut self);

    fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: Rgba);

    /// Stroke a segment whose color runs linearly from `from` to `to`
    fn stroke_segment(&mut self, a: (f32, f32), b: (f32, f32), width: f32, from: Rgba, to: Rgba);

    /// Fill the whole surface with a gradient, composited over what is there
    fn fill_gradient(&mut self, gradient: &Gradient);

    /// Composite a physical-resolution RGBA buffer over the whole surface
    fn overlay_rgba(&mut self, pixels: &[u8], width: u32, height: u32);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_pads_and_interpolates() {
        let g = Gradient::linear(0.0, 0.0, 10.0, 0.0)
            .stop(0.0, Rgba::rgb(0, 0, 0))
            .stop(1.0, Rgba::rgb(200, 100, 0));
        assert_eq!(g.sample(-1.0), Rgba::rgb(0, 0, 0));
        assert_eq!(g.sample(2.0), Rgba::rgb(200, 100, 0));
        let mid = g.sample(g.param(5.0, 3.0));
        assert!((mid.r - 100.0).abs() < 1e-3 && (mid.g - 50.0).abs() < 1e-3);
    }

    #[test]
    fn radial_param_measures_distance() {
        let g = Gradient::radial(0.0, 0.0, 0.0, 10.0);
        assert!((g.param(6.0, 8.0) - 1.0).abs() < 1e-6);
        assert!(g.param(0.0, 0.0).abs() < 1e-6);
    }

    #[test]
    fn empty_gradient_is_transparent() {
        assert_eq!(Gradient::radial(0.0, 0.0, 0.0, 1.0).sample(0.5), Rgba::TRANSPARENT);
    }
}
