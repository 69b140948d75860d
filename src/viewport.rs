// viewport.rs - Surface sizing
//
// Logical (CSS) size is what every simulator works in. Physical size is the
// backing buffer: logical x device pixel ratio. Simulators only read this.

use crate::error::{EngineError, Result};

/// Smallest logical edge that still counts as a drawable surface.
const MIN_EDGE: f32 = 1.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub dpr: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32, dpr: f32) -> Self {
        // A missing or broken ratio falls back to 1 rather than poisoning the buffer size
        let dpr = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
        Self { width, height, dpr }
    }

    /// Zero-sized viewport used before the first resize.
    pub fn empty() -> Self {
        Self { width: 0.0, height: 0.0, dpr: 1.0 }
    }

    /// Backing buffer width in device pixels
    pub fn physical_width(&self) -> u32 {
        if self.is_degenerate() { return 0; }
        (self.width * self.dpr).round() as u32
    }

    /// Backing buffer height in device pixels
    pub fn physical_height(&self) -> u32 {
        if self.is_degenerate() { return 0; }
        (self.height * self.dpr).round() as u32
    }

    /// True during layout transitions (collapsed container, hidden tab)
    pub fn is_degenerate(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite())
            || self.width < MIN_EDGE
            || self.height < MIN_EDGE
    }

    pub fn area(&self) -> f32 {
        if self.is_degenerate() { 0.0 } else { self.width * self.height }
    }

    /// Area-proportional population: floor(area / per_unit), capped.
    /// Degenerate surfaces and non-positive units yield zero.
    pub fn population(&self, per_unit: f32, cap: usize) -> usize {
        if per_unit <= 0.0 { return 0; }
        ((self.area() / per_unit).floor() as usize).min(cap)
    }

    pub fn center(&self) -> (f32, f32) {
        (self.width * 0.5, self.height * 0.5)
    }

    /// Length of the half-diagonal, the natural radius for full-surface gradients
    pub fn half_diagonal(&self) -> f32 {
        (self.width * self.width + self.height * self.height).sqrt() * 0.5
    }

    pub fn ensure_drawable(&self) -> Result<()> {
        if self.is_degenerate() {
            return Err(EngineError::DegenerateSurface { width: self.width, height: self.height });
        }
        Ok(())
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn physical_size_scales_by_ratio() {
        let v = Viewport::new(400.0, 300.0, 2.0);
        assert_eq!(v.physical_width(), 800);
        assert_eq!(v.physical_height(), 600);
    }

    #[test]
    fn bad_ratio_falls_back_to_one() {
        assert_eq!(Viewport::new(10.0, 10.0, 0.0).dpr, 1.0);
        assert_eq!(Viewport::new(10.0, 10.0, f32::NAN).dpr, 1.0);
    }

    #[test]
    fn degenerate_surfaces_have_no_population() {
        let v = Viewport::new(0.0, 500.0, 1.0);
        assert!(v.is_degenerate());
        assert_eq!(v.population(20_000.0, usize::MAX), 0);
        assert!(v.ensure_drawable().is_err());
        assert_eq!(v.physical_width(), 0);
    }

    #[test]
    fn population_floors_and_caps() {
        let v = Viewport::new(400.0, 400.0, 1.0);
        assert_eq!(v.population(20_000.0, usize::MAX), 8);
        assert_eq!(v.population(20_000.0, 5), 5);
        assert_eq!(v.population(0.0, 5), 0);
    }
}
