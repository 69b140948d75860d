// path.rs - Scripted pointer motion
//
// A slow Lissajous loop around the centre of the surface, so trails, grid
// dents and repulsion all show up in a headless render.

use std::f32::consts::TAU;

pub struct PointerPath {
    cx: f32,
    cy: f32,
    rx: f32,
    ry: f32,
    /// Seconds per full loop
    period: f32,
}

impl PointerPath {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            cx: width * 0.5,
            cy: height * 0.5,
            rx: width * 0.3,
            ry: height * 0.25,
            period: 6.0,
        }
    }

    /// Pointer position at `t` seconds
    pub fn at(&self, t: f32) -> (f32, f32) {
        let a = t / self.period * TAU;
        (self.cx + self.rx * a.cos(), self.cy + self.ry * (2.0 * a).sin())
    }
}
