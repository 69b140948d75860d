// render.rs - Software raster surface
//
// Straight (non-premultiplied) RGBA8 buffer at physical resolution, with
// source-over blending. Backs the pointer/len wasm API and the preview tool;
// tests use it to check what actually lands on the pixels.

use crate::color::Rgba;
use crate::surface::{Gradient, Surface};
use crate::viewport::Viewport;

pub struct Raster {
    out: Vec<u8>,
    w: u32,
    h: u32,
    dpr: f32,
}

impl Raster {
    pub fn new(viewport: &Viewport) -> Self {
        let mut r = Self { out: Vec::new(), w: 0, h: 0, dpr: 1.0 };
        r.resize(viewport);
        r
    }

    pub fn ptr(&self) -> *const u8 {
        self.out.as_ptr()
    }

    pub fn len(&self) -> usize {
        self.out.len()
    }

    pub fn is_empty(&self) -> bool {
        self.out.is_empty()
    }

    pub fn width(&self) -> u32 { self.w }
    pub fn height(&self) -> u32 { self.h }

    pub fn as_rgba(&self) -> &[u8] {
        &self.out
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.out
    }

    /// Pixel at physical coordinates, `None` outside the buffer
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.w || y >= self.h { return None; }
        let i = (y as usize * self.w as usize + x as usize) * 4;
        Some([self.out[i], self.out[i + 1], self.out[i + 2], self.out[i + 3]])
    }

    /// Composite another raster of the same size on top of this one
    pub fn composite(&mut self, top: &Raster) {
        self.overlay_rgba(&top.out, top.w, top.h);
    }

    #[inline]
    fn blend(&mut self, x: i64, y: i64, color: Rgba, coverage: f32) {
        if x < 0 || y < 0 || x >= self.w as i64 || y >= self.h as i64 { return; }
        let sa = color.a.clamp(0.0, 1.0) * coverage.clamp(0.0, 1.0);
        if sa <= 0.0 { return; }

        let i = (y as usize * self.w as usize + x as usize) * 4;
        let da = self.out[i + 3] as f32 / 255.0;
        let oa = sa + da * (1.0 - sa);
        if oa <= 0.0 { return; }

        let src = [color.r, color.g, color.b];
        for c in 0..3 {
            let dc = self.out[i + c] as f32;
            let v = (src[c] * sa + dc * da * (1.0 - sa)) / oa;
            self.out[i + c] = v.clamp(0.0, 255.0).round() as u8;
        }
        self.out[i + 3] = (oa * 255.0).round() as u8;
    }

    /// Physical pixel bounds of a logical box, clipped to the buffer
    fn clip(&self, x0: f32, y0: f32, x1: f32, y1: f32) -> (i64, i64, i64, i64) {
        let d = self.dpr;
        (
            ((x0 * d).floor() as i64).max(0),
            ((y0 * d).floor() as i64).max(0),
            ((x1 * d).ceil() as i64).min(self.w as i64 - 1),
            ((y1 * d).ceil() as i64).min(self.h as i64 - 1),
        )
    }
}

/// Byte length of a `w` x `h` RGBA8 buffer
#[inline]
pub fn buffer_len(w: u32, h: u32) -> usize {
    w as usize * h as usize * 4
}

impl Surface for Raster {
    fn resize(&mut self, viewport: &Viewport) {
        self.w = viewport.physical_width();
        self.h = viewport.physical_height();
        self.dpr = viewport.dpr;
        self.out.clear();
        self.out.resize(buffer_len(self.w, self.h), 0);
    }

    fn clear(&mut self) {
        self.out.fill(0);
    }

    fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: Rgba) {
        if !(x.is_finite() && y.is_finite() && radius > 0.0) { return; }
        let pad = radius + 1.0;
        let (x0, y0, x1, y1) = self.clip(x - pad, y - pad, x + pad, y + pad);
        let (cx, cy, r) = (x * self.dpr, y * self.dpr, radius * self.dpr);

        for py in y0..=y1 {
            for px in x0..=x1 {
                let dx = px as f32 + 0.5 - cx;
                let dy = py as f32 + 0.5 - cy;
                let d = (dx * dx + dy * dy).sqrt();
                self.blend(px, py, color, r + 0.5 - d);
            }
        }
    }

    fn stroke_segment(&mut self, a: (f32, f32), b: (f32, f32), width: f32, from: Rgba, to: Rgba) {
        if !(a.0.is_finite() && a.1.is_finite() && b.0.is_finite() && b.1.is_finite()) { return; }
        let half = (width * self.dpr).max(1.0) * 0.5;
        let pad = half / self.dpr + 1.0;
        let (x0, y0, x1, y1) = self.clip(
            a.0.min(b.0) - pad, a.1.min(b.1) - pad,
            a.0.max(b.0) + pad, a.1.max(b.1) + pad,
        );

        let (ax, ay) = (a.0 * self.dpr, a.1 * self.dpr);
        let (dx, dy) = (b.0 * self.dpr - ax, b.1 * self.dpr - ay);
        let len2 = dx * dx + dy * dy;

        for py in y0..=y1 {
            for px in x0..=x1 {
                let qx = px as f32 + 0.5 - ax;
                let qy = py as f32 + 0.5 - ay;
                let t = if len2 > 0.0 { ((qx * dx + qy * dy) / len2).clamp(0.0, 1.0) } else { 0.0 };
                let ex = qx - dx * t;
                let ey = qy - dy * t;
                let dist = (ex * ex + ey * ey).sqrt();
                self.blend(px, py, from.lerp(to, t), half + 0.5 - dist);
            }
        }
    }

    fn fill_gradient(&mut self, gradient: &Gradient) {
        let inv = 1.0 / self.dpr;
        for py in 0..self.h as i64 {
            for px in 0..self.w as i64 {
                let lx = (px as f32 + 0.5) * inv;
                let ly = (py as f32 + 0.5) * inv;
                let color = gradient.sample(gradient.param(lx, ly));
                self.blend(px, py, color, 1.0);
            }
        }
    }

    fn overlay_rgba(&mut self, pixels: &[u8], width: u32, height: u32) {
        if pixels.len() < buffer_len(width, height) { return; }
        let w = width.min(self.w);
        let h = height.min(self.h);
        for y in 0..h {
            for x in 0..w {
                let i = (y as usize * width as usize + x as usize) * 4;
                let color = Rgba {
                    r: pixels[i] as f32,
                    g: pixels[i + 1] as f32,
                    b: pixels[i + 2] as f32,
                    a: pixels[i + 3] as f32 / 255.0,
                };
                self.blend(x as i64, y as i64, color, 1.0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raster(w: f32, h: f32, dpr: f32) -> Raster {
        Raster::new(&Viewport::new(w, h, dpr))
    }

    #[test]
    fn buffer_is_physical_size() {
        let r = raster(10.0, 5.0, 2.0);
        assert_eq!((r.width(), r.height()), (20, 10));
        assert_eq!(r.len(), 20 * 10 * 4);
    }

    #[test]
    fn circle_lands_at_scaled_position() {
        let mut r = raster(20.0, 20.0, 2.0);
        r.fill_circle(5.0, 5.0, 2.0, Rgba::WHITE);
        assert_eq!(r.pixel(10, 10), Some([255, 255, 255, 255]));
        assert_eq!(r.pixel(30, 30), Some([0, 0, 0, 0]));
    }

    #[test]
    fn circles_off_surface_are_clipped() {
        let mut r = raster(10.0, 10.0, 1.0);
        r.fill_circle(-50.0, 500.0, 3.0, Rgba::WHITE);
        r.fill_circle(f32::NAN, 1.0, 3.0, Rgba::WHITE);
        assert!(r.as_rgba().iter().all(|&b| b == 0));
    }

    #[test]
    fn segment_interpolates_color() {
        let mut r = raster(100.0, 10.0, 1.0);
        r.stroke_segment((0.0, 5.0), (100.0, 5.0), 2.0, Rgba::rgb(255, 0, 0), Rgba::rgb(0, 0, 255));
        let left = r.pixel(1, 5).unwrap();
        let right = r.pixel(98, 5).unwrap();
        assert!(left[0] > 240 && left[2] < 15);
        assert!(right[2] > 240 && right[0] < 15);
    }

    #[test]
    fn half_alpha_over_opaque() {
        let mut r = raster(2.0, 2.0, 1.0);
        r.fill_gradient(&Gradient::linear(0.0, 0.0, 1.0, 0.0).stop(0.0, Rgba::rgb(0, 0, 0)));
        r.fill_gradient(&Gradient::linear(0.0, 0.0, 1.0, 0.0).stop(0.0, Rgba::WHITE.with_alpha(0.5)));
        let p = r.pixel(0, 0).unwrap();
        assert_eq!(p[3], 255);
        assert!((p[0] as i32 - 128).abs() <= 1);
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn buffer_len_does_not_wrap() {
        // 40000 x 30000 x 4 overflows u32
        assert_eq!(buffer_len(40_000, 30_000), 4_800_000_000usize);
        assert_eq!(buffer_len(0, 30_000), 0);
    }

    #[test]
    fn clear_resets() {
        let mut r = raster(4.0, 4.0, 1.0);
        r.fill_circle(2.0, 2.0, 2.0, Rgba::WHITE);
        r.clear();
        assert!(r.as_rgba().iter().all(|&b| b == 0));
    }
}
