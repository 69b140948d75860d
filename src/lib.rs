use wasm_bindgen::prelude::*;

// ============================================================================
// BACKDROP ENGINE - Generative page background
// ============================================================================
//
// Layers (bottom to top):
//   field     static gradient + vignette + noise, repainted on resize only
//   grid      wave lattice with spring-damper cursor response
//   swarm     short-lived bouncing particles with proximity links
//   floating  depth-layered drifting particles, pointer trails
//   stars     drifting, twinkling star field with its own sky (opt-in)

pub mod backdrop;
pub mod clock;
pub mod color;
pub mod config;
pub mod error;
pub mod field;
pub mod render;
pub mod sim;
pub mod surface;
pub mod viewport;

#[cfg(target_arch = "wasm32")]
mod web;

pub use backdrop::Backdrop;
pub use config::{EngineConfig, LayerKind};
pub use error::{EngineError, Result};
pub use render::Raster;
pub use surface::{Gradient, Surface};
pub use viewport::Viewport;

#[cfg(target_arch = "wasm32")]
pub use web::{BackdropHandle, mount_backdrop};

/// Pixel-buffer host API: the page blits `output_ptr()` into an `ImageData`
/// itself. The field layer is composited underneath every frame.
#[wasm_bindgen]
pub struct BackdropRaster {
    engine: Backdrop,
    field: Raster,
    layers: Raster,
    out: Raster,
}

#[wasm_bindgen]
impl BackdropRaster {
    #[wasm_bindgen(constructor)]
    pub fn new(w: f32, h: f32, dpr: f32, seed: u32) -> Self {
        Self::build(EngineConfig::default(), w, h, dpr, seed as u64)
    }

    /// Same as the constructor, with a JSON config override
    pub fn with_config(json: &str, w: f32, h: f32, dpr: f32, seed: u32) -> std::result::Result<BackdropRaster, JsValue> {
        let cfg = EngineConfig::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Self::build(cfg, w, h, dpr, seed as u64))
    }

    fn build(cfg: EngineConfig, w: f32, h: f32, dpr: f32, seed: u64) -> Self {
        let viewport = Viewport::new(w, h, dpr);
        let mut engine = Backdrop::new(cfg, seed);
        engine.resize(viewport);
        let mut field = Raster::new(&viewport);
        engine.paint_field(&mut field);
        Self {
            engine,
            field,
            layers: Raster::new(&viewport),
            out: Raster::new(&viewport),
        }
    }

    /// Advance to timestamp `now` (ms) and redraw
    pub fn tick(&mut self, now: f64) {
        self.engine.frame(now, &mut self.layers);
        self.out.clear();
        self.out.composite(&self.field);
        self.out.composite(&self.layers);
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        self.engine.pointer_moved(x, y);
    }

    pub fn pointer_leave(&mut self) {
        self.engine.pointer_left();
    }

    pub fn resize(&mut self, w: f32, h: f32, dpr: f32) {
        let viewport = Viewport::new(w, h, dpr);
        self.engine.resize(viewport);
        self.engine.paint_field(&mut self.field);
        self.layers.resize(&viewport);
        self.out.resize(&viewport);
    }

    // Accessors for WASM
    pub fn output_ptr(&self) -> *const u8 { self.out.ptr() }
    pub fn output_len(&self) -> usize { self.out.len() }
    pub fn width(&self) -> u32 { self.out.width() }
    pub fn height(&self) -> u32 { self.out.height() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raster_host_composites_field_and_layers() {
        let mut host = BackdropRaster::new(200.0, 150.0, 1.0, 3);
        host.pointer_move(100.0, 75.0);
        host.tick(0.0);
        host.tick(16.0);
        assert_eq!((host.width(), host.height()), (200, 150));
        assert_eq!(host.output_len(), 200 * 150 * 4);
        // field is opaque, so every output pixel is
        assert!(host.out.as_rgba().chunks_exact(4).all(|p| p[3] == 255));
    }

    #[test]
    fn raster_host_resizes() {
        let mut host = BackdropRaster::new(200.0, 150.0, 1.0, 3);
        host.resize(100.0, 50.0, 2.0);
        host.tick(0.0);
        assert_eq!((host.width(), host.height()), (200, 100));
    }
}
