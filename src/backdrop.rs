// backdrop.rs - Layer composition and frame order
//
// The host owns one `Backdrop` per page. Resize always rebuilds every layer
// from scratch (no incremental resizing). Each frame runs
// clear -> tick all layers -> draw all layers, in mount order.

use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::{debug, warn};

use crate::clock::FrameClock;
use crate::config::{EngineConfig, LayerKind};
use crate::field::paint_field;
use crate::sim::{FloatingField, Input, Simulation, StarField, Swarm, WaveGrid};
use crate::surface::Surface;
use crate::viewport::Viewport;

pub struct Backdrop {
    cfg: EngineConfig,
    seed: u64,
    viewport: Viewport,
    layers: Vec<(LayerKind, Box<dyn Simulation>)>,
    clock: FrameClock,
    cursor: Option<(f32, f32)>,
    moved: bool,
    /// Bumped on each field repaint so noise differs between resizes
    generation: u64,
}

impl Backdrop {
    pub fn new(cfg: EngineConfig, seed: u64) -> Self {
        let seed = cfg.seed.unwrap_or(seed);
        let layers = cfg.layers.iter()
            .enumerate()
            .map(|(i, &kind)| (kind, build_layer(&cfg, kind, seed.wrapping_add(i as u64 + 1))))
            .collect();
        Self {
            cfg,
            seed,
            viewport: Viewport::empty(),
            layers,
            clock: FrameClock::new(),
            cursor: None,
            moved: false,
            generation: 0,
        }
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn config(&self) -> &EngineConfig {
        &self.cfg
    }

    /// Population per mounted layer, in mount order
    pub fn populations(&self) -> Vec<(LayerKind, usize)> {
        self.layers.iter().map(|(k, l)| (*k, l.population())).collect()
    }

    pub fn layer(&self, kind: LayerKind) -> Option<&dyn Simulation> {
        self.layers.iter().find(|(k, _)| *k == kind).map(|(_, l)| &**l)
    }

    /// New viewport: rebuild every layer's population
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        for (_, layer) in &mut self.layers {
            layer.init(&viewport);
        }
        if viewport.is_degenerate() {
            warn!(width = viewport.width, height = viewport.height, "degenerate surface, animation paused");
        } else {
            debug!(width = viewport.width, height = viewport.height, dpr = viewport.dpr,
                populations = ?self.populations(), "backdrop rebuilt");
        }
    }

    /// One-shot paint of the static field layer
    pub fn paint_field(&mut self, surface: &mut dyn Surface) {
        surface.resize(&self.viewport);
        self.generation += 1;
        let mut rng = SmallRng::seed_from_u64(self.seed ^ self.generation.rotate_left(32));
        paint_field(surface, &self.viewport, &self.cfg.field, &mut rng);
    }

    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        if !(x.is_finite() && y.is_finite()) { return; }
        self.cursor = Some((x, y));
        self.moved = true;
    }

    pub fn pointer_left(&mut self) {
        self.cursor = None;
        self.moved = false;
    }

    /// Clock-driven frame. Returns the delta (ms) the layers were stepped by.
    pub fn frame(&mut self, now_ms: f64, surface: &mut dyn Surface) -> f32 {
        let dt = self.clock.advance(now_ms) as f32;
        self.step(dt, surface);
        dt
    }

    /// Fixed-delta frame; `dt_ms` must already be clamped
    pub fn step(&mut self, dt_ms: f32, surface: &mut dyn Surface) {
        if self.viewport.is_degenerate() { return; }

        let input = Input { cursor: self.cursor, moved: self.moved };
        self.moved = false;

        surface.clear();
        for (_, layer) in &mut self.layers {
            layer.tick(dt_ms, &input);
        }
        for (_, layer) in &self.layers {
            layer.draw(surface);
        }
    }

    /// Drop the previous timestamp so a resumed loop starts with a zero delta
    pub fn pause(&mut self) {
        self.clock.reset();
    }
}

fn build_layer(cfg: &EngineConfig, kind: LayerKind, seed: u64) -> Box<dyn Simulation> {
    match kind {
        LayerKind::Grid => Box::new(WaveGrid::new(cfg.grid.clone(), seed)),
        LayerKind::Floating => Box::new(FloatingField::new(cfg.floating.clone(), seed)),
        LayerKind::Swarm => Box::new(Swarm::new(cfg.swarm.clone(), seed)),
        LayerKind::Stars => Box::new(StarField::new(cfg.stars.clone(), seed)),
    }
}
