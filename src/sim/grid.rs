// grid.rs - Cursor-reactive wave lattice
//
// Every point chases a target made of a travelling sine wave plus a one-sided
// push from the cursor, through a spring-damper. Displacement is clamped with
// an inelastic bounce. Edges only ever join lattice neighbours.

use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::Rng;

use super::{Input, Simulation, distance};
use crate::color::Rgba;
use crate::config::GridConfig;
use crate::surface::Surface;
use crate::viewport::Viewport;

/// Velocity kept (and reversed) when a point hits its displacement limit
const BOUNCE: f32 = -0.5;
const EDGE_WIDTH: f32 = 0.6;
const EDGE_ALPHA: f32 = 0.6;

#[derive(Clone, Debug, PartialEq)]
pub struct GridPoint {
    pub row: usize,
    pub col: usize,
    pub x: f32,
    pub y: f32,
    pub original_y: f32,
    pub size: f32,
    pub hue: f32,
    pub opacity: f32,
    pub velocity: f32,
    pub max_displacement: f32,
}

impl GridPoint {
    /// One spring-damper step toward `target_y`, then clamp with a bounce
    pub fn step(&mut self, target_y: f32, spring: f32, friction: f32, dt_scaled: f32) {
        let force = spring * (target_y - self.y);
        self.velocity = (self.velocity + force * dt_scaled) * friction;
        self.y += self.velocity;

        let offset = self.y - self.original_y;
        if offset.abs() > self.max_displacement {
            self.y = self.original_y + self.max_displacement.copysign(offset);
            self.velocity *= BOUNCE;
        }
    }

    pub fn color(&self) -> Rgba {
        Rgba::hsl(self.hue, 0.7, 0.65, self.opacity)
    }
}

pub struct WaveGrid {
    cfg: GridConfig,
    points: Vec<GridPoint>,
    cols: usize,
    rows: usize,
    /// Seconds of simulated time, drives the travelling wave
    clock: f32,
    rng: SmallRng,
}

impl WaveGrid {
    pub fn new(cfg: GridConfig, seed: u64) -> Self {
        Self {
            cfg,
            points: Vec::new(),
            cols: 0,
            rows: 0,
            clock: 0.0,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn points(&self) -> &[GridPoint] {
        &self.points
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.cols, self.rows)
    }

    pub fn clock(&self) -> f32 {
        self.clock
    }

    /// Wave offset at column position `x` for the current clock
    pub fn wave_offset(&self, x: f32) -> f32 {
        (self.clock + x * self.cfg.frequency).sin() * self.cfg.amplitude
    }

    /// One-sided cursor push: positive inside the radius, zero elsewhere
    pub fn cursor_influence(&self, point: (f32, f32), cursor: Option<(f32, f32)>) -> f32 {
        let Some(c) = cursor else { return 0.0 };
        if self.cfg.influence_radius <= 0.0 { return 0.0; }
        let falloff = 1.0 - distance(c, point) / self.cfg.influence_radius;
        falloff.max(0.0) * self.cfg.influence_strength
    }

    /// Build a cols x rows lattice at `spacing`, centered in the viewport
    fn build(&mut self, viewport: &Viewport) {
        self.points.clear();
        self.cols = 0;
        self.rows = 0;

        let spacing = self.cfg.spacing;
        if viewport.is_degenerate() || !(spacing > 0.0) { return; }

        let cols = (viewport.width / spacing).floor() as usize;
        let rows = (viewport.height / spacing).floor() as usize;
        if cols == 0 || rows == 0 { return; }

        // Center the lattice; leftover space splits evenly on both sides
        let ox = (viewport.width - (cols - 1) as f32 * spacing) * 0.5;
        let oy = (viewport.height - (rows - 1) as f32 * spacing) * 0.5;

        self.points.reserve(cols * rows);
        for row in 0..rows {
            for col in 0..cols {
                let x = ox + col as f32 * spacing;
                let y = oy + row as f32 * spacing;
                let across = if cols > 1 { col as f32 / (cols - 1) as f32 } else { 0.5 };
                let hue = self.cfg.hue + (across - 0.5) * 2.0 * self.cfg.hue_spread;
                let opacity = self.cfg.base_opacity + self.rng.r#gen::<f32>() * self.cfg.jitter;
                self.points.push(GridPoint {
                    row,
                    col,
                    x,
                    y,
                    original_y: y,
                    size: self.cfg.point_size,
                    hue,
                    opacity,
                    velocity: 0.0,
                    max_displacement: self.cfg.max_displacement,
                });
            }
        }
        self.cols = cols;
        self.rows = rows;
    }

    fn at(&self, row: usize, col: usize) -> Option<&GridPoint> {
        if row >= self.rows || col >= self.cols { return None; }
        self.points.get(row * self.cols + col).filter(|p| p.row == row && p.col == col)
    }
}

impl Simulation for WaveGrid {
    fn init(&mut self, viewport: &Viewport) {
        self.build(viewport);
    }

    fn tick(&mut self, dt_ms: f32, input: &Input) {
        if self.points.is_empty() { return; }

        let dt = dt_ms / 1000.0;
        self.clock += dt;
        let dt_scaled = dt * self.cfg.time_scale;

        for i in 0..self.points.len() {
            let (x, y, original_y) = {
                let p = &self.points[i];
                (p.x, p.y, p.original_y)
            };
            let influence = self.cursor_influence((x, y), input.cursor);
            let target = original_y + self.wave_offset(x) + influence;
            let shimmer = self.rng.r#gen::<f32>() * self.cfg.jitter;

            let p = &mut self.points[i];
            p.step(target, self.cfg.spring, self.cfg.friction, dt_scaled);

            let boost = influence / self.cfg.influence_strength.max(f32::EPSILON);
            p.opacity = (self.cfg.base_opacity + shimmer + boost * self.cfg.influence_opacity).clamp(0.0, 1.0);
        }
    }

    fn draw(&self, surface: &mut dyn Surface) {
        let threshold = self.cfg.spacing * self.cfg.connect_factor;

        // Right and below neighbours only: one pass over the lattice
        for p in &self.points {
            let neighbours = [self.at(p.row, p.col + 1), self.at(p.row + 1, p.col)];
            for q in neighbours.into_iter().flatten() {
                if distance((p.x, p.y), (q.x, q.y)) >= threshold { continue; }
                let a = p.color();
                let b = q.color();
                surface.stroke_segment(
                    (p.x, p.y),
                    (q.x, q.y),
                    EDGE_WIDTH,
                    a.with_alpha(a.a * EDGE_ALPHA),
                    b.with_alpha(b.a * EDGE_ALPHA),
                );
            }
        }

        for p in &self.points {
            surface.fill_circle(p.x, p.y, p.size, p.color());
        }
    }

    fn population(&self) -> usize {
        self.points.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Raster;

    fn grid(w: f32, h: f32) -> WaveGrid {
        let mut g = WaveGrid::new(GridConfig::default(), 42);
        g.init(&Viewport::new(w, h, 1.0));
        g
    }

    #[test]
    fn lattice_has_explicit_rows_and_cols() {
        let g = grid(600.0, 600.0);
        assert_eq!(g.dimensions(), (10, 10));
        assert_eq!(g.population(), 100);
        for (i, p) in g.points().iter().enumerate() {
            assert_eq!((p.row, p.col), (i / 10, i % 10));
            assert_eq!(p.y, p.original_y);
        }
        assert_eq!(g.points()[0].x, 30.0);
        assert_eq!(g.points()[1].x - g.points()[0].x, 60.0);
    }

    #[test]
    fn degenerate_viewport_builds_nothing() {
        let g = grid(0.0, 600.0);
        assert_eq!(g.population(), 0);
        let g = grid(30.0, 600.0);
        assert_eq!(g.population(), 0);
    }

    #[test]
    fn cursor_pushes_down_only() {
        let g = grid(600.0, 600.0);
        assert_eq!(g.cursor_influence((0.0, 0.0), None), 0.0);
        assert_eq!(g.cursor_influence((0.0, 0.0), Some((1000.0, 1000.0))), 0.0);
        let near = g.cursor_influence((0.0, 0.0), Some((0.0, 0.0)));
        assert!((near - 25.0).abs() < 1e-6);
    }

    #[test]
    fn clamp_bounces_back() {
        let mut p = GridPoint {
            row: 0, col: 0, x: 0.0, y: 0.0, original_y: 0.0, size: 1.0, hue: 0.0,
            opacity: 1.0, velocity: 50.0, max_displacement: 10.0,
        };
        p.step(0.0, 0.0, 1.0, 1.0);
        assert_eq!(p.y, 10.0);
        assert_eq!(p.velocity, -25.0);
    }

    #[test]
    fn cursor_dents_the_lattice() {
        let mut g = grid(600.0, 600.0);
        let cursor = Input::at(270.0, 270.0);
        for _ in 0..60 {
            g.tick(16.67, &cursor);
        }
        // point at (270, 270) sits right under the cursor
        let p = g.points().iter().find(|p| p.row == 4 && p.col == 4).unwrap();
        assert!(p.y - p.original_y > 15.0, "displacement {}", p.y - p.original_y);
        assert!(p.opacity > 0.5);
    }

    #[test]
    fn resize_regenerates_lattice() {
        let mut g = grid(600.0, 600.0);
        g.tick(16.67, &Input::at(300.0, 300.0));
        g.init(&Viewport::new(300.0, 120.0, 1.0));
        assert_eq!(g.dimensions(), (5, 2));
        assert!(g.points().iter().all(|p| p.velocity == 0.0 && p.y == p.original_y));
    }

    #[test]
    fn stretched_edges_are_skipped() {
        let v = Viewport::new(120.0, 120.0, 1.0);
        let draw_with_offset = |dy: f32| {
            let mut g = grid(120.0, 120.0);
            // right neighbour of (30, 30), pulled down
            g.points[1].y += dy;
            let mut r = Raster::new(&v);
            g.draw(&mut r);
            r
        };

        // 60 x 60 apart: inside 1.5 x spacing, drawn
        let r = draw_with_offset(60.0);
        assert!(r.pixel(60, 60).unwrap()[3] > 0);

        // 60 x 70 apart: past the threshold, no edge anywhere along it
        let r = draw_with_offset(70.0);
        assert_eq!(r.pixel(60, 65).unwrap()[3], 0);
        assert_eq!(r.pixel(45, 47).unwrap()[3], 0);
        assert_eq!(r.pixel(60, 30).unwrap()[3], 0);
    }

    #[test]
    fn draws_points_and_edges() {
        let g = grid(120.0, 120.0);
        let v = Viewport::new(120.0, 120.0, 1.0);
        let mut r = Raster::new(&v);
        g.draw(&mut r);
        // midpoint of the top edge between (30,30) and (90,30)
        assert!(r.pixel(60, 30).unwrap()[3] > 0);
        assert!(r.pixel(30, 30).unwrap()[3] > 0);
        // no diagonal edges
        assert_eq!(r.pixel(60, 60).unwrap()[3], 0);
    }
}
