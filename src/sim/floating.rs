// floating.rs - Drifting depth-layered particles
//
// Ambient atmosphere: particles wander on a heading with a small vertical
// oscillation, shy away from the cursor and wrap at the edges. Moving the
// pointer occasionally drops a short-lived trail particle.

use std::f32::consts::TAU;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::spatial::SpatialHash;
use super::{Input, Simulation, between, repulsion};
use crate::color::{Rgba, Tint};
use crate::config::FloatingConfig;
use crate::surface::Surface;
use crate::viewport::Viewport;

const OPACITY_NEAR: f32 = 0.75;
const OPACITY_FAR: f32 = 0.15;
const LINK_ALPHA: f32 = 0.18;
const LINK_WIDTH: f32 = 0.5;

#[derive(Clone, Debug, PartialEq)]
pub struct FloatingParticle {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub tint: Tint,
    pub color: Rgba,
    /// px per second along the heading
    pub speed: f32,
    pub heading: f32,
    pub osc_speed: f32,
    pub osc_distance: f32,
    pub phase: f32,
    /// 0 = far, 1 = near
    pub depth: f32,
    pub opacity: f32,
    /// Seconds left for trail particles; resident particles live forever
    pub ttl: Option<f32>,
    pub lifespan: f32,
}

impl FloatingParticle {
    /// Keep inside [-2r, extent + 2r] by jumping to the opposite edge
    pub fn wrap(&mut self, width: f32, height: f32) {
        let margin = self.radius * 2.0;
        if self.x < -margin {
            self.x = width + margin;
        } else if self.x > width + margin {
            self.x = -margin;
        }
        if self.y < -margin {
            self.y = height + margin;
        } else if self.y > height + margin {
            self.y = -margin;
        }
    }

    /// Opacity after trail fade-out
    pub fn visible_opacity(&self) -> f32 {
        match self.ttl {
            Some(t) if self.lifespan > 0.0 => self.opacity * (t / self.lifespan).clamp(0.0, 1.0),
            _ => self.opacity,
        }
    }
}

pub struct FloatingField {
    cfg: FloatingConfig,
    particles: Vec<FloatingParticle>,
    width: f32,
    height: f32,
    rng: SmallRng,
}

impl FloatingField {
    pub fn new(cfg: FloatingConfig, seed: u64) -> Self {
        Self {
            cfg,
            particles: Vec::new(),
            width: 0.0,
            height: 0.0,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn particles(&self) -> &[FloatingParticle] {
        &self.particles
    }

    pub fn trail_count(&self) -> usize {
        self.particles.iter().filter(|p| p.ttl.is_some()).count()
    }

    fn spawn(&mut self, x: f32, y: f32, ttl: Option<f32>) -> FloatingParticle {
        let cfg = &self.cfg;
        let rng = &mut self.rng;
        let depth: f32 = rng.r#gen();
        let tint = Tint::pick(&cfg.palette, rng.r#gen());
        FloatingParticle {
            x,
            y,
            radius: cfg.radius_min + (cfg.radius_max - cfg.radius_min) * depth,
            tint,
            color: tint.rgba(),
            // nearer particles move a little faster
            speed: between(rng, cfg.speed_min, cfg.speed_max) * (0.6 + 0.4 * depth),
            heading: rng.r#gen::<f32>() * TAU,
            osc_speed: between(rng, cfg.osc_speed_min, cfg.osc_speed_max),
            osc_distance: between(rng, cfg.osc_distance_min, cfg.osc_distance_max),
            phase: rng.r#gen::<f32>() * TAU,
            depth,
            opacity: OPACITY_FAR + (OPACITY_NEAR - OPACITY_FAR) * depth,
            ttl,
            lifespan: ttl.unwrap_or(0.0),
        }
    }

    fn maybe_spawn_trail(&mut self, input: &Input) {
        let Some((x, y)) = input.cursor else { return };
        if !input.moved || self.trail_count() >= self.cfg.max_trail { return; }
        if self.rng.r#gen::<f32>() >= self.cfg.trail_chance { return; }
        let p = self.spawn(x, y, Some(self.cfg.trail_lifespan));
        self.particles.push(p);
    }
}

impl Simulation for FloatingField {
    fn init(&mut self, viewport: &Viewport) {
        self.particles.clear();
        self.width = viewport.width;
        self.height = viewport.height;

        let count = viewport.population(self.cfg.area_per_particle, self.cfg.max_particles);
        for _ in 0..count {
            let x = self.rng.r#gen::<f32>() * self.width;
            let y = self.rng.r#gen::<f32>() * self.height;
            let p = self.spawn(x, y, None);
            self.particles.push(p);
        }
    }

    fn tick(&mut self, dt_ms: f32, input: &Input) {
        if self.width < 1.0 || self.height < 1.0 { return; }
        let dt = dt_ms / 1000.0;

        self.maybe_spawn_trail(input);

        let turn_chance = self.cfg.turn_rate * dt;
        for p in &mut self.particles {
            if self.rng.r#gen::<f32>() < turn_chance {
                let j = self.cfg.turn_jitter;
                p.heading += between(&mut self.rng, -j, j);
            }

            p.phase += p.osc_speed * dt;
            p.x += p.heading.cos() * p.speed * dt;
            // derivative of osc_distance * sin(phase): bounded bob around the path
            p.y += p.heading.sin() * p.speed * dt + p.phase.cos() * p.osc_distance * p.osc_speed * dt;

            let (rx, ry) = repulsion((p.x, p.y), input.cursor, self.cfg.repel_radius);
            let push = self.cfg.repel_strength * dt * (0.5 + p.depth);
            p.x += rx * push;
            p.y += ry * push;

            if let Some(t) = p.ttl.as_mut() {
                *t -= dt;
            }

            p.wrap(self.width, self.height);
        }

        self.particles.retain(|p| p.ttl.is_none_or(|t| t > 0.0));
    }

    fn draw(&self, surface: &mut dyn Surface) {
        let link = self.cfg.link_distance;
        if link > 0.0 && self.particles.len() > 1 {
            let points: Vec<(f32, f32)> = self.particles.iter().map(|p| (p.x, p.y)).collect();
            let mut hash = SpatialHash::new(link);
            hash.rebuild(&points);
            hash.for_each_pair(&points, link, |i, j, d| {
                let (a, b) = (&self.particles[i], &self.particles[j]);
                let alpha = (1.0 - d / link) * LINK_ALPHA * a.visible_opacity().min(b.visible_opacity());
                surface.stroke_segment(
                    (a.x, a.y),
                    (b.x, b.y),
                    LINK_WIDTH,
                    a.color.with_alpha(alpha),
                    b.color.with_alpha(alpha),
                );
            });
        }

        // far first so near particles paint over them
        let mut order: Vec<usize> = (0..self.particles.len()).collect();
        order.sort_unstable_by(|&a, &b| self.particles[a].depth.total_cmp(&self.particles[b].depth));
        for i in order {
            let p = &self.particles[i];
            surface.fill_circle(p.x, p.y, p.radius, p.color.with_alpha(p.visible_opacity()));
        }
    }

    fn population(&self) -> usize {
        self.particles.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(w: f32, h: f32, seed: u64) -> FloatingField {
        let mut f = FloatingField::new(FloatingConfig::default(), seed);
        f.init(&Viewport::new(w, h, 1.0));
        f
    }

    #[test]
    fn population_follows_area() {
        assert_eq!(field(600.0, 400.0, 1).population(), 20);
        assert_eq!(field(4000.0, 4000.0, 1).population(), 120);
        assert_eq!(field(0.0, 400.0, 1).population(), 0);
    }

    #[test]
    fn size_and_opacity_grow_with_depth() {
        let f = field(1200.0, 800.0, 3);
        let mut ps = f.particles().to_vec();
        ps.sort_by(|a, b| a.depth.total_cmp(&b.depth));
        for w in ps.windows(2) {
            assert!(w[0].radius <= w[1].radius);
            assert!(w[0].opacity <= w[1].opacity);
        }
    }

    #[test]
    fn wrap_keeps_extended_bounds() {
        let mut f = field(500.0, 300.0, 8);
        let mut rng = SmallRng::seed_from_u64(99);
        for _ in 0..2000 {
            let cursor = (rng.gen_range(-50.0..550.0), rng.gen_range(-50.0..350.0));
            f.tick(rng.gen_range(0.0..100.0), &Input::moved_to(cursor.0, cursor.1));
            for p in f.particles() {
                let m = 2.0 * p.radius;
                assert!(p.x >= -m && p.x <= 500.0 + m, "x {} r {}", p.x, p.radius);
                assert!(p.y >= -m && p.y <= 300.0 + m, "y {} r {}", p.y, p.radius);
            }
        }
    }

    #[test]
    fn wrap_jumps_to_opposite_edge() {
        let mut p = field(100.0, 100.0, 1).particles()[0].clone();
        p.radius = 2.0;
        p.x = -4.5;
        p.y = 104.5;
        p.wrap(100.0, 100.0);
        assert_eq!((p.x, p.y), (104.0, -4.0));
    }

    #[test]
    fn trails_expire_and_are_capped() {
        let mut f = field(600.0, 400.0, 5);
        let base = f.population();
        for i in 0..500 {
            f.tick(16.0, &Input::moved_to(300.0 + i as f32 * 0.1, 200.0));
            assert!(f.trail_count() <= 40);
        }
        assert!(f.trail_count() > 0);

        // 1.5 s lifespan: two idle seconds clear every trail
        for _ in 0..125 {
            f.tick(16.0, &Input::idle());
        }
        assert_eq!(f.trail_count(), 0);
        assert_eq!(f.population(), base);
    }

    #[test]
    fn still_pointer_spawns_nothing() {
        let mut f = field(600.0, 400.0, 5);
        for _ in 0..200 {
            f.tick(16.0, &Input::at(300.0, 200.0));
        }
        assert_eq!(f.trail_count(), 0);
    }

    #[test]
    fn cursor_repels() {
        let mut f = FloatingField::new(FloatingConfig { speed_min: 0.0, speed_max: 0.0, osc_distance_min: 0.0, osc_distance_max: 0.0, ..FloatingConfig::default() }, 2);
        f.init(&Viewport::new(600.0, 400.0, 1.0));
        let p0 = f.particles()[0].clone();
        // cursor on the side with more room, so the push never wraps
        let side = if p0.x > 300.0 { 1.0 } else { -1.0 };
        f.tick(50.0, &Input::at(p0.x + side * 20.0, p0.y));
        assert!((f.particles()[0].x - p0.x) * side < 0.0);
    }
}
