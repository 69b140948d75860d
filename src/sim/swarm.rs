// swarm.rs - Short-lived ambient particles
//
// Fixed-size population. Each particle fades in, drifts, bounces off the
// edges and fades out to nothing at its max life; the next tick it is replaced
// by a freshly rolled one in the same slot, so the count never changes.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::spatial::SpatialHash;
use super::{Input, Simulation, between, frames, repulsion};
use crate::color::{Rgba, Tint};
use crate::config::SwarmConfig;
use crate::surface::Surface;
use crate::viewport::Viewport;

const LINK_ALPHA: f32 = 0.25;
const LINK_WIDTH: f32 = 0.6;

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub radius: f32,
    pub color: Rgba,
    pub opacity: f32,
    /// Ticks lived
    pub life: u32,
    pub max_life: u32,
}

impl Particle {
    /// Envelope: ramp up over the first `fade` ticks, down over the last `fade`
    pub fn envelope(&self, fade: u32) -> f32 {
        if fade == 0 { return 1.0; }
        let fade_in = self.life as f32 / fade as f32;
        let fade_out = self.max_life.saturating_sub(self.life) as f32 / fade as f32;
        fade_in.min(fade_out).clamp(0.0, 1.0)
    }

    /// Reflect velocity at the edges; position is pulled back inside
    pub fn bounce(&mut self, width: f32, height: f32) {
        if self.x < 0.0 {
            self.x = 0.0;
            self.vx = self.vx.abs();
        } else if self.x > width {
            self.x = width;
            self.vx = -self.vx.abs();
        }
        if self.y < 0.0 {
            self.y = 0.0;
            self.vy = self.vy.abs();
        } else if self.y > height {
            self.y = height;
            self.vy = -self.vy.abs();
        }
    }
}

pub struct Swarm {
    cfg: SwarmConfig,
    particles: Vec<Particle>,
    width: f32,
    height: f32,
    rng: SmallRng,
}

impl Swarm {
    pub fn new(cfg: SwarmConfig, seed: u64) -> Self {
        Self {
            cfg,
            particles: Vec::new(),
            width: 0.0,
            height: 0.0,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    fn fresh(&mut self) -> Particle {
        let cfg = &self.cfg;
        let rng = &mut self.rng;
        let lo = cfg.life_min.min(cfg.life_max);
        let hi = cfg.life_min.max(cfg.life_max).max(1);
        Particle {
            x: rng.r#gen::<f32>() * self.width,
            y: rng.r#gen::<f32>() * self.height,
            vx: between(rng, -cfg.speed, cfg.speed),
            vy: between(rng, -cfg.speed, cfg.speed),
            radius: between(rng, cfg.radius_min, cfg.radius_max),
            color: Tint::pick(&cfg.palette, rng.r#gen()).rgba(),
            opacity: 0.0,
            life: 0,
            max_life: rng.gen_range(lo.max(1)..=hi),
        }
    }
}

impl Simulation for Swarm {
    fn init(&mut self, viewport: &Viewport) {
        self.particles.clear();
        self.width = viewport.width;
        self.height = viewport.height;
        if viewport.is_degenerate() { return; }

        let count = self.cfg.count
            .unwrap_or_else(|| viewport.population(self.cfg.area_per_particle, self.cfg.max_particles));
        for _ in 0..count {
            let mut p = self.fresh();
            // stagger so the first generation does not fade out in lockstep
            p.life = self.rng.gen_range(0..p.max_life);
            self.particles.push(p);
        }
    }

    fn tick(&mut self, dt_ms: f32, input: &Input) {
        if self.width < 1.0 || self.height < 1.0 { return; }
        let f = frames(dt_ms);

        for i in 0..self.particles.len() {
            // drawn once at max life with zero opacity, then swapped out
            if self.particles[i].life >= self.particles[i].max_life {
                self.particles[i] = self.fresh();
                continue;
            }

            let p = &mut self.particles[i];
            p.life += 1;

            let (rx, ry) = repulsion((p.x, p.y), input.cursor, self.cfg.repel_radius);
            p.x += (p.vx + rx * self.cfg.repel_strength) * f;
            p.y += (p.vy + ry * self.cfg.repel_strength) * f;
            p.bounce(self.width, self.height);

            p.opacity = self.cfg.opacity * p.envelope(self.cfg.fade_ticks);
        }
    }

    fn draw(&self, surface: &mut dyn Surface) {
        let reach = self.cfg.connect_distance;
        if reach > 0.0 && self.particles.len() > 1 {
            let points: Vec<(f32, f32)> = self.particles.iter().map(|p| (p.x, p.y)).collect();
            let mut hash = SpatialHash::new(reach);
            hash.rebuild(&points);
            hash.for_each_pair(&points, reach, |i, j, d| {
                let (a, b) = (&self.particles[i], &self.particles[j]);
                let alpha = (1.0 - d / reach) * LINK_ALPHA * a.opacity.min(b.opacity);
                if alpha <= 0.0 { return; }
                surface.stroke_segment(
                    (a.x, a.y),
                    (b.x, b.y),
                    LINK_WIDTH,
                    a.color.with_alpha(alpha),
                    b.color.with_alpha(alpha),
                );
            });
        }

        for p in &self.particles {
            if p.opacity <= 0.0 { continue; }
            surface.fill_circle(p.x, p.y, p.radius, p.color.with_alpha(p.opacity));
        }
    }

    fn population(&self) -> usize {
        self.particles.len()
    }
}
