// stars.rs - Slow star field with its own sky
//
// Population is fixed at build time (one star per `area_per_star`). Stars
// drift straight down and wrap to the top at a new x; their parameters never
// change once rolled. Twinkle walks opacity up and down, turning around at
// bounds that are re-rolled every tick.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::{Input, Simulation, between, frames};
use crate::color::{Rgba, Tint};
use crate::config::StarConfig;
use crate::surface::{Gradient, Surface};
use crate::viewport::Viewport;

/// Width of the re-rolled turnaround windows inside [floor, ceiling]
const LOW_WINDOW: f32 = 0.15;
const HIGH_WINDOW: f32 = 0.35;
const GLOW_SCALE: f32 = 3.0;
const GLOW_ALPHA: f32 = 0.15;

#[derive(Clone, Debug, PartialEq)]
pub struct Star {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub color: Rgba,
    pub tinted: bool,
    /// px per 60 Hz frame
    pub speed: f32,
    pub opacity: f32,
    pub twinkle_speed: f32,
    /// true = brightening
    pub twinkle_up: bool,
}

impl Star {
    /// One twinkle step; `low`/`high` are this tick's turnaround bounds
    pub fn twinkle(&mut self, low: f32, high: f32) {
        if self.twinkle_up {
            self.opacity += self.twinkle_speed;
            if self.opacity > high {
                self.twinkle_up = false;
            }
        } else {
            self.opacity -= self.twinkle_speed;
            if self.opacity < low {
                self.twinkle_up = true;
            }
        }
    }
}

pub struct StarField {
    cfg: StarConfig,
    stars: Vec<Star>,
    width: f32,
    height: f32,
    sky: Option<Gradient>,
    rng: SmallRng,
}

impl StarField {
    pub fn new(cfg: StarConfig, seed: u64) -> Self {
        Self {
            cfg,
            stars: Vec::new(),
            width: 0.0,
            height: 0.0,
            sky: None,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    fn roll(&mut self) -> Star {
        let cfg = &self.cfg;
        let rng = &mut self.rng;
        let radius = between(rng, cfg.radius_min, cfg.radius_max);

        // Bigger stars are the ones that get color
        let chance = if radius > cfg.featured_radius { cfg.featured_tint_chance } else { cfg.tint_chance };
        let tinted = rng.r#gen::<f32>() < chance;
        let color = if tinted { Tint::pick(&cfg.palette, rng.r#gen()).rgba() } else { Rgba::WHITE };

        Star {
            x: rng.r#gen::<f32>() * self.width,
            y: rng.r#gen::<f32>() * self.height,
            radius,
            color,
            tinted,
            speed: between(rng, cfg.drift_min, cfg.drift_max),
            opacity: between(rng, cfg.floor, cfg.ceiling),
            twinkle_speed: between(rng, cfg.twinkle_min, cfg.twinkle_max),
            twinkle_up: rng.gen_bool(0.5),
        }
    }
}

impl Simulation for StarField {
    fn init(&mut self, viewport: &Viewport) {
        self.stars.clear();
        self.sky = None;
        self.width = viewport.width;
        self.height = viewport.height;
        if viewport.is_degenerate() { return; }

        let count = viewport.population(self.cfg.area_per_star, usize::MAX);
        for _ in 0..count {
            let s = self.roll();
            self.stars.push(s);
        }

        let top = Rgba::from_hex(&self.cfg.sky_top).unwrap_or(Rgba::rgb(4, 5, 11));
        let bottom = Rgba::from_hex(&self.cfg.sky_bottom).unwrap_or(Rgba::rgb(17, 21, 39));
        self.sky = Some(
            Gradient::linear(0.0, 0.0, 0.0, self.height)
                .stop(0.0, top)
                .stop(1.0, bottom),
        );
    }

    fn tick(&mut self, dt_ms: f32, _input: &Input) {
        if self.stars.is_empty() { return; }
        let f = frames(dt_ms);
        let (floor, ceiling) = (self.cfg.floor, self.cfg.ceiling);

        for s in &mut self.stars {
            s.y += s.speed * f;
            if s.y > self.height {
                s.y = 0.0;
                s.x = self.rng.r#gen::<f32>() * self.width;
            }

            let low = between(&mut self.rng, floor, (floor + LOW_WINDOW).min(ceiling));
            let high = between(&mut self.rng, (ceiling - HIGH_WINDOW).max(floor), ceiling);
            s.twinkle(low, high);
        }
    }

    fn draw(&self, surface: &mut dyn Surface) {
        if let Some(sky) = &self.sky {
            surface.fill_gradient(sky);
        }
        for s in &self.stars {
            let alpha = s.opacity.clamp(0.0, 1.0);
            if s.tinted {
                surface.fill_circle(s.x, s.y, s.radius * GLOW_SCALE, s.color.with_alpha(alpha * GLOW_ALPHA));
            }
            surface.fill_circle(s.x, s.y, s.radius, s.color.with_alpha(alpha));
        }
    }

    fn population(&self) -> usize {
        self.stars.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(w: f32, h: f32, seed: u64) -> StarField {
        let mut f = StarField::new(StarConfig::default(), seed);
        f.init(&Viewport::new(w, h, 1.0));
        f
    }

    #[test]
    fn count_is_area_over_twenty_thousand() {
        assert_eq!(field(400.0, 400.0, 1).population(), 8);
        assert_eq!(field(1920.0, 1080.0, 1).population(), 103);
        assert_eq!(field(100.0, 100.0, 1).population(), 0);
    }

    #[test]
    fn opacity_stays_in_band() {
        let cfg = StarConfig::default();
        let (lo, hi) = cfg.band();
        let mut f = field(1600.0, 1200.0, 7);
        for _ in 0..5000 {
            f.tick(16.67, &Input::idle());
            for s in f.stars() {
                assert!(s.opacity >= lo && s.opacity <= hi, "opacity {}", s.opacity);
            }
        }
    }

    #[test]
    fn stars_wrap_to_top() {
        let mut f = field(800.0, 400.0, 2);
        let before: Vec<(f32, f32, f32)> = f.stars().iter().map(|s| (s.radius, s.speed, s.twinkle_speed)).collect();
        // 100 ms steps, 0.05 px/frame minimum: several screen heights
        for _ in 0..20_000 {
            f.tick(100.0, &Input::idle());
            for s in f.stars() {
                assert!(s.y >= 0.0 && s.y <= 400.0);
                assert!(s.x >= 0.0 && s.x <= 800.0);
            }
        }
        let after: Vec<(f32, f32, f32)> = f.stars().iter().map(|s| (s.radius, s.speed, s.twinkle_speed)).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn twinkle_turns_around() {
        let mut s = field(400.0, 400.0, 1).stars()[0].clone();
        s.opacity = 0.5;
        s.twinkle_speed = 0.1;
        s.twinkle_up = true;
        s.twinkle(0.35, 0.55);
        assert!(!s.twinkle_up);
        // 0.6 -> 0.5 -> 0.4 -> 0.3, below the low bound
        s.twinkle(0.35, 0.55);
        s.twinkle(0.35, 0.55);
        assert!(!s.twinkle_up);
        s.twinkle(0.35, 0.55);
        assert!(s.twinkle_up);
    }

    #[test]
    fn tinted_stars_lean_large() {
        let mut f = StarField::new(StarConfig::default(), 13);
        f.init(&Viewport::new(8000.0, 8000.0, 1.0));
        let (big, small): (Vec<&Star>, Vec<&Star>) = f.stars().iter().partition(|s| s.radius > 1.3);
        let rate = |v: &[&Star]| v.iter().filter(|s| s.tinted).count() as f32 / v.len() as f32;
        assert!(rate(&big) > rate(&small) * 3.0);
    }
}
