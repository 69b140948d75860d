// config.rs - Tuning for every layer
//
// Defaults are the tuned look. Hosts override any subset with JSON; missing
// fields keep their defaults.

use serde::Deserialize;

use crate::color::{Rgba, Tint};
use crate::error::Result;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    Grid,
    Floating,
    Swarm,
    Stars,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Fixed seed for reproducible output; `None` seeds from the host clock
    pub seed: Option<u64>,
    /// Layers in draw order, bottom first
    pub layers: Vec<LayerKind>,
    pub field: FieldConfig,
    pub grid: GridConfig,
    pub floating: FloatingConfig,
    pub swarm: SwarmConfig,
    pub stars: StarConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: None,
            layers: vec![LayerKind::Grid, LayerKind::Swarm, LayerKind::Floating],
            field: FieldConfig::default(),
            grid: GridConfig::default(),
            floating: FloatingConfig::default(),
            swarm: SwarmConfig::default(),
            stars: StarConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// `#rrggbb`
    pub center: String,
    pub edge: String,
    /// Darkening applied at the corners by the vignette pass
    pub vignette: f32,
    /// Largest per-pixel noise alpha, in 0..1
    pub noise_alpha: f32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            center: "#2a2f45".into(),
            edge: "#05060a".into(),
            vignette: 0.6,
            noise_alpha: 0.03,
        }
    }
}

impl FieldConfig {
    pub fn center_rgba(&self) -> Rgba {
        Rgba::from_hex(&self.center).unwrap_or(Rgba::rgb(42, 47, 69))
    }

    pub fn edge_rgba(&self) -> Rgba {
        Rgba::from_hex(&self.edge).unwrap_or(Rgba::rgb(5, 6, 10))
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub spacing: f32,
    pub amplitude: f32,
    /// Radians per logical pixel along x
    pub frequency: f32,
    pub influence_radius: f32,
    pub influence_strength: f32,
    pub spring: f32,
    pub friction: f32,
    /// Multiplies dt (seconds) so one 60 Hz frame is one spring step
    pub time_scale: f32,
    pub max_displacement: f32,
    /// Edges longer than `spacing * connect_factor` are skipped
    pub connect_factor: f32,
    pub point_size: f32,
    pub hue: f32,
    pub hue_spread: f32,
    pub base_opacity: f32,
    pub jitter: f32,
    pub influence_opacity: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            spacing: 60.0,
            amplitude: 8.0,
            frequency: 0.01,
            influence_radius: 150.0,
            influence_strength: 25.0,
            spring: 0.1,
            friction: 0.9,
            time_scale: 60.0,
            max_displacement: 30.0,
            connect_factor: 1.5,
            point_size: 1.5,
            hue: 200.0,
            hue_spread: 40.0,
            base_opacity: 0.25,
            jitter: 0.1,
            influence_opacity: 0.5,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct FloatingConfig {
    /// Logical px^2 per resident particle
    pub area_per_particle: f32,
    pub max_particles: usize,
    pub speed_min: f32,
    pub speed_max: f32,
    pub radius_min: f32,
    pub radius_max: f32,
    pub osc_speed_min: f32,
    pub osc_speed_max: f32,
    pub osc_distance_min: f32,
    pub osc_distance_max: f32,
    /// Heading changes per second of simulated time
    pub turn_rate: f32,
    pub turn_jitter: f32,
    pub repel_radius: f32,
    pub repel_strength: f32,
    /// Chance a pointer move leaves a trail particle
    pub trail_chance: f32,
    pub trail_lifespan: f32,
    pub max_trail: usize,
    pub link_distance: f32,
    pub palette: Vec<Tint>,
}

impl Default for FloatingConfig {
    fn default() -> Self {
        Self {
            area_per_particle: 12_000.0,
            max_particles: 120,
            speed_min: 10.0,
            speed_max: 30.0,
            radius_min: 1.0,
            radius_max: 3.0,
            osc_speed_min: 0.5,
            osc_speed_max: 2.0,
            osc_distance_min: 5.0,
            osc_distance_max: 20.0,
            turn_rate: 0.5,
            turn_jitter: 0.5,
            repel_radius: 120.0,
            repel_strength: 60.0,
            trail_chance: 0.3,
            trail_lifespan: 1.5,
            max_trail: 40,
            link_distance: 90.0,
            palette: Tint::ALL.to_vec(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SwarmConfig {
    /// Fixed population; overrides the area-based count when set
    pub count: Option<usize>,
    pub area_per_particle: f32,
    pub max_particles: usize,
    /// Lifetime bounds in ticks, inclusive
    pub life_min: u32,
    pub life_max: u32,
    /// px per 60 Hz frame
    pub speed: f32,
    pub radius_min: f32,
    pub radius_max: f32,
    pub fade_ticks: u32,
    pub opacity: f32,
    pub connect_distance: f32,
    pub repel_radius: f32,
    pub repel_strength: f32,
    pub palette: Vec<Tint>,
}

impl Default for SwarmConfig {
    fn default() -> Self {
        Self {
            count: None,
            area_per_particle: 15_000.0,
            max_particles: 80,
            life_min: 50,
            life_max: 250,
            speed: 0.5,
            radius_min: 1.0,
            radius_max: 2.5,
            fade_ticks: 10,
            opacity: 0.7,
            connect_distance: 110.0,
            repel_radius: 100.0,
            repel_strength: 1.5,
            palette: vec![Tint::Ice, Tint::Violet, Tint::Teal],
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct StarConfig {
    pub area_per_star: f32,
    pub radius_min: f32,
    pub radius_max: f32,
    /// px per 60 Hz frame
    pub drift_min: f32,
    pub drift_max: f32,
    /// Opacity change per tick
    pub twinkle_min: f32,
    pub twinkle_max: f32,
    /// Turnaround bounds are re-rolled in [floor, floor + 0.15] and [ceiling - 0.35, ceiling]
    pub floor: f32,
    pub ceiling: f32,
    pub tint_chance: f32,
    /// Tint chance for stars above `featured_radius`
    pub featured_tint_chance: f32,
    pub featured_radius: f32,
    pub palette: Vec<Tint>,
    pub sky_top: String,
    pub sky_bottom: String,
}

impl Default for StarConfig {
    fn default() -> Self {
        Self {
            area_per_star: 20_000.0,
            radius_min: 0.3,
            radius_max: 1.8,
            drift_min: 0.05,
            drift_max: 0.3,
            twinkle_min: 0.003,
            twinkle_max: 0.015,
            floor: 0.15,
            ceiling: 0.85,
            tint_chance: 0.04,
            featured_tint_chance: 0.35,
            featured_radius: 1.3,
            palette: vec![Tint::Ice, Tint::Amber, Tint::Rose],
            sky_top: "#04050b".into(),
            sky_bottom: "#111527".into(),
        }
    }
}

impl StarConfig {
    /// Opacity band no star ever leaves
    pub fn band(&self) -> (f32, f32) {
        (self.floor - self.twinkle_max, self.ceiling + self.twinkle_max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = EngineConfig::from_json(r#"{"seed": 7, "grid": {"spacing": 40}, "layers": ["stars"]}"#).unwrap();
        assert_eq!(cfg.seed, Some(7));
        assert_eq!(cfg.grid.spacing, 40.0);
        assert_eq!(cfg.grid.friction, 0.9);
        assert_eq!(cfg.layers, vec![LayerKind::Stars]);
        assert_eq!(cfg.stars.area_per_star, 20_000.0);
    }

    #[test]
    fn bad_json_is_an_error() {
        assert!(EngineConfig::from_json("{ nope").is_err());
        assert!(EngineConfig::from_json(r#"{"layers": ["lasers"]}"#).is_err());
    }

    #[test]
    fn bad_hex_falls_back() {
        let field = FieldConfig { center: "blue".into(), ..FieldConfig::default() };
        assert_eq!(field.center_rgba(), Rgba::rgb(42, 47, 69));
    }
}
