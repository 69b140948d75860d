// field.rs - Static background field
//
// Painted once per resize: base radial gradient, vignette on top, then a
// faint per-pixel noise texture. Pure function of size (and the noise seed).

use rand::Rng;

use crate::color::Rgba;
use crate::config::FieldConfig;
use crate::render::buffer_len;
use crate::surface::{Gradient, Surface};
use crate::viewport::Viewport;

pub fn paint_field<R: Rng>(surface: &mut dyn Surface, viewport: &Viewport, cfg: &FieldConfig, rng: &mut R) {
    if viewport.is_degenerate() { return; }

    surface.clear();

    let (cx, cy) = viewport.center();
    let reach = viewport.half_diagonal();

    // Base: light center falling off to near black
    let base = Gradient::radial(cx, cy * 0.8, 0.0, reach)
        .stop(0.0, cfg.center_rgba())
        .stop(1.0, cfg.edge_rgba());
    surface.fill_gradient(&base);

    // Vignette: clear in the middle, darkening toward the corners
    let dark = Rgba::rgb(0, 0, 0);
    let vignette = Gradient::radial(cx, cy, reach * 0.35, reach)
        .stop(0.0, dark.with_alpha(0.0))
        .stop(1.0, dark.with_alpha(cfg.vignette));
    surface.fill_gradient(&vignette);

    let noise = noise_buffer(viewport.physical_width(), viewport.physical_height(), cfg.noise_alpha, rng);
    surface.overlay_rgba(&noise, viewport.physical_width(), viewport.physical_height());
}

/// White noise with per-pixel random alpha in [0, max_alpha]
pub fn noise_buffer<R: Rng>(w: u32, h: u32, max_alpha: f32, rng: &mut R) -> Vec<u8> {
    let ceiling = (max_alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
    let mut buf = vec![0u8; buffer_len(w, h)];
    if ceiling == 0 { return buf; }

    for px in buf.chunks_exact_mut(4) {
        let v: u8 = rng.r#gen();
        px[0] = v;
        px[1] = v;
        px[2] = v;
        px[3] = rng.gen_range(0..=ceiling);
    }
    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Raster;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn noise_alpha_stays_faint() {
        let mut rng = SmallRng::seed_from_u64(1);
        let buf = noise_buffer(16, 16, 0.03, &mut rng);
        assert_eq!(buf.len(), 16 * 16 * 4);
        assert!(buf.chunks_exact(4).all(|p| p[3] <= 8));
        assert!(buf.chunks_exact(4).any(|p| p[3] > 0));
    }

    #[test]
    fn center_is_lighter_than_corner() {
        let v = Viewport::new(200.0, 120.0, 1.0);
        let mut r = Raster::new(&v);
        let mut rng = SmallRng::seed_from_u64(2);
        paint_field(&mut r, &v, &FieldConfig::default(), &mut rng);

        let c = r.pixel(100, 48).unwrap();
        let k = r.pixel(0, 0).unwrap();
        assert_eq!(c[3], 255);
        assert!(c[0] as u32 + c[1] as u32 + c[2] as u32 > k[0] as u32 + k[1] as u32 + k[2] as u32);
    }

    #[test]
    fn same_seed_same_pixels() {
        let v = Viewport::new(40.0, 30.0, 2.0);
        let paint = |seed| {
            let mut r = Raster::new(&v);
            paint_field(&mut r, &v, &FieldConfig::default(), &mut SmallRng::seed_from_u64(seed));
            r.into_pixels()
        };
        assert_eq!(paint(9), paint(9));
    }

    #[test]
    fn degenerate_surface_is_left_alone() {
        let v = Viewport::new(0.0, 0.0, 1.0);
        let mut r = Raster::new(&v);
        paint_field(&mut r, &v, &FieldConfig::default(), &mut SmallRng::seed_from_u64(3));
        assert!(r.is_empty());
    }
}
