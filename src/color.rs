// color.rs - Color values and palette
//
// Channels are kept as f32 in 0..255 so gradients can interpolate without
// rounding; alpha is 0..1 to match canvas `rgba()` strings.

use serde::Deserialize;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba { r: 0.0, g: 0.0, b: 0.0, a: 0.0 };
    pub const WHITE: Rgba = Rgba { r: 255.0, g: 255.0, b: 255.0, a: 1.0 };

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r: r as f32, g: g as f32, b: b as f32, a: 1.0 }
    }

    /// Parse `#rrggbb`; anything else yields `None`
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#')?;
        if hex.len() != 6 { return None; }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    /// HSL with hue in degrees, saturation and lightness in 0..1
    pub fn hsl(h: f32, s: f32, l: f32, a: f32) -> Self {
        let (r, g, b) = hsl_to_rgb(h, s, l);
        Self { r, g, b, a }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a: a.clamp(0.0, 1.0), ..self }
    }

    pub fn lerp(self, other: Rgba, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
            a: self.a + (other.a - self.a) * t,
        }
    }

    pub fn to_rgba8(self) -> [u8; 4] {
        [
            self.r.clamp(0.0, 255.0) as u8,
            self.g.clamp(0.0, 255.0) as u8,
            self.b.clamp(0.0, 255.0) as u8,
            (self.a.clamp(0.0, 1.0) * 255.0).round() as u8,
        ]
    }

    pub fn to_css(self) -> String {
        let [r, g, b, _] = self.to_rgba8();
        format!("rgba({}, {}, {}, {:.3})", r, g, b, self.a.clamp(0.0, 1.0))
    }
}

/// HSL to RGB, channels returned in 0..255
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> (f32, f32, f32) {
    let h = h.rem_euclid(360.0) / 60.0;
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);

    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let m = l - c * 0.5;

    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    ((r + m) * 255.0, (g + m) * 255.0, (b + m) * 255.0)
}

/// Named accent colors. Resolved to an `Rgba` once, when an entity is built.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tint {
    Ice,
    Violet,
    Teal,
    Amber,
    Rose,
}

impl Tint {
    pub const ALL: [Tint; 5] = [Tint::Ice, Tint::Violet, Tint::Teal, Tint::Amber, Tint::Rose];

    pub fn rgba(self) -> Rgba {
        match self {
            Tint::Ice => Rgba::rgb(186, 214, 255),
            Tint::Violet => Rgba::rgb(167, 139, 250),
            Tint::Teal => Rgba::rgb(94, 234, 212),
            Tint::Amber => Rgba::rgb(252, 211, 77),
            Tint::Rose => Rgba::rgb(251, 113, 133),
        }
    }

    /// Pick uniformly from a configured palette, falling back to `Ice`
    pub fn pick(palette: &[Tint], roll: f32) -> Tint {
        if palette.is_empty() { return Tint::Ice; }
        let i = ((roll.clamp(0.0, 0.999_999)) * palette.len() as f32) as usize;
        palette[i.min(palette.len() - 1)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hsl_primaries() {
        let (r, g, b) = hsl_to_rgb(0.0, 1.0, 0.5);
        assert!((r - 255.0).abs() < 0.01 && g.abs() < 0.01 && b.abs() < 0.01);
        let (r, g, b) = hsl_to_rgb(240.0, 1.0, 0.5);
        assert!(r.abs() < 0.01 && g.abs() < 0.01 && (b - 255.0).abs() < 0.01);
        // negative hues wrap
        assert_eq!(hsl_to_rgb(-120.0, 1.0, 0.5), hsl_to_rgb(240.0, 1.0, 0.5));
    }

    #[test]
    fn hex_parsing() {
        assert_eq!(Rgba::from_hex("#05060a"), Some(Rgba::rgb(5, 6, 10)));
        assert_eq!(Rgba::from_hex("05060a"), None);
        assert_eq!(Rgba::from_hex("#zz0000"), None);
    }

    #[test]
    fn css_string() {
        assert_eq!(Rgba::rgb(1, 2, 3).with_alpha(0.5).to_css(), "rgba(1, 2, 3, 0.500)");
    }

    #[test]
    fn pick_stays_in_palette() {
        assert_eq!(Tint::pick(&[], 0.4), Tint::Ice);
        assert_eq!(Tint::pick(&Tint::ALL, 1.0), Tint::Rose);
        assert_eq!(Tint::pick(&Tint::ALL, 0.0), Tint::Ice);
    }
}
