//! Colour arithmetic for theme palettes

use anyhow::{anyhow, Result};
use std::fmt;
use std::str::FromStr;

/// An opaque sRGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Raise HSL lightness by `amount` (0.0 - 1.0)
    pub fn lighten(self, amount: f64) -> Self {
        let (h, s, l) = self.to_hsl();
        Self::from_hsl(h, s, (l + amount).clamp(0.0, 1.0))
    }

    /// Lower HSL lightness by `amount` (0.0 - 1.0)
    pub fn darken(self, amount: f64) -> Self {
        self.lighten(-amount)
    }

    /// CSS `rgba()` with the given opacity
    pub fn rgba(self, alpha: f64) -> String {
        format!(
            "rgba({},{},{},{})",
            self.r,
            self.g,
            self.b,
            alpha.clamp(0.0, 1.0)
        )
    }

    fn to_hsl(self) -> (f64, f64, f64) {
        let r = self.r as f64 / 255.0;
        let g = self.g as f64 / 255.0;
        let b = self.b as f64 / 255.0;

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;

        if max == min {
            return (0.0, 0.0, l);
        }

        let d = max - min;
        let s = if l > 0.5 {
            d / (2.0 - max - min)
        } else {
            d / (max + min)
        };
        let h = if max == r {
            (g - b) / d + if g < b { 6.0 } else { 0.0 }
        } else if max == g {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        };

        (h / 6.0, s, l)
    }

    fn from_hsl(h: f64, s: f64, l: f64) -> Self {
        if s == 0.0 {
            let v = channel(l);
            return Self::rgb(v, v, v);
        }

        let q = if l < 0.5 {
            l * (1.0 + s)
        } else {
            l + s - l * s
        };
        let p = 2.0 * l - q;

        Self::rgb(
            channel(hue_to_rgb(p, q, h + 1.0 / 3.0)),
            channel(hue_to_rgb(p, q, h)),
            channel(hue_to_rgb(p, q, h - 1.0 / 3.0)),
        )
    }
}

fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

fn channel(v: f64) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

impl FromStr for Color {
    type Err = anyhow::Error;

    /// Parse `#rgb` or `#rrggbb`
    fn from_str(s: &str) -> Result<Self> {
        let hex = s.trim().trim_start_matches('#');
        if !hex.is_ascii() {
            return Err(anyhow!("Invalid colour: {}", s));
        }
        let expanded: String = match hex.len() {
            3 => hex.chars().flat_map(|c| [c, c]).collect(),
            6 => hex.to_string(),
            _ => return Err(anyhow!("Invalid colour: {}", s)),
        };

        let component = |i: usize| {
            u8::from_str_radix(&expanded[i..i + 2], 16).map_err(|_| anyhow!("Invalid colour: {}", s))
        };

        Ok(Self::rgb(component(0)?, component(2)?, component(4)?))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let c: Color = "#CC8B86".parse().unwrap();
        assert_eq!(c, Color::rgb(0xcc, 0x8b, 0x86));
        assert_eq!(c.to_string(), "#cc8b86");

        let short: Color = "#fff".parse().unwrap();
        assert_eq!(short, Color::rgb(255, 255, 255));

        assert!("#12345".parse::<Color>().is_err());
        assert!("#zzzzzz".parse::<Color>().is_err());
    }

    #[test]
    fn test_lighten_and_darken_greys() {
        let white = Color::rgb(255, 255, 255);
        let black = Color::rgb(0, 0, 0);
        assert_eq!(white.darken(0.1).to_string(), "#e6e6e6");
        assert_eq!(black.lighten(0.1).to_string(), "#1a1a1a");
        assert_eq!(black.lighten(0.05).to_string(), "#0d0d0d");
        assert_eq!(white.lighten(0.5), white);
    }

    #[test]
    fn test_hsl_round_trip_keeps_hue() {
        let red = Color::rgb(0xcc, 0x8b, 0x86);
        let lighter = red.lighten(0.1);
        assert!(lighter.r > red.r && lighter.g > red.g && lighter.b > red.b);
        assert_eq!(red.lighten(0.0), red);
    }

    #[test]
    fn test_rgba() {
        assert_eq!(Color::rgb(1, 2, 3).rgba(0.1), "rgba(1,2,3,0.1)");
    }
}
