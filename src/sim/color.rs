//! Theme colours
//!
//! Level data writes colours the way designers do (`#0b3d91`,
//! `rgba(64, 200, 255, 0.35)`), and the renderer wants them back in the
//! same notation, so each colour remembers which form it came from.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::SimError;
use crate::lerp;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notation {
    Hex,
    Rgb,
    Rgba,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// 0.0 - 1.0
    pub a: f32,
    pub notation: Notation,
}

impl Color {
    pub const fn hex(r: u8, g: u8, b: u8) -> Self {
        Self {
            r,
            g,
            b,
            a: 1.0,
            notation: Notation::Hex,
        }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self {
            r,
            g,
            b,
            a: 1.0,
            notation: Notation::Rgb,
        }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self {
            r,
            g,
            b,
            a,
            notation: Notation::Rgba,
        }
    }

    pub const WHITE: Color = Color::hex(0xff, 0xff, 0xff);
    pub const GOLD: Color = Color::hex(0xff, 0xd7, 0x00);
    pub const YELLOW: Color = Color::hex(0xff, 0xff, 0x00);
    pub const ORANGE: Color = Color::hex(0xff, 0xa5, 0x00);
    pub const RED: Color = Color::hex(0xff, 0x33, 0x33);
    pub const PINK: Color = Color::hex(0xff, 0x69, 0xb4);
    pub const MAGENTA: Color = Color::hex(0xff, 0x00, 0xff);
    pub const DAMAGE: Color = Color::hex(0xe0, 0x20, 0x20);
    pub const BUBBLE: Color = Color::rgba(200, 240, 255, 0.6);

    /// Same colour with a different alpha, switching to rgba notation
    pub fn with_alpha(self, a: f32) -> Self {
        Self::rgba(self.r, self.g, self.b, a.clamp(0.0, 1.0))
    }

    /// Channel-wise interpolation. Exact at `t = 0` and `t = 1`.
    ///
    /// The result takes the target's notation once `t` reaches 1 and the
    /// start's notation before that, unless either side is rgba, in which
    /// case it is rgba throughout.
    pub fn lerp(start: Color, target: Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        if t <= 0.0 {
            return start;
        }
        if t >= 1.0 {
            return target;
        }
        let channel = |a: u8, b: u8| lerp(a as f32, b as f32, t).round().clamp(0.0, 255.0) as u8;
        let notation = if start.notation == Notation::Rgba || target.notation == Notation::Rgba {
            Notation::Rgba
        } else {
            start.notation
        };
        Color {
            r: channel(start.r, target.r),
            g: channel(start.g, target.g),
            b: channel(start.b, target.b),
            a: lerp(start.a, target.a, t),
            notation,
        }
    }

    pub fn to_css(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.notation {
            Notation::Hex => write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b),
            Notation::Rgb => write!(f, "rgb({}, {}, {})", self.r, self.g, self.b),
            Notation::Rgba => write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a),
        }
    }
}

impl FromStr for Color {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let bad = || SimError::InvalidLevel {
            reason: format!("unrecognised colour '{s}'"),
        };

        if let Some(hex) = s.strip_prefix('#') {
            let digits: Vec<u8> = hex
                .chars()
                .map(|c| c.to_digit(16).map(|d| d as u8))
                .collect::<Option<_>>()
                .ok_or_else(bad)?;
            return match digits.as_slice() {
                [r, g, b] => Ok(Color::hex(r * 17, g * 17, b * 17)),
                [r1, r0, g1, g0, b1, b0] => {
                    Ok(Color::hex(r1 * 16 + r0, g1 * 16 + g0, b1 * 16 + b0))
                }
                _ => Err(bad()),
            };
        }

        let (inner, with_alpha) = match s.strip_prefix("rgba(") {
            Some(rest) => (rest, true),
            None => (s.strip_prefix("rgb(").ok_or_else(bad)?, false),
        };
        let inner = inner.strip_suffix(')').ok_or_else(bad)?;
        let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
        let channel = |p: &str| p.parse::<f32>().ok().map(|v| v.round().clamp(0.0, 255.0) as u8);
        match (parts.as_slice(), with_alpha) {
            ([r, g, b], false) => Ok(Color::rgb(
                channel(*r).ok_or_else(bad)?,
                channel(*g).ok_or_else(bad)?,
                channel(*b).ok_or_else(bad)?,
            )),
            ([r, g, b, a], true) => Ok(Color::rgba(
                channel(*r).ok_or_else(bad)?,
                channel(*g).ok_or_else(bad)?,
                channel(*b).ok_or_else(bad)?,
                a.parse::<f32>().map_err(|_| bad())?.clamp(0.0, 1.0),
            )),
            _ => Err(bad()),
        }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_css())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Celebration colour for a pickup at the given streak
pub fn streak_color(streak: u32) -> Color {
    match streak {
        0..=4 => Color::GOLD,
        5..=14 => Color::YELLOW,
        15..=24 => Color::ORANGE,
        25..=34 => Color::RED,
        35..=44 => Color::PINK,
        _ => Color::MAGENTA,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_hex_forms() {
        let c: Color = "#0b3d91".parse().unwrap();
        assert_eq!((c.r, c.g, c.b), (0x0b, 0x3d, 0x91));
        assert_eq!(c.notation, Notation::Hex);
        let short: Color = "#fff".parse().unwrap();
        assert_eq!(short, Color::WHITE);
        assert_eq!(c.to_css(), "#0b3d91");
    }

    #[test]
    fn test_parse_rgba() {
        let c: Color = "rgba(64, 200, 255, 0.35)".parse().unwrap();
        assert_eq!((c.r, c.g, c.b), (64, 200, 255));
        assert!((c.a - 0.35).abs() < 1e-6);
        assert_eq!(c.to_css(), "rgba(64, 200, 255, 0.35)");
    }

    #[test]
    fn test_parse_rgb_keeps_notation() {
        let c: Color = "rgb(10, 20, 30)".parse().unwrap();
        assert_eq!(c, Color::rgb(10, 20, 30));
        assert_eq!(c.notation, Notation::Rgb);
        assert_eq!(c.to_css(), "rgb(10, 20, 30)");

        let mid = Color::lerp(c, Color::hex(30, 40, 50), 0.5);
        assert_eq!(mid.to_css(), "rgb(20, 30, 40)");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("#12".parse::<Color>().is_err());
        assert!("blue".parse::<Color>().is_err());
        assert!("rgba(1,2)".parse::<Color>().is_err());
        assert!("rgb(1, 2, 3, 0.5)".parse::<Color>().is_err());
        assert!("rgba(1, 2, 3)".parse::<Color>().is_err());
    }

    #[test]
    fn test_lerp_midpoint() {
        let mid = Color::lerp(Color::hex(0, 0, 0), Color::hex(200, 100, 50), 0.5);
        assert_eq!((mid.r, mid.g, mid.b), (100, 50, 25));
    }

    #[test]
    fn test_lerp_alpha() {
        let a = Color::rgba(0, 0, 0, 0.2);
        let b = Color::rgba(0, 0, 0, 0.6);
        let mid = Color::lerp(a, b, 0.5);
        assert!((mid.a - 0.4).abs() < 1e-6);
        assert_eq!(mid.notation, Notation::Rgba);
    }

    #[test]
    fn test_streak_ladder() {
        assert_eq!(streak_color(0), Color::GOLD);
        assert_eq!(streak_color(4), Color::GOLD);
        assert_eq!(streak_color(5), Color::YELLOW);
        assert_eq!(streak_color(14), Color::YELLOW);
        assert_eq!(streak_color(15), Color::ORANGE);
        assert_eq!(streak_color(25), Color::RED);
        assert_eq!(streak_color(35), Color::PINK);
        assert_eq!(streak_color(44), Color::PINK);
        assert_eq!(streak_color(45), Color::MAGENTA);
    }

    fn any_color() -> impl Strategy<Value = Color> {
        (any::<u8>(), any::<u8>(), any::<u8>(), 0.0f32..=1.0, 0u8..3).prop_map(
            |(r, g, b, a, form)| match form {
                0 => Color::hex(r, g, b),
                1 => Color::rgb(r, g, b),
                _ => Color::rgba(r, g, b, a),
            },
        )
    }

    proptest! {
        #[test]
        fn prop_lerp_identity_and_exact(start in any_color(), target in any_color()) {
            prop_assert_eq!(Color::lerp(start, target, 0.0), start);
            prop_assert_eq!(Color::lerp(start, target, 1.0), target);
        }

        #[test]
        fn prop_css_round_trip_opaque(r in any::<u8>(), g in any::<u8>(), b in any::<u8>()) {
            let c = Color::hex(r, g, b);
            prop_assert_eq!(c.to_css().parse::<Color>().unwrap(), c);
            let c = Color::rgb(r, g, b);
            prop_assert_eq!(c.to_css().parse::<Color>().unwrap(), c);
        }
    }
}
