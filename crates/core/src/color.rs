//! Translucent sRGB colors as used by the particle field and its surfaces.
//!
//! Colors are stored as `f64` components in [0, 1] and exchanged with hosts
//! as CSS strings (`"#rrggbb"`, `"rgb(..)"`, `"rgba(..)"`), which is what a
//! canvas 2D context accepts for `fillStyle` / `strokeStyle`.

use crate::error::BackdropError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// sRGB color with straight (non-premultiplied) alpha, all components in [0, 1].
///
/// Serializes as a CSS `rgba(r, g, b, a)` string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Rgba {
    /// Opaque white, the stroke color of connection lines.
    pub const WHITE: Rgba = Rgba {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };

    /// Fully transparent black, the cleared state of a surface.
    pub const TRANSPARENT: Rgba = Rgba {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };

    /// Builds a color from 8-bit channels and an alpha in [0, 1].
    pub fn from_rgb8(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
            a: a.clamp(0.0, 1.0),
        }
    }

    /// Returns the same color with its alpha replaced (clamped to [0, 1]).
    pub fn with_alpha(self, a: f64) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Parses `"#rrggbb"`, `"rrggbb"`, `"rgb(r, g, b)"` or `"rgba(r, g, b, a)"`.
    ///
    /// Channel values in the functional forms are 0..=255, alpha is 0..=1.
    pub fn parse(input: &str) -> Result<Self, BackdropError> {
        let s = input.trim();
        if let Some(body) = s.strip_prefix("rgba(").and_then(|b| b.strip_suffix(')')) {
            let parts = split_components(body, 4, input)?;
            let [r, g, b] = parse_channels(&parts[..3], input)?;
            let a = parts[3]
                .parse::<f64>()
                .map_err(|e| BackdropError::InvalidColor(format!("{input}: bad alpha: {e}")))?;
            return Ok(Self::from_rgb8(r, g, b, a));
        }
        if let Some(body) = s.strip_prefix("rgb(").and_then(|b| b.strip_suffix(')')) {
            let parts = split_components(body, 3, input)?;
            let [r, g, b] = parse_channels(&parts, input)?;
            return Ok(Self::from_rgb8(r, g, b, 1.0));
        }
        Self::from_hex(s)
    }

    /// Parses a hex color like "#ff00aa" or "ff00aa" (case insensitive), opaque.
    pub fn from_hex(hex: &str) -> Result<Self, BackdropError> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(BackdropError::InvalidColor(format!(
                "expected 6 hex digits, got {hex:?}"
            )));
        }
        let channel = |range: std::ops::Range<usize>, name: &str| {
            u8::from_str_radix(&hex[range], 16)
                .map_err(|e| BackdropError::InvalidColor(format!("invalid {name} component: {e}")))
        };
        Ok(Self::from_rgb8(
            channel(0..2, "red")?,
            channel(2..4, "green")?,
            channel(4..6, "blue")?,
            1.0,
        ))
    }

    /// Quantizes to 8-bit RGBA (straight alpha).
    pub fn to_rgba8(self) -> [u8; 4] {
        let q = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    /// Formats as a CSS `rgba(r, g, b, a)` string.
    pub fn to_css(self) -> String {
        let [r, g, b, _] = self.to_rgba8();
        let a = (self.a.clamp(0.0, 1.0) * 1000.0).round() / 1000.0;
        format!("rgba({r}, {g}, {b}, {a})")
    }
}

fn split_components<'a>(
    body: &'a str,
    expected: usize,
    input: &str,
) -> Result<Vec<&'a str>, BackdropError> {
    let parts: Vec<&str> = body.split(',').map(str::trim).collect();
    if parts.len() != expected {
        return Err(BackdropError::InvalidColor(format!(
            "{input}: expected {expected} components, got {}",
            parts.len()
        )));
    }
    Ok(parts)
}

fn parse_channels(parts: &[&str], input: &str) -> Result<[u8; 3], BackdropError> {
    let mut out = [0u8; 3];
    for (slot, part) in out.iter_mut().zip(parts) {
        *slot = part
            .parse::<u8>()
            .map_err(|e| BackdropError::InvalidColor(format!("{input}: bad channel {part:?}: {e}")))?;
    }
    Ok(out)
}

impl Serialize for Rgba {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_css())
    }
}

impl<'de> Deserialize<'de> for Rgba {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Rgba::parse(&s).map_err(serde::de::Error::custom)
    }
}
