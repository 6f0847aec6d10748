//! Color stop types for magnitude color ramps.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// RGBA color with channels in [0, 1].
pub type Rgba = [f32; 4];

/// RGB color with channels in [0, 1].
pub type Rgb = [f32; 3];

/// A single stop on a piecewise-linear color ramp.
///
/// In JSON the color is written as a `#rrggbb` hex string:
/// `{ "color": "#00ffff", "position": 0.43 }`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    /// Stop color.
    #[serde(serialize_with = "serialize_hex", deserialize_with = "deserialize_hex")]
    pub color: Rgb,
    /// Normalized position along the ramp (0.0-1.0).
    pub position: f32,
}

impl ColorStop {
    /// Create a stop from a hex color string.
    pub fn from_hex(hex: &str, position: f32) -> Result<Self, RampError> {
        Ok(Self {
            color: parse_hex(hex)?,
            position,
        })
    }

    /// Stop color with full opacity.
    #[inline]
    pub fn rgba(&self) -> Rgba {
        [self.color[0], self.color[1], self.color[2], 1.0]
    }
}

/// The eight-stop "spectrum" ramp, black through violet, blue, cyan, green,
/// yellow and orange to red.
pub fn spectrum_stops() -> Vec<ColorStop> {
    const SPECTRUM: [u32; 8] = [
        0x000000, 0x550088, 0x0000ff, 0x00ffff, 0x00ff00, 0xffff00, 0xff8c00, 0xff0000,
    ];
    let last = (SPECTRUM.len() - 1) as f32;
    SPECTRUM
        .iter()
        .enumerate()
        .map(|(i, &rgb)| ColorStop {
            color: rgb_from_u32(rgb),
            position: i as f32 / last,
        })
        .collect()
}

/// Check that stops form a well-defined ramp over [0, 1].
pub fn validate_stops(stops: &[ColorStop]) -> Result<(), RampError> {
    if stops.len() < 2 {
        return Err(RampError::TooFewStops(stops.len()));
    }
    let first = stops[0].position;
    if first != 0.0 {
        return Err(RampError::FirstPosition(first));
    }
    let last = stops[stops.len() - 1].position;
    if last != 1.0 {
        return Err(RampError::LastPosition(last));
    }
    for (i, pair) in stops.windows(2).enumerate() {
        if !(pair[1].position > pair[0].position) {
            return Err(RampError::NonIncreasing {
                index: i + 1,
                position: pair[1].position,
            });
        }
    }
    Ok(())
}

fn rgb_from_u32(rgb: u32) -> Rgb {
    [
        ((rgb >> 16) & 0xff) as f32 / 255.0,
        ((rgb >> 8) & 0xff) as f32 / 255.0,
        (rgb & 0xff) as f32 / 255.0,
    ]
}

/// Parse `#rrggbb` (leading `#` optional).
pub fn parse_hex(hex: &str) -> Result<Rgb, RampError> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 {
        return Err(RampError::InvalidHex(hex.to_string()));
    }
    let rgb =
        u32::from_str_radix(digits, 16).map_err(|_| RampError::InvalidHex(hex.to_string()))?;
    Ok(rgb_from_u32(rgb))
}

/// Format as `#rrggbb`.
pub fn format_hex(color: Rgb) -> String {
    let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!(
        "#{:02x}{:02x}{:02x}",
        channel(color[0]),
        channel(color[1]),
        channel(color[2])
    )
}

fn serialize_hex<S: Serializer>(color: &Rgb, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&format_hex(*color))
}

fn deserialize_hex<'de, D: Deserializer<'de>>(d: D) -> Result<Rgb, D::Error> {
    let hex = String::deserialize(d)?;
    parse_hex(&hex).map_err(serde::de::Error::custom)
}

/// Color ramp validation errors.
#[derive(Debug, thiserror::Error)]
pub enum RampError {
    #[error("Color ramp needs at least two stops, got {0}")]
    TooFewStops(usize),
    #[error("First color stop must sit at position 0, found {0}")]
    FirstPosition(f32),
    #[error("Last color stop must sit at position 1, found {0}")]
    LastPosition(f32),
    #[error("Color stop {index} at position {position} does not increase")]
    NonIncreasing { index: usize, position: f32 },
    #[error("Invalid hex color: {0:?}")]
    InvalidHex(String),
    #[error("Color resolution must be at least 2, got {0}")]
    InvalidResolution(usize),
}
