//! Conversions between hex notation and RGB channel triples.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::{Error, Result};

static RGBA_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"rgba\(\s*(\d+)\s*,\s*(\d+)\s*,\s*(\d+)\s*,\s*([\d.]+)\s*\)")
        .expect("rgba pattern is valid")
});

/// An RGB color with an optional alpha component.
///
/// Channels are always within `[0, 255]`; constructors clamp their input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorTriple {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha in `[0, 1]`, if the source notation carried one.
    pub alpha: Option<f32>,
}

impl ColorTriple {
    /// Create an opaque color from already valid channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self {
            r,
            g,
            b,
            alpha: None,
        }
    }

    /// Create a color from arbitrary integers, clamping each channel.
    pub fn clamped(r: i64, g: i64, b: i64) -> Self {
        Self::new(clamp_channel(r), clamp_channel(g), clamp_channel(b))
    }

    /// Return the color with an alpha component, clamped to `[0, 1]`.
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            alpha: Some(alpha.clamp(0.0, 1.0)),
            ..self
        }
    }

    /// The channels as an array.
    pub fn rgb(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Render as `#rrggbb`. Alpha is not included.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Render as `#aarrggbb`, the form legacy gradient filters expect.
    ///
    /// The alpha byte is `round(255 * alpha)`; colors without alpha are opaque.
    pub fn to_argb_hex(&self) -> String {
        let alpha = self.alpha.unwrap_or(1.0);
        let alpha_byte = (255.0 * alpha).round().clamp(0.0, 255.0) as u8;
        format!("#{:02x}{:02x}{:02x}{:02x}", alpha_byte, self.r, self.g, self.b)
    }
}

impl fmt::Display for ColorTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for ColorTriple {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        hex_to_rgb(s)
    }
}

impl From<[u8; 3]> for ColorTriple {
    fn from(channels: [u8; 3]) -> Self {
        Self::new(channels[0], channels[1], channels[2])
    }
}

/// Parse `#rrggbb`, `rrggbb`, `#rgb` or `rgb` into a color.
///
/// The three-digit shorthand duplicates each digit, so `abc` equals `aabbcc`.
pub fn hex_to_rgb(hex: &str) -> Result<ColorTriple> {
    let digits = hex.trim();
    let digits = digits.strip_prefix('#').unwrap_or(digits);

    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(Error::invalid_color(hex));
    }

    let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| Error::invalid_color(hex));

    match digits.len() {
        6 => Ok(ColorTriple::new(
            channel(&digits[0..2])?,
            channel(&digits[2..4])?,
            channel(&digits[4..6])?,
        )),
        3 => {
            let expand = |i: usize| channel(&digits[i..=i].repeat(2));
            Ok(ColorTriple::new(expand(0)?, expand(1)?, expand(2)?))
        }
        _ => Err(Error::invalid_color(hex)),
    }
}

/// Render three channels as `#rrggbb`, clamping each to `[0, 255]`.
pub fn rgb_to_hex(r: i64, g: i64, b: i64) -> String {
    ColorTriple::clamped(r, g, b).to_hex()
}

/// Render an ordered `[r, g, b]` sequence as `#rrggbb`.
pub fn channels_to_hex(channels: [i64; 3]) -> String {
    let [r, g, b] = channels;
    rgb_to_hex(r, g, b)
}

/// A matched `rgba(r, g, b, a)` expression.
#[derive(Debug, Clone, PartialEq)]
pub struct RgbaMatch<'a> {
    /// The clamped color, including alpha.
    pub color: ColorTriple,
    /// The red, green and blue channels exactly as written in the source.
    pub channel_text: [&'a str; 3],
    /// The alpha exactly as written in the source.
    pub alpha_text: &'a str,
}

/// Find the first `rgba(r, g, b, a)` expression in `value`.
pub fn parse_rgba(value: &str) -> Option<RgbaMatch<'_>> {
    let caps = RGBA_PATTERN.captures(value)?;
    let text = |i: usize| caps.get(i).map_or("", |m| m.as_str());
    let channel = |i: usize| text(i).parse::<i64>().unwrap_or(i64::MAX);
    let alpha_text = caps.get(4)?.as_str();
    let alpha = alpha_text.parse::<f32>().ok()?;

    Some(RgbaMatch {
        color: ColorTriple::clamped(channel(1), channel(2), channel(3)).with_alpha(alpha),
        channel_text: [text(1), text(2), text(3)],
        alpha_text,
    })
}

fn clamp_channel(value: i64) -> u8 {
    value.clamp(0, 255) as u8
}
