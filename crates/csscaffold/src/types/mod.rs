//! Value types and conversions used by property handlers.

mod color;
mod vector;

pub use color::{ColorTriple, RgbaMatch, channels_to_hex, hex_to_rgb, parse_rgba, rgb_to_hex};
pub use vector::{PolarOffset, offset_to_polar};
